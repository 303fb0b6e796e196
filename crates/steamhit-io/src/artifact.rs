//! Persisted model artifacts: a forest file plus its feature-name list.

use std::path::{Path, PathBuf};

use steamhit_forest::RandomForest;
use tracing::{info, instrument, warn};

use crate::error::ArtifactError;

/// File name of the bincode-encoded forest.
pub const MODEL_FILE: &str = "model.bin";

/// File name of the JSON feature-name list.
pub const FEATURES_FILE: &str = "features.json";

/// A fitted forest and the ordered feature names it expects.
#[derive(Debug, Clone)]
pub struct ModelArtifact {
    forest: RandomForest,
    feature_names: Vec<String>,
}

impl ModelArtifact {
    /// Pair a forest with its feature list.
    #[must_use]
    pub fn new(forest: RandomForest, feature_names: Vec<String>) -> Self {
        Self {
            forest,
            feature_names,
        }
    }

    /// The fitted forest.
    #[must_use]
    pub fn forest(&self) -> &RandomForest {
        &self.forest
    }

    /// Feature names in the order the forest consumes them.
    #[must_use]
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Check that the forest and the feature list describe the same width.
    ///
    /// # Errors
    ///
    /// [`ArtifactError::Inconsistent`] when they differ.
    pub fn check_consistent(&self) -> Result<(), ArtifactError> {
        let model_features = self.forest.n_features();
        let listed_features = self.feature_names.len();
        if model_features != listed_features {
            return Err(ArtifactError::Inconsistent {
                model_features,
                listed_features,
            });
        }
        Ok(())
    }
}

/// Reads and writes the artifact pair inside one directory.
///
/// `save` writes the model and then the feature list. The two writes are
/// not atomic as a pair: a crash between them leaves a new model next to a
/// stale feature list. `load` reports a width disagreement between the two
/// at `warn` but does not refuse it; [`ModelArtifact::check_consistent`] is
/// the hard check for callers that serve predictions.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    /// Store rooted at `dir`. Nothing is touched until `save` or `load`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the artifact files.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the forest file.
    #[must_use]
    pub fn model_path(&self) -> PathBuf {
        self.dir.join(MODEL_FILE)
    }

    /// Path of the feature-list file.
    #[must_use]
    pub fn features_path(&self) -> PathBuf {
        self.dir.join(FEATURES_FILE)
    }

    /// Write the forest and its feature list, replacing any existing pair.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`ArtifactError::CreateDir`] | Directory cannot be created |
    /// | [`ArtifactError::Model`] | Forest cannot be encoded or written |
    /// | [`ArtifactError::EncodeFeatures`] | Feature list cannot be encoded |
    /// | [`ArtifactError::WriteFeatures`] | Feature list cannot be written |
    #[instrument(skip_all, fields(dir = %self.dir.display()))]
    pub fn save(&self, forest: &RandomForest, feature_names: &[String]) -> Result<(), ArtifactError> {
        std::fs::create_dir_all(&self.dir).map_err(|e| ArtifactError::CreateDir {
            path: self.dir.clone(),
            source: e,
        })?;

        forest.save(self.model_path())?;

        let json = serde_json::to_string_pretty(feature_names)
            .map_err(|e| ArtifactError::EncodeFeatures { source: e })?;
        let features_path = self.features_path();
        std::fs::write(&features_path, json).map_err(|e| ArtifactError::WriteFeatures {
            path: features_path,
            source: e,
        })?;

        info!(
            n_trees = forest.n_trees(),
            n_features = feature_names.len(),
            "model artifacts saved"
        );
        Ok(())
    }

    /// Read the forest and its feature list.
    ///
    /// Both files are checked for existence before either is decoded.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`ArtifactError::Missing`] | Either file does not exist |
    /// | [`ArtifactError::Model`] | Forest file is unreadable, corrupt or from another format version |
    /// | [`ArtifactError::ReadFeatures`] | Feature list is unreadable |
    /// | [`ArtifactError::DecodeFeatures`] | Feature list is not a JSON string array |
    #[instrument(skip_all, fields(dir = %self.dir.display()))]
    pub fn load(&self) -> Result<ModelArtifact, ArtifactError> {
        let model_path = self.model_path();
        let features_path = self.features_path();
        for path in [&model_path, &features_path] {
            if !path.is_file() {
                return Err(ArtifactError::Missing { path: path.clone() });
            }
        }

        let forest = RandomForest::load(&model_path)?;

        let text = std::fs::read_to_string(&features_path).map_err(|e| ArtifactError::ReadFeatures {
            path: features_path.clone(),
            source: e,
        })?;
        let feature_names: Vec<String> =
            serde_json::from_str(&text).map_err(|e| ArtifactError::DecodeFeatures {
                path: features_path,
                source: e,
            })?;

        let artifact = ModelArtifact::new(forest, feature_names);
        if let Err(e) = artifact.check_consistent() {
            warn!(error = %e, "artifacts may come from different runs");
        }
        info!(
            n_trees = artifact.forest().n_trees(),
            n_features = artifact.feature_names().len(),
            "model artifacts loaded"
        );
        Ok(artifact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use steamhit_forest::{ForestError, RandomForestConfig};
    use tempfile::TempDir;

    fn names() -> Vec<String> {
        vec!["price".to_string(), "reviews".to_string()]
    }

    fn forest() -> RandomForest {
        let mut features = Vec::new();
        let mut labels = Vec::new();
        for i in 0..40 {
            let reviews = (i * 40) as f64;
            features.push(vec![(i % 7) as f64, reviews]);
            labels.push(reviews >= 500.0);
        }
        RandomForestConfig::new(8)
            .unwrap()
            .fit(&features, &labels, &names())
            .unwrap()
            .into_forest()
    }

    #[test]
    fn save_then_load_preserves_predictions() {
        let dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(dir.path().join("models"));
        let forest = forest();
        store.save(&forest, &names()).unwrap();

        let artifact = store.load().unwrap();
        assert_eq!(artifact.feature_names(), names().as_slice());
        for point in [[3.0, 100.0], [1.0, 900.0], [6.0, 480.0]] {
            assert_eq!(
                artifact.forest().predict_proba(&point).unwrap(),
                forest.predict_proba(&point).unwrap()
            );
        }
    }

    #[test]
    fn feature_list_is_plain_json() {
        let dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(dir.path());
        store.save(&forest(), &names()).unwrap();
        let text = std::fs::read_to_string(store.features_path()).unwrap();
        let parsed: Vec<String> = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, names());
    }

    #[test]
    fn missing_model_file_reported() {
        let dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(dir.path());
        std::fs::write(store.features_path(), "[]").unwrap();
        let err = store.load().unwrap_err();
        match err {
            ArtifactError::Missing { path } => assert!(path.ends_with(MODEL_FILE)),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_feature_file_reported() {
        let dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(dir.path());
        forest().save(store.model_path()).unwrap();
        let err = store.load().unwrap_err();
        match err {
            ArtifactError::Missing { path } => assert!(path.ends_with(FEATURES_FILE)),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn corrupt_model_is_not_missing() {
        let dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(dir.path());
        std::fs::write(store.model_path(), [0x01u8]).unwrap();
        std::fs::write(store.features_path(), "[]").unwrap();
        let err = store.load().unwrap_err();
        assert!(matches!(err, ArtifactError::Model(ForestError::DeserializeModel { .. })));
    }

    #[test]
    fn malformed_feature_list_reported() {
        let dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(dir.path());
        store.save(&forest(), &names()).unwrap();
        std::fs::write(store.features_path(), "{\"not\": \"a list\"}").unwrap();
        let err = store.load().unwrap_err();
        assert!(matches!(err, ArtifactError::DecodeFeatures { .. }));
    }

    #[test]
    fn stale_feature_list_loads_but_fails_consistency() {
        let dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(dir.path());
        let seven: Vec<String> = crate::FeatureSelector::standard().names();
        forest().save(store.model_path()).unwrap();
        std::fs::write(store.features_path(), serde_json::to_string(&seven).unwrap()).unwrap();
        let artifact = store.load().unwrap();
        assert!(matches!(
            artifact.check_consistent(),
            Err(ArtifactError::Inconsistent {
                model_features: 2,
                listed_features: 7,
            })
        ));

        store.save(&forest(), &names()).unwrap();
        assert!(store.load().unwrap().check_consistent().is_ok());
    }

    #[test]
    fn save_overwrites_previous_pair() {
        let dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(dir.path());
        store.save(&forest(), &names()).unwrap();
        let renamed = vec!["a".to_string(), "b".to_string()];
        store.save(&forest(), &renamed).unwrap();
        assert_eq!(store.load().unwrap().feature_names(), renamed.as_slice());
    }
}
