//! Process-lifetime application context: one dataset, one artifact.

use std::path::Path;

use steamhit_io::{ArtifactStore, Dataset, DatasetReader, FeatureSelector, GameRecord, ModelArtifact};
use tracing::{info, instrument};

use crate::error::ServeError;
use crate::service::{Prediction, PredictionService};

/// A title resolved to its record's display fields and a prediction.
#[derive(Debug, Clone, serde::Serialize)]
pub struct TitlePrediction {
    pub title: String,
    pub app_id: Option<u64>,
    pub rating: Option<String>,
    pub positive_ratio: Option<f64>,
    pub user_reviews: Option<u64>,
    pub price_final: Option<f64>,
    pub discount: Option<f64>,
    pub year: Option<i32>,
    #[serde(flatten)]
    pub prediction: Prediction,
}

/// Everything a serving process needs, loaded once at start-up.
///
/// Built by [`AppContext::init`] and never mutated afterwards. Pass it by
/// reference to whatever answers prediction requests.
#[derive(Debug)]
pub struct AppContext {
    dataset: Dataset,
    selector: FeatureSelector,
    service: PredictionService,
}

impl AppContext {
    /// Load the artifact pair and the dataset.
    ///
    /// Artifacts are loaded first so that a missing model fails before the
    /// dataset is parsed.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`ServeError::Artifact`] | Model or feature list missing or unreadable |
    /// | [`ServeError::Record`] | Stored feature list names an unknown column |
    /// | [`ServeError::Data`] | Dataset file missing or malformed |
    #[instrument(skip_all, fields(data = %data_path.display(), models = %store.dir().display()))]
    pub fn init(data_path: &Path, store: &ArtifactStore) -> Result<Self, ServeError> {
        let artifact = store.load()?;
        let dataset = DatasetReader::new(data_path).read()?;
        let ctx = Self::from_parts(dataset, artifact)?;
        info!(
            n_records = ctx.dataset.len(),
            n_features = ctx.selector.len(),
            "application context ready"
        );
        Ok(ctx)
    }

    /// Assemble a context from already-loaded parts.
    ///
    /// # Errors
    ///
    /// [`ServeError::Artifact`] when the forest and the feature list come
    /// from different runs; [`ServeError::Record`] when the feature list
    /// names a column the selector does not know.
    pub fn from_parts(dataset: Dataset, artifact: ModelArtifact) -> Result<Self, ServeError> {
        artifact.check_consistent()?;
        let selector = FeatureSelector::new(artifact.feature_names())?;
        Ok(Self {
            dataset,
            selector,
            service: PredictionService::new(artifact),
        })
    }

    /// The loaded dataset.
    #[must_use]
    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// The prediction service.
    #[must_use]
    pub fn service(&self) -> &PredictionService {
        &self.service
    }

    /// Project a record through the artifact's feature list and score it.
    ///
    /// # Errors
    ///
    /// [`ServeError::Record`] when the record lacks a needed value.
    pub fn predict_record(&self, record: &GameRecord) -> Result<Prediction, ServeError> {
        let vector = self.selector.select(record)?;
        self.service.predict(vector.as_slice())
    }

    /// Score the first record carrying `title`.
    ///
    /// # Errors
    ///
    /// [`ServeError::UnknownTitle`] when no record matches, otherwise as
    /// [`predict_record`](Self::predict_record).
    pub fn predict_title(&self, title: &str) -> Result<TitlePrediction, ServeError> {
        let record = self
            .dataset
            .find_by_title(title)
            .ok_or_else(|| ServeError::UnknownTitle {
                title: title.to_string(),
            })?;
        let prediction = self.predict_record(record)?;
        Ok(TitlePrediction {
            title: record.title().to_string(),
            app_id: record.app_id(),
            rating: record.rating().map(String::from),
            positive_ratio: record.positive_ratio(),
            user_reviews: record.user_reviews(),
            price_final: record.price_final(),
            discount: record.discount(),
            year: record.year(),
            prediction,
        })
    }
}
