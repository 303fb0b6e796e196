//! What `RandomForestConfig::fit` hands back.

use crate::forest::RandomForest;
use crate::importance::RankedFeature;

/// Shape of the data a forest was fitted on.
#[derive(Debug, Clone, serde::Serialize)]
pub struct TrainingMetadata {
    pub n_trees: usize,
    pub n_features: usize,
    pub n_samples: usize,
    /// Rows labelled `true`.
    pub n_positive: usize,
    /// Features tried per split after resolving [`MaxFeatures`](crate::MaxFeatures).
    pub max_features_resolved: usize,
}

impl TrainingMetadata {
    /// Share of training rows in the positive class.
    #[must_use]
    pub fn positive_rate(&self) -> f64 {
        self.n_positive as f64 / self.n_samples as f64
    }
}

/// A fitted forest with its MDI importances and run metadata.
#[derive(Debug)]
pub struct RandomForestResult {
    forest: RandomForest,
    importances: Vec<RankedFeature>,
    metadata: TrainingMetadata,
}

impl RandomForestResult {
    pub(crate) fn new(
        forest: RandomForest,
        importances: Vec<RankedFeature>,
        metadata: TrainingMetadata,
    ) -> Self {
        Self {
            forest,
            importances,
            metadata,
        }
    }

    #[must_use]
    pub fn forest(&self) -> &RandomForest {
        &self.forest
    }

    /// Drop the importances and metadata, keeping the forest.
    #[must_use]
    pub fn into_forest(self) -> RandomForest {
        self.forest
    }

    /// Importances sorted from most to least important.
    #[must_use]
    pub fn importances(&self) -> &[RankedFeature] {
        &self.importances
    }

    #[must_use]
    pub fn metadata(&self) -> &TrainingMetadata {
        &self.metadata
    }
}
