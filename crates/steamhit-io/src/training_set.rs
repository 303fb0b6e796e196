//! Assemble the feature matrix and label vector from a dataset.

use tracing::{debug, info, instrument, warn};

use crate::domain::Dataset;
use crate::error::RecordError;
use crate::features::FeatureSelector;
use crate::label::HitRule;

/// Labelled rows ready for training, plus the records that had to be left out.
#[derive(Debug, Clone)]
pub struct TrainingSet {
    features: Vec<Vec<f64>>,
    labels: Vec<bool>,
    feature_names: Vec<String>,
    rows: Vec<usize>,
    excluded: Vec<RecordError>,
}

impl TrainingSet {
    /// Label and project every record in `dataset`.
    ///
    /// A record is excluded when its label or any selected feature is
    /// absent. Exclusions are kept on the result and summarised at `warn`.
    #[instrument(skip_all, fields(n_records = dataset.len()))]
    pub fn build(dataset: &Dataset, rule: &HitRule, selector: &FeatureSelector) -> Self {
        let mut features = Vec::with_capacity(dataset.len());
        let mut labels = Vec::with_capacity(dataset.len());
        let mut rows = Vec::with_capacity(dataset.len());
        let mut excluded = Vec::new();

        for record in dataset.records() {
            let row = rule
                .derive(record)
                .and_then(|label| selector.select(record).map(|v| (v, label)));
            match row {
                Ok((vector, label)) => {
                    features.push(vector.into_inner());
                    labels.push(label);
                    rows.push(record.row());
                }
                Err(e) => {
                    debug!(error = %e, "record excluded");
                    excluded.push(e);
                }
            }
        }

        if !excluded.is_empty() {
            warn!(
                n_excluded = excluded.len(),
                first = %excluded[0],
                "records with missing values excluded from training"
            );
        }
        let n_hits = labels.iter().filter(|&&l| l).count();
        info!(n_rows = labels.len(), n_hits, "training set assembled");

        Self {
            features,
            labels,
            feature_names: selector.names(),
            rows,
            excluded,
        }
    }

    /// Feature matrix, one row per kept record.
    #[must_use]
    pub fn features(&self) -> &[Vec<f64>] {
        &self.features
    }

    /// Hit labels aligned with [`features`](Self::features).
    #[must_use]
    pub fn labels(&self) -> &[bool] {
        &self.labels
    }

    /// Column names of the feature matrix.
    #[must_use]
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Dataset row of each kept record.
    #[must_use]
    pub fn rows(&self) -> &[usize] {
        &self.rows
    }

    /// Why each excluded record was left out.
    #[must_use]
    pub fn excluded(&self) -> &[RecordError] {
        &self.excluded
    }

    /// Number of kept records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Whether no record survived.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Number of kept records labelled as hits.
    #[must_use]
    pub fn n_hits(&self) -> usize {
        self.labels.iter().filter(|&&l| l).count()
    }
}
