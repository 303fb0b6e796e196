//! Error types for steamhit-serve.

use std::fmt;

use steamhit_forest::ForestError;
use steamhit_io::{ArtifactError, DataError, RecordError};

/// Errors from initialising the application context or serving a prediction.
#[derive(Debug, thiserror::Error)]
pub enum ServeError {
    /// Returned when an input vector's length differs from the stored
    /// feature list. Inputs are never truncated or padded.
    #[error("feature vector has {got} values, model expects {expected}")]
    ShapeMismatch {
        /// Length of the stored feature-name list.
        expected: usize,
        /// Length of the supplied vector.
        got: usize,
    },

    /// Returned when the model artifacts are absent or unusable.
    #[error("model unavailable")]
    Artifact(#[from] ArtifactError),

    /// Returned when the dataset cannot be loaded.
    #[error("dataset unavailable")]
    Data(#[from] DataError),

    /// Returned when a record lacks a value the model needs, or the stored
    /// feature list names an unknown column.
    #[error(transparent)]
    Record(#[from] RecordError),

    /// Returned when no record carries the requested title.
    #[error("no record titled \"{title}\"")]
    UnknownTitle {
        /// The title that was looked up.
        title: String,
    },

    /// Returned when the forest rejects an input that passed the length check.
    #[error("prediction failed")]
    Forest(#[from] ForestError),
}

/// What an operator should do about a [`ServeError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// No usable model: run training.
    ModelUnavailable,
    /// The dataset file itself is unusable: fix or replace it.
    DatasetUnavailable,
    /// The requested row or vector is bad: fix the input.
    BadInput,
}

impl ErrorCategory {
    /// Stable short name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ModelUnavailable => "model_unavailable",
            Self::DatasetUnavailable => "dataset_unavailable",
            Self::BadInput => "bad_input",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ServeError {
    /// Classify the error for whoever presents it.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            // A vector that matches the stored list but not the forest means
            // the two artifact files come from different runs.
            Self::Artifact(_)
            | Self::Record(RecordError::UnknownFeature { .. })
            | Self::Forest(ForestError::PredictionFeatureMismatch { .. }) => {
                ErrorCategory::ModelUnavailable
            }
            Self::Data(_) => ErrorCategory::DatasetUnavailable,
            Self::ShapeMismatch { .. }
            | Self::Record(RecordError::MissingField { .. })
            | Self::UnknownTitle { .. }
            | Self::Forest(_) => ErrorCategory::BadInput,
        }
    }
}
