//! Error types for steamhit-io.

use std::path::PathBuf;

use steamhit_forest::ForestError;

/// Errors that make a dataset file unusable. All are fatal at load time.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    /// Returned when the input file does not exist or is unreadable.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when the CSV parser encounters a malformed record.
    #[error("CSV parse error in {path} at byte offset {offset}")]
    CsvParse {
        /// Path to the CSV file.
        path: PathBuf,
        /// Byte offset where the error occurred.
        offset: u64,
        /// Underlying CSV error.
        source: csv::Error,
    },

    /// Returned when the header lacks one or more required columns.
    #[error("{path} is missing required column(s): {}", .missing.join(", "))]
    MissingColumns {
        /// Path to the CSV file.
        path: PathBuf,
        /// Names of the absent columns.
        missing: Vec<&'static str>,
    },

    /// Returned when a data row has a different number of columns than the header.
    #[error("inconsistent row length in {path}: row {row_index} has {got} columns, expected {expected}")]
    InconsistentRowLength {
        /// Path to the CSV file.
        path: PathBuf,
        /// Zero-based row index (excluding header).
        row_index: usize,
        /// Expected number of columns (from header).
        expected: usize,
        /// Actual number of columns in this row.
        got: usize,
    },

    /// Returned when the CSV file contains a header but zero data rows.
    #[error("empty dataset (no data rows) in {path}")]
    EmptyDataset {
        /// Path to the CSV file.
        path: PathBuf,
    },
}

/// Per-record failures. A record that fails is excluded, never guessed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordError {
    /// Returned when a value the operation needs is empty or unparseable.
    #[error("row {row} (\"{title}\") has no usable value for {field}")]
    MissingField {
        /// Zero-based data row of the record.
        row: usize,
        /// Title of the record.
        title: String,
        /// Column that was missing.
        field: &'static str,
    },

    /// Returned when a feature list names a column the selector does not know.
    #[error("unknown feature column \"{name}\"")]
    UnknownFeature {
        /// The unrecognised name.
        name: String,
    },
}

/// Errors from saving or loading the model artifact pair.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    /// Returned when the model or the feature-list file does not exist.
    #[error("artifact file not found: {path} (has a model been trained?)")]
    Missing {
        /// Path of the absent file.
        path: PathBuf,
    },

    /// Returned when the artifact directory cannot be created.
    #[error("cannot create artifact directory {path}")]
    CreateDir {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when the feature list cannot be encoded.
    #[error("failed to encode feature list")]
    EncodeFeatures {
        /// Underlying JSON error.
        source: serde_json::Error,
    },

    /// Returned when the feature list cannot be decoded.
    #[error("failed to decode feature list from {path}")]
    DecodeFeatures {
        /// Path of the feature-list file.
        path: PathBuf,
        /// Underlying JSON error.
        source: serde_json::Error,
    },

    /// Returned when the feature-list file cannot be written.
    #[error("cannot write feature list {path}")]
    WriteFeatures {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when the feature-list file exists but cannot be read.
    #[error("cannot read feature list {path}")]
    ReadFeatures {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when the forest's width disagrees with the feature list,
    /// i.e. the two files come from different training runs.
    #[error("model expects {model_features} features but the feature list has {listed_features}; retrain to rewrite both files")]
    Inconsistent {
        /// Number of features the forest was fitted on.
        model_features: usize,
        /// Number of names in the feature-list file.
        listed_features: usize,
    },

    /// Returned when the model file cannot be written or decoded.
    #[error(transparent)]
    Model(#[from] ForestError),
}
