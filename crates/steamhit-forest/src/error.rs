use std::path::PathBuf;

/// Errors from fitting, scoring, and persisting trees and forests.
#[derive(Debug, thiserror::Error)]
pub enum ForestError {
    #[error("n_trees must be at least 1, got {n_trees}")]
    InvalidTreeCount { n_trees: usize },

    #[error("max_depth must be at least 1, got {max_depth}")]
    InvalidMaxDepth { max_depth: usize },

    #[error("min_samples_split must be at least 2, got {min_samples_split}")]
    InvalidMinSamplesSplit { min_samples_split: usize },

    #[error("min_samples_leaf must be at least 1, got {min_samples_leaf}")]
    InvalidMinSamplesLeaf { min_samples_leaf: usize },

    /// `max_features` resolved outside `[1, n_features]`.
    #[error("max_features resolved to {max_features}, but must be in [1, {n_features}]")]
    InvalidMaxFeatures {
        max_features: usize,
        n_features: usize,
    },

    /// Returned when the hold-out fraction is not strictly between 0 and 1.
    #[error("test_fraction must be in (0.0, 1.0), got {fraction}")]
    InvalidTestFraction {
        /// The invalid fraction provided.
        fraction: f64,
    },

    #[error("no samples to train or score on")]
    EmptyDataset,

    #[error("samples have zero feature columns")]
    ZeroFeatures,

    /// Returned when features and labels disagree on the number of samples.
    #[error("got {n_features_rows} feature rows but {n_labels} labels")]
    LabelCountMismatch {
        /// Number of feature rows.
        n_features_rows: usize,
        /// Number of labels.
        n_labels: usize,
    },

    /// Returned when feature names disagree with the feature column count.
    #[error("got {n_names} feature names for {n_features} feature columns")]
    FeatureNameMismatch {
        /// Number of names supplied.
        n_names: usize,
        /// Number of feature columns in the data.
        n_features: usize,
    },

    /// Training rows are ragged.
    #[error("sample {sample_index} has {got} features, expected {expected}")]
    FeatureCountMismatch {
        expected: usize,
        got: usize,
        /// Zero-based row of the first ragged sample.
        sample_index: usize,
    },

    /// A prediction input is wider or narrower than the fitted model.
    #[error("prediction input has {got} features, model was fitted on {expected}")]
    PredictionFeatureMismatch { expected: usize, got: usize },

    /// NaN or infinity in the training matrix.
    #[error("non-finite value at sample {sample_index}, feature {feature_index}")]
    NonFiniteValue {
        sample_index: usize,
        feature_index: usize,
    },

    /// Returned when every label belongs to the same class.
    #[error("labels contain only the {} class; a binary classifier needs both", class_name(.positive))]
    SingleClass {
        /// Which class all labels belong to.
        positive: bool,
    },

    /// Returned when a class is too small to appear on both sides of a split.
    #[error("{} class has only {count} sample(s), need at least 2 for a stratified split", class_name(.positive))]
    TooFewSamplesForSplit {
        /// Which class is too small.
        positive: bool,
        /// The number of samples belonging to that class.
        count: usize,
    },

    #[error("failed to encode model")]
    SerializeModel { source: Box<bincode::ErrorKind> },

    /// The model file is truncated or not a forest.
    #[error("failed to decode model from {path}")]
    DeserializeModel {
        path: PathBuf,
        source: Box<bincode::ErrorKind>,
    },

    #[error("failed to write model to {path}")]
    WriteModel {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to read model from {path}")]
    ReadModel {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The model file was written by a different format version.
    #[error("model file {path} has format version {found}, this build reads {expected}")]
    IncompatibleModelVersion {
        expected: u32,
        found: u32,
        path: PathBuf,
    },
}

fn class_name(positive: &bool) -> &'static str {
    if *positive { "positive" } else { "negative" }
}
