//! Store-listing data for steamhit: CSV loading, hit labels, feature
//! projection and the on-disk model artifact pair.

mod artifact;
mod domain;
mod error;
mod features;
mod label;
mod reader;
mod training_set;

pub use artifact::{ArtifactStore, FEATURES_FILE, MODEL_FILE, ModelArtifact};
pub use domain::{Dataset, GameRecord};
pub use error::{ArtifactError, DataError, RecordError};
pub use features::{Feature, FeatureSelector, FeatureVector, STANDARD_FEATURES};
pub use label::{DEFAULT_MIN_POSITIVE_RATIO, DEFAULT_MIN_USER_REVIEWS, HitRule};
pub use reader::{DatasetReader, REQUIRED_COLUMNS};
pub use training_set::TrainingSet;
