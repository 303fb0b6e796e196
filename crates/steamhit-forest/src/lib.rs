//! Binary Random Forest classification: train, hold-out evaluate, predict, persist.
//!
//! CART trees over dense `f64` features with Gini/Entropy splits, bootstrap
//! aggregation trained in parallel via rayon, stratified hold-out scoring,
//! MDI feature importance, and bincode model files.

mod config;
mod confusion;
mod error;
mod forest;
mod holdout;
mod importance;
mod node;
mod predict;
mod result;
mod serialize;
mod split;
mod tree;

pub use config::{DEFAULT_N_TREES, MaxFeatures, RandomForestConfig};
pub use confusion::{ClassMetrics, ClassificationReport, ConfusionMatrix};
pub use error::ForestError;
pub use forest::RandomForest;
pub use holdout::{DEFAULT_TEST_FRACTION, HoldoutResult, HoldoutSplit, SplitIndices, TreeHoldoutResult};
pub use importance::RankedFeature;
pub use node::{ClassCounts, FeatureIndex, Impurity, Node, NodeIndex};
pub use result::{RandomForestResult, TrainingMetadata};
pub use split::SplitCriterion;
pub use tree::{DecisionTree, DecisionTreeConfig};
