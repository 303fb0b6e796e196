//! Stratified train/test hold-out evaluation.

use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use tracing::{info, instrument};

use crate::config::RandomForestConfig;
use crate::confusion::ConfusionMatrix;
use crate::error::ForestError;
use crate::forest::RandomForest;
use crate::importance::RankedFeature;
use crate::tree::{DecisionTree, DecisionTreeConfig};

/// Fraction of samples held out for testing when none is given.
pub const DEFAULT_TEST_FRACTION: f64 = 0.2;

/// Stratified hold-out configuration.
///
/// Construct via [`HoldoutSplit::new`], then chain `with_seed` if desired.
#[derive(Debug, Clone)]
pub struct HoldoutSplit {
    test_fraction: f64,
    seed: u64,
}

/// Row indices on each side of a split, both in ascending order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitIndices {
    /// Rows used for fitting.
    pub train: Vec<usize>,
    /// Rows held out for scoring.
    pub test: Vec<usize>,
}

/// Outcome of fitting a forest on the train side and scoring the test side.
#[derive(Debug)]
pub struct HoldoutResult {
    /// The forest fitted on the train rows.
    pub forest: RandomForest,
    /// Accuracy on the held-out rows.
    pub accuracy: f64,
    /// Confusion matrix on the held-out rows.
    pub confusion: ConfusionMatrix,
    /// Ranked feature importances of the fitted forest.
    pub importances: Vec<RankedFeature>,
    /// Which rows went where.
    pub split: SplitIndices,
    /// Held-out predictions, parallel to `split.test`.
    pub test_predictions: Vec<bool>,
}

/// Outcome of the single decision-tree baseline.
#[derive(Debug)]
pub struct TreeHoldoutResult {
    /// The tree fitted on the train rows.
    pub tree: DecisionTree,
    /// Accuracy on the held-out rows.
    pub accuracy: f64,
    /// Confusion matrix on the held-out rows.
    pub confusion: ConfusionMatrix,
    /// Which rows went where.
    pub split: SplitIndices,
}

impl HoldoutSplit {
    /// Create a split holding out `test_fraction` of every class.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::InvalidTestFraction`] unless `0 < test_fraction < 1`.
    pub fn new(test_fraction: f64) -> Result<Self, ForestError> {
        if !(test_fraction > 0.0 && test_fraction < 1.0) {
            return Err(ForestError::InvalidTestFraction {
                fraction: test_fraction,
            });
        }
        Ok(Self {
            test_fraction,
            seed: 42,
        })
    }

    /// Set the random seed for row shuffling.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Return the held-out fraction.
    #[must_use]
    pub fn test_fraction(&self) -> f64 {
        self.test_fraction
    }

    /// Partition row indices, stratified by label.
    ///
    /// Each class is shuffled independently and contributes
    /// `round(count * test_fraction)` rows to the test side, clamped so that
    /// both sides keep at least one row of every class.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`ForestError::EmptyDataset`] | zero labels |
    /// | [`ForestError::SingleClass`] | all labels are equal |
    /// | [`ForestError::TooFewSamplesForSplit`] | a class has exactly one row |
    pub fn split(&self, labels: &[bool]) -> Result<SplitIndices, ForestError> {
        if labels.is_empty() {
            return Err(ForestError::EmptyDataset);
        }
        let (mut positives, mut negatives): (Vec<usize>, Vec<usize>) =
            (0..labels.len()).partition(|&i| labels[i]);

        if positives.is_empty() || negatives.is_empty() {
            return Err(ForestError::SingleClass {
                positive: !positives.is_empty(),
            });
        }
        for (positive, class) in [(false, &negatives), (true, &positives)] {
            if class.len() < 2 {
                return Err(ForestError::TooFewSamplesForSplit {
                    positive,
                    count: class.len(),
                });
            }
        }

        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let mut train = Vec::with_capacity(labels.len());
        let mut test = Vec::new();
        for class in [&mut negatives, &mut positives] {
            class.shuffle(&mut rng);
            let n_test = ((class.len() as f64 * self.test_fraction).round() as usize)
                .clamp(1, class.len() - 1);
            test.extend_from_slice(&class[..n_test]);
            train.extend_from_slice(&class[n_test..]);
        }
        train.sort_unstable();
        test.sort_unstable();

        Ok(SplitIndices { train, test })
    }

    /// Fit a forest on the train rows and score it on the test rows.
    ///
    /// # Errors
    ///
    /// Any error from [`HoldoutSplit::split`] or from forest training.
    #[instrument(skip_all, fields(n_samples = features.len(), test_fraction = self.test_fraction))]
    pub fn evaluate(
        &self,
        config: &RandomForestConfig,
        features: &[Vec<f64>],
        labels: &[bool],
        feature_names: &[String],
    ) -> Result<HoldoutResult, ForestError> {
        check_lengths(features, labels)?;
        let split = self.split(labels)?;
        let (train_x, train_y) = gather(features, labels, &split.train);
        let (test_x, test_y) = gather(features, labels, &split.test);

        let fitted = config.fit(&train_x, &train_y, feature_names)?;
        let test_predictions = fitted.forest().predict_batch(&test_x)?;
        let confusion = ConfusionMatrix::from_labels(&test_y, &test_predictions)?;
        let accuracy = confusion.accuracy();

        info!(
            n_train = split.train.len(),
            n_test = split.test.len(),
            accuracy,
            "hold-out evaluation complete"
        );

        let importances = fitted.importances().to_vec();
        Ok(HoldoutResult {
            forest: fitted.into_forest(),
            accuracy,
            confusion,
            importances,
            split,
            test_predictions,
        })
    }

    /// Fit a single decision tree on the train rows and score it on the test rows.
    ///
    /// # Errors
    ///
    /// Any error from [`HoldoutSplit::split`] or from tree training.
    #[instrument(skip_all, fields(n_samples = features.len(), test_fraction = self.test_fraction))]
    pub fn evaluate_tree(
        &self,
        config: &DecisionTreeConfig,
        features: &[Vec<f64>],
        labels: &[bool],
    ) -> Result<TreeHoldoutResult, ForestError> {
        check_lengths(features, labels)?;
        let split = self.split(labels)?;
        let (train_x, train_y) = gather(features, labels, &split.train);
        let (test_x, test_y) = gather(features, labels, &split.test);

        let tree = config.fit(&train_x, &train_y)?;
        let predictions = test_x
            .iter()
            .map(|sample| tree.predict(sample))
            .collect::<Result<Vec<_>, _>>()?;
        let confusion = ConfusionMatrix::from_labels(&test_y, &predictions)?;
        let accuracy = confusion.accuracy();

        info!(accuracy, depth = tree.depth(), "baseline tree evaluated");

        Ok(TreeHoldoutResult {
            tree,
            accuracy,
            confusion,
            split,
        })
    }
}

impl Default for HoldoutSplit {
    fn default() -> Self {
        Self {
            test_fraction: DEFAULT_TEST_FRACTION,
            seed: 42,
        }
    }
}

fn check_lengths(features: &[Vec<f64>], labels: &[bool]) -> Result<(), ForestError> {
    if features.len() != labels.len() {
        return Err(ForestError::LabelCountMismatch {
            n_features_rows: features.len(),
            n_labels: labels.len(),
        });
    }
    Ok(())
}

fn gather(features: &[Vec<f64>], labels: &[bool], rows: &[usize]) -> (Vec<Vec<f64>>, Vec<bool>) {
    rows.iter()
        .map(|&i| (features[i].clone(), labels[i]))
        .unzip()
}
