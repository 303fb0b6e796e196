use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, instrument};

use crate::{
    ForestError,
    node::{ClassCounts, Node, NodeIndex},
    split::{SplitCriterion, find_best_split},
};

/// Configuration for a single CART decision tree.
///
/// Construct via [`DecisionTreeConfig::new`], then chain `with_*` methods.
///
/// # Defaults
///
/// | Parameter           | Default               |
/// |---------------------|-----------------------|
/// | `criterion`         | `Gini`                |
/// | `max_depth`         | `None` (unlimited)    |
/// | `min_samples_split` | 2                     |
/// | `min_samples_leaf`  | 1                     |
/// | `max_features`      | `None` (all features) |
/// | `seed`              | 42                    |
#[derive(Debug, Clone)]
pub struct DecisionTreeConfig {
    pub(crate) criterion: SplitCriterion,
    pub(crate) max_depth: Option<usize>,
    pub(crate) min_samples_split: usize,
    pub(crate) min_samples_leaf: usize,
    pub(crate) max_features: Option<usize>,
    pub(crate) seed: u64,
}

impl DecisionTreeConfig {
    /// Create a new config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            criterion: SplitCriterion::Gini,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            seed: 42,
        }
    }

    /// Set the split quality criterion.
    #[must_use]
    pub fn with_criterion(mut self, criterion: SplitCriterion) -> Self {
        self.criterion = criterion;
        self
    }

    /// Set the maximum tree depth (root is depth 0). `None` means unlimited.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the minimum number of samples required to attempt a split.
    #[must_use]
    pub fn with_min_samples_split(mut self, min_samples_split: usize) -> Self {
        self.min_samples_split = min_samples_split;
        self
    }

    /// Set the minimum number of samples required in each leaf after a split.
    #[must_use]
    pub fn with_min_samples_leaf(mut self, min_samples_leaf: usize) -> Self {
        self.min_samples_leaf = min_samples_leaf;
        self
    }

    /// Set how many randomly chosen features are examined per split.
    #[must_use]
    pub fn with_max_features(mut self, max_features: Option<usize>) -> Self {
        self.max_features = max_features;
        self
    }

    /// Set the random seed for reproducibility.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Return the random seed.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Train a decision tree on a row-major dataset.
    ///
    /// `features[sample][feature]`, with `labels[sample]` marking the positive class.
    ///
    /// # Errors
    ///
    /// | Variant                                  | When                                        |
    /// |------------------------------------------|---------------------------------------------|
    /// | [`ForestError::EmptyDataset`]            | `features` is empty                         |
    /// | [`ForestError::ZeroFeatures`]            | rows have zero feature columns              |
    /// | [`ForestError::LabelCountMismatch`]      | `labels.len() != features.len()`            |
    /// | [`ForestError::FeatureCountMismatch`]    | rows have inconsistent lengths              |
    /// | [`ForestError::NonFiniteValue`]          | any value is NaN or infinite                |
    /// | [`ForestError::InvalidMaxFeatures`]      | `max_features` outside [1, n_features]      |
    /// | [`ForestError::InvalidMaxDepth`]         | `max_depth` is `Some(0)`                    |
    /// | [`ForestError::InvalidMinSamplesSplit`]  | `min_samples_split` < 2                     |
    /// | [`ForestError::InvalidMinSamplesLeaf`]   | `min_samples_leaf` < 1                      |
    #[instrument(skip(self, features, labels), fields(n_samples = features.len()))]
    pub fn fit(&self, features: &[Vec<f64>], labels: &[bool]) -> Result<DecisionTree, ForestError> {
        let n_features = validate_training_data(features, labels)?;
        self.validate(n_features)?;
        let indices: Vec<usize> = (0..features.len()).collect();
        Ok(self.fit_validated(&to_columns(features, n_features), labels, &indices))
    }

    pub(crate) fn validate(&self, n_features: usize) -> Result<(), ForestError> {
        if self.max_depth == Some(0) {
            return Err(ForestError::InvalidMaxDepth { max_depth: 0 });
        }
        if self.min_samples_split < 2 {
            return Err(ForestError::InvalidMinSamplesSplit {
                min_samples_split: self.min_samples_split,
            });
        }
        if self.min_samples_leaf < 1 {
            return Err(ForestError::InvalidMinSamplesLeaf {
                min_samples_leaf: self.min_samples_leaf,
            });
        }
        let max_features = self.max_features.unwrap_or(n_features);
        if max_features == 0 || max_features > n_features {
            return Err(ForestError::InvalidMaxFeatures {
                max_features,
                n_features,
            });
        }
        Ok(())
    }

    /// Grow a tree over `sample_indices` of pre-validated column-major data.
    ///
    /// Indices may repeat, which is how bootstrap samples are expressed.
    pub(crate) fn fit_validated(
        &self,
        columns: &[Vec<f64>],
        labels: &[bool],
        sample_indices: &[usize],
    ) -> DecisionTree {
        let n_features = columns.len();
        let mut builder = Builder {
            columns,
            labels,
            config: self,
            max_features: self.max_features.unwrap_or(n_features),
            rng: ChaCha8Rng::seed_from_u64(self.seed),
            arena: Vec::new(),
        };
        builder.grow(sample_indices, 0);

        debug!(n_nodes = builder.arena.len(), "decision tree built");

        DecisionTree {
            nodes: builder.arena,
            n_features,
        }
    }
}

impl Default for DecisionTreeConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Check shape and finiteness of a training set, returning the feature count.
pub(crate) fn validate_training_data(
    features: &[Vec<f64>],
    labels: &[bool],
) -> Result<usize, ForestError> {
    if features.is_empty() {
        return Err(ForestError::EmptyDataset);
    }
    if labels.len() != features.len() {
        return Err(ForestError::LabelCountMismatch {
            n_features_rows: features.len(),
            n_labels: labels.len(),
        });
    }
    let n_features = features[0].len();
    if n_features == 0 {
        return Err(ForestError::ZeroFeatures);
    }
    for (sample_index, row) in features.iter().enumerate() {
        if row.len() != n_features {
            return Err(ForestError::FeatureCountMismatch {
                expected: n_features,
                got: row.len(),
                sample_index,
            });
        }
        if let Some(feature_index) = row.iter().position(|v| !v.is_finite()) {
            return Err(ForestError::NonFiniteValue {
                sample_index,
                feature_index,
            });
        }
    }
    Ok(n_features)
}

/// Transpose row-major samples into one `Vec` per feature.
pub(crate) fn to_columns(features: &[Vec<f64>], n_features: usize) -> Vec<Vec<f64>> {
    (0..n_features)
        .map(|f| features.iter().map(|row| row[f]).collect())
        .collect()
}

struct Builder<'a> {
    columns: &'a [Vec<f64>],
    labels: &'a [bool],
    config: &'a DecisionTreeConfig,
    max_features: usize,
    rng: ChaCha8Rng,
    arena: Vec<Node>,
}

impl Builder<'_> {
    fn grow(&mut self, sample_indices: &[usize], depth: usize) -> NodeIndex {
        let counts = ClassCounts::tally(self.labels, sample_indices);
        let impurity = self.config.criterion.impurity(counts);
        let n_samples = sample_indices.len();

        let stop = n_samples < self.config.min_samples_split
            || impurity.value() == 0.0
            || self.config.max_depth.is_some_and(|d| depth >= d);

        let split = if stop {
            None
        } else {
            find_best_split(
                self.columns,
                self.labels,
                sample_indices,
                counts,
                self.config.criterion,
                self.max_features,
                self.config.min_samples_leaf,
                &mut self.rng,
            )
        };

        let node_idx = NodeIndex::new(self.arena.len());
        self.arena.push(Node::Leaf {
            positive_fraction: counts.positive_fraction(),
            impurity,
            n_samples,
        });

        // The leaf pushed above doubles as the placeholder a split overwrites.
        if let Some(split) = split {
            let left = self.grow(&split.left_indices, depth + 1);
            let right = self.grow(&split.right_indices, depth + 1);
            self.arena[node_idx.index()] = Node::Split {
                feature: split.feature,
                threshold: split.threshold,
                left,
                right,
                impurity_decrease: split.impurity_decrease,
                n_samples,
            };
        }
        node_idx
    }
}

/// A fitted binary CART decision tree.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct DecisionTree {
    pub(crate) nodes: Vec<Node>,
    pub(crate) n_features: usize,
}

impl DecisionTree {
    /// Predict whether a sample belongs to the positive class.
    ///
    /// Positive when the leaf's positive fraction exceeds one half.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::PredictionFeatureMismatch`] when `sample.len() != n_features`.
    pub fn predict(&self, sample: &[f64]) -> Result<bool, ForestError> {
        Ok(self.predict_proba(sample)? > 0.5)
    }

    /// Return the positive-class probability for a single sample.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::PredictionFeatureMismatch`] when `sample.len() != n_features`.
    pub fn predict_proba(&self, sample: &[f64]) -> Result<f64, ForestError> {
        if sample.len() != self.n_features {
            return Err(ForestError::PredictionFeatureMismatch {
                expected: self.n_features,
                got: sample.len(),
            });
        }
        Ok(self.leaf_fraction(sample))
    }

    pub(crate) fn leaf_fraction(&self, sample: &[f64]) -> f64 {
        let mut idx = 0usize;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { positive_fraction, .. } => return *positive_fraction,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    ..
                } => {
                    idx = if sample[feature.index()] <= *threshold {
                        left.index()
                    } else {
                        right.index()
                    };
                }
            }
        }
    }

    /// Mean Decrease in Impurity per feature, normalised to sum to 1.0.
    ///
    /// All zeros when the tree is a single leaf.
    #[must_use]
    pub fn feature_importances(&self) -> Vec<f64> {
        let mut totals = vec![0.0f64; self.n_features];
        for node in &self.nodes {
            if let Node::Split {
                feature,
                impurity_decrease,
                ..
            } = node
            {
                totals[feature.index()] += impurity_decrease;
            }
        }
        let sum: f64 = totals.iter().sum();
        if sum > 0.0 {
            totals.iter_mut().for_each(|v| *v /= sum);
        }
        totals
    }

    /// Return the number of features the tree was trained on.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Return the total number of nodes (splits and leaves).
    #[must_use]
    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Return the number of leaf nodes.
    #[must_use]
    pub fn n_leaves(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    /// Return the maximum depth; a lone root leaf has depth 0.
    #[must_use]
    pub fn depth(&self) -> usize {
        let mut max_depth = 0;
        let mut stack = vec![(0usize, 0usize)];
        while let Some((idx, d)) = stack.pop() {
            match &self.nodes[idx] {
                Node::Leaf { .. } => max_depth = max_depth.max(d),
                Node::Split { left, right, .. } => {
                    stack.push((left.index(), d + 1));
                    stack.push((right.index(), d + 1));
                }
            }
        }
        max_depth
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn separable() -> (Vec<Vec<f64>>, Vec<bool>) {
        let features = vec![
            vec![1.0, 0.0],
            vec![2.0, 0.0],
            vec![3.0, 0.0],
            vec![10.0, 0.0],
            vec![11.0, 0.0],
            vec![12.0, 0.0],
        ];
        let labels = vec![false, false, false, true, true, true];
        (features, labels)
    }

    fn xor() -> (Vec<Vec<f64>>, Vec<bool>) {
        let features = vec![
            vec![0.0, 0.0],
            vec![0.0, 1.0],
            vec![1.0, 0.0],
            vec![1.0, 1.0],
        ];
        (features, vec![false, true, true, false])
    }

    #[test]
    fn empty_dataset_error() {
        let err = DecisionTreeConfig::new().fit(&[], &[]).unwrap_err();
        assert!(matches!(err, ForestError::EmptyDataset));
    }

    #[test]
    fn pure_dataset_single_leaf() {
        let features = vec![vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]];
        let tree = DecisionTreeConfig::new()
            .fit(&features, &[true, true, true])
            .unwrap();
        assert_eq!(tree.n_nodes(), 1);
        assert_eq!(tree.depth(), 0);
        assert!(tree.predict(&[2.0, 3.0]).unwrap());
        assert_eq!(tree.feature_importances(), vec![0.0, 0.0]);
    }

    #[test]
    fn linearly_separable_correct_split() {
        let (features, labels) = separable();
        let tree = DecisionTreeConfig::new().fit(&features, &labels).unwrap();
        assert!(!tree.predict(&[2.0, 0.0]).unwrap());
        assert!(tree.predict(&[11.0, 0.0]).unwrap());
        assert_eq!(tree.n_leaves(), 2);
        assert_eq!(tree.feature_importances(), vec![1.0, 0.0]);
    }

    #[test]
    fn xor_needs_depth_two() {
        let (features, labels) = xor();
        let tree = DecisionTreeConfig::new().fit(&features, &labels).unwrap();
        assert!(tree.depth() >= 2);
        for (sample, &label) in features.iter().zip(&labels) {
            assert_eq!(tree.predict(sample).unwrap(), label);
        }
    }

    #[test]
    fn max_depth_limits_tree() {
        let (features, labels) = xor();
        let tree = DecisionTreeConfig::new()
            .with_max_depth(Some(1))
            .fit(&features, &labels)
            .unwrap();
        assert!(tree.depth() <= 1);
    }

    #[test]
    fn proba_is_leaf_positive_fraction() {
        // Identical features cannot be separated; the root leaf holds 1 of 4 positives.
        let features = vec![vec![1.0]; 4];
        let tree = DecisionTreeConfig::new()
            .fit(&features, &[true, false, false, false])
            .unwrap();
        assert!((tree.predict_proba(&[1.0]).unwrap() - 0.25).abs() < 1e-12);
        assert!(!tree.predict(&[1.0]).unwrap());
    }

    #[test]
    fn even_leaf_resolves_to_negative() {
        let features = vec![vec![1.0]; 2];
        let tree = DecisionTreeConfig::new()
            .fit(&features, &[true, false])
            .unwrap();
        assert!(!tree.predict(&[1.0]).unwrap());
    }

    #[test]
    fn prediction_feature_mismatch() {
        let (features, labels) = separable();
        let tree = DecisionTreeConfig::new().fit(&features, &labels).unwrap();
        let err = tree.predict(&[1.0]).unwrap_err();
        assert!(matches!(
            err,
            ForestError::PredictionFeatureMismatch { expected: 2, got: 1 }
        ));
    }

    #[test]
    fn label_count_mismatch_error() {
        let (features, _) = separable();
        let err = DecisionTreeConfig::new().fit(&features, &[true]).unwrap_err();
        assert!(matches!(err, ForestError::LabelCountMismatch { .. }));
    }

    #[test]
    fn inconsistent_rows_error() {
        let features = vec![vec![1.0, 2.0], vec![3.0]];
        let err = DecisionTreeConfig::new()
            .fit(&features, &[false, true])
            .unwrap_err();
        assert!(matches!(err, ForestError::FeatureCountMismatch { sample_index: 1, .. }));
    }

    #[test]
    fn non_finite_value_error() {
        let features = vec![vec![1.0, f64::NAN], vec![3.0, 4.0]];
        let err = DecisionTreeConfig::new()
            .fit(&features, &[false, true])
            .unwrap_err();
        assert!(matches!(
            err,
            ForestError::NonFiniteValue { sample_index: 0, feature_index: 1 }
        ));
    }

    #[test]
    fn invalid_config_errors() {
        let (features, labels) = separable();
        let err = DecisionTreeConfig::new()
            .with_max_depth(Some(0))
            .fit(&features, &labels)
            .unwrap_err();
        assert!(matches!(err, ForestError::InvalidMaxDepth { .. }));

        let err = DecisionTreeConfig::new()
            .with_max_features(Some(3))
            .fit(&features, &labels)
            .unwrap_err();
        assert!(matches!(
            err,
            ForestError::InvalidMaxFeatures { max_features: 3, n_features: 2 }
        ));
    }

    #[test]
    fn deterministic_with_same_seed() {
        let (features, labels) = xor();
        let config = DecisionTreeConfig::new().with_max_features(Some(1)).with_seed(7);
        let a = config.fit(&features, &labels).unwrap();
        let b = config.fit(&features, &labels).unwrap();
        for sample in &features {
            assert_eq!(a.predict_proba(sample).unwrap(), b.predict_proba(sample).unwrap());
        }
    }
}
