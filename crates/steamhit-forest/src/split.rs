use rand::Rng;

use crate::node::{ClassCounts, FeatureIndex, Impurity};

/// Criterion for measuring the quality of a split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum SplitCriterion {
    /// Gini impurity: `1 - p² - (1-p)²`
    Gini,
    /// Information entropy: `-p·ln(p) - (1-p)·ln(1-p)`
    Entropy,
}

impl SplitCriterion {
    /// Compute the impurity of a binary node from its class counts.
    ///
    /// An empty node is pure.
    #[must_use]
    pub fn impurity(&self, counts: ClassCounts) -> Impurity {
        if counts.total() == 0 {
            return Impurity::new(0.0);
        }
        let p = counts.positive_fraction();
        let q = 1.0 - p;
        let value = match self {
            SplitCriterion::Gini => 1.0 - p * p - q * q,
            SplitCriterion::Entropy => {
                [p, q]
                    .into_iter()
                    .filter(|&x| x > 0.0)
                    .map(|x| -x * x.ln())
                    .sum::<f64>()
            }
        };
        Impurity::new(value)
    }
}

/// Best split found for a node.
#[derive(Debug, Clone)]
pub(crate) struct SplitResult {
    pub(crate) feature: FeatureIndex,
    pub(crate) threshold: f64,
    /// `n·I(parent) - n_l·I(left) - n_r·I(right)`, the unnormalised MDI term.
    pub(crate) impurity_decrease: f64,
    pub(crate) left_indices: Vec<usize>,
    pub(crate) right_indices: Vec<usize>,
}

/// Find the best threshold split over a random subset of `max_features` features.
///
/// `columns` is column-major: `columns[feature][sample]`. Only the samples in
/// `sample_indices` are considered. Returns `None` when every candidate
/// feature is constant over the node or every boundary would leave a child
/// smaller than `min_samples_leaf`.
#[allow(clippy::too_many_arguments)]
pub(crate) fn find_best_split(
    columns: &[Vec<f64>],
    labels: &[bool],
    sample_indices: &[usize],
    parent: ClassCounts,
    criterion: SplitCriterion,
    max_features: usize,
    min_samples_leaf: usize,
    rng: &mut impl Rng,
) -> Option<SplitResult> {
    let n_features = columns.len();
    let n_samples = sample_indices.len();
    if n_samples < 2 || n_features == 0 {
        return None;
    }
    let parent_weighted = n_samples as f64 * criterion.impurity(parent).value();

    // Partial Fisher-Yates over the feature indices.
    let mut order: Vec<usize> = (0..n_features).collect();
    let take = max_features.min(n_features);
    for i in 0..take {
        let j = rng.gen_range(i..n_features);
        order.swap(i, j);
    }

    let mut best_decrease = f64::NEG_INFINITY;
    let mut best: Option<(usize, f64)> = None;
    let mut sorted: Vec<(f64, bool)> = Vec::with_capacity(n_samples);

    for &feature in &order[..take] {
        let column = &columns[feature];
        sorted.clear();
        sorted.extend(sample_indices.iter().map(|&si| (column[si], labels[si])));
        sorted.sort_unstable_by(|a, b| a.0.total_cmp(&b.0));

        let mut left = ClassCounts::default();
        let mut right = parent;

        for i in 0..n_samples - 1 {
            let (value, positive) = sorted[i];
            right.transfer(&mut left, positive);

            let next = sorted[i + 1].0;
            if value == next {
                continue;
            }
            let n_left = i + 1;
            let n_right = n_samples - n_left;
            if n_left < min_samples_leaf || n_right < min_samples_leaf {
                continue;
            }

            let decrease = parent_weighted
                - n_left as f64 * criterion.impurity(left).value()
                - n_right as f64 * criterion.impurity(right).value();
            if decrease > best_decrease {
                best_decrease = decrease;
                let mut threshold = value + (next - value) / 2.0;
                // Adjacent floats can round the midpoint up onto `next`.
                if threshold >= next {
                    threshold = value;
                }
                best = Some((feature, threshold));
            }
        }
    }

    let (feature, threshold) = best?;
    let column = &columns[feature];
    let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = sample_indices
        .iter()
        .partition(|&&si| column[si] <= threshold);

    Some(SplitResult {
        feature: FeatureIndex::new(feature),
        threshold,
        impurity_decrease: best_decrease,
        left_indices,
        right_indices,
    })
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    fn counts(negative: usize, positive: usize) -> ClassCounts {
        ClassCounts { negative, positive }
    }

    #[test]
    fn gini_pure_and_balanced() {
        assert_eq!(SplitCriterion::Gini.impurity(counts(10, 0)).value(), 0.0);
        assert!((SplitCriterion::Gini.impurity(counts(5, 5)).value() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn entropy_balanced_is_ln2() {
        let imp = SplitCriterion::Entropy.impurity(counts(5, 5));
        assert!((imp.value() - 2.0_f64.ln()).abs() < 1e-12);
        assert_eq!(SplitCriterion::Entropy.impurity(counts(0, 7)).value(), 0.0);
    }

    #[test]
    fn separable_column_splits_between_groups() {
        let columns = vec![vec![1.0, 2.0, 3.0, 10.0, 11.0, 12.0]];
        let labels = [false, false, false, true, true, true];
        let indices: Vec<usize> = (0..6).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        let split = find_best_split(
            &columns,
            &labels,
            &indices,
            ClassCounts::tally(&labels, &indices),
            SplitCriterion::Gini,
            1,
            1,
            &mut rng,
        )
        .expect("should find a split");

        assert_eq!(split.feature.index(), 0);
        assert!(split.threshold > 3.0 && split.threshold < 10.0);
        assert_eq!(split.left_indices, vec![0, 1, 2]);
        assert_eq!(split.right_indices, vec![3, 4, 5]);
        assert!((split.impurity_decrease - 3.0).abs() < 1e-12);
    }

    #[test]
    fn constant_column_has_no_split() {
        let columns = vec![vec![5.0; 4]];
        let labels = [false, false, true, true];
        let indices: Vec<usize> = (0..4).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let split = find_best_split(
            &columns,
            &labels,
            &indices,
            ClassCounts::tally(&labels, &indices),
            SplitCriterion::Gini,
            1,
            1,
            &mut rng,
        );
        assert!(split.is_none());
    }

    #[test]
    fn min_samples_leaf_blocks_small_children() {
        let columns = vec![vec![1.0, 10.0]];
        let labels = [false, true];
        let indices = [0, 1];
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let split = find_best_split(
            &columns,
            &labels,
            &indices,
            ClassCounts::tally(&labels, &indices),
            SplitCriterion::Gini,
            1,
            2,
            &mut rng,
        );
        assert!(split.is_none());
    }
}
