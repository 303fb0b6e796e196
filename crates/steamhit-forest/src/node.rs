use std::fmt;

/// Zero-based feature column index.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
    serde::Serialize, serde::Deserialize,
)]
pub struct FeatureIndex(usize);

impl FeatureIndex {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    /// Return the zero-based feature column index.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for FeatureIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Position of a node inside a tree's node arena.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
    serde::Serialize, serde::Deserialize,
)]
pub struct NodeIndex(usize);

impl NodeIndex {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    /// Return the zero-based arena index.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Per-class sample counts for a binary node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClassCounts {
    /// Samples labelled `false`.
    pub negative: usize,
    /// Samples labelled `true`.
    pub positive: usize,
}

impl ClassCounts {
    /// Count the classes of the labels addressed by `indices`.
    #[must_use]
    pub fn tally(labels: &[bool], indices: &[usize]) -> Self {
        let positive = indices.iter().filter(|&&i| labels[i]).count();
        Self {
            negative: indices.len() - positive,
            positive,
        }
    }

    /// Total number of samples.
    #[must_use]
    pub fn total(self) -> usize {
        self.negative + self.positive
    }

    /// Fraction of samples in the positive class; 0.0 for an empty node.
    #[must_use]
    pub fn positive_fraction(self) -> f64 {
        match self.total() {
            0 => 0.0,
            n => self.positive as f64 / n as f64,
        }
    }

    /// Move one sample of the given class from `self` into `other`.
    pub(crate) fn transfer(&mut self, other: &mut Self, positive: bool) {
        if positive {
            self.positive -= 1;
            other.positive += 1;
        } else {
            self.negative -= 1;
            other.negative += 1;
        }
    }
}

/// Criterion-agnostic impurity value (Gini or Entropy).
#[derive(
    Debug, Clone, Copy, PartialEq, PartialOrd,
    serde::Serialize, serde::Deserialize,
)]
pub struct Impurity(f64);

impl Impurity {
    pub(crate) fn new(value: f64) -> Self {
        Self(value)
    }

    /// Return the raw impurity value.
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }
}

impl fmt::Display for Impurity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}", self.0)
    }
}

/// A node in a decision tree arena.
///
/// Children are addressed by [`NodeIndex`], so a tree is a flat `Vec<Node>`
/// with the root at index 0.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub enum Node {
    /// An interior split node.
    Split {
        /// Feature used for the split.
        feature: FeatureIndex,
        /// Samples with `feature <= threshold` go left.
        threshold: f64,
        /// Index of the left child node.
        left: NodeIndex,
        /// Index of the right child node.
        right: NodeIndex,
        /// Weighted decrease in impurity from this split.
        impurity_decrease: f64,
        /// Number of training samples that reached this node.
        n_samples: usize,
    },
    /// A terminal leaf node.
    Leaf {
        /// Fraction of training samples in this leaf that were positive.
        positive_fraction: f64,
        /// Impurity at this leaf.
        impurity: Impurity,
        /// Number of training samples in this leaf.
        n_samples: usize,
    },
}

impl Node {
    /// Return the number of training samples that reached this node.
    #[must_use]
    pub fn n_samples(&self) -> usize {
        match self {
            Node::Split { n_samples, .. } | Node::Leaf { n_samples, .. } => *n_samples,
        }
    }

    /// Return `true` if this node is a leaf.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tally_counts_only_addressed_samples() {
        let labels = [true, false, true, true, false];
        let counts = ClassCounts::tally(&labels, &[0, 1, 4]);
        assert_eq!(counts, ClassCounts { negative: 2, positive: 1 });
        assert_eq!(counts.total(), 3);
    }

    #[test]
    fn positive_fraction_of_empty_node_is_zero() {
        assert_eq!(ClassCounts::default().positive_fraction(), 0.0);
    }

    #[test]
    fn transfer_moves_one_sample() {
        let mut right = ClassCounts { negative: 2, positive: 2 };
        let mut left = ClassCounts::default();
        right.transfer(&mut left, true);
        assert_eq!(right, ClassCounts { negative: 2, positive: 1 });
        assert_eq!(left, ClassCounts { negative: 0, positive: 1 });
    }

    #[test]
    fn node_accessors() {
        let leaf = Node::Leaf {
            positive_fraction: 0.25,
            impurity: Impurity::new(0.375),
            n_samples: 4,
        };
        assert!(leaf.is_leaf());
        assert_eq!(leaf.n_samples(), 4);

        let split = Node::Split {
            feature: FeatureIndex::new(1),
            threshold: 0.5,
            left: NodeIndex::new(1),
            right: NodeIndex::new(2),
            impurity_decrease: 1.0,
            n_samples: 8,
        };
        assert!(!split.is_leaf());
        assert_eq!(split.n_samples(), 8);
    }

    #[test]
    fn impurity_display_six_decimals() {
        assert_eq!(Impurity::new(0.5).to_string(), "0.500000");
    }
}
