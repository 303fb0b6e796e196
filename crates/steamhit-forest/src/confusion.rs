//! Binary confusion matrix and a per-class classification report.

use std::fmt;

use crate::error::ForestError;

/// Counts of a binary classifier's outcomes on a labelled set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct ConfusionMatrix {
    /// Negative samples predicted negative.
    pub true_negative: usize,
    /// Negative samples predicted positive.
    pub false_positive: usize,
    /// Positive samples predicted negative.
    pub false_negative: usize,
    /// Positive samples predicted positive.
    pub true_positive: usize,
}

/// Precision, recall and F1 for one class.
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct ClassMetrics {
    /// Which class these metrics describe.
    pub positive: bool,
    /// TP / (TP + FP); 0.0 when the class was never predicted.
    pub precision: f64,
    /// TP / (TP + FN); 0.0 when the class has no samples.
    pub recall: f64,
    /// Harmonic mean of precision and recall; 0.0 when both are zero.
    pub f1: f64,
    /// Number of true samples in this class.
    pub support: usize,
}

impl ConfusionMatrix {
    /// Tally true against predicted labels.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`ForestError::EmptyDataset`] | zero labels |
    /// | [`ForestError::LabelCountMismatch`] | slices differ in length |
    pub fn from_labels(truth: &[bool], predicted: &[bool]) -> Result<Self, ForestError> {
        if truth.is_empty() {
            return Err(ForestError::EmptyDataset);
        }
        if truth.len() != predicted.len() {
            return Err(ForestError::LabelCountMismatch {
                n_features_rows: predicted.len(),
                n_labels: truth.len(),
            });
        }
        let mut cm = Self {
            true_negative: 0,
            false_positive: 0,
            false_negative: 0,
            true_positive: 0,
        };
        for (&t, &p) in truth.iter().zip(predicted) {
            match (t, p) {
                (false, false) => cm.true_negative += 1,
                (false, true) => cm.false_positive += 1,
                (true, false) => cm.false_negative += 1,
                (true, true) => cm.true_positive += 1,
            }
        }
        Ok(cm)
    }

    /// Total number of samples.
    #[must_use]
    pub fn total(&self) -> usize {
        self.true_negative + self.false_positive + self.false_negative + self.true_positive
    }

    /// Proportion of correct predictions.
    #[must_use]
    pub fn accuracy(&self) -> f64 {
        match self.total() {
            0 => 0.0,
            n => (self.true_negative + self.true_positive) as f64 / n as f64,
        }
    }

    /// Metrics for the negative class, then the positive class.
    #[must_use]
    pub fn class_metrics(&self) -> [ClassMetrics; 2] {
        [
            metrics(false, self.true_negative, self.false_negative, self.false_positive),
            metrics(true, self.true_positive, self.false_positive, self.false_negative),
        ]
    }

    /// Unweighted mean of the two classes' precision, recall and F1.
    #[must_use]
    pub fn macro_average(&self) -> (f64, f64, f64) {
        let [n, p] = self.class_metrics();
        (
            (n.precision + p.precision) / 2.0,
            (n.recall + p.recall) / 2.0,
            (n.f1 + p.f1) / 2.0,
        )
    }

    /// Support-weighted mean of the two classes' precision, recall and F1.
    #[must_use]
    pub fn weighted_average(&self) -> (f64, f64, f64) {
        let total = self.total() as f64;
        if total == 0.0 {
            return (0.0, 0.0, 0.0);
        }
        let [n, p] = self.class_metrics();
        let wn = n.support as f64 / total;
        let wp = p.support as f64 / total;
        (
            n.precision * wn + p.precision * wp,
            n.recall * wn + p.recall * wp,
            n.f1 * wn + p.f1 * wp,
        )
    }

    /// A printable per-class report with the given class names.
    #[must_use]
    pub fn report<'a>(&'a self, negative_name: &'a str, positive_name: &'a str) -> ClassificationReport<'a> {
        ClassificationReport {
            matrix: self,
            names: [negative_name, positive_name],
        }
    }
}

fn metrics(positive: bool, tp: usize, fp: usize, fn_: usize) -> ClassMetrics {
    let ratio = |num: usize, den: usize| if den == 0 { 0.0 } else { num as f64 / den as f64 };
    let precision = ratio(tp, tp + fp);
    let recall = ratio(tp, tp + fn_);
    let f1 = if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    };
    ClassMetrics {
        positive,
        precision,
        recall,
        f1,
        support: tp + fn_,
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:>10} {:>8} {:>8}", "", "pred_0", "pred_1")?;
        writeln!(f, "{:>10} {:>8} {:>8}", "true_0", self.true_negative, self.false_positive)?;
        writeln!(f, "{:>10} {:>8} {:>8}", "true_1", self.false_negative, self.true_positive)
    }
}

/// Precision/recall/F1 table, laid out one row per class plus averages.
pub struct ClassificationReport<'a> {
    matrix: &'a ConfusionMatrix,
    names: [&'a str; 2],
}

impl fmt::Display for ClassificationReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self.names.iter().map(|n| n.len()).max().unwrap_or(0).max(12);
        writeln!(
            f,
            "{:>width$} {:>9} {:>9} {:>9} {:>9}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        writeln!(f)?;
        for (name, m) in self.names.iter().zip(self.matrix.class_metrics()) {
            writeln!(
                f,
                "{name:>width$} {:>9.2} {:>9.2} {:>9.2} {:>9}",
                m.precision, m.recall, m.f1, m.support
            )?;
        }
        writeln!(f)?;
        let total = self.matrix.total();
        writeln!(
            f,
            "{:>width$} {:>9} {:>9} {:>9.2} {:>9}",
            "accuracy", "", "", self.matrix.accuracy(), total
        )?;
        let (p, r, f1) = self.matrix.macro_average();
        writeln!(f, "{:>width$} {p:>9.2} {r:>9.2} {f1:>9.2} {total:>9}", "macro avg")?;
        let (p, r, f1) = self.matrix.weighted_average();
        writeln!(f, "{:>width$} {p:>9.2} {r:>9.2} {f1:>9.2} {total:>9}", "weighted avg")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ConfusionMatrix {
        // 6 negatives (5 right), 4 positives (3 right)
        let truth = [false, false, false, false, false, false, true, true, true, true];
        let pred = [false, false, false, false, false, true, true, true, true, false];
        ConfusionMatrix::from_labels(&truth, &pred).unwrap()
    }

    #[test]
    fn counts_and_accuracy() {
        let cm = sample();
        assert_eq!(
            cm,
            ConfusionMatrix {
                true_negative: 5,
                false_positive: 1,
                false_negative: 1,
                true_positive: 3,
            }
        );
        assert!((cm.accuracy() - 0.8).abs() < 1e-12);
    }

    #[test]
    fn per_class_metrics() {
        let [neg, pos] = sample().class_metrics();
        assert!((neg.precision - 5.0 / 6.0).abs() < 1e-12);
        assert!((neg.recall - 5.0 / 6.0).abs() < 1e-12);
        assert_eq!(neg.support, 6);
        assert!((pos.precision - 0.75).abs() < 1e-12);
        assert!((pos.recall - 0.75).abs() < 1e-12);
        assert!((pos.f1 - 0.75).abs() < 1e-12);
        assert_eq!(pos.support, 4);
    }

    #[test]
    fn weighted_average_uses_support() {
        let (p, _, _) = sample().weighted_average();
        let expected = 5.0 / 6.0 * 0.6 + 0.75 * 0.4;
        assert!((p - expected).abs() < 1e-12);
    }

    #[test]
    fn never_predicted_class_has_zero_precision() {
        let cm = ConfusionMatrix::from_labels(&[false, true], &[false, false]).unwrap();
        let [_, pos] = cm.class_metrics();
        assert_eq!(pos.precision, 0.0);
        assert_eq!(pos.f1, 0.0);
    }

    #[test]
    fn empty_and_mismatched_inputs_rejected() {
        assert!(matches!(
            ConfusionMatrix::from_labels(&[], &[]),
            Err(ForestError::EmptyDataset)
        ));
        assert!(matches!(
            ConfusionMatrix::from_labels(&[true], &[true, false]),
            Err(ForestError::LabelCountMismatch { .. })
        ));
    }

    #[test]
    fn report_lists_both_classes() {
        let cm = sample();
        let text = cm.report("niche", "hit").to_string();
        assert!(text.contains("niche"));
        assert!(text.contains("hit"));
        assert!(text.contains("weighted avg"));
        assert!(cm.to_string().contains("true_1"));
    }
}
