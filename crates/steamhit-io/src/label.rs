//! The hit-labelling rule.

use crate::domain::GameRecord;
use crate::error::RecordError;

/// Default minimum positive review percentage for a hit.
pub const DEFAULT_MIN_POSITIVE_RATIO: f64 = 85.0;

/// Default minimum number of user reviews for a hit.
pub const DEFAULT_MIN_USER_REVIEWS: u64 = 500;

/// Thresholds deciding whether a listing counts as a hit.
///
/// A record is a hit iff `positive_ratio >= min_positive_ratio` **and**
/// `user_reviews >= min_user_reviews`. Both bounds are inclusive.
///
/// # Example
///
/// ```
/// use steamhit_io::HitRule;
///
/// let rule = HitRule::default();
/// assert!(rule.is_hit(92.0, 1200));
/// assert!(!rule.is_hit(70.0, 10_000));
/// assert!(!rule.is_hit(90.0, 100));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitRule {
    min_positive_ratio: f64,
    min_user_reviews: u64,
}

impl Default for HitRule {
    fn default() -> Self {
        Self {
            min_positive_ratio: DEFAULT_MIN_POSITIVE_RATIO,
            min_user_reviews: DEFAULT_MIN_USER_REVIEWS,
        }
    }
}

impl HitRule {
    /// Rule with explicit thresholds.
    #[must_use]
    pub fn new(min_positive_ratio: f64, min_user_reviews: u64) -> Self {
        Self {
            min_positive_ratio,
            min_user_reviews,
        }
    }

    /// Set the positive ratio threshold.
    #[must_use]
    pub fn with_min_positive_ratio(mut self, ratio: f64) -> Self {
        self.min_positive_ratio = ratio;
        self
    }

    /// Set the review count threshold.
    #[must_use]
    pub fn with_min_user_reviews(mut self, reviews: u64) -> Self {
        self.min_user_reviews = reviews;
        self
    }

    /// Positive ratio threshold.
    #[must_use]
    pub fn min_positive_ratio(&self) -> f64 {
        self.min_positive_ratio
    }

    /// Review count threshold.
    #[must_use]
    pub fn min_user_reviews(&self) -> u64 {
        self.min_user_reviews
    }

    /// Apply the rule to raw values.
    #[must_use]
    pub fn is_hit(&self, positive_ratio: f64, user_reviews: u64) -> bool {
        positive_ratio >= self.min_positive_ratio && user_reviews >= self.min_user_reviews
    }

    /// Derive the label for one record.
    ///
    /// # Errors
    ///
    /// [`RecordError::MissingField`] when `positive_ratio` or `user_reviews`
    /// is absent. The record must then be left out of training; no label is
    /// guessed.
    pub fn derive(&self, record: &GameRecord) -> Result<bool, RecordError> {
        let missing = |field| RecordError::MissingField {
            row: record.row(),
            title: record.title().to_string(),
            field,
        };
        let ratio = record.positive_ratio().ok_or_else(|| missing("positive_ratio"))?;
        let reviews = record.user_reviews().ok_or_else(|| missing("user_reviews"))?;
        Ok(self.is_hit(ratio, reviews))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(ratio: Option<f64>, reviews: Option<u64>) -> GameRecord {
        GameRecord::new("Probe")
            .with_row(7)
            .with_price_final(Some(9.99))
            .with_discount(Some(0.0))
            .with_platforms(Some(true), Some(false), Some(false))
            .with_steam_deck(Some(true))
            .with_positive_ratio(ratio)
            .with_user_reviews(reviews)
    }

    #[test]
    fn concrete_scenarios() {
        let rule = HitRule::default();
        assert!(rule.derive(&record(Some(92.0), Some(1200))).unwrap());
        assert!(!rule.derive(&record(Some(70.0), Some(10_000))).unwrap());
        assert!(!rule.derive(&record(Some(90.0), Some(100))).unwrap());
    }

    #[test]
    fn thresholds_are_inclusive() {
        let rule = HitRule::default();
        assert!(rule.is_hit(85.0, 500));
        assert!(!rule.is_hit(84.999_999, 500));
        assert!(!rule.is_hit(85.0, 499));
        assert!(rule.is_hit(100.0, u64::MAX));
    }

    #[test]
    fn agrees_with_definition_over_a_grid() {
        let rule = HitRule::default();
        for ratio in (0..=100).map(f64::from) {
            for reviews in [0, 1, 499, 500, 501, 100_000] {
                assert_eq!(
                    rule.is_hit(ratio, reviews),
                    ratio >= 85.0 && reviews >= 500,
                    "ratio={ratio} reviews={reviews}"
                );
            }
        }
    }

    #[test]
    fn missing_inputs_fail() {
        let rule = HitRule::default();
        let err = rule.derive(&record(None, Some(1000))).unwrap_err();
        assert_eq!(
            err,
            RecordError::MissingField {
                row: 7,
                title: "Probe".to_string(),
                field: "positive_ratio",
            }
        );
        let err = rule.derive(&record(Some(90.0), None)).unwrap_err();
        assert!(matches!(err, RecordError::MissingField { field: "user_reviews", .. }));
    }

    #[test]
    fn custom_thresholds() {
        let rule = HitRule::default()
            .with_min_positive_ratio(70.0)
            .with_min_user_reviews(50);
        assert!(rule.is_hit(70.0, 50));
        assert_eq!(rule.min_positive_ratio(), 70.0);
        assert_eq!(rule.min_user_reviews(), 50);
    }
}
