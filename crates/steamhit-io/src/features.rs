//! Projection of game records onto the classifier's input columns.

use std::fmt;

use crate::domain::GameRecord;
use crate::error::RecordError;

/// A column the classifier can consume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    PriceFinal,
    Discount,
    Win,
    Mac,
    Linux,
    SteamDeck,
    UserReviews,
}

/// The model's input order. Artifacts persist this list alongside the forest.
pub const STANDARD_FEATURES: [Feature; 7] = [
    Feature::PriceFinal,
    Feature::Discount,
    Feature::Win,
    Feature::Mac,
    Feature::Linux,
    Feature::SteamDeck,
    Feature::UserReviews,
];

impl Feature {
    /// Column name as it appears in the dataset and the feature-list file.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::PriceFinal => "price_final",
            Self::Discount => "discount",
            Self::Win => "win",
            Self::Mac => "mac",
            Self::Linux => "linux",
            Self::SteamDeck => "steam_deck",
            Self::UserReviews => "user_reviews",
        }
    }

    /// Look a feature up by column name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        STANDARD_FEATURES.into_iter().find(|f| f.name() == name)
    }

    /// Numeric value of this feature for a record. Flags encode as 0.0/1.0.
    fn value(self, record: &GameRecord) -> Option<f64> {
        let flag = |b: Option<bool>| b.map(f64::from);
        match self {
            Self::PriceFinal => record.price_final(),
            Self::Discount => record.discount(),
            Self::Win => flag(record.win()),
            Self::Mac => flag(record.mac()),
            Self::Linux => flag(record.linux()),
            Self::SteamDeck => flag(record.steam_deck()),
            Self::UserReviews => record.user_reviews().map(|n| n as f64),
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One record's input row, in selector order.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector(Vec<f64>);

impl FeatureVector {
    /// Values in feature order.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Number of values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the vector is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Unwrap into the underlying values.
    #[must_use]
    pub fn into_inner(self) -> Vec<f64> {
        self.0
    }
}

impl From<Vec<f64>> for FeatureVector {
    fn from(values: Vec<f64>) -> Self {
        Self(values)
    }
}

/// An ordered list of features to project records onto.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureSelector {
    features: Vec<Feature>,
}

impl Default for FeatureSelector {
    fn default() -> Self {
        Self::standard()
    }
}

impl FeatureSelector {
    /// Selector over [`STANDARD_FEATURES`].
    #[must_use]
    pub fn standard() -> Self {
        Self {
            features: STANDARD_FEATURES.to_vec(),
        }
    }

    /// Selector over the given column names, kept in the given order.
    ///
    /// # Errors
    ///
    /// [`RecordError::UnknownFeature`] for the first name that is not a
    /// known feature column.
    pub fn new<S: AsRef<str>>(names: &[S]) -> Result<Self, RecordError> {
        let features = names
            .iter()
            .map(|n| {
                let n = n.as_ref();
                Feature::from_name(n).ok_or_else(|| RecordError::UnknownFeature {
                    name: n.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { features })
    }

    /// Selected features in order.
    #[must_use]
    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    /// Column names in order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.features.iter().map(|f| f.name().to_string()).collect()
    }

    /// Number of selected features.
    #[must_use]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Whether no features are selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Project a record onto the selected columns.
    ///
    /// # Errors
    ///
    /// [`RecordError::MissingField`] naming the first absent column.
    pub fn select(&self, record: &GameRecord) -> Result<FeatureVector, RecordError> {
        self.features
            .iter()
            .map(|&f| {
                f.value(record).ok_or_else(|| RecordError::MissingField {
                    row: record.row(),
                    title: record.title().to_string(),
                    field: f.name(),
                })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(FeatureVector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> GameRecord {
        GameRecord::new("Complete")
            .with_price_final(Some(9.99))
            .with_discount(Some(0.0))
            .with_platforms(Some(true), Some(false), Some(false))
            .with_steam_deck(Some(true))
            .with_positive_ratio(Some(92.0))
            .with_user_reviews(Some(1200))
    }

    #[test]
    fn standard_order_is_fixed() {
        assert_eq!(
            FeatureSelector::standard().names(),
            vec!["price_final", "discount", "win", "mac", "linux", "steam_deck", "user_reviews"]
        );
    }

    #[test]
    fn select_projects_in_order() {
        let v = FeatureSelector::standard().select(&complete()).unwrap();
        assert_eq!(v.as_slice(), &[9.99, 0.0, 1.0, 0.0, 0.0, 1.0, 1200.0]);
    }

    #[test]
    fn custom_order_is_respected() {
        let sel = FeatureSelector::new(&["user_reviews", "win"]).unwrap();
        let v = sel.select(&complete()).unwrap();
        assert_eq!(v.into_inner(), vec![1200.0, 1.0]);
    }

    #[test]
    fn unknown_name_rejected() {
        let err = FeatureSelector::new(&["price_final", "positive_ratio"]).unwrap_err();
        assert_eq!(
            err,
            RecordError::UnknownFeature {
                name: "positive_ratio".to_string()
            }
        );
    }

    #[test]
    fn missing_value_names_the_column() {
        let rec = complete().with_steam_deck(None);
        let err = FeatureSelector::standard().select(&rec).unwrap_err();
        assert!(matches!(err, RecordError::MissingField { field: "steam_deck", .. }));
    }

    #[test]
    fn names_round_trip_through_from_name() {
        for f in STANDARD_FEATURES {
            assert_eq!(Feature::from_name(f.name()), Some(f));
            assert_eq!(f.to_string(), f.name());
        }
    }
}
