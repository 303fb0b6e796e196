//! Game records and the in-memory dataset.

use std::collections::HashSet;

/// One row of the store-listing dataset.
///
/// Numeric and boolean cells that were empty or unparseable are stored as
/// `None`; whether that matters is decided by whoever consumes the record.
#[derive(Debug, Clone, PartialEq)]
pub struct GameRecord {
    row: usize,
    title: String,
    app_id: Option<u64>,
    price_final: Option<f64>,
    discount: Option<f64>,
    win: Option<bool>,
    mac: Option<bool>,
    linux: Option<bool>,
    steam_deck: Option<bool>,
    positive_ratio: Option<f64>,
    user_reviews: Option<u64>,
    rating: Option<String>,
    year: Option<i32>,
}

impl GameRecord {
    /// Create a record with only a title; every other field is absent.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            row: 0,
            title: title.into(),
            app_id: None,
            price_final: None,
            discount: None,
            win: None,
            mac: None,
            linux: None,
            steam_deck: None,
            positive_ratio: None,
            user_reviews: None,
            rating: None,
            year: None,
        }
    }

    /// Set the zero-based data row this record came from.
    #[must_use]
    pub fn with_row(mut self, row: usize) -> Self {
        self.row = row;
        self
    }

    /// Set the store application id.
    #[must_use]
    pub fn with_app_id(mut self, app_id: Option<u64>) -> Self {
        self.app_id = app_id;
        self
    }

    /// Set the final (post-discount) price.
    #[must_use]
    pub fn with_price_final(mut self, price: Option<f64>) -> Self {
        self.price_final = price;
        self
    }

    /// Set the discount percentage.
    #[must_use]
    pub fn with_discount(mut self, discount: Option<f64>) -> Self {
        self.discount = discount;
        self
    }

    /// Set the Windows/macOS/Linux support flags.
    #[must_use]
    pub fn with_platforms(mut self, win: Option<bool>, mac: Option<bool>, linux: Option<bool>) -> Self {
        self.win = win;
        self.mac = mac;
        self.linux = linux;
        self
    }

    /// Set the Steam Deck support flag.
    #[must_use]
    pub fn with_steam_deck(mut self, steam_deck: Option<bool>) -> Self {
        self.steam_deck = steam_deck;
        self
    }

    /// Set the positive review percentage.
    #[must_use]
    pub fn with_positive_ratio(mut self, ratio: Option<f64>) -> Self {
        self.positive_ratio = ratio;
        self
    }

    /// Set the review count.
    #[must_use]
    pub fn with_user_reviews(mut self, reviews: Option<u64>) -> Self {
        self.user_reviews = reviews;
        self
    }

    /// Set the store's rating label.
    #[must_use]
    pub fn with_rating(mut self, rating: Option<String>) -> Self {
        self.rating = rating;
        self
    }

    /// Set the release year.
    #[must_use]
    pub fn with_year(mut self, year: Option<i32>) -> Self {
        self.year = year;
        self
    }

    /// Zero-based data row (header excluded).
    #[must_use]
    pub fn row(&self) -> usize {
        self.row
    }

    /// Listing title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Store application id.
    #[must_use]
    pub fn app_id(&self) -> Option<u64> {
        self.app_id
    }

    /// Final price after discount.
    #[must_use]
    pub fn price_final(&self) -> Option<f64> {
        self.price_final
    }

    /// Discount percentage.
    #[must_use]
    pub fn discount(&self) -> Option<f64> {
        self.discount
    }

    /// Windows support.
    #[must_use]
    pub fn win(&self) -> Option<bool> {
        self.win
    }

    /// macOS support.
    #[must_use]
    pub fn mac(&self) -> Option<bool> {
        self.mac
    }

    /// Linux support.
    #[must_use]
    pub fn linux(&self) -> Option<bool> {
        self.linux
    }

    /// Steam Deck support.
    #[must_use]
    pub fn steam_deck(&self) -> Option<bool> {
        self.steam_deck
    }

    /// Positive review percentage.
    #[must_use]
    pub fn positive_ratio(&self) -> Option<f64> {
        self.positive_ratio
    }

    /// Number of user reviews.
    #[must_use]
    pub fn user_reviews(&self) -> Option<u64> {
        self.user_reviews
    }

    /// Store rating label, e.g. "Very Positive".
    #[must_use]
    pub fn rating(&self) -> Option<&str> {
        self.rating.as_deref()
    }

    /// Release year.
    #[must_use]
    pub fn year(&self) -> Option<i32> {
        self.year
    }
}

/// An ordered, read-only collection of game records.
#[derive(Debug, Clone)]
pub struct Dataset {
    records: Vec<GameRecord>,
}

impl Dataset {
    /// Wrap records in load order.
    #[must_use]
    pub fn new(records: Vec<GameRecord>) -> Self {
        Self { records }
    }

    /// Return all records.
    #[must_use]
    pub fn records(&self) -> &[GameRecord] {
        &self.records
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset has no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// First record with exactly this title. Titles are not unique.
    #[must_use]
    pub fn find_by_title(&self, title: &str) -> Option<&GameRecord> {
        self.records.iter().find(|r| r.title == title)
    }

    /// Distinct titles in order of first appearance.
    #[must_use]
    pub fn unique_titles(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.records
            .iter()
            .map(GameRecord::title)
            .filter(|t| seen.insert(*t))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset() -> Dataset {
        Dataset::new(vec![
            GameRecord::new("Portal").with_row(0).with_user_reviews(Some(10)),
            GameRecord::new("Doom").with_row(1),
            GameRecord::new("Portal").with_row(2).with_user_reviews(Some(20)),
        ])
    }

    #[test]
    fn find_by_title_returns_first_match() {
        let ds = dataset();
        let rec = ds.find_by_title("Portal").unwrap();
        assert_eq!(rec.row(), 0);
        assert_eq!(rec.user_reviews(), Some(10));
        assert!(ds.find_by_title("Quake").is_none());
    }

    #[test]
    fn unique_titles_keep_first_appearance_order() {
        assert_eq!(dataset().unique_titles(), vec!["Portal", "Doom"]);
    }

    #[test]
    fn new_record_has_no_values() {
        let rec = GameRecord::new("Blank");
        assert_eq!(rec.title(), "Blank");
        assert!(rec.price_final().is_none());
        assert!(rec.win().is_none());
        assert!(rec.rating().is_none());
    }
}
