//! CSV reader for store-listing datasets.

use std::path::{Path, PathBuf};

use csv::StringRecord;
use tracing::{debug, info, instrument};

use crate::DataError;
use crate::domain::{Dataset, GameRecord};

/// Columns every dataset file must carry.
pub const REQUIRED_COLUMNS: [&str; 9] = [
    "title",
    "price_final",
    "discount",
    "positive_ratio",
    "user_reviews",
    "win",
    "mac",
    "linux",
    "steam_deck",
];

/// Header positions of the columns a [`GameRecord`] is built from.
struct ColumnMap {
    title: usize,
    price_final: usize,
    discount: usize,
    positive_ratio: usize,
    user_reviews: usize,
    win: usize,
    mac: usize,
    linux: usize,
    steam_deck: usize,
    app_id: Option<usize>,
    rating: Option<usize>,
    year: Option<usize>,
    date_release: Option<usize>,
}

impl ColumnMap {
    fn from_header(header: &StringRecord, path: &Path) -> Result<Self, DataError> {
        let find = |name: &str| header.iter().position(|h| h.trim() == name);

        let missing: Vec<&'static str> = REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|name| find(name).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(DataError::MissingColumns {
                path: path.to_path_buf(),
                missing,
            });
        }

        // All required lookups succeeded above.
        let required = |name: &str| find(name).unwrap_or_default();
        Ok(Self {
            title: required("title"),
            price_final: required("price_final"),
            discount: required("discount"),
            positive_ratio: required("positive_ratio"),
            user_reviews: required("user_reviews"),
            win: required("win"),
            mac: required("mac"),
            linux: required("linux"),
            steam_deck: required("steam_deck"),
            app_id: find("app_id"),
            rating: find("rating"),
            year: find("year"),
            date_release: find("date_release"),
        })
    }

    fn record(&self, row: usize, cells: &StringRecord) -> GameRecord {
        let cell = |i: usize| cells.get(i).unwrap_or("");
        let optional = |i: Option<usize>| i.map(cell);

        let year = optional(self.year)
            .and_then(parse_year)
            .or_else(|| optional(self.date_release).and_then(parse_year));
        let rating = optional(self.rating)
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(String::from);

        GameRecord::new(cell(self.title).trim())
            .with_row(row)
            .with_app_id(optional(self.app_id).and_then(parse_count))
            .with_price_final(parse_decimal(cell(self.price_final)))
            .with_discount(parse_decimal(cell(self.discount)))
            .with_platforms(
                parse_flag(cell(self.win)),
                parse_flag(cell(self.mac)),
                parse_flag(cell(self.linux)),
            )
            .with_steam_deck(parse_flag(cell(self.steam_deck)))
            .with_positive_ratio(parse_decimal(cell(self.positive_ratio)))
            .with_user_reviews(parse_count(cell(self.user_reviews)))
            .with_rating(rating)
            .with_year(year)
    }
}

/// Finite decimal, or `None` for empty, unparseable, NaN or infinite cells.
fn parse_decimal(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Non-negative integer. Integral decimals such as `1200.0` are accepted.
fn parse_count(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    raw.parse::<u64>().ok().or_else(|| {
        parse_decimal(raw)
            .filter(|v| *v >= 0.0 && v.fract() == 0.0 && *v <= u64::MAX as f64)
            .map(|v| v as u64)
    })
}

/// `true`/`false`/`1`/`0`, case-insensitive.
fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "1.0" => Some(true),
        "false" | "0" | "0.0" => Some(false),
        _ => None,
    }
}

/// A bare year, or the leading year of an ISO date (`2008-11-21`).
fn parse_year(raw: &str) -> Option<i32> {
    let raw = raw.trim();
    raw.parse::<i32>()
        .ok()
        .or_else(|| raw.get(..4).and_then(|y| y.parse::<i32>().ok()))
}

/// Reads a store-listing dataset from a CSV file.
///
/// Expected CSV format:
/// - Header row required, naming at least [`REQUIRED_COLUMNS`] in any order
/// - Optional `app_id`, `rating`, `year` (or `date_release`) columns
/// - Extra columns are ignored
///
/// Cells that are empty or fail to parse load as absent values; the file
/// only fails as a whole for structural problems.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`DataError::FileNotFound`] | File doesn't exist or is unreadable |
/// | [`DataError::CsvParse`] | Malformed CSV record |
/// | [`DataError::MissingColumns`] | Header lacks a required column |
/// | [`DataError::InconsistentRowLength`] | Row has different column count than header |
/// | [`DataError::EmptyDataset`] | Zero data rows after header |
pub struct DatasetReader {
    path: PathBuf,
}

impl DatasetReader {
    /// Create a new reader for the given CSV file path.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Read and validate the CSV file, returning a [`Dataset`].
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn read(&self) -> Result<Dataset, DataError> {
        let file = std::fs::File::open(&self.path).map_err(|e| DataError::FileNotFound {
            path: self.path.clone(),
            source: e,
        })?;

        // flexible(true) so that short rows surface as InconsistentRowLength
        // instead of a low-level CsvParse error.
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(file);

        let header = rdr.headers().map_err(|e| self.csv_error(e))?.clone();
        let expected_cols = header.len();
        let columns = ColumnMap::from_header(&header, &self.path)?;
        debug!(expected_cols, "read CSV header");

        let mut records = Vec::new();
        for (row_index, result) in rdr.records().enumerate() {
            let cells = result.map_err(|e| self.csv_error(e))?;
            if cells.len() != expected_cols {
                return Err(DataError::InconsistentRowLength {
                    path: self.path.clone(),
                    row_index,
                    expected: expected_cols,
                    got: cells.len(),
                });
            }
            records.push(columns.record(row_index, &cells));
        }

        if records.is_empty() {
            return Err(DataError::EmptyDataset {
                path: self.path.clone(),
            });
        }

        info!(n_records = records.len(), "dataset loaded");
        Ok(Dataset::new(records))
    }

    fn csv_error(&self, e: csv::Error) -> DataError {
        DataError::CsvParse {
            path: self.path.clone(),
            offset: e.position().map_or(0, |p| p.byte()),
            source: e,
        }
    }
}
