//! Result file reader
//!
//! Parses one delimited result file into typed records. The header row names
//! the columns; every data row carries a `type` of `detect`, `match` or
//! `homography` plus the columns that kind needs:
//!
//! ```text
//! type,detector,img_i,img_j,num_matches,mean_dist,time_ms,distances,threshold,num_inliers
//! detect,ORB,,,500,,12.0,,,
//! match,ORB,1,2,120,31.5,4.2,30;31;33.5,,
//! homography,ORB,1,2,,,0.8,,thr=5,97
//! ```
//!
//! Rows may be shorter than the header; trailing columns then count as empty.
//! Text fields (`type`, `detector`) are taken verbatim; whitespace around a
//! number is tolerated.
//! Malformed numbers in `match`, `detect` and `homography` rows are fatal for
//! the file, except for the homography threshold: a row whose threshold does
//! not parse is dropped. Rows of unknown type are ignored.

use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

use csv::{ReaderBuilder, StringRecord};

use super::records::{DetectionRecord, HomographyRecord, MatchRecord, ResultRow, ResultSet, RowKind};
use crate::error::{ParseError, ReadError};

/// Column holding the row kind
pub const TYPE_COLUMN: &str = "type";

/// Separator between samples in the `distances` column
pub const DISTANCE_SEPARATOR: char = ';';

/// Read one result file, tagging every record with `dataset`
///
/// The whole file is read into memory before parsing. A file without any
/// header line yields an empty [`ResultSet`]. Content that is not valid UTF-8
/// is a [`ParseError::Malformed`], not an I/O error.
pub fn read_results_file(path: &Path, dataset: &str) -> Result<ResultSet, ReadError> {
    let content = std::fs::read(path).map_err(|source| ReadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let results = parse_results(&content, path, dataset)?;

    tracing::debug!(
        "Read {:?} as dataset '{}': {} detect, {} match, {} homography records",
        path,
        dataset,
        results.detects.len(),
        results.matches.len(),
        results.homographies.len()
    );

    Ok(results)
}

/// Parse result file content already held in memory
///
/// `file` is only used to label errors.
pub fn parse_results(
    content: impl AsRef<[u8]>,
    file: &Path,
    dataset: &str,
) -> Result<ResultSet, ParseError> {
    let malformed = |source| ParseError::Malformed {
        file: file.to_path_buf(),
        source,
    };

    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .from_reader(content.as_ref());

    let headers = reader.headers().map_err(malformed)?.clone();
    let mut results = ResultSet::new();
    if headers.is_empty() {
        return Ok(results);
    }

    let columns = Columns::from_headers(&headers);
    let type_index = columns.index(TYPE_COLUMN).ok_or_else(|| ParseError::MissingColumn {
        file: file.to_path_buf(),
        column: TYPE_COLUMN.to_string(),
    })?;

    for record in reader.records() {
        let record = record.map_err(malformed)?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);

        let tag = record.get(type_index).unwrap_or("");
        let Some(kind) = RowKind::from_tag(tag) else {
            tracing::trace!("{:?}:{}: ignoring row of type '{}'", file, line, tag);
            continue;
        };

        let row = Row {
            file,
            line,
            record: &record,
            columns: &columns,
        };
        match parse_row(&row, kind, dataset)? {
            Some(parsed) => results.push(parsed),
            None => tracing::debug!("{:?}:{}: skipping {:?} row", file, line, kind),
        }
    }

    Ok(results)
}

/// Parse a semicolon-separated list of distance samples
///
/// Empty tokens are ignored, so `""` is an empty list.
pub fn parse_distances(raw: &str) -> Result<Vec<f64>, std::num::ParseFloatError> {
    raw.split(DISTANCE_SEPARATOR)
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(f64::from_str)
        .collect()
}

/// Parse a RANSAC threshold written either bare (`5`) or as `key=value` (`thr=5`)
pub fn parse_threshold(raw: &str) -> Option<f64> {
    let value = raw.split_once('=').map_or(raw, |(_, value)| value);
    value.trim().parse().ok()
}

/// Header name to column index; the first column of a given name wins
struct Columns {
    index: HashMap<String, usize>,
}

impl Columns {
    fn from_headers(headers: &StringRecord) -> Self {
        let mut index = HashMap::new();
        for (i, name) in headers.iter().enumerate() {
            index.entry(name.to_string()).or_insert(i);
        }
        Self { index }
    }

    fn index(&self, column: &str) -> Option<usize> {
        self.index.get(column).copied()
    }
}

/// Field access for one data row with error context attached
struct Row<'a> {
    file: &'a Path,
    line: u64,
    record: &'a StringRecord,
    columns: &'a Columns,
}

impl<'a> Row<'a> {
    /// Non-empty field value; absent columns and short rows give `None`
    fn field(&self, column: &str) -> Option<&'a str> {
        self.columns
            .index(column)
            .and_then(|i| self.record.get(i))
            .filter(|value| !value.is_empty())
    }

    fn required(&self, column: &str) -> Result<&'a str, ParseError> {
        self.field(column).ok_or_else(|| ParseError::MissingField {
            file: self.file.to_path_buf(),
            row: self.line,
            column: column.to_string(),
        })
    }

    fn parse<T: FromStr>(&self, column: &str) -> Result<T, ParseError> {
        let value = self.required(column)?;
        value.trim().parse().map_err(|_| self.invalid(column, value))
    }

    /// Parse an optional field, falling back to the type's default when empty
    fn parse_or_default<T: FromStr + Default>(&self, column: &str) -> Result<T, ParseError> {
        match self.field(column) {
            Some(value) => value.trim().parse().map_err(|_| self.invalid(column, value)),
            None => Ok(T::default()),
        }
    }

    fn invalid(&self, column: &str, value: &str) -> ParseError {
        ParseError::InvalidField {
            file: self.file.to_path_buf(),
            row: self.line,
            column: column.to_string(),
            value: value.to_string(),
        }
    }
}

/// Build the record for one row; `Ok(None)` means the row is tolerated and dropped
fn parse_row(row: &Row<'_>, kind: RowKind, dataset: &str) -> Result<Option<ResultRow>, ParseError> {
    let detector = row.required("detector")?.to_string();

    let parsed = match kind {
        RowKind::Match => {
            let pair = format!("{}-{}", row.required("img_i")?, row.required("img_j")?);
            let distances = match row.field("distances") {
                Some(raw) => parse_distances(raw).map_err(|_| row.invalid("distances", raw))?,
                None => Vec::new(),
            };
            ResultRow::Match(MatchRecord {
                dataset: dataset.to_string(),
                detector,
                pair,
                num_matches: row.parse("num_matches")?,
                mean_dist: row.parse("mean_dist")?,
                time_ms: row.parse("time_ms")?,
                distances,
            })
        }
        RowKind::Detect => ResultRow::Detection(DetectionRecord {
            dataset: dataset.to_string(),
            detector,
            // Detect rows reuse the num_matches column for the keypoint count
            total_keypoints: row.parse_or_default("num_matches")?,
            detect_time_ms: row.parse_or_default("time_ms")?,
        }),
        RowKind::Homography => {
            let Some(threshold) = row.field("threshold").and_then(parse_threshold) else {
                return Ok(None);
            };
            let num_inliers = if row.field("num_inliers").is_some() {
                row.parse("num_inliers")?
            } else {
                row.parse_or_default("num_matches")?
            };
            ResultRow::Homography(HomographyRecord {
                dataset: dataset.to_string(),
                detector,
                img_i: row.parse("img_i")?,
                img_j: row.parse("img_j")?,
                threshold,
                num_inliers,
                time_ms: row.parse("time_ms")?,
            })
        }
    };

    Ok(Some(parsed))
}
