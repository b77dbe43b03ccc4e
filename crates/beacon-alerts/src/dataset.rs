//! Tabular domain datasets.
//!
//! A [`Dataset`] is a header row plus string cells, loaded from and written
//! back to CSV. Cells are kept verbatim so that a dataset written after a run
//! differs from its input only in the `alert_id` column.
//!
//! Loading never fails: a missing, empty or corrupt file produces an empty
//! dataset, optionally carrying a declared schema.

use std::fs;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::error::Result;

/// Cell values treated as missing, mirroring common spreadsheet exports.
const MISSING_MARKERS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-NaN", "-nan", "<NA>", "N/A", "NA", "NULL", "NaN", "None",
    "n/a", "nan", "null",
];

/// Returns true if a raw cell should be read as "no value".
#[must_use]
pub fn is_missing(cell: &str) -> bool {
    MISSING_MARKERS.contains(&cell.trim())
}

/// An in-memory table with a header row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Dataset {
    /// Creates an empty dataset with the given columns.
    #[must_use]
    pub fn with_columns<S: AsRef<str>>(columns: &[S]) -> Self {
        Self {
            headers: columns.iter().map(|c| c.as_ref().to_string()).collect(),
            rows: Vec::new(),
        }
    }

    /// Loads a CSV file, treating any failure as an empty dataset.
    #[must_use]
    pub fn load(path: &Path) -> Self {
        Self::load_with_columns::<&str>(path, &[])
    }

    /// Loads a CSV file and makes sure every listed column exists.
    ///
    /// Missing columns are appended with empty cells. If the file is absent,
    /// empty or unreadable, the result is an empty dataset with exactly the
    /// listed columns.
    #[must_use]
    pub fn load_with_columns<S: AsRef<str>>(path: &Path, columns: &[S]) -> Self {
        let size = fs::metadata(path).map(|m| m.len()).unwrap_or(0);
        if size == 0 {
            info!(path = %path.display(), "file not found or empty, starting with an empty table");
            return Self::with_columns(columns);
        }

        let mut dataset = match Self::read_csv(path) {
            Ok(dataset) if dataset.headers.is_empty() => {
                info!(path = %path.display(), "file has no columns, starting with an empty table");
                return Self::with_columns(columns);
            }
            Ok(dataset) => dataset,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to parse file, starting with an empty table");
                return Self::with_columns(columns);
            }
        };

        for column in columns {
            dataset.ensure_column(column.as_ref());
        }
        debug!(path = %path.display(), rows = dataset.len(), "loaded table");
        dataset
    }

    fn read_csv(path: &Path) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::Headers)
            .from_path(path)?;

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').to_string())
            .collect();
        let width = headers.len();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            if record.iter().all(|cell| cell.trim().is_empty()) {
                continue;
            }
            let mut cells: Vec<String> = record.iter().map(str::to_string).collect();
            cells.resize(width, String::new());
            rows.push(cells);
        }

        Ok(Self { headers, rows })
    }

    /// Writes the dataset as CSV, replacing any existing file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(&self.headers)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
        info!(path = %path.display(), rows = self.len(), "data saved");
        Ok(())
    }

    /// Column names in order.
    #[must_use]
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if there are no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of a column, if present.
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Returns the index of a column, appending it with empty cells if absent.
    pub fn ensure_column(&mut self, name: &str) -> usize {
        if let Some(idx) = self.column_index(name) {
            return idx;
        }
        self.headers.push(name.to_string());
        for row in &mut self.rows {
            row.push(String::new());
        }
        self.headers.len() - 1
    }

    /// Appends a row. Short rows are padded, long rows truncated.
    pub fn push_row<S: Into<String>>(&mut self, cells: impl IntoIterator<Item = S>) {
        let mut row: Vec<String> = cells.into_iter().map(Into::into).collect();
        row.resize(self.headers.len(), String::new());
        self.rows.push(row);
    }

    /// Read view of one row.
    #[must_use]
    pub fn row(&self, index: usize) -> Option<Row<'_>> {
        self.rows.get(index).map(|cells| Row {
            headers: &self.headers,
            cells,
        })
    }

    /// Iterates over all rows.
    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        self.rows.iter().map(|cells| Row {
            headers: &self.headers,
            cells,
        })
    }

    /// Overwrites one cell. Out-of-range positions are ignored.
    pub fn set_cell(&mut self, row: usize, column: usize, value: impl Into<String>) {
        if let Some(cell) = self.rows.get_mut(row).and_then(|r| r.get_mut(column)) {
            *cell = value.into();
        }
    }

    /// Keeps only the rows whose flag is `true`. `keep` is indexed by row.
    pub fn retain_rows(&mut self, keep: &[bool]) {
        let mut idx = 0;
        self.rows.retain(|_| {
            let kept = keep.get(idx).copied().unwrap_or(true);
            idx += 1;
            kept
        });
    }
}

/// Borrowed view of one dataset row with by-name access.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    headers: &'a [String],
    cells: &'a [String],
}

impl<'a> Row<'a> {
    /// Raw cell text for a column, `None` if the column is absent or the
    /// cell holds a missing marker.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&'a str> {
        let idx = self.headers.iter().position(|h| h == column)?;
        let cell = self.cells.get(idx)?.trim();
        (!is_missing(cell)).then_some(cell)
    }

    /// Cell text exactly as stored, empty if the column is absent.
    #[must_use]
    pub fn raw(&self, column: &str) -> &'a str {
        self.headers
            .iter()
            .position(|h| h == column)
            .and_then(|idx| self.cells.get(idx))
            .map_or("", String::as_str)
    }

    /// Cell text or a fallback.
    #[must_use]
    pub fn get_or(&self, column: &str, fallback: &'a str) -> &'a str {
        self.get(column).unwrap_or(fallback)
    }

    /// Lowercased cell text, empty if missing.
    #[must_use]
    pub fn text(&self, column: &str) -> String {
        self.get(column).map(str::to_lowercase).unwrap_or_default()
    }

    /// Numeric value of a cell; `None` when missing or not a number.
    #[must_use]
    pub fn number(&self, column: &str) -> Option<f64> {
        self.get(column)
            .and_then(|s| s.parse::<f64>().ok())
            .filter(|v| !v.is_nan())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(dir: &tempfile::TempDir, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    mod load_tests {
        use super::*;

        #[test]
        fn missing_file_is_empty_with_schema() {
            let dir = tempfile::tempdir().unwrap();
            let ds = Dataset::load_with_columns(&dir.path().join("nope.csv"), &["a", "b"]);
            assert!(ds.is_empty());
            assert_eq!(ds.headers(), &["a".to_string(), "b".to_string()]);
        }

        #[test]
        fn missing_file_without_schema_has_no_columns() {
            let dir = tempfile::tempdir().unwrap();
            let ds = Dataset::load(&dir.path().join("nope.csv"));
            assert!(ds.is_empty());
            assert!(ds.headers().is_empty());
        }

        #[test]
        fn empty_file_is_empty() {
            let dir = tempfile::tempdir().unwrap();
            let path = write_file(&dir, "empty.csv", "");
            let ds = Dataset::load(&path);
            assert!(ds.is_empty());
        }

        #[test]
        fn loads_rows_and_pads_short_ones() {
            let dir = tempfile::tempdir().unwrap();
            let path = write_file(&dir, "t.csv", "a,b,c\n1,2,3\n4,5\n\n");
            let ds = Dataset::load(&path);
            assert_eq!(ds.len(), 2);
            let row = ds.row(1).unwrap();
            assert_eq!(row.get("a"), Some("4"));
            assert_eq!(row.get("c"), None);
        }

        #[test]
        fn adds_declared_columns() {
            let dir = tempfile::tempdir().unwrap();
            let path = write_file(&dir, "t.csv", "a\n1\n");
            let ds = Dataset::load_with_columns(&path, &["a", "b"]);
            assert_eq!(ds.headers().len(), 2);
            assert_eq!(ds.row(0).unwrap().get("b"), None);
        }

        #[test]
        fn quoted_cells_survive() {
            let dir = tempfile::tempdir().unwrap();
            let path = write_file(&dir, "t.csv", "city,desc\n\"Pune, MH\",\"rain, heavy\"\n");
            let ds = Dataset::load(&path);
            let row = ds.row(0).unwrap();
            assert_eq!(row.get("city"), Some("Pune, MH"));
            assert_eq!(row.get("desc"), Some("rain, heavy"));
        }

        #[test]
        fn invalid_utf8_is_treated_as_empty() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("bad.csv");
            fs::write(&path, [b'a', b',', b'b', b'\n', 0xff, 0xfe, b',', b'1', b'\n']).unwrap();
            let ds = Dataset::load_with_columns(&path, &["a", "b"]);
            assert!(ds.is_empty());
            assert_eq!(ds.headers().len(), 2);
        }
    }

    mod row_tests {
        use super::*;

        fn sample() -> Dataset {
            let mut ds = Dataset::with_columns(&["n", "t"]);
            ds.push_row(["12.5", "Heavy Rain"]);
            ds.push_row(["abc", "None"]);
            ds.push_row(["nan", ""]);
            ds
        }

        #[test]
        fn number_parses_valid_values() {
            let ds = sample();
            assert_eq!(ds.row(0).unwrap().number("n"), Some(12.5));
        }

        #[test]
        fn number_is_none_for_garbage_and_nan() {
            let ds = sample();
            assert_eq!(ds.row(1).unwrap().number("n"), None);
            assert_eq!(ds.row(2).unwrap().number("n"), None);
            assert_eq!(ds.row(0).unwrap().number("missing_column"), None);
        }

        #[test]
        fn text_is_lowercased_and_missing_markers_are_blank() {
            let ds = sample();
            assert_eq!(ds.row(0).unwrap().text("t"), "heavy rain");
            assert_eq!(ds.row(1).unwrap().text("t"), "");
            assert_eq!(ds.row(2).unwrap().get_or("t", "fallback"), "fallback");
        }
    }

    mod mutation_tests {
        use super::*;

        #[test]
        fn ensure_column_is_idempotent() {
            let mut ds = Dataset::with_columns(&["a"]);
            ds.push_row(["1"]);
            let idx = ds.ensure_column("alert_id");
            assert_eq!(idx, 1);
            assert_eq!(ds.ensure_column("alert_id"), 1);
            assert_eq!(ds.headers().len(), 2);
        }

        #[test]
        fn set_cell_and_retain() {
            let mut ds = Dataset::with_columns(&["a", "b"]);
            ds.push_row(["1", ""]);
            ds.push_row(["2", ""]);
            ds.push_row(["3", ""]);
            ds.set_cell(1, 1, "x");
            ds.retain_rows(&[false, true, true]);
            assert_eq!(ds.len(), 2);
            assert_eq!(ds.row(0).unwrap().get("b"), Some("x"));
        }

        #[test]
        fn save_and_reload() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("out.csv");
            let mut ds = Dataset::with_columns(&["city", "alert_id"]);
            ds.push_row(["Pune, MH", "a,b"]);
            ds.push_row(["Delhi", ""]);
            ds.save(&path).unwrap();

            let reloaded = Dataset::load(&path);
            assert_eq!(reloaded, ds);
        }
    }
}
