//! In-memory CSV tables for the order, catalog and RTO exports

use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use tracing::{debug, info};

use crate::error::{Dataset, PipelineError};

/// A fully materialized CSV export
#[derive(Debug, Clone)]
pub struct Table {
    /// Which export this table was loaded from
    pub dataset: Dataset,
    /// Header names, trimmed
    pub headers: Vec<String>,
    /// Data rows, padded to the header width
    pub rows: Vec<Vec<String>>,
    /// 1-based row number in the export for each entry of `rows`
    source_rows: Vec<usize>,
}

impl Table {
    /// Build a table directly from headers and rows
    pub fn new(dataset: Dataset, headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width.max(row.len()), String::new());
                row
            })
            .collect::<Vec<_>>();
        let source_rows = (1..=rows.len()).collect();
        Self {
            dataset,
            headers,
            rows,
            source_rows,
        }
    }

    /// Load a table from any CSV reader
    pub fn from_reader<R: Read>(dataset: Dataset, mut reader: R) -> Result<Self, PipelineError> {
        let mut text = String::new();
        reader.read_to_string(&mut text).map_err(|e| PipelineError::Csv {
            dataset,
            source: csv::Error::from(e),
        })?;

        // Spreadsheet exports often carry a UTF-8 BOM
        let text = text.trim_start_matches('\u{FEFF}');

        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(text.as_bytes());

        let headers: Vec<String> = csv_reader
            .headers()
            .map_err(|source| PipelineError::Csv { dataset, source })?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for result in csv_reader.records() {
            let record = result.map_err(|source| PipelineError::Csv { dataset, source })?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        debug!(%dataset, columns = headers.len(), rows = rows.len(), "Loaded table");
        Ok(Self::new(dataset, headers, rows))
    }

    /// Load a table from a CSV file
    pub fn from_path(dataset: Dataset, path: impl AsRef<Path>) -> Result<Self, PipelineError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|source| PipelineError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let table = Self::from_reader(dataset, file)?;
        info!(%dataset, path = %path.display(), rows = table.len(), "Read export");
        Ok(table)
    }

    /// Number of data rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of a column by exact header name
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Index of a column the caller cannot proceed without
    pub fn require(&self, name: &str) -> Result<usize, PipelineError> {
        self.column(name).ok_or_else(|| PipelineError::MissingRequiredColumn {
            dataset: self.dataset,
            column: name.to_string(),
        })
    }

    /// Remove a column if present
    pub fn drop_column(&mut self, name: &str) {
        if let Some(idx) = self.column(name) {
            self.headers.remove(idx);
            for row in &mut self.rows {
                if idx < row.len() {
                    row.remove(idx);
                }
            }
            debug!(dataset = %self.dataset, column = name, "Dropped column");
        }
    }

    /// Remove exact duplicate rows, keeping the first occurrence
    ///
    /// Returns the number of rows removed.
    pub fn dedup(&mut self) -> usize {
        let before = self.rows.len();
        let mut seen = HashSet::new();
        let mut rows = Vec::with_capacity(before);
        let mut source_rows = Vec::with_capacity(before);
        for (row, source) in self.rows.drain(..).zip(self.source_rows.drain(..)) {
            if seen.insert(row.clone()) {
                rows.push(row);
                source_rows.push(source);
            }
        }
        self.rows = rows;
        self.source_rows = source_rows;
        before - self.rows.len()
    }

    /// Export row number of a data row, stable across `dedup`
    pub fn source_row(&self, row: usize) -> usize {
        self.source_rows.get(row).copied().unwrap_or(row + 1)
    }

    /// Trimmed cell value, `None` when blank or out of range
    pub fn get(&self, row: usize, idx: usize) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|r| r.get(idx))
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn orders(csv: &str) -> Table {
        Table::from_reader(Dataset::Orders, csv.as_bytes()).unwrap()
    }

    #[test]
    fn test_from_reader_strips_bom_and_trims_headers() {
        let table = orders("\u{FEFF} *Product Name ,*Product Quantity\nHome Jersey - S,3\n");
        assert_eq!(table.headers, vec!["*Product Name", "*Product Quantity"]);
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(0, 0), Some("Home Jersey - S"));
    }

    #[test]
    fn test_short_rows_are_padded() {
        let table = orders("a,b,c\n1\n");
        assert_eq!(table.rows[0].len(), 3);
        assert_eq!(table.get(0, 2), None);
    }

    #[test]
    fn test_require_missing_column() {
        let table = orders("a,b\n1,2\n");
        assert_eq!(table.require("b").unwrap(), 1);

        let err = table.require("Image Src").unwrap_err();
        assert!(matches!(
            err,
            PipelineError::MissingRequiredColumn { dataset: Dataset::Orders, ref column } if column == "Image Src"
        ));
    }

    #[test]
    fn test_drop_column() {
        let mut table = orders("a,Error,b\n1,bad,2\n");
        table.drop_column("Error");
        table.drop_column("Absent");
        assert_eq!(table.headers, vec!["a", "b"]);
        assert_eq!(table.rows[0], vec!["1", "2"]);
    }

    #[test]
    fn test_dedup_keeps_first() {
        let mut table = orders("p,q\nA - S,1\nA - S,1\nA - S,2\nA - S,1\n");
        assert_eq!(table.dedup(), 2);
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(1, 1), Some("2"));
        assert_eq!(table.source_row(1), 3);
    }

    #[test]
    fn test_from_path_missing_file() {
        let err = Table::from_path(Dataset::Catalog, "/nonexistent/products_export.csv").unwrap_err();
        assert!(matches!(err, PipelineError::Io { .. }));
    }
}
