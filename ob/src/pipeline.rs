//! End-to-end order board pipeline
//!
//! ```text
//! orders ──parse──▶ lines ──aggregate──▶ products ──normalize──▶ descriptors
//!                                              │                     │
//! catalog, rto ─────────────────────────────▶ merge ◀────────────────┘
//!                                              │
//!                                              ▼
//!                                          FinalRow[]
//! ```
//!
//! Each run is a pure function of its input tables.

use serde::Serialize;
use tracing::info;

use crate::aggregate::aggregate;
use crate::config::{ColumnsConfig, Config};
use crate::error::PipelineError;
use crate::merge::{FinalRow, Merger, parse_catalog_table, parse_rto_table};
use crate::parser::{SkippedRow, parse_order_table};
use crate::sizes::SizeNormalizer;
use crate::table::Table;

/// What happened to the input during a run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    /// Data rows in the order export
    pub order_rows: usize,
    pub duplicates_removed: usize,
    pub skipped: Vec<SkippedRow>,
    /// Dropped size tokens, as "<product>: <warning>"
    pub size_warnings: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub rows: Vec<FinalRow>,
    pub report: RunReport,
}

/// Runs parse, aggregate, normalize and merge over materialized exports
#[derive(Debug, Clone)]
pub struct Pipeline {
    separator: String,
    columns: ColumnsConfig,
    normalizer: SizeNormalizer,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

impl Pipeline {
    pub fn new(config: &Config) -> Self {
        Self {
            separator: config.separator.clone(),
            columns: config.columns.clone(),
            normalizer: SizeNormalizer::new(config.sizes.clone()),
        }
    }

    /// Produce one final row per ordered product
    ///
    /// A missing required column in any export aborts the run. Malformed order
    /// rows are skipped and listed in the report.
    pub fn run(&self, orders: Table, catalog: &Table, rto: Option<&Table>) -> Result<PipelineOutput, PipelineError> {
        // Validate every export before doing any work
        let catalog = parse_catalog_table(catalog, &self.columns.catalog)?;
        let rto = match rto {
            Some(table) => parse_rto_table(table, &self.columns.rto)?,
            None => Vec::new(),
        };
        let parsed = parse_order_table(orders, &self.columns.orders, &self.separator)?;

        let products = aggregate(&parsed.lines);
        let merger = Merger::new(catalog, rto);

        let mut size_warnings = Vec::new();
        let rows: Vec<FinalRow> = products
            .iter()
            .map(|product| {
                let normalized = self
                    .normalizer
                    .normalize_sizes(&product.size_quantities, &product.product_name);
                size_warnings.extend(
                    normalized
                        .warnings
                        .iter()
                        .map(|w| format!("{}: {}", product.product_name, w)),
                );
                merger.merge(product, normalized.descriptor)
            })
            .collect();

        let report = RunReport {
            order_rows: parsed.total_rows,
            duplicates_removed: parsed.duplicates_removed,
            skipped: parsed.skipped,
            size_warnings,
        };

        info!(
            products = rows.len(),
            order_rows = report.order_rows,
            duplicates = report.duplicates_removed,
            skipped = report.skipped.len(),
            "Pipeline complete"
        );
        Ok(PipelineOutput { rows, report })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Dataset;

    const CATALOG: &str = "Title,Image Src,Image Position\nHome Jersey,img.png,1\n";

    fn table(dataset: Dataset, csv: &str) -> Table {
        Table::from_reader(dataset, csv.as_bytes()).unwrap()
    }

    #[test]
    fn test_home_jersey_scenario() {
        let orders = table(
            Dataset::Orders,
            "*Product Name,*Product Quantity\nHome Jersey - S,3\nHome Jersey - L,2\nHome Jersey - S,1\n",
        );

        let output = Pipeline::default()
            .run(orders, &table(Dataset::Catalog, CATALOG), None)
            .unwrap();

        assert_eq!(
            output.rows,
            vec![FinalRow {
                product_name: "Home Jersey".to_string(),
                sku: None,
                image_src: Some("img.png".to_string()),
                size_quantity: "S-4, L-2".to_string(),
                rto_info: None,
            }]
        );
        assert_eq!(output.report.order_rows, 3);
        assert!(output.report.skipped.is_empty());
    }

    #[test]
    fn test_missing_rto_column_aborts() {
        let orders = table(Dataset::Orders, "*Product Name,*Product Quantity\nHome Jersey - S,3\n");
        let rto = table(Dataset::Rto, "Product Name,Size\nHome Jersey,S\n");

        let err = Pipeline::default()
            .run(orders, &table(Dataset::Catalog, CATALOG), Some(&rto))
            .unwrap_err();
        assert!(matches!(
            err,
            PipelineError::MissingRequiredColumn { dataset: Dataset::Rto, ref column } if column == "Vendor"
        ));
    }

    #[test]
    fn test_skipped_rows_reported() {
        let orders = table(
            Dataset::Orders,
            "*Product Name,*Product Quantity\nGift Card,1\nHome Jersey - S,3\n",
        );

        let output = Pipeline::default()
            .run(orders, &table(Dataset::Catalog, CATALOG), None)
            .unwrap();
        assert_eq!(output.rows.len(), 1);
        assert_eq!(output.report.skipped.len(), 1);
        assert_eq!(output.report.skipped[0].row, 1);
    }

    #[test]
    fn test_custom_separator() {
        let config = Config {
            separator: " / ".to_string(),
            ..Default::default()
        };
        let orders = table(Dataset::Orders, "*Product Name,*Product Quantity\nHome Jersey / M,2\n");

        let output = Pipeline::new(&config)
            .run(orders, &table(Dataset::Catalog, CATALOG), None)
            .unwrap();
        assert_eq!(output.rows[0].size_quantity, "M-2");
    }
}
