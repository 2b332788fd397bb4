//! OrderBoard - per-product size and quantity aggregation for order exports
//!
//! Turns an order export of "<name> - <size>" line items into one row per
//! product with summed quantities per size, enriched with the catalog's
//! primary image and any return-to-origin (RTO) vendor stock.
//!
//! # Example
//!
//! ```ignore
//! use orderboard::{Dataset, Pipeline, Table};
//!
//! let orders = Table::from_path(Dataset::Orders, "orders.csv")?;
//! let catalog = Table::from_path(Dataset::Catalog, "products_export.csv")?;
//! let output = Pipeline::default().run(orders, &catalog, None)?;
//! for row in &output.rows {
//!     println!("{}: {}", row.product_name, row.size_quantity);
//! }
//! ```

pub mod aggregate;
pub mod cli;
pub mod config;
pub mod error;
pub mod merge;
pub mod parser;
pub mod pipeline;
pub mod render;
pub mod sizes;
pub mod table;

pub use aggregate::{AggregatedProduct, SizeQuantity, aggregate};
pub use error::{Dataset, PipelineError};
pub use merge::{CatalogEntry, FinalRow, Merger, RtoEntry, RtoInfo};
pub use parser::{
    MAX_QUANTITY, OrderLine, ParsedOrderLine, SkippedRow, normalize_sku, normalize_sku_for_size, split_product_field,
};
pub use pipeline::{Pipeline, PipelineOutput, RunReport};
pub use sizes::{Label, MalformedSizeToken, Normalized, SizeNormalizer};
pub use table::Table;

/// Separator between product name and size in order exports
pub const SIZE_SEPARATOR: &str = " - ";

/// Canonical size order; other sizes follow in their original order
pub const CANONICAL_SIZES: [&str; 5] = ["S", "M", "L", "XL", "2XL"];
