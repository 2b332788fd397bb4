//! Order export parsing: product/size split, quantities and SKU normalization

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::OrderColumns;
use crate::error::PipelineError;
use crate::table::Table;

/// Trailing size suffix of a variant SKU: `-24-26`, `-S`, `-2XL`, `-10`
///
/// The `lo-hi` alternative only counts as a size when it is a real size range;
/// see `is_size_range`.
static SKU_SIZE_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"-(?:(?P<lo>\d{1,3})-(?P<hi>\d{1,3})|\d*[A-Za-z]+|\d{1,3})$").expect("SKU suffix pattern is valid")
});

/// Largest quantity accepted on a single order row
pub const MAX_QUANTITY: u64 = u32::MAX as u64;

/// One raw row of the order export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderLine {
    /// 1-based data row number in the export
    pub row: usize,
    /// Compound "<name> - <size>" field
    pub raw_product_field: String,
    pub quantity: u64,
    pub raw_sku_field: Option<String>,
}

/// An order line split into product name and size
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedOrderLine {
    pub product_name: String,
    pub size: String,
    pub quantity: u64,
    /// Normalized SKU with the size suffix stripped
    pub sku: Option<String>,
}

/// A row left out of aggregation, and why
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRow {
    pub row: usize,
    pub reason: String,
}

/// Raw order lines read from an export, before the product field is split
#[derive(Debug, Clone, Default)]
pub struct OrderRows {
    pub lines: Vec<OrderLine>,
    /// Rows with an unreadable quantity
    pub skipped: Vec<SkippedRow>,
    /// Data rows in the export before duplicate removal
    pub total_rows: usize,
    pub duplicates_removed: usize,
}

/// Result of parsing a whole order export
#[derive(Debug, Clone, Default)]
pub struct ParsedOrders {
    pub lines: Vec<ParsedOrderLine>,
    pub skipped: Vec<SkippedRow>,
    /// Data rows in the export before duplicate removal
    pub total_rows: usize,
    pub duplicates_removed: usize,
}

impl OrderLine {
    /// Split the compound field and normalize the SKU against the parsed size
    pub fn parse(&self, separator: &str) -> Result<ParsedOrderLine, PipelineError> {
        let (product_name, size) = split_product_field(&self.raw_product_field, separator)?;
        let sku = self
            .raw_sku_field
            .as_deref()
            .and_then(|sku| normalize_sku_for_size(sku, &size));
        Ok(ParsedOrderLine {
            product_name,
            size,
            quantity: self.quantity,
            sku,
        })
    }
}

/// Split "<name> - <size>" at the last separator
///
/// Names that contain the separator themselves keep everything up to the
/// rightmost occurrence, so "Retro - Home - S" yields ("Retro - Home", "S").
pub fn split_product_field(field: &str, separator: &str) -> Result<(String, String), PipelineError> {
    let malformed = || PipelineError::MalformedProductField {
        field: field.to_string(),
        separator: separator.to_string(),
    };

    let (name, size) = field.rsplit_once(separator).ok_or_else(malformed)?;
    let (name, size) = (name.trim(), size.trim());
    if name.is_empty() || size.is_empty() {
        return Err(malformed());
    }
    Ok((name.to_string(), size.to_string()))
}

/// Ascending numeric size range such as `24-26` or `8-10`
fn is_size_range(lo: &str, hi: &str) -> bool {
    if lo.starts_with('0') || hi.starts_with('0') {
        return false;
    }
    match (lo.parse::<u32>(), hi.parse::<u32>()) {
        (Ok(lo), Ok(hi)) => hi > lo && hi - lo <= 4,
        _ => false,
    }
}

/// Strip the trailing size suffix from a variant SKU
///
/// Returns `None` for a blank SKU. SKUs without a recognizable suffix are
/// returned unchanged. Two trailing numbers that are not a size range
/// (`TEE-100-8`, `HJ-01-24`) lose only the last one.
pub fn normalize_sku(raw: &str) -> Option<String> {
    let sku = raw.trim();
    if sku.is_empty() {
        return None;
    }
    let Some(caps) = SKU_SIZE_SUFFIX.captures(sku) else {
        return Some(sku.to_string());
    };

    let start = match (caps.name("lo"), caps.name("hi")) {
        (Some(lo), Some(hi)) if !is_size_range(lo.as_str(), hi.as_str()) => hi.start() - 1,
        _ => caps.get(0).map_or(sku.len(), |m| m.start()),
    };
    if start == 0 {
        // The whole SKU looked like a suffix; keep it as-is
        return Some(sku.to_string());
    }
    Some(sku[..start].to_string())
}

/// Strip a known size from a variant SKU
///
/// When the SKU ends in `-<size>` exactly (ignoring ASCII case) only that is
/// removed; otherwise falls back to `normalize_sku`.
pub fn normalize_sku_for_size(raw: &str, size: &str) -> Option<String> {
    let sku = raw.trim();
    let suffix = format!("-{}", size.trim());
    if sku.len() > suffix.len() {
        let start = sku.len() - suffix.len();
        if let Some(tail) = sku.get(start..)
            && tail.eq_ignore_ascii_case(&suffix)
        {
            return Some(sku[..start].to_string());
        }
    }
    normalize_sku(sku)
}

/// Parse an order quantity
///
/// Accepts non-negative integers up to `MAX_QUANTITY`, and integral floats
/// such as `3.0`.
pub fn parse_quantity(raw: &str) -> Result<u64, PipelineError> {
    let value = raw.trim();
    let invalid = || PipelineError::InvalidQuantity {
        value: value.to_string(),
    };

    let quantity = match value.parse::<u64>() {
        Ok(n) => n,
        Err(_) => match value.parse::<f64>() {
            Ok(f) if f >= 0.0 && f.fract() == 0.0 && f <= MAX_QUANTITY as f64 => f as u64,
            _ => return Err(invalid()),
        },
    };
    if quantity > MAX_QUANTITY {
        return Err(invalid());
    }
    Ok(quantity)
}

/// Record a row-level error as a skipped row, or pass a fatal one through
fn skip_row(row: usize, error: PipelineError, skipped: &mut Vec<SkippedRow>) -> Result<(), PipelineError> {
    if !error.is_row_level() {
        return Err(error);
    }
    warn!(row, %error, "Skipping order row");
    skipped.push(SkippedRow {
        row,
        reason: error.to_string(),
    });
    Ok(())
}

/// Parse a sequence of order lines, skipping malformed ones
pub fn parse_order_lines(
    lines: &[OrderLine],
    separator: &str,
) -> Result<(Vec<ParsedOrderLine>, Vec<SkippedRow>), PipelineError> {
    let mut parsed = Vec::with_capacity(lines.len());
    let mut skipped = Vec::new();

    for line in lines {
        match line.parse(separator) {
            Ok(p) => parsed.push(p),
            Err(e) => skip_row(line.row, e, &mut skipped)?,
        }
    }

    Ok((parsed, skipped))
}

/// Read order lines from an order export
///
/// Drops the error/remark column and exact duplicate rows first. Rows with an
/// unreadable quantity are skipped and reported.
pub fn read_order_lines(mut table: Table, columns: &OrderColumns) -> Result<OrderRows, PipelineError> {
    let total_rows = table.len();
    table.drop_column(&columns.error);
    let duplicates_removed = table.dedup();
    if duplicates_removed > 0 {
        debug!(duplicates_removed, "Removed duplicate order rows");
    }

    let product_idx = table.require(&columns.product)?;
    let quantity_idx = table.require(&columns.quantity)?;
    let sku_idx = table.column(&columns.sku);

    let mut lines = Vec::with_capacity(table.len());
    let mut skipped = Vec::new();

    for i in 0..table.len() {
        let row = table.source_row(i);
        let quantity = match parse_quantity(table.get(i, quantity_idx).unwrap_or_default()) {
            Ok(q) => q,
            Err(e) => {
                skip_row(row, e, &mut skipped)?;
                continue;
            }
        };

        lines.push(OrderLine {
            row,
            raw_product_field: table.get(i, product_idx).unwrap_or_default().to_string(),
            quantity,
            raw_sku_field: sku_idx.and_then(|idx| table.get(i, idx)).map(str::to_string),
        });
    }

    Ok(OrderRows {
        lines,
        skipped,
        total_rows,
        duplicates_removed,
    })
}

/// Read and parse an order export in one pass
pub fn parse_order_table(table: Table, columns: &OrderColumns, separator: &str) -> Result<ParsedOrders, PipelineError> {
    let rows = read_order_lines(table, columns)?;
    let (lines, parse_skipped) = parse_order_lines(&rows.lines, separator)?;

    let mut skipped = rows.skipped;
    skipped.extend(parse_skipped);
    skipped.sort_by_key(|s| s.row);

    Ok(ParsedOrders {
        lines,
        skipped,
        total_rows: rows.total_rows,
        duplicates_removed: rows.duplicates_removed,
    })
}
