//! Per-product size/quantity aggregation

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::parser::ParsedOrderLine;

/// Summed quantity for one size of a product
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SizeQuantity {
    pub size: String,
    pub quantity: u64,
}

/// All ordered sizes of one product
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregatedProduct {
    pub product_name: String,
    /// First SKU seen for the product
    pub sku: Option<String>,
    /// One entry per size, in first-seen order
    pub size_quantities: Vec<SizeQuantity>,
}

impl AggregatedProduct {
    fn new(product_name: &str) -> Self {
        Self {
            product_name: product_name.to_string(),
            sku: None,
            size_quantities: Vec::new(),
        }
    }

    fn add(&mut self, line: &ParsedOrderLine) {
        match (&self.sku, &line.sku) {
            (None, Some(sku)) => self.sku = Some(sku.clone()),
            (Some(first), Some(sku)) if first != sku => {
                debug!(product = %self.product_name, first = %first, other = %sku, "Divergent SKU, keeping first");
            }
            _ => {}
        }

        match self.size_quantities.iter_mut().find(|sq| sq.size == line.size) {
            // Rows are capped at MAX_QUANTITY, so the u64 sum stays exact
            Some(sq) => sq.quantity = sq.quantity.saturating_add(line.quantity),
            None => self.size_quantities.push(SizeQuantity {
                size: line.size.clone(),
                quantity: line.quantity,
            }),
        }
    }

    /// Serialize as "Size-Qty, Size-Qty"
    pub fn descriptor(&self) -> String {
        self.size_quantities
            .iter()
            .map(|sq| format!("{}-{}", sq.size, sq.quantity))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Sum of quantities across all sizes
    pub fn total_quantity(&self) -> u64 {
        self.size_quantities
            .iter()
            .fold(0u64, |total, sq| total.saturating_add(sq.quantity))
    }
}

/// Group parsed lines by product and sum quantities per size
///
/// Products come out sorted by name; sizes keep the order they were first seen.
pub fn aggregate(lines: &[ParsedOrderLine]) -> Vec<AggregatedProduct> {
    let mut products: BTreeMap<&str, AggregatedProduct> = BTreeMap::new();

    for line in lines {
        products
            .entry(line.product_name.as_str())
            .or_insert_with(|| AggregatedProduct::new(&line.product_name))
            .add(line);
    }

    debug!(lines = lines.len(), products = products.len(), "Aggregated order lines");
    products.into_values().collect()
}
