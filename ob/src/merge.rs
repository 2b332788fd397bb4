//! Catalog image and RTO vendor enrichment

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use tracing::debug;

use crate::aggregate::AggregatedProduct;
use crate::config::{CatalogColumns, RtoColumns};
use crate::error::PipelineError;
use crate::parser::normalize_sku;
use crate::table::Table;

/// RTO items per vendor, vendors sorted by name
pub type RtoInfo = BTreeMap<String, Vec<String>>;

/// Primary-image row of the catalog export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub title: String,
    pub image_src: Option<String>,
    /// Normalized SKU
    pub sku: Option<String>,
}

/// One row of the RTO export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RtoEntry {
    pub product_name: String,
    pub vendor: String,
    pub size: Option<String>,
    pub quantity: Option<String>,
}

impl RtoEntry {
    /// "Size-Qty", bare size, or bare quantity
    fn item(&self) -> Option<String> {
        let quantity = self.quantity.as_deref().map(display_number);
        match (self.size.as_deref(), quantity) {
            (Some(size), Some(q)) => Some(format!("{}-{}", size, q)),
            (Some(size), None) => Some(size.to_string()),
            (None, Some(q)) => Some(q),
            (None, None) => None,
        }
    }
}

/// The enriched per-product row handed to renderers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FinalRow {
    pub product_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    /// Catalog image; renderers substitute a placeholder when absent
    pub image_src: Option<String>,
    pub size_quantity: String,
    pub rto_info: Option<RtoInfo>,
}

impl FinalRow {
    /// Image reference, or the placeholder when there is none
    pub fn image_or<'a>(&'a self, placeholder: &'a str) -> &'a str {
        self.image_src.as_deref().unwrap_or(placeholder)
    }
}

/// Render spreadsheet numbers like `5.0` as `5`
fn display_number(raw: &str) -> String {
    match raw.trim().parse::<f64>() {
        Ok(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
        _ => raw.trim().to_string(),
    }
}

/// Read primary-image rows from a catalog export
///
/// Only rows whose image position is 1 take part; the first such row per title wins.
pub fn parse_catalog_table(table: &Table, columns: &CatalogColumns) -> Result<Vec<CatalogEntry>, PipelineError> {
    let title_idx = table.require(&columns.title)?;
    let image_idx = table.require(&columns.image_src)?;
    let position_idx = table.require(&columns.image_position)?;
    let sku_idx = table.column(&columns.sku);

    let mut entries: Vec<CatalogEntry> = Vec::new();
    for i in 0..table.len() {
        let is_primary = table
            .get(i, position_idx)
            .and_then(|p| p.parse::<f64>().ok())
            .is_some_and(|p| p == 1.0);
        if !is_primary {
            continue;
        }
        let Some(title) = table.get(i, title_idx) else {
            continue;
        };
        if entries.iter().any(|e| e.title == title) {
            debug!(title, "Duplicate primary image row, keeping first");
            continue;
        }
        entries.push(CatalogEntry {
            title: title.to_string(),
            image_src: table.get(i, image_idx).map(str::to_string),
            sku: sku_idx.and_then(|idx| table.get(i, idx)).and_then(normalize_sku),
        });
    }

    debug!(rows = table.len(), entries = entries.len(), "Parsed catalog");
    Ok(entries)
}

/// Read vendor rows from an RTO export
pub fn parse_rto_table(table: &Table, columns: &RtoColumns) -> Result<Vec<RtoEntry>, PipelineError> {
    let product_idx = table.require(&columns.product)?;
    let vendor_idx = table.require(&columns.vendor)?;
    let size_idx = table.column(&columns.size);
    let quantity_idx = table.column(&columns.quantity);

    let entries: Vec<RtoEntry> = (0..table.len())
        .filter_map(|i| {
            Some(RtoEntry {
                product_name: table.get(i, product_idx)?.to_string(),
                vendor: table.get(i, vendor_idx)?.to_string(),
                size: size_idx.and_then(|idx| table.get(i, idx)).map(str::to_string),
                quantity: quantity_idx.and_then(|idx| table.get(i, idx)).map(str::to_string),
            })
        })
        .collect();

    debug!(rows = table.len(), entries = entries.len(), "Parsed RTO export");
    Ok(entries)
}

/// Catalog lookup by normalized SKU, falling back to exact title
#[derive(Debug, Clone, Default)]
pub struct CatalogIndex {
    entries: Vec<CatalogEntry>,
    by_sku: HashMap<String, usize>,
    by_title: HashMap<String, usize>,
}

impl CatalogIndex {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        let mut by_sku = HashMap::new();
        let mut by_title = HashMap::new();
        for (i, entry) in entries.iter().enumerate() {
            if let Some(sku) = &entry.sku {
                by_sku.entry(sku.clone()).or_insert(i);
            }
            by_title.entry(entry.title.clone()).or_insert(i);
        }
        Self {
            entries,
            by_sku,
            by_title,
        }
    }

    pub fn lookup(&self, product: &AggregatedProduct) -> Option<&CatalogEntry> {
        product
            .sku
            .as_ref()
            .and_then(|sku| self.by_sku.get(sku))
            .or_else(|| self.by_title.get(&product.product_name))
            .map(|&i| &self.entries[i])
    }
}

fn rto_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// RTO lookup by trimmed, case-insensitive product name
#[derive(Debug, Clone, Default)]
pub struct RtoIndex {
    by_name: HashMap<String, Vec<RtoEntry>>,
}

impl RtoIndex {
    pub fn new(entries: Vec<RtoEntry>) -> Self {
        let mut by_name: HashMap<String, Vec<RtoEntry>> = HashMap::new();
        for entry in entries {
            by_name.entry(rto_key(&entry.product_name)).or_default().push(entry);
        }
        Self { by_name }
    }

    /// Vendor items for a product, `None` when nothing matches
    pub fn lookup(&self, product_name: &str) -> Option<RtoInfo> {
        let entries = self.by_name.get(&rto_key(product_name))?;
        let mut info = RtoInfo::new();
        for entry in entries {
            let items = info.entry(entry.vendor.clone()).or_default();
            if let Some(item) = entry.item() {
                items.push(item);
            }
        }
        Some(info)
    }
}

/// Attaches catalog images and RTO info to aggregated products
#[derive(Debug, Clone, Default)]
pub struct Merger {
    catalog: CatalogIndex,
    rto: RtoIndex,
}

impl Merger {
    pub fn new(catalog: Vec<CatalogEntry>, rto: Vec<RtoEntry>) -> Self {
        Self {
            catalog: CatalogIndex::new(catalog),
            rto: RtoIndex::new(rto),
        }
    }

    /// Build the final row for one product; never drops a product
    pub fn merge(&self, product: &AggregatedProduct, size_quantity: String) -> FinalRow {
        let image_src = self.catalog.lookup(product).and_then(|e| e.image_src.clone());
        if image_src.is_none() {
            debug!(product = %product.product_name, "No catalog image");
        }

        FinalRow {
            product_name: product.product_name.clone(),
            sku: product.sku.clone(),
            image_src,
            size_quantity,
            rto_info: self.rto.lookup(&product.product_name),
        }
    }
}
