//! Configuration for orderboard

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Catalog export used when `--catalog` is not given
    pub catalog_path: PathBuf,

    /// Image reference shown for products with no catalog image
    pub placeholder_image: String,

    /// Separator between product name and size in the order export
    pub separator: String,

    /// Canonical size order
    pub sizes: Vec<String>,

    /// Column names of the input exports
    pub columns: ColumnsConfig,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
}

fn default_catalog_path() -> PathBuf {
    PathBuf::from("products_export.csv")
}

fn default_placeholder_image() -> String {
    "https://via.placeholder.com/150".to_string()
}

fn default_separator() -> String {
    crate::SIZE_SEPARATOR.to_string()
}

fn default_sizes() -> Vec<String> {
    crate::CANONICAL_SIZES.iter().map(|s| s.to_string()).collect()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog_path: default_catalog_path(),
            placeholder_image: default_placeholder_image(),
            separator: default_separator(),
            sizes: default_sizes(),
            columns: ColumnsConfig::default(),
            log_level: None,
        }
    }
}

/// Column names for each export
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnsConfig {
    pub orders: OrderColumns,
    pub catalog: CatalogColumns,
    pub rto: RtoColumns,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderColumns {
    /// Compound "<name> - <size>" field
    pub product: String,
    pub quantity: String,
    /// Optional; read only when present in the export
    pub sku: String,
    /// Processing remark column dropped before aggregation
    pub error: String,
}

impl Default for OrderColumns {
    fn default() -> Self {
        Self {
            product: "*Product Name".to_string(),
            quantity: "*Product Quantity".to_string(),
            sku: "*Product SKU".to_string(),
            error: "Error".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogColumns {
    pub title: String,
    pub image_src: String,
    pub image_position: String,
    /// Optional; read only when present in the export
    pub sku: String,
}

impl Default for CatalogColumns {
    fn default() -> Self {
        Self {
            title: "Title".to_string(),
            image_src: "Image Src".to_string(),
            image_position: "Image Position".to_string(),
            sku: "Variant SKU".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RtoColumns {
    pub product: String,
    pub vendor: String,
    pub size: String,
    pub quantity: String,
}

impl Default for RtoColumns {
    fn default() -> Self {
        Self {
            product: "Product Name".to_string(),
            vendor: "Vendor".to_string(),
            size: "Size".to_string(),
            quantity: "Quantity".to_string(),
        }
    }
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Project-local config: ./orderboard.yml
        let local_config = PathBuf::from("orderboard.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // User config: ~/.config/orderboard/orderboard.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("orderboard").join("orderboard.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        Ok(Self::default())
    }

    /// Read only the log level, before logging is set up
    pub fn load_log_level(config_path: Option<&PathBuf>) -> Option<String> {
        Self::load(config_path).ok().and_then(|c| c.log_level)
    }

    fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        let config: Config = serde_yaml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }

    /// Render config as YAML
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Save config to file
    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_yaml()?).context(format!("Failed to write config to {}", path.display()))?;
        Ok(())
    }
}
