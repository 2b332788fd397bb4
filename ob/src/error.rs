//! Pipeline error types

use std::path::PathBuf;
use thiserror::Error;

/// Which input export a row or column belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dataset {
    Orders,
    Catalog,
    Rto,
}

impl std::fmt::Display for Dataset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Orders => write!(f, "orders"),
            Self::Catalog => write!(f, "catalog"),
            Self::Rto => write!(f, "rto"),
        }
    }
}

/// Errors that can occur while loading or processing exports
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("The {dataset} export is missing required column '{column}'")]
    MissingRequiredColumn { dataset: Dataset, column: String },

    #[error("Product field '{field}' has no size separator '{separator}'")]
    MalformedProductField { field: String, separator: String },

    #[error("Invalid quantity '{value}'")]
    InvalidQuantity { value: String },

    #[error("CSV error in {dataset} export: {source}")]
    Csv {
        dataset: Dataset,
        #[source]
        source: csv::Error,
    },

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PipelineError {
    /// Row-level errors skip the offending row; everything else aborts the run
    pub fn is_row_level(&self) -> bool {
        matches!(
            self,
            PipelineError::MalformedProductField { .. } | PipelineError::InvalidQuantity { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_column_message() {
        let err = PipelineError::MissingRequiredColumn {
            dataset: Dataset::Catalog,
            column: "Image Src".to_string(),
        };

        let msg = err.to_string();
        assert!(msg.contains("catalog"));
        assert!(msg.contains("Image Src"));
    }

    #[test]
    fn test_is_row_level() {
        let malformed = PipelineError::MalformedProductField {
            field: "Home Jersey".to_string(),
            separator: " - ".to_string(),
        };
        assert!(malformed.is_row_level());
        assert!(PipelineError::InvalidQuantity { value: "x".to_string() }.is_row_level());

        let missing = PipelineError::MissingRequiredColumn {
            dataset: Dataset::Orders,
            column: "*Product Name".to_string(),
        };
        assert!(!missing.is_row_level());
    }
}
