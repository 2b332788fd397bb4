//! Canonical size ordering and Player/Fan labels for size descriptors
//!
//! A descriptor is the human-readable form of a product's size totals:
//!
//! ```text
//! Player S-3, M-1, L-2, 24-26-1
//! ^^^^^^ ^^^^^^^^^^^^^^^^ ^^^^^^^
//! label  canonical sizes  unknown sizes, original order
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::aggregate::SizeQuantity;

/// Category label that may lead a descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Label {
    Player,
    Fan,
}

impl Label {
    /// Labels in detection order; the first match wins
    pub const ALL: [Label; 2] = [Label::Player, Label::Fan];

    /// Infer a label from a product name by case-insensitive substring match
    pub fn detect(product_name: &str) -> Option<Self> {
        let name = product_name.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|label| name.contains(&label.to_string().to_lowercase()))
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Player => write!(f, "Player"),
            Self::Fan => write!(f, "Fan"),
        }
    }
}

impl std::str::FromStr for Label {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "player" => Ok(Self::Player),
            "fan" => Ok(Self::Fan),
            _ => Err(format!("Unknown label: {}", s)),
        }
    }
}

/// A size token without a `-` between size and quantity
///
/// Recoverable: the token is dropped and the rest of the descriptor is kept.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Malformed size token '{token}'")]
pub struct MalformedSizeToken {
    pub token: String,
}

/// Result of normalizing one descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    pub descriptor: String,
    pub label: Option<Label>,
    pub warnings: Vec<MalformedSizeToken>,
}

/// Reorders descriptors by a canonical size sequence
#[derive(Debug, Clone)]
pub struct SizeNormalizer {
    order: Vec<String>,
}

impl Default for SizeNormalizer {
    fn default() -> Self {
        Self::new(crate::CANONICAL_SIZES.iter().map(|s| s.to_string()).collect())
    }
}

impl SizeNormalizer {
    pub fn new(order: Vec<String>) -> Self {
        Self { order }
    }

    /// Canonical rank of a size, `None` for sizes outside the sequence
    fn rank(&self, size: &str) -> Option<usize> {
        self.order.iter().position(|s| s == size)
    }

    /// Normalize a "Size-Qty, Size-Qty" descriptor for a product
    ///
    /// A leading `Player`/`Fan` token (any case) is kept and title-cased. With
    /// no such token the label is inferred from the product name. A descriptor
    /// with no valid size tokens normalizes to the empty string.
    pub fn normalize(&self, descriptor: &str, product_name: &str) -> Normalized {
        let (explicit, body) = split_label(descriptor.trim());
        let label = explicit.or_else(|| Label::detect(product_name));

        let mut entries = Vec::new();
        let mut warnings = Vec::new();

        for token in body.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            match split_size_token(token) {
                Some((size, quantity)) => entries.push((size, quantity.to_string())),
                None => {
                    let warning = MalformedSizeToken {
                        token: token.to_string(),
                    };
                    warn!(product = product_name, %warning, "Dropping size token");
                    warnings.push(warning);
                }
            }
        }

        Normalized {
            descriptor: self.render(label, entries),
            label,
            warnings,
        }
    }

    /// Normalize aggregated sizes without going through descriptor text
    ///
    /// Sizes are taken verbatim, so a size containing `,` or starting with a
    /// label word is neither dropped nor read as a label. The label comes from
    /// the product name only.
    pub fn normalize_sizes(&self, sizes: &[SizeQuantity], product_name: &str) -> Normalized {
        let label = Label::detect(product_name);
        let entries = sizes
            .iter()
            .map(|sq| (sq.size.as_str(), sq.quantity.to_string()))
            .collect();

        Normalized {
            descriptor: self.render(label, entries),
            label,
            warnings: Vec::new(),
        }
    }

    /// Order (size, quantity) pairs canonically and serialize with the label
    fn render(&self, label: Option<Label>, entries: Vec<(&str, String)>) -> String {
        let mut known: Vec<(usize, String)> = Vec::new();
        let mut unknown: Vec<String> = Vec::new();

        for (size, quantity) in entries {
            let entry = format!("{}-{}", size, quantity);
            match self.rank(size) {
                Some(rank) => known.push((rank, entry)),
                None => unknown.push(entry),
            }
        }

        // Stable, so repeated sizes keep their relative order
        known.sort_by_key(|(rank, _)| *rank);

        let sizes: Vec<String> = known.into_iter().map(|(_, entry)| entry).chain(unknown).collect();
        match (label, sizes.is_empty()) {
            (_, true) => String::new(),
            (Some(label), false) => format!("{} {}", label, sizes.join(", ")),
            (None, false) => sizes.join(", "),
        }
    }
}

/// Split a leading label token off a descriptor
fn split_label(descriptor: &str) -> (Option<Label>, &str) {
    if let Some((head, rest)) = descriptor.split_once(char::is_whitespace)
        && let Ok(label) = head.parse::<Label>()
    {
        return (Some(label), rest.trim_start());
    }
    (None, descriptor)
}

/// Split "Size-Qty" at the last `-`
fn split_size_token(token: &str) -> Option<(&str, &str)> {
    let (size, quantity) = token.rsplit_once('-')?;
    let (size, quantity) = (size.trim(), quantity.trim());
    if size.is_empty() || quantity.is_empty() {
        return None;
    }
    Some((size, quantity))
}
