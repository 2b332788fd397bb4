//! CLI argument parsing for orderboard

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::render::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "ob")]
#[command(author, version, about = "Per-product size and quantity board for order exports", long_about = None)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(short = 'l', long = "log-level", global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Aggregate an order export into per-product size totals
    Run {
        /// Order export CSV
        #[arg(short, long, required = true)]
        orders: PathBuf,

        /// Catalog export CSV (default: catalog_path from config)
        #[arg(short = 'p', long)]
        catalog: Option<PathBuf>,

        /// RTO vendor export CSV
        #[arg(short, long)]
        rto: Option<PathBuf>,

        /// Output format (text, json, csv)
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,

        /// Write output to a file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Reorder a size descriptor such as "L-2, S-3"
    Normalize {
        /// Descriptor to normalize
        #[arg(required = true)]
        descriptor: String,

        /// Product name used to infer a Player/Fan label
        #[arg(short, long, default_value = "")]
        product: String,
    },

    /// Show the size-stripped form of variant SKUs
    Sku {
        /// SKUs to normalize
        #[arg(required = true)]
        skus: Vec<String>,
    },

    /// Print the effective configuration
    Config {
        /// Save it to this path instead
        #[arg(short, long)]
        write: Option<PathBuf>,
    },
}
