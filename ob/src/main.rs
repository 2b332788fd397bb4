use std::fs;
use std::io::Write;

use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use tracing::{debug, info};

use orderboard::cli::{Cli, Command};
use orderboard::config::Config;
use orderboard::render;
use orderboard::{Dataset, Pipeline, SizeNormalizer, Table, normalize_sku};

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    // Priority: CLI --log-level > config file > INFO
    let level = match cli_log_level.or(config_log_level).map(str::to_uppercase).as_deref() {
        Some("TRACE") => tracing::Level::TRACE,
        Some("DEBUG") => tracing::Level::DEBUG,
        Some("INFO") | None => tracing::Level::INFO,
        Some("WARN") | Some("WARNING") => tracing::Level::WARN,
        Some("ERROR") => tracing::Level::ERROR,
        Some(other) => {
            eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", other);
            tracing::Level::INFO
        }
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    debug!("Logging initialized (level: {:?})", level);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_log_level = Config::load_log_level(cli.config.as_ref());
    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    match cli.command {
        Command::Run {
            orders,
            catalog,
            rto,
            format,
            output,
        } => {
            let catalog_path = catalog.unwrap_or_else(|| config.catalog_path.clone());
            info!(orders = %orders.display(), catalog = %catalog_path.display(), "orderboard run");

            let orders = Table::from_path(Dataset::Orders, &orders)?;
            let catalog = Table::from_path(Dataset::Catalog, &catalog_path)
                .context(format!("Catalog export {} is required", catalog_path.display()))?;
            let rto = rto.map(|path| Table::from_path(Dataset::Rto, path)).transpose()?;

            let result = Pipeline::new(&config).run(orders, &catalog, rto.as_ref())?;

            match output {
                Some(path) => {
                    colored::control::set_override(false);
                    let mut file = fs::File::create(&path).context(format!("Failed to create {}", path.display()))?;
                    render::render(&result.rows, format, &config.placeholder_image, &mut file)?;
                    println!("{} Wrote {} products to {}", "✓".green(), result.rows.len(), path.display());
                }
                None => {
                    let mut stdout = std::io::stdout().lock();
                    render::render(&result.rows, format, &config.placeholder_image, &mut stdout)?;
                    stdout.flush()?;
                }
            }

            for skipped in &result.report.skipped {
                eprintln!("{} row {}: {}", "skipped".yellow(), skipped.row, skipped.reason);
            }
            for warning in &result.report.size_warnings {
                eprintln!("{} {}", "warning".yellow(), warning);
            }
        }
        Command::Normalize { descriptor, product } => {
            let normalizer = SizeNormalizer::new(config.sizes.clone());
            let normalized = normalizer.normalize(&descriptor, &product);
            println!("{}", normalized.descriptor);
            for warning in &normalized.warnings {
                eprintln!("{} {}", "warning".yellow(), warning);
            }
        }
        Command::Sku { skus } => {
            for sku in skus {
                match normalize_sku(&sku) {
                    Some(normalized) => println!("{} {} {}", sku, "→".dimmed(), normalized.cyan()),
                    None => println!("{} {} {}", sku, "→".dimmed(), "(blank)".dimmed()),
                }
            }
        }
        Command::Config { write } => match write {
            Some(path) => {
                config.save(&path)?;
                println!("{} Saved config to {}", "✓".green(), path.display());
            }
            None => print!("{}", config.to_yaml()?),
        },
    }

    Ok(())
}
