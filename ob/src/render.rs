//! Output renderers for final rows
//!
//! Rows are numbered from 1 in pipeline order; that number is the stable key
//! external tooling uses to track per-product completion.

use std::io::Write;

use colored::*;
use eyre::Result;

use crate::merge::{FinalRow, RtoInfo};

/// Output format for `ob run`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Csv,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "plain" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            _ => Err(format!("Unknown format: {}. Use: text, json, or csv", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
            Self::Csv => write!(f, "csv"),
        }
    }
}

/// Flatten vendor items as "acme: S-5, M; zeta: XL-2"
pub fn format_rto(info: &RtoInfo) -> String {
    info.iter()
        .map(|(vendor, items)| {
            if items.is_empty() {
                vendor.clone()
            } else {
                format!("{}: {}", vendor, items.join(", "))
            }
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// Write rows in the requested format
pub fn render(rows: &[FinalRow], format: OutputFormat, placeholder: &str, out: &mut impl Write) -> Result<()> {
    match format {
        OutputFormat::Text => render_text(rows, placeholder, out),
        OutputFormat::Json => render_json(rows, out),
        OutputFormat::Csv => render_csv(rows, placeholder, out),
    }
}

fn render_text(rows: &[FinalRow], placeholder: &str, out: &mut impl Write) -> Result<()> {
    if rows.is_empty() {
        writeln!(out, "No products found")?;
        return Ok(());
    }

    for (i, row) in rows.iter().enumerate() {
        writeln!(out, "{} {}", format!("[{}]", i + 1).dimmed(), row.product_name.bold())?;
        match &row.image_src {
            Some(src) => writeln!(out, "    image: {}", src)?,
            None => writeln!(out, "    image: {}", placeholder.dimmed())?,
        }
        writeln!(out, "    sizes: {}", row.size_quantity.cyan())?;
        if let Some(info) = &row.rto_info {
            writeln!(out, "    rto:   {}", format_rto(info).yellow())?;
        }
    }
    Ok(())
}

fn render_json(rows: &[FinalRow], out: &mut impl Write) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, rows)?;
    writeln!(out)?;
    Ok(())
}

fn render_csv(rows: &[FinalRow], placeholder: &str, out: &mut impl Write) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(["Index", "Product Name", "Image Src", "Size & Quantity", "RTO"])?;
    for (i, row) in rows.iter().enumerate() {
        let rto = row.rto_info.as_ref().map(format_rto).unwrap_or_default();
        writer.write_record([
            (i + 1).to_string().as_str(),
            row.product_name.as_str(),
            row.image_or(placeholder),
            row.size_quantity.as_str(),
            rto.as_str(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows() -> Vec<FinalRow> {
        let mut info = RtoInfo::new();
        info.insert("acme".to_string(), vec!["S-5".to_string(), "M".to_string()]);
        info.insert("zeta".to_string(), vec![]);

        vec![
            FinalRow {
                product_name: "Home Jersey".to_string(),
                sku: None,
                image_src: Some("img.png".to_string()),
                size_quantity: "S-4, L-2".to_string(),
                rto_info: Some(info),
            },
            FinalRow {
                product_name: "Scarf".to_string(),
                sku: Some("SC".to_string()),
                image_src: None,
                size_quantity: "OS-1".to_string(),
                rto_info: None,
            },
        ]
    }

    fn render_to_string(format: OutputFormat) -> String {
        let mut buf = Vec::new();
        render(&rows(), format, "placeholder.png", &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_format_parse() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("plain".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert!("xml".parse::<OutputFormat>().is_err());
        assert_eq!(OutputFormat::Csv.to_string(), "csv");
    }

    #[test]
    fn test_format_rto() {
        let rows = rows();
        assert_eq!(format_rto(rows[0].rto_info.as_ref().unwrap()), "acme: S-5, M; zeta");
    }

    #[test]
    fn test_render_csv() {
        let out = render_to_string(OutputFormat::Csv);
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines[0], "Index,Product Name,Image Src,Size & Quantity,RTO");
        assert_eq!(lines[1], "1,Home Jersey,img.png,\"S-4, L-2\",\"acme: S-5, M; zeta\"");
        assert_eq!(lines[2], "2,Scarf,placeholder.png,OS-1,");
    }

    #[test]
    fn test_render_json_keeps_null_image() {
        let out = render_to_string(OutputFormat::Json);
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value[0]["size_quantity"], "S-4, L-2");
        assert_eq!(value[0]["rto_info"]["acme"][1], "M");
        assert!(value[1]["image_src"].is_null());
        assert_eq!(value[1]["sku"], "SC");
    }

    #[test]
    fn test_render_text() {
        colored::control::set_override(false);
        let out = render_to_string(OutputFormat::Text);
        assert!(out.contains("[1] Home Jersey"));
        assert!(out.contains("sizes: S-4, L-2"));
        assert!(out.contains("image: placeholder.png"));
        assert!(out.contains("rto:   acme: S-5, M; zeta"));
    }

    #[test]
    fn test_render_text_empty() {
        let mut buf = Vec::new();
        render(&[], OutputFormat::Text, "p.png", &mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "No products found\n");
    }
}
