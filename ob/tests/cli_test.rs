//! End-to-end tests for the `ob` binary

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const ORDERS: &str = "\
*Product Name,*Product Quantity,Error
Home Jersey - L,2,
Home Jersey - S,3,
Home Jersey - S,1,
Player Away Kit - XL,1,
Gift Card,1,
";

const CATALOG: &str = "\
Title,Image Src,Image Position
Home Jersey,https://cdn.example.com/home.png,1
Home Jersey,https://cdn.example.com/home-back.png,2
";

const RTO: &str = "\
Product Name,Vendor,Size,Quantity
home jersey ,acme,S,5
HOME JERSEY,acme,M,
";

fn write_inputs(dir: &Path) {
    fs::write(dir.join("orders.csv"), ORDERS).unwrap();
    fs::write(dir.join("products_export.csv"), CATALOG).unwrap();
    fs::write(dir.join("rto.csv"), RTO).unwrap();
}

fn ob(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("ob").unwrap();
    cmd.current_dir(dir).env("NO_COLOR", "1").env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_run_text_uses_default_catalog() {
    let temp = TempDir::new().unwrap();
    write_inputs(temp.path());

    ob(temp.path())
        .args(["run", "--orders", "orders.csv", "--rto", "rto.csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Home Jersey"))
        .stdout(predicate::str::contains("S-4, L-2"))
        .stdout(predicate::str::contains("Player XL-1"))
        .stdout(predicate::str::contains("acme: S-5, M"))
        .stdout(predicate::str::contains("https://via.placeholder.com/150"))
        .stderr(predicate::str::contains("Gift Card"));
}

#[test]
fn test_run_json_output_file() {
    let temp = TempDir::new().unwrap();
    write_inputs(temp.path());

    ob(temp.path())
        .args([
            "run",
            "--orders",
            "orders.csv",
            "--catalog",
            "products_export.csv",
            "--format",
            "json",
            "--output",
            "board.json",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote 2 products"));

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(temp.path().join("board.json")).unwrap()).unwrap();
    let rows = json.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["product_name"], "Home Jersey");
    assert_eq!(rows[0]["image_src"], "https://cdn.example.com/home.png");
    assert!(rows[1]["image_src"].is_null());
}

#[test]
fn test_run_missing_catalog_fails() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("orders.csv"), ORDERS).unwrap();

    ob(temp.path())
        .args(["run", "--orders", "orders.csv"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("products_export.csv"));
}

#[test]
fn test_run_missing_column_fails() {
    let temp = TempDir::new().unwrap();
    write_inputs(temp.path());
    fs::write(temp.path().join("orders.csv"), "Name,Qty\nHome Jersey - S,1\n").unwrap();

    ob(temp.path())
        .args(["run", "--orders", "orders.csv"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("*Product Name"));
}

#[test]
fn test_normalize_command() {
    let temp = TempDir::new().unwrap();

    ob(temp.path())
        .args(["normalize", "L-2, S-3, OneSize", "--product", "Player Home Jersey"])
        .assert()
        .success()
        .stdout("Player S-3, L-2\n")
        .stderr(predicate::str::contains("OneSize"));
}

#[test]
fn test_sku_command() {
    let temp = TempDir::new().unwrap();

    ob(temp.path())
        .args(["sku", "KIT-01-24-26"])
        .assert()
        .success()
        .stdout(predicate::str::contains("KIT-01"));
}

#[test]
fn test_config_write_and_reuse() {
    let temp = TempDir::new().unwrap();
    write_inputs(temp.path());

    ob(temp.path())
        .args(["config", "--write", "custom.yml"])
        .assert()
        .success();

    let yaml = fs::read_to_string(temp.path().join("custom.yml")).unwrap();
    assert!(yaml.contains("products_export.csv"));

    let yaml = yaml.replace("https://via.placeholder.com/150", "missing.png");
    fs::write(temp.path().join("custom.yml"), yaml).unwrap();

    ob(temp.path())
        .args(["--config", "custom.yml", "run", "--orders", "orders.csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("missing.png"));
}
