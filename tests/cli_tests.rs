mod common;

use predicates::prelude::*;
use serde_json::{json, Value};
use std::fs;
use assert_cmd::Command;
use tempfile::TempDir;

use common::{MockBackend, GENERATE_PATH, PREVIEW_PATH};

fn tirta_cmd() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("tirta"));
    cmd.env_remove("TIRTA_ACCESS_TOKEN").env_remove("RUST_LOG");
    cmd
}

fn invoice(n: usize) -> Value {
    json!({
        "invoice_number": format!("INV-202411-{n:04}"),
        "customer_id": format!("00000000-0000-0000-0000-{n:012}"),
        "customer_name": format!("Pelanggan {n}"),
        "customer_code": format!("CUST-{n:03}"),
        "usage_month": "2024-11",
        "usage_m3": 15.0,
        "price_per_m3": 8000,
        "water_charge": 120000,
        "abonemen": 30000,
        "penalty_amount": 0,
        "sub_total": 150000,
        "total_amount": 150000
    })
}

fn preview_body(success: usize, skipped: usize) -> Value {
    json!({
        "status": "success",
        "message": "Preview generated",
        "success": success,
        "skipped": skipped,
        "failed": 0,
        "total_amount": 150000 * success,
        "invoices": (1..=success).map(invoice).collect::<Vec<_>>(),
        "errors": [],
        "preview_only": true
    })
}

fn generate_body(success: usize, skipped: usize) -> Value {
    let mut body = preview_body(success, skipped);
    body["preview_only"] = json!(false);
    body["message"] = json!(format!("Generated {success} invoices"));
    body
}

fn unused() -> (u16, Value) {
    (500, json!({ "message": "unexpected call" }))
}

#[test]
fn test_help() {
    tirta_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Bulk invoice generation client for TirtaSaaS",
        ));
}

#[test]
fn test_version() {
    tirta_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("tirta"));
}

#[test]
fn test_init_creates_config() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("tirta-config");

    tirta_cmd()
        .args(["-C", config_path.to_str().unwrap(), "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized tirta config"));

    assert!(config_path.join("config.toml").exists());
}

#[test]
fn test_init_fails_if_exists() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("tirta-config");

    tirta_cmd()
        .args(["-C", config_path.to_str().unwrap(), "init"])
        .assert()
        .success();

    tirta_cmd()
        .args(["-C", config_path.to_str().unwrap(), "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_status_without_init() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("nonexistent");

    tirta_cmd()
        .args(["-C", config_path.to_str().unwrap(), "status"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_status_hides_token() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("tirta-config");

    tirta_cmd()
        .args(["-C", config_path.to_str().unwrap(), "init"])
        .assert()
        .success();

    tirta_cmd()
        .args(["-C", config_path.to_str().unwrap(), "status"])
        .env("TIRTA_ACCESS_TOKEN", "super-secret")
        .assert()
        .success()
        .stdout(predicate::str::contains("http://localhost:8080"))
        .stdout(predicate::str::contains("Access token:     configured"))
        .stdout(predicate::str::contains("Default month:"))
        .stdout(predicate::str::contains("super-secret").not());
}

#[test]
fn test_preview_without_api_url() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("nonexistent");

    tirta_cmd()
        .args(["-C", config_path.to_str().unwrap(), "preview"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No API URL configured"));
}

#[test]
fn test_preview_invalid_month() {
    tirta_cmd()
        .args(["--api-url", "http://127.0.0.1:1", "preview", "--month", "2024-13"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid month '2024-13'"));
}

#[test]
fn test_preview_future_month_is_rejected_before_any_request() {
    let backend = MockBackend::start((200, preview_body(1, 0)), unused());

    tirta_cmd()
        .args(["--api-url", &backend.url, "preview", "--month", "2999-01"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("is in the future"));

    assert!(backend.requests().is_empty());
}

#[test]
fn test_preview_renders_panel() {
    let mut body = preview_body(3, 1);
    body["total_amount"] = json!(450000);
    let backend = MockBackend::start((200, body), unused());

    tirta_cmd()
        .args([
            "--api-url",
            &backend.url,
            "--token",
            "test-token",
            "preview",
            "--month",
            "2024-11",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Preview Results - 2024-11"))
        .stdout(predicate::str::contains("Rp 450.000"))
        .stdout(predicate::str::contains("Invoice Preview (3 items)"))
        .stdout(predicate::str::contains("INV-202411-0003"))
        .stdout(predicate::str::contains("more invoices").not());

    let requests = backend.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].path, PREVIEW_PATH);
    assert_eq!(requests[0].authorization.as_deref(), Some("Bearer test-token"));
    assert_eq!(
        requests[0].body,
        json!({ "usage_month": "2024-11", "customer_ids": [] })
    );
}

#[test]
fn test_preview_caps_rows_and_errors() {
    let mut body = preview_body(55, 0);
    body["errors"] = json!((1..=13)
        .map(|n| format!("Invoice already exists for customer {n}"))
        .collect::<Vec<_>>());
    let backend = MockBackend::start((200, body), unused());

    tirta_cmd()
        .args(["--api-url", &backend.url, "preview", "--month", "2024-11"])
        .assert()
        .success()
        .stdout(predicate::str::contains("INV-202411-0050"))
        .stdout(predicate::str::contains("INV-202411-0051").not())
        .stdout(predicate::str::contains("... and 5 more invoices"))
        .stdout(predicate::str::contains("Errors (13)"))
        .stdout(predicate::str::contains("... and 3 more errors"));
}

#[test]
fn test_preview_customer_filter_and_json() {
    let backend = MockBackend::start((200, preview_body(1, 0)), unused());

    tirta_cmd()
        .args([
            "--api-url",
            &backend.url,
            "preview",
            "--month",
            "2024-11",
            "--customer",
            "cust-a",
            "--customer",
            "cust-b",
            "--json",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"preview_only\": true"));

    let requests = backend.requests();
    assert_eq!(requests[0].body["customer_ids"], json!(["cust-a", "cust-b"]));
}

#[test]
fn test_preview_server_error_message() {
    let backend = MockBackend::start((500, json!({ "message": "Database error" })), unused());

    tirta_cmd()
        .args(["--api-url", &backend.url, "preview", "--month", "2024-11"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("backend rejected generation request"))
        .stderr(predicate::str::ends_with("Error: Database error\n"));

    tirta_cmd()
        .args(["--api-url", &backend.url, "preview", "--month", "2024-11"])
        .env("RUST_LOG", "error")
        .assert()
        .failure()
        .stderr("Error: Database error\n");
}

#[test]
fn test_preview_error_field_and_fallback() {
    let backend = MockBackend::start((401, json!({ "error": "Unauthorized" })), unused());
    tirta_cmd()
        .args(["--api-url", &backend.url, "preview"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error: Unauthorized"));

    let backend = MockBackend::start((422, json!({})), unused());
    tirta_cmd()
        .args(["--api-url", &backend.url, "preview"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error: Failed to preview invoices"));
}

#[test]
fn test_preview_network_failure() {
    tirta_cmd()
        .args(["--api-url", "http://127.0.0.1:1", "preview", "--month", "2024-11"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("generation request failed"))
        .stderr(predicate::str::ends_with(
            "Failed to preview invoices. Please try again.\n",
        ));
}

#[test]
fn test_token_and_url_from_config() {
    let backend = MockBackend::start((200, preview_body(1, 0)), unused());
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("tirta-config");
    fs::create_dir_all(&config_path).unwrap();
    fs::write(
        config_path.join("config.toml"),
        format!(
            "[api]\nbase_url = \"{}\"\n\n[auth]\naccess_token = \"from-config\"\n",
            backend.url
        ),
    )
    .unwrap();

    tirta_cmd()
        .args(["-C", config_path.to_str().unwrap(), "preview"])
        .assert()
        .success();

    let requests = backend.requests();
    assert_eq!(
        requests[0].authorization.as_deref(),
        Some("Bearer from-config")
    );
}

#[test]
fn test_generate_with_yes_commits() {
    let backend = MockBackend::start((200, preview_body(3, 1)), (200, generate_body(3, 1)));

    tirta_cmd()
        .args([
            "--api-url",
            &backend.url,
            "generate",
            "--month",
            "2024-11",
            "--yes",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Success! Generated 3 invoices."))
        .stdout(predicate::str::contains("Invoices Generated Successfully!"))
        .stdout(predicate::str::contains("Generated 3 invoices"));

    let commits = backend.requests_to(GENERATE_PATH);
    assert_eq!(commits.len(), 1);
    assert_eq!(
        commits[0].body,
        json!({ "usage_month": "2024-11", "customer_ids": [], "preview": false })
    );
    assert_eq!(backend.requests_to(PREVIEW_PATH).len(), 1);
}

#[test]
fn test_generate_nothing_to_generate() {
    let mut body = preview_body(0, 4);
    body["failed"] = json!(2);
    let backend = MockBackend::start((200, body), unused());

    tirta_cmd()
        .args([
            "--api-url",
            &backend.url,
            "generate",
            "--month",
            "2024-11",
            "--yes",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing to generate for 2024-11."));

    assert!(backend.requests_to(GENERATE_PATH).is_empty());
}

#[test]
fn test_generate_without_terminal_refuses_to_commit() {
    let backend = MockBackend::start((200, preview_body(2, 0)), (200, generate_body(2, 0)));

    tirta_cmd()
        .args(["--api-url", &backend.url, "generate", "--month", "2024-11"])
        .write_stdin("")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Pass --yes"))
        .stdout(predicate::str::contains("Success!").not());

    assert_eq!(backend.requests_to(PREVIEW_PATH).len(), 1);
    assert!(backend.requests_to(GENERATE_PATH).is_empty());
}

#[test]
fn test_generate_commit_failure() {
    let backend = MockBackend::start(
        (200, preview_body(2, 0)),
        (500, json!({ "error": "Failed to generate invoice numbers" })),
    );

    tirta_cmd()
        .args([
            "--api-url",
            &backend.url,
            "generate",
            "--month",
            "2024-11",
            "--yes",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Error: Failed to generate invoice numbers",
        ));

    assert_eq!(backend.requests_to(GENERATE_PATH).len(), 1);
}
