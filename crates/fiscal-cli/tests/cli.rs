//! End-to-end tests of the `fiscal` binary.

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const SLIP: &str = "\
Boleto bancário - Banco Itaú 341-7
Beneficiário: ACME SERVICOS LTDA CNPJ 11.222.333/0001-81
Vencimento: 10/01/2025
Valor do Documento: R$ 123,45
";

fn fiscal(config: &Path) -> Command {
    let mut cmd = Command::cargo_bin("fiscal").unwrap();
    cmd.arg("-c")
        .arg(config)
        .env_remove("OPENAI_API_KEY")
        .env_remove("GEMINI_API_KEY");
    cmd
}

/// Temp dir holding an empty config file and the given documents.
fn workspace(files: &[(&str, &str)]) -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("config.json");
    fs::write(&config, "{}").unwrap();
    for (name, content) in files {
        fs::write(dir.path().join(name), content).unwrap();
    }
    (dir, config)
}

#[test]
fn test_classify() {
    let (dir, config) = workspace(&[("slip.txt", SLIP), ("rent.txt", "Recibo de aluguel")]);

    fiscal(&config)
        .arg("classify")
        .arg(dir.path().join("slip.txt"))
        .assert()
        .success()
        .stdout("BOLETO\n");

    fiscal(&config)
        .arg("classify")
        .arg(dir.path().join("slip.txt"))
        .arg(dir.path().join("rent.txt"))
        .assert()
        .success()
        .stdout(predicate::str::contains("slip.txt\tBOLETO"))
        .stdout(predicate::str::contains("rent.txt\tOUTRO"));
}

#[test]
fn test_extract_json() {
    let (dir, config) = workspace(&[("slip.txt", SLIP)]);

    fiscal(&config)
        .arg("extract")
        .arg(dir.path().join("slip.txt"))
        .args(["--company", "acme"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""expenseType": "BOLETO""#))
        .stdout(predicate::str::contains("123.45"))
        .stdout(predicate::str::contains("2025-01-10"))
        .stdout(predicate::str::contains(r#""companyId": "acme""#));
}

#[test]
fn test_extract_text_to_file() {
    let (dir, config) = workspace(&[("slip.txt", SLIP)]);
    let output = dir.path().join("slip.out");

    fiscal(&config)
        .arg("extract")
        .arg(dir.path().join("slip.txt"))
        .args(["--format", "text", "--output"])
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("Output written to"));

    let written = fs::read_to_string(output).unwrap();
    assert!(written.contains("Type: BOLETO"));
    assert!(written.contains("Due: 10/01/2025"));
    assert!(written.contains("Total: R$ 123.45"));
}

#[test]
fn test_extract_short_text_fails() {
    let (dir, config) = workspace(&[("short.txt", "NF-e")]);

    fiscal(&config)
        .arg("extract")
        .arg(dir.path().join("short.txt"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("resubmit for OCR"));
}

#[test]
fn test_extract_with_mock_provider() {
    let (dir, config) = workspace(&[("slip.txt", SLIP)]);

    fiscal(&config)
        .arg("extract")
        .arg(dir.path().join("slip.txt"))
        .args(["--ai-plan", "basic", "--provider", "mock", "--ai-only"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""expenseType": "BOLETO""#))
        .stdout(predicate::str::contains("123.45").not());
}

#[test]
fn test_extract_forced_type() {
    let (dir, config) = workspace(&[("slip.txt", SLIP)]);

    fiscal(&config)
        .arg("extract")
        .arg(dir.path().join("slip.txt"))
        .args(["--type", "fatura", "--format", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("expense_type,number"))
        .stdout(predicate::str::contains("FATURA,"));
}

#[test]
fn test_validate() {
    let (_dir, config) = workspace(&[]);

    fiscal(&config)
        .args(["validate", "529.982.247-25", "11222333000181"])
        .assert()
        .success()
        .stdout(predicate::str::contains("CPF 529.982.247-25"))
        .stdout(predicate::str::contains("CNPJ 11.222.333/0001-81"));

    fiscal(&config)
        .args(["validate", "11.222.333/0001-82"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("invalid 11.222.333/0001-82"));
}

#[test]
fn test_config_get_and_set() {
    let (_dir, config) = workspace(&[]);

    fiscal(&config)
        .args(["config", "get", "extraction.min_text_length"])
        .assert()
        .success()
        .stdout("20\n");

    fiscal(&config)
        .args(["config", "set", "ai.provider", "gemini"])
        .assert()
        .success();

    fiscal(&config)
        .args(["config", "get", "ai.provider"])
        .assert()
        .success()
        .stdout("\"gemini\"\n");

    fiscal(&config)
        .args(["config", "set", "ai.provider", "claude"])
        .assert()
        .failure();

    fiscal(&config)
        .args(["config", "get", "extraction.no_such_key"])
        .assert()
        .failure();
}

#[test]
fn test_config_init_refuses_overwrite() {
    let (_dir, config) = workspace(&[]);

    fiscal(&config)
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));

    fiscal(&config)
        .args(["config", "init", "--force"])
        .assert()
        .success();

    let written = fs::read_to_string(&config).unwrap();
    assert!(written.contains("min_text_length"));
}

#[test]
fn test_batch_with_summary() {
    let (dir, config) = workspace(&[("slip.txt", SLIP), ("short.txt", "curto")]);
    let out = dir.path().join("out");
    let pattern = dir.path().join("*.txt");

    fiscal(&config)
        .arg("batch")
        .arg(pattern.to_str().unwrap())
        .arg("--output-dir")
        .arg(&out)
        .args(["--summary", "--continue-on-error"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 successful, 1 failed"));

    assert!(out.join("slip.json").exists());
    assert!(!out.join("short.json").exists());

    let summary = fs::read_to_string(out.join("summary.csv")).unwrap();
    assert!(summary.contains("slip.txt,success,BOLETO"));
    assert!(summary.contains("short.txt,error"));
}

#[test]
fn test_batch_stops_on_error() {
    let (dir, config) = workspace(&[("slip.txt", SLIP), ("short.txt", "curto")]);
    let pattern = dir.path().join("*.txt");

    fiscal(&config)
        .arg("batch")
        .arg(pattern.to_str().unwrap())
        .assert()
        .failure()
        .stderr(predicate::str::contains("short.txt"));
}
