//! End-to-end tests of the `betslip` binary: stdout must always be one JSON
//! record, the exit status tells success from failure.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../betslip-core/tests/fixtures")
        .join(name)
}

fn scratch_file(name: &str, contents: &[u8]) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("betslip-cli-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

fn betslip(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_betslip"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to spawn betslip")
}

fn stdout_json(output: &Output) -> Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(stdout.trim()).unwrap_or_else(|e| panic!("stdout is not JSON ({e}): {stdout}"))
}

fn assert_all_null(json: &Value) {
    for key in ["date", "sport", "league", "teamA", "teamB", "profitPercentage"] {
        assert_eq!(json[key], Value::Null, "{key}");
    }
    for slot in ["bet1", "bet2"] {
        for key in ["house", "odd", "type", "stake", "profit"] {
            assert!(json[slot].as_object().unwrap().contains_key(key));
            assert_eq!(json[slot][key], Value::Null, "{slot}.{key}");
        }
    }
}

#[test]
fn text_slip_prints_record() {
    let path = fixture("bullet_layout.txt");
    let output = betslip(&[path.to_str().unwrap()]);

    assert!(output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json["date"], "2025-09-27T19:00");
    assert_eq!(json["teamA"], "Real Madrid");
    assert_eq!(json["bet1"]["house"], "Bet365 (BR)");
    assert_eq!(json["bet2"]["odd"], 2.12);
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim().lines().count(), 1);
}

#[test]
fn pretty_output_is_indented() {
    let path = fixture("legacy_layout.txt");
    let output = betslip(&[path.to_str().unwrap(), "--pretty"]);

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("\n  \"teamA\": \"Flamengo\""));
}

#[test]
fn corrupt_pdf_fails_with_null_record() {
    let path = scratch_file("corrupt.pdf", b"this is not a pdf at all");
    let output = betslip(&[path.to_str().unwrap()]);

    assert!(!output.status.success());
    assert_all_null(&stdout_json(&output));
    assert!(!output.stderr.is_empty());
}

/// One-page PDF whose font dictionary lacks /Type /Font
fn pdf_with_untyped_font() -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });
    let content = Content {
        operations: vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 12.into()]),
            Operation::new("Td", vec![50.into(), 800.into()]),
            Operation::new("Tj", vec![Object::string_literal("Pinnacle Abaixo 2.5 2.12")]),
            Operation::new("ET", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

#[test]
fn malformed_font_fails_with_null_record() {
    let path = scratch_file("untyped_font.pdf", &pdf_with_untyped_font());
    let output = betslip(&[path.to_str().unwrap()]);

    assert_eq!(output.status.code(), Some(1));
    assert_all_null(&stdout_json(&output));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Processing failed"));
}

#[test]
fn missing_file_fails_with_null_record() {
    let output = betslip(&["/nonexistent/slip.pdf"]);

    assert!(!output.status.success());
    assert_all_null(&stdout_json(&output));
}

#[test]
fn unsupported_extension_fails() {
    let path = scratch_file("slip.docx", b"Betano Vencedor1 2.30");
    let output = betslip(&[path.to_str().unwrap()]);

    assert!(!output.status.success());
    assert_all_null(&stdout_json(&output));
    assert!(String::from_utf8_lossy(&output.stderr).contains("unsupported file type"));
}

#[test]
fn slip_without_bets_still_succeeds() {
    let path = fixture("no_bets.txt");
    let output = betslip(&[path.to_str().unwrap()]);

    assert!(output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json["teamB"], "Barcelona");
    assert_eq!(json["bet1"]["house"], Value::Null);
}

#[test]
fn max_pages_override() {
    let path = fixture("multiline_two_pages.txt");
    let output = betslip(&[path.to_str().unwrap(), "--max-pages", "1"]);

    assert!(output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json["bet1"]["house"], "KTO (BR)");
    assert_eq!(json["bet2"]["house"], Value::Null);
}

#[test]
fn unreadable_config_falls_back_to_defaults() {
    let path = fixture("bullet_layout.txt");
    let output = betslip(&[path.to_str().unwrap(), "--config", "/nonexistent/config.yaml"]);

    assert!(output.status.success());
    assert_eq!(stdout_json(&output)["bet2"]["house"], "Pinnacle");
}

#[test]
fn print_default_config_needs_no_input() {
    let output = betslip(&["--print-default-config"]);

    assert!(output.status.success());
    let yaml = String::from_utf8_lossy(&output.stdout);
    assert!(yaml.contains("max_pages: 2"));
    assert!(yaml.contains("early_exit: true"));
}

#[test]
fn dump_stages_writes_every_boundary() {
    let path = fixture("multiline_two_pages.txt");
    let dir = std::env::temp_dir().join(format!("betslip-cli-stages-{}", std::process::id()));
    let output = betslip(&[
        path.to_str().unwrap(),
        "--dump-stages",
        "--stages-dir",
        dir.to_str().unwrap(),
    ]);

    assert!(output.status.success());
    assert_eq!(stdout_json(&output)["bet2"]["house"], "SuperBet");
    for file in [
        "stage1_pages.json",
        "stage2_lines.json",
        "stage3_blocks.json",
        "stage4_bets.json",
        "stage5_record.json",
        "summary.json",
    ] {
        assert!(dir.join(file).exists(), "{file} missing");
    }
    std::fs::remove_dir_all(&dir).unwrap();
}
