use std::fs::File;
use std::io::Read;
use std::path::Path;

use assert_cmd::Command;
use predicates::str::contains;
use serde_json::json;
use tempfile::TempDir;

fn cmd() -> Command {
    Command::cargo_bin("tokenest-report").unwrap()
}

fn write_payload(dir: &TempDir, payload: &serde_json::Value) -> std::path::PathBuf {
    let path = dir.path().join("payload.json");
    std::fs::write(&path, serde_json::to_vec(payload).unwrap()).unwrap();
    path
}

fn read_entry(path: &Path, name: &str) -> String {
    let mut archive = zip::ZipArchive::new(File::open(path).unwrap()).unwrap();
    let mut text = String::new();
    archive
        .by_name(name)
        .unwrap()
        .read_to_string(&mut text)
        .unwrap();
    text
}

fn list_entries(path: &Path) -> Vec<String> {
    let archive = zip::ZipArchive::new(File::open(path).unwrap()).unwrap();
    archive.file_names().map(str::to_string).collect()
}

fn count_prefix(entries: &[String], prefix: &str) -> usize {
    entries
        .iter()
        .filter(|name| name.starts_with(prefix) && name.ends_with(".xml"))
        .count()
}

/// XML of the `<c>` element at `cell_ref`.
fn cell_xml<'a>(sheet_xml: &'a str, cell_ref: &str) -> &'a str {
    let n_start = sheet_xml
        .find(&format!("<c r=\"{cell_ref}\""))
        .unwrap_or_else(|| panic!("cell {cell_ref} missing"));
    let n_len = sheet_xml[n_start..].find("</c>").unwrap();
    &sheet_xml[n_start..n_start + n_len]
}

#[test]
fn accuracy_payload_writes_data_and_chart_sheets() {
    let dir = TempDir::new().unwrap();
    let path_in = write_payload(
        &dir,
        &json!({
            "report_type": "accuracy",
            "header": ["Metric", "Value", "Dev%"],
            "rows": [["a", "10", "5%"]],
            "deviation_columns": [{"index": 2, "title": "Dev"}]
        }),
    );
    let path_out = dir.path().join("accuracy.xlsx");

    cmd()
        .arg("--input")
        .arg(&path_in)
        .arg("--output")
        .arg(&path_out)
        .assert()
        .success()
        .stdout(contains("kind=accuracy"))
        .stdout(contains("charts=1"));

    let entries = list_entries(&path_out);
    assert_eq!(count_prefix(&entries, "xl/worksheets/sheet"), 2);
    assert_eq!(count_prefix(&entries, "xl/charts/chart"), 1);

    let workbook_xml = read_entry(&path_out, "xl/workbook.xml");
    assert!(workbook_xml.contains("name=\"Accuracy\""));
    assert!(workbook_xml.contains("name=\"Charts\""));

    let sheet_xml = read_entry(&path_out, "xl/worksheets/sheet1.xml");
    assert!(cell_xml(&sheet_xml, "B6").contains("<v>10</v>"));
    assert!(cell_xml(&sheet_xml, "C6").contains("<v>0.05</v>"));
    assert!(sheet_xml.contains("<pane"));

    let chart_xml = read_entry(&path_out, "xl/charts/chart1.xml");
    assert!(chart_xml.contains("Accuracy!$C$6:$C$6"));
    assert!(chart_xml.contains("0.00%"));
}

#[test]
fn missing_report_type_fails_without_output() {
    let dir = TempDir::new().unwrap();
    let path_in = write_payload(&dir, &json!({"title": "no kind", "header": ["A"], "rows": []}));
    let path_out = dir.path().join("missing.xlsx");

    cmd()
        .arg("--input")
        .arg(&path_in)
        .arg("--output")
        .arg(&path_out)
        .assert()
        .failure()
        .stderr(contains("Unknown report_type"));

    assert!(!path_out.exists());
}

#[test]
fn unreadable_input_fails() {
    let dir = TempDir::new().unwrap();
    let path_out = dir.path().join("never.xlsx");

    cmd()
        .arg("--input")
        .arg(dir.path().join("does-not-exist.json"))
        .arg("--output")
        .arg(&path_out)
        .assert()
        .failure()
        .stderr(contains("Failed to read payload"));

    assert!(!path_out.exists());
}

#[test]
fn invalid_json_fails() {
    let dir = TempDir::new().unwrap();
    let path_in = dir.path().join("payload.json");
    std::fs::write(&path_in, "{not json").unwrap();

    cmd()
        .arg("--input")
        .arg(&path_in)
        .arg("--output")
        .arg(dir.path().join("bad.xlsx"))
        .assert()
        .failure()
        .stderr(contains("Failed to parse payload"));
}

#[test]
fn adversary_payload_writes_summary_and_detail_sheets() {
    let dir = TempDir::new().unwrap();
    let path_in = write_payload(
        &dir,
        &json!({
            "report_type": "adversary",
            "title": "adversary report",
            "generated_at": "2026-01-01T00:00:00Z",
            "params": [{"name": "samples", "value": 200}],
            "summary": [{"label": "worst ratio", "value": "12.50%"}],
            "tables": [
                {
                    "title": "Worst overestimation",
                    "header": ["Rank", "Name", "Chars", "Ratio", "Sample"],
                    "rows": [["1", "emoji", "40", "12.5%", "..."], ["2", "cjk", "30", "8%", "..."]],
                    "ratio_column": 3,
                    "name_column": 1
                },
                {
                    "title": "Raw samples",
                    "header": ["Rank", "Name", "Sample"],
                    "rows": [["1", "emoji", "..."]]
                }
            ]
        }),
    );
    let path_out = dir.path().join("adversary.xlsx");

    cmd()
        .args(["--input", path_in.to_str().unwrap()])
        .args(["--output", path_out.to_str().unwrap()])
        .assert()
        .success()
        .stdout(contains("sheets=3"));

    let entries = list_entries(&path_out);
    assert_eq!(count_prefix(&entries, "xl/worksheets/sheet"), 3);
    assert_eq!(count_prefix(&entries, "xl/charts/chart"), 1);

    let workbook_xml = read_entry(&path_out, "xl/workbook.xml");
    assert!(workbook_xml.contains("name=\"Summary\""));
    assert!(workbook_xml.contains("name=\"Worst overestimation\""));
    assert!(workbook_xml.contains("name=\"Raw samples\""));

    let chart_xml = read_entry(&path_out, "xl/charts/chart1.xml");
    assert!(chart_xml.contains("'Worst overestimation'!$D$5:$D$6"));
    assert!(chart_xml.contains("'Worst overestimation'!$B$5:$B$6"));
}

#[test]
fn dry_run_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let path_in = write_payload(
        &dir,
        &json!({
            "report_type": "adversary",
            "tables": [{"title": "T", "header": ["A"], "rows": []}]
        }),
    );
    let path_out = dir.path().join("dry.xlsx");

    cmd()
        .arg("--input")
        .arg(&path_in)
        .arg("--output")
        .arg(&path_out)
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(contains("[DRY-RUN] sheets=2"))
        .stdout(contains("names=[Summary,T]"));

    assert!(!path_out.exists());
}

#[test]
fn output_is_required_without_dry_run() {
    let dir = TempDir::new().unwrap();
    let path_in = write_payload(&dir, &json!({"report_type": "accuracy"}));

    cmd().arg("--input").arg(&path_in).assert().failure();
}

#[test]
fn long_table_title_with_apostrophe_at_cut_renders() {
    let dir = TempDir::new().unwrap();
    let c_title = format!("{}'s worst cases", "a".repeat(30));
    let path_in = write_payload(
        &dir,
        &json!({
            "report_type": "adversary",
            "tables": [{"title": c_title, "header": ["Rank", "Name"], "rows": [["1", "x"]]}]
        }),
    );
    let path_out = dir.path().join("apostrophe.xlsx");

    cmd()
        .arg("--input")
        .arg(&path_in)
        .arg("--output")
        .arg(&path_out)
        .assert()
        .success();

    let workbook_xml = read_entry(&path_out, "xl/workbook.xml");
    assert!(workbook_xml.contains(&format!("name=\"{}\"", "a".repeat(30))));
}
