use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::{tempdir, TempDir};

fn numbered_file(dir: &Path, lines: usize) -> Result<PathBuf, Box<dyn Error>> {
    let path = dir.join("input.txt");
    let mut text = String::new();
    for idx in 1..=lines {
        text.push_str(&format!("line {idx}\n"));
    }
    fs::write(&path, text)?;
    Ok(path)
}

fn cli(workspace: &TempDir) -> Result<Command, Box<dyn Error>> {
    let mut cmd = Command::cargo_bin("textprint")?;
    cmd.current_dir(workspace.path())
        .env_remove("RUST_LOG")
        .args(["--workspace", workspace.path().to_str().unwrap()]);
    Ok(cmd)
}

#[test]
fn paginate_lists_page_starts() -> Result<(), Box<dyn Error>> {
    let workspace = tempdir()?;
    numbered_file(workspace.path(), 200)?;

    cli(&workspace)?
        .args(["paginate", "input.txt"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("input.txt: 4 page(s)")
                .and(predicate::str::contains("page 1: offset 0 (line 1, column 1)"))
                .and(predicate::str::contains("(line 60, column 1)")),
        );
    Ok(())
}

#[test]
fn paginate_json_respects_line_range() -> Result<(), Box<dyn Error>> {
    let workspace = tempdir()?;
    numbered_file(workspace.path(), 50)?;

    let output = cli(&workspace)?
        .args([
            "paginate",
            "input.txt",
            "--json",
            "--first-line",
            "10",
            "--last-line",
            "20",
            "--no-header",
            "--no-footer",
        ])
        .output()?;
    assert!(output.status.success());

    let report: Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(report["page_count"], 1);
    assert_eq!(report["pages"][0]["line"], 10);
    assert_eq!(report["pages"][0]["column"], 1);
    Ok(())
}

#[test]
fn render_dumps_draw_commands() -> Result<(), Box<dyn Error>> {
    let workspace = tempdir()?;
    numbered_file(workspace.path(), 3)?;

    cli(&workspace)?
        .args(["render", "input.txt", "--page", "1", "--line-numbers"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("\"type\": \"GlyphRun\"")
                .and(predicate::str::contains("\"text\": \"line 2\""))
                .and(predicate::str::contains("\"text\": \"Page 1 of 1\""))
                .and(predicate::str::contains("\"HorizontalRule\"")),
        );
    Ok(())
}

#[test]
fn render_writes_output_file() -> Result<(), Box<dyn Error>> {
    let workspace = tempdir()?;
    numbered_file(workspace.path(), 120)?;

    cli(&workspace)?
        .args(["render", "input.txt", "--output", "out/pages.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote 3 page(s)"));

    let written: Value = serde_json::from_str(&fs::read_to_string(
        workspace.path().join("out/pages.json"),
    )?)?;
    assert_eq!(written["pages"].as_array().map(Vec::len), Some(3));
    Ok(())
}

#[test]
fn preview_writes_png() -> Result<(), Box<dyn Error>> {
    let workspace = tempdir()?;
    numbered_file(workspace.path(), 10)?;

    cli(&workspace)?
        .args([
            "preview",
            "input.txt",
            "--paper",
            "letter",
            "--dpi",
            "72",
            "--output",
            "page.png",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote page 1 (612x792 px at 72 dpi)"));

    let bytes = fs::read(workspace.path().join("page.png"))?;
    assert!(bytes.starts_with(&[0x89, b'P', b'N', b'G']));
    Ok(())
}

#[test]
fn settings_file_drives_the_layout() -> Result<(), Box<dyn Error>> {
    let workspace = tempdir()?;
    numbered_file(workspace.path(), 3)?;
    let settings_dir = workspace.path().join(".textprint");
    fs::create_dir_all(&settings_dir)?;
    fs::write(
        settings_dir.join("print-settings.json"),
        r#"{ "header": { "enabled": false }, "footer": { "enabled": false } }"#,
    )?;

    cli(&workspace)?
        .args(["render", "input.txt"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("\"text\": \"line 1\"")
                .and(predicate::str::contains("HorizontalRule").not())
                .and(predicate::str::contains("Page 1 of 1").not()),
        );
    Ok(())
}

#[test]
fn settings_init_and_show() -> Result<(), Box<dyn Error>> {
    let workspace = tempdir()?;

    cli(&workspace)?
        .args(["settings", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote default print settings"));
    assert!(workspace
        .path()
        .join(".textprint")
        .join("print-settings.json")
        .exists());

    cli(&workspace)?
        .args(["settings", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    cli(&workspace)?
        .args(["settings", "show"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("\"Page %Ep of %EP\"")
                .and(predicate::str::contains("\"line_number_step\": 1")),
        );
    Ok(())
}

#[test]
fn out_of_range_lines_fail() -> Result<(), Box<dyn Error>> {
    let workspace = tempdir()?;
    numbered_file(workspace.path(), 10)?;

    cli(&workspace)?
        .args(["paginate", "input.txt", "--first-line", "500"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("outside the document"));

    cli(&workspace)?
        .args(["paginate", "input.txt", "--ln-step", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--ln-step must be at least 1"));
    Ok(())
}
