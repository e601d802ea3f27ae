//! Smoke tests for the `labelmorph` binary.

mod common;

use std::process::Command;

use common::*;

fn labelmorph() -> Command {
    Command::new(env!("CARGO_BIN_EXE_labelmorph"))
}

#[test]
fn test_closing_writes_output() -> anyhow::Result<()> {
    let (dir, input) = save_in_temp_dir(&block_with_hole(), "labels.png");
    let output = dir.path().join("closed.png");

    let status = labelmorph()
        .arg(&input)
        .arg(&output)
        .args(["1", "1"])
        .status()?;

    assert!(status.success());
    let written = image::open(&output)?.to_luma8();
    assert_eq!(written.get_pixel(5, 5)[0], 1);
    assert_eq!(count_value(&written, 2), 30);
    Ok(())
}

#[test]
fn test_options_are_applied() -> anyhow::Result<()> {
    let (dir, input) = save_in_temp_dir(&block_with_core(), "labels.png");
    let output = dir.path().join("closed.png");
    let debug = dir.path().join("debug");

    let result = labelmorph()
        .arg(&input)
        .arg(&output)
        .args(["1", "1", "--element", "box", "--reverse-ordering", "--verbose"])
        .arg("--debug-out")
        .arg(&debug)
        .output()?;

    assert!(result.status.success());
    let stdout = String::from_utf8_lossy(&result.stdout);
    assert!(stdout.contains("Running step: Merge"));
    assert!(debug.join("00_input/01.png").exists());

    let written = image::open(&output)?.to_luma8();
    assert_eq!(written.get_pixel(5, 5)[0], 1);
    Ok(())
}

#[test]
fn test_wrong_argument_count_prints_usage() -> anyhow::Result<()> {
    let result = labelmorph().args(["in.png", "out.png", "1"]).output()?;

    assert_eq!(result.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(stderr.contains("Usage"), "stderr was: {}", stderr);
    Ok(())
}

#[test]
fn test_missing_input_fails() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    let result = labelmorph()
        .arg(dir.path().join("missing.png"))
        .arg(dir.path().join("out.png"))
        .args(["1", "1"])
        .output()?;

    assert_eq!(result.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&result.stderr).contains("Error"));
    assert!(!dir.path().join("out.png").exists());
    Ok(())
}

#[test]
fn test_zero_radius_leaves_image_unchanged() -> anyhow::Result<()> {
    let input = block_with_hole();
    let (dir, path) = save_in_temp_dir(&input, "labels.png");
    let output = dir.path().join("out.png");

    let status = labelmorph().arg(&path).arg(&output).args(["1", "0"]).status()?;

    assert!(status.success());
    assert_eq!(image::open(&output)?.to_luma8(), input);
    Ok(())
}

#[test]
fn test_unknown_element_is_rejected() -> anyhow::Result<()> {
    let result = labelmorph()
        .args(["in.png", "out.png", "1", "1", "--element", "star"])
        .output()?;

    assert_eq!(result.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(stderr.contains("star"), "stderr was: {}", stderr);
    assert!(stderr.contains("possible values"), "stderr was: {}", stderr);
    Ok(())
}

#[test]
fn test_radius_beyond_mask_limit_is_reported() -> anyhow::Result<()> {
    let (dir, input) = save_in_temp_dir(&block_with_hole(), "labels.png");

    // parsed as a radius, then refused by the element
    let result = labelmorph()
        .arg(&input)
        .arg(dir.path().join("huge.png"))
        .args(["1", "300"])
        .output()?;
    assert_eq!(result.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(stderr.contains("exceeds"), "stderr was: {}", stderr);
    assert!(!dir.path().join("huge.png").exists());
    Ok(())
}
