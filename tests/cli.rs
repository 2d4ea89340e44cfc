extern crate assert_cmd;
extern crate predicates;
extern crate tempfile;

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

#[test]
fn writes_an_image_of_the_requested_size() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("set.png");
    Command::cargo_bin("mandelbrot")
        .unwrap()
        .args(&["--size", "12x9", "--plane", "-2:1:-1.5:1.5", "--tasks", "2", "-q"])
        .arg("--output")
        .arg(&output)
        .assert()
        .success();

    let image = image::open(&output).unwrap().to_rgb8();
    assert_eq!(image.dimensions(), (12, 9));
}

#[test]
fn rejects_a_single_pixel_row() {
    Command::cargo_bin("mandelbrot")
        .unwrap()
        .args(&["--size", "10x1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Size must be"));
}

#[test]
fn rejects_a_degenerate_plane() {
    Command::cargo_bin("mandelbrot")
        .unwrap()
        .args(&["--plane", "1:1:-1:1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("degenerate"));
}

#[test]
fn rejects_zero_tasks() {
    Command::cargo_bin("mandelbrot")
        .unwrap()
        .args(&["--tasks", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Task count"));
}

#[test]
fn rejects_an_empty_palette_before_rendering() {
    let dir = tempdir().unwrap();
    let palette = dir.path().join("empty.json");
    let output = dir.path().join("never.png");
    fs::write(&palette, "[]").unwrap();

    Command::cargo_bin("mandelbrot")
        .unwrap()
        .args(&["--size", "4x4", "-q"])
        .arg("--palette")
        .arg(&palette)
        .arg("--output")
        .arg(&output)
        .assert()
        .failure()
        .stderr(predicate::str::contains("palette is empty"));
    assert!(!output.exists());
}

#[test]
fn custom_palette_colors_the_image() {
    let dir = tempdir().unwrap();
    let palette = dir.path().join("two.json");
    let output = dir.path().join("two.png");
    // Interior red, everything else blue.
    fs::write(&palette, "[255, 16711680]").unwrap();

    Command::cargo_bin("mandelbrot")
        .unwrap()
        .args(&["--size", "8x8", "-q"])
        .arg("--palette")
        .arg(&palette)
        .arg("--output")
        .arg(&output)
        .assert()
        .success();

    let image = image::open(&output).unwrap().to_rgb8();
    assert!(image
        .pixels()
        .all(|p| p.0 == [255, 0, 0] || p.0 == [0, 0, 255]));
}
