// Copyright 2025 the Display List Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Runs the printer binary on files written by the serializer.

use std::path::Path;
use std::process::{Command, Output};

use display_list::kurbo::{Point, Rect};
use display_list::peniko::Color;
use display_list::{serialize, DisplayList, DisplayListBuilder};

fn printer(args: &[&Path]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_display_list_printer"))
        .args(args)
        .output()
        .unwrap()
}

fn sample() -> std::sync::Arc<DisplayList> {
    let mut builder = DisplayListBuilder::new();
    builder.set_color(Color::rgba8(0, 0, 255, 255));
    builder.draw_rect(Rect::new(0.0, 0.0, 8.0, 8.0));
    builder.draw_line(Point::new(0.0, 0.0), Point::new(8.0, 8.0));
    builder.finish().unwrap()
}

#[test]
fn prints_the_list() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("display_list.dat");
    let list = sample();
    std::fs::write(&path, serialize::to_bytes(&list)).unwrap();

    let output = printer(&[path.as_path()]);
    assert!(output.status.success());
    assert_eq!(String::from_utf8(output.stdout).unwrap(), list.to_string());

    let output = Command::new(env!("CARGO_BIN_EXE_display_list_printer"))
        .arg("--check")
        .arg(&path)
        .output()
        .unwrap();
    assert!(output.status.success());
}

#[test]
fn missing_path_is_a_usage_error() {
    let output = printer(&[]);
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Usage"));
    assert!(output.stdout.is_empty());
}

#[test]
fn bad_files_fail() {
    let dir = tempfile::tempdir().unwrap();
    let mut bytes = serialize::to_bytes(&sample());

    bytes[0] = b'x';
    let bad_magic = dir.path().join("bad_magic.dat");
    std::fs::write(&bad_magic, &bytes).unwrap();

    bytes[0] = b'd';
    bytes[4] = 9;
    let bad_version = dir.path().join("bad_version.dat");
    std::fs::write(&bad_version, &bytes).unwrap();

    for path in [bad_magic, bad_version] {
        let output = printer(&[path.as_path()]);
        assert!(!output.status.success());
        assert!(output.stdout.is_empty());
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("Couldn't read display list"), "{stderr}");
    }

    let output = printer(&[dir.path().join("missing.dat").as_path()]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Couldn't open"));
}
