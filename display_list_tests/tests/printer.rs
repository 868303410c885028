// Copyright 2025 the Display List Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use display_list::kurbo::{Point, Rect};
use display_list::peniko::Color;
use display_list::{DisplayListBuilder, Printer};
use display_list_tests::{every_op, nested};

#[test]
fn golden_output() {
    let mut builder = DisplayListBuilder::new();
    builder.set_color(Color::rgba8(255, 0, 0, 255));
    builder.save();
    builder.translate(10.0, 20.0);
    builder.draw_rect(Rect::new(0.0, 0.0, 5.0, 5.0));
    builder.restore();
    builder.draw_line(Point::new(0.0, 0.0), Point::new(4.0, 3.0));
    let list = builder.finish().unwrap();

    let expected = "\
DisplayList(bytes: 92, ops: 6, nestedBytes: 0, nestedOps: 0, depth: 1, bounds: [-2, -2, 15, 25], \
groupOpacity: true, uiThreadSafe: true, modifiesTransparentBlack: false) {
  setColor(0xffff0000)
  save()
  translate(10, 20)
  drawRect([0, 0, 5, 5])
  restore()
  drawLine([0, 0], [4, 3])
}
";
    assert_eq!(list.to_string(), expected);
}

#[test]
fn one_line_per_op() {
    let list = every_op();
    let printed = list.to_string();
    let total = 2 + list.op_count() + list.nested_op_count() + 1;
    assert_eq!(printed.lines().count(), total as usize);
    assert!(printed.contains("\n    drawCircle("));
}

#[test]
fn nested_lists_are_indented() {
    let list = nested(3);
    let mut out = String::new();
    let mut printer = Printer::new(&mut out);
    list.dispatch(&mut printer).unwrap();
    printer.into_result().unwrap();
    assert!(out.ends_with("    drawRect([0, 0, 1, 1])\n  }\n}\n"));
}
