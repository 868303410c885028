// Copyright 2025 the Display List Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Summary attributes computed while recording.

use display_list::encoding::NestedList;
use display_list::kurbo::{Point, Rect};
use display_list::peniko::Color;
use display_list::{BlendMode, ClipOp, DisplayListBuilder, Sink, Summary};
use display_list_tests::{every_op, nested};

#[test]
fn recorded_and_recomputed_summaries_agree() {
    for list in [every_op(), nested(1), nested(6)] {
        assert_eq!(list.recompute_summary().unwrap(), *list.summary());
    }
}

#[test]
fn empty_list() {
    let list = DisplayListBuilder::new().finish().unwrap();
    assert_eq!(*list.summary(), Summary::default());
    assert_eq!(list.byte_count(), 0);
    assert_eq!(list.bounds(), Rect::ZERO);
    assert!(!list.is_unbounded());
    assert_eq!(list.records().count(), 0);
}

/// Adds up the sizes of every nested list met during dispatch.
#[derive(Default)]
struct NestedTotals {
    bytes: usize,
    ops: u32,
}

impl Sink for NestedTotals {
    fn begin_nested(&mut self, list: &NestedList<'_>) {
        self.bytes += list.storage.len();
        self.ops += list.header.op_count;
    }
}

#[test]
fn nesting_arithmetic() {
    let list = nested(4);
    assert_eq!(list.op_count(), 2);
    assert_eq!(list.total_depth(), 4);
    assert_eq!(list.nested_op_count(), 5);

    let mut totals = NestedTotals::default();
    list.dispatch(&mut totals).unwrap();
    assert_eq!(list.nested_byte_count(), totals.bytes);
    assert_eq!(list.nested_op_count(), totals.ops);

    // Translated by 3, 2 and 1 on the way out.
    assert_eq!(list.bounds(), Rect::new(6.0, 0.0, 7.0, 1.0));
}

#[test]
fn disjoint_draws_allow_group_opacity() {
    let mut builder = DisplayListBuilder::new();
    for i in 0..4 {
        for j in 0..4 {
            let origin = Point::new(i as f64 * 10.0, j as f64 * 10.0);
            builder.draw_rect(Rect::from_origin_size(origin, (10.0, 10.0)));
        }
    }
    let grid = builder.finish().unwrap();
    assert!(grid.can_apply_group_opacity());

    // Two disjoint copies of a compatible list stay compatible.
    let mut builder = DisplayListBuilder::new();
    builder.draw_display_list(&grid, 0.5);
    builder.translate(100.0, 0.0);
    builder.draw_display_list(&grid, 0.5);
    assert!(builder.finish().unwrap().can_apply_group_opacity());

    // Overlapping copies don't.
    let mut builder = DisplayListBuilder::new();
    builder.draw_display_list(&grid, 0.5);
    builder.translate(5.0, 0.0);
    builder.draw_display_list(&grid, 0.5);
    assert!(!builder.finish().unwrap().can_apply_group_opacity());
}

#[test]
fn incompatible_blend_modes_prevent_group_opacity() {
    let mut builder = DisplayListBuilder::new();
    builder.set_blend_mode(BlendMode::Multiply);
    builder.draw_rect(Rect::new(0.0, 0.0, 1.0, 1.0));
    assert!(!builder.finish().unwrap().can_apply_group_opacity());
}

#[test]
fn incompatible_nested_list_stays_incompatible() {
    let mut inner = DisplayListBuilder::new();
    inner.draw_rect(Rect::new(0.0, 0.0, 10.0, 10.0));
    inner.draw_rect(Rect::new(5.0, 5.0, 15.0, 15.0));
    let inner = inner.finish().unwrap();
    assert!(!inner.can_apply_group_opacity());

    let mut outer = DisplayListBuilder::new();
    outer.draw_display_list(&inner, 1.0);
    assert!(!outer.finish().unwrap().can_apply_group_opacity());
}

#[test]
fn unbounded_paint() {
    let mut builder = DisplayListBuilder::new();
    builder.draw_paint();
    let unbounded = builder.finish().unwrap();
    assert!(unbounded.is_unbounded());

    let mut builder = DisplayListBuilder::new();
    builder.draw_display_list(&unbounded, 1.0);
    assert!(builder.finish().unwrap().is_unbounded());

    let mut builder = DisplayListBuilder::new();
    builder.clip_rect(Rect::new(0.0, 0.0, 50.0, 40.0), ClipOp::Intersect, false);
    builder.draw_display_list(&unbounded, 1.0);
    assert_eq!(
        builder.finish().unwrap().bounds(),
        Rect::new(0.0, 0.0, 50.0, 40.0)
    );
}

#[test]
fn transparent_black_propagates_through_nesting() {
    let mut inner = DisplayListBuilder::new();
    inner.draw_color(Color::TRANSPARENT, BlendMode::Clear);
    let inner = inner.finish().unwrap();
    assert!(inner.modifies_transparent_black());

    let mut outer = DisplayListBuilder::new();
    outer.draw_display_list(&inner, 1.0);
    assert!(outer.finish().unwrap().modifies_transparent_black());

    let mut clipped = DisplayListBuilder::new();
    clipped.clip_rect(Rect::new(0.0, 0.0, 8.0, 8.0), ClipOp::Intersect, true);
    clipped.draw_display_list(&inner, 1.0);
    let clipped = clipped.finish().unwrap();
    assert!(!clipped.modifies_transparent_black());
    assert_eq!(clipped.bounds(), Rect::new(0.0, 0.0, 8.0, 8.0));
}

#[test]
fn difference_clips_do_not_shrink_bounds() {
    let mut builder = DisplayListBuilder::new();
    builder.clip_rect(Rect::new(0.0, 0.0, 5.0, 5.0), ClipOp::Difference, false);
    builder.draw_rect(Rect::new(0.0, 0.0, 10.0, 10.0));
    assert_eq!(
        builder.finish().unwrap().bounds(),
        Rect::new(0.0, 0.0, 10.0, 10.0)
    );
}
