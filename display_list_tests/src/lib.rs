// Copyright 2025 the Display List Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared fixtures for the display list integration tests.

// LINEBENDER LINT SET - lib.rs - v2
// See https://linebender.org/wiki/canonical-lints/
// These lints aren't included in Cargo.toml because they
// shouldn't apply to examples and tests
#![warn(unused_crate_dependencies)]
#![warn(clippy::print_stdout, clippy::print_stderr)]
// Targeting e.g. 32-bit means structs containing usize can give false positives for 64-bit.
#![cfg_attr(target_pointer_width = "64", warn(clippy::trivially_copy_pass_by_ref))]
// END LINEBENDER LINT SET
#![allow(
    missing_debug_implementations,
    unreachable_pub,
    missing_docs,
    clippy::missing_assert_message,
    reason = "Deferred"
)]

use std::sync::Arc;

use anyhow::{ensure, Result};
use display_list::kurbo::{Affine, BezPath, Circle, Point, Rect, RoundedRect};
use display_list::peniko::Color;
use display_list::{
    serialize, AtlasOptions, BlendMode, ClipOp, DisplayList, DisplayListBuilder, DrawStyle,
    FillType, FilterMode, Flow, FormatError, ImageRef, LayerPaint, Op, OpTag, PointMode, Sampling,
    Sink, SrcRectConstraint, StrokeCap, StrokeJoin, VertexMode,
};

/// A triangle, used wherever a path is needed.
pub fn triangle() -> BezPath {
    let mut path = BezPath::new();
    path.move_to((0.0, 0.0));
    path.line_to((10.0, 0.0));
    path.line_to((5.0, 8.0));
    path.close_path();
    path
}

/// A list using every kind of op at least once.
pub fn every_op() -> Arc<DisplayList> {
    let mut inner = DisplayListBuilder::new();
    inner.set_color(Color::rgba8(0, 255, 0, 255));
    inner.draw_circle(Point::new(5.0, 5.0), 5.0);
    let inner = inner.finish().expect("fresh builder");

    let image = ImageRef::new(3, 16, 16);
    let mut builder = DisplayListBuilder::new();
    builder.set_anti_alias(true);
    builder.set_color(Color::rgba8(255, 0, 0, 255));
    builder.set_blend_mode(BlendMode::SrcOver);
    builder.set_style(DrawStyle::StrokeAndFill);
    builder.set_stroke_width(2.0);
    builder.set_stroke_miter(2.0);
    builder.set_stroke_cap(StrokeCap::Round);
    builder.set_stroke_join(StrokeJoin::Bevel);
    builder.save();
    builder.translate(10.0, 20.0);
    builder.scale(2.0, 2.0);
    builder.rotate(90.0);
    builder.skew(0.0, 0.0);
    builder.transform(Affine::translate((1.0, 1.0)));
    builder.transform_reset();
    builder.clip_rect(Rect::new(0.0, 0.0, 500.0, 500.0), ClipOp::Intersect, true);
    builder.clip_rounded_rect(
        &RoundedRect::new(0.0, 0.0, 400.0, 400.0, 8.0),
        ClipOp::Intersect,
        false,
    );
    builder.clip_path(&triangle(), FillType::EvenOdd, ClipOp::Difference, true);
    builder.draw_paint();
    builder.draw_color(Color::rgba8(0, 0, 0, 40), BlendMode::Multiply);
    builder.restore();
    builder.save_layer(
        Some(Rect::new(0.0, 0.0, 300.0, 300.0)),
        Some(LayerPaint {
            color: Color::rgba8(0, 0, 0, 128),
            blend_mode: BlendMode::SrcOver,
        }),
    );
    builder.draw_line(Point::new(0.0, 0.0), Point::new(20.0, 0.0));
    builder.draw_rect(Rect::new(0.0, 10.0, 20.0, 20.0));
    builder.draw_oval(Rect::new(30.0, 0.0, 50.0, 10.0));
    builder.draw_circle(Point::new(70.0, 10.0), 5.0);
    builder.draw_rounded_rect(&RoundedRect::new(0.0, 30.0, 20.0, 50.0, 4.0));
    builder.draw_diff_rounded_rect(
        &RoundedRect::new(30.0, 30.0, 60.0, 60.0, 4.0),
        &RoundedRect::new(35.0, 35.0, 55.0, 55.0, 2.0),
    );
    builder.draw_arc(Rect::new(70.0, 30.0, 90.0, 50.0), 0.0, 90.0, true);
    builder.restore();
    builder.draw_path(&triangle(), FillType::NonZero);
    builder.draw_points(
        PointMode::Lines,
        &[Point::new(100.0, 0.0), Point::new(110.0, 10.0)],
    );
    builder.draw_vertices(
        VertexMode::TriangleFan,
        &[
            Point::new(120.0, 0.0),
            Point::new(130.0, 0.0),
            Point::new(130.0, 10.0),
        ],
        Some(&[Color::WHITE, Color::BLACK, Color::WHITE][..]),
        BlendMode::Modulate,
    );
    builder.draw_image(image, Point::new(140.0, 0.0), Sampling::Linear, false);
    builder.draw_image_rect(
        image,
        Rect::new(0.0, 0.0, 8.0, 8.0),
        Rect::new(160.0, 0.0, 176.0, 16.0),
        Sampling::Nearest,
        true,
        SrcRectConstraint::Strict,
    );
    builder.draw_image_nine(
        image,
        [4, 4, 12, 12],
        Rect::new(180.0, 0.0, 220.0, 40.0),
        FilterMode::Linear,
        false,
    );
    builder.draw_atlas(
        image,
        &[[1.0, 0.0, 230.0, 0.0], [0.0, 1.0, 260.0, 0.0]],
        &[Rect::new(0.0, 0.0, 8.0, 8.0), Rect::new(8.0, 8.0, 16.0, 16.0)],
        None,
        AtlasOptions::default(),
    );
    builder.draw_display_list(&inner, 0.5);
    builder.draw_shadow(
        &Circle::new((300.0, 300.0), 20.0),
        Color::BLACK,
        4.0,
        false,
        2.0,
    );
    builder.finish().expect("fresh builder")
}

/// A chain of `levels` lists, each embedding the previous one once.
pub fn nested(levels: u32) -> Arc<DisplayList> {
    let mut builder = DisplayListBuilder::new();
    builder.draw_rect(Rect::new(0.0, 0.0, 1.0, 1.0));
    let mut list = builder.finish().expect("fresh builder");
    for level in 1..levels {
        let mut builder = DisplayListBuilder::new();
        builder.translate(level as f64, 0.0);
        builder.draw_display_list(&list, 1.0);
        list = builder.finish().expect("fresh builder");
    }
    list
}

/// Writes and reads back `list`, checking the bytes are stable.
pub fn round_trip(list: &DisplayList) -> Result<DisplayList> {
    let bytes = serialize::to_bytes(list);
    let read = serialize::from_bytes(&bytes)?;
    ensure!(
        serialize::to_bytes(&read) == bytes,
        "Re-serialized bytes differ"
    );
    Ok(read)
}

/// Everything a sink sees, in order.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    Op(OpTag),
    /// Start of a nested list, with its declared op count.
    BeginNested(u32),
    EndNested,
    Corrupt(FormatError),
}

/// Records [`Event`]s, optionally stopping after a number of ops.
#[derive(Default)]
pub struct Trace {
    pub events: Vec<Event>,
    pub stop_after: Option<usize>,
    ops: usize,
}

impl Trace {
    pub fn stopping_after(ops: usize) -> Self {
        Self {
            stop_after: Some(ops),
            ..Self::default()
        }
    }

    pub fn ops(&self) -> Vec<OpTag> {
        self.events
            .iter()
            .filter_map(|event| match event {
                Event::Op(tag) => Some(*tag),
                _ => None,
            })
            .collect()
    }
}

impl Sink for Trace {
    fn op(&mut self, op: &Op<'_>) -> Flow {
        self.events.push(Event::Op(op.tag()));
        self.ops += 1;
        if self.stop_after == Some(self.ops) {
            Flow::Stop
        } else {
            Flow::Continue
        }
    }

    fn begin_nested(&mut self, list: &display_list::encoding::NestedList<'_>) {
        self.events.push(Event::BeginNested(list.header.op_count));
    }

    fn end_nested(&mut self) {
        self.events.push(Event::EndNested);
    }

    fn corrupt(&mut self, error: &FormatError) {
        self.events.push(Event::Corrupt(error.clone()));
    }
}
