// Copyright 2025 the Display List Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use display_list_encoding::math::{
    affine_from_f32, is_unbounded, point_from_f32, rect_from_f32, rect_to_f32, UNBOUNDED,
};
use display_list_encoding::{
    BlendMode, ClipOp, DrawStyle, ImageRef, NestedHeader, NestedList, Op, StrokeCap, StrokeJoin,
};
use peniko::kurbo::{Affine, Rect};
use smallvec::{smallvec, SmallVec};

use crate::{Flow, Sink};

/// Multiple of `elevation * dpr` by which a shadow may extend past its path.
pub const SHADOW_OUTSET_FACTOR: f64 = 2.0;

/// Half the width assumed for hairline (zero width) strokes.
pub const HAIRLINE_OUTSET: f64 = 0.5;

/// Summary attributes of a display list.
///
/// These are pure functions of the record sequence.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Summary {
    pub op_count: u32,
    pub nested_byte_count: usize,
    pub nested_op_count: u32,
    pub total_depth: u32,
    /// Device-space bounds as `[left, top, right, bottom]`.
    pub bounds: [f32; 4],
    pub can_apply_group_opacity: bool,
    pub is_ui_thread_safe: bool,
    pub modifies_transparent_black: bool,
}

impl Default for Summary {
    fn default() -> Self {
        Self {
            op_count: 0,
            nested_byte_count: 0,
            nested_op_count: 0,
            total_depth: 1,
            bounds: [0.0; 4],
            can_apply_group_opacity: true,
            is_ui_thread_safe: true,
            modifies_transparent_black: false,
        }
    }
}

impl Summary {
    /// Header describing the list when it's embedded in another one.
    pub fn nested_header(&self, byte_count: usize, opacity: f32) -> NestedHeader {
        let mut flags = 0;
        if self.can_apply_group_opacity {
            flags |= NestedHeader::GROUP_OPACITY;
        }
        if self.is_ui_thread_safe {
            flags |= NestedHeader::UI_THREAD_SAFE;
        }
        if self.modifies_transparent_black {
            flags |= NestedHeader::MODIFIES_TRANSPARENT_BLACK;
        }
        NestedHeader {
            byte_count: byte_count as u64,
            nested_byte_count: self.nested_byte_count as u64,
            op_count: self.op_count,
            nested_op_count: self.nested_op_count,
            total_depth: self.total_depth,
            flags,
            bounds: self.bounds,
            opacity,
            _padding: 0,
        }
    }
}

/// Transform and clip in effect for one save level.
#[derive(Copy, Clone, Debug)]
struct State {
    transform: Affine,
    /// Device-space clip bounds, `None` if nothing has been clipped.
    clip: Option<Rect>,
    /// This level was opened by a save layer.
    is_layer: bool,
}

/// Rendering accumulated into one layer.
#[derive(Copy, Clone, Debug)]
struct Layer {
    bounds: Option<Rect>,
    group_opacity: bool,
    /// Blend mode used to composite the layer onto its parent.
    blend_mode: BlendMode,
}

impl Layer {
    fn new(blend_mode: BlendMode) -> Self {
        Self {
            bounds: None,
            group_opacity: true,
            blend_mode,
        }
    }
}

/// Paint attributes that affect bounds.
#[derive(Copy, Clone, Debug)]
struct Attributes {
    style: DrawStyle,
    stroke_width: f32,
    miter_limit: f32,
    cap: StrokeCap,
    join: StrokeJoin,
    blend_mode: BlendMode,
}

impl Default for Attributes {
    fn default() -> Self {
        Self {
            style: DrawStyle::Fill,
            stroke_width: 0.0,
            miter_limit: 4.0,
            cap: StrokeCap::Butt,
            join: StrokeJoin::Miter,
            blend_mode: BlendMode::SrcOver,
        }
    }
}

impl Attributes {
    /// Distance a stroke may extend past the geometry it outlines.
    fn stroke_outset(&self) -> f64 {
        let mut outset = if self.stroke_width == 0.0 {
            HAIRLINE_OUTSET
        } else {
            self.stroke_width.abs() as f64 / 2.0
        };
        if self.join == StrokeJoin::Miter {
            outset *= (self.miter_limit as f64).max(1.0);
        }
        if self.cap == StrokeCap::Square {
            outset *= std::f64::consts::SQRT_2;
        }
        outset
    }
}

/// How a draw contributes to the layer it's drawn into.
#[derive(Copy, Clone, Debug)]
struct Rendering {
    /// Device-space bounds, `None` to fill the current clip.
    bounds: Option<Rect>,
    blend_mode: BlendMode,
    /// The op can be drawn with a group alpha applied to it directly.
    opacity_compatible: bool,
    /// The op changes pixels outside its bounds.
    affects_outside: bool,
}

/// Computes the [`Summary`] of a record sequence.
///
/// The builder feeds it every op it encodes. As a [`Sink`] it recomputes the
/// summary of an existing list; both give identical results for the same
/// records.
#[derive(Clone, Debug)]
pub struct Accumulator {
    states: SmallVec<[State; 8]>,
    layers: SmallVec<[Layer; 4]>,
    attributes: Attributes,
    summary: Summary,
}

impl Default for Accumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl Accumulator {
    pub fn new() -> Self {
        Self {
            states: smallvec![State {
                transform: Affine::IDENTITY,
                clip: None,
                is_layer: false,
            }],
            layers: smallvec![Layer::new(BlendMode::SrcOver)],
            attributes: Attributes::default(),
            summary: Summary::default(),
        }
    }

    /// Number of open saves, plus one for the base level.
    pub fn save_count(&self) -> usize {
        self.states.len()
    }

    /// Accounts for one record.
    ///
    /// When `op` restores a save layer, returns whether the layer's content
    /// could have been drawn with the layer's alpha applied per op.
    pub fn accumulate(&mut self, op: &Op<'_>) -> Option<bool> {
        self.summary.op_count += 1;
        let attributes = self.attributes;
        match op {
            Op::SetAntiAlias(_) | Op::SetColor(_) => {}
            Op::SetBlendMode(p) => self.attributes.blend_mode = p.mode,
            Op::SetStyle(p) => self.attributes.style = p.style,
            Op::SetStrokeWidth(p) => self.attributes.stroke_width = p.width,
            Op::SetStrokeMiter(p) => self.attributes.miter_limit = p.limit,
            Op::SetStrokeCap(p) => self.attributes.cap = p.cap,
            Op::SetStrokeJoin(p) => self.attributes.join = p.join,
            Op::Save => self.push_state(false),
            Op::SaveLayer(p) => {
                self.push_state(true);
                if let Some(bounds) = p.bounds() {
                    self.clip(rect_from_f32(bounds));
                }
                self.layers.push(Layer::new(p.effective_blend_mode()));
            }
            Op::Restore => return self.restore(),
            Op::Translate(p) => self.concat(Affine::translate((p.tx as f64, p.ty as f64))),
            Op::Scale(p) => self.concat(Affine::scale_non_uniform(p.sx as f64, p.sy as f64)),
            Op::Rotate(p) => self.concat(Affine::rotate((p.degrees as f64).to_radians())),
            Op::Skew(p) => self.concat(Affine::skew(p.sx as f64, p.sy as f64)),
            Op::Transform2DAffine(p) => self.concat(affine_from_f32(p.coeffs)),
            Op::TransformReset => self.state_mut().transform = Affine::IDENTITY,
            Op::ClipRect(p) => {
                if p.clip_op == ClipOp::Intersect {
                    self.clip(rect_from_f32(p.rect));
                }
            }
            Op::ClipRoundRect(p) => {
                if p.clip_op == ClipOp::Intersect {
                    self.clip(rect_from_f32(p.rect));
                }
            }
            Op::ClipPath(p, path) => {
                if p.clip_op == ClipOp::Intersect {
                    self.clip(path.bounding_box().unwrap_or(Rect::ZERO));
                }
            }
            Op::DrawPaint => self.fill_clip(attributes.blend_mode),
            Op::DrawColor(p) => self.fill_clip(p.blend_mode),
            Op::DrawLine(p) => {
                let rect = Rect::from_points(point_from_f32(p.p0), point_from_f32(p.p1));
                self.draw(Some(rect), true, true);
            }
            Op::DrawRect(p) => self.draw_rect(p.rect),
            Op::DrawOval(p) => self.draw_rect(p.rect),
            Op::DrawCircle(p) => {
                let center = point_from_f32(p.center);
                let radius = p.radius.abs() as f64;
                let rect = Rect::from_center_size(center, (radius * 2.0, radius * 2.0));
                self.draw(Some(rect), false, true);
            }
            Op::DrawRoundRect(p) => self.draw_rect(p.rect),
            Op::DrawDiffRoundRect(p) => self.draw_rect(p.outer),
            Op::DrawArc(p) => self.draw_rect(p.rect),
            Op::DrawPath(path) => self.draw(path.bounding_box(), false, true),
            Op::DrawPoints(_, points) => {
                let bounds = display_list_encoding::points_bounds(points.iter());
                self.draw(bounds, true, false);
            }
            Op::DrawVertices(vertices) => self.draw(vertices.bounds(), false, false),
            Op::DrawImage(p) => {
                self.use_image(&p.image);
                let rect = p.image.bounds() + point_from_f32(p.point).to_vec2();
                self.draw_image(rect, p.with_paint != 0, true);
            }
            Op::DrawImageRect(p) => {
                self.use_image(&p.image);
                self.draw_image(rect_from_f32(p.dst), p.with_paint != 0, true);
            }
            Op::DrawImageNine(p) => {
                self.use_image(&p.image);
                self.draw_image(rect_from_f32(p.dst), p.with_paint != 0, true);
            }
            Op::DrawAtlas(atlas) => {
                self.use_image(&atlas.image);
                if let Some(rect) = atlas.bounds() {
                    self.draw_image(rect, atlas.with_paint, false);
                }
            }
            Op::DrawDisplayList(nested) => self.nested(nested),
            Op::DrawShadow(p, path) => {
                if let Some(rect) = path.bounding_box() {
                    let outset = (p.elevation * p.dpr).abs() as f64 * SHADOW_OUTSET_FACTOR;
                    self.render_local(rect.inflate(outset, outset), BlendMode::SrcOver, false);
                }
            }
        }
        None
    }

    /// Closes any open saves and returns the summary.
    pub fn finish(mut self) -> Summary {
        while self.states.len() > 1 {
            self.restore();
        }
        let root = self.layers[0];
        self.summary.can_apply_group_opacity = root.group_opacity;
        self.summary.bounds = match root.bounds {
            Some(bounds) if is_unbounded(&bounds) => UNBOUNDED,
            Some(bounds) => rect_to_f32(bounds),
            None => [0.0; 4],
        };
        self.summary
    }

    fn state(&self) -> &State {
        // The base state is never popped.
        &self.states[self.states.len() - 1]
    }

    fn state_mut(&mut self) -> &mut State {
        let last = self.states.len() - 1;
        &mut self.states[last]
    }

    fn layer_mut(&mut self) -> &mut Layer {
        let last = self.layers.len() - 1;
        &mut self.layers[last]
    }

    fn push_state(&mut self, is_layer: bool) {
        let state = State {
            is_layer,
            ..*self.state()
        };
        self.states.push(state);
    }

    fn restore(&mut self) -> Option<bool> {
        if self.states.len() <= 1 {
            return None;
        }
        let state = self.states.pop()?;
        if !state.is_layer {
            return None;
        }
        let layer = self.layers.pop()?;
        // The layer is composited onto its parent as a single op.
        let affects_outside = layer.blend_mode.affects_outside_source();
        if layer.bounds.is_some() || affects_outside {
            self.render(Rendering {
                bounds: layer.bounds,
                blend_mode: layer.blend_mode,
                opacity_compatible: true,
                affects_outside,
            });
        }
        Some(layer.group_opacity)
    }

    fn concat(&mut self, transform: Affine) {
        let state = self.state_mut();
        state.transform = state.transform * transform;
    }

    /// Intersects the clip with a local-space rectangle.
    fn clip(&mut self, rect: Rect) {
        let state = self.state_mut();
        let device = state.transform.transform_rect_bbox(rect);
        state.clip = Some(match state.clip {
            Some(clip) => clip.intersect(device),
            None => device,
        });
    }

    fn use_image(&mut self, image: &ImageRef) {
        if image.is_thread_affine() {
            self.summary.is_ui_thread_safe = false;
        }
    }

    fn draw_rect(&mut self, rect: [f32; 4]) {
        self.draw(Some(rect_from_f32(rect).abs()), false, true);
    }

    /// A geometric draw using the current paint attributes.
    fn draw(&mut self, bounds: Option<Rect>, always_strokes: bool, opacity_compatible: bool) {
        let Some(mut rect) = bounds else {
            return;
        };
        let attributes = self.attributes;
        if always_strokes || attributes.style.strokes() {
            let outset = attributes.stroke_outset();
            rect = rect.inflate(outset, outset);
        }
        self.render_local(rect, attributes.blend_mode, opacity_compatible);
    }

    fn draw_image(&mut self, rect: Rect, with_paint: bool, opacity_compatible: bool) {
        let blend_mode = if with_paint {
            self.attributes.blend_mode
        } else {
            BlendMode::SrcOver
        };
        self.render_local(rect, blend_mode, opacity_compatible);
    }

    fn fill_clip(&mut self, blend_mode: BlendMode) {
        self.render(Rendering {
            bounds: None,
            blend_mode,
            opacity_compatible: true,
            affects_outside: blend_mode.affects_outside_source(),
        });
    }

    fn nested(&mut self, nested: &NestedList<'_>) {
        let header = &nested.header;
        let summary = &mut self.summary;
        // Headers of unvalidated storage may hold any value, so counts saturate.
        summary.nested_op_count = summary
            .nested_op_count
            .saturating_add(header.op_count)
            .saturating_add(header.nested_op_count);
        let nested_bytes = header.byte_count.saturating_add(header.nested_byte_count);
        summary.nested_byte_count = summary
            .nested_byte_count
            .saturating_add(usize::try_from(nested_bytes).unwrap_or(usize::MAX));
        summary.total_depth = summary
            .total_depth
            .max(header.total_depth.saturating_add(1));
        if !header.is_ui_thread_safe() {
            summary.is_ui_thread_safe = false;
        }
        let bounds = nested.bounds();
        let empty = header.bounds == [0.0; 4];
        if empty && !header.modifies_transparent_black() {
            return;
        }
        let unbounded = is_unbounded(&bounds);
        let transformed = self.state().transform.transform_rect_bbox(bounds);
        self.render(Rendering {
            bounds: (!unbounded && !empty).then_some(transformed),
            blend_mode: BlendMode::SrcOver,
            opacity_compatible: header.can_apply_group_opacity(),
            affects_outside: header.modifies_transparent_black(),
        });
    }

    fn render_local(&mut self, rect: Rect, blend_mode: BlendMode, opacity_compatible: bool) {
        let bounds = self.state().transform.transform_rect_bbox(rect);
        self.render(Rendering {
            bounds: Some(bounds),
            blend_mode,
            opacity_compatible,
            affects_outside: blend_mode.affects_outside_source(),
        });
    }

    fn render(&mut self, rendering: Rendering) {
        let clip = self.state().clip;
        if rendering.affects_outside && clip.is_none() {
            self.summary.modifies_transparent_black = true;
        }
        // Ops that touch pixels outside their geometry cover the whole clip.
        let device = if rendering.affects_outside {
            None
        } else {
            rendering.bounds
        };
        let bounds = match (device, clip) {
            (Some(device), Some(clip)) => device.intersect(clip),
            (Some(device), None) => device,
            (None, Some(clip)) => clip,
            (None, None) => rect_from_f32(UNBOUNDED),
        };
        if bounds.width() <= 0.0 || bounds.height() <= 0.0 {
            // Culled.
            return;
        }
        let layer = self.layer_mut();
        if !rendering.opacity_compatible || !rendering.blend_mode.is_opacity_compatible() {
            layer.group_opacity = false;
        } else if let Some(previous) = layer.bounds {
            if previous.intersect(bounds).area() > 0.0 {
                layer.group_opacity = false;
            }
        }
        layer.bounds = Some(match layer.bounds {
            Some(previous) => previous.union(bounds),
            None => bounds,
        });
    }
}

impl Sink for Accumulator {
    fn op(&mut self, op: &Op<'_>) -> Flow {
        self.accumulate(op);
        Flow::Continue
    }

    fn descend_nested(&mut self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use display_list_encoding::{ClipRect, DrawColor, DrawRect, SaveLayer, SetStyle, Translate};

    use super::*;

    fn rect(l: f32, t: f32, r: f32, b: f32) -> Op<'static> {
        Op::DrawRect(DrawRect { rect: [l, t, r, b] })
    }

    fn summarize(ops: &[Op<'_>]) -> Summary {
        let mut accumulator = Accumulator::new();
        for op in ops {
            accumulator.accumulate(op);
        }
        accumulator.finish()
    }

    #[test]
    fn empty() {
        assert_eq!(summarize(&[]), Summary::default());
    }

    #[test]
    fn nested_counts_saturate() {
        let header = NestedHeader {
            byte_count: 0,
            nested_byte_count: u64::MAX,
            op_count: u32::MAX,
            nested_op_count: 1,
            total_depth: u32::MAX,
            ..Default::default()
        };
        let nested = Op::DrawDisplayList(NestedList {
            header,
            storage: &[],
        });
        let summary = summarize(&[nested, nested]);
        assert_eq!(summary.op_count, 2);
        assert_eq!(summary.nested_op_count, u32::MAX);
        assert_eq!(summary.nested_byte_count, usize::MAX);
        assert_eq!(summary.total_depth, u32::MAX);
    }

    #[test]
    fn disjoint_draws_allow_group_opacity() {
        let summary = summarize(&[rect(0.0, 0.0, 10.0, 10.0), rect(20.0, 0.0, 30.0, 10.0)]);
        assert!(summary.can_apply_group_opacity);
        assert_eq!(summary.bounds, [0.0, 0.0, 30.0, 10.0]);
        assert_eq!(summary.op_count, 2);
    }

    #[test]
    fn overlapping_draws_prevent_group_opacity() {
        let summary = summarize(&[rect(0.0, 0.0, 10.0, 10.0), rect(5.0, 5.0, 15.0, 15.0)]);
        assert!(!summary.can_apply_group_opacity);
    }

    #[test]
    fn touching_edges_do_not_overlap() {
        let summary = summarize(&[rect(0.0, 0.0, 10.0, 10.0), rect(10.0, 0.0, 20.0, 10.0)]);
        assert!(summary.can_apply_group_opacity);
    }

    #[test]
    fn transforms_and_clips_shape_bounds() {
        let summary = summarize(&[
            Op::Save,
            Op::Translate(Translate { tx: 100.0, ty: 50.0 }),
            Op::ClipRect(ClipRect {
                rect: [0.0, 0.0, 5.0, 5.0],
                clip_op: ClipOp::Intersect,
                anti_alias: 1,
            }),
            rect(0.0, 0.0, 10.0, 10.0),
            Op::Restore,
            // Fully clipped out.
            Op::ClipRect(ClipRect {
                rect: [0.0, 0.0, 1.0, 1.0],
                clip_op: ClipOp::Intersect,
                anti_alias: 0,
            }),
            rect(50.0, 50.0, 60.0, 60.0),
        ]);
        assert_eq!(summary.bounds, [100.0, 50.0, 105.0, 55.0]);
    }

    #[test]
    fn strokes_are_outset() {
        let summary = summarize(&[
            Op::SetStyle(SetStyle {
                style: DrawStyle::Stroke,
            }),
            Op::SetStrokeJoin(display_list_encoding::SetStrokeJoin {
                join: StrokeJoin::Round,
            }),
            Op::SetStrokeWidth(display_list_encoding::SetStrokeWidth { width: 4.0 }),
            rect(10.0, 10.0, 20.0, 20.0),
        ]);
        assert_eq!(summary.bounds, [8.0, 8.0, 22.0, 22.0]);
    }

    #[test]
    fn unclipped_paint_is_unbounded() {
        let summary = summarize(&[Op::DrawPaint]);
        assert_eq!(summary.bounds, UNBOUNDED);
        assert!(!summary.modifies_transparent_black);
    }

    #[test]
    fn clear_without_clip_modifies_transparent_black() {
        let summary = summarize(&[Op::DrawColor(DrawColor {
            argb: 0,
            blend_mode: BlendMode::Clear,
        })]);
        assert!(summary.modifies_transparent_black);
        assert!(!summary.can_apply_group_opacity);

        let summary = summarize(&[
            Op::ClipRect(ClipRect {
                rect: [0.0, 0.0, 8.0, 8.0],
                clip_op: ClipOp::Intersect,
                anti_alias: 0,
            }),
            Op::SetBlendMode(display_list_encoding::SetBlendMode {
                mode: BlendMode::Src,
            }),
            rect(1.0, 1.0, 2.0, 2.0),
        ]);
        assert!(!summary.modifies_transparent_black);
        assert_eq!(summary.bounds, [0.0, 0.0, 8.0, 8.0]);
    }

    #[test]
    fn save_layer_reports_its_own_group_opacity() {
        let layer = Op::SaveLayer(SaveLayer {
            bounds: [0.0; 4],
            argb: 0x8000_0000,
            blend_mode: BlendMode::SrcOver,
            options: SaveLayer::HAS_PAINT,
        });
        let mut accumulator = Accumulator::new();
        accumulator.accumulate(&rect(0.0, 0.0, 10.0, 10.0));
        accumulator.accumulate(&layer);
        accumulator.accumulate(&rect(20.0, 0.0, 30.0, 10.0));
        accumulator.accumulate(&rect(25.0, 0.0, 35.0, 10.0));
        assert_eq!(accumulator.accumulate(&Op::Restore), Some(false));
        // The layer doesn't overlap the first rect.
        let summary = accumulator.finish();
        assert!(summary.can_apply_group_opacity);
        assert_eq!(summary.bounds, [0.0, 0.0, 35.0, 10.0]);
        assert_eq!(summary.op_count, 5);
    }

    #[test]
    fn extra_restore_is_ignored() {
        let mut accumulator = Accumulator::new();
        assert_eq!(accumulator.accumulate(&Op::Restore), None);
        assert_eq!(accumulator.save_count(), 1);
    }
}
