// Copyright 2025 the Display List Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::sync::Arc;

use display_list_encoding::math::{
    affine_to_f32, color_to_argb, point_to_f32, radii_to_f32, rect_to_f32,
};
use display_list_encoding::*;
use peniko::kurbo::{Affine, Point, Rect, RoundedRect, Shape};
use peniko::Color;
use smallvec::SmallVec;

use crate::{Accumulator, DisplayList, Flow, Sink, UsageError};

/// Configuration of a [`DisplayListBuilder`].
#[derive(Copy, Clone, Debug, Default)]
pub struct BuilderOptions {
    /// Bytes reserved up front for the records.
    pub initial_capacity: usize,
}

/// Paint used to composite a save layer onto its parent.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LayerPaint {
    /// The alpha of the color is applied to the whole layer.
    pub color: Color,
    pub blend_mode: BlendMode,
}

impl Default for LayerPaint {
    fn default() -> Self {
        Self {
            color: Color::BLACK,
            blend_mode: BlendMode::SrcOver,
        }
    }
}

/// Less common parameters of [`DisplayListBuilder::draw_atlas`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AtlasOptions {
    pub blend_mode: BlendMode,
    pub sampling: Sampling,
    /// Bounds covering every sprite, if known.
    pub cull: Option<Rect>,
    /// Draw with the current paint attributes.
    pub with_paint: bool,
}

impl Default for AtlasOptions {
    fn default() -> Self {
        Self {
            blend_mode: BlendMode::Modulate,
            sampling: Sampling::Linear,
            cull: None,
            with_paint: false,
        }
    }
}

/// Records drawing operations into a [`DisplayList`].
///
/// Every call appends exactly one record and updates the summary of the
/// list. Programmer errors such as an unbalanced [`restore`](Self::restore)
/// are logged and ignored, and panic in debug builds.
#[derive(Clone, Debug)]
pub struct DisplayListBuilder {
    buffer: EncodingBuffer,
    accumulator: Accumulator,
    /// One entry per open save: the offset of its `SaveLayer` record, or
    /// `None` for a plain save.
    saves: SmallVec<[Option<usize>; 8]>,
    finished: bool,
}

impl Default for DisplayListBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplayListBuilder {
    pub fn new() -> Self {
        Self::with_options(BuilderOptions::default())
    }

    pub fn with_options(options: BuilderOptions) -> Self {
        Self {
            buffer: EncodingBuffer::with_capacity(options.initial_capacity),
            accumulator: Accumulator::new(),
            saves: SmallVec::new(),
            finished: false,
        }
    }

    /// Size of the records appended so far.
    pub fn byte_count(&self) -> usize {
        self.buffer.current_size()
    }

    pub fn set_anti_alias(&mut self, enabled: bool) {
        self.push(&Op::SetAntiAlias(SetAntiAlias {
            enabled: enabled.into(),
        }));
    }

    pub fn set_color(&mut self, color: Color) {
        self.push(&Op::SetColor(SetColor {
            argb: color_to_argb(color),
        }));
    }

    pub fn set_blend_mode(&mut self, mode: BlendMode) {
        self.push(&Op::SetBlendMode(SetBlendMode { mode }));
    }

    pub fn set_style(&mut self, style: DrawStyle) {
        self.push(&Op::SetStyle(SetStyle { style }));
    }

    /// Sets the stroke width. Zero draws hairlines.
    pub fn set_stroke_width(&mut self, width: f64) {
        self.push(&Op::SetStrokeWidth(SetStrokeWidth {
            width: width as f32,
        }));
    }

    pub fn set_stroke_miter(&mut self, limit: f64) {
        self.push(&Op::SetStrokeMiter(SetStrokeMiter {
            limit: limit as f32,
        }));
    }

    pub fn set_stroke_cap(&mut self, cap: StrokeCap) {
        self.push(&Op::SetStrokeCap(SetStrokeCap { cap }));
    }

    pub fn set_stroke_join(&mut self, join: StrokeJoin) {
        self.push(&Op::SetStrokeJoin(SetStrokeJoin { join }));
    }

    /// Saves the current transform and clip.
    pub fn save(&mut self) {
        self.push(&Op::Save);
    }

    /// Saves the current transform and clip and redirects drawing into an
    /// offscreen layer.
    ///
    /// On [`restore`](Self::restore) the layer is composited with `paint`,
    /// or with plain source-over when there is none. Content outside
    /// `bounds` may be discarded.
    pub fn save_layer(&mut self, bounds: Option<Rect>, paint: Option<LayerPaint>) {
        let mut options = 0;
        if bounds.is_some() {
            options |= SaveLayer::HAS_BOUNDS;
        }
        if paint.is_some() {
            options |= SaveLayer::HAS_PAINT;
        }
        let paint = paint.unwrap_or_default();
        self.push(&Op::SaveLayer(SaveLayer {
            bounds: bounds.map(rect_to_f32).unwrap_or_default(),
            argb: color_to_argb(paint.color),
            blend_mode: paint.blend_mode,
            options,
        }));
    }

    /// Restores the state saved by the matching [`save`](Self::save) or
    /// [`save_layer`](Self::save_layer).
    pub fn restore(&mut self) {
        self.push(&Op::Restore);
    }

    /// Restores until [`save_count`](Self::save_count) is at most `count`.
    pub fn restore_to_count(&mut self, count: usize) {
        if count < 1 {
            usage_error(UsageError::RestoreCountBelowOne(count));
            return;
        }
        while self.save_count() > count {
            self.restore();
        }
    }

    /// Number of open saves, plus one for the base level.
    pub fn save_count(&self) -> usize {
        self.saves.len() + 1
    }

    pub fn translate(&mut self, tx: f64, ty: f64) {
        self.push(&Op::Translate(Translate {
            tx: tx as f32,
            ty: ty as f32,
        }));
    }

    pub fn scale(&mut self, sx: f64, sy: f64) {
        self.push(&Op::Scale(Scale {
            sx: sx as f32,
            sy: sy as f32,
        }));
    }

    /// Rotates clockwise (with y pointing down) by `degrees`.
    pub fn rotate(&mut self, degrees: f64) {
        self.push(&Op::Rotate(Rotate {
            degrees: degrees as f32,
        }));
    }

    pub fn skew(&mut self, sx: f64, sy: f64) {
        self.push(&Op::Skew(Skew {
            sx: sx as f32,
            sy: sy as f32,
        }));
    }

    /// Concatenates `transform` with the current transform.
    pub fn transform(&mut self, transform: Affine) {
        self.push(&Op::Transform2DAffine(Transform2DAffine {
            coeffs: affine_to_f32(transform),
        }));
    }

    /// Resets the current transform to identity.
    pub fn transform_reset(&mut self) {
        self.push(&Op::TransformReset);
    }

    pub fn clip_rect(&mut self, rect: Rect, clip_op: ClipOp, anti_alias: bool) {
        self.push(&Op::ClipRect(ClipRect {
            rect: rect_to_f32(rect),
            clip_op,
            anti_alias: anti_alias.into(),
        }));
    }

    pub fn clip_rounded_rect(&mut self, rect: &RoundedRect, clip_op: ClipOp, anti_alias: bool) {
        self.push(&Op::ClipRoundRect(ClipRoundRect {
            rect: rect_to_f32(rect.rect()),
            radii: radii_to_f32(rect.radii()),
            clip_op,
            anti_alias: anti_alias.into(),
        }));
    }

    pub fn clip_path(
        &mut self,
        shape: &impl Shape,
        fill: FillType,
        clip_op: ClipOp,
        anti_alias: bool,
    ) {
        let path = EncodedPath::from_shape(shape, fill);
        self.push(&Op::ClipPath(
            ClipPath {
                clip_op,
                anti_alias: anti_alias.into(),
            },
            path.as_data(),
        ));
    }

    /// Fills the current clip with the current paint.
    pub fn draw_paint(&mut self) {
        self.push(&Op::DrawPaint);
    }

    /// Fills the current clip with `color`, ignoring the current paint.
    pub fn draw_color(&mut self, color: Color, blend_mode: BlendMode) {
        self.push(&Op::DrawColor(DrawColor {
            argb: color_to_argb(color),
            blend_mode,
        }));
    }

    /// Strokes a line. Lines are stroked whatever the current style.
    pub fn draw_line(&mut self, p0: Point, p1: Point) {
        self.push(&Op::DrawLine(DrawLine {
            p0: point_to_f32(p0),
            p1: point_to_f32(p1),
        }));
    }

    pub fn draw_rect(&mut self, rect: Rect) {
        self.push(&Op::DrawRect(DrawRect {
            rect: rect_to_f32(rect),
        }));
    }

    /// Draws the ellipse inscribed in `rect`.
    pub fn draw_oval(&mut self, rect: Rect) {
        self.push(&Op::DrawOval(DrawOval {
            rect: rect_to_f32(rect),
        }));
    }

    pub fn draw_circle(&mut self, center: Point, radius: f64) {
        self.push(&Op::DrawCircle(DrawCircle {
            center: point_to_f32(center),
            radius: radius as f32,
        }));
    }

    pub fn draw_rounded_rect(&mut self, rect: &RoundedRect) {
        self.push(&Op::DrawRoundRect(DrawRoundRect {
            rect: rect_to_f32(rect.rect()),
            radii: radii_to_f32(rect.radii()),
        }));
    }

    /// Draws the area between two rounded rectangles.
    pub fn draw_diff_rounded_rect(&mut self, outer: &RoundedRect, inner: &RoundedRect) {
        self.push(&Op::DrawDiffRoundRect(DrawDiffRoundRect {
            outer: rect_to_f32(outer.rect()),
            outer_radii: radii_to_f32(outer.radii()),
            inner: rect_to_f32(inner.rect()),
            inner_radii: radii_to_f32(inner.radii()),
        }));
    }

    /// Draws an arc of the oval inscribed in `rect`. With `use_center` the
    /// arc is closed through the center, forming a wedge.
    pub fn draw_arc(
        &mut self,
        rect: Rect,
        start_degrees: f64,
        sweep_degrees: f64,
        use_center: bool,
    ) {
        self.push(&Op::DrawArc(DrawArc {
            rect: rect_to_f32(rect),
            start_degrees: start_degrees as f32,
            sweep_degrees: sweep_degrees as f32,
            use_center: use_center.into(),
        }));
    }

    /// Draws any `kurbo` shape as a path.
    pub fn draw_path(&mut self, shape: &impl Shape, fill: FillType) {
        let path = EncodedPath::from_shape(shape, fill);
        self.push(&Op::DrawPath(path.as_data()));
    }

    /// Strokes points, line segments or a polyline depending on `mode`.
    pub fn draw_points(&mut self, mode: PointMode, points: &[Point]) {
        let points: Vec<_> = points.iter().copied().map(point_to_f32).collect();
        self.push(&Op::DrawPoints(mode, PodSlice::new(&points)));
    }

    /// Draws a triangle mesh, optionally with one color per vertex blended
    /// with the paint color by `blend_mode`.
    pub fn draw_vertices(
        &mut self,
        mode: VertexMode,
        positions: &[Point],
        colors: Option<&[Color]>,
        blend_mode: BlendMode,
    ) {
        if colors.is_some_and(|colors| colors.len() != positions.len()) {
            usage_error(UsageError::MismatchedLengths("draw_vertices"));
            return;
        }
        let positions: Vec<_> = positions.iter().copied().map(point_to_f32).collect();
        let colors: Option<Vec<_>> =
            colors.map(|colors| colors.iter().copied().map(color_to_argb).collect());
        self.push(&Op::DrawVertices(VertexData {
            mode,
            blend_mode,
            positions: PodSlice::new(&positions),
            colors: colors.as_deref().map(PodSlice::new),
        }));
    }

    /// Draws an image with its top left corner at `point`.
    pub fn draw_image(
        &mut self,
        image: ImageRef,
        point: Point,
        sampling: Sampling,
        with_paint: bool,
    ) {
        self.push(&Op::DrawImage(DrawImage {
            image,
            point: point_to_f32(point),
            sampling,
            with_paint: with_paint.into(),
        }));
    }

    /// Draws the `src` part of an image scaled into `dst`.
    pub fn draw_image_rect(
        &mut self,
        image: ImageRef,
        src: Rect,
        dst: Rect,
        sampling: Sampling,
        with_paint: bool,
        constraint: SrcRectConstraint,
    ) {
        self.push(&Op::DrawImageRect(DrawImageRect {
            image,
            src: rect_to_f32(src),
            dst: rect_to_f32(dst),
            sampling,
            with_paint: with_paint.into(),
            constraint,
        }));
    }

    /// Draws an image split in nine parts by the integer `center` rectangle.
    /// The corners keep their size and the rest stretches to fill `dst`.
    pub fn draw_image_nine(
        &mut self,
        image: ImageRef,
        center: [i32; 4],
        dst: Rect,
        filter: FilterMode,
        with_paint: bool,
    ) {
        self.push(&Op::DrawImageNine(DrawImageNine {
            image,
            center,
            dst: rect_to_f32(dst),
            filter,
            with_paint: with_paint.into(),
        }));
    }

    /// Draws sprites from one image.
    ///
    /// Each sprite is the `tex_rects` rectangle of the image placed by the
    /// rotation-scale transform `[scos, ssin, tx, ty]` of the same index.
    pub fn draw_atlas(
        &mut self,
        image: ImageRef,
        xforms: &[[f32; 4]],
        tex_rects: &[Rect],
        colors: Option<&[Color]>,
        options: AtlasOptions,
    ) {
        if xforms.len() != tex_rects.len()
            || colors.is_some_and(|colors| colors.len() != xforms.len())
        {
            usage_error(UsageError::MismatchedLengths("draw_atlas"));
            return;
        }
        let tex_rects: Vec<_> = tex_rects.iter().copied().map(rect_to_f32).collect();
        let colors: Option<Vec<_>> =
            colors.map(|colors| colors.iter().copied().map(color_to_argb).collect());
        self.push(&Op::DrawAtlas(AtlasData {
            image,
            blend_mode: options.blend_mode,
            sampling: options.sampling,
            cull: options.cull.map(rect_to_f32),
            with_paint: options.with_paint,
            xforms: PodSlice::new(xforms),
            tex_rects: PodSlice::new(&tex_rects),
            colors: colors.as_deref().map(PodSlice::new),
        }));
    }

    /// Embeds a copy of `list`, to be drawn with `opacity`.
    pub fn draw_display_list(&mut self, list: &DisplayList, opacity: f32) {
        self.push(&Op::DrawDisplayList(list.as_nested(opacity)));
    }

    /// Draws the shadow `shape` would cast at `elevation` above the canvas.
    pub fn draw_shadow(
        &mut self,
        shape: &impl Shape,
        color: Color,
        elevation: f64,
        transparent_occluder: bool,
        dpr: f64,
    ) {
        let path = EncodedPath::from_shape(shape, FillType::NonZero);
        self.push(&Op::DrawShadow(
            DrawShadow {
                argb: color_to_argb(color),
                elevation: elevation as f32,
                dpr: dpr as f32,
                transparent_occluder: transparent_occluder.into(),
            },
            path.as_data(),
        ));
    }

    /// Closes any open saves and returns the finished list.
    ///
    /// The builder can't be used for recording afterwards.
    pub fn finish(&mut self) -> Result<Arc<DisplayList>, UsageError> {
        if self.finished {
            log::error!("{}", UsageError::FinishTwice);
            return Err(UsageError::FinishTwice);
        }
        while !self.saves.is_empty() {
            self.restore();
        }
        self.finished = true;
        let buffer = std::mem::take(&mut self.buffer);
        let accumulator = std::mem::take(&mut self.accumulator);
        Ok(Arc::new(DisplayList::from_parts(
            buffer.finalize(),
            accumulator.finish(),
        )))
    }

    /// Appends one record.
    fn push(&mut self, op: &Op<'_>) {
        if self.finished {
            usage_error(UsageError::AppendAfterFinish);
            return;
        }
        match op {
            Op::Save => {
                self.saves.push(None);
                self.encode(op);
            }
            Op::SaveLayer(layer) => {
                // Known only once the layer is restored.
                let layer = SaveLayer {
                    options: layer.options & (SaveLayer::HAS_BOUNDS | SaveLayer::HAS_PAINT),
                    ..*layer
                };
                self.saves.push(Some(self.buffer.current_size()));
                self.encode(&Op::SaveLayer(layer));
            }
            Op::Restore => {
                let Some(save) = self.saves.pop() else {
                    usage_error(UsageError::UnbalancedRestore);
                    return;
                };
                let group_opacity = self.encode(op);
                if let (Some(offset), Some(true)) = (save, group_opacity) {
                    self.set_can_distribute_opacity(offset);
                }
            }
            Op::DrawDisplayList(nested) => {
                if op.encoded_len() > u32::MAX as usize {
                    usage_error(UsageError::NestedListTooLarge(nested.storage.len()));
                    return;
                }
                self.encode(op);
            }
            _ => {
                self.encode(op);
            }
        }
    }

    fn encode(&mut self, op: &Op<'_>) -> Option<bool> {
        op.encode(&mut self.buffer);
        self.accumulator.accumulate(op)
    }

    fn set_can_distribute_opacity(&mut self, record_offset: usize) {
        let at = record_offset + RecordHeader::SIZE + std::mem::offset_of!(SaveLayer, options);
        let options: u32 = bytemuck::pod_read_unaligned(&self.buffer.data()[at..at + 4]);
        let options = options | SaveLayer::CAN_DISTRIBUTE_OPACITY;
        self.buffer.patch(at, bytemuck::bytes_of(&options));
    }
}

/// Appends every dispatched op, for re-recording.
impl Sink for DisplayListBuilder {
    fn op(&mut self, op: &Op<'_>) -> Flow {
        let finished = self.finished;
        self.push(op);
        if finished {
            Flow::Stop
        } else {
            Flow::Continue
        }
    }

    fn descend_nested(&mut self) -> bool {
        false
    }
}

fn usage_error(error: UsageError) {
    log::error!("Display list usage error: {error}");
    if cfg!(debug_assertions) {
        panic!("Display list usage error: {error}");
    }
}
