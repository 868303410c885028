// Copyright 2025 the Display List Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use display_list_encoding::math::{
    affine_from_f32, color_from_argb, point_from_f32, radii_from_f32, rect_from_f32,
};
use display_list_encoding::*;
use peniko::kurbo::{self, Affine, BezPath, Circle, Ellipse, Point, Rect, RoundedRect, Shape, Vec2};
use peniko::Color;

use crate::{Flow, Sink};

/// Accuracy used when flattening arcs and conics to curves.
const TOLERANCE: f64 = 0.1;

/// Paint attributes resolved from the attribute records.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Paint {
    pub color: Color,
    pub blend_mode: BlendMode,
    pub anti_alias: bool,
    pub style: DrawStyle,
    /// Zero strokes hairlines.
    pub stroke_width: f64,
    pub miter_limit: f64,
    pub cap: StrokeCap,
    pub join: StrokeJoin,
}

impl Default for Paint {
    fn default() -> Self {
        Self {
            color: Color::BLACK,
            blend_mode: BlendMode::SrcOver,
            anti_alias: false,
            style: DrawStyle::Fill,
            stroke_width: 0.0,
            miter_limit: 4.0,
            cap: StrokeCap::Butt,
            join: StrokeJoin::Miter,
        }
    }
}

impl Paint {
    /// The stroke style described by this paint.
    pub fn stroke(&self) -> kurbo::Stroke {
        let cap = match self.cap {
            StrokeCap::Butt => kurbo::Cap::Butt,
            StrokeCap::Round => kurbo::Cap::Round,
            StrokeCap::Square => kurbo::Cap::Square,
        };
        let join = match self.join {
            StrokeJoin::Miter => kurbo::Join::Miter,
            StrokeJoin::Round => kurbo::Join::Round,
            StrokeJoin::Bevel => kurbo::Join::Bevel,
        };
        kurbo::Stroke::new(self.stroke_width)
            .with_caps(cap)
            .with_join(join)
            .with_miter_limit(self.miter_limit)
    }

    fn with_style(self, style: DrawStyle) -> Self {
        Self { style, ..self }
    }
}

/// A drawing backend driven by a [`CanvasRenderer`].
///
/// Geometry is given in local coordinates along with the transform mapping
/// it to the device. Save and restore calls are balanced.
pub trait Canvas {
    /// Saves the clip.
    fn save(&mut self);

    /// Saves the clip and starts an offscreen layer, to be composited with
    /// `alpha` and `blend_mode` on restore.
    fn save_layer(
        &mut self,
        transform: Affine,
        bounds: Option<Rect>,
        alpha: f32,
        blend_mode: BlendMode,
    );

    fn restore(&mut self);

    fn clip(
        &mut self,
        transform: Affine,
        path: &BezPath,
        fill: FillType,
        clip_op: ClipOp,
        anti_alias: bool,
    );

    /// Fills the whole clip.
    fn draw_paint(&mut self, paint: &Paint);

    /// Fills or strokes a path as described by `paint.style`.
    fn draw_path(&mut self, transform: Affine, path: &BezPath, fill: FillType, paint: &Paint);

    /// Draws the `src` part of `image` scaled into `dst`. Without a paint the
    /// image is drawn opaque with source-over.
    fn draw_image_rect(
        &mut self,
        transform: Affine,
        image: ImageRef,
        src: Rect,
        dst: Rect,
        sampling: Sampling,
        paint: Option<&Paint>,
    );

    fn draw_shadow(
        &mut self,
        transform: Affine,
        path: &BezPath,
        color: Color,
        elevation: f64,
        dpr: f64,
        transparent_occluder: bool,
    );

    /// Draws a triangle mesh.
    ///
    /// Vertex colors are the destination and the paint color the source of
    /// `vertices.blend_mode`. The default fills each triangle separately,
    /// flat shaded with the color of its first vertex. With `Src`, or without
    /// per-vertex colors, the paint color is used instead. Backends that
    /// interpolate colors should override this and blend per pixel.
    fn draw_vertices(&mut self, transform: Affine, vertices: &VertexData<'_>, paint: &Paint) {
        let positions: Vec<Point> = vertices.positions.iter().map(point_from_f32).collect();
        let triangles: Vec<[usize; 3]> = match vertices.mode {
            VertexMode::Triangles => (0..positions.len() / 3)
                .map(|i| [3 * i, 3 * i + 1, 3 * i + 2])
                .collect(),
            VertexMode::TriangleStrip => (2..positions.len()).map(|i| [i - 2, i - 1, i]).collect(),
            VertexMode::TriangleFan => (2..positions.len()).map(|i| [0, i - 1, i]).collect(),
        };
        let fill = paint.with_style(DrawStyle::Fill);
        for [a, b, c] in triangles {
            let mut path = BezPath::new();
            path.move_to(positions[a]);
            path.line_to(positions[b]);
            path.line_to(positions[c]);
            path.close_path();
            let vertex_color = match vertices.blend_mode {
                BlendMode::Src => None,
                _ => vertices.colors.and_then(|colors| colors.get(a)),
            };
            let paint = match vertex_color {
                Some(argb) => Paint {
                    color: color_from_argb(argb),
                    ..fill
                },
                None => fill,
            };
            self.draw_path(transform, &path, FillType::NonZero, &paint);
        }
    }

    /// Draws a nine-patch.
    ///
    /// The default draws up to nine image rects. Corners keep their size
    /// unless `dst` is too small to hold them, in which case they shrink.
    fn draw_image_nine(
        &mut self,
        transform: Affine,
        image: ImageRef,
        center: [i32; 4],
        dst: Rect,
        filter: FilterMode,
        paint: Option<&Paint>,
    ) {
        let sampling = match filter {
            FilterMode::Nearest => Sampling::Nearest,
            FilterMode::Linear => Sampling::Linear,
        };
        let [l, t, r, b] = center.map(f64::from);
        let (src_x, dst_x) = nine_axis(image.width as f64, l, r, dst.x0, dst.x1);
        let (src_y, dst_y) = nine_axis(image.height as f64, t, b, dst.y0, dst.y1);
        for row in 0..3 {
            for column in 0..3 {
                let src = Rect::new(src_x[column], src_y[row], src_x[column + 1], src_y[row + 1]);
                let dst = Rect::new(dst_x[column], dst_y[row], dst_x[column + 1], dst_y[row + 1]);
                if src.area() > 0.0 && dst.area() > 0.0 {
                    self.draw_image_rect(transform, image, src, dst, sampling, paint);
                }
            }
        }
    }

    /// Draws atlas sprites.
    ///
    /// Sprite colors are the source and the image the destination of
    /// `atlas.blend_mode`. The default draws one image rect per sprite, or
    /// fills the sprite with its color under `Src`. Any other mode draws the
    /// image untinted, so backends that can tint images should override this.
    fn draw_atlas(&mut self, transform: Affine, atlas: &AtlasData<'_>, paint: Option<&Paint>) {
        let sprites = atlas.xforms.iter().zip(atlas.tex_rects.iter());
        for (index, (xform, tex)) in sprites.enumerate() {
            let [scos, ssin, tx, ty] = xform.map(f64::from);
            let sprite = transform * Affine::new([scos, ssin, -ssin, scos, tx, ty]);
            let src = rect_from_f32(tex);
            let dst = Rect::from_origin_size(Point::ORIGIN, src.size());
            let color = match atlas.blend_mode {
                BlendMode::Src => atlas.colors.and_then(|colors| colors.get(index)),
                _ => None,
            };
            match color {
                Some(argb) => {
                    let fill = Paint {
                        color: color_from_argb(argb),
                        style: DrawStyle::Fill,
                        ..paint.copied().unwrap_or_default()
                    };
                    self.draw_path(sprite, &dst.to_path(TOLERANCE), FillType::NonZero, &fill);
                }
                None => self.draw_image_rect(sprite, atlas.image, src, dst, atlas.sampling, paint),
            }
        }
    }
}

/// Splits one axis of a nine-patch into source and destination stops.
fn nine_axis(size: f64, lo: f64, hi: f64, d0: f64, d1: f64) -> ([f64; 4], [f64; 4]) {
    let lo = lo.clamp(0.0, size);
    let hi = hi.clamp(lo, size);
    let fixed = lo + (size - hi);
    let available = d1 - d0;
    let scale = if fixed > available && fixed > 0.0 {
        available.max(0.0) / fixed
    } else {
        1.0
    };
    let src = [0.0, lo, hi, size];
    let dst = [d0, d0 + lo * scale, d1 - (size - hi) * scale, d1];
    (src, dst)
}

/// A nested list being rendered.
#[derive(Copy, Clone, Debug)]
struct NestedFrame {
    /// Paint of the enclosing list, restored when the nested list ends.
    paint: Paint,
    /// Length of the transform stack before the nested list started.
    depth: usize,
    /// Target of `TransformReset` inside the nested list.
    origin: Affine,
}

/// Renders dispatched ops to a [`Canvas`].
///
/// Paint attributes are tracked here and handed to the canvas with every
/// draw. Nested lists start from the default paint and are isolated from
/// the list that embeds them.
#[derive(Debug)]
pub struct CanvasRenderer<C> {
    canvas: C,
    paint: Paint,
    /// Transform per open save, plus the base level.
    transforms: Vec<Affine>,
    nested: Vec<NestedFrame>,
    origin: Affine,
    /// Set when the last nested list record is skipped.
    skip_nested: bool,
}

impl<C: Canvas> CanvasRenderer<C> {
    pub fn new(canvas: C) -> Self {
        Self::with_transform(canvas, Affine::IDENTITY)
    }

    /// Renders with every op additionally transformed by `transform`.
    pub fn with_transform(canvas: C, transform: Affine) -> Self {
        Self {
            canvas,
            paint: Paint::default(),
            transforms: vec![transform],
            nested: Vec::new(),
            origin: transform,
            skip_nested: false,
        }
    }

    pub fn canvas(&self) -> &C {
        &self.canvas
    }

    pub fn into_canvas(self) -> C {
        self.canvas
    }

    fn transform(&self) -> Affine {
        self.transforms.last().copied().unwrap_or(self.origin)
    }

    fn set_transform(&mut self, transform: Affine) {
        if let Some(last) = self.transforms.last_mut() {
            *last = transform;
        }
    }

    fn concat(&mut self, transform: Affine) -> Flow {
        self.set_transform(self.transform() * transform);
        Flow::Continue
    }

    /// Smallest transform stack length the current list may restore to.
    fn floor(&self) -> usize {
        self.nested.last().map_or(1, |frame| frame.depth + 1)
    }

    fn clip(&mut self, path: &BezPath, fill: FillType, clip_op: ClipOp, anti_alias: u32) -> Flow {
        let transform = self.transform();
        self.canvas
            .clip(transform, path, fill, clip_op, anti_alias != 0);
        Flow::Continue
    }

    fn fill_or_stroke(&mut self, shape: &impl Shape, fill: FillType) -> Flow {
        let transform = self.transform();
        self.canvas
            .draw_path(transform, &shape.to_path(TOLERANCE), fill, &self.paint);
        Flow::Continue
    }

    fn stroke(&mut self, path: &BezPath) -> Flow {
        let paint = self.paint.with_style(DrawStyle::Stroke);
        let transform = self.transform();
        self.canvas
            .draw_path(transform, path, FillType::NonZero, &paint);
        Flow::Continue
    }

    fn image_paint(&self, with_paint: u32) -> Option<&Paint> {
        (with_paint != 0).then_some(&self.paint)
    }
}

fn points_path(mode: PointMode, points: &PodSlice<'_, [f32; 2]>) -> BezPath {
    let mut path = BezPath::new();
    let points: Vec<Point> = points.iter().map(point_from_f32).collect();
    match mode {
        PointMode::Points => {
            for point in points {
                path.move_to(point);
                path.line_to(point);
            }
        }
        PointMode::Lines => {
            for pair in points.chunks_exact(2) {
                path.move_to(pair[0]);
                path.line_to(pair[1]);
            }
        }
        PointMode::Polygon => {
            for (i, point) in points.into_iter().enumerate() {
                if i == 0 {
                    path.move_to(point);
                } else {
                    path.line_to(point);
                }
            }
        }
    }
    path
}

fn arc_path(p: &DrawArc) -> BezPath {
    let rect = rect_from_f32(p.rect);
    let arc = kurbo::Arc::new(
        rect.center(),
        Vec2::new(rect.width() / 2.0, rect.height() / 2.0),
        (p.start_degrees as f64).to_radians(),
        (p.sweep_degrees as f64).to_radians(),
        0.0,
    );
    let (sin, cos) = arc.start_angle.sin_cos();
    let start = rect.center() + Vec2::new(arc.radii.x * cos, arc.radii.y * sin);
    let mut path = BezPath::new();
    if p.use_center != 0 {
        path.move_to(rect.center());
        path.line_to(start);
        path.extend(arc.append_iter(TOLERANCE));
        path.close_path();
    } else {
        path.move_to(start);
        path.extend(arc.append_iter(TOLERANCE));
    }
    path
}

impl<C: Canvas> Sink for CanvasRenderer<C> {
    fn set_anti_alias(&mut self, p: SetAntiAlias) -> Flow {
        self.paint.anti_alias = p.enabled != 0;
        Flow::Continue
    }
    fn set_color(&mut self, p: SetColor) -> Flow {
        self.paint.color = color_from_argb(p.argb);
        Flow::Continue
    }
    fn set_blend_mode(&mut self, p: SetBlendMode) -> Flow {
        self.paint.blend_mode = p.mode;
        Flow::Continue
    }
    fn set_style(&mut self, p: SetStyle) -> Flow {
        self.paint.style = p.style;
        Flow::Continue
    }
    fn set_stroke_width(&mut self, p: SetStrokeWidth) -> Flow {
        self.paint.stroke_width = p.width as f64;
        Flow::Continue
    }
    fn set_stroke_miter(&mut self, p: SetStrokeMiter) -> Flow {
        self.paint.miter_limit = p.limit as f64;
        Flow::Continue
    }
    fn set_stroke_cap(&mut self, p: SetStrokeCap) -> Flow {
        self.paint.cap = p.cap;
        Flow::Continue
    }
    fn set_stroke_join(&mut self, p: SetStrokeJoin) -> Flow {
        self.paint.join = p.join;
        Flow::Continue
    }

    fn save(&mut self) -> Flow {
        self.canvas.save();
        let transform = self.transform();
        self.transforms.push(transform);
        Flow::Continue
    }
    fn save_layer(&mut self, p: SaveLayer) -> Flow {
        let alpha = if p.has_paint() {
            color_from_argb(p.argb).a as f32 / 255.0
        } else {
            1.0
        };
        let bounds = p.bounds().map(rect_from_f32);
        let transform = self.transform();
        self.canvas
            .save_layer(transform, bounds, alpha, p.effective_blend_mode());
        self.transforms.push(transform);
        Flow::Continue
    }
    fn restore(&mut self) -> Flow {
        if self.transforms.len() > self.floor() {
            self.transforms.pop();
            self.canvas.restore();
        }
        Flow::Continue
    }

    fn translate(&mut self, p: Translate) -> Flow {
        self.concat(Affine::translate((p.tx as f64, p.ty as f64)))
    }
    fn scale(&mut self, p: Scale) -> Flow {
        self.concat(Affine::scale_non_uniform(p.sx as f64, p.sy as f64))
    }
    fn rotate(&mut self, p: Rotate) -> Flow {
        self.concat(Affine::rotate((p.degrees as f64).to_radians()))
    }
    fn skew(&mut self, p: Skew) -> Flow {
        self.concat(Affine::skew(p.sx as f64, p.sy as f64))
    }
    fn transform_2d_affine(&mut self, p: Transform2DAffine) -> Flow {
        self.concat(affine_from_f32(p.coeffs))
    }
    fn transform_reset(&mut self) -> Flow {
        let origin = self.nested.last().map_or(self.origin, |frame| frame.origin);
        self.set_transform(origin);
        Flow::Continue
    }

    fn clip_rect(&mut self, p: ClipRect) -> Flow {
        let path = rect_from_f32(p.rect).to_path(TOLERANCE);
        self.clip(&path, FillType::NonZero, p.clip_op, p.anti_alias)
    }
    fn clip_round_rect(&mut self, p: ClipRoundRect) -> Flow {
        let rect = RoundedRect::from_rect(rect_from_f32(p.rect), radii_from_f32(p.radii));
        self.clip(&rect.to_path(TOLERANCE), FillType::NonZero, p.clip_op, p.anti_alias)
    }
    fn clip_path(&mut self, p: ClipPath, path: PathData<'_>) -> Flow {
        self.clip(&path.to_bez_path(), path.fill, p.clip_op, p.anti_alias)
    }

    fn draw_paint(&mut self) -> Flow {
        self.canvas.draw_paint(&self.paint);
        Flow::Continue
    }
    fn draw_color(&mut self, p: DrawColor) -> Flow {
        let paint = Paint {
            color: color_from_argb(p.argb),
            blend_mode: p.blend_mode,
            ..Paint::default()
        };
        self.canvas.draw_paint(&paint);
        Flow::Continue
    }
    fn draw_line(&mut self, p: DrawLine) -> Flow {
        let mut path = BezPath::new();
        path.move_to(point_from_f32(p.p0));
        path.line_to(point_from_f32(p.p1));
        self.stroke(&path)
    }
    fn draw_rect(&mut self, p: DrawRect) -> Flow {
        self.fill_or_stroke(&rect_from_f32(p.rect), FillType::NonZero)
    }
    fn draw_oval(&mut self, p: DrawOval) -> Flow {
        self.fill_or_stroke(&Ellipse::from_rect(rect_from_f32(p.rect)), FillType::NonZero)
    }
    fn draw_circle(&mut self, p: DrawCircle) -> Flow {
        let circle = Circle::new(point_from_f32(p.center), p.radius as f64);
        self.fill_or_stroke(&circle, FillType::NonZero)
    }
    fn draw_round_rect(&mut self, p: DrawRoundRect) -> Flow {
        let rect = RoundedRect::from_rect(rect_from_f32(p.rect), radii_from_f32(p.radii));
        self.fill_or_stroke(&rect, FillType::NonZero)
    }
    fn draw_diff_round_rect(&mut self, p: DrawDiffRoundRect) -> Flow {
        let outer = RoundedRect::from_rect(rect_from_f32(p.outer), radii_from_f32(p.outer_radii));
        let inner = RoundedRect::from_rect(rect_from_f32(p.inner), radii_from_f32(p.inner_radii));
        let mut path = outer.to_path(TOLERANCE);
        path.extend(inner.path_elements(TOLERANCE));
        self.fill_or_stroke(&path, FillType::EvenOdd)
    }
    fn draw_arc(&mut self, p: DrawArc) -> Flow {
        self.fill_or_stroke(&arc_path(&p), FillType::NonZero)
    }
    fn draw_path(&mut self, path: PathData<'_>) -> Flow {
        self.fill_or_stroke(&path.to_bez_path(), path.fill)
    }
    fn draw_points(&mut self, mode: PointMode, points: PodSlice<'_, [f32; 2]>) -> Flow {
        self.stroke(&points_path(mode, &points))
    }
    fn draw_vertices(&mut self, vertices: VertexData<'_>) -> Flow {
        let transform = self.transform();
        self.canvas
            .draw_vertices(transform, &vertices, &self.paint);
        Flow::Continue
    }
    fn draw_image(&mut self, p: DrawImage) -> Flow {
        let src = p.image.bounds();
        let dst = src + point_from_f32(p.point).to_vec2();
        let paint = self.image_paint(p.with_paint).copied();
        let transform = self.transform();
        self.canvas
            .draw_image_rect(transform, p.image, src, dst, p.sampling, paint.as_ref());
        Flow::Continue
    }
    fn draw_image_rect(&mut self, p: DrawImageRect) -> Flow {
        let paint = self.image_paint(p.with_paint).copied();
        let transform = self.transform();
        self.canvas.draw_image_rect(
            transform,
            p.image,
            rect_from_f32(p.src),
            rect_from_f32(p.dst),
            p.sampling,
            paint.as_ref(),
        );
        Flow::Continue
    }
    fn draw_image_nine(&mut self, p: DrawImageNine) -> Flow {
        let paint = self.image_paint(p.with_paint).copied();
        let transform = self.transform();
        self.canvas.draw_image_nine(
            transform,
            p.image,
            p.center,
            rect_from_f32(p.dst),
            p.filter,
            paint.as_ref(),
        );
        Flow::Continue
    }
    fn draw_atlas(&mut self, atlas: AtlasData<'_>) -> Flow {
        let paint = atlas.with_paint.then_some(self.paint);
        let transform = self.transform();
        self.canvas.draw_atlas(transform, &atlas, paint.as_ref());
        Flow::Continue
    }
    fn draw_display_list(&mut self, list: NestedList<'_>) -> Flow {
        self.skip_nested = list.opacity() <= 0.0;
        Flow::Continue
    }
    fn draw_shadow(&mut self, p: DrawShadow, path: PathData<'_>) -> Flow {
        let transform = self.transform();
        self.canvas.draw_shadow(
            transform,
            &path.to_bez_path(),
            color_from_argb(p.argb),
            p.elevation as f64,
            p.dpr as f64,
            p.transparent_occluder != 0,
        );
        Flow::Continue
    }

    fn descend_nested(&mut self) -> bool {
        !std::mem::take(&mut self.skip_nested)
    }

    fn begin_nested(&mut self, list: &NestedList<'_>) {
        let transform = self.transform();
        self.nested.push(NestedFrame {
            paint: self.paint,
            depth: self.transforms.len(),
            origin: transform,
        });
        let opacity = list.opacity();
        if opacity < 1.0 {
            self.canvas
                .save_layer(transform, None, opacity, BlendMode::SrcOver);
        } else {
            self.canvas.save();
        }
        self.transforms.push(transform);
        self.paint = Paint::default();
    }

    fn end_nested(&mut self) {
        let Some(frame) = self.nested.pop() else {
            return;
        };
        while self.transforms.len() > frame.depth {
            self.transforms.pop();
            self.canvas.restore();
        }
        self.paint = frame.paint;
    }
}

#[cfg(test)]
mod tests {
    use peniko::kurbo::Rect;

    use super::*;
    use crate::{AtlasOptions, DisplayListBuilder};

    /// Records canvas calls as text.
    #[derive(Default)]
    struct Log(Vec<String>);

    impl Canvas for Log {
        fn save(&mut self) {
            self.0.push("save".into());
        }
        fn save_layer(&mut self, _: Affine, _: Option<Rect>, alpha: f32, blend_mode: BlendMode) {
            self.0.push(format!("layer {alpha} {}", blend_mode.name()));
        }
        fn restore(&mut self) {
            self.0.push("restore".into());
        }
        fn clip(&mut self, transform: Affine, path: &BezPath, _: FillType, op: ClipOp, _: bool) {
            let bounds = transform.transform_rect_bbox(path.bounding_box());
            self.0.push(format!("clip {op:?} {bounds:?}"));
        }
        fn draw_paint(&mut self, paint: &Paint) {
            self.0.push(format!("paint {:?}", paint.color));
        }
        fn draw_path(&mut self, transform: Affine, path: &BezPath, _: FillType, paint: &Paint) {
            let bounds = transform.transform_rect_bbox(path.bounding_box());
            self.0
                .push(format!("path {:?} {:?} {bounds:?}", paint.style, paint.color));
        }
        fn draw_image_rect(
            &mut self,
            transform: Affine,
            image: ImageRef,
            src: Rect,
            dst: Rect,
            _: Sampling,
            paint: Option<&Paint>,
        ) {
            let dst = transform.transform_rect_bbox(dst);
            self.0.push(format!(
                "image {} {src:?} {dst:?} {}",
                image.id,
                paint.is_some()
            ));
        }
        fn draw_shadow(
            &mut self,
            _: Affine,
            _: &BezPath,
            _: Color,
            elevation: f64,
            _: f64,
            _: bool,
        ) {
            self.0.push(format!("shadow {elevation}"));
        }
    }

    fn render(list: &crate::DisplayList) -> Vec<String> {
        let mut renderer = CanvasRenderer::new(Log::default());
        list.dispatch(&mut renderer).unwrap();
        renderer.into_canvas().0
    }

    #[test]
    fn paint_attributes_reach_the_canvas() {
        let mut builder = DisplayListBuilder::new();
        builder.set_color(Color::rgb8(255, 0, 0));
        builder.set_style(DrawStyle::Stroke);
        builder.translate(10.0, 0.0);
        builder.draw_rect(Rect::new(0.0, 0.0, 5.0, 5.0));
        let list = builder.finish().unwrap();
        let red = Color::rgb8(255, 0, 0);
        assert_eq!(
            render(&list),
            [format!(
                "path Stroke {red:?} {:?}",
                Rect::new(10.0, 0.0, 15.0, 5.0)
            )]
        );
    }

    #[test]
    fn nested_lists_are_isolated() {
        let mut inner = DisplayListBuilder::new();
        inner.set_color(Color::WHITE);
        inner.save();
        inner.translate(1.0, 1.0);
        inner.draw_paint();
        let inner = inner.finish().unwrap();

        let mut outer = DisplayListBuilder::new();
        outer.set_color(Color::rgb8(0, 0, 255));
        outer.draw_display_list(&inner, 0.5);
        outer.draw_display_list(&inner, 0.0);
        outer.draw_paint();
        let list = outer.finish().unwrap();
        assert_eq!(
            render(&list),
            [
                "layer 0.5 srcOver".to_string(),
                "save".to_string(),
                format!("paint {:?}", Color::WHITE),
                "restore".to_string(),
                "restore".to_string(),
                format!("paint {:?}", Color::rgb8(0, 0, 255)),
            ]
        );
    }

    #[test]
    fn nine_patch_lowering() {
        let mut builder = DisplayListBuilder::new();
        builder.draw_image_nine(
            ImageRef::new(7, 30, 30),
            [10, 10, 20, 20],
            Rect::new(0.0, 0.0, 100.0, 50.0),
            FilterMode::Linear,
            false,
        );
        let list = builder.finish().unwrap();
        let calls = render(&list);
        assert_eq!(calls.len(), 9);
        assert_eq!(
            calls[4],
            format!(
                "image 7 {:?} {:?} false",
                Rect::new(10.0, 10.0, 20.0, 20.0),
                Rect::new(10.0, 10.0, 90.0, 40.0)
            )
        );
    }

    #[test]
    fn vertex_colors_follow_the_blend_mode() {
        let triangle = [Point::ORIGIN, Point::new(4.0, 0.0), Point::new(0.0, 4.0)];
        let colors = [Color::WHITE; 3];
        let mut builder = DisplayListBuilder::new();
        builder.set_color(Color::rgb8(255, 0, 0));
        builder.draw_vertices(VertexMode::Triangles, &triangle, Some(&colors[..]), BlendMode::Dst);
        builder.draw_vertices(VertexMode::Triangles, &triangle, Some(&colors[..]), BlendMode::Src);
        builder.draw_vertices(VertexMode::Triangles, &triangle, None, BlendMode::Dst);
        let list = builder.finish().unwrap();
        let bounds = Rect::new(0.0, 0.0, 4.0, 4.0);
        let red = Color::rgb8(255, 0, 0);
        assert_eq!(
            render(&list),
            [
                format!("path Fill {:?} {bounds:?}", Color::WHITE),
                format!("path Fill {red:?} {bounds:?}"),
                format!("path Fill {red:?} {bounds:?}"),
            ]
        );
    }

    #[test]
    fn atlas_colors_fill_sprites_under_src() {
        let image = ImageRef::new(2, 16, 16);
        let xforms = [[1.0, 0.0, 10.0, 0.0]];
        let tex = [Rect::new(0.0, 0.0, 8.0, 8.0)];
        let colors = [Color::WHITE];
        let mut builder = DisplayListBuilder::new();
        for blend_mode in [BlendMode::Src, BlendMode::Modulate] {
            let options = AtlasOptions {
                blend_mode,
                ..AtlasOptions::default()
            };
            builder.draw_atlas(image, &xforms, &tex, Some(&colors[..]), options);
        }
        let list = builder.finish().unwrap();
        let dst = Rect::new(10.0, 0.0, 18.0, 8.0);
        assert_eq!(
            render(&list),
            [
                format!("path Fill {:?} {dst:?}", Color::WHITE),
                format!("image 2 {:?} {dst:?} false", tex[0]),
            ]
        );
    }

    #[test]
    fn extra_restores_do_not_escape_nested_lists() {
        let mut renderer = CanvasRenderer::new(Log::default());
        let mut inner = DisplayListBuilder::new();
        inner.draw_paint();
        let inner = inner.finish().unwrap();
        renderer.begin_nested(&inner.as_nested(1.0));
        renderer.restore();
        renderer.end_nested();
        assert_eq!(renderer.into_canvas().0, ["save", "restore"]);
    }

    #[test]
    fn stroke_from_paint() {
        let paint = Paint {
            stroke_width: 3.0,
            cap: StrokeCap::Round,
            join: StrokeJoin::Bevel,
            ..Paint::default()
        };
        let stroke = paint.stroke();
        assert_eq!(stroke.width, 3.0);
        assert_eq!(stroke.join, kurbo::Join::Bevel);
        assert_eq!(stroke.start_cap, kurbo::Cap::Round);
    }
}
