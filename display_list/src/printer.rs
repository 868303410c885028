// Copyright 2025 the Display List Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::fmt::{self, Display, Write};

use display_list_encoding::{FormatError, NestedList, Op, PathData};

use crate::{Flow, Sink};

/// Writes one line per op, indenting the content of nested lists.
///
/// Used by the `Display` impl of [`DisplayList`](crate::DisplayList).
#[derive(Debug)]
pub struct Printer<W> {
    out: W,
    indent: usize,
    result: fmt::Result,
}

impl<W: Write> Printer<W> {
    pub fn new(out: W) -> Self {
        Self::with_indent(out, 0)
    }

    /// Starts every line `indent` levels deep.
    pub fn with_indent(out: W, indent: usize) -> Self {
        Self {
            out,
            indent,
            result: Ok(()),
        }
    }

    /// The first write error, if any.
    pub fn into_result(self) -> fmt::Result {
        self.result
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, args: fmt::Arguments<'_>) -> Flow {
        if self.result.is_ok() {
            self.result = (|| {
                for _ in 0..self.indent {
                    self.out.write_str("  ")?;
                }
                self.out.write_fmt(args)?;
                self.out.write_char('\n')
            })();
        }
        if self.result.is_ok() {
            Flow::Continue
        } else {
            Flow::Stop
        }
    }
}

struct Rect4([f32; 4]);

impl Display for Rect4 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [l, t, r, b] = self.0;
        write!(f, "[{l}, {t}, {r}, {b}]")
    }
}

struct Pt([f32; 2]);

impl Display for Pt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.0[0], self.0[1])
    }
}

struct Argb(u32);

impl Display for Argb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}

struct Path<'a>(PathData<'a>);

impl Display for Path<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = &self.0;
        write!(f, "path({:?}, verbs: {}, points: [", path.fill, path.verbs().len())?;
        for (i, point) in path.points().iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", Pt(point))?;
        }
        f.write_str("])")
    }
}

impl<W: Write> Sink for Printer<W> {
    fn op(&mut self, op: &Op<'_>) -> Flow {
        let name = op.tag().name();
        match op {
            Op::SetAntiAlias(p) => self.line(format_args!("{name}({})", p.enabled != 0)),
            Op::SetColor(p) => self.line(format_args!("{name}({})", Argb(p.argb))),
            Op::SetBlendMode(p) => self.line(format_args!("{name}({})", p.mode.name())),
            Op::SetStyle(p) => self.line(format_args!("{name}({:?})", p.style)),
            Op::SetStrokeWidth(p) => self.line(format_args!("{name}({})", p.width)),
            Op::SetStrokeMiter(p) => self.line(format_args!("{name}({})", p.limit)),
            Op::SetStrokeCap(p) => self.line(format_args!("{name}({:?})", p.cap)),
            Op::SetStrokeJoin(p) => self.line(format_args!("{name}({:?})", p.join)),
            Op::Save | Op::Restore | Op::TransformReset | Op::DrawPaint => {
                self.line(format_args!("{name}()"))
            }
            Op::SaveLayer(p) => {
                let bounds = p.bounds().map(Rect4);
                let bounds: &dyn Display = match &bounds {
                    Some(bounds) => bounds,
                    None => &"none",
                };
                if p.has_paint() {
                    self.line(format_args!(
                        "{name}({bounds}, paint: {} {}, distributeOpacity: {})",
                        Argb(p.argb),
                        p.blend_mode.name(),
                        p.can_distribute_opacity()
                    ))
                } else {
                    self.line(format_args!(
                        "{name}({bounds}, paint: none, distributeOpacity: {})",
                        p.can_distribute_opacity()
                    ))
                }
            }
            Op::Translate(p) => self.line(format_args!("{name}({}, {})", p.tx, p.ty)),
            Op::Scale(p) => self.line(format_args!("{name}({}, {})", p.sx, p.sy)),
            Op::Rotate(p) => self.line(format_args!("{name}({})", p.degrees)),
            Op::Skew(p) => self.line(format_args!("{name}({}, {})", p.sx, p.sy)),
            Op::Transform2DAffine(p) => {
                let [a, b, c, d, e, f] = p.coeffs;
                self.line(format_args!("{name}([{a}, {b}, {c}, {d}, {e}, {f}])"))
            }
            Op::ClipRect(p) => self.line(format_args!(
                "{name}({}, {:?}, aa: {})",
                Rect4(p.rect),
                p.clip_op,
                p.anti_alias != 0
            )),
            Op::ClipRoundRect(p) => self.line(format_args!(
                "{name}({}, radii: {}, {:?}, aa: {})",
                Rect4(p.rect),
                Rect4(p.radii),
                p.clip_op,
                p.anti_alias != 0
            )),
            Op::ClipPath(p, path) => self.line(format_args!(
                "{name}({}, {:?}, aa: {})",
                Path(*path),
                p.clip_op,
                p.anti_alias != 0
            )),
            Op::DrawColor(p) => self.line(format_args!(
                "{name}({}, {})",
                Argb(p.argb),
                p.blend_mode.name()
            )),
            Op::DrawLine(p) => self.line(format_args!("{name}({}, {})", Pt(p.p0), Pt(p.p1))),
            Op::DrawRect(p) => self.line(format_args!("{name}({})", Rect4(p.rect))),
            Op::DrawOval(p) => self.line(format_args!("{name}({})", Rect4(p.rect))),
            Op::DrawCircle(p) => {
                self.line(format_args!("{name}({}, {})", Pt(p.center), p.radius))
            }
            Op::DrawRoundRect(p) => self.line(format_args!(
                "{name}({}, radii: {})",
                Rect4(p.rect),
                Rect4(p.radii)
            )),
            Op::DrawDiffRoundRect(p) => self.line(format_args!(
                "{name}({}, radii: {}, {}, radii: {})",
                Rect4(p.outer),
                Rect4(p.outer_radii),
                Rect4(p.inner),
                Rect4(p.inner_radii)
            )),
            Op::DrawArc(p) => self.line(format_args!(
                "{name}({}, {}, {}, useCenter: {})",
                Rect4(p.rect),
                p.start_degrees,
                p.sweep_degrees,
                p.use_center != 0
            )),
            Op::DrawPath(path) => self.line(format_args!("{name}({})", Path(*path))),
            Op::DrawPoints(mode, points) => {
                let points = points.iter().map(Pt).collect::<Vec<_>>();
                let points = points
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                self.line(format_args!("{name}({mode:?}, [{points}])"))
            }
            Op::DrawVertices(v) => self.line(format_args!(
                "{name}({:?}, vertices: {}, colors: {}, {})",
                v.mode,
                v.positions.len(),
                v.colors.is_some(),
                v.blend_mode.name()
            )),
            Op::DrawImage(p) => self.line(format_args!(
                "{name}({:?}, {}, {:?}, paint: {})",
                p.image,
                Pt(p.point),
                p.sampling,
                p.with_paint != 0
            )),
            Op::DrawImageRect(p) => self.line(format_args!(
                "{name}({:?}, {}, {}, {:?}, paint: {}, {:?})",
                p.image,
                Rect4(p.src),
                Rect4(p.dst),
                p.sampling,
                p.with_paint != 0,
                p.constraint
            )),
            Op::DrawImageNine(p) => {
                let [l, t, r, b] = p.center;
                self.line(format_args!(
                    "{name}({:?}, center: [{l}, {t}, {r}, {b}], {}, {:?}, paint: {})",
                    p.image,
                    Rect4(p.dst),
                    p.filter,
                    p.with_paint != 0
                ))
            }
            Op::DrawAtlas(atlas) => {
                let cull = atlas.cull.map(Rect4);
                let cull: &dyn Display = match &cull {
                    Some(cull) => cull,
                    None => &"none",
                };
                self.line(format_args!(
                    "{name}({:?}, sprites: {}, colors: {}, {}, {:?}, cull: {cull}, paint: {})",
                    atlas.image,
                    atlas.xforms.len(),
                    atlas.colors.is_some(),
                    atlas.blend_mode.name(),
                    atlas.sampling,
                    atlas.with_paint
                ))
            }
            Op::DrawDisplayList(list) => {
                let header = &list.header;
                self.line(format_args!(
                    "{name}(bytes: {}, ops: {}, depth: {}, bounds: {}, opacity: {}) {{",
                    header.byte_count,
                    header.op_count,
                    header.total_depth,
                    Rect4(header.bounds),
                    header.opacity
                ))
            }
            Op::DrawShadow(p, path) => self.line(format_args!(
                "{name}({}, {}, elevation: {}, dpr: {}, transparentOccluder: {})",
                Path(*path),
                Argb(p.argb),
                p.elevation,
                p.dpr,
                p.transparent_occluder != 0
            )),
        }
    }

    fn begin_nested(&mut self, _: &NestedList<'_>) {
        self.indent += 1;
    }

    fn end_nested(&mut self) {
        self.indent = self.indent.saturating_sub(1);
        self.line(format_args!("}}"));
    }

    fn corrupt(&mut self, error: &FormatError) {
        self.line(format_args!("<corrupt: {error}>"));
    }
}
