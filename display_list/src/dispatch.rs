// Copyright 2025 the Display List Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use display_list_encoding::*;
use smallvec::{smallvec, SmallVec};

use crate::DisplayList;

/// Whether dispatch should continue after a handler returns.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// Ends dispatch without delivering further ops.
    Stop,
}

/// Receiver of dispatched ops.
///
/// There is one handler per op kind. Each defaults to [`Sink::op`], so a sink
/// can handle everything in one place and override only the kinds it treats
/// specially.
pub trait Sink {
    /// Catch-all for kinds without a dedicated override.
    fn op(&mut self, op: &Op<'_>) -> Flow {
        let _ = op;
        Flow::Continue
    }

    fn set_anti_alias(&mut self, p: SetAntiAlias) -> Flow {
        self.op(&Op::SetAntiAlias(p))
    }
    fn set_color(&mut self, p: SetColor) -> Flow {
        self.op(&Op::SetColor(p))
    }
    fn set_blend_mode(&mut self, p: SetBlendMode) -> Flow {
        self.op(&Op::SetBlendMode(p))
    }
    fn set_style(&mut self, p: SetStyle) -> Flow {
        self.op(&Op::SetStyle(p))
    }
    fn set_stroke_width(&mut self, p: SetStrokeWidth) -> Flow {
        self.op(&Op::SetStrokeWidth(p))
    }
    fn set_stroke_miter(&mut self, p: SetStrokeMiter) -> Flow {
        self.op(&Op::SetStrokeMiter(p))
    }
    fn set_stroke_cap(&mut self, p: SetStrokeCap) -> Flow {
        self.op(&Op::SetStrokeCap(p))
    }
    fn set_stroke_join(&mut self, p: SetStrokeJoin) -> Flow {
        self.op(&Op::SetStrokeJoin(p))
    }

    fn save(&mut self) -> Flow {
        self.op(&Op::Save)
    }
    fn save_layer(&mut self, p: SaveLayer) -> Flow {
        self.op(&Op::SaveLayer(p))
    }
    fn restore(&mut self) -> Flow {
        self.op(&Op::Restore)
    }

    fn translate(&mut self, p: Translate) -> Flow {
        self.op(&Op::Translate(p))
    }
    fn scale(&mut self, p: Scale) -> Flow {
        self.op(&Op::Scale(p))
    }
    fn rotate(&mut self, p: Rotate) -> Flow {
        self.op(&Op::Rotate(p))
    }
    fn skew(&mut self, p: Skew) -> Flow {
        self.op(&Op::Skew(p))
    }
    fn transform_2d_affine(&mut self, p: Transform2DAffine) -> Flow {
        self.op(&Op::Transform2DAffine(p))
    }
    fn transform_reset(&mut self) -> Flow {
        self.op(&Op::TransformReset)
    }

    fn clip_rect(&mut self, p: ClipRect) -> Flow {
        self.op(&Op::ClipRect(p))
    }
    fn clip_round_rect(&mut self, p: ClipRoundRect) -> Flow {
        self.op(&Op::ClipRoundRect(p))
    }
    fn clip_path(&mut self, p: ClipPath, path: PathData<'_>) -> Flow {
        self.op(&Op::ClipPath(p, path))
    }

    fn draw_paint(&mut self) -> Flow {
        self.op(&Op::DrawPaint)
    }
    fn draw_color(&mut self, p: DrawColor) -> Flow {
        self.op(&Op::DrawColor(p))
    }
    fn draw_line(&mut self, p: DrawLine) -> Flow {
        self.op(&Op::DrawLine(p))
    }
    fn draw_rect(&mut self, p: DrawRect) -> Flow {
        self.op(&Op::DrawRect(p))
    }
    fn draw_oval(&mut self, p: DrawOval) -> Flow {
        self.op(&Op::DrawOval(p))
    }
    fn draw_circle(&mut self, p: DrawCircle) -> Flow {
        self.op(&Op::DrawCircle(p))
    }
    fn draw_round_rect(&mut self, p: DrawRoundRect) -> Flow {
        self.op(&Op::DrawRoundRect(p))
    }
    fn draw_diff_round_rect(&mut self, p: DrawDiffRoundRect) -> Flow {
        self.op(&Op::DrawDiffRoundRect(p))
    }
    fn draw_arc(&mut self, p: DrawArc) -> Flow {
        self.op(&Op::DrawArc(p))
    }
    fn draw_path(&mut self, path: PathData<'_>) -> Flow {
        self.op(&Op::DrawPath(path))
    }
    fn draw_points(&mut self, mode: PointMode, points: PodSlice<'_, [f32; 2]>) -> Flow {
        self.op(&Op::DrawPoints(mode, points))
    }
    fn draw_vertices(&mut self, vertices: VertexData<'_>) -> Flow {
        self.op(&Op::DrawVertices(vertices))
    }
    fn draw_image(&mut self, p: DrawImage) -> Flow {
        self.op(&Op::DrawImage(p))
    }
    fn draw_image_rect(&mut self, p: DrawImageRect) -> Flow {
        self.op(&Op::DrawImageRect(p))
    }
    fn draw_image_nine(&mut self, p: DrawImageNine) -> Flow {
        self.op(&Op::DrawImageNine(p))
    }
    fn draw_atlas(&mut self, atlas: AtlasData<'_>) -> Flow {
        self.op(&Op::DrawAtlas(atlas))
    }
    fn draw_display_list(&mut self, list: NestedList<'_>) -> Flow {
        self.op(&Op::DrawDisplayList(list))
    }
    fn draw_shadow(&mut self, p: DrawShadow, path: PathData<'_>) -> Flow {
        self.op(&Op::DrawShadow(p, path))
    }

    /// Asked after each nested list record is delivered. Returning `true`
    /// dispatches the nested records between [`Sink::begin_nested`] and
    /// [`Sink::end_nested`].
    fn descend_nested(&mut self) -> bool {
        true
    }
    fn begin_nested(&mut self, list: &NestedList<'_>) {
        let _ = list;
    }
    fn end_nested(&mut self) {}

    /// The storage is corrupt. No further ops will be delivered.
    fn corrupt(&mut self, error: &FormatError) {
        let _ = error;
    }
}

/// Delivers `op` to the matching handler of `sink`.
pub(crate) fn deliver<S: Sink + ?Sized>(sink: &mut S, op: Op<'_>) -> Flow {
    match op {
        Op::SetAntiAlias(p) => sink.set_anti_alias(p),
        Op::SetColor(p) => sink.set_color(p),
        Op::SetBlendMode(p) => sink.set_blend_mode(p),
        Op::SetStyle(p) => sink.set_style(p),
        Op::SetStrokeWidth(p) => sink.set_stroke_width(p),
        Op::SetStrokeMiter(p) => sink.set_stroke_miter(p),
        Op::SetStrokeCap(p) => sink.set_stroke_cap(p),
        Op::SetStrokeJoin(p) => sink.set_stroke_join(p),
        Op::Save => sink.save(),
        Op::SaveLayer(p) => sink.save_layer(p),
        Op::Restore => sink.restore(),
        Op::Translate(p) => sink.translate(p),
        Op::Scale(p) => sink.scale(p),
        Op::Rotate(p) => sink.rotate(p),
        Op::Skew(p) => sink.skew(p),
        Op::Transform2DAffine(p) => sink.transform_2d_affine(p),
        Op::TransformReset => sink.transform_reset(),
        Op::ClipRect(p) => sink.clip_rect(p),
        Op::ClipRoundRect(p) => sink.clip_round_rect(p),
        Op::ClipPath(p, path) => sink.clip_path(p, path),
        Op::DrawPaint => sink.draw_paint(),
        Op::DrawColor(p) => sink.draw_color(p),
        Op::DrawLine(p) => sink.draw_line(p),
        Op::DrawRect(p) => sink.draw_rect(p),
        Op::DrawOval(p) => sink.draw_oval(p),
        Op::DrawCircle(p) => sink.draw_circle(p),
        Op::DrawRoundRect(p) => sink.draw_round_rect(p),
        Op::DrawDiffRoundRect(p) => sink.draw_diff_round_rect(p),
        Op::DrawArc(p) => sink.draw_arc(p),
        Op::DrawPath(path) => sink.draw_path(path),
        Op::DrawPoints(mode, points) => sink.draw_points(mode, points),
        Op::DrawVertices(vertices) => sink.draw_vertices(vertices),
        Op::DrawImage(p) => sink.draw_image(p),
        Op::DrawImageRect(p) => sink.draw_image_rect(p),
        Op::DrawImageNine(p) => sink.draw_image_nine(p),
        Op::DrawAtlas(atlas) => sink.draw_atlas(atlas),
        Op::DrawDisplayList(list) => sink.draw_display_list(list),
        Op::DrawShadow(p, path) => sink.draw_shadow(p, path),
    }
}

/// A list of records being walked, and the depth it declared.
struct Frame<'a> {
    records: Records<'a>,
    depth: u32,
}

/// Replays encoded records into a [`Sink`].
///
/// Nested lists are walked with an explicit stack, so corrupt input can't
/// exhaust the call stack.
#[derive(Copy, Clone, Debug, Default)]
pub struct Dispatcher;

impl Dispatcher {
    /// Dispatches every op of `list`, returning the number of top-level ops
    /// delivered.
    pub fn run<S: Sink + ?Sized>(list: &DisplayList, sink: &mut S) -> Result<usize, FormatError> {
        Self::run_storage(list.storage(), list.total_depth(), sink)
    }

    /// Dispatches raw records that declare a nesting depth of `depth`.
    pub fn run_storage<S: Sink + ?Sized>(
        storage: &[u8],
        depth: u32,
        sink: &mut S,
    ) -> Result<usize, FormatError> {
        let result = Self::walk(storage, depth, sink);
        if let Err(error) = &result {
            log::warn!("Stopped dispatching corrupt display list: {error}");
            sink.corrupt(error);
        }
        result
    }

    fn walk<S: Sink + ?Sized>(
        storage: &[u8],
        depth: u32,
        sink: &mut S,
    ) -> Result<usize, FormatError> {
        if depth == 0 {
            return Err(FormatError::ZeroDepth);
        }
        let mut stack: SmallVec<[Frame<'_>; 4]> = smallvec![Frame {
            records: Records::new(storage),
            depth,
        }];
        let mut count = 0;
        while let Some(frame) = stack.last_mut() {
            let parent_depth = frame.depth;
            let Some(record) = frame.records.next() else {
                stack.pop();
                if !stack.is_empty() {
                    sink.end_nested();
                }
                continue;
            };
            let record = record?;
            let op = Op::decode(&record)?;
            if stack.len() == 1 {
                count += 1;
            }
            if deliver(sink, op) == Flow::Stop {
                return Ok(count);
            }
            if let Op::DrawDisplayList(list) = op {
                if sink.descend_nested() {
                    let depth = list.header.total_depth;
                    if depth == 0 {
                        return Err(FormatError::ZeroDepth);
                    }
                    if depth >= parent_depth {
                        return Err(FormatError::NestingTooDeep {
                            offset: record.offset,
                        });
                    }
                    sink.begin_nested(&list);
                    stack.push(Frame {
                        records: Records::new(list.storage),
                        depth,
                    });
                }
            }
        }
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Tags {
        tags: Vec<OpTag>,
        stop_after: Option<usize>,
        nested: usize,
        corrupt: Option<FormatError>,
    }

    impl Sink for Tags {
        fn op(&mut self, op: &Op<'_>) -> Flow {
            self.tags.push(op.tag());
            if self.stop_after == Some(self.tags.len()) {
                Flow::Stop
            } else {
                Flow::Continue
            }
        }

        fn begin_nested(&mut self, _: &NestedList<'_>) {
            self.nested += 1;
        }

        fn corrupt(&mut self, error: &FormatError) {
            self.corrupt = Some(error.clone());
        }
    }

    fn encode(ops: &[Op<'_>]) -> Vec<u8> {
        let mut buffer = EncodingBuffer::new();
        for op in ops {
            op.encode(&mut buffer);
        }
        buffer.finalize()
    }

    #[test]
    fn delivers_each_op_in_order() {
        let storage = encode(&[Op::Save, Op::DrawPaint, Op::Restore]);
        let mut sink = Tags::default();
        assert_eq!(Dispatcher::run_storage(&storage, 1, &mut sink), Ok(3));
        assert_eq!(sink.tags, [OpTag::Save, OpTag::DrawPaint, OpTag::Restore]);
    }

    #[test]
    fn stop_ends_dispatch() {
        let storage = encode(&[Op::Save, Op::DrawPaint, Op::Restore]);
        let mut sink = Tags {
            stop_after: Some(2),
            ..Default::default()
        };
        assert_eq!(Dispatcher::run_storage(&storage, 1, &mut sink), Ok(2));
        assert_eq!(sink.tags.len(), 2);
    }

    #[test]
    fn nested_lists_are_walked_in_place() {
        let inner = encode(&[Op::DrawPaint, Op::DrawPaint]);
        let header = NestedHeader {
            byte_count: inner.len() as u64,
            op_count: 2,
            total_depth: 1,
            opacity: 1.0,
            ..Default::default()
        };
        let storage = encode(&[
            Op::DrawDisplayList(NestedList {
                header,
                storage: &inner,
            }),
            Op::Save,
        ]);
        let mut sink = Tags::default();
        assert_eq!(Dispatcher::run_storage(&storage, 2, &mut sink), Ok(2));
        assert_eq!(
            sink.tags,
            [
                OpTag::DrawDisplayList,
                OpTag::DrawPaint,
                OpTag::DrawPaint,
                OpTag::Save
            ]
        );
        assert_eq!(sink.nested, 1);

        // A nested list can't be as deep as its parent.
        let mut sink = Tags::default();
        assert_eq!(
            Dispatcher::run_storage(&storage, 1, &mut sink),
            Err(FormatError::NestingTooDeep { offset: 0 })
        );
        assert!(sink.corrupt.is_some());
    }

    #[test]
    fn corruption_is_reported_to_the_sink() {
        let mut storage = encode(&[Op::Save, Op::Restore]);
        storage[8] = 0x7f;
        let mut sink = Tags::default();
        let error = FormatError::UnknownTag {
            tag: 0x7f,
            offset: 8,
        };
        assert_eq!(
            Dispatcher::run_storage(&storage, 1, &mut sink),
            Err(error.clone())
        );
        assert_eq!(sink.tags, [OpTag::Save]);
        assert_eq!(sink.corrupt, Some(error));
    }
}
