// Copyright 2025 the Display List Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use bytemuck::checked::CheckedCastError;
use bytemuck::{CheckedBitPattern, NoUninit};

use crate::data::{AtlasHeader, PointsHeader, VerticesHeader};
use crate::ops::*;
use crate::path::PathHeader;
use crate::{
    AtlasData, EncodingBuffer, FormatError, NestedHeader, NestedList, OpTag, PathData, PathVerb,
    PodSlice, RawRecord, RecordHeader, VertexData,
};

/// A decoded record.
///
/// Fixed payloads are held by value. Variable-length data borrows from the
/// storage it was decoded from, or from caller data when recording.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Op<'a> {
    SetAntiAlias(SetAntiAlias),
    SetColor(SetColor),
    SetBlendMode(SetBlendMode),
    SetStyle(SetStyle),
    SetStrokeWidth(SetStrokeWidth),
    SetStrokeMiter(SetStrokeMiter),
    SetStrokeCap(SetStrokeCap),
    SetStrokeJoin(SetStrokeJoin),
    Save,
    SaveLayer(SaveLayer),
    Restore,
    Translate(Translate),
    Scale(Scale),
    Rotate(Rotate),
    Skew(Skew),
    Transform2DAffine(Transform2DAffine),
    TransformReset,
    ClipRect(ClipRect),
    ClipRoundRect(ClipRoundRect),
    ClipPath(ClipPath, PathData<'a>),
    DrawPaint,
    DrawColor(DrawColor),
    DrawLine(DrawLine),
    DrawRect(DrawRect),
    DrawOval(DrawOval),
    DrawCircle(DrawCircle),
    DrawRoundRect(DrawRoundRect),
    DrawDiffRoundRect(DrawDiffRoundRect),
    DrawArc(DrawArc),
    DrawPath(PathData<'a>),
    DrawPoints(crate::PointMode, PodSlice<'a, [f32; 2]>),
    DrawVertices(VertexData<'a>),
    DrawImage(DrawImage),
    DrawImageRect(DrawImageRect),
    DrawImageNine(DrawImageNine),
    DrawAtlas(AtlasData<'a>),
    DrawDisplayList(NestedList<'a>),
    DrawShadow(DrawShadow, PathData<'a>),
}

impl<'a> Op<'a> {
    pub fn tag(&self) -> OpTag {
        match self {
            Self::SetAntiAlias(_) => OpTag::SetAntiAlias,
            Self::SetColor(_) => OpTag::SetColor,
            Self::SetBlendMode(_) => OpTag::SetBlendMode,
            Self::SetStyle(_) => OpTag::SetStyle,
            Self::SetStrokeWidth(_) => OpTag::SetStrokeWidth,
            Self::SetStrokeMiter(_) => OpTag::SetStrokeMiter,
            Self::SetStrokeCap(_) => OpTag::SetStrokeCap,
            Self::SetStrokeJoin(_) => OpTag::SetStrokeJoin,
            Self::Save => OpTag::Save,
            Self::SaveLayer(_) => OpTag::SaveLayer,
            Self::Restore => OpTag::Restore,
            Self::Translate(_) => OpTag::Translate,
            Self::Scale(_) => OpTag::Scale,
            Self::Rotate(_) => OpTag::Rotate,
            Self::Skew(_) => OpTag::Skew,
            Self::Transform2DAffine(_) => OpTag::Transform2DAffine,
            Self::TransformReset => OpTag::TransformReset,
            Self::ClipRect(_) => OpTag::ClipRect,
            Self::ClipRoundRect(_) => OpTag::ClipRoundRect,
            Self::ClipPath(..) => OpTag::ClipPath,
            Self::DrawPaint => OpTag::DrawPaint,
            Self::DrawColor(_) => OpTag::DrawColor,
            Self::DrawLine(_) => OpTag::DrawLine,
            Self::DrawRect(_) => OpTag::DrawRect,
            Self::DrawOval(_) => OpTag::DrawOval,
            Self::DrawCircle(_) => OpTag::DrawCircle,
            Self::DrawRoundRect(_) => OpTag::DrawRoundRect,
            Self::DrawDiffRoundRect(_) => OpTag::DrawDiffRoundRect,
            Self::DrawArc(_) => OpTag::DrawArc,
            Self::DrawPath(_) => OpTag::DrawPath,
            Self::DrawPoints(..) => OpTag::DrawPoints,
            Self::DrawVertices(_) => OpTag::DrawVertices,
            Self::DrawImage(_) => OpTag::DrawImage,
            Self::DrawImageRect(_) => OpTag::DrawImageRect,
            Self::DrawImageNine(_) => OpTag::DrawImageNine,
            Self::DrawAtlas(_) => OpTag::DrawAtlas,
            Self::DrawDisplayList(_) => OpTag::DrawDisplayList,
            Self::DrawShadow(..) => OpTag::DrawShadow,
        }
    }

    /// Total size of the encoded record, header included.
    pub fn encoded_len(&self) -> usize {
        let body = match self {
            Self::SetAntiAlias(p) => size_of_val(p),
            Self::SetColor(p) => size_of_val(p),
            Self::SetBlendMode(p) => size_of_val(p),
            Self::SetStyle(p) => size_of_val(p),
            Self::SetStrokeWidth(p) => size_of_val(p),
            Self::SetStrokeMiter(p) => size_of_val(p),
            Self::SetStrokeCap(p) => size_of_val(p),
            Self::SetStrokeJoin(p) => size_of_val(p),
            Self::Save | Self::Restore | Self::TransformReset | Self::DrawPaint => 0,
            Self::SaveLayer(p) => size_of_val(p),
            Self::Translate(p) => size_of_val(p),
            Self::Scale(p) => size_of_val(p),
            Self::Rotate(p) => size_of_val(p),
            Self::Skew(p) => size_of_val(p),
            Self::Transform2DAffine(p) => size_of_val(p),
            Self::ClipRect(p) => size_of_val(p),
            Self::ClipRoundRect(p) => size_of_val(p),
            Self::ClipPath(p, path) => {
                size_of_val(p) + size_of::<PathHeader>() + path.encoded_len()
            }
            Self::DrawColor(p) => size_of_val(p),
            Self::DrawLine(p) => size_of_val(p),
            Self::DrawRect(p) => size_of_val(p),
            Self::DrawOval(p) => size_of_val(p),
            Self::DrawCircle(p) => size_of_val(p),
            Self::DrawRoundRect(p) => size_of_val(p),
            Self::DrawDiffRoundRect(p) => size_of_val(p),
            Self::DrawArc(p) => size_of_val(p),
            Self::DrawPath(path) => size_of::<PathHeader>() + path.encoded_len(),
            Self::DrawPoints(_, points) => size_of::<PointsHeader>() + points.as_bytes().len(),
            Self::DrawVertices(vertices) => {
                size_of::<VerticesHeader>()
                    + vertices.positions.as_bytes().len()
                    + vertices.colors.map_or(0, |c| c.as_bytes().len())
            }
            Self::DrawImage(p) => size_of_val(p),
            Self::DrawImageRect(p) => size_of_val(p),
            Self::DrawImageNine(p) => size_of_val(p),
            Self::DrawAtlas(atlas) => {
                size_of::<AtlasHeader>()
                    + atlas.xforms.as_bytes().len()
                    + atlas.tex_rects.as_bytes().len()
                    + atlas.colors.map_or(0, |c| c.as_bytes().len())
            }
            Self::DrawDisplayList(nested) => size_of::<NestedHeader>() + nested.storage.len(),
            Self::DrawShadow(p, path) => {
                size_of_val(p) + size_of::<PathHeader>() + path.encoded_len()
            }
        };
        RecordHeader::SIZE + body
    }

    /// Appends the record to `buffer`.
    pub fn encode(&self, buffer: &mut EncodingBuffer) {
        let start = buffer.current_size();
        let len = self.encoded_len();
        buffer.append_pod(&RecordHeader::new(self.tag(), len as u32));
        match self {
            Self::SetAntiAlias(p) => buffer.append_pod(p),
            Self::SetColor(p) => buffer.append_pod(p),
            Self::SetBlendMode(p) => buffer.append_pod(p),
            Self::SetStyle(p) => buffer.append_pod(p),
            Self::SetStrokeWidth(p) => buffer.append_pod(p),
            Self::SetStrokeMiter(p) => buffer.append_pod(p),
            Self::SetStrokeCap(p) => buffer.append_pod(p),
            Self::SetStrokeJoin(p) => buffer.append_pod(p),
            Self::Save | Self::Restore | Self::TransformReset | Self::DrawPaint => {}
            Self::SaveLayer(p) => buffer.append_pod(p),
            Self::Translate(p) => buffer.append_pod(p),
            Self::Scale(p) => buffer.append_pod(p),
            Self::Rotate(p) => buffer.append_pod(p),
            Self::Skew(p) => buffer.append_pod(p),
            Self::Transform2DAffine(p) => buffer.append_pod(p),
            Self::ClipRect(p) => buffer.append_pod(p),
            Self::ClipRoundRect(p) => buffer.append_pod(p),
            Self::ClipPath(p, path) => {
                buffer.append_pod(p);
                encode_path(path, buffer);
            }
            Self::DrawColor(p) => buffer.append_pod(p),
            Self::DrawLine(p) => buffer.append_pod(p),
            Self::DrawRect(p) => buffer.append_pod(p),
            Self::DrawOval(p) => buffer.append_pod(p),
            Self::DrawCircle(p) => buffer.append_pod(p),
            Self::DrawRoundRect(p) => buffer.append_pod(p),
            Self::DrawDiffRoundRect(p) => buffer.append_pod(p),
            Self::DrawArc(p) => buffer.append_pod(p),
            Self::DrawPath(path) => encode_path(path, buffer),
            Self::DrawPoints(mode, points) => {
                buffer.append_pod(&PointsHeader {
                    mode: *mode,
                    count: points.len() as u32,
                });
                buffer.append(points.as_bytes());
            }
            Self::DrawVertices(vertices) => {
                buffer.append_pod(&VerticesHeader {
                    mode: vertices.mode,
                    blend_mode: vertices.blend_mode,
                    vertex_count: vertices.positions.len() as u32,
                    has_colors: vertices.colors.is_some() as u32,
                });
                buffer.append(vertices.positions.as_bytes());
                if let Some(colors) = vertices.colors {
                    buffer.append(colors.as_bytes());
                }
            }
            Self::DrawImage(p) => buffer.append_pod(p),
            Self::DrawImageRect(p) => buffer.append_pod(p),
            Self::DrawImageNine(p) => buffer.append_pod(p),
            Self::DrawAtlas(atlas) => {
                buffer.append_pod(&AtlasHeader {
                    image: atlas.image,
                    count: atlas.xforms.len() as u32,
                    blend_mode: atlas.blend_mode,
                    sampling: atlas.sampling,
                    has_colors: atlas.colors.is_some() as u32,
                    has_cull: atlas.cull.is_some() as u32,
                    cull: atlas.cull.unwrap_or_default(),
                    with_paint: atlas.with_paint as u32,
                });
                buffer.append(atlas.xforms.as_bytes());
                buffer.append(atlas.tex_rects.as_bytes());
                if let Some(colors) = atlas.colors {
                    buffer.append(colors.as_bytes());
                }
            }
            Self::DrawDisplayList(nested) => {
                buffer.append_pod(&nested.header);
                buffer.append(nested.storage);
            }
            Self::DrawShadow(p, path) => {
                buffer.append_pod(p);
                encode_path(path, buffer);
            }
        }
        debug_assert_eq!(buffer.current_size() - start, len, "{:?}", self.tag());
    }

    /// Decodes the body of a record whose header has already been walked.
    pub fn decode(record: &RawRecord<'a>) -> Result<Self, FormatError> {
        let tag = record.op_tag()?;
        let mut reader = Reader {
            bytes: record.body,
            op: tag.name(),
            offset: record.offset,
        };
        let op = match tag {
            OpTag::SetAntiAlias => {
                let p: SetAntiAlias = reader.read()?;
                reader.check_bool(p.enabled)?;
                Self::SetAntiAlias(p)
            }
            OpTag::SetColor => Self::SetColor(reader.read()?),
            OpTag::SetBlendMode => Self::SetBlendMode(reader.read()?),
            OpTag::SetStyle => Self::SetStyle(reader.read()?),
            OpTag::SetStrokeWidth => Self::SetStrokeWidth(reader.read()?),
            OpTag::SetStrokeMiter => Self::SetStrokeMiter(reader.read()?),
            OpTag::SetStrokeCap => Self::SetStrokeCap(reader.read()?),
            OpTag::SetStrokeJoin => Self::SetStrokeJoin(reader.read()?),
            OpTag::Save => Self::Save,
            OpTag::SaveLayer => {
                let p: SaveLayer = reader.read()?;
                if p.options & !SaveLayer::ALL_OPTIONS != 0 {
                    return Err(reader.invalid());
                }
                Self::SaveLayer(p)
            }
            OpTag::Restore => Self::Restore,
            OpTag::Translate => Self::Translate(reader.read()?),
            OpTag::Scale => Self::Scale(reader.read()?),
            OpTag::Rotate => Self::Rotate(reader.read()?),
            OpTag::Skew => Self::Skew(reader.read()?),
            OpTag::Transform2DAffine => Self::Transform2DAffine(reader.read()?),
            OpTag::TransformReset => Self::TransformReset,
            OpTag::ClipRect => {
                let p: ClipRect = reader.read()?;
                reader.check_bool(p.anti_alias)?;
                Self::ClipRect(p)
            }
            OpTag::ClipRoundRect => {
                let p: ClipRoundRect = reader.read()?;
                reader.check_bool(p.anti_alias)?;
                Self::ClipRoundRect(p)
            }
            OpTag::ClipPath => {
                let p: ClipPath = reader.read()?;
                reader.check_bool(p.anti_alias)?;
                Self::ClipPath(p, reader.path()?)
            }
            OpTag::DrawPaint => Self::DrawPaint,
            OpTag::DrawColor => Self::DrawColor(reader.read()?),
            OpTag::DrawLine => Self::DrawLine(reader.read()?),
            OpTag::DrawRect => Self::DrawRect(reader.read()?),
            OpTag::DrawOval => Self::DrawOval(reader.read()?),
            OpTag::DrawCircle => Self::DrawCircle(reader.read()?),
            OpTag::DrawRoundRect => Self::DrawRoundRect(reader.read()?),
            OpTag::DrawDiffRoundRect => Self::DrawDiffRoundRect(reader.read()?),
            OpTag::DrawArc => {
                let p: DrawArc = reader.read()?;
                reader.check_bool(p.use_center)?;
                Self::DrawArc(p)
            }
            OpTag::DrawPath => Self::DrawPath(reader.path()?),
            OpTag::DrawPoints => {
                let header: PointsHeader = reader.read()?;
                Self::DrawPoints(header.mode, reader.slice(header.count)?)
            }
            OpTag::DrawVertices => {
                let header: VerticesHeader = reader.read()?;
                let has_colors = reader.check_bool(header.has_colors)?;
                Self::DrawVertices(VertexData {
                    mode: header.mode,
                    blend_mode: header.blend_mode,
                    positions: reader.slice(header.vertex_count)?,
                    colors: if has_colors {
                        Some(reader.slice(header.vertex_count)?)
                    } else {
                        None
                    },
                })
            }
            OpTag::DrawImage => {
                let p: DrawImage = reader.read()?;
                reader.check_bool(p.with_paint)?;
                Self::DrawImage(p)
            }
            OpTag::DrawImageRect => {
                let p: DrawImageRect = reader.read()?;
                reader.check_bool(p.with_paint)?;
                Self::DrawImageRect(p)
            }
            OpTag::DrawImageNine => {
                let p: DrawImageNine = reader.read()?;
                reader.check_bool(p.with_paint)?;
                Self::DrawImageNine(p)
            }
            OpTag::DrawAtlas => {
                let header: AtlasHeader = reader.read()?;
                let has_colors = reader.check_bool(header.has_colors)?;
                let has_cull = reader.check_bool(header.has_cull)?;
                let with_paint = reader.check_bool(header.with_paint)?;
                Self::DrawAtlas(AtlasData {
                    image: header.image,
                    blend_mode: header.blend_mode,
                    sampling: header.sampling,
                    cull: has_cull.then_some(header.cull),
                    with_paint,
                    xforms: reader.slice(header.count)?,
                    tex_rects: reader.slice(header.count)?,
                    colors: if has_colors {
                        Some(reader.slice(header.count)?)
                    } else {
                        None
                    },
                })
            }
            OpTag::DrawDisplayList => {
                let header: NestedHeader = reader.read()?;
                let byte_count =
                    usize::try_from(header.byte_count).map_err(|_| reader.malformed())?;
                let known = NestedHeader::GROUP_OPACITY
                    | NestedHeader::UI_THREAD_SAFE
                    | NestedHeader::MODIFIES_TRANSPARENT_BLACK;
                if header.flags & !known != 0 {
                    return Err(reader.invalid());
                }
                Self::DrawDisplayList(NestedList {
                    header,
                    storage: reader.take(byte_count)?,
                })
            }
            OpTag::DrawShadow => {
                let p: DrawShadow = reader.read()?;
                reader.check_bool(p.transparent_occluder)?;
                Self::DrawShadow(p, reader.path()?)
            }
        };
        reader.finish()?;
        Ok(op)
    }
}

fn encode_path(path: &PathData<'_>, buffer: &mut EncodingBuffer) {
    buffer.append_pod(&path.header());
    buffer.append(bytemuck::cast_slice::<PathVerb, u8>(path.verbs()));
    buffer.pad_to(4);
    buffer.append(path.points().as_bytes());
}

/// Cursor over the body of one record.
struct Reader<'a> {
    bytes: &'a [u8],
    op: &'static str,
    offset: usize,
}

impl<'a> Reader<'a> {
    fn malformed(&self) -> FormatError {
        FormatError::MalformedRecord {
            op: self.op,
            offset: self.offset,
        }
    }

    fn invalid(&self) -> FormatError {
        FormatError::InvalidValue {
            op: self.op,
            offset: self.offset,
        }
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], FormatError> {
        if len > self.bytes.len() {
            return Err(self.malformed());
        }
        let (head, tail) = self.bytes.split_at(len);
        self.bytes = tail;
        Ok(head)
    }

    fn read<T: NoUninit + CheckedBitPattern>(&mut self) -> Result<T, FormatError> {
        let bytes = self.take(size_of::<T>())?;
        bytemuck::checked::try_pod_read_unaligned(bytes).map_err(|e| match e {
            CheckedCastError::InvalidBitPattern => self.invalid(),
            _ => self.malformed(),
        })
    }

    fn slice<T: bytemuck::Pod>(&mut self, count: u32) -> Result<PodSlice<'a, T>, FormatError> {
        let len = (count as usize)
            .checked_mul(size_of::<T>())
            .ok_or_else(|| self.malformed())?;
        let bytes = self.take(len)?;
        PodSlice::from_bytes(bytes).ok_or_else(|| self.malformed())
    }

    fn check_bool(&self, value: u32) -> Result<bool, FormatError> {
        match value {
            0 => Ok(false),
            1 => Ok(true),
            _ => Err(self.invalid()),
        }
    }

    fn path(&mut self) -> Result<PathData<'a>, FormatError> {
        let header: PathHeader = self.read()?;
        let verb_count = header.verb_count as usize;
        let verb_bytes = self.take(verb_count)?;
        self.take(verb_count.next_multiple_of(4) - verb_count)?;
        let verbs = bytemuck::checked::try_cast_slice::<u8, PathVerb>(verb_bytes)
            .map_err(|_| self.invalid())?;
        let points = self.slice(header.point_count)?;
        PathData::new(header.fill, verbs, points).ok_or(FormatError::InvalidPath {
            op: self.op,
            offset: self.offset,
        })
    }

    /// Every byte of the body must be accounted for.
    fn finish(&self) -> Result<(), FormatError> {
        // Variable data may leave up to 3 bytes of padding.
        if self.bytes.len() >= 4 || self.bytes.iter().any(|b| *b != 0) {
            return Err(self.malformed());
        }
        Ok(())
    }
}
