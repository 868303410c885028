// Copyright 2025 the Display List Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use bytemuck::{CheckedBitPattern, NoUninit, Pod, Zeroable};

use crate::FormatError;

/// Opcode of a record.
///
/// The discriminants are part of the binary format.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, NoUninit, CheckedBitPattern)]
#[repr(u8)]
pub enum OpTag {
    SetAntiAlias = 0x01,
    SetColor = 0x02,
    SetBlendMode = 0x03,
    SetStyle = 0x04,
    SetStrokeWidth = 0x05,
    SetStrokeMiter = 0x06,
    SetStrokeCap = 0x07,
    SetStrokeJoin = 0x08,

    Save = 0x10,
    SaveLayer = 0x11,
    Restore = 0x12,

    Translate = 0x20,
    Scale = 0x21,
    Rotate = 0x22,
    Skew = 0x23,
    Transform2DAffine = 0x24,
    TransformReset = 0x25,

    ClipRect = 0x30,
    ClipRoundRect = 0x31,
    ClipPath = 0x32,

    DrawPaint = 0x40,
    DrawColor = 0x41,
    DrawLine = 0x42,
    DrawRect = 0x43,
    DrawOval = 0x44,
    DrawCircle = 0x45,
    DrawRoundRect = 0x46,
    DrawDiffRoundRect = 0x47,
    DrawArc = 0x48,
    DrawPath = 0x49,
    DrawPoints = 0x4a,
    DrawVertices = 0x4b,
    DrawImage = 0x4c,
    DrawImageRect = 0x4d,
    DrawImageNine = 0x4e,
    DrawAtlas = 0x4f,
    DrawDisplayList = 0x50,
    DrawShadow = 0x51,
}

impl OpTag {
    /// Decodes a raw tag byte.
    pub fn from_u8(tag: u8) -> Option<Self> {
        bytemuck::checked::try_cast(tag).ok()
    }

    /// Returns `true` for records that put pixels on the destination.
    pub const fn is_draw(self) -> bool {
        self as u8 >= 0x40
    }

    /// Lower camel case name, as used in printed display lists.
    pub const fn name(self) -> &'static str {
        match self {
            Self::SetAntiAlias => "setAntiAlias",
            Self::SetColor => "setColor",
            Self::SetBlendMode => "setBlendMode",
            Self::SetStyle => "setStyle",
            Self::SetStrokeWidth => "setStrokeWidth",
            Self::SetStrokeMiter => "setStrokeMiter",
            Self::SetStrokeCap => "setStrokeCap",
            Self::SetStrokeJoin => "setStrokeJoin",
            Self::Save => "save",
            Self::SaveLayer => "saveLayer",
            Self::Restore => "restore",
            Self::Translate => "translate",
            Self::Scale => "scale",
            Self::Rotate => "rotate",
            Self::Skew => "skew",
            Self::Transform2DAffine => "transform2DAffine",
            Self::TransformReset => "transformReset",
            Self::ClipRect => "clipRect",
            Self::ClipRoundRect => "clipRoundRect",
            Self::ClipPath => "clipPath",
            Self::DrawPaint => "drawPaint",
            Self::DrawColor => "drawColor",
            Self::DrawLine => "drawLine",
            Self::DrawRect => "drawRect",
            Self::DrawOval => "drawOval",
            Self::DrawCircle => "drawCircle",
            Self::DrawRoundRect => "drawRoundRect",
            Self::DrawDiffRoundRect => "drawDiffRoundRect",
            Self::DrawArc => "drawArc",
            Self::DrawPath => "drawPath",
            Self::DrawPoints => "drawPoints",
            Self::DrawVertices => "drawVertices",
            Self::DrawImage => "drawImage",
            Self::DrawImageRect => "drawImageRect",
            Self::DrawImageNine => "drawImageNine",
            Self::DrawAtlas => "drawAtlas",
            Self::DrawDisplayList => "drawDisplayList",
            Self::DrawShadow => "drawShadow",
        }
    }
}

/// Header that starts every record.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
pub struct RecordHeader {
    /// Raw [`OpTag`] value.
    pub tag: u8,
    pub reserved: [u8; 3],
    /// Total length of the record in bytes, including this header.
    pub len: u32,
}

impl RecordHeader {
    pub const SIZE: usize = size_of::<Self>();

    pub fn new(tag: OpTag, len: u32) -> Self {
        Self {
            tag: tag as u8,
            reserved: [0; 3],
            len,
        }
    }
}

/// A record whose header has been validated but whose body hasn't been
/// decoded.
#[derive(Copy, Clone, Debug)]
pub struct RawRecord<'a> {
    /// Offset of the header within the walked buffer.
    pub offset: usize,
    /// Raw tag byte. May not name a known [`OpTag`].
    pub tag: u8,
    /// Bytes following the header.
    pub body: &'a [u8],
}

impl RawRecord<'_> {
    /// Decodes the tag, failing for opcodes this version doesn't know.
    pub fn op_tag(&self) -> Result<OpTag, FormatError> {
        OpTag::from_u8(self.tag).ok_or(FormatError::UnknownTag {
            tag: self.tag,
            offset: self.offset,
        })
    }

    /// Total length of the record, header included.
    pub fn len(&self) -> usize {
        RecordHeader::SIZE + self.body.len()
    }
}

/// Walks the records of a buffer using only their headers.
///
/// Bodies are not decoded, so records can be skipped cheaply. The iterator
/// stops after the first error.
#[derive(Clone, Debug)]
pub struct Records<'a> {
    bytes: &'a [u8],
    offset: usize,
    failed: bool,
}

impl<'a> Records<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            offset: 0,
            failed: false,
        }
    }

    /// Offset of the next record to be returned.
    pub fn offset(&self) -> usize {
        self.offset
    }

    fn read(&mut self) -> Result<RawRecord<'a>, FormatError> {
        let offset = self.offset;
        let remaining = &self.bytes[offset..];
        if remaining.len() < RecordHeader::SIZE {
            return Err(FormatError::UnexpectedEof("record header"));
        }
        let header: RecordHeader = bytemuck::pod_read_unaligned(&remaining[..RecordHeader::SIZE]);
        let len = header.len as usize;
        if len < RecordHeader::SIZE || len % 4 != 0 || len > remaining.len() {
            return Err(FormatError::BadRecordLength {
                offset,
                len: header.len,
            });
        }
        if header.reserved != [0; 3] {
            return Err(FormatError::ReservedBits { offset });
        }
        self.offset += len;
        Ok(RawRecord {
            offset,
            tag: header.tag,
            body: &remaining[RecordHeader::SIZE..len],
        })
    }
}

impl<'a> Iterator for Records<'a> {
    type Item = Result<RawRecord<'a>, FormatError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.offset == self.bytes.len() {
            return None;
        }
        let result = self.read();
        self.failed = result.is_err();
        Some(result)
    }
}
