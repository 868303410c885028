// Copyright 2025 the Display List Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use thiserror::Error;

/// Errors produced when encoded display list data is corrupt or was written
/// by an incompatible version.
///
/// Offsets are relative to the start of the buffer being decoded (for a
/// nested display list, the nested storage).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// The stream does not start with the expected magic literal.
    #[error("bad magic {0:?}, expected \"dspl\"")]
    BadMagic([u8; 4]),
    /// The stream was written with an unsupported format version.
    #[error("unsupported format version {0}")]
    UnsupportedVersion(i32),
    /// A declared size is negative or can't be represented on this platform.
    #[error("invalid {field} {value}")]
    InvalidCount { field: &'static str, value: i64 },
    /// The input ended before a complete value could be read.
    #[error("unexpected end of data while reading {0}")]
    UnexpectedEof(&'static str),
    /// A boolean field held something other than 0 or 1.
    #[error("invalid boolean value {value} for {field}")]
    InvalidBool { field: &'static str, value: u8 },
    /// A record header declared a length that does not fit the data.
    #[error("record at offset {offset} has invalid length {len}")]
    BadRecordLength { offset: usize, len: u32 },
    /// A record header has non-zero reserved bytes.
    #[error("record at offset {offset} has non-zero reserved bytes")]
    ReservedBits { offset: usize },
    /// A record header names an opcode that this version doesn't know.
    #[error("unknown op tag {tag:#04x} at offset {offset}")]
    UnknownTag { tag: u8, offset: usize },
    /// A record body holds an out-of-range enumerated or boolean value.
    #[error("invalid value in {op} record at offset {offset}")]
    InvalidValue { op: &'static str, offset: usize },
    /// The verbs and points of an encoded path don't agree.
    #[error("invalid path in {op} record at offset {offset}")]
    InvalidPath { op: &'static str, offset: usize },
    /// The body of a record is inconsistent with its declared contents.
    #[error("malformed {op} record at offset {offset}")]
    MalformedRecord { op: &'static str, offset: usize },
    /// Embedded display lists are nested deeper than their headers declared.
    #[error("nested display list at offset {offset} exceeds the declared depth")]
    NestingTooDeep { offset: usize },
    /// A display list declared a total depth of zero.
    #[error("display list depth must be at least 1")]
    ZeroDepth,
}
