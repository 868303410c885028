// Copyright 2025 the Display List Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Binary record encoding for display lists.
//!
//! A display list is stored as a flat sequence of records. Each record is a
//! [`RecordHeader`] followed by a body whose layout is determined by its
//! [`OpTag`]. [`Op`] is the decoded form of a record.

// LINEBENDER LINT SET - lib.rs - v2
// See https://linebender.org/wiki/canonical-lints/
// These lints aren't included in Cargo.toml because they
// shouldn't apply to examples and tests
#![warn(unused_crate_dependencies)]
#![warn(clippy::print_stdout, clippy::print_stderr)]
// Targeting e.g. 32-bit means structs containing usize can give false positives for 64-bit.
#![cfg_attr(target_pointer_width = "64", warn(clippy::trivially_copy_pass_by_ref))]
// END LINEBENDER LINT SET
#![cfg_attr(docsrs, feature(doc_auto_cfg))]
// The following lints are part of the Linebender standard set,
// but resolving them has been deferred for now.
// Feel free to send a PR that solves one or more of these.
#![allow(missing_docs, reason = "We have many as-yet undocumented items.")]
#![allow(
    clippy::cast_possible_truncation,
    clippy::exhaustive_enums,
    clippy::len_without_is_empty,
    reason = "Deferred"
)]

mod attributes;
mod blend;
mod buffer;
mod data;
mod error;
pub mod math;
mod op;
mod ops;
mod path;
mod record;

pub use attributes::{
    ClipOp, DrawStyle, FillType, FilterMode, PointMode, Sampling, SrcRectConstraint, StrokeCap,
    StrokeJoin, VertexMode,
};
pub use blend::BlendMode;
pub use buffer::EncodingBuffer;
pub use data::{points_bounds, AtlasData, ImageRef, NestedHeader, NestedList, PodSlice, VertexData};
pub use error::FormatError;
pub use op::Op;
pub use ops::{
    ClipPath, ClipRect, ClipRoundRect, DrawArc, DrawCircle, DrawColor, DrawDiffRoundRect,
    DrawImage, DrawImageNine, DrawImageRect, DrawLine, DrawOval, DrawRect, DrawRoundRect,
    DrawShadow, Rotate, SaveLayer, Scale, SetAntiAlias, SetBlendMode, SetColor, SetStrokeCap,
    SetStrokeJoin, SetStrokeMiter, SetStrokeWidth, SetStyle, Skew, Transform2DAffine, Translate,
};
pub use path::{EncodedPath, PathData, PathVerb};
pub use record::{OpTag, RawRecord, Records, RecordHeader};

// Payloads are written and read as their in-memory representation.
static_assertions::const_assert!(cfg!(target_endian = "little"));

/// Version written to and expected in serialized display lists.
pub const FORMAT_VERSION: i32 = 1;
