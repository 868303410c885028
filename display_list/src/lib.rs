// Copyright 2025 the Display List Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! An immutable, binary-encoded recording of drawing operations.
//!
//! A [`DisplayListBuilder`] appends one encoded record per drawing call and
//! computes summary attributes (bounds, op counts, nesting depth and three
//! boolean flags) as it goes. The resulting [`DisplayList`] is frozen and can
//! be shared between threads. It can be:
//!
//! - replayed with a [`Dispatcher`] into any [`Sink`], such as a
//!   [`CanvasRenderer`], a [`Printer`] or a [`Rerecorder`];
//! - written to and read from a byte stream with the [`serialize`] module.
//!
//! ```
//! use display_list::kurbo::Rect;
//! use display_list::peniko::Color;
//! use display_list::DisplayListBuilder;
//!
//! let mut builder = DisplayListBuilder::new();
//! builder.set_color(Color::rgba8(255, 0, 0, 255));
//! builder.draw_rect(Rect::new(0.0, 0.0, 10.0, 10.0));
//! let list = builder.finish().unwrap();
//! assert_eq!(list.op_count(), 2);
//! assert_eq!(list.bounds(), Rect::new(0.0, 0.0, 10.0, 10.0));
//! ```

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
    clippy::too_many_arguments,
    reason = "Deferred"
)]

mod accumulator;
mod builder;
mod capture;
mod dispatch;
mod display_list;
mod printer;
mod render;
mod rerecord;
pub mod serialize;

/// Styling and composition primitives.
pub use peniko;
/// 2D geometry, with a focus on curves.
pub use peniko::kurbo;

/// The encoding layer, for direct access to records.
pub use display_list_encoding as encoding;

pub use display_list_encoding::{
    BlendMode, ClipOp, DrawStyle, FillType, FilterMode, FormatError, ImageRef, Op, OpTag,
    PointMode, Sampling, SrcRectConstraint, StrokeCap, StrokeJoin, VertexMode,
};

pub use accumulator::{Accumulator, Summary, HAIRLINE_OUTSET, SHADOW_OUTSET_FACTOR};
pub use builder::{AtlasOptions, BuilderOptions, DisplayListBuilder, LayerPaint};
pub use capture::{DisplayListCapture, CAPTURE_FILE_NAME};
pub use dispatch::{Dispatcher, Flow, Sink};
pub use display_list::DisplayList;
pub use printer::Printer;
pub use render::{Canvas, CanvasRenderer, Paint};
pub use rerecord::Rerecorder;

use thiserror::Error;

/// Errors from reading or writing serialized display lists.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The data is corrupt or was written by an incompatible version.
    #[error("Invalid display list data: {0}")]
    Format(#[from] FormatError),
    /// The underlying stream failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub(crate) type Result<T, E = Error> = std::result::Result<T, E>;

/// Programmer errors while recording.
///
/// These are reported through `log::error!` and are fatal in debug builds.
/// In release builds the offending call is ignored.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum UsageError {
    #[error("Operation recorded after the builder was finished")]
    AppendAfterFinish,
    #[error("Restore without a matching save")]
    UnbalancedRestore,
    #[error("Builder was already finished")]
    FinishTwice,
    #[error("Nested display list of {0} bytes doesn't fit in a single record")]
    NestedListTooLarge(usize),
    #[error("Cannot restore to save count {0}, the minimum is 1")]
    RestoreCountBelowOne(usize),
    #[error("Arrays passed to {0} have different lengths")]
    MismatchedLengths(&'static str),
}

static_assertions::assert_impl_all!(DisplayList: Send, Sync);
