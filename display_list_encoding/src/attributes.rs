// Copyright 2025 the Display List Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Enumerated values stored in records.
//!
//! Discriminants are part of the binary format and are validated on decode.

use bytemuck::{CheckedBitPattern, NoUninit};

/// How geometry is painted.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, NoUninit, CheckedBitPattern)]
#[repr(u32)]
pub enum DrawStyle {
    #[default]
    Fill = 0,
    Stroke = 1,
    StrokeAndFill = 2,
}

impl DrawStyle {
    pub const fn strokes(self) -> bool {
        !matches!(self, Self::Fill)
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, NoUninit, CheckedBitPattern)]
#[repr(u32)]
pub enum StrokeCap {
    #[default]
    Butt = 0,
    Round = 1,
    Square = 2,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, NoUninit, CheckedBitPattern)]
#[repr(u32)]
pub enum StrokeJoin {
    #[default]
    Miter = 0,
    Round = 1,
    Bevel = 2,
}

/// How a clip shape combines with the current clip.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, NoUninit, CheckedBitPattern)]
#[repr(u32)]
pub enum ClipOp {
    #[default]
    Intersect = 0,
    Difference = 1,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, NoUninit, CheckedBitPattern)]
#[repr(u32)]
pub enum FillType {
    #[default]
    NonZero = 0,
    EvenOdd = 1,
}

impl From<peniko::Fill> for FillType {
    fn from(fill: peniko::Fill) -> Self {
        match fill {
            peniko::Fill::NonZero => Self::NonZero,
            peniko::Fill::EvenOdd => Self::EvenOdd,
        }
    }
}

impl From<FillType> for peniko::Fill {
    fn from(fill: FillType) -> Self {
        match fill {
            FillType::NonZero => Self::NonZero,
            FillType::EvenOdd => Self::EvenOdd,
        }
    }
}

/// Interpretation of a point set.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, NoUninit, CheckedBitPattern)]
#[repr(u32)]
pub enum PointMode {
    /// Each point is drawn on its own.
    #[default]
    Points = 0,
    /// Each pair of points is a line segment.
    Lines = 1,
    /// The points form an open polyline.
    Polygon = 2,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, NoUninit, CheckedBitPattern)]
#[repr(u32)]
pub enum VertexMode {
    #[default]
    Triangles = 0,
    TriangleStrip = 1,
    TriangleFan = 2,
}

/// Image sampling options.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, NoUninit, CheckedBitPattern)]
#[repr(u32)]
pub enum Sampling {
    #[default]
    Nearest = 0,
    Linear = 1,
    MipmapLinear = 2,
    Cubic = 3,
}

/// Filtering used when scaling the slices of a nine-patch image.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, NoUninit, CheckedBitPattern)]
#[repr(u32)]
pub enum FilterMode {
    #[default]
    Nearest = 0,
    Linear = 1,
}

/// Whether sampling may read outside the source rectangle of an image.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, NoUninit, CheckedBitPattern)]
#[repr(u32)]
pub enum SrcRectConstraint {
    Strict = 0,
    #[default]
    Fast = 1,
}
