// Copyright 2025 the Display List Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fixed-size record payloads.
//!
//! Rectangles are `[left, top, right, bottom]`, points are `[x, y]`, colors
//! are packed `0xAARRGGBB` and boolean fields are `0` or `1`.

use bytemuck::{CheckedBitPattern, NoUninit, Pod, Zeroable};

use crate::{
    BlendMode, ClipOp, DrawStyle, FilterMode, ImageRef, Sampling, SrcRectConstraint, StrokeCap,
    StrokeJoin,
};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
pub struct SetAntiAlias {
    pub enabled: u32,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
pub struct SetColor {
    pub argb: u32,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, NoUninit, CheckedBitPattern)]
#[repr(C)]
pub struct SetBlendMode {
    pub mode: BlendMode,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, NoUninit, CheckedBitPattern)]
#[repr(C)]
pub struct SetStyle {
    pub style: DrawStyle,
}

#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct SetStrokeWidth {
    /// Zero means hairline.
    pub width: f32,
}

#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct SetStrokeMiter {
    pub limit: f32,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, NoUninit, CheckedBitPattern)]
#[repr(C)]
pub struct SetStrokeCap {
    pub cap: StrokeCap,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, NoUninit, CheckedBitPattern)]
#[repr(C)]
pub struct SetStrokeJoin {
    pub join: StrokeJoin,
}

/// Starts an offscreen layer that is composited on the matching restore.
#[derive(Copy, Clone, Debug, PartialEq, NoUninit, CheckedBitPattern)]
#[repr(C)]
pub struct SaveLayer {
    /// Only meaningful with [`SaveLayer::HAS_BOUNDS`].
    pub bounds: [f32; 4],
    /// Layer alpha and color, only meaningful with [`SaveLayer::HAS_PAINT`].
    pub argb: u32,
    pub blend_mode: BlendMode,
    pub options: u32,
}

impl SaveLayer {
    pub const HAS_BOUNDS: u32 = 1;
    pub const HAS_PAINT: u32 = 2;
    /// The layer's content can be drawn directly with the layer alpha
    /// applied to each op. Filled in when the layer is restored.
    pub const CAN_DISTRIBUTE_OPACITY: u32 = 4;
    pub const ALL_OPTIONS: u32 = 7;

    pub fn bounds(&self) -> Option<[f32; 4]> {
        (self.options & Self::HAS_BOUNDS != 0).then_some(self.bounds)
    }

    pub fn has_paint(&self) -> bool {
        self.options & Self::HAS_PAINT != 0
    }

    pub fn can_distribute_opacity(&self) -> bool {
        self.options & Self::CAN_DISTRIBUTE_OPACITY != 0
    }

    /// Blend mode used to composite the layer onto its parent.
    pub fn effective_blend_mode(&self) -> BlendMode {
        if self.has_paint() {
            self.blend_mode
        } else {
            BlendMode::SrcOver
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Translate {
    pub tx: f32,
    pub ty: f32,
}

#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Scale {
    pub sx: f32,
    pub sy: f32,
}

#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Rotate {
    pub degrees: f32,
}

#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Skew {
    pub sx: f32,
    pub sy: f32,
}

#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Transform2DAffine {
    /// Coefficients in `kurbo::Affine` order.
    pub coeffs: [f32; 6],
}

#[derive(Copy, Clone, Debug, PartialEq, NoUninit, CheckedBitPattern)]
#[repr(C)]
pub struct ClipRect {
    pub rect: [f32; 4],
    pub clip_op: ClipOp,
    pub anti_alias: u32,
}

#[derive(Copy, Clone, Debug, PartialEq, NoUninit, CheckedBitPattern)]
#[repr(C)]
pub struct ClipRoundRect {
    pub rect: [f32; 4],
    /// Top-left, top-right, bottom-right, bottom-left.
    pub radii: [f32; 4],
    pub clip_op: ClipOp,
    pub anti_alias: u32,
}

/// Fixed part of a `ClipPath` record; the path follows.
#[derive(Copy, Clone, Debug, PartialEq, Eq, NoUninit, CheckedBitPattern)]
#[repr(C)]
pub struct ClipPath {
    pub clip_op: ClipOp,
    pub anti_alias: u32,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, NoUninit, CheckedBitPattern)]
#[repr(C)]
pub struct DrawColor {
    pub argb: u32,
    pub blend_mode: BlendMode,
}

#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct DrawLine {
    pub p0: [f32; 2],
    pub p1: [f32; 2],
}

#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct DrawRect {
    pub rect: [f32; 4],
}

#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct DrawOval {
    pub rect: [f32; 4],
}

#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct DrawCircle {
    pub center: [f32; 2],
    pub radius: f32,
}

#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct DrawRoundRect {
    pub rect: [f32; 4],
    pub radii: [f32; 4],
}

/// The area between two rounded rectangles.
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct DrawDiffRoundRect {
    pub outer: [f32; 4],
    pub outer_radii: [f32; 4],
    pub inner: [f32; 4],
    pub inner_radii: [f32; 4],
}

#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct DrawArc {
    /// Oval the arc lies on.
    pub rect: [f32; 4],
    pub start_degrees: f32,
    pub sweep_degrees: f32,
    /// Draw a wedge through the oval's center.
    pub use_center: u32,
}

#[derive(Copy, Clone, Debug, PartialEq, NoUninit, CheckedBitPattern)]
#[repr(C)]
pub struct DrawImage {
    pub image: ImageRef,
    /// Top-left corner of the image.
    pub point: [f32; 2],
    pub sampling: Sampling,
    pub with_paint: u32,
}

#[derive(Copy, Clone, Debug, PartialEq, NoUninit, CheckedBitPattern)]
#[repr(C)]
pub struct DrawImageRect {
    pub image: ImageRef,
    pub src: [f32; 4],
    pub dst: [f32; 4],
    pub sampling: Sampling,
    pub with_paint: u32,
    pub constraint: SrcRectConstraint,
}

/// An image stretched as a nine-patch.
#[derive(Copy, Clone, Debug, PartialEq, NoUninit, CheckedBitPattern)]
#[repr(C)]
pub struct DrawImageNine {
    pub image: ImageRef,
    /// The stretchable center of the image, in pixels.
    pub center: [i32; 4],
    pub dst: [f32; 4],
    pub filter: FilterMode,
    pub with_paint: u32,
}

/// Fixed part of a `DrawShadow` record; the occluding path follows.
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct DrawShadow {
    pub argb: u32,
    pub elevation: f32,
    /// Device pixel ratio.
    pub dpr: f32,
    pub transparent_occluder: u32,
}
