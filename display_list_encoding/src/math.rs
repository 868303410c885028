// Copyright 2025 the Display List Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Conversions between `kurbo` geometry and the `f32` values stored in records.

use peniko::kurbo::{self, Affine, Point, Rect, RoundedRectRadii};
use peniko::Color;

/// Bounds of a display list that can draw anywhere.
pub const UNBOUNDED: [f32; 4] = [
    f32::NEG_INFINITY,
    f32::NEG_INFINITY,
    f32::INFINITY,
    f32::INFINITY,
];

pub fn point_to_f32(point: Point) -> [f32; 2] {
    [point.x as f32, point.y as f32]
}

pub fn point_from_f32(point: [f32; 2]) -> Point {
    Point::new(point[0] as f64, point[1] as f64)
}

/// Narrows a rectangle to `[left, top, right, bottom]`.
pub fn rect_to_f32(rect: Rect) -> [f32; 4] {
    [rect.x0 as f32, rect.y0 as f32, rect.x1 as f32, rect.y1 as f32]
}

pub fn rect_from_f32(rect: [f32; 4]) -> Rect {
    Rect::new(
        rect[0] as f64,
        rect[1] as f64,
        rect[2] as f64,
        rect[3] as f64,
    )
}

/// Corner radii in kurbo order: top-left, top-right, bottom-right, bottom-left.
pub fn radii_to_f32(radii: RoundedRectRadii) -> [f32; 4] {
    [
        radii.top_left as f32,
        radii.top_right as f32,
        radii.bottom_right as f32,
        radii.bottom_left as f32,
    ]
}

pub fn radii_from_f32(radii: [f32; 4]) -> RoundedRectRadii {
    RoundedRectRadii::new(
        radii[0] as f64,
        radii[1] as f64,
        radii[2] as f64,
        radii[3] as f64,
    )
}

/// Affine coefficients in kurbo order.
pub fn affine_to_f32(transform: Affine) -> [f32; 6] {
    transform.as_coeffs().map(|x| x as f32)
}

pub fn affine_from_f32(coeffs: [f32; 6]) -> kurbo::Affine {
    Affine::new(coeffs.map(|x| x as f64))
}

/// Packs a color as `0xAARRGGBB`.
pub fn color_to_argb(color: Color) -> u32 {
    (color.a as u32) << 24 | (color.r as u32) << 16 | (color.g as u32) << 8 | color.b as u32
}

pub fn color_from_argb(argb: u32) -> Color {
    Color::rgba8(
        (argb >> 16) as u8,
        (argb >> 8) as u8,
        argb as u8,
        (argb >> 24) as u8,
    )
}

/// Returns `true` for the [`UNBOUNDED`] sentinel or any rectangle with an
/// infinite edge.
pub fn is_unbounded(rect: &Rect) -> bool {
    !(rect.x0.is_finite() && rect.y0.is_finite() && rect.x1.is_finite() && rect.y1.is_finite())
}
