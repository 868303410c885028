// Copyright 2025 the Display List Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use bytemuck::{CheckedBitPattern, NoUninit};
use peniko::kurbo::{BezPath, PathEl, Rect, Shape};

use crate::data::{points_bounds, PodSlice};
use crate::math::{point_from_f32, point_to_f32};
use crate::FillType;

/// Path construction verb.
#[derive(Copy, Clone, Debug, PartialEq, Eq, NoUninit, CheckedBitPattern)]
#[repr(u8)]
pub enum PathVerb {
    MoveTo = 0,
    LineTo = 1,
    QuadTo = 2,
    CubicTo = 3,
    Close = 4,
}

impl PathVerb {
    /// Number of points consumed by the verb.
    pub const fn point_count(self) -> usize {
        match self {
            Self::MoveTo | Self::LineTo => 1,
            Self::QuadTo => 2,
            Self::CubicTo => 3,
            Self::Close => 0,
        }
    }
}

/// Header preceding path data in a record.
#[derive(Copy, Clone, Debug, PartialEq, NoUninit, CheckedBitPattern)]
#[repr(C)]
pub(crate) struct PathHeader {
    pub fill: FillType,
    pub verb_count: u32,
    pub point_count: u32,
}

/// A path stored in a record, or borrowed from an [`EncodedPath`].
///
/// Verbs and points always agree: every verb has its points, and a
/// non-empty path starts with [`PathVerb::MoveTo`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PathData<'a> {
    pub fill: FillType,
    verbs: &'a [PathVerb],
    points: PodSlice<'a, [f32; 2]>,
}

impl<'a> PathData<'a> {
    /// Checks that `verbs` and `points` describe a well formed path.
    pub fn new(
        fill: FillType,
        verbs: &'a [PathVerb],
        points: PodSlice<'a, [f32; 2]>,
    ) -> Option<Self> {
        if verbs.first().is_some_and(|verb| *verb != PathVerb::MoveTo) {
            return None;
        }
        let needed: usize = verbs.iter().map(|verb| verb.point_count()).sum();
        (needed == points.len()).then_some(Self {
            fill,
            verbs,
            points,
        })
    }

    pub fn verbs(&self) -> &'a [PathVerb] {
        self.verbs
    }

    pub fn points(&self) -> PodSlice<'a, [f32; 2]> {
        self.points
    }

    pub fn is_empty(&self) -> bool {
        self.verbs.is_empty()
    }

    /// Bounds of all points, control points included.
    pub fn bounding_box(&self) -> Option<Rect> {
        points_bounds(self.points.iter())
    }

    pub fn elements(&self) -> impl Iterator<Item = PathEl> + 'a {
        let mut points = self.points.iter().map(point_from_f32);
        // `new` guarantees there are enough points for every verb.
        let mut next = move || points.next().unwrap_or_default();
        self.verbs.iter().map(move |verb| match verb {
            PathVerb::MoveTo => PathEl::MoveTo(next()),
            PathVerb::LineTo => PathEl::LineTo(next()),
            PathVerb::QuadTo => PathEl::QuadTo(next(), next()),
            PathVerb::CubicTo => PathEl::CurveTo(next(), next(), next()),
            PathVerb::Close => PathEl::ClosePath,
        })
    }

    pub fn to_bez_path(&self) -> BezPath {
        BezPath::from_vec(self.elements().collect())
    }

    /// Size of the encoded verbs and points, padding included.
    pub(crate) fn encoded_len(&self) -> usize {
        self.verbs.len().next_multiple_of(4) + self.points.as_bytes().len()
    }

    pub(crate) fn header(&self) -> PathHeader {
        PathHeader {
            fill: self.fill,
            verb_count: self.verbs.len() as u32,
            point_count: self.points.len() as u32,
        }
    }
}

/// Owned verbs and points, built from `kurbo` path elements.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EncodedPath {
    pub fill: FillType,
    verbs: Vec<PathVerb>,
    points: Vec<[f32; 2]>,
}

impl EncodedPath {
    pub fn new(fill: FillType) -> Self {
        Self {
            fill,
            ..Default::default()
        }
    }

    /// Encodes any `kurbo` shape, such as a [`BezPath`].
    pub fn from_shape(shape: &impl Shape, fill: FillType) -> Self {
        let mut path = Self::new(fill);
        path.extend(shape.path_elements(0.1));
        path
    }

    /// Appends path elements, inserting a move to the origin if the path
    /// would otherwise not start with one.
    pub fn extend(&mut self, elements: impl IntoIterator<Item = PathEl>) {
        for element in elements {
            if self.verbs.is_empty() && !matches!(element, PathEl::MoveTo(_)) {
                self.verbs.push(PathVerb::MoveTo);
                self.points.push([0.0, 0.0]);
            }
            match element {
                PathEl::MoveTo(p) => {
                    self.verbs.push(PathVerb::MoveTo);
                    self.points.push(point_to_f32(p));
                }
                PathEl::LineTo(p) => {
                    self.verbs.push(PathVerb::LineTo);
                    self.points.push(point_to_f32(p));
                }
                PathEl::QuadTo(p1, p2) => {
                    self.verbs.push(PathVerb::QuadTo);
                    self.points.extend([p1, p2].map(point_to_f32));
                }
                PathEl::CurveTo(p1, p2, p3) => {
                    self.verbs.push(PathVerb::CubicTo);
                    self.points.extend([p1, p2, p3].map(point_to_f32));
                }
                PathEl::ClosePath => self.verbs.push(PathVerb::Close),
            }
        }
    }

    pub fn as_data(&self) -> PathData<'_> {
        PathData {
            fill: self.fill,
            verbs: &self.verbs,
            points: PodSlice::new(&self.points),
        }
    }
}

#[cfg(test)]
mod tests {
    use peniko::kurbo::{Circle, Point};

    use super::*;

    #[test]
    fn kurbo_elements_survive_encoding() {
        let mut bez = BezPath::new();
        bez.move_to((1.0, 2.0));
        bez.line_to((3.0, 4.0));
        bez.quad_to((5.0, 6.0), (7.0, 8.0));
        bez.curve_to((9.0, 10.0), (11.0, 12.0), (13.0, 14.0));
        bez.close_path();
        let path = EncodedPath::from_shape(&bez, FillType::EvenOdd);
        let data = path.as_data();
        assert_eq!(data.verbs().len(), 5);
        assert_eq!(data.points().len(), 7);
        assert_eq!(data.to_bez_path(), bez);
        assert_eq!(data.bounding_box(), Some(Rect::new(1.0, 2.0, 13.0, 14.0)));
    }

    #[test]
    fn path_without_move_gets_one() {
        let mut path = EncodedPath::new(FillType::NonZero);
        path.extend([PathEl::LineTo(Point::new(5.0, 5.0))]);
        assert_eq!(path.as_data().verbs(), &[PathVerb::MoveTo, PathVerb::LineTo]);
    }

    #[test]
    fn mismatched_points_are_rejected() {
        let points = [[0.0, 0.0]];
        let verbs = [PathVerb::MoveTo, PathVerb::LineTo];
        assert!(PathData::new(FillType::NonZero, &verbs, PodSlice::new(&points)).is_none());
        let verbs = [PathVerb::LineTo];
        assert!(PathData::new(FillType::NonZero, &verbs, PodSlice::new(&points)).is_none());
        let verbs = [PathVerb::MoveTo];
        assert!(PathData::new(FillType::NonZero, &verbs, PodSlice::new(&points)).is_some());
    }

    #[test]
    fn shapes_are_encoded_as_curves() {
        let path = EncodedPath::from_shape(&Circle::new((0.0, 0.0), 10.0), FillType::NonZero);
        let bbox = path.as_data().bounding_box().unwrap();
        assert!(bbox.x0 <= -10.0 && bbox.x1 >= 10.0);
        assert!(bbox.y0 <= -10.0 && bbox.y1 >= 10.0);
    }
}
