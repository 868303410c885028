// Copyright 2025 the Display List Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Borrowed views over the variable-length data of records.

use std::fmt;
use std::marker::PhantomData;

use bytemuck::{CheckedBitPattern, NoUninit, Pod, Zeroable};
use peniko::kurbo::Rect;

use crate::{BlendMode, Sampling, VertexMode};

/// A sequence of `T` stored in unaligned bytes.
pub struct PodSlice<'a, T> {
    bytes: &'a [u8],
    _marker: PhantomData<T>,
}

impl<'a, T: Pod> PodSlice<'a, T> {
    pub fn new(values: &'a [T]) -> Self {
        Self {
            bytes: bytemuck::cast_slice(values),
            _marker: PhantomData,
        }
    }

    /// Wraps raw bytes, which must hold a whole number of values.
    pub fn from_bytes(bytes: &'a [u8]) -> Option<Self> {
        (bytes.len() % size_of::<T>() == 0).then_some(Self {
            bytes,
            _marker: PhantomData,
        })
    }

    pub fn len(&self) -> usize {
        self.bytes.len() / size_of::<T>()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<T> {
        let size = size_of::<T>();
        let start = index.checked_mul(size)?;
        self.bytes
            .get(start..start + size)
            .map(bytemuck::pod_read_unaligned)
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = T> + 'a {
        self.bytes
            .chunks_exact(size_of::<T>())
            .map(bytemuck::pod_read_unaligned)
    }

    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }
}

impl<T> Clone for PodSlice<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for PodSlice<'_, T> {}

impl<T> PartialEq for PodSlice<'_, T> {
    fn eq(&self, other: &Self) -> bool {
        self.bytes == other.bytes
    }
}

impl<T: Pod + fmt::Debug> fmt::Debug for PodSlice<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

/// Bounding box of a set of points, or `None` if there are none.
pub fn points_bounds(points: impl IntoIterator<Item = [f32; 2]>) -> Option<Rect> {
    let mut points = points.into_iter().map(crate::math::point_from_f32);
    let first = points.next()?;
    Some(points.fold(Rect::from_points(first, first), |rect, p| {
        rect.union_pt(p)
    }))
}

/// Reference to an image whose pixels live outside the display list.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
#[repr(C)]
pub struct ImageRef {
    pub id: u32,
    pub width: u32,
    pub height: u32,
    pub flags: u32,
}

impl ImageRef {
    /// The image may only be accessed on the thread that created it.
    pub const THREAD_AFFINE: u32 = 1;

    pub fn new(id: u32, width: u32, height: u32) -> Self {
        Self {
            id,
            width,
            height,
            flags: 0,
        }
    }

    pub fn thread_affine(mut self) -> Self {
        self.flags |= Self::THREAD_AFFINE;
        self
    }

    pub fn is_thread_affine(&self) -> bool {
        self.flags & Self::THREAD_AFFINE != 0
    }

    /// The full image rectangle, anchored at the origin.
    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width as f64, self.height as f64)
    }
}

/// A triangle mesh with optional per-vertex colors.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct VertexData<'a> {
    pub mode: VertexMode,
    pub blend_mode: BlendMode,
    pub positions: PodSlice<'a, [f32; 2]>,
    /// `0xAARRGGBB` per vertex, same length as `positions`.
    pub colors: Option<PodSlice<'a, u32>>,
}

impl VertexData<'_> {
    pub fn bounds(&self) -> Option<Rect> {
        points_bounds(self.positions.iter())
    }
}

/// Sprites drawn from one image, each with its own rotation-scale transform.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AtlasData<'a> {
    pub image: ImageRef,
    pub blend_mode: BlendMode,
    pub sampling: Sampling,
    /// Caller-provided bounds covering every sprite.
    pub cull: Option<[f32; 4]>,
    pub with_paint: bool,
    /// `[scos, ssin, tx, ty]` per sprite.
    pub xforms: PodSlice<'a, [f32; 4]>,
    /// Source rectangle within the image per sprite.
    pub tex_rects: PodSlice<'a, [f32; 4]>,
    pub colors: Option<PodSlice<'a, u32>>,
}

impl AtlasData<'_> {
    /// The cull rectangle if present, otherwise the union of the transformed
    /// sprite rectangles.
    pub fn bounds(&self) -> Option<Rect> {
        if let Some(cull) = self.cull {
            return Some(crate::math::rect_from_f32(cull));
        }
        let corners = self
            .xforms
            .iter()
            .zip(self.tex_rects.iter())
            .flat_map(|([scos, ssin, tx, ty], [l, t, r, b])| {
                let (w, h) = (r - l, b - t);
                [[0.0, 0.0], [w, 0.0], [w, h], [0.0, h]]
                    .map(|[x, y]| [scos * x - ssin * y + tx, ssin * x + scos * y + ty])
            });
        points_bounds(corners)
    }
}

/// Summary of an embedded display list, stored ahead of its records.
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct NestedHeader {
    pub byte_count: u64,
    pub nested_byte_count: u64,
    pub op_count: u32,
    pub nested_op_count: u32,
    pub total_depth: u32,
    pub flags: u32,
    pub bounds: [f32; 4],
    pub opacity: f32,
    pub _padding: u32,
}

impl NestedHeader {
    pub const GROUP_OPACITY: u32 = 1;
    pub const UI_THREAD_SAFE: u32 = 2;
    pub const MODIFIES_TRANSPARENT_BLACK: u32 = 4;

    pub fn can_apply_group_opacity(&self) -> bool {
        self.flags & Self::GROUP_OPACITY != 0
    }

    pub fn is_ui_thread_safe(&self) -> bool {
        self.flags & Self::UI_THREAD_SAFE != 0
    }

    pub fn modifies_transparent_black(&self) -> bool {
        self.flags & Self::MODIFIES_TRANSPARENT_BLACK != 0
    }
}

/// A display list embedded in a `DrawDisplayList` record.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct NestedList<'a> {
    pub header: NestedHeader,
    /// Records of the embedded list.
    pub storage: &'a [u8],
}

impl NestedList<'_> {
    pub fn opacity(&self) -> f32 {
        self.header.opacity
    }

    pub fn bounds(&self) -> Rect {
        crate::math::rect_from_f32(self.header.bounds)
    }
}

/// Header of a `DrawPoints` record.
#[derive(Copy, Clone, Debug, PartialEq, NoUninit, CheckedBitPattern)]
#[repr(C)]
pub(crate) struct PointsHeader {
    pub mode: crate::PointMode,
    pub count: u32,
}

/// Header of a `DrawVertices` record.
#[derive(Copy, Clone, Debug, PartialEq, NoUninit, CheckedBitPattern)]
#[repr(C)]
pub(crate) struct VerticesHeader {
    pub mode: VertexMode,
    pub blend_mode: BlendMode,
    pub vertex_count: u32,
    pub has_colors: u32,
}

/// Header of a `DrawAtlas` record.
#[derive(Copy, Clone, Debug, PartialEq, NoUninit, CheckedBitPattern)]
#[repr(C)]
pub(crate) struct AtlasHeader {
    pub image: ImageRef,
    pub count: u32,
    pub blend_mode: BlendMode,
    pub sampling: Sampling,
    pub has_colors: u32,
    pub has_cull: u32,
    pub cull: [f32; 4],
    pub with_paint: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pod_slice_reads_unaligned() {
        let mut bytes = vec![0_u8];
        bytes.extend_from_slice(bytemuck::cast_slice(&[[1.0_f32, 2.0], [3.0, -4.0]]));
        let slice = PodSlice::<[f32; 2]>::from_bytes(&bytes[1..]).unwrap();
        assert_eq!(slice.len(), 2);
        assert_eq!(slice.get(1), Some([3.0, -4.0]));
        assert_eq!(slice.get(2), None);
        assert_eq!(slice.iter().collect::<Vec<_>>(), [[1.0, 2.0], [3.0, -4.0]]);
        assert!(PodSlice::<u32>::from_bytes(&bytes[..3]).is_none());
    }

    #[test]
    fn atlas_bounds_follow_sprite_transforms() {
        let xforms = [[1.0, 0.0, 10.0, 20.0], [0.0, 1.0, 100.0, 0.0]];
        let tex = [[0.0, 0.0, 4.0, 2.0], [8.0, 8.0, 12.0, 10.0]];
        let atlas = AtlasData {
            image: ImageRef::new(1, 16, 16),
            blend_mode: BlendMode::SrcOver,
            sampling: Sampling::Linear,
            cull: None,
            with_paint: false,
            xforms: PodSlice::new(&xforms),
            tex_rects: PodSlice::new(&tex),
            colors: None,
        };
        // The second sprite is rotated a quarter turn around its origin.
        assert_eq!(atlas.bounds(), Some(Rect::new(10.0, 0.0, 100.0, 22.0)));
        let culled = AtlasData {
            cull: Some([0.0, 0.0, 1.0, 1.0]),
            ..atlas
        };
        assert_eq!(culled.bounds(), Some(Rect::new(0.0, 0.0, 1.0, 1.0)));
    }

    #[test]
    fn nested_header_has_no_padding() {
        assert_eq!(size_of::<NestedHeader>(), 56);
        assert_eq!(size_of::<AtlasHeader>(), 56);
    }
}
