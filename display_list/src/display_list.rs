// Copyright 2025 the Display List Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::fmt;

use display_list_encoding::math::{is_unbounded, rect_from_f32};
use display_list_encoding::{FormatError, NestedList, Records};
use peniko::kurbo::Rect;

use crate::{Accumulator, Dispatcher, Printer, Sink, Summary};

/// An immutable recording of drawing operations.
///
/// Produced by [`DisplayListBuilder::finish`](crate::DisplayListBuilder::finish)
/// or [`serialize::read`](crate::serialize::read), and shared as an `Arc`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DisplayList {
    storage: Vec<u8>,
    summary: Summary,
}

impl DisplayList {
    pub(crate) fn from_parts(storage: Vec<u8>, summary: Summary) -> Self {
        Self { storage, summary }
    }

    /// The encoded records.
    pub fn storage(&self) -> &[u8] {
        &self.storage
    }

    /// Walks the records without decoding them.
    pub fn records(&self) -> Records<'_> {
        Records::new(&self.storage)
    }

    pub fn summary(&self) -> &Summary {
        &self.summary
    }

    /// Size of the encoded records in bytes.
    pub fn byte_count(&self) -> usize {
        self.storage.len()
    }

    /// Number of top-level records.
    pub fn op_count(&self) -> u32 {
        self.summary.op_count
    }

    /// Bytes of all embedded lists, transitively.
    pub fn nested_byte_count(&self) -> usize {
        self.summary.nested_byte_count
    }

    /// Records of all embedded lists, transitively.
    pub fn nested_op_count(&self) -> u32 {
        self.summary.nested_op_count
    }

    /// One more than the deepest embedded list, or 1 without any.
    pub fn total_depth(&self) -> u32 {
        self.summary.total_depth
    }

    /// Conservative device-space bounds at recording time.
    pub fn bounds(&self) -> Rect {
        rect_from_f32(self.summary.bounds)
    }

    /// The list may draw anywhere, for example with an unclipped paint.
    pub fn is_unbounded(&self) -> bool {
        is_unbounded(&self.bounds())
    }

    /// The whole list can be drawn with one alpha instead of an offscreen
    /// layer.
    pub fn can_apply_group_opacity(&self) -> bool {
        self.summary.can_apply_group_opacity
    }

    /// No referenced resource is tied to the thread that created it.
    pub fn is_ui_thread_safe(&self) -> bool {
        self.summary.is_ui_thread_safe
    }

    /// Some op may change pixels outside [`DisplayList::bounds`].
    pub fn modifies_transparent_black(&self) -> bool {
        self.summary.modifies_transparent_black
    }

    /// Dispatches every op into `sink`; see [`Dispatcher::run`].
    pub fn dispatch<S: Sink + ?Sized>(&self, sink: &mut S) -> Result<usize, FormatError> {
        Dispatcher::run(self, sink)
    }

    /// Recomputes the summary from the records alone.
    pub fn recompute_summary(&self) -> Result<Summary, FormatError> {
        let mut accumulator = Accumulator::new();
        self.dispatch(&mut accumulator)?;
        Ok(accumulator.finish())
    }

    /// A view of this list for embedding with the given opacity.
    pub fn as_nested(&self, opacity: f32) -> NestedList<'_> {
        NestedList {
            header: self.summary.nested_header(self.storage.len(), opacity),
            storage: &self.storage,
        }
    }
}

impl fmt::Display for DisplayList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let summary = &self.summary;
        let [l, t, r, b] = summary.bounds;
        writeln!(
            f,
            "DisplayList(bytes: {}, ops: {}, nestedBytes: {}, nestedOps: {}, depth: {}, \
             bounds: [{l}, {t}, {r}, {b}], groupOpacity: {}, uiThreadSafe: {}, \
             modifiesTransparentBlack: {}) {{",
            self.byte_count(),
            summary.op_count,
            summary.nested_byte_count,
            summary.nested_op_count,
            summary.total_depth,
            summary.can_apply_group_opacity,
            summary.is_ui_thread_safe,
            summary.modifies_transparent_black,
        )?;
        let mut printer = Printer::with_indent(&mut *f, 1);
        // Corruption is reported inline by the printer.
        let _ = self.dispatch(&mut printer);
        printer.into_result()?;
        writeln!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use peniko::kurbo::Rect;

    use crate::DisplayListBuilder;

    #[test]
    fn recomputed_summary_matches() {
        let mut builder = DisplayListBuilder::new();
        builder.save();
        builder.translate(10.0, 10.0);
        builder.draw_rect(Rect::new(0.0, 0.0, 5.0, 5.0));
        builder.restore();
        let list = builder.finish().unwrap();
        assert_eq!(list.recompute_summary().unwrap(), *list.summary());
        assert_eq!(list.bounds(), Rect::new(10.0, 10.0, 15.0, 15.0));
    }

    #[test]
    fn display_prints_header_and_ops() {
        let mut builder = DisplayListBuilder::new();
        builder.draw_rect(Rect::new(0.0, 0.0, 5.0, 5.0));
        let list = builder.finish().unwrap();
        let text = list.to_string();
        assert!(text.starts_with("DisplayList(bytes: 24, ops: 1,"));
        assert!(text.contains("\n  drawRect([0, 0, 5, 5])\n"));
        assert!(text.ends_with("}\n"));
    }
}
