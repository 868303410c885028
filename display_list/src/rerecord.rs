// Copyright 2025 the Display List Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::fmt;
use std::sync::Arc;

use display_list_encoding::{Op, OpTag};
use peniko::kurbo::Affine;

use crate::{DisplayList, DisplayListBuilder, Flow, Sink, UsageError};

/// Replays dispatched ops into a fresh [`DisplayListBuilder`].
///
/// Without a transform or filter the new list is identical to the
/// dispatched one, records and summary alike.
pub struct Rerecorder<'a> {
    builder: DisplayListBuilder,
    transform: Option<Affine>,
    filter: Option<Box<dyn Fn(OpTag) -> bool + 'a>>,
}

impl fmt::Debug for Rerecorder<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rerecorder")
            .field("builder", &self.builder)
            .field("transform", &self.transform)
            .field("filter", &self.filter.is_some())
            .finish()
    }
}

impl Default for Rerecorder<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> Rerecorder<'a> {
    pub fn new() -> Self {
        Self::with_builder(DisplayListBuilder::new())
    }

    /// Appends to an existing builder.
    pub fn with_builder(builder: DisplayListBuilder) -> Self {
        Self {
            builder,
            transform: None,
            filter: None,
        }
    }

    /// Records everything under `transform`, including ops following a
    /// `TransformReset`.
    pub fn with_transform(mut self, transform: Affine) -> Self {
        if transform != Affine::IDENTITY {
            self.builder.transform(transform);
            self.transform = Some(transform);
        }
        self
    }

    /// Keeps only the draw ops for which `filter` returns `true`. Attribute,
    /// state, transform and clip ops are always kept.
    pub fn with_filter(mut self, filter: impl Fn(OpTag) -> bool + 'a) -> Self {
        self.filter = Some(Box::new(filter));
        self
    }

    pub fn builder(&mut self) -> &mut DisplayListBuilder {
        &mut self.builder
    }

    pub fn finish(mut self) -> Result<Arc<DisplayList>, UsageError> {
        self.builder.finish()
    }

    fn keeps(&self, tag: OpTag) -> bool {
        !tag.is_draw() || self.filter.as_ref().map_or(true, |filter| filter(tag))
    }
}

impl Sink for Rerecorder<'_> {
    fn op(&mut self, op: &Op<'_>) -> Flow {
        if !self.keeps(op.tag()) {
            return Flow::Continue;
        }
        let flow = self.builder.op(op);
        if let (Op::TransformReset, Some(transform)) = (op, self.transform) {
            self.builder.transform(transform);
        }
        flow
    }

    fn descend_nested(&mut self) -> bool {
        false
    }
}
