// Copyright 2025 the Display List Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Binary file format for display lists.
//!
//! All values are little-endian:
//!
//! | Field | Type |
//! |-------|------|
//! | magic | `b"dspl"` |
//! | version | `i32`, currently 1 |
//! | byte count | `i64` |
//! | storage | `byte count` bytes |
//! | op count | `u32` |
//! | nested byte count | `u64` |
//! | nested op count | `u32` |
//! | total depth | `u32` |
//! | bounds | 4 × `f32`, left, top, right, bottom |
//! | can apply group opacity | `u8`, 0 or 1 |
//! | is UI thread safe | `u8`, 0 or 1 |
//! | modifies transparent black | `u8`, 0 or 1 |

use std::io::{self, Read, Write};

use display_list_encoding::{FormatError, NestedHeader, NestedList, Op, FORMAT_VERSION};
use smallvec::SmallVec;

use crate::{Dispatcher, DisplayList, Error, Flow, Result, Sink, Summary};

/// The first four bytes of every serialized display list.
pub const MAGIC: [u8; 4] = *b"dspl";

/// Writes `list` to `writer`.
///
/// The summary is written as recorded, without recomputing it.
pub fn write(list: &DisplayList, writer: &mut impl Write) -> Result<()> {
    let summary = list.summary();
    writer.write_all(&MAGIC)?;
    writer.write_all(&FORMAT_VERSION.to_le_bytes())?;
    writer.write_all(&(list.byte_count() as i64).to_le_bytes())?;
    writer.write_all(list.storage())?;
    writer.write_all(&summary.op_count.to_le_bytes())?;
    writer.write_all(&(summary.nested_byte_count as u64).to_le_bytes())?;
    writer.write_all(&summary.nested_op_count.to_le_bytes())?;
    writer.write_all(&summary.total_depth.to_le_bytes())?;
    for value in summary.bounds {
        writer.write_all(&value.to_le_bytes())?;
    }
    writer.write_all(&[
        summary.can_apply_group_opacity.into(),
        summary.is_ui_thread_safe.into(),
        summary.modifies_transparent_black.into(),
    ])?;
    log::debug!(
        "Wrote display list with {} ops in {} bytes",
        summary.op_count,
        list.byte_count()
    );
    Ok(())
}

/// Reads a display list written by [`write`].
///
/// The magic and version are checked before anything else is read. The
/// records are walked once to make sure they are well formed, and the op and
/// byte counts declared by the list and every nested list must match the
/// records.
pub fn read(reader: &mut impl Read) -> Result<DisplayList> {
    let result = read_unchecked(reader);
    if let Err(error) = &result {
        log::warn!("Rejected serialized display list: {error}");
    }
    result
}

/// Serializes `list` into a new vector.
pub fn to_bytes(list: &DisplayList) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(list.byte_count() + 64);
    // Writing to a vector can't fail.
    let _ = write(list, &mut bytes);
    bytes
}

pub fn from_bytes(mut bytes: &[u8]) -> Result<DisplayList> {
    read(&mut bytes)
}

fn read_unchecked(reader: &mut impl Read) -> Result<DisplayList> {
    let magic: [u8; 4] = read_array(reader, "magic")?;
    if magic != MAGIC {
        return Err(FormatError::BadMagic(magic).into());
    }
    let version = i32::from_le_bytes(read_array(reader, "version")?);
    if version != FORMAT_VERSION {
        return Err(FormatError::UnsupportedVersion(version).into());
    }
    let byte_count = i64::from_le_bytes(read_array(reader, "byte count")?);
    let byte_count = usize::try_from(byte_count).map_err(|_| FormatError::InvalidCount {
        field: "byte count",
        value: byte_count,
    })?;
    let mut storage = Vec::new();
    reader
        .by_ref()
        .take(byte_count as u64)
        .read_to_end(&mut storage)?;
    if storage.len() != byte_count {
        return Err(FormatError::UnexpectedEof("storage").into());
    }

    let op_count = u32::from_le_bytes(read_array(reader, "op count")?);
    let nested_bytes = u64::from_le_bytes(read_array(reader, "nested byte count")?);
    let nested_byte_count =
        usize::try_from(nested_bytes).map_err(|_| FormatError::InvalidCount {
            field: "nested byte count",
            value: nested_bytes as i64,
        })?;
    let nested_op_count = u32::from_le_bytes(read_array(reader, "nested op count")?);
    let total_depth = u32::from_le_bytes(read_array(reader, "total depth")?);
    if total_depth == 0 {
        return Err(FormatError::ZeroDepth.into());
    }
    let mut bounds = [0.0; 4];
    for value in &mut bounds {
        *value = f32::from_le_bytes(read_array(reader, "bounds")?);
    }
    let [group_opacity, ui_thread_safe, modifies_transparent_black] =
        read_array(reader, "flags")?;
    let summary = Summary {
        op_count,
        nested_byte_count,
        nested_op_count,
        total_depth,
        bounds,
        can_apply_group_opacity: read_bool(group_opacity, "can apply group opacity")?,
        is_ui_thread_safe: read_bool(ui_thread_safe, "is UI thread safe")?,
        modifies_transparent_black: read_bool(
            modifies_transparent_black,
            "modifies transparent black",
        )?,
    };

    let mut validator = Validator::default();
    Dispatcher::run_storage(&storage, total_depth, &mut validator)?;
    if let Some(error) = validator.error {
        return Err(error.into());
    }
    validator
        .top
        .check(op_count, nested_op_count, nested_bytes)?;
    log::debug!("Read display list with {op_count} ops in {byte_count} bytes");
    Ok(DisplayList::from_parts(storage, summary))
}

fn read_array<const N: usize>(reader: &mut impl Read, field: &'static str) -> Result<[u8; N]> {
    let mut bytes = [0; N];
    match reader.read_exact(&mut bytes) {
        Ok(()) => Ok(bytes),
        Err(error) if error.kind() == io::ErrorKind::UnexpectedEof => {
            Err(FormatError::UnexpectedEof(field).into())
        }
        Err(error) => Err(Error::Io(error)),
    }
}

fn read_bool(value: u8, field: &'static str) -> Result<bool, FormatError> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        value => Err(FormatError::InvalidBool { field, value }),
    }
}

/// What a list actually holds, to compare with the counts it declares.
#[derive(Copy, Clone, Debug, Default)]
struct Tally {
    ops: u64,
    nested_ops: u64,
    nested_bytes: u64,
}

impl Tally {
    fn add_nested(&mut self, header: &NestedHeader) {
        let ops = u64::from(header.op_count) + u64::from(header.nested_op_count);
        self.nested_ops = self.nested_ops.saturating_add(ops);
        self.nested_bytes = self
            .nested_bytes
            .saturating_add(header.byte_count)
            .saturating_add(header.nested_byte_count);
    }

    fn check(
        &self,
        op_count: u32,
        nested_op_count: u32,
        nested_bytes: u64,
    ) -> Result<(), FormatError> {
        let counts = [
            ("op count", self.ops, u64::from(op_count)),
            ("nested op count", self.nested_ops, u64::from(nested_op_count)),
            ("nested byte count", self.nested_bytes, nested_bytes),
        ];
        for (field, actual, declared) in counts {
            if actual != declared {
                return Err(FormatError::InvalidCount {
                    field,
                    value: declared as i64,
                });
            }
        }
        Ok(())
    }
}

/// Decodes every record, including those of nested lists, and checks the
/// declared counts of each list.
#[derive(Default)]
struct Validator {
    top: Tally,
    /// Header and tally of each nested list being walked, innermost last.
    nested: SmallVec<[(NestedHeader, Tally); 4]>,
    error: Option<FormatError>,
}

impl Validator {
    fn tally(&mut self) -> &mut Tally {
        match self.nested.last_mut() {
            Some((_, tally)) => tally,
            None => &mut self.top,
        }
    }
}

impl Sink for Validator {
    fn op(&mut self, op: &Op<'_>) -> Flow {
        let tally = self.tally();
        tally.ops += 1;
        if let Op::DrawDisplayList(list) = op {
            tally.add_nested(&list.header);
        }
        if self.error.is_some() {
            Flow::Stop
        } else {
            Flow::Continue
        }
    }

    fn begin_nested(&mut self, list: &NestedList<'_>) {
        self.nested.push((list.header, Tally::default()));
    }

    fn end_nested(&mut self) {
        let Some((header, tally)) = self.nested.pop() else {
            return;
        };
        let NestedHeader {
            op_count,
            nested_op_count,
            nested_byte_count,
            ..
        } = header;
        if let Err(error) = tally.check(op_count, nested_op_count, nested_byte_count) {
            self.error.get_or_insert(error);
        }
    }
}

#[cfg(test)]
mod tests {
    use peniko::kurbo::Rect;

    use super::*;
    use crate::DisplayListBuilder;

    fn sample() -> std::sync::Arc<DisplayList> {
        let mut builder = DisplayListBuilder::new();
        builder.draw_rect(Rect::new(1.0, 2.0, 3.0, 4.0));
        builder.draw_paint();
        builder.finish().unwrap()
    }

    #[test]
    fn layout() {
        let list = sample();
        let bytes = to_bytes(&list);
        assert_eq!(&bytes[..4], b"dspl");
        assert_eq!(&bytes[4..8], &1_i32.to_le_bytes());
        assert_eq!(&bytes[8..16], &(list.byte_count() as i64).to_le_bytes());
        assert_eq!(bytes.len(), 16 + list.byte_count() + 4 + 8 + 4 + 4 + 16 + 3);
        // Group opacity, thread safety, transparent black.
        assert_eq!(&bytes[bytes.len() - 3..], &[0, 1, 0]);
    }

    #[test]
    fn round_trip() {
        let list = sample();
        let read = from_bytes(&to_bytes(&list)).unwrap();
        assert_eq!(read, *list);
    }

    fn format_error(bytes: &[u8]) -> FormatError {
        match from_bytes(bytes) {
            Err(Error::Format(error)) => error,
            other => panic!("expected a format error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_bad_headers() {
        let mut bytes = to_bytes(&sample());
        bytes[0] = b'x';
        assert_eq!(format_error(&bytes), FormatError::BadMagic(*b"xspl"));

        let mut bytes = to_bytes(&sample());
        bytes[4] = 2;
        assert_eq!(format_error(&bytes), FormatError::UnsupportedVersion(2));

        let mut bytes = to_bytes(&sample());
        bytes[8..16].copy_from_slice(&(-1_i64).to_le_bytes());
        assert_eq!(
            format_error(&bytes),
            FormatError::InvalidCount {
                field: "byte count",
                value: -1
            }
        );
    }

    #[test]
    fn rejects_bad_trailer() {
        let bytes = to_bytes(&sample());
        assert_eq!(
            format_error(&bytes[..bytes.len() - 1]),
            FormatError::UnexpectedEof("flags")
        );

        let mut bytes = to_bytes(&sample());
        let last = bytes.len() - 1;
        bytes[last] = 2;
        assert!(matches!(
            format_error(&bytes),
            FormatError::InvalidBool { value: 2, .. }
        ));

        let mut bytes = to_bytes(&sample());
        let depth = bytes.len() - 3 - 16 - 4;
        bytes[depth..depth + 4].copy_from_slice(&0_u32.to_le_bytes());
        assert_eq!(format_error(&bytes), FormatError::ZeroDepth);
    }

    #[test]
    fn rejects_mismatched_op_count() {
        let mut bytes = to_bytes(&sample());
        let op_count = 16 + sample().byte_count();
        bytes[op_count..op_count + 4].copy_from_slice(&5_u32.to_le_bytes());
        assert!(matches!(
            format_error(&bytes),
            FormatError::InvalidCount {
                field: "op count",
                ..
            }
        ));
    }

    /// Serialized list whose first record embeds `sample()`.
    fn with_nested() -> Vec<u8> {
        let mut builder = DisplayListBuilder::new();
        builder.draw_display_list(&sample(), 1.0);
        to_bytes(&builder.finish().unwrap())
    }

    /// Offset of the nested header fields: storage, then the record header.
    const NESTED_OP_COUNT: usize = 16 + 8 + 16;
    const NESTED_NESTED_OP_COUNT: usize = NESTED_OP_COUNT + 4;

    #[test]
    fn checks_nested_counts() {
        assert!(from_bytes(&with_nested()).is_ok());

        let mut bytes = with_nested();
        bytes[NESTED_OP_COUNT..NESTED_OP_COUNT + 4].copy_from_slice(&u32::MAX.to_le_bytes());
        bytes[NESTED_NESTED_OP_COUNT..NESTED_NESTED_OP_COUNT + 4]
            .copy_from_slice(&1_u32.to_le_bytes());
        assert_eq!(
            format_error(&bytes),
            FormatError::InvalidCount {
                field: "op count",
                value: u32::MAX.into()
            }
        );

        let mut bytes = with_nested();
        bytes[NESTED_NESTED_OP_COUNT..NESTED_NESTED_OP_COUNT + 4]
            .copy_from_slice(&7_u32.to_le_bytes());
        assert_eq!(
            format_error(&bytes),
            FormatError::InvalidCount {
                field: "nested op count",
                value: 7
            }
        );
    }

    #[test]
    fn checks_top_level_nested_counts() {
        let mut bytes = with_nested();
        let list_len = bytes.len() - 16 - 4 - 8 - 4 - 4 - 16 - 3;
        let nested_bytes = 16 + list_len + 4;
        bytes[nested_bytes..nested_bytes + 8].copy_from_slice(&3_u64.to_le_bytes());
        assert_eq!(
            format_error(&bytes),
            FormatError::InvalidCount {
                field: "nested byte count",
                value: 3
            }
        );
    }

    #[test]
    fn io_errors_are_reported() {
        struct Failing;
        impl Read for Failing {
            fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::other("disk on fire"))
            }
        }
        assert!(matches!(read(&mut Failing), Err(Error::Io(_))));
    }
}
