// Copyright 2025 the Display List Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Reading and writing the binary format.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};

use display_list::{serialize, Error, FormatError};
use display_list_tests::{every_op, nested, round_trip};

#[test]
fn every_op_round_trips() {
    let list = every_op();
    let read = round_trip(&list).unwrap();
    assert_eq!(read, *list);
    assert_eq!(read.to_string(), list.to_string());
}

#[test]
fn nested_lists_round_trip() {
    let list = nested(5);
    assert_eq!(round_trip(&list).unwrap(), *list);
}

#[test]
fn file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scene.dat");
    let list = every_op();
    let mut writer = BufWriter::new(File::create(&path).unwrap());
    serialize::write(&list, &mut writer).unwrap();
    writer.flush().unwrap();
    drop(writer);

    let mut reader = BufReader::new(File::open(&path).unwrap());
    let read = serialize::read(&mut reader).unwrap();
    assert_eq!(read, *list);
}

fn format_error(bytes: &[u8]) -> FormatError {
    match serialize::from_bytes(bytes) {
        Err(Error::Format(error)) => error,
        other => panic!("expected a format error, got {other:?}"),
    }
}

/// Offset of the first record in a serialized list.
const STORAGE: usize = 16;

#[test]
fn empty_input() {
    assert_eq!(format_error(&[]), FormatError::UnexpectedEof("magic"));
}

#[test]
fn version_is_checked_before_the_rest() {
    let mut bytes = b"dspl".to_vec();
    bytes.extend(7_i32.to_le_bytes());
    assert_eq!(format_error(&bytes), FormatError::UnsupportedVersion(7));
}

#[test]
fn truncated_storage() {
    let bytes = serialize::to_bytes(&every_op());
    assert_eq!(
        format_error(&bytes[..STORAGE + 10]),
        FormatError::UnexpectedEof("storage")
    );
}

#[test]
fn corrupt_records_are_rejected() {
    let bytes = serialize::to_bytes(&every_op());

    let mut unknown = bytes.clone();
    unknown[STORAGE] = 0x7f;
    assert_eq!(
        format_error(&unknown),
        FormatError::UnknownTag {
            tag: 0x7f,
            offset: 0
        }
    );

    let mut reserved = bytes.clone();
    reserved[STORAGE + 1] = 1;
    assert_eq!(
        format_error(&reserved),
        FormatError::ReservedBits { offset: 0 }
    );

    let mut length = bytes.clone();
    length[STORAGE + 4..STORAGE + 8].copy_from_slice(&6_u32.to_le_bytes());
    assert!(matches!(
        format_error(&length),
        FormatError::BadRecordLength { offset: 0, len: 6 }
    ));

    // The first record is `setAntiAlias(true)`.
    let mut value = bytes;
    value[STORAGE + 8] = 2;
    assert!(matches!(
        format_error(&value),
        FormatError::InvalidValue { offset: 0, .. }
    ));
}

#[test]
fn corrupt_nested_records_are_rejected() {
    let list = nested(2);
    let mut bytes = serialize::to_bytes(&list);
    // The nested rect record starts after the translate record, the nested
    // record header and the nested summary.
    let nested_rect = STORAGE + 16 + 8 + 56;
    assert_eq!(bytes[nested_rect], 0x43);
    bytes[nested_rect] = 0x7e;
    assert_eq!(
        format_error(&bytes),
        FormatError::UnknownTag {
            tag: 0x7e,
            offset: 0
        }
    );
}
