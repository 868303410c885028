// Copyright 2025 the Display List Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use display_list::kurbo::{Affine, Rect, Vec2};
use display_list::{DisplayList, OpTag, Rerecorder};
use display_list_tests::{every_op, nested, Trace};

fn rerecord(list: &DisplayList) -> std::sync::Arc<DisplayList> {
    let mut rerecorder = Rerecorder::new();
    list.dispatch(&mut rerecorder).unwrap();
    rerecorder.finish().unwrap()
}

#[test]
fn rerecording_is_exact() {
    for list in [every_op(), nested(3)] {
        let copy = rerecord(&list);
        assert_eq!(*copy, *list);
        assert_eq!(copy.to_string(), list.to_string());
    }
}

#[test]
fn rerecording_a_copy_changes_nothing() {
    let list = every_op();
    let twice = rerecord(&rerecord(&list));
    assert_eq!(twice.storage(), list.storage());
}

#[test]
fn translated_copy() {
    let list = nested(3);
    let mut rerecorder = Rerecorder::new().with_transform(Affine::translate((0.0, 50.0)));
    list.dispatch(&mut rerecorder).unwrap();
    let copy = rerecorder.finish().unwrap();
    assert_eq!(copy.bounds(), list.bounds() + Vec2::new(0.0, 50.0));

    let mut trace = Trace::default();
    copy.dispatch(&mut trace).unwrap();
    assert_eq!(trace.ops()[0], OpTag::Transform2DAffine);
}

#[test]
fn filtered_copy_keeps_state_ops() {
    let list = every_op();
    let mut rerecorder = Rerecorder::new().with_filter(|_| false);
    list.dispatch(&mut rerecorder).unwrap();
    let copy = rerecorder.finish().unwrap();

    let mut trace = Trace::default();
    copy.dispatch(&mut trace).unwrap();
    assert!(trace.ops().iter().all(|tag| !tag.is_draw()));
    assert!(trace.ops().contains(&OpTag::SaveLayer));
    assert!(trace.ops().contains(&OpTag::ClipPath));
    assert_eq!(copy.bounds(), Rect::ZERO);
    assert_eq!(copy.nested_op_count(), 0);
}
