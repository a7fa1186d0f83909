use super::*;

fn entry(owner: u64, key: &'static str, index: usize) -> InteractionHandle {
    InteractionHandle {
        owner: EffectId(owner),
        target: HandleTarget::Entry { key, index },
    }
}

#[test]
fn insert_shifts_entries_at_or_above_index() {
    let mut handles = vec![
        entry(1, "offset_points", 0),
        entry(1, "offset_points", 1),
        entry(1, "offset_points", 2),
        entry(2, "offset_points", 1),
        InteractionHandle {
            owner: EffectId(1),
            target: HandleTarget::Param("origin"),
        },
    ];
    shift_handles(&mut handles, EffectId(1), "offset_points", ArrayEdit::Inserted(1));
    let idx: Vec<_> = handles
        .iter()
        .filter_map(|h| match h.target {
            HandleTarget::Entry { index, .. } if h.owner == EffectId(1) => Some(index),
            _ => None,
        })
        .collect();
    assert_eq!(idx, [0, 2, 3]);
    // Other owners are untouched.
    assert_eq!(handles[3], entry(2, "offset_points", 1));
    assert_eq!(handles.len(), 5);
}

#[test]
fn delete_drops_own_handle_and_shifts_higher() {
    let mut handles = vec![entry(1, "a", 0), entry(1, "a", 1), entry(1, "a", 2), entry(1, "b", 2)];
    shift_handles(&mut handles, EffectId(1), "a", ArrayEdit::Deleted(1));
    assert_eq!(handles, vec![entry(1, "a", 0), entry(1, "a", 1), entry(1, "b", 2)]);
}

#[test]
fn target_key_is_shared_by_both_variants() {
    assert_eq!(HandleTarget::Param("origin").key(), "origin");
    assert_eq!(HandleTarget::Entry { key: "pts", index: 4 }.key(), "pts");
    assert_eq!(Modifiers::default(), Modifiers::NONE);
}

#[test]
fn projection_is_signed() {
    let d = project_onto(Point::ZERO, kurbo::Vec2::new(1.0, 0.0), Point::new(-3.0, 7.0));
    assert_eq!(d, -3.0);
}
