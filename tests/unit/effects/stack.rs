use super::*;
use crate::geom::path::subpaths;
use crate::interaction::HandleTarget;
use kurbo::Shape;

fn segment() -> BezPath {
    let mut path = BezPath::new();
    path.move_to((0.0, 0.0));
    path.line_to((10.0, 0.0));
    path
}

fn bbox() -> Rect {
    Rect::new(0.0, 0.0, 10.0, 0.0)
}

fn node(id: &str, kind: &str) -> EffectNode {
    EffectNode::new(id, kind)
}

#[test]
fn empty_stack_passes_the_base_through() {
    let mut stack = EffectStack::new();
    let out = stack.apply(&segment(), bbox());
    assert_eq!(out.path, segment());
    assert!(!out.broken);
    assert!(!stack.needs_recompute());
}

#[test]
fn stages_run_in_order() {
    let mut stack = EffectStack::new();
    let circle = stack.create(EffectKind::CircleWithRadius, &segment(), bbox()).unwrap();
    let copies = stack.create(EffectKind::CopyRotate, &segment(), bbox()).unwrap();
    let out = stack.apply(&segment(), bbox());
    assert!(!out.broken);
    assert!(subpaths(&out.path).len() > 1);

    assert!(stack.move_up(copies));
    assert_eq!(stack.ids(), vec![copies, circle]);
    assert!(stack.needs_recompute());
    let out = stack.apply(&segment(), bbox());
    assert_eq!(subpaths(&out.path).len(), 1);
    assert!(!stack.move_up(copies));
    assert!(stack.move_down(copies));
    assert!(!stack.move_down(copies));
}

#[test]
fn reordering_leaves_parameters_untouched() {
    let mut stack = EffectStack::new();
    let circle = stack.create(EffectKind::CircleWithRadius, &segment(), bbox()).unwrap();
    let copies = stack.create(EffectKind::CopyRotate, &segment(), bbox()).unwrap();
    let effect = stack.effect_mut(copies).unwrap();
    assert!(effect.set_param_text("num_copies", "5"));
    assert!(effect.set_param_text("starting_angle", "12.5"));
    assert!(effect.set_param_text("fuse_paths", "true"));
    stack.apply(&segment(), bbox());

    let by_id = |stack: &EffectStack| {
        let mut nodes = stack.write_nodes();
        nodes.sort_by(|a, b| a.id.cmp(&b.id));
        nodes
    };
    let before = by_id(&stack);

    assert!(stack.move_up(copies));
    stack.apply(&segment(), bbox());
    assert_eq!(by_id(&stack), before);
    assert!(stack.move_down(copies));
    assert!(stack.move_up(copies));
    stack.apply(&segment(), bbox());
    assert_eq!(by_id(&stack), before);
    assert_eq!(stack.ids(), vec![copies, circle]);
    assert_eq!(
        stack.effect(copies).unwrap().param_text("num_copies").as_deref(),
        Some("5")
    );
}

#[test]
fn disabled_effects_are_skipped() {
    let mut stack = EffectStack::new();
    let id = stack.create(EffectKind::CircleWithRadius, &segment(), bbox()).unwrap();
    assert!(stack.set_enabled(id, false));
    assert_eq!(stack.apply(&segment(), bbox()).path, segment());
    assert!(stack.set_enabled(id, true));
    assert_ne!(stack.apply(&segment(), bbox()).path, segment());
    assert!(!stack.set_enabled(EffectId(99), true));
}

#[test]
fn failing_stage_flags_the_stack_and_later_stages_still_run() {
    let mut stack = EffectStack::new();
    let mut dot = BezPath::new();
    dot.move_to((1.0, 1.0));
    dot.line_to((1.0, 1.0));
    stack.create(EffectKind::CircleWithRadius, &dot, bbox()).unwrap();
    stack.create(EffectKind::CopyRotate, &dot, bbox()).unwrap();
    let out = stack.apply(&dot, bbox());
    assert!(out.broken);
    assert!(stack.is_broken());
    assert!(out.path.elements().len() > dot.elements().len());
}

#[test]
fn parameter_edits_mark_the_stack_dirty() {
    let mut stack = EffectStack::new();
    let id = stack.create(EffectKind::CopyRotate, &segment(), bbox()).unwrap();
    stack.apply(&segment(), bbox());
    assert!(!stack.needs_recompute());
    assert!(!stack.needs_recompute_for(&segment(), bbox()));
    let mut moved = segment();
    moved.line_to((10.0, 5.0));
    assert!(stack.needs_recompute_for(&moved, bbox()));

    stack.effect_mut(id).unwrap().set_param_text("num_copies", "2");
    assert!(stack.needs_recompute());
}

#[test]
fn removing_the_last_effect_can_bake_its_output() {
    let mut stack = EffectStack::new();
    let a = stack.create(EffectKind::CircleWithRadius, &segment(), bbox()).unwrap();
    let b = stack.create(EffectKind::CopyRotate, &segment(), bbox()).unwrap();
    assert_eq!(stack.remove(b, true, &segment()).unwrap(), None);
    let baked = stack.remove(a, true, &segment()).unwrap().unwrap();
    assert!((baked.bounding_box().width() - 20.0).abs() < 1e-6);
    assert!(stack.is_empty());
    assert!(stack.remove(a, false, &segment()).is_err());
}

#[test]
fn inserting_an_unattached_or_duplicate_effect_fails() {
    let mut stack = EffectStack::new();
    let fresh = Effect::new(EffectKind::Gears, EffectId(1)).unwrap();
    assert!(stack.push(fresh).is_err());

    let id = stack.create(EffectKind::Gears, &segment(), bbox()).unwrap();
    let mut again = Effect::new(EffectKind::Gears, id).unwrap();
    again.apply_to(&segment(), &EffectContext::new(bbox())).unwrap();
    assert!(stack.insert(0, again).is_err());
}

#[test]
fn unresolved_references_load_as_orphans() {
    let nodes = vec![
        node("path-effect1", "circle_with_radius"),
        node("path-effect2", "spiro"),
    ];
    let refs = vec![
        "#path-effect1".to_string(),
        "#path-effect2".to_string(),
        "#missing".to_string(),
    ];
    let mut stack = EffectStack::load(&refs, &nodes);
    assert_eq!(stack.len(), 3);
    assert_eq!(stack.effects().count(), 1);
    assert_eq!(stack.orphans().count(), 2);
    assert_eq!(stack.references(), refs);

    let out = stack.apply(&segment(), bbox());
    assert!(out.broken);
    assert_ne!(out.path, segment());

    assert!(stack.remove_orphan("#missing"));
    assert!(stack.remove_orphan("#path-effect2"));
    assert!(stack.is_broken());
    assert!(!stack.apply(&segment(), bbox()).broken);
    assert!(!stack.is_broken());
}

#[test]
fn handles_resolve_through_their_owner() {
    let mut base = BezPath::new();
    base.move_to((0.0, 0.0));
    base.line_to((100.0, 0.0));
    let bounds = Rect::new(0.0, 0.0, 100.0, 0.0);
    let mut stack = EffectStack::new();
    let id = stack.create(EffectKind::PowerStroke, &base, bounds).unwrap();
    stack.apply(&base, bounds);

    let mut handles = stack.handles();
    assert_eq!(handles.len(), 3);
    assert!(handles.iter().all(|h| h.owner == id));

    let last = handles[2];
    let before = stack.handle_get(&last).unwrap();
    let index = stack
        .insert_entry(id, "offset_points", Point::new(10.0, 3.0), &mut handles)
        .unwrap();
    assert_eq!(index, 0);
    assert_eq!(handles.len(), 4);
    let HandleTarget::Entry { index: shifted, .. } = handles[2].target else {
        panic!("expected an entry handle");
    };
    assert_eq!(shifted, 3);
    assert_eq!(stack.handle_get(&handles[2]), Some(before));

    assert!(stack.delete_entry(id, "offset_points", 0, &mut handles));
    assert_eq!(handles.len(), 3);
    assert!(stack.handle_set(&handles[0], Point::new(60.0, 5.0), Modifiers::NONE));
    assert!(stack.needs_recompute());
}

#[test]
fn clicking_a_handle_edits_its_owner() {
    let mut base = BezPath::new();
    base.move_to((0.0, 0.0));
    base.line_to((100.0, 100.0));
    base.line_to((100.0, 0.0));
    base.line_to((0.0, 100.0));
    base.close_path();
    let bounds = base.bounding_box();
    let mut stack = EffectStack::new();
    let id = stack.create(EffectKind::Knot, &base, bounds).unwrap();
    let gapped = stack.apply(&base, bounds).path;
    assert_ne!(gapped, base);
    assert!(!stack.needs_recompute());

    let handles = stack.handles();
    assert_eq!(handles.len(), 1);
    assert!(stack.handle_click(&handles[0], Modifiers::NONE));
    assert!(stack.needs_recompute());
    let flipped = stack.apply(&base, bounds).path;
    assert_ne!(flipped, gapped);

    let stray = InteractionHandle {
        owner: EffectId(id.0 + 1),
        target: handles[0].target,
    };
    assert!(!stack.handle_click(&stray, Modifiers::NONE));
}
