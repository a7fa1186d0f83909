use super::*;
use kurbo::{Point, Rect};

fn ctx() -> EffectContext {
    EffectContext::new(Rect::new(0.0, 0.0, 10.0, 10.0))
}

#[test]
fn circle_passes_through_last_node() {
    let mut path = BezPath::new();
    path.move_to((5.0, 5.0));
    path.line_to((8.0, 9.0));
    let out = CircleWithRadius::new().do_effect_path(&path, &ctx()).unwrap();
    let bounds = out.bounding_box();
    assert!((bounds.width() - 10.0).abs() < 1e-6);
    assert!((bounds.center() - Point::new(5.0, 5.0)).hypot() < 1e-6);
}

#[test]
fn coincident_nodes_are_degenerate() {
    let mut path = BezPath::new();
    path.move_to((1.0, 1.0));
    path.line_to((1.0, 1.0));
    let err = CircleWithRadius::new().do_effect_path(&path, &ctx()).unwrap_err();
    assert!(err.is_degenerate());
    assert!(CircleWithRadius::new().do_effect_path(&BezPath::new(), &ctx()).is_err());
}
