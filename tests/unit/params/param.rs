use super::*;
use kurbo::Point;

crate::param_enum! {
    enum Shade {
        Light => ("light", "Light"),
        Dark => ("dark", "Dark shade"),
    }
}

#[test]
fn scalar_read_clamps_and_keeps_previous_on_failure() {
    let mut p = ScalarParam::scalar("width", "Width", 1.0).range(0.0, 10.0);
    assert!(p.read_from_text("25"));
    assert_eq!(p.value(), 10.0);
    assert!(!p.read_from_text("wide"));
    assert_eq!(p.value(), 10.0);
    assert!(!p.read_from_text("NaN"));
    assert_eq!(p.value(), 10.0);
    p.set_default();
    assert_eq!(p.value(), 1.0);
    assert!(p.is_default());
}

#[test]
fn integer_scalars_round_and_write_without_fraction() {
    let mut p = ScalarParam::scalar("teeth", "Teeth", 10.0).range(3.0, 100.0).integer();
    assert!(p.read_from_text("7.6"));
    assert_eq!(p.write_to_text(), "8");
    assert_eq!(p.count(), 8);
    assert_eq!(p.kind(), ParamKind::Scalar);
}

#[test]
fn default_is_constrained_with_the_range() {
    let p = ScalarParam::scalar("x", "X", -4.0).range(0.0, 1.0);
    assert_eq!(*p.default_value(), 0.0);
    assert_eq!(p.value(), 0.0);
}

#[test]
fn enum_round_trip_by_key() {
    let mut p = EnumParam::new("shade", "Shade", Shade::Light);
    assert_eq!(p.kind(), ParamKind::Enum);
    assert!(p.read_from_text("dark"));
    assert_eq!(*p.get(), Shade::Dark);
    assert_eq!(p.write_to_text(), "dark");
    assert!(!p.read_from_text("Dark shade"));
    assert_eq!(Shade::ALL.len(), 2);
    assert_eq!(Shade::Dark.label(), "Dark shade");
}

#[test]
fn trait_objects_expose_key_and_kind() {
    let point = PointParam::new("origin", "Origin", Point::new(1.0, 2.0));
    let flag = BoolParam::new("fuse", "Fuse", false);
    let params: Vec<&dyn Parameter> = vec![&point, &flag];
    let keys: Vec<&str> = params.iter().map(|p| p.key()).collect();
    assert_eq!(keys, ["origin", "fuse"]);
    assert_eq!(params[0].write_to_text(), "1,2");
    assert_eq!(params[1].kind(), ParamKind::Boolean);
}

#[test]
fn round_trip_holds_for_canonical_text() {
    let mut s = ScalarParam::scalar("s", "S", 0.0);
    let mut b = BoolParam::new("b", "B", false);
    let mut v = VectorParam::new("v", "V", kurbo::Vec2::ZERO);
    for text in ["0.1", "-3", "12345.678", "0.0000001"] {
        assert!(s.read_from_text(text));
        assert_eq!(s.write_to_text(), text);
    }
    for text in ["true", "false"] {
        assert!(b.read_from_text(text));
        assert_eq!(b.write_to_text(), text);
    }
    assert!(v.read_from_text("0.5,-2"));
    assert_eq!(v.write_to_text(), "0.5,-2");
}
