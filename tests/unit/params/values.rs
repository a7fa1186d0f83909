use super::*;

#[test]
fn pairs_accept_comma_and_or_whitespace() {
    assert_eq!(parse_pair("1,2"), Some((1.0, 2.0)));
    assert_eq!(parse_pair(" 1 , 2 "), Some((1.0, 2.0)));
    assert_eq!(parse_pair("1 2"), Some((1.0, 2.0)));
    assert_eq!(parse_pair("1,2,3"), None);
    assert_eq!(parse_pair("1"), None);
    assert_eq!(parse_pair("1,inf"), None);
}

#[test]
fn scalar_constraint_handles_non_finite_and_integers() {
    let range = ScalarRange {
        min: 2.0,
        max: 9.0,
        integer: true,
    };
    let mut v = f64::NAN;
    v.constrain(&range);
    assert_eq!(v, 2.0);
    let mut v = 4.4;
    v.constrain(&range);
    assert_eq!(v, 4.0);
    let mut v = 100.0;
    v.constrain(&ScalarRange::default());
    assert_eq!(v, 100.0);
}

#[test]
fn booleans_are_strict() {
    assert_eq!(bool::parse_text("true"), Some(true));
    assert_eq!(bool::parse_text(" false "), Some(false));
    assert_eq!(bool::parse_text("1"), None);
    assert_eq!(true.to_text(), "true");
}

#[test]
fn path_values_use_absolute_commands() {
    let p = BezPath::parse_text("m 0,0 l 10,0 l 0,10 z").unwrap();
    assert_eq!(p.to_text(), "M 0,0 L 10,0 L 10,10 Z");
    assert_eq!(BezPath::parse_text("").unwrap(), BezPath::new());
}

#[test]
fn text_is_verbatim() {
    let s = String::parse_text(" keep spaces ").unwrap();
    assert_eq!(s.to_text(), " keep spaces ");
}

#[test]
fn points_and_vectors_share_format() {
    assert_eq!(Point::parse_text("3 -4").unwrap(), Point::new(3.0, -4.0));
    assert_eq!(Vec2::new(0.25, 1.0).to_text(), "0.25,1");
}

#[test]
fn scalar_lists_use_bar_separators() {
    assert_eq!(Vec::<f64>::parse_text(""), Some(Vec::new()));
    assert_eq!(Vec::<f64>::parse_text(" 1 | -2.5 |3"), Some(vec![1.0, -2.5, 3.0]));
    assert_eq!(Vec::<f64>::parse_text("1 | x"), None);
    assert_eq!(vec![0.0, 1.5, -1.0].to_text(), "0 | 1.5 | -1");
    assert_eq!(Vec::<f64>::new().to_text(), "");
}
