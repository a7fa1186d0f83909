use super::*;

fn square() -> BezPath {
    let mut p = BezPath::new();
    p.move_to((0.0, 0.0));
    p.line_to((10.0, 0.0));
    p.line_to((10.0, 10.0));
    p.line_to((0.0, 10.0));
    p.close_path();
    p
}

#[test]
fn closed_subpath_materializes_closing_line() {
    let subs = subpaths(&square());
    assert_eq!(subs.len(), 1);
    assert!(subs[0].closed);
    assert_eq!(subs[0].segments.len(), 4);
    assert_eq!(subs[0].nodes().len(), 4);
    assert_eq!(node_count(&square()), 4);
}

#[test]
fn subpath_round_trip_keeps_elements() {
    let path = square();
    let back = from_subpaths(&subpaths(&path));
    assert_eq!(back.elements(), path.elements());
}

#[test]
fn open_paths_and_lone_moves() {
    let mut p = BezPath::new();
    p.move_to((5.0, 5.0));
    p.move_to((0.0, 0.0));
    p.curve_to((1.0, 1.0), (2.0, 1.0), (3.0, 0.0));
    let subs = subpaths(&p);
    assert_eq!(subs.len(), 1);
    assert!(!subs[0].closed);
    assert_eq!(subs[0].end(), Point::new(3.0, 0.0));
    let r = subs[0].reversed();
    assert_eq!(r.start, Point::new(3.0, 0.0));
    assert_eq!(r.end(), Point::new(0.0, 0.0));
}

#[test]
fn text_round_trip_is_exact() {
    let mut p = BezPath::new();
    p.move_to((0.5, -1.25));
    p.line_to((10.0, 0.1));
    p.curve_to((1.0 / 3.0, 2.0), (3.0, 4.0), (5.0, 6.0));
    p.close_path();
    let text = write_path_text(&p);
    assert_eq!(
        text,
        "M 0.5,-1.25 L 10,0.1 C 0.3333333333333333,2 3,4 5,6 Z"
    );
    let back = parse_path_text(&text).unwrap();
    assert_eq!(write_path_text(&back), text);
}

#[test]
fn quads_are_written_as_cubics() {
    let mut p = BezPath::new();
    p.move_to((0.0, 0.0));
    p.quad_to((3.0, 3.0), (6.0, 0.0));
    assert_eq!(write_path_text(&p), "M 0,0 C 2,2 4,2 6,0");
}

#[test]
fn empty_and_invalid_text() {
    assert!(parse_path_text("").unwrap().elements().is_empty());
    assert!(parse_path_text("  ").unwrap().elements().is_empty());
    assert!(parse_path_text("M 0,0 L nonsense").is_none());
}

#[test]
fn measurement_helpers() {
    let p = square();
    assert_eq!(path_bounds(&p), Some(Rect::new(0.0, 0.0, 10.0, 10.0)));
    assert_eq!(path_bounds(&BezPath::new()), None);
    assert!((arc_length(&p) - 40.0).abs() < 1e-9);
    assert_eq!(point_at(&p, 1.5), Some(Point::new(10.0, 5.0)));
    assert_eq!(tangent_at(&p, 0.5), Some(Vec2::new(10.0, 0.0)));
    assert_eq!(first_point(&p), Some(Point::ZERO));
    assert_eq!(last_point(&p), Some(Point::ZERO));
}

#[test]
fn numbers_format_without_exponent_or_trailing_zero() {
    assert_eq!(format_number(3.0), "3");
    assert_eq!(format_number(-0.0), "0");
    assert_eq!(format_number(0.1), "0.1");
    assert_eq!(format_number(1e-7), "0.0000001");
}
