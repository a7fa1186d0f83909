//! Text codecs for the built-in parameter value types.

use kurbo::{BezPath, Point, Vec2};

use super::{ParamKind, ParamValue};
use crate::geom::path::{format_number, parse_path_text, write_path_text};

/// Clamp range for scalar parameters; `integer` rounds to the nearest whole number first.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScalarRange {
    pub min: f64,
    pub max: f64,
    pub integer: bool,
}

impl Default for ScalarRange {
    fn default() -> Self {
        Self {
            min: f64::NEG_INFINITY,
            max: f64::INFINITY,
            integer: false,
        }
    }
}

pub(crate) fn parse_number(text: &str) -> Option<f64> {
    let v: f64 = text.trim().parse().ok()?;
    v.is_finite().then_some(v)
}

/// Two numbers separated by a comma and/or whitespace.
pub(crate) fn parse_pair(text: &str) -> Option<(f64, f64)> {
    let mut parts = text
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty());
    let x = parse_number(parts.next()?)?;
    let y = parse_number(parts.next()?)?;
    if parts.next().is_some() {
        return None;
    }
    Some((x, y))
}

pub(crate) fn write_pair(x: f64, y: f64) -> String {
    format!("{},{}", format_number(x), format_number(y))
}

impl ParamValue for f64 {
    type Constraint = ScalarRange;

    const KIND: ParamKind = ParamKind::Scalar;

    fn parse_text(text: &str) -> Option<Self> {
        parse_number(text)
    }

    fn to_text(&self) -> String {
        format_number(*self)
    }

    fn constrain(&mut self, c: &ScalarRange) {
        if !self.is_finite() {
            *self = if c.min.is_finite() { c.min } else { 0.0 };
        }
        if c.integer {
            *self = self.round();
        }
        *self = self.clamp(c.min, c.max);
    }
}

impl ParamValue for bool {
    type Constraint = ();

    const KIND: ParamKind = ParamKind::Boolean;

    fn parse_text(text: &str) -> Option<Self> {
        match text.trim() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        }
    }

    fn to_text(&self) -> String {
        if *self { "true" } else { "false" }.to_string()
    }
}

impl ParamValue for Point {
    type Constraint = ();

    const KIND: ParamKind = ParamKind::Point;

    fn parse_text(text: &str) -> Option<Self> {
        parse_pair(text).map(|(x, y)| Point::new(x, y))
    }

    fn to_text(&self) -> String {
        write_pair(self.x, self.y)
    }
}

impl ParamValue for Vec2 {
    type Constraint = ();

    const KIND: ParamKind = ParamKind::Vector;

    fn parse_text(text: &str) -> Option<Self> {
        parse_pair(text).map(|(x, y)| Vec2::new(x, y))
    }

    fn to_text(&self) -> String {
        write_pair(self.x, self.y)
    }
}

impl ParamValue for BezPath {
    type Constraint = ();

    const KIND: ParamKind = ParamKind::Path;

    fn parse_text(text: &str) -> Option<Self> {
        parse_path_text(text)
    }

    fn to_text(&self) -> String {
        write_path_text(self)
    }
}

impl ParamValue for String {
    type Constraint = ();

    const KIND: ParamKind = ParamKind::Text;

    fn parse_text(text: &str) -> Option<Self> {
        Some(text.to_string())
    }

    fn to_text(&self) -> String {
        self.clone()
    }
}

/// `a | b | c`; an empty text is the empty list.
impl ParamValue for Vec<f64> {
    type Constraint = ();

    const KIND: ParamKind = ParamKind::ScalarArray;

    fn parse_text(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return Some(Vec::new());
        }
        text.split('|').map(parse_number).collect()
    }

    fn to_text(&self) -> String {
        self.iter()
            .map(|v| format_number(*v))
            .collect::<Vec<_>>()
            .join(" | ")
    }
}

#[cfg(test)]
#[path = "../../tests/unit/params/values.rs"]
mod tests;
