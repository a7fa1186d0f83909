//! Measure line: a dimension annotation for the distance between two points of a path.
//!
//! The path itself passes through untouched. The annotation is guide geometry: two helper
//! lines leaving the measured points, the dimension line with its arrowheads, and an
//! extension line when the label does not fit between the points. The label text and its
//! placement are exposed for the host to render.

use std::f64::consts::{FRAC_PI_2, PI, TAU};

use kurbo::{BezPath, Point, Vec2};

use super::{EffectContext, PathEffect};
use crate::foundation::core::EPSILON;
use crate::foundation::error::LpeResult;
use crate::foundation::math::unit_or_zero;
use crate::geom::path::{first_point, last_point, point_at};
use crate::params::{BoolParam, EnumParam, Parameter, ScalarParam, TextParam};

crate::param_enum! {
    pub enum Orientation {
        Horizontal => ("horizontal", "Horizontal"),
        Vertical => ("vertical", "Vertical"),
        Parallel => ("parallel", "Parallel"),
    }
}

const PX_PER_MM: f64 = 96.0 / 25.4;

/// Width of one label character relative to the font size.
const GLYPH_ASPECT: f64 = 0.6;

/// Pixels per unit for the CSS absolute units.
fn px_per_unit(unit: &str) -> Option<f64> {
    Some(match unit {
        "px" => 1.0,
        "mm" => PX_PER_MM,
        "cm" => 10.0 * PX_PER_MM,
        "in" => 96.0,
        "pt" => 96.0 / 72.0,
        "pc" => 16.0,
        _ => return None,
    })
}

/// Wraps into `[0, 2 PI)`.
fn wrap_angle(a: f64) -> f64 {
    let a = a % TAU;
    if a < 0.0 { a + TAU } else { a }
}

fn polar(angle: f64, r: f64) -> Vec2 {
    Vec2::from_angle(angle) * r
}

fn line(a: Point, b: Point) -> BezPath {
    let mut path = BezPath::new();
    path.move_to(a);
    path.line_to(b);
    path
}

/// Closed triangle with its tip at `tip` and its base centred on `base`.
fn arrowhead(tip: Point, base: Point) -> BezPath {
    let along = base - tip;
    let side = Vec2::new(-along.y, along.x) / 6.0;
    let mut path = BezPath::new();
    path.move_to(tip);
    path.line_to(base + side);
    path.line_to(base - side);
    path.close_path();
    path
}

/// Text and placement of the dimension label.
#[derive(Clone, Debug, PartialEq)]
pub struct DimensionLabel {
    pub text: String,
    /// Measured distance in the label's unit.
    pub value: f64,
    pub position: Point,
    /// Rotation in radians; kept within a half turn so the text never reads upside down.
    pub angle: f64,
}

#[derive(Clone, Debug)]
pub struct MeasureLine {
    unit: TextParam,
    orientation: EnumParam<Orientation>,
    curve_linked: ScalarParam,
    precision: ScalarParam,
    position: ScalarParam,
    text_top_bottom: ScalarParam,
    text_right_left: ScalarParam,
    helpline_distance: ScalarParam,
    helpline_overlap: ScalarParam,
    scale: ScalarParam,
    format: TextParam,
    font_size: ScalarParam,
    arrows_outside: BoolParam,
    flip_side: BoolParam,
    line_group_05: BoolParam,
    rotate_anotation: BoolParam,
    hide_back: BoolParam,
    label: Option<DimensionLabel>,
    guides: Vec<BezPath>,
}

impl Default for MeasureLine {
    fn default() -> Self {
        Self::new()
    }
}

impl MeasureLine {
    pub fn new() -> Self {
        Self {
            unit: TextParam::new("unit", "Unit", "px".to_string()),
            orientation: EnumParam::new("orientation", "Orientation", Orientation::Parallel),
            curve_linked: ScalarParam::scalar("curve_linked", "Curve on origin", 1.0)
                .range(0.0, f64::INFINITY)
                .integer(),
            precision: ScalarParam::scalar("precision", "Precision", 2.0)
                .range(0.0, 16.0)
                .integer(),
            position: ScalarParam::scalar("position", "Position", 5.0),
            text_top_bottom: ScalarParam::scalar("text_top_bottom", "Text top/bottom", 0.0),
            text_right_left: ScalarParam::scalar("text_right_left", "Text right/left", 0.0),
            helpline_distance: ScalarParam::scalar("helpline_distance", "Helpline distance", 0.0),
            helpline_overlap: ScalarParam::scalar("helpline_overlap", "Helpline overlap", 2.0),
            scale: ScalarParam::scalar("scale", "Scaling factor", 1.0),
            format: TextParam::new("format", "Format", "{measure}{unit}".to_string()),
            font_size: ScalarParam::scalar("font_size", "Font size", 10.0)
                .range(0.0, f64::INFINITY),
            arrows_outside: BoolParam::new("arrows_outside", "Arrows outside", false),
            flip_side: BoolParam::new("flip_side", "Flip side", false),
            line_group_05: BoolParam::new("line_group_05", "Line Group 0.5", true),
            rotate_anotation: BoolParam::new("rotate_anotation", "Rotate annotation", true),
            hide_back: BoolParam::new("hide_back", "Hide line under label", true),
            label: None,
            guides: Vec::new(),
        }
    }

    /// Label from the last run; `None` when the measured points coincide.
    pub fn label(&self) -> Option<&DimensionLabel> {
        self.label.as_ref()
    }

    /// Measured distance in the label's unit.
    pub fn measurement(&self) -> Option<f64> {
        self.label.as_ref().map(|l| l.value)
    }

    fn format_label(&self, value: f64) -> String {
        let digits = self.precision.count();
        let number = format!("{value:.digits$}");
        self.format
            .get()
            .replacen("{measure}", &number, 1)
            .replacen("{unit}", self.unit.get(), 1)
    }

    /// Arrow length: eight line widths of the DIN line group.
    fn arrow_gap(&self) -> f64 {
        let width_mm = if self.line_group_05.value() { 0.25 } else { 0.35 };
        8.0 * width_mm * PX_PER_MM
    }

    /// The measured pair: the whole path's ends, or the ends of segment `curve_linked`.
    fn endpoints(&self, input: &BezPath) -> Option<(Point, Point)> {
        let linked = self.curve_linked.count();
        if linked == 0 {
            return Some((first_point(input)?, last_point(input)?));
        }
        let t = linked as f64;
        Some((point_at(input, t - 1.0)?, point_at(input, t)?))
    }

    fn measure(&mut self, input: &BezPath) {
        self.label = None;
        self.guides.clear();
        let Some((mut start, mut end)) = self.endpoints(input) else {
            return;
        };
        let (mut hstart, mut hend) = (start, end);
        let mut remove = (hstart - hend).hypot() <= EPSILON;
        let flip = self.flip_side.value();
        match self.orientation.get() {
            Orientation::Vertical => {
                let x = if flip {
                    hstart.x.min(hend.x)
                } else {
                    hstart.x.max(hend.x)
                };
                hstart.x = x;
                hend.x = x;
                if hstart.y > hend.y {
                    std::mem::swap(&mut hstart, &mut hend);
                    std::mem::swap(&mut start, &mut end);
                }
                remove |= (hstart.y - hend.y).abs() <= EPSILON;
            }
            Orientation::Horizontal => {
                let y = if flip {
                    hstart.y.min(hend.y)
                } else {
                    hstart.y.max(hend.y)
                };
                hstart.y = y;
                hend.y = y;
                if hstart.x < hend.x {
                    std::mem::swap(&mut hstart, &mut hend);
                    std::mem::swap(&mut start, &mut end);
                }
                remove |= (hstart.x - hend.x).abs() <= EPSILON;
            }
            Orientation::Parallel => {}
        }
        if remove {
            tracing::trace!("measured points coincide");
            return;
        }

        let length = (hend - hstart).hypot() * self.scale.value();
        let mut angle = (hend - hstart).atan2();
        if flip {
            angle = wrap_angle(angle + PI);
        }
        angle = wrap_angle(angle);
        let angle_cross = wrap_angle(angle + FRAC_PI_2);
        let upside_down = (FRAC_PI_2..3.0 * FRAC_PI_2).contains(&angle);

        let font_size = self.font_size.value();
        let position = self.position.value();
        let top_bottom = self.text_top_bottom.value();
        let right_left = self.text_right_left.value();
        let lift = if upside_down {
            (position - top_bottom) + font_size / 2.5
        } else {
            (position + top_bottom) - font_size / 2.5
        };
        let label_pos = hstart.midpoint(hend) - polar(angle_cross, lift) - polar(angle, right_left);

        let unit = self.unit.get();
        let value = match px_per_unit(unit) {
            Some(k) => length / k,
            None => {
                tracing::warn!(unit = %unit, "unknown unit, measuring in px");
                length
            }
        };
        let text = self.format_label(value);
        let label_width = text.chars().count() as f64 * font_size * GLYPH_ASPECT;
        let label_angle = match (self.rotate_anotation.value(), upside_down) {
            (false, _) => 0.0,
            (true, true) => wrap_angle(angle + PI),
            (true, false) => angle,
        };
        self.label = Some(DimensionLabel {
            text,
            value,
            position: label_pos,
            angle: label_angle,
        });

        // Extension line carrying the label past the end it was pushed towards.
        let half_span = (end - start).hypot() / 2.0;
        let overflow = label_width / 2.0 + right_left.abs() > half_span;
        let hide_under_label = self.hide_back.value() && top_bottom.abs() < font_size / 1.5;
        if overflow {
            let towards_start = (right_left < 0.0 && flip) || (right_left > 0.0 && !flip);
            let anchor = if towards_start { start } else { end };
            let from = anchor - polar(angle_cross, position);
            let reach = if hide_under_label {
                right_left.abs() - label_width / 1.9 - half_span
            } else {
                label_width / 2.0 + right_left.abs() - half_span
            };
            let to = if right_left > 0.0 {
                from - polar(angle, reach)
            } else {
                from + polar(angle, reach)
            };
            self.guides.push(line(from, to));
        }

        let mut gap = self.arrow_gap();
        if flip {
            gap = -gap;
        }
        let hstart = hstart - polar(angle_cross, position);
        let hend = hend - polar(angle_cross, position);
        self.guides.push(self.helper_line(start, hstart));
        self.guides.push(self.helper_line(end, hend));

        let dir = polar(angle, 1.0);
        let (line_start, line_end) = if self.arrows_outside.value() {
            self.guides.push(arrowhead(hstart, hstart - dir * gap));
            self.guides.push(arrowhead(hend, hend + dir * gap));
            (hstart, hend)
        } else {
            let (a, b) = (hstart + dir * gap, hend - dir * gap);
            self.guides.push(arrowhead(hstart, a));
            self.guides.push(arrowhead(hend, b));
            (a, b)
        };

        let span = (line_end - line_start).hypot();
        if hide_under_label && !overflow {
            if span < label_width {
                return;
            }
            let k = if flip {
                span / 2.0 + gap - label_width / 2.0
            } else {
                span / 2.0 - gap - label_width / 2.0
            };
            let back = unit_or_zero(line_start - line_end);
            self.guides.push(line(line_start, line_start - back * k));
            self.guides.push(line(line_end + back * k, line_end));
        } else {
            self.guides.push(line(line_start, line_end));
        }
    }

    /// Helper line from a measured point towards the dimension line, detached by
    /// `helpline_distance` and running past it by `helpline_overlap`.
    fn helper_line(&self, from: Point, to: Point) -> BezPath {
        let dir = unit_or_zero(to - from);
        line(
            from + dir * self.helpline_distance.value(),
            to + dir * self.helpline_overlap.value(),
        )
    }
}

impl PathEffect for MeasureLine {
    fn params(&self) -> Vec<&dyn Parameter> {
        vec![
            &self.unit,
            &self.orientation,
            &self.curve_linked,
            &self.precision,
            &self.position,
            &self.text_top_bottom,
            &self.text_right_left,
            &self.helpline_distance,
            &self.helpline_overlap,
            &self.scale,
            &self.format,
            &self.font_size,
            &self.arrows_outside,
            &self.flip_side,
            &self.line_group_05,
            &self.rotate_anotation,
            &self.hide_back,
        ]
    }

    fn params_mut(&mut self) -> Vec<&mut dyn Parameter> {
        vec![
            &mut self.unit,
            &mut self.orientation,
            &mut self.curve_linked,
            &mut self.precision,
            &mut self.position,
            &mut self.text_top_bottom,
            &mut self.text_right_left,
            &mut self.helpline_distance,
            &mut self.helpline_overlap,
            &mut self.scale,
            &mut self.format,
            &mut self.font_size,
            &mut self.arrows_outside,
            &mut self.flip_side,
            &mut self.line_group_05,
            &mut self.rotate_anotation,
            &mut self.hide_back,
        ]
    }

    fn before_effect(&mut self, input: &BezPath, _ctx: &EffectContext) {
        if self.format.get().is_empty() {
            self.format.set("{measure}{unit}".to_string());
        }
        self.measure(input);
    }

    fn do_effect_path(&mut self, input: &BezPath, _ctx: &EffectContext) -> LpeResult<BezPath> {
        Ok(input.clone())
    }

    fn indicators(&self) -> Vec<BezPath> {
        self.guides.clone()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/measure_line.rs"]
mod tests;
