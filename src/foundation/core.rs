pub use kurbo::{Affine, BezPath, Line, PathEl, PathSeg, Point, Rect, Vec2};

/// Positional tolerance used when converting piecewise curves back to paths.
pub const LPE_CONVERSION_TOLERANCE: f64 = 0.01;

/// Generic near-zero threshold for lengths, widths and coincident points.
pub const EPSILON: f64 = 1e-6;

/// Two cuts closer than this (relative to the domain extent) collapse into one.
pub const CUT_EPSILON: f64 = 1e-9;

#[inline]
pub fn are_near(a: f64, b: f64, eps: f64) -> bool {
    (a - b).abs() <= eps
}

#[inline]
pub fn points_near(a: Point, b: Point, eps: f64) -> bool {
    (a - b).hypot() <= eps
}

/// Closed parameter interval `[min, max]`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Interval {
    pub min: f64,
    pub max: f64,
}

impl Interval {
    pub fn new(a: f64, b: f64) -> Self {
        if a <= b {
            Self { min: a, max: b }
        } else {
            Self { min: b, max: a }
        }
    }

    pub fn extent(self) -> f64 {
        self.max - self.min
    }

    pub fn is_degenerate(self) -> bool {
        self.extent() <= 0.0
    }

    pub fn contains(self, t: f64) -> bool {
        self.min <= t && t <= self.max
    }

    pub fn clamp(self, t: f64) -> f64 {
        t.clamp(self.min, self.max)
    }

    pub fn value_at(self, fraction: f64) -> f64 {
        self.min + self.extent() * fraction
    }
}

/// Engine-wide knobs that are not persisted on effect nodes.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EngineSettings {
    /// Maximum deviation when converting piecewise curves back to Bezier paths.
    pub tolerance: f64,
    /// Stroke width of the host item, for effects that size output relative to it.
    #[serde(default = "default_stroke_width")]
    pub stroke_width: f64,
}

fn default_stroke_width() -> f64 {
    1.0
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            tolerance: LPE_CONVERSION_TOLERANCE,
            stroke_width: default_stroke_width(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
