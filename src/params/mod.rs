//! Typed, persisted effect parameters.
//!
//! Every parameter is one named attribute string on its effect's node. [`Param`] holds a typed
//! value plus its default and constraint; the object-safe [`Parameter`] trait is what effects
//! expose so loading, saving and generic editing never need to know the concrete type.

pub mod point_array;
pub mod values;

use std::fmt;

pub use point_array::{PointArrayParam, PointList};
pub use values::ScalarRange;

/// Value kind of a parameter, mirroring its persisted text format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamKind {
    Scalar,
    Boolean,
    Enum,
    Point,
    Vector,
    Path,
    Text,
    PointArray,
    ScalarArray,
}

/// A value type that can live in a [`Param`].
pub trait ParamValue: Clone + fmt::Debug + PartialEq {
    type Constraint: Clone + fmt::Debug + Default + PartialEq;

    const KIND: ParamKind;

    fn parse_text(text: &str) -> Option<Self>;

    fn to_text(&self) -> String;

    /// Brings the value into its valid range.
    fn constrain(&mut self, _constraint: &Self::Constraint) {}
}

/// Object-safe view of a parameter, keyed by its stable attribute name.
pub trait Parameter: fmt::Debug {
    fn key(&self) -> &'static str;

    fn label(&self) -> &'static str;

    fn kind(&self) -> ParamKind;

    /// Parses `text` into the value. On failure the previous value is kept, a diagnostic is
    /// logged and `false` is returned; the value is range-clamped either way.
    fn read_from_text(&mut self, text: &str) -> bool;

    fn write_to_text(&self) -> String;

    fn set_default(&mut self);

    fn clamp_to_range(&mut self);
}

#[derive(Clone, Debug, PartialEq)]
pub struct Param<V: ParamValue> {
    key: &'static str,
    label: &'static str,
    value: V,
    default: V,
    constraint: V::Constraint,
}

pub type ScalarParam = Param<f64>;
pub type BoolParam = Param<bool>;
pub type EnumParam<E> = Param<E>;
pub type PointParam = Param<kurbo::Point>;
pub type VectorParam = Param<kurbo::Vec2>;
pub type PathParam = Param<kurbo::BezPath>;
pub type TextParam = Param<String>;
pub type ScalarArrayParam = Param<Vec<f64>>;

impl<V: ParamValue> Param<V> {
    pub fn new(key: &'static str, label: &'static str, default: V) -> Self {
        Self {
            key,
            label,
            value: default.clone(),
            default,
            constraint: V::Constraint::default(),
        }
    }

    pub fn with_constraint(mut self, constraint: V::Constraint) -> Self {
        self.constraint = constraint;
        self.default.constrain(&self.constraint);
        self.value.constrain(&self.constraint);
        self
    }

    pub fn get(&self) -> &V {
        &self.value
    }

    pub fn default_value(&self) -> &V {
        &self.default
    }

    pub fn constraint(&self) -> &V::Constraint {
        &self.constraint
    }

    /// Programmatic write; the value is clamped.
    pub fn set(&mut self, value: V) {
        self.value = value;
        self.value.constrain(&self.constraint);
    }

    /// Replaces the default (e.g. with a geometry-derived one) without touching the value.
    pub fn set_default_value(&mut self, default: V) {
        self.default = default;
        self.default.constrain(&self.constraint);
    }

    pub fn is_default(&self) -> bool {
        self.value == self.default
    }
}

impl Param<f64> {
    pub fn scalar(key: &'static str, label: &'static str, default: f64) -> Self {
        Self::new(key, label, default)
    }

    pub fn range(self, min: f64, max: f64) -> Self {
        let integer = self.constraint.integer;
        self.with_constraint(ScalarRange { min, max, integer })
    }

    pub fn integer(self) -> Self {
        let ScalarRange { min, max, .. } = self.constraint;
        self.with_constraint(ScalarRange {
            min,
            max,
            integer: true,
        })
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    /// The value as a count, for integer scalars.
    pub fn count(&self) -> usize {
        if self.value.is_finite() && self.value > 0.0 {
            self.value.round() as usize
        } else {
            0
        }
    }
}

impl Param<bool> {
    pub fn value(&self) -> bool {
        self.value
    }
}

impl<V: ParamValue> Parameter for Param<V> {
    fn key(&self) -> &'static str {
        self.key
    }

    fn label(&self) -> &'static str {
        self.label
    }

    fn kind(&self) -> ParamKind {
        V::KIND
    }

    fn read_from_text(&mut self, text: &str) -> bool {
        let ok = match V::parse_text(text) {
            Some(v) => {
                self.value = v;
                true
            }
            None => {
                tracing::warn!(
                    key = self.key,
                    text,
                    "unparseable parameter text, keeping previous value"
                );
                false
            }
        };
        self.value.constrain(&self.constraint);
        ok
    }

    fn write_to_text(&self) -> String {
        self.value.to_text()
    }

    fn set_default(&mut self) {
        self.value = self.default.clone();
    }

    fn clamp_to_range(&mut self) {
        self.value.constrain(&self.constraint);
    }
}

/// Declares a closed enum with stable persisted keys and display labels, and makes it usable
/// as an [`EnumParam`] value.
///
/// ```
/// livepath::param_enum! {
///     pub enum Cap {
///         Butt => ("butt", "Butt"),
///         Round => ("round", "Rounded"),
///     }
/// }
/// assert_eq!(Cap::from_key("round"), Some(Cap::Round));
/// ```
#[macro_export]
macro_rules! param_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident => ($key:literal, $label:literal)),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        $vis enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn key(self) -> &'static str {
                match self {
                    $($name::$variant => $key),+
                }
            }

            pub fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }

            pub fn from_key(key: &str) -> Option<Self> {
                Self::ALL.iter().copied().find(|v| v.key() == key)
            }
        }

        impl $crate::params::ParamValue for $name {
            type Constraint = ();

            const KIND: $crate::params::ParamKind = $crate::params::ParamKind::Enum;

            fn parse_text(text: &str) -> Option<Self> {
                Self::from_key(text.trim())
            }

            fn to_text(&self) -> String {
                self.key().to_string()
            }
        }
    };
}

#[cfg(test)]
#[path = "../../tests/unit/params/param.rs"]
mod tests;
