pub mod convert;
pub mod curve;
pub mod intersect;
pub mod path;
pub mod piecewise;
pub mod poly;
