#![forbid(unsafe_code)]

//! Morphs between a region's outline and its circle.
//!
//! Everything here is a pure function of progress `t ∈ [0, 1]`; driving `t` over time is the
//! caller's job.

pub mod circle;
pub mod color;
pub mod error;
pub mod ring;
pub mod shape;
pub mod style;

pub use circle::{approximate_circle, circle_point_count, exact_circle_path};
pub use error::{Error, Result};
pub use ring::RingMorph;
pub use shape::{MorphOptions, Shape, ShapeMorph};
pub use style::{StyleDict, StyleInterpolator, StyleKeyKind, StyleMorph, StyleValue};

/// Progress within this distance of an endpoint yields the exact endpoint path.
pub const ENDPOINT_EPS: f64 = 1e-4;
