#![forbid(unsafe_code)]

//! Region geometry for Dorling cartograms (headless).
//!
//! This crate turns raw region outlines into drawing-plane data:
//! - one projection fitted to the union of all outlines ([`FittedProjection`])
//! - per-region outline path, centroid and adjacency ([`preprocess`])
//! - Voronoi hit regions over circle centers ([`HitRegions`])

pub mod error;
pub mod feature;
pub mod geom;
pub mod path;
pub mod preprocess;
pub mod projection;
pub mod ring;
pub mod voronoi;

pub use error::{Error, Result};
pub use feature::{Geometry, MapFeature, NeighborRef};
pub use geom::{Point, Rect, Size, Vector, point, size, vector};
pub use path::{PathWriter, fmt_path};
pub use preprocess::{Edge, PreparedMap, PreparedRegion, preprocess};
pub use projection::{FittedProjection, Projection};
pub use ring::{Polygon, Ring};
pub use voronoi::HitRegions;
