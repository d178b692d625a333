#![forbid(unsafe_code)]

//! Headless Dorling cartograms.
//!
//! A [`Cartogram`] takes region outlines, a data table and a size accessor, and produces:
//! - a settled circle layout ([`SettledLayout`]), cached per distinct layout input set
//! - drawable regions on top of it ([`LayoutSnapshot`]), rebuilt without rerunning the layout
//!   when only styles, padding or labels change
//! - SVG path strings for outlines, circles and every frame of the morph between them
//! - Voronoi hit regions for pointer interaction
//!
//! Rendering is left to the host. Drive transitions by calling [`Cartogram::advance`] from the
//! host's frame loop and drawing the returned [`Frame`].

pub mod cache;
pub mod cartogram;
pub mod data;
pub mod error;
pub mod options;
pub mod region;
pub mod settled;
pub mod snapshot;
pub mod styles;
pub mod transition;

pub use dorling_geo as geo;
pub use dorling_layout as layout;
pub use dorling_morph as morph;

pub use cache::{LayoutCache, LayoutInputs, LayoutKey, SnapshotKey};
pub use cartogram::Cartogram;
pub use data::{DEFAULT_RADIUS, DataRow, MergedRegion, SizeBy, UnresolvedDataJoinWarning};
pub use dorling_geo::{Geometry, MapFeature, NeighborRef, Point, Projection, Size, point, size};
pub use dorling_morph::{StyleDict, StyleValue};
pub use error::{Error, Result};
pub use options::{CartogramOptions, Easing, LabelBy, TransitionOptions};
pub use region::Region;
pub use settled::SettledLayout;
pub use snapshot::LayoutSnapshot;
pub use styles::{StyleAccessors, basic_style};
pub use transition::{
    Advance, CancelToken, DriverState, FeatureFrame, Frame, Mode, TransitionDriver,
    TransitionStart,
};
