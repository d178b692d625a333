#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("layout edge {from}-{to} references a missing node ({len} nodes)")]
    MissingEndpoint { from: usize, to: usize, len: usize },

    #[error("node {index} has invalid radius {radius}; radii must be finite and >= 0")]
    InvalidRadius { index: usize, radius: f64 },

    #[error("circles still overlap by {overlap} after the overlap pass")]
    ResidualOverlap { overlap: f64 },

    #[error(transparent)]
    Geometry(#[from] dorling_geo::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
