pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("region {id:?} has empty or non-finite geometry")]
    DegenerateGeometry { id: String },

    #[error("the union of all region outlines has no extent; cannot fit a projection")]
    DegenerateExtent,

    #[error("invalid canvas size {width}x{height}; both dimensions must be positive")]
    InvalidSize { width: f64, height: f64 },
}
