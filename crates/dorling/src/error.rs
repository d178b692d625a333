#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Geometry(#[from] dorling_geo::Error),

    #[error(transparent)]
    Layout(#[from] dorling_layout::Error),

    #[error(transparent)]
    Morph(#[from] dorling_morph::Error),

    #[error("invalid cartogram options: {0}")]
    InvalidOptions(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
