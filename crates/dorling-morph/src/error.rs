pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error(
        "cannot morph a {from_parts}-part shape into a {to_parts}-part shape; part counts must match or one side must be a single ring"
    )]
    MorphTopologyMismatch { from_parts: usize, to_parts: usize },
}
