use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("reference group is empty after matching against loaded records")]
    EmptyReferenceGroup,

    #[error("unknown feature: {0}")]
    UnknownFeature(String),

    #[error("unknown dimension: {0}")]
    UnknownDimension(String),

    #[error("invalid projection dimension: expected 2 or 3, got {0}")]
    InvalidProjectionDim(usize),

    #[error("projection requires at least {min} rows, got {actual}")]
    TooFewRows { min: usize, actual: usize },

    #[error("projection returned {actual} coordinate rows for {expected} input rows")]
    ProjectionShape { expected: usize, actual: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
