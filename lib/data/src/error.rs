use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("missing required column {column:?} in {table} table")]
    MissingColumn {
        table: &'static str,
        column: &'static str,
    },

    #[error("failed to read {table} table: {source}")]
    Csv {
        table: &'static str,
        #[source]
        source: csv::Error,
    },

    #[error("reference ZIP code {0:?} is not a 5-digit code")]
    MalformedReferenceZip(String),

    #[error("reference group list is empty")]
    EmptyReferenceList,

    #[error("failed to parse reference group file: {0}")]
    ReferenceFormat(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
