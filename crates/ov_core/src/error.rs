use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid dataset identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Dataset not found: {0}")]
    NotFound(String),

    #[error("Failed to parse dataset: {0}")]
    ParseFailure(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Errors the viewer reports as "could not load this dataset" rather
    /// than as a server fault. Read errors on an existing file count too.
    pub fn is_load_failure(&self) -> bool {
        matches!(
            self,
            Error::InvalidIdentifier(_)
                | Error::NotFound(_)
                | Error::ParseFailure(_)
                | Error::Io(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
