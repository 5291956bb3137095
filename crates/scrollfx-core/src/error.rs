use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Rejected selector configuration. Raised only at engine construction.
    #[error("Invalid effect configuration: {0}")]
    Configuration(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
