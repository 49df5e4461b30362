use thiserror::Error;

#[derive(Error, Debug)]
pub enum WeirError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unrecognized feed format: {0}")]
    FeedFormat(String),

    #[error("XML error: {0}")]
    Xml(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Feed not found: {0}")]
    FeedNotFound(String),

    #[error("Filter not found: {0}")]
    FilterNotFound(i64),

    #[error("{0}")]
    Validation(String),

    #[error("Allow keyword limit of {limit} reached; upgrade required")]
    QuotaExceeded { limit: usize },

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, WeirError>;
