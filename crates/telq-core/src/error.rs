use thiserror::Error;

#[derive(Debug, Error)]
pub enum TelqError {
    #[error("invalid duration: {0}")]
    InvalidDuration(String),

    #[error(
        "cannot parse time {0:?}: use a relative duration (e.g. 15m, 1h, 7d) or an ISO 8601 timestamp"
    )]
    UnparseableTime(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("fetch error: {0}")]
    Fetch(String),

    #[error("decode error: {0}")]
    Decode(String),

    #[error("render error: {0}")]
    Render(String),
}

pub type Result<T> = std::result::Result<T, TelqError>;
