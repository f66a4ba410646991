#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Request timed out")]
    Timeout,

    #[error(transparent)]
    ReqwestError(#[from] reqwest::Error),

    #[error(transparent)]
    ConfigError(#[from] config::ConfigError),
}

impl From<tokio::time::error::Elapsed> for Error {
    #[inline]
    fn from(_: tokio::time::error::Elapsed) -> Self {
        Error::Timeout
    }
}
