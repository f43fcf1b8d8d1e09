#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected status {0}: {1}")]
    HttpStatus(reqwest::StatusCode, String),
    #[error("{0}")]
    Other(String),
}
