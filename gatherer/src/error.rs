/// Failures at the I/O boundary. Every variant ends the run; none of them
/// touches estimator state.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("invalid jobs endpoint URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("request to the jobs endpoint failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("jobs endpoint answered HTTP {status}: {reason}")]
    Status { status: u16, reason: String },

    #[error("jobs endpoint returned invalid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}
