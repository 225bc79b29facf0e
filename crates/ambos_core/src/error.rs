use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("rate limited by upstream service")]
    RateLimited,

    #[error("AI credits exhausted (payment required)")]
    PaymentRequired,

    #[error("upstream error: {0}")]
    Upstream(String),

    #[error("parse failure: {0}")]
    Parse(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("external error: {0}")]
    External(#[from] anyhow::Error),
}

impl Error {
    /// True when the caller should back off and retry later.
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, Error::RateLimited)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limit_is_distinguishable() {
        assert!(Error::RateLimited.is_rate_limit());
        assert!(!Error::Upstream("boom".to_string()).is_rate_limit());
        assert!(!Error::PaymentRequired.is_rate_limit());
    }
}
