use reqwest::StatusCode;
use thiserror::Error;

/// Failures of a single catalog call. Any of them aborts the page being built.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("no TMDB token configured")]
    MissingCredential,

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("TMDB returned {status} for {url}: {body}")]
    Status {
        url: String,
        status: StatusCode,
        body: String,
    },

    #[error("failed to decode TMDB response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

pub type CatalogResult<T> = std::result::Result<T, CatalogError>;
