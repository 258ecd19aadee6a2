use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("network request failed for {0}")]
    NetworkRequest(String, #[source] reqwest::Error),

    #[error("HTTP request failed for {url} with status {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
        #[source]
        source: reqwest::Error,
    },

    #[error("download or decompression failed for {0}")]
    DownloadIo(String, #[source] std::io::Error),

    #[error("malformed payload from {url}: {message}")]
    Malformed { url: String, message: String },
}

impl ProviderError {
    /// True for a clean upstream 404, i.e. "this station/year simply does
    /// not exist there" rather than a transport or parse failure.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ProviderError::HttpStatus { status, .. } if *status == reqwest::StatusCode::NOT_FOUND
        )
    }
}
