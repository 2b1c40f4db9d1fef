use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, REFERER};
use std::time::Duration;
use tokio::time::timeout;

/// HTTP client for catalog requests. One attempt per call; retries live in the retriever.
#[derive(Debug)]
pub struct HttpClient {
    client: reqwest::Client,
    timeout_duration: Duration,
}

impl HttpClient {
    /// Create a client that follows redirects and keeps cookies between requests
    pub fn new(
        user_agent: String,
        timeout_duration: Duration,
        max_redirects: usize,
    ) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(&user_agent)
            .timeout(timeout_duration)
            .connect_timeout(timeout_duration.min(Duration::from_secs(10)))
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::limited(max_redirects))
            .build()
            .map_err(|e| FetchError::ClientBuild(e.to_string()))?;

        Ok(Self {
            client,
            timeout_duration,
        })
    }

    /// Issue a single GET, presenting `referer`, and read the whole body.
    pub async fn fetch_once(&self, url: &str, referer: &str) -> Result<FetchResult, FetchError> {
        let response = timeout(
            self.timeout_duration,
            self.client
                .get(url)
                .header(
                    ACCEPT,
                    "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
                )
                .header(ACCEPT_LANGUAGE, "en-US,en;q=0.5")
                .header(REFERER, referer)
                .send(),
        )
        .await
        .map_err(|_| FetchError::Timeout)?
        .map_err(Self::classify_error)?;

        let status_code = response.status().as_u16();
        let final_url = response.url().to_string();

        let body = timeout(self.timeout_duration, response.bytes())
            .await
            .map_err(|_| FetchError::Timeout)?
            .map_err(|e| FetchError::BodyError(e.to_string()))?;

        Ok(FetchResult {
            final_url,
            status_code,
            body: body.to_vec(),
        })
    }

    /// Classify reqwest errors into FetchError variants for the logs
    fn classify_error(error: reqwest::Error) -> FetchError {
        if error.is_timeout() {
            return FetchError::Timeout;
        }
        if error.is_builder() {
            return FetchError::InvalidUrl(error.to_string());
        }

        let error_msg = format!("{:?}", error).to_lowercase();

        if error_msg.contains("connection refused") {
            return FetchError::ConnectionRefused;
        }

        if error_msg.contains("dns") || error_msg.contains("name resolution") {
            return FetchError::DnsError;
        }

        if error_msg.contains("ssl") || error_msg.contains("tls") || error_msg.contains("certificate") {
            return FetchError::SslError;
        }

        FetchError::NetworkError(error.to_string())
    }
}

/// Result of a successful HTTP fetch
#[derive(Debug, Clone)]
pub struct FetchResult {
    /// URL after redirects were followed
    pub final_url: String,
    pub status_code: u16,
    pub body: Vec<u8>,
}

impl FetchResult {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    /// Body decoded as UTF-8, replacing invalid sequences
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Transport-level failures of a single request attempt
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Connection refused - server not accepting connections")]
    ConnectionRefused,

    #[error("DNS resolution failed")]
    DnsError,

    #[error("SSL/TLS error - certificate or encryption issue")]
    SslError,

    #[error("Request timeout")]
    Timeout,

    #[error("Invalid request URL: {0}")]
    InvalidUrl(String),

    #[error("Failed to read response body: {0}")]
    BodyError(String),

    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),
}
