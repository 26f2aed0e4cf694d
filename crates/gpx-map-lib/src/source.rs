//! Track document retrieval
//!
//! A [`TrackSource`] turns a track location into raw GPX bytes. The default source handles
//! inline GPX text, `http(s)://` URLs and, on native targets, local files.

use async_trait::async_trait;

/// Errors raised while retrieving a track document
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("HTTP status {0}")]
    Status(u16),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unsupported track location: {0}")]
    Unsupported(String),
}

/// Asynchronous retrieval of track documents
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
pub trait TrackSource: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// Whether a location is fetched over HTTP(S)
pub(crate) fn is_remote(url: &str) -> bool {
    let lower = url.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Whether a location is a GPX document rather than a reference to one
pub(crate) fn is_inline(url: &str) -> bool {
    url.trim_start().starts_with('<')
}

/// Fetches documents over HTTP(S)
#[derive(Clone, Default)]
pub struct HttpTrackSource {
    client: reqwest::Client,
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl TrackSource for HttpTrackSource {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        Ok(response.bytes().await?.to_vec())
    }
}

/// Reads documents from the local filesystem (plain paths and `file://` URLs)
#[cfg(not(target_arch = "wasm32"))]
#[derive(Clone, Copy, Default)]
pub struct FileTrackSource;

#[cfg(not(target_arch = "wasm32"))]
#[async_trait]
impl TrackSource for FileTrackSource {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let path = url.strip_prefix("file://").unwrap_or(url);
        Ok(tokio::fs::read(path).await?)
    }
}

/// Dispatches on the shape of the location
#[derive(Clone, Default)]
pub struct DefaultTrackSource {
    http: HttpTrackSource,
}

impl DefaultTrackSource {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl TrackSource for DefaultTrackSource {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        if is_inline(url) {
            return Ok(url.trim_start().as_bytes().to_vec());
        }
        if is_remote(url) {
            return self.http.fetch(url).await;
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            FileTrackSource.fetch(url).await
        }
        #[cfg(target_arch = "wasm32")]
        {
            Err(FetchError::Unsupported(url.to_string()))
        }
    }
}
