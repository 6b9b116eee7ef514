use std::path::Path;
use std::time::Duration;

use billshield_core::FetchConfig;
use thiserror::Error;

use crate::types::RawDocument;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("HTTP status {status} for {url}")]
    Status { url: String, status: u16 },
}

/// Loads image bytes from a local path or an `http(s)://` URL.
///
/// Build one per process and share it; the inner client pools connections.
#[derive(Clone)]
pub struct ImageFetcher {
    client: reqwest::Client,
}

impl ImageFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client })
    }

    pub async fn fetch(&self, reference: &str) -> Result<RawDocument, FetchError> {
        let bytes = if is_url(reference) {
            self.fetch_url(reference).await?
        } else {
            tokio::fs::read(Path::new(reference)).await?
        };
        Ok(RawDocument::new(reference, bytes))
    }

    async fn fetch_url(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let resp = self.client.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status { url: url.to_string(), status: status.as_u16() });
        }
        Ok(resp.bytes().await?.to_vec())
    }
}

fn is_url(reference: &str) -> bool {
    let lower = reference.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_detection() {
        assert!(is_url("https://i.redd.it/bill.jpg"));
        assert!(is_url("HTTP://example.com/a.png"));
        assert!(!is_url("/tmp/http-bill.png"));
        assert!(!is_url("bills/scan.png"));
    }

    #[tokio::test]
    async fn fetch_local_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.png");
        std::fs::write(&path, b"bytes").unwrap();

        let fetcher = ImageFetcher::new(&FetchConfig::default()).unwrap();
        let doc = fetcher.fetch(path.to_str().unwrap()).await.unwrap();
        assert_eq!(doc.bytes, b"bytes");
        assert_eq!(doc.source, path.to_str().unwrap());
    }

    #[tokio::test]
    async fn missing_local_file_is_io_error() {
        let fetcher = ImageFetcher::new(&FetchConfig::default()).unwrap();
        let err = fetcher.fetch("/nonexistent/scan.png").await.unwrap_err();
        assert!(matches!(err, FetchError::Io(_)));
    }
}
