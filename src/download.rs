use std::sync::Arc;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;

use crate::scrape::Scraper;
use crate::serial::SerialNumber;
use crate::store::CacheStore;
use crate::transport::Transport;

/// Non-fatal reasons a serial could not be fetched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
pub enum FetchError {
    #[error("certificate URL not found")]
    UrlNotFound,
    #[error("network error: {0}")]
    Network(String),
}

/// Result of fetching one serial.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FetchOutcome {
    /// Cache entry already present, no network access.
    Skipped,
    Downloaded { bytes: u64 },
    Failed(FetchError),
}

/// Skip-if-cached / resolve / stream / publish for a single serial.
pub struct Downloader {
    cache: CacheStore,
    scraper: Scraper,
    transport: Arc<dyn Transport>,
}

impl Downloader {
    pub fn new(cache: CacheStore, scraper: Scraper, transport: Arc<dyn Transport>) -> Self {
        Downloader {
            cache,
            scraper,
            transport,
        }
    }

    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    /// Network and resolution problems come back as `FetchOutcome::Failed`;
    /// only filesystem errors are returned as `Err`.
    pub async fn fetch(&self, serial: SerialNumber) -> Result<FetchOutcome> {
        if self.cache.exists(serial) {
            return Ok(FetchOutcome::Skipped);
        }

        let url = match self.scraper.resolve(serial).await {
            Ok(Some(url)) => url,
            Ok(None) => return Ok(FetchOutcome::Failed(FetchError::UrlNotFound)),
            Err(e) => return Ok(FetchOutcome::Failed(FetchError::Network(e.to_string()))),
        };
        tracing::debug!("{}: resolved {}", serial, url);

        let entry = self.cache.begin(serial)?;
        let mut file = entry.async_file()?;
        let bytes = match self.transport.download(&url, &mut file).await {
            Ok(bytes) => bytes,
            // the temporary file is discarded with `entry`
            Err(e) => return Ok(FetchOutcome::Failed(FetchError::Network(e.to_string()))),
        };
        file.flush().await?;
        drop(file);

        if !entry.commit()? {
            // another writer published this serial first
            return Ok(FetchOutcome::Skipped);
        }
        Ok(FetchOutcome::Downloaded { bytes })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PortalSetting;
    use crate::transport::tests::{result_page, FakeTransport};

    fn downloader(transport: Arc<FakeTransport>, root: &std::path::Path) -> Downloader {
        let scraper = Scraper::new(transport.clone(), &PortalSetting::default()).unwrap();
        Downloader::new(CacheStore::new(root), scraper, transport)
    }

    #[tokio::test]
    async fn downloads_then_skips() {
        let dir = tempfile::tempdir().unwrap();
        let transport = Arc::new(
            FakeTransport::new()
                .with_page(result_page("http://ca.example/cert?id=1&amp;f=der"))
                .with_file("http://ca.example/cert?id=1&f=der", b"DER-BYTES".to_vec()),
        );
        let dl = downloader(transport.clone(), dir.path());
        let sn = SerialNumber::new(100).unwrap();

        let outcome = dl.fetch(sn).await.unwrap();
        assert_eq!(outcome, FetchOutcome::Downloaded { bytes: 9 });
        assert_eq!(
            std::fs::read(dir.path().join("0000").join("00000100.crt")).unwrap(),
            b"DER-BYTES"
        );

        let outcome = dl.fetch(sn).await.unwrap();
        assert_eq!(outcome, FetchOutcome::Skipped);
        assert_eq!(transport.request_count(), 2);
    }

    #[tokio::test]
    async fn missing_link_is_url_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let transport = Arc::new(FakeTransport::new().with_page(b"<p>nic</p>".to_vec()));
        let dl = downloader(transport.clone(), dir.path());

        let outcome = dl.fetch(SerialNumber::new(5).unwrap()).await.unwrap();
        assert_eq!(outcome, FetchOutcome::Failed(FetchError::UrlNotFound));
        assert!(transport.downloaded_urls().is_empty());
        assert!(!dl.cache().exists(SerialNumber::new(5).unwrap()));
    }

    #[tokio::test]
    async fn network_errors_are_reported_not_raised() {
        let dir = tempfile::tempdir().unwrap();
        let transport = Arc::new(FakeTransport::new().failing_posts());
        let dl = downloader(transport, dir.path());

        let outcome = dl.fetch(SerialNumber::new(6).unwrap()).await.unwrap();
        assert!(matches!(outcome, FetchOutcome::Failed(FetchError::Network(_))));
    }

    #[tokio::test]
    async fn interrupted_transfer_leaves_no_entry() {
        let dir = tempfile::tempdir().unwrap();
        let transport = Arc::new(
            FakeTransport::new()
                .with_page(result_page("http://ca.example/7.crt"))
                .with_broken_file("http://ca.example/7.crt", b"half a cert".to_vec()),
        );
        let dl = downloader(transport, dir.path());
        let sn = SerialNumber::new(7).unwrap();

        let outcome = dl.fetch(sn).await.unwrap();
        assert!(matches!(outcome, FetchOutcome::Failed(FetchError::Network(_))));
        assert!(!dl.cache().exists(sn));
        let shard = dir.path().join("0000");
        assert_eq!(std::fs::read_dir(shard).unwrap().count(), 0);
    }
}
