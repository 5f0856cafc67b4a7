use anyhow::Result;
use async_trait::async_trait;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::config::PortalSetting;

/// Network operations needed to harvest certificates.
#[async_trait]
pub trait Transport: Send + Sync {
    /// POST an urlencoded form and return the raw response body.
    async fn post_form(&self, url: &str, fields: &[(&str, &str)]) -> Result<Vec<u8>>;

    /// GET `url` and stream its body into `sink`. Returns the number of bytes written.
    async fn download(&self, url: &str, sink: &mut (dyn AsyncWrite + Unpin + Send)) -> Result<u64>;
}

/// `reqwest` backed transport.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(setting: &PortalSetting) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(setting.user_agent.clone());
        if let Some(timeout) = setting.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| anyhow::anyhow!("failed to create HTTP client: {}", e))?;
        Ok(HttpTransport { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post_form(&self, url: &str, fields: &[(&str, &str)]) -> Result<Vec<u8>> {
        let response = self
            .client
            .post(url)
            .form(fields)
            .send()
            .await?
            .error_for_status()?;
        let body = response.bytes().await?;
        Ok(body.to_vec())
    }

    async fn download(&self, url: &str, sink: &mut (dyn AsyncWrite + Unpin + Send)) -> Result<u64> {
        let mut response = self.client.get(url).send().await?.error_for_status()?;
        let mut written: u64 = 0;
        while let Some(chunk) = response.chunk().await? {
            sink.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        sink.flush().await?;
        Ok(written)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::config::default::{CERT_LINK_LABEL, FORM_FIELD_SERIAL};
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Build a portal result page linking to `url`, encoded like the real portal.
    pub fn result_page(url: &str) -> Vec<u8> {
        let page = format!(
            "<html><body><p>Nalezený certifikát</p>{}href=\"{}\">DER</a></body></html>",
            CERT_LINK_LABEL, url
        );
        encoding_rs::WINDOWS_1250.encode(&page).0.into_owned()
    }

    /// In-memory transport serving canned pages and files.
    #[derive(Default)]
    pub struct FakeTransport {
        default_page: Option<Vec<u8>>,
        pages: HashMap<String, Vec<u8>>,
        files: HashMap<String, Vec<u8>>,
        broken_files: HashMap<String, Vec<u8>>,
        fail_posts: bool,
        posts: Mutex<Vec<String>>,
        downloads: Mutex<Vec<String>>,
    }

    impl FakeTransport {
        pub fn new() -> Self {
            FakeTransport::default()
        }
        /// Page returned for every serial without a dedicated page.
        pub fn with_page(mut self, page: Vec<u8>) -> Self {
            self.default_page = Some(page);
            self
        }
        pub fn with_serial_page(mut self, serial: &str, page: Vec<u8>) -> Self {
            self.pages.insert(serial.to_string(), page);
            self
        }
        pub fn with_file(mut self, url: &str, body: Vec<u8>) -> Self {
            self.files.insert(url.to_string(), body);
            self
        }
        /// A file whose transfer breaks after `partial` has been sent.
        pub fn with_broken_file(mut self, url: &str, partial: Vec<u8>) -> Self {
            self.broken_files.insert(url.to_string(), partial);
            self
        }
        pub fn failing_posts(mut self) -> Self {
            self.fail_posts = true;
            self
        }
        pub fn posted_serials(&self) -> Vec<String> {
            self.posts.lock().unwrap().clone()
        }
        pub fn downloaded_urls(&self) -> Vec<String> {
            self.downloads.lock().unwrap().clone()
        }
        pub fn request_count(&self) -> usize {
            self.posts.lock().unwrap().len() + self.downloads.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl Transport for FakeTransport {
        async fn post_form(&self, _url: &str, fields: &[(&str, &str)]) -> Result<Vec<u8>> {
            let serial = fields
                .iter()
                .find(|(name, _)| *name == FORM_FIELD_SERIAL)
                .map(|(_, value)| value.to_string())
                .unwrap_or_default();
            self.posts.lock().unwrap().push(serial.clone());
            if self.fail_posts {
                anyhow::bail!("connection refused");
            }
            Ok(self
                .pages
                .get(&serial)
                .or(self.default_page.as_ref())
                .cloned()
                .unwrap_or_default())
        }

        async fn download(
            &self,
            url: &str,
            sink: &mut (dyn AsyncWrite + Unpin + Send),
        ) -> Result<u64> {
            self.downloads.lock().unwrap().push(url.to_string());
            if let Some(partial) = self.broken_files.get(url) {
                sink.write_all(partial).await?;
                anyhow::bail!("connection reset while reading {}", url);
            }
            let body = self
                .files
                .get(url)
                .ok_or_else(|| anyhow::anyhow!("HTTP 404 Not Found for {}", url))?;
            sink.write_all(body).await?;
            sink.flush().await?;
            Ok(body.len() as u64)
        }
    }
}
