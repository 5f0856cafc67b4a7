use std::sync::Arc;

use anyhow::Result;
use encoding_rs::Encoding;

use crate::config::default::{
    CERT_LINK_LABEL, FORM_FIELD_EMAIL, FORM_FIELD_QUALIFIED, FORM_FIELD_SERIAL, FORM_FIELD_SUBMIT,
    FORM_FIELD_WILDCARD,
};
use crate::config::PortalSetting;
use crate::serial::SerialNumber;
use crate::transport::Transport;

/// Resolves serial numbers to certificate download URLs by querying the
/// portal search form and scraping the result page.
pub struct Scraper {
    transport: Arc<dyn Transport>,
    endpoint: String,
    encoding: &'static Encoding,
}

impl Scraper {
    pub fn new(transport: Arc<dyn Transport>, setting: &PortalSetting) -> Result<Self> {
        let encoding = Encoding::for_label(setting.encoding_label.as_bytes())
            .ok_or_else(|| anyhow::anyhow!("unknown page encoding: {}", setting.encoding_label))?;
        Ok(Scraper {
            transport,
            endpoint: setting.endpoint.clone(),
            encoding,
        })
    }

    /// One form submission, no retry. `Ok(None)` means the page carried no
    /// download link (unknown serial or changed layout); `Err` is a network failure.
    pub async fn resolve(&self, serial: SerialNumber) -> Result<Option<String>> {
        let serial_text = serial.padded();
        let fields = [
            FORM_FIELD_WILDCARD,
            FORM_FIELD_QUALIFIED,
            (FORM_FIELD_SERIAL, serial_text.as_str()),
            FORM_FIELD_SUBMIT,
            FORM_FIELD_EMAIL,
        ];
        let body = self.transport.post_form(&self.endpoint, &fields).await?;
        let (page, _, had_errors) = self.encoding.decode(&body);
        if had_errors {
            tracing::debug!("{}: result page contains malformed {} sequences", serial, self.encoding.name());
        }
        Ok(extract_cert_url(&page))
    }
}

/// Find the certificate link in a result page: the text between
/// `CERT_LINK_LABEL href="` and the next quote, with `&amp;` unescaped.
pub fn extract_cert_url(page: &str) -> Option<String> {
    let prefix = format!("{}href=\"", CERT_LINK_LABEL);
    let start = page.find(&prefix)? + prefix.len();
    let rest = &page[start..];
    let end = rest.find('"')?;
    Some(rest[..end].replace("&amp;", "&"))
}
