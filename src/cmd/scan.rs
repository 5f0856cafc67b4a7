use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

use crate::analyze::VulnerabilityAnalyzer;
use crate::cli::ScanArgs;
use crate::config::{PortalSetting, ScanSetting};
use crate::download::Downloader;
use crate::harvest::{CacheAnalysis, Harvester};
use crate::scrape::Scraper;
use crate::serial::SerialRange;
use crate::store::{CacheStore, FoundStore};
use crate::transport::{HttpTransport, Transport};

/// Run a range scan
pub async fn run(args: ScanArgs, no_stdout: bool, output: Option<PathBuf>) -> Result<()> {
    let mut portal = PortalSetting::default();
    if let Some(endpoint) = args.endpoint {
        portal.endpoint = endpoint;
    }
    portal.timeout = args.timeout_ms.map(Duration::from_millis);

    let setting = ScanSetting {
        range: SerialRange::new(args.from, args.to),
        cache_dir: args.cache,
        found_dir: args.found,
        wait_time: Duration::from_millis(args.wait_ms),
        download_only: args.download_only,
        progress: !args.no_progress,
    };

    let transport: Arc<dyn Transport> = Arc::new(HttpTransport::new(&portal)?);
    let scraper = Scraper::new(transport.clone(), &portal)?;
    let downloader = Downloader::new(CacheStore::new(&setting.cache_dir), scraper, transport);
    let analysis = CacheAnalysis::new(
        FoundStore::new(&setting.found_dir),
        VulnerabilityAnalyzer::default(),
    );
    let harvester = Harvester::new(downloader, analysis, setting.wait_time, setting.download_only);

    tracing::info!("Portal endpoint: {}", portal.endpoint);
    let rep = harvester.run(setting.range, setting.progress).await?;
    tracing::info!(
        "Scan completed: {} downloaded, {} cached, {} failed, {} vulnerable",
        rep.stats.downloaded,
        rep.stats.cached,
        rep.stats.failed,
        rep.stats.vulnerable + rep.stats.already_vulnerable
    );

    super::emit_report(&rep, no_stdout, output.as_deref());
    Ok(())
}
