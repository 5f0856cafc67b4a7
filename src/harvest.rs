//! Range scan driver: fetch, analyze and record one serial at a time.

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use tracing_indicatif::span_ext::IndicatifSpanExt;

use crate::analyze::VulnerabilityAnalyzer;
use crate::download::{Downloader, FetchError, FetchOutcome};
use crate::index::walk::CertFileWalk;
use crate::output::scan::{ScanReport, SerialReport, Verdict};
use crate::serial::{SerialNumber, SerialRange};
use crate::store::{CacheStore, FoundStore};

/// Memoized analysis of cached certificates.
pub struct CacheAnalysis {
    found: FoundStore,
    analyzer: VulnerabilityAnalyzer,
}

impl CacheAnalysis {
    pub fn new(found: FoundStore, analyzer: VulnerabilityAnalyzer) -> Self {
        CacheAnalysis { found, analyzer }
    }

    pub fn found(&self) -> &FoundStore {
        &self.found
    }

    /// Analyze the certificate at `path` unless a found entry already exists
    /// for `serial`. A vulnerable certificate is copied to the found folder.
    pub fn check(&self, serial: SerialNumber, path: &Path) -> Result<Verdict> {
        if self.found.exists(serial) {
            return Ok(Verdict::AlreadyVulnerable);
        }
        if !path.is_file() {
            return Ok(Verdict::NotAnalyzed);
        }
        let bytes = std::fs::read(path)?;
        match self.analyzer.analyze(&bytes) {
            Ok(true) => {
                self.found.record(serial, &bytes)?;
                Ok(Verdict::Vulnerable)
            }
            Ok(false) => Ok(Verdict::Ok),
            Err(e) => Ok(Verdict::Unparsable(e.to_string())),
        }
    }
}

/// Drives a serial range through download and analysis.
pub struct Harvester {
    downloader: Downloader,
    analysis: CacheAnalysis,
    wait_time: Duration,
    download_only: bool,
}

impl Harvester {
    pub fn new(
        downloader: Downloader,
        analysis: CacheAnalysis,
        wait_time: Duration,
        download_only: bool,
    ) -> Self {
        Harvester {
            downloader,
            analysis,
            wait_time,
            download_only,
        }
    }

    fn cache(&self) -> &CacheStore {
        self.downloader.cache()
    }

    /// Process one serial. Only filesystem errors are returned as `Err`.
    pub async fn process(&self, serial: SerialNumber) -> Result<SerialReport> {
        self.cache().ensure_root()?;
        self.analysis.found().ensure_root()?;

        let fetch = self.downloader.fetch(serial).await?;
        match &fetch {
            FetchOutcome::Skipped => tracing::debug!("{}: cached", serial),
            FetchOutcome::Downloaded { bytes } => {
                tracing::info!("{}: downloaded ({} bytes)", serial, bytes)
            }
            FetchOutcome::Failed(FetchError::UrlNotFound) => {
                tracing::warn!("{}: certificate URL not found", serial)
            }
            FetchOutcome::Failed(e) => tracing::warn!("{}: {}", serial, e),
        }

        let verdict = if self.download_only {
            tracing::debug!("{}: analysis skipped (download-only)", serial);
            Verdict::NotAnalyzed
        } else {
            let verdict = self.analysis.check(serial, &self.cache().path(serial))?;
            log_verdict(serial, &verdict);
            verdict
        };

        Ok(SerialReport {
            serial,
            fetch: Some(fetch),
            verdict,
        })
    }

    /// Walk the range in order, pausing after every completed download.
    pub async fn run(&self, range: SerialRange, progress: bool) -> Result<ScanReport> {
        let mut rep = ScanReport::for_range(range, self.download_only);
        tracing::info!(
            "Scanning {} serial(s) from {} to {}",
            range.len(),
            range.from,
            range.to
        );

        let header_span = tracing::info_span!("range_scan");
        if progress {
            header_span.pb_set_style(&crate::output::progress::get_progress_style());
            header_span.pb_set_message(&format!("{} -> {}", range.from, range.to));
            header_span.pb_set_length(range.len());
            header_span.pb_set_position(0);
            header_span.pb_start();
        }

        for serial in range {
            let report = self.process(serial).await?;
            rep.apply(&report);
            if progress {
                header_span.pb_inc(1);
            }
            let downloaded = matches!(report.fetch, Some(FetchOutcome::Downloaded { .. }));
            if downloaded && !self.wait_time.is_zero() {
                tokio::time::sleep(self.wait_time).await;
            }
        }

        drop(header_span);
        rep.finish();
        Ok(rep)
    }
}

fn log_verdict(serial: SerialNumber, verdict: &Verdict) {
    match verdict {
        Verdict::NotAnalyzed => tracing::debug!("{}: nothing to analyze", serial),
        Verdict::Ok => tracing::info!("{}: OK", serial),
        Verdict::Vulnerable => tracing::warn!("{}: VULNERABLE", serial),
        Verdict::AlreadyVulnerable => {
            tracing::debug!("{}: already analyzed: vulnerable", serial)
        }
        Verdict::Unparsable(e) => tracing::error!("{}: {}", serial, e),
    }
}

/// Analyze every certificate already in the cache, without network access.
pub fn analyze_cache(cache: &CacheStore, analysis: &CacheAnalysis, progress: bool) -> Result<ScanReport> {
    let mut rep = ScanReport::new();
    analysis.found().ensure_root()?;

    let header_span = tracing::info_span!("cache_analysis");
    if progress {
        header_span.pb_set_style(&crate::output::progress::get_counter_style());
        header_span.pb_set_message(&format!("Analyzing {}", cache.root().display()));
        header_span.pb_start();
    }

    for path in CertFileWalk::new(cache.root()) {
        let path = path?;
        let serial = match path
            .file_stem()
            .and_then(|s| s.to_str())
            .and_then(|s| s.parse::<SerialNumber>().ok())
        {
            Some(serial) => serial,
            None => {
                tracing::warn!("{}: not a cache entry, skipped", path.display());
                continue;
            }
        };
        let verdict = analysis.check(serial, &path)?;
        log_verdict(serial, &verdict);
        rep.apply(&SerialReport {
            serial,
            fetch: None,
            verdict,
        });
        if progress {
            header_span.pb_inc(1);
        }
    }

    drop(header_span);
    rep.finish();
    Ok(rep)
}
