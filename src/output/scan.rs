use std::time::{Duration, SystemTime};

use serde::{Deserialize, Serialize};
use termtree::Tree;

use crate::download::{FetchError, FetchOutcome};
use crate::output::tree_label;
use crate::serial::{SerialNumber, SerialRange};

/// Analysis result for one serial.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// No analysis ran (download-only mode or nothing cached)
    NotAnalyzed,
    Ok,
    Vulnerable,
    /// Found entry already present, analysis elided
    AlreadyVulnerable,
    Unparsable(String),
}

/// What happened to a single serial.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SerialReport {
    pub serial: SerialNumber,
    /// `None` when the serial came from the cache without a fetch step
    pub fetch: Option<FetchOutcome>,
    pub verdict: Verdict,
}

/// Metadata about the run
#[derive(Serialize, Deserialize, Debug)]
pub struct ReportMeta {
    pub tool: String,
    pub version: String,
    pub range: Option<SerialRange>,
    pub download_only: bool,
    pub started_at: SystemTime,
    pub finished_at: Option<SystemTime>,
}

impl Default for ReportMeta {
    fn default() -> Self {
        Self {
            tool: "rocascan".into(),
            version: env!("CARGO_PKG_VERSION").into(),
            range: None,
            download_only: false,
            started_at: SystemTime::now(),
            finished_at: None,
        }
    }
}

/// Counters of a run
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq, Eq)]
pub struct ReportStats {
    pub serials: u64,
    pub downloaded: u64,
    pub downloaded_bytes: u64,
    pub cached: u64,
    pub failed: u64,
    pub ok: u64,
    pub vulnerable: u64,
    pub already_vulnerable: u64,
    pub unparsable: u64,
    pub duration: Option<Duration>,
}

/// Aggregated run report. Only notable serials are kept individually.
#[derive(Serialize, Deserialize, Debug, Default)]
pub struct ScanReport {
    pub meta: ReportMeta,
    pub stats: ReportStats,
    pub vulnerable: Vec<SerialNumber>,
    pub failed: Vec<(SerialNumber, FetchError)>,
    pub unparsable: Vec<(SerialNumber, String)>,
}

impl ScanReport {
    pub fn new() -> Self {
        ScanReport::default()
    }

    pub fn for_range(range: SerialRange, download_only: bool) -> Self {
        let mut rep = ScanReport::default();
        rep.meta.range = Some(range);
        rep.meta.download_only = download_only;
        rep
    }

    pub fn apply(&mut self, report: &SerialReport) {
        self.stats.serials += 1;
        match &report.fetch {
            Some(FetchOutcome::Skipped) => self.stats.cached += 1,
            Some(FetchOutcome::Downloaded { bytes }) => {
                self.stats.downloaded += 1;
                self.stats.downloaded_bytes += bytes;
            }
            Some(FetchOutcome::Failed(e)) => {
                self.stats.failed += 1;
                self.failed.push((report.serial, e.clone()));
            }
            None => {}
        }
        match &report.verdict {
            Verdict::NotAnalyzed => {}
            Verdict::Ok => self.stats.ok += 1,
            Verdict::Vulnerable => {
                self.stats.vulnerable += 1;
                self.vulnerable.push(report.serial);
            }
            Verdict::AlreadyVulnerable => {
                self.stats.already_vulnerable += 1;
                self.vulnerable.push(report.serial);
            }
            Verdict::Unparsable(reason) => {
                self.stats.unparsable += 1;
                self.unparsable.push((report.serial, reason.clone()));
            }
        }
    }

    pub fn finish(&mut self) {
        let now = SystemTime::now();
        self.meta.finished_at = Some(now);
        self.stats.duration = now.duration_since(self.meta.started_at).ok();
    }
}

/// Print the run summary in a tree structure.
pub fn print_report_tree(rep: &ScanReport) {
    let title = match &rep.meta.range {
        Some(range) => format!("Scan {} -> {}", range.from, range.to),
        None => "Cache analysis".to_string(),
    };
    let mut root = Tree::new(title);
    let stats = &rep.stats;
    root.push(Tree::new(tree_label(format!("serials: {}", stats.serials))));
    if rep.meta.range.is_some() {
        root.push(Tree::new(tree_label(format!(
            "downloaded: {} ({} bytes)",
            stats.downloaded, stats.downloaded_bytes
        ))));
        root.push(Tree::new(tree_label(format!("cached: {}", stats.cached))));
        if !rep.failed.is_empty() {
            let mut node = Tree::new(tree_label(format!("failed: {}", stats.failed)));
            for (serial, e) in &rep.failed {
                node.push(Tree::new(format!("{}: {}", serial, e)));
            }
            root.push(node);
        }
    }
    if !rep.meta.download_only {
        root.push(Tree::new(tree_label(format!("ok: {}", stats.ok))));
        let mut node = Tree::new(tree_label(format!(
            "vulnerable: {} ({} new)",
            stats.vulnerable + stats.already_vulnerable,
            stats.vulnerable
        )));
        for serial in &rep.vulnerable {
            node.push(Tree::new(serial.to_string()));
        }
        root.push(node);
        if !rep.unparsable.is_empty() {
            let mut node = Tree::new(tree_label(format!("unparsable: {}", stats.unparsable)));
            for (serial, reason) in &rep.unparsable {
                node.push(Tree::new(format!("{}: {}", serial, reason)));
            }
            root.push(node);
        }
    }
    if let Some(d) = stats.duration {
        root.push(Tree::new(tree_label(format!("elapsed: {:?}", d))));
    }
    println!("{}", root);
}
