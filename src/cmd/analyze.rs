use std::path::PathBuf;

use anyhow::Result;

use crate::analyze::VulnerabilityAnalyzer;
use crate::cli::AnalyzeArgs;
use crate::harvest::{analyze_cache, CacheAnalysis};
use crate::store::{CacheStore, FoundStore};

/// Analyze the existing cache
pub fn run(args: AnalyzeArgs, no_stdout: bool, output: Option<PathBuf>) -> Result<()> {
    if !args.cache.is_dir() {
        anyhow::bail!("cache folder not found: {}", args.cache.display());
    }
    let cache = CacheStore::new(&args.cache);
    let analysis = CacheAnalysis::new(FoundStore::new(&args.found), VulnerabilityAnalyzer::default());

    tracing::info!("Analyzing cache {}", args.cache.display());
    let rep = analyze_cache(&cache, &analysis, !args.no_progress)?;
    tracing::info!(
        "Cache analysis completed: {} certificate(s), {} vulnerable",
        rep.stats.serials,
        rep.stats.vulnerable + rep.stats.already_vulnerable
    );

    super::emit_report(&rep, no_stdout, output.as_deref());
    Ok(())
}
