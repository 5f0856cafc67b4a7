use std::path::PathBuf;

use anyhow::Result;

use crate::cli::IndexArgs;
use crate::output::index::print_index_tree;
use crate::util::json::{save_json_output, JsonStyle};

/// Build index.csv for a folder
pub fn run(args: IndexArgs, no_stdout: bool, output: Option<PathBuf>) -> Result<()> {
    if !args.folder.is_dir() {
        anyhow::bail!("folder not found: {}", args.folder.display());
    }
    let summary = crate::index::build_index(&args.folder, !args.no_progress)?;

    if !no_stdout {
        print_index_tree(&summary);
    }
    if let Some(path) = &output {
        match save_json_output(&summary, path, JsonStyle::Pretty) {
            Ok(_) => {
                if !no_stdout {
                    tracing::info!("JSON output saved to {}", path.display());
                }
            }
            Err(e) => tracing::error!("Failed to save JSON output: {}", e),
        }
    }
    Ok(())
}
