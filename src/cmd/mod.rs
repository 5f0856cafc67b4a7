pub mod analyze;
pub mod index;
pub mod scan;

use std::path::Path;

use crate::output::scan::{print_report_tree, ScanReport};
use crate::util::json::{save_json_output, JsonStyle};

/// Print and/or save a run report according to the global output flags.
pub(crate) fn emit_report(rep: &ScanReport, no_stdout: bool, output: Option<&Path>) {
    if !no_stdout {
        print_report_tree(rep);
    }
    if let Some(path) = output {
        match save_json_output(rep, path, JsonStyle::Pretty) {
            Ok(_) => {
                if !no_stdout {
                    tracing::info!("JSON output saved to {}", path.display());
                }
            }
            Err(e) => tracing::error!("Failed to save JSON output: {}", e),
        }
    }
}
