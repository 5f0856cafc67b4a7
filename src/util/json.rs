use anyhow::Result;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// JSON output style
pub enum JsonStyle {
    /// Compact one-line JSON
    Compact,
    /// Pretty printed (indented) JSON
    Pretty,
}

/// Serialize a report straight into a file (create or truncate).
pub fn save_json_output<T: Serialize>(data: &T, out_path: &Path, style: JsonStyle) -> Result<()> {
    let mut writer = BufWriter::new(File::create(out_path)?);
    match style {
        JsonStyle::Compact => serde_json::to_writer(&mut writer, data)?,
        JsonStyle::Pretty => serde_json::to_writer_pretty(&mut writer, data)?,
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::scan::ScanReport;

    #[test]
    fn writes_report_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        let mut rep = ScanReport::new();
        rep.finish();

        save_json_output(&rep, &path, JsonStyle::Compact).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["meta"]["tool"], "rocascan");
        assert_eq!(value["stats"]["serials"], 0);
    }
}
