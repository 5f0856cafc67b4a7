pub mod default;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;

use crate::serial::SerialRange;

/// Settings for talking to the CA portal.
#[derive(Clone, Debug)]
pub struct PortalSetting {
    pub endpoint: String,
    pub encoding_label: String,
    pub user_agent: String,
    /// Overall HTTP timeout. `None` keeps the client default.
    pub timeout: Option<Duration>,
}

impl Default for PortalSetting {
    fn default() -> Self {
        PortalSetting {
            endpoint: default::DEFAULT_PORTAL_ENDPOINT.to_string(),
            encoding_label: default::PORTAL_ENCODING_LABEL.to_string(),
            user_agent: default::DEFAULT_USER_AGENT.to_string(),
            timeout: None,
        }
    }
}

/// Settings for a range scan.
#[derive(Clone, Debug)]
pub struct ScanSetting {
    pub range: SerialRange,
    pub cache_dir: PathBuf,
    pub found_dir: PathBuf,
    /// Delay applied after each real network download
    pub wait_time: Duration,
    pub download_only: bool,
    pub progress: bool,
}

/// Get the path of a file under the user log directory, creating the directory if needed.
pub fn get_user_file_path(file_name: &str) -> Result<PathBuf> {
    let home = home::home_dir().ok_or_else(|| anyhow::anyhow!("home directory not found"))?;
    let dir = home.join(default::USER_DIR_NAME).join("logs");
    std::fs::create_dir_all(&dir)?;
    Ok(dir.join(file_name))
}
