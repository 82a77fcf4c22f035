//! JSON configuration file support.
//!
//! The file keeps the layout the fleet web deployment already ships:
//!
//! ```json
//! { "FilesUrl": { "ReisaiUrl": "https://example.org/reisai.txt" } }
//! ```
//!
//! Every section is optional. Command-line flags and environment variables
//! take precedence over values read here.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};

/// Settings read from the optional JSON config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileConfig {
    #[serde(rename = "FilesUrl", default)]
    pub files_url: FilesUrl,
}

/// Remote resources fetched at startup.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FilesUrl {
    /// Location of the vehicle schedule flat file.
    #[serde(rename = "ReisaiUrl", default, skip_serializing_if = "Option::is_none")]
    pub schedule_url: Option<String>,
}

impl FileConfig {
    /// Schedule URL, treating an empty string as unset.
    pub fn schedule_url(&self) -> Option<&str> {
        self.files_url
            .schedule_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
    }
}

/// Load and parse a config file.
pub fn load_config_file(path: &Path) -> Result<FileConfig> {
    let shown = path.display();
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Failed to read config file {shown}: {e}")))?;
    serde_json::from_str(&content)
        .map_err(|e| Error::Config(format!("Failed to parse config file {shown}: {e}")))
}
