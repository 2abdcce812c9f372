//! Editor configuration loaded from `config/editkit.toml`

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::warn;

/// Default location of the config file, relative to the workspace root
pub const DEFAULT_CONFIG_PATH: &str = "config/editkit.toml";

/// Output ceiling before a rendered listing is clipped
pub const DEFAULT_MAX_OUTPUT_CHARS: usize = 16000;

/// Tunables shared by the editing and patch tools
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub max_output_chars: usize,
    pub tab_width: usize,
    pub snippet_context_lines: usize,
    pub max_list_depth: usize,
    /// Fail a patch when an `@@` anchor is not found instead of ignoring it
    pub strict_anchors: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            max_output_chars: DEFAULT_MAX_OUTPUT_CHARS,
            tab_width: 8,
            snippet_context_lines: 4,
            max_list_depth: 2,
            strict_anchors: false,
        }
    }
}

#[derive(Deserialize)]
struct PartialConfig {
    editor: Option<EditorConfig>,
}

impl EditorConfig {
    /// Parse the `[editor]` table of a TOML document
    pub fn from_toml(content: &str) -> Result<Self> {
        let partial: PartialConfig = toml::from_str(content)?;
        Ok(partial.editor.unwrap_or_default())
    }

    /// Load an explicitly requested config file. Errors are reported.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Load `config/editkit.toml` under `root` if present, otherwise defaults
    pub fn discover(root: &Path) -> Self {
        let path = root.join(DEFAULT_CONFIG_PATH);
        let Ok(content) = fs::read_to_string(&path) else {
            return Self::default();
        };
        match Self::from_toml(&content) {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring unparsable config");
                Self::default()
            }
        }
    }
}
