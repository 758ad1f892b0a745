//! External tool detection and management.
//!
//! The [`ToolRegistry`] discovers and caches the locations of the external
//! CLI tools mkx depends on (ffprobe, mediainfo, mkvmerge, mkvextract,
//! mkvpropedit) and provides lookup methods for the rest of the workspace.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Known tool names that the registry manages.
const KNOWN_TOOLS: &[&str] = &[
    "ffprobe",
    "mediainfo",
    "mkvmerge",
    "mkvextract",
    "mkvpropedit",
];

/// Configuration for a single external tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolConfig {
    /// Human-readable tool name (e.g. "mkvmerge").
    pub name: String,
    /// Resolved path to the executable.
    pub path: PathBuf,
}

/// Per-tool path overrides, e.g. loaded from an application config file.
/// A `None` entry means "search PATH".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolPaths {
    pub ffprobe: Option<PathBuf>,
    pub mediainfo: Option<PathBuf>,
    pub mkvmerge: Option<PathBuf>,
    pub mkvextract: Option<PathBuf>,
    pub mkvpropedit: Option<PathBuf>,
}

impl ToolPaths {
    fn get(&self, name: &str) -> Option<&Path> {
        match name {
            "ffprobe" => self.ffprobe.as_deref(),
            "mediainfo" => self.mediainfo.as_deref(),
            "mkvmerge" => self.mkvmerge.as_deref(),
            "mkvextract" => self.mkvextract.as_deref(),
            "mkvpropedit" => self.mkvpropedit.as_deref(),
            _ => None,
        }
    }
}

/// Availability information for a tool, returned by [`ToolRegistry::check_all`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    /// Tool name.
    pub name: String,
    /// Whether the tool was found.
    pub available: bool,
    /// Version string (first line of `--version` output), if available.
    pub version: Option<String>,
    /// Resolved path to the executable.
    pub path: Option<PathBuf>,
}

/// Registry holding discovered tool configurations.
#[derive(Debug, Clone)]
pub struct ToolRegistry {
    tools: HashMap<String, ToolConfig>,
}

impl ToolRegistry {
    /// Discover tools by searching `PATH` (or using overrides).
    ///
    /// For each known tool, if `paths` supplies a custom path **and** that
    /// path exists, it is used directly. Otherwise [`which::which`] is used
    /// to locate the tool in `PATH`. Tools that are not found are silently
    /// omitted from the registry.
    pub fn discover(paths: &ToolPaths) -> Self {
        let mut tools = HashMap::new();

        for &name in KNOWN_TOOLS {
            let resolved = if let Some(p) = paths.get(name) {
                if p.exists() {
                    Some(p.to_path_buf())
                } else {
                    // Custom path does not exist; fall back to PATH.
                    which::which(name).ok()
                }
            } else {
                which::which(name).ok()
            };

            if let Some(path) = resolved {
                tools.insert(
                    name.to_string(),
                    ToolConfig {
                        name: name.to_string(),
                        path,
                    },
                );
            }
        }

        Self { tools }
    }

    /// Discover all tools from `PATH` with no overrides.
    pub fn from_path() -> Self {
        Self::discover(&ToolPaths::default())
    }

    /// Return a reference to the [`ToolConfig`] for the given tool, or an
    /// [`mkx_core::Error::Tool`] if the tool was not found during discovery.
    pub fn require(&self, name: &str) -> mkx_core::Result<&ToolConfig> {
        self.tools.get(name).ok_or_else(|| mkx_core::Error::Tool {
            tool: name.to_string(),
            message: format!("{name} not found; is it installed and in PATH?"),
        })
    }

    /// Check all known tools and return availability information.
    pub fn check_all(&self) -> Vec<ToolInfo> {
        KNOWN_TOOLS
            .iter()
            .map(|&name| {
                if let Some(cfg) = self.tools.get(name) {
                    let version = detect_version(name, &cfg.path);
                    ToolInfo {
                        name: name.to_string(),
                        available: true,
                        version,
                        path: Some(cfg.path.clone()),
                    }
                } else {
                    ToolInfo {
                        name: name.to_string(),
                        available: false,
                        version: None,
                        path: None,
                    }
                }
            })
            .collect()
    }

    /// Iterate over all registered tool configs.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &ToolConfig)> {
        self.tools.iter()
    }
}

/// Run `<tool> --version` (or `-version` for ffprobe) and return the first
/// line of stdout.
fn detect_version(name: &str, path: &Path) -> Option<String> {
    let version_arg = match name {
        "ffprobe" => "-version",
        _ => "--version",
    };

    let output = std::process::Command::new(path)
        .arg(version_arg)
        .output()
        .ok()?;

    if !output.status.success() {
        return None;
    }

    String::from_utf8_lossy(&output.stdout)
        .lines()
        .next()
        .map(|s| s.to_string())
}
