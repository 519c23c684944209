use crate::error::Result;
use crate::eventlistener::OutputFormat;
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// ListenerConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListenerConfig {
    #[serde(default = "default_listener_name")]
    pub name: String,
}

fn default_listener_name() -> String {
    "cicd-event-listener".to_string()
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            name: default_listener_name(),
        }
    }
}

// ---------------------------------------------------------------------------
// OutputConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
    /// Where `generate` writes the listener. Stdout when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// Config (top-level)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default = "default_manifest")]
    pub manifest: PathBuf,
    #[serde(default)]
    pub listener: ListenerConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

fn default_version() -> u32 {
    1
}

fn default_manifest() -> PathBuf {
    PathBuf::from(paths::DEFAULT_MANIFEST_FILE)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            manifest: default_manifest(),
            listener: ListenerConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl Config {
    /// Load `.manifestor.yaml` from `root`, falling back to defaults when the
    /// file does not exist.
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(&path)?;
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    pub fn manifest_path(&self, root: &Path) -> PathBuf {
        paths::resolve(root, &self.manifest)
    }

    pub fn output_path(&self, root: &Path) -> Option<PathBuf> {
        self.output.path.as_deref().map(|p| paths::resolve(root, p))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
