//! CLI configuration loaded from `kiln.toml`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

/// Top-level `kiln.toml` schema.
///
/// ```toml
/// project_name = "site"
/// project_version = "1.0.0"
/// root = "src"
/// dist = "dist"
///
/// [[plugins]]
/// name = "css"
/// entry = "style.css"
/// ```
#[derive(Debug, Deserialize)]
pub struct CliConfig {
  pub project_name: String,
  pub project_version: String,

  #[serde(default)]
  pub project_description: String,

  #[serde(default = "default_root")]
  pub root: PathBuf,

  #[serde(default = "default_dist")]
  pub dist: PathBuf,

  #[serde(default = "default_manifest")]
  pub manifest: String,

  #[serde(default)]
  pub plugins: Vec<PluginConfig>,
}

/// One built-in plugin declaration.
#[derive(Debug, Deserialize)]
pub struct PluginConfig {
  /// Unique plugin name, used as the render-results key.
  pub name: String,

  /// Entry filename relative to each component's directory.
  pub entry: String,
}

fn default_root() -> PathBuf {
  PathBuf::from(".")
}

fn default_dist() -> PathBuf {
  PathBuf::from("dist")
}

fn default_manifest() -> String {
  "component.json".to_string()
}

impl CliConfig {
  /// Load and parse a config file.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let content = fs::read_to_string(path).with_context(|| format!("failed to read config {}", path.display()))?;
    let config: CliConfig =
      toml::from_str(&content).with_context(|| format!("failed to parse config {}", path.display()))?;
    Ok(config)
  }
}
