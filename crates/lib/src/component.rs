//! Component records produced by discovery and populated by the build.

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::render::RenderResult;

/// A discovered unit of source content: one manifest plus its containing
/// directory.
///
/// `render_results` is filled in by the orchestrator as each plugin
/// finishes, keyed by plugin name. Each plugin writes a distinct key, so
/// concurrent plugin executions for the same component never race on the
/// same entry.
#[derive(Debug, Clone)]
pub struct Component {
  /// Name declared in the component's manifest.
  pub name: String,

  /// Directory containing the manifest.
  pub path: PathBuf,

  /// Per-plugin render results from the most recent build run.
  pub render_results: BTreeMap<String, RenderResult>,
}

impl Component {
  /// Create a component with no render results yet.
  pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
    Self {
      name: name.into(),
      path: path.into(),
      render_results: BTreeMap::new(),
    }
  }
}
