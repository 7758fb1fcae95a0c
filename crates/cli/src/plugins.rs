//! Built-in plugins for stand-alone use of the `kiln` binary.
//!
//! Real pipelines link their own [`Plugin`] implementations against
//! kiln-lib; the CLI ships a single pass-through plugin so a config with
//! no external plugins still materializes a dist tree.

use async_trait::async_trait;
use kiln_lib::{Plugin, RenderError, RenderResult, Source};

/// Records its entry file as a dependency, so the engine copies it
/// verbatim into the component's output directory.
pub struct CopyPlugin {
  name: String,
  entry: String,
}

impl CopyPlugin {
  pub fn new(name: impl Into<String>, entry: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      entry: entry.into(),
    }
  }
}

#[async_trait]
impl Plugin for CopyPlugin {
  fn name(&self) -> &str {
    &self.name
  }

  fn entry(&self) -> &str {
    &self.entry
  }

  async fn render(&self, file: Option<Source>, result: &mut RenderResult) -> Result<(), RenderError> {
    // The engine records the entry source itself; the plugin only has
    // to declare the file as a dependency to get it copied.
    if let Some(file) = file {
      result.add_dependency(file.path.clone());
    }
    Ok(())
  }
}
