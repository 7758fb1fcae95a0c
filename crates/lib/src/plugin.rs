//! The plugin capability contract.
//!
//! Plugins are black boxes to the orchestrator: selected at
//! configuration time, keyed by name, triggered by the existence of
//! their declared entry file inside a component's directory.

use async_trait::async_trait;

use crate::render::RenderResult;
use crate::source::{RenderError, Source};

/// A transformation capability applied to components.
///
/// The engine invokes [`Plugin::render`] once per component whose
/// directory contains the plugin's entry file. `render` mutates the
/// passed-in result; on failure the engine still persists whatever was
/// recorded up to that point, and treats [`RenderError::file`] as a
/// dependency for cleanup purposes.
#[async_trait]
pub trait Plugin: Send + Sync {
  /// Unique name, used as the key in a component's render results.
  fn name(&self) -> &str;

  /// Entry filename, relative to a component's directory.
  fn entry(&self) -> &str;

  /// Render one component.
  ///
  /// `file` is the resolved entry source, or `None` when the caller
  /// could not resolve one.
  async fn render(&self, file: Option<Source>, result: &mut RenderResult) -> Result<(), RenderError>;
}
