//! Per-render accumulation: the [`RenderResult`] ledger and the
//! [`BuildRequest`] context handed to plugin sub-tasks.
//!
//! One `RenderResult` exists per (component, plugin) per run. It records
//! every source examined, every dependency read, every binary to emit,
//! and every error reported. The dependency set doubles as the cleanup
//! set: the paths copied into the output tree on this run are exactly
//! the paths deleted before the next run of the same pairing.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};

use crate::source::{Binary, RenderError, Source};

/// Ledger of sources, dependencies, binaries and errors produced by one
/// plugin's render pass over one component.
#[derive(Debug, Default, Clone)]
pub struct RenderResult {
  sources: Vec<(Source, Option<RenderError>)>,
  dependencies: Vec<PathBuf>,
  binaries: Vec<Binary>,
  errors: Vec<RenderError>,
}

impl RenderResult {
  /// Create an empty result.
  pub fn new() -> Self {
    Self::default()
  }

  /// Record a source file examined during the render, optionally paired
  /// with the failure it caused.
  pub fn add_source(&mut self, source: Source, error: Option<RenderError>) {
    self.sources.push((source, error));
  }

  /// Record a file the render read. Duplicates are dropped; insertion
  /// order is preserved.
  pub fn add_dependency(&mut self, path: impl Into<PathBuf>) {
    let path = path.into();
    if !self.dependencies.contains(&path) {
      self.dependencies.push(path);
    }
  }

  /// Record an artifact to write into the output tree.
  pub fn add_binary(&mut self, binary: Binary) {
    self.binaries.push(binary);
  }

  /// Record a failure.
  pub fn add_error(&mut self, error: RenderError) {
    self.errors.push(error);
  }

  /// Sources examined, each with its associated failure if any.
  pub fn sources(&self) -> &[(Source, Option<RenderError>)] {
    &self.sources
  }

  /// Files read during the render, in insertion order.
  pub fn dependencies(&self) -> &[PathBuf] {
    &self.dependencies
  }

  /// Artifacts to materialize.
  pub fn binaries(&self) -> &[Binary] {
    &self.binaries
  }

  /// Failures reported during the render.
  pub fn errors(&self) -> &[RenderError] {
    &self.errors
  }

  /// Whether any failure was recorded.
  pub fn has_errors(&self) -> bool {
    !self.errors.is_empty()
  }
}

/// Mutable context for one render-lifecycle invocation.
///
/// Wraps the component identity, the plugin's entry path (resolved to a
/// [`Source`] lazily, cached after the first check) and the active
/// [`RenderResult`]. Mutation methods forward into the result; the
/// ledger sits behind a mutex so the sub-tasks of a concurrent job can
/// all record through a shared `&BuildRequest`.
///
/// The request lives for exactly one render invocation: build it from
/// the result the engine handed to the plugin, run the plugin's tasks,
/// then recover the ledger with [`BuildRequest::into_result`].
#[derive(Debug)]
pub struct BuildRequest {
  component_name: String,
  component_path: PathBuf,
  entry_path: PathBuf,
  entry: OnceLock<Option<Source>>,
  result: Mutex<RenderResult>,
}

impl BuildRequest {
  /// Create a request for one render of `component_name`.
  ///
  /// `entry_path` is the absolute path of the plugin's entry file inside
  /// the component's directory.
  pub fn new(
    component_name: impl Into<String>,
    component_path: impl Into<PathBuf>,
    entry_path: impl Into<PathBuf>,
    result: RenderResult,
  ) -> Self {
    Self {
      component_name: component_name.into(),
      component_path: component_path.into(),
      entry_path: entry_path.into(),
      entry: OnceLock::new(),
      result: Mutex::new(result),
    }
  }

  /// Name of the component being rendered.
  pub fn component_name(&self) -> &str {
    &self.component_name
  }

  /// Directory of the component being rendered.
  pub fn component_path(&self) -> &Path {
    &self.component_path
  }

  /// Path of the plugin's entry file inside the component directory.
  pub fn entry_path(&self) -> &Path {
    &self.entry_path
  }

  /// Resolve the entry file to a [`Source`], or `None` when the file
  /// does not exist. The first resolution is cached.
  pub async fn resolve_entry(&self) -> Option<Source> {
    if let Some(entry) = self.entry.get() {
      return entry.clone();
    }

    let resolved = match tokio::fs::try_exists(&self.entry_path).await {
      Ok(true) => Some(Source::new(self.entry_path.clone())),
      _ => None,
    };

    // A concurrent resolver may have won the race; the value is the same.
    let _ = self.entry.set(resolved);
    self.entry.get().cloned().flatten()
  }

  /// Record an artifact on the active result.
  pub fn add_binary(&self, binary: Binary) {
    self.lock_result().add_binary(binary);
  }

  /// Record a dependency on the active result.
  pub fn add_dependency(&self, path: impl Into<PathBuf>) {
    self.lock_result().add_dependency(path);
  }

  /// Record a failure on the active result.
  pub fn add_error(&self, error: RenderError) {
    self.lock_result().add_error(error);
  }

  /// Record an examined source on the active result.
  pub fn add_source(&self, source: Source, error: Option<RenderError>) {
    self.lock_result().add_source(source, error);
  }

  /// Consume the request and recover the accumulated result.
  pub fn into_result(self) -> RenderResult {
    self
      .result
      .into_inner()
      .unwrap_or_else(|poisoned| poisoned.into_inner())
  }

  fn lock_result(&self) -> std::sync::MutexGuard<'_, RenderResult> {
    self
      .result
      .lock()
      .unwrap_or_else(|poisoned| poisoned.into_inner())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn dependencies_preserve_insertion_order_and_dedupe() {
    let mut result = RenderResult::new();
    result.add_dependency("/src/b.less");
    result.add_dependency("/src/a.less");
    result.add_dependency("/src/b.less");

    assert_eq!(
      result.dependencies(),
      &[PathBuf::from("/src/b.less"), PathBuf::from("/src/a.less")]
    );
  }

  #[test]
  fn sources_pair_with_optional_errors() {
    let mut result = RenderResult::new();
    let err = RenderError::new("bad import").with_line(2);
    result.add_source(Source::new("/src/ok.less"), None);
    result.add_source(Source::new("/src/bad.less"), Some(err.clone()));

    assert_eq!(result.sources().len(), 2);
    assert!(result.sources()[0].1.is_none());
    assert_eq!(result.sources()[1].1.as_ref(), Some(&err));
  }

  #[test]
  fn request_forwards_mutations_into_result() {
    let request = BuildRequest::new("widget", "/src/widget", "/src/widget/style.less", RenderResult::new());

    request.add_dependency("/src/widget/style.less");
    request.add_binary(Binary::new("style.css", b"body{}".to_vec()));
    request.add_error(RenderError::new("warning treated as error"));

    let result = request.into_result();
    assert_eq!(result.dependencies().len(), 1);
    assert_eq!(result.binaries().len(), 1);
    assert_eq!(result.errors().len(), 1);
  }

  #[tokio::test]
  async fn resolve_entry_missing_file_is_none() {
    let request = BuildRequest::new("widget", "/nowhere", "/nowhere/style.less", RenderResult::new());
    assert!(request.resolve_entry().await.is_none());
  }

  #[tokio::test]
  async fn resolve_entry_existing_file_is_cached() {
    let temp = tempfile::TempDir::new().unwrap();
    let entry = temp.path().join("style.less");
    std::fs::write(&entry, "body {}").unwrap();

    let request = BuildRequest::new("widget", temp.path(), &entry, RenderResult::new());

    let first = request.resolve_entry().await.unwrap();
    assert_eq!(first.path, entry);

    // Removing the file after the first resolution must not change the answer.
    std::fs::remove_file(&entry).unwrap();
    assert!(request.resolve_entry().await.is_some());
  }
}
