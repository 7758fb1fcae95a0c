//! Build orchestration.
//!
//! The orchestrator runs discovery, then fans out every
//! (component, plugin) pairing and runs the render lifecycle for each:
//!
//! 1. Clean: delete the outputs recorded by the pairing's previous
//!    result, if any. Best-effort per file.
//! 2. Render: resolve the plugin's entry file inside the component
//!    directory and invoke the plugin; a missing entry skips the
//!    invocation entirely and is not an error.
//! 3. Collect: record the entry source and any failure; a failure's
//!    associated file becomes a dependency so stale partial state is
//!    purged on the next run.
//! 4. Write: copy every dependency and write every binary into
//!    `<dist>/<component>`, all concurrently, joining before the
//!    pairing completes.
//!
//! Pairings race freely against each other. A plugin failure is recorded
//! as data inside its result and never aborts the build; only discovery
//! errors do.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use futures::FutureExt;
use futures::future::{BoxFuture, join_all};
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::component::Component;
use crate::discover::{DiscoverError, discover_components};
use crate::plugin::Plugin;
use crate::render::RenderResult;
use crate::source::{RenderError, Source};

/// Errors that abort a build before rendering starts.
///
/// Render failures are not build errors: they are recorded inside the
/// affected pairing's [`RenderResult`] and the build resolves normally.
#[derive(Debug, Error)]
pub enum BuildError {
  /// The options failed validation.
  #[error("invalid build options: {0}")]
  InvalidOptions(String),

  /// Component discovery failed.
  #[error("discovery error: {0}")]
  Discover(#[from] DiscoverError),
}

/// Options for a build run.
///
/// Two plugins rendering the same component may emit colliding output
/// filenames; the engine does not arbitrate (last write wins).
#[derive(Debug, Clone)]
pub struct BuildOptions {
  /// Project name, logged in the build banner. Required.
  pub project_name: String,

  /// Project version, logged in the build banner. Required.
  pub project_version: String,

  /// Optional project description for the banner.
  pub project_description: String,

  /// Directory to discover components under.
  pub component_root: PathBuf,

  /// Filename that declares a component.
  pub manifest_name: String,

  /// Destination root for rendered output.
  pub dist: PathBuf,

  /// Maximum number of pairings rendered in parallel.
  pub parallelism: usize,
}

impl Default for BuildOptions {
  fn default() -> Self {
    Self {
      project_name: String::new(),
      project_version: String::new(),
      project_description: String::new(),
      component_root: PathBuf::from("."),
      manifest_name: "component.json".to_string(),
      dist: PathBuf::from("dist"),
      parallelism: num_cpus(),
    }
  }
}

impl BuildOptions {
  /// Check that required fields are present.
  pub fn validate(&self) -> Result<(), BuildError> {
    if self.project_name.is_empty() {
      return Err(BuildError::InvalidOptions("project_name is required".to_string()));
    }
    if self.project_version.is_empty() {
      return Err(BuildError::InvalidOptions("project_version is required".to_string()));
    }
    Ok(())
  }
}

/// Get the number of CPUs for default parallelism.
fn num_cpus() -> usize {
  std::thread::available_parallelism().map(|p| p.get()).unwrap_or(4)
}

/// Run a full build: discover components under the configured root and
/// render every one with every plugin.
///
/// Returns the flat component list, each carrying its per-plugin render
/// results. Callers must inspect each result's `errors` to detect
/// failures; there is no aggregate failure signal.
pub async fn build(options: &BuildOptions, plugins: &[Arc<dyn Plugin>]) -> Result<Vec<Component>, BuildError> {
  options.validate()?;

  info!(
    project = %options.project_name,
    version = %options.project_version,
    "starting build"
  );
  if !options.project_description.is_empty() {
    info!("{}", options.project_description);
  }
  info!(plugins = plugins.len(), "plugins configured");

  let mut components = discover_components(&options.component_root, &options.manifest_name)?;
  render_components(&mut components, plugins, options).await;

  info!(count = components.len(), "components rendered");
  Ok(components)
}

/// Render every (component, plugin) pairing and store each result under
/// its plugin's name.
///
/// Components that already carry render results (from a previous call in
/// the same process) have those results' outputs cleaned before the new
/// render begins. Pairings run concurrently, bounded by
/// `options.parallelism`; each pairing writes a distinct map key, so no
/// two tasks touch the same entry.
pub async fn render_components(components: &mut [Component], plugins: &[Arc<dyn Plugin>], options: &BuildOptions) {
  let semaphore = Arc::new(Semaphore::new(options.parallelism.max(1)));
  let mut join_set: JoinSet<(usize, String, RenderResult)> = JoinSet::new();

  for (idx, component) in components.iter().enumerate() {
    for plugin in plugins {
      let plugin = plugin.clone();
      let component_name = component.name.clone();
      let component_path = component.path.clone();
      let previous = component.render_results.get(plugin.name()).cloned();
      let root = options.component_root.clone();
      let dist = options.dist.clone();
      let semaphore = semaphore.clone();

      join_set.spawn(async move {
        let _permit = semaphore.acquire().await.unwrap();

        let result = render_component_plugin(&*plugin, &component_name, &component_path, previous, &root, &dist).await;

        (idx, plugin.name().to_string(), result)
      });
    }
  }

  while let Some(join_result) = join_set.join_next().await {
    match join_result {
      Ok((idx, plugin_name, result)) => {
        components[idx].render_results.insert(plugin_name, result);
      }
      Err(e) => {
        error!(error = %e, "render task panicked");
      }
    }
  }
}

/// Run the clean → render → collect → write lifecycle for one pairing.
///
/// Never fails: every failure ends up recorded inside the returned
/// result.
async fn render_component_plugin(
  plugin: &dyn Plugin,
  component_name: &str,
  component_path: &Path,
  previous: Option<RenderResult>,
  root: &Path,
  dist: &Path,
) -> RenderResult {
  let started = Instant::now();

  info!(component = component_name, plugin = plugin.name(), "rendering component");

  if let Some(previous) = &previous {
    clean_previous(previous, component_name, component_path, root, dist).await;
  }

  let mut result = RenderResult::new();
  let entry = component_path.join(plugin.entry());

  match tokio::fs::try_exists(&entry).await {
    Ok(true) => {
      let source = Source::new(entry.clone());

      match plugin.render(Some(source.clone()), &mut result).await {
        Ok(()) => {
          result.add_source(source, None);
        }
        Err(render_error) => {
          error!(
            component = component_name,
            plugin = plugin.name(),
            error = %render_error,
            "render failed"
          );

          if let Some(file) = &render_error.file {
            result.add_dependency(file.clone());
          }
          result.add_source(source, Some(render_error.clone()));
          result.add_error(render_error);
        }
      }
    }
    _ => {
      debug!(
        component = component_name,
        plugin = plugin.name(),
        entry = %entry.display(),
        "entry not found, skipping render"
      );
    }
  }

  write_outputs(&mut result, component_name, component_path, root, dist).await;

  info!(
    component = component_name,
    plugin = plugin.name(),
    elapsed_ms = started.elapsed().as_millis() as u64,
    "component rendered"
  );

  result
}

/// Map a dependency to its destination under `<dist>/<component>`.
///
/// Paths inside the component directory keep their component-relative
/// path; paths elsewhere under the working root keep their root-relative
/// path. The clean phase and the write phase must agree on this mapping,
/// so both go through here.
fn dependency_output_path(dep: &Path, component_path: &Path, root: &Path, out_dir: &Path) -> Option<PathBuf> {
  let rel = dep
    .strip_prefix(component_path)
    .or_else(|_| dep.strip_prefix(root))
    .ok()?;
  Some(out_dir.join(rel))
}

/// Delete the outputs a previous result produced under
/// `<dist>/<component>`: one file per recorded dependency, one per
/// emitted binary. Best-effort per file; a missing file is not an error.
async fn clean_previous(previous: &RenderResult, component_name: &str, component_path: &Path, root: &Path, dist: &Path) {
  let out_dir = dist.join(component_name);

  for dep in previous.dependencies() {
    let Some(to) = dependency_output_path(dep, component_path, root, &out_dir) else {
      // Never copied, so nothing to clean.
      continue;
    };
    remove_output(to).await;
  }

  for binary in previous.binaries() {
    remove_output(out_dir.join(&binary.name)).await;
    if binary.source_map.is_some() {
      remove_output(out_dir.join(format!("{}.map", binary.name))).await;
    }
  }
}

async fn remove_output(path: PathBuf) {
  match tokio::fs::remove_file(&path).await {
    Ok(()) => debug!(path = %path.display(), "cleaned"),
    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
    Err(e) => warn!(path = %path.display(), error = %e, "failed to clean output"),
  }
}

/// Materialize a result: copy every dependency to its mapped path under
/// `<dist>/<component>` and write every binary to
/// `<dist>/<component>/<name>`. All copies and writes run concurrently;
/// individual failures are recorded on the result and do not abort
/// sibling writes.
async fn write_outputs(result: &mut RenderResult, component_name: &str, component_path: &Path, root: &Path, dist: &Path) {
  let out_dir = dist.join(component_name);
  let mut writes: Vec<BoxFuture<'_, Option<RenderError>>> = Vec::new();

  for dep in result.dependencies() {
    let to = dependency_output_path(dep, component_path, root, &out_dir);
    writes.push(
      async move {
        let Some(to) = to else {
          return Some(
            RenderError::new(format!("dependency {} is outside the working root", dep.display()))
              .with_file(dep.clone()),
          );
        };

        debug!(from = %dep.display(), to = %to.display(), "copying dependency");

        match copy_file(dep, &to).await {
          Ok(()) => None,
          Err(e) => {
            Some(RenderError::new(format!("failed to copy {}: {}", dep.display(), e)).with_file(dep.clone()))
          }
        }
      }
      .boxed(),
    );
  }

  for binary in result.binaries() {
    let to = out_dir.join(&binary.name);
    // Same path construction as the clean phase, so a nested binary
    // name places the map where the next clean will look for it.
    let map_to = out_dir.join(format!("{}.map", binary.name));
    writes.push(
      async move {
        debug!(to = %to.display(), bytes = binary.data.len(), "writing binary");

        if let Err(e) = write_file(&to, &binary.data).await {
          return Some(RenderError::new(format!("failed to write {}: {}", to.display(), e)));
        }

        if let Some(map) = &binary.source_map {
          if let Err(e) = write_file(&map_to, map).await {
            return Some(RenderError::new(format!("failed to write {}: {}", map_to.display(), e)));
          }
        }

        None
      }
      .boxed(),
    );
  }

  let write_errors: Vec<RenderError> = join_all(writes).await.into_iter().flatten().collect();

  for write_error in write_errors {
    warn!(component = component_name, error = %write_error, "output write failed");
    result.add_error(write_error);
  }
}

async fn copy_file(from: &Path, to: &Path) -> std::io::Result<()> {
  if let Some(parent) = to.parent() {
    tokio::fs::create_dir_all(parent).await?;
  }
  tokio::fs::copy(from, to).await?;
  Ok(())
}

async fn write_file(to: &Path, data: &[u8]) -> std::io::Result<()> {
  if let Some(parent) = to.parent() {
    tokio::fs::create_dir_all(parent).await?;
  }
  tokio::fs::write(to, data).await
}
