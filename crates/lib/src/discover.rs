//! Component discovery.
//!
//! Walks a directory tree looking for manifest files; every file whose
//! name equals the manifest filename yields one [`Component`] rooted at
//! the manifest's containing directory. Components do not nest: a
//! manifest deeper in the tree is an independent component.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::component::Component;

/// Errors that can occur during discovery.
///
/// Any of these fails the whole discovery: no partial component list is
/// returned.
#[derive(Debug, Error)]
pub enum DiscoverError {
  /// A directory entry could not be read.
  #[error("failed to walk {path}")]
  Walk {
    path: PathBuf,
    #[source]
    source: walkdir::Error,
  },

  /// A manifest file could not be read.
  #[error("failed to read manifest {path}")]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  /// A manifest file could not be parsed.
  #[error("failed to parse manifest {path}")]
  Parse {
    path: PathBuf,
    #[source]
    source: serde_json::Error,
  },
}

/// The only field the engine requires from a manifest. Unknown fields
/// are plugin/configuration territory and are ignored.
#[derive(Debug, Deserialize)]
struct ComponentManifest {
  name: String,
}

/// Find every component under `root`.
///
/// A component is declared by a file named exactly `manifest_name`; its
/// path is that file's containing directory. Entries are visited in
/// file-name order so results are deterministic.
pub fn discover_components(root: &Path, manifest_name: &str) -> Result<Vec<Component>, DiscoverError> {
  info!(root = %root.display(), manifest = manifest_name, "discovering components");

  let mut components = Vec::new();

  for entry in WalkDir::new(root).sort_by_file_name() {
    let entry = entry.map_err(|e| DiscoverError::Walk {
      path: e.path().unwrap_or(root).to_path_buf(),
      source: e,
    })?;

    if !entry.file_type().is_file() || entry.file_name() != manifest_name {
      continue;
    }

    let manifest_path = entry.path();
    let content = fs::read_to_string(manifest_path).map_err(|e| DiscoverError::Read {
      path: manifest_path.to_path_buf(),
      source: e,
    })?;

    let manifest: ComponentManifest = serde_json::from_str(&content).map_err(|e| DiscoverError::Parse {
      path: manifest_path.to_path_buf(),
      source: e,
    })?;

    let dir = manifest_path.parent().unwrap_or(root);
    debug!(component = %manifest.name, path = %dir.display(), "component found");
    components.push(Component::new(manifest.name, dir));
  }

  info!(count = components.len(), "components discovered");
  Ok(components)
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::TempDir;

  const MANIFEST: &str = "component.json";

  fn write_manifest(dir: &Path, name: &str) {
    fs::create_dir_all(dir).unwrap();
    fs::write(dir.join(MANIFEST), format!(r#"{{"name": "{}"}}"#, name)).unwrap();
  }

  #[test]
  fn empty_tree_yields_no_components() {
    let temp = TempDir::new().unwrap();
    let components = discover_components(temp.path(), MANIFEST).unwrap();
    assert!(components.is_empty());
  }

  #[test]
  fn manifest_yields_component_in_containing_directory() {
    let temp = TempDir::new().unwrap();
    let widget_dir = temp.path().join("widget");
    write_manifest(&widget_dir, "widget");

    let components = discover_components(temp.path(), MANIFEST).unwrap();
    assert_eq!(components.len(), 1);
    assert_eq!(components[0].name, "widget");
    assert_eq!(components[0].path, widget_dir);
  }

  #[test]
  fn other_files_never_produce_components() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("widget");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("component.json.bak"), r#"{"name": "nope"}"#).unwrap();
    fs::write(dir.join("style.less"), "body {}").unwrap();

    let components = discover_components(temp.path(), MANIFEST).unwrap();
    assert!(components.is_empty());
  }

  #[test]
  fn manifests_at_different_depths_are_independent() {
    let temp = TempDir::new().unwrap();
    write_manifest(&temp.path().join("widget"), "widget");
    write_manifest(&temp.path().join("widget").join("button"), "button");
    write_manifest(&temp.path().join("footer"), "footer");

    let components = discover_components(temp.path(), MANIFEST).unwrap();
    let names: Vec<&str> = components.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["footer", "button", "widget"]);
  }

  #[test]
  fn unparseable_manifest_fails_discovery() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("widget");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(MANIFEST), "not json").unwrap();

    let err = discover_components(temp.path(), MANIFEST).unwrap_err();
    assert!(matches!(err, DiscoverError::Parse { .. }));
  }

  #[test]
  fn manifest_without_name_fails_discovery() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("widget");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(MANIFEST), r#"{"version": "1.0.0"}"#).unwrap();

    let err = discover_components(temp.path(), MANIFEST).unwrap_err();
    assert!(matches!(err, DiscoverError::Parse { .. }));
  }

  #[test]
  fn extra_manifest_fields_are_ignored() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("widget");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(MANIFEST), r#"{"name": "widget", "version": "2.0.0", "tags": ["ui"]}"#).unwrap();

    let components = discover_components(temp.path(), MANIFEST).unwrap();
    assert_eq!(components.len(), 1);
    assert_eq!(components[0].name, "widget");
  }

  #[test]
  fn missing_root_fails_discovery() {
    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("does-not-exist");

    let err = discover_components(&missing, MANIFEST).unwrap_err();
    assert!(matches!(err, DiscoverError::Walk { .. }));
  }
}
