//! Value types describing render inputs and outputs.
//!
//! These are the immutable records exchanged between the engine and
//! plugins: a [`Source`] file that was examined, a [`Binary`] artifact
//! to materialize, and a [`RenderError`] describing a failure.

use std::fmt;
use std::path::PathBuf;

/// A source file examined during a render: a component's entry file or
/// a file the render depends on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
  /// Path of the file.
  pub path: PathBuf,

  /// File content, when the producer chose to load it.
  pub content: Option<Vec<u8>>,
}

impl Source {
  /// Create a source referencing a file by path, without content.
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self {
      path: path.into(),
      content: None,
    }
  }

  /// Create a source carrying loaded content.
  pub fn with_content(path: impl Into<PathBuf>, content: impl Into<Vec<u8>>) -> Self {
    Self {
      path: path.into(),
      content: Some(content.into()),
    }
  }
}

/// An artifact a plugin wants written into the output tree, named
/// relative to the component's output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binary {
  /// Output filename, relative to `<dist>/<component>`.
  pub name: String,

  /// Artifact bytes, written verbatim.
  pub data: Vec<u8>,

  /// Optional source map bytes.
  pub source_map: Option<Vec<u8>>,
}

impl Binary {
  /// Create a binary artifact.
  pub fn new(name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
    Self {
      name: name.into(),
      data: data.into(),
      source_map: None,
    }
  }

  /// Attach a source map to this binary.
  pub fn with_source_map(mut self, source_map: impl Into<Vec<u8>>) -> Self {
    self.source_map = Some(source_map.into());
    self
  }
}

/// A render failure, attributable to a specific location when known.
///
/// When `file` is set, the engine registers that path as a dependency of
/// the failed render so stale partial output is purged on the next run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderError {
  /// Human-readable failure message.
  pub message: String,

  /// File the failure is associated with, if known.
  pub file: Option<PathBuf>,

  /// Line within `file`, if known.
  pub line: Option<u32>,
}

impl RenderError {
  /// Create an error with a message and no location.
  pub fn new(message: impl Into<String>) -> Self {
    Self {
      message: message.into(),
      file: None,
      line: None,
    }
  }

  /// Associate the error with a file.
  pub fn with_file(mut self, file: impl Into<PathBuf>) -> Self {
    self.file = Some(file.into());
    self
  }

  /// Associate the error with a line number.
  pub fn with_line(mut self, line: u32) -> Self {
    self.line = Some(line);
    self
  }
}

impl fmt::Display for RenderError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.message)?;
    if let Some(file) = &self.file {
      write!(f, " ({}", file.display())?;
      if let Some(line) = self.line {
        write!(f, ":{}", line)?;
      }
      write!(f, ")")?;
    }
    Ok(())
  }
}

impl std::error::Error for RenderError {}
