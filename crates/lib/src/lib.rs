//! kiln-lib: component-oriented build pipeline engine
//!
//! This crate provides the render orchestration core:
//! - `discover`: locate components (manifest + containing directory) under a root
//! - `build`: run every plugin over every component through the
//!   clean → render → collect → write lifecycle
//! - `render`: the per-(component, plugin) result ledger and build request
//! - `job`: sequential/concurrent task composition for multi-stage renders
//!
//! Plugins are external capabilities implementing [`Plugin`]; the engine
//! holds them as opaque handles selected at configuration time.

pub mod build;
pub mod component;
pub mod discover;
pub mod job;
pub mod plugin;
pub mod render;
pub mod source;

pub use build::{BuildError, BuildOptions, build, render_components};
pub use component::Component;
pub use discover::{DiscoverError, discover_components};
pub use job::{JobConcurrent, JobSequential, Task};
pub use plugin::Plugin;
pub use render::{BuildRequest, RenderResult};
pub use source::{Binary, RenderError, Source};
