//! Task and job composition primitives.
//!
//! A [`Task`] is a unit of asynchronous work run against a
//! [`BuildRequest`]; a job is a task composed of an ordered list of
//! sub-tasks. [`JobSequential`] chains its tasks one at a time and
//! short-circuits on the first failure; [`JobConcurrent`] starts every
//! task at once, waits for all of them to settle, then reports the first
//! failure observed. Plugins use these to structure multi-stage renders;
//! the orchestrator does not use them to sequence components.

use async_trait::async_trait;
use futures::future::join_all;

use crate::render::BuildRequest;
use crate::source::RenderError;

/// A unit of asynchronous work within a render.
#[async_trait]
pub trait Task: Send + Sync {
  /// Human-readable description, for logging.
  fn description(&self) -> &str;

  /// Run the task against the active request.
  async fn run(&self, request: &BuildRequest) -> Result<(), RenderError>;
}

/// A job that runs its tasks in order, one at a time.
///
/// Task `k + 1` starts only after task `k` completed. The first failure
/// propagates immediately; later tasks never run.
pub struct JobSequential {
  description: String,
  tasks: Vec<Box<dyn Task>>,
}

impl JobSequential {
  /// Create a sequential job over an ordered task list.
  pub fn new(description: impl Into<String>, tasks: Vec<Box<dyn Task>>) -> Self {
    Self {
      description: description.into(),
      tasks,
    }
  }

  /// The sub-tasks, in run order.
  pub fn tasks(&self) -> &[Box<dyn Task>] {
    &self.tasks
  }
}

#[async_trait]
impl Task for JobSequential {
  fn description(&self) -> &str {
    &self.description
  }

  async fn run(&self, request: &BuildRequest) -> Result<(), RenderError> {
    for task in &self.tasks {
      task.run(request).await?;
    }
    Ok(())
  }
}

/// A job that starts all of its tasks at once and joins them.
///
/// No task is cancelled when a sibling fails: the job completes only
/// once every task has settled, then fails with the first failure in
/// task-list order if any occurred.
pub struct JobConcurrent {
  description: String,
  tasks: Vec<Box<dyn Task>>,
}

impl JobConcurrent {
  /// Create a concurrent job over a task list.
  pub fn new(description: impl Into<String>, tasks: Vec<Box<dyn Task>>) -> Self {
    Self {
      description: description.into(),
      tasks,
    }
  }

  /// The sub-tasks.
  pub fn tasks(&self) -> &[Box<dyn Task>] {
    &self.tasks
  }
}

#[async_trait]
impl Task for JobConcurrent {
  fn description(&self) -> &str {
    &self.description
  }

  async fn run(&self, request: &BuildRequest) -> Result<(), RenderError> {
    let results = join_all(self.tasks.iter().map(|task| task.run(request))).await;

    match results.into_iter().find_map(|result| result.err()) {
      Some(error) => Err(error),
      None => Ok(()),
    }
  }
}
