//! # Task System Core Traits
//!
//! ## Core Components
//! - `Task`: A unit of CPU work that runs on a worker thread
//! - `TaskResult`: What a task hands back to the owner thread
//!
//! ## Task Lifecycle
//! 1. A `Task` is created and scheduled via `TaskManager::publish_task()`
//! 2. The task's `process()` method is called on a worker thread
//! 3. The task returns a boxed `TaskResult`
//! 4. The result's `handle_result()` is called on the owner thread, which is
//!    the only place the chunk store is touched
//!
//! ## Thread Safety
//! - `Task` must be `Send` to be transferred between threads
//! - `TaskResult` must be `Send` to be transferred back to the owner thread
//! - Tasks never touch the GPU; uploads stay on the owner thread

use crate::{
    core::EngineResult,
    engine_state::voxels::{coords::ChunkCoord, world::World},
};

/// A trait representing a unit of work that can be executed asynchronously.
///
/// Tasks should own everything they need and hold no references to data
/// that might be modified elsewhere.
pub trait Task: Send {
    /// Processes the task and returns a result.
    ///
    /// Runs on a worker thread.
    fn process(&self) -> Box<dyn TaskResult + Send>;

    /// The chunk this task works on.
    ///
    /// Reported back as lost if the worker dies before returning a result.
    fn coord(&self) -> ChunkCoord;
}

/// A trait representing the result of processing a `Task`.
pub trait TaskResult: Send {
    /// Applies the result to the world on the owner thread.
    ///
    /// # Returns
    /// The coordinate of the chunk that was added to `world`, or `None` if the
    /// result turned out to be stale.
    fn handle_result(self: Box<Self>, world: &mut World) -> EngineResult<Option<ChunkCoord>>;

    /// The chunk this result is about.
    fn coord(&self) -> ChunkCoord;
}
