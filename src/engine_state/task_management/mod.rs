//! # Task Management System
//!
//! A small worker pool for CPU-bound work that must not touch the GPU, such as
//! terrain generation.
//!
//! ## Architecture Overview
//! - `TaskManager`: Central coordinator for task distribution and worker management
//! - `Task`: A unit of work that can be executed asynchronously
//! - `TaskResult`: The result of a completed task, applied on the owner thread
//! - `TaskChannel`: Communication channel between the owner thread and one worker
//!
//! Each worker is an OS thread with its own pair of `mpsc` channels. Tasks are
//! handed out round-robin, at most `MAX_TASKS_IN_FLIGHT` per worker; the rest
//! wait in a FIFO queue.
//!
//! ## Task Lifecycle
//! 1. Tasks are created and published via `TaskManager::publish_task()`
//! 2. The manager distributes tasks to available worker channels using round-robin
//! 3. Workers process tasks and send back results
//! 4. Results are applied on the owner thread in `process_completed_tasks()`
//!
//! A worker that panics takes its channel down with it. The next drain drops
//! that channel and reports the chunks it was holding as lost; the remaining
//! workers carry on.
//!
//! ## Example Usage
//! ```no_run
//! use std::sync::Arc;
//! use cgmath::Point2;
//! use voxel_world::engine_state::task_management::TaskManager;
//! use voxel_world::engine_state::voxels::{
//!     tasks::chunk_generation_task::ChunkGenerationTask,
//!     terrain::{TerrainGenerator, TerrainParams},
//!     world::World,
//! };
//!
//! let generator = Arc::new(TerrainGenerator::new(7, TerrainParams::default()));
//! let mut task_manager = TaskManager::new(2);
//! let mut world = World::new();
//!
//! task_manager.publish_task(Box::new(ChunkGenerationTask::new(generator, Point2::new(0, 0))));
//!
//! // In the main loop:
//! let completed = task_manager.process_completed_tasks(&mut world);
//! task_manager.process_queued_tasks();
//! ```

pub mod task;

use std::collections::VecDeque;
use std::sync::mpsc::{channel, Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};

use log::{info, warn};
use task::{Task, TaskResult};

use crate::core::EngineError;
use crate::engine_state::voxels::{coords::ChunkCoord, world::World};

/// A communication channel between the owner thread and a worker thread.
///
/// # Fields
/// - `task_sender`: Sends tasks from the owner thread to the worker
/// - `result_receiver`: Receives task results from the worker
/// - `in_flight`: Chunks of the tasks currently being processed
/// - `_worker`: Handle to the worker thread
#[derive(Debug)]
pub struct TaskChannel {
    task_sender: Sender<Box<dyn Task + Send>>,
    result_receiver: Receiver<Box<dyn TaskResult + Send>>,
    in_flight: Vec<ChunkCoord>,
    _worker: JoinHandle<()>,
}

impl TaskChannel {
    /// Applies every result this worker has sent so far.
    ///
    /// # Returns
    /// `false` once the worker is gone; its unfinished chunks are moved to
    /// `completed.lost`.
    fn collect_results(&mut self, world: &mut World, completed: &mut CompletedTasks) -> bool {
        loop {
            match self.result_receiver.try_recv() {
                Ok(result) => {
                    let coord = result.coord();
                    if let Some(idx) = self.in_flight.iter().position(|&pending| pending == coord) {
                        self.in_flight.remove(idx);
                    }
                    completed.finished.push(coord);

                    match result.handle_result(world) {
                        Ok(Some(loaded)) => completed.loaded.push(loaded),
                        Ok(None) => {}
                        Err(err) => {
                            warn!("Could not apply result for chunk {:?}: {}", coord, err);
                            completed.failed.push((coord, err));
                        }
                    }
                }
                Err(TryRecvError::Empty) => return true,
                Err(TryRecvError::Disconnected) => {
                    warn!(
                        "Generation worker died with {} tasks in flight; dropping its channel",
                        self.in_flight.len()
                    );
                    completed.lost.append(&mut self.in_flight);
                    return false;
                }
            }
        }
    }
}

/// Manages a pool of worker threads and coordinates task execution.
///
/// Dropping the manager closes every task channel, which ends the workers
/// once they finish their current task.
pub struct TaskManager {
    channels: Vec<TaskChannel>,
    queued_tasks: VecDeque<Box<dyn Task + Send>>,
    current_channel: usize,
}

/// Maximum number of tasks that can be in flight per worker channel.
pub const MAX_TASKS_IN_FLIGHT: usize = 1;

impl TaskManager {
    /// Creates a new `TaskManager` with the specified number of worker threads.
    ///
    /// # Panics
    /// Panics if the underlying thread creation fails.
    pub fn new(num_workers: usize) -> Self {
        let mut channels = Vec::with_capacity(num_workers);

        info!(
            "Starting {} generation workers (available parallelism: {:?})",
            num_workers,
            thread::available_parallelism()
        );

        for _ in 0..num_workers {
            let (task_tx, task_rx) = channel::<Box<dyn Task + Send>>();
            let (result_tx, result_rx) = channel::<Box<dyn TaskResult + Send>>();

            let worker = thread::spawn(move || {
                while let Ok(task) = task_rx.recv() {
                    let result = task.process();
                    if result_tx.send(result).is_err() {
                        break;
                    }
                }
            });

            channels.push(TaskChannel {
                task_sender: task_tx,
                result_receiver: result_rx,
                in_flight: Vec::new(),
                _worker: worker,
            });
        }

        TaskManager {
            channels,
            queued_tasks: VecDeque::new(),
            current_channel: 0,
        }
    }

    /// Number of live worker threads.
    pub fn worker_count(&self) -> usize {
        self.channels.len()
    }

    /// Tasks sent to a worker and not yet collected.
    pub fn tasks_in_flight(&self) -> usize {
        self.channels.iter().map(|channel| channel.in_flight.len()).sum()
    }

    /// Tasks waiting for a free worker.
    pub fn queued_task_count(&self) -> usize {
        self.queued_tasks.len()
    }

    /// Attempts to send a task to a specific worker channel.
    ///
    /// # Returns
    /// - `Ok(())` if the task was successfully sent to the worker
    /// - `Err(task)` if the worker has disconnected
    fn try_send_task(
        &mut self,
        task: Box<dyn Task + Send>,
        channel_idx: usize,
    ) -> Result<(), Box<dyn Task + Send>> {
        let coord = task.coord();
        match self.channels[channel_idx].task_sender.send(task) {
            Ok(_) => {
                self.channels[channel_idx].in_flight.push(coord);
                Ok(())
            }
            Err(task) => Err(task.0),
        }
    }

    /// Finds a worker channel that can accept a new task, round-robin from the
    /// last used one.
    fn find_available_channel(&self) -> Option<usize> {
        let count = self.channels.len();
        (0..count)
            .map(|offset| (self.current_channel + offset) % count)
            .find(|&idx| self.channels[idx].in_flight.len() < MAX_TASKS_IN_FLIGHT)
    }

    /// Publishes a new task for execution.
    ///
    /// # Returns
    /// - `true` if the task was immediately scheduled on an available worker
    /// - `false` if the task was queued because all workers are busy
    pub fn publish_task(&mut self, task: Box<dyn Task + Send>) -> bool {
        let Some(channel_idx) = self.find_available_channel() else {
            self.queued_tasks.push_back(task);
            return false;
        };

        match self.try_send_task(task, channel_idx) {
            Ok(_) => {
                self.current_channel = (channel_idx + 1) % self.channels.len();
                true
            }
            Err(task) => {
                warn!("Worker {} disconnected, queueing task", channel_idx);
                self.queued_tasks.push_back(task);
                false
            }
        }
    }

    /// Hands queued tasks to free workers, oldest first.
    pub fn process_queued_tasks(&mut self) {
        while let Some(channel_idx) = self.find_available_channel() {
            let Some(task) = self.queued_tasks.pop_front() else {
                break;
            };
            match self.try_send_task(task, channel_idx) {
                Ok(_) => self.current_channel = (channel_idx + 1) % self.channels.len(),
                Err(task) => {
                    self.queued_tasks.push_front(task);
                    break;
                }
            }
        }
    }

    /// Applies every finished result to `world` and drops dead workers.
    ///
    /// Must be called on the thread that owns `world`. A result that fails to
    /// apply does not stop the drain; it is logged and listed in
    /// [`CompletedTasks::failed`].
    pub fn process_completed_tasks(&mut self, world: &mut World) -> CompletedTasks {
        let mut completed = CompletedTasks::default();

        let before = self.channels.len();
        self.channels
            .retain_mut(|channel| channel.collect_results(world, &mut completed));

        if self.channels.len() < before {
            warn!("{} of {} generation workers remain", self.channels.len(), before);
            self.current_channel = match self.channels.len() {
                0 => 0,
                len => self.current_channel % len,
            };
        }

        completed
    }
}

/// What one `process_completed_tasks` call collected.
#[derive(Debug, Default)]
pub struct CompletedTasks {
    /// Every chunk whose task came back, stale, failed or not
    pub finished: Vec<ChunkCoord>,
    /// Chunks that were actually added to the world
    pub loaded: Vec<ChunkCoord>,
    /// Returned chunks whose result could not be applied
    pub failed: Vec<(ChunkCoord, EngineError)>,
    /// Chunks whose worker died before returning them
    pub lost: Vec<ChunkCoord>,
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use cgmath::Point2;

    use super::*;
    use crate::core::EngineResult;
    use crate::engine_state::voxels::chunk::Chunk;

    struct EmptyChunkTask(ChunkCoord);

    struct EmptyChunkResult(ChunkCoord);

    impl Task for EmptyChunkTask {
        fn process(&self) -> Box<dyn TaskResult + Send> {
            Box::new(EmptyChunkResult(self.0))
        }

        fn coord(&self) -> ChunkCoord {
            self.0
        }
    }

    /// Returns a result that cannot be applied.
    struct RejectedTask(ChunkCoord);

    struct RejectedResult(ChunkCoord);

    impl Task for RejectedTask {
        fn process(&self) -> Box<dyn TaskResult + Send> {
            Box::new(RejectedResult(self.0))
        }

        fn coord(&self) -> ChunkCoord {
            self.0
        }
    }

    impl TaskResult for RejectedResult {
        fn handle_result(self: Box<Self>, _world: &mut World) -> EngineResult<Option<ChunkCoord>> {
            Err(EngineError::ChunkAlreadyLoaded(self.0))
        }

        fn coord(&self) -> ChunkCoord {
            self.0
        }
    }

    /// Kills its worker thread.
    struct PanickingTask(ChunkCoord);

    impl Task for PanickingTask {
        fn process(&self) -> Box<dyn TaskResult + Send> {
            panic!("generation blew up for {:?}", self.0);
        }

        fn coord(&self) -> ChunkCoord {
            self.0
        }
    }

    impl TaskResult for EmptyChunkResult {
        fn handle_result(self: Box<Self>, world: &mut World) -> EngineResult<Option<ChunkCoord>> {
            world.insert(Chunk::empty(self.0))?;
            Ok(Some(self.0))
        }

        fn coord(&self) -> ChunkCoord {
            self.0
        }
    }

    fn drain(manager: &mut TaskManager, world: &mut World, expected: usize) -> Vec<ChunkCoord> {
        let deadline = Instant::now() + Duration::from_secs(10);
        let mut loaded = Vec::new();
        while loaded.len() < expected && Instant::now() < deadline {
            loaded.extend(manager.process_completed_tasks(world).loaded);
            manager.process_queued_tasks();
            thread::sleep(Duration::from_millis(1));
        }
        loaded
    }

    #[test]
    fn test_tasks_beyond_capacity_are_queued() {
        let mut manager = TaskManager::new(2);
        let mut world = World::new();

        let scheduled: Vec<bool> = (0..5)
            .map(|i| manager.publish_task(Box::new(EmptyChunkTask(Point2::new(i, 0)))))
            .collect();
        assert_eq!(scheduled, vec![true, true, false, false, false]);
        assert_eq!(manager.queued_task_count(), 3);

        let loaded = drain(&mut manager, &mut world, 5);
        assert_eq!(loaded.len(), 5);
        assert_eq!(world.len(), 5);
        assert_eq!(manager.tasks_in_flight(), 0);
        assert_eq!(manager.queued_task_count(), 0);
    }

    #[test]
    fn test_failed_result_keeps_the_rest_of_the_drain() {
        let mut manager = TaskManager::new(3);
        let mut world = World::new();

        manager.publish_task(Box::new(EmptyChunkTask(Point2::new(0, 0))));
        manager.publish_task(Box::new(RejectedTask(Point2::new(1, 0))));
        manager.publish_task(Box::new(EmptyChunkTask(Point2::new(2, 0))));

        let deadline = Instant::now() + Duration::from_secs(10);
        let mut completed = CompletedTasks::default();
        while completed.finished.len() < 3 && Instant::now() < deadline {
            let mut drained = manager.process_completed_tasks(&mut world);
            completed.finished.append(&mut drained.finished);
            completed.loaded.append(&mut drained.loaded);
            completed.failed.append(&mut drained.failed);
            thread::sleep(Duration::from_millis(1));
        }

        completed.finished.sort_by_key(|coord| coord.x);
        assert_eq!(
            completed.finished,
            vec![Point2::new(0, 0), Point2::new(1, 0), Point2::new(2, 0)]
        );
        assert_eq!(completed.loaded.len(), 2);
        assert_eq!(completed.failed.len(), 1);
        assert_eq!(completed.failed[0].0, Point2::new(1, 0));
        assert_eq!(world.len(), 2);
        assert_eq!(manager.tasks_in_flight(), 0);
        assert_eq!(manager.worker_count(), 3);
    }

    #[test]
    fn test_dead_worker_is_dropped_and_others_continue() {
        let mut manager = TaskManager::new(2);
        let mut world = World::new();

        manager.publish_task(Box::new(PanickingTask(Point2::new(9, 9))));
        manager.publish_task(Box::new(EmptyChunkTask(Point2::new(0, 0))));
        manager.publish_task(Box::new(EmptyChunkTask(Point2::new(1, 0))));

        let deadline = Instant::now() + Duration::from_secs(10);
        let mut lost = Vec::new();
        while (world.len() < 2 || manager.worker_count() > 1) && Instant::now() < deadline {
            lost.extend(manager.process_completed_tasks(&mut world).lost);
            manager.process_queued_tasks();
            thread::sleep(Duration::from_millis(1));
        }

        assert_eq!(lost, vec![Point2::new(9, 9)]);
        assert_eq!(manager.worker_count(), 1);
        assert_eq!(world.len(), 2);
        assert_eq!(manager.tasks_in_flight(), 0);
        assert_eq!(manager.queued_task_count(), 0);
    }

    #[test]
    fn test_no_workers_queues_everything() {
        let mut manager = TaskManager::new(0);
        assert!(!manager.publish_task(Box::new(EmptyChunkTask(Point2::new(0, 0)))));
        manager.process_queued_tasks();
        assert_eq!(manager.queued_task_count(), 1);
    }
}
