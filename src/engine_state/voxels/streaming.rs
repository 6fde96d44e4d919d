//! # Chunk Streaming
//!
//! Keeps the set of loaded chunks centred on a moving observer.
//!
//! Each tick loads every chunk inside the render window and drops every chunk
//! further than `render_distance + eviction_margin`. The gap between the two
//! radii stops an observer pacing across a chunk border from regenerating the
//! same ring of chunks over and over.
//!
//! Generation runs inline by default. With workers enabled, voxel generation
//! moves to a [`TaskManager`] and finished chunks are inserted, meshed and
//! uploaded on the next tick, on the calling thread.

use std::collections::HashSet;
use std::sync::Arc;

use log::{debug, info, trace, warn};
use serde::{Deserialize, Serialize};
use web_time::Instant;

use crate::core::EngineResult;
use crate::engine_state::{
    rendering::meshing::MeshBackend,
    task_management::TaskManager,
};

use super::{
    coords::{chunk_coord_of_position, lateral_neighbors, ChunkCoord},
    tasks::chunk_generation_task::ChunkGenerationTask,
    terrain::TerrainGenerator,
    world::World,
};

/// Footprint of the load window around the observer chunk.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowShape {
    /// `dx² + dz² ≤ R²`
    #[default]
    Circle,
    /// `|dx| ≤ R` and `|dz| ≤ R`
    Square,
}

impl WindowShape {
    /// Whether the chunk offset `(dx, dz)` lies inside a window of radius `radius`.
    pub fn contains(self, dx: i32, dz: i32, radius: i32) -> bool {
        match self {
            WindowShape::Circle => distance_sq(dx, dz) <= i64::from(radius) * i64::from(radius),
            WindowShape::Square => dx.abs() <= radius && dz.abs() <= radius,
        }
    }
}

/// Squared chunk distance, widened so large offsets cannot overflow.
fn distance_sq(dx: i32, dz: i32) -> i64 {
    let (dx, dz) = (i64::from(dx), i64::from(dz));
    dx * dx + dz * dz
}

/// Radii that drive streaming, in chunks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StreamingSettings {
    pub render_distance: i32,
    pub eviction_margin: i32,
    pub window_shape: WindowShape,
}

impl Default for StreamingSettings {
    fn default() -> Self {
        StreamingSettings {
            render_distance: 8,
            eviction_margin: 2,
            window_shape: WindowShape::Circle,
        }
    }
}

impl StreamingSettings {
    /// Chunks further than this from the observer chunk are evicted.
    pub fn eviction_distance(&self) -> i32 {
        self.render_distance + self.eviction_margin
    }
}

/// What one [`StreamingController::tick`] did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StreamingReport {
    /// Chunk the observer stood in
    pub observer_chunk: ChunkCoord,
    /// Chunks inserted into the world this tick
    pub generated: usize,
    /// Chunks handed to generation workers this tick
    pub queued: usize,
    /// Already loaded chunks re-meshed because a neighbour arrived or left
    pub remeshed: usize,
    /// Chunks released and dropped
    pub evicted: usize,
    /// Background results that were lost or could not be applied; their
    /// chunks are requested again while still in the window
    pub failed: usize,
}

impl StreamingReport {
    fn new(observer_chunk: ChunkCoord) -> Self {
        StreamingReport {
            observer_chunk,
            generated: 0,
            queued: 0,
            remeshed: 0,
            evicted: 0,
            failed: 0,
        }
    }

    /// Whether the tick changed anything.
    pub fn is_idle(&self) -> bool {
        self.generated == 0 && self.queued == 0 && self.remeshed == 0 && self.evicted == 0 && self.failed == 0
    }
}

/// Observer-driven chunk loader and evictor.
pub struct StreamingController {
    settings: StreamingSettings,
    /// Background generation, `None` when generating inline
    task_manager: Option<TaskManager>,
    /// Chunks published to workers and not yet returned
    pending: HashSet<ChunkCoord>,
    generation_count: u64,
}

impl StreamingController {
    /// Creates a controller that generates chunks inline.
    pub fn new(settings: StreamingSettings) -> Self {
        StreamingController {
            settings,
            task_manager: None,
            pending: HashSet::new(),
            generation_count: 0,
        }
    }

    /// Moves generation onto `workers` background threads. Zero keeps it inline.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.task_manager = (workers > 0).then(|| TaskManager::new(workers));
        self
    }

    pub fn settings(&self) -> &StreamingSettings {
        &self.settings
    }

    /// Total chunks generated since creation.
    pub fn generation_count(&self) -> u64 {
        self.generation_count
    }

    /// Chunks waiting on a generation worker.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Whether generation runs on worker threads.
    pub fn is_background(&self) -> bool {
        self.task_manager.is_some()
    }

    /// Coordinates of the load window around `center`, nearest first.
    pub fn window(&self, center: ChunkCoord) -> Vec<ChunkCoord> {
        let radius = self.settings.render_distance;
        let shape = self.settings.window_shape;

        let mut offsets: Vec<(i32, i32)> = (-radius..=radius)
            .flat_map(|dx| (-radius..=radius).map(move |dz| (dx, dz)))
            .filter(|&(dx, dz)| shape.contains(dx, dz, radius))
            .collect();
        offsets.sort_by_key(|&(dx, dz)| (distance_sq(dx, dz), dz, dx));

        offsets
            .into_iter()
            .map(|(dx, dz)| ChunkCoord::new(center.x + dx, center.y + dz))
            .collect()
    }

    /// Runs one streaming step for an observer at world `(observer_x, observer_z)`.
    ///
    /// Loads missing chunks inside the window, meshes them, re-meshes loaded
    /// chunks that gained a neighbour, then evicts chunks beyond the eviction
    /// distance and re-meshes the survivors that bordered them. All
    /// insertions happen before any eviction.
    ///
    /// Background results that fail to apply, or die with their worker, are
    /// logged and counted in [`StreamingReport::failed`]. If every worker has
    /// died, generation falls back to running inline.
    ///
    /// # Errors
    /// Mesh upload failures are propagated. Chunks inserted before the
    /// failure stay loaded.
    pub fn tick(
        &mut self,
        world: &mut World,
        generator: &Arc<TerrainGenerator>,
        backend: &mut dyn MeshBackend,
        observer_x: f32,
        observer_z: f32,
    ) -> EngineResult<StreamingReport> {
        let started = Instant::now();
        let observer_chunk = chunk_coord_of_position(observer_x, observer_z);
        let mut report = StreamingReport::new(observer_chunk);

        let mut new_chunks = Vec::new();

        let mut workers_lost = false;
        if let Some(task_manager) = self.task_manager.as_mut() {
            let completed = task_manager.process_completed_tasks(world);
            for coord in completed.finished.iter().chain(&completed.lost) {
                self.pending.remove(coord);
            }
            self.generation_count += completed.finished.len() as u64;
            report.failed = completed.failed.len() + completed.lost.len();
            new_chunks.extend(completed.loaded);
            workers_lost = task_manager.worker_count() == 0;
        }
        if workers_lost {
            warn!(
                "Every generation worker has died; generating inline from now on ({} requests dropped)",
                self.pending.len()
            );
            self.pending.clear();
            self.task_manager = None;
        }

        for coord in self.window(observer_chunk) {
            if world.contains(coord) || self.pending.contains(&coord) {
                continue;
            }

            match self.task_manager.as_mut() {
                Some(task_manager) => {
                    task_manager.publish_task(Box::new(ChunkGenerationTask::new(generator.clone(), coord)));
                    self.pending.insert(coord);
                    report.queued += 1;
                }
                None => {
                    world.insert(generator.generate(coord))?;
                    self.generation_count += 1;
                    debug!("Generated chunk {:?}", coord);
                    new_chunks.push(coord);
                }
            }
        }
        report.generated = new_chunks.len();

        self.mesh_new_chunks(world, backend, &new_chunks, &mut report)?;
        self.evict_distant(world, backend, observer_chunk, &mut report)?;

        if let Some(task_manager) = self.task_manager.as_mut() {
            task_manager.process_queued_tasks();
        }

        if !report.is_idle() {
            info!(
                "Streaming around {:?}: {} generated, {} queued, {} remeshed, {} evicted, {} failed, {} loaded ({:?})",
                observer_chunk,
                report.generated,
                report.queued,
                report.remeshed,
                report.evicted,
                report.failed,
                world.len(),
                started.elapsed()
            );
        }

        Ok(report)
    }

    /// Meshes freshly inserted chunks, then re-meshes loaded neighbours whose
    /// shared edge used to be drawn open.
    fn mesh_new_chunks(
        &self,
        world: &mut World,
        backend: &mut dyn MeshBackend,
        new_chunks: &[ChunkCoord],
        report: &mut StreamingReport,
    ) -> EngineResult<()> {
        let fresh: HashSet<ChunkCoord> = new_chunks.iter().copied().collect();

        for &coord in new_chunks {
            world.remesh_chunk(coord, backend)?;
            if let Some(chunk) = world.get(coord) {
                trace!("Chunk {:?} meshed to {} vertices", coord, chunk.mesh.vertex_count);
            }
        }

        let mut stale_neighbors: Vec<ChunkCoord> = new_chunks
            .iter()
            .flat_map(|&coord| lateral_neighbors(coord))
            .filter(|neighbor| !fresh.contains(neighbor) && world.contains(*neighbor))
            .collect();
        stale_neighbors.sort_by_key(|coord| (coord.x, coord.y));
        stale_neighbors.dedup();

        for coord in stale_neighbors {
            if world.remesh_chunk(coord, backend)? {
                report.remeshed += 1;
            }
        }

        Ok(())
    }

    /// Drops chunks beyond the eviction distance, then re-meshes loaded
    /// chunks that bordered one so their shared edge is drawn open again.
    fn evict_distant(
        &self,
        world: &mut World,
        backend: &mut dyn MeshBackend,
        observer_chunk: ChunkCoord,
        report: &mut StreamingReport,
    ) -> EngineResult<()> {
        let limit = i64::from(self.settings.eviction_distance());
        let limit_sq = limit * limit;

        let distant: Vec<ChunkCoord> = world
            .coords()
            .filter(|coord| distance_sq(coord.x - observer_chunk.x, coord.y - observer_chunk.y) > limit_sq)
            .collect();

        let mut evicted = Vec::with_capacity(distant.len());
        for coord in distant {
            if world.evict(coord, backend) {
                evicted.push(coord);
            }
        }
        report.evicted = evicted.len();

        let mut exposed: Vec<ChunkCoord> = evicted
            .iter()
            .flat_map(|&coord| lateral_neighbors(coord))
            .filter(|neighbor| world.contains(*neighbor))
            .collect();
        exposed.sort_by_key(|coord| (coord.x, coord.y));
        exposed.dedup();

        for coord in exposed {
            if world.remesh_chunk(coord, backend)? {
                report.remeshed += 1;
            }
        }

        Ok(())
    }
}
