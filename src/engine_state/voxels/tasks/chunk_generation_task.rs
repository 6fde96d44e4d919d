//! # Chunk Generation Task
//!
//! This module defines the `ChunkGenerationTask` which generates the voxels of
//! one chunk on a worker thread. It is scheduled by the streaming controller
//! when generation runs in the background.

use std::sync::Arc;

use log::debug;

use crate::{
    core::EngineResult,
    engine_state::{
        task_management::task::{Task, TaskResult},
        voxels::{chunk::Chunk, coords::ChunkCoord, terrain::TerrainGenerator, world::World},
    },
};

/// A task that generates chunk data asynchronously.
///
/// The generator is shared and read-only, so any number of these tasks can
/// run at once.
pub struct ChunkGenerationTask {
    /// Generator for the world being streamed
    generator: Arc<TerrainGenerator>,
    /// The chunk to generate
    coord: ChunkCoord,
}

impl ChunkGenerationTask {
    /// Creates a new chunk generation task.
    ///
    /// # Arguments
    /// * `generator` - The shared terrain generator
    /// * `coord` - The chunk coordinates to generate
    pub fn new(generator: Arc<TerrainGenerator>, coord: ChunkCoord) -> Self {
        ChunkGenerationTask { generator, coord }
    }
}

impl Task for ChunkGenerationTask {
    fn process(&self) -> Box<dyn TaskResult + Send> {
        Box::new(ChunkGenerationTaskResult {
            chunk: self.generator.generate(self.coord),
        })
    }

    fn coord(&self) -> ChunkCoord {
        self.coord
    }
}

/// The result of a chunk generation task.
///
/// Holds the finished chunk until the owner thread adds it to the world.
pub struct ChunkGenerationTaskResult {
    chunk: Chunk,
}

impl TaskResult for ChunkGenerationTaskResult {
    /// Inserts the generated chunk unless something already occupies its slot.
    ///
    /// The mesh is left empty; the caller meshes new chunks together with
    /// their neighbours.
    fn handle_result(self: Box<Self>, world: &mut World) -> EngineResult<Option<ChunkCoord>> {
        let coord = self.chunk.position;
        if world.contains(coord) {
            debug!("Dropped stale generation result for chunk {:?}", coord);
            return Ok(None);
        }

        world.insert(self.chunk)?;
        Ok(Some(coord))
    }

    fn coord(&self) -> ChunkCoord {
        self.chunk.position
    }
}
