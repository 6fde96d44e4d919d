//! # Engine State Module
//!
//! The host-facing side of the engine.
//!
//! ## Key Components
//!
//! * `EngineState` - Owns the world, the streaming controller and the mesh backend
//! * `buffer_state` - wgpu vertex buffers for chunk meshes
//! * `config` - JSON world configuration
//! * `rendering` - Chunk meshing and the per-frame draw walk
//! * `task_management` - Worker threads for background generation
//! * `voxels` - Voxel data, chunks, terrain and streaming
//!
//! ## Architecture
//!
//! The host drives `EngineState` from its frame loop: `update` with the
//! observer position, player actions as they arrive, then `render` with its
//! own frustum test and draw sink. Everything runs on the thread that owns
//! the mesh backend.

use std::sync::Arc;

use cgmath::{Point3, Vector3};
use log::{debug, info};
use web_time::Instant;

use crate::core::EngineResult;

use config::WorldConfig;
use rendering::{draw_visible_chunks, meshing::MeshBackend, ChunkVisibility, DrawSink, RenderStats};
use voxels::{
    block::block_type::BlockType,
    raycast::RaycastHit,
    streaming::{StreamingController, StreamingReport},
    terrain::TerrainGenerator,
    world::World,
};

pub mod buffer_state;
pub mod config;
pub mod rendering;
pub mod task_management;
pub mod voxels;

/// How far away, in blocks, the player can break or place blocks
pub const PLAYER_REACH: f32 = 8.0;

/// A block interaction requested by the player
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayerAction {
    /// Remove the targeted block
    Break,
    /// Put a block against the targeted face
    Place(BlockType),
}

/// The main state container for the voxel engine
///
/// Generic over the mesh backend so the same engine runs against a GPU
/// ([`buffer_state::BufferState`]) or in memory
/// ([`rendering::meshing::HeadlessMeshBackend`]).
///
/// # Examples
///
/// ```
/// use cgmath::Point3;
/// use voxel_world::engine_state::{
///     config::WorldConfig, rendering::meshing::HeadlessMeshBackend, EngineState,
/// };
///
/// let config = WorldConfig { render_distance: 1, ..WorldConfig::default() };
/// let mut engine = EngineState::new(config, HeadlessMeshBackend::new()).unwrap();
///
/// // Main game loop
/// let report = engine.update(Point3::new(8.0, 100.0, 8.0), web_time::Instant::now()).unwrap();
/// assert!(report.is_some());
/// ```
pub struct EngineState<B: MeshBackend> {
    config: WorldConfig,
    /// The voxel world containing all chunk data
    world: World,
    generator: Arc<TerrainGenerator>,
    streaming: StreamingController,
    /// Where chunk meshes are uploaded
    backend: B,
    /// When streaming last ran; `None` until the first update
    last_stream_update: Option<Instant>,
}

impl<B: MeshBackend> EngineState<B> {
    /// Creates a new engine state with all subsystems initialized
    ///
    /// # Errors
    ///
    /// `EngineError::InvalidConfig` if `config` fails validation.
    pub fn new(config: WorldConfig, backend: B) -> EngineResult<Self> {
        config.validate()?;

        let generator = Arc::new(TerrainGenerator::new(config.seed, config.terrain.clone()));
        let streaming =
            StreamingController::new(config.streaming_settings()).with_workers(config.generation_workers);

        info!(
            "Engine ready: seed {}, render distance {}, eviction margin {}, {:?} window, {} workers",
            config.seed,
            config.render_distance,
            config.eviction_margin,
            config.window_shape,
            config.generation_workers
        );

        Ok(Self {
            config,
            world: World::new(),
            generator,
            streaming,
            backend,
            last_stream_update: None,
        })
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn streaming(&self) -> &StreamingController {
        &self.streaming
    }

    pub fn generator(&self) -> &Arc<TerrainGenerator> {
        &self.generator
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Streams chunks around `observer`, at most once per configured interval.
    ///
    /// The first call always streams.
    ///
    /// # Returns
    ///
    /// The tick's report, or `None` if the interval has not yet elapsed.
    pub fn update(&mut self, observer: Point3<f32>, now: Instant) -> EngineResult<Option<StreamingReport>> {
        if let Some(last) = self.last_stream_update {
            if now.saturating_duration_since(last) < self.config.stream_interval() {
                return Ok(None);
            }
        }
        self.force_update(observer, now).map(Some)
    }

    /// Streams chunks around `observer` regardless of the interval.
    pub fn force_update(&mut self, observer: Point3<f32>, now: Instant) -> EngineResult<StreamingReport> {
        self.last_stream_update = Some(now);
        self.streaming
            .tick(&mut self.world, &self.generator, &mut self.backend, observer.x, observer.z)
    }

    pub fn block_at(&self, x: i32, y: i32, z: i32) -> BlockType {
        self.world.block_at(x, y, z)
    }

    /// See [`World::set_block`].
    pub fn set_block(&mut self, x: i32, y: i32, z: i32, block_type: BlockType) -> EngineResult<bool> {
        self.world.set_block(x, y, z, block_type, &mut self.backend)
    }

    /// The block the player is looking at, within [`PLAYER_REACH`].
    pub fn raycast(&self, origin: Point3<f32>, direction: Vector3<f32>) -> Option<RaycastHit> {
        self.world.raycast(origin, direction, PLAYER_REACH)
    }

    /// Turns the targeted block into air.
    ///
    /// # Returns
    ///
    /// The position of the removed block, or `None` if nothing was in reach.
    pub fn break_block(
        &mut self,
        origin: Point3<f32>,
        direction: Vector3<f32>,
    ) -> EngineResult<Option<Point3<i32>>> {
        let Some(hit) = self.raycast(origin, direction) else {
            return Ok(None);
        };
        let target = hit.block_position;

        if self.set_block(target.x, target.y, target.z, BlockType::AIR)? {
            debug!("Broke {:?} at {:?}", hit.block_type, target);
            Ok(Some(target))
        } else {
            Ok(None)
        }
    }

    /// Places `block_type` against the targeted face.
    ///
    /// Nothing happens when no block is in reach, the ray started inside a
    /// block, or the placement cell is already occupied.
    ///
    /// # Returns
    ///
    /// The position of the new block.
    pub fn place_block(
        &mut self,
        origin: Point3<f32>,
        direction: Vector3<f32>,
        block_type: BlockType,
    ) -> EngineResult<Option<Point3<i32>>> {
        if !block_type.is_solid() {
            return Ok(None);
        }
        let Some(target) = self.raycast(origin, direction).and_then(|hit| hit.place_position()) else {
            return Ok(None);
        };
        if self.block_at(target.x, target.y, target.z).is_solid() {
            return Ok(None);
        }

        if self.set_block(target.x, target.y, target.z, block_type)? {
            debug!("Placed {:?} at {:?}", block_type, target);
            Ok(Some(target))
        } else {
            Ok(None)
        }
    }

    /// Applies a player action along the view ray.
    pub fn apply_player_action(
        &mut self,
        action: PlayerAction,
        origin: Point3<f32>,
        direction: Vector3<f32>,
    ) -> EngineResult<Option<Point3<i32>>> {
        match action {
            PlayerAction::Break => self.break_block(origin, direction),
            PlayerAction::Place(block_type) => self.place_block(origin, direction, block_type),
        }
    }

    /// Submits every visible, non-empty chunk to `sink`.
    pub fn render(&self, visibility: &dyn ChunkVisibility, sink: &mut dyn DrawSink) -> RenderStats {
        draw_visible_chunks(&self.world, visibility, sink)
    }
}

#[cfg(test)]
mod tests {
    use web_time::Duration;

    use super::*;
    use crate::core::EngineError;
    use crate::engine_state::rendering::{
        meshing::{HeadlessMeshBackend, MeshHandle},
        AlwaysVisible,
    };
    use crate::engine_state::voxels::coords::ChunkCoord;

    fn engine(render_distance: i32) -> EngineState<HeadlessMeshBackend> {
        let config = WorldConfig {
            seed: 42,
            render_distance,
            ..WorldConfig::default()
        };
        EngineState::new(config, HeadlessMeshBackend::new()).unwrap()
    }

    struct CountingSink(usize);

    impl DrawSink for CountingSink {
        fn draw_chunk(&mut self, _coord: ChunkCoord, _handle: MeshHandle, _vertex_count: u32) {
            self.0 += 1;
        }
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = WorldConfig {
            render_distance: -3,
            ..WorldConfig::default()
        };
        assert!(matches!(
            EngineState::new(config, HeadlessMeshBackend::new()),
            Err(EngineError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_update_is_throttled() {
        let mut engine = engine(1);
        let observer = Point3::new(8.0, 100.0, 8.0);
        let start = Instant::now();

        assert!(engine.update(observer, start).unwrap().is_some());
        assert!(engine.update(observer, start + Duration::from_millis(100)).unwrap().is_none());
        assert!(engine.update(observer, start + Duration::from_millis(499)).unwrap().is_none());
        assert!(engine.update(observer, start + Duration::from_millis(500)).unwrap().is_some());
        assert!(engine.force_update(observer, start + Duration::from_millis(501)).is_ok());
        assert!(engine.update(observer, start + Duration::from_millis(600)).unwrap().is_none());
    }

    #[test]
    fn test_break_then_place() {
        let mut engine = engine(1);
        let start = Instant::now();
        engine.update(Point3::new(8.0, 100.0, 8.0), start).unwrap();

        let height = engine.generator().column_height(8, 8);
        let eye = Point3::new(8.5, height as f32 + 3.5, 8.5);
        let down = Vector3::new(0.0, -1.0, 0.0);

        let broken = engine.break_block(eye, down).unwrap();
        assert_eq!(broken, Some(Point3::new(8, height, 8)));
        assert_eq!(engine.block_at(8, height, 8), BlockType::AIR);

        let placed = engine.place_block(eye, down, BlockType::WOOD).unwrap();
        assert_eq!(placed, Some(Point3::new(8, height, 8)));
        assert_eq!(engine.block_at(8, height, 8), BlockType::WOOD);

        assert_eq!(
            engine.apply_player_action(PlayerAction::Place(BlockType::AIR), eye, down).unwrap(),
            None
        );
    }

    #[test]
    fn test_actions_out_of_reach_do_nothing() {
        let mut engine = engine(1);
        engine.update(Point3::new(8.0, 100.0, 8.0), Instant::now()).unwrap();

        let sky = Point3::new(8.5, 250.0, 8.5);
        let down = Vector3::new(0.0, -1.0, 0.0);
        assert_eq!(engine.apply_player_action(PlayerAction::Break, sky, down).unwrap(), None);
        assert_eq!(engine.place_block(sky, down, BlockType::STONE).unwrap(), None);
    }

    #[test]
    fn test_render_draws_every_loaded_chunk() {
        let mut engine = engine(1);
        engine.update(Point3::new(8.0, 100.0, 8.0), Instant::now()).unwrap();

        let mut sink = CountingSink(0);
        let stats = engine.render(&AlwaysVisible, &mut sink);
        assert_eq!(sink.0, engine.world().len());
        assert_eq!(stats.drawn, 5);
        assert_eq!(stats.culled, 0);
    }
}
