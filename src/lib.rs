#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Voxel World
//!
//! An infinite, procedurally generated voxel world built with Rust and WGPU.
//!
//! The crate owns everything between a seed and a set of GPU vertex buffers:
//! noise-driven terrain generation, chunk storage, face-culled meshing,
//! observer-driven streaming and block edits. Windowing, cameras, shaders and
//! input belong to the host.
//!
//! ## Key Modules
//!
//! * `core` - Errors and logging shared by the whole engine
//! * `engine_state` - The engine facade plus its voxel, rendering and task subsystems
//!
//! ## Usage
//!
//! ```no_run
//! fn main() {
//!     voxel_world::run();
//! }
//! ```
//!
//! ## Performance Considerations
//!
//! * Chunks are dense 16 × 256 × 16 arrays with O(1) lookup by coordinate
//! * Only faces touching air are meshed
//! * Terrain generation can move to worker threads; meshing and uploads stay
//!   on the device thread

use std::env;

use cgmath::{Point3, Vector3};
use log::{error, info, warn};
use web_time::Instant;

pub mod core;
pub mod engine_state;

use crate::core::logging;
use engine_state::{
    buffer_state::BufferState,
    config::WorldConfig,
    rendering::{
        meshing::{HeadlessMeshBackend, MeshBackend, MeshHandle},
        AlwaysVisible, DrawSink, RenderStats,
    },
    voxels::{block::block_type::BlockType, coords::ChunkCoord},
    EngineState, PlayerAction,
};

pub use crate::core::{EngineError, EngineResult};

/// Environment variable naming a JSON world config for [`run`].
pub const CONFIG_ENV_VAR: &str = "VOXEL_WORLD_CONFIG";

/// Chunks the demo observer walks east.
const DEMO_WALK_CHUNKS: i32 = 6;

/// Runs the headless demo: streams a world around an observer walking east,
/// then breaks and places a block under their feet.
///
/// Uses a GPU device when one is available and falls back to in-memory mesh
/// storage otherwise.
pub fn run() {
    logging::init();
    info!("Logger initialized");

    let config = match env::var(CONFIG_ENV_VAR) {
        Ok(path) => match WorldConfig::load(&path) {
            Ok(config) => config,
            Err(err) => {
                error!("Failed to load {}: {}", path, err);
                return;
            }
        },
        Err(_) => WorldConfig::default(),
    };

    let result = match BufferState::request_headless() {
        Ok(buffer_state) => run_demo(config, buffer_state),
        Err(err) => {
            warn!("No GPU available ({}), meshes stay in memory", err);
            run_demo(config, HeadlessMeshBackend::new())
        }
    };

    if let Err(err) = result {
        error!("Demo failed: {}", err);
    }
}

/// Counts draws instead of issuing them.
#[derive(Default)]
struct DrawCounter {
    draws: usize,
}

impl DrawSink for DrawCounter {
    fn draw_chunk(&mut self, _coord: ChunkCoord, _handle: MeshHandle, _vertex_count: u32) {
        self.draws += 1;
    }
}

fn run_demo<B: MeshBackend>(config: WorldConfig, backend: B) -> EngineResult<()> {
    let mut engine = EngineState::new(config, backend)?;
    let started = Instant::now();

    for step in 0..=DEMO_WALK_CHUNKS {
        let x = step as f32 * 16.0 + 8.0;
        let report = engine.force_update(Point3::new(x, 128.0, 8.0), Instant::now())?;
        info!(
            "Step {}: observer in chunk {:?}, {} chunks loaded, {} generated in total",
            step,
            report.observer_chunk,
            engine.world().len(),
            engine.streaming().generation_count()
        );
    }

    // Background generation finishes over later ticks.
    while engine.streaming().pending_count() > 0 {
        let x = DEMO_WALK_CHUNKS as f32 * 16.0 + 8.0;
        engine.force_update(Point3::new(x, 128.0, 8.0), Instant::now())?;
        std::thread::sleep(std::time::Duration::from_millis(5));
    }

    let mut counter = DrawCounter::default();
    let RenderStats {
        drawn,
        skipped_empty,
        vertices,
        ..
    } = engine.render(&AlwaysVisible, &mut counter);
    info!(
        "Frame: {} chunks drawn, {} empty, {} vertices, {} draw calls",
        drawn, skipped_empty, vertices, counter.draws
    );

    let column_x = DEMO_WALK_CHUNKS * 16 + 8;
    let height = engine.generator().column_height(column_x, 8);
    let eye = Point3::new(column_x as f32 + 0.5, height as f32 + 2.5, 8.5);
    let down = Vector3::new(0.0, -1.0, 0.0);

    if let Some(broken) = engine.apply_player_action(PlayerAction::Break, eye, down)? {
        info!("Broke block at {:?}", broken);
    }
    if let Some(placed) = engine.apply_player_action(PlayerAction::Place(BlockType::WOOD), eye, down)? {
        info!("Placed wood at {:?}", placed);
    }

    info!("Demo finished in {:?}", started.elapsed());
    Ok(())
}
