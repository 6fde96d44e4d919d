//! Error types for the voxel world

use thiserror::Error;

use crate::engine_state::voxels::coords::ChunkCoord;

/// Main error type for the engine
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("GPU error: {0}")]
    Gpu(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Chunk {0:?} is already loaded")]
    ChunkAlreadyLoaded(ChunkCoord),
}

/// Shorthand for results carrying an [`EngineError`].
pub type EngineResult<T> = Result<T, EngineError>;
