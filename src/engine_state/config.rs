//! Runtime configuration for a streamed world.
//!
//! Loaded from JSON. Every field has a default, so a partial file (or an
//! empty object) is a valid configuration.

use std::fs;
use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};
use web_time::Duration;

use crate::core::{EngineError, EngineResult};

use super::voxels::{
    chunk::CHUNK_HEIGHT,
    streaming::{StreamingSettings, WindowShape},
    terrain::{TerrainParams, MIN_COLUMN_HEIGHT},
};

/// Largest accepted `render_distance` and `eviction_margin`, in chunks.
pub const MAX_STREAMING_RADIUS: i32 = 64;

/// Everything needed to create and stream a world.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub seed: u32,
    /// Load radius in chunks
    pub render_distance: i32,
    /// Extra chunks kept beyond the load radius before eviction
    pub eviction_margin: i32,
    pub window_shape: WindowShape,
    /// Minimum wall-clock time between streaming ticks
    pub stream_interval_ms: u64,
    /// Background generation threads; 0 generates inline
    pub generation_workers: usize,
    pub terrain: TerrainParams,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: 12345,
            render_distance: 8,
            eviction_margin: 2,
            window_shape: WindowShape::Circle,
            stream_interval_ms: 500,
            generation_workers: 0,
            terrain: TerrainParams::default(),
        }
    }
}

impl WorldConfig {
    /// Reads and validates a config file.
    pub fn load(path: impl AsRef<Path>) -> EngineResult<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        info!("Loaded world config from {}", path.display());
        Ok(config)
    }

    /// Parses and validates a config document.
    pub fn from_json(json: &str) -> EngineResult<Self> {
        let config: WorldConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> EngineResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Rejects settings the engine cannot run with.
    pub fn validate(&self) -> EngineResult<()> {
        if !(0..=MAX_STREAMING_RADIUS).contains(&self.render_distance) {
            return Err(invalid(format!(
                "render_distance must lie in [0, {}], got {}",
                MAX_STREAMING_RADIUS, self.render_distance
            )));
        }
        if !(0..=MAX_STREAMING_RADIUS).contains(&self.eviction_margin) {
            return Err(invalid(format!(
                "eviction_margin must lie in [0, {}], got {}",
                MAX_STREAMING_RADIUS, self.eviction_margin
            )));
        }

        // A square window reaches R·√2 at its corners; anything past the
        // eviction distance would be generated and evicted every tick.
        if self.window_shape == WindowShape::Square {
            let corner = self.render_distance as f64 * std::f64::consts::SQRT_2;
            let keep = (self.render_distance + self.eviction_margin) as f64;
            if corner > keep {
                return Err(invalid(format!(
                    "square window corners reach {:.2} chunks but chunks beyond {} are evicted; raise eviction_margin",
                    corner, keep
                )));
            }
        }

        let terrain = &self.terrain;
        let frequencies = [
            ("biome_frequency", terrain.biome_frequency),
            ("mountain_frequency", terrain.mountain_frequency),
            ("elevation_frequency", terrain.elevation_frequency),
            ("detail_frequency", terrain.detail_frequency),
        ];
        for (name, frequency) in frequencies {
            if !frequency.is_finite() || frequency <= 0.0 {
                return Err(invalid(format!("{} must be positive, got {}", name, frequency)));
            }
        }

        if !(-1.0 < terrain.plains_edge && terrain.plains_edge < terrain.hills_edge && terrain.hills_edge < 1.0) {
            return Err(invalid(format!(
                "band edges must satisfy -1 < plains_edge < hills_edge < 1, got {} and {}",
                terrain.plains_edge, terrain.hills_edge
            )));
        }

        if terrain.top_margin < 0 || terrain.top_margin > CHUNK_HEIGHT as i32 - MIN_COLUMN_HEIGHT {
            return Err(invalid(format!(
                "top_margin must lie in [0, {}], got {}",
                CHUNK_HEIGHT as i32 - MIN_COLUMN_HEIGHT,
                terrain.top_margin
            )));
        }
        if terrain.surface_jitter < 0 || terrain.subsurface_depth < 0 {
            return Err(invalid("surface_jitter and subsurface_depth must not be negative".to_string()));
        }

        Ok(())
    }

    pub fn streaming_settings(&self) -> StreamingSettings {
        StreamingSettings {
            render_distance: self.render_distance,
            eviction_margin: self.eviction_margin,
            window_shape: self.window_shape,
        }
    }

    pub fn stream_interval(&self) -> Duration {
        Duration::from_millis(self.stream_interval_ms)
    }
}

fn invalid(message: String) -> EngineError {
    EngineError::InvalidConfig(message)
}
