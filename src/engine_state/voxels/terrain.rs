//! # Terrain Module
//!
//! Noise-driven heightmap terrain.
//!
//! ## Algorithm
//!
//! Every column samples four independent noise layers:
//!
//! * **ruggedness**: very low frequency, picks how tall the mountains get
//! * **mountain shape**: `|m|²`, which sharpens ridges and widens valleys
//! * **base elevation**: slow rolling offset
//! * **detail**: high frequency surface grain
//!
//! Ruggedness maps onto an amplitude through a continuous piecewise-linear
//! curve with three bands (plains, hills, mountains). The column height is
//!
//! ```text
//! base_level + elevation * elevation_weight + shape * amplitude + detail * detail_weight
//! ```
//!
//! clamped into the world and floored. The column is then filled bottom-up:
//! bedrock, stone, a filler band, the surface block, air.

use cgmath::Point2;
use serde::{Deserialize, Serialize};

use super::{
    block::block_type::BlockType,
    chunk::{Chunk, ChunkCreationIterator, CHUNK_HEIGHT, CHUNK_SIZE},
    coords::{chunk_origin, ChunkCoord},
    noise_field::NoiseField,
};

/// Lowest column height the generator produces.
pub const MIN_COLUMN_HEIGHT: i32 = 2;

const RUGGEDNESS_SALT: u32 = 0x5EED_0001;
const MOUNTAIN_SALT: u32 = 0x5EED_0002;
const ELEVATION_SALT: u32 = 0x5EED_0003;
const DETAIL_SALT: u32 = 0x5EED_0004;

/// Parameters controlling terrain generation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainParams {
    pub biome_frequency: f64,     // Ruggedness layer, cycles per block
    pub mountain_frequency: f64,  // Mountain shape layer
    pub elevation_frequency: f64, // Base elevation layer
    pub detail_frequency: f64,    // Surface grain layer

    pub base_level: f64,
    pub elevation_weight: f64,
    pub detail_weight: f64,

    pub plains_edge: f64, // Ruggedness where plains turn into hills
    pub hills_edge: f64,  // Ruggedness where hills turn into mountains
    pub plains_amplitude: f64,
    pub hills_amplitude: f64,
    pub mountain_amplitude: f64,
    pub peak_amplitude: f64,

    pub sea_level: i32,
    pub stone_level: i32,
    pub snow_level: i32,
    pub surface_jitter: i32,   // Max per-column shift of the stone/snow lines
    pub subsurface_depth: i32, // Filler blocks under the surface
    pub top_margin: i32,       // Air kept above the tallest column
}

impl Default for TerrainParams {
    fn default() -> Self {
        Self {
            biome_frequency: 0.004,
            mountain_frequency: 0.015,
            elevation_frequency: 0.005,
            detail_frequency: 0.1,

            base_level: 64.0,
            elevation_weight: 20.0,
            detail_weight: 2.0,

            plains_edge: -0.2,
            hills_edge: 0.3,
            plains_amplitude: 2.0,
            hills_amplitude: 6.0,
            mountain_amplitude: 30.0,
            peak_amplitude: 90.0,

            sea_level: 62,
            stone_level: 110,
            snow_level: 140,
            surface_jitter: 4,
            subsurface_depth: 4,
            top_margin: 8,
        }
    }
}

impl TerrainParams {
    /// Maps a ruggedness sample to a mountain amplitude.
    ///
    /// Linear between the control points `(-1, plains)`, `(plains_edge, hills)`,
    /// `(hills_edge, mountain)` and `(1, peak)`; inputs outside `[-1, 1]` are
    /// clamped.
    pub fn amplitude(&self, ruggedness: f64) -> f64 {
        let r = ruggedness.clamp(-1.0, 1.0);
        if r <= self.plains_edge {
            lerp_band(r, -1.0, self.plains_edge, self.plains_amplitude, self.hills_amplitude)
        } else if r <= self.hills_edge {
            lerp_band(r, self.plains_edge, self.hills_edge, self.hills_amplitude, self.mountain_amplitude)
        } else {
            lerp_band(r, self.hills_edge, 1.0, self.mountain_amplitude, self.peak_amplitude)
        }
    }

    /// Highest column height the generator produces.
    pub fn max_column_height(&self) -> i32 {
        (CHUNK_HEIGHT as i32 - self.top_margin).clamp(MIN_COLUMN_HEIGHT, CHUNK_HEIGHT as i32 - 1)
    }
}

fn lerp_band(value: f64, start: f64, end: f64, from: f64, to: f64) -> f64 {
    let width = end - start;
    if width <= f64::EPSILON {
        return to;
    }
    from + (to - from) * ((value - start) / width)
}

/// The blocks making up the top of one column.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColumnSurface {
    /// Y of the surface block
    pub height: i32,
    /// Block at `height`
    pub surface: BlockType,
    /// Block in the band just below the surface
    pub filler: BlockType,
}

/// Procedural terrain generator.
///
/// Stateless after construction, so one instance can be shared between
/// generation workers.
#[derive(Clone, Debug)]
pub struct TerrainGenerator {
    seed: u32,
    params: TerrainParams,
    ruggedness: NoiseField,
    mountain: NoiseField,
    elevation: NoiseField,
    detail: NoiseField,
}

impl TerrainGenerator {
    /// Create a new terrain generator for `seed`.
    pub fn new(seed: u32, params: TerrainParams) -> Self {
        Self {
            seed,
            params,
            ruggedness: NoiseField::new(seed.wrapping_add(RUGGEDNESS_SALT)),
            mountain: NoiseField::new(seed.wrapping_add(MOUNTAIN_SALT)),
            elevation: NoiseField::new(seed.wrapping_add(ELEVATION_SALT)),
            detail: NoiseField::new(seed.wrapping_add(DETAIL_SALT)),
        }
    }

    /// World seed
    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Get terrain parameters
    pub fn params(&self) -> &TerrainParams {
        &self.params
    }

    /// Height of the surface block of world column `(world_x, world_z)`.
    pub fn column_height(&self, world_x: i32, world_z: i32) -> i32 {
        let p = &self.params;
        let (x, z) = (world_x as f64, world_z as f64);

        let ruggedness = self.ruggedness.sample_scaled(x, z, p.biome_frequency);
        let mountain = self.mountain.sample_scaled(x, z, p.mountain_frequency).abs();
        let shape = mountain * mountain;
        let elevation = self.elevation.sample_scaled(x, z, p.elevation_frequency);
        let detail = self.detail.sample_scaled(x, z, p.detail_frequency);

        let height = p.base_level
            + elevation * p.elevation_weight
            + shape * p.amplitude(ruggedness)
            + detail * p.detail_weight;

        height
            .clamp(MIN_COLUMN_HEIGHT as f64, p.max_column_height() as f64)
            .floor() as i32
    }

    /// Height and surface materials of world column `(world_x, world_z)`.
    pub fn column_surface(&self, world_x: i32, world_z: i32) -> ColumnSurface {
        let p = &self.params;
        let height = self.column_height(world_x, world_z);

        let jitter_range = p.surface_jitter.max(0);
        let jitter = fastrand::Rng::with_seed(column_seed(self.seed, world_x, world_z))
            .i32(-jitter_range..=jitter_range);

        let (surface, filler) = if height < p.sea_level {
            (BlockType::SAND, BlockType::SAND)
        } else if height + jitter >= p.snow_level {
            (BlockType::SNOW, BlockType::STONE)
        } else if height + jitter >= p.stone_level {
            (BlockType::STONE, BlockType::STONE)
        } else {
            (BlockType::GRASS, BlockType::DIRT)
        };

        ColumnSurface {
            height,
            surface,
            filler,
        }
    }

    /// Generates the fully populated chunk at `coord`.
    ///
    /// The same seed, params and coordinate always produce the same blocks.
    /// The returned chunk has no mesh yet.
    pub fn generate(&self, coord: ChunkCoord) -> Chunk {
        let origin = chunk_origin(coord);
        let mut cci = ChunkCreationIterator::new(coord);
        let mut column = [BlockType::AIR; CHUNK_HEIGHT];

        for local_x in 0..CHUNK_SIZE {
            for local_z in 0..CHUNK_SIZE {
                let surface = self.column_surface(
                    origin.x + local_x as i32,
                    origin.z + local_z as i32,
                );
                fill_column(&surface, self.params.subsurface_depth, &mut column);
                cci.push_column(&column);
            }
        }

        cci.return_chunk()
    }

    /// Generates the chunk at `(chunk_x, chunk_z)`.
    pub fn generate_at(&self, chunk_x: i32, chunk_z: i32) -> Chunk {
        self.generate(Point2::new(chunk_x, chunk_z))
    }
}

/// Writes one column, bottom first.
pub(crate) fn fill_column(
    surface: &ColumnSurface,
    subsurface_depth: i32,
    column: &mut [BlockType; CHUNK_HEIGHT],
) {
    let height = surface.height;
    for (y, block) in column.iter_mut().enumerate() {
        let y = y as i32;
        *block = if y == 0 {
            BlockType::STONE
        } else if y > height {
            BlockType::AIR
        } else if y == height {
            surface.surface
        } else if y >= height - subsurface_depth {
            surface.filler
        } else {
            BlockType::STONE
        };
    }
}

/// Mixes the world seed and a column position into an rng seed.
fn column_seed(seed: u32, world_x: i32, world_z: i32) -> u64 {
    let mut h = seed as u64 ^ 0x9E37_79B9_7F4A_7C15;
    h = (h ^ world_x as u32 as u64).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    h = (h ^ ((world_z as u32 as u64) << 32)).wrapping_mul(0x94D0_49BB_1331_11EB);
    h ^ (h >> 31)
}
