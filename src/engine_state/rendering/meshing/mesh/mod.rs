//! Mesh generation for voxel rendering.
//!
//! Converts a chunk's voxels into a flat triangle list, one quad per exposed
//! block face.
//!
//! # Architecture
//! - [`Face`]: A single block face with its four world-space corners
//! - [`build_chunk_vertices`]: The face-culling pass over a whole chunk
//! - [`NeighborChunks`]: Borrowed lateral neighbours consulted at chunk edges
//!
//! # Usage
//! ```no_run
//! use cgmath::Point2;
//! use voxel_world::engine_state::rendering::meshing::{build_chunk_vertices, NeighborChunks};
//! use voxel_world::engine_state::voxels::terrain::{TerrainGenerator, TerrainParams};
//!
//! let generator = TerrainGenerator::new(1, TerrainParams::default());
//! let chunk = generator.generate(Point2::new(0, 0));
//! let vertices = build_chunk_vertices(&chunk, &NeighborChunks::none());
//! assert_eq!(vertices.len() % 6, 0);
//! ```

mod culled;
mod face;

pub use culled::{build_chunk_vertices, NeighborChunks};
pub use face::Face;
