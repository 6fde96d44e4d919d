//! # Voxel World
//!
//! Everything that describes the world itself, independent of how it is drawn.
//!
//! ## Architecture
//!
//! * **Block**: Voxel types, faces and their texture tiles
//! * **Chunk**: Fixed 16 × 256 × 16 columns of blocks
//! * **World**: The chunk store, keyed by 2D chunk coordinate
//! * **Terrain**: Seeded noise sampling and deterministic chunk generation
//! * **Streaming**: Loads and evicts chunks around a moving observer
//! * **Tasks**: Off-thread chunk generation for the streaming controller
//!
//! ## Data Flow
//!
//! 1. The streaming controller asks the terrain generator for missing chunks
//! 2. New chunks go into the world and are meshed against their neighbours
//! 3. Block edits go through the world, which re-meshes every chunk they touch
//! 4. Chunks that fall far enough behind the observer are released and dropped
//!
//! ## Thread Safety
//!
//! Only generation leaves the owner thread. The world, meshing and uploads
//! stay on the thread that owns the graphics device.

pub mod block;
pub mod chunk;
pub mod coords;
pub mod noise_field;
pub mod raycast;
pub mod streaming;
pub mod tasks;
pub mod terrain;
pub mod world;
