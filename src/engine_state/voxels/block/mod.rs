//! # Block Module
//!
//! This module provides the core block-related functionality for the voxel world.
//! It includes block type definitions, block face handling, and the texture tiles
//! each face is drawn with.

pub mod block_side;
pub mod block_type;

/// The underlying integer type used to represent block types in memory.
pub type BlockTypeSize = u8;

/// Texture tile names, as indices into the renderer's tile array.
pub mod tiles {
    /// Plain dirt.
    pub const DIRT: u32 = 0;
    /// Grass over dirt, used on grass block sides.
    pub const GRASS_SIDE: u32 = 1;
    /// Grass seen from above.
    pub const GRASS_TOP: u32 = 2;
    /// Stone.
    pub const STONE: u32 = 3;
    /// Sand.
    pub const SAND: u32 = 4;
    /// Snow.
    pub const SNOW: u32 = 5;
    /// Bark.
    pub const WOOD_SIDE: u32 = 6;
    /// Tree rings.
    pub const WOOD_TOP: u32 = 7;
}

use tiles::*;

/// Maps each block type to its corresponding texture indices for each face.
///
/// The outer array is indexed by `BlockType` as a `usize`.
/// The inner array contains 6 texture indices, one for each face in the order:
/// [Front, Back, Bottom, Top, Left, Right]
pub static BLOCK_TYPE_TO_TEXTURE_INDICES: [[u32; 6]; 7] = [
    [0, 0, 0, 0, 0, 0], // AIR (never meshed)
    [DIRT, DIRT, DIRT, DIRT, DIRT, DIRT],
    [GRASS_SIDE, GRASS_SIDE, DIRT, GRASS_TOP, GRASS_SIDE, GRASS_SIDE],
    [STONE, STONE, STONE, STONE, STONE, STONE],
    [SAND, SAND, SAND, SAND, SAND, SAND],
    [SNOW, SNOW, SNOW, SNOW, SNOW, SNOW],
    [WOOD_SIDE, WOOD_SIDE, WOOD_TOP, WOOD_TOP, WOOD_SIDE, WOOD_SIDE],
];
