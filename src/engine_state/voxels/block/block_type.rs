//! # Block Type Module
//!
//! This module defines the different types of blocks in the voxel world
//! and the conversion from their compact storage id.

use num_derive::FromPrimitive;

use super::{BlockTypeSize, BLOCK_TYPE_TO_TEXTURE_INDICES};

/// Enumerates all possible block types in the voxel world.
///
/// Each variant is stored as a single `BlockTypeSize` in chunk storage. The
/// `FromPrimitive` derive allows conversion back from that raw id.
#[repr(u8)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, FromPrimitive)]
pub enum BlockType {
    /// Empty space. Never solid, never meshed.
    #[default]
    AIR,

    /// Plain dirt, found under grass.
    DIRT,

    /// Grass with different textures on top and sides.
    /// The top is green, sides have grass on dirt, and bottom is plain dirt.
    GRASS,

    /// Bare rock. Bedrock layer and high slopes.
    STONE,

    /// Beaches and sea floor.
    SAND,

    /// Caps the highest peaks.
    SNOW,

    /// Log block with bark sides and ring top.
    WOOD,
}

impl BlockType {
    /// Converts a raw `BlockTypeSize` id to a `BlockType`.
    ///
    /// # Returns
    /// `None` if the id does not name a block type.
    pub fn from_id(id: BlockTypeSize) -> Option<Self> {
        num::FromPrimitive::from_u8(id)
    }

    /// The compact id this block is stored as.
    pub fn id(self) -> BlockTypeSize {
        self as BlockTypeSize
    }

    /// Whether this block occludes its neighbours and stops raycasts.
    #[inline]
    pub fn is_solid(self) -> bool {
        self != BlockType::AIR
    }

    /// Texture tile per face, indexed by `BlockSide as usize`.
    #[inline]
    pub fn texture_indices(self) -> [u32; 6] {
        BLOCK_TYPE_TO_TEXTURE_INDICES[self as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::block::block_side::BlockSide;

    #[test]
    fn test_id_conversion() {
        for id in 0..7u8 {
            let block = BlockType::from_id(id).unwrap();
            assert_eq!(block.id(), id);
        }
        assert_eq!(BlockType::from_id(7), None);
        assert_eq!(BlockType::from_id(BlockType::SNOW.id()), Some(BlockType::SNOW));
    }

    #[test]
    fn test_air_is_the_only_non_solid_block() {
        assert!(!BlockType::AIR.is_solid());
        assert!(BlockType::STONE.is_solid());
        assert!(BlockType::SAND.is_solid());
        assert_eq!(BlockType::default(), BlockType::AIR);
    }

    #[test]
    fn test_grass_faces_differ() {
        let tiles = BlockType::GRASS.texture_indices();
        assert_ne!(tiles[BlockSide::TOP as usize], tiles[BlockSide::FRONT as usize]);
        assert_eq!(
            tiles[BlockSide::BOTTOM as usize],
            BlockType::DIRT.texture_indices()[BlockSide::TOP as usize]
        );
    }
}
