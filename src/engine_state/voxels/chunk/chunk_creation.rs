//! # Chunk Creation Module
//!
//! A builder that fills a chunk one voxel at a time in storage order, so that
//! generators never have to compute indices themselves.

use log::warn;

use crate::engine_state::{
    rendering::meshing::ChunkMesh,
    voxels::{block::block_type::BlockType, coords::ChunkCoord},
};

use super::{Chunk, CHUNK_HEIGHT, CHUNK_VOLUME};

/// Builds a chunk from a stream of blocks.
///
/// Blocks are pushed column by column: x outermost, then z, then y from the
/// bottom of the world up.
pub struct ChunkCreationIterator {
    /// The grid position of the chunk being created
    position: ChunkCoord,
    /// Blocks pushed so far
    blocks: Vec<BlockType>,
}

impl ChunkCreationIterator {
    /// Creates a new `ChunkCreationIterator` for building a chunk at the given position.
    pub fn new(position: ChunkCoord) -> Self {
        ChunkCreationIterator {
            position,
            blocks: Vec::with_capacity(CHUNK_VOLUME),
        }
    }

    /// Adds a block at the current position and advances the position.
    pub fn push_block_type(&mut self, block_type: BlockType) {
        debug_assert!(self.blocks.len() < CHUNK_VOLUME, "chunk overfilled");
        self.blocks.push(block_type);
    }

    /// Adds one full column, bottom block first.
    pub fn push_column(&mut self, column: &[BlockType; CHUNK_HEIGHT]) {
        debug_assert!(self.blocks.len() % CHUNK_HEIGHT == 0, "column pushed mid-column");
        self.blocks.extend_from_slice(column);
    }

    /// Finalizes the chunk creation and returns the constructed `Chunk`.
    ///
    /// A partially filled chunk is padded with air.
    pub fn return_chunk(mut self) -> Chunk {
        if self.blocks.len() != CHUNK_VOLUME {
            debug_assert!(false, "chunk returned with {} blocks", self.blocks.len());
            warn!(
                "Chunk {:?} built with {} of {} blocks",
                self.position,
                self.blocks.len(),
                CHUNK_VOLUME
            );
            self.blocks.resize(CHUNK_VOLUME, BlockType::AIR);
        }

        Chunk {
            position: self.position,
            blocks: self.blocks.into_boxed_slice(),
            mesh: ChunkMesh::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use cgmath::Point2;

    use super::*;
    use crate::engine_state::voxels::chunk::CHUNK_COLUMNS;

    #[test]
    fn test_push_order_matches_layout() {
        let mut cci = ChunkCreationIterator::new(Point2::new(0, 0));
        let mut column = [BlockType::AIR; CHUNK_HEIGHT];
        column[0] = BlockType::STONE;
        // First column is (x=0, z=0), second is (x=0, z=1).
        cci.push_column(&column);
        column[0] = BlockType::SAND;
        cci.push_column(&column);
        for _ in 2..CHUNK_COLUMNS {
            cci.push_column(&[BlockType::AIR; CHUNK_HEIGHT]);
        }
        let chunk = cci.return_chunk();
        assert_eq!(chunk.block_at(0, 0, 0), BlockType::STONE);
        assert_eq!(chunk.block_at(0, 0, 1), BlockType::SAND);
        assert_eq!(chunk.block_at(1, 0, 0), BlockType::AIR);
    }
}
