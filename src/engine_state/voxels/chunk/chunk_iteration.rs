//! # Chunk Iteration Module
//!
//! An iterator over the solid blocks of a chunk, in storage order.

use cgmath::Point3;

use crate::engine_state::voxels::block::block_type::BlockType;

use super::{Chunk, CHUNK_HEIGHT, CHUNK_SIZE, CHUNK_VOLUME};

/// An iterator over all non-air blocks in a chunk.
///
/// Yields each block together with its chunk-local position. Air is skipped.
pub struct ChunkBlockIterator<'a> {
    /// Reference to the chunk being iterated over
    chunk_ref: &'a Chunk,
    /// Next storage index to inspect
    current_offset: usize,
}

impl<'a> ChunkBlockIterator<'a> {
    /// Creates a new `ChunkBlockIterator` for the given chunk.
    pub fn new(chunk_ref: &'a Chunk) -> Self {
        ChunkBlockIterator {
            chunk_ref,
            current_offset: 0,
        }
    }
}

impl Iterator for ChunkBlockIterator<'_> {
    type Item = (Point3<usize>, BlockType);

    fn next(&mut self) -> Option<Self::Item> {
        let blocks = self.chunk_ref.blocks();
        while self.current_offset < CHUNK_VOLUME {
            let offset = self.current_offset;
            self.current_offset += 1;

            let block = blocks[offset];
            if !block.is_solid() {
                continue;
            }

            let y = offset % CHUNK_HEIGHT;
            let column = offset / CHUNK_HEIGHT;
            let position = Point3::new(column / CHUNK_SIZE, y, column % CHUNK_SIZE);
            return Some((position, block));
        }
        None
    }
}
