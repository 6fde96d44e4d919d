//! # Coordinate Module
//!
//! Conversions between world block coordinates, chunk-grid coordinates and
//! chunk-local indices.
//!
//! Every conversion floors toward negative infinity, so world x = -1 lands in
//! chunk -1 at local index 15 rather than in chunk 0.

use cgmath::{Point2, Point3};

use super::chunk::{CHUNK_HEIGHT, CHUNK_SIZE};

/// Chunk indices on the XZ plane. `y` holds the Z index.
pub type ChunkCoord = Point2<i32>;

const CHUNK_SIZE_I32: i32 = CHUNK_SIZE as i32;

/// The chunk containing world column `(world_x, world_z)`.
#[inline]
pub fn chunk_coord_of(world_x: i32, world_z: i32) -> ChunkCoord {
    Point2::new(
        world_x.div_euclid(CHUNK_SIZE_I32),
        world_z.div_euclid(CHUNK_SIZE_I32),
    )
}

/// The chunk containing a floating point world position.
pub fn chunk_coord_of_position(world_x: f32, world_z: f32) -> ChunkCoord {
    chunk_coord_of(world_x.floor() as i32, world_z.floor() as i32)
}

/// Local index of a world X or Z coordinate inside its chunk.
#[inline]
pub fn local_index(world: i32) -> usize {
    world.rem_euclid(CHUNK_SIZE_I32) as usize
}

/// Splits a world block position into its chunk and chunk-local position.
///
/// # Returns
/// `None` when `y` lies outside `[0, CHUNK_HEIGHT)`.
pub fn split_world_position(world: Point3<i32>) -> Option<(ChunkCoord, Point3<usize>)> {
    if world.y < 0 || world.y >= CHUNK_HEIGHT as i32 {
        return None;
    }
    Some((
        chunk_coord_of(world.x, world.z),
        Point3::new(local_index(world.x), world.y as usize, local_index(world.z)),
    ))
}

/// World position of the chunk's (0, 0, 0) block.
#[inline]
pub fn chunk_origin(coord: ChunkCoord) -> Point3<i32> {
    Point3::new(coord.x * CHUNK_SIZE_I32, 0, coord.y * CHUNK_SIZE_I32)
}

/// Euclidean distance between two chunks, in chunk units.
pub fn chunk_distance(a: ChunkCoord, b: ChunkCoord) -> f32 {
    let dx = (a.x - b.x) as f32;
    let dz = (a.y - b.y) as f32;
    (dx * dx + dz * dz).sqrt()
}

/// The four lateral neighbours of a chunk, as [west, east, north, south].
pub fn lateral_neighbors(coord: ChunkCoord) -> [ChunkCoord; 4] {
    [
        Point2::new(coord.x - 1, coord.y),
        Point2::new(coord.x + 1, coord.y),
        Point2::new(coord.x, coord.y - 1),
        Point2::new(coord.x, coord.y + 1),
    ]
}
