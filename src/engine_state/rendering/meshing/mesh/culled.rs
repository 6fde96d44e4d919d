use cgmath::Point3;
use log::trace;

use super::face::Face;
use crate::engine_state::{
    rendering::Vertex,
    voxels::{
        block::block_side::BlockSide,
        chunk::{Chunk, CHUNK_HEIGHT, CHUNK_SIZE},
    },
};

/// The four lateral neighbours of the chunk being meshed.
///
/// Borrowed from the chunk store for the duration of one build. A missing
/// neighbour means that chunk is not loaded, and faces against it are drawn.
#[derive(Clone, Copy, Debug, Default)]
pub struct NeighborChunks<'a> {
    /// Chunk at `cx - 1`
    pub west: Option<&'a Chunk>,
    /// Chunk at `cx + 1`
    pub east: Option<&'a Chunk>,
    /// Chunk at `cz - 1`
    pub north: Option<&'a Chunk>,
    /// Chunk at `cz + 1`
    pub south: Option<&'a Chunk>,
}

impl NeighborChunks<'_> {
    /// No neighbours loaded.
    pub fn none() -> Self {
        Self::default()
    }
}

/// Builds the world-space triangle list of every exposed face in `chunk`.
///
/// A face is exposed when the block it looks at is air, lies outside
/// `[0, CHUNK_HEIGHT)`, or lies in a neighbour chunk that is not loaded. The
/// bedrock layer therefore keeps its bottom faces.
///
/// Six vertices per face; an all-air chunk yields an empty vector.
pub fn build_chunk_vertices(chunk: &Chunk, neighbors: &NeighborChunks) -> Vec<Vertex> {
    let origin = chunk.world_origin();
    let mut vertices = Vec::new();

    for (local, block_type) in chunk.iter_blocks() {
        for side in BlockSide::all() {
            if is_face_exposed(chunk, neighbors, local, side) {
                Face::new(origin, local, block_type, side).push_vertices(&mut vertices);
            }
        }
    }

    trace!(
        "Meshed chunk {:?}: {} vertices",
        chunk.position,
        vertices.len()
    );
    vertices
}

fn is_face_exposed(
    chunk: &Chunk,
    neighbors: &NeighborChunks,
    local: Point3<usize>,
    side: BlockSide,
) -> bool {
    const SIZE: i32 = CHUNK_SIZE as i32;

    let offset = side.offset();
    let x = local.x as i32 + offset.x;
    let y = local.y as i32 + offset.y;
    let z = local.z as i32 + offset.z;

    if y < 0 || y >= CHUNK_HEIGHT as i32 {
        return true;
    }

    let (owner, x, z) = if x < 0 {
        (neighbors.west, x + SIZE, z)
    } else if x >= SIZE {
        (neighbors.east, x - SIZE, z)
    } else if z < 0 {
        (neighbors.north, x, z + SIZE)
    } else if z >= SIZE {
        (neighbors.south, x, z - SIZE)
    } else {
        (Some(chunk), x, z)
    };

    match owner {
        Some(owner) => !owner.block_at(x as usize, y as usize, z as usize).is_solid(),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use cgmath::Point2;

    use super::*;
    use crate::engine_state::voxels::block::block_type::BlockType;

    const FACE: usize = 6;

    #[test]
    fn test_air_chunk_has_no_vertices() {
        let chunk = Chunk::empty(Point2::new(0, 0));
        assert!(build_chunk_vertices(&chunk, &NeighborChunks::none()).is_empty());
    }

    #[test]
    fn test_bedrock_block_shows_six_faces() {
        let mut chunk = Chunk::empty(Point2::new(0, 0));
        chunk.set_block_at(8, 0, 8, BlockType::STONE);
        let vertices = build_chunk_vertices(&chunk, &NeighborChunks::none());
        assert_eq!(vertices.len(), 6 * FACE);
        assert_eq!(
            vertices
                .iter()
                .filter(|vertex| vertex.normal == [0.0, -1.0, 0.0])
                .count(),
            FACE
        );
    }

    #[test]
    fn test_floating_block_shows_six_faces() {
        let mut chunk = Chunk::empty(Point2::new(0, 0));
        chunk.set_block_at(8, 50, 8, BlockType::STONE);
        let vertices = build_chunk_vertices(&chunk, &NeighborChunks::none());
        assert_eq!(vertices.len(), 6 * FACE);
    }

    #[test]
    fn test_surrounded_solid_chunk_shows_only_top_and_bottom() {
        let chunk = Chunk::filled(Point2::new(0, 0), BlockType::STONE);
        let west = Chunk::filled(Point2::new(-1, 0), BlockType::STONE);
        let east = Chunk::filled(Point2::new(1, 0), BlockType::STONE);
        let north = Chunk::filled(Point2::new(0, -1), BlockType::STONE);
        let south = Chunk::filled(Point2::new(0, 1), BlockType::STONE);
        let neighbors = NeighborChunks {
            west: Some(&west),
            east: Some(&east),
            north: Some(&north),
            south: Some(&south),
        };

        let vertices = build_chunk_vertices(&chunk, &neighbors);
        assert_eq!(vertices.len(), 2 * CHUNK_SIZE * CHUNK_SIZE * FACE);
        assert!(vertices
            .iter()
            .all(|vertex| vertex.normal == [0.0, 1.0, 0.0] || vertex.normal == [0.0, -1.0, 0.0]));
    }

    #[test]
    fn test_isolated_solid_chunk_shows_full_boundary() {
        let chunk = Chunk::filled(Point2::new(0, 0), BlockType::STONE);
        let vertices = build_chunk_vertices(&chunk, &NeighborChunks::none());

        let top_and_bottom = 2 * CHUNK_SIZE * CHUNK_SIZE;
        let sides = 4 * CHUNK_SIZE * CHUNK_HEIGHT;
        assert_eq!(vertices.len(), (top_and_bottom + sides) * FACE);
    }

    #[test]
    fn test_air_neighbor_exposes_edge() {
        let chunk = Chunk::filled(Point2::new(0, 0), BlockType::STONE);
        let solid = Chunk::filled(Point2::new(0, 0), BlockType::STONE);
        let air = Chunk::empty(Point2::new(-1, 0));
        let neighbors = NeighborChunks {
            west: Some(&air),
            east: Some(&solid),
            north: Some(&solid),
            south: Some(&solid),
        };

        let vertices = build_chunk_vertices(&chunk, &neighbors);
        let west_faces = vertices
            .iter()
            .filter(|vertex| vertex.normal == [-1.0, 0.0, 0.0])
            .count()
            / FACE;
        assert_eq!(west_faces, CHUNK_SIZE * CHUNK_HEIGHT);
    }

    #[test]
    fn test_vertices_are_in_world_space() {
        let mut chunk = Chunk::empty(Point2::new(-1, 2));
        chunk.set_block_at(0, 10, 0, BlockType::DIRT);
        let vertices = build_chunk_vertices(&chunk, &NeighborChunks::none());
        for vertex in vertices {
            assert!((-16.0..=-15.0).contains(&vertex.position[0]));
            assert!((32.0..=33.0).contains(&vertex.position[2]));
        }
    }
}
