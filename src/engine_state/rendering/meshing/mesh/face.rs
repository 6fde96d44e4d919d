use cgmath::Point3;

use crate::engine_state::{
    rendering::Vertex,
    voxels::block::{block_side::BlockSide, block_type::BlockType},
};

/// Represents a single quad face of a voxel in the mesh.
///
/// A face is defined by four corner points (lower-left, lower-right, upper-right, upper-left)
/// in world space, wound counter-clockwise when seen from outside the block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Face {
    /// Lower-left corner of the face
    pub ll: Point3<i32>,
    /// Lower-right corner of the face
    pub lr: Point3<i32>,
    /// Upper-right corner of the face
    pub ur: Point3<i32>,
    /// Upper-left corner of the face
    pub ul: Point3<i32>,
    /// The block the face belongs to, used for texture lookup
    pub block_type: BlockType,
    /// Which side of the block this face represents
    pub block_side: BlockSide,
}

impl Face {
    /// Creates the face `block_side` of the block at `local` inside the chunk
    /// whose (0, 0, 0) block sits at world position `origin`.
    pub fn new(
        origin: Point3<i32>,
        local: Point3<usize>,
        block_type: BlockType,
        block_side: BlockSide,
    ) -> Self {
        let i = origin.x + local.x as i32;
        let j = origin.y + local.y as i32;
        let k = origin.z + local.z as i32;

        let (ll, lr, ur, ul) = match block_side {
            BlockSide::FRONT => (
                Point3::new(i, j, k + 1),
                Point3::new(i + 1, j, k + 1),
                Point3::new(i + 1, j + 1, k + 1),
                Point3::new(i, j + 1, k + 1),
            ),
            BlockSide::BACK => (
                Point3::new(i + 1, j, k),
                Point3::new(i, j, k),
                Point3::new(i, j + 1, k),
                Point3::new(i + 1, j + 1, k),
            ),
            BlockSide::BOTTOM => (
                Point3::new(i, j, k),
                Point3::new(i + 1, j, k),
                Point3::new(i + 1, j, k + 1),
                Point3::new(i, j, k + 1),
            ),
            BlockSide::TOP => (
                Point3::new(i, j + 1, k + 1),
                Point3::new(i + 1, j + 1, k + 1),
                Point3::new(i + 1, j + 1, k),
                Point3::new(i, j + 1, k),
            ),
            BlockSide::LEFT => (
                Point3::new(i, j, k),
                Point3::new(i, j, k + 1),
                Point3::new(i, j + 1, k + 1),
                Point3::new(i, j + 1, k),
            ),
            BlockSide::RIGHT => (
                Point3::new(i + 1, j, k + 1),
                Point3::new(i + 1, j, k),
                Point3::new(i + 1, j + 1, k),
                Point3::new(i + 1, j + 1, k + 1),
            ),
        };

        Face {
            ll,
            lr,
            ur,
            ul,
            block_type,
            block_side,
        }
    }

    /// The two triangles of this face: (ll, lr, ur) and (ll, ur, ul).
    pub fn vertices(&self) -> [Vertex; 6] {
        let texture_index = self.block_type.texture_indices()[self.block_side as usize];
        let normal = self.block_side.normal();
        let shade = self.block_side.shade();
        let vertex = |corner: Point3<i32>, tex_coords: [f32; 2]| Vertex {
            position: [corner.x as f32, corner.y as f32, corner.z as f32],
            tex_coords,
            texture_index,
            normal,
            shade,
        };

        let ll = vertex(self.ll, [0.0, 1.0]);
        let lr = vertex(self.lr, [1.0, 1.0]);
        let ur = vertex(self.ur, [1.0, 0.0]);
        let ul = vertex(self.ul, [0.0, 0.0]);
        [ll, lr, ur, ll, ur, ul]
    }

    /// Appends this face's six vertices to `out`.
    #[inline]
    pub fn push_vertices(&self, out: &mut Vec<Vertex>) {
        out.extend_from_slice(&self.vertices());
    }
}

#[cfg(test)]
mod tests {
    use cgmath::{InnerSpace, Vector3};

    use super::*;

    fn to_vec(position: [f32; 3]) -> Vector3<f32> {
        Vector3::new(position[0], position[1], position[2])
    }

    #[test]
    fn test_winding_faces_outward() {
        for side in BlockSide::all() {
            let face = Face::new(Point3::new(16, 0, -32), Point3::new(3, 7, 2), BlockType::STONE, side);
            let vertices = face.vertices();
            for triangle in vertices.chunks(3) {
                let a = to_vec(triangle[0].position);
                let b = to_vec(triangle[1].position);
                let c = to_vec(triangle[2].position);
                let winding = (b - a).cross(c - a).normalize();
                assert_eq!(winding, to_vec(side.normal()), "{:?}", side);
            }
        }
    }

    #[test]
    fn test_face_lies_on_its_block_boundary() {
        let face = Face::new(Point3::new(-16, 0, 0), Point3::new(15, 4, 0), BlockType::DIRT, BlockSide::RIGHT);
        for vertex in face.vertices() {
            assert_eq!(vertex.position[0], 0.0);
        }
        let face = Face::new(Point3::new(-16, 0, 0), Point3::new(15, 4, 0), BlockType::DIRT, BlockSide::TOP);
        for vertex in face.vertices() {
            assert_eq!(vertex.position[1], 5.0);
        }
    }

    #[test]
    fn test_grass_texture_and_shade_follow_side() {
        let top = Face::new(Point3::new(0, 0, 0), Point3::new(0, 0, 0), BlockType::GRASS, BlockSide::TOP);
        let side = Face::new(Point3::new(0, 0, 0), Point3::new(0, 0, 0), BlockType::GRASS, BlockSide::BACK);
        let top_vertex = top.vertices()[0];
        let side_vertex = side.vertices()[0];

        assert_ne!(top_vertex.texture_index, side_vertex.texture_index);
        assert_eq!(top_vertex.shade, 1.0);
        assert_eq!(side_vertex.shade, 0.75);
        assert_eq!(side_vertex.normal, [0.0, 0.0, -1.0]);
    }
}
