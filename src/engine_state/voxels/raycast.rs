//! Voxel raycasting for block selection.
//!
//! Walks the grid cell by cell (Amanatides & Woo) so that no block along the
//! ray is skipped, regardless of ray direction or length.

use cgmath::{InnerSpace, Point3, Vector3};

use super::{
    block::{block_side::BlockSide, block_type::BlockType},
    world::World,
};

/// The block a ray stopped at.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RaycastHit {
    /// World position of the hit block
    pub block_position: Point3<i32>,
    /// What was hit
    pub block_type: BlockType,
    /// Face the ray entered through. `None` when the ray started inside the block.
    pub face: Option<BlockSide>,
    /// Distance from the origin to the entry point
    pub distance: f32,
}

impl RaycastHit {
    /// Where a block placed against the hit face would go.
    pub fn place_position(&self) -> Option<Point3<i32>> {
        self.face.map(|face| self.block_position + face.offset())
    }
}

/// Casts a ray through `world` and returns the first solid block within
/// `max_distance`.
///
/// Unloaded chunks and space outside the world read as air, so a ray through
/// them simply continues.
pub fn raycast(
    world: &World,
    origin: Point3<f32>,
    direction: Vector3<f32>,
    max_distance: f32,
) -> Option<RaycastHit> {
    if direction.magnitude2() <= f32::EPSILON || !max_distance.is_finite() {
        return None;
    }
    let direction = direction.normalize();

    let mut cell = Point3::new(
        origin.x.floor() as i32,
        origin.y.floor() as i32,
        origin.z.floor() as i32,
    );
    let origin = [origin.x, origin.y, origin.z];
    let direction = [direction.x, direction.y, direction.z];

    let mut step = [0i32; 3];
    let mut t_max = [f32::INFINITY; 3];
    let mut t_delta = [f32::INFINITY; 3];
    let start = [cell.x, cell.y, cell.z];
    for axis in 0..3 {
        if direction[axis] > 0.0 {
            step[axis] = 1;
            t_delta[axis] = 1.0 / direction[axis];
            t_max[axis] = (start[axis] as f32 + 1.0 - origin[axis]) * t_delta[axis];
        } else if direction[axis] < 0.0 {
            step[axis] = -1;
            t_delta[axis] = -1.0 / direction[axis];
            t_max[axis] = (origin[axis] - start[axis] as f32) * t_delta[axis];
        }
    }

    let mut face = None;
    let mut distance = 0.0;

    while distance <= max_distance {
        let block_type = world.block_at(cell.x, cell.y, cell.z);
        if block_type.is_solid() {
            return Some(RaycastHit {
                block_position: cell,
                block_type,
                face,
                distance,
            });
        }

        let axis = if t_max[0] < t_max[1] {
            if t_max[0] < t_max[2] { 0 } else { 2 }
        } else if t_max[1] < t_max[2] {
            1
        } else {
            2
        };

        distance = t_max[axis];
        t_max[axis] += t_delta[axis];

        let mut entered = Vector3::new(0, 0, 0);
        entered[axis] = -step[axis];
        face = BlockSide::from_offset(entered);
        cell[axis] += step[axis];
    }

    None
}
