//! # Block Side Module
//!
//! This module defines the different faces/sides of a voxel block, the
//! direction each one faces, and the fixed brightness it is drawn with.

use cgmath::Vector3;

/// Represents the six possible faces of a voxel block.
///
/// Each variant is assigned a unique integer value which doubles as the
/// column index into the per-block texture tables.
///
/// The order is: [FRONT, BACK, BOTTOM, TOP, LEFT, RIGHT]
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug)]
pub enum BlockSide {
    /// The front face (facing positive Z)
    FRONT = 0,

    /// The back face (facing negative Z)
    BACK = 1,

    /// The bottom face (facing negative Y)
    BOTTOM = 2,

    /// The top face (facing positive Y)
    TOP = 3,

    /// The left face (facing negative X)
    LEFT = 4,

    /// The right face (facing positive X)
    RIGHT = 5,
}

impl BlockSide {
    /// Returns an array containing all six block faces in a consistent order.
    ///
    /// The order is: [FRONT, BACK, BOTTOM, TOP, LEFT, RIGHT]
    pub fn all() -> [BlockSide; 6] {
        [
            BlockSide::FRONT,
            BlockSide::BACK,
            BlockSide::BOTTOM,
            BlockSide::TOP,
            BlockSide::LEFT,
            BlockSide::RIGHT,
        ]
    }

    /// Unit step from a block to the neighbour this face looks at.
    pub fn offset(self) -> Vector3<i32> {
        match self {
            BlockSide::FRONT => Vector3::new(0, 0, 1),
            BlockSide::BACK => Vector3::new(0, 0, -1),
            BlockSide::BOTTOM => Vector3::new(0, -1, 0),
            BlockSide::TOP => Vector3::new(0, 1, 0),
            BlockSide::LEFT => Vector3::new(-1, 0, 0),
            BlockSide::RIGHT => Vector3::new(1, 0, 0),
        }
    }

    /// Outward normal as written into vertex data.
    pub fn normal(self) -> [f32; 3] {
        let offset = self.offset();
        [offset.x as f32, offset.y as f32, offset.z as f32]
    }

    /// Static directional light term.
    ///
    /// Top faces are fully lit, bottoms darkest, and the lateral faces sit in
    /// between so neighbouring walls stay distinguishable.
    pub fn shade(self) -> f32 {
        match self {
            BlockSide::TOP => 1.0,
            BlockSide::FRONT => 0.85,
            BlockSide::LEFT | BlockSide::RIGHT => 0.8,
            BlockSide::BACK => 0.75,
            BlockSide::BOTTOM => 0.6,
        }
    }

    /// Looks up the face whose offset equals `offset`.
    ///
    /// # Returns
    /// `None` unless `offset` is one of the six axis-aligned unit steps.
    pub fn from_offset(offset: Vector3<i32>) -> Option<BlockSide> {
        BlockSide::all()
            .into_iter()
            .find(|side| side.offset() == offset)
    }
}
