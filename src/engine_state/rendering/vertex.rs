//! Vertex data structures and layouts for voxel rendering.
//!
//! This module defines the vertex format chunk meshes are built from and the
//! matching `wgpu` buffer layout.

/// A vertex in the voxel rendering pipeline.
///
/// # Memory Layout
/// - Position: [f32; 3] (12 bytes)
/// - Texture Coordinates: [f32; 2] (8 bytes)
/// - Texture Index: u32 (4 bytes)
/// - Normal: [f32; 3] (12 bytes)
/// - Shade: f32 (4 bytes)
///
/// Total size: 40 bytes
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    /// Position in world space
    pub position: [f32; 3],
    /// UV coordinates within the face's tile (0.0-1.0)
    pub tex_coords: [f32; 2],
    /// Index of the tile in the texture array
    pub texture_index: u32,
    /// Outward face normal
    pub normal: [f32; 3],
    /// Per-face brightness multiplier
    pub shade: f32,
}

impl Vertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 5] = wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32x2,
        2 => Uint32,
        3 => Float32x3,
        4 => Float32,
    ];

    /// Returns the vertex buffer layout description for the shader pipeline.
    ///
    /// # Shader Attributes
    /// - `location = 0`: position (vec3<f32>)
    /// - `location = 1`: tex_coords (vec2<f32>)
    /// - `location = 2`: texture_index (u32)
    /// - `location = 3`: normal (vec3<f32>)
    /// - `location = 4`: shade (f32)
    pub fn desc<'a>() -> wgpu::VertexBufferLayout<'a> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}
