//! # Vertex Data Structures
//!
//! GPU vertex format shared by every mesh the Phong pipeline draws.

/// Interleaved position, texture coordinate and normal.
///
/// `#[repr(C)]` keeps the field order and offsets the vertex layout below
/// describes.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex3D {
    pub position: [f32; 3],
    pub tex_coords: [f32; 2],
    pub normal: [f32; 3],
}

impl Vertex3D {
    const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x2, 2 => Float32x3];

    /// Vertex buffer layout: location 0 position, 1 tex coords, 2 normal.
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex3D>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }

    /// Interleaves the flat attribute arrays of a model.
    pub fn interleave(
        positions: &[[f32; 3]],
        tex_coords: &[[f32; 2]],
        normals: &[[f32; 3]],
    ) -> Vec<Vertex3D> {
        positions
            .iter()
            .enumerate()
            .map(|(i, position)| Vertex3D {
                position: *position,
                tex_coords: tex_coords.get(i).copied().unwrap_or([0.0, 0.0]),
                normal: normals.get(i).copied().unwrap_or([0.0, 1.0, 0.0]),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_layout() {
        let layout = Vertex3D::desc();
        assert_eq!(layout.array_stride, 32);
        assert_eq!(layout.attributes[1].offset, 12);
        assert_eq!(layout.attributes[2].offset, 20);
    }

    #[test]
    fn test_interleave_fills_gaps() {
        let vertices = Vertex3D::interleave(&[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]], &[[0.5, 0.5]], &[]);
        assert_eq!(vertices.len(), 2);
        assert_eq!(vertices[0].tex_coords, [0.5, 0.5]);
        assert_eq!(vertices[1].tex_coords, [0.0, 0.0]);
        assert_eq!(vertices[1].normal, [0.0, 1.0, 0.0]);
    }
}
