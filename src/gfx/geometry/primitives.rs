//! Primitive shape generation. All shapes carry normals and texture coordinates.

use super::GeometryData;
use std::f32::consts::PI;

/// Unit square centered at the origin in the XY plane, normal +Z.
pub fn generate_square() -> GeometryData {
    GeometryData {
        vertices: vec![
            [-0.5, -0.5, 0.0],
            [0.5, -0.5, 0.0],
            [0.5, 0.5, 0.0],
            [-0.5, 0.5, 0.0],
        ],
        tex_coords: vec![[0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]],
        normals: vec![[0.0, 0.0, 1.0]; 4],
        indices: vec![0, 1, 2, 2, 3, 0],
    }
}

/// Unit cube centered at the origin, vertices from -0.5 to 0.5 on all axes.
pub fn generate_cube() -> GeometryData {
    // (normal, tangent u, tangent v) per face; corners are built from these
    let faces: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
        ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
        ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
        ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
        ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
    ];
    let corners = [(-0.5, -0.5), (0.5, -0.5), (0.5, 0.5), (-0.5, 0.5)];
    let uvs = [[0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]];

    let mut data = GeometryData::new();

    for (face, (n, u, v)) in faces.iter().enumerate() {
        for (corner, (cu, cv)) in corners.iter().enumerate() {
            data.vertices.push([
                n[0] * 0.5 + u[0] * cu + v[0] * cv,
                n[1] * 0.5 + u[1] * cu + v[1] * cv,
                n[2] * 0.5 + u[2] * cu + v[2] * cv,
            ]);
            data.normals.push(*n);
            data.tex_coords.push(uvs[corner]);
        }

        let base = face as u32 * 4;
        data.indices
            .extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
    }

    data
}

/// UV sphere of radius 1.0 centered at the origin.
pub fn generate_sphere(longitude_segments: u32, latitude_segments: u32) -> GeometryData {
    let mut data = GeometryData::new();

    let long_segs = longitude_segments.max(3);
    let lat_segs = latitude_segments.max(2);

    for lat in 0..=lat_segs {
        let theta = lat as f32 * PI / lat_segs as f32;
        let (sin_theta, cos_theta) = theta.sin_cos();

        for long in 0..=long_segs {
            let phi = long as f32 * 2.0 * PI / long_segs as f32;
            let (sin_phi, cos_phi) = phi.sin_cos();

            let x = sin_theta * cos_phi;
            let y = cos_theta;
            let z = sin_theta * sin_phi;

            data.vertices.push([x, y, z]);
            data.normals.push([x, y, z]);
            data.tex_coords
                .push([long as f32 / long_segs as f32, lat as f32 / lat_segs as f32]);
        }
    }

    for lat in 0..lat_segs {
        for long in 0..long_segs {
            let first = lat * (long_segs + 1) + long;
            let second = first + long_segs + 1;

            data.indices.extend_from_slice(&[first, first + 1, second]);
            data.indices.extend_from_slice(&[second, first + 1, second + 1]);
        }
    }

    data
}

/// Subdivided plane in the XZ plane centered at the origin, normal +Y.
pub fn generate_plane(width: f32, depth: f32, width_segments: u32, depth_segments: u32) -> GeometryData {
    let mut data = GeometryData::new();

    let w_segs = width_segments.max(1);
    let d_segs = depth_segments.max(1);

    for z in 0..=d_segs {
        let v = z as f32 / d_segs as f32;
        let pos_z = (v - 0.5) * depth;

        for x in 0..=w_segs {
            let u = x as f32 / w_segs as f32;
            let pos_x = (u - 0.5) * width;

            data.vertices.push([pos_x, 0.0, pos_z]);
            data.normals.push([0.0, 1.0, 0.0]);
            data.tex_coords.push([u, v]);
        }
    }

    // counter-clockwise when seen from above
    for z in 0..d_segs {
        for x in 0..w_segs {
            let i = z * (w_segs + 1) + x;
            let next_row = i + w_segs + 1;

            data.indices.extend_from_slice(&[i, next_row, i + 1]);
            data.indices.extend_from_slice(&[next_row, next_row + 1, i + 1]);
        }
    }

    data
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{InnerSpace, Vector3};

    fn face_normal(data: &GeometryData, tri: usize) -> Vector3<f32> {
        let p = |i: usize| Vector3::from(data.vertices[data.indices[tri * 3 + i] as usize]);
        (p(1) - p(0)).cross(p(2) - p(0))
    }

    fn assert_outward_winding(data: &GeometryData) {
        for tri in 0..data.triangle_count() {
            let n = face_normal(data, tri);
            if n.magnitude2() < 1e-12 {
                continue;
            }
            let stored = Vector3::from(data.normals[data.indices[tri * 3] as usize]);
            assert!(n.dot(stored) > 0.0, "triangle {tri} winds against its normal");
        }
    }

    #[test]
    fn test_square_generation() {
        let square = generate_square();
        assert_eq!(square.vertex_count(), 4);
        assert_eq!(square.triangle_count(), 2);
        assert_outward_winding(&square);
    }

    #[test]
    fn test_cube_generation() {
        let cube = generate_cube();
        assert_eq!(cube.vertices.len(), 24);
        assert_eq!(cube.indices.len(), 36);
        assert_eq!(cube.triangle_count(), 12);
        assert!(cube
            .vertices
            .iter()
            .all(|v| v.iter().all(|c| (c.abs() - 0.5).abs() < 1e-6)));
        assert_outward_winding(&cube);
    }

    #[test]
    fn test_sphere_generation() {
        let sphere = generate_sphere(8, 6);
        assert_eq!(sphere.vertices.len(), 9 * 7);
        assert_eq!(sphere.vertices.len(), sphere.normals.len());
        assert_eq!(sphere.vertices.len(), sphere.tex_coords.len());
        assert_outward_winding(&sphere);
    }

    #[test]
    fn test_plane_generation() {
        let plane = generate_plane(2.0, 2.0, 2, 2);
        assert_eq!(plane.vertices.len(), 9);
        assert_eq!(plane.indices.len(), 24);
        assert_outward_winding(&plane);
    }

    #[test]
    fn test_into_model_data() {
        let model = generate_cube().into_model_data("cube");
        assert_eq!(model.meshes.len(), 1);
        assert_eq!(model.meshes[0].num_indices, 36);
        assert_eq!(model.materials.len(), 1);
        assert_eq!(model.vertex_count(), 24);
    }
}
