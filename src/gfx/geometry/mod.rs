//! # Procedural Geometry
//!
//! Basic shapes that the scene registers without touching the file system.
//!
//! - **Square**: unit quad in the XY plane, facing +Z
//! - **Cube**: unit cube with per-face normals
//! - **Sphere**: UV sphere with configurable resolution
//! - **Plane**: subdivided grid in the XZ plane, facing +Y
//!
//! ```rust
//! use lantern::gfx::geometry::{generate_cube, generate_plane};
//!
//! let cube = generate_cube();
//! assert_eq!(cube.triangle_count(), 12);
//!
//! let plane = generate_plane(10.0, 10.0, 4, 4);
//! assert_eq!(plane.vertex_count(), 25);
//! ```

pub mod primitives;

pub use primitives::*;

use crate::gfx::model::{MaterialData, MeshEntry, ModelData};

/// Generated geometry, one entry per vertex in each attribute array.
#[derive(Debug, Clone, Default)]
pub struct GeometryData {
    pub vertices: Vec<[f32; 3]>,
    pub tex_coords: Vec<[f32; 2]>,
    pub normals: Vec<[f32; 3]>,
    /// Counter-clockwise triangles.
    pub indices: Vec<u32>,
}

impl GeometryData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Wraps the geometry as a single-mesh model with one default material.
    pub fn into_model_data(self, name: &str) -> ModelData {
        let mesh = MeshEntry {
            material_index: 0,
            num_indices: self.indices.len() as u32,
            base_vertex: 0,
            base_index: 0,
        };

        ModelData {
            positions: self.vertices,
            normals: self.normals,
            tex_coords: self.tex_coords,
            indices: self.indices,
            meshes: vec![mesh],
            materials: vec![MaterialData::named(name)],
            source: format!("<{name}>").into(),
            ..Default::default()
        }
    }
}
