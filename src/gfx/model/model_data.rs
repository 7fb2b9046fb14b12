use std::path::PathBuf;

use cgmath::{InnerSpace, Vector3};

use crate::gfx::{
    camera::BasicCamera,
    lighting::{DirectionalLight, PointLight, SpotLight},
};

/// Where a material texture comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum TextureSource {
    File(PathBuf),
    /// Decoded RGBA8 pixels carried by the model file itself.
    Embedded {
        width: u32,
        height: u32,
        rgba: Vec<u8>,
    },
}

impl TextureSource {
    pub fn describe(&self) -> String {
        match self {
            TextureSource::File(path) => path.display().to_string(),
            TextureSource::Embedded { width, height, .. } => {
                format!("<embedded {width}x{height}>")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MaterialData {
    pub name: String,
    pub ambient_color: [f32; 3],
    pub diffuse_color: [f32; 3],
    pub specular_color: [f32; 3],
    pub diffuse_texture: Option<TextureSource>,
    pub specular_exponent_texture: Option<TextureSource>,
}

impl MaterialData {
    /// White ambient, black diffuse and specular, no textures.
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            ambient_color: [1.0, 1.0, 1.0],
            diffuse_color: [0.0; 3],
            specular_color: [0.0; 3],
            diffuse_texture: None,
            specular_exponent_texture: None,
        }
    }

    fn has_ambient(&self) -> bool {
        self.ambient_color.iter().any(|c| *c != 0.0)
    }
}

impl Default for MaterialData {
    fn default() -> Self {
        Self::named("default")
    }
}

/// One draw call's worth of a model. Indices are relative to `base_vertex`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MeshEntry {
    pub material_index: usize,
    pub num_indices: u32,
    pub base_vertex: u32,
    pub base_index: u32,
}

/// CPU-side model: flat vertex arrays shared by all meshes, plus whatever
/// materials, cameras and lights the file carried.
#[derive(Debug, Clone, Default)]
pub struct ModelData {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub tex_coords: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
    pub meshes: Vec<MeshEntry>,
    pub materials: Vec<MaterialData>,
    pub cameras: Vec<BasicCamera>,
    pub dir_lights: Vec<DirectionalLight>,
    pub point_lights: Vec<PointLight>,
    pub spot_lights: Vec<SpotLight>,
    pub source: PathBuf,
}

impl ModelData {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            ..Default::default()
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// First material with a non-zero ambient color, else the first material.
    pub fn material(&self) -> Option<&MaterialData> {
        self.materials
            .iter()
            .find(|m| m.has_ambient())
            .or_else(|| self.materials.first())
    }

    /// Position of the first vertex of triangle `prim_id` in mesh `draw_index`.
    pub fn leading_vertex(&self, draw_index: usize, prim_id: usize) -> Option<[f32; 3]> {
        let mesh = self.meshes.get(draw_index)?;
        if prim_id >= (mesh.num_indices / 3) as usize {
            return None;
        }

        let index = *self.indices.get(mesh.base_index as usize + prim_id * 3)?;
        self.positions
            .get((mesh.base_vertex + index) as usize)
            .copied()
    }

    /// Appends one mesh, filling in missing normals and texture coordinates.
    ///
    /// `indices` are relative to the mesh's own vertices.
    pub fn append_mesh(
        &mut self,
        positions: Vec<[f32; 3]>,
        normals: Option<Vec<[f32; 3]>>,
        tex_coords: Option<Vec<[f32; 2]>>,
        indices: Vec<u32>,
        material_index: Option<usize>,
    ) {
        let vertex_count = positions.len();

        let normals = match normals {
            Some(n) if n.len() == vertex_count => n,
            _ => compute_normals(&positions, &indices),
        };
        let tex_coords = match tex_coords {
            Some(t) if t.len() == vertex_count => t,
            _ => vec![[0.0, 0.0]; vertex_count],
        };

        self.meshes.push(MeshEntry {
            material_index: material_index.unwrap_or(0),
            num_indices: indices.len() as u32,
            base_vertex: self.positions.len() as u32,
            base_index: self.indices.len() as u32,
        });

        self.positions.extend(positions);
        self.normals.extend(normals);
        self.tex_coords.extend(tex_coords);
        self.indices.extend(indices);
    }

    /// Guarantees at least one material and that every mesh points at one.
    pub(crate) fn finish_materials(&mut self) {
        if self.materials.is_empty() {
            self.materials.push(MaterialData::default());
        }

        let count = self.materials.len();
        for mesh in self.meshes.iter_mut() {
            if mesh.material_index >= count {
                log::warn!(
                    "Mesh material index {} out of range ({} materials), using 0",
                    mesh.material_index,
                    count
                );
                mesh.material_index = 0;
            }
        }
    }
}

/// Area-weighted vertex normals: unnormalized face normals are summed per
/// vertex, then normalized.
pub fn compute_normals(positions: &[[f32; 3]], indices: &[u32]) -> Vec<[f32; 3]> {
    let mut sums = vec![Vector3::new(0.0f32, 0.0, 0.0); positions.len()];

    for triangle in indices.chunks_exact(3) {
        let [i0, i1, i2] = [
            triangle[0] as usize,
            triangle[1] as usize,
            triangle[2] as usize,
        ];
        if i0 >= positions.len() || i1 >= positions.len() || i2 >= positions.len() {
            continue;
        }

        let v0 = Vector3::from(positions[i0]);
        let v1 = Vector3::from(positions[i1]);
        let v2 = Vector3::from(positions[i2]);
        let face_normal = (v1 - v0).cross(v2 - v0);

        sums[i0] += face_normal;
        sums[i1] += face_normal;
        sums[i2] += face_normal;
    }

    sums.into_iter()
        .map(|n| {
            if n.magnitude2() > f32::EPSILON {
                n.normalize().into()
            } else {
                [0.0, 1.0, 0.0]
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_meshes() -> ModelData {
        let mut model = ModelData::new("test");
        model.append_mesh(
            vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            None,
            None,
            vec![0, 1, 2],
            Some(0),
        );
        model.append_mesh(
            vec![
                [5.0, 0.0, 0.0],
                [6.0, 0.0, 0.0],
                [6.0, 1.0, 0.0],
                [5.0, 1.0, 0.0],
            ],
            Some(vec![[0.0, 0.0, 1.0]; 4]),
            Some(vec![[0.5, 0.5]; 4]),
            vec![0, 1, 2, 2, 3, 0],
            Some(7),
        );
        model.finish_materials();
        model
    }

    #[test]
    fn test_counting_pass() {
        let model = two_meshes();
        assert_eq!(model.meshes[0].base_vertex, 0);
        assert_eq!(model.meshes[0].base_index, 0);
        assert_eq!(model.meshes[1].base_vertex, 3);
        assert_eq!(model.meshes[1].base_index, 3);
        assert_eq!(model.meshes[1].num_indices, 6);
        assert_eq!(model.vertex_count(), 7);
        assert_eq!(model.triangle_count(), 3);
        assert_eq!(model.normals.len(), model.positions.len());
        assert_eq!(model.tex_coords.len(), model.positions.len());
    }

    #[test]
    fn test_missing_attributes_are_filled() {
        let model = two_meshes();
        assert_eq!(model.normals[0], [0.0, 0.0, 1.0]);
        assert_eq!(model.tex_coords[0], [0.0, 0.0]);
        assert_eq!(model.tex_coords[3], [0.5, 0.5]);
    }

    #[test]
    fn test_out_of_range_material_falls_back() {
        let model = two_meshes();
        assert_eq!(model.materials.len(), 1);
        assert_eq!(model.meshes[1].material_index, 0);
    }

    #[test]
    fn test_leading_vertex() {
        let model = two_meshes();
        assert_eq!(model.leading_vertex(0, 0), Some([0.0, 0.0, 0.0]));
        assert_eq!(model.leading_vertex(1, 1), Some([6.0, 1.0, 0.0]));
        assert_eq!(model.leading_vertex(1, 2), None);
        assert_eq!(model.leading_vertex(2, 0), None);
    }

    #[test]
    fn test_material_prefers_non_zero_ambient() {
        let mut model = ModelData::new("test");
        assert!(model.material().is_none());

        let mut dark = MaterialData::named("dark");
        dark.ambient_color = [0.0; 3];
        model.materials.push(dark);
        assert_eq!(model.material().map(|m| m.name.as_str()), Some("dark"));

        model.materials.push(MaterialData::named("lit"));
        assert_eq!(model.material().map(|m| m.name.as_str()), Some("lit"));
    }

    #[test]
    fn test_compute_normals_area_weighted() {
        // Two triangles sharing vertex 0; the larger one dominates.
        let positions = [
            [0.0, 0.0, 0.0],
            [4.0, 0.0, 0.0],
            [0.0, 4.0, 0.0],
            [0.0, 0.0, 1.0],
            [1.0, 0.0, 0.0],
        ];
        let normals = compute_normals(&positions, &[0, 1, 2, 0, 3, 4]);
        let n = Vector3::from(normals[0]);
        assert!((n.magnitude() - 1.0).abs() < 1e-5);
        assert!(n.z > n.y);
        assert_eq!(normals[1], [0.0, 0.0, 1.0]);
    }
}
