use std::path::Path;

use log::{info, warn};

use super::{normalize_texture_path, MaterialData, ModelData, TextureSource};
use crate::error::{LanternError, Result};

/// Loads a Wavefront OBJ file and its MTL library.
///
/// Faces are triangulated and positions/normals/texture coordinates share a
/// single index, so each `tobj` model maps directly onto one mesh entry.
pub fn load_obj(path: &Path) -> Result<ModelData> {
    let (models, materials) = tobj::load_obj(
        path,
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
    )
    .map_err(|e| LanternError::ModelLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let materials = materials.unwrap_or_else(|e| {
        warn!("No usable MTL for '{}' ({}), using default material", path.display(), e);
        Vec::new()
    });

    let dir = path.parent().unwrap_or_else(|| Path::new(""));
    let mut model = ModelData::new(path);

    info!("Num materials: {}", materials.len());
    model.materials = materials
        .iter()
        .enumerate()
        .map(|(i, mtl)| convert_material(dir, i, mtl))
        .collect();

    for m in models.iter() {
        let mesh = &m.mesh;

        let positions: Vec<[f32; 3]> = mesh
            .positions
            .chunks_exact(3)
            .map(|p| [p[0], p[1], p[2]])
            .collect();

        let normals = (!mesh.normals.is_empty()).then(|| {
            mesh.normals
                .chunks_exact(3)
                .map(|n| [n[0], n[1], n[2]])
                .collect::<Vec<_>>()
        });

        // OBJ texture space has v pointing up, wgpu samples top-down
        let tex_coords = (!mesh.texcoords.is_empty()).then(|| {
            mesh.texcoords
                .chunks_exact(2)
                .map(|t| [t[0], 1.0 - t[1]])
                .collect::<Vec<_>>()
        });

        if normals.is_none() {
            warn!("Mesh '{}' has no normals, computing them", m.name);
        }

        model.append_mesh(
            positions,
            normals,
            tex_coords,
            mesh.indices.clone(),
            mesh.material_id,
        );
    }

    model.finish_materials();
    Ok(model)
}

fn convert_material(dir: &Path, index: usize, mtl: &tobj::Material) -> MaterialData {
    let name = if mtl.name.is_empty() {
        format!("material_{index}")
    } else {
        mtl.name.clone()
    };

    let texture = |raw: &Option<String>| {
        raw.as_deref()
            .filter(|p| !p.is_empty())
            .map(|p| TextureSource::File(normalize_texture_path(dir, p)))
    };

    MaterialData {
        name,
        ambient_color: mtl.ambient.unwrap_or([1.0, 1.0, 1.0]),
        diffuse_color: mtl.diffuse.unwrap_or([0.0; 3]),
        specular_color: mtl.specular.unwrap_or([0.0; 3]),
        diffuse_texture: texture(&mtl.diffuse_texture),
        specular_exponent_texture: texture(&mtl.shininess_texture),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn fixture(name: &str) -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("assets/models")
            .join(name)
    }

    #[test]
    fn test_load_cube_obj() {
        let model = load_obj(&fixture("cube.obj")).unwrap();

        assert_eq!(model.meshes.len(), 1);
        assert_eq!(model.triangle_count(), 12);
        assert_eq!(model.meshes[0].num_indices, 36);
        assert_eq!(model.normals.len(), model.positions.len());
        assert_eq!(model.tex_coords.len(), model.positions.len());
        assert!(model.cameras.is_empty());
    }

    #[test]
    fn test_cube_obj_materials() {
        let model = load_obj(&fixture("cube.obj")).unwrap();

        assert_eq!(model.materials.len(), 1);
        let material = &model.materials[0];
        assert_eq!(material.name, "crate");
        assert_eq!(material.ambient_color, [0.2, 0.2, 0.2]);
        assert_eq!(material.diffuse_color, [0.8, 0.6, 0.4]);
        assert_eq!(
            material.diffuse_texture,
            Some(TextureSource::File(fixture("textures/crate.png")))
        );
        assert!(material.specular_exponent_texture.is_none());
    }
}
