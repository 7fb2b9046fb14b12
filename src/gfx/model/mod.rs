//! # Model Loading
//!
//! Imports OBJ (through `tobj`) and glTF (through `gltf`) files into a flat
//! [`ModelData`] and uploads it to the GPU as a [`GpuModel`].
//!
//! All meshes of a model share one vertex array and one index array; each
//! [`MeshEntry`] records where its slice starts. glTF files may additionally
//! carry cameras and `KHR_lights_punctual` lights, which end up on the model
//! so the scene can pick them up.

pub mod gltf_loader;
pub mod gpu_model;
pub mod model_data;
pub mod obj_loader;

pub use gpu_model::{DrawModel, GpuModel};
pub use model_data::{compute_normals, MaterialData, MeshEntry, ModelData, TextureSource};

use std::path::{Path, PathBuf};

use crate::error::{LanternError, Result};

/// Handle to a model owned by the scene's model library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModelId(pub(crate) usize);

impl ModelId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Loads a model, picking the importer from the file extension.
///
/// The window size only matters for cameras stored in the file: it sets the
/// aspect ratio of their projections.
pub fn load_model(path: impl AsRef<Path>, window_width: u32, window_height: u32) -> Result<ModelData> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    let model = match extension.as_deref() {
        Some("obj") => obj_loader::load_obj(path)?,
        Some("gltf") | Some("glb") => gltf_loader::load_gltf(path, window_width, window_height)?,
        _ => return Err(LanternError::UnsupportedModelFormat(path.to_path_buf())),
    };

    if model.meshes.is_empty() {
        return Err(LanternError::EmptyModel(path.to_path_buf()));
    }

    log::info!(
        "Loaded '{}': {} meshes, {} vertices, {} triangles, {} materials",
        path.display(),
        model.meshes.len(),
        model.vertex_count(),
        model.triangle_count(),
        model.materials.len()
    );

    Ok(model)
}

/// Resolves a texture path found inside a model file against the model's directory.
pub fn normalize_texture_path(model_dir: &Path, raw: &str) -> PathBuf {
    if raw == "C:\\\\" {
        return model_dir.join("");
    }

    let path = raw.replace('\\', "/");
    let path = path.strip_prefix("./").unwrap_or(&path);

    model_dir.join(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_texture_path() {
        let dir = Path::new("assets/models");
        assert_eq!(
            normalize_texture_path(dir, ".\\textures\\brick.png"),
            PathBuf::from("assets/models/textures/brick.png")
        );
        assert_eq!(
            normalize_texture_path(dir, "./brick.png"),
            PathBuf::from("assets/models/brick.png")
        );
        assert_eq!(
            normalize_texture_path(dir, "brick.png"),
            PathBuf::from("assets/models/brick.png")
        );
        assert_eq!(normalize_texture_path(dir, "C:\\\\"), dir.join(""));
    }

    #[test]
    fn test_unsupported_extension() {
        let err = load_model("scene.fbx", 800, 600).unwrap_err();
        assert!(matches!(err, LanternError::UnsupportedModelFormat(_)));

        let err = load_model("no_extension", 800, 600).unwrap_err();
        assert!(matches!(err, LanternError::UnsupportedModelFormat(_)));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(load_model("does/not/exist.obj", 800, 600).is_err());
    }
}
