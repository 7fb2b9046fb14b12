use std::path::Path;

use cgmath::{InnerSpace, Matrix, Matrix4, SquareMatrix, Vector3, Vector4};
use gltf::{
    buffer::Data as BufferData,
    image::{Data as ImageData, Format},
    khr_lights_punctual::Kind,
};
use log::{info, warn};

use super::{normalize_texture_path, MaterialData, ModelData, TextureSource};
use crate::{
    error::{LanternError, Result},
    gfx::{
        camera::{BasicCamera, PersProjInfo},
        lighting::{BaseLight, DirectionalLight, LightAttenuation, PointLight, SpotLight},
    },
};

const DEFAULT_FAR_PLANE: f32 = 1000.0;

/// Loads a glTF 2.0 file (`.gltf` or `.glb`).
///
/// Node transforms are baked into the vertex data, so every mesh ends up in
/// world space next to the cameras and lights found in the node tree.
pub fn load_gltf(path: &Path, window_width: u32, window_height: u32) -> Result<ModelData> {
    let (document, buffers, images) = gltf::import(path).map_err(|e| LanternError::ModelLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let dir = path.parent().unwrap_or_else(|| Path::new(""));
    let mut model = ModelData::new(path);

    model.materials = document
        .materials()
        .enumerate()
        .map(|(i, material)| convert_material(dir, i, &material, &images))
        .collect();

    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .ok_or_else(|| LanternError::ModelLoad {
            path: path.to_path_buf(),
            reason: "file contains no scenes".to_string(),
        })?;

    let mut loader = NodeVisitor {
        model: &mut model,
        buffers: &buffers,
        window_width: window_width.max(1),
        window_height: window_height.max(1),
    };
    for node in scene.nodes() {
        loader.visit(&node, Matrix4::identity());
    }

    info!(
        "glTF '{}': {} cameras, {} directional, {} point, {} spot lights",
        path.display(),
        model.cameras.len(),
        model.dir_lights.len(),
        model.point_lights.len(),
        model.spot_lights.len()
    );

    model.finish_materials();
    Ok(model)
}

struct NodeVisitor<'a> {
    model: &'a mut ModelData,
    buffers: &'a [BufferData],
    window_width: u32,
    window_height: u32,
}

impl NodeVisitor<'_> {
    fn visit(&mut self, node: &gltf::Node, parent: Matrix4<f32>) {
        let world = parent * Matrix4::from(node.transform().matrix());

        if let Some(mesh) = node.mesh() {
            for primitive in mesh.primitives() {
                self.add_primitive(&primitive, world);
            }
        }

        if let Some(camera) = node.camera() {
            self.add_camera(&camera, world);
        }

        if let Some(light) = node.light() {
            self.add_light(&light, world);
        }

        for child in node.children() {
            self.visit(&child, world);
        }
    }

    fn add_primitive(&mut self, primitive: &gltf::Primitive, world: Matrix4<f32>) {
        if primitive.mode() != gltf::mesh::Mode::Triangles {
            warn!("Skipping primitive with mode {:?}", primitive.mode());
            return;
        }

        let buffers = self.buffers;
        let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|data| data.0.as_slice()));

        let Some(positions) = reader.read_positions() else {
            warn!("Skipping primitive without positions");
            return;
        };
        let positions: Vec<[f32; 3]> = positions
            .map(|p| (world * Vector4::new(p[0], p[1], p[2], 1.0)).truncate().into())
            .collect();

        let normal_matrix = world.invert().unwrap_or(world).transpose();
        let normals = reader.read_normals().map(|normals| {
            normals
                .map(|n| {
                    let n = (normal_matrix * Vector4::new(n[0], n[1], n[2], 0.0)).truncate();
                    if n.magnitude2() > f32::EPSILON {
                        n.normalize().into()
                    } else {
                        [0.0, 1.0, 0.0]
                    }
                })
                .collect::<Vec<_>>()
        });

        let tex_coords = reader
            .read_tex_coords(0)
            .map(|t| t.into_f32().collect::<Vec<_>>());

        let indices = match reader.read_indices() {
            Some(indices) => indices.into_u32().collect::<Vec<_>>(),
            None => (0..positions.len() as u32).collect(),
        };

        let material_index = primitive.material().index();
        self.model
            .append_mesh(positions, normals, tex_coords, indices, material_index);
    }

    fn add_camera(&mut self, camera: &gltf::Camera, world: Matrix4<f32>) {
        let gltf::camera::Projection::Perspective(perspective) = camera.projection() else {
            warn!("Skipping orthographic camera '{}'", camera.name().unwrap_or(""));
            return;
        };

        let window_aspect = self.window_width as f32 / self.window_height as f32;
        if let Some(aspect) = perspective.aspect_ratio() {
            if (aspect - window_aspect).abs() > 0.01 {
                warn!(
                    "Camera aspect ratio {:.3} differs from the window's {:.3}",
                    aspect, window_aspect
                );
            }
        }

        let projection = PersProjInfo {
            fov_degrees: perspective.yfov().to_degrees(),
            width: self.window_width as f32,
            height: self.window_height as f32,
            z_near: perspective.znear(),
            z_far: perspective.zfar().unwrap_or(DEFAULT_FAR_PLANE),
        };

        let position = (world * Vector4::unit_w()).truncate();
        let target = (world * -Vector4::unit_z()).truncate();
        let up = (world * Vector4::unit_y()).truncate();

        info!(
            "Camera: pos ({:.2}, {:.2}, {:.2}) target ({:.2}, {:.2}, {:.2}) fov {:.1}",
            position.x, position.y, position.z, target.x, target.y, target.z, projection.fov_degrees
        );

        self.model
            .cameras
            .push(BasicCamera::new(projection, position, target, up));
    }

    fn add_light(&mut self, light: &gltf::khr_lights_punctual::Light, world: Matrix4<f32>) {
        let base = BaseLight {
            color: Vector3::from(light.color()),
            ambient_intensity: 0.0,
            diffuse_intensity: light.intensity(),
        };
        let position = (world * Vector4::unit_w()).truncate();
        let direction = normalize_or((world * -Vector4::unit_z()).truncate(), -Vector3::unit_z());
        let attenuation = match light.range() {
            Some(range) if range > 0.0 => LightAttenuation {
                constant: 1.0,
                linear: 0.0,
                exp: 1.0 / (range * range),
            },
            _ => LightAttenuation::default(),
        };

        match light.kind() {
            Kind::Directional => {
                self.model
                    .dir_lights
                    .push(DirectionalLight::new(base, direction));
            }
            Kind::Point => {
                self.model
                    .point_lights
                    .push(PointLight::new(base, position, attenuation));
            }
            Kind::Spot {
                outer_cone_angle, ..
            } => {
                let point = PointLight::new(base, position, attenuation);
                self.model.spot_lights.push(SpotLight::new(
                    point,
                    direction,
                    outer_cone_angle.to_degrees(),
                ));
            }
        }
    }
}

fn normalize_or(v: Vector3<f32>, fallback: Vector3<f32>) -> Vector3<f32> {
    if v.magnitude2() > f32::EPSILON {
        v.normalize()
    } else {
        fallback
    }
}

fn convert_material(
    dir: &Path,
    index: usize,
    material: &gltf::Material,
    images: &[ImageData],
) -> MaterialData {
    let pbr = material.pbr_metallic_roughness();
    let [r, g, b, _] = pbr.base_color_factor();

    let diffuse_texture = pbr.base_color_texture().and_then(|info| {
        let image = info.texture().source();
        match image.source() {
            gltf::image::Source::Uri { uri, .. } if !uri.starts_with("data:") => {
                Some(TextureSource::File(normalize_texture_path(dir, uri)))
            }
            _ => images.get(image.index()).and_then(embedded_rgba),
        }
    });

    MaterialData {
        name: material
            .name()
            .map(str::to_owned)
            .unwrap_or_else(|| format!("material_{index}")),
        ambient_color: [1.0, 1.0, 1.0],
        diffuse_color: [r, g, b],
        specular_color: [0.0; 3],
        diffuse_texture,
        specular_exponent_texture: None,
    }
}

/// Expands 8-bit glTF image data to RGBA8.
fn embedded_rgba(data: &ImageData) -> Option<TextureSource> {
    let rgba = match data.format {
        Format::R8G8B8A8 => data.pixels.clone(),
        Format::R8G8B8 => data
            .pixels
            .chunks_exact(3)
            .flat_map(|p| [p[0], p[1], p[2], 255])
            .collect(),
        Format::R8G8 => data
            .pixels
            .chunks_exact(2)
            .flat_map(|p| [p[0], p[1], 0, 255])
            .collect(),
        Format::R8 => data.pixels.iter().flat_map(|&p| [p, p, p, 255]).collect(),
        other => {
            warn!("Unsupported embedded image format {:?}", other);
            return None;
        }
    };

    Some(TextureSource::Embedded {
        width: data.width,
        height: data.height,
        rgba,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn fixture() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("assets/models/lit_scene.gltf")
    }

    fn load() -> ModelData {
        load_gltf(&fixture(), 800, 600).unwrap()
    }

    #[test]
    fn test_mesh_is_baked_into_world_space() {
        let model = load();
        assert_eq!(model.meshes.len(), 1);
        assert_eq!(model.triangle_count(), 2);
        // The quad node is translated by -1 on Y.
        assert!(model.positions.iter().all(|p| (p[1] + 1.0).abs() < 1e-6));
        assert!(model
            .normals
            .iter()
            .all(|n| (n[1] - 1.0).abs() < 1e-6));
    }

    #[test]
    fn test_material_colors() {
        let model = load();
        assert_eq!(model.materials.len(), 1);
        let material = &model.materials[0];
        assert_eq!(material.name, "floor");
        assert_eq!(material.ambient_color, [1.0, 1.0, 1.0]);
        assert_eq!(material.diffuse_color, [0.5, 0.25, 1.0]);
        assert_eq!(material.specular_color, [0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_camera_extraction() {
        let model = load();
        assert_eq!(model.cameras.len(), 1);

        let camera = &model.cameras[0];
        assert_eq!(camera.position(), Vector3::new(0.0, 2.0, 10.0));
        assert!((camera.target() - Vector3::new(0.0, 0.0, -1.0)).magnitude() < 1e-5);
        assert!((camera.projection().fov_degrees - 45.0).abs() < 1e-3);
        assert_eq!(camera.projection().z_near, 0.5);
        assert_eq!(camera.projection().z_far, DEFAULT_FAR_PLANE);
        assert_eq!(camera.projection().width, 800.0);
    }

    #[test]
    fn test_light_extraction() {
        let model = load();
        assert_eq!(model.dir_lights.len(), 1);
        assert_eq!(model.point_lights.len(), 1);
        assert_eq!(model.spot_lights.len(), 1);

        let dir = &model.dir_lights[0];
        assert_eq!(dir.base.diffuse_intensity, 0.8);
        assert_eq!(dir.base.ambient_intensity, 0.0);
        assert!((dir.world_direction - Vector3::new(0.0, 0.0, -1.0)).magnitude() < 1e-5);

        let point = &model.point_lights[0];
        assert_eq!(point.world_position, Vector3::new(3.0, 1.0, 0.0));
        assert_eq!(point.base.color, Vector3::new(1.0, 0.5, 0.0));
        assert_eq!(point.attenuation.constant, 1.0);
        assert_eq!(point.attenuation.linear, 0.0);
        assert!((point.attenuation.exp - 0.01).abs() < 1e-6);

        let spot = &model.spot_lights[0];
        assert_eq!(spot.point.world_position, Vector3::new(0.0, 4.0, 0.0));
        assert_eq!(spot.point.attenuation, LightAttenuation::default());
        assert!((spot.cutoff_degrees - 30.0).abs() < 1e-3);
        // Rotated -90 degrees about X, so -Z points straight down.
        assert!((spot.world_direction - Vector3::new(0.0, -1.0, 0.0)).magnitude() < 1e-5);
    }
}
