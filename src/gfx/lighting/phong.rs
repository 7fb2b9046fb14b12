use cgmath::{Matrix4, Vector3};
use log::warn;

use super::lights::{DirectionalLight, PointLight, SpotLight};
use crate::{
    error::{LanternError, Result},
    gfx::{
        camera::{camera_utils::convert_matrix4_to_array, BasicCamera, Camera},
        transform::WorldTransform,
    },
};

pub const MAX_POINT_LIGHTS: usize = 4;
pub const MAX_SPOT_LIGHTS: usize = 4;

/// Clip plane that keeps every fragment.
pub const NO_CLIP_PLANE: [f32; 4] = [0.0, 0.0, 0.0, 1.0];

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DirLightUniform {
    /// rgb = color, a = ambient intensity
    pub color_ambient: [f32; 4],
    /// xyz = local direction, w = diffuse intensity
    pub direction_diffuse: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PointLightUniform {
    pub color_ambient: [f32; 4],
    /// xyz = local position, w = diffuse intensity
    pub position_diffuse: [f32; 4],
    /// constant, linear, exp, unused
    pub attenuation: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SpotLightUniform {
    pub color_ambient: [f32; 4],
    pub position_diffuse: [f32; 4],
    pub attenuation: [f32; 4],
    /// xyz = local direction, w = cos(cutoff)
    pub direction_cutoff: [f32; 4],
}

/// Everything the Phong shader needs for one object in one pass.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ObjectUniform {
    pub wvp: [[f32; 4]; 4],
    pub world: [[f32; 4]; 4],
    pub camera_local_pos: [f32; 4],
    /// World-space plane; fragments with `dot(plane, (p, 1)) < 0` are discarded.
    pub clip_plane: [f32; 4],
    pub flat_color: [f32; 4],
    /// num point lights, num spot lights, use flat color, unused
    pub counts: [u32; 4],
    pub dir_light: DirLightUniform,
    pub point_lights: [PointLightUniform; MAX_POINT_LIGHTS],
    pub spot_lights: [SpotLightUniform; MAX_SPOT_LIGHTS],
}

impl ObjectUniform {
    pub fn num_point_lights(&self) -> usize {
        self.counts[0] as usize
    }

    pub fn num_spot_lights(&self) -> usize {
        self.counts[1] as usize
    }

    pub fn uses_flat_color(&self) -> bool {
        self.counts[2] != 0
    }
}

fn vec4(v: Vector3<f32>, w: f32) -> [f32; 4] {
    [v.x, v.y, v.z, w]
}

/// Pushes camera and light state into per-object Phong uniforms.
///
/// The renderer is stateful: activate it, set the camera and lights, call
/// [`PhongRenderer::render`] for each object, then deactivate. Light
/// positions and directions are converted into each object's local space so
/// the shader can light untransformed vertices.
#[derive(Debug, Default)]
pub struct PhongRenderer {
    active: bool,
    camera: Option<BasicCamera>,
    dir_light: DirectionalLight,
    point_lights: Vec<PointLight>,
    spot_lights: Vec<SpotLight>,
}

impl PhongRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn activate(&mut self) {
        if self.active {
            warn!("Phong renderer is already active");
        }
        self.active = true;
    }

    pub fn deactivate(&mut self) {
        if !self.active {
            warn!("Phong renderer is not active");
            return;
        }
        self.active = false;
    }

    pub fn set_camera(&mut self, camera: &BasicCamera) {
        self.camera = Some(*camera);
    }

    pub fn camera(&self) -> Option<&BasicCamera> {
        self.camera.as_ref()
    }

    pub fn set_dir_light(&mut self, light: &DirectionalLight) -> Result<()> {
        self.require_active()?;
        self.dir_light = *light;
        Ok(())
    }

    pub fn set_point_lights(&mut self, lights: &[PointLight]) -> Result<()> {
        self.require_active()?;
        if lights.len() > MAX_POINT_LIGHTS {
            return Err(LanternError::TooManyLights {
                kind: "point",
                count: lights.len(),
                max: MAX_POINT_LIGHTS,
            });
        }
        self.point_lights = lights.to_vec();
        Ok(())
    }

    pub fn set_spot_lights(&mut self, lights: &[SpotLight]) -> Result<()> {
        self.require_active()?;
        if lights.len() > MAX_SPOT_LIGHTS {
            return Err(LanternError::TooManyLights {
                kind: "spot",
                count: lights.len(),
                max: MAX_SPOT_LIGHTS,
            });
        }
        self.spot_lights = lights.to_vec();
        Ok(())
    }

    /// Builds the uniform for one object.
    pub fn render(
        &mut self,
        transform: &WorldTransform,
        flat_color: Option<[f32; 4]>,
        clip_plane: [f32; 4],
    ) -> Result<ObjectUniform> {
        let camera = self.camera.ok_or(LanternError::CameraNotSet)?;
        self.require_active()?;

        if self.point_lights.is_empty() && self.spot_lights.is_empty() && self.dir_light.is_zero() {
            warn!("No lights have been set");
        }

        let world: Matrix4<f32> = transform.world_matrix();
        let wvp = camera.build_view_projection_matrix() * world;

        let mut uniform = ObjectUniform {
            wvp: convert_matrix4_to_array(wvp),
            world: convert_matrix4_to_array(world),
            camera_local_pos: vec4(transform.world_pos_to_local_pos(camera.position()), 1.0),
            clip_plane,
            flat_color: flat_color.unwrap_or([0.0; 4]),
            counts: [
                self.point_lights.len() as u32,
                self.spot_lights.len() as u32,
                flat_color.is_some() as u32,
                0,
            ],
            ..Default::default()
        };

        self.dir_light.calc_local_direction(transform);
        let base = &self.dir_light.base;
        uniform.dir_light = DirLightUniform {
            color_ambient: vec4(base.color, base.ambient_intensity),
            direction_diffuse: vec4(self.dir_light.local_direction(), base.diffuse_intensity),
        };

        for (slot, light) in uniform.point_lights.iter_mut().zip(self.point_lights.iter_mut()) {
            light.calc_local_position(transform);
            *slot = point_light_uniform(light);
        }

        for (slot, light) in uniform.spot_lights.iter_mut().zip(self.spot_lights.iter_mut()) {
            light.calc_local_direction_and_position(transform);
            let point = point_light_uniform(&light.point);
            *slot = SpotLightUniform {
                color_ambient: point.color_ambient,
                position_diffuse: point.position_diffuse,
                attenuation: point.attenuation,
                direction_cutoff: vec4(
                    light.local_direction(),
                    light.cutoff_degrees.to_radians().cos(),
                ),
            };
        }

        Ok(uniform)
    }

    fn require_active(&self) -> Result<()> {
        if self.active {
            Ok(())
        } else {
            Err(LanternError::RendererInactive)
        }
    }
}

fn point_light_uniform(light: &PointLight) -> PointLightUniform {
    PointLightUniform {
        color_ambient: vec4(light.base.color, light.base.ambient_intensity),
        position_diffuse: vec4(light.local_position(), light.base.diffuse_intensity),
        attenuation: [
            light.attenuation.constant,
            light.attenuation.linear,
            light.attenuation.exp,
            0.0,
        ],
    }
}
