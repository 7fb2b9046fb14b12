use cgmath::{InnerSpace, Matrix4, Vector3};

use crate::gfx::{
    camera::{camera_utils::convert_matrix4_to_array, BasicCamera},
    geometry::{generate_plane, GeometryData},
};

const DEFAULT_DUDV_SPEED: f32 = 0.03;
const DEFAULT_WAVE_STRENGTH: f32 = 0.02;
const DEFAULT_TILING: f32 = 0.05;
const DEFAULT_SHINE: f32 = 20.0;

/// Everything the water shader needs for one frame.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct WaterUniform {
    pub view_proj: [[f32; 4]; 4],
    /// xyz = camera position, w = water height
    pub camera_pos_height: [f32; 4],
    /// DUDV offset, wave strength, DUDV tiling, specular shine
    pub params: [f32; 4],
    pub light_color: [f32; 4],
    pub reversed_light_dir: [f32; 4],
}

impl WaterUniform {
    pub fn water_height(&self) -> f32 {
        self.camera_pos_height[3]
    }

    pub fn dudv_offset(&self) -> f32 {
        self.params[0]
    }
}

/// A flat, animated water surface at a configurable height.
///
/// The mesh lies at y = 0; the shader lifts it to the water height so the
/// height can change without rebuilding buffers.
#[derive(Debug, Clone)]
pub struct SimpleWater {
    size: u32,
    world_scale: f32,
    height: f32,
    dudv_offset: f32,
    pub dudv_speed: f32,
    pub wave_strength: f32,
    pub light_color: [f32; 3],
}

impl SimpleWater {
    /// `size × size` quads, each `world_scale` units wide.
    pub fn new(size: u32, world_scale: f32) -> Self {
        Self {
            size: size.max(1),
            world_scale,
            height: 0.0,
            dudv_offset: 0.0,
            dudv_speed: DEFAULT_DUDV_SPEED,
            wave_strength: DEFAULT_WAVE_STRENGTH,
            light_color: [1.0, 1.0, 1.0],
        }
    }

    pub fn geometry(&self) -> GeometryData {
        let extent = self.size as f32 * self.world_scale;
        generate_plane(extent, extent, self.size, self.size)
    }

    pub fn set_water_height(&mut self, height: f32) {
        self.height = height;
    }

    pub fn water_height(&self) -> f32 {
        self.height
    }

    pub fn dudv_offset(&self) -> f32 {
        self.dudv_offset
    }

    /// Advances the distortion animation; `dt` is in seconds.
    pub fn update(&mut self, dt: f32) {
        self.dudv_offset = (self.dudv_offset + self.dudv_speed * dt).rem_euclid(1.0);
        // rem_euclid can round up to exactly 1.0 for tiny negative inputs
        if self.dudv_offset >= 1.0 {
            self.dudv_offset = 0.0;
        }
    }

    /// Keeps geometry above the surface.
    pub fn reflection_clip_plane(&self) -> [f32; 4] {
        [0.0, 1.0, 0.0, -self.height]
    }

    /// Keeps geometry below the surface.
    pub fn refraction_clip_plane(&self) -> [f32; 4] {
        [0.0, -1.0, 0.0, self.height]
    }

    /// The camera mirrored through the water plane.
    pub fn reflection_camera(&self, camera: &BasicCamera) -> BasicCamera {
        let mut mirrored = *camera;

        let mut position = camera.position();
        position.y = 2.0 * self.height - position.y;
        mirrored.set_position(position);

        let mut target = camera.target();
        target.y = -target.y;
        mirrored.set_target(target);

        mirrored
    }

    pub fn uniform(
        &self,
        camera_pos: Vector3<f32>,
        view_proj: Matrix4<f32>,
        light_dir: Vector3<f32>,
    ) -> WaterUniform {
        let reversed = if light_dir.magnitude2() > 0.0 {
            -light_dir.normalize()
        } else {
            Vector3::unit_y()
        };

        WaterUniform {
            view_proj: convert_matrix4_to_array(view_proj),
            camera_pos_height: [camera_pos.x, camera_pos.y, camera_pos.z, self.height],
            params: [self.dudv_offset, self.wave_strength, DEFAULT_TILING, DEFAULT_SHINE],
            light_color: [self.light_color[0], self.light_color[1], self.light_color[2], 1.0],
            reversed_light_dir: [reversed.x, reversed.y, reversed.z, 0.0],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::camera::PersProjInfo;
    use cgmath::SquareMatrix;

    fn camera_at(position: Vector3<f32>, target: Vector3<f32>) -> BasicCamera {
        let projection = PersProjInfo {
            fov_degrees: 45.0,
            width: 800.0,
            height: 600.0,
            z_near: 0.1,
            z_far: 100.0,
        };
        BasicCamera::new(projection, position, target, Vector3::unit_y())
    }

    fn dot(plane: [f32; 4], p: [f32; 3]) -> f32 {
        plane[0] * p[0] + plane[1] * p[1] + plane[2] * p[2] + plane[3]
    }

    #[test]
    fn test_grid_is_centered() {
        let water = SimpleWater::new(4, 2.5);
        let geometry = water.geometry();
        assert_eq!(geometry.vertex_count(), 25);
        assert_eq!(geometry.triangle_count(), 32);

        let min_x = geometry.vertices.iter().map(|v| v[0]).fold(f32::MAX, f32::min);
        let max_x = geometry.vertices.iter().map(|v| v[0]).fold(f32::MIN, f32::max);
        assert_eq!(min_x, -5.0);
        assert_eq!(max_x, 5.0);
        assert!(geometry.vertices.iter().all(|v| v[1] == 0.0));
    }

    #[test]
    fn test_update_wraps_offset() {
        let mut water = SimpleWater::new(1, 1.0);
        water.dudv_speed = 0.4;
        water.update(1.0);
        assert!((water.dudv_offset() - 0.4).abs() < 1e-6);
        water.update(2.0);
        assert!((water.dudv_offset() - 0.2).abs() < 1e-5);
        assert!(water.dudv_offset() >= 0.0 && water.dudv_offset() < 1.0);
    }

    #[test]
    fn test_clip_planes() {
        let mut water = SimpleWater::new(1, 1.0);
        water.set_water_height(2.0);
        assert_eq!(water.water_height(), 2.0);

        let above = [0.0, 3.0, 0.0];
        let below = [0.0, 1.0, 0.0];
        assert!(dot(water.reflection_clip_plane(), above) >= 0.0);
        assert!(dot(water.reflection_clip_plane(), below) < 0.0);
        assert!(dot(water.refraction_clip_plane(), below) >= 0.0);
        assert!(dot(water.refraction_clip_plane(), above) < 0.0);
    }

    #[test]
    fn test_reflection_camera() {
        let mut water = SimpleWater::new(1, 1.0);
        water.set_water_height(1.0);

        let camera = camera_at(Vector3::new(3.0, 5.0, -2.0), Vector3::new(0.0, -1.0, 1.0));
        let mirrored = water.reflection_camera(&camera);

        assert_eq!(mirrored.position(), Vector3::new(3.0, -3.0, -2.0));
        let expected = Vector3::new(0.0, 1.0, 1.0).normalize();
        assert!((mirrored.target() - expected).magnitude() < 1e-5);
    }

    #[test]
    fn test_uniform_packing() {
        let mut water = SimpleWater::new(1, 1.0);
        water.set_water_height(0.5);
        water.update(1.0);

        let uniform = water.uniform(
            Vector3::new(1.0, 2.0, 3.0),
            Matrix4::identity(),
            Vector3::new(0.0, -2.0, 0.0),
        );
        assert_eq!(uniform.camera_pos_height, [1.0, 2.0, 3.0, 0.5]);
        assert_eq!(uniform.water_height(), 0.5);
        assert_eq!(uniform.dudv_offset(), water.dudv_offset());
        assert_eq!(uniform.reversed_light_dir, [0.0, 1.0, 0.0, 0.0]);
        assert_eq!(uniform.view_proj[0], [1.0, 0.0, 0.0, 0.0]);
        assert_eq!(std::mem::size_of::<WaterUniform>() % 16, 0);
    }
}
