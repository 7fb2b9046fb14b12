use cgmath::Vector3;

use crate::gfx::transform::WorldTransform;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BaseLight {
    pub color: Vector3<f32>,
    pub ambient_intensity: f32,
    pub diffuse_intensity: f32,
}

impl Default for BaseLight {
    fn default() -> Self {
        Self {
            color: Vector3::new(1.0, 1.0, 1.0),
            ambient_intensity: 0.0,
            diffuse_intensity: 0.0,
        }
    }
}

impl BaseLight {
    pub fn new(color: Vector3<f32>, ambient_intensity: f32, diffuse_intensity: f32) -> Self {
        Self {
            color,
            ambient_intensity,
            diffuse_intensity,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.ambient_intensity == 0.0 && self.diffuse_intensity == 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    pub base: BaseLight,
    pub world_direction: Vector3<f32>,
    local_direction: Vector3<f32>,
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self::new(BaseLight::default(), Vector3::new(0.0, -1.0, 0.0))
    }
}

impl DirectionalLight {
    pub fn new(base: BaseLight, world_direction: Vector3<f32>) -> Self {
        Self {
            base,
            world_direction,
            local_direction: world_direction,
        }
    }

    /// A light that contributes nothing: both intensities are zero.
    pub fn is_zero(&self) -> bool {
        self.base.is_zero()
    }

    pub fn calc_local_direction(&mut self, transform: &WorldTransform) {
        self.local_direction = transform.world_dir_to_local_dir(self.world_direction);
    }

    pub fn local_direction(&self) -> Vector3<f32> {
        self.local_direction
    }
}

/// Distance falloff: `constant + linear * d + exp * d^2`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightAttenuation {
    pub constant: f32,
    pub linear: f32,
    pub exp: f32,
}

impl Default for LightAttenuation {
    fn default() -> Self {
        Self {
            constant: 1.0,
            linear: 0.0,
            exp: 0.0,
        }
    }
}

impl LightAttenuation {
    pub fn factor(&self, distance: f32) -> f32 {
        self.constant + self.linear * distance + self.exp * distance * distance
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub base: BaseLight,
    pub world_position: Vector3<f32>,
    local_position: Vector3<f32>,
    pub attenuation: LightAttenuation,
}

impl Default for PointLight {
    fn default() -> Self {
        Self::new(
            BaseLight::default(),
            Vector3::new(0.0, 0.0, 0.0),
            LightAttenuation::default(),
        )
    }
}

impl PointLight {
    pub fn new(base: BaseLight, world_position: Vector3<f32>, attenuation: LightAttenuation) -> Self {
        Self {
            base,
            world_position,
            local_position: world_position,
            attenuation,
        }
    }

    pub fn calc_local_position(&mut self, transform: &WorldTransform) {
        self.local_position = transform.world_pos_to_local_pos(self.world_position);
    }

    pub fn local_position(&self) -> Vector3<f32> {
        self.local_position
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpotLight {
    pub point: PointLight,
    pub world_direction: Vector3<f32>,
    local_direction: Vector3<f32>,
    pub cutoff_degrees: f32,
}

impl Default for SpotLight {
    fn default() -> Self {
        Self::new(PointLight::default(), Vector3::new(0.0, -1.0, 0.0), 20.0)
    }
}

impl SpotLight {
    pub fn new(point: PointLight, world_direction: Vector3<f32>, cutoff_degrees: f32) -> Self {
        Self {
            point,
            world_direction,
            local_direction: world_direction,
            cutoff_degrees,
        }
    }

    pub fn calc_local_direction_and_position(&mut self, transform: &WorldTransform) {
        self.point.calc_local_position(transform);
        self.local_direction = transform.world_dir_to_local_dir(self.world_direction);
    }

    pub fn local_direction(&self) -> Vector3<f32> {
        self.local_direction
    }

    /// Spot intensity multiplier for a fragment whose direction from the light
    /// has cosine `spot_cos` with the light's axis.
    pub fn spot_factor(&self, spot_cos: f32) -> f32 {
        let cutoff_cos = self.cutoff_degrees.to_radians().cos();
        if spot_cos <= cutoff_cos || cutoff_cos >= 1.0 {
            return 0.0;
        }
        1.0 - (1.0 - spot_cos) / (1.0 - cutoff_cos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directional_is_zero() {
        let mut light = DirectionalLight::default();
        assert!(light.is_zero());
        light.base.ambient_intensity = 0.1;
        assert!(!light.is_zero());
    }

    #[test]
    fn test_attenuation() {
        let attenuation = LightAttenuation::default();
        assert_eq!(attenuation.factor(10.0), 1.0);

        let attenuation = LightAttenuation {
            constant: 1.0,
            linear: 0.5,
            exp: 0.25,
        };
        assert_eq!(attenuation.factor(2.0), 3.0);
    }

    #[test]
    fn test_local_position_follows_transform() {
        let mut transform = WorldTransform::default();
        transform.set_position(5.0, 0.0, 0.0);

        let mut light = PointLight::new(
            BaseLight::default(),
            Vector3::new(6.0, 1.0, 0.0),
            LightAttenuation::default(),
        );
        light.calc_local_position(&transform);
        assert_eq!(light.local_position(), Vector3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn test_spot_factor() {
        let spot = SpotLight::new(PointLight::default(), Vector3::unit_z(), 60.0);
        assert_eq!(spot.spot_factor(1.0), 1.0);
        assert_eq!(spot.spot_factor(0.25), 0.0);
        assert!((spot.spot_factor(0.75) - 0.5).abs() < 1e-5);
    }
}
