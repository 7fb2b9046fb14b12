use cgmath::{Deg, InnerSpace, Matrix, Matrix3, Matrix4, Vector3};

/// Position, rotation (Euler degrees) and per-axis scale of a scene object.
///
/// The world matrix is `T * R * S` with `R = Rz * Ry * Rx`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldTransform {
    pub position: Vector3<f32>,
    pub rotation: Vector3<f32>,
    pub scale: Vector3<f32>,
}

impl Default for WorldTransform {
    fn default() -> Self {
        Self {
            position: Vector3::new(0.0, 0.0, 0.0),
            rotation: Vector3::new(0.0, 0.0, 0.0),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }
}

impl WorldTransform {
    pub fn set_position(&mut self, x: f32, y: f32, z: f32) {
        self.position = Vector3::new(x, y, z);
    }

    pub fn translate(&mut self, delta: Vector3<f32>) {
        self.position += delta;
    }

    pub fn set_rotation(&mut self, x: f32, y: f32, z: f32) {
        self.rotation = Vector3::new(x, y, z);
    }

    pub fn rotate(&mut self, x: f32, y: f32, z: f32) {
        self.rotation += Vector3::new(x, y, z);
    }

    pub fn set_scale(&mut self, scale: f32) {
        self.scale = Vector3::new(scale, scale, scale);
    }

    pub fn set_scale_xyz(&mut self, scale: Vector3<f32>) {
        self.scale = scale;
    }

    pub fn rotation_matrix(&self) -> Matrix3<f32> {
        Matrix3::from_angle_z(Deg(self.rotation.z))
            * Matrix3::from_angle_y(Deg(self.rotation.y))
            * Matrix3::from_angle_x(Deg(self.rotation.x))
    }

    pub fn world_matrix(&self) -> Matrix4<f32> {
        Matrix4::from_translation(self.position)
            * Matrix4::from(self.rotation_matrix())
            * Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }

    /// Moves a world-space point into the object's unscaled local frame.
    pub fn world_pos_to_local_pos(&self, world_pos: Vector3<f32>) -> Vector3<f32> {
        self.reversed_rotation() * (world_pos - self.position)
    }

    /// Rotates a world-space direction into the object's local frame.
    pub fn world_dir_to_local_dir(&self, world_dir: Vector3<f32>) -> Vector3<f32> {
        let local = self.reversed_rotation() * world_dir;
        if local.magnitude2() > f32::EPSILON {
            local.normalize()
        } else {
            local
        }
    }

    // Rotations are orthonormal, so the transpose is the inverse.
    fn reversed_rotation(&self) -> Matrix3<f32> {
        self.rotation_matrix().transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{Vector4, Zero};

    fn assert_close(a: Vector3<f32>, b: Vector3<f32>) {
        assert!((a - b).magnitude() < 1e-5, "{a:?} != {b:?}");
    }

    #[test]
    fn test_world_matrix_order() {
        let mut transform = WorldTransform::default();
        transform.set_position(10.0, 0.0, 0.0);
        transform.set_rotation(0.0, 90.0, 0.0);
        transform.set_scale(2.0);

        // Scale first, then rotate +X onto -Z, then translate.
        let p = transform.world_matrix() * Vector4::new(1.0, 0.0, 0.0, 1.0);
        assert_close(p.truncate(), Vector3::new(10.0, 0.0, -2.0));
    }

    #[test]
    fn test_rotation_applies_x_first() {
        let mut transform = WorldTransform::default();
        transform.set_rotation(90.0, 0.0, 90.0);

        // Rx takes +Y to +Z, Rz leaves +Z alone.
        assert_close(transform.rotation_matrix() * Vector3::unit_y(), Vector3::unit_z());
    }

    #[test]
    fn test_world_pos_to_local_pos_inverts_translation_and_rotation() {
        let mut transform = WorldTransform::default();
        transform.set_position(1.0, 2.0, 3.0);
        transform.set_rotation(30.0, 45.0, 60.0);

        let local = Vector3::new(0.5, -1.0, 2.0);
        let world = transform.position + transform.rotation_matrix() * local;
        assert_close(transform.world_pos_to_local_pos(world), local);
    }

    #[test]
    fn test_scale_is_not_inverted() {
        let mut transform = WorldTransform::default();
        transform.set_scale(4.0);
        assert_close(
            transform.world_pos_to_local_pos(Vector3::new(8.0, 0.0, 0.0)),
            Vector3::new(8.0, 0.0, 0.0),
        );
    }

    #[test]
    fn test_world_dir_to_local_dir_is_normalized() {
        let mut transform = WorldTransform::default();
        transform.set_rotation(0.0, 0.0, 90.0);
        let local = transform.world_dir_to_local_dir(Vector3::new(0.0, 3.0, 0.0));
        assert_close(local, Vector3::unit_x());
        assert!(transform.world_dir_to_local_dir(Vector3::zero()).magnitude() < 1e-6);
    }
}
