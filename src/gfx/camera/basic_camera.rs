use cgmath::*;

use super::camera_utils::Camera;

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: cgmath::Matrix4<f32> = cgmath::Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.5,
    0.0, 0.0, 0.0, 1.0,
);

const MAX_PITCH_DEGREES: f32 = 89.0;
const MIN_SPEED: f32 = 0.1;

/// Perspective projection parameters. `fov_degrees` is the vertical field of view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PersProjInfo {
    pub fov_degrees: f32,
    pub width: f32,
    pub height: f32,
    pub z_near: f32,
    pub z_far: f32,
}

impl PersProjInfo {
    pub fn aspect_ratio(&self) -> f32 {
        if self.height <= 0.0 {
            return 1.0;
        }
        self.width / self.height
    }
}

/// First-person camera described by a position, a view direction and an up vector.
#[derive(Debug, Clone, Copy)]
pub struct BasicCamera {
    position: Vector3<f32>,
    target: Vector3<f32>,
    up: Vector3<f32>,
    projection: PersProjInfo,
    speed: f32,
    yaw: Deg<f32>,
    pitch: Deg<f32>,
}

impl Camera for BasicCamera {
    fn build_view_projection_matrix(&self) -> Matrix4<f32> {
        self.projection_matrix() * self.view_matrix()
    }
}

impl BasicCamera {
    /// `target` is a direction, not a point; it is normalized on the way in.
    pub fn new(
        projection: PersProjInfo,
        position: Vector3<f32>,
        target: Vector3<f32>,
        up: Vector3<f32>,
    ) -> Self {
        let mut camera = Self {
            position,
            target: Vector3::unit_z(),
            up: safe_normalize(up, Vector3::unit_y()),
            projection,
            speed: 0.1,
            yaw: Deg(0.0),
            pitch: Deg(0.0),
        };
        camera.set_target(target);
        camera
    }

    pub fn position(&self) -> Vector3<f32> {
        self.position
    }

    pub fn target(&self) -> Vector3<f32> {
        self.target
    }

    pub fn up(&self) -> Vector3<f32> {
        self.up
    }

    pub fn projection(&self) -> &PersProjInfo {
        &self.projection
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed.max(MIN_SPEED);
    }

    pub fn set_position(&mut self, position: Vector3<f32>) {
        self.position = position;
    }

    pub fn set_target(&mut self, target: Vector3<f32>) {
        self.target = safe_normalize(target, Vector3::unit_z());
        self.pitch = Rad(self.target.y.clamp(-1.0, 1.0).asin()).into();
        self.yaw = Rad(self.target.x.atan2(self.target.z)).into();
    }

    pub fn set_up(&mut self, up: Vector3<f32>) {
        self.up = safe_normalize(up, Vector3::unit_y());
    }

    /// Keeps the field of view and clip planes, replaces the viewport size.
    pub fn resize_projection(&mut self, width: u32, height: u32) {
        self.projection.width = width.max(1) as f32;
        self.projection.height = height.max(1) as f32;
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        let eye = Point3::from_vec(self.position);
        Matrix4::look_at_rh(eye, eye + self.target, self.up)
    }

    pub fn projection_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX
            * perspective(
                Deg(self.projection.fov_degrees),
                self.projection.aspect_ratio(),
                self.projection.z_near,
                self.projection.z_far,
            )
    }

    /// Unit vector pointing to the camera's right in world space.
    pub fn right(&self) -> Vector3<f32> {
        safe_normalize(self.target.cross(self.up), Vector3::unit_x())
    }

    pub fn move_forward(&mut self, amount: f32) {
        self.position += self.target * amount;
    }

    pub fn move_right(&mut self, amount: f32) {
        self.position += self.right() * amount;
    }

    pub fn move_up(&mut self, amount: f32) {
        self.position.y += amount;
    }

    /// Turns the view direction. Pitch is clamped short of straight up/down.
    pub fn rotate(&mut self, yaw_delta: Deg<f32>, pitch_delta: Deg<f32>) {
        self.yaw += yaw_delta;
        self.pitch = Deg((self.pitch + pitch_delta).0.clamp(-MAX_PITCH_DEGREES, MAX_PITCH_DEGREES));

        let (sin_yaw, cos_yaw) = Rad::from(self.yaw).0.sin_cos();
        let (sin_pitch, cos_pitch) = Rad::from(self.pitch).0.sin_cos();
        self.target = Vector3::new(cos_pitch * sin_yaw, sin_pitch, cos_pitch * cos_yaw).normalize();
    }
}

fn safe_normalize(v: Vector3<f32>, fallback: Vector3<f32>) -> Vector3<f32> {
    if v.magnitude2() <= f32::EPSILON {
        fallback
    } else {
        v.normalize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn projection() -> PersProjInfo {
        PersProjInfo {
            fov_degrees: 45.0,
            width: 800.0,
            height: 600.0,
            z_near: 1.0,
            z_far: 1000.0,
        }
    }

    #[test]
    fn test_target_is_normalized() {
        let camera = BasicCamera::new(
            projection(),
            Vector3::zero(),
            Vector3::new(0.0, 0.0, 5.0),
            Vector3::unit_y(),
        );
        assert!((camera.target().magnitude() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_point_ahead_projects_to_center() {
        let camera = BasicCamera::new(
            projection(),
            Vector3::zero(),
            Vector3::unit_z(),
            Vector3::unit_y(),
        );
        let clip = camera.build_view_projection_matrix() * Vector4::new(0.0, 0.0, 10.0, 1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-5);
        assert!(ndc.y.abs() < 1e-5);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }

    #[test]
    fn test_rotate_keeps_pitch_in_range() {
        let mut camera = BasicCamera::new(
            projection(),
            Vector3::zero(),
            Vector3::unit_z(),
            Vector3::unit_y(),
        );
        camera.rotate(Deg(0.0), Deg(200.0));
        assert!(camera.target().y < 1.0);
        assert!(camera.target().y > 0.99);
    }

    #[test]
    fn test_movement() {
        let mut camera = BasicCamera::new(
            projection(),
            Vector3::zero(),
            Vector3::unit_z(),
            Vector3::unit_y(),
        );
        camera.move_forward(2.0);
        camera.move_up(1.0);
        assert_eq!(camera.position(), Vector3::new(0.0, 1.0, 2.0));

        camera.set_speed(0.0);
        assert_eq!(camera.speed(), MIN_SPEED);
    }
}
