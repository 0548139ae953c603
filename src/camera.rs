use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

pub const DEFAULT_YAW: f32 = -90.0;
pub const DEFAULT_ZOOM: f32 = 90.0;
pub const DEFAULT_SPEED: f32 = 2.5;
pub const DEFAULT_SENSITIVITY: f32 = 0.1;

const PITCH_LIMIT: f32 = 89.0;
const SCROLL_SPEED_STEP: f32 = 0.5;
const MIN_MOVEMENT_SPEED: f32 = 0.1;
const MIN_SENSITIVITY: f32 = 0.01;

/// Direction of a keyboard-driven camera move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CameraMovement {
    Forward,
    Backward,
    Left,
    Right,
    Up,
    Down,
}

/// First-person fly camera driven by yaw and pitch angles.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    front: Vec3,
    up: Vec3,
    right: Vec3,
    world_up: Vec3,
    yaw: f32,
    pitch: f32,
    /// Vertical field of view in degrees.
    pub zoom: f32,
    pub movement_speed: f32,
    mouse_sensitivity: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vec3::ZERO, Vec3::Y, DEFAULT_YAW, 0.0)
    }
}

impl Camera {
    pub fn new(position: Vec3, world_up: Vec3, yaw: f32, pitch: f32) -> Self {
        let mut camera = Self {
            position,
            front: Vec3::NEG_Z,
            up: world_up,
            right: Vec3::X,
            world_up: world_up.normalize_or_zero(),
            yaw,
            pitch: pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT),
            zoom: DEFAULT_ZOOM,
            movement_speed: DEFAULT_SPEED,
            mouse_sensitivity: DEFAULT_SENSITIVITY,
        };
        camera.update_vectors();
        camera
    }

    /// Creates a camera whose yaw and pitch reproduce `front`.
    pub fn looking_along(position: Vec3, front: Vec3, world_up: Vec3) -> Self {
        let front = front.normalize_or_zero();
        let yaw = front.z.atan2(front.x).to_degrees();
        let pitch = front.y.clamp(-1.0, 1.0).asin().to_degrees();
        Self::new(position, world_up, yaw, pitch)
    }

    pub fn front(&self) -> Vec3 {
        self.front
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    pub fn right(&self) -> Vec3 {
        self.right
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn mouse_sensitivity(&self) -> f32 {
        self.mouse_sensitivity
    }

    /// Changes the mouse sensitivity by `delta`, never dropping below 0.01.
    pub fn adjust_mouse_sensitivity(&mut self, delta: f32) {
        self.mouse_sensitivity = (self.mouse_sensitivity + delta).max(MIN_SENSITIVITY);
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.front, self.up)
    }

    pub fn process_keyboard(&mut self, direction: CameraMovement, distance: f32) {
        let offset = match direction {
            CameraMovement::Forward => self.front,
            CameraMovement::Backward => -self.front,
            CameraMovement::Left => -self.right,
            CameraMovement::Right => self.right,
            CameraMovement::Up => self.up,
            CameraMovement::Down => -self.up,
        };
        self.position += offset * distance;
    }

    /// Turns the camera by raw cursor offsets (`y` positive is upwards).
    pub fn process_mouse_movement(&mut self, x_offset: f32, y_offset: f32) {
        self.yaw += x_offset * self.mouse_sensitivity;
        self.pitch = (self.pitch + y_offset * self.mouse_sensitivity)
            .clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.update_vectors();
    }

    /// Scrolling tunes the movement speed rather than the field of view.
    pub fn process_mouse_scroll(&mut self, y_offset: f32) {
        self.movement_speed =
            (self.movement_speed + y_offset * SCROLL_SPEED_STEP).max(MIN_MOVEMENT_SPEED);
    }

    fn update_vectors(&mut self) {
        let (yaw, pitch) = (self.yaw.to_radians(), self.pitch.to_radians());
        self.front = Vec3::new(
            yaw.cos() * pitch.cos(),
            pitch.sin(),
            yaw.sin() * pitch.cos(),
        )
        .normalize();
        self.right = self.front.cross(self.world_up).normalize_or_zero();
        self.up = self.right.cross(self.front).normalize_or_zero();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_looks_down_negative_z() {
        let camera = Camera::default();
        assert!(camera.front().abs_diff_eq(Vec3::NEG_Z, 1e-6));
        assert!(camera.right().abs_diff_eq(Vec3::X, 1e-6));
        assert!(camera.up().abs_diff_eq(Vec3::Y, 1e-6));
    }

    #[test]
    fn looking_along_preserves_initial_front() {
        let front = Vec3::new(0.0, -0.3, -1.0);
        let camera = Camera::looking_along(Vec3::new(0.0, 10.0, 30.0), front, Vec3::Y);
        assert!(camera.front().abs_diff_eq(front.normalize(), 1e-5));
        assert!((camera.yaw() - DEFAULT_YAW).abs() < 1e-4);
    }

    #[test]
    fn mouse_deltas_scale_by_sensitivity() {
        let mut camera = Camera::default();
        camera.process_mouse_movement(10.0, -5.0);
        assert!((camera.yaw() - (DEFAULT_YAW + 1.0)).abs() < 1e-5);
        assert!((camera.pitch() + 0.5).abs() < 1e-5);
    }

    #[test]
    fn pitch_is_clamped() {
        let mut camera = Camera::default();
        camera.process_mouse_movement(0.0, 10_000.0);
        assert_eq!(camera.pitch(), 89.0);
        camera.process_mouse_movement(0.0, -100_000.0);
        assert_eq!(camera.pitch(), -89.0);
    }

    #[test]
    fn scroll_adjusts_speed_with_floor() {
        let mut camera = Camera::default();
        camera.process_mouse_scroll(2.0);
        assert_eq!(camera.movement_speed, DEFAULT_SPEED + 1.0);
        camera.process_mouse_scroll(-100.0);
        assert_eq!(camera.movement_speed, 0.1);
    }

    #[test]
    fn sensitivity_has_floor() {
        let mut camera = Camera::default();
        for _ in 0..20 {
            camera.adjust_mouse_sensitivity(-0.01);
        }
        assert_eq!(camera.mouse_sensitivity(), 0.01);
    }

    #[test]
    fn keyboard_moves_along_basis() {
        let mut camera = Camera::default();
        camera.process_keyboard(CameraMovement::Forward, 2.0);
        camera.process_keyboard(CameraMovement::Right, 1.0);
        camera.process_keyboard(CameraMovement::Down, 0.5);
        assert!(camera.position.abs_diff_eq(Vec3::new(1.0, -0.5, -2.0), 1e-5));
    }

    #[test]
    fn view_matrix_maps_target_ahead() {
        let camera = Camera::looking_along(Vec3::new(0.0, 10.0, 30.0), Vec3::NEG_Z, Vec3::Y);
        let ahead = camera
            .view_matrix()
            .transform_point3(Vec3::new(0.0, 10.0, 20.0));
        assert!(ahead.abs_diff_eq(Vec3::new(0.0, 0.0, -10.0), 1e-4));
    }
}
