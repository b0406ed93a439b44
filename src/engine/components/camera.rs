use crate::engine::utils::math::perspective;
use glam::{ Mat4, Vec3 };

pub const YAW: f32 = -90.0;
pub const PITCH: f32 = 0.0;
pub const SPEED: f32 = 2.5;
pub const SENSITIVITY: f32 = 0.1;
pub const MAX_ZOOM: f32 = 100.0;
pub const MIN_ZOOM: f32 = 1.0;
const PITCH_LIMIT: f32 = 89.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
    Left,
    Right,
}

/// Free-flying camera driven by yaw/pitch in degrees.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub front: Vec3,
    pub up: Vec3,
    pub right: Vec3,
    pub world_up: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub speed: f32,
    pub sensitivity: f32,
    /// Vertical field of view in degrees.
    pub zoom: f32,
}

impl Camera {
    pub fn new(position: Vec3) -> Self {
        let mut camera = Self {
            position,
            front: Vec3::NEG_Z,
            up: Vec3::Y,
            right: Vec3::ZERO,
            world_up: Vec3::Y,
            yaw: YAW,
            pitch: PITCH,
            speed: SPEED,
            sensitivity: SENSITIVITY,
            zoom: MAX_ZOOM / 2.0,
        };
        camera.update();
        camera
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.front, self.up)
    }

    pub fn projection(&self, aspect_ratio: f32, near: f32, far: f32) -> Mat4 {
        perspective(self.zoom, aspect_ratio, near, far)
    }

    pub fn keyboard(&mut self, direction: Direction, delta_time: f32) {
        let velocity = self.speed * delta_time;
        match direction {
            Direction::Forward => {
                self.position += self.front * velocity;
            }
            Direction::Backward => {
                self.position -= self.front * velocity;
            }
            Direction::Left => {
                self.position -= self.right * velocity;
            }
            Direction::Right => {
                self.position += self.right * velocity;
            }
        }
    }

    pub fn mouse_move(&mut self, x_offset: f32, y_offset: f32) {
        self.yaw += x_offset * self.sensitivity;
        self.pitch = (self.pitch + y_offset * self.sensitivity).clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.update();
    }

    pub fn mouse_scroll(&mut self, y_offset: f32) {
        self.zoom = (self.zoom - y_offset).clamp(MIN_ZOOM, MAX_ZOOM);
    }

    /// A copy of this camera mirrored across the horizontal plane `y = height`.
    pub fn mirrored(&self, height: f32) -> Camera {
        let mut mirrored = self.clone();
        mirrored.position.y = 2.0 * height - self.position.y;
        mirrored.pitch = -self.pitch;
        mirrored.update();
        mirrored
    }

    fn update(&mut self) {
        let (yaw, pitch) = (self.yaw.to_radians(), self.pitch.to_radians());
        self.front = Vec3::new(yaw.cos() * pitch.cos(), pitch.sin(), yaw.sin() * pitch.cos()).normalize();
        self.right = self.front.cross(self.world_up).normalize();
        self.up = self.right.cross(self.front).normalize();
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vec3::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-5
    }

    #[test]
    fn default_orientation_looks_down_negative_z() {
        let camera = Camera::new(Vec3::new(0.0, 0.0, 10.0));
        assert!(approx(camera.front, Vec3::NEG_Z));
        assert!(approx(camera.right, Vec3::X));
        assert!(approx(camera.up, Vec3::Y));
        assert_eq!(camera.zoom, 50.0);
    }

    #[test]
    fn pitch_is_clamped() {
        let mut camera = Camera::default();
        camera.mouse_move(0.0, 10_000.0);
        assert_eq!(camera.pitch, 89.0);
        camera.mouse_move(0.0, -100_000.0);
        assert_eq!(camera.pitch, -89.0);
    }

    #[test]
    fn zoom_is_clamped() {
        let mut camera = Camera::default();
        camera.mouse_scroll(500.0);
        assert_eq!(camera.zoom, MIN_ZOOM);
        camera.mouse_scroll(-500.0);
        assert_eq!(camera.zoom, MAX_ZOOM);
    }

    #[test]
    fn keyboard_moves_along_basis() {
        let mut camera = Camera::default();
        camera.keyboard(Direction::Forward, 1.0);
        assert!(approx(camera.position, Vec3::new(0.0, 0.0, -2.5)));
        camera.keyboard(Direction::Right, 2.0);
        assert!(approx(camera.position, Vec3::new(5.0, 0.0, -2.5)));
        camera.keyboard(Direction::Backward, 1.0);
        camera.keyboard(Direction::Left, 2.0);
        assert!(approx(camera.position, Vec3::ZERO));
    }

    #[test]
    fn mirrored_camera_reflects_below_water() {
        let mut camera = Camera::new(Vec3::new(1.0, 0.3, 1.0));
        camera.mouse_move(0.0, -200.0);
        let pitch = camera.pitch;

        let mirrored = camera.mirrored(0.0);
        assert!((mirrored.position.y + 0.3).abs() < 1e-6);
        assert_eq!(mirrored.pitch, -pitch);
        assert!((mirrored.front.y + camera.front.y).abs() < 1e-5);
        // the source camera is untouched
        assert_eq!(camera.pitch, pitch);
        assert!((camera.position.y - 0.3).abs() < 1e-6);
    }

    #[test]
    fn mirrors_across_a_raised_water_plane() {
        let mut camera = Camera::new(Vec3::new(2.0, 3.0, -1.0));
        camera.mouse_move(0.0, 150.0);

        let mirrored = camera.mirrored(1.0);
        assert!((mirrored.position.y + 1.0).abs() < 1e-5);
        assert_eq!(mirrored.position.x, 2.0);
        assert_eq!(mirrored.position.z, -1.0);
        assert_eq!(mirrored.pitch, -camera.pitch);
        assert!((mirrored.front.y + camera.front.y).abs() < 1e-5);
        // both cameras sit the same distance from the plane
        assert!(((camera.position.y - 1.0) - (1.0 - mirrored.position.y)).abs() < 1e-5);
    }
}
