use glam::{ Mat3, Mat4, Vec2, Vec3 };

/// Step from `from` toward `to` by at most `max_step`, landing exactly on `to`
/// when it is closer than that.
pub fn move_towards(from: Vec3, to: Vec3, max_step: f32) -> Vec3 {
    let offset = to - from;
    let distance = offset.length();
    if distance <= max_step || distance <= f32::EPSILON {
        to
    } else {
        from + offset / distance * max_step
    }
}

/// OpenGL-style perspective projection with the field of view given in degrees.
pub fn perspective(fov_y_degrees: f32, aspect_ratio: f32, near: f32, far: f32) -> Mat4 {
    Mat4::perspective_rh_gl(fov_y_degrees.to_radians(), aspect_ratio, near, far)
}

/// Orthographic light-space matrix looking from `position` at `target`.
pub fn light_space_matrix(position: Vec3, target: Vec3, half_extent: f32, near: f32, far: f32) -> Mat4 {
    let projection = Mat4::orthographic_rh_gl(
        -half_extent,
        half_extent,
        -half_extent,
        half_extent,
        near,
        far
    );
    let view = Mat4::look_at_rh(position, target, Vec3::Y);
    projection * view
}

/// Drop the translation part of a view matrix (skybox rendering).
pub fn strip_translation(view: Mat4) -> Mat4 {
    Mat4::from_mat3(Mat3::from_mat4(view))
}

/// Convert a cursor position in window pixels to normalized device coordinates
/// (y still pointing down, like the window).
pub fn cursor_to_ndc(cursor: Vec2, width: f32, height: f32) -> Vec2 {
    Vec2::new((cursor.x * 2.0) / width - 1.0, (cursor.y * 2.0) / height - 1.0)
}

pub fn aspect_ratio(width: u32, height: u32) -> f32 {
    if height == 0 { 1.0 } else { (width as f32) / (height as f32) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    #[test]
    fn move_towards_clamps_to_target() {
        let target = Vec3::new(0.0, 0.0, -2.5);
        let first = move_towards(Vec3::ZERO, target, 1.0);
        assert!((first - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-6);

        let last = move_towards(Vec3::new(0.0, 0.0, -2.0), target, 1.0);
        assert_eq!(last, target);
        assert_eq!(move_towards(target, target, 1.0), target);
    }

    #[test]
    fn light_space_matrix_maps_target_to_center() {
        let position = Vec3::new(26.64988, 23.800043, 6.5000067);
        let matrix = light_space_matrix(position, Vec3::ZERO, 1.0, 0.01, 1000.0);
        let clip = matrix * Vec4::new(0.0, 0.0, 0.0, 1.0);
        assert!(clip.x.abs() < 1e-4);
        assert!(clip.y.abs() < 1e-4);
        assert!(clip.z > -1.0 && clip.z < 1.0);
    }

    #[test]
    fn strip_translation_keeps_rotation_only() {
        let view = Mat4::from_translation(Vec3::new(3.0, 4.0, 5.0)) * Mat4::from_rotation_y(0.5);
        let stripped = strip_translation(view);
        assert_eq!(stripped.w_axis, Vec4::W);
        assert!((stripped.x_axis - view.x_axis).length() < 1e-6);
    }

    #[test]
    fn cursor_corners_map_to_unit_square() {
        assert_eq!(cursor_to_ndc(Vec2::ZERO, 200.0, 100.0), Vec2::new(-1.0, -1.0));
        assert_eq!(cursor_to_ndc(Vec2::new(200.0, 100.0), 200.0, 100.0), Vec2::ONE);
        assert_eq!(cursor_to_ndc(Vec2::new(100.0, 50.0), 200.0, 100.0), Vec2::ZERO);
    }
}
