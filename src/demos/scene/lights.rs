use super::boat::BoatPatrol;
use crate::engine::components::camera::Camera;
use crate::engine::shader::ShaderProgram;
use crate::engine::utils::math::{ aspect_ratio, light_space_matrix };
use glam::{ Mat4, Vec3, Vec4 };

pub const SHADOW_MAP_UNIT: u32 = 6;
pub const LIGHTHOUSE_TEXTURE_UNIT: u32 = 7;

pub const NEAR_PLANE: f32 = 0.01;
pub const FAR_PLANE: f32 = 1000.0;

pub const REFLECTION_CLIP_PLANE: Vec4 = Vec4::new(0.0, 1.0, 0.0, 0.0);
pub const REFRACTION_CLIP_PLANE: Vec4 = Vec4::new(0.0, -1.0, 0.0, 0.0);
/// Far enough away that nothing is ever clipped.
pub const DEFAULT_CLIP_PLANE: Vec4 = Vec4::new(0.0, -1.0, 0.0, 10000.0);

/// Sun-like light casting the scene shadows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlobalLight {
    pub position: Vec3,
    pub color: Vec3,
    pub ambient_strength: f32,
    pub directional_strength: f32,
}

impl Default for GlobalLight {
    fn default() -> Self {
        Self {
            position: Vec3::new(26.64988, 23.800043, 6.5000067),
            color: Vec3::ONE,
            ambient_strength: 0.4,
            directional_strength: 1.0,
        }
    }
}

impl GlobalLight {
    pub fn uniforms(&self, prefix: &str) -> [(String, LightValue); 4] {
        [
            (format!("{}_position", prefix), LightValue::Vector(self.position)),
            (format!("{}_color", prefix), LightValue::Vector(self.color)),
            (format!("{}_ambient_strength", prefix), LightValue::Scalar(self.ambient_strength)),
            (format!("{}_directional_strength", prefix), LightValue::Scalar(self.directional_strength)),
        ]
    }

    /// Light uniforms under `global_light_*` plus the shadow map sampler.
    pub fn apply(&self, gl: &glow::Context, shader: &ShaderProgram) {
        for (name, value) in self.uniforms("global_light") {
            match value {
                LightValue::Vector(v) => shader.set_uniform(gl, &name, v),
                LightValue::Scalar(s) => shader.set_uniform(gl, &name, s),
            }
        }
        shader.set_uniform(gl, "shadow_map", SHADOW_MAP_UNIT as i32);
    }

    pub fn space_matrix(&self) -> Mat4 {
        light_space_matrix(self.position, Vec3::ZERO, 1.0, NEAR_PLANE, FAR_PLANE)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LightValue {
    Vector(Vec3),
    Scalar(f32),
}

pub const LIGHTHOUSE_LIGHT_POSITION: Vec3 = Vec3::new(-17.920118, 13.820092, -18.100204);

/// Projector from the lighthouse lamp aimed at `target`.
pub fn lighthouse_space_matrix(target: Vec3) -> Mat4 {
    light_space_matrix(LIGHTHOUSE_LIGHT_POSITION, target, 10.0, 0.1, FAR_PLANE)
}

/// Values every world draw receives, computed once per frame.
#[derive(Debug, Clone, Copy)]
pub struct FrameUniforms {
    pub view: Mat4,
    pub projection: Mat4,
    pub camera_position: Vec3,
    pub camera_front: Vec3,
    pub time: f32,
    pub light_space: Mat4,
    pub lighthouse_space: Mat4,
    pub lighthouse_target: Vec3,
}

impl FrameUniforms {
    /// The lighthouse follows the boat.
    pub fn new(
        camera: &Camera,
        light: &GlobalLight,
        patrol: &BoatPatrol,
        time: f32,
        width: u32,
        height: u32
    ) -> Self {
        let target = patrol.world_position();
        Self {
            view: camera.view_matrix(),
            projection: camera.projection(aspect_ratio(width, height), NEAR_PLANE, FAR_PLANE),
            camera_position: camera.position,
            camera_front: camera.front,
            time,
            light_space: light.space_matrix(),
            lighthouse_space: lighthouse_space_matrix(target),
            lighthouse_target: target,
        }
    }

    pub fn apply(
        &self,
        gl: &glow::Context,
        shader: &ShaderProgram,
        model: Mat4,
        view: Mat4,
        clipping_plane: Vec4
    ) {
        shader.set_uniform(gl, "model", model);
        shader.set_uniform(gl, "view", view);
        shader.set_uniform(gl, "projection", self.projection);
        shader.set_uniform(gl, "clipping_plane", clipping_plane);
        shader.set_uniform(gl, "time", self.time);
        shader.set_uniform(gl, "lightSpaceMatrix", self.light_space);
        shader.set_uniform(gl, "camera_position", self.camera_position);
        shader.set_uniform(gl, "camera_front", self.camera_front);
        shader.set_uniform(gl, "lighthouse_light_space_matrix", self.lighthouse_space);
        shader.set_uniform(gl, "lighthouse_light_position", LIGHTHOUSE_LIGHT_POSITION);
        shader.set_uniform(gl, "lighthouse_light_target_point", self.lighthouse_target);
        shader.set_uniform(gl, "lighthouse_projection_texture", LIGHTHOUSE_TEXTURE_UNIT as i32);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demos::scene::boat::default_waypoints;

    #[test]
    fn uniform_names_use_prefix() {
        let names: Vec<String> = GlobalLight::default()
            .uniforms("global_light")
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        assert_eq!(names, vec![
            "global_light_position",
            "global_light_color",
            "global_light_ambient_strength",
            "global_light_directional_strength",
        ]);
    }

    #[test]
    fn default_light_strengths() {
        let light = GlobalLight::default();
        let values = light.uniforms("l");
        assert_eq!(values[2].1, LightValue::Scalar(0.4));
        assert_eq!(values[3].1, LightValue::Scalar(1.0));
    }

    #[test]
    fn origin_projects_to_shadow_map_center() {
        let clip = GlobalLight::default().space_matrix() * Vec4::new(0.0, 0.0, 0.0, 1.0);
        assert!(clip.x.abs() < 1e-4 && clip.y.abs() < 1e-4);
    }

    #[test]
    fn lighthouse_aims_at_target() {
        let target = Vec3::new(0.0, 0.0, -0.1);
        let clip = lighthouse_space_matrix(target) * target.extend(1.0);
        assert!(clip.x.abs() < 1e-4 && clip.y.abs() < 1e-4);
        // wider frustum than the global light
        let off_axis = lighthouse_space_matrix(target) * (target + Vec3::new(5.0, 0.0, 0.0)).extend(1.0);
        assert!(off_axis.x.abs() <= 1.0);
    }

    #[test]
    fn frame_uniforms_track_the_boat() {
        let camera = Camera::new(Vec3::new(0.0, 0.3, 1.0));
        let light = GlobalLight::default();
        let mut patrol = BoatPatrol::new(default_waypoints()).unwrap();
        patrol.tick(0.5);

        let frame = FrameUniforms::new(&camera, &light, &patrol, 2.5, 1600, 900);
        assert_eq!(frame.lighthouse_target, patrol.world_position());
        assert_eq!(frame.lighthouse_space, lighthouse_space_matrix(patrol.world_position()));
        assert_eq!(frame.light_space, light.space_matrix());
        assert_eq!(frame.view, camera.view_matrix());
        assert_eq!(frame.projection, camera.projection(1600.0 / 900.0, NEAR_PLANE, FAR_PLANE));
        assert_eq!(frame.camera_position, camera.position);
        assert_eq!(frame.time, 2.5);
    }
}
