//! Harbor scene: terrain, trees, a patrolling boat and a lighthouse, lit by a
//! shadow-casting sun and surrounded by reflective water.

pub mod boat;
pub mod lights;
pub mod passes;
pub mod terrain;
pub mod water;

use crate::engine::app::{ Demo, FrameAction, FrameInput };
use crate::engine::components::camera::{ Camera, Direction };
use crate::engine::components::material::bind_to_unit;
use crate::engine::components::mesh::Mesh;
use crate::engine::components::model::Model;
use crate::engine::debug::LightMarker;
use crate::engine::error::Result;
use crate::engine::managers::assets_manager::TextureCache;
use crate::engine::rendering::framebuffer::{ Attachments, Framebuffer };
use crate::engine::rendering::render_pass_manager::RenderPassManager;
use crate::engine::settings::WindowSettings;
use crate::engine::shader::{ reload_all, ShaderProgram };
use crate::engine::utils::input_utils::InputState;
use boat::BoatPatrol;
use glam::{ Mat4, Vec3, Vec4 };
use glow::HasContext;
use lights::{ FrameUniforms, GlobalLight, LIGHTHOUSE_TEXTURE_UNIT, SHADOW_MAP_UNIT };
use log::info;
use serde::{ Deserialize, Serialize };
use std::path::PathBuf;
use std::sync::Arc;
use terrain::HeightRange;
use water::WaterFramebuffers;
use winit::keyboard::KeyCode;

const CAMERA_SPEED_FACTOR: f32 = 1.2;
const OBJECT_SCALE: f32 = 0.01;
const LIGHT_MARKER_SCALE: f32 = 0.015;
const LIGHTHOUSE_OFFSET: Vec3 = Vec3::new(-17.950012, 4.6499996, -18.05001);

pub fn default_tree_positions() -> Vec<Vec3> {
    vec![
        Vec3::new(-5.9100404, 4.840016, -6.600056),
        Vec3::new(-6.1000447, 2.8399978, -1.9399986),
        Vec3::new(-1.1, 2.7499986, -23.34993),
        Vec3::new(5.850004, 2.7499986, -27.849861),
        Vec3::new(-12.65003, 2.7499986, -17.50002),
        Vec3::new(-19.049995, 7.2000093, -21.449959)
    ]
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SceneSettings {
    pub window: WindowSettings,
    pub shaders_dir: PathBuf,
    /// Size of the reflection and refraction captures.
    pub water_framebuffer_size: [u32; 2],
    pub shadow_map_size: [u32; 2],
    pub heightmap: PathBuf,
    pub terrain_layers: Vec<PathBuf>,
    pub height_range: HeightRange,
    pub dudv_map: PathBuf,
    pub water_normal_map: PathBuf,
    pub tree_model: PathBuf,
    pub tree_positions: Vec<Vec3>,
    pub boat_model: PathBuf,
    pub waypoints: Vec<Vec3>,
    /// Load and draw the lighthouse with its projected texture.
    pub lighthouse: bool,
    pub lighthouse_model: PathBuf,
    pub lighthouse_texture: PathBuf,
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            window: WindowSettings::default(),
            shaders_dir: PathBuf::from("assets/shaders"),
            water_framebuffer_size: [1080 * 4, 920 * 4],
            shadow_map_size: [1080 * 4, 920 * 4],
            heightmap: PathBuf::from("assets/heightmap/heightmap.png"),
            terrain_layers: ["p1.jpg", "p2.jpg", "rock.jpg", "detail.jpg"]
                .iter()
                .map(|name| PathBuf::from("assets/heightmap").join(name))
                .collect(),
            height_range: HeightRange::default(),
            dudv_map: PathBuf::from("assets/water/dudv.png"),
            water_normal_map: PathBuf::from("assets/water/normal_map.png"),
            tree_model: PathBuf::from("assets/models/tree/tree.gltf"),
            tree_positions: default_tree_positions(),
            boat_model: PathBuf::from("assets/models/boat/boat.gltf"),
            waypoints: boat::default_waypoints(),
            lighthouse: true,
            lighthouse_model: PathBuf::from("assets/models/lighthouse/lighthouse.gltf"),
            lighthouse_texture: PathBuf::from("assets/batman.png"),
        }
    }
}

pub struct SceneShaders {
    pub terrain: ShaderProgram,
    pub common_object: ShaderProgram,
    pub water: ShaderProgram,
    pub simple_object: ShaderProgram,
    pub depth: ShaderProgram,
}

impl SceneShaders {
    fn load(gl: &glow::Context, settings: &SceneSettings) -> Result<Self> {
        let dir = &settings.shaders_dir;
        Ok(Self {
            terrain: ShaderProgram::load(gl, dir.join("terrain"))?,
            common_object: ShaderProgram::load(gl, dir.join("common_object"))?,
            water: ShaderProgram::load(gl, dir.join("water"))?,
            simple_object: ShaderProgram::load(gl, dir.join("simple_object"))?,
            depth: ShaderProgram::load(gl, dir.join("depth"))?,
        })
    }

    fn destroy(&self, gl: &glow::Context) {
        for shader in [&self.terrain, &self.common_object, &self.water, &self.simple_object, &self.depth] {
            shader.destroy(gl);
        }
    }
}

/// Trees share one model placed at each position, after centering.
pub fn tree_matrices(tree_center: Vec3, positions: &[Vec3]) -> Vec<Mat4> {
    let base = Mat4::from_scale(Vec3::splat(OBJECT_SCALE)) * Mat4::from_translation(-tree_center);
    positions
        .iter()
        .map(|p| base * Mat4::from_translation(*p))
        .collect()
}

pub fn lighthouse_matrix() -> Mat4 {
    Mat4::from_scale(Vec3::splat(OBJECT_SCALE)) * Mat4::from_translation(LIGHTHOUSE_OFFSET)
}

/// Resources and per-frame state shared by the scene passes.
pub struct SceneContext {
    pub gl: Arc<glow::Context>,
    pub shaders: SceneShaders,
    pub camera: Camera,
    pub light: GlobalLight,
    pub patrol: BoatPatrol,
    pub frame: FrameUniforms,
    pub terrain: Mesh,
    pub terrain_matrix: Mat4,
    pub tree: Model,
    pub tree_matrices: Vec<Mat4>,
    pub boat: Model,
    pub lighthouse: Option<Model>,
    pub lighthouse_texture: Option<glow::Texture>,
    pub water_mesh: Mesh,
    pub water_matrix: Mat4,
    pub water: WaterFramebuffers,
    pub shadow: Framebuffer,
    pub marker: LightMarker,
    textures: TextureCache,
}

impl SceneContext {
    pub fn load(gl: Arc<glow::Context>, settings: &SceneSettings) -> Result<Self> {
        let shaders = SceneShaders::load(&gl, settings)?;
        let mut textures = TextureCache::new();

        let terrain = terrain::create_terrain(
            &gl,
            &settings.heightmap,
            &settings.terrain_layers,
            settings.height_range,
            &mut textures
        )?;
        let tree = Model::load(&gl, &settings.tree_model)?;
        let boat = Model::load(&gl, &settings.boat_model)?;
        let (lighthouse, lighthouse_texture) = if settings.lighthouse {
            (
                Some(Model::load(&gl, &settings.lighthouse_model)?),
                textures.get_or_warn(&gl, &settings.lighthouse_texture),
            )
        } else {
            info!("Lighthouse disabled");
            (None, None)
        };

        let [water_width, water_height] = settings.water_framebuffer_size;
        let water = WaterFramebuffers::new(
            &gl,
            water_width,
            water_height,
            &settings.dudv_map,
            &settings.water_normal_map,
            &mut textures
        )?;
        let [shadow_width, shadow_height] = settings.shadow_map_size;
        let shadow = Framebuffer::new(&gl, "shadow map", shadow_width, shadow_height, Attachments::DepthOnly)?;
        let water_mesh = Mesh::upload(&gl, &water::water_quad(), Vec::new())?;
        let marker = LightMarker::new(&gl, LIGHT_MARKER_SCALE)?;

        let [red, green, blue, alpha] = passes::CLEAR_COLOR;
        unsafe {
            gl.enable(glow::DEPTH_TEST);
            gl.clear_color(red, green, blue, alpha);
        }

        let camera = Camera::new(Vec3::new(0.0, 0.3, 1.0));
        let light = GlobalLight::default();
        let patrol = BoatPatrol::new(settings.waypoints.clone())?;
        let frame = FrameUniforms::new(&camera, &light, &patrol, 0.0, water_width, water_height);

        Ok(Self {
            shaders,
            camera,
            light,
            patrol,
            frame,
            terrain_matrix: terrain.bounds.center_shift(),
            terrain,
            tree_matrices: tree_matrices(tree.bounds.center(), &settings.tree_positions),
            tree,
            boat,
            lighthouse,
            lighthouse_texture,
            water_mesh,
            water_matrix: water::water_model_matrix(),
            water,
            shadow,
            marker,
            textures,
            gl,
        })
    }

    pub fn update_frame(&mut self, time: f32, width: u32, height: u32) {
        self.frame = FrameUniforms::new(&self.camera, &self.light, &self.patrol, time, width, height);
    }

    fn prepare(&self, shader: &ShaderProgram, model: Mat4, view: Mat4, clipping_plane: Vec4) {
        shader.use_program(&self.gl);
        self.frame.apply(&self.gl, shader, model, view, clipping_plane);
        self.light.apply(&self.gl, shader);
    }

    /// Terrain, trees, boat and lighthouse. `override_shader` replaces every
    /// program (depth pass) and skips material textures.
    pub fn draw_world(&self, view: Mat4, clipping_plane: Vec4, override_shader: Option<&ShaderProgram>) {
        let gl = &self.gl;
        let ignore_textures = override_shader.is_some();
        if !ignore_textures {
            bind_to_unit(gl, SHADOW_MAP_UNIT, glow::TEXTURE_2D, self.shadow.depth);
            bind_to_unit(gl, LIGHTHOUSE_TEXTURE_UNIT, glow::TEXTURE_2D, self.lighthouse_texture);
        }

        let terrain_shader = override_shader.unwrap_or(&self.shaders.terrain);
        self.prepare(terrain_shader, self.terrain_matrix, view, clipping_plane);
        self.terrain.draw(gl, terrain_shader, ignore_textures);

        let object_shader = override_shader.unwrap_or(&self.shaders.common_object);
        for model in &self.tree_matrices {
            self.prepare(object_shader, *model, view, clipping_plane);
            self.tree.draw(gl, object_shader, ignore_textures);
        }

        self.prepare(object_shader, self.patrol.model_matrix(), view, clipping_plane);
        self.boat.draw(gl, object_shader, ignore_textures);

        if let Some(lighthouse) = &self.lighthouse {
            self.prepare(object_shader, lighthouse_matrix(), view, clipping_plane);
            lighthouse.draw(gl, object_shader, ignore_textures);
        }
    }

    pub fn draw_light_marker(&self) {
        let shader = &self.shaders.simple_object;
        shader.use_program(&self.gl);
        shader.set_uniform(&self.gl, "view", self.frame.view);
        shader.set_uniform(&self.gl, "projection", self.frame.projection);
        self.marker.draw(&self.gl, shader, self.light.position, self.light.color);
    }

    pub fn reload_shaders(&mut self) {
        let shaders = &mut self.shaders;
        let reloaded = reload_all(&self.gl, &mut [
            &mut shaders.terrain,
            &mut shaders.common_object,
            &mut shaders.water,
        ]);
        info!("Reloaded {} of 3 scene shaders", reloaded);
    }

    fn destroy(&mut self) {
        let gl = &self.gl;
        self.shaders.destroy(gl);
        self.terrain.destroy(gl);
        self.tree.destroy(gl);
        self.boat.destroy(gl);
        if let Some(lighthouse) = &self.lighthouse {
            lighthouse.destroy(gl);
        }
        self.water_mesh.destroy(gl);
        self.water.destroy(gl);
        self.shadow.destroy(gl);
        self.marker.destroy(gl);
        self.textures.destroy(gl);
    }
}

pub struct SceneDemo {
    ctx: SceneContext,
    passes: RenderPassManager<SceneContext>,
    time: f32,
}

impl SceneDemo {
    pub fn new(gl: Arc<glow::Context>, settings: &SceneSettings) -> Result<Self> {
        let ctx = SceneContext::load(gl, settings)?;
        let passes = passes::scene_passes();
        info!("Scene ready with passes {:?}", passes.pass_names());
        Ok(Self { ctx, passes, time: 0.0 })
    }
}

/// Camera controls shared by the 3D demos: WASD to move, SPACE + mouse to
/// look, wheel to zoom.
pub fn fly_camera(camera: &mut Camera, input: &InputState, delta_time: f32) {
    let keys = [
        (KeyCode::KeyW, Direction::Forward),
        (KeyCode::KeyS, Direction::Backward),
        (KeyCode::KeyA, Direction::Left),
        (KeyCode::KeyD, Direction::Right),
    ];
    for (key, direction) in keys {
        if input.is_key_down(key) {
            camera.keyboard(direction, delta_time);
        }
    }
    if input.is_key_down(KeyCode::Space) {
        let delta = input.cursor_delta();
        camera.mouse_move(delta.x, delta.y);
    }
    let scroll = input.scene_scroll();
    if scroll != 0.0 {
        camera.mouse_scroll(scroll);
    }
}

/// `=` / `-` scale the camera speed.
fn adjust_speed(camera: &mut Camera, input: &InputState) {
    if input.was_key_pressed(KeyCode::Equal) {
        camera.speed *= CAMERA_SPEED_FACTOR;
        info!("Camera speed set to: {}", camera.speed);
    }
    if input.was_key_pressed(KeyCode::Minus) {
        camera.speed /= CAMERA_SPEED_FACTOR;
        info!("Camera speed set to: {}", camera.speed);
    }
}

impl Demo for SceneDemo {
    fn frame(&mut self, frame: &FrameInput) -> FrameAction {
        let input = frame.input;
        // F holds time still
        let delta_time = if input.is_key_down(KeyCode::KeyF) { 0.0 } else { frame.delta_time };
        self.time += delta_time;

        if input.was_key_pressed(KeyCode::KeyR) {
            self.ctx.reload_shaders();
        }
        adjust_speed(&mut self.ctx.camera, input);
        fly_camera(&mut self.ctx.camera, input, delta_time);

        self.ctx.patrol.tick(delta_time);
        self.ctx.update_frame(self.time, frame.width, frame.height);
        self.passes.execute_passes(&mut self.ctx, frame.width, frame.height);
        FrameAction::Continue
    }

    fn destroy(&mut self) {
        self.ctx.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::event::ElementState;

    #[test]
    fn default_settings_match_the_harbor_layout() {
        let settings = SceneSettings::default();
        assert_eq!(settings.water_framebuffer_size, [4320, 3680]);
        assert_eq!(settings.tree_positions.len(), 6);
        assert_eq!(settings.waypoints.len(), 4);
        assert_eq!(settings.terrain_layers.len(), 4);
        assert!(settings.lighthouse);
    }

    #[test]
    fn settings_round_trip_through_json() {
        let settings = SceneSettings::default();
        let json = serde_json::to_string(&settings).unwrap();
        let parsed: SceneSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, settings);

        let partial: SceneSettings = serde_json::from_str(r#"{ "lighthouse": false }"#).unwrap();
        assert!(!partial.lighthouse);
        assert_eq!(partial.waypoints, boat::default_waypoints());
    }

    #[test]
    fn trees_are_centered_then_placed() {
        let center = Vec3::new(10.0, 0.0, 0.0);
        let position = Vec3::new(-5.9100404, 4.840016, -6.600056);
        let matrices = tree_matrices(center, &[position]);
        let placed = matrices[0].transform_point3(center);
        assert!((placed - position * OBJECT_SCALE).length() < 1e-5);
    }

    #[test]
    fn lighthouse_sits_at_its_offset() {
        let origin = lighthouse_matrix().transform_point3(Vec3::ZERO);
        assert!((origin - LIGHTHOUSE_OFFSET * OBJECT_SCALE).length() < 1e-6);
    }

    #[test]
    fn speed_keys_scale_by_one_point_two() {
        let mut camera = Camera::new(Vec3::ZERO);
        let mut input = InputState::new();
        input.receive_key(KeyCode::Equal, ElementState::Pressed);
        adjust_speed(&mut camera, &input);
        assert!((camera.speed - 2.5 * 1.2).abs() < 1e-5);

        input.end_frame();
        input.receive_key(KeyCode::Equal, ElementState::Released);
        input.receive_key(KeyCode::Minus, ElementState::Pressed);
        adjust_speed(&mut camera, &input);
        assert!((camera.speed - 2.5).abs() < 1e-5);
    }

    #[test]
    fn fly_camera_moves_forward_with_w() {
        let mut camera = Camera::new(Vec3::ZERO);
        let mut input = InputState::new();
        input.receive_key(KeyCode::KeyW, ElementState::Pressed);
        fly_camera(&mut camera, &input, 1.0);
        assert!((camera.position - Vec3::new(0.0, 0.0, -2.5)).length() < 1e-4);
    }

    #[test]
    fn mouse_look_requires_space() {
        let mut camera = Camera::new(Vec3::ZERO);
        let mut input = InputState::new();
        input.receive_cursor(0.0, 0.0);
        input.receive_cursor(100.0, 0.0);
        fly_camera(&mut camera, &input, 0.0);
        assert_eq!(camera.yaw, -90.0);

        input.receive_key(KeyCode::Space, ElementState::Pressed);
        fly_camera(&mut camera, &input, 0.0);
        assert!((camera.yaw - (-80.0)).abs() < 1e-4);
    }
}
