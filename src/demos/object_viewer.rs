//! Model viewer: one model at a time inside a cube-map environment, with
//! reflection/refraction blended against the model's own textures.

use crate::demos::scene::fly_camera;
use crate::engine::app::{ Demo, FrameAction, FrameInput };
use crate::engine::components::camera::Camera;
use crate::engine::components::model::Model;
use crate::engine::components::skybox::Skybox;
use crate::engine::error::{ DemoError, Result };
use crate::engine::settings::WindowSettings;
use crate::engine::shader::ShaderProgram;
use crate::engine::utils::math::aspect_ratio;
use glam::{ Mat4, Vec2, Vec3 };
use glow::HasContext;
use log::{ error, info };
use serde::{ Deserialize, Serialize };
use std::path::PathBuf;
use std::sync::Arc;
use winit::keyboard::KeyCode;

const NEAR_PLANE: f32 = 0.1;
const FAR_PLANE: f32 = 100.0;
/// Degrees of orbit per normalized drag unit.
const DRAG_ROTATION_SPEED: f32 = 30.0;
/// Auto-rotation in degrees per second.
const AUTO_ROTATION_SPEED: f32 = 25.0;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ModelEntry {
    pub name: String,
    pub path: PathBuf,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SkyboxEntry {
    pub name: String,
    pub directory: PathBuf,
    pub extension: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ViewerSettings {
    pub window: WindowSettings,
    pub shaders_dir: PathBuf,
    pub models: Vec<ModelEntry>,
    pub skyboxes: Vec<SkyboxEntry>,
}

impl Default for ViewerSettings {
    fn default() -> Self {
        let model = |name: &str, file: &str| ModelEntry {
            name: name.to_string(),
            path: PathBuf::from("assets/models").join(name).join(file),
        };
        let skybox = |name: &str| SkyboxEntry {
            name: name.to_string(),
            directory: PathBuf::from("assets/skyboxes").join(name),
            extension: "jpg".to_string(),
        };
        Self {
            window: WindowSettings::default(),
            shaders_dir: PathBuf::from("assets/shaders"),
            models: vec![
                model("lemur", "lemur.gltf"),
                model("cat", "cat.gltf"),
                model("astronaut", "astronaut.gltf")
            ],
            skyboxes: vec![skybox("water"), skybox("debug"), skybox("forest1"), skybox("forest2")],
        }
    }
}

/// Everything the panel edits, plus the drag orbit.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerState {
    pub refraction_ratio: f32,
    pub texture_balance: f32,
    pub scale: f32,
    /// Orbit angles in degrees: x around the y axis, y around the x axis.
    pub rotation: Vec2,
    pub auto_rotate: bool,
    pub model_index: usize,
    pub skybox_index: usize,
}

impl Default for ViewerState {
    fn default() -> Self {
        Self {
            refraction_ratio: 1.5,
            texture_balance: 0.5,
            scale: 0.03,
            rotation: Vec2::ZERO,
            auto_rotate: true,
            model_index: 0,
            skybox_index: 0,
        }
    }
}

impl ViewerState {
    /// Orbit by a drag of `screen_delta` pixels (y down).
    pub fn drag(&mut self, screen_delta: Vec2, width: f32, height: f32) {
        self.rotation +=
            Vec2::new((screen_delta.x / width) * 2.0, (screen_delta.y / height) * 2.0) * DRAG_ROTATION_SPEED;
    }

    pub fn model_matrix(&self, model_center: Vec3, time: f32) -> Mat4 {
        let base = Mat4::from_scale(Vec3::splat(self.scale)) * Mat4::from_translation(-model_center);
        if self.auto_rotate {
            base * Mat4::from_rotation_y((time * AUTO_ROTATION_SPEED).to_radians())
        } else {
            base
        }
    }

    pub fn view_matrix(&self, camera_view: Mat4) -> Mat4 {
        camera_view *
            Mat4::from_rotation_x(self.rotation.y.to_radians()) *
            Mat4::from_rotation_y(self.rotation.x.to_radians())
    }

    pub fn ui(&mut self, ctx: &egui::Context, models: &[String], skyboxes: &[String]) {
        egui::Window
            ::new("Props")
            .default_size(egui::vec2(200.0, 100.0))
            .show(ctx, |ui| {
                ui.add(
                    egui::Slider::new(&mut self.refraction_ratio, 1.00001..=2.0).text("Refraction Ratio")
                );
                ui.add(egui::Slider::new(&mut self.texture_balance, 0.0..=1.0).text("Texture/Effects Balance"));
                ui.add(egui::Slider::new(&mut self.scale, 0.01..=2.0).text("Scale"));
                combo(ui, "Model", &mut self.model_index, models);
                combo(ui, "Skybox", &mut self.skybox_index, skyboxes);
                ui.checkbox(&mut self.auto_rotate, "Rotation");
            });
    }
}

fn combo(ui: &mut egui::Ui, label: &str, selected: &mut usize, names: &[String]) {
    let current = names.get(*selected).map(String::as_str).unwrap_or("");
    egui::ComboBox
        ::from_label(label)
        .selected_text(current)
        .show_ui(ui, |ui| {
            for (index, name) in names.iter().enumerate() {
                ui.selectable_value(selected, index, name.as_str());
            }
        });
}

pub struct ViewerDemo {
    gl: Arc<glow::Context>,
    model_shader: ShaderProgram,
    skybox_shader: ShaderProgram,
    camera: Camera,
    state: ViewerState,
    models: Vec<Model>,
    model_names: Vec<String>,
    skyboxes: Vec<Skybox>,
    skybox_names: Vec<String>,
}

impl ViewerDemo {
    pub fn new(gl: Arc<glow::Context>, settings: &ViewerSettings) -> Result<Self> {
        if settings.models.is_empty() || settings.skyboxes.is_empty() {
            return Err(DemoError::Settings {
                path: PathBuf::from("object_viewer"),
                message: "at least one model and one skybox are required".to_string(),
            });
        }
        let model_shader = ShaderProgram::load(&gl, settings.shaders_dir.join("model"))?;
        let skybox_shader = ShaderProgram::load(&gl, settings.shaders_dir.join("skybox"))?;

        let models = settings.models
            .iter()
            .map(|entry| Model::load(&gl, &entry.path))
            .collect::<Result<Vec<_>>>()?;
        let skyboxes = settings.skyboxes
            .iter()
            .map(|entry| Skybox::load(&gl, &entry.directory, &entry.extension))
            .collect::<Result<Vec<_>>>()?;
        info!("Viewer loaded {} models and {} skyboxes", models.len(), skyboxes.len());

        unsafe { gl.enable(glow::DEPTH_TEST) }

        Ok(Self {
            model_shader,
            skybox_shader,
            camera: Camera::new(Vec3::new(0.0, 0.0, 10.0)),
            state: ViewerState::default(),
            models,
            model_names: settings.models
                .iter()
                .map(|m| m.name.clone())
                .collect(),
            skyboxes,
            skybox_names: settings.skyboxes
                .iter()
                .map(|s| s.name.clone())
                .collect(),
            gl,
        })
    }

    fn reload_shader(&mut self) {
        if let Err(e) = self.model_shader.reload(&self.gl) {
            error!("{}", e);
        }
    }
}

impl Demo for ViewerDemo {
    fn frame(&mut self, frame: &FrameInput) -> FrameAction {
        let input = frame.input;
        if input.is_key_down(KeyCode::KeyQ) {
            return FrameAction::Exit;
        }
        if input.was_key_pressed(KeyCode::KeyR) {
            self.reload_shader();
        }
        fly_camera(&mut self.camera, input, frame.delta_time);

        let (width, height) = (frame.width as f32, frame.height as f32);
        let drag = input.drag_delta();
        if drag != Vec2::ZERO {
            self.state.drag(Vec2::new(drag.x, -drag.y), width, height);
        }

        let model = &self.models[self.state.model_index.min(self.models.len() - 1)];
        let skybox = &self.skyboxes[self.state.skybox_index.min(self.skyboxes.len() - 1)];
        let model_matrix = self.state.model_matrix(model.bounds.center(), frame.time);
        let view = self.state.view_matrix(self.camera.view_matrix());
        let projection = self.camera.projection(aspect_ratio(frame.width, frame.height), NEAR_PLANE, FAR_PLANE);

        let gl = &self.gl;
        unsafe {
            gl.viewport(0, 0, frame.width as i32, frame.height as i32);
            gl.clear_color(0.1, 0.1, 0.1, 1.0);
            gl.clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);
        }

        let shader = &self.model_shader;
        shader.use_program(gl);
        shader.set_uniform(gl, "model", model_matrix);
        shader.set_uniform(gl, "view", view);
        shader.set_uniform(gl, "projection", projection);
        shader.set_uniform(gl, "camera_position", self.camera.position);
        shader.set_uniform(gl, "skybox_texture", 0);
        shader.set_uniform(gl, "refraction_ratio", self.state.refraction_ratio);
        shader.set_uniform(gl, "texture_balance", self.state.texture_balance);
        unsafe {
            gl.active_texture(glow::TEXTURE0);
            gl.bind_texture(glow::TEXTURE_CUBE_MAP, Some(skybox.texture));
        }
        model.draw(gl, shader, false);

        skybox.draw(gl, &self.skybox_shader, view, projection);
        FrameAction::Continue
    }

    fn ui(&mut self, ctx: &egui::Context) {
        self.state.ui(ctx, &self.model_names, &self.skybox_names);
    }

    fn destroy(&mut self) {
        let gl = &self.gl;
        self.model_shader.destroy(gl);
        self.skybox_shader.destroy(gl);
        for model in &self.models {
            model.destroy(gl);
        }
        for skybox in &self.skyboxes {
            skybox.destroy(gl);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_list_three_models_and_four_skyboxes() {
        let settings = ViewerSettings::default();
        let names: Vec<&str> = settings.models
            .iter()
            .map(|m| m.name.as_str())
            .collect();
        assert_eq!(names, vec!["lemur", "cat", "astronaut"]);
        assert_eq!(settings.skyboxes.len(), 4);
        assert_eq!(settings.skyboxes[2].directory, PathBuf::from("assets/skyboxes/forest1"));
        assert_eq!(settings.skyboxes[0].extension, "jpg");
    }

    #[test]
    fn partial_settings_keep_default_lists() {
        let parsed: ViewerSettings = serde_json::from_str(r#"{ "shaders_dir": "shaders" }"#).unwrap();
        assert_eq!(parsed.shaders_dir, PathBuf::from("shaders"));
        assert_eq!(parsed.models, ViewerSettings::default().models);
    }

    #[test]
    fn drag_rotates_thirty_degrees_per_half_window() {
        let mut state = ViewerState::default();
        state.drag(Vec2::new(500.0, -250.0), 1000.0, 1000.0);
        assert!((state.rotation - Vec2::new(30.0, -15.0)).length() < 1e-4);
    }

    #[test]
    fn model_matrix_centers_and_scales() {
        let state = ViewerState { auto_rotate: false, ..ViewerState::default() };
        let center = Vec3::new(10.0, 20.0, -4.0);
        let matrix = state.model_matrix(center, 3.0);
        assert!(matrix.transform_point3(center).length() < 1e-5);
        let unit = matrix.transform_point3(center + Vec3::X);
        assert!((unit - Vec3::new(0.03, 0.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn auto_rotation_turns_25_degrees_per_second() {
        let state = ViewerState { scale: 1.0, ..ViewerState::default() };
        let matrix = state.model_matrix(Vec3::ZERO, 90.0 / AUTO_ROTATION_SPEED);
        let rotated = matrix.transform_point3(Vec3::X);
        assert!((rotated - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-5, "{:?}", rotated);
    }

    #[test]
    fn orbit_applies_to_the_view() {
        let state = ViewerState { rotation: Vec2::new(90.0, 0.0), ..ViewerState::default() };
        let view = state.view_matrix(Mat4::IDENTITY);
        let rotated = view.transform_point3(Vec3::X);
        assert!((rotated - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-5);
        assert_eq!(ViewerState::default().view_matrix(Mat4::IDENTITY), Mat4::IDENTITY);
    }
}
