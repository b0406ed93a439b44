use crate::engine::app::{ Demo, FrameAction, FrameInput };
use crate::engine::error::{ DemoError, Result };
use crate::engine::managers::assets_manager::{ upload_texture, Sampling, TextureImage };
use crate::engine::settings::WindowSettings;
use crate::engine::shader::ShaderProgram;
use crate::engine::utils::math::cursor_to_ndc;
use glam::Vec2;
use glow::HasContext;
use serde::{ Deserialize, Serialize };
use std::path::PathBuf;
use std::sync::Arc;
use winit::keyboard::KeyCode;

const WHEEL_DEAD_ZONE: f32 = 0.1;
const ZOOM_STEP: f32 = 1.2;

pub const PALETTE: [[u8; 3]; 4] = [
    [0, 0, 0],
    [255, 70, 45],
    [255, 200, 100],
    [0, 23, 12],
];

/// Pan/zoom state of the fractal. A fragment at `ndc` (y up) samples the
/// complex plane at `(ndc + center) * zoom + shift`.
#[derive(Debug, Clone, PartialEq)]
pub struct FractalView {
    pub zoom: f32,
    pub center: Vec2,
    pub shift: Vec2,
    pub max_radius: f32,
    pub max_iterations: i32,
}

impl Default for FractalView {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            center: Vec2::ZERO,
            shift: Vec2::ZERO,
            max_radius: 8.0,
            max_iterations: 25,
        }
    }
}

impl FractalView {
    /// Drag by `screen_delta` pixels (y down, as reported by the window).
    pub fn drag(&mut self, screen_delta: Vec2, width: f32, height: f32) {
        self.center += Vec2::new((-screen_delta.x / width) * 2.0, (screen_delta.y / height) * 2.0);
    }

    /// Zoom one wheel notch around the cursor so the point under it stays put.
    pub fn scroll(&mut self, wheel: f32, cursor: Vec2, width: f32, height: f32) {
        if wheel.abs() < WHEEL_DEAD_ZONE {
            return;
        }
        let factor = if wheel > 0.0 { 1.0 / ZOOM_STEP } else { ZOOM_STEP };
        let ndc = cursor_to_ndc(cursor, width, height);
        let scale = (1.0 - factor) * self.zoom;
        self.shift += Vec2::new((ndc.x + self.center.x) * scale, (-ndc.y + self.center.y) * scale);
        self.zoom *= factor;
    }

    pub fn reset_center(&mut self) {
        self.center = Vec2::ZERO;
        self.shift = Vec2::ZERO;
    }

    /// Point of the complex plane shown at a cursor position.
    pub fn plane_point(&self, cursor: Vec2, width: f32, height: f32) -> Vec2 {
        let ndc = cursor_to_ndc(cursor, width, height);
        (Vec2::new(ndc.x, -ndc.y) + self.center) * self.zoom + self.shift
    }

    pub fn apply(&self, gl: &glow::Context, shader: &ShaderProgram) {
        shader.set_uniform(gl, "zoom", self.zoom);
        shader.set_uniform(gl, "max_iterations", self.max_iterations);
        shader.set_uniform(gl, "center", self.center);
        shader.set_uniform(gl, "shift", self.shift);
        shader.set_uniform(gl, "max_radius", self.max_radius);
        shader.set_uniform(gl, "tex", 0);
    }

    pub fn ui(&mut self, ctx: &egui::Context) {
        egui::Window
            ::new("Fractal props")
            .default_size(egui::vec2(300.0, 200.0))
            .show(ctx, |ui| {
                ui.add(egui::Slider::new(&mut self.zoom, 0.01..=100.0).text("Zoom"));
                ui.add(egui::Slider::new(&mut self.max_radius, 0.0..=20.0).text("Max Radius"));
                ui.add(egui::Slider::new(&mut self.max_iterations, 1..=100).text("Max Iterations"));
                if ui.button("Reset Center").clicked() {
                    self.reset_center();
                }
            });
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct FractalSettings {
    pub window: WindowSettings,
    pub shader: PathBuf,
}

impl Default for FractalSettings {
    fn default() -> Self {
        Self {
            window: WindowSettings { width: 1280, height: 720, vsync: true },
            shader: PathBuf::from("assets/shaders/fractal"),
        }
    }
}

#[rustfmt::skip]
const QUAD: [f32; 8] = [
    -1.0, -1.0,
     1.0, -1.0,
     1.0,  1.0,
    -1.0,  1.0,
];
const QUAD_INDICES: [u32; 6] = [0, 1, 2, 2, 3, 0];

pub struct FractalDemo {
    gl: Arc<glow::Context>,
    shader: ShaderProgram,
    view: FractalView,
    vao: glow::VertexArray,
    vbo: glow::Buffer,
    ebo: glow::Buffer,
    palette: glow::Texture,
}

impl FractalDemo {
    pub fn new(gl: Arc<glow::Context>, settings: &FractalSettings) -> Result<Self> {
        let shader = ShaderProgram::load(&gl, &settings.shader)?;
        let palette = TextureImage {
            width: PALETTE.len() as u32,
            height: 1,
            channels: 3,
            pixels: PALETTE.concat(),
        };
        let palette = upload_texture(&gl, "fractal palette", &palette, Sampling::LINEAR_CLAMPED)?;

        unsafe {
            let vao = gl.create_vertex_array().map_err(DemoError::gl("quad vertex array"))?;
            let vbo = gl.create_buffer().map_err(DemoError::gl("quad vertex buffer"))?;
            let ebo = gl.create_buffer().map_err(DemoError::gl("quad index buffer"))?;
            gl.bind_vertex_array(Some(vao));
            gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
            gl.buffer_data_u8_slice(glow::ARRAY_BUFFER, bytemuck::cast_slice(&QUAD), glow::STATIC_DRAW);
            gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(ebo));
            gl.buffer_data_u8_slice(glow::ELEMENT_ARRAY_BUFFER, bytemuck::cast_slice(&QUAD_INDICES), glow::STATIC_DRAW);
            gl.enable_vertex_attrib_array(0);
            gl.vertex_attrib_pointer_f32(0, 2, glow::FLOAT, false, 8, 0);
            gl.bind_vertex_array(None);

            Ok(Self {
                gl,
                shader,
                view: FractalView::default(),
                vao,
                vbo,
                ebo,
                palette,
            })
        }
    }
}

impl Demo for FractalDemo {
    fn frame(&mut self, frame: &FrameInput) -> FrameAction {
        let input = frame.input;
        let (width, height) = (frame.width as f32, frame.height as f32);

        self.view.scroll(input.scene_scroll(), input.cursor_position(), width, height);
        let drag = input.drag_delta();
        if drag != Vec2::ZERO {
            // drag_delta has y up; the view works in window pixels
            self.view.drag(Vec2::new(drag.x, -drag.y), width, height);
        }
        if input.was_key_pressed(KeyCode::KeyR) {
            if let Err(e) = self.shader.reload(&self.gl) {
                log::error!("{}", e);
            }
        }

        let gl = &self.gl;
        unsafe {
            gl.viewport(0, 0, frame.width as i32, frame.height as i32);
            gl.clear_color(0.0, 0.0, 0.0, 1.0);
            gl.clear(glow::COLOR_BUFFER_BIT);

            self.shader.use_program(gl);
            self.view.apply(gl, &self.shader);
            gl.active_texture(glow::TEXTURE0);
            gl.bind_texture(glow::TEXTURE_2D, Some(self.palette));
            gl.bind_vertex_array(Some(self.vao));
            gl.draw_elements(glow::TRIANGLES, QUAD_INDICES.len() as i32, glow::UNSIGNED_INT, 0);
            gl.bind_vertex_array(None);
        }
        FrameAction::Continue
    }

    fn ui(&mut self, ctx: &egui::Context) {
        self.view.ui(ctx);
    }

    fn destroy(&mut self) {
        let gl = &self.gl;
        self.shader.destroy(gl);
        unsafe {
            gl.delete_vertex_array(self.vao);
            gl.delete_buffer(self.vbo);
            gl.delete_buffer(self.ebo);
            gl.delete_texture(self.palette);
        }
    }
}
