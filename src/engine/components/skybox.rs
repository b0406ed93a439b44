use crate::engine::error::{ DemoError, Result };
use crate::engine::managers::assets_manager::{ cubemap_face_paths, load_cubemap };
use crate::engine::shader::ShaderProgram;
use crate::engine::utils::math::strip_translation;
use glam::Mat4;
use glow::HasContext;
use std::path::Path;

#[rustfmt::skip]
const CUBE_VERTICES: [f32; 108] = [
    -1.0,  1.0, -1.0,  -1.0, -1.0, -1.0,   1.0, -1.0, -1.0,
     1.0, -1.0, -1.0,   1.0,  1.0, -1.0,  -1.0,  1.0, -1.0,

    -1.0, -1.0,  1.0,  -1.0, -1.0, -1.0,  -1.0,  1.0, -1.0,
    -1.0,  1.0, -1.0,  -1.0,  1.0,  1.0,  -1.0, -1.0,  1.0,

     1.0, -1.0, -1.0,   1.0, -1.0,  1.0,   1.0,  1.0,  1.0,
     1.0,  1.0,  1.0,   1.0,  1.0, -1.0,   1.0, -1.0, -1.0,

    -1.0, -1.0,  1.0,  -1.0,  1.0,  1.0,   1.0,  1.0,  1.0,
     1.0,  1.0,  1.0,   1.0, -1.0,  1.0,  -1.0, -1.0,  1.0,

    -1.0,  1.0, -1.0,   1.0,  1.0, -1.0,   1.0,  1.0,  1.0,
     1.0,  1.0,  1.0,  -1.0,  1.0,  1.0,  -1.0,  1.0, -1.0,

    -1.0, -1.0, -1.0,  -1.0, -1.0,  1.0,   1.0, -1.0, -1.0,
     1.0, -1.0, -1.0,  -1.0, -1.0,  1.0,   1.0, -1.0,  1.0,
];

/// Cube map environment drawn behind everything else.
pub struct Skybox {
    pub texture: glow::Texture,
    vao: glow::VertexArray,
    vbo: glow::Buffer,
}

impl Skybox {
    /// Load `positive-x.<ext>` ... `negative-z.<ext>` from `directory`.
    pub fn load(gl: &glow::Context, directory: impl AsRef<Path>, extension: &str) -> Result<Self> {
        let faces = cubemap_face_paths(directory, extension);
        let texture = load_cubemap(gl, &faces)?;
        unsafe {
            let vao = gl.create_vertex_array().map_err(DemoError::gl("skybox vertex array"))?;
            let vbo = gl.create_buffer().map_err(DemoError::gl("skybox buffer"))?;
            gl.bind_vertex_array(Some(vao));
            gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
            gl.buffer_data_u8_slice(glow::ARRAY_BUFFER, bytemuck::cast_slice(&CUBE_VERTICES), glow::STATIC_DRAW);
            gl.enable_vertex_attrib_array(0);
            gl.vertex_attrib_pointer_f32(0, 3, glow::FLOAT, false, 12, 0);
            gl.bind_vertex_array(None);
            Ok(Self { texture, vao, vbo })
        }
    }

    /// Draw with `shader`; the translation part of `view` is dropped so the
    /// box follows the camera.
    pub fn draw(&self, gl: &glow::Context, shader: &ShaderProgram, view: Mat4, projection: Mat4) {
        unsafe {
            gl.depth_func(glow::LEQUAL);
            shader.use_program(gl);
            shader.set_uniform(gl, "view", strip_translation(view));
            shader.set_uniform(gl, "projection", projection);
            shader.set_uniform(gl, "skybox", 0);
            gl.active_texture(glow::TEXTURE0);
            gl.bind_texture(glow::TEXTURE_CUBE_MAP, Some(self.texture));
            gl.bind_vertex_array(Some(self.vao));
            gl.draw_arrays(glow::TRIANGLES, 0, 36);
            gl.bind_vertex_array(None);
            gl.depth_func(glow::LESS);
        }
    }

    pub fn destroy(&self, gl: &glow::Context) {
        unsafe {
            gl.delete_vertex_array(self.vao);
            gl.delete_buffer(self.vbo);
            gl.delete_texture(self.texture);
        }
    }
}
