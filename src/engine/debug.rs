use crate::engine::error::{ DemoError, Result };
use crate::engine::shader::ShaderProgram;
use glam::{ Mat4, Vec3 };
use glow::HasContext;

/// Solid cube marking a light position in the scene.
pub struct LightMarker {
    vao: glow::VertexArray,
    vbo: glow::Buffer,
    ebo: glow::Buffer,
    index_count: usize,
    pub scale: f32,
}

impl LightMarker {
    pub fn new(gl: &glow::Context, scale: f32) -> Result<Self> {
        let (vao, vbo, ebo, index_count) = create_cube(gl)?;
        Ok(Self { vao, vbo, ebo, index_count, scale })
    }

    /// scale · translate(position), matching how the light itself is placed.
    pub fn model_matrix(&self, position: Vec3) -> Mat4 {
        Mat4::from_scale(Vec3::splat(self.scale)) * Mat4::from_translation(position)
    }

    /// `shader` must already be bound with view/projection set.
    pub fn draw(&self, gl: &glow::Context, shader: &ShaderProgram, position: Vec3, color: Vec3) {
        shader.set_uniform(gl, "model", self.model_matrix(position));
        shader.set_uniform(gl, "color", color);
        unsafe {
            gl.bind_vertex_array(Some(self.vao));
            gl.draw_elements(glow::TRIANGLES, self.index_count as i32, glow::UNSIGNED_SHORT, 0);
            gl.bind_vertex_array(None);
        }
    }

    pub fn destroy(&self, gl: &glow::Context) {
        unsafe {
            gl.delete_vertex_array(self.vao);
            gl.delete_buffer(self.vbo);
            gl.delete_buffer(self.ebo);
        }
    }
}

#[rustfmt::skip]
const CUBE_CORNERS: [f32; 24] = [
    -1.0, -1.0, -1.0,   1.0, -1.0, -1.0,   1.0,  1.0, -1.0,  -1.0,  1.0, -1.0,
    -1.0, -1.0,  1.0,   1.0, -1.0,  1.0,   1.0,  1.0,  1.0,  -1.0,  1.0,  1.0,
];

#[rustfmt::skip]
const CUBE_INDICES: [u16; 36] = [
    0, 2, 1,  0, 3, 2, // back
    4, 5, 6,  4, 6, 7, // front
    0, 4, 7,  0, 7, 3, // left
    1, 2, 6,  1, 6, 5, // right
    3, 7, 6,  3, 6, 2, // top
    0, 1, 5,  0, 5, 4, // bottom
];

fn create_cube(gl: &glow::Context) -> Result<(glow::VertexArray, glow::Buffer, glow::Buffer, usize)> {
    unsafe {
        let vao = gl.create_vertex_array().map_err(DemoError::gl("marker vertex array"))?;
        gl.bind_vertex_array(Some(vao));

        let vbo = gl.create_buffer().map_err(DemoError::gl("marker vertex buffer"))?;
        gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
        gl.buffer_data_u8_slice(glow::ARRAY_BUFFER, bytemuck::cast_slice(&CUBE_CORNERS), glow::STATIC_DRAW);

        let ebo = gl.create_buffer().map_err(DemoError::gl("marker index buffer"))?;
        gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(ebo));
        gl.buffer_data_u8_slice(glow::ELEMENT_ARRAY_BUFFER, bytemuck::cast_slice(&CUBE_INDICES), glow::STATIC_DRAW);

        gl.enable_vertex_attrib_array(0);
        gl.vertex_attrib_pointer_f32(0, 3, glow::FLOAT, false, 12, 0);
        gl.bind_vertex_array(None);

        Ok((vao, vbo, ebo, CUBE_INDICES.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_indices_stay_in_range() {
        assert!(CUBE_INDICES.iter().all(|&i| (i as usize) < CUBE_CORNERS.len() / 3));
    }
}
