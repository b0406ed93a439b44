use crate::engine::components::material::{ bind_textures, TextureRef };
use crate::engine::error::{ DemoError, Result };
use crate::engine::shader::ShaderProgram;
use bytemuck::{ Pod, Zeroable };
use glam::{ Mat4, Vec2, Vec3 };
use glow::HasContext;
use std::mem::{ offset_of, size_of };

/// Interleaved vertex as uploaded to the GPU (attribute locations 0..=3).
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub tex_coords: Vec2,
    pub color: Vec3,
}

impl Vertex {
    pub fn new(position: Vec3, normal: Vec3, tex_coords: Vec2) -> Self {
        Self { position, normal, tex_coords, color: Vec3::ZERO }
    }
}

/// Axis-aligned bounding box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl Bounds {
    pub const EMPTY: Bounds = Bounds {
        min: Vec3::splat(f32::MAX),
        max: Vec3::splat(f32::MIN),
    };

    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Self {
        points.into_iter().fold(Self::EMPTY, |bounds, p| bounds.include(p))
    }

    pub fn include(self, point: Vec3) -> Self {
        Self { min: self.min.min(point), max: self.max.max(point) }
    }

    pub fn union(self, other: Bounds) -> Self {
        Self { min: self.min.min(other.min), max: self.max.max(other.max) }
    }

    pub fn is_empty(&self) -> bool {
        self.min.cmpgt(self.max).any()
    }

    pub fn center(&self) -> Vec3 {
        if self.is_empty() { Vec3::ZERO } else { (self.min + self.max) / 2.0 }
    }

    /// Translation that moves the box center to the origin.
    pub fn center_shift(&self) -> Mat4 {
        Mat4::from_translation(-self.center())
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// CPU-side geometry; bounds are derived once here.
#[derive(Clone, Debug, Default)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    pub bounds: Bounds,
}

impl MeshData {
    pub fn new(vertices: Vec<Vertex>, indices: Vec<u32>) -> Self {
        let bounds = Bounds::from_points(vertices.iter().map(|v| v.position));
        Self { vertices, indices, bounds }
    }
}

// Mesh component for 3D objects
#[derive(Debug)]
pub struct Mesh {
    pub vao: glow::VertexArray,
    vbo: glow::Buffer,
    ebo: glow::Buffer,
    pub index_count: usize,
    pub vertex_count: usize,
    pub bounds: Bounds,
    pub textures: Vec<TextureRef>,
}

impl Mesh {
    pub fn upload(gl: &glow::Context, data: &MeshData, textures: Vec<TextureRef>) -> Result<Self> {
        unsafe {
            let vao = gl.create_vertex_array().map_err(DemoError::gl("vertex array"))?;
            let vbo = gl.create_buffer().map_err(DemoError::gl("vertex buffer"))?;
            let ebo = gl.create_buffer().map_err(DemoError::gl("index buffer"))?;

            gl.bind_vertex_array(Some(vao));
            gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
            gl.buffer_data_u8_slice(glow::ARRAY_BUFFER, bytemuck::cast_slice(&data.vertices), glow::STATIC_DRAW);
            gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(ebo));
            gl.buffer_data_u8_slice(glow::ELEMENT_ARRAY_BUFFER, bytemuck::cast_slice(&data.indices), glow::STATIC_DRAW);

            let stride = size_of::<Vertex>() as i32;
            let attributes = [
                (0, 3, offset_of!(Vertex, position)),
                (1, 3, offset_of!(Vertex, normal)),
                (2, 2, offset_of!(Vertex, tex_coords)),
                (3, 3, offset_of!(Vertex, color)),
            ];
            for (location, size, offset) in attributes {
                gl.enable_vertex_attrib_array(location);
                gl.vertex_attrib_pointer_f32(location, size, glow::FLOAT, false, stride, offset as i32);
            }
            gl.bind_vertex_array(None);

            Ok(Self {
                vao,
                vbo,
                ebo,
                index_count: data.indices.len(),
                vertex_count: data.vertices.len(),
                bounds: data.bounds,
                textures,
            })
        }
    }

    /// Draw with `shader` (already bound). Mesh textures are bound first unless
    /// `ignore_textures` is set.
    pub fn draw(&self, gl: &glow::Context, shader: &ShaderProgram, ignore_textures: bool) {
        if !ignore_textures {
            bind_textures(gl, shader, &self.textures);
        }
        unsafe {
            gl.bind_vertex_array(Some(self.vao));
            gl.draw_elements(glow::TRIANGLES, self.index_count as i32, glow::UNSIGNED_INT, 0);
            gl.bind_vertex_array(None);
        }
    }

    /// Release the buffers. Textures are owned by whoever loaded them.
    pub fn destroy(&self, gl: &glow::Context) {
        unsafe {
            gl.delete_vertex_array(self.vao);
            gl.delete_buffer(self.vbo);
            gl.delete_buffer(self.ebo);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_layout_is_tightly_packed() {
        assert_eq!(size_of::<Vertex>(), 44);
        assert_eq!(offset_of!(Vertex, normal), 12);
        assert_eq!(offset_of!(Vertex, tex_coords), 24);
        assert_eq!(offset_of!(Vertex, color), 32);
    }

    #[test]
    fn bounds_are_derived_at_construction() {
        let data = MeshData::new(
            vec![
                Vertex::new(Vec3::new(-1.0, 0.0, 2.0), Vec3::Y, Vec2::ZERO),
                Vertex::new(Vec3::new(3.0, -2.0, 4.0), Vec3::Y, Vec2::ONE)
            ],
            vec![0, 1, 0]
        );
        assert_eq!(data.bounds.min, Vec3::new(-1.0, -2.0, 2.0));
        assert_eq!(data.bounds.max, Vec3::new(3.0, 0.0, 4.0));
        assert_eq!(data.bounds.center(), Vec3::new(1.0, -1.0, 3.0));
    }

    #[test]
    fn center_shift_moves_center_to_origin() {
        let bounds = Bounds::from_points([Vec3::new(2.0, 2.0, 2.0), Vec3::new(4.0, 6.0, 8.0)]);
        let shifted = bounds.center_shift().transform_point3(bounds.center());
        assert!(shifted.length() < 1e-6);
    }

    #[test]
    fn empty_bounds_center_on_origin() {
        let bounds = MeshData::new(Vec::new(), Vec::new()).bounds;
        assert!(bounds.is_empty());
        assert_eq!(bounds.center(), Vec3::ZERO);
        assert_eq!(bounds.union(Bounds::from_points([Vec3::ONE])).center(), Vec3::ONE);
    }

    #[test]
    fn negative_only_geometry_has_correct_max() {
        let bounds = Bounds::from_points([Vec3::splat(-3.0), Vec3::splat(-1.0)]);
        assert_eq!(bounds.max, Vec3::splat(-1.0));
    }
}
