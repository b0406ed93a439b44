use crate::engine::components::material::bind_to_unit;
use crate::engine::components::mesh::{ MeshData, Vertex };
use crate::engine::error::Result;
use crate::engine::managers::assets_manager::TextureCache;
use crate::engine::rendering::framebuffer::{ Attachments, Framebuffer };
use glam::{ Mat4, Vec2, Vec3 };
use std::path::Path;

pub const REFLECTION_UNIT: u32 = 0;
pub const REFRACTION_UNIT: u32 = 1;
pub const DUDV_UNIT: u32 = 2;
pub const NORMAL_MAP_UNIT: u32 = 3;
pub const REFRACTION_DEPTH_UNIT: u32 = 4;

/// Sampler uniform and texture unit pairs for the water shader.
pub const SAMPLER_UNITS: [(&str, u32); 5] = [
    ("texture_diffuse_reflection", REFLECTION_UNIT),
    ("texture_diffuse_refraction", REFRACTION_UNIT),
    ("texture_dudv", DUDV_UNIT),
    ("texture_normal", NORMAL_MAP_UNIT),
    ("texture_refraction_depth", REFRACTION_DEPTH_UNIT),
];

/// Unit quad on the y = 0 plane.
pub fn water_quad() -> MeshData {
    let corners = [Vec2::new(0.0, 0.0), Vec2::new(0.0, 1.0), Vec2::new(1.0, 1.0), Vec2::new(1.0, 0.0)];
    let vertices = corners
        .iter()
        .map(|c| Vertex::new(Vec3::new(c.x, 0.0, c.y), Vec3::ZERO, *c))
        .collect();
    MeshData::new(vertices, vec![0, 1, 2, 0, 3, 2])
}

pub fn water_model_matrix() -> Mat4 {
    Mat4::from_translation(Vec3::new(-0.5, 0.0, -0.5))
}

/// Off-screen captures above and below the water line plus the distortion maps.
pub struct WaterFramebuffers {
    pub reflection: Framebuffer,
    pub refraction: Framebuffer,
    dudv: Option<glow::Texture>,
    normal_map: Option<glow::Texture>,
}

impl WaterFramebuffers {
    pub fn new(
        gl: &glow::Context,
        width: u32,
        height: u32,
        dudv_path: &Path,
        normal_map_path: &Path,
        cache: &mut TextureCache
    ) -> Result<Self> {
        let reflection = Framebuffer::new(gl, "water reflection", width, height, Attachments::ColorWithDepthBuffer)?;
        let refraction = Framebuffer::new(gl, "water refraction", width, height, Attachments::ColorWithDepthTexture)?;
        Ok(Self {
            reflection,
            refraction,
            dudv: cache.get_or_warn(gl, dudv_path),
            normal_map: cache.get_or_warn(gl, normal_map_path),
        })
    }

    pub fn bind_reflection(&self, gl: &glow::Context) {
        self.reflection.bind(gl);
    }

    pub fn bind_refraction(&self, gl: &glow::Context) {
        self.refraction.bind(gl);
    }

    /// Back to the window after either capture.
    pub fn unbind(gl: &glow::Context, window_width: u32, window_height: u32) {
        Framebuffer::unbind(gl, window_width, window_height);
    }

    pub fn bind_textures(&self, gl: &glow::Context) {
        bind_to_unit(gl, REFLECTION_UNIT, glow::TEXTURE_2D, self.reflection.color);
        bind_to_unit(gl, REFRACTION_UNIT, glow::TEXTURE_2D, self.refraction.color);
        bind_to_unit(gl, DUDV_UNIT, glow::TEXTURE_2D, self.dudv);
        bind_to_unit(gl, NORMAL_MAP_UNIT, glow::TEXTURE_2D, self.normal_map);
        bind_to_unit(gl, REFRACTION_DEPTH_UNIT, glow::TEXTURE_2D, self.refraction.depth);
    }

    /// The distortion maps belong to the texture cache and are freed with it.
    pub fn destroy(&self, gl: &glow::Context) {
        self.reflection.destroy(gl);
        self.refraction.destroy(gl);
    }
}
