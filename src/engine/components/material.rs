use crate::engine::shader::ShaderProgram;
use glow::HasContext;

/// First texture unit used by mesh textures; unit 0 stays free for
/// per-pass inputs such as the skybox.
pub const FIRST_MESH_TEXTURE_UNIT: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureKind {
    Diffuse,
    Normal,
    Specular,
}

impl TextureKind {
    pub fn uniform_prefix(self) -> &'static str {
        match self {
            TextureKind::Diffuse => "texture_diffuse",
            TextureKind::Normal => "texture_normal",
            TextureKind::Specular => "texture_specular",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextureRef {
    pub texture: glow::Texture,
    pub kind: TextureKind,
}

/// Sampler uniform names for a texture list: each kind is numbered from 1 in
/// the order it appears (`texture_diffuse1`, `texture_diffuse2`, `texture_normal1`...).
pub fn sampler_names(kinds: impl IntoIterator<Item = TextureKind>) -> Vec<String> {
    let mut counters = [0u32; 3];
    kinds
        .into_iter()
        .map(|kind| {
            let counter = &mut counters[kind as usize];
            *counter += 1;
            format!("{}{}", kind.uniform_prefix(), counter)
        })
        .collect()
}

/// Bind `textures` to consecutive units starting at [`FIRST_MESH_TEXTURE_UNIT`]
/// and point the matching sampler uniforms at them. `shader` must be bound.
pub fn bind_textures(gl: &glow::Context, shader: &ShaderProgram, textures: &[TextureRef]) {
    let names = sampler_names(textures.iter().map(|t| t.kind));
    for (index, (texture, name)) in textures.iter().zip(names).enumerate() {
        let unit = FIRST_MESH_TEXTURE_UNIT + (index as u32);
        shader.set_uniform(gl, &name, unit as i32);
        unsafe {
            gl.active_texture(glow::TEXTURE0 + unit);
            gl.bind_texture(glow::TEXTURE_2D, Some(texture.texture));
        }
    }
    unsafe { gl.active_texture(glow::TEXTURE0) }
}

/// Bind a texture to an explicit unit, leaving unit 0 active afterwards.
pub fn bind_to_unit(gl: &glow::Context, unit: u32, target: u32, texture: Option<glow::Texture>) {
    unsafe {
        gl.active_texture(glow::TEXTURE0 + unit);
        gl.bind_texture(target, texture);
        gl.active_texture(glow::TEXTURE0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sampler_names_count_per_kind() {
        let names = sampler_names([
            TextureKind::Diffuse,
            TextureKind::Normal,
            TextureKind::Diffuse,
            TextureKind::Specular,
            TextureKind::Normal,
        ]);
        assert_eq!(names, vec![
            "texture_diffuse1",
            "texture_normal1",
            "texture_diffuse2",
            "texture_specular1",
            "texture_normal2",
        ]);
    }

    #[test]
    fn four_terrain_layers_are_numbered() {
        let names = sampler_names([TextureKind::Diffuse; 4]);
        assert_eq!(names.last().map(String::as_str), Some("texture_diffuse4"));
    }
}
