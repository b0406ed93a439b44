use crate::engine::components::material::TextureRef;
use crate::engine::components::mesh::{ Bounds, Mesh };
use crate::engine::error::Result;
use crate::engine::loaders::gltf_loader::{ read_model, ModelData };
use crate::engine::managers::assets_manager::{ upload_texture, Sampling };
use crate::engine::shader::ShaderProgram;
use glow::HasContext;
use log::warn;
use std::collections::HashMap;
use std::path::Path;

/// Meshes of one imported file plus the textures they share.
pub struct Model {
    pub meshes: Vec<Mesh>,
    pub bounds: Bounds,
    textures: Vec<glow::Texture>,
}

impl Model {
    pub fn load(gl: &glow::Context, path: impl AsRef<Path>) -> Result<Self> {
        let data = read_model(path.as_ref())?;
        Self::upload(gl, &path.as_ref().display().to_string(), &data)
    }

    /// Upload every primitive. An image referenced by several primitives is
    /// uploaded once; images that fail are skipped with a warning.
    pub fn upload(gl: &glow::Context, name: &str, data: &ModelData) -> Result<Self> {
        let mut uploaded: HashMap<usize, Option<glow::Texture>> = HashMap::new();
        let mut meshes = Vec::with_capacity(data.primitives.len());

        for primitive in &data.primitives {
            let mut textures = Vec::new();
            for &(kind, image_index) in &primitive.textures {
                let texture = *uploaded.entry(image_index).or_insert_with(|| {
                    let image = data.images.get(image_index).and_then(Option::as_ref)?;
                    let label = format!("{}#image{}", name, image_index);
                    match upload_texture(gl, &label, image, Sampling::MATERIAL) {
                        Ok(texture) => Some(texture),
                        Err(e) => {
                            warn!("{}", e);
                            None
                        }
                    }
                });
                if let Some(texture) = texture {
                    textures.push(TextureRef { texture, kind });
                }
            }
            meshes.push(Mesh::upload(gl, &primitive.mesh, textures)?);
        }

        Ok(Self {
            meshes,
            bounds: data.bounds,
            textures: uploaded.into_values().flatten().collect(),
        })
    }

    pub fn draw(&self, gl: &glow::Context, shader: &ShaderProgram, ignore_textures: bool) {
        for mesh in &self.meshes {
            mesh.draw(gl, shader, ignore_textures);
        }
    }

    pub fn destroy(&self, gl: &glow::Context) {
        for mesh in &self.meshes {
            mesh.destroy(gl);
        }
        for texture in &self.textures {
            unsafe { gl.delete_texture(*texture) };
        }
    }
}
