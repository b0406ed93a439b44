use crate::engine::components::material::TextureKind;
use crate::engine::components::mesh::{ Bounds, MeshData, Vertex };
use crate::engine::error::{ DemoError, Result };
use crate::engine::managers::assets_manager::TextureImage;
use glam::{ Vec2, Vec3 };
use log::{ info, warn };
use std::path::Path;

/// One triangle primitive and the images it samples.
#[derive(Debug, Clone)]
pub struct PrimitiveData {
    pub mesh: MeshData,
    /// Texture kind and index into [`ModelData::images`].
    pub textures: Vec<(TextureKind, usize)>,
}

/// A whole glTF file flattened into primitives; node transforms are not applied.
#[derive(Debug, Clone, Default)]
pub struct ModelData {
    pub primitives: Vec<PrimitiveData>,
    pub images: Vec<Option<TextureImage>>,
    pub bounds: Bounds,
}

pub fn read_model(path: impl AsRef<Path>) -> Result<ModelData> {
    let path = path.as_ref();
    let (document, buffers, images) = gltf::import(path).map_err(|source| DemoError::Model {
        path: path.to_path_buf(),
        source,
    })?;
    let model = collect(&document, &buffers, images);
    info!(
        "Model loaded: {} ({} primitives, {} images)",
        path.display(),
        model.primitives.len(),
        model.images.len()
    );
    Ok(model)
}

pub fn read_model_slice(bytes: &[u8]) -> Result<ModelData> {
    let (document, buffers, images) = gltf::import_slice(bytes).map_err(|source| DemoError::Model {
        path: "<memory>".into(),
        source,
    })?;
    Ok(collect(&document, &buffers, images))
}

fn collect(
    document: &gltf::Document,
    buffers: &[gltf::buffer::Data],
    images: Vec<gltf::image::Data>
) -> ModelData {
    let mut model = ModelData {
        images: images.into_iter().enumerate().map(|(index, image)| convert_image(index, image)).collect(),
        ..Default::default()
    };

    let mut roots: Vec<gltf::Node> = document.scenes().flat_map(|scene| scene.nodes()).collect();
    if roots.is_empty() {
        roots = document.nodes().collect();
    }
    for node in roots {
        visit_node(&node, buffers, &mut model);
    }
    model
}

fn visit_node(node: &gltf::Node, buffers: &[gltf::buffer::Data], model: &mut ModelData) {
    if let Some(mesh) = node.mesh() {
        for primitive in mesh.primitives() {
            if primitive.mode() != gltf::mesh::Mode::Triangles {
                warn!("Skipping non-triangle primitive in mesh {:?}", mesh.name());
                continue;
            }
            if let Some(data) = extract_primitive(&primitive, buffers) {
                model.bounds = model.bounds.union(data.mesh.bounds);
                model.primitives.push(data);
            }
        }
    }
    for child in node.children() {
        visit_node(&child, buffers, model);
    }
}

fn extract_primitive(primitive: &gltf::Primitive, buffers: &[gltf::buffer::Data]) -> Option<PrimitiveData> {
    let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|data| data.0.as_slice()));

    let positions: Vec<[f32; 3]> = match reader.read_positions() {
        Some(positions) => positions.collect(),
        None => {
            warn!("Skipping primitive without positions");
            return None;
        }
    };
    let normals: Vec<[f32; 3]> = reader.read_normals().map(|n| n.collect()).unwrap_or_default();
    let tex_coords: Vec<[f32; 2]> = reader
        .read_tex_coords(0)
        .map(|t| t.into_f32().collect())
        .unwrap_or_default();
    let colors: Vec<[f32; 3]> = reader
        .read_colors(0)
        .map(|c| c.into_rgb_f32().collect())
        .unwrap_or_default();

    let vertices = positions
        .iter()
        .enumerate()
        .map(|(i, position)| Vertex {
            position: Vec3::from_array(*position),
            normal: normals.get(i).copied().map(Vec3::from_array).unwrap_or(Vec3::ZERO),
            tex_coords: tex_coords.get(i).copied().map(Vec2::from_array).unwrap_or(Vec2::ZERO),
            color: colors.get(i).copied().map(Vec3::from_array).unwrap_or(Vec3::ZERO),
        })
        .collect::<Vec<_>>();
    let indices = match reader.read_indices() {
        Some(indices) => indices.into_u32().collect(),
        None => (0..vertices.len() as u32).collect(),
    };

    let material = primitive.material();
    let mut textures = Vec::new();
    if let Some(info) = material.pbr_metallic_roughness().base_color_texture() {
        textures.push((TextureKind::Diffuse, info.texture().source().index()));
    }
    if let Some(normal) = material.normal_texture() {
        textures.push((TextureKind::Normal, normal.texture().source().index()));
    }

    Some(PrimitiveData { mesh: MeshData::new(vertices, indices), textures })
}

fn convert_image(index: usize, image: gltf::image::Data) -> Option<TextureImage> {
    use gltf::image::Format;
    let channels = match image.format {
        Format::R8 => 1,
        Format::R8G8B8 => 3,
        Format::R8G8B8A8 => 4,
        other => {
            warn!("Image {} has unsupported format {:?}", index, other);
            return None;
        }
    };
    Some(TextureImage {
        width: image.width,
        height: image.height,
        channels,
        pixels: image.pixels,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    // One triangle, referenced by a root node and its child.
    const TRIANGLE_GLTF: &str = r#"{
        "asset": { "version": "2.0" },
        "scene": 0,
        "scenes": [{ "nodes": [0] }],
        "nodes": [{ "mesh": 0, "children": [1] }, { "mesh": 0 }],
        "meshes": [{ "primitives": [{ "attributes": { "POSITION": 0 }, "indices": 1 }] }],
        "buffers": [{
            "byteLength": 44,
            "uri": "data:application/octet-stream;base64,AAAAAAAAAAAAAAAAAACAPwAAAAAAAAAAAAAAAAAAAEAAAIC/AAABAAIAAAA="
        }],
        "bufferViews": [
            { "buffer": 0, "byteOffset": 0, "byteLength": 36, "target": 34962 },
            { "buffer": 0, "byteOffset": 36, "byteLength": 6, "target": 34963 }
        ],
        "accessors": [
            { "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
              "min": [0.0, 0.0, -1.0], "max": [1.0, 2.0, 0.0] },
            { "bufferView": 1, "componentType": 5123, "count": 3, "type": "SCALAR" }
        ]
    }"#;

    #[test]
    fn walks_child_nodes() {
        let model = read_model_slice(TRIANGLE_GLTF.as_bytes()).unwrap();
        assert_eq!(model.primitives.len(), 2);
        assert!(model.images.is_empty());
    }

    #[test]
    fn missing_attributes_default_to_zero() {
        let model = read_model_slice(TRIANGLE_GLTF.as_bytes()).unwrap();
        let mesh = &model.primitives[0].mesh;
        assert_eq!(mesh.indices, vec![0, 1, 2]);
        assert_eq!(mesh.vertices[2].position, Vec3::new(0.0, 2.0, -1.0));
        assert!(mesh.vertices.iter().all(|v| v.normal == Vec3::ZERO && v.tex_coords == Vec2::ZERO));
        assert!(model.primitives[0].textures.is_empty());
    }

    #[test]
    fn bounds_cover_all_primitives() {
        let model = read_model_slice(TRIANGLE_GLTF.as_bytes()).unwrap();
        assert_eq!(model.bounds.min, Vec3::new(0.0, 0.0, -1.0));
        assert_eq!(model.bounds.max, Vec3::new(1.0, 2.0, 0.0));
    }

    #[test]
    fn invalid_document_is_an_error() {
        assert!(matches!(read_model_slice(b"{ not gltf"), Err(DemoError::Model { .. })));
    }
}
