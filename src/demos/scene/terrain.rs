use crate::engine::components::material::{ TextureKind, TextureRef };
use crate::engine::components::mesh::{ Mesh, MeshData, Vertex };
use crate::engine::error::{ DemoError, Result };
use crate::engine::managers::assets_manager::TextureCache;
use glam::{ Vec2, Vec3 };
use image::RgbImage;
use log::info;
use serde::{ Deserialize, Serialize };
use std::path::Path;

const GRID_START: f32 = -0.5;
/// How many times the terrain textures repeat across the grid.
const TEXTURE_REPEAT: f32 = 100.0;
const MAX_RGB24: f32 = (255 * 255 * 255) as f32;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeightRange {
    pub min_y: f32,
    pub max_y: f32,
}

impl Default for HeightRange {
    fn default() -> Self {
        Self { min_y: 0.0, max_y: 0.5 }
    }
}

impl HeightRange {
    /// Height encoded by a pixel as one 24-bit number, red most significant.
    pub fn height(&self, r: u8, g: u8, b: u8) -> f32 {
        let rgb = ((r as u32) << 16) | ((g as u32) << 8) | (b as u32);
        self.min_y + (self.max_y - self.min_y).abs() * ((rgb as f32) / MAX_RGB24)
    }
}

/// Build the terrain grid from an RGB heightmap.
pub fn heightmap_mesh(image: &RgbImage, range: HeightRange) -> MeshData {
    let (width, height) = (image.width() as usize, image.height() as usize);
    let step_x = (GRID_START * 2.0).abs() / (width as f32);
    let step_z = (GRID_START * 2.0).abs() / (height as f32);

    let mut vertices = Vec::with_capacity(width * height);
    let mut indices = Vec::with_capacity(width.saturating_sub(1) * height.saturating_sub(1) * 6);
    for row in 0..height {
        for column in 0..width {
            let [r, g, b] = image.get_pixel(column as u32, row as u32).0;
            vertices.push(
                Vertex::new(
                    Vec3::new(
                        GRID_START + (column as f32) * step_x,
                        range.height(r, g, b),
                        GRID_START + (row as f32) * step_z
                    ),
                    Vec3::ZERO,
                    Vec2::new(
                        (TEXTURE_REPEAT * (column as f32)) / (width as f32),
                        (TEXTURE_REPEAT * (row as f32)) / (width as f32)
                    )
                )
            );

            if column + 1 < width && row + 1 < height {
                let left_top = (row * width + column) as u32;
                let left_bottom = ((row + 1) * width + column) as u32;
                let right_top = left_top + 1;
                let right_bottom = left_bottom + 1;
                indices.extend_from_slice(&[left_top, left_bottom, right_top, right_top, left_bottom, right_bottom]);
            }
        }
    }

    compute_normals(&mut vertices, width, height);
    MeshData::new(vertices, indices)
}

/// Interior vertices average the face normals of their four neighbour pairs;
/// the border stays flat.
fn compute_normals(vertices: &mut [Vertex], width: usize, height: usize) {
    for row in 0..height {
        for column in 0..width {
            let index = row * width + column;
            let interior = row > 0 && row + 1 < height && column > 0 && column + 1 < width;
            let normal = if interior {
                let center = vertices[index].position;
                let left = vertices[index - 1].position - center;
                let below = vertices[index + width].position - center;
                let right = vertices[index + 1].position - center;
                let above = vertices[index - width].position - center;
                (
                    left.cross(below).normalize() +
                    below.cross(right).normalize() +
                    right.cross(above).normalize() +
                    above.cross(left).normalize()
                ).normalize()
            } else {
                Vec3::Y
            };
            vertices[index].normal = normal;
        }
    }
}

pub fn load_heightmap(path: &Path, range: HeightRange) -> Result<MeshData> {
    let image = image::open(path).map_err(|source| DemoError::Image {
        path: path.to_path_buf(),
        source,
    })?;
    if image.width() < 2 || image.height() < 2 {
        return Err(DemoError::Heightmap {
            path: path.to_path_buf(),
            reason: format!("{}x{} is too small for a grid", image.width(), image.height()),
        });
    }
    let mesh = heightmap_mesh(&image.to_rgb8(), range);
    info!(
        "Heightmap loaded: {} ({} vertices, {} triangles)",
        path.display(),
        mesh.vertices.len(),
        mesh.indices.len() / 3
    );
    Ok(mesh)
}

/// Heightmap mesh with its diffuse layers, uploaded.
pub fn create_terrain(
    gl: &glow::Context,
    heightmap: &Path,
    layers: &[impl AsRef<Path>],
    range: HeightRange,
    cache: &mut TextureCache
) -> Result<Mesh> {
    let data = load_heightmap(heightmap, range)?;
    let textures = layers
        .iter()
        .filter_map(|path| cache.get_or_warn(gl, path))
        .map(|texture| TextureRef { texture, kind: TextureKind::Diffuse })
        .collect();
    Mesh::upload(gl, &data, textures)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn flat_image(width: u32, height: u32) -> RgbImage {
        RgbImage::from_pixel(width, height, Rgb([0, 0, 0]))
    }

    #[test]
    fn height_decodes_rgb24() {
        let range = HeightRange::default();
        assert_eq!(range.height(0, 0, 0), 0.0);
        assert!((range.height(255, 255, 255) - 0.5 * (16777215.0 / MAX_RGB24)).abs() < 1e-6);
        let mid = range.height(128, 0, 0);
        assert!((mid - 0.5 * ((128u32 << 16) as f32) / MAX_RGB24).abs() < 1e-6);
    }

    #[test]
    fn inverted_range_still_rises_from_min() {
        let range = HeightRange { min_y: 1.0, max_y: 0.0 };
        assert!(range.height(255, 0, 0) > 1.0);
    }

    #[test]
    fn grid_layout_and_indices() {
        let mesh = heightmap_mesh(&flat_image(3, 2), HeightRange::default());
        assert_eq!(mesh.vertices.len(), 6);
        assert_eq!(mesh.indices, vec![0, 3, 1, 1, 3, 4, 1, 4, 2, 2, 4, 5]);

        let first = mesh.vertices[0];
        assert_eq!(first.position, Vec3::new(-0.5, 0.0, -0.5));
        let last = mesh.vertices[5];
        assert!((last.position - Vec3::new(-0.5 + 2.0 / 3.0, 0.0, 0.0)).length() < 1e-6);
        assert!((last.tex_coords - Vec2::new(200.0 / 3.0, 100.0 / 3.0)).length() < 1e-4);
    }

    #[test]
    fn flat_grid_normals_point_up() {
        let mesh = heightmap_mesh(&flat_image(4, 4), HeightRange::default());
        for vertex in &mesh.vertices {
            assert!((vertex.normal - Vec3::Y).length() < 1e-5, "{:?}", vertex.normal);
        }
    }

    #[test]
    fn interior_normal_tilts_away_from_slope() {
        // height rises with the column, so normals lean toward -x
        let mut image = flat_image(3, 3);
        for row in 0..3 {
            image.put_pixel(2, row, Rgb([255, 255, 255]));
        }
        let mesh = heightmap_mesh(&image, HeightRange::default());
        let center = mesh.vertices[4].normal;
        assert!(center.x < 0.0);
        assert!(center.y > 0.0);
        assert!((center.length() - 1.0).abs() < 1e-5);
        assert_eq!(mesh.vertices[0].normal, Vec3::Y);
        assert_eq!(mesh.vertices[8].normal, Vec3::Y);
    }

    #[test]
    fn missing_heightmap_is_an_error() {
        let error = load_heightmap(Path::new("assets/heightmap/none.png"), HeightRange::default()).unwrap_err();
        assert!(matches!(error, DemoError::Image { .. }));
    }
}
