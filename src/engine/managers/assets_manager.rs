use crate::engine::error::{ DemoError, Result };
use glow::HasContext;
use image::DynamicImage;
use log::{ info, warn };
use std::collections::HashMap;
use std::path::{ Path, PathBuf };

/// Decoded pixels ready for upload.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureImage {
    pub width: u32,
    pub height: u32,
    pub channels: u8,
    pub pixels: Vec<u8>,
}

impl TextureImage {
    /// Keep 1/3/4 channel 8-bit images as they are, convert everything else to RGBA.
    pub fn from_dynamic(img: DynamicImage) -> Self {
        let (width, height) = (img.width(), img.height());
        let (channels, pixels) = match img {
            DynamicImage::ImageLuma8(buffer) => (1, buffer.into_raw()),
            DynamicImage::ImageRgb8(buffer) => (3, buffer.into_raw()),
            DynamicImage::ImageRgba8(buffer) => (4, buffer.into_raw()),
            other => (4, other.to_rgba8().into_raw()),
        };
        Self { width, height, channels, pixels }
    }

    pub fn open(path: &Path) -> Result<Self> {
        let img = image::open(path).map_err(|source| DemoError::Image {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_dynamic(img))
    }
}

/// GL pixel format for a channel count.
pub fn gl_format(channels: u8) -> Option<u32> {
    match channels {
        1 => Some(glow::RED),
        3 => Some(glow::RGB),
        4 => Some(glow::RGBA),
        _ => None,
    }
}

/// Sampling options for a 2D texture upload.
#[derive(Debug, Clone, Copy)]
pub struct Sampling {
    pub min_filter: u32,
    pub mag_filter: u32,
    pub wrap: u32,
    pub mipmaps: bool,
}

impl Sampling {
    /// Repeating, mipmapped; used for every material texture.
    pub const MATERIAL: Sampling = Sampling {
        min_filter: glow::LINEAR_MIPMAP_LINEAR,
        mag_filter: glow::LINEAR,
        wrap: glow::REPEAT,
        mipmaps: true,
    };

    pub const LINEAR_CLAMPED: Sampling = Sampling {
        min_filter: glow::LINEAR,
        mag_filter: glow::LINEAR,
        wrap: glow::CLAMP_TO_EDGE,
        mipmaps: false,
    };
}

pub fn upload_texture(
    gl: &glow::Context,
    name: &str,
    image: &TextureImage,
    sampling: Sampling
) -> Result<glow::Texture> {
    let format = gl_format(image.channels).ok_or_else(|| DemoError::UnsupportedTexture {
        name: name.to_string(),
        layout: format!("{} channels", image.channels),
    })?;

    unsafe {
        let texture = gl.create_texture().map_err(DemoError::gl("texture"))?;
        gl.bind_texture(glow::TEXTURE_2D, Some(texture));
        gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, 1);
        gl.tex_image_2d(
            glow::TEXTURE_2D,
            0,
            format as i32,
            image.width as i32,
            image.height as i32,
            0,
            format,
            glow::UNSIGNED_BYTE,
            glow::PixelUnpackData::Slice(Some(&image.pixels))
        );
        if sampling.mipmaps {
            gl.generate_mipmap(glow::TEXTURE_2D);
        }
        gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MIN_FILTER, sampling.min_filter as i32);
        gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MAG_FILTER, sampling.mag_filter as i32);
        gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_S, sampling.wrap as i32);
        gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_T, sampling.wrap as i32);
        gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, 4);
        gl.bind_texture(glow::TEXTURE_2D, None);
        Ok(texture)
    }
}

/// Decode an image file and upload it as a repeating, mipmapped 2D texture.
pub fn load_texture(gl: &glow::Context, path: impl AsRef<Path>) -> Result<glow::Texture> {
    let path = path.as_ref();
    let image = TextureImage::open(path)?;
    let texture = upload_texture(gl, &path.display().to_string(), &image, Sampling::MATERIAL)?;
    info!("Texture loaded: {} ({}x{}, {} channels)", path.display(), image.width, image.height, image.channels);
    Ok(texture)
}

/// Textures shared by path, so a file referenced many times is uploaded once.
#[derive(Default)]
pub struct TextureCache {
    textures: HashMap<PathBuf, glow::Texture>,
}

impl TextureCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_load(&mut self, gl: &glow::Context, path: impl AsRef<Path>) -> Result<glow::Texture> {
        let path = path.as_ref();
        if let Some(texture) = self.textures.get(path) {
            return Ok(*texture);
        }
        let texture = load_texture(gl, path)?;
        self.textures.insert(path.to_path_buf(), texture);
        Ok(texture)
    }

    /// Like [`TextureCache::get_or_load`] but logs and returns `None` on failure.
    pub fn get_or_warn(&mut self, gl: &glow::Context, path: impl AsRef<Path>) -> Option<glow::Texture> {
        match self.get_or_load(gl, path) {
            Ok(texture) => Some(texture),
            Err(e) => {
                warn!("{}", e);
                None
            }
        }
    }

    pub fn destroy(&mut self, gl: &glow::Context) {
        for (_, texture) in self.textures.drain() {
            unsafe { gl.delete_texture(texture) };
        }
    }
}

/// Cube map face file names in GL face order (`TEXTURE_CUBE_MAP_POSITIVE_X + i`).
pub fn cubemap_face_paths(directory: impl AsRef<Path>, extension: &str) -> [PathBuf; 6] {
    let directory = directory.as_ref();
    ["positive-x", "negative-x", "positive-y", "negative-y", "positive-z", "negative-z"].map(|face| {
        directory.join(format!("{}.{}", face, extension))
    })
}

/// Upload six faces into a cube map. Faces that fail to load are logged and left empty.
pub fn load_cubemap(gl: &glow::Context, faces: &[PathBuf; 6]) -> Result<glow::Texture> {
    unsafe {
        let texture = gl.create_texture().map_err(DemoError::gl("cube map"))?;
        gl.bind_texture(glow::TEXTURE_CUBE_MAP, Some(texture));
        gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, 1);
        for (index, path) in faces.iter().enumerate() {
            let image = match TextureImage::open(path) {
                Ok(image) => image,
                Err(e) => {
                    warn!("Cubemap face skipped: {}", e);
                    continue;
                }
            };
            let Some(format) = gl_format(image.channels) else {
                warn!("Cubemap face {} has unsupported layout", path.display());
                continue;
            };
            gl.tex_image_2d(
                glow::TEXTURE_CUBE_MAP_POSITIVE_X + (index as u32),
                0,
                format as i32,
                image.width as i32,
                image.height as i32,
                0,
                format,
                glow::UNSIGNED_BYTE,
                glow::PixelUnpackData::Slice(Some(&image.pixels))
            );
        }
        gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, 4);
        gl.tex_parameter_i32(glow::TEXTURE_CUBE_MAP, glow::TEXTURE_MIN_FILTER, glow::LINEAR as i32);
        gl.tex_parameter_i32(glow::TEXTURE_CUBE_MAP, glow::TEXTURE_MAG_FILTER, glow::LINEAR as i32);
        gl.tex_parameter_i32(glow::TEXTURE_CUBE_MAP, glow::TEXTURE_WRAP_S, glow::CLAMP_TO_EDGE as i32);
        gl.tex_parameter_i32(glow::TEXTURE_CUBE_MAP, glow::TEXTURE_WRAP_T, glow::CLAMP_TO_EDGE as i32);
        gl.tex_parameter_i32(glow::TEXTURE_CUBE_MAP, glow::TEXTURE_WRAP_R, glow::CLAMP_TO_EDGE as i32);
        gl.bind_texture(glow::TEXTURE_CUBE_MAP, None);
        Ok(texture)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ GrayAlphaImage, RgbImage };

    #[test]
    fn channel_counts_map_to_gl_formats() {
        assert_eq!(gl_format(1), Some(glow::RED));
        assert_eq!(gl_format(3), Some(glow::RGB));
        assert_eq!(gl_format(4), Some(glow::RGBA));
        assert_eq!(gl_format(2), None);
    }

    #[test]
    fn rgb_images_keep_three_channels() {
        let image = TextureImage::from_dynamic(DynamicImage::ImageRgb8(RgbImage::new(3, 2)));
        assert_eq!((image.width, image.height, image.channels), (3, 2, 3));
        assert_eq!(image.pixels.len(), 18);
    }

    #[test]
    fn two_channel_images_become_rgba() {
        let image = TextureImage::from_dynamic(DynamicImage::ImageLumaA8(GrayAlphaImage::new(2, 2)));
        assert_eq!(image.channels, 4);
        assert_eq!(image.pixels.len(), 16);
    }

    #[test]
    fn cubemap_faces_follow_gl_order() {
        let faces = cubemap_face_paths("assets/skyboxes/water", "jpg");
        assert_eq!(faces[0], PathBuf::from("assets/skyboxes/water/positive-x.jpg"));
        assert_eq!(faces[3], PathBuf::from("assets/skyboxes/water/negative-y.jpg"));
        assert_eq!(faces[5], PathBuf::from("assets/skyboxes/water/negative-z.jpg"));
    }

    #[test]
    fn missing_image_reports_path() {
        let error = TextureImage::open(Path::new("assets/none/missing.png")).unwrap_err();
        assert!(matches!(error, DemoError::Image { .. }));
        assert!(error.to_string().contains("missing.png"));
    }
}
