use crate::engine::error::{ DemoError, Result };
use glow::HasContext;
use log::info;

/// What a framebuffer renders into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attachments {
    /// Color texture with a depth renderbuffer (depth is never sampled).
    ColorWithDepthBuffer,
    /// Color texture with a sampled depth texture.
    ColorWithDepthTexture,
    /// Depth texture only, no color draw/read buffer.
    DepthOnly,
}

/// Off-screen render target of a fixed size, created once and bound per pass.
pub struct Framebuffer {
    fbo: glow::Framebuffer,
    pub width: u32,
    pub height: u32,
    pub color: Option<glow::Texture>,
    pub depth: Option<glow::Texture>,
    depth_buffer: Option<glow::Renderbuffer>,
}

impl Framebuffer {
    pub fn new(
        gl: &glow::Context,
        name: &'static str,
        width: u32,
        height: u32,
        attachments: Attachments
    ) -> Result<Self> {
        unsafe {
            let fbo = gl.create_framebuffer().map_err(DemoError::gl(name))?;
            gl.bind_framebuffer(glow::FRAMEBUFFER, Some(fbo));

            let mut framebuffer = Self {
                fbo,
                width,
                height,
                color: None,
                depth: None,
                depth_buffer: None,
            };

            match attachments {
                Attachments::ColorWithDepthBuffer => {
                    framebuffer.color = Some(attach_color_texture(gl, width, height)?);
                    framebuffer.depth_buffer = Some(attach_depth_renderbuffer(gl, width, height)?);
                }
                Attachments::ColorWithDepthTexture => {
                    framebuffer.color = Some(attach_color_texture(gl, width, height)?);
                    framebuffer.depth = Some(attach_depth_texture(gl, width, height, false)?);
                }
                Attachments::DepthOnly => {
                    framebuffer.depth = Some(attach_depth_texture(gl, width, height, true)?);
                    gl.draw_buffer(glow::NONE);
                    gl.read_buffer(glow::NONE);
                }
            }

            let status = gl.check_framebuffer_status(glow::FRAMEBUFFER);
            gl.bind_framebuffer(glow::FRAMEBUFFER, None);
            if status != glow::FRAMEBUFFER_COMPLETE {
                log::error!("Framebuffer {} is {}", name, status_name(status));
                framebuffer.destroy(gl);
                return Err(DemoError::IncompleteFramebuffer { name, status });
            }

            info!("Framebuffer {} created ({}x{}, {:?})", name, width, height, attachments);
            Ok(framebuffer)
        }
    }

    /// Bind for drawing and set the viewport to the framebuffer size.
    pub fn bind(&self, gl: &glow::Context) {
        unsafe {
            gl.bind_texture(glow::TEXTURE_2D, None);
            gl.bind_framebuffer(glow::FRAMEBUFFER, Some(self.fbo));
            gl.viewport(0, 0, self.width as i32, self.height as i32);
        }
    }

    /// Back to the window framebuffer with a window-sized viewport.
    pub fn unbind(gl: &glow::Context, window_width: u32, window_height: u32) {
        unsafe {
            gl.bind_framebuffer(glow::FRAMEBUFFER, None);
            gl.viewport(0, 0, window_width as i32, window_height as i32);
        }
    }

    pub fn destroy(&self, gl: &glow::Context) {
        unsafe {
            gl.delete_framebuffer(self.fbo);
            if let Some(texture) = self.color {
                gl.delete_texture(texture);
            }
            if let Some(texture) = self.depth {
                gl.delete_texture(texture);
            }
            if let Some(buffer) = self.depth_buffer {
                gl.delete_renderbuffer(buffer);
            }
        }
    }
}

unsafe fn attach_color_texture(gl: &glow::Context, width: u32, height: u32) -> Result<glow::Texture> {
    let texture = gl.create_texture().map_err(DemoError::gl("color attachment"))?;
    gl.bind_texture(glow::TEXTURE_2D, Some(texture));
    gl.tex_image_2d(
        glow::TEXTURE_2D,
        0,
        glow::RGB as i32,
        width as i32,
        height as i32,
        0,
        glow::RGB,
        glow::UNSIGNED_BYTE,
        glow::PixelUnpackData::Slice(None)
    );
    gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MIN_FILTER, glow::LINEAR as i32);
    gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MAG_FILTER, glow::LINEAR as i32);
    gl.framebuffer_texture_2d(
        glow::FRAMEBUFFER,
        glow::COLOR_ATTACHMENT0,
        glow::TEXTURE_2D,
        Some(texture),
        0
    );
    gl.bind_texture(glow::TEXTURE_2D, None);
    Ok(texture)
}

unsafe fn attach_depth_texture(
    gl: &glow::Context,
    width: u32,
    height: u32,
    shadow: bool
) -> Result<glow::Texture> {
    let texture = gl.create_texture().map_err(DemoError::gl("depth attachment"))?;
    gl.bind_texture(glow::TEXTURE_2D, Some(texture));
    gl.tex_image_2d(
        glow::TEXTURE_2D,
        0,
        glow::DEPTH_COMPONENT32 as i32,
        width as i32,
        height as i32,
        0,
        glow::DEPTH_COMPONENT,
        glow::FLOAT,
        glow::PixelUnpackData::Slice(None)
    );
    let filter = if shadow { glow::NEAREST } else { glow::LINEAR };
    gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MIN_FILTER, filter as i32);
    gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MAG_FILTER, filter as i32);
    if shadow {
        // Outside the light frustum counts as lit.
        gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_S, glow::CLAMP_TO_BORDER as i32);
        gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_T, glow::CLAMP_TO_BORDER as i32);
        gl.tex_parameter_f32_slice(glow::TEXTURE_2D, glow::TEXTURE_BORDER_COLOR, &[1.0, 1.0, 1.0, 1.0]);
    }
    gl.framebuffer_texture_2d(
        glow::FRAMEBUFFER,
        glow::DEPTH_ATTACHMENT,
        glow::TEXTURE_2D,
        Some(texture),
        0
    );
    gl.bind_texture(glow::TEXTURE_2D, None);
    Ok(texture)
}

unsafe fn attach_depth_renderbuffer(gl: &glow::Context, width: u32, height: u32) -> Result<glow::Renderbuffer> {
    let buffer = gl.create_renderbuffer().map_err(DemoError::gl("depth renderbuffer"))?;
    gl.bind_renderbuffer(glow::RENDERBUFFER, Some(buffer));
    gl.renderbuffer_storage(glow::RENDERBUFFER, glow::DEPTH_COMPONENT, width as i32, height as i32);
    gl.framebuffer_renderbuffer(glow::FRAMEBUFFER, glow::DEPTH_ATTACHMENT, glow::RENDERBUFFER, Some(buffer));
    gl.bind_renderbuffer(glow::RENDERBUFFER, None);
    Ok(buffer)
}

/// Readable name for a `glCheckFramebufferStatus` result.
pub fn status_name(status: u32) -> &'static str {
    match status {
        glow::FRAMEBUFFER_COMPLETE => "complete",
        glow::FRAMEBUFFER_INCOMPLETE_ATTACHMENT => "incomplete attachment",
        glow::FRAMEBUFFER_INCOMPLETE_MISSING_ATTACHMENT => "missing attachment",
        glow::FRAMEBUFFER_INCOMPLETE_DRAW_BUFFER => "incomplete draw buffer",
        glow::FRAMEBUFFER_INCOMPLETE_READ_BUFFER => "incomplete read buffer",
        glow::FRAMEBUFFER_UNSUPPORTED => "unsupported",
        glow::FRAMEBUFFER_INCOMPLETE_MULTISAMPLE => "incomplete multisample",
        _ => "unknown status",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_names_are_readable() {
        assert_eq!(status_name(glow::FRAMEBUFFER_COMPLETE), "complete");
        assert_eq!(status_name(glow::FRAMEBUFFER_UNSUPPORTED), "unsupported");
        assert_eq!(status_name(0), "unknown status");
    }
}
