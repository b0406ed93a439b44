//! Error types shared by the engine and the demos.
//!
//! Every fallible engine call returns [`Result<T>`]. Binaries wrap these into
//! `anyhow` at the top level.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DemoError {
    /// Window, display or GL context creation failed.
    #[error("Window system error: {0}")]
    Window(String),

    #[error("Event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    /// A GL object (buffer, texture, program...) could not be created.
    #[error("Failed to create GL {what}: {message}")]
    GlObject { what: &'static str, message: String },

    #[error("Failed to read shader file {path}: {source}")]
    ShaderRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Error compiling {stage} shader {path}:\n{log}")]
    ShaderCompile {
        stage: &'static str,
        path: PathBuf,
        log: String,
    },

    #[error("Error linking shader program {name}:\n{log}")]
    ShaderLink { name: String, log: String },

    #[error("Texture failed to load at path {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Unsupported texture layout for {name}: {layout}")]
    UnsupportedTexture { name: String, layout: String },

    #[error("Failed to import model {path}: {source}")]
    Model {
        path: PathBuf,
        #[source]
        source: gltf::Error,
    },

    #[error("Framebuffer {name} is incomplete (status 0x{status:x})")]
    IncompleteFramebuffer { name: &'static str, status: u32 },

    #[error("Invalid heightmap {path}: {reason}")]
    Heightmap { path: PathBuf, reason: String },

    #[error("Invalid patrol path: {0}")]
    Patrol(String),

    #[error("Settings error ({path}): {message}")]
    Settings { path: PathBuf, message: String },
}

impl DemoError {
    /// Wrap one of glow's string errors for the named GL object kind.
    pub fn gl(what: &'static str) -> impl FnOnce(String) -> DemoError {
        move |message| DemoError::GlObject { what, message }
    }
}

pub type Result<T> = std::result::Result<T, DemoError>;
