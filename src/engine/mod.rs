pub mod app;
pub mod components;
pub mod debug;
pub mod error;
pub mod gui;
pub mod loaders;
pub mod managers;
pub mod rendering;
pub mod settings;
pub mod shader;
pub mod utils;

pub use error::{ DemoError, Result };
