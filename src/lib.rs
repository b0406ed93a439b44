//! Small OpenGL demos on a shared engine: a fractal explorer, a model viewer
//! and a harbor scene with water, shadows and a lighthouse.

pub mod demos;
pub mod engine;
