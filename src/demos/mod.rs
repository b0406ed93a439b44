pub mod fractal;
pub mod object_viewer;
pub mod scene;
