pub mod camera;
pub mod material;
pub mod mesh;
pub mod model;
pub mod skybox;

pub use camera::Camera;
pub use mesh::{ Bounds, Mesh, MeshData, Vertex };
pub use model::Model;
