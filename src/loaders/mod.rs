pub mod gltf;
pub mod skybox;

pub use gltf::{load_mesh, MaterialData, MeshData, Primitive, TextureData};
pub use skybox::{load_cubemap, CubemapData};
