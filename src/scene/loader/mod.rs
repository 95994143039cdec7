pub mod geometry;
pub mod material_resolver;
pub mod gltf_loader;

pub use gltf_loader::TeoGltfLoader;
pub use material_resolver::TeoMaterialResolver;
