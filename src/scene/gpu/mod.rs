pub mod texture;
pub mod material;
pub mod mesh;
pub mod model;
pub mod scene;

pub use texture::TeoTexture;
pub use material::TeoMaterial;
pub use mesh::TeoMesh;
pub use model::TeoModel;
pub use scene::TeoScene;
