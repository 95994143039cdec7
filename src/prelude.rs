pub use crate::error::TeoRendererError;
pub use crate::backend::{
  TeoGraphicsApi,
  TeoGraphicsApiRef,
  TeoGlowApi,
  TeoHeadlessApi,
};
pub use crate::config::TeoViewerConfig;
pub use crate::input::{
  TeoCaptureChange,
  TeoInputState,
};
pub use crate::shader_program::TeoShaderProgram;
pub use crate::renderer::TeoRenderer;
pub use crate::scene::TeoVertex;
pub use crate::scene::cpu::{
  TeoCamera,
  TeoDirectionalLight,
  TeoImageData,
  TeoTransform,
};
pub use crate::scene::gpu::{
  TeoMaterial,
  TeoMesh,
  TeoModel,
  TeoScene,
  TeoTexture,
};
pub use crate::scene::loader::TeoGltfLoader;
pub use crate::window::TeoViewerApp;
