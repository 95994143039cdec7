use crate::scene::cpu::transform::TeoTransform;

use super::mesh::TeoMesh;

/// A named list of meshes placed by one transform.
#[derive(Debug)]
pub struct TeoModel {
  pub name: String,
  pub transform: TeoTransform,
  meshes: Vec<TeoMesh>,
}

/// The implementation of the model.
impl TeoModel {
  /// Create an empty model.
  /// param name: The model name.
  /// return: The model.
  pub fn new(name: &str) -> Self {
    Self {
      name: name.to_string(),
      transform: TeoTransform::default(),
      meshes: Vec::new(),
    }
  }

  /// Append a mesh, taking over its GPU objects.
  pub fn add_mesh(&mut self, mesh: TeoMesh) {
    self.meshes.push(mesh);
  }

  pub fn meshes(&self) -> &[TeoMesh] {
    &self.meshes
  }

  pub fn meshes_mut(&mut self) -> &mut [TeoMesh] {
    &mut self.meshes
  }

  pub fn mesh_count(&self) -> usize {
    self.meshes.len()
  }

  pub fn is_empty(&self) -> bool {
    self.meshes.is_empty()
  }

  /// Sum of the index counts of all meshes.
  pub fn index_count(&self) -> u64 {
    self.meshes.iter().map(|mesh| mesh.index_count() as u64).sum()
  }

  /// Draw every mesh in order. Uniforms must already be set by the caller.
  pub fn draw(&self) {
    for mesh in self.meshes.iter() {
      mesh.draw();
    }
  }
}
