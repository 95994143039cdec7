use std::path::Path;

use crate::scene::loader::TeoGltfLoader;

use super::model::TeoModel;

/// The models shown by the viewer, drawn in insertion order.
#[derive(Debug, Default)]
pub struct TeoScene {
  models: Vec<TeoModel>,
}

/// The Drop implementation of the scene.
impl Drop for TeoScene {
  fn drop(&mut self) {
    log::debug!("A TeoScene with {} models dropped.", self.models.len());
  }
}

/// The implementation of the scene.
impl TeoScene {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn add_model(&mut self, model: TeoModel) {
    self.models.push(model);
  }

  /// Load every file with the loader, skipping the ones that fail.
  /// param loader: The glTF loader.
  /// param paths: The glTF files.
  /// return: The number of models added.
  pub fn load_files<P: AsRef<Path>>(&mut self, loader: &mut TeoGltfLoader, paths: &[P]) -> usize {
    let mut loaded = 0;
    for path in paths {
      if let Some(model) = loader.load(path) {
        self.models.push(model);
        loaded += 1;
      }
    }
    if loaded < paths.len() {
      log::warn!("{} of {} files could not be loaded.", paths.len() - loaded, paths.len());
    }
    loaded
  }

  pub fn models(&self) -> &[TeoModel] {
    &self.models
  }

  pub fn models_mut(&mut self) -> &mut [TeoModel] {
    &mut self.models
  }

  pub fn is_empty(&self) -> bool {
    self.models.is_empty()
  }

  pub fn clear(&mut self) {
    self.models.clear();
  }
}
