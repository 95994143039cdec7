use std::rc::Rc;

use glam::Vec4;

use super::texture::TeoTexture;

/// The surface description of a mesh.
///
/// Textures are shared: every material referencing the same glTF texture
/// within one load holds the same `Rc`.
#[derive(Debug, Clone)]
pub struct TeoMaterial {
  pub base_color_factor: Vec4,
  pub base_color_texture: Option<Rc<TeoTexture>>,
}

/// The default implementation of the material.
impl Default for TeoMaterial {
  fn default() -> Self {
    Self {
      base_color_factor: Vec4::ONE,
      base_color_texture: None,
    }
  }
}

/// The implementation of the material.
impl TeoMaterial {
  /// Create a new material.
  /// param base_color_factor: The RGBA base color multiplier.
  /// param base_color_texture: The optional base color texture.
  /// return: The material.
  pub fn new(base_color_factor: Vec4, base_color_texture: Option<Rc<TeoTexture>>) -> Self {
    Self {
      base_color_factor,
      base_color_texture,
    }
  }

  /// Whether a texture with a live GPU handle is attached.
  pub fn has_texture(&self) -> bool {
    self.base_color_texture.as_ref().is_some_and(|texture| texture.is_valid())
  }
}
