use glam::Vec3;

/// The single directional light of the scene plus the ambient term.
#[derive(Debug, Clone, PartialEq)]
pub struct TeoDirectionalLight {
  direction: Vec3,
  pub color: Vec3,
  pub ambient_color: Vec3,
}

/// The default implementation of the directional light.
impl Default for TeoDirectionalLight {
  fn default() -> Self {
    Self {
      direction: Vec3::new(-0.5, -1.0, -0.3).normalize(),
      color: Vec3::ONE,
      ambient_color: Vec3::splat(0.15),
    }
  }
}

/// The implementation of the directional light.
impl TeoDirectionalLight {
  /// Create a new directional light.
  /// param direction: The direction the light travels in, normalized on store.
  /// param color: The light color.
  /// param ambient_color: The ambient color.
  /// return: The light.
  pub fn new(direction: Vec3, color: Vec3, ambient_color: Vec3) -> Self {
    let mut light = Self {
      color,
      ambient_color,
      ..Default::default()
    };
    light.set_direction(direction);
    light
  }

  /// The normalized light direction.
  pub fn direction(&self) -> Vec3 {
    self.direction
  }

  /// Set the light direction. Directions that cannot be normalized are ignored.
  pub fn set_direction(&mut self, direction: Vec3) {
    match direction.try_normalize() {
      Some(direction) => self.direction = direction,
      None => log::warn!("Ignoring light direction {:?} which cannot be normalized.", direction),
    }
  }
}
