use std::cell::Cell;

use glam::{
  Mat3,
  Mat4,
  Quat,
  Vec3,
};

/// A position/rotation/scale transform with a lazily rebuilt matrix.
///
/// Setters only mark the matrix dirty; it is rebuilt on the next read.
#[derive(Debug, Clone)]
pub struct TeoTransform {
  position: Vec3,
  rotation: Quat,
  scale: Vec3,

  matrix: Cell<Mat4>,
  dirty: Cell<bool>,
}

/// The default implementation of the transform.
impl Default for TeoTransform {
  fn default() -> Self {
    Self {
      position: Vec3::ZERO,
      rotation: Quat::IDENTITY,
      scale: Vec3::ONE,
      matrix: Cell::new(Mat4::IDENTITY),
      dirty: Cell::new(true),
    }
  }
}

/// The implementation of the transform.
impl TeoTransform {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn position(&self) -> Vec3 {
    self.position
  }

  pub fn rotation(&self) -> Quat {
    self.rotation
  }

  pub fn scale(&self) -> Vec3 {
    self.scale
  }

  pub fn set_position(&mut self, position: Vec3) {
    self.position = position;
    self.dirty.set(true);
  }

  pub fn set_rotation(&mut self, rotation: Quat) {
    self.rotation = rotation;
    self.dirty.set(true);
  }

  pub fn set_scale(&mut self, scale: Vec3) {
    self.scale = scale;
    self.dirty.set(true);
  }

  pub fn translate(&mut self, delta: Vec3) {
    self.position += delta;
    self.dirty.set(true);
  }

  /// Apply a rotation on top of the current one (world space).
  pub fn rotate(&mut self, delta: Quat) {
    self.rotation = delta * self.rotation;
    self.dirty.set(true);
  }

  /// Whether the next matrix read will rebuild the matrix.
  pub fn is_dirty(&self) -> bool {
    self.dirty.get()
  }

  /// Get the model matrix (translation * rotation * scale).
  pub fn matrix(&self) -> Mat4 {
    if self.dirty.get() {
      self.matrix.set(Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position));
      self.dirty.set(false);
    }
    self.matrix.get()
  }

  /// Get the inverse-transpose of the upper 3x3 of the model matrix.
  pub fn normal_matrix(&self) -> Mat3 {
    Mat3::from_mat4(self.matrix()).inverse().transpose()
  }

  pub fn forward(&self) -> Vec3 {
    (self.rotation * Vec3::NEG_Z).normalize()
  }

  pub fn right(&self) -> Vec3 {
    (self.rotation * Vec3::X).normalize()
  }

  pub fn up(&self) -> Vec3 {
    (self.rotation * Vec3::Y).normalize()
  }
}
