use glam::{
  Mat4,
  Vec3,
};

const WORLD_UP: Vec3 = Vec3::Y;
const PITCH_LIMIT: f32 = 89.0;

/// A perspective fly camera driven by yaw and pitch angles in degrees.
#[derive(Debug, Clone)]
pub struct TeoCamera {
  position: Vec3,
  front: Vec3,
  up: Vec3,
  right: Vec3,

  yaw: f32,
  pitch: f32,

  fov: f32,
  aspect: f32,
  znear: f32,
  zfar: f32,

  projection: Mat4,
}

/// The default implementation of the camera.
impl Default for TeoCamera {
  fn default() -> Self {
    Self::new(45.0, 16.0 / 9.0, 0.1, 1000.0)
  }
}

/// The implementation of the camera.
impl TeoCamera {
  /// Create a new camera looking down -Z.
  /// param fov: The vertical field of view in degrees.
  /// param aspect: The aspect ratio.
  /// param znear: The near clip plane.
  /// param zfar: The far clip plane.
  /// return: The camera.
  pub fn new(fov: f32, aspect: f32, znear: f32, zfar: f32) -> Self {
    let mut camera = Self {
      position: Vec3::new(0.0, 0.0, 3.0),
      front: Vec3::NEG_Z,
      up: Vec3::Y,
      right: Vec3::X,
      yaw: -90.0,
      pitch: 0.0,
      fov,
      aspect,
      znear,
      zfar,
      projection: Mat4::IDENTITY,
    };
    camera.update_vectors();
    camera.update_projection();
    camera
  }

  pub fn position(&self) -> Vec3 {
    self.position
  }

  pub fn set_position(&mut self, position: Vec3) {
    self.position = position;
  }

  pub fn yaw(&self) -> f32 {
    self.yaw
  }

  pub fn pitch(&self) -> f32 {
    self.pitch
  }

  pub fn forward(&self) -> Vec3 {
    self.front
  }

  pub fn right(&self) -> Vec3 {
    self.right
  }

  pub fn up(&self) -> Vec3 {
    self.up
  }

  pub fn set_fov(&mut self, fov: f32) {
    self.fov = fov;
    self.update_projection();
  }

  pub fn set_aspect(&mut self, aspect: f32) {
    if aspect.is_finite() && aspect > 0.0 {
      self.aspect = aspect;
      self.update_projection();
    }
  }

  pub fn set_clip_planes(&mut self, znear: f32, zfar: f32) {
    self.znear = znear;
    self.zfar = zfar;
    self.update_projection();
  }

  /// Turn the camera by a mouse movement.
  /// param x_offset: The horizontal mouse delta in pixels.
  /// param y_offset: The vertical mouse delta in pixels (down is positive).
  /// param sensitivity: Degrees per pixel.
  pub fn process_mouse_movement(&mut self, x_offset: f32, y_offset: f32, sensitivity: f32) {
    self.yaw += x_offset * sensitivity;
    self.pitch -= y_offset * sensitivity;
    self.pitch = self.pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);
    self.update_vectors();
  }

  /// Move the camera. x moves along right, y along world up and z along front.
  /// param direction: The movement direction in camera terms.
  /// param distance: The distance to move for a unit direction.
  pub fn process_keyboard(&mut self, direction: Vec3, distance: f32) {
    self.position += self.front * direction.z * distance;
    self.position += self.right * direction.x * distance;
    self.position += WORLD_UP * direction.y * distance;
  }

  pub fn view_matrix(&self) -> Mat4 {
    Mat4::look_at_rh(self.position, self.position + self.front, self.up)
  }

  pub fn projection_matrix(&self) -> Mat4 {
    self.projection
  }

  fn update_vectors(&mut self) {
    let (yaw, pitch) = (self.yaw.to_radians(), self.pitch.to_radians());
    let front = Vec3::new(
      yaw.cos() * pitch.cos(),
      pitch.sin(),
      yaw.sin() * pitch.cos(),
    );
    self.front = front.normalize();
    self.right = self.front.cross(WORLD_UP).normalize();
    self.up = self.right.cross(self.front).normalize();
  }

  fn update_projection(&mut self) {
    self.projection = Mat4::perspective_rh_gl(self.fov.to_radians(), self.aspect, self.znear, self.zfar);
  }
}
