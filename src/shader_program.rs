use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;
use std::rc::Rc;

use glam::{
  Mat3,
  Mat4,
  Vec2,
  Vec3,
  Vec4,
};

use crate::backend::{
  TeoGraphicsApiRef,
  TeoProgramId,
  TeoShaderStage,
  TeoUniformLocation,
};
use crate::error::TeoRendererError;

/// A linked vertex + fragment program with a uniform location cache.
///
/// A name that is not an active uniform is cached as `None` as well, so a
/// missing uniform is queried once per program.
pub struct TeoShaderProgram {
  api: TeoGraphicsApiRef,
  program: Option<TeoProgramId>,
  uniform_locations: RefCell<HashMap<String, Option<TeoUniformLocation>>>,
}

/// The Drop implementation of the shader program.
impl Drop for TeoShaderProgram {
  fn drop(&mut self) {
    if self.program.is_some() {
      self.cleanup();
      log::debug!("A TeoShaderProgram dropped.");
    }
  }
}

/// The implementation of the shader program.
impl TeoShaderProgram {
  /// Create an empty program which owns no GPU resource.
  /// param api: The graphics API.
  /// return: The program.
  pub fn new(api: TeoGraphicsApiRef) -> Self {
    Self {
      api,
      program: None,
      uniform_locations: RefCell::new(HashMap::new()),
    }
  }

  /// Create a program from two GLSL files.
  /// param api: The graphics API.
  /// param vertex_path: The vertex shader file path.
  /// param fragment_path: The fragment shader file path.
  /// return: The program.
  pub fn with_files<P: AsRef<Path>, Q: AsRef<Path>>(
    api: TeoGraphicsApiRef,
    vertex_path: P,
    fragment_path: Q,
  ) -> Result<Self, TeoRendererError> {
    let mut program = Self::new(api);
    program.load_from_files(vertex_path, fragment_path)?;
    Ok(program)
  }

  /// Read, compile and link two GLSL files, replacing the current program.
  /// param vertex_path: The vertex shader file path.
  /// param fragment_path: The fragment shader file path.
  /// return: The result.
  pub fn load_from_files<P: AsRef<Path>, Q: AsRef<Path>>(&mut self, vertex_path: P, fragment_path: Q) -> Result<(), TeoRendererError> {
    let vertex_source = Self::read_source(vertex_path.as_ref())?;
    let fragment_source = Self::read_source(fragment_path.as_ref())?;
    self.load_from_source(&vertex_source, &fragment_source)
  }

  /// Compile and link GLSL sources, replacing the current program.
  ///
  /// The previous program and its cached locations are released first, even
  /// if the new sources fail to build.
  /// param vertex_source: The vertex shader source.
  /// param fragment_source: The fragment shader source.
  /// return: The result.
  pub fn load_from_source(&mut self, vertex_source: &str, fragment_source: &str) -> Result<(), TeoRendererError> {
    self.cleanup();

    let vertex_shader = self.api.create_shader(TeoShaderStage::Vertex, vertex_source)?;
    let fragment_shader = match self.api.create_shader(TeoShaderStage::Fragment, fragment_source) {
      Ok(shader) => shader,
      Err(err) => {
        self.api.delete_shader(vertex_shader);
        return Err(err);
      }
    };

    let program = self.api.create_program(&[vertex_shader, fragment_shader]);
    self.api.delete_shader(vertex_shader);
    self.api.delete_shader(fragment_shader);

    self.program = Some(program?);
    log::debug!("A TeoShaderProgram linked.");
    Ok(())
  }

  /// Make the program current.
  pub fn use_program(&self) {
    self.api.use_program(self.program);
  }

  pub fn id(&self) -> Option<TeoProgramId> {
    self.program
  }

  pub fn is_valid(&self) -> bool {
    self.program.is_some()
  }

  /// Move the GPU program and the location cache out, leaving this instance empty.
  pub fn take(&mut self) -> Self {
    let empty = Self::new(Rc::clone(&self.api));
    std::mem::replace(self, empty)
  }

  /// Look up a uniform location, querying the API only on the first request of a name.
  /// param name: The uniform name.
  /// return: The location, none if the program has no such active uniform.
  pub fn uniform_location(&self, name: &str) -> Option<TeoUniformLocation> {
    let program = self.program?;
    if let Some(location) = self.uniform_locations.borrow().get(name) {
      return *location;
    }

    let location = self.api.get_uniform_location(program, name);
    if location.is_none() {
      log::debug!("Uniform \"{}\" is not active in the program.", name);
    }
    self.uniform_locations.borrow_mut().insert(name.to_string(), location);
    location
  }

  pub fn set_int(&self, name: &str, value: i32) {
    self.api.uniform_i32(self.uniform_location(name), value);
  }

  pub fn set_bool(&self, name: &str, value: bool) {
    self.set_int(name, value as i32);
  }

  pub fn set_float(&self, name: &str, value: f32) {
    self.api.uniform_f32(self.uniform_location(name), value);
  }

  pub fn set_vec2(&self, name: &str, value: Vec2) {
    self.api.uniform_vec2(self.uniform_location(name), value.to_array());
  }

  pub fn set_vec3(&self, name: &str, value: Vec3) {
    self.api.uniform_vec3(self.uniform_location(name), value.to_array());
  }

  pub fn set_vec4(&self, name: &str, value: Vec4) {
    self.api.uniform_vec4(self.uniform_location(name), value.to_array());
  }

  pub fn set_mat3(&self, name: &str, value: &Mat3) {
    self.api.uniform_mat3(self.uniform_location(name), &value.to_cols_array());
  }

  pub fn set_mat4(&self, name: &str, value: &Mat4) {
    self.api.uniform_mat4(self.uniform_location(name), &value.to_cols_array());
  }

  fn read_source(path: &Path) -> Result<String, TeoRendererError> {
    std::fs::read_to_string(path)
      .map_err(|err| TeoRendererError::new(&format!("Failed to read shader file \"{}\".", path.display()), Some(Box::new(err))))
  }

  fn cleanup(&mut self) {
    if let Some(program) = self.program.take() {
      self.api.delete_program(program);
    }
    self.uniform_locations.borrow_mut().clear();
  }
}
