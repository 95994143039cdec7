use std::path::Path;

use glam::Vec4;

use crate::backend::TeoGraphicsApiRef;
use crate::error::TeoRendererError;
use crate::scene::cpu::{
  TeoCamera,
  TeoDirectionalLight,
};
use crate::scene::gpu::TeoModel;
use crate::shader_program::TeoShaderProgram;

/// The texture unit the base color texture is bound to.
pub const BASE_COLOR_TEXTURE_UNIT: u32 = 0;

/// The forward renderer.
///
/// Draws every mesh of every model with one program and one directional
/// light, in the order they were loaded.
pub struct TeoRenderer {
  pub name: String,
  pub width: u32,
  pub height: u32,

  api: TeoGraphicsApiRef,
  program: TeoShaderProgram,

  pub clear_color: Vec4,
  pub light: TeoDirectionalLight,

  // Statistic.
  total_frames: u64,
  stat_frames: u64,
  last_stat_time: std::time::Instant,
  elapsed_time: std::time::Duration,
}

/// The Drop implementation of the renderer.
impl Drop for TeoRenderer {
  fn drop(&mut self) {
    log::debug!("A TeoRenderer \"{}\" is dropped.", self.name);
  }
}

/// The implementation of the renderer.
impl TeoRenderer {
  /// Create a new renderer with the shaders read from files.
  /// param name: The name of the renderer.
  /// param api: The graphics API.
  /// param vertex_path: The vertex shader file path.
  /// param fragment_path: The fragment shader file path.
  /// param width: The framebuffer width.
  /// param height: The framebuffer height.
  /// return: The renderer.
  pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(
    name: &str,
    api: TeoGraphicsApiRef,
    vertex_path: P,
    fragment_path: Q,
    width: u32,
    height: u32,
  ) -> Result<Self, TeoRendererError> {
    let mut program = TeoShaderProgram::new(api.clone());
    program.load_from_files(vertex_path, fragment_path)?;
    Ok(Self::with_program(name, api, program, width, height))
  }

  /// Create a new renderer with the shaders given as source.
  /// param name: The name of the renderer.
  /// param api: The graphics API.
  /// param vertex_source: The vertex shader source.
  /// param fragment_source: The fragment shader source.
  /// param width: The framebuffer width.
  /// param height: The framebuffer height.
  /// return: The renderer.
  pub fn with_source(
    name: &str,
    api: TeoGraphicsApiRef,
    vertex_source: &str,
    fragment_source: &str,
    width: u32,
    height: u32,
  ) -> Result<Self, TeoRendererError> {
    let mut program = TeoShaderProgram::new(api.clone());
    program.load_from_source(vertex_source, fragment_source)?;
    Ok(Self::with_program(name, api, program, width, height))
  }

  fn with_program(name: &str, api: TeoGraphicsApiRef, program: TeoShaderProgram, width: u32, height: u32) -> Self {
    api.init_state();
    api.set_viewport(width, height);
    log::debug!("A TeoRenderer \"{}\"[{} x {}] on \"{}\" is created.", name, width, height, api.description());

    Self {
      name: name.to_string(),
      width,
      height,
      api,
      program,
      clear_color: Vec4::new(0.1, 0.1, 0.15, 1.0),
      light: TeoDirectionalLight::default(),
      total_frames: 0,
      stat_frames: 0,
      last_stat_time: std::time::Instant::now(),
      elapsed_time: std::time::Duration::from_secs(0),
    }
  }

  /// Resize the viewport. A zero sized framebuffer (minimized window) is ignored.
  pub fn resize(&mut self, width: u32, height: u32) {
    if width == 0 || height == 0 {
      return;
    }
    self.width = width;
    self.height = height;
    self.api.set_viewport(width, height);
  }

  pub fn program(&self) -> &TeoShaderProgram {
    &self.program
  }

  pub fn total_frames(&self) -> u64 {
    self.total_frames
  }

  /// Render one frame.
  /// param camera: The camera.
  /// param models: The models to draw.
  pub fn render(&mut self, camera: &TeoCamera, models: &[TeoModel]) {
    self.update_statistic();

    self.api.clear(self.clear_color.to_array());
    self.program.use_program();

    // Per frame.
    self.program.set_mat4("view", &camera.view_matrix());
    self.program.set_mat4("projection", &camera.projection_matrix());
    self.program.set_vec3("viewPos", camera.position());
    self.program.set_vec3("lightDir", self.light.direction());
    self.program.set_vec3("lightColor", self.light.color);
    self.program.set_vec3("ambientColor", self.light.ambient_color);

    for model in models.iter() {
      self.program.set_mat4("model", &model.transform.matrix());
      self.program.set_mat3("normalMatrix", &model.transform.normal_matrix());

      for mesh in model.meshes().iter() {
        let material = mesh.material();
        self.program.set_vec4("baseColorFactor", material.base_color_factor);

        match material.base_color_texture.as_ref().filter(|texture| texture.is_valid()) {
          Some(texture) => {
            texture.bind(BASE_COLOR_TEXTURE_UNIT);
            self.program.set_int("baseColorTexture", BASE_COLOR_TEXTURE_UNIT as i32);
            self.program.set_bool("hasTexture", true);
          },
          None => self.program.set_bool("hasTexture", false),
        }

        mesh.draw();
      }
    }
  }

  fn update_statistic(&mut self) {
    let now = std::time::Instant::now();
    self.elapsed_time += now - self.last_stat_time;
    self.last_stat_time = now;
    self.total_frames += 1;
    self.stat_frames += 1;

    if self.elapsed_time > std::time::Duration::from_secs(1) {
      log::info!(
        "FPS: {}, CPU Time: {:.4}ms, Total Frames: {}",
        self.stat_frames,
        self.elapsed_time.as_secs_f64() * 1000.0 / self.stat_frames as f64,
        self.total_frames,
      );
      self.stat_frames = 0;
      self.elapsed_time -= std::time::Duration::from_secs(1);
    }
  }
}
