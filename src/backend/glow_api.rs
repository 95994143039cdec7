use glow::HasContext;

use crate::error::TeoRendererError;
use super::{
  TeoBufferId,
  TeoBufferTarget,
  TeoGraphicsApi,
  TeoPixelFormat,
  TeoProgramId,
  TeoShaderId,
  TeoShaderStage,
  TeoTextureId,
  TeoUniformLocation,
  TeoVertexArrayId,
  TeoVertexAttribute,
};

/// The OpenGL implementation of the graphics API.
pub struct TeoGlowApi {
  gl: glow::Context,
}

/// The Drop implementation of the OpenGL API.
impl Drop for TeoGlowApi {
  fn drop(&mut self) {
    log::debug!("A TeoGlowApi dropped.");
  }
}

/// The implementation of the OpenGL API.
impl TeoGlowApi {
  /// Create the API from a loaded glow context.
  /// The context must be current on the calling thread for the whole lifetime of the API.
  /// param gl: The glow context.
  /// return: The API.
  pub fn new(gl: glow::Context) -> Self {
    log::debug!("A TeoGlowApi created.");
    Self { gl }
  }

  fn target(target: TeoBufferTarget) -> u32 {
    match target {
      TeoBufferTarget::Vertex => glow::ARRAY_BUFFER,
      TeoBufferTarget::Index => glow::ELEMENT_ARRAY_BUFFER,
    }
  }

  fn location(location: Option<TeoUniformLocation>) -> Option<glow::NativeUniformLocation> {
    location.map(|location| glow::NativeUniformLocation(location.0))
  }
}

impl TeoGraphicsApi for TeoGlowApi {
  fn description(&self) -> String {
    unsafe {
      format!(
        "Vendor: {}, Renderer: {}, Version: {}",
        self.gl.get_parameter_string(glow::VENDOR),
        self.gl.get_parameter_string(glow::RENDERER),
        self.gl.get_parameter_string(glow::VERSION),
      )
    }
  }

  fn init_state(&self) {
    unsafe {
      self.gl.enable(glow::DEPTH_TEST);
      self.gl.depth_func(glow::LESS);
      self.gl.enable(glow::CULL_FACE);
      self.gl.cull_face(glow::BACK);
      self.gl.front_face(glow::CCW);
    }
  }

  fn set_viewport(&self, width: u32, height: u32) {
    unsafe {
      self.gl.viewport(0, 0, width as i32, height as i32);
    }
  }

  fn clear(&self, color: [f32; 4]) {
    unsafe {
      self.gl.clear_color(color[0], color[1], color[2], color[3]);
      self.gl.clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);
    }
  }

  fn create_vertex_array(&self) -> Result<TeoVertexArrayId, TeoRendererError> {
    let vertex_array = unsafe { self.gl.create_vertex_array() }
      .map_err(|err| TeoRendererError::new(&format!("Create vertex array failed: {}", err), None))?;
    Ok(TeoVertexArrayId(vertex_array.0))
  }

  fn delete_vertex_array(&self, vertex_array: TeoVertexArrayId) {
    unsafe {
      self.gl.delete_vertex_array(glow::NativeVertexArray(vertex_array.0));
    }
  }

  fn bind_vertex_array(&self, vertex_array: Option<TeoVertexArrayId>) {
    unsafe {
      self.gl.bind_vertex_array(vertex_array.map(|id| glow::NativeVertexArray(id.0)));
    }
  }

  fn create_buffer(&self) -> Result<TeoBufferId, TeoRendererError> {
    let buffer = unsafe { self.gl.create_buffer() }
      .map_err(|err| TeoRendererError::new(&format!("Create buffer failed: {}", err), None))?;
    Ok(TeoBufferId(buffer.0))
  }

  fn delete_buffer(&self, buffer: TeoBufferId) {
    unsafe {
      self.gl.delete_buffer(glow::NativeBuffer(buffer.0));
    }
  }

  fn bind_buffer(&self, target: TeoBufferTarget, buffer: Option<TeoBufferId>) {
    unsafe {
      self.gl.bind_buffer(Self::target(target), buffer.map(|id| glow::NativeBuffer(id.0)));
    }
  }

  fn buffer_data(&self, target: TeoBufferTarget, data: &[u8]) {
    unsafe {
      self.gl.buffer_data_u8_slice(Self::target(target), data, glow::STATIC_DRAW);
    }
  }

  fn vertex_attribute(&self, attribute: &TeoVertexAttribute) {
    unsafe {
      self.gl.enable_vertex_attrib_array(attribute.location);
      self.gl.vertex_attrib_pointer_f32(
        attribute.location,
        attribute.components,
        glow::FLOAT,
        false,
        attribute.stride,
        attribute.offset,
      );
    }
  }

  fn draw_indexed_triangles(&self, index_count: u32) {
    unsafe {
      self.gl.draw_elements(glow::TRIANGLES, index_count as i32, glow::UNSIGNED_INT, 0);
    }
  }

  fn create_texture(&self) -> Result<TeoTextureId, TeoRendererError> {
    let texture = unsafe { self.gl.create_texture() }
      .map_err(|err| TeoRendererError::new(&format!("Create texture failed: {}", err), None))?;
    Ok(TeoTextureId(texture.0))
  }

  fn delete_texture(&self, texture: TeoTextureId) {
    unsafe {
      self.gl.delete_texture(glow::NativeTexture(texture.0));
    }
  }

  fn upload_texture_2d(&self, texture: TeoTextureId, width: u32, height: u32, format: TeoPixelFormat, pixels: &[u8]) {
    let (internal_format, pixel_format) = match format {
      TeoPixelFormat::R8 => (glow::R8, glow::RED),
      TeoPixelFormat::Rgb8Srgb => (glow::SRGB8, glow::RGB),
      TeoPixelFormat::Rgba8Srgb => (glow::SRGB8_ALPHA8, glow::RGBA),
    };
    unsafe {
      self.gl.bind_texture(glow::TEXTURE_2D, Some(glow::NativeTexture(texture.0)));
      // Rows of RGB and R8 images are not 4-byte aligned.
      self.gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, 1);
      self.gl.tex_image_2d(
        glow::TEXTURE_2D,
        0,
        internal_format as i32,
        width as i32,
        height as i32,
        0,
        pixel_format,
        glow::UNSIGNED_BYTE,
        Some(pixels),
      );
      self.gl.generate_mipmap(glow::TEXTURE_2D);
      self.gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_S, glow::REPEAT as i32);
      self.gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_T, glow::REPEAT as i32);
      self.gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MIN_FILTER, glow::LINEAR_MIPMAP_LINEAR as i32);
      self.gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MAG_FILTER, glow::LINEAR as i32);
      self.gl.bind_texture(glow::TEXTURE_2D, None);
    }
  }

  fn bind_texture(&self, unit: u32, texture: Option<TeoTextureId>) {
    unsafe {
      self.gl.active_texture(glow::TEXTURE0 + unit);
      self.gl.bind_texture(glow::TEXTURE_2D, texture.map(|id| glow::NativeTexture(id.0)));
    }
  }

  fn create_shader(&self, stage: TeoShaderStage, source: &str) -> Result<TeoShaderId, TeoRendererError> {
    let shader_type = match stage {
      TeoShaderStage::Vertex => glow::VERTEX_SHADER,
      TeoShaderStage::Fragment => glow::FRAGMENT_SHADER,
    };
    unsafe {
      let shader = self.gl.create_shader(shader_type)
        .map_err(|err| TeoRendererError::new(&format!("Create {} shader failed: {}", stage.name(), err), None))?;
      self.gl.shader_source(shader, source);
      self.gl.compile_shader(shader);
      if !self.gl.get_shader_compile_status(shader) {
        let info_log = self.gl.get_shader_info_log(shader);
        self.gl.delete_shader(shader);
        return Err(TeoRendererError::new(&format!("Shader compilation failed ({}):\n{}", stage.name(), info_log), None));
      }
      Ok(TeoShaderId(shader.0))
    }
  }

  fn delete_shader(&self, shader: TeoShaderId) {
    unsafe {
      self.gl.delete_shader(glow::NativeShader(shader.0));
    }
  }

  fn create_program(&self, shaders: &[TeoShaderId]) -> Result<TeoProgramId, TeoRendererError> {
    unsafe {
      let program = self.gl.create_program()
        .map_err(|err| TeoRendererError::new(&format!("Create program failed: {}", err), None))?;
      for shader in shaders {
        self.gl.attach_shader(program, glow::NativeShader(shader.0));
      }
      self.gl.link_program(program);
      for shader in shaders {
        self.gl.detach_shader(program, glow::NativeShader(shader.0));
      }
      if !self.gl.get_program_link_status(program) {
        let info_log = self.gl.get_program_info_log(program);
        self.gl.delete_program(program);
        return Err(TeoRendererError::new(&format!("Shader program linking failed:\n{}", info_log), None));
      }
      Ok(TeoProgramId(program.0))
    }
  }

  fn delete_program(&self, program: TeoProgramId) {
    unsafe {
      self.gl.delete_program(glow::NativeProgram(program.0));
    }
  }

  fn use_program(&self, program: Option<TeoProgramId>) {
    unsafe {
      self.gl.use_program(program.map(|id| glow::NativeProgram(id.0)));
    }
  }

  fn get_uniform_location(&self, program: TeoProgramId, name: &str) -> Option<TeoUniformLocation> {
    unsafe {
      self.gl.get_uniform_location(glow::NativeProgram(program.0), name)
        .map(|location| TeoUniformLocation(location.0))
    }
  }

  fn uniform_i32(&self, location: Option<TeoUniformLocation>, value: i32) {
    unsafe {
      self.gl.uniform_1_i32(Self::location(location).as_ref(), value);
    }
  }

  fn uniform_f32(&self, location: Option<TeoUniformLocation>, value: f32) {
    unsafe {
      self.gl.uniform_1_f32(Self::location(location).as_ref(), value);
    }
  }

  fn uniform_vec2(&self, location: Option<TeoUniformLocation>, value: [f32; 2]) {
    unsafe {
      self.gl.uniform_2_f32(Self::location(location).as_ref(), value[0], value[1]);
    }
  }

  fn uniform_vec3(&self, location: Option<TeoUniformLocation>, value: [f32; 3]) {
    unsafe {
      self.gl.uniform_3_f32(Self::location(location).as_ref(), value[0], value[1], value[2]);
    }
  }

  fn uniform_vec4(&self, location: Option<TeoUniformLocation>, value: [f32; 4]) {
    unsafe {
      self.gl.uniform_4_f32(Self::location(location).as_ref(), value[0], value[1], value[2], value[3]);
    }
  }

  fn uniform_mat3(&self, location: Option<TeoUniformLocation>, value: &[f32; 9]) {
    unsafe {
      self.gl.uniform_matrix_3_f32_slice(Self::location(location).as_ref(), false, value);
    }
  }

  fn uniform_mat4(&self, location: Option<TeoUniformLocation>, value: &[f32; 16]) {
    unsafe {
      self.gl.uniform_matrix_4_f32_slice(Self::location(location).as_ref(), false, value);
    }
  }
}
