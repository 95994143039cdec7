//! Headless graphics API.
//!
//! This backend doesn't talk to a GPU. It hands out fake handles, keeps track
//! of which ones are alive and records every state-changing call, so loading
//! and rendering can run on machines without a display and be inspected in
//! tests.

use std::cell::RefCell;
use std::collections::{
  BTreeSet,
  HashMap,
};
use std::num::NonZeroU32;

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

/// A value written to a uniform.
#[derive(Debug, Clone, PartialEq)]
pub enum TeoUniformValue {
  Int(i32),
  Float(f32),
  Vec2([f32; 2]),
  Vec3([f32; 3]),
  Vec4([f32; 4]),
  Mat3([f32; 9]),
  Mat4([f32; 16]),
}

/// A recorded call.
#[derive(Debug, Clone, PartialEq)]
pub enum TeoHeadlessCall {
  Clear([f32; 4]),
  Viewport(u32, u32),
  UseProgram(Option<TeoProgramId>),
  BufferData { target: TeoBufferTarget, buffer: Option<TeoBufferId>, len: usize },
  VertexAttribute(TeoVertexAttribute),
  UploadTexture { texture: TeoTextureId, width: u32, height: u32, format: TeoPixelFormat },
  BindTexture { unit: u32, texture: Option<TeoTextureId> },
  Uniform { program: Option<TeoProgramId>, location: Option<TeoUniformLocation>, value: TeoUniformValue },
  DrawIndexed { vertex_array: Option<TeoVertexArrayId>, index_count: u32 },
  DeleteVertexArray(TeoVertexArrayId),
  DeleteBuffer(TeoBufferId),
  DeleteTexture(TeoTextureId),
  DeleteShader(TeoShaderId),
  DeleteProgram(TeoProgramId),
}

#[derive(Default)]
struct TeoHeadlessState {
  last_id: u32,
  vertex_arrays: BTreeSet<TeoVertexArrayId>,
  buffers: HashMap<TeoBufferId, Vec<u8>>,
  textures: BTreeSet<TeoTextureId>,
  shaders: HashMap<TeoShaderId, String>,
  programs: HashMap<TeoProgramId, Vec<String>>,
  bound_vertex_array: Option<TeoVertexArrayId>,
  bound_vertex_buffer: Option<TeoBufferId>,
  bound_index_buffer: Option<TeoBufferId>,
  current_program: Option<TeoProgramId>,
  calls: Vec<TeoHeadlessCall>,
  location_queries: usize,
  invalid_releases: usize,
}

impl TeoHeadlessState {
  fn next_id(&mut self) -> NonZeroU32 {
    self.last_id += 1;
    NonZeroU32::new(self.last_id).unwrap_or(NonZeroU32::MIN)
  }

  fn invalid_release(&mut self, what: &str, raw: u32) {
    log::error!("Release of a {} handle {} which is not alive.", what, raw);
    self.invalid_releases += 1;
  }
}

/// The headless graphics API.
#[derive(Default)]
pub struct TeoHeadlessApi {
  state: RefCell<TeoHeadlessState>,
}

/// Collect the names of `uniform <type> <name>;` declarations in a GLSL source.
fn declared_uniforms(source: &str) -> Vec<String> {
  source.lines()
    .map(str::trim)
    .filter(|line| line.starts_with("uniform "))
    .filter_map(|line| {
      let declaration = line.split(';').next()?;
      let name = declaration.split_whitespace().last()?;
      Some(name.split('[').next().unwrap_or(name).to_string())
    })
    .collect()
}

/// The implementation of the headless graphics API.
impl TeoHeadlessApi {
  pub fn new() -> Self {
    Self::default()
  }

  /// Number of live vertex arrays.
  pub fn live_vertex_arrays(&self) -> usize {
    self.state.borrow().vertex_arrays.len()
  }

  /// Number of live vertex and index buffers.
  pub fn live_buffers(&self) -> usize {
    self.state.borrow().buffers.len()
  }

  pub fn live_textures(&self) -> usize {
    self.state.borrow().textures.len()
  }

  pub fn live_programs(&self) -> usize {
    self.state.borrow().programs.len()
  }

  pub fn live_shaders(&self) -> usize {
    self.state.borrow().shaders.len()
  }

  /// Number of handles alive in any category.
  pub fn live_resources(&self) -> usize {
    let state = self.state.borrow();
    state.vertex_arrays.len() + state.buffers.len() + state.textures.len() + state.shaders.len() + state.programs.len()
  }

  /// Number of delete calls recorded so far.
  pub fn release_count(&self) -> usize {
    self.state.borrow().calls.iter().filter(|call| matches!(
      call,
      TeoHeadlessCall::DeleteVertexArray(_)
        | TeoHeadlessCall::DeleteBuffer(_)
        | TeoHeadlessCall::DeleteTexture(_)
        | TeoHeadlessCall::DeleteShader(_)
        | TeoHeadlessCall::DeleteProgram(_)
    )).count()
  }

  /// Number of deletes of handles that were not alive (double releases).
  pub fn invalid_releases(&self) -> usize {
    self.state.borrow().invalid_releases
  }

  pub fn texture_uploads(&self) -> usize {
    self.state.borrow().calls.iter()
      .filter(|call| matches!(call, TeoHeadlessCall::UploadTexture { .. }))
      .count()
  }

  /// Number of uniform location queries made against the API.
  pub fn location_queries(&self) -> usize {
    self.state.borrow().location_queries
  }

  /// The bytes last uploaded to a live buffer.
  pub fn buffer_contents(&self, buffer: TeoBufferId) -> Option<Vec<u8>> {
    self.state.borrow().buffers.get(&buffer).cloned()
  }

  /// A copy of the recorded calls.
  pub fn calls(&self) -> Vec<TeoHeadlessCall> {
    self.state.borrow().calls.clone()
  }

  pub fn clear_calls(&self) {
    self.state.borrow_mut().calls.clear();
  }

  /// The recorded draw calls as (vertex array, index count) pairs.
  pub fn draw_calls(&self) -> Vec<(Option<TeoVertexArrayId>, u32)> {
    self.state.borrow().calls.iter()
      .filter_map(|call| match call {
        TeoHeadlessCall::DrawIndexed { vertex_array, index_count } => Some((*vertex_array, *index_count)),
        _ => None,
      })
      .collect()
  }

  /// Resolve a uniform name of a live program back to its location.
  pub fn uniform_location_of(&self, program: TeoProgramId, name: &str) -> Option<TeoUniformLocation> {
    let state = self.state.borrow();
    let uniforms = state.programs.get(&program)?;
    uniforms.iter().position(|uniform| uniform == name).map(|index| TeoUniformLocation(index as u32))
  }

  /// The values written to a named uniform of the program, in call order.
  pub fn uniform_writes(&self, program: TeoProgramId, name: &str) -> Vec<TeoUniformValue> {
    let location = match self.uniform_location_of(program, name) {
      Some(location) => location,
      None => return Vec::new(),
    };
    self.state.borrow().calls.iter()
      .filter_map(|call| match call {
        TeoHeadlessCall::Uniform { program: Some(p), location: Some(l), value } if *p == program && *l == location => Some(value.clone()),
        _ => None,
      })
      .collect()
  }

  fn record(&self, call: TeoHeadlessCall) {
    self.state.borrow_mut().calls.push(call);
  }

  fn uniform(&self, location: Option<TeoUniformLocation>, value: TeoUniformValue) {
    let mut state = self.state.borrow_mut();
    let program = state.current_program;
    state.calls.push(TeoHeadlessCall::Uniform { program, location, value });
  }
}

impl TeoGraphicsApi for TeoHeadlessApi {
  fn description(&self) -> String {
    "Headless (no GPU)".to_string()
  }

  fn init_state(&self) {}

  fn set_viewport(&self, width: u32, height: u32) {
    self.record(TeoHeadlessCall::Viewport(width, height));
  }

  fn clear(&self, color: [f32; 4]) {
    self.record(TeoHeadlessCall::Clear(color));
  }

  fn create_vertex_array(&self) -> Result<TeoVertexArrayId, TeoRendererError> {
    let mut state = self.state.borrow_mut();
    let id = TeoVertexArrayId(state.next_id());
    state.vertex_arrays.insert(id);
    Ok(id)
  }

  fn delete_vertex_array(&self, vertex_array: TeoVertexArrayId) {
    let mut state = self.state.borrow_mut();
    if !state.vertex_arrays.remove(&vertex_array) {
      state.invalid_release("vertex array", vertex_array.raw());
    }
    state.calls.push(TeoHeadlessCall::DeleteVertexArray(vertex_array));
  }

  fn bind_vertex_array(&self, vertex_array: Option<TeoVertexArrayId>) {
    self.state.borrow_mut().bound_vertex_array = vertex_array;
  }

  fn create_buffer(&self) -> Result<TeoBufferId, TeoRendererError> {
    let mut state = self.state.borrow_mut();
    let id = TeoBufferId(state.next_id());
    state.buffers.insert(id, Vec::new());
    Ok(id)
  }

  fn delete_buffer(&self, buffer: TeoBufferId) {
    let mut state = self.state.borrow_mut();
    if state.buffers.remove(&buffer).is_none() {
      state.invalid_release("buffer", buffer.raw());
    }
    state.calls.push(TeoHeadlessCall::DeleteBuffer(buffer));
  }

  fn bind_buffer(&self, target: TeoBufferTarget, buffer: Option<TeoBufferId>) {
    let mut state = self.state.borrow_mut();
    match target {
      TeoBufferTarget::Vertex => state.bound_vertex_buffer = buffer,
      TeoBufferTarget::Index => state.bound_index_buffer = buffer,
    }
  }

  fn buffer_data(&self, target: TeoBufferTarget, data: &[u8]) {
    let mut state = self.state.borrow_mut();
    let buffer = match target {
      TeoBufferTarget::Vertex => state.bound_vertex_buffer,
      TeoBufferTarget::Index => state.bound_index_buffer,
    };
    if let Some(contents) = buffer.and_then(|id| state.buffers.get_mut(&id)) {
      *contents = data.to_vec();
    }
    state.calls.push(TeoHeadlessCall::BufferData { target, buffer, len: data.len() });
  }

  fn vertex_attribute(&self, attribute: &TeoVertexAttribute) {
    self.record(TeoHeadlessCall::VertexAttribute(*attribute));
  }

  fn draw_indexed_triangles(&self, index_count: u32) {
    let mut state = self.state.borrow_mut();
    let vertex_array = state.bound_vertex_array;
    state.calls.push(TeoHeadlessCall::DrawIndexed { vertex_array, index_count });
  }

  fn create_texture(&self) -> Result<TeoTextureId, TeoRendererError> {
    let mut state = self.state.borrow_mut();
    let id = TeoTextureId(state.next_id());
    state.textures.insert(id);
    Ok(id)
  }

  fn delete_texture(&self, texture: TeoTextureId) {
    let mut state = self.state.borrow_mut();
    if !state.textures.remove(&texture) {
      state.invalid_release("texture", texture.raw());
    }
    state.calls.push(TeoHeadlessCall::DeleteTexture(texture));
  }

  fn upload_texture_2d(&self, texture: TeoTextureId, width: u32, height: u32, format: TeoPixelFormat, _pixels: &[u8]) {
    self.record(TeoHeadlessCall::UploadTexture { texture, width, height, format });
  }

  fn bind_texture(&self, unit: u32, texture: Option<TeoTextureId>) {
    self.record(TeoHeadlessCall::BindTexture { unit, texture });
  }

  fn create_shader(&self, stage: TeoShaderStage, source: &str) -> Result<TeoShaderId, TeoRendererError> {
    if source.lines().any(|line| line.trim_start().starts_with("#error")) {
      return Err(TeoRendererError::new(&format!("Shader compilation failed ({}):\n#error directive", stage.name()), None));
    }
    let mut state = self.state.borrow_mut();
    let id = TeoShaderId(state.next_id());
    state.shaders.insert(id, source.to_string());
    Ok(id)
  }

  fn delete_shader(&self, shader: TeoShaderId) {
    let mut state = self.state.borrow_mut();
    if state.shaders.remove(&shader).is_none() {
      state.invalid_release("shader", shader.raw());
    }
    state.calls.push(TeoHeadlessCall::DeleteShader(shader));
  }

  fn create_program(&self, shaders: &[TeoShaderId]) -> Result<TeoProgramId, TeoRendererError> {
    let mut state = self.state.borrow_mut();
    let mut uniforms = Vec::new();
    for shader in shaders {
      let source = state.shaders.get(shader)
        .ok_or(TeoRendererError::new(&format!("Shader program linking failed:\nshader {} is not alive", shader.raw()), None))?;
      for name in declared_uniforms(source) {
        if !uniforms.contains(&name) {
          uniforms.push(name);
        }
      }
    }
    let id = TeoProgramId(state.next_id());
    state.programs.insert(id, uniforms);
    Ok(id)
  }

  fn delete_program(&self, program: TeoProgramId) {
    let mut state = self.state.borrow_mut();
    if state.programs.remove(&program).is_none() {
      state.invalid_release("program", program.raw());
    }
    state.calls.push(TeoHeadlessCall::DeleteProgram(program));
  }

  fn use_program(&self, program: Option<TeoProgramId>) {
    let mut state = self.state.borrow_mut();
    state.current_program = program;
    state.calls.push(TeoHeadlessCall::UseProgram(program));
  }

  fn get_uniform_location(&self, program: TeoProgramId, name: &str) -> Option<TeoUniformLocation> {
    self.state.borrow_mut().location_queries += 1;
    self.uniform_location_of(program, name)
  }

  fn uniform_i32(&self, location: Option<TeoUniformLocation>, value: i32) {
    self.uniform(location, TeoUniformValue::Int(value));
  }

  fn uniform_f32(&self, location: Option<TeoUniformLocation>, value: f32) {
    self.uniform(location, TeoUniformValue::Float(value));
  }

  fn uniform_vec2(&self, location: Option<TeoUniformLocation>, value: [f32; 2]) {
    self.uniform(location, TeoUniformValue::Vec2(value));
  }

  fn uniform_vec3(&self, location: Option<TeoUniformLocation>, value: [f32; 3]) {
    self.uniform(location, TeoUniformValue::Vec3(value));
  }

  fn uniform_vec4(&self, location: Option<TeoUniformLocation>, value: [f32; 4]) {
    self.uniform(location, TeoUniformValue::Vec4(value));
  }

  fn uniform_mat3(&self, location: Option<TeoUniformLocation>, value: &[f32; 9]) {
    self.uniform(location, TeoUniformValue::Mat3(*value));
  }

  fn uniform_mat4(&self, location: Option<TeoUniformLocation>, value: &[f32; 16]) {
    self.uniform(location, TeoUniformValue::Mat4(*value));
  }
}
