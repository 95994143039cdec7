//! Graphics API capability.
//!
//! Every GPU resource in the crate talks to the graphics API through a
//! [`TeoGraphicsApi`] trait object. The object is resolved once at startup and
//! handed to resources as a [`TeoGraphicsApiRef`].
//!
//! # Available Backends
//!
//! - [`glow_api::TeoGlowApi`]: OpenGL 3.3 core through `glow`
//! - [`headless::TeoHeadlessApi`]: no GPU, records every call

pub mod glow_api;
pub mod headless;

use std::num::NonZeroU32;
use std::rc::Rc;

use crate::error::TeoRendererError;

pub use glow_api::TeoGlowApi;
pub use headless::TeoHeadlessApi;

/// Shared reference to the graphics API used by all GPU resources.
pub type TeoGraphicsApiRef = Rc<dyn TeoGraphicsApi>;

macro_rules! teo_handle {
  ($(#[$meta:meta])* $name:ident) => {
    $(#[$meta])*
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
    pub struct $name(pub NonZeroU32);

    impl $name {
      /// Get the raw backend id.
      pub fn raw(&self) -> u32 {
        self.0.get()
      }
    }
  };
}

teo_handle!(
  /// A vertex array (vertex layout binding) handle.
  TeoVertexArrayId
);
teo_handle!(
  /// A vertex or index buffer handle.
  TeoBufferId
);
teo_handle!(
  /// A 2D texture handle.
  TeoTextureId
);
teo_handle!(
  /// A compiled shader stage handle.
  TeoShaderId
);
teo_handle!(
  /// A linked program handle.
  TeoProgramId
);

/// A uniform location inside a linked program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TeoUniformLocation(pub u32);

/// The buffer binding target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeoBufferTarget {
  Vertex,
  Index,
}

/// The shader stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeoShaderStage {
  Vertex,
  Fragment,
}

impl TeoShaderStage {
  pub fn name(&self) -> &'static str {
    match self {
      TeoShaderStage::Vertex => "vertex",
      TeoShaderStage::Fragment => "fragment",
    }
  }
}

/// A float vertex attribute inside an interleaved vertex buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TeoVertexAttribute {
  pub location: u32,
  pub components: i32,
  pub stride: i32,
  pub offset: i32,
}

/// The pixel layout of a texture upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeoPixelFormat {
  R8,
  Rgb8Srgb,
  Rgba8Srgb,
}

impl TeoPixelFormat {
  /// Pick the pixel format for the number of 8-bit channels.
  /// param channels: The number of channels.
  /// return: The format, none if the channel count is not uploadable.
  pub fn from_channels(channels: u8) -> Option<Self> {
    match channels {
      1 => Some(Self::R8),
      3 => Some(Self::Rgb8Srgb),
      4 => Some(Self::Rgba8Srgb),
      _ => None,
    }
  }

  pub fn bytes_per_pixel(&self) -> usize {
    match self {
      Self::R8 => 1,
      Self::Rgb8Srgb => 3,
      Self::Rgba8Srgb => 4,
    }
  }
}

/// The subset of the graphics API needed by the viewer.
///
/// Methods take `&self`: the API object is shared by every resource and is
/// only ever touched from the thread that owns the graphics context.
pub trait TeoGraphicsApi {
  /// A human readable backend description.
  fn description(&self) -> String;

  /// Set the fixed pipeline state (depth test, back-face culling, CCW front faces).
  fn init_state(&self);
  fn set_viewport(&self, width: u32, height: u32);
  fn clear(&self, color: [f32; 4]);

  fn create_vertex_array(&self) -> Result<TeoVertexArrayId, TeoRendererError>;
  fn delete_vertex_array(&self, vertex_array: TeoVertexArrayId);
  fn bind_vertex_array(&self, vertex_array: Option<TeoVertexArrayId>);

  fn create_buffer(&self) -> Result<TeoBufferId, TeoRendererError>;
  fn delete_buffer(&self, buffer: TeoBufferId);
  fn bind_buffer(&self, target: TeoBufferTarget, buffer: Option<TeoBufferId>);
  /// Upload static data to the buffer bound at the target.
  fn buffer_data(&self, target: TeoBufferTarget, data: &[u8]);
  /// Enable and describe a float attribute of the bound vertex buffer.
  fn vertex_attribute(&self, attribute: &TeoVertexAttribute);
  /// Draw the bound vertex array as a u32 indexed triangle list.
  fn draw_indexed_triangles(&self, index_count: u32);

  fn create_texture(&self) -> Result<TeoTextureId, TeoRendererError>;
  fn delete_texture(&self, texture: TeoTextureId);
  /// Upload the pixels to a texture, build mipmaps and set repeat/trilinear sampling.
  fn upload_texture_2d(&self, texture: TeoTextureId, width: u32, height: u32, format: TeoPixelFormat, pixels: &[u8]);
  fn bind_texture(&self, unit: u32, texture: Option<TeoTextureId>);

  fn create_shader(&self, stage: TeoShaderStage, source: &str) -> Result<TeoShaderId, TeoRendererError>;
  fn delete_shader(&self, shader: TeoShaderId);
  fn create_program(&self, shaders: &[TeoShaderId]) -> Result<TeoProgramId, TeoRendererError>;
  fn delete_program(&self, program: TeoProgramId);
  fn use_program(&self, program: Option<TeoProgramId>);
  /// Query a uniform location, none if the program has no such active uniform.
  fn get_uniform_location(&self, program: TeoProgramId, name: &str) -> Option<TeoUniformLocation>;

  fn uniform_i32(&self, location: Option<TeoUniformLocation>, value: i32);
  fn uniform_f32(&self, location: Option<TeoUniformLocation>, value: f32);
  fn uniform_vec2(&self, location: Option<TeoUniformLocation>, value: [f32; 2]);
  fn uniform_vec3(&self, location: Option<TeoUniformLocation>, value: [f32; 3]);
  fn uniform_vec4(&self, location: Option<TeoUniformLocation>, value: [f32; 4]);
  /// Column-major 3x3 matrix.
  fn uniform_mat3(&self, location: Option<TeoUniformLocation>, value: &[f32; 9]);
  /// Column-major 4x4 matrix.
  fn uniform_mat4(&self, location: Option<TeoUniformLocation>, value: &[f32; 16]);
}
