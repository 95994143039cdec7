use std::mem::{
  offset_of,
  size_of,
};

use glam::{
  Vec2,
  Vec3,
};

use crate::backend::TeoVertexAttribute;

/// The vertex.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TeoVertex {
  pub position: Vec3,
  pub normal: Vec3,
  pub tex_coord: Vec2,
}

impl TeoVertex {
  pub const DEFAULT_NORMAL: Vec3 = Vec3::Y;
  pub const DEFAULT_TEX_COORD: Vec2 = Vec2::ZERO;

  /// The attribute layout matching the struct, locations 0 (position), 1 (normal) and 2 (tex_coord).
  pub fn attributes() -> [TeoVertexAttribute; 3] {
    let stride = size_of::<TeoVertex>() as i32;
    [
      TeoVertexAttribute {
        location: 0,
        components: 3,
        stride,
        offset: offset_of!(TeoVertex, position) as i32,
      },
      TeoVertexAttribute {
        location: 1,
        components: 3,
        stride,
        offset: offset_of!(TeoVertex, normal) as i32,
      },
      TeoVertexAttribute {
        location: 2,
        components: 2,
        stride,
        offset: offset_of!(TeoVertex, tex_coord) as i32,
      },
    ]
  }
}
