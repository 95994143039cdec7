use std::rc::Rc;

use crate::backend::{
  TeoBufferId,
  TeoBufferTarget,
  TeoGraphicsApiRef,
  TeoVertexArrayId,
};
use crate::error::TeoRendererError;
use crate::scene::vertex::TeoVertex;

use super::material::TeoMaterial;

/// The three GPU objects of an uploaded mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TeoMeshHandles {
  vertex_array: TeoVertexArrayId,
  vertex_buffer: TeoBufferId,
  index_buffer: TeoBufferId,
}

/// An indexed triangle mesh in the GPU with its material.
///
/// Either owns all of its vertex array, vertex buffer and index buffer or none
/// of them. Not clonable: use [`TeoMesh::take`] to move the GPU objects.
pub struct TeoMesh {
  api: TeoGraphicsApiRef,
  handles: Option<TeoMeshHandles>,
  index_count: u32,
  material: TeoMaterial,
}

/// The Drop implementation of the mesh.
impl Drop for TeoMesh {
  fn drop(&mut self) {
    if self.handles.is_some() {
      self.cleanup();
      log::debug!("A TeoMesh dropped.");
    }
  }
}

impl std::fmt::Debug for TeoMesh {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("TeoMesh")
      .field("handles", &self.handles)
      .field("index_count", &self.index_count)
      .field("material", &self.material)
      .finish()
  }
}

/// The implementation of the mesh.
impl TeoMesh {
  /// Create an empty mesh which owns no GPU resource.
  /// param api: The graphics API.
  /// return: The mesh.
  pub fn new(api: TeoGraphicsApiRef) -> Self {
    Self {
      api,
      handles: None,
      index_count: 0,
      material: TeoMaterial::default(),
    }
  }

  /// Upload the vertices and indices, releasing the previously owned objects first.
  /// param vertices: The interleaved vertices.
  /// param indices: The triangle list indices.
  /// return: The result.
  pub fn setup(&mut self, vertices: &[TeoVertex], indices: &[u32]) -> Result<(), TeoRendererError> {
    self.cleanup();

    let index_count = u32::try_from(indices.len())
      .map_err(|err| TeoRendererError::new("Too many indices in a mesh.", Some(Box::new(err))))?;

    let vertex_array = self.api.create_vertex_array()?;
    let vertex_buffer = match self.api.create_buffer() {
      Ok(buffer) => buffer,
      Err(err) => {
        self.api.delete_vertex_array(vertex_array);
        return Err(err);
      }
    };
    let index_buffer = match self.api.create_buffer() {
      Ok(buffer) => buffer,
      Err(err) => {
        self.api.delete_buffer(vertex_buffer);
        self.api.delete_vertex_array(vertex_array);
        return Err(err);
      }
    };

    self.api.bind_vertex_array(Some(vertex_array));

    self.api.bind_buffer(TeoBufferTarget::Vertex, Some(vertex_buffer));
    self.api.buffer_data(TeoBufferTarget::Vertex, bytemuck::cast_slice(vertices));

    self.api.bind_buffer(TeoBufferTarget::Index, Some(index_buffer));
    self.api.buffer_data(TeoBufferTarget::Index, bytemuck::cast_slice(indices));

    for attribute in TeoVertex::attributes().iter() {
      self.api.vertex_attribute(attribute);
    }

    // The index buffer binding is part of the vertex array state, unbind the array first.
    self.api.bind_vertex_array(None);
    self.api.bind_buffer(TeoBufferTarget::Vertex, None);

    self.handles = Some(TeoMeshHandles {
      vertex_array,
      vertex_buffer,
      index_buffer,
    });
    self.index_count = index_count;
    log::debug!("A TeoMesh with {} vertices and {} indices uploaded.", vertices.len(), index_count);
    Ok(())
  }

  /// Issue the indexed triangle draw. Does nothing for an empty mesh.
  pub fn draw(&self) {
    if let Some(handles) = self.handles {
      self.api.bind_vertex_array(Some(handles.vertex_array));
      self.api.draw_indexed_triangles(self.index_count);
      self.api.bind_vertex_array(None);
    }
  }

  pub fn set_material(&mut self, material: TeoMaterial) {
    self.material = material;
  }

  pub fn material(&self) -> &TeoMaterial {
    &self.material
  }

  pub fn index_count(&self) -> u32 {
    self.index_count
  }

  pub fn is_valid(&self) -> bool {
    self.handles.is_some()
  }

  pub fn vertex_array(&self) -> Option<TeoVertexArrayId> {
    self.handles.map(|handles| handles.vertex_array)
  }

  pub fn vertex_buffer(&self) -> Option<TeoBufferId> {
    self.handles.map(|handles| handles.vertex_buffer)
  }

  pub fn index_buffer(&self) -> Option<TeoBufferId> {
    self.handles.map(|handles| handles.index_buffer)
  }

  /// Move the GPU objects and the material out, leaving this instance empty.
  pub fn take(&mut self) -> Self {
    let empty = Self::new(Rc::clone(&self.api));
    std::mem::replace(self, empty)
  }

  fn cleanup(&mut self) {
    if let Some(handles) = self.handles.take() {
      self.api.delete_buffer(handles.index_buffer);
      self.api.delete_buffer(handles.vertex_buffer);
      self.api.delete_vertex_array(handles.vertex_array);
    }
    self.index_count = 0;
  }
}

#[cfg(test)]
mod tests {
  use glam::{
    Vec2,
    Vec3,
  };

  use super::*;
  use crate::backend::TeoHeadlessApi;

  fn triangle() -> Vec<TeoVertex> {
    [Vec3::ZERO, Vec3::X, Vec3::Y].iter()
      .map(|&position| TeoVertex {
        position,
        normal: Vec3::Z,
        tex_coord: Vec2::ZERO,
      })
      .collect()
  }

  #[test]
  fn setup_uploads_three_objects() {
    let api = Rc::new(TeoHeadlessApi::new());
    let mut mesh = TeoMesh::new(api.clone());
    mesh.setup(&triangle(), &[0, 1, 2]).unwrap();

    assert_eq!(mesh.index_count(), 3);
    assert_eq!(api.live_vertex_arrays(), 1);
    assert_eq!(api.live_buffers(), 2);
    let vertex_bytes = api.buffer_contents(mesh.vertex_buffer().unwrap()).unwrap();
    assert_eq!(vertex_bytes.len(), 3 * 32);
    let index_bytes = api.buffer_contents(mesh.index_buffer().unwrap()).unwrap();
    assert_eq!(index_bytes, bytemuck::cast_slice::<u32, u8>(&[0, 1, 2]).to_vec());
  }

  #[test]
  fn second_setup_releases_first_upload() {
    let api = Rc::new(TeoHeadlessApi::new());
    let mut mesh = TeoMesh::new(api.clone());
    mesh.setup(&triangle(), &[0, 1, 2]).unwrap();
    mesh.setup(&triangle(), &[2, 1, 0, 0, 1, 2]).unwrap();
    assert_eq!(mesh.index_count(), 6);
    assert_eq!(api.live_resources(), 3);
    assert_eq!(api.release_count(), 3);
  }

  #[test]
  fn moved_from_mesh_releases_nothing() {
    let api = Rc::new(TeoHeadlessApi::new());
    let mut source = TeoMesh::new(api.clone());
    source.setup(&triangle(), &[0, 1, 2]).unwrap();
    let vertex_array = source.vertex_array();

    let target = source.take();
    assert_eq!(target.vertex_array(), vertex_array);
    assert!(!source.is_valid());
    assert_eq!(source.index_count(), 0);

    drop(source);
    assert_eq!(api.release_count(), 0);
    drop(target);
    assert_eq!(api.release_count(), 3);
    assert_eq!(api.live_resources(), 0);
    assert_eq!(api.invalid_releases(), 0);
  }

  #[test]
  fn draw_uses_index_count() {
    let api = Rc::new(TeoHeadlessApi::new());
    let mut mesh = TeoMesh::new(api.clone());
    mesh.draw();
    assert!(api.draw_calls().is_empty());

    mesh.setup(&triangle(), &[0, 1, 2]).unwrap();
    mesh.draw();
    assert_eq!(api.draw_calls(), vec![(mesh.vertex_array(), 3)]);
  }
}
