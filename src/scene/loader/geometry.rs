use glam::{
  Vec2,
  Vec3,
};
use gltf::accessor::DataType;

use crate::error::TeoRendererError;
use crate::scene::vertex::TeoVertex;

/// A bounds-checked view of the elements of one accessor.
#[derive(Debug, Clone, Copy)]
pub struct TeoAccessorView<'a> {
  bytes: &'a [u8],
  count: usize,
  data_type: DataType,
  components: usize,
  normalized: bool,
  stride: usize,
}

/// The implementation of the accessor view.
impl<'a> TeoAccessorView<'a> {
  /// Create a view over raw bytes starting at the first element.
  /// param bytes: The bytes, starting at the first element.
  /// param count: The number of elements.
  /// param data_type: The component type.
  /// param components: The number of components per element.
  /// param normalized: Whether integer components map to [0, 1].
  /// param stride: The byte distance between elements, tightly packed if none.
  /// return: The view.
  pub fn new(
    bytes: &'a [u8],
    count: usize,
    data_type: DataType,
    components: usize,
    normalized: bool,
    stride: Option<usize>,
  ) -> Result<Self, TeoRendererError> {
    let element_size = data_type.size() * components;
    let stride = stride.unwrap_or(element_size);
    if stride < element_size {
      return Err(TeoRendererError::new(
        &format!("Byte stride {} is smaller than the element size {}.", stride, element_size),
        None,
      ));
    }
    if count > 0 {
      let required = (count - 1)
        .checked_mul(stride)
        .and_then(|offset| offset.checked_add(element_size))
        .ok_or(TeoRendererError::new("Accessor size overflows.", None))?;
      if required > bytes.len() {
        return Err(TeoRendererError::new(
          &format!("Accessor needs {} bytes but only {} are available.", required, bytes.len()),
          None,
        ));
      }
    }

    Ok(Self {
      bytes,
      count,
      data_type,
      components,
      normalized,
      stride,
    })
  }

  /// Resolve the accessor -> buffer view -> buffer chain of a glTF accessor.
  /// param accessor: The glTF accessor.
  /// param buffers: The loaded buffer data, in document order.
  /// return: The view.
  pub fn from_accessor(accessor: &gltf::Accessor, buffers: &'a [gltf::buffer::Data]) -> Result<Self, TeoRendererError> {
    if accessor.sparse().is_some() {
      return Err(TeoRendererError::new(&format!("Accessor {} is sparse.", accessor.index()), None));
    }
    let view = accessor.view()
      .ok_or(TeoRendererError::new(&format!("Accessor {} has no buffer view.", accessor.index()), None))?;
    let buffer = buffers.get(view.buffer().index())
      .ok_or(TeoRendererError::new(&format!("Buffer {} is not loaded.", view.buffer().index()), None))?;

    let view_end = view.offset().checked_add(view.length())
      .ok_or(TeoRendererError::new("Buffer view size overflows.", None))?;
    let view_bytes = buffer.0.get(view.offset()..view_end)
      .ok_or(TeoRendererError::new(
        &format!("Buffer view {} [{}..{}] is outside of buffer {} ({} bytes).", view.index(), view.offset(), view_end, view.buffer().index(), buffer.0.len()),
        None,
      ))?;
    let bytes = view_bytes.get(accessor.offset()..)
      .ok_or(TeoRendererError::new(&format!("Accessor {} starts outside of its buffer view.", accessor.index()), None))?;

    Self::new(
      bytes,
      accessor.count(),
      accessor.data_type(),
      accessor.dimensions().multiplicity(),
      accessor.normalized(),
      view.stride(),
    )
  }

  pub fn count(&self) -> usize {
    self.count
  }

  pub fn data_type(&self) -> DataType {
    self.data_type
  }

  pub fn components(&self) -> usize {
    self.components
  }

  pub fn normalized(&self) -> bool {
    self.normalized
  }

  fn component_bytes(&self, index: usize, component: usize) -> &'a [u8] {
    let size = self.data_type.size();
    let start = index * self.stride + component * size;
    &self.bytes[start..start + size]
  }

  /// Read one component as an unsigned integer. Only valid for U8, U16 and U32.
  fn read_u32(&self, index: usize, component: usize) -> Option<u32> {
    let bytes = self.component_bytes(index, component);
    match self.data_type {
      DataType::U8 => Some(bytes[0] as u32),
      DataType::U16 => Some(u16::from_le_bytes([bytes[0], bytes[1]]) as u32),
      DataType::U32 => Some(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])),
      _ => None,
    }
  }

  /// Read one component as a float. Integers are accepted only when normalized.
  fn read_f32(&self, index: usize, component: usize) -> Option<f32> {
    let bytes = self.component_bytes(index, component);
    match (self.data_type, self.normalized) {
      (DataType::F32, _) => Some(f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])),
      (DataType::U8, true) => Some(bytes[0] as f32 / u8::MAX as f32),
      (DataType::U16, true) => Some(u16::from_le_bytes([bytes[0], bytes[1]]) as f32 / u16::MAX as f32),
      _ => None,
    }
  }
}

/// Decode a float VEC3 accessor.
/// param view: The accessor view.
/// return: The vectors, none if the accessor is not a float VEC3.
pub fn read_vec3(view: &TeoAccessorView) -> Option<Vec<Vec3>> {
  if view.data_type != DataType::F32 || view.components != 3 {
    log::warn!("Expected a float VEC3 accessor, got {:?} with {} components.", view.data_type, view.components);
    return None;
  }
  (0..view.count)
    .map(|i| Some(Vec3::new(view.read_f32(i, 0)?, view.read_f32(i, 1)?, view.read_f32(i, 2)?)))
    .collect()
}

/// Decode a VEC2 texture coordinate accessor (float, or normalized u8/u16).
/// param view: The accessor view.
/// return: The coordinates, none if the component type is not allowed.
pub fn read_tex_coords(view: &TeoAccessorView) -> Option<Vec<Vec2>> {
  let allowed = match view.data_type {
    DataType::F32 => true,
    DataType::U8 | DataType::U16 => view.normalized,
    _ => false,
  };
  if !allowed || view.components != 2 {
    log::warn!("Unsupported texture coordinate accessor {:?} with {} components.", view.data_type, view.components);
    return None;
  }
  (0..view.count)
    .map(|i| Some(Vec2::new(view.read_f32(i, 0)?, view.read_f32(i, 1)?)))
    .collect()
}

/// Decode an index accessor, widening u8/u16/u32 to u32.
///
/// Any other component type decodes to no indices at all: the primitive is
/// then uploaded with an empty index list and draws nothing.
/// param view: The accessor view.
/// return: The indices.
pub fn read_indices(view: &TeoAccessorView) -> Vec<u32> {
  match view.data_type {
    DataType::U8 | DataType::U16 | DataType::U32 => {
      (0..view.count).filter_map(|i| view.read_u32(i, 0)).collect()
    },
    other => {
      log::warn!("Index component type {:?} is not supported, the primitive gets no indices.", other);
      Vec::new()
    },
  }
}

/// Indices 0..count for a primitive without an index accessor.
pub fn sequential_indices(count: usize) -> Vec<u32> {
  (0..count as u32).collect()
}

/// Interleave the attributes into vertices.
///
/// Missing or short normal and texture coordinate streams are filled with
/// `TeoVertex::DEFAULT_NORMAL` and `TeoVertex::DEFAULT_TEX_COORD`.
/// param positions: The positions, one per vertex.
/// param normals: The optional normals.
/// param tex_coords: The optional texture coordinates.
/// return: The vertices.
pub fn build_vertices(positions: &[Vec3], normals: Option<&[Vec3]>, tex_coords: Option<&[Vec2]>) -> Vec<TeoVertex> {
  positions.iter()
    .enumerate()
    .map(|(i, &position)| TeoVertex {
      position,
      normal: normals.and_then(|n| n.get(i)).copied().unwrap_or(TeoVertex::DEFAULT_NORMAL),
      tex_coord: tex_coords.and_then(|t| t.get(i)).copied().unwrap_or(TeoVertex::DEFAULT_TEX_COORD),
    })
    .collect()
}

/// The decoded vertices and indices of one primitive.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TeoPrimitiveGeometry {
  pub vertices: Vec<TeoVertex>,
  pub indices: Vec<u32>,
}

fn resolve_view<'a>(
  what: &str,
  accessor: Option<gltf::Accessor>,
  buffers: &'a [gltf::buffer::Data],
) -> Option<TeoAccessorView<'a>> {
  let accessor = accessor?;
  match TeoAccessorView::from_accessor(&accessor, buffers) {
    Ok(view) => Some(view),
    Err(err) => {
      log::warn!("Ignoring {} accessor {}: {}", what, accessor.index(), err);
      None
    },
  }
}

/// Decode the geometry of a primitive.
///
/// Without a usable POSITION accessor the result is empty.
/// param primitive: The glTF primitive.
/// param buffers: The loaded buffer data.
/// return: The geometry.
pub fn decode_primitive(primitive: &gltf::Primitive, buffers: &[gltf::buffer::Data]) -> TeoPrimitiveGeometry {
  let positions = resolve_view("POSITION", primitive.get(&gltf::Semantic::Positions), buffers)
    .and_then(|view| read_vec3(&view));
  let positions = match positions {
    Some(positions) => positions,
    None => {
      log::warn!("Primitive {} has no usable positions, it is left empty.", primitive.index());
      return TeoPrimitiveGeometry::default();
    },
  };

  let normals = resolve_view("NORMAL", primitive.get(&gltf::Semantic::Normals), buffers)
    .and_then(|view| read_vec3(&view));
  let tex_coords = resolve_view("TEXCOORD_0", primitive.get(&gltf::Semantic::TexCoords(0)), buffers)
    .and_then(|view| read_tex_coords(&view));
  if normals.as_ref().is_some_and(|n| n.len() < positions.len()) {
    log::warn!("Primitive {} has fewer normals than positions.", primitive.index());
  }
  if tex_coords.as_ref().is_some_and(|t| t.len() < positions.len()) {
    log::warn!("Primitive {} has fewer texture coordinates than positions.", primitive.index());
  }

  let vertices = build_vertices(&positions, normals.as_deref(), tex_coords.as_deref());

  let indices = match primitive.indices() {
    Some(accessor) => match resolve_view("index", Some(accessor), buffers) {
      Some(view) => read_indices(&view),
      None => Vec::new(),
    },
    None => sequential_indices(vertices.len()),
  };
  if indices.iter().any(|&index| index as usize >= vertices.len()) {
    log::warn!("Primitive {} references vertices past its {} vertices.", primitive.index(), vertices.len());
  }

  TeoPrimitiveGeometry {
    vertices,
    indices,
  }
}
