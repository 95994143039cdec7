#![allow(dead_code)]

use std::io::Cursor;
use std::path::{
  Path,
  PathBuf,
};
use std::sync::atomic::{
  AtomicUsize,
  Ordering,
};

use base64::Engine;
use serde_json::{
  json,
  Value,
};

pub const UNSIGNED_BYTE: u32 = 5121;
pub const UNSIGNED_SHORT: u32 = 5123;
pub const UNSIGNED_INT: u32 = 5125;
pub const FLOAT: u32 = 5126;

pub const MODE_LINES: u32 = 1;
pub const MODE_TRIANGLES: u32 = 4;

pub const VERTEX_SHADER: &str = include_str!("../../shaders/basic.vert");
pub const FRAGMENT_SHADER: &str = include_str!("../../shaders/basic.frag");

/// A fresh, empty directory under the system temp directory.
pub fn temp_dir(name: &str) -> PathBuf {
  static COUNTER: AtomicUsize = AtomicUsize::new(0);
  let dir = std::env::temp_dir().join(format!(
    "teo-renderer-{}-{}-{}",
    name,
    std::process::id(),
    COUNTER.fetch_add(1, Ordering::SeqCst),
  ));
  let _ = std::fs::remove_dir_all(&dir);
  std::fs::create_dir_all(&dir).unwrap();
  dir
}

/// A PNG of one solid color.
pub fn png_bytes(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
  let img = image::RgbaImage::from_pixel(width, height, image::Rgba(rgba));
  let mut bytes = Vec::new();
  image::DynamicImage::ImageRgba8(img)
    .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
    .unwrap();
  bytes
}

/// Builds small glTF documents with a single buffer.
#[derive(Default)]
pub struct GltfBuilder {
  buffer: Vec<u8>,
  buffer_views: Vec<Value>,
  accessors: Vec<Value>,
  meshes: Vec<Value>,
  materials: Vec<Value>,
  textures: Vec<Value>,
  images: Vec<Value>,
}

impl GltfBuilder {
  pub fn new() -> Self {
    Self::default()
  }

  fn push_view(&mut self, bytes: &[u8], target: Option<u32>) -> usize {
    while self.buffer.len() % 4 != 0 {
      self.buffer.push(0);
    }
    let mut view = json!({
      "buffer": 0,
      "byteOffset": self.buffer.len(),
      "byteLength": bytes.len(),
    });
    if let Some(target) = target {
      view["target"] = json!(target);
    }
    self.buffer.extend_from_slice(bytes);
    self.buffer_views.push(view);
    self.buffer_views.len() - 1
  }

  fn push_accessor(&mut self, accessor: Value) -> usize {
    self.accessors.push(accessor);
    self.accessors.len() - 1
  }

  pub fn positions(&mut self, positions: &[[f32; 3]]) -> usize {
    let bytes: Vec<u8> = positions.iter().flatten().flat_map(|v| v.to_le_bytes()).collect();
    let view = self.push_view(&bytes, Some(34962));
    let mut min = [f32::MAX; 3];
    let mut max = [f32::MIN; 3];
    for position in positions {
      for i in 0..3 {
        min[i] = min[i].min(position[i]);
        max[i] = max[i].max(position[i]);
      }
    }
    self.push_accessor(json!({
      "bufferView": view,
      "componentType": FLOAT,
      "count": positions.len(),
      "type": "VEC3",
      "min": min,
      "max": max,
    }))
  }

  /// A POSITION accessor without min and max bounds.
  pub fn positions_without_bounds(&mut self, positions: &[[f32; 3]]) -> usize {
    let bytes: Vec<u8> = positions.iter().flatten().flat_map(|v| v.to_le_bytes()).collect();
    let view = self.push_view(&bytes, Some(34962));
    self.push_accessor(json!({
      "bufferView": view,
      "componentType": FLOAT,
      "count": positions.len(),
      "type": "VEC3",
    }))
  }

  /// A POSITION accessor without a buffer view.
  pub fn positions_without_view(&mut self, count: usize) -> usize {
    self.push_accessor(json!({
      "componentType": FLOAT,
      "count": count,
      "type": "VEC3",
      "min": [0.0, 0.0, 0.0],
      "max": [0.0, 0.0, 0.0],
    }))
  }

  pub fn normals(&mut self, normals: &[[f32; 3]]) -> usize {
    let bytes: Vec<u8> = normals.iter().flatten().flat_map(|v| v.to_le_bytes()).collect();
    let view = self.push_view(&bytes, Some(34962));
    self.push_accessor(json!({
      "bufferView": view,
      "componentType": FLOAT,
      "count": normals.len(),
      "type": "VEC3",
    }))
  }

  pub fn tex_coords(&mut self, tex_coords: &[[f32; 2]]) -> usize {
    let bytes: Vec<u8> = tex_coords.iter().flatten().flat_map(|v| v.to_le_bytes()).collect();
    let view = self.push_view(&bytes, Some(34962));
    self.push_accessor(json!({
      "bufferView": view,
      "componentType": FLOAT,
      "count": tex_coords.len(),
      "type": "VEC2",
    }))
  }

  fn indices(&mut self, component_type: u32, bytes: Vec<u8>, count: usize) -> usize {
    let view = self.push_view(&bytes, Some(34963));
    self.push_accessor(json!({
      "bufferView": view,
      "componentType": component_type,
      "count": count,
      "type": "SCALAR",
    }))
  }

  pub fn indices_u8(&mut self, indices: &[u8]) -> usize {
    self.indices(UNSIGNED_BYTE, indices.to_vec(), indices.len())
  }

  pub fn indices_u16(&mut self, indices: &[u16]) -> usize {
    self.indices(UNSIGNED_SHORT, indices.iter().flat_map(|v| v.to_le_bytes()).collect(), indices.len())
  }

  pub fn indices_u32(&mut self, indices: &[u32]) -> usize {
    self.indices(UNSIGNED_INT, indices.iter().flat_map(|v| v.to_le_bytes()).collect(), indices.len())
  }

  /// An image stored in the buffer.
  pub fn embedded_image(&mut self, png: &[u8]) -> usize {
    let view = self.push_view(png, None);
    self.images.push(json!({ "bufferView": view, "mimeType": "image/png" }));
    self.images.len() - 1
  }

  /// An image stored in the buffer without a mime type.
  pub fn embedded_image_without_mime_type(&mut self, png: &[u8]) -> usize {
    let view = self.push_view(png, None);
    self.raw_image(json!({ "bufferView": view }))
  }

  /// An image object written as given.
  pub fn raw_image(&mut self, image: Value) -> usize {
    self.images.push(image);
    self.images.len() - 1
  }

  /// An image referenced by URI.
  pub fn uri_image(&mut self, uri: &str) -> usize {
    self.images.push(json!({ "uri": uri }));
    self.images.len() - 1
  }

  pub fn texture(&mut self, image: usize) -> usize {
    self.textures.push(json!({ "source": image }));
    self.textures.len() - 1
  }

  pub fn material(&mut self, base_color_factor: [f32; 4], texture: Option<usize>) -> usize {
    let mut pbr = json!({ "baseColorFactor": base_color_factor });
    if let Some(texture) = texture {
      pbr["baseColorTexture"] = json!({ "index": texture });
    }
    self.materials.push(json!({ "pbrMetallicRoughness": pbr }));
    self.materials.len() - 1
  }

  /// Describe a primitive. Attributes are (semantic, accessor) pairs.
  pub fn primitive(attributes: &[(&str, usize)], indices: Option<usize>, material: Option<usize>, mode: u32) -> Value {
    let attributes: serde_json::Map<String, Value> = attributes.iter()
      .map(|(name, accessor)| (name.to_string(), json!(accessor)))
      .collect();
    let mut primitive = json!({ "attributes": attributes, "mode": mode });
    if let Some(indices) = indices {
      primitive["indices"] = json!(indices);
    }
    if let Some(material) = material {
      primitive["material"] = json!(material);
    }
    primitive
  }

  pub fn mesh(&mut self, primitives: Vec<Value>) -> usize {
    self.meshes.push(json!({ "primitives": primitives }));
    self.meshes.len() - 1
  }

  fn document(&self, buffer_uri: Option<String>) -> Value {
    let mut document = json!({ "asset": { "version": "2.0" } });
    if !self.buffer.is_empty() {
      let mut buffer = json!({ "byteLength": self.buffer.len() });
      if let Some(uri) = buffer_uri {
        buffer["uri"] = json!(uri);
      }
      document["buffers"] = json!([buffer]);
      document["bufferViews"] = json!(self.buffer_views);
    }
    for (key, items) in [
      ("accessors", &self.accessors),
      ("meshes", &self.meshes),
      ("materials", &self.materials),
      ("textures", &self.textures),
      ("images", &self.images),
    ] {
      if !items.is_empty() {
        document[key] = json!(items);
      }
    }
    document
  }

  /// The document as .gltf JSON with the buffer inlined as a data URI.
  pub fn to_gltf(&self) -> String {
    let uri = format!(
      "data:application/octet-stream;base64,{}",
      base64::engine::general_purpose::STANDARD.encode(&self.buffer),
    );
    self.document(Some(uri)).to_string()
  }

  /// The document as a binary .glb container.
  pub fn to_glb(&self) -> Vec<u8> {
    let mut json = self.document(None).to_string().into_bytes();
    while json.len() % 4 != 0 {
      json.push(b' ');
    }
    let mut bin = self.buffer.clone();
    while bin.len() % 4 != 0 {
      bin.push(0);
    }

    let mut total = 12 + 8 + json.len();
    if !bin.is_empty() {
      total += 8 + bin.len();
    }
    let mut glb = Vec::with_capacity(total);
    glb.extend_from_slice(b"glTF");
    glb.extend_from_slice(&2u32.to_le_bytes());
    glb.extend_from_slice(&(total as u32).to_le_bytes());
    glb.extend_from_slice(&(json.len() as u32).to_le_bytes());
    glb.extend_from_slice(&0x4E4F534Au32.to_le_bytes());
    glb.extend_from_slice(&json);
    if !bin.is_empty() {
      glb.extend_from_slice(&(bin.len() as u32).to_le_bytes());
      glb.extend_from_slice(&0x004E4942u32.to_le_bytes());
      glb.extend_from_slice(&bin);
    }
    glb
  }

  pub fn write_gltf(&self, dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(format!("{}.gltf", name));
    std::fs::write(&path, self.to_gltf()).unwrap();
    path
  }

  pub fn write_glb(&self, dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(format!("{}.glb", name));
    std::fs::write(&path, self.to_glb()).unwrap();
    path
  }
}

/// One triangle facing +Z.
pub const TRIANGLE: [[f32; 3]; 3] = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];

/// A unit quad facing +Z, as four corners.
pub const QUAD: [[f32; 3]; 4] = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]];

/// The vertices last uploaded for a mesh.
pub fn uploaded_vertices(api: &teo_renderer::backend::TeoHeadlessApi, mesh: &teo_renderer::scene::gpu::TeoMesh) -> Vec<teo_renderer::scene::TeoVertex> {
  let bytes = api.buffer_contents(mesh.vertex_buffer().unwrap()).unwrap();
  bytes.chunks_exact(std::mem::size_of::<teo_renderer::scene::TeoVertex>())
    .map(bytemuck::pod_read_unaligned)
    .collect()
}

/// The indices last uploaded for a mesh.
pub fn uploaded_indices(api: &teo_renderer::backend::TeoHeadlessApi, mesh: &teo_renderer::scene::gpu::TeoMesh) -> Vec<u32> {
  let bytes = api.buffer_contents(mesh.index_buffer().unwrap()).unwrap();
  bytes.chunks_exact(4)
    .map(|chunk| u32::from_ne_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
    .collect()
}
