use std::collections::HashMap;
use std::path::Path;
use std::rc::Rc;

use base64::Engine;
use glam::Vec4;

use crate::backend::TeoGraphicsApiRef;
use crate::error::TeoRendererError;
use crate::scene::cpu::image_data::TeoImageData;
use crate::scene::gpu::{
  TeoMaterial,
  TeoTexture,
};

/// Decode the payload of a `data:` URI.
/// param uri: The URI.
/// return: None if the URI is not a data URI, otherwise the decode result.
pub fn decode_data_uri(uri: &str) -> Option<Result<Vec<u8>, TeoRendererError>> {
  let rest = uri.strip_prefix("data:")?;
  let result = match rest.split_once(',') {
    Some((header, payload)) if header.ends_with(";base64") => {
      base64::engine::general_purpose::STANDARD.decode(payload)
        .map_err(|err| TeoRendererError::new("Failed to decode base64 data URI.", Some(Box::new(err))))
    },
    Some((header, _)) => Err(TeoRendererError::new(&format!("Unsupported data URI encoding \"{}\".", header), None)),
    None => Err(TeoRendererError::new("Malformed data URI.", None)),
  };
  Some(result)
}

/// Turns glTF materials into renderer materials.
///
/// Holds the texture cache of one load, keyed by glTF texture index. A failed
/// texture is cached as `None` so it is not retried for every primitive.
pub struct TeoMaterialResolver {
  api: TeoGraphicsApiRef,
  texture_cache: HashMap<usize, Option<Rc<TeoTexture>>>,
}

/// The implementation of the material resolver.
impl TeoMaterialResolver {
  pub fn new(api: TeoGraphicsApiRef) -> Self {
    Self {
      api,
      texture_cache: HashMap::new(),
    }
  }

  /// Forget every cached texture. Textures still referenced by materials stay alive.
  pub fn clear(&mut self) {
    self.texture_cache.clear();
  }

  /// The number of texture indices resolved since the last clear.
  pub fn cached_textures(&self) -> usize {
    self.texture_cache.len()
  }

  /// Build the material of a primitive.
  /// param document: The glTF document the material belongs to.
  /// param material: The glTF material, the default material if it has no index.
  /// param base_dir: The directory external images are resolved against.
  /// param buffers: The loaded buffer data.
  /// return: The material.
  pub fn resolve(
    &mut self,
    document: &gltf::Document,
    material: &gltf::Material,
    base_dir: &Path,
    buffers: &[gltf::buffer::Data],
  ) -> TeoMaterial {
    if material.index().is_none() {
      return TeoMaterial::default();
    }
    log::debug!("Resolving material \"{}\".", material.name().unwrap_or("<Unnamed>"));

    let pbr = material.pbr_metallic_roughness();
    let base_color_texture = pbr.base_color_texture()
      .and_then(|info| self.resolve_texture(document, &info.texture(), base_dir, buffers));

    TeoMaterial::new(Vec4::from_array(pbr.base_color_factor()), base_color_texture)
  }

  fn resolve_texture(
    &mut self,
    document: &gltf::Document,
    texture: &gltf::Texture,
    base_dir: &Path,
    buffers: &[gltf::buffer::Data],
  ) -> Option<Rc<TeoTexture>> {
    if let Some(cached) = self.texture_cache.get(&texture.index()) {
      return cached.clone();
    }

    let loaded = match Self::decode_image(document, &texture.source(), base_dir, buffers)
      .and_then(|image| TeoTexture::with_image(Rc::clone(&self.api), &image))
    {
      Ok(loaded) => Some(Rc::new(loaded)),
      Err(err) => {
        log::warn!("Texture {} is not available: {}", texture.index(), err);
        None
      },
    };
    self.texture_cache.insert(texture.index(), loaded.clone());
    loaded
  }

  /// Decode the image of a texture. Buffer view data takes priority over a URI.
  ///
  /// Reads the image description directly, so an image with neither source,
  /// or an embedded image without a MIME type, is an error instead of a panic.
  fn decode_image(
    document: &gltf::Document,
    image: &gltf::Image,
    base_dir: &Path,
    buffers: &[gltf::buffer::Data],
  ) -> Result<TeoImageData, TeoRendererError> {
    log::debug!("Loading image \"{}\".", image.name().unwrap_or("<Unnamed>"));
    let json = document.as_json().images.get(image.index())
      .ok_or(TeoRendererError::new(&format!("Image {} does not exist.", image.index()), None))?;

    if let Some(view_index) = json.buffer_view.as_ref() {
      let view = document.views().nth(view_index.value())
        .ok_or(TeoRendererError::new(&format!("Image buffer view {} does not exist.", view_index.value()), None))?;
      let buffer = buffers.get(view.buffer().index())
        .ok_or(TeoRendererError::new(&format!("Buffer {} is not loaded.", view.buffer().index()), None))?;
      let bytes = buffer.0.get(view.offset()..view.offset().saturating_add(view.length()))
        .ok_or(TeoRendererError::new(&format!("Image buffer view {} is out of range.", view.index()), None))?;
      return TeoImageData::new_with_memory(bytes);
    }

    match json.uri.as_deref() {
      Some(uri) => match decode_data_uri(uri) {
        Some(bytes) => TeoImageData::new_with_memory(&bytes?),
        None => TeoImageData::new_with_file(base_dir.join(uri)),
      },
      None => Err(TeoRendererError::new(&format!("Image {} has neither a buffer view nor a URI.", image.index()), None)),
    }
  }
}
