use std::path::Path;
use std::rc::Rc;

use crate::backend::{
  TeoGraphicsApiRef,
  TeoPixelFormat,
  TeoTextureId,
};
use crate::error::TeoRendererError;
use crate::scene::cpu::image_data::TeoImageData;

/// A 2D texture in the GPU.
///
/// Owns at most one texture handle. Not clonable: share it through `Rc`.
pub struct TeoTexture {
  api: TeoGraphicsApiRef,
  texture: Option<TeoTextureId>,
  width: u32,
  height: u32,
}

/// The Drop implementation of the texture.
impl Drop for TeoTexture {
  fn drop(&mut self) {
    if self.texture.is_some() {
      self.cleanup();
      log::debug!("A TeoTexture [{} x {}] dropped.", self.width, self.height);
    }
  }
}

impl std::fmt::Debug for TeoTexture {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("TeoTexture")
      .field("texture", &self.texture)
      .field("width", &self.width)
      .field("height", &self.height)
      .finish()
  }
}

/// The implementation of the texture.
impl TeoTexture {
  /// Create an empty texture which owns no GPU resource.
  /// param api: The graphics API.
  /// return: The texture.
  pub fn new(api: TeoGraphicsApiRef) -> Self {
    Self {
      api,
      texture: None,
      width: 0,
      height: 0,
    }
  }

  /// Create a texture and upload the image to it.
  /// param api: The graphics API.
  /// param image: The decoded image.
  /// return: The texture.
  pub fn with_image(api: TeoGraphicsApiRef, image: &TeoImageData) -> Result<Self, TeoRendererError> {
    let mut texture = Self::new(api);
    texture.upload(image)?;
    Ok(texture)
  }

  /// Decode an image file and upload it.
  /// param path: The image file path.
  /// return: The result.
  pub fn load_from_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), TeoRendererError> {
    let image = TeoImageData::new_with_file(path)?;
    self.upload(&image)
  }

  /// Decode an encoded image held in memory and upload it.
  /// param bytes: The encoded image.
  /// return: The result.
  pub fn load_from_memory(&mut self, bytes: &[u8]) -> Result<(), TeoRendererError> {
    let image = TeoImageData::new_with_memory(bytes)?;
    self.upload(&image)
  }

  /// Upload decoded pixels, releasing the previously owned texture first.
  /// param image: The decoded image.
  /// return: The result.
  pub fn upload(&mut self, image: &TeoImageData) -> Result<(), TeoRendererError> {
    self.cleanup();

    let format = TeoPixelFormat::from_channels(image.channels)
      .ok_or(TeoRendererError::new(&format!("Unsupported texture channel count {}.", image.channels), None))?;
    let expected = image.width as usize * image.height as usize * format.bytes_per_pixel();
    if image.pixels.len() != expected {
      return Err(TeoRendererError::new(
        &format!("Texture [{} x {}] expects {} bytes but got {}.", image.width, image.height, expected, image.pixels.len()),
        None,
      ));
    }

    let texture = self.api.create_texture()?;
    self.api.upload_texture_2d(texture, image.width, image.height, format, &image.pixels);

    self.texture = Some(texture);
    self.width = image.width;
    self.height = image.height;
    log::debug!("A TeoTexture [{} x {}] uploaded.", self.width, self.height);
    Ok(())
  }

  /// Bind the texture to a texture unit.
  pub fn bind(&self, unit: u32) {
    self.api.bind_texture(unit, self.texture);
  }

  pub fn unbind(&self, unit: u32) {
    self.api.bind_texture(unit, None);
  }

  /// Move the GPU texture out, leaving this instance empty.
  pub fn take(&mut self) -> Self {
    let empty = Self::new(Rc::clone(&self.api));
    std::mem::replace(self, empty)
  }

  pub fn id(&self) -> Option<TeoTextureId> {
    self.texture
  }

  pub fn is_valid(&self) -> bool {
    self.texture.is_some()
  }

  pub fn width(&self) -> u32 {
    self.width
  }

  pub fn height(&self) -> u32 {
    self.height
  }

  fn cleanup(&mut self) {
    if let Some(texture) = self.texture.take() {
      self.api.delete_texture(texture);
    }
    self.width = 0;
    self.height = 0;
  }
}
