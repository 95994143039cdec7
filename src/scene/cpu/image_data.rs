use std::path::Path;

use image::{
  DynamicImage,
  GenericImageView,
};

use crate::error::TeoRendererError;

/// Decoded 8-bit pixels ready for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeoImageData {
  pub width: u32,
  pub height: u32,
  /// 1 (R), 3 (RGB) or 4 (RGBA).
  pub channels: u8,
  pub pixels: Vec<u8>,
}

impl TeoImageData {
  /// Decode an image file.
  /// param path: The file path.
  /// return: The result.
  pub fn new_with_file<P: AsRef<Path>>(path: P) -> Result<Self, TeoRendererError> {
    let path = path.as_ref();

    let img = image::open(path)
      .map_err(|e| TeoRendererError::new(&format!("Failed to open image \"{}\".", path.to_string_lossy()), Some(Box::new(e))))?;
    Ok(Self::from_dynamic(img))
  }

  /// Decode an encoded image (PNG, JPEG, ...) held in memory.
  /// param bytes: The encoded bytes.
  /// return: The result.
  pub fn new_with_memory(bytes: &[u8]) -> Result<Self, TeoRendererError> {
    let img = image::load_from_memory(bytes)
      .map_err(|e| TeoRendererError::new("Failed to decode embedded image.", Some(Box::new(e))))?;
    Ok(Self::from_dynamic(img))
  }

  fn from_dynamic(img: DynamicImage) -> Self {
    let (width, height) = img.dimensions();

    // Only R, RGB and RGBA are uploaded, everything else is widened or narrowed to 8 bits.
    let (channels, pixels) = match img.color() {
      image::ColorType::L8 | image::ColorType::L16 => (1, img.into_luma8().into_raw()),
      image::ColorType::Rgb8 | image::ColorType::Rgb16 | image::ColorType::Rgb32F => (3, img.into_rgb8().into_raw()),
      _ => (4, img.into_rgba8().into_raw()),
    };

    Self {
      width,
      height,
      channels,
      pixels,
    }
  }
}
