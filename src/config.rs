use std::path::{
  Path,
  PathBuf,
};

use glam::{
  Vec3,
  Vec4,
};
use serde::{
  Deserialize,
  Serialize,
};

use crate::error::TeoRendererError;
use crate::scene::cpu::{
  TeoCamera,
  TeoDirectionalLight,
};

/// The window section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeoWindowConfig {
  pub title: String,
  pub width: u32,
  pub height: u32,
  pub vsync: bool,
}

impl Default for TeoWindowConfig {
  fn default() -> Self {
    Self {
      title: "Teo - OpenGL glTF Renderer".to_string(),
      width: 1280,
      height: 720,
      vsync: true,
    }
  }
}

/// The shader section. Relative paths are resolved against the working directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeoShaderConfig {
  pub vertex: PathBuf,
  pub fragment: PathBuf,
}

impl Default for TeoShaderConfig {
  fn default() -> Self {
    Self {
      vertex: PathBuf::from("shaders/basic.vert"),
      fragment: PathBuf::from("shaders/basic.frag"),
    }
  }
}

/// The renderer section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeoRenderConfig {
  pub clear_color: [f32; 4],
  pub light_direction: [f32; 3],
  pub light_color: [f32; 3],
  pub ambient_color: [f32; 3],
}

impl Default for TeoRenderConfig {
  fn default() -> Self {
    let light = TeoDirectionalLight::default();
    Self {
      clear_color: [0.1, 0.1, 0.15, 1.0],
      light_direction: light.direction().to_array(),
      light_color: light.color.to_array(),
      ambient_color: light.ambient_color.to_array(),
    }
  }
}

/// The camera section. Angles are in degrees, speeds in units per second.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeoCameraConfig {
  pub fov: f32,
  pub near: f32,
  pub far: f32,
  pub position: [f32; 3],
  pub move_speed: f32,
  pub mouse_sensitivity: f32,
}

impl Default for TeoCameraConfig {
  fn default() -> Self {
    Self {
      fov: 45.0,
      near: 0.1,
      far: 1000.0,
      position: [0.0, 1.0, 5.0],
      move_speed: 5.0,
      mouse_sensitivity: 0.1,
    }
  }
}

/// The viewer configuration. Every field is optional in the JSON file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeoViewerConfig {
  pub window: TeoWindowConfig,
  pub shaders: TeoShaderConfig,
  pub renderer: TeoRenderConfig,
  pub camera: TeoCameraConfig,
}

/// The implementation of the viewer configuration.
impl TeoViewerConfig {
  /// Load the configuration from a JSON file.
  /// param path: The file path.
  /// return: The configuration.
  pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, TeoRendererError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
      .map_err(|err| TeoRendererError::new(&format!("Failed to read config file \"{}\".", path.display()), Some(Box::new(err))))?;
    serde_json::from_str(&text)
      .map_err(|err| TeoRendererError::new(&format!("Failed to parse config file \"{}\".", path.display()), Some(Box::new(err))))
  }

  /// Parse the configuration from JSON text.
  pub fn from_json(text: &str) -> Result<Self, TeoRendererError> {
    serde_json::from_str(text)
      .map_err(|err| TeoRendererError::new(&err.to_string(), Some(Box::new(err))))
  }

  pub fn clear_color(&self) -> Vec4 {
    Vec4::from_array(self.renderer.clear_color)
  }

  /// Build the light. A zero direction falls back to the default direction.
  pub fn light(&self) -> TeoDirectionalLight {
    TeoDirectionalLight::new(
      Vec3::from_array(self.renderer.light_direction),
      Vec3::from_array(self.renderer.light_color),
      Vec3::from_array(self.renderer.ambient_color),
    )
  }

  /// Build the camera at its start position.
  /// param aspect: The framebuffer aspect ratio.
  /// return: The camera.
  pub fn camera(&self, aspect: f32) -> TeoCamera {
    let mut camera = TeoCamera::new(self.camera.fov, aspect, self.camera.near, self.camera.far);
    camera.set_position(Vec3::from_array(self.camera.position));
    camera
  }
}
