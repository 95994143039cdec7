pub mod camera;
pub mod image_data;
pub mod light;
pub mod transform;

pub use camera::TeoCamera;
pub use image_data::TeoImageData;
pub use light::TeoDirectionalLight;
pub use transform::TeoTransform;
