pub mod vertex;
pub mod cpu;
pub mod gpu;
pub mod loader;

pub use vertex::TeoVertex;
