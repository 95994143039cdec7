pub mod prelude;
pub mod error;
pub mod backend;
pub mod config;
pub mod input;
pub mod shader_program;
pub mod renderer;
pub mod scene;
pub mod window;
