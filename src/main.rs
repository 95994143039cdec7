use std::path::PathBuf;
use std::process::ExitCode;
use std::rc::Rc;

use anyhow::Context;
use clap::{
  CommandFactory,
  Parser,
};

use teo_renderer::prelude::*;

/// A minimal OpenGL glTF/GLB viewer.
#[derive(Parser, Debug)]
#[command(name = "teo", version)]
struct Cli {
  /// The glTF (.gltf) or binary glTF (.glb) files to show.
  files: Vec<PathBuf>,

  /// A JSON configuration file.
  #[arg(long)]
  config: Option<PathBuf>,

  /// Load the files and the shaders without opening a window, then exit.
  #[arg(long)]
  headless: bool,
}

fn print_controls() {
  println!();
  println!("Controls:");
  println!("  WASD - Move camera");
  println!("  Mouse - Look around (click to capture)");
  println!("  Space/Shift - Move up/down");
  println!("  ESC - Release mouse / Exit");
}

/// The usage line and the explanation printed when no model could be loaded.
fn empty_scene_notice() -> String {
  format!("{}\nNo models loaded. Displaying empty scene.", Cli::command().render_usage())
}

/// Load everything against the headless API and render a single frame.
fn run_headless(config: &TeoViewerConfig, files: &[PathBuf], empty_scene_notice: &str) -> anyhow::Result<()> {
  let headless = Rc::new(TeoHeadlessApi::new());
  let api: TeoGraphicsApiRef = headless.clone();

  let (width, height) = (config.window.width.max(1), config.window.height.max(1));
  let mut renderer = TeoRenderer::new("headless", Rc::clone(&api), &config.shaders.vertex, &config.shaders.fragment, width, height)
    .context("Failed to initialize the renderer")?;
  renderer.clear_color = config.clear_color();
  renderer.light = config.light();

  let mut loader = TeoGltfLoader::new(Rc::clone(&api));
  let mut scene = TeoScene::new();
  let loaded = scene.load_files(&mut loader, files);
  if scene.is_empty() {
    println!("{}", empty_scene_notice);
  }
  for model in scene.models() {
    let textured = model.meshes().iter().filter(|mesh| mesh.material().has_texture()).count();
    log::info!(
      "Model \"{}\": {} meshes ({} textured), {} indices.",
      model.name,
      model.mesh_count(),
      textured,
      model.index_count(),
    );
  }

  let camera = config.camera(width as f32 / height as f32);
  renderer.render(&camera, scene.models());
  log::info!(
    "{} of {} files loaded, {} draw calls, {} texture uploads.",
    loaded,
    files.len(),
    headless.draw_calls().len(),
    headless.texture_uploads(),
  );
  Ok(())
}

fn run(cli: Cli) -> anyhow::Result<()> {
  let config = match &cli.config {
    Some(path) => TeoViewerConfig::load(path).context("Failed to load the configuration")?,
    None => TeoViewerConfig::default(),
  };

  let notice = empty_scene_notice();
  if cli.headless {
    return run_headless(&config, &cli.files, &notice);
  }

  print_controls();
  TeoViewerApp::new(config, cli.files)
    .with_empty_scene_notice(notice)
    .run()
    .context("Failed to run the viewer")?;
  Ok(())
}

fn main() -> ExitCode {
  env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

  match run(Cli::parse()) {
    Ok(()) => ExitCode::SUCCESS,
    Err(err) => {
      log::error!("{:#}", err);
      ExitCode::FAILURE
    },
  }
}
