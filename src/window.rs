use std::ffi::CString;
use std::num::NonZeroU32;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Instant;

use glutin::config::{
  Config,
  ConfigTemplateBuilder,
  GlConfig,
};
use glutin::context::{
  ContextApi,
  ContextAttributesBuilder,
  GlProfile,
  NotCurrentGlContext,
  PossiblyCurrentContext,
  Version,
};
use glutin::display::{
  Display,
  DisplayApiPreference,
  GetGlDisplay,
  GlDisplay,
};
use glutin::surface::{
  GlSurface,
  Surface,
  SwapInterval,
  WindowSurface,
};
use glutin_winit::GlWindow;
use raw_window_handle::{
  HasDisplayHandle,
  HasWindowHandle,
};
use winit::application::ApplicationHandler;
use winit::event::{
  DeviceEvent,
  DeviceId,
  ElementState,
  WindowEvent,
};
use winit::event_loop::{
  ActiveEventLoop,
  ControlFlow,
  EventLoop,
};
use winit::keyboard::PhysicalKey;
use winit::window::{
  CursorGrabMode,
  Window,
  WindowAttributes,
  WindowId,
};

use crate::backend::{
  TeoGlowApi,
  TeoGraphicsApiRef,
};
use crate::config::TeoViewerConfig;
use crate::error::TeoRendererError;
use crate::input::{
  TeoCaptureChange,
  TeoInputState,
};
use crate::renderer::TeoRenderer;
use crate::scene::cpu::TeoCamera;
use crate::scene::gpu::TeoScene;
use crate::scene::loader::TeoGltfLoader;

/// Everything that lives while the window is open.
///
/// Fields drop in declaration order: GPU resources go before the context.
struct TeoViewerState {
  scene: TeoScene,
  renderer: TeoRenderer,
  camera: TeoCamera,
  input: TeoInputState,
  last_frame: Instant,
  gl_surface: Surface<WindowSurface>,
  gl_context: PossiblyCurrentContext,
  window: Window,
}

/// The windowed viewer application.
pub struct TeoViewerApp {
  config: TeoViewerConfig,
  files: Vec<PathBuf>,
  empty_scene_notice: String,
  state: Option<TeoViewerState>,
  error: Option<TeoRendererError>,
}

/// The implementation of the viewer application.
impl TeoViewerApp {
  /// Create the application. Nothing is created before the event loop resumes.
  /// param config: The viewer configuration.
  /// param files: The glTF files to load.
  /// return: The application.
  pub fn new(config: TeoViewerConfig, files: Vec<PathBuf>) -> Self {
    Self {
      config,
      files,
      empty_scene_notice: "No models loaded. Displaying empty scene.".to_string(),
      state: None,
      error: None,
    }
  }

  /// Set the text printed when no model could be loaded.
  /// param notice: The text, usually the command usage and a short explanation.
  /// return: The application.
  pub fn with_empty_scene_notice(mut self, notice: String) -> Self {
    self.empty_scene_notice = notice;
    self
  }

  /// Run the event loop until the window closes.
  /// return: The result, an error if the window or the renderer could not be created.
  pub fn run(mut self) -> Result<(), TeoRendererError> {
    let event_loop = EventLoop::new()
      .map_err(|err| TeoRendererError::new(&format!("Failed to create the event loop: {}", err), None))?;
    event_loop.set_control_flow(ControlFlow::Poll);
    event_loop.run_app(&mut self)
      .map_err(|err| TeoRendererError::new(&format!("The event loop failed: {}", err), None))?;

    match self.error.take() {
      Some(err) => Err(err),
      None => Ok(()),
    }
  }

  fn create_state(&self, event_loop: &ActiveEventLoop) -> Result<TeoViewerState, TeoRendererError> {
    let window_config = &self.config.window;
    let window_attributes = Window::default_attributes()
      .with_title(window_config.title.as_str())
      .with_inner_size(winit::dpi::PhysicalSize::new(window_config.width, window_config.height))
      .with_resizable(true);

    let template = ConfigTemplateBuilder::new().with_depth_size(24);
    let (window, gl_config) = create_gl_window(event_loop, window_attributes, template)?;

    let raw_window_handle = window.window_handle()
      .map_err(|err| TeoRendererError::new("Failed to get the window handle.", Some(Box::new(err))))?
      .as_raw();
    let gl_display = gl_config.display();
    let context_attributes = ContextAttributesBuilder::new()
      .with_profile(GlProfile::Core)
      .with_context_api(ContextApi::OpenGl(Some(Version::new(3, 3))))
      .build(Some(raw_window_handle));
    let not_current_context = unsafe { gl_display.create_context(&gl_config, &context_attributes)? };

    let surface_attributes = window.build_surface_attributes(Default::default())
      .map_err(|err| TeoRendererError::new("Failed to describe the window surface.", Some(Box::new(err))))?;
    let gl_surface = unsafe { gl_display.create_window_surface(&gl_config, &surface_attributes)? };
    let gl_context = not_current_context.make_current(&gl_surface)?;

    let interval = if window_config.vsync {
      SwapInterval::Wait(NonZeroU32::MIN)
    } else {
      SwapInterval::DontWait
    };
    if let Err(err) = gl_surface.set_swap_interval(&gl_context, interval) {
      log::warn!("Failed to set the swap interval: {}", err);
    }

    let gl = unsafe {
      glow::Context::from_loader_function(|symbol| match CString::new(symbol) {
        Ok(symbol) => gl_display.get_proc_address(&symbol),
        Err(_) => std::ptr::null(),
      })
    };
    let api: TeoGraphicsApiRef = Rc::new(TeoGlowApi::new(gl));
    log::info!("OpenGL {}", api.description());

    let size = window.inner_size();
    let mut renderer = TeoRenderer::new(
      "main",
      Rc::clone(&api),
      &self.config.shaders.vertex,
      &self.config.shaders.fragment,
      size.width.max(1),
      size.height.max(1),
    )?;
    renderer.clear_color = self.config.clear_color();
    renderer.light = self.config.light();

    let camera = self.config.camera(size.width.max(1) as f32 / size.height.max(1) as f32);

    let mut loader = TeoGltfLoader::new(Rc::clone(&api));
    let mut scene = TeoScene::new();
    scene.load_files(&mut loader, &self.files);
    if scene.is_empty() {
      println!("{}", self.empty_scene_notice);
    }

    Ok(TeoViewerState {
      scene,
      renderer,
      camera,
      input: TeoInputState::new(),
      last_frame: Instant::now(),
      gl_surface,
      gl_context,
      window,
    })
  }
}

/// The candidate with the most samples, the first one on ties.
fn pick_most_samples<C>(candidates: impl Iterator<Item = C>, samples: impl Fn(&C) -> u8) -> Option<C> {
  candidates.reduce(|best, candidate| if samples(&candidate) > samples(&best) { candidate } else { best })
}

fn create_display(event_loop: &ActiveEventLoop, preference: DisplayApiPreference) -> Result<Display, TeoRendererError> {
  let raw_display_handle = event_loop.display_handle()
    .map_err(|err| TeoRendererError::new("Failed to get the display handle.", Some(Box::new(err))))?
    .as_raw();
  Ok(unsafe { Display::new(raw_display_handle, preference)? })
}

/// Find the config with a depth buffer and the most samples.
fn pick_config(display: &Display, template: ConfigTemplateBuilder) -> Result<Config, TeoRendererError> {
  let configs = unsafe { display.find_configs(template.build())? };
  pick_most_samples(configs, |config| config.num_samples())
    .ok_or(TeoRendererError::new("No OpenGL config with a depth buffer is available.", None))
}

/// Create the GL display and the window with a matching config.
fn create_gl_window(
  event_loop: &ActiveEventLoop,
  attributes: WindowAttributes,
  template: ConfigTemplateBuilder,
) -> Result<(Window, Config), TeoRendererError> {
  // WGL needs the native window before the display.
  #[cfg(windows)]
  let (window, config) = {
    let window = event_loop.create_window(attributes)
      .map_err(|err| TeoRendererError::new(&format!("Failed to create the window: {}", err), None))?;
    let raw_window_handle = window.window_handle()
      .map_err(|err| TeoRendererError::new("Failed to get the window handle.", Some(Box::new(err))))?
      .as_raw();
    let display = create_display(event_loop, DisplayApiPreference::WglThenEgl(Some(raw_window_handle)))?;
    let config = pick_config(&display, template.compatible_with_native_window(raw_window_handle))?;
    (window, config)
  };

  #[cfg(not(windows))]
  let (window, config) = {
    #[cfg(target_os = "macos")]
    let preference = DisplayApiPreference::Cgl;
    #[cfg(not(target_os = "macos"))]
    let preference = DisplayApiPreference::EglThenGlx(Box::new(winit::platform::x11::register_xlib_error_hook));

    let display = create_display(event_loop, preference)?;
    let config = pick_config(&display, template)?;
    let window = glutin_winit::finalize_window(event_loop, attributes, &config)
      .map_err(|err| TeoRendererError::new(&format!("Failed to create the window: {}", err), None))?;
    (window, config)
  };

  Ok((window, config))
}

/// Apply a capture change to the OS cursor.
fn apply_capture(window: &Window, input: &mut TeoInputState, change: TeoCaptureChange) {
  match change {
    TeoCaptureChange::Capture => {
      let grabbed = window.set_cursor_grab(CursorGrabMode::Locked)
        .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined));
      match grabbed {
        Ok(()) => window.set_cursor_visible(false),
        Err(err) => {
          log::warn!("Failed to capture the mouse: {}", err);
          input.set_captured(false);
        },
      }
    },
    TeoCaptureChange::Release => {
      if let Err(err) = window.set_cursor_grab(CursorGrabMode::None) {
        log::warn!("Failed to release the mouse: {}", err);
      }
      window.set_cursor_visible(true);
    },
  }
}

impl TeoViewerState {
  fn resize(&mut self, width: u32, height: u32) {
    if let (Some(w), Some(h)) = (NonZeroU32::new(width), NonZeroU32::new(height)) {
      self.gl_surface.resize(&self.gl_context, w, h);
      self.renderer.resize(width, height);
      self.camera.set_aspect(width as f32 / height as f32);
    }
  }

  fn frame(&mut self, move_speed: f32, mouse_sensitivity: f32) {
    let now = Instant::now();
    let delta_time = (now - self.last_frame).as_secs_f32();
    self.last_frame = now;

    self.camera.process_keyboard(self.input.movement_direction(), move_speed * delta_time);
    let mouse_delta = self.input.take_mouse_delta();
    self.camera.process_mouse_movement(mouse_delta.x, mouse_delta.y, mouse_sensitivity);

    self.renderer.render(&self.camera, self.scene.models());
    if let Err(err) = self.gl_surface.swap_buffers(&self.gl_context) {
      log::error!("Failed to swap buffers: {}", err);
    }
  }
}

impl ApplicationHandler for TeoViewerApp {
  fn resumed(&mut self, event_loop: &ActiveEventLoop) {
    if self.state.is_some() || self.error.is_some() {
      return;
    }

    match self.create_state(event_loop) {
      Ok(state) => {
        state.window.request_redraw();
        self.state = Some(state);
      },
      Err(err) => {
        log::error!("{}", err);
        self.error = Some(err);
        event_loop.exit();
      },
    }
  }

  fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
    let Some(state) = self.state.as_mut() else {
      return;
    };

    let capture_change = match event {
      WindowEvent::CloseRequested => {
        state.input.request_close();
        None
      },
      WindowEvent::Resized(size) => {
        state.resize(size.width, size.height);
        None
      },
      WindowEvent::Focused(false) => state.input.focus_lost(),
      WindowEvent::KeyboardInput { event, .. } => match event.physical_key {
        PhysicalKey::Code(code) => state.input.key_event(code, event.state == ElementState::Pressed, event.repeat),
        PhysicalKey::Unidentified(_) => None,
      },
      WindowEvent::MouseInput { state: button_state, button, .. } => {
        state.input.mouse_button(button, button_state == ElementState::Pressed)
      },
      WindowEvent::RedrawRequested => {
        state.frame(self.config.camera.move_speed, self.config.camera.mouse_sensitivity);
        None
      },
      _ => None,
    };

    if let Some(change) = capture_change {
      apply_capture(&state.window, &mut state.input, change);
    }
    if state.input.close_requested() {
      event_loop.exit();
    }
  }

  fn device_event(&mut self, _event_loop: &ActiveEventLoop, _device_id: DeviceId, event: DeviceEvent) {
    if let (Some(state), DeviceEvent::MouseMotion { delta }) = (self.state.as_mut(), event) {
      state.input.mouse_motion(delta.0, delta.1);
    }
  }

  fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
    if let Some(state) = &self.state {
      state.window.request_redraw();
    }
  }

  fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
    // Release the GPU resources while the context is still current.
    self.state = None;
  }
}
