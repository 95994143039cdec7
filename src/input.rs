use std::collections::HashSet;

use glam::{
  Vec2,
  Vec3,
};
use winit::event::MouseButton;
use winit::keyboard::KeyCode;

/// A change of the mouse capture the window has to apply to the OS cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeoCaptureChange {
  Capture,
  Release,
}

/// The per-frame input of the viewer.
///
/// Mouse motion only counts while the mouse is captured and is accumulated
/// until read with [`TeoInputState::take_mouse_delta`].
#[derive(Debug, Default)]
pub struct TeoInputState {
  keys_down: HashSet<KeyCode>,
  mouse_delta: Vec2,
  captured: bool,
  close_requested: bool,
}

/// The implementation of the input state.
impl TeoInputState {
  pub fn new() -> Self {
    Self::default()
  }

  /// Feed a physical key event.
  /// param code: The physical key.
  /// param pressed: Whether the key went down.
  /// param repeat: Whether the event is an auto repeat.
  /// return: The capture change to apply, if any.
  pub fn key_event(&mut self, code: KeyCode, pressed: bool, repeat: bool) -> Option<TeoCaptureChange> {
    if !pressed {
      self.keys_down.remove(&code);
      return None;
    }
    self.keys_down.insert(code);

    if code == KeyCode::Escape && !repeat {
      if self.captured {
        self.captured = false;
        return Some(TeoCaptureChange::Release);
      }
      self.close_requested = true;
    }
    None
  }

  /// Feed a mouse button event. A left click captures the mouse.
  pub fn mouse_button(&mut self, button: MouseButton, pressed: bool) -> Option<TeoCaptureChange> {
    if pressed && button == MouseButton::Left && !self.captured {
      self.captured = true;
      return Some(TeoCaptureChange::Capture);
    }
    None
  }

  /// Feed a relative mouse motion in pixels.
  pub fn mouse_motion(&mut self, dx: f64, dy: f64) {
    if self.captured {
      self.mouse_delta += Vec2::new(dx as f32, dy as f32);
    }
  }

  /// Drop the held keys and the capture when the window loses focus.
  pub fn focus_lost(&mut self) -> Option<TeoCaptureChange> {
    self.keys_down.clear();
    self.mouse_delta = Vec2::ZERO;
    if self.captured {
      self.captured = false;
      return Some(TeoCaptureChange::Release);
    }
    None
  }

  /// Force the capture state, e.g. when the OS refused the cursor grab.
  pub fn set_captured(&mut self, captured: bool) {
    self.captured = captured;
  }

  pub fn request_close(&mut self) {
    self.close_requested = true;
  }

  pub fn close_requested(&self) -> bool {
    self.close_requested
  }

  pub fn is_captured(&self) -> bool {
    self.captured
  }

  pub fn is_key_down(&self, code: KeyCode) -> bool {
    self.keys_down.contains(&code)
  }

  /// Return the mouse motion since the last call and reset it.
  pub fn take_mouse_delta(&mut self) -> Vec2 {
    std::mem::take(&mut self.mouse_delta)
  }

  /// The camera space movement from WASD, Space and left Shift.
  /// return: x is right, y is world up and z is forward, each in [-1, 1].
  pub fn movement_direction(&self) -> Vec3 {
    let axis = |positive: KeyCode, negative: KeyCode| {
      self.is_key_down(positive) as i32 as f32 - self.is_key_down(negative) as i32 as f32
    };
    Vec3::new(
      axis(KeyCode::KeyD, KeyCode::KeyA),
      axis(KeyCode::Space, KeyCode::ShiftLeft),
      axis(KeyCode::KeyW, KeyCode::KeyS),
    )
  }
}
