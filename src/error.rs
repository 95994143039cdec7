use thiserror::Error;

/// The error type of the teo-renderer crate.
#[derive(Error, Debug)]
pub struct TeoRendererError {
  msg: String,
  #[source]
  source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

/// The implementation of the error type of the teo-renderer crate.
impl TeoRendererError {
  /// Create a new error.
  /// param msg: The message of the error.
  /// param source: The source of the error.
  /// return: The error.
  pub fn new(msg: &str, source: Option<Box<dyn std::error::Error + Send + Sync>>) -> Self {
    Self {
      msg: msg.to_string(),
      source,
    }
  }

  pub fn message(&self) -> &str {
    &self.msg
  }
}

impl std::convert::From<std::io::Error> for TeoRendererError {
  fn from(err: std::io::Error) -> Self {
    Self {
      msg: err.to_string(),
      source: Some(Box::new(err)),
    }
  }
}

impl std::convert::From<glutin::error::Error> for TeoRendererError {
  fn from(err: glutin::error::Error) -> Self {
    Self {
      msg: format!("GL context error: {}", err),
      source: Some(Box::new(err)),
    }
  }
}

/// The implementation Display trait for the error type of the teo-renderer crate.
impl std::fmt::Display for TeoRendererError {
  /// Format the error.
  /// param f: The formatter.
  /// return: The result.
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.msg)
  }
}
