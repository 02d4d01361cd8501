//! Error types for the backdrop.
//!
//! Nothing here is ever surfaced to the page: startup failures are logged and
//! the backdrop simply renders nothing.

use std::fmt;

/// Errors that can occur while mounting the backdrop or loading settings.
#[derive(Debug)]
pub enum BackdropError {
    /// No global `window` (not running in a browser main thread).
    NoWindow,
    /// The window has no document.
    NoDocument,
    /// No element with the requested id.
    CanvasNotFound(String),
    /// The element exists but is not a `<canvas>`.
    NotACanvas,
    /// The canvas refused to hand out a 2D context.
    ContextUnavailable,
    /// A host call threw.
    Js(String),
    /// Settings JSON could not be parsed or written.
    Settings(serde_json::Error),
}

impl fmt::Display for BackdropError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackdropError::NoWindow => write!(f, "No global window available"),
            BackdropError::NoDocument => write!(f, "Window has no document"),
            BackdropError::CanvasNotFound(id) => write!(f, "No element with id '{}'", id),
            BackdropError::NotACanvas => write!(f, "Backdrop element is not a canvas"),
            BackdropError::ContextUnavailable => write!(f, "2D drawing context unavailable"),
            BackdropError::Js(msg) => write!(f, "Host call failed: {}", msg),
            BackdropError::Settings(e) => write!(f, "Invalid settings: {}", e),
        }
    }
}

impl std::error::Error for BackdropError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BackdropError::Settings(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for BackdropError {
    fn from(e: serde_json::Error) -> Self {
        BackdropError::Settings(e)
    }
}

#[cfg(target_arch = "wasm32")]
impl From<wasm_bindgen::JsValue> for BackdropError {
    fn from(value: wasm_bindgen::JsValue) -> Self {
        BackdropError::Js(value.as_string().unwrap_or_else(|| format!("{:?}", value)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_settings_error_has_source() {
        let parse = serde_json::from_str::<u32>("not json").unwrap_err();
        let err = BackdropError::from(parse);
        assert!(err.source().is_some());
        assert!(err.to_string().starts_with("Invalid settings"));
    }

    #[test]
    fn test_display_names_missing_canvas() {
        let err = BackdropError::CanvasNotFound("backdrop".into());
        assert_eq!(err.to_string(), "No element with id 'backdrop'");
        assert!(err.source().is_none());
    }
}
