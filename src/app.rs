//! Frame boundary
//!
//! Runs each frame of the mounted application and catches panics and frame
//! errors. A failed frame unmounts the application and leaves an error
//! screen up until the user retries, which mounts a fresh one.

use macroquad::prelude::*;
use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::{error, info};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    #[error("frame panicked: {0}")]
    Panicked(String),
    #[error("render error: {0}")]
    Render(String),
}

/// What the boundary is currently showing
#[derive(Debug)]
pub enum BoundaryState<T> {
    Running(T),
    Failed {
        message: String,
        /// False when no frame ever completed, which points at the graphics
        /// backend rather than the editor
        backend_supported: bool,
    },
}

pub struct EngineBoundary<T> {
    factory: Box<dyn FnMut() -> T>,
    state: BoundaryState<T>,
    frames_completed: u64,
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

impl<T> EngineBoundary<T> {
    /// Mount the first instance from `factory`
    pub fn new(mut factory: impl FnMut() -> T + 'static) -> Self {
        let app = factory();
        Self { factory: Box::new(factory), state: BoundaryState::Running(app), frames_completed: 0 }
    }

    pub fn state(&self) -> &BoundaryState<T> {
        &self.state
    }

    pub fn app(&self) -> Option<&T> {
        match &self.state {
            BoundaryState::Running(app) => Some(app),
            BoundaryState::Failed { .. } => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.state, BoundaryState::Failed { .. })
    }

    /// Run one frame. Returns the error that took the application down, if any.
    pub fn run_frame(&mut self, frame: impl FnOnce(&mut T) -> Result<(), EngineError>) -> Option<EngineError> {
        let BoundaryState::Running(app) = &mut self.state else {
            return None;
        };
        let result = match catch_unwind(AssertUnwindSafe(|| frame(app))) {
            Ok(result) => result,
            Err(payload) => Err(EngineError::Panicked(panic_message(payload.as_ref()))),
        };
        match result {
            Ok(()) => {
                self.frames_completed += 1;
                None
            }
            Err(e) => {
                error!(frames = self.frames_completed, "engine error: {}", e);
                self.state = BoundaryState::Failed {
                    message: e.to_string(),
                    backend_supported: self.frames_completed > 0,
                };
                Some(e)
            }
        }
    }

    /// Mount a fresh instance after a failure
    pub fn retry(&mut self) {
        if self.is_failed() {
            info!("remounting after engine error");
            self.state = BoundaryState::Running((self.factory)());
            self.frames_completed = 0;
        }
    }
}

/// Error screen for a failed boundary. Returns true when retry was requested.
pub fn draw_engine_error(message: &str, backend_supported: bool) -> bool {
    clear_background(Color::new(0.12, 0.05, 0.06, 1.0));
    let x = 40.0;
    draw_text("Engine error", x, 80.0, 36.0, Color::new(1.0, 0.45, 0.45, 1.0));
    draw_text(message, x, 120.0, 18.0, WHITE);
    if !backend_supported {
        draw_text(
            "The graphics backend may not be supported on this system.",
            x,
            150.0,
            18.0,
            Color::new(1.0, 0.8, 0.4, 1.0),
        );
    }
    draw_text("Press R or click to retry", x, 190.0, 18.0, GRAY);
    is_key_pressed(KeyCode::R) || is_mouse_button_pressed(MouseButton::Left)
}
