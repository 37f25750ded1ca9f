//! Roomcraft: a 3D room designer
//!
//! Lay out walls, doors, windows, a ceiling and furniture inside a room
//! volume. Objects are placed by dragging them across the floor; positions
//! snap to a grid and stay inside the room.

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

mod app;
mod config;
mod editor;
mod storage;
mod viewport;
mod world;

use macroquad::prelude::*;
use tracing::{info, warn};

use app::{draw_engine_error, BoundaryState, EngineBoundary, EngineError};
use config::EditorConfig;
use editor::{apply_cursor, draw_viewport_3d, CursorStyle, EditorState};
use storage::{KeyValueStore, RoomService};
use viewport::SurfaceSize;

fn window_conf() -> Conf {
    let (config, _) = EditorConfig::load_or_default(&EditorConfig::default_path());
    Conf {
        window_title: format!("Roomcraft v{}", VERSION),
        window_width: config.window_width,
        window_height: config.window_height,
        window_resizable: true,
        high_dpi: true,
        ..Default::default()
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn open_storage(config: &EditorConfig) -> Box<dyn KeyValueStore> {
    let storage = storage::LocalStorage::with_base_dir(&config.storage_dir);
    info!(dir = %storage.base_dir().display(), "using local room storage");
    Box::new(storage)
}

#[cfg(target_arch = "wasm32")]
fn open_storage(_config: &EditorConfig) -> Box<dyn KeyValueStore> {
    Box::new(storage::MemoryStorage::new())
}

/// Pointer bookkeeping that outlives a single frame
#[derive(Default)]
struct PointerInput {
    last_mouse: (f32, f32),
    cursor: Option<CursorStyle>,
}

fn run_editor_frame(editor: &mut EditorState, input: &mut PointerInput) -> Result<(), EngineError> {
    editor.tick(get_time());
    editor.set_surface(SurfaceSize::new(screen_width(), screen_height()));

    let mouse = mouse_position();
    let (dx, dy) = (mouse.0 - input.last_mouse.0, mouse.1 - input.last_mouse.1);
    input.last_mouse = mouse;

    if is_mouse_button_pressed(MouseButton::Left) {
        editor.pointer_down(mouse);
    }
    if dx != 0.0 || dy != 0.0 {
        editor.pointer_move(mouse);
    }
    if is_mouse_button_released(MouseButton::Left) {
        editor.pointer_up();
    }
    editor.sync_primary_button(is_mouse_button_down(MouseButton::Left));

    // Camera: right-drag orbits, shift+right or middle drag pans, wheel zooms
    let shift = is_key_down(KeyCode::LeftShift) || is_key_down(KeyCode::RightShift);
    if is_mouse_button_down(MouseButton::Middle) || (shift && is_mouse_button_down(MouseButton::Right)) {
        editor.pan_camera(dx, dy);
    } else if is_mouse_button_down(MouseButton::Right) {
        editor.orbit_camera(dx, dy);
    }
    let (_, wheel) = mouse_wheel();
    editor.zoom_camera(wheel);

    let ctx = editor.action_context();
    for id in editor.actions.process_triggers(&ctx) {
        editor.run_action(id);
    }

    if !editor.camera.is_finite() {
        return Err(EngineError::Render("camera state is not finite".to_string()));
    }

    draw_viewport_3d(editor);
    apply_cursor(editor.cursor(), &mut input.cursor);
    Ok(())
}

#[macroquad::main(window_conf)]
async fn main() {
    // Initialize crash logging FIRST (before any other code)
    #[cfg(not(target_arch = "wasm32"))]
    crashlog::setup!(crashlog::cargo_metadata!().capitalized(), false);

    let (config, config_warning) = EditorConfig::load_or_default(&EditorConfig::default_path());
    tracing_subscriber::fmt()
        .with_max_level(config.max_level().unwrap_or(tracing::Level::INFO))
        .init();
    if let Some(warning) = config_warning {
        warn!("{}", warning);
    }
    info!(version = VERSION, "starting roomcraft");

    let mut boundary = EngineBoundary::new(move || {
        let rooms = RoomService::open_default(open_storage(&config));
        EditorState::new(rooms, &config)
    });
    let mut input = PointerInput::default();

    loop {
        if let BoundaryState::Failed { message, backend_supported } = boundary.state() {
            let (message, backend_supported) = (message.clone(), *backend_supported);
            apply_cursor(CursorStyle::Default, &mut input.cursor);
            if draw_engine_error(&message, backend_supported) {
                boundary.retry();
            }
        } else {
            boundary.run_frame(|editor| run_editor_frame(editor, &mut input));
        }
        next_frame().await;
    }
}
