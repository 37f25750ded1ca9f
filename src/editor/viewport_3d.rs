//! 3D viewport drawing
//!
//! Draws the room with macroquad's 3D camera, then a 2D overlay with the
//! room name, tool, snap state, selection readout and status line.
//! Drawing only reads editor state.

use macroquad::miniquad::{window::set_mouse_cursor, CursorIcon};
use macroquad::prelude::*;

use super::drag::CursorStyle;
use super::state::EditorState;
use crate::viewport::{OrbitCamera, Vec3};
use crate::world::{color_or_fallback, Entity, Room};

const BACKGROUND: Color = Color::new(0.09, 0.10, 0.13, 1.0);
const FLOOR_COLOR: Color = Color::new(0.22, 0.23, 0.27, 1.0);
const GRID_COLOR: Color = Color::new(0.32, 0.34, 0.40, 1.0);
const BOUNDARY_COLOR: Color = Color::new(0.55, 0.60, 0.70, 0.6);
const SELECTION_COLOR: Color = Color::new(1.0, 0.85, 0.2, 1.0);
const TEXT_COLOR: Color = WHITE;
const DIM_TEXT: Color = Color::new(0.6, 0.6, 0.65, 1.0);

/// Ceiling planes are drawn see-through
const CEILING_ALPHA: f32 = 0.25;

fn mq(v: Vec3) -> macroquad::math::Vec3 {
    vec3(v.x, v.y, v.z)
}

fn hex_color(hex: &str, alpha: f32) -> Color {
    let mut c = Color::from_hex(color_or_fallback(hex));
    c.a = alpha;
    c
}

fn camera_3d(camera: &OrbitCamera) -> Camera3D {
    Camera3D {
        position: mq(camera.position),
        target: mq(camera.target),
        up: mq(Vec3::UP),
        fovy: camera.fov_y,
        projection: Projection::Perspective,
        ..Default::default()
    }
}

/// The eight corners of a box turned `yaw` around +Y
fn box_corners(center: Vec3, half: Vec3, yaw: f32) -> [Vec3; 8] {
    let ex = Vec3::new(1.0, 0.0, 0.0).rotate_y(yaw) * half.x;
    let ey = Vec3::UP * half.y;
    let ez = Vec3::new(0.0, 0.0, 1.0).rotate_y(yaw) * half.z;
    let mut corners = [Vec3::ZERO; 8];
    for (i, corner) in corners.iter_mut().enumerate() {
        let sx = if i & 1 == 0 { -1.0 } else { 1.0 };
        let sy = if i & 2 == 0 { -1.0 } else { 1.0 };
        let sz = if i & 4 == 0 { -1.0 } else { 1.0 };
        *corner = center + ex * sx + ey * sy + ez * sz;
    }
    corners
}

fn draw_box(center: Vec3, half: Vec3, yaw: f32, color: Color) {
    let ex = Vec3::new(1.0, 0.0, 0.0).rotate_y(yaw) * half.x;
    let ey = Vec3::UP * half.y;
    let ez = Vec3::new(0.0, 0.0, 1.0).rotate_y(yaw) * half.z;
    let origin = center - ex - ey - ez;
    draw_affine_parallelepiped(mq(origin), mq(ex * 2.0), mq(ey * 2.0), mq(ez * 2.0), None, color);
}

fn draw_box_outline(center: Vec3, half: Vec3, yaw: f32, color: Color) {
    let c = box_corners(center, half, yaw);
    // Corner index bits: 1 = +x, 2 = +y, 4 = +z
    const EDGES: [(usize, usize); 12] = [
        (0, 1), (2, 3), (4, 5), (6, 7),
        (0, 2), (1, 3), (4, 6), (5, 7),
        (0, 4), (1, 5), (2, 6), (3, 7),
    ];
    for (a, b) in EDGES {
        draw_line_3d(mq(c[a]), mq(c[b]), color);
    }
}

fn draw_room_shell(room: &Room, grid_size: f32) {
    let d = room.dimensions;
    draw_plane(vec3(0.0, 0.0, 0.0), vec2(d.width / 2.0, d.length / 2.0), None, FLOOR_COLOR);

    // Grid lines over the floor
    let (hw, hl) = (d.width / 2.0, d.length / 2.0);
    if grid_size > 0.0 {
        let mut x = -hw;
        while x <= hw + 1.0e-3 {
            draw_line_3d(vec3(x, 0.001, -hl), vec3(x, 0.001, hl), GRID_COLOR);
            x += grid_size;
        }
        let mut z = -hl;
        while z <= hl + 1.0e-3 {
            draw_line_3d(vec3(-hw, 0.001, z), vec3(hw, 0.001, z), GRID_COLOR);
            z += grid_size;
        }
    }

    // Boundary box
    let center = Vec3::new(0.0, d.height / 2.0, 0.0);
    let half = Vec3::new(hw, d.height / 2.0, hl);
    draw_box_outline(center, half, 0.0, BOUNDARY_COLOR);
}

/// Draw the room and every entity with a usable box
pub fn draw_viewport_3d(state: &EditorState) {
    clear_background(BACKGROUND);
    set_camera(&camera_3d(&state.camera));

    let room = state.room();
    let snap = state.store.snap();
    draw_room_shell(room, if snap.enabled { snap.grid_size } else { 1.0 });

    for wall in &room.walls {
        if let Some((center, half, yaw)) = wall.render_box() {
            draw_box(center, half, yaw, hex_color(&wall.color, 1.0));
            if state.selection.is_selected(wall.id) {
                draw_box_outline(center, half * 1.02, yaw, SELECTION_COLOR);
            }
        }
    }

    for item in &room.furniture {
        if let Some((center, half, yaw)) = item.render_box() {
            draw_box(center, half, yaw, hex_color(&item.color, 1.0));
            if state.selection.is_selected(item.id) {
                draw_box_outline(center, half * 1.05, yaw, SELECTION_COLOR);
            }
        }
    }

    if let Some(ceiling) = &room.ceiling {
        if ceiling.height.is_finite() {
            let d = room.dimensions;
            let center = vec3(0.0, ceiling.height, 0.0);
            draw_plane(center, vec2(d.width / 2.0, d.length / 2.0), None, hex_color(&ceiling.color, CEILING_ALPHA));
            if state.selection.is_selected(ceiling.id) {
                let half = Vec3::new(d.width / 2.0, 0.0, d.length / 2.0);
                draw_box_outline(Vec3::new(0.0, ceiling.height, 0.0), half, 0.0, SELECTION_COLOR);
            }
        }
    }

    set_default_camera();
    draw_overlay(state);
}

fn selection_readout(state: &EditorState) -> Option<String> {
    let entity = state.room().entity(state.selection.selected()?)?;
    let id = entity.id();
    let text = match entity {
        Entity::Furniture(f) => format!(
            "{} {}  pos ({:.2}, {:.2}, {:.2})  rot {:.0}°  scale {:.1}  {}x{}x{} m",
            f.kind.label(), id,
            f.position.x, f.position.y, f.position.z,
            f.rotation.y.to_degrees(), f.scale.x,
            f.dimensions.width, f.dimensions.height, f.dimensions.depth,
        ),
        Entity::Wall(w) => format!(
            "Wall {}  pos ({:.2}, {:.2})  rot {:.0}°  {}x{} m  openings {}",
            id, w.position.x, w.position.z, w.rotation.to_degrees(),
            w.dimensions.width, w.dimensions.height, w.openings.len(),
        ),
        Entity::Ceiling(c) => format!("Ceiling {}  height {:.2} m  {}", id, c.height, c.material),
    };
    Some(text)
}

fn draw_overlay(state: &EditorState) {
    let room = state.room();
    let d = room.dimensions;
    let dirty = if state.store.is_dirty() { " *" } else { "" };
    let title = format!(
        "{}{}  ({} x {} x {} m, {:.1} m², {:.1} m³)",
        room.name, dirty, d.width, d.length, d.height, d.floor_area(), d.volume()
    );
    draw_text(&title, 12.0, 24.0, 22.0, TEXT_COLOR);

    let snap = state.store.snap();
    let snap_text = if snap.enabled { format!("snap {} m", snap.grid_size) } else { "snap off".to_string() };
    let tools = format!(
        "Tool: {}   {}   View: {}",
        state.selection.tool().label(),
        snap_text,
        state.camera_preset.label()
    );
    draw_text(&tools, 12.0, 46.0, 16.0, DIM_TEXT);

    if state.selection.properties_open() {
        if let Some(readout) = selection_readout(state) {
            draw_text(&readout, 12.0, 68.0, 16.0, SELECTION_COLOR);
        }
    }

    let h = screen_height();
    draw_text(
        "1-6 furniture  W wall  D door  Shift+W window  C ceiling  V/G/R/S tools  Tab properties  Ctrl+S save  F1-F5 views",
        12.0,
        h - 34.0,
        14.0,
        DIM_TEXT,
    );
    if let Some(status) = state.get_status() {
        draw_text(status, 12.0, h - 12.0, 18.0, TEXT_COLOR);
    }
}

/// Set the OS cursor when the wanted style changes
pub fn apply_cursor(style: CursorStyle, last: &mut Option<CursorStyle>) {
    if *last == Some(style) {
        return;
    }
    let icon = match style {
        CursorStyle::Default => CursorIcon::Default,
        CursorStyle::Grab | CursorStyle::Grabbing => CursorIcon::Move,
    };
    set_mouse_cursor(icon);
    *last = Some(style);
}
