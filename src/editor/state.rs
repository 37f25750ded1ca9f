//! Editor state
//!
//! Ties the room store, selection, drag controller, orbit gating and camera
//! together, and routes pointer and keyboard input to them. Pointer
//! coordinates are relative to the 3D viewport's top-left corner.

use std::f32::consts::PI;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::actions::{create_editor_actions, ActionContext, ActionRegistry};
use super::drag::{CursorStyle, DragController, DragRefusal, DragUpdate, PointerView};
use super::orbit::OrbitControls;
use super::picking::{pick_entity, PickHit};
use super::placement::{snap_angle, SnapSettings};
use super::selection::{EditorTool, Selection};
use super::store::{EntityPatch, RoomStore};
use crate::config::EditorConfig;
use crate::storage::RoomService;
use crate::viewport::{screen_to_ray, CameraPreset, OrbitCamera, SurfaceSize, Vec3};
use crate::world::{
    room_io, Entity, EntityId, EntityKind, Euler, FurnitureKind, Room, RoomDimensions,
};

/// Name of the room the editor starts with
pub const STARTUP_ROOM_NAME: &str = "My Room";
/// How long status messages stay visible (seconds)
const STATUS_SECS: f64 = 3.0;
/// Keyboard rotation increment
const ROTATION_STEP: f32 = PI / 12.0;
/// Keyboard scale increment
const SCALE_STEP: f32 = 0.1;
/// Keyboard room grow/shrink increment (meters)
const RESIZE_STEP: f32 = 1.0;

pub struct EditorState {
    pub store: RoomStore,
    pub selection: Selection,
    pub drag: DragController,
    pub orbit: OrbitControls,
    pub camera: OrbitCamera,
    pub camera_preset: CameraPreset,
    /// Pixel size of the 3D viewport; None until the first layout
    pub surface: Option<SurfaceSize>,
    pub rooms: RoomService,
    pub actions: ActionRegistry,
    export_dir: PathBuf,
    /// Status message (shown in status bar)
    status_message: Option<(String, f64)>, // (message, expiry_time)
    /// Seconds since start, advanced by the frame loop
    clock: f64,
}

impl EditorState {
    pub fn new(rooms: RoomService, config: &EditorConfig) -> Self {
        let mut store = RoomStore::new(Room::new(STARTUP_ROOM_NAME));
        store.set_snap(config.snap());
        Self {
            store,
            selection: Selection::new(),
            drag: DragController::new(),
            orbit: OrbitControls::new(),
            camera: OrbitCamera::from_preset(config.camera_preset),
            camera_preset: config.camera_preset,
            surface: None,
            rooms,
            actions: create_editor_actions(),
            export_dir: config.export_dir(),
            status_message: None,
            clock: 0.0,
        }
    }

    pub fn room(&self) -> &Room {
        self.store.room()
    }

    // ─────────────────────────────────────────────────────────────────────
    // Status bar
    // ─────────────────────────────────────────────────────────────────────

    /// Advance the status clock
    pub fn tick(&mut self, now: f64) {
        self.clock = now;
    }

    /// Set a status message that will be displayed for a few seconds
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some((message.into(), self.clock + STATUS_SECS));
    }

    /// Get current status message if not expired
    pub fn get_status(&self) -> Option<&str> {
        match &self.status_message {
            Some((msg, expiry)) if self.clock < *expiry => Some(msg),
            _ => None,
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Pointer input
    // ─────────────────────────────────────────────────────────────────────

    pub fn set_surface(&mut self, surface: SurfaceSize) {
        self.surface = surface.is_usable().then_some(surface);
    }

    fn pick(&self, pointer: (f32, f32)) -> Option<PickHit> {
        let surface = self.surface?;
        let ray = screen_to_ray(pointer, surface, &self.camera);
        pick_entity(&ray, self.store.room())
    }

    /// Primary button pressed. Returns true when an entity was hit.
    pub fn pointer_down(&mut self, pointer: (f32, f32)) -> bool {
        if self.drag.captures_pointer() {
            return true;
        }
        let Some(hit) = self.pick(pointer) else {
            self.selection.select_entity(None);
            return false;
        };

        // Drag eligibility follows the tool that was active at press time
        let tool = self.selection.tool();
        self.selection.select_entity(Some(hit.entity));
        if tool.drags(hit.kind) {
            let view = PointerView { camera: Some(&self.camera), surface: self.surface };
            match self.drag.begin(hit.entity, pointer, &view, &self.store, &mut self.orbit) {
                Ok(()) => {}
                Err(DragRefusal::Unmapped) => debug!(entity = %hit.entity, "pointer off the drag plane, not dragging"),
                Err(refusal) => warn!(entity = %hit.entity, ?refusal, "drag refused"),
            }
        }
        true
    }

    /// Pointer moved. While dragging every move belongs to the drag.
    pub fn pointer_move(&mut self, pointer: (f32, f32)) {
        if self.drag.captures_pointer() {
            let view = PointerView { camera: Some(&self.camera), surface: self.surface };
            if let DragUpdate::Ended = self.drag.update(pointer, &view, &mut self.store, &mut self.orbit) {
                self.set_status("Drag ended: object no longer exists");
            }
            return;
        }
        let draggable = self
            .pick(pointer)
            .is_some_and(|hit| self.selection.tool().drags(hit.kind));
        self.drag.set_hover(draggable);
    }

    /// Primary button released
    pub fn pointer_up(&mut self) {
        if let Some(outcome) = self.drag.end(&mut self.orbit) {
            if outcome.from != outcome.to {
                let label = self.entity_label(outcome.entity);
                self.set_status(format!("Moved {}", label));
            }
        }
    }

    /// Drag abandoned (Escape, focus loss)
    pub fn pointer_cancel(&mut self) {
        if self.drag.cancel(&mut self.store, &mut self.orbit).is_some() {
            self.set_status("Move cancelled");
        }
    }

    /// Called every frame with the primary button state. A drag whose button
    /// is up without a release (focus moved to another window) is cancelled.
    pub fn sync_primary_button(&mut self, down: bool) {
        if !down && self.drag.is_dragging() {
            warn!("primary button released without a release event, cancelling drag");
            self.pointer_cancel();
        }
    }

    pub fn cursor(&self) -> CursorStyle {
        self.drag.cursor()
    }

    /// Release everything the editor holds before it is dropped or remounted
    pub fn teardown(&mut self) {
        self.drag.cancel(&mut self.store, &mut self.orbit);
        self.drag.set_hover(false);
    }

    // ─────────────────────────────────────────────────────────────────────
    // Camera
    // ─────────────────────────────────────────────────────────────────────

    pub fn apply_camera_preset(&mut self, preset: CameraPreset) {
        self.camera_preset = preset;
        self.camera.apply_preset(preset);
        self.set_status(format!("{} view", preset.label()));
    }

    /// Orbit by pointer deltas; ignored while a drag holds the controls
    pub fn orbit_camera(&mut self, dx: f32, dy: f32) {
        if self.orbit.is_enabled() {
            self.camera.rotate(-dx * 0.01, dy * 0.01);
        }
    }

    pub fn pan_camera(&mut self, dx: f32, dy: f32) {
        if self.orbit.is_enabled() {
            self.camera.pan(dx, dy);
        }
    }

    pub fn zoom_camera(&mut self, wheel: f32) {
        if self.orbit.is_enabled() && wheel != 0.0 {
            self.camera.zoom(if wheel > 0.0 { 0.9 } else { 1.0 / 0.9 });
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Entity commands
    // ─────────────────────────────────────────────────────────────────────

    fn entity_label(&self, id: EntityId) -> String {
        match self.store.room().entity(id) {
            Some(Entity::Furniture(f)) => f.kind.label().to_string(),
            Some(e) => e.kind().label().to_string(),
            None => id.to_string(),
        }
    }

    pub fn selected_kind(&self) -> Option<EntityKind> {
        self.selection.selected().and_then(|id| self.store.room().kind_of(id))
    }

    pub fn select_tool(&mut self, tool: EditorTool) {
        self.selection.select_tool(tool);
    }

    pub fn add_furniture(&mut self, kind: FurnitureKind) -> EntityId {
        let label = kind.label();
        let id = self.store.add_furniture(kind);
        self.selection.select_new(id);
        self.set_status(format!("{} added", label));
        id
    }

    pub fn add_wall(&mut self) -> EntityId {
        let id = self.store.add_wall();
        self.selection.select_new(id);
        self.set_status("Wall added");
        id
    }

    pub fn add_door(&mut self) -> EntityId {
        let id = self.store.add_door();
        self.selection.select_new(id);
        self.set_status("Door added");
        id
    }

    pub fn add_window(&mut self) -> EntityId {
        let id = self.store.add_window();
        self.selection.select_new(id);
        self.set_status("Window added");
        id
    }

    pub fn add_ceiling(&mut self) -> EntityId {
        let id = self.store.add_ceiling();
        self.selection.select_new(id);
        self.set_status("Ceiling added");
        id
    }

    pub fn delete_entity(&mut self, id: EntityId) {
        if self.drag.dragged_entity() == Some(id) {
            self.drag.cancel(&mut self.store, &mut self.orbit);
        }
        if let Some(kind) = self.store.delete_entity(id) {
            self.selection.forget(id);
            self.set_status(format!("{} deleted", kind.label()));
        }
    }

    pub fn delete_selected(&mut self) {
        if let Some(id) = self.selection.selected() {
            self.delete_entity(id);
        }
    }

    pub fn duplicate_selected(&mut self) {
        let Some(id) = self.selection.selected() else { return };
        match self.store.duplicate_furniture(id) {
            Ok(copy) => {
                self.selection.select_new(copy);
                self.set_status("Furniture duplicated");
            }
            Err(e) => self.set_status(e.to_string()),
        }
    }

    /// Turn the selection around +Y by `steps` increments
    pub fn rotate_selected(&mut self, steps: f32) {
        let Some(id) = self.selection.selected() else { return };
        let current = match self.store.room().entity(id) {
            Some(Entity::Furniture(f)) => f.rotation,
            Some(Entity::Wall(w)) => Euler::yaw(w.rotation),
            _ => return,
        };
        let mut yaw = current.y + steps * ROTATION_STEP;
        if self.store.snap().enabled {
            yaw = snap_angle(yaw, ROTATION_STEP);
        }
        let rotation = Euler { y: yaw, ..current };
        self.store.update_entity(id, &EntityPatch::rotation(rotation));
    }

    /// Grow or shrink the selected furniture uniformly
    pub fn scale_selected(&mut self, delta: f32) {
        let Some(id) = self.selection.selected() else { return };
        let Some(Entity::Furniture(f)) = self.store.room().entity(id) else { return };
        let s = f.scale;
        let scale = Vec3::new(s.x + delta, s.y + delta, s.z + delta);
        self.store.update_entity(id, &EntityPatch::scale(scale));
    }

    pub fn resize_room(&mut self, dimensions: RoomDimensions) {
        match self.store.resize_room(dimensions) {
            Ok(()) => self.set_status(format!(
                "Room resized to {} x {} x {} m",
                dimensions.width, dimensions.length, dimensions.height
            )),
            Err(e) => self.set_status(e.to_string()),
        }
    }

    pub fn clear_furniture(&mut self) {
        self.drag.cancel(&mut self.store, &mut self.orbit);
        self.store.clear_furniture();
        self.selection.select_entity(None);
        self.set_status("All furniture cleared");
    }

    pub fn reset_room(&mut self) {
        self.drag.cancel(&mut self.store, &mut self.orbit);
        self.store.reset_room();
        self.selection.select_entity(None);
        self.set_status("Room reset to defaults");
    }

    pub fn toggle_snap(&mut self) {
        let snap = self.store.snap();
        self.store.set_snap(SnapSettings { enabled: !snap.enabled, ..snap });
        self.set_status(if snap.enabled { "Grid snap off" } else { "Grid snap on" });
    }

    // ─────────────────────────────────────────────────────────────────────
    // Persistence
    // ─────────────────────────────────────────────────────────────────────

    /// Open `room` in the editor, replacing the current one
    pub fn load_room(&mut self, room: Room) {
        self.teardown();
        self.store.replace_room(room);
        self.selection.select_entity(None);
    }

    pub fn save_room(&mut self) {
        let saved = self.rooms.save_room(self.store.room().clone());
        self.store.mark_saved(&saved);
        info!(id = ?saved.id, name = %saved.name, "room saved");
        self.set_status("Room saved");
    }

    /// Load the saved room after the current one
    pub fn open_next_room(&mut self) {
        let Some(id) = self.rooms.next_room_after(self.store.room().id) else {
            self.set_status("No saved rooms");
            return;
        };
        match self.rooms.get_room(id) {
            Ok(room) => {
                let name = room.name.clone();
                self.load_room(room);
                self.set_status(format!("Loaded {}", name));
            }
            Err(e) => self.set_status(format!("Failed to load room: {}", e)),
        }
    }

    pub fn new_room(&mut self) {
        self.load_room(Room::new(STARTUP_ROOM_NAME));
        self.set_status("New room");
    }

    /// Remove the current room from storage; it stays open, unsaved
    pub fn delete_saved_room(&mut self) {
        let Some(id) = self.store.room().id else {
            self.set_status("Room has not been saved");
            return;
        };
        match self.rooms.delete_room(id) {
            Ok(()) => {
                self.store.forget_saved_id();
                self.set_status("Saved room deleted");
            }
            Err(e) => self.set_status(format!("Failed to delete room: {}", e)),
        }
    }

    fn export_path(&self) -> PathBuf {
        let stem: String = self
            .store
            .room()
            .name
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
            .collect();
        let stem = if stem.trim_matches('_').is_empty() { "room".to_string() } else { stem };
        self.export_dir.join(format!("{}.json", stem))
    }

    pub fn export_room(&mut self) {
        let path = self.export_path();
        let result = fs::create_dir_all(&self.export_dir)
            .map_err(room_io::RoomIoError::from)
            .and_then(|()| room_io::export_room_to_file(self.store.room(), &path));
        match result {
            Ok(()) => {
                info!(path = %path.display(), "room exported");
                self.set_status(format!("Exported to {}", path.display()));
            }
            Err(e) => self.set_status(format!("Export failed: {}", e)),
        }
    }

    /// Import the most recently written export
    pub fn import_room(&mut self) {
        let Some(path) = newest_json(&self.export_dir) else {
            self.set_status(format!("No exports in {}", self.export_dir.display()));
            return;
        };
        match room_io::import_room_from_file(&path) {
            Ok(room) => {
                let name = room.name.clone();
                self.load_room(room);
                self.store.mark_dirty();
                self.set_status(format!("Imported {}", name));
            }
            Err(e) => self.set_status(e.to_string()),
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Actions
    // ─────────────────────────────────────────────────────────────────────

    pub fn action_context(&self) -> ActionContext {
        ActionContext {
            has_selection: self.selection.selected().is_some(),
            furniture_selected: self.selected_kind() == Some(EntityKind::Furniture),
            dragging: self.drag.is_dragging(),
            is_dirty: self.store.is_dirty(),
        }
    }

    /// Dispatch a registered action by id
    pub fn run_action(&mut self, id: &str) {
        debug!(action = id, "running action");
        match id {
            "file.save" => self.save_room(),
            "file.open_next" => self.open_next_room(),
            "file.new" => self.new_room(),
            "file.delete" => self.delete_saved_room(),
            "file.export" => self.export_room(),
            "file.import" => self.import_room(),

            "tool.select" => self.select_tool(EditorTool::Select),
            "tool.move" => self.select_tool(EditorTool::Move),
            "tool.rotate" => self.select_tool(EditorTool::Rotate),
            "tool.scale" => self.select_tool(EditorTool::Scale),

            "edit.cancel" => {
                if self.drag.is_dragging() {
                    self.pointer_cancel();
                } else {
                    self.selection.select_entity(None);
                }
            }
            "edit.delete" => self.delete_selected(),
            "edit.duplicate" => self.duplicate_selected(),
            "edit.rotate_left" => self.rotate_selected(1.0),
            "edit.rotate_right" => self.rotate_selected(-1.0),
            "edit.scale_up" => self.scale_selected(SCALE_STEP),
            "edit.scale_down" => self.scale_selected(-SCALE_STEP),
            "edit.toggle_properties" => {
                let open = !self.selection.properties_open();
                self.selection.set_properties_open(open);
            }

            "add.sofa" => { self.add_furniture(FurnitureKind::Sofa); }
            "add.bed" => { self.add_furniture(FurnitureKind::Bed); }
            "add.table" => { self.add_furniture(FurnitureKind::Table); }
            "add.chair" => { self.add_furniture(FurnitureKind::Chair); }
            "add.desk" => { self.add_furniture(FurnitureKind::Desk); }
            "add.wardrobe" => { self.add_furniture(FurnitureKind::Wardrobe); }
            "add.wall" => { self.add_wall(); }
            "add.door" => { self.add_door(); }
            "add.window" => { self.add_window(); }
            "add.ceiling" => { self.add_ceiling(); }

            "room.clear_furniture" => self.clear_furniture(),
            "room.reset" => self.reset_room(),
            "room.grow" | "room.shrink" => {
                let step = if id == "room.grow" { RESIZE_STEP } else { -RESIZE_STEP };
                let d = self.store.room().dimensions;
                self.resize_room(RoomDimensions::new(d.width + step, d.length + step, d.height));
            }

            "view.toggle_snap" => self.toggle_snap(),
            "view.toggle_orbit" => {
                let on = !self.orbit.is_enabled();
                self.orbit.set_enabled(on);
                self.set_status(if on { "Camera orbit on" } else { "Camera orbit off" });
            }
            "view.perspective" => self.apply_camera_preset(CameraPreset::Perspective),
            "view.top" => self.apply_camera_preset(CameraPreset::Top),
            "view.front" => self.apply_camera_preset(CameraPreset::Front),
            "view.side" => self.apply_camera_preset(CameraPreset::Side),
            "view.isometric" => self.apply_camera_preset(CameraPreset::Isometric),

            other => warn!(action = other, "unknown action"),
        }
    }
}

/// Most recently modified `.json` file in `dir`
fn newest_json(dir: &Path) -> Option<PathBuf> {
    fs::read_dir(dir)
        .ok()?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
        .filter_map(|p| {
            let modified = fs::metadata(&p).and_then(|m| m.modified()).ok()?;
            Some((modified, p))
        })
        .max_by_key(|(modified, _)| *modified)
        .map(|(_, p)| p)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use crate::world::RoomId;
    use tempfile::TempDir;

    const SURFACE: SurfaceSize = SurfaceSize { width: 800.0, height: 600.0 };

    fn editor() -> (TempDir, EditorState) {
        let dir = TempDir::new().unwrap();
        let config = EditorConfig {
            storage_dir: dir.path().to_path_buf(),
            camera_preset: CameraPreset::Isometric,
            snap_enabled: false,
            ..Default::default()
        };
        let rooms = RoomService::open(Box::new(MemoryStorage::new()), Vec::new());
        let mut state = EditorState::new(rooms, &config);
        state.set_surface(SURFACE);
        (dir, state)
    }

    #[test]
    fn test_added_entity_is_selected_with_select_tool() {
        let (_dir, mut state) = editor();
        state.select_tool(EditorTool::Rotate);
        let id = state.add_furniture(FurnitureKind::Chair);
        assert_eq!(state.selection.selected(), Some(id));
        assert_eq!(state.selection.tool(), EditorTool::Select);
        assert!(state.selection.properties_open());
        assert_eq!(state.get_status(), Some("Chair added"));
    }

    #[test]
    fn test_press_on_furniture_starts_drag_with_select_tool() {
        let (_dir, mut state) = editor();
        let id = state.add_furniture(FurnitureKind::Table);
        state.selection.select_entity(None);

        // The isometric camera looks at the origin, where the table sits
        assert!(state.pointer_down((400.0, 300.0)));
        assert_eq!(state.selection.selected(), Some(id));
        assert!(state.drag.is_dragging());
        assert!(!state.orbit.is_enabled());
        assert_eq!(state.cursor(), CursorStyle::Grabbing);

        state.pointer_move((300.0, 350.0));
        state.pointer_up();
        assert!(!state.drag.is_dragging());
        assert!(state.orbit.is_enabled());
        assert_ne!(state.store.entity_position(id), Some(Vec3::ZERO));
    }

    #[test]
    fn test_press_on_wall_with_select_tool_only_selects() {
        let (_dir, mut state) = editor();
        let id = state.add_wall();
        assert!(state.pointer_down((400.0, 300.0)));
        assert_eq!(state.selection.selected(), Some(id));
        assert!(!state.drag.is_dragging());

        state.select_tool(EditorTool::Move);
        state.pointer_down((400.0, 300.0));
        assert!(state.drag.is_dragging());
        state.pointer_up();
    }

    #[test]
    fn test_press_with_rotate_tool_selects_without_drag() {
        let (_dir, mut state) = editor();
        let id = state.add_furniture(FurnitureKind::Bed);
        state.select_tool(EditorTool::Rotate);
        assert!(state.pointer_down((400.0, 300.0)));
        assert_eq!(state.selection.selected(), Some(id));
        assert_eq!(state.selection.tool(), EditorTool::Select);
        assert!(!state.drag.is_dragging());
    }

    #[test]
    fn test_floor_click_deselects() {
        let (_dir, mut state) = editor();
        state.add_furniture(FurnitureKind::Chair);
        // Bottom-right corner of the view is empty floor
        assert!(!state.pointer_down((790.0, 590.0)));
        assert_eq!(state.selection.selected(), None);
        assert!(!state.selection.properties_open());
    }

    #[test]
    fn test_drag_without_surface_is_noop() {
        let (_dir, mut state) = editor();
        let id = state.add_furniture(FurnitureKind::Table);
        state.pointer_down((400.0, 300.0));
        state.surface = None;
        state.pointer_move((100.0, 100.0));
        assert_eq!(state.store.entity_position(id), Some(Vec3::ZERO));
        state.pointer_up();
    }

    #[test]
    fn test_orbit_ignored_while_dragging() {
        let (_dir, mut state) = editor();
        state.add_furniture(FurnitureKind::Table);
        state.pointer_down((400.0, 300.0));
        let before = state.camera.clone();
        state.orbit_camera(50.0, 20.0);
        state.zoom_camera(1.0);
        assert_eq!(state.camera, before);
        state.pointer_up();
        state.orbit_camera(50.0, 20.0);
        assert_ne!(state.camera, before);
    }

    #[test]
    fn test_cancel_restores_and_teardown_releases() {
        let (_dir, mut state) = editor();
        let id = state.add_furniture(FurnitureKind::Table);
        state.pointer_down((400.0, 300.0));
        state.pointer_move((250.0, 400.0));
        state.run_action("edit.cancel");
        assert_eq!(state.store.entity_position(id), Some(Vec3::ZERO));
        assert!(state.orbit.is_enabled());

        state.pointer_down((400.0, 300.0));
        state.teardown();
        assert!(!state.drag.is_dragging());
        assert!(state.orbit.is_enabled());
    }

    #[test]
    fn test_lost_release_cancels_drag() {
        let (_dir, mut state) = editor();
        let id = state.add_furniture(FurnitureKind::Table);
        state.pointer_down((400.0, 300.0));
        state.pointer_move((250.0, 400.0));

        state.sync_primary_button(true);
        assert!(state.drag.is_dragging());

        state.sync_primary_button(false);
        assert!(!state.drag.is_dragging());
        assert_eq!(state.store.entity_position(id), Some(Vec3::ZERO));
        assert!(state.orbit.is_enabled());
        assert_eq!(state.get_status(), Some("Move cancelled"));

        // Nothing to cancel once idle
        state.sync_primary_button(false);
        assert!(state.orbit.is_enabled());
    }

    #[test]
    fn test_orbit_toggle_blocks_camera_moves() {
        let (_dir, mut state) = editor();
        let before = state.camera.clone();
        state.run_action("view.toggle_orbit");
        state.orbit_camera(50.0, 20.0);
        assert_eq!(state.camera, before);
        state.run_action("view.toggle_orbit");
        state.orbit_camera(50.0, 20.0);
        assert_ne!(state.camera, before);
    }

    #[test]
    fn test_toggle_properties_needs_selection() {
        let (_dir, mut state) = editor();
        state.add_furniture(FurnitureKind::Chair);
        assert!(state.selection.properties_open());
        state.run_action("edit.toggle_properties");
        assert!(!state.selection.properties_open());
        state.run_action("edit.toggle_properties");
        assert!(state.selection.properties_open());

        state.selection.select_entity(None);
        state.run_action("edit.toggle_properties");
        assert!(!state.selection.properties_open());
    }

    #[test]
    fn test_delete_clears_selection() {
        let (_dir, mut state) = editor();
        let id = state.add_wall();
        state.delete_selected();
        assert_eq!(state.selection.selected(), None);
        assert!(state.room().kind_of(id).is_none());
    }

    #[test]
    fn test_duplicate_selects_copy() {
        let (_dir, mut state) = editor();
        let id = state.add_furniture(FurnitureKind::Sofa);
        state.duplicate_selected();
        let copy = state.selection.selected().unwrap();
        assert_ne!(copy, id);
        assert_eq!(state.room().furniture.len(), 2);
    }

    #[test]
    fn test_rotate_and_scale_selected() {
        let (_dir, mut state) = editor();
        state.add_furniture(FurnitureKind::Desk);
        state.rotate_selected(2.0);
        assert!((state.room().furniture[0].rotation.y - 2.0 * ROTATION_STEP).abs() < 0.001);
        state.scale_selected(-5.0);
        assert_eq!(state.room().furniture[0].scale, Vec3::new(0.1, 0.1, 0.1));

        let wall = state.add_wall();
        state.rotate_selected(-1.0);
        let w = state.room().walls.iter().find(|w| w.id == wall).unwrap();
        assert!((w.rotation + ROTATION_STEP).abs() < 0.001);
    }

    #[test]
    fn test_save_and_reopen() {
        let (_dir, mut state) = editor();
        state.add_furniture(FurnitureKind::Bed);
        state.save_room();
        assert_eq!(state.room().id, Some(RoomId(1)));
        assert!(!state.store.is_dirty());

        state.new_room();
        assert_eq!(state.room().entity_count(), 0);
        state.open_next_room();
        assert_eq!(state.room().id, Some(RoomId(1)));
        assert_eq!(state.room().furniture.len(), 1);
    }

    #[test]
    fn test_ids_keep_increasing_across_rooms() {
        let (_dir, mut state) = editor();
        let first = state.add_wall();
        state.new_room();
        let second = state.add_wall();
        assert!(second > first);
    }

    #[test]
    fn test_delete_saved_room() {
        let (_dir, mut state) = editor();
        state.delete_saved_room();
        assert_eq!(state.get_status(), Some("Room has not been saved"));
        state.save_room();
        state.delete_saved_room();
        assert!(state.rooms.get_all_rooms().is_empty());
        assert_eq!(state.room().id, None);
    }

    #[test]
    fn test_export_then_import() {
        let (_dir, mut state) = editor();
        state.add_furniture(FurnitureKind::Wardrobe);
        state.add_door();
        state.export_room();
        let exported = state.room().clone();

        state.reset_room();
        state.import_room();
        assert_eq!(state.room().furniture, exported.furniture);
        assert_eq!(state.room().walls, exported.walls);
        assert_eq!(state.room().dimensions, exported.dimensions);
        assert_eq!(state.room().id, None);
    }

    #[test]
    fn test_resize_rejects_invalid() {
        let (_dir, mut state) = editor();
        state.resize_room(RoomDimensions::new(0.0, 5.0, 3.0));
        assert_eq!(state.room().dimensions, RoomDimensions::DEFAULT);
        assert!(state.get_status().is_some_and(|s| s.contains("Width must be greater than 0")));
        state.run_action("room.grow");
        assert_eq!(state.room().dimensions, RoomDimensions::new(11.0, 11.0, 3.0));
    }

    #[test]
    fn test_status_expires() {
        let (_dir, mut state) = editor();
        state.set_status("hello");
        assert_eq!(state.get_status(), Some("hello"));
        state.tick(STATUS_SECS + 1.0);
        assert_eq!(state.get_status(), None);
    }

    #[test]
    fn test_clear_and_reset_deselect() {
        let (_dir, mut state) = editor();
        state.add_furniture(FurnitureKind::Chair);
        state.run_action("room.clear_furniture");
        assert_eq!(state.selection.selected(), None);
        state.add_ceiling();
        state.run_action("room.reset");
        assert_eq!(state.selection.selected(), None);
        assert!(state.room().ceiling.is_none());
    }
}
