//! Editor action registry
//!
//! Every keyboard command the editor understands, with its shortcut and the
//! condition under which it is enabled. The frame loop asks the registry
//! which actions fired and dispatches them to `EditorState`.

use macroquad::prelude::{is_key_down, is_key_pressed, KeyCode};
use std::collections::HashMap;

/// A keyboard shortcut (key + modifiers)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Shortcut {
    pub key: KeyCode,
    pub ctrl: bool, // Cmd on Mac
    pub shift: bool,
}

/// Modifier keys held this frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub shift: bool,
}

impl Modifiers {
    /// Read the live modifier state
    pub fn current() -> Self {
        Self {
            ctrl: is_key_down(KeyCode::LeftControl)
                || is_key_down(KeyCode::RightControl)
                || is_key_down(KeyCode::LeftSuper)
                || is_key_down(KeyCode::RightSuper),
            shift: is_key_down(KeyCode::LeftShift) || is_key_down(KeyCode::RightShift),
        }
    }
}

impl Shortcut {
    pub fn key(key: KeyCode) -> Self {
        Self { key, ctrl: false, shift: false }
    }

    pub fn ctrl(key: KeyCode) -> Self {
        Self { key, ctrl: true, shift: false }
    }

    pub fn shift(key: KeyCode) -> Self {
        Self { key, ctrl: false, shift: true }
    }

    pub fn ctrl_shift(key: KeyCode) -> Self {
        Self { key, ctrl: true, shift: true }
    }

    /// Whether a press of `key` with `mods` held triggers this shortcut
    pub fn matches(&self, key: KeyCode, mods: Modifiers) -> bool {
        self.key == key && self.ctrl == mods.ctrl && self.shift == mods.shift
    }

    /// Check if this shortcut was pressed this frame
    pub fn is_pressed(&self) -> bool {
        is_key_pressed(self.key) && self.matches(self.key, Modifiers::current())
    }

    /// Format for display (e.g. "Ctrl+S")
    pub fn display(&self) -> String {
        let mut s = String::new();
        if self.ctrl {
            s.push_str("Ctrl+");
        }
        if self.shift {
            s.push_str("Shift+");
        }
        s.push_str(&format!("{:?}", self.key).replace("Key", ""));
        s
    }
}

/// Snapshot of the editor used to enable/disable actions
#[derive(Debug, Clone, Copy, Default)]
pub struct ActionContext {
    pub has_selection: bool,
    pub furniture_selected: bool,
    pub dragging: bool,
    pub is_dirty: bool,
}

type EnableFn = fn(&ActionContext) -> bool;

fn always_enabled(_: &ActionContext) -> bool {
    true
}

fn idle(ctx: &ActionContext) -> bool {
    !ctx.dragging
}

fn idle_with_selection(ctx: &ActionContext) -> bool {
    !ctx.dragging && ctx.has_selection
}

fn idle_with_furniture(ctx: &ActionContext) -> bool {
    !ctx.dragging && ctx.furniture_selected
}

#[derive(Clone)]
pub struct Action {
    /// Unique identifier (e.g. "file.save")
    pub id: &'static str,
    pub label: &'static str,
    pub shortcut: Option<Shortcut>,
    pub category: &'static str,
    enabled_fn: EnableFn,
}

impl Action {
    pub fn new(id: &'static str) -> Self {
        Self { id, label: "", shortcut: None, category: "General", enabled_fn: always_enabled }
    }

    pub fn label(mut self, label: &'static str) -> Self {
        self.label = label;
        self
    }

    pub fn shortcut(mut self, shortcut: Shortcut) -> Self {
        self.shortcut = Some(shortcut);
        self
    }

    pub fn category(mut self, category: &'static str) -> Self {
        self.category = category;
        self
    }

    pub fn enabled_when(mut self, f: EnableFn) -> Self {
        self.enabled_fn = f;
        self
    }

    pub fn is_enabled(&self, ctx: &ActionContext) -> bool {
        (self.enabled_fn)(ctx)
    }

    /// Label with shortcut hint
    pub fn tooltip(&self) -> String {
        match &self.shortcut {
            Some(s) => format!("{} ({})", self.label, s.display()),
            None => self.label.to_string(),
        }
    }
}

pub struct ActionRegistry {
    actions: HashMap<&'static str, Action>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self { actions: HashMap::new() }
    }

    pub fn register(&mut self, action: Action) {
        self.actions.insert(action.id, action);
    }

    pub fn get(&self, id: &str) -> Option<&Action> {
        self.actions.get(id)
    }

    pub fn tooltip(&self, id: &str) -> String {
        self.actions.get(id).map_or_else(String::new, Action::tooltip)
    }

    /// Enabled action bound to `key` + `mods`, if any
    pub fn action_for(&self, key: KeyCode, mods: Modifiers, ctx: &ActionContext) -> Option<&'static str> {
        self.actions
            .values()
            .find(|a| a.is_enabled(ctx) && a.shortcut.is_some_and(|s| s.matches(key, mods)))
            .map(|a| a.id)
    }

    /// IDs of every enabled action whose shortcut was pressed this frame
    pub fn process_triggers(&self, ctx: &ActionContext) -> Vec<&'static str> {
        let mut fired: Vec<_> = self
            .actions
            .values()
            .filter(|a| a.is_enabled(ctx) && a.shortcut.is_some_and(|s| s.is_pressed()))
            .map(|a| a.id)
            .collect();
        fired.sort_unstable();
        fired
    }
}

impl Default for ActionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Build the editor's action set
pub fn create_editor_actions() -> ActionRegistry {
    let mut registry = ActionRegistry::new();

    // File
    registry.register(Action::new("file.save").label("Save Room").shortcut(Shortcut::ctrl(KeyCode::S)).category("File").enabled_when(idle));
    registry.register(Action::new("file.open_next").label("Open Next Saved Room").shortcut(Shortcut::ctrl(KeyCode::O)).category("File").enabled_when(idle));
    registry.register(Action::new("file.new").label("New Room").shortcut(Shortcut::ctrl(KeyCode::N)).category("File").enabled_when(idle));
    registry.register(Action::new("file.delete").label("Delete Saved Room").shortcut(Shortcut::ctrl_shift(KeyCode::Delete)).category("File").enabled_when(idle));
    registry.register(Action::new("file.export").label("Export Room").shortcut(Shortcut::ctrl(KeyCode::E)).category("File").enabled_when(idle));
    registry.register(Action::new("file.import").label("Import Room").shortcut(Shortcut::ctrl(KeyCode::I)).category("File").enabled_when(idle));

    // Tools
    registry.register(Action::new("tool.select").label("Select").shortcut(Shortcut::key(KeyCode::V)).category("Tools").enabled_when(idle));
    registry.register(Action::new("tool.move").label("Move").shortcut(Shortcut::key(KeyCode::G)).category("Tools").enabled_when(idle));
    registry.register(Action::new("tool.rotate").label("Rotate").shortcut(Shortcut::key(KeyCode::R)).category("Tools").enabled_when(idle));
    registry.register(Action::new("tool.scale").label("Scale").shortcut(Shortcut::key(KeyCode::S)).category("Tools").enabled_when(idle));

    // Edit
    registry.register(Action::new("edit.cancel").label("Cancel / Deselect").shortcut(Shortcut::key(KeyCode::Escape)).category("Edit"));
    registry.register(Action::new("edit.delete").label("Delete").shortcut(Shortcut::key(KeyCode::Delete)).category("Edit").enabled_when(idle_with_selection));
    registry.register(Action::new("edit.duplicate").label("Duplicate").shortcut(Shortcut::ctrl(KeyCode::D)).category("Edit").enabled_when(idle_with_furniture));
    registry.register(Action::new("edit.rotate_left").label("Rotate Left").shortcut(Shortcut::key(KeyCode::Comma)).category("Edit").enabled_when(idle_with_selection));
    registry.register(Action::new("edit.rotate_right").label("Rotate Right").shortcut(Shortcut::key(KeyCode::Period)).category("Edit").enabled_when(idle_with_selection));
    registry.register(Action::new("edit.scale_up").label("Scale Up").shortcut(Shortcut::key(KeyCode::Equal)).category("Edit").enabled_when(idle_with_furniture));
    registry.register(Action::new("edit.toggle_properties").label("Toggle Properties").shortcut(Shortcut::key(KeyCode::Tab)).category("Edit").enabled_when(idle_with_selection));
    registry.register(Action::new("edit.scale_down").label("Scale Down").shortcut(Shortcut::key(KeyCode::Minus)).category("Edit").enabled_when(idle_with_furniture));

    // Add
    registry.register(Action::new("add.sofa").label("Add Sofa").shortcut(Shortcut::key(KeyCode::Key1)).category("Add").enabled_when(idle));
    registry.register(Action::new("add.bed").label("Add Bed").shortcut(Shortcut::key(KeyCode::Key2)).category("Add").enabled_when(idle));
    registry.register(Action::new("add.table").label("Add Table").shortcut(Shortcut::key(KeyCode::Key3)).category("Add").enabled_when(idle));
    registry.register(Action::new("add.chair").label("Add Chair").shortcut(Shortcut::key(KeyCode::Key4)).category("Add").enabled_when(idle));
    registry.register(Action::new("add.desk").label("Add Desk").shortcut(Shortcut::key(KeyCode::Key5)).category("Add").enabled_when(idle));
    registry.register(Action::new("add.wardrobe").label("Add Wardrobe").shortcut(Shortcut::key(KeyCode::Key6)).category("Add").enabled_when(idle));
    registry.register(Action::new("add.wall").label("Add Wall").shortcut(Shortcut::key(KeyCode::W)).category("Add").enabled_when(idle));
    registry.register(Action::new("add.door").label("Add Door").shortcut(Shortcut::key(KeyCode::D)).category("Add").enabled_when(idle));
    registry.register(Action::new("add.window").label("Add Window").shortcut(Shortcut::shift(KeyCode::W)).category("Add").enabled_when(idle));
    registry.register(Action::new("add.ceiling").label("Add Ceiling").shortcut(Shortcut::key(KeyCode::C)).category("Add").enabled_when(idle));

    // Room
    registry.register(Action::new("room.clear_furniture").label("Clear Furniture").shortcut(Shortcut::ctrl_shift(KeyCode::C)).category("Room").enabled_when(idle));
    registry.register(Action::new("room.reset").label("Reset Room").shortcut(Shortcut::ctrl_shift(KeyCode::R)).category("Room").enabled_when(idle));
    registry.register(Action::new("room.grow").label("Grow Room").shortcut(Shortcut::ctrl(KeyCode::Equal)).category("Room").enabled_when(idle));
    registry.register(Action::new("room.shrink").label("Shrink Room").shortcut(Shortcut::ctrl(KeyCode::Minus)).category("Room").enabled_when(idle));

    // View
    registry.register(Action::new("view.toggle_snap").label("Toggle Grid Snap").shortcut(Shortcut::ctrl(KeyCode::G)).category("View"));
    registry.register(Action::new("view.toggle_orbit").label("Toggle Camera Orbit").shortcut(Shortcut::key(KeyCode::O)).category("View").enabled_when(idle));
    registry.register(Action::new("view.perspective").label("Perspective View").shortcut(Shortcut::key(KeyCode::F1)).category("View"));
    registry.register(Action::new("view.top").label("Top View").shortcut(Shortcut::key(KeyCode::F2)).category("View"));
    registry.register(Action::new("view.front").label("Front View").shortcut(Shortcut::key(KeyCode::F3)).category("View"));
    registry.register(Action::new("view.side").label("Side View").shortcut(Shortcut::key(KeyCode::F4)).category("View"));
    registry.register(Action::new("view.isometric").label("Isometric View").shortcut(Shortcut::key(KeyCode::F5)).category("View"));

    registry
}
