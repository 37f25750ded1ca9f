//! Tool and selection state
//!
//! Select and Move keep the current selection; switching to Rotate or Scale
//! drops it. Picking an entity while one of those is active falls back to
//! Select.

use crate::world::{EntityId, EntityKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditorTool {
    #[default]
    Select,
    Move,
    Rotate,
    Scale,
}

impl EditorTool {
    pub fn label(self) -> &'static str {
        match self {
            EditorTool::Select => "Select",
            EditorTool::Move => "Move",
            EditorTool::Rotate => "Rotate",
            EditorTool::Scale => "Scale",
        }
    }

    /// Tools that keep (and act on) the selection
    pub fn keeps_selection(self) -> bool {
        matches!(self, EditorTool::Select | EditorTool::Move)
    }

    /// Whether pressing on an entity of `kind` with this tool starts a drag
    pub fn drags(self, kind: EntityKind) -> bool {
        match self {
            EditorTool::Move => true,
            EditorTool::Select => kind == EntityKind::Furniture,
            EditorTool::Rotate | EditorTool::Scale => false,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Selection {
    tool: EditorTool,
    selected: Option<EntityId>,
    properties_open: bool,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tool(&self) -> EditorTool {
        self.tool
    }

    pub fn selected(&self) -> Option<EntityId> {
        self.selected
    }

    pub fn is_selected(&self, id: EntityId) -> bool {
        self.selected == Some(id)
    }

    pub fn properties_open(&self) -> bool {
        self.properties_open
    }

    pub fn set_properties_open(&mut self, open: bool) {
        self.properties_open = open && self.selected.is_some();
    }

    pub fn select_tool(&mut self, tool: EditorTool) {
        self.tool = tool;
        if !tool.keeps_selection() {
            self.selected = None;
            self.properties_open = false;
        }
    }

    /// Select an entity (opening its properties) or, with `None`, deselect
    pub fn select_entity(&mut self, entity: Option<EntityId>) {
        self.selected = entity;
        match entity {
            Some(_) => {
                if !self.tool.keeps_selection() {
                    self.tool = EditorTool::Select;
                }
                self.properties_open = true;
            }
            None => self.properties_open = false,
        }
    }

    /// Newly created entities are selected with the Select tool
    pub fn select_new(&mut self, entity: EntityId) {
        self.tool = EditorTool::Select;
        self.select_entity(Some(entity));
    }

    /// Drop the selection if it points at `id`
    pub fn forget(&mut self, id: EntityId) {
        if self.selected == Some(id) {
            self.select_entity(None);
        }
    }
}
