//! Room editor
//!
//! - Room store (validated mutations, id allocation)
//! - Placement (snapping, bounds)
//! - Selection, tools and picking
//! - Pointer drag with orbit-control lease
//! - 3D viewport drawing and keyboard actions

pub mod actions;
mod drag;
mod orbit;
mod picking;
pub mod placement;
mod selection;
mod state;
mod store;
mod viewport_3d;

pub use actions::{create_editor_actions, ActionContext, ActionRegistry, Modifiers};
pub use drag::{CursorStyle, DragController, DragOutcome, DragRefusal, DragUpdate, PointerView};
pub use orbit::{OrbitControls, OrbitLease};
pub use picking::{pick_entity, PickHit};
pub use placement::{constrain_to_room, snap_value, SnapSettings};
pub use selection::{EditorTool, Selection};
pub use state::*;
pub use store::{DimensionPatch, EntityPatch, RoomStore, StoreError};
pub use viewport_3d::{apply_cursor, draw_viewport_3d};
