//! Drag session controller
//!
//! Turns pointer-down / pointer-move / pointer-up into entity moves:
//! - `begin`: remember where on the entity the user grabbed, suspend orbiting
//! - `update`: re-map the pointer, subtract the grab offset, run placement
//! - `end` / `cancel`: release the session and hand orbiting back
//!
//! While a session is live the controller captures the pointer; every move
//! and release is routed here whatever is under the cursor.

use tracing::{debug, warn};

use super::orbit::{OrbitControls, OrbitLease};
use super::store::RoomStore;
use crate::viewport::{pick_plane_point, screen_to_ray, screen_to_world, OrbitCamera, SurfaceSize, Vec3};
use crate::world::{EntityId, EntityKind, IdAllocator};

/// Cosine of 15°. A ceiling cannot be dragged from a camera looking closer
/// than this to straight down or up: the vertical drag plane is seen edge-on
/// and tiny pointer moves turn into huge height changes.
const MAX_CEILING_DRAG_STEEPNESS: f32 = 0.966;

/// Camera and surface a pointer position is relative to. Either may be
/// missing while the viewport is still being laid out.
#[derive(Debug, Clone, Copy)]
pub struct PointerView<'a> {
    pub camera: Option<&'a OrbitCamera>,
    pub surface: Option<SurfaceSize>,
}

impl<'a> PointerView<'a> {
    pub fn new(camera: &'a OrbitCamera, surface: SurfaceSize) -> Self {
        Self { camera: Some(camera), surface: Some(surface) }
    }

    /// Point on the drag plane for an entity of `kind` whose reference
    /// point is `anchor`.
    ///
    /// Floor entities drag on y=0. A ceiling drags on the vertical plane
    /// through its anchor that faces the camera, and does not map at all
    /// from a near-vertical view.
    pub fn drag_point(&self, pointer: (f32, f32), kind: EntityKind, anchor: Vec3) -> Option<Vec3> {
        match kind {
            EntityKind::Furniture | EntityKind::Wall => screen_to_world(pointer, self.camera, self.surface),
            EntityKind::Ceiling => {
                let camera = self.camera?;
                let surface = self.surface.filter(SurfaceSize::is_usable)?;
                if camera.forward.y.abs() > MAX_CEILING_DRAG_STEEPNESS {
                    return None;
                }
                let facing = camera.forward.horizontal();
                let ray = screen_to_ray(pointer, surface, camera);
                pick_plane_point(&ray, anchor, -facing.normalize())
            }
        }
    }
}

/// Pointer cursor the renderer should show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorStyle {
    #[default]
    Default,
    /// Hovering something that can be dragged
    Grab,
    /// A drag is in progress
    Grabbing,
}

/// Why a drag could not start
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragRefusal {
    /// A session is already live
    AlreadyDragging,
    /// Another holder has the orbit controls suspended
    OrbitBusy,
    /// The entity does not exist
    UnknownEntity,
    /// The pointer does not map onto the drag plane
    Unmapped,
}

/// A live drag
#[derive(Debug)]
struct DragSession {
    entity: EntityId,
    kind: EntityKind,
    /// Grab point minus entity position at press time
    offset: Vec3,
    initial_position: Vec3,
    current_position: Vec3,
    lease: OrbitLease,
}

/// Result of a pointer move
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragUpdate {
    /// No session
    None,
    /// The pointer did not map this frame; nothing changed
    Skipped,
    /// Entity moved to `position` (after placement)
    Moved { entity: EntityId, position: Vec3 },
    /// The entity disappeared mid-drag; the session was closed
    Ended,
}

/// Summary of a finished or cancelled drag
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragOutcome {
    pub entity: EntityId,
    pub kind: EntityKind,
    pub from: Vec3,
    pub to: Vec3,
}

#[derive(Debug, Default)]
pub struct DragController {
    session: Option<DragSession>,
    hover_draggable: bool,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.session.is_some()
    }

    /// Pointer events go to the session rather than to whatever is under the cursor
    pub fn captures_pointer(&self) -> bool {
        self.is_dragging()
    }

    pub fn dragged_entity(&self) -> Option<EntityId> {
        self.session.as_ref().map(|s| s.entity)
    }

    pub fn set_hover(&mut self, draggable: bool) {
        self.hover_draggable = draggable;
    }

    pub fn cursor(&self) -> CursorStyle {
        if self.is_dragging() {
            CursorStyle::Grabbing
        } else if self.hover_draggable {
            CursorStyle::Grab
        } else {
            CursorStyle::Default
        }
    }

    /// Start dragging `entity` from the pressed pointer position
    pub fn begin<A: IdAllocator>(
        &mut self,
        entity: EntityId,
        pointer: (f32, f32),
        view: &PointerView<'_>,
        store: &RoomStore<A>,
        orbit: &mut OrbitControls,
    ) -> Result<(), DragRefusal> {
        if self.session.is_some() {
            return Err(DragRefusal::AlreadyDragging);
        }
        let kind = store.room().kind_of(entity).ok_or(DragRefusal::UnknownEntity)?;
        let position = store.entity_position(entity).ok_or(DragRefusal::UnknownEntity)?;
        let grab = view.drag_point(pointer, kind, position).ok_or(DragRefusal::Unmapped)?;
        let lease = orbit.suspend().ok_or(DragRefusal::OrbitBusy)?;

        debug!(%entity, kind = kind.label(), "drag started");
        self.session = Some(DragSession {
            entity,
            kind,
            offset: grab - position,
            initial_position: position,
            current_position: position,
            lease,
        });
        Ok(())
    }

    /// Follow the pointer. Unmappable pointer positions leave the entity where it is.
    pub fn update<A: IdAllocator>(
        &mut self,
        pointer: (f32, f32),
        view: &PointerView<'_>,
        store: &mut RoomStore<A>,
        orbit: &mut OrbitControls,
    ) -> DragUpdate {
        let Some(session) = self.session.as_mut() else {
            return DragUpdate::None;
        };

        let Some(point) = view.drag_point(pointer, session.kind, session.current_position) else {
            return DragUpdate::Skipped;
        };
        let candidate = point - session.offset;

        match store.move_entity(session.entity, candidate) {
            Some(position) => {
                session.current_position = position;
                DragUpdate::Moved { entity: session.entity, position }
            }
            None => {
                warn!(entity = %session.entity, "dragged entity vanished, ending drag");
                self.release(orbit);
                DragUpdate::Ended
            }
        }
    }

    /// Commit the drag (pointer-up). Idempotent when no session is live.
    pub fn end(&mut self, orbit: &mut OrbitControls) -> Option<DragOutcome> {
        let outcome = self.release(orbit)?;
        debug!(entity = %outcome.entity, "drag ended");
        Some(outcome)
    }

    /// Abandon the drag and put the entity back where it started
    pub fn cancel<A: IdAllocator>(&mut self, store: &mut RoomStore<A>, orbit: &mut OrbitControls) -> Option<DragOutcome> {
        let outcome = self.release(orbit)?;
        if outcome.from != outcome.to {
            store.restore_position(outcome.entity, outcome.from);
        }
        debug!(entity = %outcome.entity, "drag cancelled");
        Some(DragOutcome { to: outcome.from, ..outcome })
    }

    fn release(&mut self, orbit: &mut OrbitControls) -> Option<DragOutcome> {
        let session = self.session.take()?;
        orbit.resume(session.lease);
        Some(DragOutcome {
            entity: session.entity,
            kind: session.kind,
            from: session.initial_position,
            to: session.current_position,
        })
    }
}
