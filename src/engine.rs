//! Layout engine: the interaction controller over the item store and the
//! seating model.
//!
//! DESIGN
//! ======
//! `LayoutEngine` owns both stores and is the only way to mutate them, so
//! every invariant is checked at one place. Pointer and key events drive a
//! single active operation (`OperationState`); geometry is applied to the
//! store on every move, computed from the values captured at pointer-down.
//! Persistence is told about a change once, when it commits: at pointer-up
//! for gestures, immediately for one-shot edits. Listeners are notified
//! synchronously after each mutation.
//!
//! Entering an operation acquires a pointer-capture lease from the host
//! (window-level listeners); the lease is released when the operation value
//! is dropped, so every exit path (pointer-up, cancel, abort, engine drop)
//! gives it back.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use std::cell::RefCell;
use std::rc::Rc;

use tracing::{debug, warn};

use crate::consts::{NUDGE_STEP, ROTATE_STEP_DEG};
use crate::error::LayoutError;
use crate::events::{Listeners, Subscription};
use crate::geometry::{Geometry, Point, delta_applied, normalize_degrees, resize_from_corner};
use crate::hit::hit_test;
use crate::input::{Key, OperationState, PointerTarget};
use crate::items::{CanvasItem, GeometryPatch, ItemDraft, ItemId, ItemStore};
use crate::persist::{LayoutSnapshot, PersistHandle, PersistOp};
use crate::seating::{Guest, GuestId, SeatingModel};

static IDLE: OperationState = OperationState::Idle;

/// Host hook for capturing the pointer outside the canvas while a gesture
/// is in progress (e.g. window-level move/up listeners).
pub trait PointerCapture {
    /// Start routing pointer events for `item_id` to the engine.
    fn acquire(&mut self, item_id: ItemId);
    /// Stop routing; called exactly once per `acquire`.
    fn release(&mut self);
}

/// Releases the host's pointer capture when dropped.
struct CaptureLease {
    target: Rc<RefCell<dyn PointerCapture>>,
}

impl Drop for CaptureLease {
    fn drop(&mut self) {
        match self.target.try_borrow_mut() {
            Ok(mut capture) => capture.release(),
            Err(_) => warn!("pointer capture busy; release skipped"),
        }
    }
}

struct ActiveOperation {
    state: OperationState,
    lease: Option<CaptureLease>,
}

/// What `load_layout` had to repair.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Items dropped for non-finite geometry.
    pub skipped_items: Vec<ItemId>,
    /// Guests whose table reference pointed at no table and was cleared.
    pub cleared_guests: Vec<GuestId>,
}

/// The engine behind the seating planner and the moodboard canvas.
pub struct LayoutEngine {
    items: ItemStore,
    seating: SeatingModel,
    active: Option<ActiveOperation>,
    selected: Option<ItemId>,
    listeners: Listeners,
    persistence: Option<PersistHandle>,
    capture: Option<Rc<RefCell<dyn PointerCapture>>>,
}

impl Default for LayoutEngine {
    fn default() -> Self {
        Self {
            items: ItemStore::new(),
            seating: SeatingModel::new(),
            active: None,
            selected: None,
            listeners: Listeners::new(),
            persistence: None,
            capture: None,
        }
    }
}

impl LayoutEngine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Wiring ---

    /// Route committed changes to a persistence queue.
    pub fn set_persistence(&mut self, handle: PersistHandle) {
        self.persistence = Some(handle);
    }

    /// Install the host's pointer-capture hook.
    pub fn set_pointer_capture(&mut self, capture: Rc<RefCell<dyn PointerCapture>>) {
        self.capture = Some(capture);
    }

    pub fn on_items_changed(&mut self, listener: impl FnMut(&[&CanvasItem]) + 'static) -> Subscription {
        self.listeners.on_items_changed(listener)
    }

    pub fn on_assignments_changed(&mut self, listener: impl FnMut(&SeatingModel) + 'static) -> Subscription {
        self.listeners.on_assignments_changed(listener)
    }

    pub fn on_operation_state_changed(&mut self, listener: impl FnMut(&OperationState) + 'static) -> Subscription {
        self.listeners.on_operation_state_changed(listener)
    }

    pub fn unsubscribe(&mut self, sub: Subscription) -> bool {
        self.listeners.unsubscribe(sub)
    }

    // --- Data inputs ---

    /// Replace all state with a loaded layout. Any active operation ends
    /// without a commit. Nothing is persisted.
    pub fn load_layout(&mut self, snapshot: LayoutSnapshot) -> LoadReport {
        self.abort_operation();
        self.selected = None;

        let skipped_items = self.items.load_snapshot(snapshot.items);
        self.seating.clear();
        for table in self.items.tables() {
            if let Some(capacity) = table.capacity() {
                self.seating.register_table(table.id, capacity);
            }
        }

        let mut cleared_guests = Vec::new();
        for mut guest in snapshot.guests {
            if let Some(table_id) = guest.table_id {
                if !self.seating.has_table(&table_id) {
                    warn!(guest_id = %guest.id, %table_id, "clearing seat at missing table");
                    guest.table_id = None;
                    cleared_guests.push(guest.id);
                }
            }
            self.seating.insert_guest(guest);
        }
        for table_id in self.seating.conflicts() {
            warn!(%table_id, "loaded table is over capacity");
        }

        self.notify_items();
        self.notify_assignments();
        LoadReport { skipped_items, cleared_guests }
    }

    // --- Items ---

    /// Add an item on top of the stack.
    pub fn add_item(&mut self, draft: ItemDraft) -> ItemId {
        let id = self.items.add(draft);
        if let Some(item) = self.items.get(&id) {
            if let Some(capacity) = item.capacity() {
                self.seating.register_table(id, capacity);
            }
            self.persist(PersistOp::SaveItem(item.clone()));
        }
        self.notify_items();
        id
    }

    /// Remove an item. Deleting a table unseats everyone at it. Absent ids
    /// are a no-op.
    pub fn remove_item(&mut self, id: &ItemId) -> Option<CanvasItem> {
        let removed = self.items.remove(id)?;
        if self.selected == Some(*id) {
            self.selected = None;
        }

        if removed.kind.is_table() {
            let unseated = self.seating.unregister_table(id);
            for guest_id in &unseated {
                self.persist(PersistOp::SaveAssignment { guest_id: *guest_id, table_id: None });
            }
            debug!(table_id = %id, unseated = unseated.len(), "table removed");
            self.notify_assignments();
        }

        self.persist(PersistOp::DeleteItem { item_id: *id });
        self.notify_items();
        Some(removed)
    }

    /// Apply and commit a geometry edit outside of a pointer gesture.
    ///
    /// # Errors
    ///
    /// `NotFound` or `InvalidGeometry` from the store.
    pub fn update_geometry(&mut self, id: &ItemId, patch: &GeometryPatch) -> Result<(), LayoutError> {
        self.items.update_geometry(id, patch)?;
        self.notify_items();
        self.commit_geometry(id);
        Ok(())
    }

    /// Raise an item above all others and commit.
    ///
    /// # Errors
    ///
    /// `NotFound` if the item is absent.
    pub fn bring_to_front(&mut self, id: &ItemId) -> Result<i64, LayoutError> {
        let z_index = self.items.bring_to_front(id)?;
        self.notify_items();
        self.commit_geometry(id);
        Ok(z_index)
    }

    /// Change a table's capacity. Lowering it below the current occupancy is
    /// allowed and reported as a conflict.
    ///
    /// # Errors
    ///
    /// `InvalidCapacity`, `NotFound` or `NotATable`.
    pub fn set_table_capacity(&mut self, id: &ItemId, capacity: u32) -> Result<(), LayoutError> {
        self.items.set_table_capacity(id, capacity)?;
        self.seating.set_capacity(id, capacity)?;
        if self.seating.is_over_capacity(id) {
            warn!(table_id = %id, capacity, occupancy = self.seating.occupancy(id), "table now over capacity");
        }
        if let Some(item) = self.items.get(id) {
            self.persist(PersistOp::SaveItem(item.clone()));
        }
        self.notify_items();
        self.notify_assignments();
        Ok(())
    }

    // --- Guests ---

    pub fn add_guest(&mut self, name: &str) -> GuestId {
        let id = self.seating.add_guest(name);
        self.notify_assignments();
        id
    }

    pub fn remove_guest(&mut self, id: &GuestId) -> Option<Guest> {
        let removed = self.seating.remove_guest(id)?;
        self.notify_assignments();
        Some(removed)
    }

    /// Seat a guest at a table.
    ///
    /// # Errors
    ///
    /// `GuestNotFound`, `NotFound` or `CapacityExceeded`; the model is left
    /// unchanged.
    pub fn assign(&mut self, guest_id: &GuestId, table_id: &ItemId) -> Result<(), LayoutError> {
        if self.seating.assign(guest_id, table_id)? {
            self.persist(PersistOp::SaveAssignment { guest_id: *guest_id, table_id: Some(*table_id) });
            self.notify_assignments();
        }
        Ok(())
    }

    /// Clear a guest's seat. Idempotent.
    pub fn unassign(&mut self, guest_id: &GuestId) {
        if self.seating.unassign(guest_id) {
            self.persist(PersistOp::SaveAssignment { guest_id: *guest_id, table_id: None });
            self.notify_assignments();
        }
    }

    // --- Queries ---

    #[must_use]
    pub fn items(&self) -> &ItemStore {
        &self.items
    }

    #[must_use]
    pub fn seating(&self) -> &SeatingModel {
        &self.seating
    }

    /// Items in paint order.
    #[must_use]
    pub fn list(&self) -> Vec<&CanvasItem> {
        self.items.list()
    }

    #[must_use]
    pub fn item(&self, id: &ItemId) -> Option<&CanvasItem> {
        self.items.get(id)
    }

    #[must_use]
    pub fn occupancy(&self, table_id: &ItemId) -> usize {
        self.seating.occupancy(table_id)
    }

    #[must_use]
    pub fn is_over_capacity(&self, table_id: &ItemId) -> bool {
        self.seating.is_over_capacity(table_id)
    }

    #[must_use]
    pub fn selection(&self) -> Option<ItemId> {
        self.selected
    }

    #[must_use]
    pub fn operation_state(&self) -> &OperationState {
        self.active.as_ref().map_or(&IDLE, |active| &active.state)
    }

    /// Select an item (or clear the selection) without starting a gesture.
    ///
    /// # Errors
    ///
    /// `NotFound` if the item is absent.
    pub fn select(&mut self, id: Option<ItemId>) -> Result<(), LayoutError> {
        if let Some(id) = id {
            if !self.items.contains(&id) {
                return Err(LayoutError::NotFound(id));
            }
        }
        self.selected = id;
        Ok(())
    }

    // --- Pointer input ---

    /// Hit-test `pointer` and dispatch the press to whatever is under it.
    ///
    /// # Errors
    ///
    /// See [`Self::pointer_down`].
    pub fn pointer_down_at(&mut self, pointer: Point) -> Result<(), LayoutError> {
        if self.active.is_some() {
            debug!("pointer down ignored; operation active");
            return Ok(());
        }
        let target = hit_test(pointer, &self.items, self.selected).map_or(PointerTarget::Empty, |hit| hit.target());
        self.pointer_down(target, pointer)
    }

    /// Start an operation. Ignored while another operation is active.
    ///
    /// Handles only count on the selected item; a handle press on any other
    /// item is treated as a body press.
    ///
    /// # Errors
    ///
    /// `NotFound` if the target item is absent; the engine stays idle.
    pub fn pointer_down(&mut self, target: PointerTarget, pointer: Point) -> Result<(), LayoutError> {
        if self.active.is_some() {
            debug!(?target, "pointer down ignored; operation active");
            return Ok(());
        }

        let Some(id) = target.item_id() else {
            self.selected = None;
            return Ok(());
        };
        let handle_allowed = self.selected == Some(id);

        self.items.bring_to_front(&id)?;
        self.selected = Some(id);
        let item = self.items.get(&id).ok_or(LayoutError::NotFound(id))?;

        let state = match target {
            PointerTarget::Resize(_, corner) if handle_allowed => OperationState::Resizing {
                id,
                corner,
                start_pointer: pointer,
                start_size: item.size,
                start_position: item.position,
            },
            PointerTarget::Rotate(_) if handle_allowed => {
                OperationState::Rotating { id, start_angle: item.rotation, applied: 0.0 }
            }
            _ => OperationState::Dragging { id, start_pointer: pointer, start_position: item.position },
        };

        self.notify_items();
        self.enter(state);
        Ok(())
    }

    /// Continue the active drag or resize. Moves while idle or rotating are
    /// ignored.
    ///
    /// # Errors
    ///
    /// `NotFound` if the item vanished mid-gesture; the operation is aborted.
    pub fn pointer_move(&mut self, pointer: Point) -> Result<(), LayoutError> {
        let Some(active) = &self.active else {
            return Ok(());
        };

        match active.state.clone() {
            OperationState::Dragging { id, start_pointer, start_position } => {
                let position =
                    delta_applied(start_position, pointer.x - start_pointer.x, pointer.y - start_pointer.y);
                self.apply_during_operation(&id, &GeometryPatch::position(position))
            }
            OperationState::Resizing { id, corner, start_pointer, start_size, start_position } => {
                let Some(item) = self.items.get(&id) else {
                    self.abort_operation();
                    return Err(LayoutError::NotFound(id));
                };
                let start = Geometry { position: start_position, size: start_size, rotation: item.rotation };
                let resized =
                    resize_from_corner(&start, corner, pointer.x - start_pointer.x, pointer.y - start_pointer.y);
                let patch = GeometryPatch { position: Some(resized.position), size: Some(resized.size), rotation: None };
                self.apply_during_operation(&id, &patch)
            }
            OperationState::Rotating { .. } | OperationState::Idle => Ok(()),
        }
    }

    /// Rotate by `delta_deg` during a rotate gesture. The result is always
    /// `start_angle + total applied`, normalized. Ignored outside a rotate
    /// gesture or for non-finite deltas.
    ///
    /// # Errors
    ///
    /// `NotFound` if the item vanished mid-gesture; the operation is aborted.
    pub fn rotate_by(&mut self, delta_deg: f64) -> Result<(), LayoutError> {
        if !delta_deg.is_finite() {
            debug!(delta_deg, "non-finite rotation ignored");
            return Ok(());
        }
        let Some(ActiveOperation { state: OperationState::Rotating { id, start_angle, applied }, .. }) = &self.active
        else {
            return Ok(());
        };
        let (id, start_angle, applied) = (*id, *start_angle, *applied + delta_deg);

        self.apply_during_operation(&id, &GeometryPatch::rotation(normalize_degrees(start_angle + applied)))?;
        if let Some(ActiveOperation { state: OperationState::Rotating { applied: total, .. }, .. }) = &mut self.active {
            *total = applied;
        }
        Ok(())
    }

    /// Finish the active operation and commit it.
    ///
    /// # Errors
    ///
    /// `NotFound` if the item vanished mid-gesture; nothing is committed.
    pub fn pointer_up(&mut self) -> Result<(), LayoutError> {
        self.finish_operation("pointer up")
    }

    /// The host lost pointer capture (window blur, touch cancel). Ends the
    /// operation, keeping and committing what was applied.
    ///
    /// # Errors
    ///
    /// `NotFound` if the item vanished mid-gesture; nothing is committed.
    pub fn pointer_cancel(&mut self) -> Result<(), LayoutError> {
        self.finish_operation("pointer cancel")
    }

    /// The host's capture was taken away (window blur, tab switch). Same as
    /// [`Self::pointer_cancel`].
    ///
    /// # Errors
    ///
    /// `NotFound` if the item vanished mid-gesture; nothing is committed.
    pub fn capture_lost(&mut self) -> Result<(), LayoutError> {
        self.finish_operation("capture lost")
    }

    /// Restore the geometry captured at pointer-down, then commit and go idle.
    ///
    /// # Errors
    ///
    /// `NotFound` if the item vanished mid-gesture.
    pub fn revert_operation(&mut self) -> Result<(), LayoutError> {
        let Some(active) = &self.active else {
            return Ok(());
        };
        let (id, patch) = match active.state {
            OperationState::Dragging { id, start_position, .. } => (id, GeometryPatch::position(start_position)),
            OperationState::Resizing { id, start_size, start_position, .. } => {
                (id, GeometryPatch { position: Some(start_position), size: Some(start_size), rotation: None })
            }
            OperationState::Rotating { id, start_angle, .. } => (id, GeometryPatch::rotation(start_angle)),
            OperationState::Idle => return Ok(()),
        };
        self.apply_during_operation(&id, &patch)?;
        self.finish_operation("reverted")
    }

    /// Delete the selected item. Ignored while an operation is active.
    pub fn delete_selected(&mut self) -> Option<CanvasItem> {
        if self.active.is_some() {
            debug!("delete ignored; operation active");
            return None;
        }
        let id = self.selected?;
        self.remove_item(&id)
    }

    /// Move the selected item by a fixed delta and commit. Ignored while an
    /// operation is active or nothing is selected.
    ///
    /// # Errors
    ///
    /// `NotFound` if the selection no longer exists.
    pub fn nudge_selected(&mut self, dx: f64, dy: f64) -> Result<(), LayoutError> {
        let Some(id) = self.idle_selection() else {
            return Ok(());
        };
        let item = self.items.get(&id).ok_or(LayoutError::NotFound(id))?;
        let position = delta_applied(item.position, dx, dy);
        self.update_geometry(&id, &GeometryPatch::position(position))
    }

    /// Rotate the selected item by `delta_deg` and commit. Ignored while an
    /// operation is active or nothing is selected.
    ///
    /// # Errors
    ///
    /// `NotFound` if the selection no longer exists.
    pub fn rotate_selected(&mut self, delta_deg: f64) -> Result<(), LayoutError> {
        let Some(id) = self.idle_selection() else {
            return Ok(());
        };
        if !delta_deg.is_finite() {
            return Ok(());
        }
        let item = self.items.get(&id).ok_or(LayoutError::NotFound(id))?;
        let rotation = normalize_degrees(item.rotation + delta_deg);
        self.update_geometry(&id, &GeometryPatch::rotation(rotation))
    }

    // --- Keyboard input ---

    /// Handle a key press.
    ///
    /// | Key | Idle | During an operation |
    /// |-----|------|---------------------|
    /// | `Escape` | clear selection | revert and end |
    /// | `Delete`, `Backspace` | delete selected | ignored |
    /// | arrows | nudge selected | ignored |
    /// | `[` / `]` | rotate selected one step ccw / cw | rotate step while rotating |
    ///
    /// # Errors
    ///
    /// Propagates `NotFound` from the underlying operation.
    pub fn on_key_down(&mut self, key: &Key) -> Result<(), LayoutError> {
        let active = self.active.is_some();
        match key.0.as_str() {
            "Escape" if active => self.revert_operation(),
            "Escape" => {
                self.selected = None;
                Ok(())
            }
            "Delete" | "Backspace" => {
                if let Some(item) = self.delete_selected() {
                    debug!(id = %item.id, "deleted from keyboard");
                }
                Ok(())
            }
            "ArrowLeft" => self.nudge_selected(-NUDGE_STEP, 0.0),
            "ArrowRight" => self.nudge_selected(NUDGE_STEP, 0.0),
            "ArrowUp" => self.nudge_selected(0.0, -NUDGE_STEP),
            "ArrowDown" => self.nudge_selected(0.0, NUDGE_STEP),
            "[" if active => self.rotate_by(-ROTATE_STEP_DEG),
            "]" if active => self.rotate_by(ROTATE_STEP_DEG),
            "[" => self.rotate_selected(-ROTATE_STEP_DEG),
            "]" => self.rotate_selected(ROTATE_STEP_DEG),
            _ => Ok(()),
        }
    }

    // --- Internals ---

    fn idle_selection(&self) -> Option<ItemId> {
        if self.active.is_some() { None } else { self.selected }
    }

    fn enter(&mut self, state: OperationState) {
        let lease = match (&self.capture, state.item_id()) {
            (Some(capture), Some(id)) => match capture.try_borrow_mut() {
                Ok(mut c) => {
                    c.acquire(id);
                    Some(CaptureLease { target: Rc::clone(capture) })
                }
                Err(_) => {
                    warn!(%id, "pointer capture busy; continuing without capture");
                    None
                }
            },
            _ => None,
        };
        debug!(cursor = state.cursor(), item = ?state.item_id(), "operation started");
        self.listeners.emit_operation(&state);
        self.active = Some(ActiveOperation { state, lease });
    }

    /// Leave the active operation, releasing capture, and return its state.
    fn exit(&mut self) -> Option<OperationState> {
        let ActiveOperation { state, lease } = self.active.take()?;
        drop(lease);
        self.listeners.emit_operation(&IDLE);
        Some(state)
    }

    /// End the active operation without a commit.
    fn abort_operation(&mut self) {
        if let Some(state) = self.exit() {
            debug!(item = ?state.item_id(), "operation aborted");
        }
    }

    fn finish_operation(&mut self, reason: &'static str) -> Result<(), LayoutError> {
        let Some(state) = self.exit() else {
            return Ok(());
        };
        let Some(id) = state.item_id() else {
            return Ok(());
        };
        if !self.items.contains(&id) {
            debug!(%id, reason, "operation target vanished; nothing to commit");
            return Err(LayoutError::NotFound(id));
        }
        debug!(%id, reason, "operation committed");
        self.commit_geometry(&id);
        Ok(())
    }

    fn apply_during_operation(&mut self, id: &ItemId, patch: &GeometryPatch) -> Result<(), LayoutError> {
        match self.items.update_geometry(id, patch) {
            Ok(()) => {
                self.notify_items();
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, %id, "geometry update failed; aborting operation");
                self.abort_operation();
                Err(e)
            }
        }
    }

    fn commit_geometry(&self, id: &ItemId) {
        if let Some(item) = self.items.get(id) {
            self.persist(PersistOp::SaveGeometry { item_id: *id, geometry: item.placement() });
        }
    }

    fn persist(&self, op: PersistOp) {
        if let Some(handle) = &self.persistence {
            if !handle.enqueue(op) {
                debug!("committed change not queued");
            }
        }
    }

    fn notify_items(&mut self) {
        let items = self.items.list();
        self.listeners.emit_items(&items);
    }

    fn notify_assignments(&mut self) {
        self.listeners.emit_assignments(&self.seating);
    }
}
