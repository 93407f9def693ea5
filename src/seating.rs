//! Seating model: guests, their table assignments, and per-table capacity.
//!
//! DESIGN
//! ======
//! Assignment is tracked independently of geometry. The model keeps its own
//! registry of table capacities, kept in sync by the engine as tables are
//! added, resized in capacity, or deleted. A guest holds at most one seat;
//! a table reference on a guest is weak and is cleared when the table goes.
//!
//! ERROR HANDLING
//! ==============
//! Every check runs before mutation. A rejected assignment leaves the model
//! exactly as it was. Over-capacity tables can still arise from loaded data
//! or a capacity reduction; they are reported by `is_over_capacity` and
//! `conflicts`, never silently corrected.

#[cfg(test)]
#[path = "seating_test.rs"]
mod seating_test;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::LayoutError;
use crate::items::ItemId;

/// Unique identifier for a guest.
pub type GuestId = Uuid;

/// A guest on the list, optionally seated at a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guest {
    pub id: GuestId,
    pub name: String,
    /// Table the guest is seated at, if any.
    #[serde(default)]
    pub table_id: Option<ItemId>,
}

/// Guest-to-table mapping for one seating plan.
#[derive(Debug, Default)]
pub struct SeatingModel {
    guests: HashMap<GuestId, Guest>,
    /// Table id -> capacity.
    tables: HashMap<ItemId, u32>,
}

impl SeatingModel {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Tables ---

    /// Make a table available for seating, or update its capacity.
    pub fn register_table(&mut self, table_id: ItemId, capacity: u32) {
        self.tables.insert(table_id, capacity);
    }

    /// Forget a table, clearing every seat at it. Returns the unseated guests.
    pub fn unregister_table(&mut self, table_id: &ItemId) -> Vec<GuestId> {
        let cleared = self.unassign_all(table_id);
        self.tables.remove(table_id);
        cleared
    }

    #[must_use]
    pub fn has_table(&self, table_id: &ItemId) -> bool {
        self.tables.contains_key(table_id)
    }

    #[must_use]
    pub fn capacity(&self, table_id: &ItemId) -> Option<u32> {
        self.tables.get(table_id).copied()
    }

    /// Change a table's capacity. Lowering it below the current occupancy is
    /// allowed and shows up as a conflict.
    ///
    /// # Errors
    ///
    /// `InvalidCapacity` for zero, `NotFound` for an unknown table.
    pub fn set_capacity(&mut self, table_id: &ItemId, capacity: u32) -> Result<(), LayoutError> {
        if capacity == 0 {
            return Err(LayoutError::InvalidCapacity(capacity));
        }
        let slot = self.tables.get_mut(table_id).ok_or(LayoutError::NotFound(*table_id))?;
        *slot = capacity;
        Ok(())
    }

    // --- Guests ---

    /// Add an unseated guest and return its id.
    pub fn add_guest(&mut self, name: &str) -> GuestId {
        let id = Uuid::new_v4();
        self.guests.insert(id, Guest { id, name: name.to_string(), table_id: None });
        id
    }

    /// Insert or replace a guest record as-is. Callers are responsible for
    /// the table reference; see `LayoutEngine::load_layout`.
    pub fn insert_guest(&mut self, guest: Guest) {
        self.guests.insert(guest.id, guest);
    }

    /// Remove a guest, returning it if it was present.
    pub fn remove_guest(&mut self, guest_id: &GuestId) -> Option<Guest> {
        self.guests.remove(guest_id)
    }

    #[must_use]
    pub fn guest(&self, guest_id: &GuestId) -> Option<&Guest> {
        self.guests.get(guest_id)
    }

    /// Remove every guest and table.
    pub fn clear(&mut self) {
        self.guests.clear();
        self.tables.clear();
    }

    // --- Assignment ---

    /// Seat a guest at a table, moving them from any previous table.
    ///
    /// Returns `false` when the guest was already at that table.
    ///
    /// # Errors
    ///
    /// `GuestNotFound` / `NotFound` for unknown ids; `CapacityExceeded` when
    /// the table already holds `capacity` other guests.
    pub fn assign(&mut self, guest_id: &GuestId, table_id: &ItemId) -> Result<bool, LayoutError> {
        let current = self
            .guests
            .get(guest_id)
            .ok_or(LayoutError::GuestNotFound(*guest_id))?
            .table_id;
        let capacity = self.capacity(table_id).ok_or(LayoutError::NotFound(*table_id))?;

        if current == Some(*table_id) {
            return Ok(false);
        }
        if self.occupancy(table_id) >= usize::try_from(capacity).unwrap_or(usize::MAX) {
            return Err(LayoutError::CapacityExceeded { table: *table_id, capacity });
        }

        let guest = self.guests.get_mut(guest_id).ok_or(LayoutError::GuestNotFound(*guest_id))?;
        guest.table_id = Some(*table_id);
        Ok(true)
    }

    /// Clear a guest's seat. Returns whether anything changed.
    pub fn unassign(&mut self, guest_id: &GuestId) -> bool {
        match self.guests.get_mut(guest_id) {
            Some(guest) => guest.table_id.take().is_some(),
            None => false,
        }
    }

    /// Clear every seat at a table. Returns the affected guests.
    pub fn unassign_all(&mut self, table_id: &ItemId) -> Vec<GuestId> {
        let mut cleared = Vec::new();
        for guest in self.guests.values_mut() {
            if guest.table_id == Some(*table_id) {
                guest.table_id = None;
                cleared.push(guest.id);
            }
        }
        cleared
    }

    // --- Queries ---

    /// Number of guests seated at a table. Zero for unknown tables.
    #[must_use]
    pub fn occupancy(&self, table_id: &ItemId) -> usize {
        self.guests
            .values()
            .filter(|guest| guest.table_id == Some(*table_id))
            .count()
    }

    /// Whether more guests are seated than the table holds.
    #[must_use]
    pub fn is_over_capacity(&self, table_id: &ItemId) -> bool {
        self.capacity(table_id)
            .is_some_and(|capacity| self.occupancy(table_id) > usize::try_from(capacity).unwrap_or(usize::MAX))
    }

    /// Free seats at a table, or `None` for an unknown table.
    #[must_use]
    pub fn seats_remaining(&self, table_id: &ItemId) -> Option<usize> {
        let capacity = usize::try_from(self.capacity(table_id)?).unwrap_or(usize::MAX);
        Some(capacity.saturating_sub(self.occupancy(table_id)))
    }

    /// Guests seated at a table, sorted by name.
    #[must_use]
    pub fn guests_at(&self, table_id: &ItemId) -> Vec<&Guest> {
        sorted(self.guests.values().filter(|guest| guest.table_id == Some(*table_id)))
    }

    /// Guests without a seat, sorted by name.
    #[must_use]
    pub fn unassigned(&self) -> Vec<&Guest> {
        sorted(self.guests.values().filter(|guest| guest.table_id.is_none()))
    }

    /// Every guest, sorted by name.
    #[must_use]
    pub fn guests(&self) -> Vec<&Guest> {
        sorted(self.guests.values())
    }

    /// Tables currently holding more guests than their capacity, sorted by id.
    #[must_use]
    pub fn conflicts(&self) -> Vec<ItemId> {
        let mut over: Vec<ItemId> = self
            .tables
            .keys()
            .filter(|table_id| self.is_over_capacity(table_id))
            .copied()
            .collect();
        over.sort();
        over
    }

    #[must_use]
    pub fn guest_count(&self) -> usize {
        self.guests.len()
    }
}

fn sorted<'a>(guests: impl Iterator<Item = &'a Guest>) -> Vec<&'a Guest> {
    let mut out: Vec<&Guest> = guests.collect();
    out.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
    out
}
