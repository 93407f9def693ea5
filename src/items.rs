//! Item model: canvas items, their kinds, and the in-memory item store.
//!
//! This module defines what sits on a canvas (`CanvasItem`, `ItemKind`), the
//! input shape for new items (`ItemDraft`), a sparse geometry update
//! (`GeometryPatch`), the persisted geometry record (`ItemGeometry`), a typed
//! accessor for the presentation-only `props` bag (`Props`), and the store
//! that owns all live items (`ItemStore`).
//!
//! The store is the single choke point for geometry: sizes are clamped and
//! rotations normalized here, and non-finite input is rejected before any
//! mutation. Guest assignments are not tracked here; removing a table only
//! hands the removed item back so the caller can cascade.

#[cfg(test)]
#[path = "items_test.rs"]
mod items_test;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::error::LayoutError;
use crate::geometry::{Geometry, Point, Size, clamp_size, normalize_degrees};

/// Unique identifier for a canvas item.
pub type ItemId = Uuid;

/// Outline of a table. Rendering and hit-testing only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableShape {
    Round,
    Rectangular,
    Square,
}

/// Seating properties of a table item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSpec {
    /// Maximum number of guests seated at once. Always at least 1.
    pub capacity: u32,
    pub shape: TableShape,
    /// Display name such as "Table 4" or "Head table".
    #[serde(default)]
    pub label: String,
}

/// The kind of a canvas item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ItemKind {
    /// Moodboard photo tile.
    Image { src: String },
    /// Moodboard color chip; `color` is a CSS color string.
    ColorSwatch { color: String },
    /// Moodboard note.
    Text { body: String },
    /// Seating-plan table.
    Table(TableSpec),
}

impl ItemKind {
    #[must_use]
    pub fn is_table(&self) -> bool {
        matches!(self, Self::Table(_))
    }

    #[must_use]
    pub fn table(&self) -> Option<&TableSpec> {
        match self {
            Self::Table(spec) => Some(spec),
            _ => None,
        }
    }
}

/// A positioned item as stored in memory and on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasItem {
    pub id: ItemId,
    pub kind: ItemKind,
    /// Top-left corner before rotation, in canvas units.
    pub position: Point,
    pub size: Size,
    /// Clockwise rotation in degrees about the center, in `[0, 360)`.
    pub rotation: f64,
    /// Stacking order; lower values are painted beneath higher values.
    pub z_index: i64,
    /// Presentation-only properties (caption, fill, opacity).
    #[serde(default)]
    pub props: serde_json::Value,
}

impl CanvasItem {
    #[must_use]
    pub fn geometry(&self) -> Geometry {
        Geometry { position: self.position, size: self.size, rotation: self.rotation }
    }

    /// The record sent to persistence when an operation commits.
    #[must_use]
    pub fn placement(&self) -> ItemGeometry {
        ItemGeometry {
            position: self.position,
            size: self.size,
            rotation: self.rotation,
            z_index: self.z_index,
        }
    }

    /// Seat capacity, when this item is a table.
    #[must_use]
    pub fn capacity(&self) -> Option<u32> {
        self.kind.table().map(|spec| spec.capacity)
    }
}

/// Persisted geometry of one item.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ItemGeometry {
    pub position: Point,
    pub size: Size,
    pub rotation: f64,
    pub z_index: i64,
}

/// Everything needed to add an item; the store assigns `id` and `z_index`.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemDraft {
    pub kind: ItemKind,
    pub position: Point,
    pub size: Size,
    pub rotation: f64,
    pub props: serde_json::Value,
}

impl ItemDraft {
    #[must_use]
    pub fn new(kind: ItemKind, position: Point, size: Size) -> Self {
        Self { kind, position, size, rotation: 0.0, props: serde_json::json!({}) }
    }

    /// A table draft with the given seat count and outline.
    #[must_use]
    pub fn table(label: &str, capacity: u32, shape: TableShape, position: Point, size: Size) -> Self {
        Self::new(ItemKind::Table(TableSpec { capacity, shape, label: label.to_string() }), position, size)
    }

    #[must_use]
    pub fn with_rotation(mut self, rotation: f64) -> Self {
        self.rotation = rotation;
        self
    }

    #[must_use]
    pub fn with_props(mut self, props: serde_json::Value) -> Self {
        self.props = props;
        self
    }
}

/// Sparse geometry update. Only present fields are applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GeometryPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Point>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<Size>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
}

impl GeometryPatch {
    #[must_use]
    pub fn position(position: Point) -> Self {
        Self { position: Some(position), ..Default::default() }
    }

    #[must_use]
    pub fn size(size: Size) -> Self {
        Self { size: Some(size), ..Default::default() }
    }

    #[must_use]
    pub fn rotation(rotation: f64) -> Self {
        Self { rotation: Some(rotation), ..Default::default() }
    }

    /// A patch that replaces all three geometry fields.
    #[must_use]
    pub fn full(geometry: Geometry) -> Self {
        Self { position: Some(geometry.position), size: Some(geometry.size), rotation: Some(geometry.rotation) }
    }

    fn validate(&self) -> Result<(), LayoutError> {
        if let Some(p) = self.position {
            if !p.is_finite() {
                return Err(LayoutError::InvalidGeometry(format!("non-finite position {p:?}")));
            }
        }
        if let Some(s) = self.size {
            if !s.is_finite() {
                return Err(LayoutError::InvalidGeometry(format!("non-finite size {s:?}")));
            }
        }
        if let Some(r) = self.rotation {
            if !r.is_finite() {
                return Err(LayoutError::InvalidGeometry(format!("non-finite rotation {r}")));
            }
        }
        Ok(())
    }
}

/// Typed access to common fields of a `CanvasItem.props` JSON value.
pub struct Props<'a> {
    value: &'a serde_json::Value,
}

impl<'a> Props<'a> {
    #[must_use]
    pub fn new(value: &'a serde_json::Value) -> Self {
        Self { value }
    }

    /// Caption shown under a tile. Empty string when absent.
    #[must_use]
    pub fn caption(&self) -> &str {
        self.value.get("caption").and_then(|v| v.as_str()).unwrap_or("")
    }

    /// Fill color as a CSS color string. Defaults to `"#F4EDE4"` when absent.
    #[must_use]
    pub fn fill(&self) -> &str {
        self.value.get("fill").and_then(|v| v.as_str()).unwrap_or("#F4EDE4")
    }

    /// Opacity in `[0, 1]`. Defaults to `1.0`; out-of-range values are clamped.
    #[must_use]
    pub fn opacity(&self) -> f64 {
        self.value
            .get("opacity")
            .and_then(serde_json::Value::as_f64)
            .map_or(1.0, |o| o.clamp(0.0, 1.0))
    }
}

struct Slot {
    item: CanvasItem,
    /// Insertion order, used to break `z_index` ties.
    seq: u64,
}

/// In-memory store of the items on one canvas.
pub struct ItemStore {
    slots: HashMap<ItemId, Slot>,
    next_seq: u64,
}

impl ItemStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self { slots: HashMap::new(), next_seq: 0 }
    }

    /// Add a new item with a fresh id on top of the stack. Never fails:
    /// non-finite coordinates fall back to the origin, sizes are clamped,
    /// rotation is normalized and table capacity is floored at 1.
    pub fn add(&mut self, draft: ItemDraft) -> ItemId {
        let id = Uuid::new_v4();
        let z_index = self.next_z();
        let position = Point {
            x: if draft.position.x.is_finite() { draft.position.x } else { 0.0 },
            y: if draft.position.y.is_finite() { draft.position.y } else { 0.0 },
        };
        let mut kind = draft.kind;
        if let ItemKind::Table(spec) = &mut kind {
            spec.capacity = spec.capacity.max(1);
        }
        let item = CanvasItem {
            id,
            kind,
            position,
            size: clamp_size(draft.size),
            rotation: normalize_degrees(draft.rotation),
            z_index,
            props: draft.props,
        };
        self.push(item);
        id
    }

    fn push(&mut self, item: CanvasItem) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.slots.insert(item.id, Slot { item, seq });
    }

    /// Remove an item by id, returning it if it was present.
    pub fn remove(&mut self, id: &ItemId) -> Option<CanvasItem> {
        self.slots.remove(id).map(|slot| slot.item)
    }

    #[must_use]
    pub fn get(&self, id: &ItemId) -> Option<&CanvasItem> {
        self.slots.get(id).map(|slot| &slot.item)
    }

    #[must_use]
    pub fn contains(&self, id: &ItemId) -> bool {
        self.slots.contains_key(id)
    }

    /// Apply a sparse geometry update.
    ///
    /// # Errors
    ///
    /// `NotFound` if the item is absent, `InvalidGeometry` if any supplied
    /// value is not finite. Nothing is mutated on error.
    pub fn update_geometry(&mut self, id: &ItemId, patch: &GeometryPatch) -> Result<(), LayoutError> {
        let slot = self.slots.get_mut(id).ok_or(LayoutError::NotFound(*id))?;
        patch.validate()?;
        let item = &mut slot.item;
        if let Some(position) = patch.position {
            item.position = position;
        }
        if let Some(size) = patch.size {
            item.size = clamp_size(size);
        }
        if let Some(rotation) = patch.rotation {
            item.rotation = normalize_degrees(rotation);
        }
        Ok(())
    }

    /// Raise an item above every other item. Returns the new `z_index`.
    ///
    /// # Errors
    ///
    /// `NotFound` if the item is absent.
    pub fn bring_to_front(&mut self, id: &ItemId) -> Result<i64, LayoutError> {
        if !self.slots.contains_key(id) {
            return Err(LayoutError::NotFound(*id));
        }
        let z_index = self.next_z();
        let slot = self.slots.get_mut(id).ok_or(LayoutError::NotFound(*id))?;
        slot.item.z_index = z_index;
        Ok(z_index)
    }

    /// Change a table's capacity.
    ///
    /// # Errors
    ///
    /// `InvalidCapacity` for zero, `NotFound` if absent, `NotATable` for
    /// moodboard items.
    pub fn set_table_capacity(&mut self, id: &ItemId, capacity: u32) -> Result<(), LayoutError> {
        if capacity == 0 {
            return Err(LayoutError::InvalidCapacity(capacity));
        }
        let slot = self.slots.get_mut(id).ok_or(LayoutError::NotFound(*id))?;
        match &mut slot.item.kind {
            ItemKind::Table(spec) => {
                spec.capacity = capacity;
                Ok(())
            }
            _ => Err(LayoutError::NotATable(*id)),
        }
    }

    /// All items in paint order: ascending `z_index`, ties by insertion order.
    #[must_use]
    pub fn list(&self) -> Vec<&CanvasItem> {
        let mut slots: Vec<&Slot> = self.slots.values().collect();
        slots.sort_by(|a, b| a.item.z_index.cmp(&b.item.z_index).then_with(|| a.seq.cmp(&b.seq)));
        slots.into_iter().map(|slot| &slot.item).collect()
    }

    /// Table items, in no particular order.
    pub fn tables(&self) -> impl Iterator<Item = &CanvasItem> {
        self.slots.values().map(|slot| &slot.item).filter(|item| item.kind.is_table())
    }

    /// Highest `z_index` in the store, if any.
    #[must_use]
    pub fn max_z(&self) -> Option<i64> {
        self.slots.values().map(|slot| slot.item.z_index).max()
    }

    /// `z_index` for a new top item. Falls back to renumbering the stack when
    /// the maximum cannot be incremented.
    fn next_z(&mut self) -> i64 {
        match self.max_z() {
            None => 0,
            Some(z) => match z.checked_add(1) {
                Some(next) => next,
                None => {
                    warn!(max_z = z, "z_index exhausted; renumbering stack");
                    self.renumber_z()
                }
            },
        }
    }

    /// Rewrite `z_index` as `0..n` in paint order and return `n`.
    fn renumber_z(&mut self) -> i64 {
        let order: Vec<ItemId> = self.list().iter().map(|item| item.id).collect();
        let mut next = 0_i64;
        for id in &order {
            if let Some(slot) = self.slots.get_mut(id) {
                slot.item.z_index = next;
                next += 1;
            }
        }
        next
    }

    /// Replace all items with a loaded snapshot.
    ///
    /// Items with non-finite position or rotation are skipped with a warning;
    /// sizes are clamped and rotations normalized. Stacking order is kept but
    /// `z_index` is renumbered to `0..n`. Returns the skipped ids.
    pub fn load_snapshot(&mut self, items: Vec<CanvasItem>) -> Vec<ItemId> {
        self.slots.clear();
        self.next_seq = 0;
        let mut skipped = Vec::new();
        for mut item in items {
            if !item.position.is_finite() || !item.rotation.is_finite() {
                warn!(id = %item.id, "skipping item with invalid geometry");
                skipped.push(item.id);
                continue;
            }
            item.size = clamp_size(item.size);
            item.rotation = normalize_degrees(item.rotation);
            if let ItemKind::Table(spec) = &mut item.kind {
                spec.capacity = spec.capacity.max(1);
            }
            self.push(item);
        }
        self.renumber_z();
        skipped
    }

    /// Number of items currently in the store.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` if the store contains no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl Default for ItemStore {
    fn default() -> Self {
        Self::new()
    }
}
