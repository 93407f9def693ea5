//! Input model: pointer targets, keys, and the active-operation state.
//!
//! `PointerTarget` is what a pointer-down landed on, either supplied by the
//! host or produced by hit-testing. `OperationState` is the single gesture
//! being tracked between pointer-down and pointer-up. Each active variant
//! carries the values captured at the start of the gesture; every pointer
//! move is computed from those, never from the previous frame.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use serde::Serialize;

use crate::geometry::{Corner, Point, Size};
use crate::items::ItemId;

/// What a pointer-down landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerTarget {
    /// Empty canvas.
    Empty,
    /// The body of an item.
    Body(ItemId),
    /// A resize handle at one corner of an item.
    Resize(ItemId, Corner),
    /// The rotate handle above an item.
    Rotate(ItemId),
}

impl PointerTarget {
    #[must_use]
    pub fn item_id(self) -> Option<ItemId> {
        match self {
            Self::Empty => None,
            Self::Body(id) | Self::Resize(id, _) | Self::Rotate(id) => Some(id),
        }
    }
}

/// A keyboard key, named as the browser reports it (e.g. `"Delete"`, `"Escape"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

impl Key {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self(name.to_string())
    }
}

/// The controller's active operation. At most one exists at a time.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum OperationState {
    /// No gesture in progress; waiting for the next pointer-down.
    #[default]
    Idle,
    /// Moving an item.
    Dragging {
        id: ItemId,
        /// Pointer position at pointer-down.
        start_pointer: Point,
        /// Item position at pointer-down.
        start_position: Point,
    },
    /// Resizing an item by one corner; the opposite corner stays put.
    Resizing {
        id: ItemId,
        corner: Corner,
        start_pointer: Point,
        start_size: Size,
        start_position: Point,
    },
    /// Rotating an item in discrete steps.
    Rotating {
        id: ItemId,
        /// Rotation at the start of the gesture.
        start_angle: f64,
        /// Sum of the steps applied so far.
        applied: f64,
    },
}

impl OperationState {
    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// The item the active operation targets.
    #[must_use]
    pub fn item_id(&self) -> Option<ItemId> {
        match self {
            Self::Idle => None,
            Self::Dragging { id, .. } | Self::Resizing { id, .. } | Self::Rotating { id, .. } => Some(*id),
        }
    }

    /// CSS cursor hint for the host.
    #[must_use]
    pub fn cursor(&self) -> &'static str {
        match self {
            Self::Idle => "default",
            Self::Dragging { .. } => "grabbing",
            Self::Resizing { corner: Corner::Nw | Corner::Se, .. } => "nwse-resize",
            Self::Resizing { corner: Corner::Ne | Corner::Sw, .. } => "nesw-resize",
            Self::Rotating { .. } => "crosshair",
        }
    }
}
