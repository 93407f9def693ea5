//! Error taxonomy for layout and seating operations.

use crate::items::ItemId;
use crate::seating::GuestId;

/// Stable machine-readable code for an error, surfaced to the UI layer.
pub trait ErrorCode {
    fn error_code(&self) -> &'static str;
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LayoutError {
    #[error("item not found: {0}")]
    NotFound(ItemId),
    #[error("guest not found: {0}")]
    GuestNotFound(GuestId),
    #[error("item is not a table: {0}")]
    NotATable(ItemId),
    #[error("table {table} is full (capacity {capacity})")]
    CapacityExceeded { table: ItemId, capacity: u32 },
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),
    #[error("invalid table capacity: {0}")]
    InvalidCapacity(u32),
}

impl ErrorCode for LayoutError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "E_ITEM_NOT_FOUND",
            Self::GuestNotFound(_) => "E_GUEST_NOT_FOUND",
            Self::NotATable(_) => "E_NOT_A_TABLE",
            Self::CapacityExceeded { .. } => "E_CAPACITY_EXCEEDED",
            Self::InvalidGeometry(_) => "E_INVALID_GEOMETRY",
            Self::InvalidCapacity(_) => "E_INVALID_CAPACITY",
        }
    }
}
