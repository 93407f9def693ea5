//! Interactive layout engine for a wedding planner's seating chart and
//! moodboard.
//!
//! The engine owns the items on one canvas (tables, photos, swatches, text),
//! turns pointer and keyboard input into drag, resize and rotate operations,
//! and tracks which guest sits at which table. Rendering and durable storage
//! live outside the crate: the host subscribes to change notifications and
//! supplies a [`persist::PersistenceGateway`].
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | [`engine::LayoutEngine`], the interaction controller and facade |
//! | [`items`] | Canvas item types and the in-memory [`items::ItemStore`] |
//! | [`seating`] | Guests and the [`seating::SeatingModel`] |
//! | [`geometry`] | Points, sizes, rotation and corner-anchored resize |
//! | [`input`] | Pointer targets, keys and the operation state machine states |
//! | [`hit`] | Hit-testing items and the selected item's handles |
//! | [`events`] | Change listeners and subscriptions |
//! | [`persist`] | Gateway trait, commit queue and background worker |
//! | [`error`] | [`error::LayoutError`] and stable error codes |
//! | [`consts`] | Shared numeric constants (minimum size, rotate step, etc.) |

pub mod consts;
pub mod engine;
pub mod error;
pub mod events;
pub mod geometry;
pub mod hit;
pub mod input;
pub mod items;
pub mod persist;
pub mod seating;

pub use engine::{LayoutEngine, LoadReport, PointerCapture};
pub use error::{ErrorCode, LayoutError};
