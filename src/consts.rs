//! Shared numeric constants for the layout engine.

// ── Geometry ────────────────────────────────────────────────────

/// Smallest width or height any canvas item may have, in canvas units.
pub const MIN_SIZE: f64 = 20.0;

/// Pointer deltas are snapped to this grid (1/64 canvas unit). Positions on
/// the grid stay on it, so translating and translating back is exact.
pub const POSITION_QUANTUM: f64 = 1.0 / 64.0;

// ── Interaction ─────────────────────────────────────────────────

/// Angular step for discrete rotation, in degrees.
pub const ROTATE_STEP_DEG: f64 = 15.0;

/// Distance an arrow-key nudge moves the selected item, in canvas units.
pub const NUDGE_STEP: f64 = 1.0;

// ── Hit-testing ─────────────────────────────────────────────────

/// Hit slop around resize corners and the rotate handle, in canvas units.
pub const HANDLE_RADIUS: f64 = 8.0;

/// Distance from the top edge to the rotate handle, in canvas units.
pub const ROTATE_HANDLE_OFFSET: f64 = 24.0;
