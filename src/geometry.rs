//! Pure geometry: points, sizes, rotation, and corner math.
//!
//! Every function here is side-effect free. Item geometry is stored as an
//! unrotated top-left anchor plus a size, with rotation applied about the
//! bounding-box center. The resize rule lives here too so that all four
//! corners share one anchor-preserving implementation.

#[cfg(test)]
#[path = "geometry_test.rs"]
mod geometry_test;

use serde::{Deserialize, Serialize};

use crate::consts::{MIN_SIZE, POSITION_QUANTUM};

/// A point (or vector) in canvas units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Width and height in canvas units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub fn is_finite(self) -> bool {
        self.width.is_finite() && self.height.is_finite()
    }
}

/// Position, size and rotation of one item.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    /// Top-left corner before rotation.
    pub position: Point,
    pub size: Size,
    /// Clockwise rotation in degrees about the center, in `[0, 360)`.
    pub rotation: f64,
}

/// One of the four corners of an item's bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Corner {
    Nw,
    Ne,
    Se,
    Sw,
}

impl Corner {
    /// All corners in clockwise order starting at north-west.
    pub const ALL: [Corner; 4] = [Corner::Nw, Corner::Ne, Corner::Se, Corner::Sw];

    /// The diagonally opposite corner.
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Self::Nw => Self::Se,
            Self::Ne => Self::Sw,
            Self::Se => Self::Nw,
            Self::Sw => Self::Ne,
        }
    }

    /// Unit direction of this corner from the center, in the item's local frame.
    fn signs(self) -> (f64, f64) {
        match self {
            Self::Nw => (-1.0, -1.0),
            Self::Ne => (1.0, -1.0),
            Self::Se => (1.0, 1.0),
            Self::Sw => (-1.0, 1.0),
        }
    }
}

/// Normalize an angle into `[0, 360)`. Non-finite input maps to `0`.
#[must_use]
pub fn normalize_degrees(deg: f64) -> f64 {
    if !deg.is_finite() {
        return 0.0;
    }
    let wrapped = deg.rem_euclid(360.0);
    // rem_euclid rounds tiny negative inputs up to exactly 360.
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Enforce `width, height >= MIN_SIZE`. Non-finite dimensions become `MIN_SIZE`.
#[must_use]
pub fn clamp_size(size: Size) -> Size {
    Size { width: clamp_dimension(size.width), height: clamp_dimension(size.height) }
}

fn clamp_dimension(value: f64) -> f64 {
    if value.is_finite() { value.max(MIN_SIZE) } else { MIN_SIZE }
}

/// Snap a pointer delta to the position quantum. Non-finite deltas become `0`.
#[must_use]
pub fn quantize(delta: f64) -> f64 {
    if !delta.is_finite() {
        return 0.0;
    }
    (delta / POSITION_QUANTUM).round() * POSITION_QUANTUM
}

/// Translate `position` by a screen-space delta.
///
/// `delta_applied(delta_applied(p, dx, dy), -dx, -dy) == p` holds exactly for
/// any `p` on the position grid.
#[must_use]
pub fn delta_applied(position: Point, dx: f64, dy: f64) -> Point {
    Point { x: position.x + quantize(dx), y: position.y + quantize(dy) }
}

/// Bounding-box center, the rotation pivot.
#[must_use]
pub fn center(geometry: &Geometry) -> Point {
    Point {
        x: geometry.position.x + geometry.size.width / 2.0,
        y: geometry.position.y + geometry.size.height / 2.0,
    }
}

/// Rotate a vector clockwise (canvas y points down) by `deg` degrees.
#[must_use]
pub fn rotate_vector(v: Point, deg: f64) -> Point {
    if deg.abs() < f64::EPSILON {
        return v;
    }
    let (sin, cos) = deg.to_radians().sin_cos();
    Point { x: v.x * cos - v.y * sin, y: v.x * sin + v.y * cos }
}

/// Canvas coordinates of one corner after rotation.
#[must_use]
pub fn corner_point(geometry: &Geometry, corner: Corner) -> Point {
    let c = center(geometry);
    let (sx, sy) = corner.signs();
    let offset = Point { x: sx * geometry.size.width / 2.0, y: sy * geometry.size.height / 2.0 };
    let rotated = rotate_vector(offset, geometry.rotation);
    Point { x: c.x + rotated.x, y: c.y + rotated.y }
}

/// The four corners after rotation about the center, ordered NW, NE, SE, SW.
#[must_use]
pub fn rotated_corners(geometry: &Geometry) -> [Point; 4] {
    Corner::ALL.map(|corner| corner_point(geometry, corner))
}

/// Express a canvas point relative to the item's center in its unrotated frame.
#[must_use]
pub fn to_local(geometry: &Geometry, point: Point) -> Point {
    let c = center(geometry);
    rotate_vector(Point { x: point.x - c.x, y: point.y - c.y }, -geometry.rotation)
}

/// Whether `point` lies inside the rotated rectangle.
#[must_use]
pub fn contains_point(geometry: &Geometry, point: Point) -> bool {
    let local = to_local(geometry, point);
    local.x.abs() <= geometry.size.width / 2.0 && local.y.abs() <= geometry.size.height / 2.0
}

/// Whether `point` lies inside the ellipse inscribed in the rotated rectangle.
#[must_use]
pub fn contains_point_ellipse(geometry: &Geometry, point: Point) -> bool {
    let local = to_local(geometry, point);
    let rx = geometry.size.width / 2.0;
    let ry = geometry.size.height / 2.0;
    let nx = local.x / rx;
    let ny = local.y / ry;
    nx * nx + ny * ny <= 1.0
}

/// Resize `start` by dragging `corner` by a canvas-space delta.
///
/// The delta is mapped into the item's local frame, the dragged corner's two
/// edges follow it, each dimension is floored at `MIN_SIZE`, and the
/// position is recomputed so the diagonally opposite corner keeps its
/// canvas coordinates. Rotation is unchanged. Non-finite deltas count as 0.
#[must_use]
pub fn resize_from_corner(start: &Geometry, corner: Corner, dx: f64, dy: f64) -> Geometry {
    let delta = Point { x: finite_or_zero(dx), y: finite_or_zero(dy) };
    let local = rotate_vector(delta, -start.rotation);
    let (sx, sy) = corner.signs();
    let size = clamp_size(Size {
        width: start.size.width + sx * local.x,
        height: start.size.height + sy * local.y,
    });

    // Unrotated: move each edge directly so the anchored edges are untouched.
    if start.rotation.abs() < f64::EPSILON {
        let x = if sx > 0.0 { start.position.x } else { start.position.x + (start.size.width - size.width) };
        let y = if sy > 0.0 { start.position.y } else { start.position.y + (start.size.height - size.height) };
        return Geometry { position: Point { x, y }, size, rotation: start.rotation };
    }

    let anchor = corner_point(start, corner.opposite());
    let to_center = rotate_vector(Point { x: sx * size.width / 2.0, y: sy * size.height / 2.0 }, start.rotation);
    let new_center = Point { x: anchor.x + to_center.x, y: anchor.y + to_center.y };

    Geometry {
        position: Point { x: new_center.x - size.width / 2.0, y: new_center.y - size.height / 2.0 },
        size,
        rotation: start.rotation,
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}
