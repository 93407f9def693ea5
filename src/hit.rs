#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::consts::{HANDLE_RADIUS, ROTATE_HANDLE_OFFSET};
use crate::geometry::{Corner, Geometry, Point, center, contains_point, contains_point_ellipse, corner_point, rotate_vector};
use crate::input::PointerTarget;
use crate::items::{CanvasItem, ItemId, ItemKind, ItemStore, TableShape};

/// Which part of an item was hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitPart {
    Body,
    Resize(Corner),
    Rotate,
}

/// Result of a hit test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub item_id: ItemId,
    pub part: HitPart,
}

impl Hit {
    /// The pointer target this hit stands for.
    #[must_use]
    pub fn target(self) -> PointerTarget {
        match self.part {
            HitPart::Body => PointerTarget::Body(self.item_id),
            HitPart::Resize(corner) => PointerTarget::Resize(self.item_id, corner),
            HitPart::Rotate => PointerTarget::Rotate(self.item_id),
        }
    }
}

/// Canvas position of the rotate handle, above the top edge midpoint.
#[must_use]
pub fn rotate_handle_point(geometry: &Geometry) -> Point {
    let c = center(geometry);
    let offset = rotate_vector(
        Point { x: 0.0, y: -(geometry.size.height / 2.0 + ROTATE_HANDLE_OFFSET) },
        geometry.rotation,
    );
    Point { x: c.x + offset.x, y: c.y + offset.y }
}

/// Find what is under `point`. Handles of the selected item win over any
/// body; bodies are tested from the top of the stack down.
#[must_use]
pub fn hit_test(point: Point, store: &ItemStore, selected: Option<ItemId>) -> Option<Hit> {
    if let Some(item) = selected.and_then(|id| store.get(&id)) {
        if let Some(part) = handle_at(item, point) {
            return Some(Hit { item_id: item.id, part });
        }
    }

    store
        .list()
        .into_iter()
        .rev()
        .find(|item| body_contains(item, point))
        .map(|item| Hit { item_id: item.id, part: HitPart::Body })
}

fn handle_at(item: &CanvasItem, point: Point) -> Option<HitPart> {
    let geometry = item.geometry();
    for corner in Corner::ALL {
        if within_handle(corner_point(&geometry, corner), point) {
            return Some(HitPart::Resize(corner));
        }
    }
    within_handle(rotate_handle_point(&geometry), point).then_some(HitPart::Rotate)
}

fn within_handle(handle: Point, point: Point) -> bool {
    (handle.x - point.x).hypot(handle.y - point.y) <= HANDLE_RADIUS
}

fn body_contains(item: &CanvasItem, point: Point) -> bool {
    let geometry = item.geometry();
    match &item.kind {
        ItemKind::Table(spec) if spec.shape == TableShape::Round => contains_point_ellipse(&geometry, point),
        _ => contains_point(&geometry, point),
    }
}
