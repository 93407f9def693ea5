use super::*;
use crate::geometry::Size;
use crate::items::ItemDraft;

fn tile(store: &mut ItemStore, x: f64, y: f64, w: f64, h: f64) -> ItemId {
    store.add(ItemDraft::new(ItemKind::Image { src: "dress.jpg".into() }, Point::new(x, y), Size::new(w, h)))
}

#[test]
fn empty_store_hits_nothing() {
    let store = ItemStore::new();
    assert!(hit_test(Point::new(0.0, 0.0), &store, None).is_none());
}

#[test]
fn miss_outside_all_items() {
    let mut store = ItemStore::new();
    tile(&mut store, 0.0, 0.0, 100.0, 100.0);
    assert!(hit_test(Point::new(500.0, 500.0), &store, None).is_none());
}

#[test]
fn topmost_body_wins() {
    let mut store = ItemStore::new();
    let _below = tile(&mut store, 0.0, 0.0, 100.0, 100.0);
    let above = tile(&mut store, 50.0, 50.0, 100.0, 100.0);
    let hit = hit_test(Point::new(75.0, 75.0), &store, None).unwrap();
    assert_eq!(hit, Hit { item_id: above, part: HitPart::Body });
}

#[test]
fn raised_item_wins_after_bring_to_front() {
    let mut store = ItemStore::new();
    let below = tile(&mut store, 0.0, 0.0, 100.0, 100.0);
    tile(&mut store, 50.0, 50.0, 100.0, 100.0);
    store.bring_to_front(&below).unwrap();
    let hit = hit_test(Point::new(75.0, 75.0), &store, None).unwrap();
    assert_eq!(hit.item_id, below);
}

#[test]
fn selected_corner_is_resize_handle() {
    let mut store = ItemStore::new();
    let id = tile(&mut store, 0.0, 0.0, 100.0, 100.0);
    let hit = hit_test(Point::new(102.0, 99.0), &store, Some(id)).unwrap();
    assert_eq!(hit.part, HitPart::Resize(Corner::Se));
    assert_eq!(hit.target(), PointerTarget::Resize(id, Corner::Se));
}

#[test]
fn unselected_corner_is_just_body() {
    let mut store = ItemStore::new();
    let id = tile(&mut store, 0.0, 0.0, 100.0, 100.0);
    let hit = hit_test(Point::new(99.0, 99.0), &store, None).unwrap();
    assert_eq!(hit.target(), PointerTarget::Body(id));
}

#[test]
fn rotate_handle_sits_above_top_edge() {
    let mut store = ItemStore::new();
    let id = tile(&mut store, 0.0, 0.0, 100.0, 100.0);
    let handle = rotate_handle_point(&store.get(&id).unwrap().geometry());
    assert!((handle.x - 50.0).abs() < 1e-9);
    assert!((handle.y + ROTATE_HANDLE_OFFSET).abs() < 1e-9);
    let hit = hit_test(handle, &store, Some(id)).unwrap();
    assert_eq!(hit.target(), PointerTarget::Rotate(id));
}

#[test]
fn round_table_misses_in_bounding_box_corner() {
    let mut store = ItemStore::new();
    let id = store.add(ItemDraft::table("T1", 8, TableShape::Round, Point::new(0.0, 0.0), Size::new(100.0, 100.0)));
    assert!(hit_test(Point::new(3.0, 3.0), &store, None).is_none());
    assert_eq!(hit_test(Point::new(50.0, 50.0), &store, None).map(|h| h.item_id), Some(id));
}

#[test]
fn square_table_hits_in_corner() {
    let mut store = ItemStore::new();
    let id = store.add(ItemDraft::table("T2", 4, TableShape::Square, Point::new(0.0, 0.0), Size::new(100.0, 100.0)));
    assert_eq!(hit_test(Point::new(3.0, 3.0), &store, None).map(|h| h.item_id), Some(id));
}
