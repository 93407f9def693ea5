use super::*;

fn model_with_table(capacity: u32) -> (SeatingModel, ItemId) {
    let mut model = SeatingModel::new();
    let table = Uuid::new_v4();
    model.register_table(table, capacity);
    (model, table)
}

// =============================================================
// assign
// =============================================================

#[test]
fn assign_seats_guest() {
    let (mut model, table) = model_with_table(4);
    let g = model.add_guest("Ada");
    assert!(model.assign(&g, &table).unwrap());
    assert_eq!(model.guest(&g).unwrap().table_id, Some(table));
    assert_eq!(model.occupancy(&table), 1);
}

#[test]
fn assign_third_guest_to_two_seat_table_is_rejected() {
    let (mut model, t1) = model_with_table(2);
    let g1 = model.add_guest("G1");
    let g2 = model.add_guest("G2");
    let g3 = model.add_guest("G3");
    model.assign(&g1, &t1).unwrap();
    model.assign(&g2, &t1).unwrap();

    let err = model.assign(&g3, &t1).unwrap_err();
    assert_eq!(err, LayoutError::CapacityExceeded { table: t1, capacity: 2 });
    assert_eq!(model.guest(&g3).unwrap().table_id, None);
    assert_eq!(model.occupancy(&t1), 2);
}

#[test]
fn reassign_to_same_full_table_is_noop() {
    let (mut model, table) = model_with_table(1);
    let g = model.add_guest("Ada");
    model.assign(&g, &table).unwrap();
    assert!(!model.assign(&g, &table).unwrap());
    assert_eq!(model.occupancy(&table), 1);
}

#[test]
fn assign_moves_guest_between_tables() {
    let (mut model, a) = model_with_table(2);
    let b = Uuid::new_v4();
    model.register_table(b, 2);
    let g = model.add_guest("Ada");
    model.assign(&g, &a).unwrap();
    model.assign(&g, &b).unwrap();
    assert_eq!(model.occupancy(&a), 0);
    assert_eq!(model.occupancy(&b), 1);
    assert_eq!(model.guest(&g).unwrap().table_id, Some(b));
}

#[test]
fn failed_move_keeps_previous_seat() {
    let (mut model, a) = model_with_table(2);
    let full = Uuid::new_v4();
    model.register_table(full, 1);
    let g = model.add_guest("Ada");
    let other = model.add_guest("Bo");
    model.assign(&g, &a).unwrap();
    model.assign(&other, &full).unwrap();
    assert!(model.assign(&g, &full).is_err());
    assert_eq!(model.guest(&g).unwrap().table_id, Some(a));
}

#[test]
fn assign_unknown_ids() {
    let (mut model, table) = model_with_table(2);
    let g = model.add_guest("Ada");
    let ghost = Uuid::new_v4();
    assert_eq!(model.assign(&ghost, &table), Err(LayoutError::GuestNotFound(ghost)));
    assert_eq!(model.assign(&g, &ghost), Err(LayoutError::NotFound(ghost)));
}

// =============================================================
// unassign
// =============================================================

#[test]
fn unassign_is_idempotent() {
    let (mut model, table) = model_with_table(2);
    let g = model.add_guest("Ada");
    model.assign(&g, &table).unwrap();
    assert!(model.unassign(&g));
    assert!(!model.unassign(&g));
    assert!(!model.unassign(&Uuid::new_v4()));
    assert_eq!(model.occupancy(&table), 0);
}

#[test]
fn unassign_all_clears_only_that_table() {
    let (mut model, a) = model_with_table(3);
    let b = Uuid::new_v4();
    model.register_table(b, 3);
    let g1 = model.add_guest("G1");
    let g2 = model.add_guest("G2");
    let g3 = model.add_guest("G3");
    model.assign(&g1, &a).unwrap();
    model.assign(&g2, &a).unwrap();
    model.assign(&g3, &b).unwrap();

    let mut cleared = model.unassign_all(&a);
    cleared.sort();
    let mut expected = vec![g1, g2];
    expected.sort();
    assert_eq!(cleared, expected);
    assert_eq!(model.guest(&g3).unwrap().table_id, Some(b));
}

#[test]
fn unregister_table_cascades() {
    let (mut model, table) = model_with_table(3);
    let g = model.add_guest("Ada");
    model.assign(&g, &table).unwrap();
    assert_eq!(model.unregister_table(&table), vec![g]);
    assert!(!model.has_table(&table));
    assert_eq!(model.guest(&g).unwrap().table_id, None);
    assert_eq!(model.occupancy(&table), 0);
}

// =============================================================
// capacity and conflicts
// =============================================================

#[test]
fn lowering_capacity_flags_conflict() {
    let (mut model, table) = model_with_table(3);
    for name in ["A", "B", "C"] {
        let g = model.add_guest(name);
        model.assign(&g, &table).unwrap();
    }
    assert!(!model.is_over_capacity(&table));
    model.set_capacity(&table, 2).unwrap();
    assert!(model.is_over_capacity(&table));
    assert_eq!(model.conflicts(), vec![table]);
    assert_eq!(model.seats_remaining(&table), Some(0));
}

#[test]
fn set_capacity_validates() {
    let (mut model, table) = model_with_table(3);
    assert_eq!(model.set_capacity(&table, 0), Err(LayoutError::InvalidCapacity(0)));
    let ghost = Uuid::new_v4();
    assert_eq!(model.set_capacity(&ghost, 4), Err(LayoutError::NotFound(ghost)));
}

#[test]
fn seats_remaining_counts_down() {
    let (mut model, table) = model_with_table(2);
    assert_eq!(model.seats_remaining(&table), Some(2));
    let g = model.add_guest("Ada");
    model.assign(&g, &table).unwrap();
    assert_eq!(model.seats_remaining(&table), Some(1));
    assert_eq!(model.seats_remaining(&Uuid::new_v4()), None);
}

#[test]
fn unknown_table_has_zero_occupancy_and_no_conflict() {
    let model = SeatingModel::new();
    let ghost = Uuid::new_v4();
    assert_eq!(model.occupancy(&ghost), 0);
    assert!(!model.is_over_capacity(&ghost));
}

// =============================================================
// listings
// =============================================================

#[test]
fn listings_are_sorted_by_name() {
    let (mut model, table) = model_with_table(4);
    let zoe = model.add_guest("Zoe");
    let amy = model.add_guest("Amy");
    model.add_guest("Max");
    model.assign(&zoe, &table).unwrap();
    model.assign(&amy, &table).unwrap();

    let at: Vec<&str> = model.guests_at(&table).iter().map(|g| g.name.as_str()).collect();
    assert_eq!(at, vec!["Amy", "Zoe"]);
    let free: Vec<&str> = model.unassigned().iter().map(|g| g.name.as_str()).collect();
    assert_eq!(free, vec!["Max"]);
    assert_eq!(model.guests().len(), 3);
    assert_eq!(model.guest_count(), 3);
}

#[test]
fn remove_guest_frees_seat() {
    let (mut model, table) = model_with_table(1);
    let g = model.add_guest("Ada");
    model.assign(&g, &table).unwrap();
    assert!(model.remove_guest(&g).is_some());
    assert_eq!(model.seats_remaining(&table), Some(1));
}

#[test]
fn guest_serde_defaults_table_id() {
    let id = Uuid::new_v4();
    let guest: Guest = serde_json::from_value(serde_json::json!({ "id": id, "name": "Ada" })).unwrap();
    assert_eq!(guest.table_id, None);
}
