#![allow(clippy::float_cmp)]

use super::*;

const EPSILON: f64 = 1e-9;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

fn point_approx_eq(a: Point, b: Point) -> bool {
    approx_eq(a.x, b.x) && approx_eq(a.y, b.y)
}

fn geom(x: f64, y: f64, w: f64, h: f64, rotation: f64) -> Geometry {
    Geometry { position: Point::new(x, y), size: Size::new(w, h), rotation }
}

// =============================================================
// normalize_degrees
// =============================================================

#[test]
fn normalize_keeps_in_range_values() {
    assert_eq!(normalize_degrees(0.0), 0.0);
    assert_eq!(normalize_degrees(359.0), 359.0);
}

#[test]
fn normalize_wraps_full_turns() {
    assert_eq!(normalize_degrees(360.0), 0.0);
    assert_eq!(normalize_degrees(375.0), 15.0);
    assert_eq!(normalize_degrees(-15.0), 345.0);
    assert_eq!(normalize_degrees(-720.0), 0.0);
}

#[test]
fn normalize_tiny_negative_never_returns_360() {
    let r = normalize_degrees(-1e-20);
    assert!((0.0..360.0).contains(&r));
}

#[test]
fn normalize_non_finite_is_zero() {
    assert_eq!(normalize_degrees(f64::NAN), 0.0);
    assert_eq!(normalize_degrees(f64::INFINITY), 0.0);
}

// =============================================================
// clamp_size
// =============================================================

#[test]
fn clamp_size_passes_large_sizes_through() {
    assert_eq!(clamp_size(Size::new(100.0, 80.0)), Size::new(100.0, 80.0));
}

#[test]
fn clamp_size_floors_each_dimension() {
    assert_eq!(clamp_size(Size::new(5.0, 80.0)), Size::new(MIN_SIZE, 80.0));
    assert_eq!(clamp_size(Size::new(100.0, -40.0)), Size::new(100.0, MIN_SIZE));
}

#[test]
fn clamp_size_replaces_nan() {
    let s = clamp_size(Size::new(f64::NAN, f64::NEG_INFINITY));
    assert_eq!(s, Size::new(MIN_SIZE, MIN_SIZE));
}

// =============================================================
// delta_applied
// =============================================================

#[test]
fn delta_applied_translates() {
    let p = delta_applied(Point::new(10.0, 10.0), 20.0, -5.0);
    assert_eq!(p, Point::new(30.0, 5.0));
}

#[test]
fn delta_applied_round_trip_is_exact() {
    let start = Point::new(12.5, -3.25);
    let moved = delta_applied(start, 0.1, 0.7);
    assert_eq!(delta_applied(moved, -0.1, -0.7), start);
}

#[test]
fn delta_applied_ignores_non_finite_delta() {
    let p = delta_applied(Point::new(1.0, 2.0), f64::NAN, f64::INFINITY);
    assert_eq!(p, Point::new(1.0, 2.0));
}

#[test]
fn quantize_is_symmetric() {
    for d in [0.3, 1.0 / 128.0, 7.77, 1e6 + 0.5] {
        assert_eq!(quantize(-d), -quantize(d));
    }
}

// =============================================================
// corners
// =============================================================

#[test]
fn unrotated_corners_match_bounding_box() {
    let g = geom(10.0, 20.0, 100.0, 80.0, 0.0);
    let [nw, ne, se, sw] = rotated_corners(&g);
    assert_eq!(nw, Point::new(10.0, 20.0));
    assert_eq!(ne, Point::new(110.0, 20.0));
    assert_eq!(se, Point::new(110.0, 100.0));
    assert_eq!(sw, Point::new(10.0, 100.0));
}

#[test]
fn quarter_turn_moves_nw_to_ne_slot() {
    // 100x100 square centered at (50, 50), rotated 90 degrees clockwise.
    let g = geom(0.0, 0.0, 100.0, 100.0, 90.0);
    let [nw, ne, se, sw] = rotated_corners(&g);
    assert!(point_approx_eq(nw, Point::new(100.0, 0.0)));
    assert!(point_approx_eq(ne, Point::new(100.0, 100.0)));
    assert!(point_approx_eq(se, Point::new(0.0, 100.0)));
    assert!(point_approx_eq(sw, Point::new(0.0, 0.0)));
}

#[test]
fn rotation_preserves_center() {
    let g = geom(10.0, 20.0, 60.0, 40.0, 37.0);
    let corners = rotated_corners(&g);
    let cx = corners.iter().map(|p| p.x).sum::<f64>() / 4.0;
    let cy = corners.iter().map(|p| p.y).sum::<f64>() / 4.0;
    assert!(point_approx_eq(Point::new(cx, cy), center(&g)));
}

#[test]
fn opposite_is_an_involution() {
    for c in Corner::ALL {
        assert_ne!(c, c.opposite());
        assert_eq!(c, c.opposite().opposite());
    }
}

// =============================================================
// containment
// =============================================================

#[test]
fn contains_point_inside_and_outside() {
    let g = geom(0.0, 0.0, 100.0, 50.0, 0.0);
    assert!(contains_point(&g, Point::new(50.0, 25.0)));
    assert!(contains_point(&g, Point::new(0.0, 0.0)));
    assert!(!contains_point(&g, Point::new(101.0, 25.0)));
}

#[test]
fn contains_point_respects_rotation() {
    // 100x20 bar rotated 90 degrees becomes a vertical 20x100 bar around (50, 10).
    let g = geom(0.0, 0.0, 100.0, 20.0, 90.0);
    assert!(contains_point(&g, Point::new(50.0, 50.0)));
    assert!(!contains_point(&g, Point::new(90.0, 10.0)));
}

#[test]
fn ellipse_excludes_bounding_box_corners() {
    let g = geom(0.0, 0.0, 100.0, 100.0, 0.0);
    assert!(contains_point_ellipse(&g, Point::new(50.0, 50.0)));
    assert!(!contains_point_ellipse(&g, Point::new(2.0, 2.0)));
}

// =============================================================
// resize_from_corner
// =============================================================

#[test]
fn resize_se_grows_without_moving() {
    let g = geom(30.0, 5.0, 100.0, 80.0, 0.0);
    let r = resize_from_corner(&g, Corner::Se, 10.0, 10.0);
    assert_eq!(r.size, Size::new(110.0, 90.0));
    assert_eq!(r.position, Point::new(30.0, 5.0));
}

#[test]
fn resize_nw_keeps_se_fixed() {
    let g = geom(10.0, 10.0, 100.0, 80.0, 0.0);
    let r = resize_from_corner(&g, Corner::Nw, 10.0, 10.0);
    assert_eq!(r.size, Size::new(90.0, 70.0));
    assert_eq!(r.position, Point::new(20.0, 20.0));
    assert_eq!(corner_point(&r, Corner::Se), corner_point(&g, Corner::Se));
}

#[test]
fn resize_ne_shifts_only_y() {
    let g = geom(0.0, 0.0, 100.0, 100.0, 0.0);
    let r = resize_from_corner(&g, Corner::Ne, 20.0, -30.0);
    assert_eq!(r.size, Size::new(120.0, 130.0));
    assert_eq!(r.position, Point::new(0.0, -30.0));
}

#[test]
fn resize_sw_shifts_only_x() {
    let g = geom(0.0, 0.0, 100.0, 100.0, 0.0);
    let r = resize_from_corner(&g, Corner::Sw, -20.0, 30.0);
    assert_eq!(r.size, Size::new(120.0, 130.0));
    assert_eq!(r.position, Point::new(-20.0, 0.0));
}

#[test]
fn resize_floors_at_min_size_and_keeps_anchor() {
    let g = geom(0.0, 0.0, 100.0, 100.0, 0.0);
    let r = resize_from_corner(&g, Corner::Nw, 500.0, 500.0);
    assert_eq!(r.size, Size::new(MIN_SIZE, MIN_SIZE));
    assert_eq!(corner_point(&r, Corner::Se), Point::new(100.0, 100.0));
}

#[test]
fn resize_rotated_item_keeps_opposite_corner() {
    let g = geom(40.0, 40.0, 120.0, 60.0, 30.0);
    for corner in Corner::ALL {
        let anchor = corner_point(&g, corner.opposite());
        let r = resize_from_corner(&g, corner, 17.0, -9.0);
        assert!(point_approx_eq(corner_point(&r, corner.opposite()), anchor), "{corner:?}");
        assert_eq!(r.rotation, 30.0);
    }
}

#[test]
fn unrotated_resize_keeps_off_grid_anchor_exactly() {
    for i in 0..50_u32 {
        let k = f64::from(i);
        let g = geom(0.1 + 0.37 * k, 0.3 + 1.13 * k, 100.3 + 0.7 * k, 80.7, 0.0);

        let se = resize_from_corner(&g, Corner::Se, 10.0, 10.0);
        assert_eq!(se.position, g.position, "case {i}");

        let nw = resize_from_corner(&g, Corner::Nw, -7.5, 3.25);
        assert_eq!(nw.position.x, g.position.x + (g.size.width - nw.size.width), "case {i}");
        assert_eq!(nw.position.y, g.position.y + (g.size.height - nw.size.height), "case {i}");

        let ne = resize_from_corner(&g, Corner::Ne, 4.0, -6.0);
        assert_eq!(ne.position.x, g.position.x, "case {i}");

        let sw = resize_from_corner(&g, Corner::Sw, -4.0, 6.0);
        assert_eq!(sw.position.y, g.position.y, "case {i}");
    }
}

#[test]
fn resize_uses_raw_pointer_delta() {
    let g = geom(0.0, 0.0, 100.0, 80.0, 0.0);
    let r = resize_from_corner(&g, Corner::Se, 0.3, 0.3);
    assert_eq!(r.size, Size::new(100.0 + 0.3, 80.0 + 0.3));
}

#[test]
fn resize_ignores_non_finite_delta() {
    let g = geom(5.0, 5.0, 100.0, 80.0, 0.0);
    let r = resize_from_corner(&g, Corner::Se, f64::NAN, f64::INFINITY);
    assert_eq!(r, g);
}
