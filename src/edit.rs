// Copyright (c) 2026 Pegasus Heavy Industries LLC
// Licensed under the MIT License

//! Interactive edit operations on a curve.
//!
//! Drag, insert and delete proposals arrive continuously while the user is
//! editing, so nothing here returns an error: out-of-range positions are
//! clamped and inadmissible operations are rejected as no-ops. After every
//! accepted operation the model invariants hold again.
//!
//! Spacing rule: one domain unit is reserved per intervening point, so an
//! interior point at `index` can only move within
//! `[x_min + index, x_max - (len - 1 - index)]`. Neighbours that end up
//! closer than one unit are pushed outward (the cascade), which keeps x
//! strictly increasing without ever collapsing two points onto the same x.

use crate::model::{CurveModel, CurvePoint};

/// Move the point at `index` towards the proposed position.
///
/// Endpoints never change x; only their y is applied. Returns the applied
/// `(x, y)` after clamping and the cascade. Out-of-range `index` is a no-op
/// returning the proposal unchanged.
pub fn move_point(
    curve: &mut CurveModel,
    index: usize,
    proposed_x: f64,
    proposed_y: f64,
) -> (f64, f64) {
    let len = curve.points.len();
    if index >= len {
        return (proposed_x, proposed_y);
    }

    let applied_y = proposed_y.clamp(curve.domain.y_min, curve.domain.y_max);
    let applied_x = if index == 0 || index == len - 1 {
        curve.points[index].x
    } else {
        let min_active = curve.domain.x_min + index as f64;
        let max_active = curve.domain.x_max - (len - 1 - index) as f64;
        proposed_x.clamp(min_active, max_active)
    };

    curve.points[index] = CurvePoint::new(applied_x, applied_y);
    cascade_x(curve, index);
    if curve.enforce_monotonic_y {
        cascade_y(curve, index);
    }

    curve.mark_dirty();
    (applied_x, applied_y)
}

/// Insert a new point near the requested position.
///
/// Returns the index it landed at, or `None` when the curve is already at
/// its maximum point count. The point is placed immediately before the first
/// existing point whose x exceeds the request, then legalized through the
/// same clamp-and-cascade as a move.
pub fn insert_point(curve: &mut CurveModel, x: f64, y: f64) -> Option<usize> {
    if curve.points.len() >= curve.domain.max_points {
        return None;
    }

    let x = x.clamp(curve.domain.x_min, curve.domain.x_max);
    let pos = curve
        .points
        .iter()
        .position(|p| p.x > x)
        .unwrap_or(1);

    curve.points.insert(pos, CurvePoint::new(x, y));
    move_point(curve, pos, x, y);
    Some(pos)
}

/// Delete the point at `index`.
///
/// Returns false (leaving the curve untouched) when the curve is at its
/// minimum point count or `index` is an endpoint. Removal only enlarges a
/// gap, so no cascade is needed afterwards.
pub fn delete_point(curve: &mut CurveModel, index: usize) -> bool {
    let len = curve.points.len();
    if len <= curve.domain.min_points || index == 0 || index >= len - 1 {
        return false;
    }

    curve.points.remove(index);
    curve.mark_dirty();
    true
}

/// Push every point above `index` up to its spacing floor and every point
/// below down to its spacing ceiling. O(n), restores strictly increasing x.
fn cascade_x(curve: &mut CurveModel, index: usize) {
    let anchor = curve.points[index].x;
    let len = curve.points.len();

    for j in index + 1..len {
        let floor = anchor + (j - index) as f64;
        if curve.points[j].x < floor {
            curve.points[j].x = floor;
        }
    }
    for j in (0..index).rev() {
        let ceiling = anchor - (index - j) as f64;
        if curve.points[j].x > ceiling {
            curve.points[j].x = ceiling;
        }
    }
}

/// Same push pattern on the y axis: output must not dip below the moved
/// point on the right, nor rise above it on the left.
fn cascade_y(curve: &mut CurveModel, index: usize) {
    let anchor = curve.points[index].y;
    let len = curve.points.len();

    for j in index + 1..len {
        if curve.points[j].y < anchor {
            curve.points[j].y = anchor;
        }
    }
    for j in 0..index {
        if curve.points[j].y > anchor {
            curve.points[j].y = anchor;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CurveDomain;

    fn five_point_curve() -> CurveModel {
        CurveModel::new(
            CurveDomain::new(0.0, 100.0, 0.0, 100.0, 2, 12),
            vec![
                CurvePoint::new(0.0, 0.0),
                CurvePoint::new(25.0, 25.0),
                CurvePoint::new(50.0, 50.0),
                CurvePoint::new(75.0, 75.0),
                CurvePoint::new(100.0, 100.0),
            ],
        )
        .unwrap()
    }

    fn assert_strictly_increasing(curve: &CurveModel) {
        for w in curve.points.windows(2) {
            assert!(
                w[0].x < w[1].x,
                "x not strictly increasing: {} >= {}",
                w[0].x,
                w[1].x
            );
        }
    }

    #[test]
    fn test_move_interior_point() {
        let mut curve = five_point_curve();
        let (x, y) = move_point(&mut curve, 2, 60.0, 40.0);
        assert_eq!((x, y), (60.0, 40.0));
        assert_eq!(curve.points[2], CurvePoint::new(60.0, 40.0));
        assert_strictly_increasing(&curve);
    }

    #[test]
    fn test_move_cascades_lower_neighbours() {
        let mut curve = five_point_curve();
        let (x, _) = move_point(&mut curve, 2, 20.0, 50.0);
        assert_eq!(x, 20.0);
        // index 1 pushed down to the one-unit ceiling below the moved point
        assert_eq!(curve.points[1].x, 19.0);
        assert_eq!(curve.points[0].x, 0.0);
        assert_strictly_increasing(&curve);
    }

    #[test]
    fn test_move_cascades_upper_neighbours() {
        let mut curve = five_point_curve();
        move_point(&mut curve, 1, 80.0, 25.0);
        assert_eq!(curve.points[1].x, 80.0);
        assert_eq!(curve.points[2].x, 81.0);
        assert_eq!(curve.points[3].x, 82.0);
        // last point pinned at x_max, never pushed past it
        assert_eq!(curve.points[4].x, 100.0);
        assert_strictly_increasing(&curve);
    }

    #[test]
    fn test_move_reserves_one_unit_per_intervening_point() {
        let mut curve = five_point_curve();
        // index 1 of 5 points: x must stay within [1, 97]
        let (x, _) = move_point(&mut curve, 1, -50.0, 25.0);
        assert_eq!(x, 1.0);
        let (x, _) = move_point(&mut curve, 1, 150.0, 25.0);
        assert_eq!(x, 97.0);
        assert_strictly_increasing(&curve);
    }

    #[test]
    fn test_move_endpoint_keeps_x() {
        let mut curve = five_point_curve();
        let (x, y) = move_point(&mut curve, 0, 40.0, 10.0);
        assert_eq!((x, y), (0.0, 10.0));
        let last = curve.points.len() - 1;
        let (x, y) = move_point(&mut curve, last, 40.0, 90.0);
        assert_eq!((x, y), (100.0, 90.0));
    }

    #[test]
    fn test_move_clamps_y() {
        let mut curve = five_point_curve();
        let (_, y) = move_point(&mut curve, 2, 50.0, 140.0);
        assert_eq!(y, 100.0);
        let (_, y) = move_point(&mut curve, 2, 50.0, -5.0);
        assert_eq!(y, 0.0);
    }

    #[test]
    fn test_move_all_index_proposal_combinations_keep_ordering() {
        for index in 0..5 {
            for proposed in [-20.0, 0.0, 13.0, 26.0, 49.0, 74.0, 99.0, 130.0] {
                let mut curve = five_point_curve();
                move_point(&mut curve, index, proposed, 50.0);
                assert_strictly_increasing(&curve);
            }
        }
    }

    #[test]
    fn test_monotonic_y_cascade() {
        let mut curve = five_point_curve().with_monotonic_y(true);
        move_point(&mut curve, 2, 50.0, 90.0);
        // points to the right pushed up to the moved y
        assert_eq!(curve.points[3].y, 90.0);
        assert_eq!(curve.points[4].y, 100.0);
        // points to the left untouched (already below)
        assert_eq!(curve.points[1].y, 25.0);
    }

    #[test]
    fn test_free_y_without_policy_flag() {
        let mut curve = five_point_curve();
        move_point(&mut curve, 2, 50.0, 90.0);
        assert_eq!(curve.points[3].y, 75.0);
    }

    #[test]
    fn test_insert_between_points() {
        let mut curve = five_point_curve();
        let idx = insert_point(&mut curve, 60.0, 55.0);
        assert_eq!(idx, Some(3));
        assert_eq!(curve.points[3], CurvePoint::new(60.0, 55.0));
        assert_eq!(curve.points.len(), 6);
        assert_strictly_increasing(&curve);
    }

    #[test]
    fn test_insert_rejected_at_max_points() {
        let domain = CurveDomain::new(0.0, 100.0, 0.0, 100.0, 2, 5);
        let mut curve = CurveModel::new(domain, five_point_curve().points).unwrap();
        assert_eq!(insert_point(&mut curve, 60.0, 55.0), None);
        assert_eq!(curve.points.len(), 5);
    }

    #[test]
    fn test_insert_then_delete_round_trip() {
        let mut curve = five_point_curve();
        let before = curve.points.clone();
        let idx = insert_point(&mut curve, 60.0, 55.0).unwrap();
        assert!(delete_point(&mut curve, idx));
        assert_eq!(curve.points, before);
    }

    #[test]
    fn test_insert_near_existing_point_is_legalized() {
        let mut curve = five_point_curve();
        let idx = insert_point(&mut curve, 25.2, 30.0).unwrap();
        assert_eq!(idx, 2);
        assert_strictly_increasing(&curve);
    }

    #[test]
    fn test_delete_rejected_at_min_points() {
        let domain = CurveDomain::new(0.0, 100.0, 0.0, 100.0, 2, 12);
        let mut curve = CurveModel::new(
            domain,
            vec![CurvePoint::new(0.0, 0.0), CurvePoint::new(100.0, 100.0)],
        )
        .unwrap();
        assert!(!delete_point(&mut curve, 1));
        assert_eq!(curve.points.len(), 2);
    }

    #[test]
    fn test_delete_rejected_for_endpoints() {
        let mut curve = five_point_curve();
        assert!(!delete_point(&mut curve, 0));
        assert!(!delete_point(&mut curve, 4));
        assert_eq!(curve.points.len(), 5);
    }

    #[test]
    fn test_delete_interior_point() {
        let mut curve = five_point_curve();
        assert!(delete_point(&mut curve, 2));
        assert_eq!(curve.points.len(), 4);
        assert_strictly_increasing(&curve);
    }

    #[test]
    fn test_accepted_operations_mark_dirty() {
        let mut curve = five_point_curve();
        assert!(!curve.is_dirty());
        move_point(&mut curve, 2, 55.0, 50.0);
        assert!(curve.take_dirty());
        assert!(!curve.is_dirty());

        insert_point(&mut curve, 60.0, 55.0);
        assert!(curve.take_dirty());

        delete_point(&mut curve, 2);
        assert!(curve.take_dirty());
    }

    #[test]
    fn test_rejected_operations_do_not_mark_dirty() {
        let domain = CurveDomain::new(0.0, 100.0, 0.0, 100.0, 2, 12);
        let mut curve = CurveModel::new(
            domain,
            vec![CurvePoint::new(0.0, 0.0), CurvePoint::new(100.0, 100.0)],
        )
        .unwrap();
        delete_point(&mut curve, 0);
        delete_point(&mut curve, 1);
        assert!(!curve.is_dirty());
    }
}
