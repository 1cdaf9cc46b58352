use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::lte::Rectangle;
use crate::scenario::GridLayout;
use crate::scenario::layout::{ENB_HEIGHT_M, UE_HEIGHT_M, random_endpoint_positions};

#[test]
fn single_cell_sits_in_the_center() {
    let grid = GridLayout::new(1, 1000.0);
    assert_eq!((grid.rows, grid.cols), (1, 1));
    let p = grid.position(0);
    assert!(p.x.abs() < 1e-9 && p.y.abs() < 1e-9);
    assert_eq!(p.z, ENB_HEIGHT_M);
}

#[test]
fn grid_shapes() {
    for (n, rows, cols) in [(1, 1, 1), (2, 1, 2), (4, 2, 2), (7, 2, 4), (9, 3, 3), (10, 3, 4)] {
        let g = GridLayout::new(n, 2000.0);
        assert_eq!((g.rows, g.cols), (rows, cols), "n = {n}");
        assert!(g.slots() >= u32::from(n));
    }
}

#[test]
fn four_cells_split_the_square_evenly() {
    let g = GridLayout::new(4, 2000.0);
    let third = 2000.0 / 3.0;
    let expected = [
        (-1000.0 + third, -1000.0 + third),
        (-1000.0 + 2.0 * third, -1000.0 + third),
        (-1000.0 + third, -1000.0 + 2.0 * third),
        (-1000.0 + 2.0 * third, -1000.0 + 2.0 * third),
    ];
    for (p, (x, y)) in g.positions(4).iter().zip(expected) {
        assert!((p.x - x).abs() < 1e-9 && (p.y - y).abs() < 1e-9, "{p:?}");
    }
}

#[test]
fn seven_cells_are_distinct_and_strictly_inside() {
    let g = GridLayout::new(7, 2000.0);
    let ps = g.positions(7);
    assert_eq!(ps.len(), 7);
    for (i, p) in ps.iter().enumerate() {
        assert!(p.x > -1000.0 && p.x < 1000.0);
        assert!(p.y > -1000.0 && p.y < 1000.0);
        for q in &ps[i + 1..] {
            assert!(p.distance(q) > 1.0);
        }
    }
    // 第 8 个槽位空着
    assert_eq!(g.cell(6), (1, 2));
}

#[test]
fn endpoint_positions_are_reproducible_and_in_bounds() {
    let area = Rectangle::centered_square(500.0);
    let a = random_endpoint_positions(200, 500.0, &mut StdRng::seed_from_u64(3));
    let b = random_endpoint_positions(200, 500.0, &mut StdRng::seed_from_u64(3));
    assert_eq!(a, b);
    assert!(a.iter().all(|p| area.contains(p) && p.z == UE_HEIGHT_M));

    let c = random_endpoint_positions(200, 500.0, &mut StdRng::seed_from_u64(4));
    assert_ne!(a, c);
}

#[test]
fn any_cell_count_stays_inside_and_distinct() {
    for area in [500.0, 1000.0, 2000.0, 10_000.0] {
        let half = area / 2.0;
        for n in 1..=200u16 {
            let g = GridLayout::new(n, area);
            assert!(g.slots() >= u32::from(n));
            assert!(g.slots() - u32::from(n) < u32::from(g.cols), "n = {n}");
            let ps = g.positions(n);
            for (i, p) in ps.iter().enumerate() {
                assert!(p.x.abs() < half && p.y.abs() < half, "n = {n}, {p:?}");
                for q in &ps[i + 1..] {
                    assert!(p.distance(q) > 0.0, "n = {n}, {p:?} repeated");
                }
            }
        }
    }
}
