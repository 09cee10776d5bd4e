use super::grid::{Grid, Position};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;

/// Walk the street graph from the start point with a randomized depth-first
/// search and return the cell reached after at most `distance` steps.
///
/// The walk stops early at a dead end, so `distance` is an upper bound. The
/// result is always a street or the start point itself.
pub fn sample_reachable<R: Rng + ?Sized>(grid: &Grid, distance: usize, rng: &mut R) -> Position {
    let start = grid.start_point();
    let mut stack = vec![start];
    let mut visited = HashSet::from([start]);
    let mut last = start;
    let mut steps = 0;

    while let Some(current) = stack.pop() {
        last = current;
        if steps >= distance {
            return current;
        }

        let mut neighbours = grid.street_neighbours(current);
        neighbours.shuffle(rng);
        for next in neighbours {
            if visited.insert(next) {
                stack.push(next);
            }
        }

        if stack.is_empty() {
            return current;
        }
        steps += 1;
    }

    last
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::city::grid::CellKind;
    use proptest::prelude::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    const RING: [&str; 7] = [
        ".........",
        ".WWWWWWW.",
        ".W.....W.",
        ".W.....W.",
        ".W.....W.",
        ".WWWWWWS.",
        ".........",
    ];

    fn reachable_from_start(grid: &Grid) -> HashSet<Position> {
        let mut seen = HashSet::from([grid.start_point()]);
        let mut stack = vec![grid.start_point()];
        while let Some(p) = stack.pop() {
            for n in grid.street_neighbours(p) {
                if seen.insert(n) {
                    stack.push(n);
                }
            }
        }
        seen
    }

    #[test]
    fn zero_distance_returns_start() {
        let grid = Grid::from_rows(&RING).unwrap();
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..20 {
            assert_eq!(sample_reachable(&grid, 0, &mut rng), grid.start_point());
        }
    }

    #[test]
    fn one_step_lands_next_to_start() {
        let grid = Grid::from_rows(&RING).unwrap();
        let start = grid.start_point();
        assert_eq!(start, Position::new(6, 8));
        let neighbours = grid.street_neighbours(start);
        let mut rng = SmallRng::seed_from_u64(42);
        for _ in 0..50 {
            let p = sample_reachable(&grid, 1, &mut rng);
            assert!(neighbours.contains(&p), "{p:?} is not next to the start");
            assert_eq!(grid.cell_at(p.x, p.y), CellKind::Street);
        }
    }

    #[test]
    fn isolated_start_returns_start() {
        let grid = Grid::from_rows(&["...", ".S.", "..."]).unwrap();
        let mut rng = SmallRng::seed_from_u64(1);
        assert_eq!(sample_reachable(&grid, 10, &mut rng), grid.start_point());
    }

    #[test]
    fn dead_end_stops_early() {
        // Start with a single street to its right; the corridor ends after two cells.
        let grid = Grid::from_rows(&["SWW"]).unwrap();
        let mut rng = SmallRng::seed_from_u64(3);
        assert_eq!(sample_reachable(&grid, 100, &mut rng), Position::new(1, 3));
    }

    #[test]
    fn corridor_walks_exact_steps() {
        let grid = Grid::from_rows(&["SWWWW"]).unwrap();
        let mut rng = SmallRng::seed_from_u64(9);
        assert_eq!(sample_reachable(&grid, 2, &mut rng), Position::new(1, 3));
    }

    #[test]
    fn same_seed_same_cell() {
        let grid = Grid::from_rows(&RING).unwrap();
        let a = sample_reachable(&grid, 9, &mut SmallRng::seed_from_u64(5));
        let b = sample_reachable(&grid, 9, &mut SmallRng::seed_from_u64(5));
        assert_eq!(a, b);
    }

    proptest! {
        #[test]
        fn result_is_reachable_street(seed in any::<u64>(), distance in 0usize..40) {
            let grid = Grid::from_rows(&[
                "W..WWW",
                "WWWW.W",
                ".W.S.W",
                "WW.WWW",
                "W....W",
            ]).unwrap();
            let reachable = reachable_from_start(&grid);
            let mut rng = SmallRng::seed_from_u64(seed);
            let p = sample_reachable(&grid, distance, &mut rng);
            prop_assert!(grid.cell_at(p.x, p.y).is_street_like());
            prop_assert!(reachable.contains(&p));
        }
    }
}
