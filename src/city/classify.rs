use super::grid::{CellKind, Grid, DIAGONAL, ORTHOGONAL};
use serde::{Deserialize, Serialize};
use std::f32::consts::{FRAC_PI_2, PI};
use std::fmt;
use std::str::FromStr;

/// Building variant chosen by how many sides of a cell face a street.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Archetype {
    OneSide,
    Corner,
    TwoSides,
    SingleCorner,
    /// Street only on a diagonal; placed to close visual gaps at corners.
    Hidden,
}

impl Archetype {
    pub const ALL: [Archetype; 5] = [
        Archetype::OneSide,
        Archetype::Corner,
        Archetype::TwoSides,
        Archetype::SingleCorner,
        Archetype::Hidden,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Node name of this variant inside the city model file.
    pub fn node_name(self) -> &'static str {
        match self {
            Archetype::OneSide => "OneSide",
            Archetype::Corner => "Corner",
            Archetype::TwoSides => "TwoSides",
            Archetype::SingleCorner => "SingleCorner",
            Archetype::Hidden => "Hidden",
        }
    }
}

impl fmt::Display for Archetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.node_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownArchetype(pub String);

impl fmt::Display for UnknownArchetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown building archetype `{}`", self.0)
    }
}

impl std::error::Error for UnknownArchetype {}

impl FromStr for Archetype {
    type Err = UnknownArchetype;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Archetype::ALL
            .into_iter()
            .find(|a| a.node_name() == s)
            .ok_or_else(|| UnknownArchetype(s.to_string()))
    }
}

/// Street adjacency of a cell: `[up, right, down, left]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NeighborMask(pub [bool; 4]);

impl NeighborMask {
    pub fn of(grid: &Grid, row: usize, col: usize) -> Self {
        let mut mask = [false; 4];
        for (bit, (dr, dc)) in mask.iter_mut().zip(ORTHOGONAL) {
            *bit = grid.is_street_like(row as isize + dr, col as isize + dc);
        }
        NeighborMask(mask)
    }

    pub fn count(&self) -> usize {
        self.0.iter().filter(|&&b| b).count()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct BuildingPlacement {
    pub row: usize,
    pub col: usize,
    pub archetype: Archetype,
    /// Yaw in radians, always a multiple of 90 degrees.
    pub rotation: f32,
}

// Indexed by the single street side (up, right, down, left).
const ONE_SIDE_ROTATION: [f32; 4] = [FRAC_PI_2, 0.0, -FRAC_PI_2, PI];
// Indexed by the first side of the adjacent pair: up-right, right-down, down-left, left-up.
const CORNER_ROTATION: [f32; 4] = [0.0, -FRAC_PI_2, PI, FRAC_PI_2];
// Indexed by the single side without a street.
const SINGLE_CORNER_ROTATION: [f32; 4] = [-FRAC_PI_2, PI, FRAC_PI_2, 0.0];

/// Pick the building variant and rotation for the cell at `(row, col)`.
///
/// Only building cells produce a placement. Cells enclosed by streets on all
/// four sides, and cells with no orthogonal or diagonal street, produce none.
pub fn classify(grid: &Grid, row: usize, col: usize) -> Option<BuildingPlacement> {
    if grid.cell_at(row, col) != CellKind::Building {
        return None;
    }

    let mask = NeighborMask::of(grid, row, col);
    let bits = mask.0;
    let (archetype, rotation) = match mask.count() {
        0 => {
            let diagonal = DIAGONAL
                .iter()
                .any(|(dr, dc)| grid.is_street_like(row as isize + dr, col as isize + dc));
            if !diagonal {
                return None;
            }
            (Archetype::Hidden, 0.0)
        }
        1 => {
            let side = bits.iter().position(|&b| b)?;
            (Archetype::OneSide, ONE_SIDE_ROTATION[side])
        }
        2 => match (0..4).find(|&i| bits[i] && bits[(i + 1) % 4]) {
            Some(i) => (Archetype::Corner, CORNER_ROTATION[i]),
            None if bits[1] => (Archetype::TwoSides, 0.0),
            None => (Archetype::TwoSides, FRAC_PI_2),
        },
        3 => {
            let open = bits.iter().position(|&b| !b)?;
            (Archetype::SingleCorner, SINGLE_CORNER_ROTATION[open])
        }
        _ => return None,
    };

    Some(BuildingPlacement { row, col, archetype, rotation })
}

/// Classify every cell of the grid in row-major order.
pub fn classify_all(grid: &Grid) -> Vec<BuildingPlacement> {
    grid.cells()
        .filter(|(_, kind)| *kind == CellKind::Building)
        .filter_map(|(pos, _)| classify(grid, pos.x, pos.y))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    // Builds a 3x3 map around a centre building whose orthogonal
    // neighbours follow `mask`; diagonals are empty lots.
    fn grid_with_mask(mask: [bool; 4]) -> Grid {
        let t = |b: bool| if b { 'W' } else { ' ' };
        let rows = [
            format!(" {} ", t(mask[0])),
            format!("{}.{}", t(mask[3]), t(mask[1])),
            format!(" {} ", t(mask[2])),
            "S  ".to_string(),
        ];
        Grid::from_rows(&rows).unwrap()
    }

    fn classify_mask(mask: [bool; 4]) -> Option<(Archetype, f32)> {
        let grid = grid_with_mask(mask);
        assert_eq!(NeighborMask::of(&grid, 2, 2).0, mask);
        classify(&grid, 2, 2).map(|p| (p.archetype, p.rotation))
    }

    #[test]
    fn one_side_rotations() {
        assert_eq!(classify_mask([true, false, false, false]), Some((Archetype::OneSide, FRAC_PI_2)));
        assert_eq!(classify_mask([false, true, false, false]), Some((Archetype::OneSide, 0.0)));
        assert_eq!(classify_mask([false, false, true, false]), Some((Archetype::OneSide, -FRAC_PI_2)));
        assert_eq!(classify_mask([false, false, false, true]), Some((Archetype::OneSide, PI)));
    }

    #[test]
    fn corner_rotations() {
        assert_eq!(classify_mask([true, true, false, false]), Some((Archetype::Corner, 0.0)));
        assert_eq!(classify_mask([false, true, true, false]), Some((Archetype::Corner, -FRAC_PI_2)));
        assert_eq!(classify_mask([false, false, true, true]), Some((Archetype::Corner, PI)));
        assert_eq!(classify_mask([true, false, false, true]), Some((Archetype::Corner, FRAC_PI_2)));
    }

    #[test]
    fn opposite_sides() {
        assert_eq!(classify_mask([true, false, true, false]), Some((Archetype::TwoSides, FRAC_PI_2)));
        assert_eq!(classify_mask([false, true, false, true]), Some((Archetype::TwoSides, 0.0)));
    }

    #[test]
    fn three_sides() {
        assert_eq!(classify_mask([true, true, true, false]), Some((Archetype::SingleCorner, 0.0)));
        assert_eq!(classify_mask([false, true, true, true]), Some((Archetype::SingleCorner, -FRAC_PI_2)));
        assert_eq!(classify_mask([true, false, true, true]), Some((Archetype::SingleCorner, PI)));
        assert_eq!(classify_mask([true, true, false, true]), Some((Archetype::SingleCorner, FRAC_PI_2)));
    }

    #[test]
    fn enclosed_cell_has_no_building() {
        assert_eq!(classify_mask([true, true, true, true]), None);
    }

    #[test]
    fn diagonal_street_gives_hidden() {
        let grid = Grid::from_rows(&["W  ", " . ", "  S"]).unwrap();
        let p = classify(&grid, 2, 2).unwrap();
        assert_eq!(p.archetype, Archetype::Hidden);
        assert_eq!(p.rotation, 0.0);
    }

    #[test]
    fn isolated_building_is_skipped() {
        let grid = Grid::from_rows(&["   ", " . ", "   ", "S  "]).unwrap();
        assert_eq!(classify(&grid, 2, 2), None);
    }

    #[test]
    fn non_building_cells_are_skipped() {
        let grid = Grid::from_rows(&["SW"]).unwrap();
        assert_eq!(classify(&grid, 1, 1), None);
        assert_eq!(classify(&grid, 1, 2), None);
    }

    #[test]
    fn padding_cells_face_edge_streets() {
        let grid = Grid::from_rows(&["SW"]).unwrap();
        // Border row above the street.
        let p = classify(&grid, 0, 2).unwrap();
        assert_eq!((p.archetype, p.rotation), (Archetype::OneSide, -FRAC_PI_2));
        // Padding corners only touch streets diagonally.
        let corner = classify(&grid, 0, 0).unwrap();
        assert_eq!(corner.archetype, Archetype::Hidden);
    }

    #[test]
    fn classify_all_visits_every_building() {
        let grid = Grid::from_rows(&[".W.", "WS.", "..."]).unwrap();
        let placements = classify_all(&grid);
        assert!(placements
            .iter()
            .all(|p| grid.cell_at(p.row, p.col) == CellKind::Building));
        assert!(placements.windows(2).all(|w| (w[0].row, w[0].col) < (w[1].row, w[1].col)));
        let centre_right = placements.iter().find(|p| (p.row, p.col) == (2, 3)).unwrap();
        assert_eq!(centre_right.archetype, Archetype::OneSide);
        assert_eq!(centre_right.rotation, PI);
    }

    #[test]
    fn archetype_names_round_trip() {
        for a in Archetype::ALL {
            assert_eq!(a.node_name().parse::<Archetype>(), Ok(a));
        }
        assert!("Tower".parse::<Archetype>().is_err());
    }
}
