use serde::Serialize;
use std::fmt;

/// Kind of a single map cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum CellKind {
    Building,
    Street,
    StartPoint,
    Empty,
}

impl CellKind {
    pub fn from_token(token: char) -> Self {
        match token {
            '.' => CellKind::Building,
            'W' => CellKind::Street,
            'S' => CellKind::StartPoint,
            _ => CellKind::Empty,
        }
    }

    /// Streets and the start point are both drivable graph nodes.
    pub fn is_street_like(self) -> bool {
        matches!(self, CellKind::Street | CellKind::StartPoint)
    }
}

/// Cell coordinate in padded grid space: `x` is the row, `y` the column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

impl Position {
    pub fn new(x: usize, y: usize) -> Self {
        Position { x, y }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    /// More than one `S` token in the map.
    DuplicateStartPoint { first: Position, second: Position },
    /// No `S` token in the map.
    MissingStartPoint,
    /// A row whose length differs from the first row.
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateStartPoint { first, second } => write!(
                f,
                "duplicate start point at ({}, {}), first one at ({}, {})",
                second.x, second.y, first.x, first.y
            ),
            Self::MissingStartPoint => write!(f, "map has no start point"),
            Self::RaggedRow { row, expected, found } => write!(
                f,
                "map row {row} has {found} cells, expected {expected}"
            ),
        }
    }
}

impl std::error::Error for GridError {}

/// Width of the `Building` border added around the raw map.
pub const PADDING: usize = 1;

/// Orthogonal offsets in mask order: up, right, down, left.
pub(crate) const ORTHOGONAL: [(isize, isize); 4] = [(-1, 0), (0, 1), (1, 0), (0, -1)];

/// Diagonal offsets: NE, NW, SE, SW.
pub(crate) const DIAGONAL: [(isize, isize); 4] = [(-1, 1), (-1, -1), (1, 1), (1, -1)];

/// Immutable padded city grid.
///
/// The raw map is surrounded by a one-cell border of [`CellKind::Building`],
/// so every cell of the input map has four in-range neighbours. All
/// coordinates handed out by the grid are in this padded space.
#[derive(Debug, Clone)]
pub struct Grid {
    cells: Vec<CellKind>,
    rows: usize,
    cols: usize,
    start_point: Position,
}

impl Grid {
    /// Build a grid from a rectangular matrix of map tokens.
    pub fn build(raw: &[Vec<char>]) -> Result<Self, GridError> {
        let raw_cols = raw.first().map_or(0, Vec::len);
        for (row, tokens) in raw.iter().enumerate() {
            if tokens.len() != raw_cols {
                return Err(GridError::RaggedRow {
                    row,
                    expected: raw_cols,
                    found: tokens.len(),
                });
            }
        }

        let rows = raw.len() + 2 * PADDING;
        let cols = raw_cols + 2 * PADDING;
        let mut cells = vec![CellKind::Building; rows * cols];
        let mut start_point: Option<Position> = None;

        for (r, tokens) in raw.iter().enumerate() {
            for (c, &token) in tokens.iter().enumerate() {
                let pos = Position::new(r + PADDING, c + PADDING);
                let kind = CellKind::from_token(token);
                if kind == CellKind::StartPoint {
                    if let Some(first) = start_point {
                        return Err(GridError::DuplicateStartPoint { first, second: pos });
                    }
                    start_point = Some(pos);
                }
                cells[pos.x * cols + pos.y] = kind;
            }
        }

        let start_point = start_point.ok_or(GridError::MissingStartPoint)?;
        Ok(Grid { cells, rows, cols, start_point })
    }

    /// Build a grid where every string is one map row.
    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> Result<Self, GridError> {
        let raw: Vec<Vec<char>> = rows.iter().map(|r| r.as_ref().chars().collect()).collect();
        Self::build(&raw)
    }

    /// Kind of the cell at `(row, col)`; out-of-range reads yield `Empty`.
    pub fn cell_at(&self, row: usize, col: usize) -> CellKind {
        if row < self.rows && col < self.cols {
            self.cells[row * self.cols + col]
        } else {
            CellKind::Empty
        }
    }

    /// Signed lookup used for neighbour offsets.
    pub fn get(&self, row: isize, col: isize) -> Option<CellKind> {
        if row < 0 || col < 0 {
            return None;
        }
        let (row, col) = (row as usize, col as usize);
        (row < self.rows && col < self.cols).then(|| self.cells[row * self.cols + col])
    }

    pub fn is_street_like(&self, row: isize, col: isize) -> bool {
        self.get(row, col).is_some_and(CellKind::is_street_like)
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn start_point(&self) -> Position {
        self.start_point
    }

    /// Street-like orthogonal neighbours of `pos`, in up/right/down/left order.
    pub fn street_neighbours(&self, pos: Position) -> Vec<Position> {
        ORTHOGONAL
            .iter()
            .filter_map(|&(dr, dc)| {
                let r = pos.x as isize + dr;
                let c = pos.y as isize + dc;
                self.is_street_like(r, c)
                    .then(|| Position::new(r as usize, c as usize))
            })
            .collect()
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (Position, CellKind)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, &kind)| (Position::new(i / self.cols, i % self.cols), kind))
    }
}
