pub mod archetypes;
pub mod classify;
pub mod grid;
pub mod sampler;

pub use archetypes::{ArchetypeTable, AssetError, BuildingModel};
pub use classify::{classify, classify_all, Archetype, BuildingPlacement, NeighborMask};
pub use grid::{CellKind, Grid, GridError, Position};
pub use sampler::sample_reachable;

use crate::config::{CityConfig, Dimensions};
use nalgebra::Vector3;
use rand::Rng;
use serde::Serialize;

/// World-space size of one grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct CellSize {
    /// Extent along world X (grid rows).
    pub depth: f32,
    /// Extent along world Z (grid columns).
    pub width: f32,
    pub height: f32,
}

impl From<Dimensions> for CellSize {
    fn from(d: Dimensions) -> Self {
        CellSize { depth: d.depth, width: d.width, height: d.height }
    }
}

impl CellSize {
    pub fn from_extent(extent: &Vector3<f32>) -> Self {
        CellSize { depth: extent.x, height: extent.y, width: extent.z }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct PlacedBuilding {
    pub placement: BuildingPlacement,
    pub position: [f32; 3],
}

pub struct City {
    grid: Grid,
    cell: CellSize,
    spawn_height: f32,
}

impl City {
    pub fn new(grid: Grid, cell: CellSize) -> Self {
        City { grid, cell, spawn_height: 0.0 }
    }

    /// Build the city from its map, sizing cells after the one-sided building
    /// model when one was loaded.
    pub fn from_config(
        config: &CityConfig,
        models: Option<&ArchetypeTable<BuildingModel>>,
    ) -> Result<Self, GridError> {
        let grid = Grid::from_rows(config.map.as_slice())?;
        let cell = models
            .and_then(|m| m.get(Archetype::OneSide))
            .map(|m| CellSize::from_extent(&m.extent))
            .unwrap_or_else(|| config.building.into());
        let (rows, cols) = grid.dimensions();
        tracing::info!(rows, cols, ?cell, "city grid built");
        Ok(City { grid, cell, spawn_height: config.spawn_height })
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn cell_size(&self) -> CellSize {
        self.cell
    }

    pub fn cell_position(&self, pos: Position) -> Vector3<f32> {
        Vector3::new(pos.x as f32 * self.cell.depth, 0.0, pos.y as f32 * self.cell.width)
    }

    /// Where the bus is dropped at the start of a round.
    pub fn start_position(&self) -> Vector3<f32> {
        let mut p = self.cell_position(self.grid.start_point());
        p.y = self.spawn_height;
        p
    }

    pub fn buildings(&self) -> Vec<PlacedBuilding> {
        classify_all(&self.grid)
            .into_iter()
            .map(|placement| {
                let p = self.cell_position(Position::new(placement.row, placement.col));
                PlacedBuilding { placement, position: [p.x, p.y, p.z] }
            })
            .collect()
    }

    pub fn passenger_cell<R: Rng + ?Sized>(&self, distance: usize, rng: &mut R) -> Position {
        sample_reachable(&self.grid, distance, rng)
    }

    /// Cell containing a world position, if it lies on the grid.
    pub fn cell_at_world(&self, world: &Vector3<f32>) -> Option<Position> {
        let x = (world.x / self.cell.depth).round();
        let y = (world.z / self.cell.width).round();
        if !x.is_finite() || !y.is_finite() || x < 0.0 || y < 0.0 {
            return None;
        }
        let (rows, cols) = self.grid.dimensions();
        let pos = Position::new(x as usize, y as usize);
        (pos.x < rows && pos.y < cols).then_some(pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_city() -> City {
        let grid = Grid::from_rows(&["WWS", "W.W"]).unwrap();
        City::new(grid, CellSize { depth: 10.0, width: 5.0, height: 15.0 })
    }

    #[test]
    fn grid_to_world() {
        let city = small_city();
        assert_eq!(city.cell_position(Position::new(2, 3)), Vector3::new(20.0, 0.0, 15.0));
        assert_eq!(city.cell_at_world(&Vector3::new(21.0, 4.0, 14.0)), Some(Position::new(2, 3)));
        assert_eq!(city.cell_at_world(&Vector3::new(-30.0, 0.0, 0.0)), None);
        assert_eq!(city.cell_at_world(&Vector3::new(500.0, 0.0, 0.0)), None);
    }

    #[test]
    fn flat_cells_have_no_world_lookup() {
        let grid = Grid::from_rows(&["WWS"]).unwrap();
        let city = City::new(grid, CellSize { depth: 0.0, width: 0.0, height: 15.0 });
        assert_eq!(city.cell_at_world(&Vector3::zeros()), None);
        assert_eq!(city.cell_at_world(&Vector3::new(5.0, 0.0, 5.0)), None);
    }

    #[test]
    fn buildings_carry_world_positions() {
        let city = small_city();
        let buildings = city.buildings();
        let inner = buildings
            .iter()
            .find(|b| (b.placement.row, b.placement.col) == (2, 2))
            .unwrap();
        assert_eq!(inner.placement.archetype, Archetype::SingleCorner);
        assert_eq!(inner.position, [20.0, 0.0, 10.0]);
        assert!(buildings
            .iter()
            .all(|b| city.grid().cell_at(b.placement.row, b.placement.col) == CellKind::Building));
    }

    #[test]
    fn cell_size_from_model_extent() {
        let config = CityConfig::default();
        let mut models = ArchetypeTable::new();
        models.insert(
            Archetype::OneSide,
            BuildingModel { node: 0, extent: Vector3::new(8.0, 20.0, 6.0) },
        );
        let city = City::from_config(&config, Some(&models)).unwrap();
        assert_eq!(city.cell_size(), CellSize { depth: 8.0, width: 6.0, height: 20.0 });

        let fallback = City::from_config(&config, None).unwrap();
        assert_eq!(fallback.cell_size(), CellSize::from(config.building));
    }

    #[test]
    fn start_position_uses_spawn_height() {
        let config = CityConfig::default();
        let city = City::from_config(&config, None).unwrap();
        let start = city.start_position();
        let cell = city.cell_position(city.grid().start_point());
        assert_eq!((start.x, start.z), (cell.x, cell.z));
        assert_eq!(start.y, config.spawn_height);
    }
}
