use city_bus::city::{
    sample_reachable, Archetype, CellKind, City, CellSize, Grid, GridError, Position,
};
use city_bus::config::AppConfig;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::f32::consts::FRAC_PI_2;

const RING: [&str; 7] = [
    ".........",
    ".WWWWWWW.",
    ".W.....W.",
    ".W.....W.",
    ".W.....W.",
    ".WWWWWWS.",
    ".........",
];

#[test]
fn ring_map_end_to_end() {
    let grid = Grid::from_rows(&RING).unwrap();
    assert_eq!(grid.dimensions(), (9, 11));
    // Row 5, column 7 of the raw map, shifted by the border.
    assert_eq!(grid.start_point(), Position::new(6, 8));

    let expected = [Position::new(5, 8), Position::new(6, 7)];
    for seed in 0..32 {
        let mut rng = SmallRng::seed_from_u64(seed);
        let p = sample_reachable(&grid, 1, &mut rng);
        assert!(expected.contains(&p), "seed {seed} gave {p:?}");
        assert_ne!(grid.cell_at(p.x, p.y), CellKind::Building);
        assert_eq!(sample_reachable(&grid, 0, &mut rng), grid.start_point());
    }
}

#[test]
fn ring_map_buildings() {
    let city = City::new(
        Grid::from_rows(&RING).unwrap(),
        CellSize { depth: 10.0, width: 10.0, height: 15.0 },
    );
    let buildings = city.buildings();
    let at = |row, col| {
        buildings
            .iter()
            .find(|b| (b.placement.row, b.placement.col) == (row, col))
            .map(|b| (b.placement.archetype, b.placement.rotation))
    };

    // Inside the ring, the top-left courtyard cell touches streets above and to the left.
    assert_eq!(at(3, 3), Some((Archetype::Corner, FRAC_PI_2)));
    // Courtyard edge facing the top street only.
    assert_eq!(at(3, 4), Some((Archetype::OneSide, FRAC_PI_2)));
    // Courtyard centre sees no street at all.
    assert_eq!(at(4, 5), None);
    // Outside the ring, above the top street.
    assert_eq!(at(1, 4), Some((Archetype::OneSide, -FRAC_PI_2)));
    // Outer corner diagonal to the ring's corner.
    assert_eq!(at(1, 1), Some((Archetype::Hidden, 0.0)));

    let world = buildings.iter().find(|b| (b.placement.row, b.placement.col) == (3, 4)).unwrap();
    assert_eq!(world.position, [30.0, 0.0, 40.0]);
}

#[test]
fn duplicate_start_rejected() {
    let err = Grid::from_rows(&["S..", ".WS"]).unwrap_err();
    assert!(matches!(err, GridError::DuplicateStartPoint { .. }));
    assert!(err.to_string().contains("duplicate start point"));
}

#[test]
fn default_config_builds_a_city() {
    let config = AppConfig::default();
    let city = City::from_config(&config.city, None).unwrap();
    assert_eq!(city.grid().start_point(), Position::new(6, 8));
    assert!(!city.buildings().is_empty());
}
