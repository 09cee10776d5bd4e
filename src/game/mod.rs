pub mod input;
pub mod timer;
pub mod vehicle;

use crate::city::archetypes::{load_building_models, model_extent};
use crate::city::{ArchetypeTable, AssetError, BuildingModel, City, GridError, Position};
use crate::config::{AppConfig, Dimensions, RoundConfig};
use input::{Control, InputState};
use nalgebra::Vector3;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use serde::Serialize;
use std::fmt;
use timer::{DayCycle, RoundTimer};
use vehicle::{assemble_vehicle, BoxChassis, DriveCommand, ModelChassis, VehicleRig};

// Re-rolls allowed when a new passenger lands on the bus's own cell.
const SPAWN_ATTEMPTS: usize = 16;

#[derive(Serialize, Clone, Copy, Debug, PartialEq)]
pub struct Passenger {
    pub cell: Position,
    /// Centre of the pickup trigger volume.
    pub position: [f32; 3],
}

impl Passenger {
    /// Horizontal overlap between the trigger box and the bus chassis.
    ///
    /// `volume` holds the trigger's half-extents, `chassis` the chassis box's.
    fn overlaps(&self, bus: &Vector3<f32>, chassis: &Vector3<f32>, volume: &Dimensions) -> bool {
        let dx = (self.position[0] - bus.x).abs();
        let dz = (self.position[2] - bus.z).abs();
        dx < volume.depth + chassis.x && dz < volume.width + chassis.z
    }
}

#[derive(Debug)]
pub enum GameError {
    Grid(GridError),
    Asset(AssetError),
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Grid(e) => write!(f, "invalid city map: {e}"),
            Self::Asset(e) => write!(f, "invalid model: {e}"),
        }
    }
}

impl std::error::Error for GameError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Grid(e) => Some(e),
            Self::Asset(e) => Some(e),
        }
    }
}

impl From<GridError> for GameError {
    fn from(e: GridError) -> Self {
        GameError::Grid(e)
    }
}

impl From<AssetError> for GameError {
    fn from(e: AssetError) -> Self {
        GameError::Asset(e)
    }
}

pub struct Game {
    pub city: City,
    pub rig: VehicleRig,
    pub input: InputState,
    pub day: DayCycle,
    pub round: RoundTimer,
    pub passenger: Passenger,
    pub score: i32,
    pub game_over: bool,
    round_config: RoundConfig,
    bus_position: Vector3<f32>,
    rng: SmallRng,
}

impl Game {
    /// Build a game from configuration and whatever models were loaded.
    ///
    /// `bus_extent` is the bounding size of the bus model; without it the
    /// chassis box comes from the configured vehicle dimensions.
    pub fn new(
        config: &AppConfig,
        models: Option<&ArchetypeTable<BuildingModel>>,
        bus_extent: Option<Vector3<f32>>,
        seed: u64,
    ) -> Result<Self, GameError> {
        let city = City::from_config(&config.city, models)?;
        let start = city.start_position();
        let vehicle = &config.bus.vehicle;
        let rig = match bus_extent {
            Some(extent) => {
                let shape = ModelChassis { extent, scale: config.bus.model.scale };
                assemble_vehicle(vehicle, &shape, start)
            }
            None => assemble_vehicle(vehicle, &BoxChassis, start),
        };

        let mut game = Game {
            city,
            rig,
            input: InputState::default(),
            day: DayCycle::new(config.environment.day_duration_minutes),
            round: RoundTimer::new(config.round.duration_secs),
            passenger: Passenger { cell: Position::new(0, 0), position: [0.0; 3] },
            score: 0,
            game_over: false,
            round_config: config.round.clone(),
            bus_position: start,
            rng: SmallRng::seed_from_u64(seed),
        };
        game.passenger = game.spawn_passenger();
        Ok(game)
    }

    /// Build a game from raw GLB files. Absent files fall back to the
    /// configured sizes; a file that is present but unreadable is an error.
    pub fn with_assets(
        config: &AppConfig,
        city_model: Option<&[u8]>,
        bus_model: Option<&[u8]>,
        seed: u64,
    ) -> Result<Self, GameError> {
        let models = match city_model {
            Some(bytes) => {
                let table = load_building_models(bytes)?;
                let missing = table.missing();
                if !missing.is_empty() {
                    tracing::warn!(?missing, "city model lacks some building variants");
                }
                Some(table)
            }
            None => None,
        };
        let bus_extent = bus_model.map(model_extent).transpose()?;
        Self::new(config, models.as_ref(), bus_extent, seed)
    }

    fn passenger_at(&self, cell: Position) -> Passenger {
        let mut p = self.city.cell_position(cell);
        p.y += self.round_config.passenger.height / 2.0;
        Passenger { cell, position: [p.x, p.y, p.z] }
    }

    fn spawn_passenger(&mut self) -> Passenger {
        let bus_cell = self.city.cell_at_world(&self.bus_position);
        let distance = self.round_config.passenger_distance;
        let mut cell = self.city.passenger_cell(distance, &mut self.rng);
        for _ in 1..SPAWN_ATTEMPTS {
            if Some(cell) != bus_cell {
                break;
            }
            cell = self.city.passenger_cell(distance, &mut self.rng);
        }
        let passenger = self.passenger_at(cell);
        tracing::debug!(x = cell.x, y = cell.y, "passenger spawned");
        passenger
    }

    /// Latest chassis position from the physics world.
    pub fn report_bus_position(&mut self, position: Vector3<f32>) {
        self.bus_position = position;
    }

    pub fn bus_position(&self) -> Vector3<f32> {
        self.bus_position
    }

    pub fn update(&mut self, dt: f32) {
        if self.input.is_pressed(Control::Restart) {
            self.restart();
            self.input.release(Control::Restart);
            self.input.clear();
            return;
        }

        self.day.update(dt);

        if !self.game_over {
            if self.round.tick(dt) {
                self.game_over = true;
                tracing::info!(score = self.score, "round over");
            } else if self.passenger.overlaps(
                &self.bus_position,
                &self.rig.chassis.half_extents,
                &self.round_config.passenger,
            ) {
                self.score += 1;
                self.round.add_bonus(self.round_config.bonus_secs);
                self.passenger = self.spawn_passenger();
                tracing::info!(score = self.score, remaining = self.round.remaining(), "passenger picked up");
            }
        }

        self.input.clear();
    }

    pub fn drive_command(&self) -> DriveCommand {
        if self.game_over {
            return DriveCommand::default();
        }
        self.rig.drive(&self.input)
    }

    pub fn restart(&mut self) {
        self.score = 0;
        self.game_over = false;
        self.round.reset();
        self.day.reset();
        self.bus_position = self.rig.initial_position;
        self.passenger = self.spawn_passenger();
        tracing::info!("game restarted");
    }
}
