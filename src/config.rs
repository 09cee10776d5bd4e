use crate::game::vehicle::VehicleConfig;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct Dimensions {
    pub width: f32,
    pub height: f32,
    pub depth: f32,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct ModelConfig {
    pub path: String,
    /// Scale applied to the model's bounding box.
    pub scale: f32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        ModelConfig {
            path: String::new(),
            scale: 1.0,
        }
    }
}

impl ModelConfig {
    fn at(path: &str) -> Self {
        ModelConfig { path: path.to_string(), ..Default::default() }
    }
}

// 7x9 ring road with the depot in the south-east corner.
const DEFAULT_MAP: [&str; 7] = [
    ".........",
    ".WWWWWWW.",
    ".W.....W.",
    ".W.....W.",
    ".W.....W.",
    ".WWWWWWS.",
    ".........",
];

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct CityConfig {
    /// One string per map row: `.` building, `W` street, `S` start, anything else empty.
    pub map: Vec<String>,
    /// Cell size used when no building model is loaded.
    pub building: Dimensions,
    pub model: ModelConfig,
    /// Height above the start cell where the bus is dropped.
    pub spawn_height: f32,
}

impl Default for CityConfig {
    fn default() -> Self {
        CityConfig {
            map: DEFAULT_MAP.iter().map(|r| r.to_string()).collect(),
            building: Dimensions { width: 10.0, height: 15.0, depth: 10.0 },
            model: ModelConfig::at("/assets/models/city.glb"),
            spawn_height: 10.0,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct BusConfig {
    pub vehicle: VehicleConfig,
    pub model: ModelConfig,
}

impl Default for BusConfig {
    fn default() -> Self {
        BusConfig {
            vehicle: VehicleConfig::bus(),
            model: ModelConfig::at("/assets/models/bus.glb"),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct RoundConfig {
    pub duration_secs: f32,
    /// Seconds added to the clock for every passenger picked up.
    pub bonus_secs: f32,
    /// Maximum street steps between the depot and a new passenger.
    pub passenger_distance: usize,
    /// Trigger volume around a waiting passenger.
    pub passenger: Dimensions,
}

impl Default for RoundConfig {
    fn default() -> Self {
        RoundConfig {
            duration_secs: 150.0,
            bonus_secs: 15.0,
            passenger_distance: 12,
            passenger: Dimensions { width: 10.0, height: 10.0, depth: 10.0 },
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct EnvironmentConfig {
    pub day_duration_minutes: f32,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        EnvironmentConfig { day_duration_minutes: 5.0 }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub city: CityConfig,
    pub bus: BusConfig,
    pub round: RoundConfig,
    pub environment: EnvironmentConfig,
    /// Fixed RNG seed; a fresh one is drawn when absent.
    pub seed: Option<u64>,
    pub debug: bool,
}

#[derive(Debug)]
pub enum ConfigError {
    Json(serde_json::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(e) => write!(f, "invalid config: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Json(e) => Some(e),
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Json(e)
    }
}

impl AppConfig {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }
}
