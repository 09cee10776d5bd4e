use super::input::{Control, InputState};
use crate::config::Dimensions;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WheelShape {
    Sphere,
    Cylinder,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct WheelConfig {
    pub mass: f32,
    pub radius: f32,
    pub shape: WheelShape,
    /// Keeps free wheels from spinning up indefinitely.
    pub angular_damping: f32,
}

impl Default for WheelConfig {
    fn default() -> Self {
        WheelConfig { mass: 3.0, radius: 1.2, shape: WheelShape::Sphere, angular_damping: 0.9 }
    }
}

/// Everything needed to assemble a four-wheeled rigid vehicle.
///
/// Missing fields in a config file are taken from [`VehicleConfig::bus`].
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default = "VehicleConfig::bus")]
pub struct VehicleConfig {
    pub mass: f32,
    pub dimensions: Dimensions,
    pub center_of_mass: Vector3<f32>,
    pub max_force: f32,
    /// Steering angle at full lock, in radians.
    pub max_steering: f32,
    pub wheel: WheelConfig,
}

impl Default for VehicleConfig {
    fn default() -> Self {
        VehicleConfig {
            mass: 10.0,
            dimensions: Dimensions { width: 2.0, height: 3.0, depth: 5.0 },
            center_of_mass: Vector3::zeros(),
            max_force: 200.0,
            max_steering: PI / 12.0,
            wheel: WheelConfig::default(),
        }
    }
}

impl VehicleConfig {
    pub fn bus() -> Self {
        VehicleConfig {
            mass: 5.0,
            dimensions: Dimensions { width: 5.0, height: 6.0, depth: 12.0 },
            max_force: 500.0,
            wheel: WheelConfig { radius: 1.7, ..Default::default() },
            ..Default::default()
        }
    }
}

/// Supplies the collision box of a chassis.
pub trait ChassisShape {
    fn half_extents(&self, config: &VehicleConfig) -> Vector3<f32>;
}

/// Box sized from the configured vehicle dimensions.
pub struct BoxChassis;

impl ChassisShape for BoxChassis {
    fn half_extents(&self, config: &VehicleConfig) -> Vector3<f32> {
        let d = config.dimensions;
        Vector3::new(d.depth / 2.0, d.height / 2.0, d.width / 2.0)
    }
}

/// Box sized from a loaded model's bounding extent.
pub struct ModelChassis {
    pub extent: Vector3<f32>,
    pub scale: f32,
}

impl ChassisShape for ModelChassis {
    fn half_extents(&self, _config: &VehicleConfig) -> Vector3<f32> {
        self.extent * (self.scale / 2.0)
    }
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct Chassis {
    pub mass: f32,
    pub half_extents: Vector3<f32>,
    pub center_of_mass: Vector3<f32>,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct WheelMount {
    /// Attachment point relative to the chassis origin.
    pub position: Vector3<f32>,
    pub axis: Vector3<f32>,
    pub direction: Vector3<f32>,
    pub radius: f32,
    pub mass: f32,
    pub shape: WheelShape,
    pub angular_damping: f32,
}

/// Per-wheel forces and steering angles for one physics step.
#[derive(Serialize, Clone, Copy, Debug, Default, PartialEq)]
pub struct DriveCommand {
    pub wheel_forces: [f32; 4],
    pub steering: [f32; 4],
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct VehicleRig {
    pub chassis: Chassis,
    /// Rear-left, rear-right, front-left, front-right. The first pair steers,
    /// the second pair drives.
    pub wheels: [WheelMount; 4],
    pub initial_position: Vector3<f32>,
    pub max_force: f32,
    pub max_steering: f32,
}

const STEERED: [usize; 2] = [0, 1];
const DRIVEN: [usize; 2] = [2, 3];

pub fn assemble_vehicle(
    config: &VehicleConfig,
    shape: &dyn ChassisShape,
    initial_position: Vector3<f32>,
) -> VehicleRig {
    let half = shape.half_extents(config);
    let wheel = &config.wheel;
    let Dimensions { width, height, depth } = config.dimensions;
    // Wheels follow the configured dimensions whatever the collision box.
    let axle = width + wheel.radius * 2.0;
    let base_x = depth / 2.0;

    let mount = |x: f32, z: f32| WheelMount {
        position: Vector3::new(x, -height / 2.0, z) + config.center_of_mass,
        axis: Vector3::new(0.0, 0.0, z.signum()),
        direction: Vector3::new(0.0, -1.0, 0.0),
        radius: wheel.radius,
        mass: wheel.mass,
        shape: wheel.shape,
        angular_damping: wheel.angular_damping,
    };

    VehicleRig {
        chassis: Chassis {
            mass: config.mass,
            half_extents: half,
            center_of_mass: config.center_of_mass,
        },
        wheels: [
            mount(-base_x, axle / 2.0),
            mount(-base_x, -axle / 2.0),
            mount(base_x, axle / 2.0),
            mount(base_x, -axle / 2.0),
        ],
        initial_position,
        max_force: config.max_force,
        max_steering: config.max_steering,
    }
}

impl VehicleRig {
    /// Translate the held controls into wheel forces and steering.
    ///
    /// Driven wheels sit on opposite axes, so their forces have opposite signs.
    pub fn drive(&self, input: &InputState) -> DriveCommand {
        let mut cmd = DriveCommand::default();

        let mut force = 0.0;
        if input.is_pressed(Control::Forward) {
            force = self.max_force;
        }
        if input.is_pressed(Control::Backward) {
            force = -self.max_force / 2.0;
        }
        cmd.wheel_forces[DRIVEN[0]] = force;
        cmd.wheel_forces[DRIVEN[1]] = -force;

        let mut steer = 0.0;
        if input.is_pressed(Control::Right) {
            steer = -self.max_steering;
        }
        if input.is_pressed(Control::Left) {
            steer = self.max_steering;
        }
        for i in STEERED {
            cmd.steering[i] = steer;
        }
        cmd
    }
}
