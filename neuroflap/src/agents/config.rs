use crate::course::Silhouette;

use serde::{Deserialize, Serialize};

/// Physical constants of agent motion.
///
/// Acceleration is subtracted from speed and speed is added to the
/// vertical position, so a positive network output pushes an agent
/// upwards while gravity pulls it down.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Screen position every agent starts a generation at.
    pub start_x: f32,
    pub start_y: f32,
    /// Horizontal offset of the sensor origin from the agent position.
    pub sensor_offset_x: f32,
    /// Acceleration lost every tick.
    pub gravity: f64,
    pub min_acceleration: f64,
    pub min_speed: f64,
    pub max_speed: f64,
    /// Vertical bounds of the agent position.
    pub min_y: f32,
    pub max_y: f32,
    /// Speed and acceleration are divided by this before being fed
    /// to the network.
    pub input_scale: f64,
    pub silhouette: Silhouette,
}

impl Default for PhysicsConfig {
    fn default() -> PhysicsConfig {
        PhysicsConfig {
            start_x: 10.0,
            start_y: 100.0,
            sensor_offset_x: 14.0,
            gravity: 0.001,
            min_acceleration: -1.0,
            min_speed: -2.0,
            max_speed: 3.0,
            min_y: 0.0,
            max_y: 285.0,
            input_scale: 3.0,
            silhouette: Silhouette::default(),
        }
    }
}

impl PhysicsConfig {
    pub(crate) fn validate(&self) -> Result<(), String> {
        if !(self.min_speed <= self.max_speed) {
            return Err(format!(
                "speed bounds {}..{} are empty",
                self.min_speed, self.max_speed
            ));
        }
        if !(self.min_y <= self.max_y) {
            return Err(format!("height bounds {}..{} are empty", self.min_y, self.max_y));
        }
        if !(self.input_scale.is_finite() && self.input_scale != 0.0) {
            return Err(format!("input scale {} cannot divide inputs", self.input_scale));
        }
        Ok(())
    }
}
