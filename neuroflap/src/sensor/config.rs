use serde::{Deserialize, Serialize};

/// Configuration of the proximity sensor fan.
///
/// The defaults are empirically tuned values, not invariants;
/// any of them may be changed without breaking the sensor's
/// guarantees.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    /// Number of rays cast, and therefore of values read.
    pub sample_count: usize,
    /// Angle of the first ray. 0° looks straight ahead (+x);
    /// negative angles look up, since y grows downward.
    pub field_of_view_start_degrees: f64,
    /// Angular span shared evenly between the rays: ray `i` is cast at
    /// `start + i × span / sample_count`.
    pub field_of_view_span_degrees: f64,
    /// Length of every ray.
    pub depth: f64,
    /// Height of the ceiling line.
    pub ceiling_y: f32,
    /// Height of the floor line.
    pub floor_y: f32,
    /// Horizontal extent of the floor and ceiling lines.
    pub boundary_left: f32,
    pub boundary_right: f32,
}

impl Default for SensorConfig {
    fn default() -> SensorConfig {
        SensorConfig {
            sample_count: 7,
            field_of_view_start_degrees: -125.0,
            field_of_view_span_degrees: 251.0,
            depth: 300.0,
            ceiling_y: 0.0,
            floor_y: 294.0,
            boundary_left: 0.0,
            boundary_right: 800.0,
        }
    }
}
