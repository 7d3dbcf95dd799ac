use serde::{Deserialize, Serialize};

/// Configuration of obstacle course generation and of the
/// geometry of its gaps.
///
/// The defaults are empirically tuned values, not invariants.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CourseConfig {
    /// Scroll distance after which the course is complete.
    pub length: u32,
    /// Position of the first gap, leaving agents a run-up.
    pub run_up: u32,
    /// Extra spacing added to every step between gaps. It shrinks
    /// by `spacing_decrement` per gap while positive, so gaps get
    /// closer as the course progresses.
    pub initial_spacing: i32,
    pub spacing_decrement: i32,
    /// Random part of every step between gaps, drawn from
    /// `[step_jitter_min, step_jitter_max)`.
    pub step_jitter_min: i32,
    pub step_jitter_max: i32,
    /// Vertical gap centres are drawn from `[gap_center_min, gap_center_max)`.
    /// The first draw is compared against `gap_center_max / 2`.
    pub gap_center_min: i32,
    pub gap_center_max: i32,
    /// Largest allowed vertical move between consecutive gap centres.
    pub max_center_delta: i32,
    /// Random slack taken off `max_center_delta` when a draw is pulled back.
    pub center_jitter: i32,
    /// Half the height of the opening between the top and bottom pipes.
    pub gap_half_height: f32,
    /// Width of a pipe as handed to the sensor.
    pub pipe_width: f32,
    /// Width of the pipe column tested for collisions, one unit
    /// narrower than the drawn pipe.
    pub opening_width: f32,
    /// Bottom of the bottom pipes.
    pub ground_y: f32,
    /// How far ahead of the agent obstacles are handed to its sensor.
    pub lookahead: f32,
    /// Maximum number of gaps handed to the sensor.
    pub max_visible_gaps: usize,
    /// How far behind the agent a gap still reaches its sensor.
    pub sensor_window_behind: f32,
    /// Gaps further behind the agent's course position than this
    /// are passed.
    pub collision_window_behind: f32,
    /// Gaps up to this far past the agent's right edge are tested
    /// for collision (and already credited).
    pub collision_window_ahead: f32,
}

impl Default for CourseConfig {
    fn default() -> CourseConfig {
        CourseConfig {
            length: 20_000,
            run_up: 300,
            initial_spacing: 110,
            spacing_decrement: 3,
            step_jitter_min: 94,
            step_jitter_max: 124,
            gap_center_min: 30,
            gap_center_max: 259,
            max_center_delta: 100,
            center_jitter: 17,
            gap_half_height: 40.0,
            pipe_width: 40.0,
            opening_width: 39.0,
            ground_y: 293.0,
            lookahead: 300.0,
            max_visible_gaps: 3,
            sensor_window_behind: 40.0,
            collision_window_behind: 40.0,
            collision_window_ahead: 2.0,
        }
    }
}

impl CourseConfig {
    /// Checks that random draws have non-empty ranges.
    pub(crate) fn validate(&self) -> Result<(), String> {
        if self.step_jitter_min >= self.step_jitter_max {
            return Err(format!(
                "empty step jitter range {}..{}",
                self.step_jitter_min, self.step_jitter_max
            ));
        }
        if self.gap_center_min >= self.gap_center_max {
            return Err(format!(
                "empty gap centre range {}..{}",
                self.gap_center_min, self.gap_center_max
            ));
        }
        if self.center_jitter < 0 || self.max_center_delta < 0 || self.spacing_decrement < 0 {
            return Err("course deltas, jitters and decrements must not be negative".into());
        }
        Ok(())
    }
}
