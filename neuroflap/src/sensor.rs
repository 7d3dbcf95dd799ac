//! A fan of proximity rays cast from an agent, turning the
//! obstacles around it into network inputs.
mod config;

pub use config::SensorConfig;

use crate::geometry::{distance, Point, Rect, Segment};

use serde::{Deserialize, Serialize};

/// A single ray of a reading, kept for debug overlays.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ray {
    pub start: Point,
    pub end: Point,
    /// Nearest point hit along the ray, if anything was in range.
    pub hit: Option<Point>,
}

/// Output of one sensor read.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    /// One value per ray in `[0, 1]`: 0 when nothing is in range,
    /// growing towards 1 as the nearest surface approaches.
    pub values: Vec<f64>,
    pub rays: Vec<Ray>,
}

/// Casts a fixed fan of rays and reports how close the nearest
/// surface is along each of them.
#[derive(Clone, Debug)]
pub struct ProximitySensor {
    config: SensorConfig,
    // Unit direction (cos, sin) of every ray.
    directions: Box<[(f64, f64)]>,
}

impl ProximitySensor {
    pub fn new(config: SensorConfig) -> ProximitySensor {
        let step = config.field_of_view_span_degrees / config.sample_count.max(1) as f64;
        let directions = (0..config.sample_count)
            .map(|i| {
                let angle = (config.field_of_view_start_degrees + step * i as f64).to_radians();
                (angle.cos(), angle.sin())
            })
            .collect();
        ProximitySensor { config, directions }
    }

    pub fn config(&self) -> &SensorConfig {
        &self.config
    }

    /// Number of values produced by [`read`](Self::read).
    pub fn sample_count(&self) -> usize {
        self.directions.len()
    }

    /// Angle of every ray, in degrees.
    pub fn angles_degrees(&self) -> Vec<f64> {
        self.directions
            .iter()
            .map(|(cos, sin)| sin.atan2(*cos).to_degrees())
            .collect()
    }

    /// Reads the surroundings of `origin`.
    ///
    /// Every ray is tested against the four edges of each obstacle
    /// and against the floor and ceiling lines. The nearest hit
    /// wins; on equal distances the first one found is kept. The
    /// result only depends on the arguments, so repeated reads of
    /// the same scene are identical.
    ///
    /// # Examples
    /// ```
    /// use neuroflap::geometry::{Point, Rect};
    /// use neuroflap::sensor::{ProximitySensor, SensorConfig};
    ///
    /// // A single ray looking straight ahead.
    /// let sensor = ProximitySensor::new(SensorConfig {
    ///     sample_count: 1,
    ///     field_of_view_start_degrees: 0.0,
    ///     ..SensorConfig::default()
    /// });
    ///
    /// let wall = Rect::new(150.0, 50.0, 40.0, 100.0);
    /// let reading = sensor.read(&[wall], Point::new(0.0, 100.0));
    /// assert_eq!(reading.values, vec![0.5]);
    /// ```
    pub fn read(&self, obstacles: &[Rect], origin: Point) -> SensorReading {
        let depth = self.config.depth;
        let boundaries = [
            Segment::new(
                Point::new(self.config.boundary_left, self.config.floor_y),
                Point::new(self.config.boundary_right, self.config.floor_y),
            ),
            Segment::new(
                Point::new(self.config.boundary_left, self.config.ceiling_y),
                Point::new(self.config.boundary_right, self.config.ceiling_y),
            ),
        ];

        let mut reading = SensorReading {
            values: Vec::with_capacity(self.directions.len()),
            rays: Vec::with_capacity(self.directions.len()),
        };
        for &(cos, sin) in self.directions.iter() {
            let end = Point::new(
                (cos * depth + f64::from(origin.x)) as f32,
                (sin * depth + f64::from(origin.y)) as f32,
            );
            let ray = Segment::new(origin, end);

            let mut nearest = 1.0;
            let mut hit = None;
            let surfaces = obstacles.iter().flat_map(Rect::edges).chain(boundaries);
            for surface in surfaces {
                if let Some(point) = ray.intersection(&surface) {
                    let proximity = (f64::from(distance(origin, point)) / depth).clamp(0.0, 1.0);
                    if proximity < nearest {
                        nearest = proximity;
                        hit = Some(point);
                    }
                }
            }

            reading.values.push(1.0 - nearest);
            reading.rays.push(Ray {
                start: origin,
                end,
                hit,
            });
        }
        reading
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn forward_sensor() -> ProximitySensor {
        ProximitySensor::new(SensorConfig {
            sample_count: 1,
            field_of_view_start_degrees: 0.0,
            ..SensorConfig::default()
        })
    }

    #[test]
    fn default_fan() {
        let sensor = ProximitySensor::new(SensorConfig::default());
        assert_eq!(sensor.sample_count(), 7);
        let angles = sensor.angles_degrees();
        assert!((angles[0] + 125.0).abs() < 1e-9);
        for pair in angles.windows(2) {
            assert!((pair[1] - pair[0] - 251.0 / 7.0).abs() < 1e-9);
        }
    }

    #[test]
    fn edge_at_half_depth() {
        let sensor = forward_sensor();
        let reading = sensor.read(&[Rect::new(150.0, 50.0, 40.0, 100.0)], Point::new(0.0, 100.0));
        assert_eq!(reading.values, vec![0.5]);
        assert_eq!(reading.rays[0].hit, Some(Point::new(150.0, 100.0)));
        assert_eq!(reading.rays[0].end, Point::new(300.0, 100.0));
    }

    #[test]
    fn nothing_in_range() {
        let sensor = forward_sensor();
        let far = Rect::new(400.0, 0.0, 40.0, 290.0);
        for obstacles in [&[][..], &[far][..]] {
            let reading = sensor.read(obstacles, Point::new(0.0, 100.0));
            assert_eq!(reading.values, vec![0.0]);
            assert_eq!(reading.rays[0].hit, None);
        }
    }

    #[test]
    fn nearest_surface_wins_regardless_of_order() {
        let sensor = forward_sensor();
        let near = Rect::new(60.0, 90.0, 10.0, 20.0);
        let far = Rect::new(240.0, 0.0, 40.0, 290.0);
        let origin = Point::new(0.0, 100.0);
        let a = sensor.read(&[near, far], origin);
        let b = sensor.read(&[far, near], origin);
        assert_eq!(a.values, b.values);
        assert!((a.values[0] - 0.8).abs() < 1e-6);
    }

    #[test]
    fn floor_and_ceiling_detected() {
        let origin = Point::new(50.0, 144.0);
        let down = ProximitySensor::new(SensorConfig {
            sample_count: 1,
            field_of_view_start_degrees: 90.0,
            ..SensorConfig::default()
        });
        // Floor at 294, 150 below.
        assert!((down.read(&[], origin).values[0] - 0.5).abs() < 1e-6);

        let up = ProximitySensor::new(SensorConfig {
            sample_count: 1,
            field_of_view_start_degrees: -90.0,
            ..SensorConfig::default()
        });
        // Ceiling at 0, 144 above.
        assert!((up.read(&[], origin).values[0] - (1.0 - 144.0 / 300.0)).abs() < 1e-6);
    }

    #[test]
    fn values_bounded_and_idempotent() {
        let sensor = ProximitySensor::new(SensorConfig::default());
        let obstacles = [
            Rect::new(30.0, 0.0, 40.0, 60.0),
            Rect::new(30.0, 140.0, 40.0, 153.0),
            Rect::new(180.0, 0.0, 40.0, 120.0),
            Rect::new(180.0, 200.0, 40.0, 93.0),
        ];
        for y in (0..=285).step_by(15) {
            let origin = Point::new(24.0, y as f32);
            let first = sensor.read(&obstacles, origin);
            assert_eq!(first.values.len(), 7);
            assert!(first.values.iter().all(|v| (0.0..=1.0).contains(v)));
            assert_eq!(sensor.read(&obstacles, origin), first);
        }
    }

    #[test]
    fn touching_origin_reads_one() {
        let sensor = forward_sensor();
        let reading = sensor.read(&[Rect::new(10.0, 50.0, 40.0, 100.0)], Point::new(10.0, 100.0));
        assert_eq!(reading.values, vec![1.0]);
    }
}
