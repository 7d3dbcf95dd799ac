//! Agents: the simulated entities each network steers for one
//! generation.
mod config;

pub use config::PhysicsConfig;

use crate::course::ObstacleField;
use crate::geometry::Point;
use crate::populations::NetworkId;
use crate::sensor::{ProximitySensor, SensorReading};
use crate::telemetry::TelemetryRecord;

use neuroflap_nn::networks::FeedforwardNetwork;
use serde::{Deserialize, Serialize};

/// A single agent, bound to the network with the same id.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    id: NetworkId,
    position: Point,
    speed: f64,
    acceleration: f64,
    alive: bool,
    score: u32,
    reading: SensorReading,
}

impl Agent {
    /// Creates a live agent at the start position.
    pub fn new(id: NetworkId, physics: &PhysicsConfig) -> Agent {
        Agent {
            id,
            position: Point::new(physics.start_x, physics.start_y),
            speed: 0.0,
            acceleration: 0.0,
            alive: true,
            score: 0,
            reading: SensorReading::default(),
        }
    }

    pub fn id(&self) -> NetworkId {
        self.id
    }

    /// Screen position of the agent.
    pub fn position(&self) -> Point {
        self.position
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn acceleration(&self) -> f64 {
        self.acceleration
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Number of gaps survived so far.
    pub fn score(&self) -> u32 {
        self.score
    }

    /// The last sensor reading, for debug overlays. Empty until
    /// the agent's first step.
    pub fn reading(&self) -> &SensorReading {
        &self.reading
    }

    /// Advances the agent by one tick.
    ///
    /// A live agent reads the obstacles around it, feeds the
    /// reading plus its scaled speed and acceleration to `network`
    /// and adds the network's output to its acceleration. Every
    /// agent, dead or alive, then falls under gravity. Live agents
    /// are finally tested against the course; a collision kills
    /// the agent, stops it and freezes its score into the network's
    /// fitness. Dead agents keep falling but are never scored.
    ///
    /// When `record` is set, a live agent returns what it fed its
    /// network this tick.
    ///
    /// # Panics
    /// Panics if the network's input layer does not match the
    /// sensor's sample count plus two.
    pub fn step(
        &mut self,
        network: &mut FeedforwardNetwork,
        course: &ObstacleField,
        sensor: &ProximitySensor,
        physics: &PhysicsConfig,
        record: bool,
    ) -> Option<TelemetryRecord> {
        let mut telemetry = None;
        if self.alive {
            let obstacles = course.closest_obstacles(self.position.x, &physics.silhouette);
            let origin = self.position.offset(physics.sensor_offset_x, 0.0);
            self.reading = sensor.read(&obstacles, origin);

            let mut inputs = Vec::with_capacity(self.reading.values.len() + 2);
            inputs.extend_from_slice(&self.reading.values);
            inputs.push(self.speed / physics.input_scale);
            inputs.push(self.acceleration / physics.input_scale);

            let output = network.feed_forward(&inputs)[0];
            self.acceleration += output;

            if record {
                telemetry = Some(TelemetryRecord {
                    agent: self.id,
                    scroll: course.scroll(),
                    inputs,
                    output,
                    obstacles: obstacles
                        .iter()
                        .map(|rect| rect.translate(-self.position.x, -self.position.y))
                        .collect(),
                });
            }
        }

        self.acceleration = (self.acceleration - physics.gravity).max(physics.min_acceleration);
        self.speed = (self.speed - self.acceleration).clamp(physics.min_speed, physics.max_speed);
        self.position.y = (self.position.y + self.speed as f32).clamp(physics.min_y, physics.max_y);

        if self.alive {
            let check = course.check(self.position, &physics.silhouette);
            self.score = check.score;
            if check.collided {
                self.alive = false;
                self.speed = 0.0;
                self.acceleration = 0.0;
                network.set_fitness(self.score as f32);
            }
        }

        telemetry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::course::{CourseConfig, Gap};
    use crate::sensor::SensorConfig;

    fn network() -> FeedforwardNetwork {
        FeedforwardNetwork::zeroed(&[9, 9, 1]).unwrap()
    }

    fn empty_course() -> ObstacleField {
        ObstacleField::from_gaps(vec![], CourseConfig::default()).unwrap()
    }

    fn sensor() -> ProximitySensor {
        ProximitySensor::new(SensorConfig::default())
    }

    #[test]
    fn starts_at_rest() {
        let agent = Agent::new(NetworkId(3), &PhysicsConfig::default());
        assert_eq!(agent.id(), NetworkId(3));
        assert_eq!(agent.position(), Point::new(10.0, 100.0));
        assert!(agent.is_alive());
        assert_eq!(agent.score(), 0);
        assert!(agent.reading().values.is_empty());
    }

    #[test]
    fn zero_output_falls_under_gravity() {
        let physics = PhysicsConfig::default();
        let mut agent = Agent::new(NetworkId(0), &physics);
        let mut network = network();
        let course = empty_course();

        agent.step(&mut network, &course, &sensor(), &physics, false);
        assert!((agent.acceleration() + 0.001).abs() < 1e-12);
        assert!((agent.speed() - 0.001).abs() < 1e-12);
        assert!(agent.position().y > 100.0);
        assert_eq!(agent.reading().values.len(), 7);

        agent.step(&mut network, &course, &sensor(), &physics, false);
        assert!((agent.acceleration() + 0.002).abs() < 1e-12);
        assert!((agent.speed() - 0.003).abs() < 1e-12);
    }

    #[test]
    fn motion_is_clamped() {
        let physics = PhysicsConfig::default();
        let mut agent = Agent::new(NetworkId(0), &physics);
        let mut network = network();
        let course = empty_course();

        for _ in 0..2000 {
            agent.step(&mut network, &course, &sensor(), &physics, false);
        }
        assert_eq!(agent.acceleration(), -1.0);
        assert_eq!(agent.speed(), 3.0);
        assert_eq!(agent.position().y, 285.0);
        assert!(agent.is_alive());
    }

    #[test]
    fn positive_output_climbs() {
        let physics = PhysicsConfig::default();
        let mut agent = Agent::new(NetworkId(0), &physics);
        let mut network = network();
        network.set_bias(2, 0, 10.0);
        let course = empty_course();

        agent.step(&mut network, &course, &sensor(), &physics, false);
        assert!(agent.position().y < 100.0);
        for _ in 0..200 {
            agent.step(&mut network, &course, &sensor(), &physics, false);
        }
        assert_eq!(agent.speed(), -2.0);
        assert_eq!(agent.position().y, 0.0);
    }

    #[test]
    fn collision_kills_and_freezes_fitness() {
        let physics = PhysicsConfig::default();
        let mut agent = Agent::new(NetworkId(0), &physics);
        let mut network = network();
        // The opening sits far below the agent, whose right half overlaps the pipe.
        let course = ObstacleField::from_gaps(vec![Gap::new(20.0, 250.0)], CourseConfig::default()).unwrap();

        agent.step(&mut network, &course, &sensor(), &physics, false);
        assert!(!agent.is_alive());
        assert_eq!(agent.score(), 1);
        assert_eq!(agent.speed(), 0.0);
        assert_eq!(agent.acceleration(), 0.0);
        assert_eq!(network.fitness(), 1.0);

        let y = agent.position().y;
        let record = agent.step(&mut network, &course, &sensor(), &physics, true);
        assert!(record.is_none());
        assert!(agent.position().y > y);
        assert_eq!(agent.score(), 1);
    }

    #[test]
    fn telemetry_describes_inputs() {
        let physics = PhysicsConfig::default();
        let mut agent = Agent::new(NetworkId(2), &physics);
        let mut network = network();
        let course = ObstacleField::from_gaps(vec![Gap::new(200.0, 150.0)], CourseConfig::default()).unwrap();

        assert!(agent.step(&mut network, &course, &sensor(), &physics, false).is_none());
        let record = agent.step(&mut network, &course, &sensor(), &physics, true).unwrap();
        assert_eq!(record.agent, NetworkId(2));
        assert_eq!(record.inputs.len(), 9);
        assert_eq!(record.output, 0.0);
        assert_eq!(record.obstacles.len(), 2);
        assert_eq!(record.obstacles[0].x, 190.0);
    }

    #[test]
    #[should_panic]
    fn mismatched_network_panics() {
        let physics = PhysicsConfig::default();
        let mut agent = Agent::new(NetworkId(0), &physics);
        let mut network = FeedforwardNetwork::zeroed(&[3, 2, 1]).unwrap();
        agent.step(&mut network, &empty_course(), &sensor(), &physics, false);
    }
}
