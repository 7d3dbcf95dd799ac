//! The obstacle course: a scrolling sequence of gaps between
//! top and bottom pipes, and the collision model that scores
//! agents against it.
mod config;

pub use config::CourseConfig;

use crate::geometry::{Point, Rect};

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An opening in the course that agents must fly through.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Gap {
    /// Course position of the pipes' left edge.
    pub x: f32,
    /// Vertical centre of the opening.
    pub center_y: f32,
}

impl Gap {
    pub const fn new(x: f32, center_y: f32) -> Gap {
        Gap { x, center_y }
    }
}

/// The outline used to test an agent for collisions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Silhouette {
    /// Horizontal extent of the agent.
    pub width: f32,
    /// Points approximating the agent's outline, relative
    /// to its position.
    pub hit_points: Vec<Point>,
}

impl Default for Silhouette {
    fn default() -> Silhouette {
        const POINTS: [(f32, f32); 15] = [
            (0.0, -3.0),
            (13.0, -11.0),
            (25.0, 0.0),
            (12.0, 7.0),
            (22.0, 5.0),
            (20.0, -8.0),
            (7.0, -9.0),
            (3.0, 4.0),
            (8.0, -9.0),
            (22.0, -3.0),
            (24.0, 4.0),
            (16.0, 6.0),
            (6.0, 5.0),
            (1.0, 1.0),
            (2.0, -6.0),
        ];
        Silhouette {
            width: 28.0,
            hit_points: POINTS.iter().map(|&(x, y)| Point::new(x, y)).collect(),
        }
    }
}

/// Result of testing an agent against the course.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CollisionCheck {
    pub collided: bool,
    /// Number of gaps behind or overlapping the agent.
    pub score: u32,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CourseError {
    #[error("gap {index} at {x} does not lie past the previous gap")]
    NotIncreasing { index: usize, x: f32 },
    #[error("gap {index} lies at {x}")]
    NonFinite { index: usize, x: f32 },
}

/// A course of gaps, and how far it has scrolled.
#[derive(Clone, Debug)]
pub struct ObstacleField {
    config: CourseConfig,
    gaps: Vec<Gap>,
    scroll: u32,
}

impl ObstacleField {
    /// Generates a random course.
    ///
    /// Gaps follow a bounded random walk: the horizontal step
    /// between gaps shrinks as the course progresses, and every
    /// gap centre stays within `max_center_delta` of the previous
    /// one, so no transition is impossible to fly.
    ///
    /// # Panics
    /// Panics if the configuration has empty random ranges (see
    /// `TrainerConfig::validate`).
    ///
    /// # Examples
    /// ```
    /// use neuroflap::course::{CourseConfig, ObstacleField};
    ///
    /// let course = ObstacleField::generate(CourseConfig::default(), &mut rand::thread_rng());
    /// assert!(course.gaps().windows(2).all(|pair| pair[0].x < pair[1].x));
    /// ```
    pub fn generate<R: Rng + ?Sized>(config: CourseConfig, rng: &mut R) -> ObstacleField {
        let mut gaps = vec![];
        let mut spacing = config.initial_spacing;
        let mut previous_center = config.gap_center_max / 2;
        let mut x = i64::from(config.run_up);

        while x < i64::from(config.length) {
            if spacing > 0 {
                spacing -= config.spacing_decrement;
            }

            let mut center = rng.gen_range(config.gap_center_min..config.gap_center_max);
            if center - previous_center > config.max_center_delta {
                center = previous_center + config.max_center_delta - jitter(config.center_jitter, rng);
            } else if previous_center - center > config.max_center_delta {
                center = previous_center - config.max_center_delta + jitter(config.center_jitter, rng);
            }

            gaps.push(Gap::new(x as f32, center as f32));
            previous_center = center;

            let step = rng.gen_range(config.step_jitter_min..config.step_jitter_max) + spacing;
            x += i64::from(step.max(1));
        }

        ObstacleField {
            config,
            gaps,
            scroll: 0,
        }
    }

    /// Builds a course from explicit gaps, e.g. for replays or
    /// hand-made scenarios.
    ///
    /// # Errors
    /// Returns an error if a gap position is not finite or gap
    /// positions are not strictly increasing.
    pub fn from_gaps(gaps: Vec<Gap>, config: CourseConfig) -> Result<ObstacleField, CourseError> {
        if let Some(index) = gaps.iter().position(|gap| !gap.x.is_finite()) {
            return Err(CourseError::NonFinite {
                index,
                x: gaps[index].x,
            });
        }
        for (index, pair) in gaps.windows(2).enumerate() {
            if pair[1].x <= pair[0].x {
                return Err(CourseError::NotIncreasing {
                    index: index + 1,
                    x: pair[1].x,
                });
            }
        }
        Ok(ObstacleField {
            config,
            gaps,
            scroll: 0,
        })
    }

    pub fn config(&self) -> &CourseConfig {
        &self.config
    }

    pub fn gaps(&self) -> &[Gap] {
        &self.gaps
    }

    /// Current scroll position.
    pub fn scroll(&self) -> u32 {
        self.scroll
    }

    /// Moves the course one unit forward. Returns whether the
    /// end of the course has been passed.
    pub fn advance(&mut self) -> bool {
        self.scroll += 1;
        self.is_exhausted()
    }

    /// Whether the end of the course has been passed.
    pub fn is_exhausted(&self) -> bool {
        self.scroll > self.config.length
    }

    /// Jumps to a scroll position.
    pub fn scroll_to(&mut self, scroll: u32) {
        self.scroll = scroll;
    }

    /// Returns the rectangles of the top and bottom pipes of the
    /// next few gaps around an agent at screen position `agent_x`,
    /// in screen coordinates and in course order.
    pub fn closest_obstacles(&self, agent_x: f32, silhouette: &Silhouette) -> Vec<Rect> {
        let scroll = self.scroll as f32;
        let left = scroll + agent_x - self.config.sensor_window_behind;
        let right = left + agent_x + silhouette.width + self.config.lookahead;
        let half = self.config.gap_half_height;
        let width = self.config.pipe_width;

        let first = self.gaps.partition_point(|gap| gap.x < left);
        self.gaps[first..]
            .iter()
            .take(self.config.max_visible_gaps)
            .take_while(|gap| gap.x <= right)
            .flat_map(|gap| {
                let x = gap.x - scroll;
                let bottom_top = gap.center_y + half;
                [
                    Rect::new(x, 0.0, width, (gap.center_y - half).max(0.0)),
                    Rect::new(x, bottom_top, width, (self.config.ground_y - bottom_top).max(0.0)),
                ]
            })
            .collect()
    }

    /// The opening of a gap, in course coordinates. Its width is
    /// the width of the pipe column tested for collisions.
    pub fn opening(&self, gap: &Gap) -> Rect {
        let half = self.config.gap_half_height;
        Rect::new(gap.x, gap.center_y - half, self.config.opening_width, 2.0 * half)
    }

    /// Tests an agent at screen position `position` against the
    /// course.
    ///
    /// The score is the number of gaps already behind or currently
    /// overlapping the agent. It is recomputed from scratch on every
    /// call, so a gap is never credited twice, and since the scroll
    /// only moves forward it never decreases. An agent collides when
    /// any of its hit points is within the pipe column of an
    /// overlapping gap but outside of its opening.
    pub fn check(&self, position: Point, silhouette: &Silhouette) -> CollisionCheck {
        let scroll = self.scroll as f32;
        let agent_x = scroll + position.x;
        let left = agent_x - self.config.collision_window_behind;
        let right = agent_x + silhouette.width + self.config.collision_window_ahead;

        let passed = self.gaps.partition_point(|gap| gap.x < left);
        let reached = self.gaps.partition_point(|gap| gap.x <= right).max(passed);

        let collided = self.gaps[passed..reached].iter().any(|gap| {
            let opening = self.opening(gap);
            silhouette.hit_points.iter().any(|offset| {
                let point = Point::new(offset.x + position.x + scroll, offset.y + position.y);
                point.x > opening.left() && point.x < opening.right() && !opening.contains(point)
            })
        });

        CollisionCheck {
            collided,
            score: reached as u32,
        }
    }
}

fn jitter<R: Rng + ?Sized>(bound: i32, rng: &mut R) -> i32 {
    if bound > 0 {
        rng.gen_range(0..bound)
    } else {
        0
    }
}
