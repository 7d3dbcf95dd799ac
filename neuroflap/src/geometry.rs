//! Minimal 2D geometry: points, axis-aligned rectangles and
//! line segments, in screen coordinates (y grows downward).
use serde::{Deserialize, Serialize};

/// A point in the plane.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Point {
        Point { x, y }
    }

    /// Returns this point moved by `(dx, dy)`.
    pub fn offset(self, dx: f32, dy: f32) -> Point {
        Point::new(self.x + dx, self.y + dy)
    }
}

/// Euclidean distance between two points.
pub fn distance(a: Point, b: Point) -> f32 {
    (b.x - a.x).hypot(b.y - a.y)
}

/// An axis-aligned rectangle, anchored at its top-left corner.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Rect {
        Rect {
            x,
            y,
            width,
            height,
        }
    }

    pub fn left(&self) -> f32 {
        self.x
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn top_left(&self) -> Point {
        Point::new(self.left(), self.top())
    }

    pub fn top_right(&self) -> Point {
        Point::new(self.right(), self.top())
    }

    pub fn bottom_left(&self) -> Point {
        Point::new(self.left(), self.bottom())
    }

    pub fn bottom_right(&self) -> Point {
        Point::new(self.right(), self.bottom())
    }

    /// Whether `point` lies inside the rectangle. The left and top
    /// edges are inside, the right and bottom edges are not.
    pub fn contains(&self, point: Point) -> bool {
        self.left() <= point.x
            && point.x < self.right()
            && self.top() <= point.y
            && point.y < self.bottom()
    }

    /// Returns this rectangle moved by `(dx, dy)`.
    pub fn translate(&self, dx: f32, dy: f32) -> Rect {
        Rect::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// The four edges, in the order left, bottom, top, right.
    pub fn edges(&self) -> [Segment; 4] {
        [
            Segment::new(self.top_left(), self.bottom_left()),
            Segment::new(self.bottom_left(), self.bottom_right()),
            Segment::new(self.top_left(), self.top_right()),
            Segment::new(self.top_right(), self.bottom_right()),
        ]
    }
}

/// A closed line segment.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start: Point,
    pub end: Point,
}

impl Segment {
    pub const fn new(start: Point, end: Point) -> Segment {
        Segment { start, end }
    }

    /// Returns the point where both segments cross, if any.
    ///
    /// Parallel segments, including overlapping collinear ones,
    /// never intersect.
    ///
    /// # Examples
    /// ```
    /// use neuroflap::geometry::{Point, Segment};
    ///
    /// let ray = Segment::new(Point::new(0.0, 0.0), Point::new(10.0, 0.0));
    /// let wall = Segment::new(Point::new(4.0, -5.0), Point::new(4.0, 5.0));
    /// assert_eq!(ray.intersection(&wall), Some(Point::new(4.0, 0.0)));
    ///
    /// let short_wall = Segment::new(Point::new(4.0, 1.0), Point::new(4.0, 5.0));
    /// assert_eq!(ray.intersection(&short_wall), None);
    /// ```
    pub fn intersection(&self, other: &Segment) -> Option<Point> {
        let r = (self.end.x - self.start.x, self.end.y - self.start.y);
        let s = (other.end.x - other.start.x, other.end.y - other.start.y);
        let denominator = r.0 * s.1 - r.1 * s.0;
        if denominator == 0.0 {
            return None;
        }
        let q = (other.start.x - self.start.x, other.start.y - self.start.y);
        let t = (q.0 * s.1 - q.1 * s.0) / denominator;
        let u = (q.0 * r.1 - q.1 * r.0) / denominator;
        if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
            Some(Point::new(self.start.x + t * r.0, self.start.y + t * r.1))
        } else {
            None
        }
    }
}
