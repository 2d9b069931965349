//! # Frame-space geometry

use nalgebra as na;

/// Axis-aligned rectangle in pixel coordinates.
///
/// Edges are inclusive. A rectangle with zero width and height covers exactly one pixel position.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
pub struct Rect {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl Rect {
    pub fn new(x: usize, y: usize, width: usize, height: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a rectangle spanning from `min` to `max` corners.
    pub fn from_corners(min: (usize, usize), max: (usize, usize)) -> Self {
        Self::new(min.0, min.1, max.0 - min.0, max.1 - min.1)
    }

    /// Right edge of the rectangle.
    pub fn right(&self) -> usize {
        self.x + self.width
    }

    /// Bottom edge of the rectangle.
    pub fn bottom(&self) -> usize {
        self.y + self.height
    }

    /// Check whether two rectangles overlap.
    ///
    /// Rectangles that only touch at an edge or a corner are overlapping.
    ///
    /// # Examples
    ///
    /// ```
    /// use zonewatch::geometry::Rect;
    ///
    /// let cell = Rect::new(50, 50, 50, 50);
    ///
    /// assert!(cell.intersects(&Rect::new(60, 60, 5, 5)));
    /// assert!(cell.intersects(&Rect::new(45, 45, 5, 5)));
    /// assert!(!cell.intersects(&Rect::new(5, 5, 5, 5)));
    /// ```
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x <= other.right()
            && other.x <= self.right()
            && self.y <= other.bottom()
            && other.y <= self.bottom()
    }

    fn min_max(&self) -> (na::Point2<f64>, na::Point2<f64>) {
        (
            na::Point2::new(self.x as f64, self.y as f64),
            na::Point2::new(self.right() as f64, self.bottom() as f64),
        )
    }
}

/// Line segment in frame coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
pub struct LineSegment {
    pub start: na::Point2<f64>,
    pub end: na::Point2<f64>,
}

impl LineSegment {
    pub fn new(start: na::Point2<f64>, end: na::Point2<f64>) -> Self {
        Self { start, end }
    }

    /// Check whether the segment crosses or lies within a rectangle.
    ///
    /// This clips the segment against every edge of the rectangle (Liang-Barsky). Touching the
    /// border counts as an intersection.
    ///
    /// # Arguments
    ///
    /// * `rect` - rectangle to test against.
    pub fn intersects(&self, rect: &Rect) -> bool {
        let (min, max) = rect.min_max();
        let d = self.end - self.start;

        let (mut t0, mut t1) = (0f64, 1f64);

        let edges = [
            (-d.x, self.start.x - min.x),
            (d.x, max.x - self.start.x),
            (-d.y, self.start.y - min.y),
            (d.y, max.y - self.start.y),
        ];

        for (p, q) in edges {
            if p == 0.0 {
                // Parallel to this edge, and fully outside of it.
                if q < 0.0 {
                    return false;
                }
            } else {
                let r = q / p;
                if p < 0.0 {
                    if r > t1 {
                        return false;
                    }
                    t0 = t0.max(r);
                } else {
                    if r < t0 {
                        return false;
                    }
                    t1 = t1.min(r);
                }
            }
        }

        t0 <= t1
    }
}
