//! # Changed pixel clustering
//!
//! Changed pixels are not grouped by their `x` and `y` coordinates. Instead, every pixel is keyed
//! by its distances to the top-left and top-right corners of the frame, and clusters accept
//! pixels that fall within a window over these two distances.
//!
//! Clustering is greedy and done in a single pass. The result depends on the order of the input
//! pixels.

use crate::geometry::Rect;
use log::*;
use nalgebra as na;

/// Default acceptance radius around a point's distance metrics.
pub const PIXELS_RADIUS: f64 = 10.0;

/// Corner distances of a single pixel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointMetrics {
    /// Distance to the top-left corner `(0, 0)`.
    pub dist_zero: f64,
    /// Distance to the top-right corner `(width, 0)`.
    pub dist_width: f64,
}

impl PointMetrics {
    /// Compute distance metrics of a point.
    ///
    /// # Arguments
    ///
    /// * `x` - horizontal pixel coordinate.
    /// * `y` - vertical pixel coordinate.
    /// * `width` - width of the frame.
    ///
    /// # Examples
    ///
    /// ```
    /// # use assert_approx_eq::assert_approx_eq;
    /// use zonewatch::cluster::PointMetrics;
    ///
    /// let metrics = PointMetrics::new(3, 4, 10);
    ///
    /// assert_approx_eq!(metrics.dist_zero, 5.0);
    /// assert_approx_eq!(metrics.dist_width, 65f64.sqrt());
    /// ```
    pub fn new(x: usize, y: usize, width: usize) -> Self {
        let p = na::Point2::new(x as f64, y as f64);

        Self {
            dist_zero: na::distance(&na::Point2::origin(), &p),
            dist_width: na::distance(&na::Point2::new(width as f64, 0.0), &p),
        }
    }

    /// Compute distance metrics of a flat pixel index.
    pub fn from_index(idx: usize, width: usize) -> ((usize, usize), Self) {
        let (x, y) = (idx % width, idx / width);
        ((x, y), Self::new(x, y, width))
    }
}

/// Inclusive range of a single distance metric.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
}

impl Bounds {
    fn around(value: f64, radius: f64) -> Self {
        Self {
            min: value - radius,
            max: value + radius,
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Move one of the bounds to `radius` away from an accepted value.
    ///
    /// Either the upper bound is raised, or, if it does not need raising, the lower bound is set
    /// to `value - radius`. Only one of the two bounds is touched.
    fn update(&mut self, value: f64, radius: f64) {
        if value + radius > self.max {
            self.max = value + radius;
        } else {
            self.min = value - radius;
        }
    }
}

/// Window in distance metric space that a cluster accepts new points in.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AcceptanceWindow {
    /// Range of accepted distances to the top-left corner.
    pub zero: Bounds,
    /// Range of accepted distances to the top-right corner.
    pub width: Bounds,
}

impl AcceptanceWindow {
    pub fn contains(&self, metrics: PointMetrics) -> bool {
        self.zero.contains(metrics.dist_zero) && self.width.contains(metrics.dist_width)
    }
}

/// Group of changed pixels sharing an acceptance window.
#[derive(Clone, Debug)]
pub struct Cluster {
    points: Vec<(usize, usize)>,
    window: AcceptanceWindow,
    radius: f64,
}

impl Cluster {
    /// Create a new cluster out of a single point.
    ///
    /// # Arguments
    ///
    /// * `point` - `(x, y)` coordinates of the point.
    /// * `metrics` - distance metrics of the point.
    /// * `radius` - how far around accepted metrics the window extends.
    pub fn new(point: (usize, usize), metrics: PointMetrics, radius: f64) -> Self {
        Self {
            points: vec![point],
            window: AcceptanceWindow {
                zero: Bounds::around(metrics.dist_zero, radius),
                width: Bounds::around(metrics.dist_width, radius),
            },
            radius,
        }
    }

    /// Check whether a point with given metrics would be accepted.
    pub fn accepts(&self, metrics: PointMetrics) -> bool {
        self.window.contains(metrics)
    }

    /// Add a point to the cluster and update the acceptance window.
    ///
    /// Each of the two axes is updated independently.
    pub fn add_point(&mut self, point: (usize, usize), metrics: PointMetrics) {
        self.points.push(point);
        self.window.zero.update(metrics.dist_zero, self.radius);
        self.window.width.update(metrics.dist_width, self.radius);
    }

    pub fn points(&self) -> &[(usize, usize)] {
        &self.points
    }

    pub fn window(&self) -> &AcceptanceWindow {
        &self.window
    }

    /// Tight axis-aligned bounding rectangle over all points of the cluster.
    pub fn bounding_rect(&self) -> Rect {
        let (min, max) = self.points.iter().skip(1).fold(
            (self.points[0], self.points[0]),
            |((min_x, min_y), (max_x, max_y)), &(x, y)| {
                (
                    (min_x.min(x), min_y.min(y)),
                    (max_x.max(x), max_y.max(y)),
                )
            },
        );

        Rect::from_corners(min, max)
    }
}

/// Greedy single-pass clusterer over changed pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShapeClusterer {
    radius: f64,
}

impl Default for ShapeClusterer {
    fn default() -> Self {
        Self {
            radius: PIXELS_RADIUS,
        }
    }
}

impl ShapeClusterer {
    pub fn radius(self, radius: f64) -> Self {
        Self { radius }
    }

    /// Group changed pixels into clusters.
    ///
    /// Every pixel joins the first cluster, in creation order, that accepts it. If there is no
    /// such cluster, a new one is started.
    ///
    /// # Arguments
    ///
    /// * `changed` - flat indices of changed pixels, in scan order.
    /// * `width` - width of the frame the indices refer to.
    pub fn cluster(&self, changed: &[usize], width: usize) -> Vec<Cluster> {
        let mut clusters: Vec<Cluster> = vec![];

        for &idx in changed {
            let (point, metrics) = PointMetrics::from_index(idx, width);

            match clusters.iter_mut().find(|c| c.accepts(metrics)) {
                Some(cluster) => cluster.add_point(point, metrics),
                None => clusters.push(Cluster::new(point, metrics, self.radius)),
            }
        }

        trace!("{} changed pixels in {} clusters", changed.len(), clusters.len());

        clusters
    }

    /// Cluster changed pixels and reduce every cluster to its bounding rectangle.
    pub fn rectangles(&self, changed: &[usize], width: usize) -> Vec<Rect> {
        self.cluster(changed, width)
            .iter()
            .map(Cluster::bounding_rect)
            .collect()
    }
}
