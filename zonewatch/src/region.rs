//! # Watch regions

use crate::error::{Error, Result};
use crate::geometry::{LineSegment, Rect};

/// Grid of equally sized cells laid over the frame.
///
/// Cell `(column, row)` spans `(column * cell_width, row * cell_height)` with a size of
/// `(cell_width, cell_height)`, where the cell size is the frame size divided by the number of
/// columns and rows.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
pub struct GridRegion {
    columns: usize,
    rows: usize,
    /// Column-major activity flags, `cells[column * rows + row]`.
    cells: Vec<bool>,
}

impl GridRegion {
    /// Create a grid with every cell inactive.
    pub fn new(columns: usize, rows: usize) -> Self {
        Self {
            columns,
            rows,
            cells: vec![false; columns * rows],
        }
    }

    /// Create a grid from column-major activity flags.
    pub fn from_cells(columns: usize, rows: usize, cells: Vec<bool>) -> Result<Self> {
        let grid = Self {
            columns,
            rows,
            cells,
        };
        grid.validate()?;
        Ok(grid)
    }

    /// Check that the grid has cells and that every cell has a flag.
    pub fn validate(&self) -> Result<()> {
        if self.columns == 0 || self.rows == 0 {
            return Err(Error::InvalidSettings(format!(
                "grid of {}x{} cells is empty",
                self.columns, self.rows
            )));
        }

        if self.cells.len() != self.columns * self.rows {
            return Err(Error::InvalidSettings(format!(
                "grid of {}x{} cells has {} flags",
                self.columns,
                self.rows,
                self.cells.len()
            )));
        }

        Ok(())
    }

    /// Get width and height of the grid, in cells.
    pub fn dim(&self) -> (usize, usize) {
        (self.columns, self.rows)
    }

    /// Mark a cell as active or inactive.
    ///
    /// # Panics
    ///
    /// If the cell is outside the grid.
    pub fn set(&mut self, column: usize, row: usize, active: bool) {
        assert!(column < self.columns && row < self.rows);
        self.cells[column * self.rows + row] = active;
    }

    /// Builder variant of [`set`](Self::set) that activates a cell.
    pub fn with_active(mut self, column: usize, row: usize) -> Self {
        self.set(column, row, true);
        self
    }

    pub fn is_active(&self, column: usize, row: usize) -> bool {
        column < self.columns && row < self.rows && self.cells[column * self.rows + row]
    }

    /// Rectangles of all active cells, in frame coordinates.
    ///
    /// # Arguments
    ///
    /// * `width` - width of the frame.
    /// * `height` - height of the frame.
    pub fn active_cells(&self, width: usize, height: usize) -> impl Iterator<Item = Rect> + '_ {
        let cell_width = width / self.columns.max(1);
        let cell_height = height / self.rows.max(1);

        (0..self.columns)
            .flat_map(move |column| (0..self.rows).map(move |row| (column, row)))
            .filter(move |&(column, row)| self.is_active(column, row))
            .map(move |(column, row)| {
                Rect::new(
                    column * cell_width,
                    row * cell_height,
                    cell_width,
                    cell_height,
                )
            })
    }
}

/// Area of the frame that is being watched for motion.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
pub enum WatchRegion {
    /// Active cells of a grid.
    Grid(GridRegion),
    /// Line segments in frame coordinates.
    Lines(Vec<LineSegment>),
}

impl Default for WatchRegion {
    fn default() -> Self {
        Self::Grid(GridRegion::new(1, 1))
    }
}

impl WatchRegion {
    /// Count how many parts of the region are hit by motion.
    ///
    /// Every active grid cell, or every line, that intersects at least one of the rectangles is
    /// counted once. Each of them constitutes a separate alert.
    ///
    /// # Arguments
    ///
    /// * `rects` - bounding rectangles of detected motion.
    /// * `width` - width of the frame.
    /// * `height` - height of the frame.
    ///
    /// # Examples
    ///
    /// ```
    /// use zonewatch::geometry::Rect;
    /// use zonewatch::region::{GridRegion, WatchRegion};
    ///
    /// let region = WatchRegion::Grid(GridRegion::new(2, 2).with_active(1, 1));
    ///
    /// assert_eq!(region.matches(&[Rect::new(60, 60, 5, 5)], 100, 100), 1);
    /// assert_eq!(region.matches(&[Rect::new(5, 5, 5, 5)], 100, 100), 0);
    /// ```
    pub fn matches(&self, rects: &[Rect], width: usize, height: usize) -> usize {
        match self {
            Self::Grid(grid) => grid
                .active_cells(width, height)
                .filter(|cell| rects.iter().any(|r| cell.intersects(r)))
                .count(),
            Self::Lines(lines) => lines
                .iter()
                .filter(|line| rects.iter().any(|r| line.intersects(r)))
                .count(),
        }
    }

    /// Check whether any part of the region is hit by motion.
    pub fn is_match(&self, rects: &[Rect], width: usize, height: usize) -> bool {
        self.matches(rects, width, height) > 0
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Grid(grid) => grid.validate(),
            Self::Lines(_) => Ok(()),
        }
    }
}
