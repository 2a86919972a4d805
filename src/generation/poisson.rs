//! Blue-noise point sampling (Poisson-disk)
//!
//! Produces a well-spaced point set in a rectangle: every pair of accepted
//! points is at least `radius` apart.
//!
//! # Algorithm
//!
//! Dart throwing with an active list (Bridson):
//! - A background grid with cell size `radius / √2` holds at most one point
//!   per cell, so a neighbour query only inspects a 5x5 block of cells
//! - One random initial point seeds the active list
//! - A random active point proposes up to `max_tries` candidates in the
//!   annulus `[radius, 2 * radius]`; the first candidate with no point closer
//!   than `radius` is accepted and becomes active
//! - An active point whose candidates all fail is retired
//!
//! All draws come from the injected [`SequenceGenerator`], in a fixed order,
//! so the output (including its order) is a pure function of the generator's
//! seed and the sampler parameters.

use glam::DVec2;
use std::f64::consts::{SQRT_2, TAU};
use std::time::Instant;

use super::lcg::SequenceGenerator;
use crate::config::check_positive;
use crate::error::{MeshError, Result};

/// Largest background grid a sampler may allocate, in cells
pub const MAX_GRID_CELLS: usize = 1 << 24;

/// Largest point count a sampler may plan for (see [`PoissonDiskSampler::expected_point_count`])
pub const MAX_POINTS: usize = 1 << 22;

/// Poisson-disk sampler over `[0, width) x [0, height)`
///
/// # Example
///
/// ```rust
/// use dual_mesh_mapgen::generation::{Lcg, PoissonDiskSampler};
///
/// let sampler = PoissonDiskSampler::new(100.0, 100.0, 10.0, 30).unwrap();
/// let points = sampler.sample(&mut Lcg::new(42));
/// assert!(points.len() > 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoissonDiskSampler {
    width: f64,
    height: f64,
    radius: f64,
    max_tries: u32,
}

impl PoissonDiskSampler {
    /// Create a sampler
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if width, height or radius is not a positive
    /// finite number, if `max_tries` is zero, or if the radius is so small
    /// relative to the rectangle that the background grid would exceed
    /// [`MAX_GRID_CELLS`] or the point bound would exceed [`MAX_POINTS`].
    pub fn new(width: f64, height: f64, radius: f64, max_tries: u32) -> Result<Self> {
        check_positive("width", width)?;
        check_positive("height", height)?;
        check_positive("radius", radius)?;
        if max_tries == 0 {
            return Err(MeshError::InvalidParameter(
                "max_tries must be at least 1".to_string(),
            ));
        }

        let sampler = Self {
            width,
            height,
            radius,
            max_tries,
        };

        let cells = grid_dimensions(width, height, radius / SQRT_2)
            .and_then(|(columns, rows)| columns.checked_mul(rows));
        if !matches!(cells, Some(cells) if cells <= MAX_GRID_CELLS) {
            return Err(MeshError::InvalidParameter(format!(
                "radius {} is too small for a {} x {} rectangle (grid exceeds {} cells)",
                radius, width, height, MAX_GRID_CELLS
            )));
        }
        if sampler.point_bound() > MAX_POINTS as f64 {
            return Err(MeshError::InvalidParameter(format!(
                "radius {} is too small for a {} x {} rectangle (more than {} points)",
                radius, width, height, MAX_POINTS
            )));
        }

        Ok(sampler)
    }

    /// Width of the sampled rectangle
    #[inline]
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Height of the sampled rectangle
    #[inline]
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Minimum separation between accepted points
    #[inline]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Candidates tried per active point before it is retired
    #[inline]
    pub fn max_tries(&self) -> u32 {
        self.max_tries
    }

    /// Upper bound on the number of accepted points
    ///
    /// Disks of radius `radius / 2` around accepted points are disjoint and lie
    /// in the rectangle grown by `radius / 2` on each side.
    ///
    /// Never exceeds [`MAX_POINTS`] for a sampler built by [`PoissonDiskSampler::new`].
    pub fn expected_point_count(&self) -> usize {
        self.point_bound() as usize
    }

    fn point_bound(&self) -> f64 {
        let grown = (self.width + self.radius) * (self.height + self.radius);
        let disk = std::f64::consts::PI * self.radius * self.radius / 4.0;
        (grown / disk).ceil()
    }

    /// Check whether a point lies in the half-open rectangle
    #[inline]
    pub fn contains(&self, point: DVec2) -> bool {
        point.x >= 0.0 && point.x < self.width && point.y >= 0.0 && point.y < self.height
    }

    /// Generate the point set, in acceptance order
    ///
    /// When `radius` is at least the longer side of the rectangle the result is
    /// the initial point alone.
    pub fn sample<R>(&self, rng: &mut R) -> Vec<DVec2>
    where
        R: SequenceGenerator + ?Sized,
    {
        let start = Instant::now();
        let mut grid = BackgroundGrid::new(self.width, self.height, self.radius / SQRT_2);
        let mut points = Vec::with_capacity(self.expected_point_count());

        // A draw of exactly 1.0 lands on the excluded upper bound; draw again.
        let first = loop {
            let candidate = DVec2::new(rng.next() * self.width, rng.next() * self.height);
            if self.contains(candidate) {
                break candidate;
            }
        };
        grid.insert(first, 0);
        points.push(first);

        if self.radius >= self.width.max(self.height) {
            tracing::debug!(
                target: "dual_mesh_mapgen::generation",
                radius = self.radius,
                "poisson.sample.single_point"
            );
            return points;
        }

        let radius_squared = self.radius * self.radius;
        let mut active = vec![0usize];
        let mut rejected: u64 = 0;

        while !active.is_empty() {
            let slot = rng.next_index(active.len());
            let origin = points[active[slot]];
            let mut accepted = false;

            for _ in 0..self.max_tries {
                let angle = rng.next() * TAU;
                let distance = self.radius * (1.0 + rng.next());
                let candidate = origin + DVec2::new(angle.cos(), angle.sin()) * distance;

                if self.contains(candidate)
                    && !grid.has_point_within(candidate, radius_squared, &points)
                {
                    let index = points.len();
                    grid.insert(candidate, index);
                    points.push(candidate);
                    active.push(index);
                    accepted = true;
                    break;
                }
                rejected += 1;
            }

            if !accepted {
                active.swap_remove(slot);
            }
        }

        tracing::debug!(
            target: "dual_mesh_mapgen::generation",
            points = points.len(),
            rejected,
            elapsed = ?start.elapsed(),
            "poisson.sample.done"
        );

        points
    }
}

/// Columns and rows of a grid with the given cell size, `None` if unrepresentable
fn grid_dimensions(width: f64, height: f64, cell_size: f64) -> Option<(usize, usize)> {
    let dimension = |extent: f64| {
        let count = (extent / cell_size).ceil();
        (count.is_finite() && count < usize::MAX as f64).then(|| (count as usize).max(1))
    };
    Some((dimension(width)?, dimension(height)?))
}

/// Acceleration grid: one optional point index per cell
struct BackgroundGrid {
    cell_size: f64,
    columns: usize,
    rows: usize,
    cells: Vec<Option<usize>>,
}

impl BackgroundGrid {
    fn new(width: f64, height: f64, cell_size: f64) -> Self {
        // Dimensions are checked against MAX_GRID_CELLS when the sampler is built
        let (columns, rows) = grid_dimensions(width, height, cell_size).unwrap_or((1, 1));
        Self {
            cell_size,
            columns,
            rows,
            cells: vec![None; columns * rows],
        }
    }

    #[inline]
    fn cell_of(&self, point: DVec2) -> (usize, usize) {
        let column = ((point.x / self.cell_size) as usize).min(self.columns - 1);
        let row = ((point.y / self.cell_size) as usize).min(self.rows - 1);
        (column, row)
    }

    fn insert(&mut self, point: DVec2, index: usize) {
        let (column, row) = self.cell_of(point);
        self.cells[row * self.columns + column] = Some(index);
    }

    /// Any stored point strictly closer than `sqrt(radius_squared)`?
    ///
    /// The radius spans `√2` cells, so the 5x5 block around the cell covers it.
    fn has_point_within(&self, point: DVec2, radius_squared: f64, points: &[DVec2]) -> bool {
        let (column, row) = self.cell_of(point);
        let column_range = column.saturating_sub(2)..=(column + 2).min(self.columns - 1);
        let row_range = row.saturating_sub(2)..=(row + 2).min(self.rows - 1);

        for r in row_range {
            for c in column_range.clone() {
                if let Some(index) = self.cells[r * self.columns + c] {
                    if point.distance_squared(points[index]) < radius_squared {
                        return true;
                    }
                }
            }
        }
        false
    }
}
