//! Dual Mesh Region Structure
//!
//! Represents the Voronoi region of one input point with its polygon and neighbors.

use glam::DVec2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The Voronoi region of a single input point
///
/// Each region has:
/// - A unique ID equal to the index of its seed point
/// - The seed point itself (`center`)
/// - An ordered polygon of triangle circumcentres (`vertices`)
/// - Neighbor connectivity through shared triangulation edges
///
/// # Open regions
///
/// Regions of points on the convex hull are open: the polygon runs from the
/// circumcentre of one hull triangle to the other and is not closed. Callers
/// that need closed cells must clip against the map rectangle themselves.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    /// Unique identifier (index of the seed point in the point set)
    pub id: usize,

    /// Seed point of the region
    pub center: DVec2,

    /// Circumcentres of the incident triangles, counter-clockwise around `center`
    ///
    /// One vertex per incident triangle.
    pub vertices: Vec<DVec2>,

    /// IDs of adjacent regions, counter-clockwise around `center`
    ///
    /// Two regions are neighbors when their seed points share a triangulation edge.
    /// Open regions have one more neighbor than vertices.
    pub neighbors: Vec<usize>,

    /// Whether the polygon is closed (false for hull regions)
    pub closed: bool,
}

impl Region {
    /// Create a new region
    ///
    /// This is typically called by the dual graph builder, not by user code.
    pub fn new(
        id: usize,
        center: DVec2,
        vertices: Vec<DVec2>,
        neighbors: Vec<usize>,
        closed: bool,
    ) -> Self {
        Self {
            id,
            center,
            vertices,
            neighbors,
            closed,
        }
    }

    /// Get the number of neighboring regions
    #[inline]
    pub fn neighbor_count(&self) -> usize {
        self.neighbors.len()
    }

    /// Check if this region is a neighbor of another region
    #[inline]
    pub fn is_neighbor_of(&self, other_region_id: usize) -> bool {
        self.neighbors.contains(&other_region_id)
    }

    /// Get the vertex count (polygon complexity)
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Is this region on the convex hull (open polygon)?
    #[inline]
    pub fn is_hull(&self) -> bool {
        !self.closed
    }

    /// Area of the region polygon (shoelace formula)
    ///
    /// Returns 0.0 for open regions, whose area is unbounded until clipped.
    pub fn area(&self) -> f64 {
        if !self.closed || self.vertices.len() < 3 {
            return 0.0;
        }

        let mut twice_area = 0.0;
        for i in 0..self.vertices.len() {
            let v1 = self.vertices[i];
            let v2 = self.vertices[(i + 1) % self.vertices.len()];
            twice_area += v1.perp_dot(v2);
        }

        twice_area * 0.5
    }

    /// Euclidean distance between the seed points of two regions
    pub fn distance_to(&self, other: &Region) -> f64 {
        self.center.distance(other.center)
    }
}
