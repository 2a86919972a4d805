//! Spatial indexing for fast position-to-region lookups
//!
//! This module is only available with the `spatial-index` feature.

use glam::DVec2;
use kiddo::immutable::float::kdtree::ImmutableKdTree;
use kiddo::SquaredEuclidean;

/// KD-tree over region seed points
///
/// The region whose seed point is nearest to a position is the Voronoi region
/// containing it, so a nearest-neighbor query answers "which region was
/// clicked" in O(log n).
#[derive(Clone)]
pub struct SpatialIndex {
    tree: Option<ImmutableKdTree<f64, usize, 2, 32>>,
    len: usize,
}

impl SpatialIndex {
    /// Build the index from seed points, in region ID order
    ///
    /// # Example
    ///
    /// ```
    /// use dual_mesh_mapgen::*;
    ///
    /// let points = vec![
    ///     DVec2::new(0.0, 0.0),
    ///     DVec2::new(10.0, 0.0),
    ///     DVec2::new(0.0, 10.0),
    /// ];
    ///
    /// let index = SpatialIndex::new(&points);
    /// assert_eq!(index.find_nearest(DVec2::new(9.0, 1.0)), Some(1));
    /// ```
    pub fn new(points: &[DVec2]) -> Self {
        let entries: Vec<[f64; 2]> = points.iter().map(|p| [p.x, p.y]).collect();

        Self {
            tree: (!entries.is_empty()).then(|| ImmutableKdTree::new_from_slice(&entries)),
            len: points.len(),
        }
    }

    /// Number of indexed points
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Is the index empty?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Region ID of the seed point nearest to `position`
    ///
    /// Returns `None` for an empty index.
    pub fn find_nearest(&self, position: DVec2) -> Option<usize> {
        let tree = self.tree.as_ref()?;
        let result = tree.nearest_one::<SquaredEuclidean>(&[position.x, position.y]);
        Some(result.item as usize)
    }
}
