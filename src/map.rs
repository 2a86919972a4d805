//! MapMesh main structure

use glam::DVec2;
use std::collections::{HashSet, VecDeque};
use std::time::Instant;

use crate::config::MapConfig;
use crate::error::{MeshError, Result, Stage};
use crate::generation::{sample_points, triangulate, DualMesh};
use crate::region::Region;

#[cfg(feature = "spatial-index")]
use crate::spatial::SpatialIndex;

/// A generated map mesh: the point set and its Voronoi dual
///
/// Immutable once generated. The same configuration always produces the same
/// mesh, so a map can be stored as its `MapConfig` alone.
///
/// # Examples
///
/// ```
/// use dual_mesh_mapgen::*;
///
/// let config = MapConfigBuilder::new(42)
///     .dimensions(200.0, 200.0)
///     .unwrap()
///     .build()
///     .unwrap();
///
/// let map = MapMesh::generate(config).unwrap();
/// println!("Generated {} regions", map.region_count());
///
/// if let Some(region) = map.region(0) {
///     println!("Region 0 has {} neighbors", region.neighbor_count());
/// }
/// ```
#[derive(Clone)]
pub struct MapMesh {
    /// Configuration used to generate this map
    config: MapConfig,

    /// Dual mesh over the sampled points
    mesh: DualMesh,

    /// Spatial index for fast position-to-region lookups (optional, requires spatial-index feature)
    #[cfg(feature = "spatial-index")]
    spatial_index: SpatialIndex,
}

impl MapMesh {
    /// Generate a map from a configuration
    ///
    /// Runs sampling, triangulation and dual graph construction with a fresh
    /// sequence generator seeded from `config.seed`.
    ///
    /// # Errors
    ///
    /// - `InvalidParameter` if the configuration is out of range
    /// - `DegenerateInput` if the sampled points cannot be triangulated (for
    ///   example a spacing so large that fewer than three points fit)
    /// - `StructuralInconsistency` on an internal defect
    ///
    /// # Example
    ///
    /// ```
    /// use dual_mesh_mapgen::*;
    ///
    /// let config = MapConfigBuilder::new(12345)
    ///     .dimensions(300.0, 150.0)
    ///     .unwrap()
    ///     .density(MeshDensity::Coarse)
    ///     .build()
    ///     .unwrap();
    ///
    /// let map = MapMesh::generate(config).unwrap();
    /// assert!(map.region_count() > 0);
    /// ```
    pub fn generate(config: MapConfig) -> Result<Self> {
        Self::generate_with_checkpoint(config, |_| true)
    }

    /// Generate a map, asking `checkpoint` before each stage whether to go on
    ///
    /// Returning `false` aborts the run with `MeshError::Cancelled` naming the
    /// stage that was about to start. A stage that has started always runs to
    /// completion.
    ///
    /// # Example
    ///
    /// ```
    /// use dual_mesh_mapgen::*;
    ///
    /// let config = MapConfigBuilder::new(1).build().unwrap();
    /// let result =
    ///     MapMesh::generate_with_checkpoint(config, |stage| stage != Stage::Triangulation);
    ///
    /// assert!(matches!(result, Err(MeshError::Cancelled { stage: Stage::Triangulation })));
    /// ```
    pub fn generate_with_checkpoint<F>(config: MapConfig, mut checkpoint: F) -> Result<Self>
    where
        F: FnMut(Stage) -> bool,
    {
        let start = Instant::now();

        let mut enter = |stage: Stage| {
            if checkpoint(stage) {
                Ok(())
            } else {
                tracing::warn!(
                    target: "dual_mesh_mapgen::generation",
                    seed = config.seed,
                    %stage,
                    "mapgen.run.cancelled"
                );
                Err(MeshError::Cancelled { stage })
            }
        };

        enter(Stage::Sampling)?;
        let points = sample_points(&config)?;

        enter(Stage::Triangulation)?;
        let triangulation = triangulate(&points)?;

        enter(Stage::DualGraph)?;
        let mesh = DualMesh::build(points, triangulation)?;

        // Build spatial index (requires spatial-index feature)
        #[cfg(feature = "spatial-index")]
        let spatial_index = SpatialIndex::new(mesh.points());

        tracing::info!(
            target: "dual_mesh_mapgen::generation",
            seed = config.seed,
            width = config.width,
            height = config.height,
            spacing = config.spacing(),
            regions = mesh.region_count(),
            triangles = mesh.triangle_count(),
            elapsed = ?start.elapsed(),
            "mapgen.run.done"
        );

        Ok(Self {
            config,
            mesh,
            #[cfg(feature = "spatial-index")]
            spatial_index,
        })
    }

    /// Get the configuration used to generate this map
    #[inline]
    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    /// Sampled points, in acceptance order (index = region ID)
    #[inline]
    pub fn points(&self) -> &[DVec2] {
        self.mesh.points()
    }

    /// The underlying dual mesh, for side and triangle queries
    #[inline]
    pub fn mesh(&self) -> &DualMesh {
        &self.mesh
    }

    /// Get the number of regions on this map
    #[inline]
    pub fn region_count(&self) -> usize {
        self.mesh.region_count()
    }

    /// Get a region by ID
    ///
    /// Returns `None` if the region ID is out of bounds.
    #[inline]
    pub fn region(&self, id: usize) -> Option<&Region> {
        self.mesh.region(id)
    }

    /// Get all regions as a slice
    #[inline]
    pub fn regions(&self) -> &[Region] {
        self.mesh.regions()
    }

    /// Get neighbor IDs for a region
    ///
    /// Returns an empty slice if the region ID is invalid.
    ///
    /// # Example
    ///
    /// ```
    /// # use dual_mesh_mapgen::*;
    /// # let config = MapConfigBuilder::new(3).dimensions(200.0, 200.0).unwrap().build().unwrap();
    /// # let map = MapMesh::generate(config).unwrap();
    /// let neighbors = map.neighbors(0);
    /// println!("Region 0 has {} neighbors", neighbors.len());
    /// ```
    #[inline]
    pub fn neighbors(&self, region_id: usize) -> &[usize] {
        self.mesh.region_neighbors(region_id)
    }

    /// Find the region containing a position (requires spatial-index feature)
    ///
    /// The region whose seed point is nearest to `position` is returned, so
    /// positions outside the map rectangle resolve to a hull region.
    ///
    /// # Example
    ///
    /// ```
    /// # use dual_mesh_mapgen::*;
    /// # #[cfg(feature = "spatial-index")]
    /// # {
    /// # let config = MapConfigBuilder::new(3).dimensions(200.0, 200.0).unwrap().build().unwrap();
    /// # let map = MapMesh::generate(config).unwrap();
    /// let region_id = map.find_region_at(DVec2::new(100.0, 100.0));
    /// println!("Position is in region {}", region_id);
    /// # }
    /// ```
    #[cfg(feature = "spatial-index")]
    pub fn find_region_at(&self, position: DVec2) -> usize {
        // A generated mesh has at least three points
        self.spatial_index.find_nearest(position).unwrap_or(0)
    }

    /// Find regions within a given hop count from a center region (BFS)
    ///
    /// # Returns
    ///
    /// Region IDs in breadth-first order, starting with the center region.
    /// Returns an empty vec if `center_id` is invalid.
    pub fn find_regions_within_hops(&self, center_id: usize, hops: usize) -> Vec<usize> {
        if center_id >= self.region_count() {
            return vec![];
        }

        let mut visited = HashSet::new();
        let mut order = vec![center_id];
        let mut queue = VecDeque::from([(center_id, 0usize)]);
        visited.insert(center_id);

        while let Some((region_id, depth)) = queue.pop_front() {
            if depth == hops {
                continue;
            }
            for &neighbor in self.neighbors(region_id) {
                if visited.insert(neighbor) {
                    order.push(neighbor);
                    queue.push_back((neighbor, depth + 1));
                }
            }
        }

        order
    }
}
