//! Deterministic dual-mesh generation for 2D map editors
//!
//! Turns a seed into a blue-noise point set, its Delaunay triangulation and
//! the Voronoi dual mesh (one region per point), suitable as the base
//! geometry of a procedural map.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use dual_mesh_mapgen::*;
//!
//! // Generate a map
//! let config = MapConfigBuilder::new(42)
//!     .dimensions(1000.0, 1000.0).unwrap()
//!     .density(MeshDensity::Medium)
//!     .build().unwrap();
//!
//! let map = MapMesh::generate(config).unwrap();
//!
//! // Walk the regions
//! for region in map.regions() {
//!     println!("region {} has {} neighbors", region.id, region.neighbor_count());
//! }
//! ```
//!
//! # Features
//!
//! - `spatial-index` (default): Enables O(log n) position-to-region lookups using KD-tree
//! - `serde`: Enables serialization support for configuration and regions

// Modules
pub mod error;
pub mod config;
pub mod region;
pub mod generation;
pub mod map;

#[cfg(feature = "spatial-index")]
pub mod spatial;

// Re-export core types for convenience
pub use error::{MeshError, Result, Stage};
pub use config::{MapConfig, MapConfigBuilder, MeshDensity};
pub use region::Region;
pub use map::MapMesh;
pub use generation::{
    triangulate, DualEdge, DualMesh, Lcg, PoissonDiskSampler, SequenceGenerator, Triangulation,
};

#[cfg(feature = "spatial-index")]
pub use spatial::SpatialIndex;

// Re-export glam::DVec2 for convenience
pub use glam::DVec2;
