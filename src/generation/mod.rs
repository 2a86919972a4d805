//! Core dual mesh generation pipeline
//!
//! Seeded sequence generator → Poisson-disk point set → Delaunay
//! triangulation → Voronoi dual mesh. Each stage only reads the output of the
//! previous one.

mod dual;
mod lcg;
mod poisson;

pub mod delaunay;

pub use delaunay::{triangulate, Triangulation};
pub use dual::{DualEdge, DualMesh};
pub use lcg::{Lcg, SequenceGenerator};
pub use poisson::{PoissonDiskSampler, MAX_GRID_CELLS, MAX_POINTS};

use glam::DVec2;

use crate::config::MapConfig;
use crate::error::Result;

/// Sample the point set for a configuration with a fresh generator
///
/// The generator is seeded from `config.seed` and dropped afterwards, so
/// the result depends on the configuration alone.
pub fn sample_points(config: &MapConfig) -> Result<Vec<DVec2>> {
    let sampler = PoissonDiskSampler::new(
        config.width,
        config.height,
        config.spacing(),
        config.max_tries,
    )?;
    let mut rng = Lcg::new(config.seed);
    Ok(sampler.sample(&mut rng))
}

/// Run the full chain for a configuration (no cancellation)
pub fn generate_dual_mesh(config: &MapConfig) -> Result<DualMesh> {
    let points = sample_points(config)?;
    let triangulation = triangulate(&points)?;
    DualMesh::build(points, triangulation)
}
