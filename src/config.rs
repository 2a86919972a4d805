//! Map Mesh Configuration and Builder
//!
//! This module provides configuration types for deterministic dual mesh generation.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{MeshError, Result};

/// Default number of candidates tried around an active point before it is retired
pub const DEFAULT_MAX_TRIES: u32 = 30;

/// Mesh density presets
///
/// Each preset maps to a minimum point spacing. Smaller spacing means more,
/// smaller regions for the same map size.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MeshDensity {
    /// Spacing 40: ~400 regions on a 1000x1000 map
    Coarse,
    /// Spacing 20: ~1,600 regions on a 1000x1000 map (default)
    Medium,
    /// Spacing 10: ~6,500 regions on a 1000x1000 map
    Fine,
    /// Custom minimum spacing between points
    Custom {
        /// Minimum distance between any two sampled points
        spacing: f64,
    },
}

impl MeshDensity {
    /// Minimum point spacing for this preset
    pub fn spacing(self) -> f64 {
        match self {
            MeshDensity::Coarse => 40.0,
            MeshDensity::Medium => 20.0,
            MeshDensity::Fine => 10.0,
            MeshDensity::Custom { spacing } => spacing,
        }
    }

    /// Get a human-readable name for this preset
    pub fn name(self) -> &'static str {
        match self {
            MeshDensity::Coarse => "Coarse",
            MeshDensity::Medium => "Medium",
            MeshDensity::Fine => "Fine",
            MeshDensity::Custom { .. } => "Custom",
        }
    }
}

impl Default for MeshDensity {
    fn default() -> Self {
        MeshDensity::Medium
    }
}

/// Configuration for deterministic map mesh generation
///
/// The same configuration always produces the identical mesh, so only the
/// configuration needs to be stored to reproduce a map.
///
/// # Example
///
/// ```rust
/// use dual_mesh_mapgen::*;
///
/// let config = MapConfigBuilder::new(42)
///     .dimensions(200.0, 100.0)
///     .unwrap()
///     .density(MeshDensity::Coarse)
///     .build()
///     .unwrap();
///
/// assert_eq!(config.seed, 42);
/// assert_eq!(config.spacing(), 40.0);
/// ```
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapConfig {
    /// Seed for the point sampler's sequence generator
    pub seed: u32,

    /// Width of the sampled rectangle `[0, width)`
    pub width: f64,

    /// Height of the sampled rectangle `[0, height)`
    pub height: f64,

    /// Density preset (determines the minimum point spacing)
    pub density: MeshDensity,

    /// Candidates tried around an active point before it is retired
    pub max_tries: u32,
}

impl MapConfig {
    /// Minimum distance between sampled points
    #[inline]
    pub fn spacing(&self) -> f64 {
        self.density.spacing()
    }

    /// Area of the sampled rectangle
    #[inline]
    pub fn area(&self) -> f64 {
        self.width * self.height
    }
}

/// Builder for creating MapConfig with validation
///
/// There is no default seed: the caller always chooses it.
///
/// # Example
///
/// ```rust
/// use dual_mesh_mapgen::*;
///
/// let config = MapConfigBuilder::new(7)
///     .spacing(12.5)
///     .unwrap()
///     .max_tries(20)
///     .unwrap()
///     .build()
///     .unwrap();
///
/// assert_eq!(config.max_tries, 20);
/// ```
#[derive(Debug, Clone)]
pub struct MapConfigBuilder {
    seed: u32,
    width: f64,
    height: f64,
    density: MeshDensity,
    max_tries: u32,
}

impl MapConfigBuilder {
    /// Create a new builder for the given seed
    ///
    /// Defaults:
    /// - dimensions: 1000 x 1000
    /// - density: Medium (spacing 20)
    /// - max_tries: 30
    pub fn new(seed: u32) -> Self {
        Self {
            seed,
            width: 1000.0,
            height: 1000.0,
            density: MeshDensity::default(),
            max_tries: DEFAULT_MAX_TRIES,
        }
    }

    /// Set the seed
    pub fn seed(mut self, seed: u32) -> Self {
        self.seed = seed;
        self
    }

    /// Set the rectangle dimensions
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if either dimension is not a positive finite number
    pub fn dimensions(mut self, width: f64, height: f64) -> Result<Self> {
        check_positive("width", width)?;
        check_positive("height", height)?;
        self.width = width;
        self.height = height;
        Ok(self)
    }

    /// Set the density preset
    pub fn density(mut self, density: MeshDensity) -> Self {
        self.density = density;
        self
    }

    /// Set a custom minimum spacing (shorthand for `MeshDensity::Custom`)
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if spacing is not a positive finite number
    pub fn spacing(mut self, spacing: f64) -> Result<Self> {
        check_positive("spacing", spacing)?;
        self.density = MeshDensity::Custom { spacing };
        Ok(self)
    }

    /// Set the sampler retry budget per active point
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if `max_tries` is zero
    pub fn max_tries(mut self, max_tries: u32) -> Result<Self> {
        if max_tries == 0 {
            return Err(MeshError::InvalidParameter(
                "max_tries must be at least 1".to_string(),
            ));
        }
        self.max_tries = max_tries;
        Ok(self)
    }

    /// Build the configuration
    ///
    /// The density is re-checked here since `MeshDensity::Custom` can be set directly.
    pub fn build(self) -> Result<MapConfig> {
        check_positive("spacing", self.density.spacing())?;

        Ok(MapConfig {
            seed: self.seed,
            width: self.width,
            height: self.height,
            density: self.density,
            max_tries: self.max_tries,
        })
    }
}

pub(crate) fn check_positive(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(MeshError::InvalidParameter(format!(
            "{} must be a positive finite number (got {})",
            name, value
        )))
    }
}
