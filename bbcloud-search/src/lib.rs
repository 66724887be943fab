//! Plane search for billboard cloud generation
//!
//! This crate partitions the triangles of a mesh into plane-aligned groups
//! and fits a billboard rectangle to every group:
//! - Greedy search over a discretized plane-parameter space
//! - Stochastic seed-and-grow search
//! - K-means clustering over fitted planes
//! - Rotating-calipers footprint fitting and texture sizing

pub mod bin;
pub mod discretization;
pub mod group;
pub mod greedy;
pub mod stochastic;
pub mod cluster;
pub mod kmeans;
pub mod calipers;
pub mod footprint;
pub mod texture;
pub mod crack;
pub mod engine;
pub mod background;

pub use bin::*;
pub use discretization::*;
pub use group::*;
pub use greedy::*;
pub use stochastic::*;
pub use cluster::*;
pub use kmeans::*;
pub use calipers::*;
pub use footprint::*;
pub use texture::*;
pub use crack::*;
pub use engine::*;
pub use background::*;

use bbcloud_core::{BoundingSphere, Result, Triangle};

/// A strategy partitioning a triangle set into plane-aligned groups
pub trait PlaneSearch {
    /// Short name reported in run summaries
    fn name(&self) -> &'static str;

    /// Search planes for `triangles`, which are enclosed by `sphere`.
    ///
    /// Group members are positions in `triangles`. Triangles the strategy
    /// could not place are reported through [`SearchOutcome::skipped`].
    fn search(&self, triangles: &[Triangle], sphere: &BoundingSphere) -> Result<SearchOutcome>;
}
