//! Billboard cloud generation from a triangle mesh
//!
//! The engine decomposes a mesh, runs the configured plane search, fits a
//! rectangle to every plane group and sizes its texture.

use crate::crack::crack_candidates;
use crate::footprint::fit_rectangle;
use crate::greedy::GreedyBinSearch;
use crate::group::Membership;
use crate::kmeans::KMeansSearch;
use crate::stochastic::StochasticSearch;
use crate::texture::{texture_size, TextureSize};
use crate::PlaneSearch;
use bbcloud_core::{BoundingSphere, Error, Plane, Rectangle, Result, Triangle, TriangleMesh};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Plane-search strategy and its parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Algorithm {
    /// Greedy search over a discretized plane-parameter space
    Greedy {
        epsilon_percentage: f32,
        theta_bins: usize,
        phi_bins: usize,
    },
    /// Randomized seed-and-grow search
    Stochastic {
        epsilon_percentage: f32,
        iterations: usize,
    },
    /// K-means clustering over fitted planes
    KMeans {
        clusters: usize,
        max_iterations: usize,
    },
}

impl Algorithm {
    pub fn name(&self) -> &'static str {
        match self {
            Algorithm::Greedy { .. } => "greedy",
            Algorithm::Stochastic { .. } => "stochastic",
            Algorithm::KMeans { .. } => "kmeans",
        }
    }

    /// Build the strategy, validating its parameters
    fn strategy(&self, seed: Option<u64>) -> Result<Box<dyn PlaneSearch>> {
        Ok(match *self {
            Algorithm::Greedy {
                epsilon_percentage,
                theta_bins,
                phi_bins,
            } => Box::new(GreedyBinSearch::new(epsilon_percentage, theta_bins, phi_bins)?),
            Algorithm::Stochastic {
                epsilon_percentage,
                iterations,
            } => {
                let search = StochasticSearch::new(epsilon_percentage, iterations)?;
                Box::new(match seed {
                    Some(seed) => search.with_seed(seed),
                    None => search,
                })
            }
            Algorithm::KMeans {
                clusters,
                max_iterations,
            } => Box::new(KMeansSearch::new(clusters, max_iterations)?),
        })
    }
}

impl Default for Algorithm {
    fn default() -> Self {
        let greedy = GreedyBinSearch::default();
        Algorithm::Greedy {
            epsilon_percentage: greedy.epsilon_percentage,
            theta_bins: greedy.theta_bins,
            phi_bins: greedy.phi_bins,
        }
    }
}

/// Configuration for billboard cloud generation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub algorithm: Algorithm,
    /// Texture size, in pixels, at which the bounding-sphere diameter would
    /// be rendered
    pub base_image_size: (u32, u32),
    /// Let planes also carry triangles of other groups inside their envelope
    pub crack_reduction: bool,
    /// Seed for the stochastic search
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::default(),
            base_image_size: (1024, 1024),
            crack_reduction: false,
            seed: None,
        }
    }
}

/// One textured plane of the cloud
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Billboard {
    pub plane: Plane,
    /// Face ids of the mesh triangles projected onto this billboard
    pub triangles: Vec<usize>,
    /// Positions of those faces' vertices in the mesh index buffer
    pub mesh_indices: Vec<usize>,
    pub rectangle: Rectangle,
    /// `None` when the rectangle cannot be rasterized
    pub texture_size: Option<TextureSize>,
    pub membership: Membership,
}

/// Immutable result of one generation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillboardCloud {
    pub billboards: Vec<Billboard>,
    /// Triangles without a renderable billboard, degenerate faces included
    pub skipped_triangles: usize,
    /// Wall-clock seconds spent on the run
    pub processing_time: f32,
    pub algorithm: String,
    pub bounding_sphere: BoundingSphere,
    /// Absolute tolerance of the run, for tolerance-based searches
    pub epsilon: Option<f32>,
}

impl BillboardCloud {
    pub fn plane_count(&self) -> usize {
        self.billboards.len()
    }
}

/// Runs plane searches and assembles billboard clouds
#[derive(Debug, Clone)]
pub struct PlaneSearchEngine {
    config: EngineConfig,
}

impl PlaneSearchEngine {
    /// Create an engine, rejecting invalid algorithm parameters
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.algorithm.strategy(config.seed)?;
        if config.base_image_size.0 == 0 || config.base_image_size.1 == 0 {
            return Err(Error::InvalidParameter(
                "base_image_size must be positive".to_string(),
            ));
        }
        Ok(Self { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Generate the billboard cloud of a mesh
    pub fn run(&self, mesh: &TriangleMesh) -> Result<BillboardCloud> {
        let decomposition = mesh.triangles()?;
        let mut cloud = self.run_triangles(&decomposition.triangles)?;
        cloud.skipped_triangles += decomposition.degenerate_faces.len();
        Ok(cloud)
    }

    /// Generate the billboard cloud of an already decomposed triangle set
    pub fn run_triangles(&self, triangles: &[Triangle]) -> Result<BillboardCloud> {
        if triangles.is_empty() {
            return Err(Error::EmptyInput);
        }

        let start_time = Instant::now();
        let strategy = self.config.algorithm.strategy(self.config.seed)?;
        let sphere = BoundingSphere::from_triangles(triangles)?;

        log::info!(
            "Searching planes for {} triangles with the {} strategy",
            triangles.len(),
            strategy.name()
        );
        let outcome = strategy.search(triangles, &sphere)?;

        let member_lists = if self.config.crack_reduction {
            crack_candidates(&outcome.groups, triangles)
        } else {
            outcome.groups.iter().map(|g| g.members.clone()).collect()
        };

        let mut skipped = outcome.skipped;
        let mut billboards = Vec::with_capacity(outcome.groups.len());
        for (group, members) in outcome.groups.iter().zip(member_lists) {
            let rectangle = fit_rectangle(&group.plane, triangles, &members)?;
            let size = texture_size(&rectangle, self.config.base_image_size, sphere.radius);
            if size.is_none() {
                log::warn!(
                    "Billboard of {} triangles has an unrenderable {}x{} footprint",
                    group.members.len(),
                    rectangle.axis_x_length,
                    rectangle.axis_y_length
                );
                skipped += group.members.len();
            }

            billboards.push(Billboard {
                plane: group.plane,
                triangles: members.iter().map(|&i| triangles[i].face).collect(),
                mesh_indices: members.iter().flat_map(|&i| triangles[i].indices).collect(),
                rectangle,
                texture_size: size,
                membership: group.membership,
            });
        }

        let cloud = BillboardCloud {
            billboards,
            skipped_triangles: skipped,
            processing_time: start_time.elapsed().as_secs_f32(),
            algorithm: strategy.name().to_string(),
            bounding_sphere: sphere,
            epsilon: outcome.epsilon,
        };

        log::info!(
            "{}: {} planes in {:.3}s, {} triangles skipped",
            cloud.algorithm,
            cloud.plane_count(),
            cloud.processing_time,
            cloud.skipped_triangles
        );
        Ok(cloud)
    }
}
