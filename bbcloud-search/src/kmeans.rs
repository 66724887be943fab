//! K-means clustering of triangles over fitted planes
//!
//! Clusters are seeded from tangent planes of the bounding sphere, balanced
//! by a coverage pass and an iterative removal of minimum-coverage clusters,
//! then refined Lloyd-style until the per-cluster plane distances stop
//! decreasing.

use crate::cluster::Cluster;
use crate::group::{Membership, PlaneGroup, SearchOutcome};
use crate::PlaneSearch;
use bbcloud_core::{BoundingSphere, Error, Result, Triangle};

/// Recommended cluster count range
pub const KMEANS_CLUSTER_RANGE: (usize, usize) = (20, 150);

/// Recommended iteration bound range
pub const KMEANS_ITERATION_RANGE: (usize, usize) = (20, 600);

/// Both iterative phases always run at least this many iterations
const MIN_ITERATIONS: usize = 2;

/// Relative drop below the recorded minimum that counts as a decrease
const DECREASE_TOLERANCE: f32 = 1e-6;

/// K-means plane clustering
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KMeansSearch {
    /// Target plane count
    pub clusters: usize,
    /// Iteration bound for each iterative phase
    pub max_iterations: usize,
}

impl Default for KMeansSearch {
    fn default() -> Self {
        Self {
            clusters: 50,
            max_iterations: 100,
        }
    }
}

impl KMeansSearch {
    pub fn new(clusters: usize, max_iterations: usize) -> Result<Self> {
        if clusters == 0 {
            return Err(Error::InvalidParameter("clusters must be positive".to_string()));
        }
        if max_iterations == 0 {
            return Err(Error::InvalidParameter("max_iterations must be positive".to_string()));
        }
        if clusters < KMEANS_CLUSTER_RANGE.0 || clusters > KMEANS_CLUSTER_RANGE.1 {
            log::warn!(
                "clusters {} is outside the recommended range {:?}",
                clusters,
                KMEANS_CLUSTER_RANGE
            );
        }
        if max_iterations < KMEANS_ITERATION_RANGE.0 || max_iterations > KMEANS_ITERATION_RANGE.1 {
            log::warn!(
                "max_iterations {} is outside the recommended range {:?}",
                max_iterations,
                KMEANS_ITERATION_RANGE
            );
        }
        Ok(Self {
            clusters,
            max_iterations,
        })
    }

    /// Seed clusters from tangent planes and assign by plane distance
    fn initialize(&self, triangles: &[Triangle], sphere: &BoundingSphere) -> Result<Vec<Cluster>> {
        let mut clusters: Vec<Cluster> = sphere
            .tangent_planes(self.clusters)
            .into_iter()
            .map(Cluster::seeded)
            .collect();
        assign(&mut clusters, triangles, |c, t| c.plane.total_distance(t));
        refresh(&mut clusters, triangles, None)?;
        Ok(clusters)
    }

    /// Reassign by distance to the cluster centroids, which counters the
    /// bias of plane distance towards large clusters
    fn reduce_coverage_variance(clusters: &mut Vec<Cluster>, triangles: &[Triangle]) -> Result<()> {
        assign(clusters, triangles, |c, t| c.centroid_distance(t));
        refresh(clusters, triangles, None)
    }

    /// Repeatedly dissolve the smallest cluster and split off the outermost
    /// triangle of the largest one, until no cluster radius shrinks.
    ///
    /// Returns the number of iterations run.
    fn remove_minimum_coverage(&self, clusters: &mut Vec<Cluster>, triangles: &[Triangle]) -> Result<usize> {
        let mut history: Vec<f32> = vec![f32::INFINITY; clusters.len()];
        let mut iteration = 0;

        while iteration < self.max_iterations && clusters.len() >= 2 {
            iteration += 1;

            let smallest = (0..clusters.len())
                .min_by_key(|&i| clusters[i].len())
                .unwrap_or(0);
            let dissolved = clusters.remove(smallest);
            history.remove(smallest);
            for i in dissolved.triangles {
                let j = nearest(clusters, |c| c.plane.total_distance(&triangles[i]));
                clusters[j].triangles.push(i);
            }
            refresh(clusters, triangles, Some(&mut history))?;

            let largest = (0..clusters.len())
                .rev()
                .max_by_key(|&i| clusters[i].len())
                .unwrap_or(0);
            if clusters[largest].len() >= 2 {
                let center = clusters[largest].centroid;
                let members = &clusters[largest].triangles;
                let mut farthest = 0;
                let mut farthest_distance = -1.0;
                for (k, &i) in members.iter().enumerate() {
                    let d = (triangles[i].centroid() - center).magnitude();
                    if d > farthest_distance {
                        farthest_distance = d;
                        farthest = k;
                    }
                }
                let moved = clusters[largest].triangles.remove(farthest);
                clusters[largest].update(triangles)?;
                clusters.push(Cluster::from_members(triangles, vec![moved])?);
                history.push(f32::INFINITY);
            }

            let radii: Vec<f32> = clusters.iter().map(|c| c.radius(triangles)).collect();
            let decreased = record_minima(&mut history, &radii);
            log::debug!(
                "Coverage iteration {}: {} clusters, radius decreased: {}",
                iteration,
                clusters.len(),
                decreased
            );
            if iteration >= MIN_ITERATIONS && !decreased {
                break;
            }
        }
        Ok(iteration)
    }

    /// Lloyd iterations over plane distance.
    ///
    /// Returns the number of iterations run.
    fn refine(&self, clusters: &mut Vec<Cluster>, triangles: &[Triangle]) -> Result<usize> {
        let mut history: Vec<f32> = vec![f32::INFINITY; clusters.len()];
        let mut iteration = 0;

        while iteration < self.max_iterations {
            iteration += 1;

            assign(clusters, triangles, |c, t| c.plane.total_distance(t));
            refresh(clusters, triangles, Some(&mut history))?;

            let costs: Vec<f32> = clusters.iter().map(|c| c.cost(triangles)).collect();
            let decreased = record_minima(&mut history, &costs);
            log::debug!(
                "Refinement iteration {}: total cost {:.6}",
                iteration,
                costs.iter().sum::<f32>()
            );
            if iteration >= MIN_ITERATIONS && !decreased {
                break;
            }
        }
        Ok(iteration)
    }

    /// Run every phase and return the surviving clusters
    pub fn cluster(&self, triangles: &[Triangle], sphere: &BoundingSphere) -> Result<Vec<Cluster>> {
        if triangles.is_empty() {
            return Err(Error::EmptyInput);
        }

        let mut clusters = self.initialize(triangles, sphere)?;
        Self::reduce_coverage_variance(&mut clusters, triangles)?;
        let removal = self.remove_minimum_coverage(&mut clusters, triangles)?;
        let lloyd = self.refine(&mut clusters, triangles)?;

        if clusters.len() < self.clusters {
            log::warn!(
                "{} of {} clusters survived, the rest ran empty",
                clusters.len(),
                self.clusters
            );
        }
        log::debug!(
            "K-means finished after {} coverage and {} refinement iterations",
            removal,
            lloyd
        );
        Ok(clusters)
    }
}

impl PlaneSearch for KMeansSearch {
    fn name(&self) -> &'static str {
        "kmeans"
    }

    fn search(&self, triangles: &[Triangle], sphere: &BoundingSphere) -> Result<SearchOutcome> {
        let clusters = self.cluster(triangles, sphere)?;
        let groups = clusters
            .into_iter()
            .map(|mut c| {
                c.triangles.sort_unstable();
                PlaneGroup {
                    plane: c.plane,
                    members: c.triangles,
                    membership: Membership::Nearest,
                }
            })
            .collect();
        Ok(SearchOutcome {
            groups,
            skipped: 0,
            epsilon: None,
        })
    }
}

/// Index of the cluster minimizing `metric` (the first one on ties)
fn nearest<F>(clusters: &[Cluster], metric: F) -> usize
where
    F: Fn(&Cluster) -> f32,
{
    let mut best = 0;
    let mut best_value = f32::INFINITY;
    for (j, cluster) in clusters.iter().enumerate() {
        let value = metric(cluster);
        if value < best_value {
            best_value = value;
            best = j;
        }
    }
    best
}

/// Reassign every triangle to the cluster minimizing `metric`
fn assign<F>(clusters: &mut [Cluster], triangles: &[Triangle], metric: F)
where
    F: Fn(&Cluster, &Triangle) -> f32,
{
    if clusters.is_empty() {
        return;
    }
    let targets: Vec<usize> = triangles
        .iter()
        .map(|t| nearest(clusters, |c| metric(c, t)))
        .collect();
    for cluster in clusters.iter_mut() {
        cluster.triangles.clear();
    }
    for (i, j) in targets.into_iter().enumerate() {
        clusters[j].triangles.push(i);
    }
}

/// Drop empty clusters (with their history entries), then refit the rest
fn refresh(clusters: &mut Vec<Cluster>, triangles: &[Triangle], history: Option<&mut Vec<f32>>) -> Result<()> {
    if let Some(history) = history {
        *history = history
            .iter()
            .zip(clusters.iter())
            .filter(|(_, c)| !c.is_empty())
            .map(|(&h, _)| h)
            .collect();
    }
    let before = clusters.len();
    clusters.retain(|c| !c.is_empty());
    if clusters.len() < before {
        log::debug!("Dropped {} empty clusters", before - clusters.len());
    }
    if clusters.is_empty() {
        return Err(Error::Algorithm("Every cluster ran empty".to_string()));
    }
    for cluster in clusters.iter_mut() {
        cluster.update(triangles)?;
    }
    Ok(())
}

/// Fold `values` into the per-cluster minima. Returns whether any cluster
/// with a recorded minimum went below it.
fn record_minima(history: &mut [f32], values: &[f32]) -> bool {
    let mut decreased = false;
    for (h, &v) in history.iter_mut().zip(values) {
        if h.is_finite() && v < *h * (1.0 - DECREASE_TOLERANCE) {
            decreased = true;
        }
        *h = h.min(v);
    }
    decreased
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use bbcloud_core::{Plane, Point3f, TriangleMesh, Vector3f};

    fn unit_cube() -> Vec<Triangle> {
        let vertices = vec![
            Point3f::new(-0.5, -0.5, -0.5),
            Point3f::new(0.5, -0.5, -0.5),
            Point3f::new(0.5, 0.5, -0.5),
            Point3f::new(-0.5, 0.5, -0.5),
            Point3f::new(-0.5, -0.5, 0.5),
            Point3f::new(0.5, -0.5, 0.5),
            Point3f::new(0.5, 0.5, 0.5),
            Point3f::new(-0.5, 0.5, 0.5),
        ];
        let faces = vec![
            [0, 2, 1], [0, 3, 2],
            [4, 5, 6], [4, 6, 7],
            [0, 1, 5], [0, 5, 4],
            [2, 3, 7], [2, 7, 6],
            [1, 2, 6], [1, 6, 5],
            [0, 4, 7], [0, 7, 3],
        ];
        TriangleMesh::from_vertices_and_faces(vertices, faces)
            .triangles()
            .unwrap()
            .triangles
    }

    fn quad() -> Vec<Triangle> {
        let a = Point3f::new(0.0, 0.0, 0.0);
        let b = Point3f::new(1.0, 0.0, 0.0);
        let c = Point3f::new(1.0, 1.0, 0.0);
        let d = Point3f::new(0.0, 1.0, 0.0);
        vec![
            Triangle::new(a, b, c, 0, [0, 1, 2]).unwrap(),
            Triangle::new(a, c, d, 1, [3, 4, 5]).unwrap(),
        ]
    }

    #[test]
    fn test_new_validates() {
        assert!(KMeansSearch::new(0, 10).is_err());
        assert!(KMeansSearch::new(4, 0).is_err());
        assert!(KMeansSearch::new(1, 50).is_ok());
    }

    #[test]
    fn test_single_cluster_fits_quad() {
        let triangles = quad();
        let sphere = BoundingSphere::from_triangles(&triangles).unwrap();
        let search = KMeansSearch::new(1, 50).unwrap();

        let outcome = search.search(&triangles, &sphere).unwrap();
        assert_eq!(outcome.plane_count(), 1);
        assert_eq!(outcome.groups[0].members, vec![0, 1]);
        assert_relative_eq!(outcome.groups[0].plane.normal.dot(&Vector3f::z()).abs(), 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_cube_partition_without_empty_clusters() {
        let triangles = unit_cube();
        let sphere = BoundingSphere::from_triangles(&triangles).unwrap();
        let search = KMeansSearch::new(6, 30).unwrap();

        let clusters = search.cluster(&triangles, &sphere).unwrap();
        assert!(!clusters.is_empty() && clusters.len() <= 6);

        let mut seen = vec![0; triangles.len()];
        for cluster in &clusters {
            assert!(!cluster.is_empty());
            assert_relative_eq!(cluster.plane.normal.magnitude(), 1.0, epsilon = 1e-5);
            assert!(cluster.plane.distance >= 0.0);
            for &i in &cluster.triangles {
                seen[i] += 1;
            }
        }
        assert!(seen.iter().all(|&n| n == 1));
    }

    #[test]
    fn test_more_clusters_than_triangles() {
        let triangles = quad();
        let sphere = BoundingSphere::from_triangles(&triangles).unwrap();
        let search = KMeansSearch::new(10, 20).unwrap();

        let outcome = search.search(&triangles, &sphere).unwrap();
        assert!(outcome.plane_count() <= 2);
        assert_eq!(outcome.assigned_count(), 2);
        assert!(outcome.groups.iter().all(|g| !g.members.is_empty()));
    }

    #[test]
    fn test_refine_stops_within_bounds() {
        let triangles = unit_cube();
        let sphere = BoundingSphere::from_triangles(&triangles).unwrap();
        let search = KMeansSearch::new(6, 15).unwrap();

        let mut clusters = search.initialize(&triangles, &sphere).unwrap();
        let iterations = search.refine(&mut clusters, &triangles).unwrap();
        assert!(iterations >= MIN_ITERATIONS && iterations <= 15);
    }

    /// One cluster per cube face, seeded from a slightly tilted face plane
    fn tilted_face_clusters() -> Vec<Cluster> {
        let mut clusters = Vec::new();
        for axis in 0..3 {
            for sign in [-1.0f32, 1.0] {
                let mut normal = Vector3f::zeros();
                normal[axis] = sign;
                normal[(axis + 1) % 3] = 0.1;
                clusters.push(Cluster::seeded(Plane::new(normal, 0.5)));
            }
        }
        clusters
    }

    #[test]
    fn test_refine_costs_never_exceed_recorded_minima() {
        let triangles = unit_cube();
        let search = KMeansSearch::new(6, 20).unwrap();
        let mut clusters = tilted_face_clusters();

        // The Lloyd steps, checked one iteration at a time
        let mut history = vec![f32::INFINITY; clusters.len()];
        let mut iterations = 0;
        while iterations < search.max_iterations {
            iterations += 1;
            assign(&mut clusters, &triangles, |c, t| c.plane.total_distance(t));
            refresh(&mut clusters, &triangles, Some(&mut history)).unwrap();

            let costs: Vec<f32> = clusters.iter().map(|c| c.cost(&triangles)).collect();
            if iterations >= MIN_ITERATIONS {
                for (cost, minimum) in costs.iter().zip(&history) {
                    assert!(*cost <= minimum + 1e-5, "iteration {}: {} above {}", iterations, cost, minimum);
                }
            }
            let decreased = record_minima(&mut history, &costs);
            if iterations >= MIN_ITERATIONS && !decreased {
                break;
            }
        }
        assert_eq!(clusters.len(), 6);
        assert!(clusters.iter().all(|c| c.len() == 2));
        for cost in &history {
            assert_relative_eq!(*cost, 0.0, epsilon = 1e-5);
        }

        // The phase itself settles as soon as the warm-up is over
        let mut clusters = tilted_face_clusters();
        let ran = search.refine(&mut clusters, &triangles).unwrap();
        assert_eq!(ran, iterations);
        assert_eq!(ran, MIN_ITERATIONS);
        for cluster in &clusters {
            assert_relative_eq!(cluster.plane.distance, 0.5, epsilon = 1e-4);
            assert!(cluster.cost(&triangles) < 1e-5);
        }
    }

    #[test]
    fn test_record_minima() {
        let mut history = vec![f32::INFINITY, 2.0, 1.0];
        assert!(!record_minima(&mut history, &[5.0, 2.0, 1.5]));
        assert_eq!(history, vec![5.0, 2.0, 1.0]);
        assert!(record_minima(&mut history, &[5.0, 1.0, 1.0]));
        assert_eq!(history, vec![5.0, 1.0, 1.0]);
    }
}
