//! Triangle clusters for k-means plane clustering

use bbcloud_core::{best_fit_plane_of, centroid_of, Error, Plane, Point3f, Result, Triangle};

/// A group of triangles with its best-fit plane and a representative
/// centroid.
///
/// The centroid is the centroid of the member triangle closest to the mean
/// of all member vertices projected onto the plane.
#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    /// Positions in the clustered triangle slice
    pub triangles: Vec<usize>,
    pub plane: Plane,
    pub centroid: Point3f,
}

impl Cluster {
    /// An empty cluster seeded with a plane; its centroid is the point of the
    /// plane nearest the origin until the first update.
    pub fn seeded(plane: Plane) -> Self {
        Self {
            triangles: Vec::new(),
            centroid: Point3f::from(plane.normal * plane.distance),
            plane,
        }
    }

    /// A cluster built from members, with plane and centroid computed
    pub fn from_members(triangles: &[Triangle], members: Vec<usize>) -> Result<Self> {
        let seed = members
            .first()
            .map(|&i| triangles[i])
            .ok_or_else(|| Error::InvalidData("Cannot build a cluster without triangles".to_string()))?;
        let mut cluster = Self {
            triangles: members,
            plane: Plane::new(seed.normal, seed.distance),
            centroid: seed.centroid(),
        };
        cluster.update(triangles)?;
        Ok(cluster)
    }

    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Refit the plane, then the centroid, which depends on the new plane
    pub fn update(&mut self, triangles: &[Triangle]) -> Result<()> {
        if self.triangles.is_empty() {
            return Err(Error::InvalidData("Cannot update an empty cluster".to_string()));
        }
        self.plane = best_fit_plane_of(self.triangles.iter().map(|&i| &triangles[i]))?;
        self.update_centroid(triangles)
    }

    fn update_centroid(&mut self, triangles: &[Triangle]) -> Result<()> {
        let projected: Vec<Point3f> = self
            .triangles
            .iter()
            .flat_map(|&i| triangles[i].vertices())
            .map(|p| self.plane.project_point(&p))
            .collect();
        let mean = centroid_of(&projected)
            .ok_or_else(|| Error::InvalidData("Cannot take the centroid of an empty cluster".to_string()))?;

        let mut nearest = triangles[self.triangles[0]].centroid();
        let mut nearest_distance = f32::INFINITY;
        for &i in &self.triangles {
            let c = triangles[i].centroid();
            let d = (c - mean).magnitude();
            if d < nearest_distance {
                nearest_distance = d;
                nearest = c;
            }
        }
        self.centroid = nearest;
        Ok(())
    }

    /// Largest distance from the centroid to any member vertex
    pub fn radius(&self, triangles: &[Triangle]) -> f32 {
        self.triangles
            .iter()
            .flat_map(|&i| triangles[i].vertices())
            .map(|p| (p - self.centroid).magnitude())
            .fold(0.0, f32::max)
    }

    /// Summed distance from the member triangle centroids to the plane
    pub fn cost(&self, triangles: &[Triangle]) -> f32 {
        self.triangles
            .iter()
            .map(|&i| self.plane.point_distance(&triangles[i].centroid()))
            .sum()
    }

    /// Summed distance from a triangle's vertices to the centroid
    pub fn centroid_distance(&self, triangle: &Triangle) -> f32 {
        triangle
            .vertices()
            .iter()
            .map(|p| (p - self.centroid).magnitude())
            .sum()
    }
}
