//! Least-squares plane fitting

use crate::error::{Error, Result};
use crate::plane::Plane;
use crate::point::*;
use crate::triangle::Triangle;
use nalgebra::Matrix3;

/// Fit the least-squares plane through a point set using SVD.
///
/// The points are centered on their centroid; the normal is the left singular
/// vector belonging to the smallest singular value of the centered coordinate
/// matrix, computed here from its 3x3 scatter matrix. The returned plane passes
/// through the centroid and is oriented so that its offset is non-negative.
pub fn best_fit_plane(points: &[Point3f]) -> Result<Plane> {
    let centroid = centroid_of(points)
        .ok_or_else(|| Error::InvalidData("Cannot fit a plane to an empty point set".to_string()))?;

    let mut scatter = Matrix3::<f32>::zeros();
    for p in points {
        let d = p - centroid;
        scatter += d * d.transpose();
    }

    let svd = scatter.svd(true, false);
    let u = svd
        .u
        .ok_or_else(|| Error::Algorithm("SVD U matrix not available".to_string()))?;
    let smallest = svd.singular_values.imin();
    let normal: Vector3f = u.column(smallest).into_owned();

    if !normal.iter().all(|c| c.is_finite()) || normal.magnitude() < 1e-6 {
        return Err(Error::Algorithm("SVD produced a degenerate plane normal".to_string()));
    }

    Ok(Plane::from_normal_and_point(normal, &centroid))
}

/// Fit the least-squares plane through every vertex of a triangle set
pub fn best_fit_plane_of<'a, I>(triangles: I) -> Result<Plane>
where
    I: IntoIterator<Item = &'a Triangle>,
{
    let points: Vec<Point3f> = triangles
        .into_iter()
        .flat_map(|t| t.vertices())
        .collect();
    best_fit_plane(&points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_fit_tilted_plane() {
        let normal = Vector3f::new(1.0, 2.0, 2.0).normalize();
        let plane = Plane::new(normal, 3.0);
        let u = normal.cross(&Vector3f::x()).normalize();
        let v = normal.cross(&u);

        let mut points = Vec::new();
        for i in 0..5 {
            for j in 0..5 {
                let p = Point3f::from(normal * 3.0 + u * i as f32 + v * (j as f32 * 0.5));
                points.push(p);
            }
        }

        let fitted = best_fit_plane(&points).unwrap();
        assert_relative_eq!(fitted.normal.dot(&plane.normal).abs(), 1.0, epsilon = 1e-4);
        assert_relative_eq!(fitted.distance, 3.0, epsilon = 1e-3);
        for p in &points {
            assert!(fitted.point_distance(p) < 1e-3);
        }
    }

    #[test]
    fn test_fit_single_triangle() {
        let t = Triangle::new(
            Point3f::new(0.0, 0.0, 5.0),
            Point3f::new(2.0, 0.0, 5.0),
            Point3f::new(0.0, 2.0, 5.0),
            0,
            [0, 1, 2],
        )
        .unwrap();

        let fitted = best_fit_plane_of([&t]).unwrap();
        assert_relative_eq!(fitted.normal, Vector3f::z(), epsilon = 1e-5);
        assert_relative_eq!(fitted.distance, 5.0, epsilon = 1e-4);
    }

    #[test]
    fn test_fit_empty_fails() {
        assert!(best_fit_plane(&[]).is_err());
    }
}
