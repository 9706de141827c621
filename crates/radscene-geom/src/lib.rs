#![warn(missing_docs)]

//! Planar geometry for radscene.
//!
//! Thin wrappers around nalgebra providing the few geometric types the
//! scene-description library needs: points, vectors and planar faces with
//! the transforms used by dynamic shading states (flip, move, rotate,
//! reflect, scale).

mod face;

pub use face::{Face3, Face3Dict};

use nalgebra::{Rotation3, Unit};
use thiserror::Error;

/// A point in 3D space.
pub type Point3 = nalgebra::Point3<f64>;

/// A vector in 3D space.
pub type Vec3 = nalgebra::Vector3<f64>;

/// Errors raised when building geometry.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// A face needs at least three vertices.
    #[error("a face needs at least 3 vertices, got {0}")]
    TooFewVertices(usize),

    /// A dictionary carried the wrong type tag.
    #[error("expected {expected} geometry, got {actual}")]
    TypeMismatch {
        /// Type tag that was expected.
        expected: String,
        /// Type tag that was found.
        actual: String,
    },
}

/// Build a point from an `[x, y, z]` array.
pub fn point(coords: [f64; 3]) -> Point3 {
    Point3::new(coords[0], coords[1], coords[2])
}

/// Build a vector from an `[x, y, z]` array.
pub fn vector(coords: [f64; 3]) -> Vec3 {
    Vec3::new(coords[0], coords[1], coords[2])
}

/// Rotate a point by `angle` radians about `axis` passing through `origin`.
pub fn rotate_point(p: &Point3, axis: &Vec3, angle: f64, origin: &Point3) -> Point3 {
    origin + rotate_vector(&(p - origin), axis, angle)
}

/// Rotate a vector by `angle` radians about `axis`.
pub fn rotate_vector(v: &Vec3, axis: &Vec3, angle: f64) -> Vec3 {
    Rotation3::from_axis_angle(&Unit::new_normalize(*axis), angle) * v
}

/// Mirror a point across the plane through `origin` with `normal`.
pub fn reflect_point(p: &Point3, normal: &Vec3, origin: &Point3) -> Point3 {
    origin + reflect_vector(&(p - origin), normal)
}

/// Mirror a vector across a plane with `normal`.
pub fn reflect_vector(v: &Vec3, normal: &Vec3) -> Vec3 {
    let n = normal.normalize();
    v - n * (2.0 * v.dot(&n))
}

/// Scale a point about `origin`, or the world origin.
pub fn scale_point(p: &Point3, factor: f64, origin: Option<&Point3>) -> Point3 {
    let origin = origin.copied().unwrap_or_else(Point3::origin);
    origin + (p - origin) * factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rotate_point_about_offset_axis() {
        let p = rotate_point(
            &Point3::origin(),
            &Vec3::new(0.0, 1.0, 1.0),
            std::f64::consts::FRAC_PI_2,
            &Point3::new(0.0, 0.0, 20.0),
        );
        assert_relative_eq!(p, Point3::new(-14.142135623730951, -10.0, 10.0), epsilon = 1e-9);
    }

    #[test]
    fn test_reflect_and_scale() {
        let p = reflect_point(&Point3::new(1.0, 0.0, 2.0), &Vec3::x(), &Point3::origin());
        assert_relative_eq!(p, Point3::new(-1.0, 0.0, 2.0));
        assert_relative_eq!(reflect_vector(&Vec3::new(0.0, 0.0, 3.0), &Vec3::x()), Vec3::new(0.0, 0.0, 3.0));
        let origin = Point3::new(1.0, 1.0, 1.0);
        assert_relative_eq!(scale_point(&Point3::new(2.0, 1.0, 1.0), 3.0, Some(&origin)), Point3::new(4.0, 1.0, 1.0));
    }
}
