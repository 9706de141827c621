//! Planar polygonal faces.

use crate::{reflect_point, rotate_point, scale_point, GeometryError, Point3, Vec3};
use serde::{Deserialize, Serialize};

/// A planar polygon defined by its boundary vertices.
///
/// Vertex order defines the orientation: the normal follows the right-hand
/// rule around the boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Face3Dict", into = "Face3Dict")]
pub struct Face3 {
    vertices: Vec<Point3>,
}

/// Dictionary form of a [`Face3`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Face3Dict {
    /// Always `Face3D`.
    #[serde(rename = "type")]
    pub face_type: String,
    /// Boundary vertices as `[x, y, z]` triples.
    pub boundary: Vec<[f64; 3]>,
}

impl Face3 {
    /// Create a face from its boundary vertices.
    pub fn new(vertices: Vec<Point3>) -> Result<Self, GeometryError> {
        if vertices.len() < 3 {
            return Err(GeometryError::TooFewVertices(vertices.len()));
        }
        Ok(Self { vertices })
    }

    /// Create a face from `[x, y, z]` coordinate triples.
    pub fn from_coords(coords: &[[f64; 3]]) -> Result<Self, GeometryError> {
        Self::new(coords.iter().map(|c| crate::point(*c)).collect())
    }

    /// Boundary vertices.
    pub fn vertices(&self) -> &[Point3] {
        &self.vertices
    }

    /// Boundary vertices as `[x, y, z]` triples.
    pub fn coords(&self) -> Vec<[f64; 3]> {
        self.vertices.iter().map(|p| [p.x, p.y, p.z]).collect()
    }

    /// Unit normal computed with Newell's method. Zero for degenerate faces.
    pub fn normal(&self) -> Vec3 {
        let n = self.newell();
        let len = n.norm();
        if len > 0.0 {
            n / len
        } else {
            Vec3::zeros()
        }
    }

    /// Area of the face.
    pub fn area(&self) -> f64 {
        self.newell().norm() / 2.0
    }

    /// Average of the boundary vertices.
    pub fn center(&self) -> Point3 {
        let sum = self
            .vertices
            .iter()
            .fold(Vec3::zeros(), |acc, p| acc + p.coords);
        Point3::from(sum / self.vertices.len() as f64)
    }

    /// Same face with the opposite orientation.
    pub fn flip(&self) -> Face3 {
        let mut vertices = self.vertices.clone();
        vertices.reverse();
        Face3 { vertices }
    }

    /// Translate the face by `offset`.
    pub fn moved(&self, offset: &Vec3) -> Face3 {
        self.map_points(|p| p + offset)
    }

    /// Rotate the face by `angle` radians about `axis` passing through `origin`.
    pub fn rotated(&self, axis: &Vec3, angle: f64, origin: &Point3) -> Face3 {
        self.map_points(|p| rotate_point(p, axis, angle, origin))
    }

    /// Rotate the face counterclockwise in the XY plane by `angle` radians.
    pub fn rotated_xy(&self, angle: f64, origin: &Point3) -> Face3 {
        self.rotated(&Vec3::z(), angle, origin)
    }

    /// Mirror the face across the plane through `origin` with `normal`.
    ///
    /// The vertex order is reversed so the reflected face keeps a consistent
    /// orientation.
    pub fn reflected(&self, normal: &Vec3, origin: &Point3) -> Face3 {
        let mut vertices: Vec<Point3> = self
            .vertices
            .iter()
            .map(|p| reflect_point(p, normal, origin))
            .collect();
        vertices.reverse();
        Face3 { vertices }
    }

    /// Scale the face by `factor` about `origin` (the world origin if `None`).
    pub fn scaled(&self, factor: f64, origin: Option<&Point3>) -> Face3 {
        self.map_points(|p| scale_point(p, factor, origin))
    }

    fn map_points(&self, f: impl Fn(&Point3) -> Point3) -> Face3 {
        Face3 {
            vertices: self.vertices.iter().map(f).collect(),
        }
    }

    fn newell(&self) -> Vec3 {
        let count = self.vertices.len();
        let mut n = Vec3::zeros();
        for i in 0..count {
            let a = &self.vertices[i];
            let b = &self.vertices[(i + 1) % count];
            n.x += (a.y - b.y) * (a.z + b.z);
            n.y += (a.z - b.z) * (a.x + b.x);
            n.z += (a.x - b.x) * (a.y + b.y);
        }
        n
    }
}

impl TryFrom<Face3Dict> for Face3 {
    type Error = GeometryError;

    fn try_from(dict: Face3Dict) -> Result<Self, Self::Error> {
        if dict.face_type != "Face3D" {
            return Err(GeometryError::TypeMismatch {
                expected: "Face3D".into(),
                actual: dict.face_type,
            });
        }
        Face3::from_coords(&dict.boundary)
    }
}

impl From<Face3> for Face3Dict {
    fn from(face: Face3) -> Self {
        Face3Dict {
            face_type: "Face3D".into(),
            boundary: face.coords(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_square() -> Face3 {
        Face3::from_coords(&[
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 1.0, 0.0],
            [0.0, 1.0, 0.0],
        ])
        .unwrap()
    }

    #[test]
    fn test_too_few_vertices() {
        let err = Face3::from_coords(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]]).unwrap_err();
        assert_eq!(err, GeometryError::TooFewVertices(2));
    }

    #[test]
    fn test_normal_area_center() {
        let face = unit_square();
        assert_relative_eq!(face.normal(), Vec3::z());
        assert_relative_eq!(face.area(), 1.0);
        assert_relative_eq!(face.center(), Point3::new(0.5, 0.5, 0.0));
    }

    #[test]
    fn test_flip_reverses_normal() {
        let flipped = unit_square().flip();
        assert_relative_eq!(flipped.normal(), -Vec3::z());
        assert_eq!(flipped.vertices()[0], Point3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_moved() {
        let moved = unit_square().moved(&Vec3::new(0.0, 0.0, 2.0));
        assert!(moved.vertices().iter().all(|p| p.z == 2.0));
    }

    #[test]
    fn test_rotated_xy_quarter_turn() {
        let rotated = unit_square().rotated_xy(std::f64::consts::FRAC_PI_2, &Point3::origin());
        assert_relative_eq!(rotated.vertices()[1], Point3::new(0.0, 1.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn test_reflected_keeps_orientation_consistent() {
        let reflected = unit_square().reflected(&Vec3::x(), &Point3::origin());
        assert_relative_eq!(reflected.normal(), Vec3::z(), epsilon = 1e-12);
        assert!(reflected.vertices().iter().all(|p| p.x <= 0.0));
    }

    #[test]
    fn test_scaled() {
        let scaled = unit_square().scaled(2.0, None);
        assert_relative_eq!(scaled.area(), 4.0);
    }

    #[test]
    fn test_dict_form() {
        let json = serde_json::to_value(unit_square()).unwrap();
        assert_eq!(json["type"], "Face3D");
        assert_eq!(json["boundary"][2], serde_json::json!([1.0, 1.0, 0.0]));
        let back: Face3 = serde_json::from_value(json).unwrap();
        assert_eq!(back, unit_square());

        let bad = serde_json::json!({"type": "Mesh3D", "boundary": []});
        assert!(serde_json::from_value::<Face3>(bad).is_err());
    }
}
