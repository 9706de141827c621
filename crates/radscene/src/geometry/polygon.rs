//! Planar polygon.

use radscene_geom::{Face3, GeometryError};
use serde_json::json;

use super::real_line;
use crate::dict::{reals, Dict, DictArgs, FieldContext};
use crate::error::{RadianceError, Result};
use crate::primitive::{Modifier, Primitive, PrimitiveKind, PrimitiveParams};
use crate::value::Values;

/// Polygon defined by its vertices in order.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    /// At least three vertices.
    pub vertices: Vec<[f64; 3]>,
}

impl Polygon {
    /// Create from vertices.
    pub fn new(vertices: Vec<[f64; 3]>) -> Result<Self> {
        let polygon = Self { vertices };
        polygon.validate()?;
        Ok(polygon)
    }

    /// Create from a planar face.
    pub fn from_face(face: &Face3) -> Self {
        Self {
            vertices: face.coords(),
        }
    }

    /// The vertices as a planar face.
    pub fn to_face(&self) -> Result<Face3> {
        Ok(Face3::from_coords(&self.vertices)?)
    }
}

/// Polygon record for a host face, without its modifier chain.
pub(crate) fn face_record(identifier: &str, face: &Face3, modifier: &Modifier, minimal: bool) -> String {
    Primitive::builtin(identifier, PrimitiveKind::Polygon(Polygon::from_face(face)))
        .with_modifier(modifier.clone())
        .record_to_radiance(minimal)
}

impl PrimitiveParams for Polygon {
    fn validate(&self) -> Result<()> {
        if self.vertices.len() < 3 {
            return Err(GeometryError::TooFewVertices(self.vertices.len()).into());
        }
        Ok(())
    }

    fn values(&self) -> Values {
        [Vec::new(), Vec::new(), real_line(&self.vertices, &[])]
    }

    fn from_values(values: &Values, name: &str) -> Result<Self> {
        let count = values[2].len();
        if count % 3 != 0 || count < 9 {
            return Err(RadianceError::parse(
                name,
                format!("polygon needs a multiple of 3 and at least 9 values, got {}", count),
            ));
        }
        let v = reals(values, 2, &[count], name)?;
        Ok(Self {
            vertices: v.chunks(3).map(|c| [c[0], c[1], c[2]]).collect(),
        })
    }

    fn write_fields(&self, dict: &mut Dict) -> Result<()> {
        dict.insert("vertices".into(), json!(self.vertices));
        Ok(())
    }

    fn from_fields(dict: &Dict, ctx: &FieldContext<'_>) -> Result<Self> {
        let vertices = serde_json::from_value(dict.list("vertices", ctx.name)?.clone().into())?;
        Ok(Self { vertices })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Vec<[f64; 3]> {
        vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]]
    }

    #[test]
    fn test_polygon_record() {
        let p = Primitive::new("floor", Polygon::new(square()).unwrap()).unwrap();
        assert_eq!(
            p.to_radiance(true, true, true),
            "void polygon floor 0 0 12 0.0 0.0 0.0 1.0 0.0 0.0 1.0 1.0 0.0 0.0 1.0 0.0"
        );
    }

    #[test]
    fn test_too_few_vertices() {
        assert!(matches!(
            Polygon::new(vec![[0.0; 3], [1.0, 0.0, 0.0]]),
            Err(RadianceError::Geometry(GeometryError::TooFewVertices(2)))
        ));
        assert!(Primitive::from_string("void polygon p 0 0 8 0 0 0 1 0 0 1 1").is_err());
    }

    #[test]
    fn test_face_conversion() {
        let face = Face3::from_coords(&square()).unwrap();
        let polygon = Polygon::from_face(&face);
        assert_eq!(polygon.vertices, square());
        assert_eq!(polygon.to_face().unwrap().coords(), square());
    }

    #[test]
    fn test_face_record() {
        let face = Face3::from_coords(&square()[..3]).unwrap();
        let text = face_record("host", &face, &Modifier::Void, true);
        assert_eq!(text, "void polygon host 0 0 9 0.0 0.0 0.0 1.0 0.0 0.0 1.0 1.0 0.0");
    }

    #[test]
    fn test_dict_uses_lowercase_tag() {
        let p = Primitive::new("floor", Polygon::new(square()).unwrap()).unwrap();
        let data = p.to_dict().unwrap();
        assert_eq!(data["type"], "polygon");
        assert_eq!(data["vertices"][2], json!([1.0, 1.0, 0.0]));
        assert_eq!(Primitive::from_dict(&data).unwrap(), p);
        assert!(!p.is_modifier());
    }
}
