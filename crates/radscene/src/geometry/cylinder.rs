//! Cylinder, and tube (a cylinder with inward normals).

use serde_json::json;

use super::{point_at, real_line};
use crate::dict::{reals, Dict, DictArgs, FieldContext};
use crate::error::Result;
use crate::primitive::PrimitiveParams;
use crate::typing::float_positive;
use crate::value::Values;

/// Cylinder between two center points.
#[derive(Debug, Clone, PartialEq)]
pub struct Cylinder {
    /// Center of the start cap.
    pub center_pt_start: [f64; 3],
    /// Center of the end cap.
    pub center_pt_end: [f64; 3],
    /// Radius.
    pub radius: f64,
}

impl Default for Cylinder {
    fn default() -> Self {
        Self {
            center_pt_start: [0.0; 3],
            center_pt_end: [0.0, 0.0, 10.0],
            radius: 10.0,
        }
    }
}

impl Cylinder {
    /// Create and validate.
    pub fn new(center_pt_start: [f64; 3], center_pt_end: [f64; 3], radius: f64) -> Result<Self> {
        let cylinder = Self {
            center_pt_start,
            center_pt_end,
            radius,
        };
        cylinder.validate()?;
        Ok(cylinder)
    }
}

impl PrimitiveParams for Cylinder {
    fn validate(&self) -> Result<()> {
        float_positive(self.radius, "cylinder radius")?;
        Ok(())
    }

    fn values(&self) -> Values {
        let line = real_line([&self.center_pt_start, &self.center_pt_end], &[self.radius]);
        [Vec::new(), Vec::new(), line]
    }

    fn from_values(values: &Values, name: &str) -> Result<Self> {
        let v = reals(values, 2, &[7], name)?;
        Ok(Self {
            center_pt_start: point_at(&v, 0),
            center_pt_end: point_at(&v, 3),
            radius: v[6],
        })
    }

    fn write_fields(&self, dict: &mut Dict) -> Result<()> {
        dict.insert("center_pt_start".into(), json!(self.center_pt_start));
        dict.insert("radius".into(), json!(self.radius));
        dict.insert("center_pt_end".into(), json!(self.center_pt_end));
        Ok(())
    }

    fn from_fields(dict: &Dict, ctx: &FieldContext<'_>) -> Result<Self> {
        Ok(Self {
            center_pt_start: dict.triple("center_pt_start", ctx.name)?,
            center_pt_end: dict.triple("center_pt_end", ctx.name)?,
            radius: dict.real("radius", ctx.name)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitive::Primitive;
    use crate::types::PrimitiveType;

    #[test]
    fn test_tube_dict_uses_identifier() {
        let tube = Primitive::from_string("void tube t 0 0 7 0 0 0 0 0 3 0.25").unwrap();
        assert_eq!(tube.primitive_type(), PrimitiveType::Tube);
        let data = tube.to_dict().unwrap();
        assert_eq!(data["type"], "tube");
        assert_eq!(data["identifier"], "t");
        assert!(data.get("name").is_none());
        assert_eq!(Primitive::from_dict(&data).unwrap(), tube);
    }

    #[test]
    fn test_cylinder_values() {
        let c = Cylinder::new([1.0, 2.0, 3.0], [1.0, 2.0, 4.0], 0.5).unwrap();
        assert_eq!(c.values()[2].len(), 7);
        assert!(Cylinder::new([0.0; 3], [0.0; 3], -0.5).is_err());
    }
}
