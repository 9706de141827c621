//! Ring: flat annulus.

use serde_json::json;

use super::{point_at, real_line};
use crate::dict::{reals, Dict, DictArgs, FieldContext};
use crate::error::Result;
use crate::primitive::PrimitiveParams;
use crate::typing::float_positive;
use crate::value::Values;

/// Flat ring around a center point.
#[derive(Debug, Clone, PartialEq)]
pub struct Ring {
    /// Center point.
    pub center_pt: [f64; 3],
    /// Surface normal.
    pub normal_vector: [f64; 3],
    /// Inner radius; zero gives a disk.
    pub radius_inner: f64,
    /// Outer radius.
    pub radius_outer: f64,
}

impl Default for Ring {
    fn default() -> Self {
        Self {
            center_pt: [0.0; 3],
            normal_vector: [0.0, 0.0, 1.0],
            radius_inner: 5.0,
            radius_outer: 10.0,
        }
    }
}

impl Ring {
    /// Create and validate.
    pub fn new(center_pt: [f64; 3], normal_vector: [f64; 3], radius_inner: f64, radius_outer: f64) -> Result<Self> {
        let ring = Self {
            center_pt,
            normal_vector,
            radius_inner,
            radius_outer,
        };
        ring.validate()?;
        Ok(ring)
    }
}

impl PrimitiveParams for Ring {
    fn validate(&self) -> Result<()> {
        float_positive(self.radius_inner, "ring inner radius")?;
        float_positive(self.radius_outer, "ring outer radius")?;
        Ok(())
    }

    fn values(&self) -> Values {
        let line = real_line(
            [&self.center_pt, &self.normal_vector],
            &[self.radius_inner, self.radius_outer],
        );
        [Vec::new(), Vec::new(), line]
    }

    fn from_values(values: &Values, name: &str) -> Result<Self> {
        let v = reals(values, 2, &[8], name)?;
        Ok(Self {
            center_pt: point_at(&v, 0),
            normal_vector: point_at(&v, 3),
            radius_inner: v[6],
            radius_outer: v[7],
        })
    }

    fn write_fields(&self, dict: &mut Dict) -> Result<()> {
        dict.insert("center_pt".into(), json!(self.center_pt));
        dict.insert("normal_vector".into(), json!(self.normal_vector));
        dict.insert("radius_inner".into(), json!(self.radius_inner));
        dict.insert("radius_outer".into(), json!(self.radius_outer));
        Ok(())
    }

    fn from_fields(dict: &Dict, ctx: &FieldContext<'_>) -> Result<Self> {
        Ok(Self {
            center_pt: dict.triple("center_pt", ctx.name)?,
            normal_vector: dict.triple("normal_vector", ctx.name)?,
            radius_inner: dict.real("radius_inner", ctx.name)?,
            radius_outer: dict.real("radius_outer", ctx.name)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitive::Primitive;

    #[test]
    fn test_ring() {
        let ring = Primitive::new("disk", Ring::new([0.0; 3], [0.0, 0.0, 1.0], 0.0, 2.0).unwrap()).unwrap();
        assert_eq!(
            ring.to_radiance(true, true, true),
            "void ring disk 0 0 8 0.0 0.0 0.0 0.0 0.0 1.0 0.0 2.0"
        );
        let data = ring.to_dict().unwrap();
        assert_eq!(data["identifier"], "disk");
        assert_eq!(data["normal_vector"], json!([0.0, 0.0, 1.0]));
        assert_eq!(Primitive::from_dict(&data).unwrap(), ring);
        assert!(Ring::new([0.0; 3], [0.0, 0.0, 1.0], -1.0, 2.0).is_err());
    }
}
