//! Sphere, and bubble (a sphere with inward normals).

use serde_json::json;

use super::{point_at, real_line};
use crate::dict::{reals, Dict, DictArgs, FieldContext};
use crate::error::Result;
use crate::primitive::PrimitiveParams;
use crate::typing::float_positive;
use crate::value::Values;

/// Sphere parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Sphere {
    /// Center point.
    pub center_pt: [f64; 3],
    /// Radius, zero or positive.
    pub radius: f64,
}

impl Default for Sphere {
    fn default() -> Self {
        Self {
            center_pt: [0.0; 3],
            radius: 10.0,
        }
    }
}

impl Sphere {
    /// Create and validate.
    pub fn new(center_pt: [f64; 3], radius: f64) -> Result<Self> {
        let sphere = Self { center_pt, radius };
        sphere.validate()?;
        Ok(sphere)
    }
}

impl PrimitiveParams for Sphere {
    fn validate(&self) -> Result<()> {
        float_positive(self.radius, "sphere radius")?;
        Ok(())
    }

    fn values(&self) -> Values {
        [Vec::new(), Vec::new(), real_line([&self.center_pt], &[self.radius])]
    }

    fn from_values(values: &Values, name: &str) -> Result<Self> {
        let v = reals(values, 2, &[4], name)?;
        Ok(Self {
            center_pt: point_at(&v, 0),
            radius: v[3],
        })
    }

    fn write_fields(&self, dict: &mut Dict) -> Result<()> {
        dict.insert("center_pt".into(), json!(self.center_pt));
        dict.insert("radius".into(), json!(self.radius));
        Ok(())
    }

    fn from_fields(dict: &Dict, ctx: &FieldContext<'_>) -> Result<Self> {
        Ok(Self {
            center_pt: dict.triple("center_pt", ctx.name)?,
            radius: dict.real("radius", ctx.name)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitive::{Primitive, PrimitiveKind};
    use crate::types::PrimitiveType;

    #[test]
    fn test_sphere_and_bubble() {
        let sphere = Primitive::new("ball", Sphere::new([0.0, 0.0, 10.0], 2.5).unwrap()).unwrap();
        assert_eq!(sphere.to_radiance(true, true, true), "void sphere ball 0 0 4 0.0 0.0 10.0 2.5");
        assert!(Sphere::new([0.0; 3], -1.0).is_err());

        let bubble = Primitive::from_string("void bubble b 0 0 4 0 0 0 10").unwrap();
        assert_eq!(bubble.primitive_type(), PrimitiveType::Bubble);
        assert!(matches!(bubble.kind(), PrimitiveKind::Bubble(s) if *s == Sphere::default()));
        let data = bubble.to_dict().unwrap();
        assert_eq!(data["type"], "bubble");
        assert_eq!(Primitive::from_dict(&data).unwrap(), bubble);
    }
}
