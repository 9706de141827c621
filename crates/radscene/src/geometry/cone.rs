//! Cone, and cup (a cone with inward normals).

use serde_json::json;

use super::{point_at, real_line};
use crate::dict::{reals, Dict, DictArgs, FieldContext};
use crate::error::Result;
use crate::primitive::PrimitiveParams;
use crate::typing::float_positive;
use crate::value::Values;

/// Truncated cone between two center points.
#[derive(Debug, Clone, PartialEq)]
pub struct Cone {
    /// Center of the start cap.
    pub center_pt_start: [f64; 3],
    /// Center of the end cap.
    pub center_pt_end: [f64; 3],
    /// Radius at the start.
    pub radius_start: f64,
    /// Radius at the end.
    pub radius_end: f64,
}

impl Default for Cone {
    fn default() -> Self {
        Self {
            center_pt_start: [0.0; 3],
            center_pt_end: [0.0, 0.0, 10.0],
            radius_start: 10.0,
            radius_end: 0.0,
        }
    }
}

impl Cone {
    /// Create and validate.
    pub fn new(center_pt_start: [f64; 3], radius_start: f64, center_pt_end: [f64; 3], radius_end: f64) -> Result<Self> {
        let cone = Self {
            center_pt_start,
            center_pt_end,
            radius_start,
            radius_end,
        };
        cone.validate()?;
        Ok(cone)
    }
}

impl PrimitiveParams for Cone {
    fn validate(&self) -> Result<()> {
        float_positive(self.radius_start, "cone start radius")?;
        float_positive(self.radius_end, "cone end radius")?;
        Ok(())
    }

    fn values(&self) -> Values {
        let line = real_line(
            [&self.center_pt_start, &self.center_pt_end],
            &[self.radius_start, self.radius_end],
        );
        [Vec::new(), Vec::new(), line]
    }

    fn from_values(values: &Values, name: &str) -> Result<Self> {
        let v = reals(values, 2, &[8], name)?;
        Ok(Self {
            center_pt_start: point_at(&v, 0),
            center_pt_end: point_at(&v, 3),
            radius_start: v[6],
            radius_end: v[7],
        })
    }

    fn write_fields(&self, dict: &mut Dict) -> Result<()> {
        dict.insert("radius_start".into(), json!(self.radius_start));
        dict.insert("center_pt_start".into(), json!(self.center_pt_start));
        dict.insert("radius_end".into(), json!(self.radius_end));
        dict.insert("center_pt_end".into(), json!(self.center_pt_end));
        Ok(())
    }

    fn from_fields(dict: &Dict, ctx: &FieldContext<'_>) -> Result<Self> {
        Ok(Self {
            center_pt_start: dict.triple("center_pt_start", ctx.name)?,
            center_pt_end: dict.triple("center_pt_end", ctx.name)?,
            radius_start: dict.real("radius_start", ctx.name)?,
            radius_end: dict.real("radius_end", ctx.name)?,
        })
    }
}
