//! Source: distant light source such as the sun.

use serde_json::json;

use super::{point_at, real_line};
use crate::dict::{reals, Dict, DictArgs, FieldContext};
use crate::error::Result;
use crate::primitive::PrimitiveParams;
use crate::typing::float_positive;
use crate::value::Values;

/// Direction and subtended angle (degrees) of a distant source.
#[derive(Debug, Clone, PartialEq)]
pub struct Source {
    /// Direction towards the source.
    pub direction: [f64; 3],
    /// Angle subtended by the source, in degrees.
    pub angle: f64,
}

impl Default for Source {
    fn default() -> Self {
        Self {
            direction: [0.0, 0.0, -1.0],
            angle: 0.533,
        }
    }
}

impl Source {
    /// Create and validate.
    pub fn new(direction: [f64; 3], angle: f64) -> Result<Self> {
        let source = Self { direction, angle };
        source.validate()?;
        Ok(source)
    }
}

impl PrimitiveParams for Source {
    fn validate(&self) -> Result<()> {
        float_positive(self.angle, "source angle")?;
        Ok(())
    }

    fn values(&self) -> Values {
        [Vec::new(), Vec::new(), real_line([&self.direction], &[self.angle])]
    }

    fn from_values(values: &Values, name: &str) -> Result<Self> {
        let v = reals(values, 2, &[4], name)?;
        Ok(Self {
            direction: point_at(&v, 0),
            angle: v[3],
        })
    }

    fn write_fields(&self, dict: &mut Dict) -> Result<()> {
        dict.insert("direction".into(), json!(self.direction));
        dict.insert("angle".into(), json!(self.angle));
        Ok(())
    }

    fn from_fields(dict: &Dict, ctx: &FieldContext<'_>) -> Result<Self> {
        Ok(Self {
            direction: dict.triple("direction", ctx.name)?,
            angle: dict.opt_real("angle", ctx.name)?.unwrap_or(0.533),
        })
    }
}
