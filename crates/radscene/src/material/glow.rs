//! Light-emitting materials.

use serde_json::json;

use crate::dict::{reals, Dict, DictArgs, FieldContext};
use crate::error::Result;
use crate::primitive::PrimitiveParams;
use crate::typing::float_positive;
use crate::value::{Value, Values};

/// Light source material that does not participate in direct calculation
/// beyond `max_radius`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Glow {
    /// Red emittance, zero or positive.
    pub r_emittance: f64,
    /// Green emittance, zero or positive.
    pub g_emittance: f64,
    /// Blue emittance, zero or positive.
    pub b_emittance: f64,
    /// Maximum radius for shadow testing; zero disables it and a negative
    /// value keeps the surface out of scene illumination.
    pub max_radius: f64,
}

/// Basic emitter.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Light {
    /// Red emittance, zero or positive.
    pub r_emittance: f64,
    /// Green emittance, zero or positive.
    pub g_emittance: f64,
    /// Blue emittance, zero or positive.
    pub b_emittance: f64,
}

fn check_emittance(r: f64, g: f64, b: f64) -> Result<()> {
    float_positive(r, "red emittance")?;
    float_positive(g, "green emittance")?;
    float_positive(b, "blue emittance")?;
    Ok(())
}

impl Glow {
    /// Create and validate.
    pub fn new(r: f64, g: f64, b: f64, max_radius: f64) -> Result<Self> {
        let glow = Self {
            r_emittance: r,
            g_emittance: g,
            b_emittance: b,
            max_radius,
        };
        glow.validate()?;
        Ok(glow)
    }

    /// Same emittance for all three channels.
    pub fn from_single_value(rgb: f64, max_radius: f64) -> Result<Self> {
        Self::new(rgb, rgb, rgb, max_radius)
    }
}

impl PrimitiveParams for Glow {
    fn validate(&self) -> Result<()> {
        check_emittance(self.r_emittance, self.g_emittance, self.b_emittance)
    }

    fn values(&self) -> Values {
        let line = [self.r_emittance, self.g_emittance, self.b_emittance, self.max_radius];
        [Vec::new(), Vec::new(), line.into_iter().map(Value::Number).collect()]
    }

    fn from_values(values: &Values, name: &str) -> Result<Self> {
        let v = reals(values, 2, &[4], name)?;
        Ok(Self {
            r_emittance: v[0],
            g_emittance: v[1],
            b_emittance: v[2],
            max_radius: v[3],
        })
    }

    fn write_fields(&self, dict: &mut Dict) -> Result<()> {
        dict.insert("r_emittance".into(), json!(self.r_emittance));
        dict.insert("g_emittance".into(), json!(self.g_emittance));
        dict.insert("b_emittance".into(), json!(self.b_emittance));
        dict.insert("max_radius".into(), json!(self.max_radius));
        Ok(())
    }

    fn from_fields(dict: &Dict, ctx: &FieldContext<'_>) -> Result<Self> {
        Ok(Self {
            r_emittance: dict.real("r_emittance", ctx.name)?,
            g_emittance: dict.real("g_emittance", ctx.name)?,
            b_emittance: dict.real("b_emittance", ctx.name)?,
            max_radius: dict.opt_real("max_radius", ctx.name)?.unwrap_or(0.0),
        })
    }
}

impl Light {
    /// Create and validate.
    pub fn new(r: f64, g: f64, b: f64) -> Result<Self> {
        let light = Self {
            r_emittance: r,
            g_emittance: g,
            b_emittance: b,
        };
        light.validate()?;
        Ok(light)
    }

    /// Same emittance for all three channels.
    pub fn from_single_value(rgb: f64) -> Result<Self> {
        Self::new(rgb, rgb, rgb)
    }
}

impl PrimitiveParams for Light {
    fn validate(&self) -> Result<()> {
        check_emittance(self.r_emittance, self.g_emittance, self.b_emittance)
    }

    fn values(&self) -> Values {
        let line = [self.r_emittance, self.g_emittance, self.b_emittance];
        [Vec::new(), Vec::new(), line.into_iter().map(Value::Number).collect()]
    }

    fn from_values(values: &Values, name: &str) -> Result<Self> {
        let v = reals(values, 2, &[3], name)?;
        Ok(Self {
            r_emittance: v[0],
            g_emittance: v[1],
            b_emittance: v[2],
        })
    }

    fn write_fields(&self, dict: &mut Dict) -> Result<()> {
        dict.insert("r_emittance".into(), json!(self.r_emittance));
        dict.insert("g_emittance".into(), json!(self.g_emittance));
        dict.insert("b_emittance".into(), json!(self.b_emittance));
        Ok(())
    }

    fn from_fields(dict: &Dict, ctx: &FieldContext<'_>) -> Result<Self> {
        Ok(Self {
            r_emittance: dict.real("r_emittance", ctx.name)?,
            g_emittance: dict.real("g_emittance", ctx.name)?,
            b_emittance: dict.real("b_emittance", ctx.name)?,
        })
    }
}
