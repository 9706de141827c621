//! Glass: thin transmitting material with internal reflections.

use serde_json::json;

use super::luminance;
use crate::dict::{reals, Dict, DictArgs, FieldContext};
use crate::error::{RadianceError, Result};
use crate::primitive::PrimitiveParams;
use crate::typing::float_in_range;
use crate::value::{Value, Values};

const A: f64 = 0.8402528435;
const B: f64 = 0.0072522239;
const C: f64 = 0.9166530661;
const D: f64 = 0.0036261119;

/// Glass material.
///
/// Parameters are transmissivities (the fraction of light getting through the
/// medium at normal incidence), not transmittances.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Glass {
    /// Red transmissivity in `[0, 1]`.
    pub r_transmissivity: f64,
    /// Green transmissivity in `[0, 1]`.
    pub g_transmissivity: f64,
    /// Blue transmissivity in `[0, 1]`.
    pub b_transmissivity: f64,
    /// Index of refraction; 1.52 when unset.
    pub refraction_index: Option<f64>,
}

impl Glass {
    /// Create from transmissivities.
    pub fn new(r: f64, g: f64, b: f64, refraction_index: Option<f64>) -> Result<Self> {
        let glass = Self {
            r_transmissivity: r,
            g_transmissivity: g,
            b_transmissivity: b,
            refraction_index,
        };
        glass.validate()?;
        Ok(glass)
    }

    /// Create from transmittances, converting each channel.
    pub fn from_transmittance(r: f64, g: f64, b: f64, refraction_index: Option<f64>) -> Result<Self> {
        Self::new(
            Self::get_transmissivity(r),
            Self::get_transmissivity(g),
            Self::get_transmissivity(b),
            refraction_index,
        )
    }

    /// Same transmissivity for all three channels.
    pub fn from_single_transmissivity(value: f64, refraction_index: Option<f64>) -> Result<Self> {
        Self::new(value, value, value, refraction_index)
    }

    /// Same transmittance for all three channels.
    pub fn from_single_transmittance(value: f64, refraction_index: Option<f64>) -> Result<Self> {
        Self::from_transmittance(value, value, value, refraction_index)
    }

    /// Weighted average transmissivity.
    pub fn average_transmissivity(&self) -> f64 {
        luminance(self.r_transmissivity, self.g_transmissivity, self.b_transmissivity)
    }

    /// Weighted average transmittance.
    pub fn average_transmittance(&self) -> f64 {
        luminance(
            Self::get_transmittance(self.r_transmissivity),
            Self::get_transmittance(self.g_transmissivity),
            Self::get_transmittance(self.b_transmissivity),
        )
    }

    /// Convert a transmittance to a transmissivity.
    pub fn get_transmissivity(transmittance: f64) -> f64 {
        if transmittance == 0.0 {
            return 0.0;
        }
        ((A + B * transmittance * transmittance).sqrt() - C) / D / transmittance
    }

    /// Convert a transmissivity back to a transmittance.
    ///
    /// Inverse of [`Glass::get_transmissivity`].
    pub fn get_transmittance(transmissivity: f64) -> f64 {
        if transmissivity == 0.0 {
            return 0.0;
        }
        let qa = transmissivity * transmissivity * D * D - B;
        let qb = 2.0 * transmissivity * D * C;
        let qc = C * C - A;
        (-qb - (qb * qb - 4.0 * qa * qc).sqrt()) / (2.0 * qa)
    }
}

impl PrimitiveParams for Glass {
    fn validate(&self) -> Result<()> {
        float_in_range(self.r_transmissivity, 0.0, 1.0, "red transmissivity")?;
        float_in_range(self.g_transmissivity, 0.0, 1.0, "green transmissivity")?;
        float_in_range(self.b_transmissivity, 0.0, 1.0, "blue transmissivity")?;
        if let Some(index) = self.refraction_index {
            if index <= 0.0 {
                return Err(RadianceError::OutOfRange {
                    name: "refraction index".into(),
                    value: index,
                    min: 0.0,
                    max: f64::INFINITY,
                });
            }
        }
        Ok(())
    }

    fn values(&self) -> Values {
        let mut line: Vec<Value> = [self.r_transmissivity, self.g_transmissivity, self.b_transmissivity]
            .into_iter()
            .map(Value::Number)
            .collect();
        line.extend(self.refraction_index.map(Value::Number));
        [Vec::new(), Vec::new(), line]
    }

    fn from_values(values: &Values, name: &str) -> Result<Self> {
        let v = reals(values, 2, &[3, 4], name)?;
        Ok(Self {
            r_transmissivity: v[0],
            g_transmissivity: v[1],
            b_transmissivity: v[2],
            refraction_index: v.get(3).copied(),
        })
    }

    fn write_fields(&self, dict: &mut Dict) -> Result<()> {
        dict.insert("r_transmissivity".into(), json!(self.r_transmissivity));
        dict.insert("g_transmissivity".into(), json!(self.g_transmissivity));
        dict.insert("b_transmissivity".into(), json!(self.b_transmissivity));
        dict.insert("refraction_index".into(), json!(self.refraction_index));
        Ok(())
    }

    fn from_fields(dict: &Dict, ctx: &FieldContext<'_>) -> Result<Self> {
        Ok(Self {
            r_transmissivity: dict.real("r_transmissivity", ctx.name)?,
            g_transmissivity: dict.real("g_transmissivity", ctx.name)?,
            b_transmissivity: dict.real("b_transmissivity", ctx.name)?,
            refraction_index: dict.opt_real("refraction_index", ctx.name)?,
        })
    }
}
