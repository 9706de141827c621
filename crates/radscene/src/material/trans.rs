//! Trans: translucent material with diffuse and specular transmission.

use serde_json::json;

use super::luminance;
use crate::dict::{reals, Dict, DictArgs, FieldContext};
use crate::error::{RadianceError, Result};
use crate::primitive::PrimitiveParams;
use crate::typing::float_in_range;
use crate::value::{Value, Values};

/// Translucent material.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Trans {
    /// Red reflectance in `[0, 1]`.
    pub r_reflectance: f64,
    /// Green reflectance in `[0, 1]`.
    pub g_reflectance: f64,
    /// Blue reflectance in `[0, 1]`.
    pub b_reflectance: f64,
    /// Fraction of specularity in `[0, 1]`.
    pub specularity: f64,
    /// RMS slope of surface facets in `[0, 1]`.
    pub roughness: f64,
    /// Fraction of the penetrating light that is transmitted diffusely.
    pub transmitted_diff: f64,
    /// Fraction of the transmitted light that is not diffusely scattered.
    pub transmitted_spec: f64,
}

impl Trans {
    /// Create and validate.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        r: f64,
        g: f64,
        b: f64,
        specularity: f64,
        roughness: f64,
        transmitted_diff: f64,
        transmitted_spec: f64,
    ) -> Result<Self> {
        let trans = Self {
            r_reflectance: r,
            g_reflectance: g,
            b_reflectance: b,
            specularity,
            roughness,
            transmitted_diff,
            transmitted_spec,
        };
        trans.validate()?;
        Ok(trans)
    }

    /// Same reflectance for all three channels.
    pub fn from_single_reflectance(
        value: f64,
        specularity: f64,
        roughness: f64,
        transmitted_diff: f64,
        transmitted_spec: f64,
    ) -> Result<Self> {
        Self::new(value, value, value, specularity, roughness, transmitted_diff, transmitted_spec)
    }

    /// Create from measurable quantities: diffuse reflectance color, reflected
    /// specularity and the diffuse and specular transmittances.
    ///
    /// Fails when the components sum to more than one or the diffuse
    /// reflectance would have to exceed one.
    #[allow(clippy::too_many_arguments)]
    pub fn from_reflected_specularity(
        r: f64,
        g: f64,
        b: f64,
        reflected_specularity: f64,
        roughness: f64,
        transmitted_diff: f64,
        transmitted_spec: f64,
    ) -> Result<Self> {
        let (rs, td, ts) = (reflected_specularity, transmitted_diff, transmitted_spec);
        let rd = luminance(r, g, b);
        let absorb = 1.0 - td - ts - rd - rs;
        if absorb < 0.0 {
            return Err(RadianceError::Physical(format!(
                "Sum of Diffuse Transmission ({:.3}), Specular Transmission ({:.3}), \
                 Specular Reflection ({:.3}) and Diffuse Reflection ({:.3}) cannot be more than 1 ({:.3}).",
                td,
                ts,
                rs,
                rd,
                td + ts + rd + rs
            )));
        }
        let a7 = if td + ts == 0.0 { 0.0 } else { ts / (td + ts) };
        let a6 = if rd + td + ts == 0.0 { 0.0 } else { (td + ts) / (rd + td + ts) };
        let scale = (1.0 - rs) * (1.0 - a6);
        let (a1, a2, a3) = (r / scale, g / scale, b / scale);
        if a1 > 1.0 || a2 > 1.0 || a3 > 1.0 {
            return Err(RadianceError::Physical(
                "This material is physically impossible to create. \
                 Adjust the inputs for diffuse reflectance values."
                    .into(),
            ));
        }
        Self::new(a1, a2, a3, rs, roughness, a6, a7)
    }

    /// Create from average reflectance and transmittance.
    ///
    /// `is_specular` puts the reflectance in the specular component;
    /// `is_diffusing` transmits diffusely instead of specularly.
    pub fn from_average_properties(
        average_reflectance: f64,
        average_transmittance: f64,
        is_specular: bool,
        is_diffusing: bool,
        roughness: f64,
    ) -> Result<Self> {
        let absorb = 1.0 - average_reflectance - average_transmittance;
        if absorb < 0.0 {
            return Err(RadianceError::Physical(format!(
                "Sum of average_reflectance and average_transmittance must be less than or equal to one. Got {}.",
                average_reflectance + average_transmittance
            )));
        }
        let (spec_ref, diff_ref, total_trans) = if is_specular {
            (average_reflectance, average_transmittance / (1.0 - average_reflectance), 1.0)
        } else {
            let total_ref = 1.0 - absorb;
            let total_trans = if total_ref != 0.0 { average_transmittance / total_ref } else { 0.0 };
            (0.0, total_ref, total_trans)
        };
        let spec_trans = if is_diffusing { 0.0 } else { 1.0 };
        Self::from_single_reflectance(diff_ref, spec_ref, roughness, total_trans, spec_trans)
    }

    fn color_reflectance(&self) -> f64 {
        luminance(self.r_reflectance, self.g_reflectance, self.b_reflectance)
    }

    /// Average reflectance, specular plus diffuse.
    pub fn average_reflectance(&self) -> f64 {
        self.specularity + self.diffuse_reflectance()
    }

    /// Average absorption.
    pub fn average_absorption(&self) -> f64 {
        (1.0 - self.color_reflectance()) * (1.0 - self.specularity)
    }

    /// Average transmittance, diffuse plus specular.
    pub fn average_transmittance(&self) -> f64 {
        (1.0 - self.specularity) * self.transmitted_diff * self.color_reflectance()
    }

    /// Average diffuse reflectance.
    pub fn diffuse_reflectance(&self) -> f64 {
        (1.0 - self.specularity) * self.color_reflectance() * (1.0 - self.transmitted_diff)
    }

    /// Average diffuse transmittance.
    pub fn diffuse_transmittance(&self) -> f64 {
        self.average_transmittance() * (1.0 - self.transmitted_spec)
    }

    /// Average specular transmittance.
    pub fn specular_transmittance(&self) -> f64 {
        self.average_transmittance() * self.transmitted_spec
    }

    /// Threshold below which specular sampling is skipped by the renderer.
    pub fn specular_sampling_threshold(&self) -> f64 {
        self.transmitted_diff * self.transmitted_spec * (1.0 - self.color_reflectance()) * self.specularity
    }
}

impl PrimitiveParams for Trans {
    fn validate(&self) -> Result<()> {
        float_in_range(self.r_reflectance, 0.0, 1.0, "red reflectance")?;
        float_in_range(self.g_reflectance, 0.0, 1.0, "green reflectance")?;
        float_in_range(self.b_reflectance, 0.0, 1.0, "blue reflectance")?;
        float_in_range(self.specularity, 0.0, 1.0, "specularity")?;
        float_in_range(self.roughness, 0.0, 1.0, "roughness")?;
        float_in_range(self.transmitted_diff, 0.0, 1.0, "transmitted diffuse")?;
        float_in_range(self.transmitted_spec, 0.0, 1.0, "transmitted specular")?;
        Ok(())
    }

    fn values(&self) -> Values {
        let line = [
            self.r_reflectance,
            self.g_reflectance,
            self.b_reflectance,
            self.specularity,
            self.roughness,
            self.transmitted_diff,
            self.transmitted_spec,
        ];
        [Vec::new(), Vec::new(), line.into_iter().map(Value::Number).collect()]
    }

    fn from_values(values: &Values, name: &str) -> Result<Self> {
        let v = reals(values, 2, &[7], name)?;
        Ok(Self {
            r_reflectance: v[0],
            g_reflectance: v[1],
            b_reflectance: v[2],
            specularity: v[3],
            roughness: v[4],
            transmitted_diff: v[5],
            transmitted_spec: v[6],
        })
    }

    fn write_fields(&self, dict: &mut Dict) -> Result<()> {
        dict.insert("r_reflectance".into(), json!(self.r_reflectance));
        dict.insert("g_reflectance".into(), json!(self.g_reflectance));
        dict.insert("b_reflectance".into(), json!(self.b_reflectance));
        dict.insert("specularity".into(), json!(self.specularity));
        dict.insert("roughness".into(), json!(self.roughness));
        dict.insert("transmitted_diff".into(), json!(self.transmitted_diff));
        dict.insert("transmitted_spec".into(), json!(self.transmitted_spec));
        Ok(())
    }

    fn from_fields(dict: &Dict, ctx: &FieldContext<'_>) -> Result<Self> {
        Ok(Self {
            r_reflectance: dict.real("r_reflectance", ctx.name)?,
            g_reflectance: dict.real("g_reflectance", ctx.name)?,
            b_reflectance: dict.real("b_reflectance", ctx.name)?,
            specularity: dict.real("specularity", ctx.name)?,
            roughness: dict.real("roughness", ctx.name)?,
            transmitted_diff: dict.real("transmitted_diff", ctx.name)?,
            transmitted_spec: dict.real("transmitted_spec", ctx.name)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitive::{Primitive, PrimitiveKind};
    use approx::assert_relative_eq;

    #[test]
    fn test_from_reflected_specularity() {
        let trans = Trans::from_reflected_specularity(0.5, 0.5, 0.5, 0.0, 0.15, 0.25, 0.25).unwrap();
        assert_relative_eq!(trans.r_reflectance, 1.0);
        assert_relative_eq!(trans.g_reflectance, 1.0);
        assert_relative_eq!(trans.b_reflectance, 1.0);
        assert_eq!(trans.specularity, 0.0);
        assert_eq!(trans.roughness, 0.15);
        assert_relative_eq!(trans.transmitted_diff, 0.5);
        assert_relative_eq!(trans.transmitted_spec, 0.5);
    }

    #[test]
    fn test_energy_balance() {
        let err = Trans::from_reflected_specularity(0.5, 0.5, 0.5, 0.0, 0.0, 0.3, 0.3).unwrap_err();
        assert!(matches!(err, RadianceError::Physical(_)));
        assert!(Trans::from_average_properties(0.6, 0.6, false, true, 0.0).is_err());
    }

    #[test]
    fn test_from_average_properties() {
        let trans = Trans::from_average_properties(0.5, 0.25, false, true, 0.0).unwrap();
        assert_relative_eq!(trans.r_reflectance, 0.75);
        assert_relative_eq!(trans.transmitted_diff, 0.25 / 0.75);
        assert_eq!(trans.transmitted_spec, 0.0);
        let specular = Trans::from_average_properties(0.2, 0.4, true, false, 0.0).unwrap();
        assert_eq!(specular.specularity, 0.2);
        assert_eq!(specular.transmitted_spec, 1.0);
    }

    #[test]
    fn test_derived_properties() {
        let trans = Trans::from_single_reflectance(0.5, 0.0, 0.0, 0.4, 0.5).unwrap();
        assert_relative_eq!(trans.average_transmittance(), 0.2, epsilon = 1e-12);
        assert_relative_eq!(trans.diffuse_reflectance(), 0.3, epsilon = 1e-12);
        assert_relative_eq!(trans.average_reflectance(), 0.3, epsilon = 1e-12);
        assert_relative_eq!(trans.diffuse_transmittance(), 0.1, epsilon = 1e-12);
        assert_relative_eq!(trans.specular_transmittance(), 0.1, epsilon = 1e-12);
        assert_relative_eq!(trans.average_absorption(), 0.5, epsilon = 1e-12);
        assert_eq!(trans.specular_sampling_threshold(), 0.0);
    }

    #[test]
    fn test_range_validation() {
        assert!(Trans::new(0.5, 0.5, 0.5, 0.0, 0.0, 1.5, 0.0).is_err());
        assert!(Trans::new(0.5, 0.5, 0.5, 0.0, 0.0, 0.0, -0.5).is_err());
    }

    #[test]
    fn test_text_and_dict() {
        let p = Primitive::from_string("void trans tr 0 0 7 0.5 0.5 0.5 0 0 0.4 0.5").unwrap();
        let PrimitiveKind::Trans(params) = p.kind() else {
            panic!("expected trans");
        };
        assert_eq!(params.transmitted_spec, 0.5);
        let data = p.to_dict().unwrap();
        assert_eq!(data["type"], "Trans");
        assert_eq!(Primitive::from_dict(&data).unwrap(), p);
    }
}
