//! Uniform cloudy sky of a fixed horizontal irradiance (`gensky -c -B`).

use std::fmt;

use serde_json::{json, Value as JsonValue};
use tracing::warn;

use super::{
    base_dict, check_ground_reflectance, read_hemispheres, sky_text, write_hemispheres, Ground, SkyHemisphere,
    DEFAULT_GROUND_REFLECTANCE,
};
use crate::dict::{as_dict, check_type, DictArgs};
use crate::error::{RadianceError, Result};
use crate::typing::float_positive;
use crate::value::format_number;
use crate::view::parse_options;

/// Luminous efficacy Radiance uses to convert W/m² to lux.
pub const LUMINOUS_EFFICACY: f64 = 179.0;

/// Irradiance of a sky with 100,000 lux horizontal illuminance.
pub const DEFAULT_IRRADIANCE: f64 = 558.659;

/// Cloudy sky scaled to a horizontal diffuse irradiance.
#[derive(Debug, Clone, PartialEq)]
pub struct CertainIrradiance {
    irradiance: f64,
    ground_reflectance: f64,
    ground_hemisphere: Ground,
    sky_hemisphere: SkyHemisphere,
}

impl Default for CertainIrradiance {
    fn default() -> Self {
        Self {
            irradiance: DEFAULT_IRRADIANCE,
            ground_reflectance: DEFAULT_GROUND_REFLECTANCE,
            ground_hemisphere: Ground::default(),
            sky_hemisphere: SkyHemisphere::default(),
        }
    }
}

impl CertainIrradiance {
    /// Sky of `irradiance` W/m² over a ground of `ground_reflectance`.
    pub fn new(irradiance: f64, ground_reflectance: f64) -> Result<Self> {
        let mut sky = Self::default();
        sky.set_irradiance(irradiance)?;
        sky.set_ground_reflectance(ground_reflectance)?;
        Ok(sky)
    }

    /// Sky of `illuminance` lux, converted at [`LUMINOUS_EFFICACY`].
    pub fn from_illuminance(illuminance: f64, ground_reflectance: f64) -> Result<Self> {
        Self::new(illuminance / LUMINOUS_EFFICACY, ground_reflectance)
    }

    /// Read `irradiance <W/m²> [-g <reflectance>]` or
    /// `illuminance <lux> [-g <reflectance>]`.
    pub fn from_string(text: &str) -> Result<Self> {
        let mut tokens = text.split_whitespace();
        let kind = tokens.next().unwrap_or_default().to_lowercase();
        let value: f64 = tokens
            .next()
            .and_then(|t| t.parse().ok())
            .ok_or_else(|| RadianceError::parse(text, format!("{} sky needs a number after its type", kind)))?;
        let mut ground_reflectance = DEFAULT_GROUND_REFLECTANCE;
        for (option, values) in parse_options(&tokens.collect::<Vec<_>>().join(" "))? {
            match (option.as_str(), values.as_slice()) {
                ("g", [g]) => ground_reflectance = *g,
                _ => warn!(option = %option, "not a certain irradiance sky option; ignored"),
            }
        }
        match kind.as_str() {
            "irradiance" => Self::new(value, ground_reflectance),
            "illuminance" => Self::from_illuminance(value, ground_reflectance),
            other => Err(RadianceError::type_mismatch("irradiance or illuminance", other)),
        }
    }

    /// Horizontal diffuse irradiance in W/m².
    pub fn irradiance(&self) -> f64 {
        self.irradiance
    }

    /// Set the irradiance; must not be negative.
    pub fn set_irradiance(&mut self, irradiance: f64) -> Result<()> {
        self.irradiance = float_positive(irradiance, "irradiance")?;
        Ok(())
    }

    /// Horizontal illuminance in lux, rounded to two decimals.
    pub fn illuminance(&self) -> f64 {
        (self.irradiance * LUMINOUS_EFFICACY * 100.0).round() / 100.0
    }

    /// Average ground reflectance.
    pub fn ground_reflectance(&self) -> f64 {
        self.ground_reflectance
    }

    /// Set the ground reflectance; must be in `[0, 1]`.
    pub fn set_ground_reflectance(&mut self, value: f64) -> Result<()> {
        self.ground_reflectance = check_ground_reflectance(value)?;
        Ok(())
    }

    /// Ground glow source.
    pub fn ground_hemisphere(&self) -> &Ground {
        &self.ground_hemisphere
    }

    /// Sky glow source.
    pub fn sky_hemisphere(&self) -> &SkyHemisphere {
        &self.sky_hemisphere
    }

    /// `gensky` command and hemispheres.
    pub fn to_radiance(&self) -> String {
        let command = format!(
            "!gensky -ang 45 0 -c -B {:.6} -g {:.3}",
            self.irradiance, self.ground_reflectance
        );
        sky_text(&command, &self.sky_hemisphere, &self.ground_hemisphere)
    }

    /// Default file name, after the illuminance.
    pub fn file_name(&self) -> String {
        format!("{}_lux.sky", self.illuminance() as i64)
    }

    /// Dictionary form.
    pub fn to_dict(&self) -> JsonValue {
        let mut dict = base_dict("CertainIrradiance");
        dict.insert("irradiance".into(), json!(self.irradiance));
        dict.insert("ground_reflectance".into(), json!(self.ground_reflectance));
        write_hemispheres(&mut dict, &self.sky_hemisphere, &self.ground_hemisphere);
        JsonValue::Object(dict)
    }

    /// Read a dictionary. Absent values take their defaults.
    pub fn from_dict(data: &JsonValue) -> Result<Self> {
        let dict = as_dict(data, "CertainIrradiance")?;
        check_type(dict, "CertainIrradiance")?;
        let mut sky = Self::new(
            dict.opt_real("irradiance", "CertainIrradiance")?.unwrap_or(DEFAULT_IRRADIANCE),
            dict.opt_real("ground_reflectance", "CertainIrradiance")?
                .unwrap_or(DEFAULT_GROUND_REFLECTANCE),
        )?;
        read_hemispheres(dict, &mut sky.sky_hemisphere, &mut sky.ground_hemisphere)?;
        Ok(sky)
    }
}

impl fmt::Display for CertainIrradiance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "irradiance {} -g {}",
            format_number(self.irradiance),
            format_number(self.ground_reflectance)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_defaults() {
        let sky = CertainIrradiance::default();
        assert_relative_eq!(sky.irradiance(), 558.659);
        assert_relative_eq!(sky.illuminance(), 99999.96);
        assert_relative_eq!(sky.ground_reflectance(), 0.2);
        assert_eq!(sky.file_name(), "99999_lux.sky");
    }

    #[test]
    fn test_to_radiance() {
        let sky = CertainIrradiance::new(100.0, 0.25).unwrap();
        let text = sky.to_radiance();
        let blocks: Vec<&str> = text.trim_end().split("\n\n").collect();
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[0], "!gensky -ang 45 0 -c -B 100.000000 -g 0.250");
        assert!(blocks[1].starts_with("skyfunc glow sky_glow"));
        assert!(blocks[2].starts_with("skyfunc glow ground_glow"));
        assert!(text.ends_with("4 0 0 -1 180\n"));
    }

    #[test]
    fn test_from_illuminance() {
        let sky = CertainIrradiance::from_illuminance(17900.0, 0.2).unwrap();
        assert_relative_eq!(sky.irradiance(), 100.0);
        assert_relative_eq!(sky.illuminance(), 17900.0);
        assert!(CertainIrradiance::new(-1.0, 0.2).is_err());
        assert!(matches!(
            CertainIrradiance::new(100.0, 1.5),
            Err(RadianceError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_string_round_trip() {
        let sky = CertainIrradiance::from_string("irradiance 250 -g 0.3").unwrap();
        assert_relative_eq!(sky.irradiance(), 250.0);
        assert_relative_eq!(sky.ground_reflectance(), 0.3);
        assert_eq!(sky.to_string(), "irradiance 250.0 -g 0.3");
        assert_eq!(CertainIrradiance::from_string(&sky.to_string()).unwrap(), sky);

        let lux = CertainIrradiance::from_string("illuminance 35800").unwrap();
        assert_relative_eq!(lux.irradiance(), 200.0);
        assert_relative_eq!(lux.ground_reflectance(), 0.2);
        assert!(CertainIrradiance::from_string("irradiance").is_err());
    }

    #[test]
    fn test_dict_round_trip() {
        let mut sky = CertainIrradiance::new(300.0, 0.1).unwrap();
        sky.sky_hemisphere.set_emittance(0.9, 0.9, 0.9).unwrap();
        let data = sky.to_dict();
        assert_eq!(data["type"], "CertainIrradiance");
        assert_eq!(data["irradiance"], 300.0);
        assert_eq!(data["sky_hemisphere"]["r_emittance"], 0.9);
        assert_eq!(CertainIrradiance::from_dict(&data).unwrap(), sky);

        let minimal = json!({"type": "CertainIrradiance"});
        assert_eq!(CertainIrradiance::from_dict(&minimal).unwrap(), CertainIrradiance::default());
    }
}
