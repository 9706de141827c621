//! Point-in-time Perez sky from measured irradiance (`gendaylit`).

use std::fmt;

use serde_json::{json, Value as JsonValue};
use tracing::warn;

use super::cie::{check_altitude, check_azimuth};
use super::{
    base_dict, check_ground_reflectance, read_hemispheres, sky_text, write_hemispheres, Ground, SkyHemisphere,
    DEFAULT_GROUND_REFLECTANCE,
};
use crate::dict::{as_dict, check_type, DictArgs};
use crate::error::{RadianceError, Result};
use crate::value::format_number;
use crate::view::parse_options;

/// Climate-based sky for a sun position and a pair of irradiance values in
/// whole W/m².
#[derive(Debug, Clone, PartialEq)]
pub struct ClimateBased {
    altitude: f64,
    azimuth: f64,
    direct_normal_irradiance: u32,
    diffuse_horizontal_irradiance: u32,
    ground_reflectance: f64,
    ground_hemisphere: Ground,
    sky_hemisphere: SkyHemisphere,
}

fn irradiance(value: f64, name: &str) -> Result<u32> {
    if value.fract() != 0.0 || value < 0.0 || value > f64::from(u32::MAX) {
        return Err(RadianceError::OutOfRange {
            name: name.to_string(),
            value,
            min: 0.0,
            max: f64::from(u32::MAX),
        });
    }
    Ok(value as u32)
}

impl ClimateBased {
    /// Create and validate.
    pub fn new(
        altitude: f64,
        azimuth: f64,
        direct_normal_irradiance: u32,
        diffuse_horizontal_irradiance: u32,
        ground_reflectance: f64,
    ) -> Result<Self> {
        Ok(Self {
            altitude: check_altitude(altitude)?,
            azimuth: check_azimuth(azimuth)?,
            direct_normal_irradiance,
            diffuse_horizontal_irradiance,
            ground_reflectance: check_ground_reflectance(ground_reflectance)?,
            ground_hemisphere: Ground::default(),
            sky_hemisphere: SkyHemisphere::default(),
        })
    }

    /// Read `climate-based -alt <deg> -az <deg> -dni <W/m²> -dhi <W/m²> [-g <reflectance>]`.
    pub fn from_string(text: &str) -> Result<Self> {
        let mut found: [Option<f64>; 4] = [None; 4];
        let mut ground_reflectance = DEFAULT_GROUND_REFLECTANCE;
        for (option, values) in parse_options(text)? {
            let slot = match option.as_str() {
                "alt" => 0,
                "az" => 1,
                "dni" => 2,
                "dhi" => 3,
                "g" => {
                    if let [g] = values.as_slice() {
                        ground_reflectance = *g;
                    }
                    continue;
                }
                other => {
                    warn!(option = other, "not a climate-based sky option; ignored");
                    continue;
                }
            };
            if let [v] = values.as_slice() {
                found[slot] = Some(*v);
            }
        }
        let mut values = [0.0; 4];
        for (value, (slot, name)) in values.iter_mut().zip(found.iter().zip(["alt", "az", "dni", "dhi"])) {
            *value = slot.ok_or_else(|| RadianceError::parse(text, format!("climate-based sky needs -{}", name)))?;
        }
        Self::new(
            values[0],
            values[1],
            irradiance(values[2], "direct normal irradiance")?,
            irradiance(values[3], "diffuse horizontal irradiance")?,
            ground_reflectance,
        )
    }

    /// Solar altitude in degrees above the horizon.
    pub fn altitude(&self) -> f64 {
        self.altitude
    }

    /// Solar azimuth in degrees clockwise from north.
    pub fn azimuth(&self) -> f64 {
        self.azimuth
    }

    /// Direct normal irradiance in W/m².
    pub fn direct_normal_irradiance(&self) -> u32 {
        self.direct_normal_irradiance
    }

    /// Diffuse horizontal irradiance in W/m².
    pub fn diffuse_horizontal_irradiance(&self) -> u32 {
        self.diffuse_horizontal_irradiance
    }

    /// Average ground reflectance.
    pub fn ground_reflectance(&self) -> f64 {
        self.ground_reflectance
    }

    /// Ground glow source.
    pub fn ground_hemisphere(&self) -> &Ground {
        &self.ground_hemisphere
    }

    /// Sky glow source.
    pub fn sky_hemisphere(&self) -> &SkyHemisphere {
        &self.sky_hemisphere
    }

    /// `gendaylit` command with visible radiance output, and hemispheres.
    pub fn to_radiance(&self) -> String {
        self.sky(0)
    }

    /// Definition with a `gendaylit -O` output type: 0 visible radiance,
    /// 1 solar radiance, 2 luminance.
    pub fn to_radiance_with_output(&self, output_type: u8) -> Result<String> {
        if output_type > 2 {
            return Err(RadianceError::OutOfRange {
                name: "sky output type".into(),
                value: f64::from(output_type),
                min: 0.0,
                max: 2.0,
            });
        }
        Ok(self.sky(output_type))
    }

    fn sky(&self, output_type: u8) -> String {
        let command = format!(
            "!gendaylit -ang {:.6} {:.6} -O{} -W {} {} -g {:.3}",
            self.altitude,
            self.azimuth - 180.0,
            output_type,
            self.direct_normal_irradiance,
            self.diffuse_horizontal_irradiance,
            self.ground_reflectance
        );
        sky_text(&command, &self.sky_hemisphere, &self.ground_hemisphere)
    }

    /// Default file name, after the sun position and irradiance.
    pub fn file_name(&self) -> String {
        format!(
            "{:.3}_{:.3}_{}_{}.sky",
            self.altitude, self.azimuth, self.direct_normal_irradiance, self.diffuse_horizontal_irradiance
        )
    }

    /// Dictionary form.
    pub fn to_dict(&self) -> JsonValue {
        let mut dict = base_dict("ClimateBased");
        dict.insert("altitude".into(), json!(self.altitude));
        dict.insert("azimuth".into(), json!(self.azimuth));
        dict.insert("direct_normal_irradiance".into(), json!(self.direct_normal_irradiance));
        dict.insert("diffuse_horizontal_irradiance".into(), json!(self.diffuse_horizontal_irradiance));
        dict.insert("ground_reflectance".into(), json!(self.ground_reflectance));
        write_hemispheres(&mut dict, &self.sky_hemisphere, &self.ground_hemisphere);
        JsonValue::Object(dict)
    }

    /// Read a dictionary.
    pub fn from_dict(data: &JsonValue) -> Result<Self> {
        let dict = as_dict(data, "ClimateBased")?;
        check_type(dict, "ClimateBased")?;
        let mut sky = Self::new(
            dict.real("altitude", "ClimateBased")?,
            dict.real("azimuth", "ClimateBased")?,
            irradiance(
                dict.real("direct_normal_irradiance", "ClimateBased")?,
                "direct normal irradiance",
            )?,
            irradiance(
                dict.real("diffuse_horizontal_irradiance", "ClimateBased")?,
                "diffuse horizontal irradiance",
            )?,
            dict.opt_real("ground_reflectance", "ClimateBased")?.unwrap_or(DEFAULT_GROUND_REFLECTANCE),
        )?;
        read_hemispheres(dict, &mut sky.sky_hemisphere, &mut sky.ground_hemisphere)?;
        Ok(sky)
    }
}

impl fmt::Display for ClimateBased {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "climate-based -alt {} -az {} -dni {} -dhi {} -g {}",
            format_number(self.altitude),
            format_number(self.azimuth),
            self.direct_normal_irradiance,
            self.diffuse_horizontal_irradiance,
            format_number(self.ground_reflectance)
        )
    }
}
