//! CIE standard skies (`gensky`).

use std::fmt;

use serde_json::{json, Value as JsonValue};
use tracing::warn;

use super::{
    base_dict, check_ground_reflectance, read_hemispheres, sky_text, write_hemispheres, Ground, SkyHemisphere,
    DEFAULT_GROUND_REFLECTANCE,
};
use crate::dict::{as_dict, check_type, DictArgs};
use crate::error::{RadianceError, Result};
use crate::typing::float_in_range;
use crate::value::format_number;
use crate::view::parse_options;

/// CIE sky distribution, numbered 0 to 5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CieSkyType {
    /// Clear sky with a sun source.
    #[default]
    SunnyWithSun,
    /// Clear sky without a sun.
    SunnyWithoutSun,
    /// Intermediate sky with a subdued sun.
    IntermediateWithSun,
    /// Intermediate sky without a sun.
    IntermediateWithoutSun,
    /// Overcast sky.
    Cloudy,
    /// Completely uniform sky.
    UniformCloudy,
}

impl CieSkyType {
    const ALL: [CieSkyType; 6] = [
        CieSkyType::SunnyWithSun,
        CieSkyType::SunnyWithoutSun,
        CieSkyType::IntermediateWithSun,
        CieSkyType::IntermediateWithoutSun,
        CieSkyType::Cloudy,
        CieSkyType::UniformCloudy,
    ];

    /// Sky type from its number.
    pub fn from_index(index: u8) -> Result<Self> {
        Self::ALL.get(usize::from(index)).copied().ok_or(RadianceError::OutOfRange {
            name: "CIE sky type".into(),
            value: f64::from(index),
            min: 0.0,
            max: 5.0,
        })
    }

    /// Number of the sky type.
    pub fn index(self) -> u8 {
        self as u8
    }

    /// `gensky` flag.
    pub fn radiance_flag(self) -> &'static str {
        match self {
            CieSkyType::SunnyWithSun => "+s",
            CieSkyType::SunnyWithoutSun => "-s",
            CieSkyType::IntermediateWithSun => "+i",
            CieSkyType::IntermediateWithoutSun => "-i",
            CieSkyType::Cloudy => "-c",
            CieSkyType::UniformCloudy => "-u",
        }
    }

    /// Readable description.
    pub fn human_readable(self) -> &'static str {
        match self {
            CieSkyType::SunnyWithSun => "Sunny sky with sun",
            CieSkyType::SunnyWithoutSun => "Sunny sky without sun",
            CieSkyType::IntermediateWithSun => "intermediate sky with sun",
            CieSkyType::IntermediateWithoutSun => "intermediate sky without sun",
            CieSkyType::Cloudy => "Cloudy sky",
            CieSkyType::UniformCloudy => "Uniform cloudy sky",
        }
    }
}

/// CIE sky for a sun position.
///
/// Azimuth is in degrees clockwise from north (east 90, south 180). The
/// written `gensky` command converts it to the Radiance convention of
/// degrees west of south.
#[derive(Debug, Clone, PartialEq)]
pub struct Cie {
    altitude: f64,
    azimuth: f64,
    sky_type: CieSkyType,
    ground_reflectance: f64,
    ground_hemisphere: Ground,
    sky_hemisphere: SkyHemisphere,
}

pub(crate) fn check_altitude(value: f64) -> Result<f64> {
    float_in_range(value, -90.0, 90.0, "solar altitude")
}

pub(crate) fn check_azimuth(value: f64) -> Result<f64> {
    float_in_range(value, 0.0, 360.0, "solar azimuth")
}

impl Cie {
    /// Create and validate.
    pub fn new(altitude: f64, azimuth: f64, sky_type: CieSkyType, ground_reflectance: f64) -> Result<Self> {
        Ok(Self {
            altitude: check_altitude(altitude)?,
            azimuth: check_azimuth(azimuth)?,
            sky_type,
            ground_reflectance: check_ground_reflectance(ground_reflectance)?,
            ground_hemisphere: Ground::default(),
            sky_hemisphere: SkyHemisphere::default(),
        })
    }

    /// Read `cie -alt <deg> -az <deg> [-type <0-5>] [-g <reflectance>]`.
    pub fn from_string(text: &str) -> Result<Self> {
        let (mut altitude, mut azimuth) = (None, None);
        let mut sky_type = CieSkyType::default();
        let mut ground_reflectance = DEFAULT_GROUND_REFLECTANCE;
        for (option, values) in parse_options(text)? {
            match (option.as_str(), values.as_slice()) {
                ("alt", [v]) => altitude = Some(*v),
                ("az", [v]) => azimuth = Some(*v),
                ("type", [v]) => sky_type = CieSkyType::from_index(sky_index(*v)?)?,
                ("g", [v]) => ground_reflectance = *v,
                _ => warn!(option = %option, "not a CIE sky option; ignored"),
            }
        }
        let missing = |name: &str| RadianceError::parse(text, format!("CIE sky needs -{}", name));
        Self::new(
            altitude.ok_or_else(|| missing("alt"))?,
            azimuth.ok_or_else(|| missing("az"))?,
            sky_type,
            ground_reflectance,
        )
    }

    /// Solar altitude in degrees above the horizon.
    pub fn altitude(&self) -> f64 {
        self.altitude
    }

    /// Set the altitude; must be in `[-90, 90]`.
    pub fn set_altitude(&mut self, value: f64) -> Result<()> {
        self.altitude = check_altitude(value)?;
        Ok(())
    }

    /// Solar azimuth in degrees clockwise from north.
    pub fn azimuth(&self) -> f64 {
        self.azimuth
    }

    /// Set the azimuth; must be in `[0, 360]`.
    pub fn set_azimuth(&mut self, value: f64) -> Result<()> {
        self.azimuth = check_azimuth(value)?;
        Ok(())
    }

    /// Sky distribution.
    pub fn sky_type(&self) -> CieSkyType {
        self.sky_type
    }

    /// Replace the sky distribution.
    pub fn set_sky_type(&mut self, sky_type: CieSkyType) {
        self.sky_type = sky_type;
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
            "!gensky -ang {:.6} {:.6} {} -g {:.3}",
            self.altitude,
            self.azimuth - 180.0,
            self.sky_type.radiance_flag(),
            self.ground_reflectance
        );
        sky_text(&command, &self.sky_hemisphere, &self.ground_hemisphere)
    }

    /// Default file name, after the sun position and sky type.
    pub fn file_name(&self) -> String {
        format!(
            "{:.3}_{:.3}_{}.sky",
            self.altitude,
            self.azimuth,
            self.sky_type.human_readable().replace(' ', "_").to_lowercase()
        )
    }

    /// Dictionary form.
    pub fn to_dict(&self) -> JsonValue {
        let mut dict = base_dict("CIE");
        dict.insert("altitude".into(), json!(self.altitude));
        dict.insert("azimuth".into(), json!(self.azimuth));
        dict.insert("sky_type".into(), json!(self.sky_type.index()));
        dict.insert("ground_reflectance".into(), json!(self.ground_reflectance));
        write_hemispheres(&mut dict, &self.sky_hemisphere, &self.ground_hemisphere);
        JsonValue::Object(dict)
    }

    /// Read a dictionary. `sky_type` and `ground_reflectance` may be absent.
    pub fn from_dict(data: &JsonValue) -> Result<Self> {
        let dict = as_dict(data, "CIE")?;
        check_type(dict, "CIE")?;
        let sky_type = match dict.opt_real("sky_type", "CIE")? {
            Some(v) => CieSkyType::from_index(sky_index(v)?)?,
            None => CieSkyType::default(),
        };
        let mut sky = Self::new(
            dict.real("altitude", "CIE")?,
            dict.real("azimuth", "CIE")?,
            sky_type,
            dict.opt_real("ground_reflectance", "CIE")?.unwrap_or(DEFAULT_GROUND_REFLECTANCE),
        )?;
        read_hemispheres(dict, &mut sky.sky_hemisphere, &mut sky.ground_hemisphere)?;
        Ok(sky)
    }
}

fn sky_index(value: f64) -> Result<u8> {
    if value.fract() != 0.0 || !(0.0..=5.0).contains(&value) {
        return Err(RadianceError::OutOfRange {
            name: "CIE sky type".into(),
            value,
            min: 0.0,
            max: 5.0,
        });
    }
    Ok(value as u8)
}

impl fmt::Display for Cie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "cie -alt {} -az {} -type {} -g {}",
            format_number(self.altitude),
            format_number(self.azimuth),
            self.sky_type.index(),
            format_number(self.ground_reflectance)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_sky_types() {
        assert_eq!(CieSkyType::from_index(4).unwrap(), CieSkyType::Cloudy);
        assert_eq!(CieSkyType::Cloudy.radiance_flag(), "-c");
        assert_eq!(CieSkyType::IntermediateWithSun.index(), 2);
        assert!(CieSkyType::from_index(6).is_err());
    }

    #[test]
    fn test_to_radiance() {
        let sky = Cie::new(38.186, 270.0, CieSkyType::SunnyWithSun, 0.2).unwrap();
        let text = sky.to_radiance();
        assert!(text.starts_with("!gensky -ang 38.186000 90.000000 +s -g 0.200\n\nskyfunc glow sky_glow"));
        assert!(text.contains("\n\nskyfunc glow ground_glow\n"));

        let overcast = Cie::new(10.0, 0.0, CieSkyType::Cloudy, 0.35).unwrap();
        assert!(overcast.to_radiance().starts_with("!gensky -ang 10.000000 -180.000000 -c -g 0.350"));
    }

    #[test]
    fn test_ranges() {
        assert!(Cie::new(91.0, 180.0, CieSkyType::Cloudy, 0.2).is_err());
        assert!(Cie::new(45.0, 361.0, CieSkyType::Cloudy, 0.2).is_err());
        assert!(Cie::new(45.0, 180.0, CieSkyType::Cloudy, -0.1).is_err());
        let mut sky = Cie::new(-10.0, 360.0, CieSkyType::UniformCloudy, 1.0).unwrap();
        assert!(sky.set_altitude(-90.5).is_err());
        sky.set_sky_type(CieSkyType::SunnyWithoutSun);
        assert_eq!(sky.sky_type(), CieSkyType::SunnyWithoutSun);
    }

    #[test]
    fn test_string_round_trip() {
        let sky = Cie::from_string("cie -alt 71.6 -az 185.2 -type 3 -g 0.25").unwrap();
        assert_relative_eq!(sky.altitude(), 71.6);
        assert_relative_eq!(sky.azimuth(), 185.2);
        assert_eq!(sky.sky_type(), CieSkyType::IntermediateWithoutSun);
        assert_eq!(sky.to_string(), "cie -alt 71.6 -az 185.2 -type 3 -g 0.25");
        assert_eq!(Cie::from_string(&sky.to_string()).unwrap(), sky);

        let negative = Cie::from_string("cie -alt -5 -az 10").unwrap();
        assert_relative_eq!(negative.altitude(), -5.0);
        assert_eq!(negative.sky_type(), CieSkyType::SunnyWithSun);

        assert!(matches!(Cie::from_string("cie -az 10"), Err(RadianceError::Parse { .. })));
        assert!(Cie::from_string("cie -alt 10 -az 10 -type 2.5").is_err());
    }

    #[test]
    fn test_dict_round_trip() {
        let sky = Cie::new(30.0, 135.0, CieSkyType::IntermediateWithSun, 0.4).unwrap();
        let data = sky.to_dict();
        assert_eq!(data["type"], "CIE");
        assert_eq!(data["sky_type"], 2);
        assert_eq!(data["ground_hemisphere"]["type"], "Ground");
        assert_eq!(Cie::from_dict(&data).unwrap(), sky);

        let minimal = json!({"type": "CIE", "altitude": 30.0, "azimuth": 135.0});
        let back = Cie::from_dict(&minimal).unwrap();
        assert_eq!(back.sky_type(), CieSkyType::SunnyWithSun);
        assert_relative_eq!(back.ground_reflectance(), 0.2);
        assert!(Cie::from_dict(&json!({"type": "CIE", "azimuth": 135.0})).is_err());
    }
}
