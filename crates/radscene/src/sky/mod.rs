//! Sky light sources.
//!
//! Each sky writes a generator command followed by the sky and ground glow
//! hemispheres the generated distribution is applied to:
//! - [`CertainIrradiance`]: uniform cloudy sky of a fixed horizontal irradiance
//! - [`Cie`]: CIE standard sky for a sun position
//! - [`ClimateBased`]: Perez sky from direct and diffuse irradiance
//! - [`SkyDome`]: constant-radiance dome for daylight coefficient studies
//!
//! Point-in-time skies also have a one-line string form such as
//! `cie -alt 71.6 -az 185.2 -type 0`, read back by [`string_to_sky`].

mod certain_irradiance;
mod cie;
mod climate_based;
mod dome;
mod hemisphere;

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{json, Value as JsonValue};
use tracing::debug;

pub use certain_irradiance::{CertainIrradiance, DEFAULT_IRRADIANCE, LUMINOUS_EFFICACY};
pub use cie::{Cie, CieSkyType};
pub use climate_based::ClimateBased;
pub use dome::SkyDome;
pub use hemisphere::{Ground, SkyHemisphere};

use crate::dict::{as_dict, Dict, DictArgs};
use crate::error::{RadianceError, Result};
use crate::typing::{float_in_range, valid_rad_string};

/// Ground reflectance used when none is given.
pub const DEFAULT_GROUND_REFLECTANCE: f64 = 0.2;

/// Any supported sky.
#[derive(Debug, Clone, PartialEq)]
pub enum Sky {
    /// Uniform sky of a fixed irradiance.
    CertainIrradiance(CertainIrradiance),
    /// CIE standard sky.
    Cie(Cie),
    /// Climate-based sky.
    ClimateBased(ClimateBased),
    /// Constant-radiance dome.
    SkyDome(SkyDome),
}

impl Sky {
    /// True for skies generated for a single sun position.
    pub fn is_point_in_time(&self) -> bool {
        matches!(self, Sky::Cie(_) | Sky::ClimateBased(_))
    }

    /// True for skies built from weather values.
    pub fn is_climate_based(&self) -> bool {
        matches!(self, Sky::ClimateBased(_))
    }

    /// The sky and ground glow hemispheres.
    pub fn hemispheres(&self) -> (&SkyHemisphere, &Ground) {
        match self {
            Sky::CertainIrradiance(s) => (s.sky_hemisphere(), s.ground_hemisphere()),
            Sky::Cie(s) => (s.sky_hemisphere(), s.ground_hemisphere()),
            Sky::ClimateBased(s) => (s.sky_hemisphere(), s.ground_hemisphere()),
            Sky::SkyDome(s) => (s.sky_hemisphere(), s.ground_hemisphere()),
        }
    }

    /// Full sky definition with default options.
    pub fn to_radiance(&self) -> String {
        match self {
            Sky::CertainIrradiance(s) => s.to_radiance(),
            Sky::Cie(s) => s.to_radiance(),
            Sky::ClimateBased(s) => s.to_radiance(),
            Sky::SkyDome(s) => s.to_radiance(),
        }
    }

    /// Dictionary form.
    pub fn to_dict(&self) -> JsonValue {
        match self {
            Sky::CertainIrradiance(s) => s.to_dict(),
            Sky::Cie(s) => s.to_dict(),
            Sky::ClimateBased(s) => s.to_dict(),
            Sky::SkyDome(s) => s.to_dict(),
        }
    }

    /// Read any sky dictionary, dispatching on `type`.
    pub fn from_dict(data: &JsonValue) -> Result<Self> {
        let dict = as_dict(data, "sky")?;
        match dict.string("type", "sky")? {
            "CertainIrradiance" => Ok(Sky::CertainIrradiance(CertainIrradiance::from_dict(data)?)),
            "CIE" => Ok(Sky::Cie(Cie::from_dict(data)?)),
            "ClimateBased" => Ok(Sky::ClimateBased(ClimateBased::from_dict(data)?)),
            "SkyDome" => Ok(Sky::SkyDome(SkyDome::from_dict(data)?)),
            other => Err(RadianceError::type_mismatch("a sky dictionary", other)),
        }
    }

    /// Write the full definition to `<folder>/<name>`; each sky has its
    /// own default file name.
    pub fn to_file(&self, folder: impl AsRef<Path>, name: Option<&str>, mkdir: bool) -> Result<PathBuf> {
        let default_name = match self {
            Sky::CertainIrradiance(s) => s.file_name(),
            Sky::Cie(s) => s.file_name(),
            Sky::ClimateBased(s) => s.file_name(),
            Sky::SkyDome(_) => "skydome.rad".to_string(),
        };
        write_sky(folder.as_ref(), name, &default_name, &self.to_radiance(), mkdir)
    }
}

impl fmt::Display for Sky {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sky::CertainIrradiance(s) => fmt::Display::fmt(s, f),
            Sky::Cie(s) => fmt::Display::fmt(s, f),
            Sky::ClimateBased(s) => fmt::Display::fmt(s, f),
            Sky::SkyDome(s) => f.write_str(&s.to_radiance()),
        }
    }
}

/// Read a sky from its one-line string form.
///
/// The first word picks the sky: `irradiance`, `illuminance`, `cie` or
/// `climate-based`. An unrecognized word is an error when `raise_exception`
/// is set and `None` otherwise.
pub fn string_to_sky(text: &str, raise_exception: bool) -> Result<Option<Sky>> {
    let kind = text.split_whitespace().next().unwrap_or_default().to_lowercase();
    let sky = match kind.as_str() {
        "irradiance" | "illuminance" => Sky::CertainIrradiance(CertainIrradiance::from_string(text)?),
        "cie" => Sky::Cie(Cie::from_string(text)?),
        "climate-based" => Sky::ClimateBased(ClimateBased::from_string(text)?),
        _ if raise_exception => {
            return Err(RadianceError::parse(
                text,
                format!("\"{}\" is not a recognized Radiance sky type", kind),
            ))
        }
        _ => return Ok(None),
    };
    Ok(Some(sky))
}

pub(crate) fn check_ground_reflectance(value: f64) -> Result<f64> {
    float_in_range(value, 0.0, 1.0, "ground reflectance")
}

/// Command line, then the sky and ground hemispheres, blank-line separated.
pub(crate) fn sky_text(command: &str, sky: &SkyHemisphere, ground: &Ground) -> String {
    format!("{}\n\n{}\n\n{}\n", command, sky.to_radiance(), ground.to_radiance())
}

pub(crate) fn write_hemispheres(dict: &mut Dict, sky: &SkyHemisphere, ground: &Ground) {
    dict.insert("ground_hemisphere".into(), ground.to_dict());
    dict.insert("sky_hemisphere".into(), sky.to_dict());
}

/// Hemispheres from `dict`, keeping the given defaults for absent keys.
pub(crate) fn read_hemispheres(dict: &Dict, sky: &mut SkyHemisphere, ground: &mut Ground) -> Result<()> {
    if let Some(data) = dict.get("ground_hemisphere").filter(|v| !v.is_null()) {
        *ground = Ground::from_dict(data)?;
    }
    if let Some(data) = dict.get("sky_hemisphere").filter(|v| !v.is_null()) {
        *sky = SkyHemisphere::from_dict(data)?;
    }
    Ok(())
}

pub(crate) fn base_dict(type_name: &str) -> Dict {
    let mut dict = Dict::new();
    dict.insert("type".into(), json!(type_name));
    dict
}

fn write_sky(folder: &Path, name: Option<&str>, default_name: &str, content: &str, mkdir: bool) -> Result<PathBuf> {
    if mkdir {
        fs::create_dir_all(folder)?;
    }
    let name = match name {
        Some(name) => valid_rad_string(name, "sky file name")?,
        None => default_name.to_string(),
    };
    let path = folder.join(name);
    fs::write(&path, content)?;
    debug!(path = %path.display(), "wrote sky file");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_to_sky() {
        let sky = string_to_sky("cie -alt 71.6 -az 185.2 -type 0", true).unwrap().unwrap();
        assert!(sky.is_point_in_time());
        assert!(!sky.is_climate_based());
        assert_eq!(sky.to_string(), "cie -alt 71.6 -az 185.2 -type 0 -g 0.2");

        let sky = string_to_sky("illuminance 100000", true).unwrap().unwrap();
        assert!(matches!(sky, Sky::CertainIrradiance(_)));
        assert!(!sky.is_point_in_time());

        let sky = string_to_sky("climate-based -alt 40 -az 180 -dni 800 -dhi 120", true).unwrap().unwrap();
        assert!(sky.is_climate_based());

        assert!(string_to_sky("perez -alt 40", false).unwrap().is_none());
        assert!(matches!(
            string_to_sky("perez -alt 40", true),
            Err(RadianceError::Parse { .. })
        ));
    }

    #[test]
    fn test_dict_dispatch() {
        let skies = [
            Sky::CertainIrradiance(CertainIrradiance::default()),
            Sky::Cie(Cie::new(45.0, 90.0, CieSkyType::Cloudy, 0.3).unwrap()),
            Sky::ClimateBased(ClimateBased::new(30.0, 200.0, 650, 110, 0.2).unwrap()),
            Sky::SkyDome(SkyDome::default()),
        ];
        for sky in &skies {
            assert_eq!(&Sky::from_dict(&sky.to_dict()).unwrap(), sky);
        }
        assert!(matches!(
            Sky::from_dict(&json!({"type": "SunMatrix"})),
            Err(RadianceError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let folder = dir.path().join("sky");
        let sky = Sky::Cie(Cie::new(71.6, 185.2, CieSkyType::SunnyWithSun, 0.2).unwrap());
        let path = sky.to_file(&folder, None, true).unwrap();
        assert_eq!(path.file_name().unwrap(), "71.600_185.200_sunny_sky_with_sun.sky");
        assert_eq!(fs::read_to_string(&path).unwrap(), sky.to_radiance());

        let dome = Sky::SkyDome(SkyDome::default());
        let path = dome.to_file(&folder, None, false).unwrap();
        assert_eq!(path.file_name().unwrap(), "skydome.rad");

        let path = Sky::CertainIrradiance(CertainIrradiance::default())
            .to_file(&folder, Some("overcast.sky"), false)
            .unwrap();
        assert!(path.ends_with("overcast.sky"));
        assert!(Sky::SkyDome(SkyDome::default()).to_file(&folder, Some("bad name"), false).is_err());
    }
}
