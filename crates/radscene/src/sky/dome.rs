//! Constant-radiance sky dome for daylight matrix calculations.

use serde_json::Value as JsonValue;

use super::{base_dict, read_hemispheres, write_hemispheres, Ground, SkyHemisphere};
use crate::dict::{as_dict, check_type};
use crate::error::{RadianceError, Result};

/// Unit-emittance sky and ground hemispheres under `void`, annotated for
/// `rfluxmtx` with a uniform ground patch and a Reinhart-subdivided sky.
#[derive(Debug, Clone, PartialEq)]
pub struct SkyDome {
    ground_hemisphere: Ground,
    sky_hemisphere: SkyHemisphere,
}

impl Default for SkyDome {
    fn default() -> Self {
        Self {
            ground_hemisphere: Ground::new("void"),
            sky_hemisphere: SkyHemisphere::new("void"),
        }
    }
}

impl SkyDome {
    /// Ground glow source.
    pub fn ground_hemisphere(&self) -> &Ground {
        &self.ground_hemisphere
    }

    /// Sky glow source.
    pub fn sky_hemisphere(&self) -> &SkyHemisphere {
        &self.sky_hemisphere
    }

    /// Definition with 145 sky patches and one ground patch.
    pub fn to_radiance(&self) -> String {
        self.dome_text(1)
    }

    /// Definition with a sky subdivision `density` as in `gendaymtx -m`.
    /// Doubling the density quadruples the sky patches; 1 gives 145.
    pub fn to_radiance_with_density(&self, density: u32) -> Result<String> {
        if density < 1 {
            return Err(RadianceError::OutOfRange {
                name: "sky subdivision density".into(),
                value: f64::from(density),
                min: 1.0,
                max: f64::INFINITY,
            });
        }
        Ok(self.dome_text(density))
    }

    fn dome_text(&self, density: u32) -> String {
        format!(
            "#@rfluxmtx h=u u=Y\n{}\n\n#@rfluxmtx h=r{} u=Y\n{}\n",
            self.ground_hemisphere.to_radiance(),
            density,
            self.sky_hemisphere.to_radiance()
        )
    }

    /// Dictionary form.
    pub fn to_dict(&self) -> JsonValue {
        let mut dict = base_dict("SkyDome");
        write_hemispheres(&mut dict, &self.sky_hemisphere, &self.ground_hemisphere);
        JsonValue::Object(dict)
    }

    /// Read a dictionary; absent hemispheres keep their defaults.
    pub fn from_dict(data: &JsonValue) -> Result<Self> {
        let dict = as_dict(data, "SkyDome")?;
        check_type(dict, "SkyDome")?;
        let mut dome = Self::default();
        read_hemispheres(dict, &mut dome.sky_hemisphere, &mut dome.ground_hemisphere)?;
        Ok(dome)
    }
}
