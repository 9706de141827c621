//! Glow hemispheres that sky and ground distributions are applied to.

use serde_json::{json, Value as JsonValue};

use crate::dict::{as_dict, check_type, Dict, DictArgs};
use crate::error::Result;
use crate::typing::float_in_range;

macro_rules! glow_hemisphere {
    (
        $(#[$doc:meta])*
        $ty:ident, $type_name:literal, $glow:literal, $source:literal, $direction:literal
    ) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq)]
        pub struct $ty {
            modifier: String,
            r_emittance: f64,
            g_emittance: f64,
            b_emittance: f64,
        }

        impl $ty {
            /// Hemisphere with unit emittance under `modifier`.
            pub fn new(modifier: impl Into<String>) -> Self {
                Self {
                    modifier: modifier.into(),
                    r_emittance: 1.0,
                    g_emittance: 1.0,
                    b_emittance: 1.0,
                }
            }

            /// Function or pattern the glow is modified by.
            pub fn modifier(&self) -> &str {
                &self.modifier
            }

            /// Replace the modifier.
            pub fn set_modifier(&mut self, modifier: impl Into<String>) {
                self.modifier = modifier.into();
            }

            /// Red, green and blue emittance.
            pub fn emittance(&self) -> [f64; 3] {
                [self.r_emittance, self.g_emittance, self.b_emittance]
            }

            /// Set the emittance; each channel must be in `[0, 1]`.
            pub fn set_emittance(&mut self, r: f64, g: f64, b: f64) -> Result<()> {
                self.r_emittance = float_in_range(r, 0.0, 1.0, "r_emittance")?;
                self.g_emittance = float_in_range(g, 0.0, 1.0, "g_emittance")?;
                self.b_emittance = float_in_range(b, 0.0, 1.0, "b_emittance")?;
                Ok(())
            }

            /// Glow material and source records.
            pub fn to_radiance(&self) -> String {
                format!(
                    concat!(
                        "{} glow ", $glow, "\n0\n0\n4 {:.3} {:.3} {:.3} 0\n",
                        $glow, " source ", $source, "\n0\n0\n4 ", $direction, " 180"
                    ),
                    self.modifier, self.r_emittance, self.g_emittance, self.b_emittance
                )
            }

            /// Dictionary form.
            pub fn to_dict(&self) -> JsonValue {
                json!({
                    "type": $type_name,
                    "r_emittance": self.r_emittance,
                    "g_emittance": self.g_emittance,
                    "b_emittance": self.b_emittance,
                    "modifier": self.modifier,
                })
            }

            /// Read a dictionary. Missing channels default to 1.
            pub fn from_dict(data: &JsonValue) -> Result<Self> {
                let dict: &Dict = as_dict(data, $type_name)?;
                check_type(dict, $type_name)?;
                let mut hemisphere = Self::new(dict.opt_string("modifier").unwrap_or("skyfunc"));
                hemisphere.set_emittance(
                    dict.opt_real("r_emittance", $type_name)?.unwrap_or(1.0),
                    dict.opt_real("g_emittance", $type_name)?.unwrap_or(1.0),
                    dict.opt_real("b_emittance", $type_name)?.unwrap_or(1.0),
                )?;
                Ok(hemisphere)
            }
        }

        impl Default for $ty {
            fn default() -> Self {
                Self::new("skyfunc")
            }
        }
    };
}

glow_hemisphere!(
    /// Upper hemisphere glow, pointing at the zenith.
    SkyHemisphere, "SkyHemisphere", "sky_glow", "sky", "0 0 1"
);

glow_hemisphere!(
    /// Lower hemisphere glow, pointing at the nadir.
    Ground, "Ground", "ground_glow", "ground", "0 0 -1"
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RadianceError;

    #[test]
    fn test_sky_hemisphere_to_radiance() {
        let sky = SkyHemisphere::default();
        assert_eq!(
            sky.to_radiance(),
            "skyfunc glow sky_glow\n0\n0\n4 1.000 1.000 1.000 0\nsky_glow source sky\n0\n0\n4 0 0 1 180"
        );
    }

    #[test]
    fn test_ground_to_radiance() {
        let mut ground = Ground::new("void");
        ground.set_emittance(0.5, 0.25, 1.0).unwrap();
        assert_eq!(
            ground.to_radiance(),
            "void glow ground_glow\n0\n0\n4 0.500 0.250 1.000 0\nground_glow source ground\n0\n0\n4 0 0 -1 180"
        );
    }

    #[test]
    fn test_emittance_range() {
        let mut sky = SkyHemisphere::default();
        assert!(matches!(
            sky.set_emittance(1.2, 1.0, 1.0),
            Err(RadianceError::OutOfRange { .. })
        ));
        assert!(sky.set_emittance(0.0, 0.0, 0.0).is_ok());
        assert_eq!(sky.emittance(), [0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_dict_round_trip() {
        let mut sky = SkyHemisphere::new("void");
        sky.set_emittance(0.9, 0.8, 0.7).unwrap();
        let data = sky.to_dict();
        assert_eq!(data["type"], "SkyHemisphere");
        assert_eq!(data["modifier"], "void");
        assert_eq!(SkyHemisphere::from_dict(&data).unwrap(), sky);

        let ground = Ground::default();
        assert_eq!(Ground::from_dict(&ground.to_dict()).unwrap(), ground);
        assert!(matches!(
            Ground::from_dict(&data),
            Err(RadianceError::TypeMismatch { .. })
        ));
    }
}
