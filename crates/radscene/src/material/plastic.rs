//! Plastic and metal: colored diffuse reflectors with a specular component.

use serde_json::json;
use tracing::warn;

use super::luminance;
use crate::dict::{reals, Dict, DictArgs, FieldContext};
use crate::error::Result;
use crate::primitive::PrimitiveParams;
use crate::typing::float_in_range;
use crate::value::{Value, Values};

/// Plastic material.
///
/// Specularity above 0.1 or roughness above 0.2 is legal but uncommon and
/// logged as a warning.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Plastic {
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
}

/// Metal material. Same parameters as plastic; the specular highlight takes
/// the material color.
#[derive(Debug, Clone, PartialEq)]
pub struct Metal {
    /// Red reflectance in `[0, 1]`.
    pub r_reflectance: f64,
    /// Green reflectance in `[0, 1]`.
    pub g_reflectance: f64,
    /// Blue reflectance in `[0, 1]`.
    pub b_reflectance: f64,
    /// Fraction of specularity in `[0, 1]`, usually 0.9 or greater.
    pub specularity: f64,
    /// RMS slope of surface facets in `[0, 1]`.
    pub roughness: f64,
}

impl Default for Metal {
    fn default() -> Self {
        Self {
            r_reflectance: 0.0,
            g_reflectance: 0.0,
            b_reflectance: 0.0,
            specularity: 0.9,
            roughness: 0.0,
        }
    }
}

macro_rules! reflector {
    ($ty:ident) => {
        impl $ty {
            /// Create and validate the material.
            pub fn new(r: f64, g: f64, b: f64, specularity: f64, roughness: f64) -> Result<Self> {
                let material = Self {
                    r_reflectance: r,
                    g_reflectance: g,
                    b_reflectance: b,
                    specularity,
                    roughness,
                };
                material.validate()?;
                Ok(material)
            }

            /// Same reflectance for all three channels.
            pub fn from_single_reflectance(value: f64, specularity: f64, roughness: f64) -> Result<Self> {
                Self::new(value, value, value, specularity, roughness)
            }

            /// Weighted average reflectance including the specular part.
            pub fn average_reflectance(&self) -> f64 {
                luminance(self.r_reflectance, self.g_reflectance, self.b_reflectance)
                    * (1.0 - self.specularity)
                    + self.specularity
            }

            fn check_ranges(&self) -> Result<()> {
                float_in_range(self.r_reflectance, 0.0, 1.0, "red reflectance")?;
                float_in_range(self.g_reflectance, 0.0, 1.0, "green reflectance")?;
                float_in_range(self.b_reflectance, 0.0, 1.0, "blue reflectance")?;
                float_in_range(self.specularity, 0.0, 1.0, "specularity")?;
                float_in_range(self.roughness, 0.0, 1.0, "roughness")?;
                Ok(())
            }
        }

        impl PrimitiveParams for $ty {
            fn validate(&self) -> Result<()> {
                self.check_ranges()?;
                self.warn_unusual();
                Ok(())
            }

            fn values(&self) -> Values {
                [
                    Vec::new(),
                    Vec::new(),
                    [
                        self.r_reflectance,
                        self.g_reflectance,
                        self.b_reflectance,
                        self.specularity,
                        self.roughness,
                    ]
                    .into_iter()
                    .map(Value::Number)
                    .collect(),
                ]
            }

            fn from_values(values: &Values, name: &str) -> Result<Self> {
                let v = reals(values, 2, &[5], name)?;
                Ok(Self {
                    r_reflectance: v[0],
                    g_reflectance: v[1],
                    b_reflectance: v[2],
                    specularity: v[3],
                    roughness: v[4],
                })
            }

            fn write_fields(&self, dict: &mut Dict) -> Result<()> {
                dict.insert("r_reflectance".into(), json!(self.r_reflectance));
                dict.insert("g_reflectance".into(), json!(self.g_reflectance));
                dict.insert("b_reflectance".into(), json!(self.b_reflectance));
                dict.insert("specularity".into(), json!(self.specularity));
                dict.insert("roughness".into(), json!(self.roughness));
                Ok(())
            }

            fn from_fields(dict: &Dict, ctx: &FieldContext<'_>) -> Result<Self> {
                Ok(Self {
                    r_reflectance: dict.real("r_reflectance", ctx.name)?,
                    g_reflectance: dict.real("g_reflectance", ctx.name)?,
                    b_reflectance: dict.real("b_reflectance", ctx.name)?,
                    specularity: dict.real("specularity", ctx.name)?,
                    roughness: dict.real("roughness", ctx.name)?,
                })
            }
        }
    };
}

reflector!(Plastic);
reflector!(Metal);

impl Plastic {
    fn warn_unusual(&self) {
        if self.specularity > 0.1 {
            warn!(specularity = self.specularity, "specularity above 0.1 is uncommon for plastic");
        }
        if self.roughness > 0.2 {
            warn!(roughness = self.roughness, "roughness above 0.2 is uncommon");
        }
    }
}

impl Metal {
    fn warn_unusual(&self) {
        if self.specularity < 0.9 {
            warn!(specularity = self.specularity, "specularity of metal is usually 0.9 or greater");
        }
        if self.roughness > 0.2 {
            warn!(roughness = self.roughness, "roughness above 0.2 is uncommon");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RadianceError;
    use crate::primitive::Primitive;
    use approx::assert_relative_eq;

    #[test]
    fn test_plastic_values() {
        let p = Plastic::new(0.6, 0.7, 0.8, 0.0, 0.0).unwrap();
        let values = p.values();
        assert!(values[0].is_empty());
        assert_eq!(values[2], vec![Value::Number(0.6), Value::Number(0.7), Value::Number(0.8), Value::Number(0.0), Value::Number(0.0)]);
    }

    #[test]
    fn test_plastic_ranges() {
        assert!(matches!(
            Plastic::new(1.2, 0.5, 0.5, 0.0, 0.0),
            Err(RadianceError::OutOfRange { .. })
        ));
        assert!(Plastic::new(0.5, 0.5, 0.5, -0.1, 0.0).is_err());
        assert!(Plastic::new(0.5, 0.5, 0.5, 0.0, 1.5).is_err());
        // unusual but legal
        assert!(Plastic::new(0.5, 0.5, 0.5, 0.5, 0.5).is_ok());
    }

    #[test]
    fn test_average_reflectance() {
        let p = Plastic::from_single_reflectance(0.5, 0.0, 0.0).unwrap();
        assert_relative_eq!(p.average_reflectance(), 0.5, epsilon = 1e-12);
        let p = Plastic::new(0.2, 0.3, 0.4, 0.1, 0.0).unwrap();
        let expected = (0.265 * 0.2 + 0.670 * 0.3 + 0.065 * 0.4) * 0.9 + 0.1;
        assert_relative_eq!(p.average_reflectance(), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_metal() {
        let m = Metal::default();
        assert_eq!(m.specularity, 0.9);
        let metal = Primitive::new("shiny", Metal::from_single_reflectance(0.45, 0.95, 0.05).unwrap()).unwrap();
        assert_eq!(metal.to_radiance(true, true, true), "void metal shiny 0 0 5 0.45 0.45 0.45 0.95 0.05");
        let data = metal.to_dict().unwrap();
        assert_eq!(data["type"], "Metal");
        assert_eq!(data["specularity"], 0.95);
    }

    #[test]
    fn test_from_values_counts() {
        let values: Values = [Vec::new(), Vec::new(), vec![Value::from("0.5"); 4]];
        assert!(matches!(
            Plastic::from_values(&values, "p"),
            Err(RadianceError::Parse { .. })
        ));
    }
}
