//! Mirror: specular reflector with an optional alternate material.

use serde_json::json;

use crate::dict::{reals, Dict, DictArgs, FieldContext};
use crate::error::Result;
use crate::primitive::{Modifier, PrimitiveParams};
use crate::typing::float_in_range;
use crate::value::{Value, Values};

/// Mirror material.
///
/// The alternate material, if any, is used by the renderer for rays that are
/// not virtual-source samples. It is written as the single string argument
/// and counts as a dependency of the mirror.
#[derive(Debug, Clone, PartialEq)]
pub struct Mirror {
    /// Red reflectance in `[0, 1]`.
    pub r_reflectance: f64,
    /// Green reflectance in `[0, 1]`.
    pub g_reflectance: f64,
    /// Blue reflectance in `[0, 1]`.
    pub b_reflectance: f64,
    /// Optional alternate material; `Some(Modifier::Void)` writes `void`.
    pub alternate_material: Option<Modifier>,
}

impl Default for Mirror {
    fn default() -> Self {
        Self {
            r_reflectance: 1.0,
            g_reflectance: 1.0,
            b_reflectance: 1.0,
            alternate_material: None,
        }
    }
}

impl Mirror {
    /// Create and validate.
    pub fn new(r: f64, g: f64, b: f64, alternate_material: Option<Modifier>) -> Result<Self> {
        let mirror = Self {
            r_reflectance: r,
            g_reflectance: g,
            b_reflectance: b,
            alternate_material,
        };
        mirror.validate()?;
        Ok(mirror)
    }

    /// Same reflectance for all three channels.
    pub fn from_single_reflectance(value: f64, alternate_material: Option<Modifier>) -> Result<Self> {
        Self::new(value, value, value, alternate_material)
    }
}

impl PrimitiveParams for Mirror {
    fn validate(&self) -> Result<()> {
        float_in_range(self.r_reflectance, 0.0, 1.0, "red reflectance")?;
        float_in_range(self.g_reflectance, 0.0, 1.0, "green reflectance")?;
        float_in_range(self.b_reflectance, 0.0, 1.0, "blue reflectance")?;
        Ok(())
    }

    fn values(&self) -> Values {
        let alternate = self
            .alternate_material
            .iter()
            .map(|m| Value::Text(m.identifier().to_string()))
            .collect();
        let rgb = [self.r_reflectance, self.g_reflectance, self.b_reflectance];
        [alternate, Vec::new(), rgb.into_iter().map(Value::Number).collect()]
    }

    /// The alternate material is resolved against the dependencies by the
    /// caller; only the reflectances are read here.
    fn from_values(values: &Values, name: &str) -> Result<Self> {
        let v = reals(values, 2, &[3], name)?;
        Ok(Self {
            r_reflectance: v[0],
            g_reflectance: v[1],
            b_reflectance: v[2],
            alternate_material: None,
        })
    }

    fn write_fields(&self, dict: &mut Dict) -> Result<()> {
        dict.insert("r_reflectance".into(), json!(self.r_reflectance));
        dict.insert("g_reflectance".into(), json!(self.g_reflectance));
        dict.insert("b_reflectance".into(), json!(self.b_reflectance));
        Ok(())
    }

    fn from_fields(dict: &Dict, ctx: &FieldContext<'_>) -> Result<Self> {
        Ok(Self {
            r_reflectance: dict.real("r_reflectance", ctx.name)?,
            g_reflectance: dict.real("g_reflectance", ctx.name)?,
            b_reflectance: dict.real("b_reflectance", ctx.name)?,
            alternate_material: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::Plastic;
    use crate::primitive::{Primitive, PrimitiveKind};
    use serde_json::json;

    fn alternate() -> Modifier {
        Modifier::new(Primitive::new("alt", Plastic::from_single_reflectance(0.5, 0.0, 0.0).unwrap()).unwrap())
            .unwrap()
    }

    #[test]
    fn test_alternate_is_a_dependency() {
        let mirror = Primitive::new("m", Mirror::from_single_reflectance(0.9, Some(alternate())).unwrap()).unwrap();
        assert_eq!(mirror.dependencies().count(), 1);
        assert_eq!(
            mirror.to_radiance(true, true, true),
            "void plastic alt 0 0 5 0.5 0.5 0.5 0.0 0.0\nvoid mirror m 1 alt 0 3 0.9 0.9 0.9"
        );
    }

    #[test]
    fn test_dict_alternate_embedded_and_abridged() {
        let alt = alternate();
        let mirror = Primitive::new("m", Mirror::new(0.8, 0.8, 0.8, Some(alt.clone())).unwrap()).unwrap();

        let full = mirror.to_dict().unwrap();
        assert_eq!(full["alternate_material"]["identifier"], "alt");
        assert_eq!(full["dependencies"], json!([]));
        assert_eq!(Primitive::from_dict(&full).unwrap(), mirror);

        let abridged = mirror.to_dict_abridged().unwrap();
        assert_eq!(abridged["alternate_material"], "alt");
        let table = [("alt".to_string(), alt)].into_iter().collect();
        let back = Primitive::from_dict_abridged(&abridged, &table).unwrap();
        let PrimitiveKind::Mirror(params) = back.kind() else {
            panic!("expected a mirror");
        };
        assert_eq!(params.alternate_material.as_ref().map(Modifier::identifier), Some("alt"));
    }

    #[test]
    fn test_unknown_alternate_in_text() {
        let text = "void mirror m 1 missing_mat 0 3 1 1 1";
        assert!(Primitive::from_string(text).is_err());
        let void_alt = Primitive::from_string("void mirror m 1 void 0 3 1 1 1").unwrap();
        let PrimitiveKind::Mirror(params) = void_alt.kind() else {
            panic!("expected a mirror");
        };
        assert_eq!(params.alternate_material, Some(Modifier::Void));
    }
}
