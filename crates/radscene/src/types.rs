//! Closed registry of primitive type tags.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RadianceError;

/// Family a primitive type belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// Surfaces and volumes.
    Geometry,
    /// Materials and light sources.
    Material,
    /// Perturbations of the surface normal.
    Texture,
    /// Modulations of reflectance or emission.
    Pattern,
    /// Blends of two modifiers.
    Mixture,
}

macro_rules! primitive_types {
    ($($variant:ident => $tag:literal, $category:ident;)*) => {
        /// Every type tag understood by the external renderer.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        #[allow(missing_docs)]
        pub enum PrimitiveType {
            $($variant,)*
        }

        impl PrimitiveType {
            /// All type tags, geometry first.
            pub const ALL: &'static [PrimitiveType] = &[$(PrimitiveType::$variant,)*];

            /// The tag exactly as written in scene text.
            pub fn tag(self) -> &'static str {
                match self {
                    $(PrimitiveType::$variant => $tag,)*
                }
            }

            /// The family of this type.
            pub fn category(self) -> Category {
                match self {
                    $(PrimitiveType::$variant => Category::$category,)*
                }
            }
        }
    };
}

primitive_types! {
    Source => "source", Geometry;
    Sphere => "sphere", Geometry;
    Bubble => "bubble", Geometry;
    Polygon => "polygon", Geometry;
    Cone => "cone", Geometry;
    Cup => "cup", Geometry;
    Cylinder => "cylinder", Geometry;
    Tube => "tube", Geometry;
    Ring => "ring", Geometry;
    Instance => "instance", Geometry;
    Mesh => "mesh", Geometry;
    Plastic => "plastic", Material;
    Glass => "glass", Material;
    Trans => "trans", Material;
    Metal => "metal", Material;
    Mirror => "mirror", Material;
    Illum => "illum", Material;
    MixedFunc => "mixedfunc", Material;
    Dielectric => "dielectric", Material;
    TransData => "transdata", Material;
    Light => "light", Material;
    Glow => "glow", Material;
    Bsdf => "BSDF", Material;
    ABsdf => "aBSDF", Material;
    Spotlight => "spotlight", Material;
    Prism1 => "prism1", Material;
    Prism2 => "prism2", Material;
    Mist => "mist", Material;
    Plastic2 => "plastic2", Material;
    Metal2 => "metal2", Material;
    Trans2 => "trans2", Material;
    Ashik2 => "ashik2", Material;
    Interface => "interface", Material;
    PlasFunc => "plasfunc", Material;
    MetFunc => "metfunc", Material;
    TransFunc => "transfunc", Material;
    BrtdFunc => "BRTDfunc", Material;
    PlasData => "plasdata", Material;
    MetData => "metdata", Material;
    Antimatter => "antimatter", Material;
    TexFunc => "texfunc", Texture;
    TexData => "texdata", Texture;
    ColorFunc => "colorfunc", Pattern;
    BrightFunc => "brightfunc", Pattern;
    ColorData => "colordata", Pattern;
    BrightData => "brightdata", Pattern;
    ColorPict => "colorpict", Pattern;
    ColorText => "colortext", Pattern;
    BrightText => "brighttext", Pattern;
    MixFunc => "mixfunc", Mixture;
    MixData => "mixdata", Mixture;
    MixPict => "mixpict", Mixture;
    MixText => "mixtext", Mixture;
}

impl PrimitiveType {
    /// Look up a type tag.
    ///
    /// Matching ignores case, so dictionary names such as `Plastic` or `bsdf`
    /// resolve to their canonical tags (`plastic`, `BSDF`). `aBSDF` is the only
    /// tag that differs from `BSDF` by case alone and is matched exactly first.
    pub fn from_tag(tag: &str) -> Result<Self, RadianceError> {
        if let Some(t) = Self::ALL.iter().find(|t| t.tag() == tag) {
            return Ok(*t);
        }
        Self::ALL
            .iter()
            .find(|t| t.tag().eq_ignore_ascii_case(tag))
            .copied()
            .ok_or_else(|| RadianceError::UnknownType(tag.to_string()))
    }

    /// True for geometry types.
    pub fn is_geometry(self) -> bool {
        self.category() == Category::Geometry
    }

    /// True for every type usable as a modifier.
    pub fn is_modifier(self) -> bool {
        !self.is_geometry()
    }

    /// True for material types.
    pub fn is_material(self) -> bool {
        self.category() == Category::Material
    }

    /// True for texture types.
    pub fn is_texture(self) -> bool {
        self.category() == Category::Texture
    }

    /// True for pattern types.
    pub fn is_pattern(self) -> bool {
        self.category() == Category::Pattern
    }

    /// True for mixture types.
    pub fn is_mixture(self) -> bool {
        self.category() == Category::Mixture
    }

    /// Types that let light through unless told otherwise.
    pub fn is_non_opaque(self) -> bool {
        matches!(
            self,
            PrimitiveType::Glass
                | PrimitiveType::Trans
                | PrimitiveType::Trans2
                | PrimitiveType::TransData
                | PrimitiveType::TransFunc
                | PrimitiveType::Dielectric
                | PrimitiveType::Bsdf
                | PrimitiveType::ABsdf
                | PrimitiveType::MixFunc
                | PrimitiveType::BrtdFunc
                | PrimitiveType::Mist
                | PrimitiveType::Prism1
                | PrimitiveType::Prism2
        )
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for PrimitiveType {
    type Err = RadianceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_tag(s)
    }
}

impl TryFrom<String> for PrimitiveType {
    type Error = RadianceError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::from_tag(&s)
    }
}

impl From<PrimitiveType> for String {
    fn from(t: PrimitiveType) -> Self {
        t.tag().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_tag() {
        assert_eq!(PrimitiveType::from_tag("plastic").unwrap(), PrimitiveType::Plastic);
        assert_eq!(PrimitiveType::from_tag("Plastic").unwrap(), PrimitiveType::Plastic);
        assert_eq!(PrimitiveType::from_tag("bsdf").unwrap(), PrimitiveType::Bsdf);
        assert_eq!(PrimitiveType::from_tag("brtdfunc").unwrap(), PrimitiveType::BrtdFunc);
        assert_eq!(PrimitiveType::from_tag("aBSDF").unwrap(), PrimitiveType::ABsdf);
        assert_eq!(PrimitiveType::BrtdFunc.tag(), "BRTDfunc");
    }

    #[test]
    fn test_unknown_type() {
        let err = PrimitiveType::from_tag("superglass").unwrap_err();
        assert!(matches!(err, RadianceError::UnknownType(t) if t == "superglass"));
        assert!(PrimitiveType::from_tag("void").is_err());
    }

    #[test]
    fn test_categories() {
        let geometry = PrimitiveType::ALL.iter().filter(|t| t.is_geometry()).count();
        assert_eq!(geometry, 11);
        assert!(PrimitiveType::BrightFunc.is_pattern());
        assert!(PrimitiveType::TexData.is_texture());
        assert!(PrimitiveType::MixText.is_mixture());
        assert!(PrimitiveType::Glow.is_modifier());
        assert!(!PrimitiveType::Polygon.is_modifier());
    }

    #[test]
    fn test_non_opaque_set() {
        let non_opaque: Vec<&str> = PrimitiveType::ALL
            .iter()
            .filter(|t| t.is_non_opaque())
            .map(|t| t.tag())
            .collect();
        assert_eq!(non_opaque.len(), 13);
        assert!(non_opaque.contains(&"BSDF"));
        assert!(!PrimitiveType::Plastic.is_non_opaque());
    }

    #[test]
    fn test_serde_as_tag() {
        let json = serde_json::to_string(&PrimitiveType::Bsdf).unwrap();
        assert_eq!(json, "\"BSDF\"");
        let back: PrimitiveType = serde_json::from_str("\"mixfunc\"").unwrap();
        assert_eq!(back, PrimitiveType::MixFunc);
    }
}
