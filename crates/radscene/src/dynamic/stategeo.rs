//! Extra geometry that exists only in one state of a dynamic object.

use std::collections::HashMap;
use std::fmt;

use radscene_geom::{Face3, Point3, Vec3};
use serde_json::{json, Value as JsonValue};

use crate::config::Config;
use crate::dict::{as_dict, check_type, modifier_reference, opt_modifier, Dict, DictArgs, ModifierRefs};
use crate::error::Result;
use crate::geometry::face_record;
use crate::library::defaults;
use crate::primitive::Modifier;
use crate::typing::valid_rad_string;

/// A planar polygon attached to a dynamic state.
#[derive(Debug, Clone, PartialEq)]
pub struct StateGeometry {
    identifier: String,
    display_name: Option<String>,
    geometry: Face3,
    modifier: Option<Modifier>,
    modifier_direct: Option<Modifier>,
}

impl StateGeometry {
    /// Create state geometry; `None` uses the generic exterior shade modifier.
    pub fn new(identifier: &str, geometry: Face3, modifier: Option<Modifier>) -> Result<Self> {
        Ok(Self {
            identifier: valid_rad_string(identifier, "state geometry identifier")?,
            display_name: None,
            geometry,
            modifier,
            modifier_direct: None,
        })
    }

    /// Create from a flat list of vertices.
    pub fn from_vertices(identifier: &str, vertices: &[[f64; 3]], modifier: Option<Modifier>) -> Result<Self> {
        Self::new(identifier, Face3::from_coords(vertices)?, modifier)
    }

    /// Identifier.
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Display name; the identifier when unset.
    pub fn display_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.identifier)
    }

    /// Set or reset the display name.
    pub fn set_display_name(&mut self, name: Option<String>) {
        self.display_name = name;
    }

    /// Geometry.
    pub fn geometry(&self) -> &Face3 {
        &self.geometry
    }

    /// Modifier, falling back to the generic exterior shade.
    pub fn modifier(&self) -> &Modifier {
        self.modifier
            .as_ref()
            .unwrap_or(&defaults().generic_exterior_shade)
    }

    /// The explicitly assigned modifier.
    pub fn explicit_modifier(&self) -> Option<&Modifier> {
        self.modifier.as_ref()
    }

    /// Set or reset the modifier.
    pub fn set_modifier(&mut self, modifier: Option<Modifier>) {
        self.modifier = modifier;
    }

    /// Modifier for direct-sun studies: black for an opaque or void modifier,
    /// else the modifier itself.
    pub fn modifier_direct(&self) -> &Modifier {
        if let Some(direct) = &self.modifier_direct {
            return direct;
        }
        let modifier = self.modifier();
        if modifier.is_void() || modifier.is_opaque() {
            &defaults().black
        } else {
            modifier
        }
    }

    /// The explicitly assigned direct modifier.
    pub fn explicit_modifier_direct(&self) -> Option<&Modifier> {
        self.modifier_direct.as_ref()
    }

    /// Set or reset the direct modifier.
    pub fn set_modifier_direct(&mut self, modifier: Option<Modifier>) {
        self.modifier_direct = modifier;
    }

    /// A void modifier counts as opaque here.
    pub fn is_opaque(&self) -> bool {
        let modifier = self.modifier();
        modifier.is_void() || modifier.is_opaque()
    }

    /// Vertices of the geometry.
    pub fn vertices(&self) -> &[Point3] {
        self.geometry.vertices()
    }

    /// Unit normal.
    pub fn normal(&self) -> Vec3 {
        self.geometry.normal()
    }

    /// Vertex average.
    pub fn center(&self) -> Point3 {
        self.geometry.center()
    }

    /// Area.
    pub fn area(&self) -> f64 {
        self.geometry.area()
    }

    /// Translate by a vector.
    pub fn move_by(&mut self, offset: &Vec3) {
        self.geometry = self.geometry.moved(offset);
    }

    /// Rotate by `angle` degrees about `axis` through `origin`.
    pub fn rotate(&mut self, axis: &Vec3, angle: f64, origin: &Point3) {
        self.geometry = self.geometry.rotated(axis, angle.to_radians(), origin);
    }

    /// Rotate counterclockwise in the XY plane by `angle` degrees.
    pub fn rotate_xy(&mut self, angle: f64, origin: &Point3) {
        self.geometry = self.geometry.rotated_xy(angle.to_radians(), origin);
    }

    /// Reflect across the plane with `normal` through `origin`.
    pub fn reflect(&mut self, normal: &Vec3, origin: &Point3) {
        self.geometry = self.geometry.reflected(normal, origin);
    }

    /// Scale about `origin`, or the world origin.
    pub fn scale(&mut self, factor: f64, origin: Option<&Point3>) {
        self.geometry = self.geometry.scaled(factor, origin);
    }

    /// Dictionary form; abridged dictionaries reference modifiers by identifier.
    pub fn to_dict(&self, abridged: bool) -> Result<JsonValue> {
        let mut dict = Dict::new();
        let type_name = if abridged { "StateGeometryAbridged" } else { "StateGeometry" };
        dict.insert("type".into(), json!(type_name));
        dict.insert("identifier".into(), json!(self.identifier));
        dict.insert("display_name".into(), json!(self.display_name()));
        dict.insert("geometry".into(), serde_json::to_value(&self.geometry)?);
        if let Some(modifier) = &self.modifier {
            dict.insert("modifier".into(), modifier_reference(modifier, abridged)?);
        }
        if let Some(direct) = &self.modifier_direct {
            dict.insert("modifier_direct".into(), modifier_reference(direct, abridged)?);
        }
        Ok(JsonValue::Object(dict))
    }

    /// Read a full dictionary with embedded modifiers.
    pub fn from_dict(data: &JsonValue) -> Result<Self> {
        Self::from_dict_with(data, &Config::default())
    }

    /// [`Self::from_dict`] with explicit folders for file-backed modifiers.
    pub fn from_dict_with(data: &JsonValue, config: &Config) -> Result<Self> {
        Self::read(data, ModifierRefs::Embedded, config)
    }

    /// Read an abridged dictionary, resolving modifiers through `modifiers`.
    pub fn from_dict_abridged(data: &JsonValue, modifiers: &HashMap<String, Modifier>) -> Result<Self> {
        Self::read(data, ModifierRefs::Table(modifiers), &Config::default())
    }

    pub(crate) fn read(data: &JsonValue, refs: ModifierRefs<'_>, config: &Config) -> Result<Self> {
        let expected = match refs {
            ModifierRefs::Embedded => "StateGeometry",
            ModifierRefs::Table(_) => "StateGeometryAbridged",
        };
        let dict = as_dict(data, expected)?;
        check_type(dict, expected)?;
        let identifier = dict.string("identifier", expected)?;
        let geometry: Face3 = serde_json::from_value(dict.get("geometry").cloned().unwrap_or_default())?;
        let modifier = opt_modifier(dict, "modifier", refs, config, identifier)?;
        let mut geo = Self::new(identifier, geometry, modifier)?;
        geo.modifier_direct = opt_modifier(dict, "modifier_direct", refs, config, identifier)?;
        geo.display_name = dict
            .opt_string("display_name")
            .filter(|name| *name != identifier)
            .map(str::to_string);
        Ok(geo)
    }

    /// Polygon record without its modifier definition.
    pub fn to_radiance(&self, direct: bool, minimal: bool) -> String {
        let modifier = if direct {
            self.modifier_direct()
        } else {
            self.modifier()
        };
        face_record(&self.identifier, &self.geometry, modifier, minimal)
    }
}

impl fmt::Display for StateGeometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StateGeometry: {}", self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::{Glass, Plastic};
    use crate::primitive::Primitive;
    use approx::assert_relative_eq;

    fn shelf() -> StateGeometry {
        StateGeometry::from_vertices(
            "light_shelf",
            &[[0.0, 0.0, 2.0], [1.0, 0.0, 2.0], [1.0, -0.5, 2.0], [0.0, -0.5, 2.0]],
            None,
        )
        .unwrap()
    }

    fn glass() -> Modifier {
        Modifier::new(Primitive::new("tint", Glass::from_single_transmittance(0.4, None).unwrap()).unwrap()).unwrap()
    }

    #[test]
    fn test_defaults() {
        let geo = shelf();
        assert_eq!(geo.display_name(), "light_shelf");
        assert_eq!(geo.modifier().identifier(), "generic_exterior_shade_0.35");
        assert_eq!(geo.modifier_direct().identifier(), "black");
        assert!(geo.is_opaque());
        assert_relative_eq!(geo.area(), 0.5);
        assert!(StateGeometry::from_vertices("bad id", &[[0.0; 3]; 3], None).is_err());
    }

    #[test]
    fn test_direct_modifier_of_transparent_geometry() {
        let mut geo = shelf();
        geo.set_modifier(Some(glass()));
        assert!(!geo.is_opaque());
        assert_eq!(geo.modifier_direct().identifier(), "tint");
    }

    #[test]
    fn test_transforms() {
        let mut geo = shelf();
        geo.move_by(&Vec3::new(0.0, 0.0, 1.0));
        assert_relative_eq!(geo.center().z, 3.0);
        geo.rotate_xy(90.0, &Point3::origin());
        assert_relative_eq!(geo.vertices()[1], Point3::new(0.0, 1.0, 3.0), epsilon = 1e-9);
        geo.scale(2.0, None);
        assert_relative_eq!(geo.area(), 2.0, epsilon = 1e-9);
        geo.reflect(&Vec3::z(), &Point3::origin());
        assert_relative_eq!(geo.center().z, -6.0, epsilon = 1e-9);
    }

    #[test]
    fn test_to_radiance() {
        let geo = shelf();
        assert_eq!(
            geo.to_radiance(false, true),
            "generic_exterior_shade_0.35 polygon light_shelf 0 0 12 0.0 0.0 2.0 1.0 0.0 2.0 1.0 -0.5 2.0 0.0 -0.5 2.0"
        );
        assert!(geo.to_radiance(true, true).starts_with("black polygon light_shelf"));
    }

    #[test]
    fn test_dict_round_trip() {
        let mut geo = shelf();
        let white = Modifier::new(Primitive::new("white", Plastic::from_single_reflectance(0.8, 0.0, 0.0).unwrap()).unwrap())
            .unwrap();
        geo.set_modifier(Some(white.clone()));
        geo.set_modifier_direct(Some(glass()));
        geo.set_display_name(Some("Light Shelf".into()));

        let full = geo.to_dict(false).unwrap();
        assert_eq!(full["type"], "StateGeometry");
        assert_eq!(full["geometry"]["type"], "Face3D");
        assert_eq!(full["modifier_direct"]["identifier"], "tint");
        assert_eq!(StateGeometry::from_dict(&full).unwrap(), geo);

        let abridged = geo.to_dict(true).unwrap();
        assert_eq!(abridged["modifier"], "white");
        let table: HashMap<String, Modifier> =
            [("white".to_string(), white), ("tint".to_string(), glass())].into_iter().collect();
        assert_eq!(StateGeometry::from_dict_abridged(&abridged, &table).unwrap(), geo);
        assert!(StateGeometry::from_dict_abridged(&abridged, &HashMap::new()).is_err());
        assert!(StateGeometry::from_dict(&abridged).is_err());
    }
}
