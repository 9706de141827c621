//! Modifier states of shades and sub-faces.

use std::collections::HashMap;

use radscene_geom::{Face3, Point3, Vec3};
use serde_json::{json, Value as JsonValue};

use super::{StateGeometry, StateHost};
use crate::config::Config;
use crate::dict::{as_dict, check_type, modifier_reference, opt_modifier, Dict, ModifierRefs};
use crate::error::Result;
use crate::geometry::face_record;
use crate::library::defaults;
use crate::primitive::Modifier;

/// Behavior shared by shade and sub-face states.
pub trait RadianceState: Clone + Default {
    /// The explicitly assigned modifier.
    fn explicit_modifier(&self) -> Option<&Modifier>;

    /// Geometry that only exists in this state.
    fn shades(&self) -> &[StateGeometry];

    /// Modifier used for direct-sun studies.
    fn modifier_direct(&self, host: &StateHost<'_>) -> Modifier;

    /// Modifier of the host in this state; the host's own modifier when unset.
    fn modifier(&self, host: &StateHost<'_>) -> Modifier {
        self.explicit_modifier()
            .cloned()
            .unwrap_or_else(|| host.modifier.clone())
    }

    /// The host polygon followed by the state shades, without modifier
    /// definitions.
    fn to_radiance(&self, host: &StateHost<'_>, direct: bool, minimal: bool) -> String {
        let modifier = if direct {
            self.modifier_direct(host)
        } else {
            self.modifier(host)
        };
        let mut output = vec![face_record(host.identifier, host.geometry, &modifier, minimal)];
        output.extend(self.shades().iter().map(|shade| shade.to_radiance(direct, minimal)));
        output.join("\n\n")
    }
}

/// A state of a dynamic shade.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RadianceShadeState {
    modifier: Option<Modifier>,
    modifier_direct: Option<Modifier>,
    shades: Vec<StateGeometry>,
}

/// A state of a dynamic aperture or door.
///
/// The view and daylight matrix geometry default to the host geometry with
/// its orientation flipped to face inward.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RadianceSubFaceState {
    modifier: Option<Modifier>,
    modifier_direct: Option<Modifier>,
    shades: Vec<StateGeometry>,
    vmtx_geometry: Option<Face3>,
    dmtx_geometry: Option<Face3>,
}

struct StateFields {
    modifier: Option<Modifier>,
    modifier_direct: Option<Modifier>,
    shades: Vec<StateGeometry>,
}

fn read_fields(dict: &Dict, refs: ModifierRefs<'_>, config: &Config, context: &str) -> Result<StateFields> {
    let shades = match dict.get("shades") {
        Some(JsonValue::Array(items)) => items
            .iter()
            .map(|item| StateGeometry::read(item, refs, config))
            .collect::<Result<Vec<_>>>()?,
        _ => Vec::new(),
    };
    Ok(StateFields {
        modifier: opt_modifier(dict, "modifier", refs, config, context)?,
        modifier_direct: opt_modifier(dict, "modifier_direct", refs, config, context)?,
        shades,
    })
}

fn write_fields(
    dict: &mut Dict,
    modifier: Option<&Modifier>,
    modifier_direct: Option<&Modifier>,
    shades: &[StateGeometry],
    abridged: bool,
) -> Result<()> {
    if let Some(modifier) = modifier {
        dict.insert("modifier".into(), modifier_reference(modifier, abridged)?);
    }
    if !shades.is_empty() {
        let shades = shades
            .iter()
            .map(|shade| shade.to_dict(abridged))
            .collect::<Result<Vec<_>>>()?;
        dict.insert("shades".into(), JsonValue::Array(shades));
    }
    if let Some(direct) = modifier_direct {
        dict.insert("modifier_direct".into(), modifier_reference(direct, abridged)?);
    }
    Ok(())
}

fn type_name(base: &str, abridged: bool) -> String {
    if abridged {
        format!("{}Abridged", base)
    } else {
        base.to_string()
    }
}

impl RadianceShadeState {
    /// Create a state; `None` keeps the host's modifier.
    pub fn new(modifier: Option<Modifier>, shades: Vec<StateGeometry>) -> Self {
        Self {
            modifier,
            modifier_direct: None,
            shades,
        }
    }

    /// Set or reset the modifier.
    pub fn set_modifier(&mut self, modifier: Option<Modifier>) {
        self.modifier = modifier;
    }

    /// The explicitly assigned direct modifier.
    pub fn explicit_modifier_direct(&self) -> Option<&Modifier> {
        self.modifier_direct.as_ref()
    }

    /// Set or reset the direct modifier.
    pub fn set_modifier_direct(&mut self, modifier: Option<Modifier>) {
        self.modifier_direct = modifier;
    }

    /// Add one state geometry.
    pub fn add_shade(&mut self, shade: StateGeometry) {
        self.shades.push(shade);
    }

    /// Remove all state geometry.
    pub fn remove_shades(&mut self) {
        self.shades.clear();
    }

    /// Translate the state geometry.
    pub fn move_by(&mut self, offset: &Vec3) {
        self.shades.iter_mut().for_each(|s| s.move_by(offset));
    }

    /// Rotate the state geometry by `angle` degrees.
    pub fn rotate(&mut self, axis: &Vec3, angle: f64, origin: &Point3) {
        self.shades.iter_mut().for_each(|s| s.rotate(axis, angle, origin));
    }

    /// Rotate the state geometry in the XY plane by `angle` degrees.
    pub fn rotate_xy(&mut self, angle: f64, origin: &Point3) {
        self.shades.iter_mut().for_each(|s| s.rotate_xy(angle, origin));
    }

    /// Reflect the state geometry.
    pub fn reflect(&mut self, normal: &Vec3, origin: &Point3) {
        self.shades.iter_mut().for_each(|s| s.reflect(normal, origin));
    }

    /// Scale the state geometry.
    pub fn scale(&mut self, factor: f64, origin: Option<&Point3>) {
        self.shades.iter_mut().for_each(|s| s.scale(factor, origin));
    }

    /// Dictionary form.
    pub fn to_dict(&self, abridged: bool) -> Result<JsonValue> {
        let mut dict = Dict::new();
        dict.insert("type".into(), json!(type_name("RadianceShadeState", abridged)));
        write_fields(
            &mut dict,
            self.modifier.as_ref(),
            self.modifier_direct.as_ref(),
            &self.shades,
            abridged,
        )?;
        Ok(JsonValue::Object(dict))
    }

    /// Read a full dictionary.
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
        let expected = type_name("RadianceShadeState", matches!(refs, ModifierRefs::Table(_)));
        let dict = as_dict(data, &expected)?;
        check_type(dict, &expected)?;
        let fields = read_fields(dict, refs, config, &expected)?;
        Ok(Self {
            modifier: fields.modifier,
            modifier_direct: fields.modifier_direct,
            shades: fields.shades,
        })
    }
}

impl RadianceState for RadianceShadeState {
    fn explicit_modifier(&self) -> Option<&Modifier> {
        self.modifier.as_ref()
    }

    fn shades(&self) -> &[StateGeometry] {
        &self.shades
    }

    /// The state modifier when it is transparent, else the host's black-out
    /// modifier.
    fn modifier_direct(&self, host: &StateHost<'_>) -> Modifier {
        if let Some(direct) = &self.modifier_direct {
            return direct.clone();
        }
        let modifier = self.modifier(host);
        if modifier.is_opaque() {
            host.modifier_blk.clone()
        } else {
            modifier
        }
    }
}

impl RadianceSubFaceState {
    /// Create a state; `None` keeps the host's modifier.
    pub fn new(modifier: Option<Modifier>, shades: Vec<StateGeometry>) -> Self {
        Self {
            modifier,
            shades,
            ..Self::default()
        }
    }

    /// Set or reset the modifier.
    pub fn set_modifier(&mut self, modifier: Option<Modifier>) {
        self.modifier = modifier;
    }

    /// The explicitly assigned direct modifier.
    pub fn explicit_modifier_direct(&self) -> Option<&Modifier> {
        self.modifier_direct.as_ref()
    }

    /// Set or reset the direct modifier.
    pub fn set_modifier_direct(&mut self, modifier: Option<Modifier>) {
        self.modifier_direct = modifier;
    }

    /// Add one state geometry.
    pub fn add_shade(&mut self, shade: StateGeometry) {
        self.shades.push(shade);
    }

    /// Remove all state geometry.
    pub fn remove_shades(&mut self) {
        self.shades.clear();
    }

    /// Geometry for the view matrix.
    pub fn vmtx_geometry(&self, host: &StateHost<'_>) -> Face3 {
        self.vmtx_geometry
            .clone()
            .unwrap_or_else(|| host.geometry.flip())
    }

    /// The explicitly assigned view matrix geometry.
    pub fn explicit_vmtx_geometry(&self) -> Option<&Face3> {
        self.vmtx_geometry.as_ref()
    }

    /// Set or reset the view matrix geometry.
    pub fn set_vmtx_geometry(&mut self, geometry: Option<Face3>) {
        self.vmtx_geometry = geometry;
    }

    /// Geometry for the daylight matrix.
    pub fn dmtx_geometry(&self, host: &StateHost<'_>) -> Face3 {
        self.dmtx_geometry
            .clone()
            .unwrap_or_else(|| host.geometry.flip())
    }

    /// The explicitly assigned daylight matrix geometry.
    pub fn explicit_dmtx_geometry(&self) -> Option<&Face3> {
        self.dmtx_geometry.as_ref()
    }

    /// Set or reset the daylight matrix geometry.
    pub fn set_dmtx_geometry(&mut self, geometry: Option<Face3>) {
        self.dmtx_geometry = geometry;
    }

    /// True when neither matrix geometry has been set.
    pub fn mtxs_default(&self) -> bool {
        self.vmtx_geometry.is_none() && self.dmtx_geometry.is_none()
    }

    /// Offset both matrix geometries by half of `thickness`: the daylight
    /// matrix outward and the view matrix inward.
    pub fn gen_geos_from_tmtx_thickness(&mut self, host: &StateHost<'_>, thickness: f64) {
        let out = host.geometry.normal() * (thickness / 2.0);
        let base = host.geometry.flip();
        self.dmtx_geometry = Some(base.moved(&out));
        self.vmtx_geometry = Some(base.moved(&-out));
    }

    /// View matrix geometry offset inward from the host.
    pub fn gen_geo_from_vmtx_offset(&mut self, host: &StateHost<'_>, offset: f64) {
        let inward = -host.geometry.normal() * offset;
        self.vmtx_geometry = Some(host.geometry.flip().moved(&inward));
    }

    /// Daylight matrix geometry offset outward from the host.
    pub fn gen_geo_from_dmtx_offset(&mut self, host: &StateHost<'_>, offset: f64) {
        let outward = host.geometry.normal() * offset;
        self.dmtx_geometry = Some(host.geometry.flip().moved(&outward));
    }

    fn map_geometry(&mut self, f: impl Fn(&Face3) -> Face3) {
        self.vmtx_geometry = self.vmtx_geometry.as_ref().map(&f);
        self.dmtx_geometry = self.dmtx_geometry.as_ref().map(&f);
    }

    /// Translate the state and matrix geometry.
    pub fn move_by(&mut self, offset: &Vec3) {
        self.shades.iter_mut().for_each(|s| s.move_by(offset));
        self.map_geometry(|g| g.moved(offset));
    }

    /// Rotate the state and matrix geometry by `angle` degrees.
    pub fn rotate(&mut self, axis: &Vec3, angle: f64, origin: &Point3) {
        self.shades.iter_mut().for_each(|s| s.rotate(axis, angle, origin));
        self.map_geometry(|g| g.rotated(axis, angle.to_radians(), origin));
    }

    /// Rotate the state and matrix geometry in the XY plane by `angle` degrees.
    pub fn rotate_xy(&mut self, angle: f64, origin: &Point3) {
        self.shades.iter_mut().for_each(|s| s.rotate_xy(angle, origin));
        self.map_geometry(|g| g.rotated_xy(angle.to_radians(), origin));
    }

    /// Reflect the state and matrix geometry.
    pub fn reflect(&mut self, normal: &Vec3, origin: &Point3) {
        self.shades.iter_mut().for_each(|s| s.reflect(normal, origin));
        self.map_geometry(|g| g.reflected(normal, origin));
    }

    /// Scale the state and matrix geometry.
    pub fn scale(&mut self, factor: f64, origin: Option<&Point3>) {
        self.shades.iter_mut().for_each(|s| s.scale(factor, origin));
        self.map_geometry(|g| g.scaled(factor, origin));
    }

    /// View matrix polygon named after the host.
    pub fn vmtx_to_radiance(&self, host: &StateHost<'_>, modifier: &Modifier, minimal: bool) -> String {
        face_record(host.identifier, &self.vmtx_geometry(host), modifier, minimal)
    }

    /// Daylight matrix polygon named after the host, using white glow.
    pub fn dmtx_to_radiance(&self, host: &StateHost<'_>, minimal: bool) -> String {
        face_record(
            host.identifier,
            &self.dmtx_geometry(host),
            &defaults().white_glow,
            minimal,
        )
    }

    /// Dictionary form.
    pub fn to_dict(&self, abridged: bool) -> Result<JsonValue> {
        let mut dict = Dict::new();
        dict.insert("type".into(), json!(type_name("RadianceSubFaceState", abridged)));
        write_fields(
            &mut dict,
            self.modifier.as_ref(),
            self.modifier_direct.as_ref(),
            &self.shades,
            abridged,
        )?;
        if let Some(geometry) = &self.vmtx_geometry {
            dict.insert("vmtx_geometry".into(), serde_json::to_value(geometry)?);
        }
        if let Some(geometry) = &self.dmtx_geometry {
            dict.insert("dmtx_geometry".into(), serde_json::to_value(geometry)?);
        }
        Ok(JsonValue::Object(dict))
    }

    /// Read a full dictionary.
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
        let expected = type_name("RadianceSubFaceState", matches!(refs, ModifierRefs::Table(_)));
        let dict = as_dict(data, &expected)?;
        check_type(dict, &expected)?;
        let fields = read_fields(dict, refs, config, &expected)?;
        let face = |key: &str| -> Result<Option<Face3>> {
            match dict.get(key) {
                None | Some(JsonValue::Null) => Ok(None),
                Some(value) => Ok(Some(serde_json::from_value(value.clone())?)),
            }
        };
        Ok(Self {
            modifier: fields.modifier,
            modifier_direct: fields.modifier_direct,
            shades: fields.shades,
            vmtx_geometry: face("vmtx_geometry")?,
            dmtx_geometry: face("dmtx_geometry")?,
        })
    }
}

impl RadianceState for RadianceSubFaceState {
    fn explicit_modifier(&self) -> Option<&Modifier> {
        self.modifier.as_ref()
    }

    fn shades(&self) -> &[StateGeometry] {
        &self.shades
    }

    fn modifier_direct(&self, host: &StateHost<'_>) -> Modifier {
        self.modifier_direct
            .clone()
            .unwrap_or_else(|| self.modifier(host))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamic::fixtures::{host, window};
    use crate::material::{Glass, Trans};
    use crate::primitive::Primitive;
    use approx::assert_relative_eq;

    fn modifier(primitive: Primitive) -> Modifier {
        Modifier::new(primitive).unwrap()
    }

    fn tinted() -> Modifier {
        modifier(Primitive::new("tinted", Glass::from_single_transmittance(0.2, None).unwrap()).unwrap())
    }

    #[test]
    fn test_shade_state_modifiers() {
        let geometry = window();
        let wall = &defaults().generic_wall;
        let host = host("shade_1", &geometry, wall);

        let state = RadianceShadeState::default();
        assert_eq!(state.modifier(&host).identifier(), "generic_wall_0.50");
        assert_eq!(state.modifier_direct(&host).identifier(), "black");

        let translucent = modifier(Primitive::new("fabric", Trans::default()).unwrap());
        let state = RadianceShadeState::new(Some(translucent), Vec::new());
        assert_eq!(state.modifier_direct(&host).identifier(), "fabric");
    }

    #[test]
    fn test_shade_state_to_radiance() {
        let geometry = window();
        let host = host("shade_1", &geometry, &defaults().generic_exterior_shade);
        let shelf = StateGeometry::from_vertices(
            "shelf",
            &[[0.0, 0.0, 1.0], [1.0, 0.0, 1.0], [1.0, -0.5, 1.0]],
            None,
        )
        .unwrap();
        let state = RadianceShadeState::new(None, vec![shelf]);
        let text = state.to_radiance(&host, false, true);
        let records: Vec<&str> = text.split("\n\n").collect();
        assert_eq!(records.len(), 2);
        assert!(records[0].starts_with("generic_exterior_shade_0.35 polygon shade_1 0 0 12"));
        assert!(records[1].starts_with("generic_exterior_shade_0.35 polygon shelf"));
        assert!(state.to_radiance(&host, true, true).starts_with("black polygon shade_1"));
    }

    #[test]
    fn test_dict_with_config_writes_bsdf() {
        let src = tempfile::tempdir().unwrap();
        let xml = "<WindowElement>\n<IncidentDataStructure>TensorTree4</IncidentDataStructure>\n</WindowElement>\n";
        let path = src.path().join("source.xml");
        std::fs::write(&path, xml).unwrap();
        let bsdf = |id: &str| modifier(Primitive::new(id, crate::material::Bsdf::new(&path).unwrap()).unwrap());

        let blind = StateGeometry::from_vertices(
            "blind",
            &[[0.0, 0.0, 1.0], [1.0, 0.0, 1.0], [1.0, -0.5, 1.0]],
            Some(bsdf("blind_bsdf")),
        )
        .unwrap();
        let state = RadianceSubFaceState::new(Some(bsdf("window_bsdf")), vec![blind]);
        let data = state.to_dict(false).unwrap();

        let out = tempfile::tempdir().unwrap();
        let config = Config {
            bsdf_folder: out.path().join("BSDF"),
            ..Config::default()
        };
        let back = RadianceSubFaceState::from_dict_with(&data, &config).unwrap();
        assert_eq!(back.explicit_modifier().unwrap().identifier(), "window_bsdf");
        assert_eq!(back.shades()[0].explicit_modifier().unwrap().identifier(), "blind_bsdf");
        for id in ["window_bsdf", "blind_bsdf"] {
            let written = out.path().join("BSDF").join(format!("{}.xml", id));
            assert_eq!(std::fs::read_to_string(written).unwrap(), xml);
        }
    }

    #[test]
    fn test_subface_state_direct_modifier() {
        let geometry = window();
        let window_mod = &defaults().generic_exterior_window;
        let host = host("window_1", &geometry, window_mod);
        let mut state = RadianceSubFaceState::new(Some(tinted()), Vec::new());
        assert_eq!(state.modifier_direct(&host).identifier(), "tinted");
        state.set_modifier_direct(Some(defaults().black.clone()));
        assert_eq!(state.modifier_direct(&host).identifier(), "black");
    }

    #[test]
    fn test_matrix_geometry() {
        let geometry = window();
        let host = host("window_1", &geometry, &defaults().generic_exterior_window);
        let mut state = RadianceSubFaceState::default();
        assert!(state.mtxs_default());
        assert_relative_eq!(state.vmtx_geometry(&host).normal(), -geometry.normal());

        state.gen_geos_from_tmtx_thickness(&host, 0.2);
        assert!(!state.mtxs_default());
        let normal = geometry.normal();
        let out = state.dmtx_geometry(&host).center() - geometry.center();
        let inward = state.vmtx_geometry(&host).center() - geometry.center();
        assert_relative_eq!(out, normal * 0.1, epsilon = 1e-12);
        assert_relative_eq!(inward, -normal * 0.1, epsilon = 1e-12);

        let mut state = RadianceSubFaceState::default();
        state.gen_geo_from_dmtx_offset(&host, 0.5);
        assert!(state.explicit_vmtx_geometry().is_none());
        assert!(state.explicit_dmtx_geometry().is_some());
        state.gen_geo_from_vmtx_offset(&host, 0.25);
        let inward = state.vmtx_geometry(&host).center() - geometry.center();
        assert_relative_eq!(inward, -normal * 0.25, epsilon = 1e-12);

        state.move_by(&Vec3::new(0.0, 0.0, 1.0));
        assert_relative_eq!(state.dmtx_geometry(&host).center().z, geometry.center().z + 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_matrix_radiance() {
        let geometry = window();
        let host = host("window_1", &geometry, &defaults().generic_exterior_window);
        let state = RadianceSubFaceState::default();
        let vmtx = state.vmtx_to_radiance(&host, &defaults().white_glow, true);
        assert!(vmtx.starts_with("white_glow polygon window_1 0 0 12 1.0 0.0 1.0"));
        assert!(state.dmtx_to_radiance(&host, true).starts_with("white_glow polygon window_1"));
    }

    #[test]
    fn test_dict_round_trips() {
        let shade_state = RadianceShadeState::new(
            Some(tinted()),
            vec![StateGeometry::from_vertices("fin", &[[0.0; 3], [1.0, 0.0, 0.0], [1.0, 0.0, 1.0]], None).unwrap()],
        );
        let data = shade_state.to_dict(false).unwrap();
        assert_eq!(data["type"], "RadianceShadeState");
        assert_eq!(data["shades"][0]["type"], "StateGeometry");
        assert_eq!(RadianceShadeState::from_dict(&data).unwrap(), shade_state);
        assert!(RadianceSubFaceState::from_dict(&data).is_err());

        let mut sub = RadianceSubFaceState::new(Some(tinted()), Vec::new());
        sub.set_modifier_direct(Some(defaults().black.clone()));
        sub.set_dmtx_geometry(Some(window()));
        let data = sub.to_dict(false).unwrap();
        assert_eq!(data["modifier_direct"]["identifier"], "black");
        assert_eq!(data["dmtx_geometry"]["type"], "Face3D");
        assert!(data.get("vmtx_geometry").is_none());
        assert_eq!(RadianceSubFaceState::from_dict(&data).unwrap(), sub);

        let abridged = sub.to_dict(true).unwrap();
        assert_eq!(abridged["type"], "RadianceSubFaceStateAbridged");
        assert_eq!(abridged["modifier"], "tinted");
        let table: HashMap<String, Modifier> = [
            ("tinted".to_string(), tinted()),
            ("black".to_string(), defaults().black.clone()),
        ]
        .into_iter()
        .collect();
        assert_eq!(RadianceSubFaceState::from_dict_abridged(&abridged, &table).unwrap(), sub);
    }
}
