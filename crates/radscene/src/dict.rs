//! Dictionary codec for primitives.
//!
//! Two dictionary shapes exist for every primitive:
//! - the positional shape (`values` lines), produced from scene text, and
//! - the named-field shape (`r_reflectance`, `vertices`, ...), authored by
//!   hand or produced by [`Primitive::to_dict`].
//!
//! Each shape can reference its modifier and dependencies by embedding them
//! (full) or by identifier (abridged, resolved through a lookup table).

use std::collections::HashMap;

use serde_json::{json, Map, Value as JsonValue};

use crate::config::Config;
use crate::dynamic::{RadianceShadeState, RadianceSubFaceState, StateGeometry};
use crate::error::{RadianceError, Result};
use crate::modifierset::ModifierSet;
use crate::parser::{PrimitiveRecord, RecordModifier};
use crate::primitive::{Modifier, Primitive, PrimitiveKind};
use crate::reader::string_to_dicts;
use crate::sensorgrid::SensorGrid;
use crate::types::PrimitiveType;
use crate::value::{line_to_f64, Value, Values};
use crate::view::View;

/// A JSON object.
pub type Dict = Map<String, JsonValue>;

/// Context for reading named parameter fields.
pub struct FieldContext<'a> {
    /// Identifier of the primitive being read, for error messages.
    pub name: &'a str,
    /// Where file-backed data is materialized.
    pub config: &'a Config,
}

/// Where modifier and dependency references are resolved from.
#[derive(Debug, Clone, Copy)]
pub enum ModifierRefs<'a> {
    /// References are embedded dictionaries.
    Embedded,
    /// References are identifiers looked up in a table.
    Table(&'a HashMap<String, Modifier>),
}

impl ModifierRefs<'_> {
    pub(crate) fn resolve(&self, data: Option<&JsonValue>, config: &Config, context: &str) -> Result<Modifier> {
        let Some(data) = data else {
            return Ok(Modifier::Void);
        };
        if is_void(data) {
            return Ok(Modifier::Void);
        }
        match (self, data) {
            (ModifierRefs::Table(table), JsonValue::String(identifier)) => {
                lookup(table, identifier, context)
            }
            _ => dict_to_modifier_with(data, config),
        }
    }
}

/// Find an identifier in an abridged lookup table.
pub fn lookup(table: &HashMap<String, Modifier>, identifier: &str, context: &str) -> Result<Modifier> {
    if identifier == "void" {
        return Ok(Modifier::Void);
    }
    table
        .get(identifier)
        .cloned()
        .ok_or_else(|| RadianceError::missing_reference(identifier, context))
}

/// Read an optional modifier reference; absent and `null` give `None`.
pub(crate) fn opt_modifier(
    dict: &Dict,
    key: &str,
    refs: ModifierRefs<'_>,
    config: &Config,
    context: &str,
) -> Result<Option<Modifier>> {
    if !dict.has(key) {
        return Ok(None);
    }
    refs.resolve(dict.get(key), config, context).map(Some)
}

/// A modifier as an identifier (abridged) or an embedded dictionary.
pub(crate) fn modifier_reference(modifier: &Modifier, abridged: bool) -> Result<JsonValue> {
    if abridged {
        Ok(json!(modifier.identifier()))
    } else {
        modifier.to_dict()
    }
}

fn is_void(data: &JsonValue) -> bool {
    match data {
        JsonValue::Null => true,
        JsonValue::String(s) => s == "void",
        JsonValue::Object(map) => map.get("type").and_then(JsonValue::as_str) == Some("void"),
        _ => false,
    }
}

/// Typed accessors for dictionary fields with contextual errors.
pub(crate) trait DictArgs {
    /// Required string field.
    fn string(&self, key: &str, context: &str) -> Result<&str>;
    /// Optional string field; `null` counts as absent.
    fn opt_string(&self, key: &str) -> Option<&str>;
    /// Required real field.
    fn real(&self, key: &str, context: &str) -> Result<f64>;
    /// Optional real field; `null` counts as absent.
    fn opt_real(&self, key: &str, context: &str) -> Result<Option<f64>>;
    /// Required `[x, y, z]` field.
    fn triple(&self, key: &str, context: &str) -> Result<[f64; 3]>;
    /// Optional `[x, y, z]` field; `null` counts as absent.
    fn opt_triple(&self, key: &str, context: &str) -> Result<Option<[f64; 3]>>;
    /// Required list field.
    fn list(&self, key: &str, context: &str) -> Result<&Vec<JsonValue>>;
    /// Present and not `null`.
    fn has(&self, key: &str) -> bool;
}

impl DictArgs for Dict {
    fn string(&self, key: &str, context: &str) -> Result<&str> {
        self.opt_string(key)
            .ok_or_else(|| RadianceError::missing_key(key, context))
    }

    fn opt_string(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(JsonValue::as_str)
    }

    fn real(&self, key: &str, context: &str) -> Result<f64> {
        self.opt_real(key, context)?
            .ok_or_else(|| RadianceError::missing_key(key, context))
    }

    fn opt_real(&self, key: &str, context: &str) -> Result<Option<f64>> {
        match self.get(key) {
            None | Some(JsonValue::Null) => Ok(None),
            Some(v) => v.as_f64().map(Some).ok_or_else(|| {
                RadianceError::type_mismatch(format!("a number for \"{}\" in {}", key, context), v.to_string())
            }),
        }
    }

    fn triple(&self, key: &str, context: &str) -> Result<[f64; 3]> {
        self.opt_triple(key, context)?
            .ok_or_else(|| RadianceError::missing_key(key, context))
    }

    fn opt_triple(&self, key: &str, context: &str) -> Result<Option<[f64; 3]>> {
        match self.get(key) {
            None | Some(JsonValue::Null) => Ok(None),
            Some(v) => serde_json::from_value::<[f64; 3]>(v.clone()).map(Some).map_err(|_| {
                RadianceError::type_mismatch(
                    format!("three numbers for \"{}\" in {}", key, context),
                    v.to_string(),
                )
            }),
        }
    }

    fn list(&self, key: &str, context: &str) -> Result<&Vec<JsonValue>> {
        match self.get(key) {
            Some(JsonValue::Array(items)) => Ok(items),
            Some(JsonValue::Null) | None => Err(RadianceError::missing_key(key, context)),
            Some(other) => Err(RadianceError::type_mismatch(
                format!("a list for \"{}\" in {}", key, context),
                other.to_string(),
            )),
        }
    }

    fn has(&self, key: &str) -> bool {
        !matches!(self.get(key), None | Some(JsonValue::Null))
    }
}

/// View a JSON value as an object.
pub(crate) fn as_dict<'a>(data: &'a JsonValue, context: &str) -> Result<&'a Dict> {
    data.as_object()
        .ok_or_else(|| RadianceError::type_mismatch(format!("a dictionary for {}", context), data.to_string()))
}

/// Check the `type` key of a dictionary.
pub(crate) fn check_type(dict: &Dict, expected: &str) -> Result<()> {
    let actual = dict.string("type", expected)?;
    if actual != expected {
        return Err(RadianceError::type_mismatch(expected, actual));
    }
    Ok(())
}

/// Read a value line of exactly `count` reals, or one of the `counts` allowed.
pub(crate) fn reals(values: &Values, line: usize, counts: &[usize], name: &str) -> Result<Vec<f64>> {
    let reals = line_to_f64(&values[line], name)?;
    if !counts.contains(&reals.len()) {
        return Err(RadianceError::parse(
            name,
            format!(
                "value line {} holds {} values; expected {}",
                line,
                reals.len(),
                counts.iter().map(|c| c.to_string()).collect::<Vec<_>>().join(" or ")
            ),
        ));
    }
    Ok(reals)
}

fn dependencies_from(dict: &Dict, refs: ModifierRefs<'_>, config: &Config, context: &str) -> Result<Vec<Modifier>> {
    match dict.get("dependencies") {
        Some(JsonValue::Array(items)) => items
            .iter()
            .map(|item| refs.resolve(Some(item), config, context))
            .collect(),
        _ => Ok(Vec::new()),
    }
}

/// Pull a mirror's alternate material out of value line 0.
///
/// The alternate must be `void` or one of the dependencies, which it is then
/// removed from.
fn take_alternate(primitive: &mut Primitive, line: &[Value]) -> Result<()> {
    let PrimitiveKind::Mirror(_) = primitive.kind() else {
        return Ok(());
    };
    let alternate = match line {
        [] => None,
        [token] if token.to_string() == "void" => Some(Modifier::Void),
        [token] => {
            let name = token.to_string();
            let mut dependencies = primitive.take_dependencies();
            let matches: Vec<usize> = dependencies
                .iter()
                .enumerate()
                .filter(|(_, d)| d.identifier() == name)
                .map(|(i, _)| i)
                .collect();
            if matches.len() != 1 {
                return Err(RadianceError::parse(
                    primitive.identifier(),
                    format!("Failed to find alternate material for mirror: \"{}\" in dependencies", name),
                ));
            }
            let alternate = dependencies.remove(matches[0]);
            for dependency in dependencies {
                primitive.add_dependency(dependency);
            }
            Some(alternate)
        }
        _ => {
            return Err(RadianceError::parse(
                primitive.identifier(),
                "a mirror takes at most one alternate material",
            ))
        }
    };
    if let PrimitiveKind::Mirror(mirror) = primitive.kind_mut() {
        mirror.alternate_material = alternate;
    }
    Ok(())
}

fn finish(
    identifier: &str,
    kind: PrimitiveKind,
    modifier: Modifier,
    dependencies: Vec<Modifier>,
    display_name: Option<&str>,
) -> Result<Primitive> {
    let mut primitive = Primitive::new(identifier, kind)?
        .with_modifier(modifier)
        .with_dependencies(dependencies);
    primitive.set_display_name(display_name.map(str::to_string));
    Ok(primitive)
}

impl Primitive {
    /// Parse text holding exactly one top-level record after resolution.
    pub fn from_string(text: &str) -> Result<Primitive> {
        let records = string_to_dicts(text)?;
        match records.as_slice() {
            [record] => Primitive::from_record(record),
            _ => Err(RadianceError::parse_message(format!(
                "Input string includes {} Radiance objects; expected exactly one",
                records.len()
            ))),
        }
    }

    /// Build a primitive from a resolved positional record.
    pub fn from_record(record: &PrimitiveRecord) -> Result<Primitive> {
        Self::from_record_with(record, &Config::default())
    }

    /// Build a primitive from a resolved positional record.
    pub fn from_record_with(record: &PrimitiveRecord, config: &Config) -> Result<Primitive> {
        let primitive_type = PrimitiveType::from_tag(&record.primitive_type)?;
        let modifier = match &record.modifier {
            m if m.is_void() => Modifier::Void,
            RecordModifier::Record(inner) => Modifier::new(Primitive::from_record_with(inner, config)?)?,
            other => {
                return Err(RadianceError::MissingModifier {
                    modifier: other.identifier().to_string(),
                    referrer: record.identifier.clone(),
                })
            }
        };
        let dependencies = record
            .dependencies
            .iter()
            .map(|d| Modifier::new(Primitive::from_record_with(d, config)?))
            .collect::<Result<Vec<_>>>()?;
        let kind = PrimitiveKind::from_values(primitive_type, &record.values, &record.identifier)?;
        let mut primitive = finish(
            &record.identifier,
            kind,
            modifier,
            dependencies,
            record.display_name.as_deref(),
        )?;
        take_alternate(&mut primitive, &record.values[0])?;
        Ok(primitive)
    }

    /// Positional record of this primitive, with the modifier and dependency
    /// chains embedded.
    pub fn to_record(&self) -> PrimitiveRecord {
        let modifier = match self.modifier().primitive() {
            None => RecordModifier::Void,
            Some(p) => RecordModifier::Record(Box::new(p.to_record())),
        };
        PrimitiveRecord {
            modifier,
            primitive_type: self.primitive_type().tag().to_string(),
            identifier: self.identifier().to_string(),
            display_name: self.explicit_display_name().map(str::to_string),
            values: self.values(),
            dependencies: self
                .dependencies()
                .filter_map(Modifier::primitive)
                .map(Primitive::to_record)
                .collect(),
        }
    }

    /// Named-field dictionary with the modifier and dependencies embedded.
    pub fn to_dict(&self) -> Result<JsonValue> {
        self.to_named_dict(false)
    }

    /// Named-field dictionary with the modifier and dependencies as identifiers.
    pub fn to_dict_abridged(&self) -> Result<JsonValue> {
        self.to_named_dict(true)
    }

    fn to_named_dict(&self, abridged: bool) -> Result<JsonValue> {
        let reference = |m: &Modifier| -> Result<JsonValue> {
            if abridged {
                Ok(json!(m.identifier()))
            } else {
                m.to_dict()
            }
        };
        let mut dict = Dict::new();
        dict.insert("modifier".into(), reference(self.modifier())?);
        dict.insert("type".into(), json!(self.kind().dict_type()));
        dict.insert("identifier".into(), json!(self.identifier()));
        self.kind().write_fields(&mut dict)?;
        if let PrimitiveKind::Mirror(mirror) = self.kind() {
            let alternate = match &mirror.alternate_material {
                None => JsonValue::Null,
                Some(Modifier::Void) if abridged => json!("void"),
                Some(Modifier::Void) => json!({"type": "void"}),
                Some(m) => reference(m)?,
            };
            dict.insert("alternate_material".into(), alternate);
        }
        let dependencies = self
            .stored_dependencies()
            .iter()
            .map(reference)
            .collect::<Result<Vec<_>>>()?;
        dict.insert("dependencies".into(), JsonValue::Array(dependencies));
        if let Some(name) = self.explicit_display_name() {
            dict.insert("display_name".into(), json!(name));
        }
        Ok(JsonValue::Object(dict))
    }

    /// Build a primitive from a named-field dictionary with embedded references.
    pub fn from_dict(data: &JsonValue) -> Result<Primitive> {
        Self::from_named_dict(data, ModifierRefs::Embedded, &Config::default())
    }

    /// Build a primitive from a named-field dictionary, writing file-backed
    /// data into the folders of `config`.
    pub fn from_dict_with(data: &JsonValue, config: &Config) -> Result<Primitive> {
        Self::from_named_dict(data, ModifierRefs::Embedded, config)
    }

    /// Build a primitive from an abridged dictionary, resolving identifiers
    /// through `table`. An identifier missing from the table is an error.
    pub fn from_dict_abridged(data: &JsonValue, table: &HashMap<String, Modifier>) -> Result<Primitive> {
        let config = Config::default();
        let dict = as_dict(data, "primitive")?;
        if dict.has("values") {
            Self::from_positional_dict(dict, ModifierRefs::Table(table), &config)
        } else {
            Self::from_named_dict(data, ModifierRefs::Table(table), &config)
        }
    }

    fn from_named_dict(data: &JsonValue, refs: ModifierRefs<'_>, config: &Config) -> Result<Primitive> {
        let dict = as_dict(data, "primitive")?;
        let type_tag = dict.string("type", "primitive")?;
        let primitive_type = PrimitiveType::from_tag(type_tag)?;
        let identifier = dict.string("identifier", type_tag)?;
        let ctx = FieldContext {
            name: identifier,
            config,
        };
        let kind = PrimitiveKind::from_fields(primitive_type, dict, &ctx)?;
        let modifier = refs.resolve(dict.get("modifier"), config, identifier)?;
        let dependencies = dependencies_from(dict, refs, config, identifier)?;
        let mut primitive = finish(identifier, kind, modifier, dependencies, dict.opt_string("display_name"))?;
        if let PrimitiveKind::Mirror(mirror) = primitive.kind_mut() {
            mirror.alternate_material = match dict.get("alternate_material") {
                None | Some(JsonValue::Null) => None,
                Some(alt) => Some(refs.resolve(Some(alt), config, identifier)?),
            };
        }
        Ok(primitive)
    }

    fn from_positional_dict(dict: &Dict, refs: ModifierRefs<'_>, config: &Config) -> Result<Primitive> {
        let type_tag = dict.string("type", "primitive")?;
        let primitive_type = PrimitiveType::from_tag(type_tag)?;
        let identifier = dict.string("identifier", type_tag)?;
        let values: Values = serde_json::from_value(dict["values"].clone())?;
        let kind = PrimitiveKind::from_values(primitive_type, &values, identifier)?;
        let modifier = refs.resolve(dict.get("modifier"), config, identifier)?;
        let dependencies = dependencies_from(dict, refs, config, identifier)?;
        let mut primitive = finish(identifier, kind, modifier, dependencies, dict.opt_string("display_name"))?;
        take_alternate(&mut primitive, &values[0])?;
        Ok(primitive)
    }
}

impl Modifier {
    /// Full dictionary of the wrapped primitive; `null` for the sentinel.
    pub fn to_dict(&self) -> Result<JsonValue> {
        match self.primitive() {
            None => Ok(JsonValue::Null),
            Some(p) => p.to_dict(),
        }
    }
}

/// Build any primitive from either dictionary shape.
///
/// Dictionaries carrying a `values` key are positional and go through the
/// record path; all others are named-field dictionaries.
pub fn dict_to_primitive(data: &JsonValue) -> Result<Primitive> {
    dict_to_primitive_with(data, &Config::default())
}

/// [`dict_to_primitive`] with explicit folders for file-backed data.
pub fn dict_to_primitive_with(data: &JsonValue, config: &Config) -> Result<Primitive> {
    let dict = as_dict(data, "primitive")?;
    if dict.has("values") {
        Primitive::from_positional_dict(dict, ModifierRefs::Embedded, config)
    } else {
        Primitive::from_named_dict(data, ModifierRefs::Embedded, config)
    }
}

/// Build a modifier from either dictionary shape; `null`, `"void"` and
/// `{"type": "void"}` give the sentinel. Geometry is rejected.
pub fn dict_to_modifier(data: &JsonValue) -> Result<Modifier> {
    dict_to_modifier_with(data, &Config::default())
}

/// [`dict_to_modifier`] with explicit folders for file-backed data.
pub fn dict_to_modifier_with(data: &JsonValue, config: &Config) -> Result<Modifier> {
    if is_void(data) {
        return Ok(Modifier::Void);
    }
    Modifier::new(dict_to_primitive_with(data, config)?)
}

/// Any object with a full dictionary form.
#[derive(Debug, Clone)]
#[allow(missing_docs)]
pub enum SceneObject {
    Primitive(Primitive),
    ModifierSet(ModifierSet),
    SensorGrid(SensorGrid),
    View(View),
    StateGeometry(StateGeometry),
    ShadeState(RadianceShadeState),
    SubFaceState(RadianceSubFaceState),
}

/// Rebuild any object from its full (non-abridged) dictionary.
///
/// With `raise_exception` unset, an unrecognized type gives `Ok(None)`.
pub fn dict_to_object(data: &JsonValue, raise_exception: bool) -> Result<Option<SceneObject>> {
    dict_to_object_with(data, raise_exception, &Config::default())
}

/// [`dict_to_object`] with explicit folders for file-backed data.
pub fn dict_to_object_with(data: &JsonValue, raise_exception: bool, config: &Config) -> Result<Option<SceneObject>> {
    let dict = as_dict(data, "object")?;
    let object_type = dict.string("type", "object")?;
    let object = match object_type {
        "ModifierSet" => SceneObject::ModifierSet(ModifierSet::from_dict_with(data, config)?),
        "SensorGrid" => SceneObject::SensorGrid(SensorGrid::from_dict(data)?),
        "View" => SceneObject::View(View::from_dict(data)?),
        "StateGeometry" => SceneObject::StateGeometry(StateGeometry::from_dict_with(data, config)?),
        "RadianceShadeState" => SceneObject::ShadeState(RadianceShadeState::from_dict_with(data, config)?),
        "RadianceSubFaceState" => SceneObject::SubFaceState(RadianceSubFaceState::from_dict_with(data, config)?),
        other => match PrimitiveType::from_tag(other) {
            Ok(_) => SceneObject::Primitive(dict_to_primitive_with(data, config)?),
            Err(err) if raise_exception => return Err(err),
            Err(_) => return Ok(None),
        },
    };
    Ok(Some(object))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::{Glass, Mirror, Plastic};

    const GLASS_MIRROR: &str = r#"
void glass glass_alt_mat
0
0
3 0.96 0.96 0.96
void brightfunc glass_angular_effect
2 A1+(1-A1) (exp(-5.85 Rdot)-0.00287989916)
0
1 0.08
glass_angular_effect mirror glass_mat
1 glass_alt_mat
0
3 1 1 1
"#;

    fn normalize(text: &str) -> String {
        text.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn test_from_string_mirror_chain() {
        let mirror = Primitive::from_string(GLASS_MIRROR).unwrap();
        assert_eq!(mirror.primitive_type(), PrimitiveType::Mirror);
        assert_eq!(mirror.modifier().identifier(), "glass_angular_effect");
        let PrimitiveKind::Mirror(params) = mirror.kind() else {
            panic!("expected a mirror");
        };
        assert_eq!(params.alternate_material.as_ref().unwrap().identifier(), "glass_alt_mat");
        assert!(mirror.stored_dependencies().is_empty());

        let text = mirror.to_radiance(true, true, true);
        assert_eq!(
            normalize(&text),
            normalize(
                "void glass glass_alt_mat 0 0 3 0.96 0.96 0.96 \
                 void brightfunc glass_angular_effect 2 A1+(1-A1) (exp(-5.85 Rdot)-0.00287989916) 0 1 0.08 \
                 glass_angular_effect mirror glass_mat 1 glass_alt_mat 0 3 1.0 1.0 1.0"
            )
        );
    }

    #[test]
    fn test_from_string_requires_one_record() {
        let text = "void plastic a 0 0 5 0 0 0 0 0\nvoid plastic b 0 0 5 0 0 0 0 0";
        assert!(Primitive::from_string(text).is_err());
    }

    #[test]
    fn test_text_round_trip_generic() {
        let text = "void colorpict wood 7 red green blue wood.hdr picture.cal frac(Lu) frac(Lv) 0 1 1.5";
        let p = Primitive::from_string(text).unwrap();
        assert!(matches!(p.kind(), PrimitiveKind::Generic { .. }));
        assert_eq!(p.to_radiance(true, true, true), text);
    }

    #[test]
    fn test_full_dict_round_trip() {
        let base = Modifier::new(
            Primitive::new("base", Plastic::new(0.2, 0.3, 0.4, 0.0, 0.0).unwrap()).unwrap(),
        )
        .unwrap();
        let glass = Primitive::new("window", Glass::new(0.9, 0.9, 0.9, Some(1.52)).unwrap())
            .unwrap()
            .with_modifier(base.clone())
            .with_dependencies(vec![base])
            .with_display_name("Window Glass");
        let data = glass.to_dict().unwrap();
        assert_eq!(data["type"], "glass");
        assert_eq!(data["modifier"]["type"], "Plastic");
        assert_eq!(data["display_name"], "Window Glass");
        assert_eq!(Primitive::from_dict(&data).unwrap(), glass);
        assert_eq!(dict_to_primitive(&data).unwrap(), glass);
    }

    #[test]
    fn test_abridged_round_trip() {
        let base = Modifier::new(
            Primitive::new("base", Plastic::default()).unwrap(),
        )
        .unwrap();
        let p = Primitive::new("top", Plastic::new(0.5, 0.5, 0.5, 0.0, 0.0).unwrap())
            .unwrap()
            .with_modifier(base.clone());
        let data = p.to_dict_abridged().unwrap();
        assert_eq!(data["modifier"], "base");

        let mut table = HashMap::new();
        table.insert("base".to_string(), base);
        assert_eq!(Primitive::from_dict_abridged(&data, &table).unwrap(), p);

        let err = Primitive::from_dict_abridged(&data, &HashMap::new()).unwrap_err();
        assert!(matches!(err, RadianceError::MissingReference { identifier, .. } if identifier == "base"));
    }

    #[test]
    fn test_dual_shape_dispatch() {
        let positional = json!({
            "modifier": null,
            "type": "plastic",
            "identifier": "p",
            "values": [[], [], ["0.5", "0.5", "0.5", "0", "0"]],
            "dependencies": []
        });
        let named = json!({
            "modifier": null,
            "type": "Plastic",
            "identifier": "p",
            "r_reflectance": 0.5,
            "g_reflectance": 0.5,
            "b_reflectance": 0.5,
            "specularity": 0.0,
            "roughness": 0.0,
            "dependencies": []
        });
        let a = dict_to_primitive(&positional).unwrap();
        let b = dict_to_primitive(&named).unwrap();
        assert_eq!(a, b);

        let missing = json!({"type": "Plastic", "identifier": "p", "r_reflectance": 0.5});
        assert!(matches!(dict_to_primitive(&missing), Err(RadianceError::MissingKey { .. })));
    }

    #[test]
    fn test_mirror_alternate_dict_forms() {
        let mut params = Mirror::default();
        params.alternate_material = Some(Modifier::Void);
        let mirror = Primitive::new("m", params).unwrap();
        let data = mirror.to_dict().unwrap();
        assert_eq!(data["alternate_material"], json!({"type": "void"}));
        assert_eq!(Primitive::from_dict(&data).unwrap(), mirror);

        let plain = Primitive::new("m", Mirror::default()).unwrap();
        assert_eq!(plain.to_dict().unwrap()["alternate_material"], JsonValue::Null);
    }

    #[test]
    fn test_dict_to_modifier() {
        assert!(dict_to_modifier(&JsonValue::Null).unwrap().is_void());
        assert!(dict_to_modifier(&json!("void")).unwrap().is_void());
        assert!(dict_to_modifier(&json!({"type": "void"})).unwrap().is_void());
        let polygon = json!({
            "type": "polygon",
            "identifier": "poly",
            "vertices": [[0, 0, 0], [1, 0, 0], [1, 1, 0]]
        });
        assert!(dict_to_primitive(&polygon).is_ok());
        assert!(matches!(dict_to_modifier(&polygon), Err(RadianceError::NotAModifier { .. })));
        let unknown = json!({"type": "superglass", "identifier": "x", "values": [[], [], []]});
        assert!(matches!(dict_to_primitive(&unknown), Err(RadianceError::UnknownType(_))));
    }

    #[test]
    fn test_to_record() {
        let mirror = Primitive::from_string(GLASS_MIRROR).unwrap();
        let record = mirror.to_record();
        assert_eq!(record.values[0], vec![Value::Text("glass_alt_mat".into())]);
        assert_eq!(record.dependencies.len(), 1);
        let json = serde_json::to_value(&record).unwrap();
        let back = dict_to_primitive(&json).unwrap();
        assert_eq!(back, mirror);
    }

    #[test]
    fn test_dict_to_object() {
        let plastic = Primitive::new("p", Plastic::default()).unwrap().to_dict().unwrap();
        assert!(matches!(
            dict_to_object(&plastic, true).unwrap(),
            Some(SceneObject::Primitive(_))
        ));
        let unknown = json!({"type": "Sky"});
        assert!(dict_to_object(&unknown, false).unwrap().is_none());
        assert!(dict_to_object(&unknown, true).is_err());
    }
}
