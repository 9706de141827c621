//! Primitive graph nodes and shared modifier handles.
//!
//! A [`Primitive`] owns its typed parameters and refers to its modifier and
//! dependencies through [`Modifier`] handles. A handle wraps an `Arc`, so a
//! modifier shared by many primitives can never change under them; editing
//! one means cloning the primitive out, changing the copy and wrapping it in
//! a new handle.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::dict::{Dict, FieldContext};
use crate::error::{RadianceError, Result};
use crate::geometry::{Cone, Cylinder, Polygon, Ring, Source, Sphere};
use crate::material::{ABsdf, Bsdf, Glass, Glow, Light, Metal, Mirror, Plastic, Trans};
use crate::types::PrimitiveType;
use crate::typing::valid_rad_string;
use crate::value::{line_to_string, Values};

/// Typed parameters of one primitive family.
///
/// `values` and `from_values` map to the positional text form;
/// `write_fields` and `from_fields` map to the named-field dictionary form.
pub trait PrimitiveParams: Sized {
    /// Check every parameter against its legal range.
    fn validate(&self) -> Result<()>;

    /// The three value lines derived from the parameters.
    fn values(&self) -> Values;

    /// Read the parameters from positional value lines.
    fn from_values(values: &Values, name: &str) -> Result<Self>;

    /// Write the named parameter fields into a dictionary.
    fn write_fields(&self, dict: &mut Dict) -> Result<()>;

    /// Read the named parameter fields from a dictionary.
    fn from_fields(dict: &Dict, ctx: &FieldContext<'_>) -> Result<Self>;
}

/// Typed content of a primitive.
#[derive(Debug, Clone, PartialEq)]
#[allow(missing_docs)]
pub enum PrimitiveKind {
    Plastic(Plastic),
    Metal(Metal),
    Glass(Glass),
    Trans(Trans),
    Mirror(Mirror),
    Glow(Glow),
    Light(Light),
    Bsdf(Bsdf),
    ABsdf(ABsdf),
    Polygon(Polygon),
    Sphere(Sphere),
    Bubble(Sphere),
    Cone(Cone),
    Cup(Cone),
    Cylinder(Cylinder),
    Tube(Cylinder),
    Ring(Ring),
    Source(Source),
    /// Any other type, carried as raw value lines.
    Generic {
        /// The type tag.
        primitive_type: PrimitiveType,
        /// Raw value lines.
        values: Values,
    },
}

macro_rules! with_params {
    ($kind:expr, $p:ident => $body:expr, $values:ident => $generic:expr) => {
        match $kind {
            PrimitiveKind::Plastic($p) => $body,
            PrimitiveKind::Metal($p) => $body,
            PrimitiveKind::Glass($p) => $body,
            PrimitiveKind::Trans($p) => $body,
            PrimitiveKind::Mirror($p) => $body,
            PrimitiveKind::Glow($p) => $body,
            PrimitiveKind::Light($p) => $body,
            PrimitiveKind::Bsdf($p) => $body,
            PrimitiveKind::ABsdf($p) => $body,
            PrimitiveKind::Polygon($p) => $body,
            PrimitiveKind::Sphere($p) | PrimitiveKind::Bubble($p) => $body,
            PrimitiveKind::Cone($p) | PrimitiveKind::Cup($p) => $body,
            PrimitiveKind::Cylinder($p) | PrimitiveKind::Tube($p) => $body,
            PrimitiveKind::Ring($p) => $body,
            PrimitiveKind::Source($p) => $body,
            PrimitiveKind::Generic { values: $values, .. } => $generic,
        }
    };
}

macro_rules! kind_from {
    ($t:expr, $read:ident ( $($arg:expr),* ), $other:ident => $generic:expr) => {
        match $t {
            PrimitiveType::Plastic => PrimitiveKind::Plastic(Plastic::$read($($arg),*)?),
            PrimitiveType::Metal => PrimitiveKind::Metal(Metal::$read($($arg),*)?),
            PrimitiveType::Glass => PrimitiveKind::Glass(Glass::$read($($arg),*)?),
            PrimitiveType::Trans => PrimitiveKind::Trans(Trans::$read($($arg),*)?),
            PrimitiveType::Mirror => PrimitiveKind::Mirror(Mirror::$read($($arg),*)?),
            PrimitiveType::Glow => PrimitiveKind::Glow(Glow::$read($($arg),*)?),
            PrimitiveType::Light => PrimitiveKind::Light(Light::$read($($arg),*)?),
            PrimitiveType::Bsdf => PrimitiveKind::Bsdf(Bsdf::$read($($arg),*)?),
            PrimitiveType::ABsdf => PrimitiveKind::ABsdf(ABsdf::$read($($arg),*)?),
            PrimitiveType::Polygon => PrimitiveKind::Polygon(Polygon::$read($($arg),*)?),
            PrimitiveType::Sphere => PrimitiveKind::Sphere(Sphere::$read($($arg),*)?),
            PrimitiveType::Bubble => PrimitiveKind::Bubble(Sphere::$read($($arg),*)?),
            PrimitiveType::Cone => PrimitiveKind::Cone(Cone::$read($($arg),*)?),
            PrimitiveType::Cup => PrimitiveKind::Cup(Cone::$read($($arg),*)?),
            PrimitiveType::Cylinder => PrimitiveKind::Cylinder(Cylinder::$read($($arg),*)?),
            PrimitiveType::Tube => PrimitiveKind::Tube(Cylinder::$read($($arg),*)?),
            PrimitiveType::Ring => PrimitiveKind::Ring(Ring::$read($($arg),*)?),
            PrimitiveType::Source => PrimitiveKind::Source(Source::$read($($arg),*)?),
            $other => $generic,
        }
    };
}

impl PrimitiveKind {
    /// The type tag of this kind.
    pub fn primitive_type(&self) -> PrimitiveType {
        match self {
            PrimitiveKind::Plastic(_) => PrimitiveType::Plastic,
            PrimitiveKind::Metal(_) => PrimitiveType::Metal,
            PrimitiveKind::Glass(_) => PrimitiveType::Glass,
            PrimitiveKind::Trans(_) => PrimitiveType::Trans,
            PrimitiveKind::Mirror(_) => PrimitiveType::Mirror,
            PrimitiveKind::Glow(_) => PrimitiveType::Glow,
            PrimitiveKind::Light(_) => PrimitiveType::Light,
            PrimitiveKind::Bsdf(_) => PrimitiveType::Bsdf,
            PrimitiveKind::ABsdf(_) => PrimitiveType::ABsdf,
            PrimitiveKind::Polygon(_) => PrimitiveType::Polygon,
            PrimitiveKind::Sphere(_) => PrimitiveType::Sphere,
            PrimitiveKind::Bubble(_) => PrimitiveType::Bubble,
            PrimitiveKind::Cone(_) => PrimitiveType::Cone,
            PrimitiveKind::Cup(_) => PrimitiveType::Cup,
            PrimitiveKind::Cylinder(_) => PrimitiveType::Cylinder,
            PrimitiveKind::Tube(_) => PrimitiveType::Tube,
            PrimitiveKind::Ring(_) => PrimitiveType::Ring,
            PrimitiveKind::Source(_) => PrimitiveType::Source,
            PrimitiveKind::Generic { primitive_type, .. } => *primitive_type,
        }
    }

    /// The `type` written in named-field dictionaries.
    pub fn dict_type(&self) -> &'static str {
        match self {
            PrimitiveKind::Plastic(_) => "Plastic",
            PrimitiveKind::Metal(_) => "Metal",
            PrimitiveKind::Glass(_) => "glass",
            PrimitiveKind::Trans(_) => "Trans",
            PrimitiveKind::Mirror(_) => "Mirror",
            PrimitiveKind::Glow(_) => "Glow",
            PrimitiveKind::Light(_) => "Light",
            other => other.primitive_type().tag(),
        }
    }

    /// Value lines derived from the typed parameters.
    pub fn values(&self) -> Values {
        with_params!(self, p => p.values(), values => values.clone())
    }

    /// Check the typed parameters.
    pub fn validate(&self) -> Result<()> {
        with_params!(self, p => p.validate(), _values => Ok(()))
    }

    /// Build a kind of type `t` from positional value lines.
    pub fn from_values(t: PrimitiveType, values: &Values, name: &str) -> Result<Self> {
        Ok(kind_from!(t, from_values(values, name), other => PrimitiveKind::Generic {
            primitive_type: other,
            values: values.clone(),
        }))
    }

    /// Write the named parameter fields of this kind.
    ///
    /// Generic kinds have no named fields and write their value lines.
    pub fn write_fields(&self, dict: &mut Dict) -> Result<()> {
        with_params!(self, p => p.write_fields(dict), values => {
            dict.insert("values".into(), serde_json::to_value(values)?);
            Ok(())
        })
    }

    /// Build a kind of type `t` from named parameter fields.
    pub fn from_fields(t: PrimitiveType, dict: &Dict, ctx: &FieldContext<'_>) -> Result<Self> {
        Ok(kind_from!(t, from_fields(dict, ctx), other => {
            let values = dict
                .get("values")
                .ok_or_else(|| RadianceError::missing_key("values", ctx.name))?;
            PrimitiveKind::Generic {
                primitive_type: other,
                values: serde_json::from_value(values.clone())?,
            }
        }))
    }
}

macro_rules! impl_from_params {
    ($($variant:ident($ty:ty)),*) => {
        $(impl From<$ty> for PrimitiveKind {
            fn from(p: $ty) -> Self {
                PrimitiveKind::$variant(p)
            }
        })*
    };
}

impl_from_params!(
    Plastic(Plastic),
    Metal(Metal),
    Glass(Glass),
    Trans(Trans),
    Mirror(Mirror),
    Glow(Glow),
    Light(Light),
    Bsdf(Bsdf),
    ABsdf(ABsdf),
    Polygon(Polygon),
    Sphere(Sphere),
    Cone(Cone),
    Cylinder(Cylinder),
    Ring(Ring),
    Source(Source)
);

/// A node of the scene graph: material, geometry, pattern, texture or mixture.
#[derive(Debug, Clone)]
pub struct Primitive {
    identifier: String,
    display_name: Option<String>,
    modifier: Modifier,
    dependencies: Vec<Modifier>,
    is_opaque: Option<bool>,
    kind: PrimitiveKind,
}

impl Primitive {
    /// Create a primitive with a void modifier.
    pub fn new(identifier: &str, kind: impl Into<PrimitiveKind>) -> Result<Self> {
        let kind = kind.into();
        kind.validate()?;
        Ok(Self::builtin(
            &valid_rad_string(identifier, "primitive identifier")?,
            kind,
        ))
    }

    /// Create a primitive of any registered type from raw value lines.
    pub fn generic(identifier: &str, primitive_type: PrimitiveType, values: Values) -> Result<Self> {
        Self::new(
            identifier,
            PrimitiveKind::Generic {
                primitive_type,
                values,
            },
        )
    }

    /// Create a primitive from trusted parameters without validation.
    pub(crate) fn builtin(identifier: &str, kind: PrimitiveKind) -> Self {
        Self {
            identifier: identifier.to_string(),
            display_name: None,
            modifier: Modifier::Void,
            dependencies: Vec::new(),
            is_opaque: None,
            kind,
        }
    }

    /// Set the modifier.
    pub fn with_modifier(mut self, modifier: Modifier) -> Self {
        self.modifier = modifier;
        self
    }

    /// Set the dependencies.
    pub fn with_dependencies(mut self, dependencies: Vec<Modifier>) -> Self {
        self.dependencies = dependencies;
        self
    }

    /// Set the display name.
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Unique identifier.
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Change the identifier.
    pub fn set_identifier(&mut self, identifier: &str) -> Result<()> {
        self.identifier = valid_rad_string(identifier, "primitive identifier")?;
        Ok(())
    }

    /// Display name, falling back to the identifier.
    pub fn display_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.identifier)
    }

    /// Display name only if one was set.
    pub fn explicit_display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    /// Set or clear the display name.
    pub fn set_display_name(&mut self, name: Option<String>) {
        self.display_name = name;
    }

    /// Type tag.
    pub fn primitive_type(&self) -> PrimitiveType {
        self.kind.primitive_type()
    }

    /// Typed parameters.
    pub fn kind(&self) -> &PrimitiveKind {
        &self.kind
    }

    /// Replace the typed parameters after validating them.
    pub fn set_kind(&mut self, kind: impl Into<PrimitiveKind>) -> Result<()> {
        let kind = kind.into();
        kind.validate()?;
        self.kind = kind;
        Ok(())
    }

    pub(crate) fn kind_mut(&mut self) -> &mut PrimitiveKind {
        &mut self.kind
    }

    /// Modifier.
    pub fn modifier(&self) -> &Modifier {
        &self.modifier
    }

    /// Replace the modifier.
    pub fn set_modifier(&mut self, modifier: Modifier) {
        self.modifier = modifier;
    }

    /// Every primitive that must be written before this one, other than the modifier.
    ///
    /// For mirrors this includes the alternate material.
    pub fn dependencies(&self) -> impl Iterator<Item = &Modifier> {
        let alternate = match &self.kind {
            PrimitiveKind::Mirror(m) => m.alternate_material.as_ref(),
            _ => None,
        };
        self.dependencies.iter().chain(alternate)
    }

    /// Dependencies added explicitly, without computed ones.
    pub fn stored_dependencies(&self) -> &[Modifier] {
        &self.dependencies
    }

    /// Append a dependency.
    pub fn add_dependency(&mut self, dependency: Modifier) {
        self.dependencies.push(dependency);
    }

    pub(crate) fn take_dependencies(&mut self) -> Vec<Modifier> {
        std::mem::take(&mut self.dependencies)
    }

    /// Value lines, recomputed from the typed parameters on every call.
    pub fn values(&self) -> Values {
        self.kind.values()
    }

    /// Opacity: an explicit override, else false for non-opaque types, else
    /// the opacity of the modifier (a void modifier counts as opaque).
    pub fn is_opaque(&self) -> bool {
        if let Some(opaque) = self.is_opaque {
            return opaque;
        }
        if self.primitive_type().is_non_opaque() {
            return false;
        }
        self.modifier.is_void() || self.modifier.is_opaque()
    }

    /// Override or reset the derived opacity.
    pub fn set_is_opaque(&mut self, is_opaque: Option<bool>) {
        self.is_opaque = is_opaque;
    }

    /// True for geometry.
    pub fn is_geometry(&self) -> bool {
        self.primitive_type().is_geometry()
    }

    /// True for materials, mixtures, textures and patterns.
    pub fn is_modifier(&self) -> bool {
        self.primitive_type().is_modifier()
    }

    /// True for materials.
    pub fn is_material(&self) -> bool {
        self.primitive_type().is_material()
    }

    /// Text record of this primitive alone: header and three value lines.
    pub fn record_to_radiance(&self, minimal: bool) -> String {
        let values = self.values();
        let mut output = vec![format!(
            "{} {} {}",
            self.modifier.identifier(),
            self.primitive_type(),
            self.identifier
        )];
        output.extend(values.iter().map(|line| line_to_string(line)));
        output.join(if minimal { " " } else { "\n" })
    }

    /// Full text definition.
    ///
    /// Dependencies are written first, then the modifier, then this record,
    /// each with its own chain ahead of it. A primitive reachable along more
    /// than one path is written once.
    pub fn to_radiance(&self, minimal: bool, include_modifier: bool, include_dependencies: bool) -> String {
        let mut written: Vec<&Primitive> = Vec::new();
        let mut output = Vec::new();
        if include_dependencies {
            for dependency in self.dependencies() {
                write_chain(dependency, minimal, &mut written, &mut output);
            }
        }
        if include_modifier {
            write_chain(&self.modifier, minimal, &mut written, &mut output);
        }
        output.push(self.record_to_radiance(minimal));
        output.join("\n")
    }

    /// Deep copy: the modifier chain and dependencies get new handles.
    pub fn duplicate(&self) -> Primitive {
        let mut copy = self.clone();
        copy.modifier = self.modifier.duplicate();
        copy.dependencies = self.dependencies.iter().map(Modifier::duplicate).collect();
        if let PrimitiveKind::Mirror(mirror) = &mut copy.kind {
            mirror.alternate_material = mirror.alternate_material.as_ref().map(Modifier::duplicate);
        }
        copy
    }
}

fn write_chain<'a>(modifier: &'a Modifier, minimal: bool, written: &mut Vec<&'a Primitive>, output: &mut Vec<String>) {
    let Modifier::Primitive(primitive) = modifier else {
        return;
    };
    let primitive: &Primitive = primitive;
    let already = written.iter().any(|p| {
        std::ptr::eq(*p, primitive) || (p.identifier == primitive.identifier && *p == primitive)
    });
    if already {
        return;
    }
    written.push(primitive);
    for dependency in primitive.dependencies() {
        write_chain(dependency, minimal, written, output);
    }
    write_chain(&primitive.modifier, minimal, written, output);
    output.push(primitive.record_to_radiance(minimal));
}

impl PartialEq for Primitive {
    fn eq(&self, other: &Self) -> bool {
        self.identifier == other.identifier
            && self.primitive_type() == other.primitive_type()
            && self.modifier == other.modifier
            && self.values() == other.values()
            && self.dependencies == other.dependencies
    }
}

impl Hash for Primitive {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identifier.hash(state);
        self.primitive_type().hash(state);
        self.modifier.identifier().hash(state);
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_radiance(false, true, true))
    }
}

/// Shared, immutable reference to a modifier primitive, or the void sentinel.
#[derive(Debug, Clone, Default)]
pub enum Modifier {
    /// No modifier.
    #[default]
    Void,
    /// A material, mixture, pattern or texture.
    Primitive(Arc<Primitive>),
}

impl Modifier {
    /// Wrap a primitive as a modifier. Geometry cannot be a modifier.
    pub fn new(primitive: Primitive) -> Result<Self> {
        if !primitive.is_modifier() {
            let primitive_type = primitive.primitive_type().to_string();
            return Err(RadianceError::NotAModifier {
                identifier: primitive.identifier,
                primitive_type,
            });
        }
        Ok(Modifier::Primitive(Arc::new(primitive)))
    }

    /// Wrap trusted library content.
    pub(crate) fn builtin(primitive: Primitive) -> Self {
        Modifier::Primitive(Arc::new(primitive))
    }

    /// Identifier, `void` for the sentinel.
    pub fn identifier(&self) -> &str {
        match self {
            Modifier::Void => "void",
            Modifier::Primitive(p) => p.identifier(),
        }
    }

    /// Display name, `void` for the sentinel.
    pub fn display_name(&self) -> &str {
        match self {
            Modifier::Void => "void",
            Modifier::Primitive(p) => p.display_name(),
        }
    }

    /// True for the sentinel.
    pub fn is_void(&self) -> bool {
        matches!(self, Modifier::Void)
    }

    /// Opacity of the modifier; the sentinel is not opaque.
    pub fn is_opaque(&self) -> bool {
        match self {
            Modifier::Void => false,
            Modifier::Primitive(p) => p.is_opaque(),
        }
    }

    /// True for BSDF and aBSDF materials.
    pub fn is_bsdf(&self) -> bool {
        matches!(
            self.primitive().map(Primitive::primitive_type),
            Some(PrimitiveType::Bsdf | PrimitiveType::ABsdf)
        )
    }

    /// The wrapped primitive.
    pub fn primitive(&self) -> Option<&Primitive> {
        match self {
            Modifier::Void => None,
            Modifier::Primitive(p) => Some(p),
        }
    }

    /// An editable copy of the wrapped primitive.
    pub fn to_primitive(&self) -> Option<Primitive> {
        self.primitive().cloned()
    }

    /// True if both handles point at the same instance.
    pub fn ptr_eq(&self, other: &Modifier) -> bool {
        match (self, other) {
            (Modifier::Void, Modifier::Void) => true,
            (Modifier::Primitive(a), Modifier::Primitive(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Full text definition, `void` for the sentinel.
    pub fn to_radiance(&self, minimal: bool) -> String {
        match self {
            Modifier::Void => "void".to_string(),
            Modifier::Primitive(p) => p.to_radiance(minimal, true, true),
        }
    }

    /// Deep copy with new handles.
    pub fn duplicate(&self) -> Modifier {
        match self {
            Modifier::Void => Modifier::Void,
            Modifier::Primitive(p) => Modifier::Primitive(Arc::new(p.duplicate())),
        }
    }
}

impl PartialEq for Modifier {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Modifier::Void, Modifier::Void) => true,
            (Modifier::Primitive(a), Modifier::Primitive(b)) => Arc::ptr_eq(a, b) || a == b,
            _ => false,
        }
    }
}

impl Hash for Modifier {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Modifier::Void => "void".hash(state),
            Modifier::Primitive(p) => p.hash(state),
        }
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_radiance(false))
    }
}

/// Text of each modifier's chain in order. A primitive already written by an
/// earlier chain is left out, so shared bases appear once; chains with
/// nothing left to write yield no entry.
pub fn chains_to_radiance(modifiers: &[Modifier], minimal: bool) -> Vec<String> {
    let mut written: Vec<&Primitive> = Vec::new();
    let mut chains = Vec::new();
    for modifier in modifiers {
        let mut output = Vec::new();
        write_chain(modifier, minimal, &mut written, &mut output);
        if !output.is_empty() {
            chains.push(output.join("\n"));
        }
    }
    chains
}

/// Remove identity duplicates, keeping first-seen order.
pub fn unique_by_identity(modifiers: impl IntoIterator<Item = Modifier>) -> Vec<Modifier> {
    let mut unique: Vec<Modifier> = Vec::new();
    for modifier in modifiers {
        if !unique.iter().any(|m| m.ptr_eq(&modifier)) {
            unique.push(modifier);
        }
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    fn plastic(id: &str, r: f64) -> Primitive {
        Primitive::new(id, Plastic::new(r, r, r, 0.0, 0.0).unwrap()).unwrap()
    }

    #[test]
    fn test_plastic_minimal_record() {
        let p = Primitive::new("test_plastic", Plastic::new(0.6, 0.7, 0.8, 0.0, 0.0).unwrap()).unwrap();
        assert_eq!(
            p.to_radiance(true, true, true),
            "void plastic test_plastic 0 0 5 0.6 0.7 0.8 0.0 0.0"
        );
        assert_eq!(
            p.to_radiance(false, true, true),
            "void plastic test_plastic\n0\n0\n5 0.6 0.7 0.8 0.0 0.0"
        );
    }

    #[test]
    fn test_default_mirror() {
        let mirror = Primitive::new("test_mirror", Mirror::default()).unwrap();
        assert_eq!(mirror.to_radiance(true, true, true), "void mirror test_mirror 0 0 3 1.0 1.0 1.0");
        assert_eq!(mirror.dependencies().count(), 0);
    }

    #[test]
    fn test_mirror_void_alternate() {
        let mut params = Mirror::default();
        params.alternate_material = Some(Modifier::Void);
        let mirror = Primitive::new("test_mirror", params).unwrap();
        assert_eq!(mirror.to_radiance(true, true, true), "void mirror test_mirror 1 void 0 3 1.0 1.0 1.0");
        let deps: Vec<&Modifier> = mirror.dependencies().collect();
        assert_eq!(deps.len(), 1);
        assert!(deps[0].is_void());
        assert!(mirror.stored_dependencies().is_empty());
    }

    #[test]
    fn test_geometry_is_not_a_modifier() {
        let polygon = Primitive::new(
            "poly",
            Polygon::new(vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0]]).unwrap(),
        )
        .unwrap();
        match Modifier::new(polygon) {
            Err(RadianceError::NotAModifier {
                identifier,
                primitive_type,
            }) => {
                assert_eq!(identifier, "poly");
                assert_eq!(primitive_type, "polygon");
            }
            other => panic!("expected NotAModifier, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_identifier() {
        let result = Primitive::new("bad id", Plastic::default());
        assert!(matches!(result, Err(RadianceError::InvalidIdentifier { .. })));
    }

    #[test]
    fn test_opacity() {
        for t in PrimitiveType::ALL {
            let p = Primitive::generic("p", *t, Default::default()).unwrap();
            assert_eq!(p.is_opaque(), !t.is_non_opaque(), "{}", t);
        }
        let glass = Modifier::new(
            Primitive::new("glass", Glass::new(0.9, 0.9, 0.9, None).unwrap()).unwrap(),
        )
        .unwrap();
        let window = Primitive::new(
            "window",
            Polygon::new(vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0]]).unwrap(),
        )
        .unwrap()
        .with_modifier(glass);
        assert!(!window.is_opaque());

        let mut forced = plastic("forced", 0.5);
        forced.set_is_opaque(Some(false));
        assert!(!forced.is_opaque());
        assert!(!Modifier::Void.is_opaque());
    }

    #[test]
    fn test_dependency_chain_written_once() {
        let base = Modifier::new(plastic("base", 0.5)).unwrap();
        let a = Modifier::new(plastic("a", 0.2).with_modifier(base.clone())).unwrap();
        let b = Modifier::new(plastic("b", 0.3).with_modifier(base.clone())).unwrap();
        let top = plastic("top", 0.4)
            .with_modifier(a)
            .with_dependencies(vec![b, Modifier::Void]);
        let text = top.to_radiance(true, true, true);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("void plastic base"));
        assert!(lines[1].starts_with("base plastic b"));
        assert!(lines[2].starts_with("base plastic a"));
        assert!(lines[3].starts_with("a plastic top"));

        let alone = top.to_radiance(true, false, false);
        assert_eq!(alone.lines().count(), 1);
    }

    #[test]
    fn test_equality_and_identity() {
        let a = Modifier::new(plastic("m", 0.5)).unwrap();
        let b = Modifier::new(plastic("m", 0.5)).unwrap();
        assert_eq!(a, b);
        assert!(!a.ptr_eq(&b));
        assert!(a.ptr_eq(&a.clone()));
        assert_eq!(unique_by_identity(vec![a.clone(), b.clone(), a.clone()]).len(), 2);
        assert_ne!(a, Modifier::new(plastic("m", 0.6)).unwrap());
    }

    #[test]
    fn test_duplicate_is_deep() {
        let base = Modifier::new(plastic("base", 0.5)).unwrap();
        let top = plastic("top", 0.4).with_modifier(base.clone());
        let copy = top.duplicate();
        assert_eq!(copy, top);
        assert!(!copy.modifier().ptr_eq(&base));
    }

    #[test]
    fn test_clone_out_to_edit() {
        let shared = Modifier::new(plastic("shared", 0.5)).unwrap();
        let mut edited = shared.to_primitive().unwrap();
        edited.set_kind(Plastic::new(0.7, 0.7, 0.7, 0.0, 0.0).unwrap()).unwrap();
        assert_eq!(shared.primitive().unwrap().values()[2][0], Value::Number(0.5));
        assert_eq!(edited.values()[2][0], Value::Number(0.7));
    }
}
