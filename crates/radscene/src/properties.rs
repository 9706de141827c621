//! Radiance properties of model objects.
//!
//! Each host stores only what was set on it explicitly. Everything else is
//! resolved on demand from the host's parents: the modifier set of the room it
//! belongs to, or the generic visible set for objects outside a room. The
//! parents are passed in as a [`HostContext`] because hosts do not point back
//! up the tree.
//!
//! [`ModelRadianceProperties`] is a borrowed view that walks a whole
//! [`Model`] and collects modifiers, modifier sets and dynamic groups.

use std::collections::HashMap;
use std::sync::Arc;

use radscene_geom::{Point3, Vec3};
use serde_json::{json, Value as JsonValue};
use tracing::debug;

use crate::config::Config;
use crate::dict::{as_dict, check_type, dict_to_modifier, modifier_reference, opt_modifier, Dict, DictArgs, ModifierRefs};
use crate::dynamic::{
    DynamicGroup, DynamicMember, DynamicShadeGroup, DynamicSubFaceGroup, RadianceShadeState, RadianceState,
    RadianceSubFaceState, StateHost,
};
use crate::error::{RadianceError, Result};
use crate::library::{defaults, generic_modifier_set_visible};
use crate::model::{Aperture, BoundaryCondition, Door, Face, FaceType, Model, Room, Shade};
use crate::modifierset::{unique_by_value, ModifierSet};
use crate::primitive::Modifier;
use crate::sensorgrid::SensorGrid;
use crate::typing::valid_rad_string;
use crate::view::View;

fn type_name(base: &str, abridged: bool) -> String {
    if abridged {
        format!("{}Abridged", base)
    } else {
        base.to_string()
    }
}

fn insert_modifier(dict: &mut Dict, key: &str, modifier: Option<&Modifier>, abridged: bool) -> Result<()> {
    if let Some(modifier) = modifier {
        dict.insert(key.into(), modifier_reference(modifier, abridged)?);
    }
    Ok(())
}

/// The parents of a host object, as far as modifier resolution needs them.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostContext<'a> {
    /// Room the host belongs to, directly or through its face.
    pub room: Option<&'a Room>,
    /// Type of the face hosting an aperture or door.
    pub face_type: Option<FaceType>,
    /// True if the host has any parent at all.
    pub has_parent: bool,
}

impl<'a> HostContext<'a> {
    /// A host without parents.
    pub fn orphaned() -> Self {
        Self::default()
    }

    /// A host that belongs to `room`.
    pub fn in_room(room: &'a Room) -> Self {
        Self {
            room: Some(room),
            face_type: None,
            has_parent: true,
        }
    }

    /// Context for the children of `face`, itself in this context.
    pub fn in_face(self, face: &Face) -> Self {
        Self {
            face_type: Some(face.face_type),
            has_parent: true,
            ..self
        }
    }

    /// Context for a shade attached to a host in this context.
    pub fn attached(self) -> Self {
        Self {
            has_parent: true,
            ..self
        }
    }

    /// The modifier set defaults are resolved from.
    pub fn modifier_set(&self) -> &'a ModifierSet {
        match self.room {
            Some(room) => room.radiance.modifier_set(),
            None => generic_modifier_set_visible(),
        }
    }
}

/// Radiance properties of a face.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FaceRadianceProperties {
    modifier: Option<Modifier>,
    modifier_blk: Option<Modifier>,
}

impl FaceRadianceProperties {
    /// Properties with explicit modifiers; `None` resolves from the parents.
    pub fn new(modifier: Option<Modifier>, modifier_blk: Option<Modifier>) -> Self {
        Self { modifier, modifier_blk }
    }

    /// Explicitly assigned modifier.
    pub fn explicit_modifier(&self) -> Option<&Modifier> {
        self.modifier.as_ref()
    }

    /// Assign or clear the modifier.
    pub fn set_modifier(&mut self, modifier: Option<Modifier>) {
        self.modifier = modifier;
    }

    /// Explicitly assigned black-out modifier.
    pub fn explicit_modifier_blk(&self) -> Option<&Modifier> {
        self.modifier_blk.as_ref()
    }

    /// Assign or clear the black-out modifier.
    pub fn set_modifier_blk(&mut self, modifier: Option<Modifier>) {
        self.modifier_blk = modifier;
    }

    /// True if the modifier was assigned on this object.
    pub fn is_modifier_set_on_object(&self) -> bool {
        self.modifier.is_some()
    }

    /// True if the black-out modifier was assigned on this object.
    pub fn is_blk_overridden(&self) -> bool {
        self.modifier_blk.is_some()
    }

    /// Drop every explicit assignment.
    pub fn reset_to_default(&mut self) {
        self.modifier = None;
        self.modifier_blk = None;
    }

    /// Dictionary form. Abridged dictionaries reference modifiers by identifier.
    pub fn to_dict(&self, abridged: bool) -> Result<JsonValue> {
        let mut dict = Dict::new();
        dict.insert("type".into(), json!(type_name("FaceRadianceProperties", abridged)));
        insert_modifier(&mut dict, "modifier", self.modifier.as_ref(), abridged)?;
        insert_modifier(&mut dict, "modifier_blk", self.modifier_blk.as_ref(), abridged)?;
        Ok(JsonValue::Object(dict))
    }

    /// Rebuild from a full dictionary.
    pub fn from_dict(data: &JsonValue) -> Result<Self> {
        Self::from_dict_with(data, &Config::default())
    }

    /// [`Self::from_dict`] with explicit folders for file-backed modifiers.
    pub fn from_dict_with(data: &JsonValue, config: &Config) -> Result<Self> {
        let context = "FaceRadianceProperties";
        let dict = as_dict(data, context)?;
        check_type(dict, context)?;
        let refs = ModifierRefs::Embedded;
        Ok(Self {
            modifier: opt_modifier(dict, "modifier", refs, config, context)?,
            modifier_blk: opt_modifier(dict, "modifier_blk", refs, config, context)?,
        })
    }

    /// Apply an abridged dictionary, resolving identifiers in `modifiers`.
    /// Keys missing from the dictionary leave the current value untouched.
    pub fn apply_properties_from_dict(&mut self, data: &JsonValue, modifiers: &HashMap<String, Modifier>) -> Result<()> {
        let context = "FaceRadiancePropertiesAbridged";
        let dict = as_dict(data, context)?;
        check_type(dict, context)?;
        let refs = ModifierRefs::Table(modifiers);
        let config = Config::default();
        if let Some(modifier) = opt_modifier(dict, "modifier", refs, &config, context)? {
            self.modifier = Some(modifier);
        }
        if let Some(modifier) = opt_modifier(dict, "modifier_blk", refs, &config, context)? {
            self.modifier_blk = Some(modifier);
        }
        Ok(())
    }
}

macro_rules! dynamic_properties {
    (
        $(#[$meta:meta])*
        $name:ident, $state:ident, $type_name:literal
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq)]
        pub struct $name {
            modifier: Option<Modifier>,
            modifier_blk: Option<Modifier>,
            dynamic_group_identifier: Option<String>,
            states: Vec<$state>,
        }

        impl $name {
            /// Explicitly assigned modifier.
            pub fn explicit_modifier(&self) -> Option<&Modifier> {
                self.modifier.as_ref()
            }

            /// Assign or clear the modifier.
            pub fn set_modifier(&mut self, modifier: Option<Modifier>) {
                self.modifier = modifier;
            }

            /// Explicitly assigned black-out modifier.
            pub fn explicit_modifier_blk(&self) -> Option<&Modifier> {
                self.modifier_blk.as_ref()
            }

            /// Assign or clear the black-out modifier.
            pub fn set_modifier_blk(&mut self, modifier: Option<Modifier>) {
                self.modifier_blk = modifier;
            }

            /// True if the modifier was assigned on this object.
            pub fn is_modifier_set_on_object(&self) -> bool {
                self.modifier.is_some()
            }

            /// True if the black-out modifier was assigned on this object.
            pub fn is_blk_overridden(&self) -> bool {
                self.modifier_blk.is_some()
            }

            /// Drop the explicit modifiers. Dynamic states are kept.
            pub fn reset_to_default(&mut self) {
                self.modifier = None;
                self.modifier_blk = None;
            }

            /// Identifier shared by objects that change state together.
            pub fn dynamic_group_identifier(&self) -> Option<&str> {
                self.dynamic_group_identifier.as_deref()
            }

            /// Set or clear the dynamic group identifier. It cannot be
            /// cleared while states are assigned.
            pub fn set_dynamic_group_identifier(&mut self, identifier: Option<&str>) -> Result<()> {
                self.dynamic_group_identifier = match identifier {
                    Some(id) => Some(valid_rad_string(id, "dynamic group identifier")?),
                    None if !self.states.is_empty() => {
                        return Err(RadianceError::InvalidState(
                            "the dynamic group identifier cannot be removed while states are assigned".into(),
                        ))
                    }
                    None => None,
                };
                Ok(())
            }

            /// True if the object belongs to a dynamic group.
            pub fn is_dynamic(&self) -> bool {
                self.dynamic_group_identifier.is_some()
            }

            /// States, in order.
            pub fn states(&self) -> &[$state] {
                &self.states
            }

            /// Number of states.
            pub fn state_count(&self) -> usize {
                self.states.len()
            }

            /// Replace every state. Requires a dynamic group identifier unless
            /// `states` is empty.
            pub fn set_states(&mut self, states: Vec<$state>) -> Result<()> {
                if !states.is_empty() {
                    self.require_group()?;
                }
                self.states = states;
                Ok(())
            }

            /// Append a state. Requires a dynamic group identifier.
            pub fn add_state(&mut self, state: $state) -> Result<()> {
                self.require_group()?;
                self.states.push(state);
                Ok(())
            }

            /// Drop every state.
            pub fn remove_states(&mut self) {
                self.states.clear();
            }

            fn require_group(&self) -> Result<()> {
                if self.dynamic_group_identifier.is_none() {
                    return Err(RadianceError::InvalidState(
                        "a dynamic group identifier must be set before states are assigned".into(),
                    ));
                }
                Ok(())
            }

            /// Move the geometry of every state.
            pub fn move_by(&mut self, offset: &Vec3) {
                self.states.iter_mut().for_each(|s| s.move_by(offset));
            }

            /// Rotate the geometry of every state; `angle` is in degrees.
            pub fn rotate(&mut self, axis: &Vec3, angle: f64, origin: &Point3) {
                self.states.iter_mut().for_each(|s| s.rotate(axis, angle, origin));
            }

            /// Rotate the geometry of every state around the Z axis.
            pub fn rotate_xy(&mut self, angle: f64, origin: &Point3) {
                self.states.iter_mut().for_each(|s| s.rotate_xy(angle, origin));
            }

            /// Reflect the geometry of every state.
            pub fn reflect(&mut self, normal: &Vec3, origin: &Point3) {
                self.states.iter_mut().for_each(|s| s.reflect(normal, origin));
            }

            /// Scale the geometry of every state.
            pub fn scale(&mut self, factor: f64, origin: Option<&Point3>) {
                self.states.iter_mut().for_each(|s| s.scale(factor, origin));
            }

            /// Dictionary form. Abridged dictionaries reference modifiers by
            /// identifier.
            pub fn to_dict(&self, abridged: bool) -> Result<JsonValue> {
                let mut dict = Dict::new();
                dict.insert("type".into(), json!(type_name($type_name, abridged)));
                insert_modifier(&mut dict, "modifier", self.modifier.as_ref(), abridged)?;
                insert_modifier(&mut dict, "modifier_blk", self.modifier_blk.as_ref(), abridged)?;
                if let Some(group) = &self.dynamic_group_identifier {
                    dict.insert("dynamic_group_identifier".into(), json!(group));
                }
                if !self.states.is_empty() {
                    let states = self
                        .states
                        .iter()
                        .map(|s| s.to_dict(abridged))
                        .collect::<Result<Vec<_>>>()?;
                    dict.insert("states".into(), JsonValue::Array(states));
                }
                Ok(JsonValue::Object(dict))
            }

            /// Rebuild from a full dictionary.
            pub fn from_dict(data: &JsonValue) -> Result<Self> {
                Self::from_dict_with(data, &Config::default())
            }

            /// [`Self::from_dict`] with explicit folders for file-backed
            /// modifiers.
            pub fn from_dict_with(data: &JsonValue, config: &Config) -> Result<Self> {
                let mut props = Self::default();
                props.read($type_name, data, ModifierRefs::Embedded, config)?;
                Ok(props)
            }

            /// Apply an abridged dictionary, resolving identifiers in
            /// `modifiers`. Keys missing from the dictionary leave the current
            /// value untouched.
            pub fn apply_properties_from_dict(
                &mut self,
                data: &JsonValue,
                modifiers: &HashMap<String, Modifier>,
            ) -> Result<()> {
                let context = concat!($type_name, "Abridged");
                self.read(context, data, ModifierRefs::Table(modifiers), &Config::default())
            }

            fn read(&mut self, context: &str, data: &JsonValue, refs: ModifierRefs<'_>, config: &Config) -> Result<()> {
                let dict = as_dict(data, context)?;
                check_type(dict, context)?;
                if let Some(modifier) = opt_modifier(dict, "modifier", refs, config, context)? {
                    self.modifier = Some(modifier);
                }
                if let Some(modifier) = opt_modifier(dict, "modifier_blk", refs, config, context)? {
                    self.modifier_blk = Some(modifier);
                }
                if let Some(group) = dict.opt_string("dynamic_group_identifier") {
                    self.set_dynamic_group_identifier(Some(group))?;
                }
                if dict.has("states") {
                    let states = dict
                        .list("states", context)?
                        .iter()
                        .map(|state| $state::read(state, refs, config))
                        .collect::<Result<Vec<_>>>()?;
                    self.set_states(states)?;
                }
                Ok(())
            }
        }
    };
}

dynamic_properties!(
    /// Radiance properties of a shade.
    ShadeRadianceProperties, RadianceShadeState, "ShadeRadianceProperties"
);

dynamic_properties!(
    /// Radiance properties of an aperture.
    ApertureRadianceProperties, RadianceSubFaceState, "ApertureRadianceProperties"
);

dynamic_properties!(
    /// Radiance properties of a door.
    DoorRadianceProperties, RadianceSubFaceState, "DoorRadianceProperties"
);

/// Radiance properties of a room.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoomRadianceProperties {
    modifier_set: Option<Arc<ModifierSet>>,
}

impl RoomRadianceProperties {
    /// Properties with an explicit modifier set.
    pub fn new(modifier_set: Option<Arc<ModifierSet>>) -> Self {
        Self { modifier_set }
    }

    /// The modifier set of the room; the generic visible set if none is
    /// assigned.
    pub fn modifier_set(&self) -> &ModifierSet {
        match &self.modifier_set {
            Some(set) => set,
            None => generic_modifier_set_visible(),
        }
    }

    /// Explicitly assigned modifier set.
    pub fn explicit_modifier_set(&self) -> Option<&Arc<ModifierSet>> {
        self.modifier_set.as_ref()
    }

    /// Assign or clear the modifier set.
    pub fn set_modifier_set(&mut self, modifier_set: Option<Arc<ModifierSet>>) {
        self.modifier_set = modifier_set;
    }

    /// Dictionary form. Abridged dictionaries reference the set by identifier.
    pub fn to_dict(&self, abridged: bool) -> Result<JsonValue> {
        let mut dict = Dict::new();
        dict.insert("type".into(), json!(type_name("RoomRadianceProperties", abridged)));
        if let Some(set) = &self.modifier_set {
            let value = if abridged {
                json!(set.identifier())
            } else {
                set.to_dict(false, false)?
            };
            dict.insert("modifier_set".into(), value);
        }
        Ok(JsonValue::Object(dict))
    }

    /// Rebuild from a full dictionary.
    pub fn from_dict(data: &JsonValue) -> Result<Self> {
        let dict = as_dict(data, "RoomRadianceProperties")?;
        check_type(dict, "RoomRadianceProperties")?;
        let modifier_set = match dict.get("modifier_set") {
            None | Some(JsonValue::Null) => None,
            Some(set) => Some(Arc::new(ModifierSet::from_dict(set)?)),
        };
        Ok(Self { modifier_set })
    }

    /// Apply an abridged dictionary, resolving the set identifier in
    /// `modifier_sets`.
    pub fn apply_properties_from_dict(
        &mut self,
        data: &JsonValue,
        modifier_sets: &HashMap<String, Arc<ModifierSet>>,
    ) -> Result<()> {
        let context = "RoomRadiancePropertiesAbridged";
        let dict = as_dict(data, context)?;
        check_type(dict, context)?;
        if let Some(identifier) = dict.opt_string("modifier_set") {
            let set = modifier_sets
                .get(identifier)
                .ok_or_else(|| RadianceError::missing_reference(identifier, context))?;
            self.modifier_set = Some(Arc::clone(set));
        }
        Ok(())
    }
}

fn blk_or_self(modifier: Modifier) -> Modifier {
    if modifier.is_void() || modifier.is_opaque() {
        defaults().black.clone()
    } else {
        modifier
    }
}

impl Face {
    /// The modifier: explicit, or from the modifier set of the context.
    pub fn modifier(&self, ctx: &HostContext<'_>) -> Modifier {
        match self.radiance.explicit_modifier() {
            Some(modifier) => modifier.clone(),
            None => ctx
                .modifier_set()
                .get_face_modifier(self.face_type, self.boundary_condition)
                .clone(),
        }
    }

    /// The black-out modifier: explicit, else black for opaque modifiers.
    pub fn modifier_blk(&self, ctx: &HostContext<'_>) -> Modifier {
        match self.radiance.explicit_modifier_blk() {
            Some(modifier) => modifier.clone(),
            None => blk_or_self(self.modifier(ctx)),
        }
    }

    /// True if the resolved modifier blocks light.
    pub fn is_opaque(&self, ctx: &HostContext<'_>) -> bool {
        let modifier = self.modifier(ctx);
        modifier.is_void() || modifier.is_opaque()
    }
}

impl Aperture {
    /// The modifier: explicit, or from the modifier set of the context.
    pub fn modifier(&self, ctx: &HostContext<'_>) -> Result<Modifier> {
        match self.radiance.explicit_modifier() {
            Some(modifier) => Ok(modifier.clone()),
            None => ctx
                .modifier_set()
                .get_aperture_modifier(self.boundary_condition, self.is_operable, ctx.face_type)
                .cloned(),
        }
    }

    /// The black-out modifier: explicit, else black for opaque modifiers.
    pub fn modifier_blk(&self, ctx: &HostContext<'_>) -> Result<Modifier> {
        match self.radiance.explicit_modifier_blk() {
            Some(modifier) => Ok(modifier.clone()),
            None => self.modifier(ctx).map(blk_or_self),
        }
    }

    /// True if the resolved modifier blocks light.
    pub fn is_opaque(&self, ctx: &HostContext<'_>) -> Result<bool> {
        let modifier = self.modifier(ctx)?;
        Ok(modifier.is_void() || modifier.is_opaque())
    }

    /// The view of this aperture its dynamic states write against.
    pub fn state_host(&self, ctx: &HostContext<'_>) -> Result<StateHost<'_>> {
        Ok(StateHost {
            identifier: &self.identifier,
            geometry: &self.geometry,
            modifier: self.modifier(ctx)?,
            modifier_blk: self.modifier_blk(ctx)?,
        })
    }
}

impl Door {
    /// The modifier: explicit, or from the modifier set of the context.
    pub fn modifier(&self, ctx: &HostContext<'_>) -> Result<Modifier> {
        match self.radiance.explicit_modifier() {
            Some(modifier) => Ok(modifier.clone()),
            None => ctx
                .modifier_set()
                .get_door_modifier(self.boundary_condition, self.is_glass, ctx.face_type)
                .cloned(),
        }
    }

    /// The black-out modifier: explicit, else black.
    pub fn modifier_blk(&self) -> Modifier {
        match self.radiance.explicit_modifier_blk() {
            Some(modifier) => modifier.clone(),
            None => defaults().black.clone(),
        }
    }

    /// True if the resolved modifier blocks light.
    pub fn is_opaque(&self, ctx: &HostContext<'_>) -> Result<bool> {
        let modifier = self.modifier(ctx)?;
        Ok(modifier.is_void() || modifier.is_opaque())
    }

    /// The view of this door its dynamic states write against.
    pub fn state_host(&self, ctx: &HostContext<'_>) -> Result<StateHost<'_>> {
        Ok(StateHost {
            identifier: &self.identifier,
            geometry: &self.geometry,
            modifier: self.modifier(ctx)?,
            modifier_blk: self.modifier_blk(),
        })
    }
}

impl Shade {
    /// The modifier: explicit, the generic context modifier for shades
    /// without a parent, else the shade modifier of the context's set.
    pub fn modifier(&self, ctx: &HostContext<'_>) -> Modifier {
        if let Some(modifier) = self.radiance.explicit_modifier() {
            return modifier.clone();
        }
        if !ctx.has_parent {
            return defaults().generic_context.clone();
        }
        ctx.modifier_set().get_shade_modifier(self.is_indoor).clone()
    }

    /// The black-out modifier: explicit, else black for opaque modifiers.
    pub fn modifier_blk(&self, ctx: &HostContext<'_>) -> Modifier {
        match self.radiance.explicit_modifier_blk() {
            Some(modifier) => modifier.clone(),
            None => blk_or_self(self.modifier(ctx)),
        }
    }

    /// True if the resolved modifier blocks light.
    pub fn is_opaque(&self, ctx: &HostContext<'_>) -> bool {
        let modifier = self.modifier(ctx);
        modifier.is_void() || modifier.is_opaque()
    }

    /// The view of this shade its dynamic states write against.
    pub fn state_host(&self, ctx: &HostContext<'_>) -> StateHost<'_> {
        StateHost {
            identifier: &self.identifier,
            geometry: &self.geometry,
            modifier: self.modifier(ctx),
            modifier_blk: self.modifier_blk(ctx),
        }
    }
}

/// A host object together with its parents.
#[derive(Debug, Clone, Copy)]
pub struct Hosted<'a, T> {
    /// The object.
    pub host: &'a T,
    /// Its parents.
    pub context: HostContext<'a>,
}

fn hosted<'a, T>(host: &'a T, context: HostContext<'a>) -> Hosted<'a, T> {
    Hosted { host, context }
}

fn state_modifiers<S: RadianceState>(states: &[S], direct: bool) -> Vec<Modifier> {
    let mut modifiers = Vec::new();
    for state in states {
        if !direct {
            modifiers.extend(state.explicit_modifier().cloned());
        }
        for shade in state.shades() {
            modifiers.push(if direct {
                shade.modifier_direct().clone()
            } else {
                shade.modifier().clone()
            });
        }
    }
    modifiers
}

fn push_group<'a, S>(groups: &mut Vec<(String, Vec<DynamicMember<'a, S>>)>, identifier: &str, member: DynamicMember<'a, S>) {
    match groups.iter_mut().find(|(id, _)| id == identifier) {
        Some((_, members)) => members.push(member),
        None => groups.push((identifier.to_string(), vec![member])),
    }
}

fn check_duplicates<'a>(kind: &str, identifiers: impl IntoIterator<Item = &'a str>, raise: bool) -> Result<String> {
    let mut seen: Vec<&str> = Vec::new();
    let mut duplicated: Vec<String> = Vec::new();
    for identifier in identifiers {
        if seen.contains(&identifier) {
            if !duplicated.iter().any(|d| d == identifier) {
                duplicated.push(identifier.to_string());
            }
        } else {
            seen.push(identifier);
        }
    }
    if duplicated.is_empty() {
        return Ok(String::new());
    }
    let error = RadianceError::Duplicate {
        kind: kind.to_string(),
        identifiers: duplicated,
    };
    if raise {
        Err(error)
    } else {
        Ok(error.to_string())
    }
}

/// Radiance properties computed over a whole model.
#[derive(Debug, Clone, Copy)]
pub struct ModelRadianceProperties<'a> {
    model: &'a Model,
}

impl<'a> ModelRadianceProperties<'a> {
    /// A view over `model`.
    pub fn new(model: &'a Model) -> Self {
        Self { model }
    }

    /// The model.
    pub fn model(&self) -> &'a Model {
        self.model
    }

    /// The set every object outside an explicitly assigned set falls back to.
    pub fn global_modifier_set(&self) -> &'static ModifierSet {
        generic_modifier_set_visible()
    }

    /// Every face with its parents.
    pub fn faces(&self) -> Vec<Hosted<'a, Face>> {
        let mut faces = Vec::new();
        for room in &self.model.rooms {
            let ctx = HostContext::in_room(room);
            faces.extend(room.faces.iter().map(|f| hosted(f, ctx)));
        }
        faces.extend(self.model.orphaned_faces.iter().map(|f| hosted(f, HostContext::orphaned())));
        faces
    }

    /// Every aperture with its parents.
    pub fn apertures(&self) -> Vec<Hosted<'a, Aperture>> {
        let mut apertures = Vec::new();
        for face in self.faces() {
            let ctx = face.context.in_face(face.host);
            apertures.extend(face.host.apertures.iter().map(|a| hosted(a, ctx)));
        }
        apertures.extend(self.model.orphaned_apertures.iter().map(|a| hosted(a, HostContext::orphaned())));
        apertures
    }

    /// Every door with its parents.
    pub fn doors(&self) -> Vec<Hosted<'a, Door>> {
        let mut doors = Vec::new();
        for face in self.faces() {
            let ctx = face.context.in_face(face.host);
            doors.extend(face.host.doors.iter().map(|d| hosted(d, ctx)));
        }
        doors.extend(self.model.orphaned_doors.iter().map(|d| hosted(d, HostContext::orphaned())));
        doors
    }

    /// Every shade with its parents, in the order of [`Model::shades`].
    pub fn shades(&self) -> Vec<Hosted<'a, Shade>> {
        let mut shades = Vec::new();
        for room in &self.model.rooms {
            let ctx = HostContext::in_room(room);
            shades.extend(room.shades.iter().map(|s| hosted(s, ctx)));
        }
        for face in self.faces() {
            let ctx = face.context.in_face(face.host);
            let host = face.host;
            shades.extend(host.shades.iter().map(|s| hosted(s, ctx)));
            for aperture in &host.apertures {
                shades.extend(aperture.shades.iter().map(|s| hosted(s, ctx)));
            }
            for door in &host.doors {
                shades.extend(door.shades.iter().map(|s| hosted(s, ctx)));
            }
        }
        let attached = HostContext::orphaned().attached();
        for aperture in &self.model.orphaned_apertures {
            shades.extend(aperture.shades.iter().map(|s| hosted(s, attached)));
        }
        for door in &self.model.orphaned_doors {
            shades.extend(door.shades.iter().map(|s| hosted(s, attached)));
        }
        shades.extend(self.model.orphaned_shades.iter().map(|s| hosted(s, HostContext::orphaned())));
        shades
    }

    /// Explicitly assigned room modifier sets, without duplicates.
    pub fn modifier_sets(&self) -> Vec<&'a ModifierSet> {
        let mut sets: Vec<&'a ModifierSet> = Vec::new();
        for room in &self.model.rooms {
            if let Some(set) = room.radiance.explicit_modifier_set() {
                let set: &'a ModifierSet = set;
                if !sets.iter().any(|s| *s == set) {
                    sets.push(set);
                }
            }
        }
        sets
    }

    /// Modifiers set explicitly on the room modifier sets.
    pub fn room_modifiers(&self) -> Vec<Modifier> {
        unique_by_value(self.modifier_sets().into_iter().flat_map(|s| s.modified_modifiers_unique()))
    }

    /// Modifiers assigned to faces, apertures and doors, including those of
    /// their dynamic states.
    pub fn face_modifiers(&self) -> Vec<Modifier> {
        let mut modifiers = Vec::new();
        for face in self.model.faces() {
            modifiers.extend(face.radiance.explicit_modifier().cloned());
        }
        for aperture in self.model.apertures() {
            modifiers.extend(aperture.radiance.explicit_modifier().cloned());
            modifiers.extend(state_modifiers(aperture.radiance.states(), false));
        }
        for door in self.model.doors() {
            modifiers.extend(door.radiance.explicit_modifier().cloned());
            modifiers.extend(state_modifiers(door.radiance.states(), false));
        }
        unique_by_value(modifiers)
    }

    /// Modifiers assigned to shades, including those of their dynamic states.
    /// Shades outside any object contribute the generic context modifier.
    pub fn shade_modifiers(&self) -> Vec<Modifier> {
        let mut modifiers = Vec::new();
        for shade in self.shades() {
            match shade.host.radiance.explicit_modifier() {
                Some(modifier) => modifiers.push(modifier.clone()),
                None if !shade.context.has_parent => modifiers.push(defaults().generic_context.clone()),
                None => {}
            }
            modifiers.extend(state_modifiers(shade.host.radiance.states(), false));
        }
        unique_by_value(modifiers)
    }

    /// Every modifier the model needs, starting with the global set.
    pub fn modifiers(&self) -> Vec<Modifier> {
        let mut modifiers = self.global_modifier_set().modifiers_unique();
        modifiers.extend(self.room_modifiers());
        modifiers.extend(self.face_modifiers());
        modifiers.extend(self.shade_modifiers());
        unique_by_value(modifiers)
    }

    /// Black-out and direct-sun modifiers: black, explicit black-out
    /// modifiers and the direct modifiers of dynamic states.
    pub fn blk_modifiers(&self) -> Vec<Modifier> {
        let mut modifiers = vec![defaults().black.clone()];
        for face in self.model.faces() {
            modifiers.extend(face.radiance.explicit_modifier_blk().cloned());
        }
        for aperture in self.model.apertures() {
            modifiers.extend(aperture.radiance.explicit_modifier_blk().cloned());
            for state in aperture.radiance.states() {
                modifiers.extend(state.explicit_modifier_direct().cloned());
            }
            modifiers.extend(state_modifiers(aperture.radiance.states(), true));
        }
        for door in self.model.doors() {
            modifiers.extend(door.radiance.explicit_modifier_blk().cloned());
            for state in door.radiance.states() {
                modifiers.extend(state.explicit_modifier_direct().cloned());
            }
            modifiers.extend(state_modifiers(door.radiance.states(), true));
        }
        for shade in self.model.shades() {
            modifiers.extend(shade.radiance.explicit_modifier_blk().cloned());
            for state in shade.radiance.states() {
                modifiers.extend(state.explicit_modifier_direct().cloned());
            }
            modifiers.extend(state_modifiers(shade.radiance.states(), true));
        }
        unique_by_value(modifiers)
    }

    /// BSDF modifiers among [`Self::modifiers`] and [`Self::blk_modifiers`].
    pub fn bsdf_modifiers(&self) -> Vec<Modifier> {
        let mut modifiers = self.modifiers();
        modifiers.extend(self.blk_modifiers());
        unique_by_value(modifiers.into_iter().filter(Modifier::is_bsdf))
    }

    /// Dynamic shade groups, in first-seen order.
    pub fn dynamic_shade_groups(&self) -> Vec<DynamicShadeGroup<'a>> {
        let mut groups = Vec::new();
        for shade in self.shades() {
            let props = &shade.host.radiance;
            if let Some(identifier) = props.dynamic_group_identifier() {
                let member = DynamicMember {
                    host: shade.host.state_host(&shade.context),
                    states: props.states(),
                    is_indoor: shade.host.is_indoor,
                };
                push_group(&mut groups, identifier, member);
            }
        }
        groups
            .into_iter()
            .map(|(id, members)| DynamicGroup::new(&id, members))
            .collect()
    }

    /// Dynamic aperture and door groups, in first-seen order.
    pub fn dynamic_subface_groups(&self) -> Result<Vec<DynamicSubFaceGroup<'a>>> {
        let mut groups = Vec::new();
        for aperture in self.apertures() {
            let (host, props) = (aperture.host, &aperture.host.radiance);
            if let Some(identifier) = props.dynamic_group_identifier() {
                let member = DynamicMember {
                    host: host.state_host(&aperture.context)?,
                    states: props.states(),
                    is_indoor: host.boundary_condition == BoundaryCondition::Surface,
                };
                push_group(&mut groups, identifier, member);
            }
        }
        for door in self.doors() {
            let (host, props) = (door.host, &door.host.radiance);
            if let Some(identifier) = props.dynamic_group_identifier() {
                let member = DynamicMember {
                    host: host.state_host(&door.context)?,
                    states: props.states(),
                    is_indoor: host.boundary_condition == BoundaryCondition::Surface,
                };
                push_group(&mut groups, identifier, member);
            }
        }
        debug!(count = groups.len(), "collected dynamic sub-face groups");
        Ok(groups
            .into_iter()
            .map(|(id, members)| DynamicGroup::new(&id, members))
            .collect())
    }

    /// Identifiers of the dynamic shade groups.
    pub fn shade_group_identifiers(&self) -> Vec<&'a str> {
        let mut identifiers: Vec<&'a str> = Vec::new();
        for shade in self.model.shades() {
            if let Some(id) = shade.radiance.dynamic_group_identifier() {
                if !identifiers.contains(&id) {
                    identifiers.push(id);
                }
            }
        }
        identifiers
    }

    /// Identifiers of the dynamic aperture and door groups.
    pub fn subface_group_identifiers(&self) -> Vec<&'a str> {
        let mut identifiers: Vec<&'a str> = Vec::new();
        let ids = self
            .model
            .apertures()
            .filter_map(|a| a.radiance.dynamic_group_identifier())
            .chain(self.model.doors().filter_map(|d| d.radiance.dynamic_group_identifier()));
        for id in ids {
            if !identifiers.contains(&id) {
                identifiers.push(id);
            }
        }
        identifiers
    }

    /// Sensor grids of the model.
    pub fn sensor_grids(&self) -> &'a [SensorGrid] {
        &self.model.sensor_grids
    }

    /// Views of the model.
    pub fn views(&self) -> &'a [View] {
        &self.model.views
    }

    /// Report modifiers that share an identifier but differ in value.
    ///
    /// Returns the report (empty when there is nothing to report), or the
    /// error when `raise` is set.
    pub fn check_duplicate_modifier_identifiers(&self, raise: bool) -> Result<String> {
        let modifiers = self.modifiers();
        check_duplicates("Modifier", modifiers.iter().map(Modifier::identifier), raise)
    }

    /// Report modifier sets that share an identifier but differ in value.
    pub fn check_duplicate_modifier_set_identifiers(&self, raise: bool) -> Result<String> {
        let mut sets = vec![self.global_modifier_set()];
        for set in self.modifier_sets() {
            if !sets.iter().any(|s| *s == set) {
                sets.push(set);
            }
        }
        check_duplicates("ModifierSet", sets.iter().map(|s| s.identifier()), raise)
    }

    /// Report sensor grids that share a full identifier.
    pub fn check_duplicate_sensor_grid_identifiers(&self, raise: bool) -> Result<String> {
        let ids: Vec<String> = self.model.sensor_grids.iter().map(SensorGrid::full_identifier).collect();
        check_duplicates("SensorGrid", ids.iter().map(String::as_str), raise)
    }

    /// Report views that share a full identifier.
    pub fn check_duplicate_view_identifiers(&self, raise: bool) -> Result<String> {
        let ids: Vec<String> = self.model.views.iter().map(View::full_identifier).collect();
        check_duplicates("View", ids.iter().map(String::as_str), raise)
    }

    /// Dictionary form.
    ///
    /// Modifier sets are abridged and every modifier they and the model's
    /// objects reference is written in full. Without
    /// `include_global_modifier_set`, only the modifiers the model adds on
    /// top of the global set are written.
    pub fn to_dict(&self, include_global_modifier_set: bool) -> Result<JsonValue> {
        let global = self.global_modifier_set();
        let mut sets = Vec::new();
        let mut modifiers = Vec::new();
        if include_global_modifier_set {
            sets.push(global.to_dict(true, false)?);
            modifiers.extend(global.modifiers_unique());
        }
        for set in self.modifier_sets() {
            sets.push(set.to_dict(true, true)?);
        }
        modifiers.extend(self.room_modifiers());
        modifiers.extend(self.face_modifiers());
        modifiers.extend(self.shade_modifiers());
        modifiers.extend(self.blk_modifiers());
        let modifiers = unique_by_value(modifiers)
            .iter()
            .filter(|m| !m.is_void())
            .map(Modifier::to_dict)
            .collect::<Result<Vec<_>>>()?;

        let mut dict = Dict::new();
        dict.insert("type".into(), json!("ModelRadianceProperties"));
        dict.insert("global_modifier_set".into(), json!(global.identifier()));
        dict.insert("modifier_sets".into(), JsonValue::Array(sets));
        dict.insert("modifiers".into(), JsonValue::Array(modifiers));
        if !self.model.sensor_grids.is_empty() {
            let grids = self
                .model
                .sensor_grids
                .iter()
                .map(SensorGrid::to_dict)
                .collect::<Result<Vec<_>>>()?;
            dict.insert("sensor_grids".into(), JsonValue::Array(grids));
        }
        if !self.model.views.is_empty() {
            let views = self.model.views.iter().map(View::to_dict).collect();
            dict.insert("views".into(), JsonValue::Array(views));
        }
        Ok(JsonValue::Object(dict))
    }
}

/// Lookup tables rebuilt from a model properties dictionary.
#[derive(Debug, Clone, Default)]
pub struct LoadedProperties {
    /// Modifiers by identifier.
    pub modifiers: HashMap<String, Modifier>,
    /// Modifier sets by identifier.
    pub modifier_sets: HashMap<String, Arc<ModifierSet>>,
    /// Sensor grids.
    pub sensor_grids: Vec<SensorGrid>,
    /// Views.
    pub views: Vec<View>,
}

/// Read the dictionary written by [`ModelRadianceProperties::to_dict`].
///
/// Abridged modifier sets resolve their modifiers from the `modifiers` list
/// and the built-in defaults.
pub fn load_properties_from_dict(data: &JsonValue) -> Result<LoadedProperties> {
    let context = "ModelRadianceProperties";
    let dict = as_dict(data, context)?;
    check_type(dict, context)?;
    let mut loaded = LoadedProperties::default();
    for modifier in defaults().all() {
        loaded.modifiers.insert(modifier.identifier().to_string(), modifier.clone());
    }
    if dict.has("modifiers") {
        for item in dict.list("modifiers", context)? {
            let modifier = dict_to_modifier(item)?;
            loaded.modifiers.insert(modifier.identifier().to_string(), modifier);
        }
    }
    if dict.has("modifier_sets") {
        for item in dict.list("modifier_sets", context)? {
            let set = match item.get("type").and_then(JsonValue::as_str) {
                Some("ModifierSet") => ModifierSet::from_dict(item)?,
                _ => ModifierSet::from_dict_abridged(item, &loaded.modifiers)?,
            };
            loaded.modifier_sets.insert(set.identifier().to_string(), Arc::new(set));
        }
    }
    if dict.has("sensor_grids") {
        for item in dict.list("sensor_grids", context)? {
            loaded.sensor_grids.push(SensorGrid::from_dict(item)?);
        }
    }
    if dict.has("views") {
        for item in dict.list("views", context)? {
            loaded.views.push(View::from_dict(item)?);
        }
    }
    debug!(
        modifiers = loaded.modifiers.len(),
        modifier_sets = loaded.modifier_sets.len(),
        "loaded model radiance properties"
    );
    Ok(loaded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamic::StateGeometry;
    use crate::material::{Glass, Plastic};
    use crate::primitive::Primitive;
    use radscene_geom::point;

    fn plastic(identifier: &str, r: f64) -> Modifier {
        Modifier::new(Primitive::new(identifier, Plastic::from_single_reflectance(r, 0.0, 0.0).unwrap()).unwrap())
            .unwrap()
    }

    fn glass(identifier: &str, t: f64) -> Modifier {
        Modifier::new(Primitive::new(identifier, Glass::from_single_transmittance(t, None).unwrap()).unwrap()).unwrap()
    }

    fn window(identifier: &str) -> Aperture {
        Aperture::from_vertices(
            identifier,
            &[[1.0, 0.0, 1.0], [2.0, 0.0, 1.0], [2.0, 0.0, 2.0], [1.0, 0.0, 2.0]],
        )
        .unwrap()
    }

    fn louver(identifier: &str) -> Shade {
        Shade::from_vertices(identifier, &[[0.0, 0.0, 3.0], [3.0, 0.0, 3.0], [3.0, -1.0, 3.0]]).unwrap()
    }

    fn room_with_window() -> Room {
        let mut room = Room::from_box("Office", 3.0, 4.0, 3.0, point([0.0, 0.0, 0.0])).unwrap();
        let front = room.face_mut("Office_Front").unwrap();
        front.apertures.push(window("Office_Window"));
        room
    }

    #[test]
    fn test_face_resolution() {
        let lib = defaults();
        let room = room_with_window();
        let ctx = HostContext::in_room(&room);
        let front = &room.faces[1];
        assert_eq!(front.modifier(&ctx), lib.generic_wall);
        assert_eq!(front.modifier_blk(&ctx), lib.black);
        assert!(front.is_opaque(&ctx));

        let mut set = ModifierSet::new("Bright").unwrap();
        let bright = plastic("bright_wall", 0.8);
        set.wall_set_mut().set_exterior_modifier(Some(bright.clone()));
        let mut room = room.clone();
        room.radiance.set_modifier_set(Some(Arc::new(set)));
        let ctx = HostContext::in_room(&room);
        assert_eq!(room.faces[1].modifier(&ctx), bright);

        let mut face = room.faces[1].clone();
        let custom = plastic("custom", 0.3);
        face.radiance.set_modifier(Some(custom.clone()));
        assert!(face.radiance.is_modifier_set_on_object());
        assert_eq!(face.modifier(&ctx), custom);
        face.radiance.reset_to_default();
        assert_eq!(face.modifier(&HostContext::orphaned()), lib.generic_wall);
    }

    #[test]
    fn test_aperture_and_door_resolution() {
        let lib = defaults();
        let room = room_with_window();
        let front = &room.faces[1];
        let ctx = HostContext::in_room(&room).in_face(front);
        let aperture = &front.apertures[0];
        assert_eq!(aperture.modifier(&ctx).unwrap(), lib.generic_exterior_window);
        assert_eq!(aperture.modifier_blk(&ctx).unwrap(), lib.generic_exterior_window);
        assert!(!aperture.is_opaque(&ctx).unwrap());

        let mut grounded = aperture.clone();
        grounded.boundary_condition = BoundaryCondition::Ground;
        assert!(matches!(
            grounded.modifier(&ctx),
            Err(RadianceError::UnsupportedCombination(_))
        ));

        let door = Door::from_vertices("Door", &[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 0.0, 2.0]]).unwrap();
        assert_eq!(door.modifier(&HostContext::orphaned()).unwrap(), lib.generic_door);
        assert_eq!(door.modifier_blk(), lib.black);
    }

    #[test]
    fn test_shade_resolution() {
        let lib = defaults();
        let mut shade = louver("Louver");
        assert_eq!(shade.modifier(&HostContext::orphaned()), lib.generic_context);
        let attached = HostContext::orphaned().attached();
        assert_eq!(shade.modifier(&attached), lib.generic_exterior_shade);
        shade.is_indoor = true;
        assert_eq!(shade.modifier(&attached), lib.generic_interior_shade);
        assert_eq!(shade.modifier_blk(&attached), lib.black);
    }

    #[test]
    fn test_dynamic_properties() {
        let mut props = ShadeRadianceProperties::default();
        let state = RadianceShadeState::new(Some(plastic("dark", 0.1)), vec![]);
        assert!(matches!(props.add_state(state.clone()), Err(RadianceError::InvalidState(_))));

        props.set_dynamic_group_identifier(Some("Blinds")).unwrap();
        props.add_state(state.clone()).unwrap();
        props.add_state(RadianceShadeState::default()).unwrap();
        assert_eq!(props.state_count(), 2);
        assert!(props.set_dynamic_group_identifier(None).is_err());
        assert!(props.set_dynamic_group_identifier(Some("bad id")).is_err());

        let dict = props.to_dict(false).unwrap();
        assert_eq!(dict["type"], "ShadeRadianceProperties");
        assert_eq!(dict["dynamic_group_identifier"], "Blinds");
        assert_eq!(ShadeRadianceProperties::from_dict(&dict).unwrap(), props);

        let abridged = props.to_dict(true).unwrap();
        assert_eq!(abridged["states"][0]["modifier"], "dark");
        let table = HashMap::from([("dark".to_string(), plastic("dark", 0.1))]);
        let mut applied = ShadeRadianceProperties::default();
        applied.apply_properties_from_dict(&abridged, &table).unwrap();
        assert_eq!(applied, props);

        props.remove_states();
        props.set_dynamic_group_identifier(None).unwrap();
        assert!(!props.is_dynamic());
    }

    #[test]
    fn test_host_dicts() {
        let face = FaceRadianceProperties::new(Some(plastic("wall", 0.5)), None);
        let dict = face.to_dict(true).unwrap();
        assert_eq!(dict["type"], "FaceRadiancePropertiesAbridged");
        assert_eq!(dict["modifier"], "wall");
        assert!(dict.get("modifier_blk").is_none());
        assert_eq!(FaceRadianceProperties::from_dict(&face.to_dict(false).unwrap()).unwrap(), face);

        let mut set = ModifierSet::new("Custom").unwrap();
        set.shade_set_mut().set_exterior_modifier(Some(plastic("ledge", 0.4)));
        let room = RoomRadianceProperties::new(Some(Arc::new(set)));
        assert_eq!(room.to_dict(true).unwrap()["modifier_set"], "Custom");
        assert_eq!(RoomRadianceProperties::from_dict(&room.to_dict(false).unwrap()).unwrap(), room);

        let mut applied = RoomRadianceProperties::default();
        assert!(applied.apply_properties_from_dict(&room.to_dict(true).unwrap(), &HashMap::new()).is_err());
        let sets = HashMap::from([("Custom".to_string(), Arc::clone(room.explicit_modifier_set().unwrap()))]);
        applied.apply_properties_from_dict(&room.to_dict(true).unwrap(), &sets).unwrap();
        assert_eq!(applied, room);
    }

    fn dynamic_model() -> Model {
        let mut model = Model::new("Tower").unwrap();
        let mut room = room_with_window();
        let mut set = ModifierSet::new("Tinted").unwrap();
        let tint = glass("tint", 0.4);
        set.aperture_set_mut().set_window_modifier(Some(tint));
        room.radiance.set_modifier_set(Some(Arc::new(set)));

        let front = room.face_mut("Office_Front").unwrap();
        let aperture = &mut front.apertures[0];
        aperture.radiance.set_dynamic_group_identifier(Some("Electrochromic")).unwrap();
        aperture
            .radiance
            .add_state(RadianceSubFaceState::new(Some(glass("ec_dark", 0.05)), vec![]))
            .unwrap();
        aperture.radiance.add_state(RadianceSubFaceState::default()).unwrap();

        let mut blind = louver("Blind");
        blind.radiance.set_dynamic_group_identifier(Some("Blinds")).unwrap();
        let slat = StateGeometry::from_vertices(
            "Slat",
            &[[0.0, -0.1, 2.0], [1.0, -0.1, 2.0], [1.0, -0.2, 2.0]],
            Some(plastic("slat", 0.6)),
        )
        .unwrap();
        blind.radiance.add_state(RadianceShadeState::new(None, vec![slat])).unwrap();
        front.shades.push(blind);

        model.rooms.push(room);
        model.orphaned_shades.push(louver("Tree"));
        model
    }

    #[test]
    fn test_model_modifiers() {
        let model = dynamic_model();
        let props = model.radiance();
        let ids = |mods: Vec<Modifier>| mods.iter().map(|m| m.identifier().to_string()).collect::<Vec<_>>();

        assert_eq!(ids(props.room_modifiers()), ["tint"]);
        assert_eq!(ids(props.face_modifiers()), ["ec_dark"]);
        assert_eq!(ids(props.shade_modifiers()), ["slat", "generic_context_0.20"]);
        let all = ids(props.modifiers());
        for id in ["generic_wall_0.50", "tint", "ec_dark", "slat", "generic_context_0.20"] {
            assert!(all.iter().any(|m| m == id), "missing {}", id);
        }
        assert_eq!(ids(props.blk_modifiers())[0], "black");
        assert!(props.bsdf_modifiers().is_empty());
        assert_eq!(props.modifier_sets().len(), 1);
    }

    #[test]
    fn test_dynamic_groups() {
        let model = dynamic_model();
        let props = model.radiance();
        assert_eq!(props.shade_group_identifiers(), ["Blinds"]);
        assert_eq!(props.subface_group_identifiers(), ["Electrochromic"]);

        let groups = props.dynamic_subface_groups().unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].state_count(), 2);
        let member = &groups[0].members()[0];
        assert_eq!(member.host.modifier.identifier(), "tint");
        assert!(!member.is_indoor);

        let shades = props.dynamic_shade_groups();
        assert_eq!(shades[0].identifier(), "Blinds");
        assert_eq!(shades[0].members()[0].host.modifier, defaults().generic_exterior_shade);
    }

    #[test]
    fn test_duplicate_checks() {
        let mut model = dynamic_model();
        let props = model.radiance();
        assert_eq!(props.check_duplicate_modifier_identifiers(true).unwrap(), "");
        assert_eq!(props.check_duplicate_modifier_set_identifiers(true).unwrap(), "");

        model.orphaned_shades[0].radiance.set_modifier(Some(plastic("tint", 0.2)));
        let props = model.radiance();
        assert!(matches!(
            props.check_duplicate_modifier_identifiers(true),
            Err(RadianceError::Duplicate { .. })
        ));

        let grid = SensorGrid::new("Desk", vec![Default::default()]).unwrap();
        model.sensor_grids = vec![grid.clone(), grid];
        let report = model.radiance().check_duplicate_sensor_grid_identifiers(false).unwrap();
        assert!(report.contains("SensorGrid"));
        assert!(report.ends_with("Desk"));
        assert_eq!(model.radiance().check_duplicate_view_identifiers(true).unwrap(), "");
    }

    #[test]
    fn test_model_dict_round_trip() {
        let mut model = dynamic_model();
        model.views.push(View::new("Looking").unwrap());
        let props = model.radiance();
        let dict = props.to_dict(false).unwrap();
        assert_eq!(dict["type"], "ModelRadianceProperties");
        assert_eq!(dict["modifier_sets"][0]["identifier"], "Tinted");
        assert_eq!(dict["views"][0]["identifier"], "Looking");

        let loaded = load_properties_from_dict(&dict).unwrap();
        assert!(loaded.modifiers.contains_key("ec_dark"));
        let set = &loaded.modifier_sets["Tinted"];
        assert_eq!(set.aperture_set().window_modifier().identifier(), "tint");
        assert_eq!(loaded.views.len(), 1);

        let full = props.to_dict(true).unwrap();
        let loaded = load_properties_from_dict(&full).unwrap();
        assert!(loaded.modifier_sets.contains_key(props.global_modifier_set().identifier()));
    }
}
