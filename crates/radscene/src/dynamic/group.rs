//! Groups of dynamic objects that change state together.

use std::borrow::Cow;
use std::path::PathBuf;

use serde_json::{json, Value as JsonValue};

use super::{RadianceShadeState, RadianceState, RadianceSubFaceState, StateHost};
use crate::error::{RadianceError, Result};
use crate::geometry::face_record;
use crate::library::defaults;
use crate::modifierset::unique_by_value;
use crate::primitive::{chains_to_radiance, unique_by_identity, Modifier, Primitive, PrimitiveKind};

/// One object of a dynamic group and its states.
#[derive(Debug, Clone)]
pub struct DynamicMember<'a, S> {
    /// The host object.
    pub host: StateHost<'a>,
    /// States of the host, in order.
    pub states: &'a [S],
    /// True if the host is indoors: an indoor shade, or a sub-face with a
    /// surface boundary condition.
    pub is_indoor: bool,
}

/// Objects sharing a dynamic group identifier.
#[derive(Debug, Clone)]
pub struct DynamicGroup<'a, S> {
    identifier: String,
    members: Vec<DynamicMember<'a, S>>,
    state_count: usize,
}

/// Group of dynamic shades.
pub type DynamicShadeGroup<'a> = DynamicGroup<'a, RadianceShadeState>;

/// Group of dynamic apertures and doors.
pub type DynamicSubFaceGroup<'a> = DynamicGroup<'a, RadianceSubFaceState>;

/// A BSDF modifier whose data file points into `model/bsdf`.
fn bsdf_in_model_folder(modifier: &Modifier) -> Option<Modifier> {
    let primitive = modifier.primitive()?;
    let mut copy: Primitive = primitive.clone();
    let bsdf = match copy.kind_mut() {
        PrimitiveKind::Bsdf(bsdf) => bsdf,
        PrimitiveKind::ABsdf(absdf) => &mut absdf.0,
        _ => return None,
    };
    let name = bsdf.bsdf_file.file_name()?.to_os_string();
    bsdf.bsdf_file = PathBuf::from("model").join("bsdf").join(name);
    Some(Modifier::builtin(copy))
}

impl<'a, S: RadianceState> DynamicGroup<'a, S> {
    /// Create a group. The state count is the longest state list, at least one.
    pub fn new(identifier: &str, members: Vec<DynamicMember<'a, S>>) -> Self {
        let state_count = members
            .iter()
            .map(|m| m.states.len())
            .max()
            .unwrap_or(0)
            .max(1);
        Self {
            identifier: identifier.to_string(),
            members,
            state_count,
        }
    }

    /// Group identifier.
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Members of the group.
    pub fn members(&self) -> &[DynamicMember<'a, S>] {
        &self.members
    }

    /// Number of states of the group.
    pub fn state_count(&self) -> usize {
        self.state_count
    }

    /// True if every member is indoors.
    pub fn is_indoor(&self) -> bool {
        self.members.iter().all(|m| m.is_indoor)
    }

    /// The state of every member at `index`. Members with fewer states use
    /// their last state, members without states a default one.
    pub fn states_by_index(&self, index: usize) -> Result<Vec<Cow<'a, S>>> {
        if index >= self.state_count {
            return Err(RadianceError::InvalidState(format!(
                "\"{}\" is not a valid state index for dynamic group \"{}\"",
                index, self.identifier
            )));
        }
        Ok(self
            .members
            .iter()
            .map(|m| {
                let states: &'a [S] = m.states;
                match states.get(index).or(states.last()) {
                    Some(state) => Cow::Borrowed(state),
                    None => Cow::Owned(S::default()),
                }
            })
            .collect())
    }

    /// One state of the whole group: a header comment, the modifiers used in
    /// the state, then the geometry of every member.
    ///
    /// BSDF data files are referenced from `model/bsdf`.
    pub fn to_radiance(&self, index: usize, direct: bool, minimal: bool) -> Result<String> {
        let states = self.states_by_index(index)?;
        let mut modifiers = Vec::new();
        for (member, state) in self.members.iter().zip(&states) {
            if direct {
                modifiers.push(state.modifier_direct(&member.host));
                modifiers.extend(state.shades().iter().map(|s| s.modifier_direct().clone()));
            } else {
                modifiers.push(state.modifier(&member.host));
                modifiers.extend(state.shades().iter().map(|s| s.modifier().clone()));
            }
        }
        let mut output = vec![format!("# STATE {} for \"{}\"", index, self.identifier)];
        let mut plain = Vec::new();
        for modifier in unique_by_identity(modifiers) {
            match bsdf_in_model_folder(&modifier) {
                Some(bsdf) => output.insert(1, bsdf.to_radiance(minimal)),
                None => plain.push(modifier),
            }
        }
        output.extend(chains_to_radiance(&plain, minimal));
        for (member, state) in self.members.iter().zip(&states) {
            output.push(state.to_radiance(&member.host, direct, minimal));
        }
        Ok(output.join("\n\n"))
    }
}

impl DynamicShadeGroup<'_> {
    /// True if every state of every member is opaque.
    pub fn is_opaque(&self) -> bool {
        self.members
            .iter()
            .all(|m| m.states.iter().all(|s| s.modifier(&m.host).is_opaque()))
    }

    /// State file entries for the multi-phase folder.
    pub fn states_json_list(&self) -> Vec<JsonValue> {
        (0..self.state_count)
            .map(|i| {
                json!({
                    "identifier": format!("{}_{}", i, self.identifier),
                    "default": format!("./{}..default..{}.rad", self.identifier, i),
                    "direct": format!("./{}..direct..{}.rad", self.identifier, i),
                })
            })
            .collect()
    }
}

impl DynamicSubFaceGroup<'_> {
    /// Sub-face groups are never treated as opaque.
    pub fn is_opaque(&self) -> bool {
        false
    }

    /// State file entries for the multi-phase folder, including the black-out
    /// file.
    pub fn states_json_list(&self) -> Vec<JsonValue> {
        (0..self.state_count)
            .map(|i| {
                json!({
                    "identifier": format!("{}_{}", i, self.identifier),
                    "default": format!("./{}..default..{}.rad", self.identifier, i),
                    "direct": format!("./{}..direct..{}.rad", self.identifier, i),
                    "black": format!("./{}..black.rad", self.identifier),
                })
            })
            .collect()
    }

    /// Every member with its black-out modifier, modifiers first.
    pub fn blk_to_radiance(&self, minimal: bool) -> String {
        let mut output = vec![format!("# BLACK representation for \"{}\"", self.identifier)];
        let mut modifiers = Vec::new();
        for member in &self.members {
            let host = &member.host;
            output.push(face_record(host.identifier, host.geometry, &host.modifier_blk, minimal));
            modifiers.push(host.modifier_blk.clone());
        }
        for modifier in unique_by_identity(modifiers).iter().rev() {
            let modifier = bsdf_in_model_folder(modifier).unwrap_or_else(|| modifier.clone());
            if !modifier.is_void() {
                output.insert(1, modifier.to_radiance(minimal));
            }
        }
        output.join("\n\n")
    }

    /// The single BSDF shared by every member at `index`, if there is one.
    ///
    /// `None` when any state uses a non-BSDF modifier or the states use
    /// different BSDFs.
    pub fn tmxt_bsdf(&self, index: usize) -> Result<Option<Modifier>> {
        let states = self.states_by_index(index)?;
        let mut bsdfs = Vec::new();
        for (member, state) in self.members.iter().zip(&states) {
            let modifier = state.modifier(&member.host);
            if !modifier.is_bsdf() {
                return Ok(None);
            }
            bsdfs.push(modifier);
        }
        let mut unique = unique_by_value(bsdfs);
        Ok(if unique.len() == 1 { unique.pop() } else { None })
    }

    /// View matrix representation of the state at `index`.
    pub fn vmtx_to_radiance(&self, index: usize, minimal: bool) -> Result<String> {
        let glow = &defaults().white_glow;
        let states = self.states_by_index(index)?;
        let mut output = vec![
            format!("# VMTX representation for \"{}\"", self.identifier),
            glow.to_radiance(minimal),
        ];
        for (member, state) in self.members.iter().zip(&states) {
            output.push(state.vmtx_to_radiance(&member.host, glow, minimal));
        }
        Ok(output.join("\n\n"))
    }

    /// Daylight matrix representation of the state at `index`.
    pub fn dmtx_to_radiance(&self, index: usize, minimal: bool) -> Result<String> {
        let states = self.states_by_index(index)?;
        let mut output = vec![
            format!("# DMTX representation for \"{}\"", self.identifier),
            defaults().white_glow.to_radiance(minimal),
        ];
        for (member, state) in self.members.iter().zip(&states) {
            output.push(state.dmtx_to_radiance(&member.host, minimal));
        }
        Ok(output.join("\n\n"))
    }
}
