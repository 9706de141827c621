//! Writing model objects to scene text.
//!
//! The per-object helpers write a single polygon record and leave the
//! modifier out; [`model_to_rad`] collects every modifier the polygons
//! reference into a separate stream.

use std::collections::HashSet;

use tracing::debug;

use crate::error::Result;
use crate::geometry::face_record;
use crate::model::{Aperture, BoundaryCondition, Door, Face, Model, Shade};
use crate::primitive::{chains_to_radiance, Modifier};
use crate::properties::HostContext;

/// Polygon record of a shade.
pub fn shade_to_rad(shade: &Shade, ctx: &HostContext<'_>, blk: bool, minimal: bool) -> String {
    let modifier = if blk { shade.modifier_blk(ctx) } else { shade.modifier(ctx) };
    face_record(&shade.identifier, &shade.geometry, &modifier, minimal)
}

/// Polygon record of a face. Apertures and doors are not included.
pub fn face_to_rad(face: &Face, ctx: &HostContext<'_>, blk: bool, minimal: bool) -> String {
    let modifier = if blk { face.modifier_blk(ctx) } else { face.modifier(ctx) };
    face_record(&face.identifier, &face.geometry, &modifier, minimal)
}

/// Polygon record of an aperture.
pub fn aperture_to_rad(aperture: &Aperture, ctx: &HostContext<'_>, blk: bool, minimal: bool) -> Result<String> {
    let modifier = if blk { aperture.modifier_blk(ctx)? } else { aperture.modifier(ctx)? };
    Ok(face_record(&aperture.identifier, &aperture.geometry, &modifier, minimal))
}

/// Polygon record of a door.
pub fn door_to_rad(door: &Door, ctx: &HostContext<'_>, blk: bool, minimal: bool) -> Result<String> {
    let modifier = if blk { door.modifier_blk() } else { door.modifier(ctx)? };
    Ok(face_record(&door.identifier, &door.geometry, &modifier, minimal))
}

/// Tracks interior boundaries so each adjacent pair is written once.
#[derive(Default)]
struct Interior<'a> {
    written: HashSet<&'a str>,
}

impl<'a> Interior<'a> {
    /// False if the other side of this boundary was already written.
    fn first_side(&mut self, identifier: &'a str, boundary: BoundaryCondition, adjacent: Option<&'a str>) -> bool {
        if boundary != BoundaryCondition::Surface {
            return true;
        }
        if self.written.contains(identifier) {
            return false;
        }
        if let Some(adjacent) = adjacent {
            self.written.insert(adjacent);
        }
        true
    }
}

/// Static geometry of a model as `(modifiers, geometry)` scene text.
///
/// With `blk` every object is written with its black-out modifier. Objects
/// in a dynamic group are left out; their groups write them per state.
/// Modifiers appear once each, in order of first use.
pub fn model_to_rad(model: &Model, blk: bool, minimal: bool) -> Result<(String, String)> {
    let props = model.radiance();
    let mut modifiers: Vec<Modifier> = Vec::new();
    let mut geometry: Vec<String> = Vec::new();
    let mut interior = Interior::default();

    for face in props.faces() {
        let (host, ctx) = (face.host, &face.context);
        if !interior.first_side(&host.identifier, host.boundary_condition, host.adjacent_identifier.as_deref()) {
            continue;
        }
        modifiers.push(if blk { host.modifier_blk(ctx) } else { host.modifier(ctx) });
        geometry.push(face_to_rad(host, ctx, blk, minimal));
    }
    for aperture in props.apertures() {
        let (host, ctx) = (aperture.host, &aperture.context);
        if host.radiance.is_dynamic()
            || !interior.first_side(&host.identifier, host.boundary_condition, host.adjacent_identifier.as_deref())
        {
            continue;
        }
        modifiers.push(if blk { host.modifier_blk(ctx)? } else { host.modifier(ctx)? });
        geometry.push(aperture_to_rad(host, ctx, blk, minimal)?);
    }
    for door in props.doors() {
        let (host, ctx) = (door.host, &door.context);
        if host.radiance.is_dynamic()
            || !interior.first_side(&host.identifier, host.boundary_condition, host.adjacent_identifier.as_deref())
        {
            continue;
        }
        modifiers.push(if blk { host.modifier_blk() } else { host.modifier(ctx)? });
        geometry.push(door_to_rad(host, ctx, blk, minimal)?);
    }
    for shade in props.shades() {
        let (host, ctx) = (shade.host, &shade.context);
        if host.radiance.is_dynamic() {
            continue;
        }
        modifiers.push(if blk { host.modifier_blk(ctx) } else { host.modifier(ctx) });
        geometry.push(shade_to_rad(host, ctx, blk, minimal));
    }

    let modifiers = chains_to_radiance(&modifiers, minimal);
    debug!(
        modifiers = modifiers.len(),
        polygons = geometry.len(),
        blk,
        "wrote model scene text"
    );
    let separator = if minimal { "\n" } else { "\n\n" };
    Ok((modifiers.join(separator), geometry.join(separator)))
}
