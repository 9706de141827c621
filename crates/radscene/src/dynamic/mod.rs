//! Dynamic geometry: objects that switch between modifier states.
//!
//! A shade, aperture or door can carry an ordered list of states. Each state
//! gives the host a modifier (and a "direct" modifier for direct-sun studies)
//! plus extra [`StateGeometry`] that only exists in that state. Hosts sharing
//! a dynamic group identifier are written together, one file per state.
//!
//! States do not point back at their host. Operations that need the host
//! geometry or its resolved modifiers take a [`StateHost`] view instead.

mod group;
mod state;
mod stategeo;

pub use group::{DynamicGroup, DynamicMember, DynamicShadeGroup, DynamicSubFaceGroup};
pub use state::{RadianceShadeState, RadianceState, RadianceSubFaceState};
pub use stategeo::StateGeometry;

use radscene_geom::Face3;

use crate::primitive::Modifier;

/// The parts of a host object a state needs to write itself.
#[derive(Debug, Clone)]
pub struct StateHost<'a> {
    /// Identifier of the host; state polygons reuse it.
    pub identifier: &'a str,
    /// Geometry of the host.
    pub geometry: &'a Face3,
    /// Resolved modifier of the host.
    pub modifier: Modifier,
    /// Resolved black-out modifier of the host.
    pub modifier_blk: Modifier,
}
