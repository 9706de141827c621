//! Modifier sets: named bundles of default modifiers for model elements.
//!
//! A set is split into six sub-sets (walls, floors, roofs/ceilings,
//! apertures, doors and shades) plus an air-boundary modifier. Every slot
//! that is left unset resolves to the matching library default, so a lookup
//! always yields a modifier.

use std::collections::HashMap;
use std::fmt;

use serde_json::{json, Value as JsonValue};

use crate::config::Config;
use crate::dict::{as_dict, check_type, dict_to_modifier_with, lookup, modifier_reference, Dict, DictArgs};
use crate::error::{RadianceError, Result};
use crate::library::defaults;
use crate::model::{BoundaryCondition, FaceType};
use crate::primitive::Modifier;
use crate::typing::valid_rad_string;

/// Resolves one slot value of a set dictionary into a modifier.
type Resolve<'a> = dyn FnMut(&JsonValue, &str) -> Result<Modifier> + 'a;

macro_rules! modifier_subset {
    (
        $(#[$meta:meta])*
        $name:ident, $type_name:literal {
            $($field:ident, $setter:ident => $default:ident: $doc:literal),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default)]
        pub struct $name {
            $($field: Option<Modifier>,)*
        }

        impl $name {
            $(
                #[doc = $doc]
                pub fn $field(&self) -> &Modifier {
                    self.$field.as_ref().unwrap_or(&defaults().$default)
                }

                #[doc = concat!("Set or reset (`None`) the ", stringify!($field), ".")]
                pub fn $setter(&mut self, modifier: Option<Modifier>) {
                    self.$field = modifier;
                }
            )*

            /// Every slot, resolved, in declaration order.
            pub fn modifiers(&self) -> Vec<Modifier> {
                vec![$(self.$field().clone(),)*]
            }

            /// Only the explicitly set slots.
            pub fn modified_modifiers(&self) -> Vec<Modifier> {
                [$(&self.$field,)*].into_iter().flatten().cloned().collect()
            }

            /// True if any slot is set.
            pub fn is_modified(&self) -> bool {
                false $(|| self.$field.is_some())*
            }

            /// Dictionary form. Abridged dictionaries hold identifiers; with
            /// `none_for_defaults` unset slots are written as `null`.
            pub fn to_dict(&self, abridged: bool, none_for_defaults: bool) -> Result<JsonValue> {
                let mut dict = Dict::new();
                let type_name = if abridged {
                    concat!($type_name, "Abridged")
                } else {
                    $type_name
                };
                dict.insert("type".into(), json!(type_name));
                $(
                    let slot = if none_for_defaults {
                        self.$field.as_ref()
                    } else {
                        Some(self.$field())
                    };
                    dict.insert(stringify!($field).into(), slot_to_dict(slot, abridged)?);
                )*
                Ok(JsonValue::Object(dict))
            }

            /// Rebuild from a full dictionary.
            pub fn from_dict(data: &JsonValue) -> Result<Self> {
                let config = Config::default();
                let mut cache = HashMap::new();
                Self::read(data, $type_name, &mut |value: &JsonValue, context: &str| {
                    embedded(value, context, &config, &mut cache)
                })
            }

            /// Rebuild from an abridged dictionary, resolving identifiers in `table`.
            pub fn from_dict_abridged(data: &JsonValue, table: &HashMap<String, Modifier>) -> Result<Self> {
                Self::read(data, concat!($type_name, "Abridged"), &mut |value: &JsonValue, context: &str| {
                    referenced(value, context, table)
                })
            }

            fn read(data: &JsonValue, expected: &str, resolve: &mut Resolve<'_>) -> Result<Self> {
                let dict = as_dict(data, expected)?;
                check_type(dict, expected)?;
                Ok(Self {
                    $($field: read_slot(dict, stringify!($field), expected, resolve)?,)*
                })
            }
        }

        impl PartialEq for $name {
            fn eq(&self, other: &Self) -> bool {
                true $(&& self.$field() == other.$field())*
            }
        }
    };
}

modifier_subset! {
    /// Modifiers for walls.
    WallModifierSet, "WallModifierSet" {
        exterior_modifier, set_exterior_modifier => generic_wall: "Modifier for walls with an outdoor boundary.",
        interior_modifier, set_interior_modifier => generic_wall: "Modifier for all other walls.",
    }
}

modifier_subset! {
    /// Modifiers for floors.
    FloorModifierSet, "FloorModifierSet" {
        exterior_modifier, set_exterior_modifier => generic_floor: "Modifier for floors with an outdoor boundary.",
        interior_modifier, set_interior_modifier => generic_floor: "Modifier for all other floors.",
    }
}

modifier_subset! {
    /// Modifiers for roofs and ceilings.
    RoofCeilingModifierSet, "RoofCeilingModifierSet" {
        exterior_modifier, set_exterior_modifier => generic_ceiling: "Modifier for roofs with an outdoor boundary.",
        interior_modifier, set_interior_modifier => generic_ceiling: "Modifier for ceilings.",
    }
}

modifier_subset! {
    /// Modifiers for shades.
    ShadeModifierSet, "ShadeModifierSet" {
        exterior_modifier, set_exterior_modifier => generic_exterior_shade: "Modifier for outdoor shades.",
        interior_modifier, set_interior_modifier => generic_interior_shade: "Modifier for indoor shades.",
    }
}

modifier_subset! {
    /// Modifiers for apertures.
    ApertureModifierSet, "ApertureModifierSet" {
        window_modifier, set_window_modifier => generic_exterior_window: "Fixed outdoor apertures in walls.",
        interior_modifier, set_interior_modifier => generic_interior_window: "Apertures with a surface boundary.",
        skylight_modifier, set_skylight_modifier => generic_exterior_window: "Fixed outdoor apertures in roofs and floors.",
        operable_modifier, set_operable_modifier => generic_exterior_window: "Operable outdoor apertures.",
    }
}

modifier_subset! {
    /// Modifiers for doors.
    DoorModifierSet, "DoorModifierSet" {
        exterior_modifier, set_exterior_modifier => generic_door: "Opaque outdoor doors in walls.",
        interior_modifier, set_interior_modifier => generic_door: "Opaque doors with a surface boundary.",
        exterior_glass_modifier, set_exterior_glass_modifier => generic_exterior_window: "Glass outdoor doors.",
        interior_glass_modifier, set_interior_glass_modifier => generic_interior_window: "Glass doors with a surface boundary.",
        overhead_modifier, set_overhead_modifier => generic_door: "Opaque outdoor doors in roofs and floors.",
    }
}

fn slot_to_dict(slot: Option<&Modifier>, abridged: bool) -> Result<JsonValue> {
    match slot {
        None => Ok(JsonValue::Null),
        Some(modifier) => modifier_reference(modifier, abridged),
    }
}

fn read_slot(dict: &Dict, key: &str, context: &str, resolve: &mut Resolve<'_>) -> Result<Option<Modifier>> {
    match dict.get(key) {
        None | Some(JsonValue::Null) => Ok(None),
        Some(value) => resolve(value, context).map(Some),
    }
}

/// Equal embedded modifiers sharing an identifier become one shared modifier.
/// Different modifiers under one identifier are an error.
fn embedded(
    value: &JsonValue,
    context: &str,
    config: &Config,
    cache: &mut HashMap<String, Modifier>,
) -> Result<Modifier> {
    let modifier = dict_to_modifier_with(value, config)?;
    if modifier.is_void() {
        return Ok(modifier);
    }
    match cache.get(modifier.identifier()) {
        Some(cached) if *cached == modifier => Ok(cached.clone()),
        Some(_) => Err(RadianceError::Duplicate {
            kind: format!("Modifier ({})", context),
            identifiers: vec![modifier.identifier().to_string()],
        }),
        None => {
            cache.insert(modifier.identifier().to_string(), modifier.clone());
            Ok(modifier)
        }
    }
}

fn referenced(value: &JsonValue, context: &str, table: &HashMap<String, Modifier>) -> Result<Modifier> {
    let identifier = value
        .as_str()
        .ok_or_else(|| RadianceError::type_mismatch(format!("a modifier identifier in {}", context), value.to_string()))?;
    lookup(table, identifier, context)
}

/// A named bundle of modifiers assigned to model elements by type and boundary.
#[derive(Debug, Clone)]
pub struct ModifierSet {
    identifier: String,
    display_name: Option<String>,
    wall_set: WallModifierSet,
    floor_set: FloorModifierSet,
    roof_ceiling_set: RoofCeilingModifierSet,
    aperture_set: ApertureModifierSet,
    door_set: DoorModifierSet,
    shade_set: ShadeModifierSet,
    air_boundary_modifier: Option<Modifier>,
}

impl ModifierSet {
    /// Create a set with every slot at its default.
    pub fn new(identifier: &str) -> Result<Self> {
        Ok(Self::builtin(&valid_rad_string(identifier, "modifier set identifier")?))
    }

    /// Create a set with a trusted identifier.
    pub(crate) fn builtin(identifier: &str) -> Self {
        Self {
            identifier: identifier.to_string(),
            display_name: None,
            wall_set: WallModifierSet::default(),
            floor_set: FloorModifierSet::default(),
            roof_ceiling_set: RoofCeilingModifierSet::default(),
            aperture_set: ApertureModifierSet::default(),
            door_set: DoorModifierSet::default(),
            shade_set: ShadeModifierSet::default(),
            air_boundary_modifier: None,
        }
    }

    /// Unique identifier.
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Change the identifier.
    pub fn set_identifier(&mut self, identifier: &str) -> Result<()> {
        self.identifier = valid_rad_string(identifier, "modifier set identifier")?;
        Ok(())
    }

    /// Display name, falling back to the identifier.
    pub fn display_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.identifier)
    }

    /// Set or clear the display name.
    pub fn set_display_name(&mut self, name: Option<String>) {
        self.display_name = name;
    }

    /// Wall sub-set.
    pub fn wall_set(&self) -> &WallModifierSet {
        &self.wall_set
    }

    /// Mutable wall sub-set.
    pub fn wall_set_mut(&mut self) -> &mut WallModifierSet {
        &mut self.wall_set
    }

    /// Floor sub-set.
    pub fn floor_set(&self) -> &FloorModifierSet {
        &self.floor_set
    }

    /// Mutable floor sub-set.
    pub fn floor_set_mut(&mut self) -> &mut FloorModifierSet {
        &mut self.floor_set
    }

    /// Roof and ceiling sub-set.
    pub fn roof_ceiling_set(&self) -> &RoofCeilingModifierSet {
        &self.roof_ceiling_set
    }

    /// Mutable roof and ceiling sub-set.
    pub fn roof_ceiling_set_mut(&mut self) -> &mut RoofCeilingModifierSet {
        &mut self.roof_ceiling_set
    }

    /// Aperture sub-set.
    pub fn aperture_set(&self) -> &ApertureModifierSet {
        &self.aperture_set
    }

    /// Mutable aperture sub-set.
    pub fn aperture_set_mut(&mut self) -> &mut ApertureModifierSet {
        &mut self.aperture_set
    }

    /// Door sub-set.
    pub fn door_set(&self) -> &DoorModifierSet {
        &self.door_set
    }

    /// Mutable door sub-set.
    pub fn door_set_mut(&mut self) -> &mut DoorModifierSet {
        &mut self.door_set
    }

    /// Shade sub-set.
    pub fn shade_set(&self) -> &ShadeModifierSet {
        &self.shade_set
    }

    /// Mutable shade sub-set.
    pub fn shade_set_mut(&mut self) -> &mut ShadeModifierSet {
        &mut self.shade_set
    }

    /// Modifier for air boundaries; `air_wall` when unset.
    pub fn air_boundary_modifier(&self) -> &Modifier {
        self.air_boundary_modifier
            .as_ref()
            .unwrap_or(&defaults().air_wall)
    }

    /// Set or reset the air-boundary modifier.
    pub fn set_air_boundary_modifier(&mut self, modifier: Option<Modifier>) {
        self.air_boundary_modifier = modifier;
    }

    /// Every resolved modifier: walls, floors, roofs, apertures, doors,
    /// shades, then the air boundary.
    pub fn modifiers(&self) -> Vec<Modifier> {
        let mut all = self.wall_set.modifiers();
        all.extend(self.floor_set.modifiers());
        all.extend(self.roof_ceiling_set.modifiers());
        all.extend(self.aperture_set.modifiers());
        all.extend(self.door_set.modifiers());
        all.extend(self.shade_set.modifiers());
        all.push(self.air_boundary_modifier().clone());
        all
    }

    /// Only the explicitly set modifiers, in the order of [`ModifierSet::modifiers`].
    pub fn modified_modifiers(&self) -> Vec<Modifier> {
        let mut all = self.wall_set.modified_modifiers();
        all.extend(self.floor_set.modified_modifiers());
        all.extend(self.roof_ceiling_set.modified_modifiers());
        all.extend(self.aperture_set.modified_modifiers());
        all.extend(self.door_set.modified_modifiers());
        all.extend(self.shade_set.modified_modifiers());
        all.extend(self.air_boundary_modifier.iter().cloned());
        all
    }

    /// [`ModifierSet::modifiers`] without repeats, first seen first.
    pub fn modifiers_unique(&self) -> Vec<Modifier> {
        unique_by_value(self.modifiers())
    }

    /// [`ModifierSet::modified_modifiers`] without repeats, first seen first.
    pub fn modified_modifiers_unique(&self) -> Vec<Modifier> {
        unique_by_value(self.modified_modifiers())
    }

    /// Modifier for a face of the given type and boundary condition.
    ///
    /// Faces with an outdoor boundary take the exterior modifier; all other
    /// boundaries take the interior one.
    pub fn get_face_modifier(&self, face_type: FaceType, boundary: BoundaryCondition) -> &Modifier {
        let outdoors = boundary == BoundaryCondition::Outdoors;
        match (face_type, outdoors) {
            (FaceType::Wall, true) => self.wall_set.exterior_modifier(),
            (FaceType::Wall, false) => self.wall_set.interior_modifier(),
            (FaceType::Floor, true) => self.floor_set.exterior_modifier(),
            (FaceType::Floor, false) => self.floor_set.interior_modifier(),
            (FaceType::RoofCeiling, true) => self.roof_ceiling_set.exterior_modifier(),
            (FaceType::RoofCeiling, false) => self.roof_ceiling_set.interior_modifier(),
            (FaceType::AirBoundary, _) => self.air_boundary_modifier(),
        }
    }

    /// Modifier for an aperture.
    ///
    /// `parent` is the type of the host face; apertures without one count as
    /// windows in walls.
    pub fn get_aperture_modifier(
        &self,
        boundary: BoundaryCondition,
        is_operable: bool,
        parent: Option<FaceType>,
    ) -> Result<&Modifier> {
        match boundary {
            BoundaryCondition::Outdoors if is_operable => Ok(self.aperture_set.operable_modifier()),
            BoundaryCondition::Outdoors => match parent {
                None | Some(FaceType::Wall) => Ok(self.aperture_set.window_modifier()),
                Some(_) => Ok(self.aperture_set.skylight_modifier()),
            },
            BoundaryCondition::Surface => Ok(self.aperture_set.interior_modifier()),
            other => Err(RadianceError::UnsupportedCombination(format!(
                "{} is not a supported aperture boundary condition",
                other
            ))),
        }
    }

    /// Modifier for a door.
    pub fn get_door_modifier(
        &self,
        boundary: BoundaryCondition,
        is_glass: bool,
        parent: Option<FaceType>,
    ) -> Result<&Modifier> {
        match boundary {
            BoundaryCondition::Outdoors if is_glass => Ok(self.door_set.exterior_glass_modifier()),
            BoundaryCondition::Outdoors => match parent {
                None | Some(FaceType::Wall) => Ok(self.door_set.exterior_modifier()),
                Some(_) => Ok(self.door_set.overhead_modifier()),
            },
            BoundaryCondition::Surface if is_glass => Ok(self.door_set.interior_glass_modifier()),
            BoundaryCondition::Surface => Ok(self.door_set.interior_modifier()),
            other => Err(RadianceError::UnsupportedCombination(format!(
                "{} is not a supported door boundary condition",
                other
            ))),
        }
    }

    /// Modifier for a shade.
    pub fn get_shade_modifier(&self, is_indoor: bool) -> &Modifier {
        if is_indoor {
            self.shade_set.interior_modifier()
        } else {
            self.shade_set.exterior_modifier()
        }
    }

    /// Dictionary form.
    ///
    /// Abridged dictionaries reference modifiers by identifier. With
    /// `none_for_defaults`, slots left at their defaults are written as `null`.
    pub fn to_dict(&self, abridged: bool, none_for_defaults: bool) -> Result<JsonValue> {
        let mut dict = Dict::new();
        let type_name = if abridged { "ModifierSetAbridged" } else { "ModifierSet" };
        dict.insert("type".into(), json!(type_name));
        dict.insert("identifier".into(), json!(self.identifier));
        dict.insert("wall_set".into(), self.wall_set.to_dict(abridged, none_for_defaults)?);
        dict.insert("floor_set".into(), self.floor_set.to_dict(abridged, none_for_defaults)?);
        dict.insert(
            "roof_ceiling_set".into(),
            self.roof_ceiling_set.to_dict(abridged, none_for_defaults)?,
        );
        dict.insert("aperture_set".into(), self.aperture_set.to_dict(abridged, none_for_defaults)?);
        dict.insert("door_set".into(), self.door_set.to_dict(abridged, none_for_defaults)?);
        dict.insert("shade_set".into(), self.shade_set.to_dict(abridged, none_for_defaults)?);
        let air = if none_for_defaults {
            self.air_boundary_modifier.as_ref()
        } else {
            Some(self.air_boundary_modifier())
        };
        dict.insert("air_boundary_modifier".into(), slot_to_dict(air, abridged)?);
        if let Some(name) = &self.display_name {
            dict.insert("display_name".into(), json!(name));
        }
        Ok(JsonValue::Object(dict))
    }

    /// Rebuild from a full dictionary. Equal embedded modifiers that share
    /// an identifier become one shared modifier; different modifiers under
    /// one identifier are a [`RadianceError::Duplicate`].
    pub fn from_dict(data: &JsonValue) -> Result<Self> {
        Self::from_dict_with(data, &Config::default())
    }

    /// [`Self::from_dict`] with explicit folders for file-backed modifiers.
    pub fn from_dict_with(data: &JsonValue, config: &Config) -> Result<Self> {
        let mut cache = HashMap::new();
        Self::read(data, "ModifierSet", &mut |value: &JsonValue, context: &str| {
            embedded(value, context, config, &mut cache)
        })
    }

    /// Rebuild from an abridged dictionary.
    pub fn from_dict_abridged(data: &JsonValue, table: &HashMap<String, Modifier>) -> Result<Self> {
        Self::read(data, "ModifierSetAbridged", &mut |value: &JsonValue, context: &str| {
            referenced(value, context, table)
        })
    }

    fn read(data: &JsonValue, expected: &str, resolve: &mut Resolve<'_>) -> Result<Self> {
        let dict = as_dict(data, expected)?;
        check_type(dict, expected)?;
        let mut set = Self::new(dict.string("identifier", expected)?)?;
        set.display_name = dict.opt_string("display_name").map(str::to_string);
        let suffix = if expected.ends_with("Abridged") { "Abridged" } else { "" };

        macro_rules! subset {
            ($key:literal, $ty:ident, $type_name:literal) => {
                match dict.get($key) {
                    None | Some(JsonValue::Null) => $ty::default(),
                    Some(sub) => $ty::read(sub, &format!("{}{}", $type_name, suffix), resolve)?,
                }
            };
        }

        set.wall_set = subset!("wall_set", WallModifierSet, "WallModifierSet");
        set.floor_set = subset!("floor_set", FloorModifierSet, "FloorModifierSet");
        set.roof_ceiling_set = subset!("roof_ceiling_set", RoofCeilingModifierSet, "RoofCeilingModifierSet");
        set.aperture_set = subset!("aperture_set", ApertureModifierSet, "ApertureModifierSet");
        set.door_set = subset!("door_set", DoorModifierSet, "DoorModifierSet");
        set.shade_set = subset!("shade_set", ShadeModifierSet, "ShadeModifierSet");
        set.air_boundary_modifier = read_slot(dict, "air_boundary_modifier", expected, resolve)?;
        Ok(set)
    }
}

/// Remove value-equal repeats, keeping first-seen order.
pub(crate) fn unique_by_value(modifiers: impl IntoIterator<Item = Modifier>) -> Vec<Modifier> {
    let mut unique: Vec<Modifier> = Vec::new();
    for modifier in modifiers {
        if !unique.contains(&modifier) {
            unique.push(modifier);
        }
    }
    unique
}

impl PartialEq for ModifierSet {
    fn eq(&self, other: &Self) -> bool {
        self.identifier == other.identifier && self.modifiers() == other.modifiers()
    }
}

impl fmt::Display for ModifierSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Radiance Modifier Set: {}", self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::{Glass, Plastic};
    use crate::primitive::Primitive;

    fn plastic(id: &str, r: f64) -> Modifier {
        Modifier::new(Primitive::new(id, Plastic::from_single_reflectance(r, 0.0, 0.0).unwrap()).unwrap()).unwrap()
    }

    #[test]
    fn test_defaults() {
        let set = ModifierSet::new("Default_Set").unwrap();
        let lib = defaults();
        assert_eq!(set.wall_set().exterior_modifier(), &lib.generic_wall);
        assert_eq!(set.roof_ceiling_set().interior_modifier(), &lib.generic_ceiling);
        assert_eq!(set.aperture_set().interior_modifier(), &lib.generic_interior_window);
        assert_eq!(set.door_set().exterior_glass_modifier(), &lib.generic_exterior_window);
        assert_eq!(set.shade_set().exterior_modifier(), &lib.generic_exterior_shade);
        assert_eq!(set.air_boundary_modifier(), &lib.air_wall);
        assert_eq!(set.modifiers().len(), 2 + 2 + 2 + 4 + 5 + 2 + 1);
        assert!(set.modified_modifiers().is_empty());
        assert!(!set.wall_set().is_modified());

        let unique: Vec<String> = set
            .modifiers_unique()
            .iter()
            .map(|m| m.identifier().to_string())
            .collect();
        assert_eq!(
            unique,
            [
                "generic_wall_0.50",
                "generic_floor_0.20",
                "generic_ceiling_0.80",
                "generic_exterior_window_vis_0.64",
                "generic_interior_window_vis_0.88",
                "generic_opaque_door_0.50",
                "generic_exterior_shade_0.35",
                "generic_interior_shade_0.50",
                "air_wall",
            ]
        );
    }

    #[test]
    fn test_setting_modifiers() {
        let mut set = ModifierSet::new("Custom").unwrap();
        let wall = plastic("custom_wall", 0.4);
        set.wall_set_mut().set_exterior_modifier(Some(wall.clone()));
        set.floor_set_mut().set_interior_modifier(Some(wall.clone()));
        assert!(set.wall_set().is_modified());
        assert_eq!(set.modified_modifiers().len(), 2);
        assert_eq!(set.modified_modifiers_unique().len(), 1);
        assert!(set.get_face_modifier(FaceType::Wall, BoundaryCondition::Outdoors).ptr_eq(&wall));

        set.wall_set_mut().set_exterior_modifier(None);
        assert_eq!(set.wall_set().exterior_modifier(), &defaults().generic_wall);
    }

    #[test]
    fn test_face_lookups() {
        let set = ModifierSet::new("Lookups").unwrap();
        let lib = defaults();
        assert_eq!(set.get_face_modifier(FaceType::Floor, BoundaryCondition::Ground), &lib.generic_floor);
        assert_eq!(
            set.get_face_modifier(FaceType::RoofCeiling, BoundaryCondition::Adiabatic),
            &lib.generic_ceiling
        );
        assert_eq!(set.get_face_modifier(FaceType::AirBoundary, BoundaryCondition::Surface), &lib.air_wall);
        assert_eq!(set.get_shade_modifier(true), &lib.generic_interior_shade);
        assert_eq!(set.get_shade_modifier(false), &lib.generic_exterior_shade);
    }

    #[test]
    fn test_aperture_and_door_lookups() {
        let mut set = ModifierSet::new("Lookups").unwrap();
        let skylight = Modifier::new(Primitive::new("sky", Glass::from_single_transmittance(0.5, None).unwrap()).unwrap())
            .unwrap();
        let overhead = plastic("hatch", 0.3);
        set.aperture_set_mut().set_skylight_modifier(Some(skylight.clone()));
        set.door_set_mut().set_overhead_modifier(Some(overhead.clone()));
        let lib = defaults();

        let out = BoundaryCondition::Outdoors;
        assert_eq!(set.get_aperture_modifier(out, false, Some(FaceType::Wall)).unwrap(), &lib.generic_exterior_window);
        assert_eq!(set.get_aperture_modifier(out, false, Some(FaceType::RoofCeiling)).unwrap(), &skylight);
        assert_eq!(set.get_aperture_modifier(out, true, Some(FaceType::RoofCeiling)).unwrap(), &lib.generic_exterior_window);
        assert_eq!(
            set.get_aperture_modifier(BoundaryCondition::Surface, false, None).unwrap(),
            &lib.generic_interior_window
        );
        assert!(matches!(
            set.get_aperture_modifier(BoundaryCondition::Ground, false, None),
            Err(RadianceError::UnsupportedCombination(_))
        ));

        assert_eq!(set.get_door_modifier(out, false, None).unwrap(), &lib.generic_door);
        assert_eq!(set.get_door_modifier(out, false, Some(FaceType::Floor)).unwrap(), &overhead);
        assert_eq!(set.get_door_modifier(out, true, None).unwrap(), &lib.generic_exterior_window);
        assert_eq!(
            set.get_door_modifier(BoundaryCondition::Surface, true, None).unwrap(),
            &lib.generic_interior_window
        );
        assert!(set.get_door_modifier(BoundaryCondition::Adiabatic, false, None).is_err());
    }

    #[test]
    fn test_dict_round_trip() {
        let mut set = ModifierSet::new("Round_Trip").unwrap();
        set.set_display_name(Some("Round trip".into()));
        let wall = plastic("custom_wall", 0.4);
        set.wall_set_mut().set_exterior_modifier(Some(wall.clone()));
        set.wall_set_mut().set_interior_modifier(Some(wall));

        let full = set.to_dict(false, true).unwrap();
        assert_eq!(full["type"], "ModifierSet");
        assert_eq!(full["wall_set"]["type"], "WallModifierSet");
        assert_eq!(full["wall_set"]["exterior_modifier"]["identifier"], "custom_wall");
        assert!(full["floor_set"]["exterior_modifier"].is_null());
        assert_eq!(full["display_name"], "Round trip");

        let back = ModifierSet::from_dict(&full).unwrap();
        assert_eq!(back, set);
        assert_eq!(back.display_name(), "Round trip");
        assert!(back.wall_set().exterior_modifier().ptr_eq(back.wall_set().interior_modifier()));
        assert!(!back.floor_set().is_modified());

        let resolved = set.to_dict(false, false).unwrap();
        assert_eq!(resolved["floor_set"]["exterior_modifier"]["identifier"], "generic_floor_0.20");
        assert_eq!(ModifierSet::from_dict(&resolved).unwrap(), set);
    }

    #[test]
    fn test_same_identifier_different_modifiers() {
        let mut set = ModifierSet::new("Clash").unwrap();
        set.wall_set_mut().set_exterior_modifier(Some(plastic("shared", 0.4)));
        set.wall_set_mut().set_interior_modifier(Some(plastic("shared", 0.4)));
        let mut data = set.to_dict(false, true).unwrap();

        let back = ModifierSet::from_dict(&data).unwrap();
        assert!(back.wall_set().exterior_modifier().ptr_eq(back.wall_set().interior_modifier()));

        data["floor_set"]["exterior_modifier"] = plastic("shared", 0.9).to_dict().unwrap();
        match ModifierSet::from_dict(&data) {
            Err(RadianceError::Duplicate { identifiers, .. }) => assert_eq!(identifiers, vec!["shared".to_string()]),
            other => panic!("expected a duplicate error, got {:?}", other),
        }
    }

    #[test]
    fn test_dict_with_config_writes_bsdf() {
        let src = tempfile::tempdir().unwrap();
        let xml = "<WindowElement>\n<IncidentDataStructure>TensorTree4</IncidentDataStructure>\n</WindowElement>\n";
        let path = src.path().join("source.xml");
        std::fs::write(&path, xml).unwrap();
        let bsdf = Modifier::new(Primitive::new("tt_glass", crate::material::Bsdf::new(&path).unwrap()).unwrap()).unwrap();

        let mut set = ModifierSet::new("Bsdf_Set").unwrap();
        set.aperture_set_mut().set_window_modifier(Some(bsdf));
        let data = set.to_dict(false, true).unwrap();

        let out = tempfile::tempdir().unwrap();
        let config = Config {
            bsdf_folder: out.path().join("BSDF"),
            ..Config::default()
        };
        let back = ModifierSet::from_dict_with(&data, &config).unwrap();
        assert_eq!(back.aperture_set().window_modifier().identifier(), "tt_glass");
        let written = out.path().join("BSDF").join("tt_glass.xml");
        assert_eq!(std::fs::read_to_string(written).unwrap(), xml);
    }

    #[test]
    fn test_abridged_dict() {
        let mut set = ModifierSet::new("Abridged").unwrap();
        let shade = plastic("dark_shade", 0.1);
        set.shade_set_mut().set_exterior_modifier(Some(shade.clone()));

        let abridged = set.to_dict(true, true).unwrap();
        assert_eq!(abridged["type"], "ModifierSetAbridged");
        assert_eq!(abridged["shade_set"]["type"], "ShadeModifierSetAbridged");
        assert_eq!(abridged["shade_set"]["exterior_modifier"], "dark_shade");
        assert!(abridged.get("display_name").is_none());

        let table: HashMap<String, Modifier> = [("dark_shade".to_string(), shade)].into_iter().collect();
        let back = ModifierSet::from_dict_abridged(&abridged, &table).unwrap();
        assert_eq!(back, set);
        assert!(matches!(
            ModifierSet::from_dict_abridged(&abridged, &HashMap::new()),
            Err(RadianceError::MissingReference { .. })
        ));
        assert!(matches!(
            ModifierSet::from_dict(&abridged),
            Err(RadianceError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_subset_dict() {
        let mut doors = DoorModifierSet::default();
        doors.set_interior_modifier(Some(plastic("door_in", 0.6)));
        let data = doors.to_dict(false, true).unwrap();
        assert_eq!(data["type"], "DoorModifierSet");
        assert_eq!(DoorModifierSet::from_dict(&data).unwrap(), doors);
        assert_ne!(DoorModifierSet::default(), doors);
    }

    #[test]
    fn test_equality() {
        let a = ModifierSet::new("Same").unwrap();
        let mut b = ModifierSet::new("Same").unwrap();
        assert_eq!(a, b);
        b.set_air_boundary_modifier(Some(defaults().air_wall.clone()));
        assert_eq!(a, b);
        b.set_air_boundary_modifier(Some(plastic("opaque_air", 0.5)));
        assert_ne!(a, b);
        assert!(ModifierSet::new("bad id").is_err());
    }
}
