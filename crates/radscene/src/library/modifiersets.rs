//! Default modifier sets.

use std::sync::OnceLock;

use super::modifiers::defaults;
use crate::modifierset::ModifierSet;

/// The four generic modifier sets.
#[derive(Debug)]
pub struct DefaultModifierSets {
    /// Interior visible reflectances; every slot at its default.
    pub visible: ModifierSet,
    /// Interior visible reflectances with solar window transmittances.
    pub solar: ModifierSet,
    /// Visible set with exterior-side opaque reflectances.
    pub visible_exterior: ModifierSet,
    /// Solar set with exterior-side opaque reflectances.
    pub solar_exterior: ModifierSet,
}

impl DefaultModifierSets {
    /// Every default set.
    pub fn all(&self) -> [&ModifierSet; 4] {
        [&self.visible, &self.solar, &self.visible_exterior, &self.solar_exterior]
    }
}

fn with_solar_windows(mut set: ModifierSet) -> ModifierSet {
    let lib = defaults();
    let apertures = set.aperture_set_mut();
    apertures.set_window_modifier(Some(lib.generic_exterior_window_solar.clone()));
    apertures.set_skylight_modifier(Some(lib.generic_exterior_window_solar.clone()));
    apertures.set_operable_modifier(Some(lib.generic_exterior_window_solar.clone()));
    apertures.set_interior_modifier(Some(lib.generic_interior_window_solar.clone()));
    set
}

fn with_exterior_sides(mut set: ModifierSet) -> ModifierSet {
    let lib = defaults();
    set.wall_set_mut().set_exterior_modifier(Some(lib.generic_wall_exterior.clone()));
    set.floor_set_mut().set_exterior_modifier(Some(lib.generic_floor_exterior.clone()));
    set.roof_ceiling_set_mut()
        .set_exterior_modifier(Some(lib.generic_roof_exterior.clone()));
    set
}

/// The built-in modifier sets.
pub fn default_modifier_sets() -> &'static DefaultModifierSets {
    static SETS: OnceLock<DefaultModifierSets> = OnceLock::new();
    SETS.get_or_init(|| DefaultModifierSets {
        visible: ModifierSet::builtin("Generic_Interior_Visible_Modifier_Set"),
        solar: with_solar_windows(ModifierSet::builtin("Generic_Interior_Solar_Modifier_Set")),
        visible_exterior: with_exterior_sides(ModifierSet::builtin("Generic_Exterior_Visible_Modifier_Set")),
        solar_exterior: with_exterior_sides(with_solar_windows(ModifierSet::builtin(
            "Generic_Exterior_Solar_Modifier_Set",
        ))),
    })
}

/// The set used for hosts without an explicit modifier or room set.
pub fn generic_modifier_set_visible() -> &'static ModifierSet {
    &default_modifier_sets().visible
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BoundaryCondition, FaceType};

    #[test]
    fn test_generic_sets() {
        let sets = default_modifier_sets();
        let lib = defaults();
        assert!(sets.visible.modified_modifiers().is_empty());
        assert_eq!(sets.solar.modified_modifiers().len(), 4);
        assert_eq!(
            sets.solar
                .get_aperture_modifier(BoundaryCondition::Outdoors, false, Some(FaceType::Wall))
                .unwrap(),
            &lib.generic_exterior_window_solar
        );
        assert_eq!(
            sets.visible_exterior
                .get_face_modifier(FaceType::Wall, BoundaryCondition::Outdoors),
            &lib.generic_wall_exterior
        );
        assert_eq!(sets.solar_exterior.modified_modifiers().len(), 7);
        assert_eq!(sets.solar_exterior.identifier(), "Generic_Exterior_Solar_Modifier_Set");
        assert_eq!(generic_modifier_set_visible(), &sets.visible);
    }
}
