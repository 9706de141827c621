//! Default modifiers.
//!
//! Generic visible and solar reflectance and transmittance values used to
//! initialize a model. They are starting points, not measured materials.

use std::sync::OnceLock;

use crate::material::{Glass, Glow, Plastic};
use crate::primitive::{Modifier, Primitive, PrimitiveKind};

/// The built-in modifiers, each shared by every set and host that uses it.
#[derive(Debug)]
#[allow(missing_docs)]
pub struct DefaultModifiers {
    pub generic_floor: Modifier,
    pub generic_wall: Modifier,
    pub generic_ceiling: Modifier,
    pub generic_door: Modifier,
    pub generic_interior_shade: Modifier,
    pub generic_exterior_shade: Modifier,
    pub generic_context: Modifier,
    pub generic_interior_window: Modifier,
    pub generic_exterior_window: Modifier,
    pub generic_exterior_window_insect_screen: Modifier,
    pub generic_interior_window_solar: Modifier,
    pub generic_exterior_window_solar: Modifier,
    pub generic_exterior_window_insect_screen_solar: Modifier,
    pub generic_floor_exterior: Modifier,
    pub generic_wall_exterior: Modifier,
    pub generic_roof_exterior: Modifier,
    /// Fully transmitting glass for air boundaries.
    pub air_wall: Modifier,
    /// Black plastic used for blacked-out geometry in multi-phase studies.
    pub black: Modifier,
    /// Unit glow used for sky patches in multi-phase studies.
    pub white_glow: Modifier,
}

impl DefaultModifiers {
    /// Every default modifier.
    pub fn all(&self) -> [&Modifier; 19] {
        [
            &self.generic_floor,
            &self.generic_wall,
            &self.generic_ceiling,
            &self.generic_door,
            &self.generic_interior_shade,
            &self.generic_exterior_shade,
            &self.generic_context,
            &self.generic_interior_window,
            &self.generic_exterior_window,
            &self.generic_exterior_window_insect_screen,
            &self.generic_interior_window_solar,
            &self.generic_exterior_window_solar,
            &self.generic_exterior_window_insect_screen_solar,
            &self.generic_floor_exterior,
            &self.generic_wall_exterior,
            &self.generic_roof_exterior,
            &self.air_wall,
            &self.black,
            &self.white_glow,
        ]
    }
}

fn plastic(identifier: &str, reflectance: f64) -> Modifier {
    let params = Plastic {
        r_reflectance: reflectance,
        g_reflectance: reflectance,
        b_reflectance: reflectance,
        specularity: 0.0,
        roughness: 0.0,
    };
    Modifier::builtin(Primitive::builtin(identifier, PrimitiveKind::Plastic(params)))
}

fn glass_transmissivity(identifier: &str, transmissivity: f64) -> Modifier {
    let params = Glass {
        r_transmissivity: transmissivity,
        g_transmissivity: transmissivity,
        b_transmissivity: transmissivity,
        refraction_index: None,
    };
    Modifier::builtin(Primitive::builtin(identifier, PrimitiveKind::Glass(params)))
}

fn glass(identifier: &str, transmittance: f64) -> Modifier {
    glass_transmissivity(identifier, Glass::get_transmissivity(transmittance))
}

/// The built-in modifiers.
pub fn defaults() -> &'static DefaultModifiers {
    static DEFAULTS: OnceLock<DefaultModifiers> = OnceLock::new();
    DEFAULTS.get_or_init(|| DefaultModifiers {
        generic_floor: plastic("generic_floor_0.20", 0.2),
        generic_wall: plastic("generic_wall_0.50", 0.5),
        generic_ceiling: plastic("generic_ceiling_0.80", 0.8),
        generic_door: plastic("generic_opaque_door_0.50", 0.5),
        generic_interior_shade: plastic("generic_interior_shade_0.50", 0.5),
        generic_exterior_shade: plastic("generic_exterior_shade_0.35", 0.35),
        generic_context: plastic("generic_context_0.20", 0.2),
        generic_interior_window: glass("generic_interior_window_vis_0.88", 0.88),
        generic_exterior_window: glass("generic_exterior_window_vis_0.64", 0.64),
        generic_exterior_window_insect_screen: glass("generic_exterior_screened_window_vis_0.32", 0.32),
        generic_interior_window_solar: glass("generic_interior_window_sol_0.77", 0.77),
        generic_exterior_window_solar: glass("generic_exterior_window_sol_0.37", 0.37),
        generic_exterior_window_insect_screen_solar: glass("generic_exterior_screened_window_sol_0.19", 0.19),
        generic_floor_exterior: plastic("generic_floor_exterior_side_0.50", 0.5),
        generic_wall_exterior: plastic("generic_wall_exterior_side_0.35", 0.35),
        generic_roof_exterior: plastic("generic_ceiling_exterior_side_0.35", 0.35),
        air_wall: glass_transmissivity("air_wall", 1.0),
        black: plastic("black", 0.0),
        white_glow: Modifier::builtin(Primitive::builtin(
            "white_glow",
            PrimitiveKind::Glow(Glow {
                r_emittance: 1.0,
                g_emittance: 1.0,
                b_emittance: 1.0,
                max_radius: 0.0,
            }),
        )),
    })
}
