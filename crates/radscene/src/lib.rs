#![warn(missing_docs)]

//! Radiance scene-description primitives.
//!
//! This crate reads, builds, transforms and writes the objects of a Radiance
//! scene: materials (modifiers) and geometry, each a named record that points
//! at its modifier by name.
//!
//! The pipeline has 3 stages:
//! 1. **Tokenize**: [`lexer`] splits scene text into records
//! 2. **Resolve**: [`reader`] turns the flat list into records whose
//!    modifiers and dependencies are nested, following name references
//! 3. **Build**: [`Primitive`] validates the values of each record into
//!    typed parameters
//!
//! Every primitive has a text form ([`Primitive::to_radiance`]) and a
//! dictionary form ([`Primitive::to_dict`]), both round-trippable.
//!
//! On top of the primitives sit [`ModifierSet`]s and the default [`library`],
//! dynamic shading states ([`dynamic`]), sensor grids, views, [`sky`] light
//! sources and a minimal building [`model`] whose [`properties`] resolve
//! modifiers through the parent chain. [`writer`] writes a model back to scene text.
//!
//! # Example
//!
//! ```
//! use radscene::Primitive;
//!
//! let text = "void plastic white 0 0 5 0.8 0.8 0.8 0 0";
//! let white = Primitive::from_string(text).unwrap();
//! assert_eq!(white.identifier(), "white");
//! assert_eq!(white.to_radiance(true, true, true), "void plastic white 0 0 5 0.8 0.8 0.8 0.0 0.0");
//! ```

pub mod config;
pub mod dict;
pub mod dynamic;
pub mod error;
pub mod geometry;
pub mod lexer;
pub mod library;
pub mod material;
pub mod model;
pub mod modifierset;
pub mod parser;
pub mod primitive;
pub mod properties;
pub mod reader;
pub mod sensorgrid;
pub mod sky;
pub mod types;
pub mod typing;
pub mod value;
pub mod view;
pub mod writer;

// Re-export public API
pub use config::Config;
pub use dict::{
    dict_to_modifier, dict_to_modifier_with, dict_to_object, dict_to_object_with, dict_to_primitive,
    dict_to_primitive_with, SceneObject,
};
pub use error::{RadianceError, Result};
pub use library::{defaults, Library, LoadReport};
pub use model::{Aperture, BoundaryCondition, Door, Face, FaceType, Model, Room, Shade};
pub use modifierset::ModifierSet;
pub use primitive::{Modifier, Primitive, PrimitiveKind};
pub use properties::{HostContext, ModelRadianceProperties};
pub use radscene_geom::{Face3, Point3, Vec3};
pub use reader::string_to_dicts;
pub use sensorgrid::{Sensor, SensorGrid};
pub use sky::{string_to_sky, Sky};
pub use types::PrimitiveType;
pub use value::Value;
pub use view::{View, ViewType};
pub use writer::model_to_rad;
