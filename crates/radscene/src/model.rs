//! A minimal building model that hosts radiance properties.
//!
//! Rooms own faces, faces own apertures and doors, and any of these can own
//! shades. Objects that sit outside a room are orphaned. Every host carries
//! its radiance properties in a `radiance` field; modifiers the host does not
//! set explicitly are resolved against its parents (see [`crate::properties`]).

use std::fmt;
use std::str::FromStr;

use radscene_geom::{Face3, Point3};
use serde::{Deserialize, Serialize};

use crate::error::{RadianceError, Result};
use crate::properties::{
    ApertureRadianceProperties, DoorRadianceProperties, FaceRadianceProperties, ModelRadianceProperties,
    RoomRadianceProperties, ShadeRadianceProperties,
};
use crate::sensorgrid::SensorGrid;
use crate::typing::valid_rad_string;
use crate::view::View;

/// Type of a face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FaceType {
    /// A wall.
    Wall,
    /// A floor.
    Floor,
    /// A roof or ceiling.
    RoofCeiling,
    /// A virtual boundary between two connected spaces.
    AirBoundary,
}

impl FaceType {
    /// Name used in dictionaries.
    pub fn name(self) -> &'static str {
        match self {
            FaceType::Wall => "Wall",
            FaceType::Floor => "Floor",
            FaceType::RoofCeiling => "RoofCeiling",
            FaceType::AirBoundary => "AirBoundary",
        }
    }
}

impl fmt::Display for FaceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FaceType {
    type Err = RadianceError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Wall" => Ok(FaceType::Wall),
            "Floor" => Ok(FaceType::Floor),
            "RoofCeiling" => Ok(FaceType::RoofCeiling),
            "AirBoundary" => Ok(FaceType::AirBoundary),
            other => Err(RadianceError::UnknownType(format!("face type \"{}\"", other))),
        }
    }
}

/// What lies on the other side of a face, aperture or door.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BoundaryCondition {
    /// The outdoors.
    Outdoors,
    /// The ground.
    Ground,
    /// A surface that exchanges nothing with its other side.
    Adiabatic,
    /// Another surface of the model; the pair is two-sided interior geometry.
    Surface,
}

impl BoundaryCondition {
    /// Name used in dictionaries.
    pub fn name(self) -> &'static str {
        match self {
            BoundaryCondition::Outdoors => "Outdoors",
            BoundaryCondition::Ground => "Ground",
            BoundaryCondition::Adiabatic => "Adiabatic",
            BoundaryCondition::Surface => "Surface",
        }
    }
}

impl fmt::Display for BoundaryCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BoundaryCondition {
    type Err = RadianceError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Outdoors" => Ok(BoundaryCondition::Outdoors),
            "Ground" => Ok(BoundaryCondition::Ground),
            "Adiabatic" => Ok(BoundaryCondition::Adiabatic),
            "Surface" => Ok(BoundaryCondition::Surface),
            other => Err(RadianceError::UnknownType(format!("boundary condition \"{}\"", other))),
        }
    }
}

/// A shading surface.
#[derive(Debug, Clone, PartialEq)]
pub struct Shade {
    /// Identifier; also the identifier of its polygon.
    pub identifier: String,
    /// Optional free-text name.
    pub display_name: Option<String>,
    /// Geometry.
    pub geometry: Face3,
    /// Whether the shade sits inside a room.
    pub is_indoor: bool,
    /// Radiance properties.
    pub radiance: ShadeRadianceProperties,
}

impl Shade {
    /// An outdoor shade.
    pub fn new(identifier: &str, geometry: Face3) -> Result<Self> {
        Ok(Self {
            identifier: valid_rad_string(identifier, "shade identifier")?,
            display_name: None,
            geometry,
            is_indoor: false,
            radiance: ShadeRadianceProperties::default(),
        })
    }

    /// An outdoor shade from `[x, y, z]` vertices.
    pub fn from_vertices(identifier: &str, vertices: &[[f64; 3]]) -> Result<Self> {
        Self::new(identifier, Face3::from_coords(vertices)?)
    }
}

/// A window or other glazed opening in a face.
#[derive(Debug, Clone, PartialEq)]
pub struct Aperture {
    /// Identifier.
    pub identifier: String,
    /// Optional free-text name.
    pub display_name: Option<String>,
    /// Geometry.
    pub geometry: Face3,
    /// Boundary condition.
    pub boundary_condition: BoundaryCondition,
    /// The aperture on the other side of a `Surface` boundary.
    pub adjacent_identifier: Option<String>,
    /// Whether the aperture can be opened.
    pub is_operable: bool,
    /// Shades attached to the aperture.
    pub shades: Vec<Shade>,
    /// Radiance properties.
    pub radiance: ApertureRadianceProperties,
}

impl Aperture {
    /// An outdoor, fixed aperture.
    pub fn new(identifier: &str, geometry: Face3) -> Result<Self> {
        Ok(Self {
            identifier: valid_rad_string(identifier, "aperture identifier")?,
            display_name: None,
            geometry,
            boundary_condition: BoundaryCondition::Outdoors,
            adjacent_identifier: None,
            is_operable: false,
            shades: Vec::new(),
            radiance: ApertureRadianceProperties::default(),
        })
    }

    /// An outdoor, fixed aperture from `[x, y, z]` vertices.
    pub fn from_vertices(identifier: &str, vertices: &[[f64; 3]]) -> Result<Self> {
        Self::new(identifier, Face3::from_coords(vertices)?)
    }

    /// Make this an interior aperture paired with `adjacent`.
    pub fn set_adjacent(&mut self, adjacent: &str) -> Result<()> {
        self.adjacent_identifier = Some(valid_rad_string(adjacent, "adjacent aperture identifier")?);
        self.boundary_condition = BoundaryCondition::Surface;
        Ok(())
    }
}

/// A door in a face; opaque unless `is_glass`.
#[derive(Debug, Clone, PartialEq)]
pub struct Door {
    /// Identifier.
    pub identifier: String,
    /// Optional free-text name.
    pub display_name: Option<String>,
    /// Geometry.
    pub geometry: Face3,
    /// Boundary condition.
    pub boundary_condition: BoundaryCondition,
    /// The door on the other side of a `Surface` boundary.
    pub adjacent_identifier: Option<String>,
    /// Whether the door is mostly glazed.
    pub is_glass: bool,
    /// Shades attached to the door.
    pub shades: Vec<Shade>,
    /// Radiance properties.
    pub radiance: DoorRadianceProperties,
}

impl Door {
    /// An outdoor, opaque door.
    pub fn new(identifier: &str, geometry: Face3) -> Result<Self> {
        Ok(Self {
            identifier: valid_rad_string(identifier, "door identifier")?,
            display_name: None,
            geometry,
            boundary_condition: BoundaryCondition::Outdoors,
            adjacent_identifier: None,
            is_glass: false,
            shades: Vec::new(),
            radiance: DoorRadianceProperties::default(),
        })
    }

    /// An outdoor, opaque door from `[x, y, z]` vertices.
    pub fn from_vertices(identifier: &str, vertices: &[[f64; 3]]) -> Result<Self> {
        Self::new(identifier, Face3::from_coords(vertices)?)
    }

    /// Make this an interior door paired with `adjacent`.
    pub fn set_adjacent(&mut self, adjacent: &str) -> Result<()> {
        self.adjacent_identifier = Some(valid_rad_string(adjacent, "adjacent door identifier")?);
        self.boundary_condition = BoundaryCondition::Surface;
        Ok(())
    }
}

/// A planar face of a room, or an orphaned face.
#[derive(Debug, Clone, PartialEq)]
pub struct Face {
    /// Identifier.
    pub identifier: String,
    /// Optional free-text name.
    pub display_name: Option<String>,
    /// Geometry.
    pub geometry: Face3,
    /// Face type.
    pub face_type: FaceType,
    /// Boundary condition.
    pub boundary_condition: BoundaryCondition,
    /// The face on the other side of a `Surface` boundary.
    pub adjacent_identifier: Option<String>,
    /// Apertures in the face.
    pub apertures: Vec<Aperture>,
    /// Doors in the face.
    pub doors: Vec<Door>,
    /// Shades attached to the face.
    pub shades: Vec<Shade>,
    /// Radiance properties.
    pub radiance: FaceRadianceProperties,
}

impl Face {
    /// Create a face.
    pub fn new(identifier: &str, geometry: Face3, face_type: FaceType, boundary_condition: BoundaryCondition) -> Result<Self> {
        Ok(Self {
            identifier: valid_rad_string(identifier, "face identifier")?,
            display_name: None,
            geometry,
            face_type,
            boundary_condition,
            adjacent_identifier: None,
            apertures: Vec::new(),
            doors: Vec::new(),
            shades: Vec::new(),
            radiance: FaceRadianceProperties::default(),
        })
    }

    /// Create a face from `[x, y, z]` vertices.
    pub fn from_vertices(
        identifier: &str,
        vertices: &[[f64; 3]],
        face_type: FaceType,
        boundary_condition: BoundaryCondition,
    ) -> Result<Self> {
        Self::new(identifier, Face3::from_coords(vertices)?, face_type, boundary_condition)
    }

    /// Make this an interior face paired with `adjacent`.
    pub fn set_adjacent(&mut self, adjacent: &str) -> Result<()> {
        self.adjacent_identifier = Some(valid_rad_string(adjacent, "adjacent face identifier")?);
        self.boundary_condition = BoundaryCondition::Surface;
        Ok(())
    }
}

/// A closed volume bounded by faces.
#[derive(Debug, Clone, PartialEq)]
pub struct Room {
    /// Identifier.
    pub identifier: String,
    /// Optional free-text name.
    pub display_name: Option<String>,
    /// Bounding faces.
    pub faces: Vec<Face>,
    /// Shades attached to the room.
    pub shades: Vec<Shade>,
    /// Radiance properties.
    pub radiance: RoomRadianceProperties,
}

impl Room {
    /// An empty room.
    pub fn new(identifier: &str) -> Result<Self> {
        Ok(Self {
            identifier: valid_rad_string(identifier, "room identifier")?,
            display_name: None,
            faces: Vec::new(),
            shades: Vec::new(),
            radiance: RoomRadianceProperties::default(),
        })
    }

    /// A box-shaped room with its minimum corner at `origin`.
    ///
    /// Faces are named `<identifier>_Bottom`, `_Front`, `_Right`, `_Back`,
    /// `_Left` and `_Top`; the floor touches the ground and every other face
    /// is outdoors.
    pub fn from_box(identifier: &str, width: f64, depth: f64, height: f64, origin: Point3) -> Result<Self> {
        let mut room = Self::new(identifier)?;
        let p = |x: f64, y: f64, z: f64| [origin.x + x, origin.y + y, origin.z + z];
        let (w, d, h) = (width, depth, height);
        let sides = [
            ("Bottom", [p(0., 0., 0.), p(0., d, 0.), p(w, d, 0.), p(w, 0., 0.)], FaceType::Floor),
            ("Front", [p(0., 0., 0.), p(w, 0., 0.), p(w, 0., h), p(0., 0., h)], FaceType::Wall),
            ("Right", [p(w, 0., 0.), p(w, d, 0.), p(w, d, h), p(w, 0., h)], FaceType::Wall),
            ("Back", [p(w, d, 0.), p(0., d, 0.), p(0., d, h), p(w, d, h)], FaceType::Wall),
            ("Left", [p(0., d, 0.), p(0., 0., 0.), p(0., 0., h), p(0., d, h)], FaceType::Wall),
            ("Top", [p(0., 0., h), p(w, 0., h), p(w, d, h), p(0., d, h)], FaceType::RoofCeiling),
        ];
        for (side, vertices, face_type) in sides {
            let boundary = if face_type == FaceType::Floor {
                BoundaryCondition::Ground
            } else {
                BoundaryCondition::Outdoors
            };
            let id = format!("{}_{}", room.identifier, side);
            room.faces.push(Face::from_vertices(&id, &vertices, face_type, boundary)?);
        }
        Ok(room)
    }

    /// The face with `identifier`.
    pub fn face_mut(&mut self, identifier: &str) -> Option<&mut Face> {
        self.faces.iter_mut().find(|f| f.identifier == identifier)
    }
}

/// A building model: rooms, orphaned objects, sensor grids and views.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    /// Identifier.
    pub identifier: String,
    /// Optional free-text name.
    pub display_name: Option<String>,
    /// Rooms.
    pub rooms: Vec<Room>,
    /// Faces outside any room.
    pub orphaned_faces: Vec<Face>,
    /// Apertures outside any face.
    pub orphaned_apertures: Vec<Aperture>,
    /// Doors outside any face.
    pub orphaned_doors: Vec<Door>,
    /// Shades outside any other object.
    pub orphaned_shades: Vec<Shade>,
    /// Sensor grids.
    pub sensor_grids: Vec<SensorGrid>,
    /// Views.
    pub views: Vec<View>,
}

impl Model {
    /// An empty model.
    pub fn new(identifier: &str) -> Result<Self> {
        Ok(Self {
            identifier: valid_rad_string(identifier, "model identifier")?,
            display_name: None,
            rooms: Vec::new(),
            orphaned_faces: Vec::new(),
            orphaned_apertures: Vec::new(),
            orphaned_doors: Vec::new(),
            orphaned_shades: Vec::new(),
            sensor_grids: Vec::new(),
            views: Vec::new(),
        })
    }

    /// Every face: room faces first, then orphaned faces.
    pub fn faces(&self) -> impl Iterator<Item = &Face> {
        self.rooms
            .iter()
            .flat_map(|r| r.faces.iter())
            .chain(self.orphaned_faces.iter())
    }

    /// Every aperture, hosted or orphaned.
    pub fn apertures(&self) -> impl Iterator<Item = &Aperture> {
        self.faces()
            .flat_map(|f| f.apertures.iter())
            .chain(self.orphaned_apertures.iter())
    }

    /// Every door, hosted or orphaned.
    pub fn doors(&self) -> impl Iterator<Item = &Door> {
        self.faces()
            .flat_map(|f| f.doors.iter())
            .chain(self.orphaned_doors.iter())
    }

    /// Every shade in the model.
    pub fn shades(&self) -> impl Iterator<Item = &Shade> {
        let room_shades = self.rooms.iter().flat_map(|r| r.shades.iter());
        let face_shades = self.faces().flat_map(|f| {
            f.shades
                .iter()
                .chain(f.apertures.iter().flat_map(|a| a.shades.iter()))
                .chain(f.doors.iter().flat_map(|d| d.shades.iter()))
        });
        let sub_face_shades = self
            .orphaned_apertures
            .iter()
            .flat_map(|a| a.shades.iter())
            .chain(self.orphaned_doors.iter().flat_map(|d| d.shades.iter()));
        room_shades
            .chain(face_shades)
            .chain(sub_face_shades)
            .chain(self.orphaned_shades.iter())
    }

    /// The room with `identifier`.
    pub fn room(&self, identifier: &str) -> Option<&Room> {
        self.rooms.iter().find(|r| r.identifier == identifier)
    }

    /// Radiance properties computed over the whole model.
    pub fn radiance(&self) -> ModelRadianceProperties<'_> {
        ModelRadianceProperties::new(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_enum_names() {
        assert_eq!("RoofCeiling".parse::<FaceType>().unwrap(), FaceType::RoofCeiling);
        assert_eq!(FaceType::AirBoundary.to_string(), "AirBoundary");
        assert_eq!("Surface".parse::<BoundaryCondition>().unwrap(), BoundaryCondition::Surface);
        assert!("Roof".parse::<FaceType>().is_err());
        assert_eq!(serde_json::to_value(BoundaryCondition::Ground).unwrap(), "Ground");
    }

    #[test]
    fn test_room_from_box() {
        let room = Room::from_box("office", 5.0, 10.0, 3.0, Point3::new(0.0, 0.0, 0.0)).unwrap();
        assert_eq!(room.faces.len(), 6);
        assert_eq!(room.faces[0].identifier, "office_Bottom");
        assert_eq!(room.faces[0].boundary_condition, BoundaryCondition::Ground);
        assert_eq!(room.faces[5].face_type, FaceType::RoofCeiling);
        assert_relative_eq!(room.faces[1].geometry.area(), 15.0, epsilon = 1e-9);
        assert_relative_eq!(room.faces[1].geometry.normal().y, -1.0, epsilon = 1e-9);
        assert_relative_eq!(room.faces[5].geometry.normal().z, 1.0, epsilon = 1e-9);
        assert_relative_eq!(room.faces[0].geometry.normal().z, -1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_model_traversal() {
        let mut room = Room::from_box("office", 5.0, 10.0, 3.0, Point3::origin()).unwrap();
        let front = room.face_mut("office_Front").unwrap();
        let mut window =
            Aperture::from_vertices("window", &[[1.0, 0.0, 1.0], [4.0, 0.0, 1.0], [4.0, 0.0, 2.0], [1.0, 0.0, 2.0]])
                .unwrap();
        window
            .shades
            .push(Shade::from_vertices("overhang", &[[1.0, 0.0, 2.0], [4.0, 0.0, 2.0], [4.0, -1.0, 2.0]]).unwrap());
        front.apertures.push(window);
        front
            .doors
            .push(Door::from_vertices("door", &[[4.5, 0.0, 0.0], [4.9, 0.0, 0.0], [4.9, 0.0, 2.0]]).unwrap());

        let mut model = Model::new("tiny_house").unwrap();
        model.rooms.push(room);
        model
            .orphaned_shades
            .push(Shade::from_vertices("tree", &[[0.0, -5.0, 0.0], [1.0, -5.0, 0.0], [1.0, -5.0, 4.0]]).unwrap());

        assert_eq!(model.faces().count(), 6);
        assert_eq!(model.apertures().count(), 1);
        assert_eq!(model.doors().count(), 1);
        let shades: Vec<&str> = model.shades().map(|s| s.identifier.as_str()).collect();
        assert_eq!(shades, vec!["overhang", "tree"]);
        assert!(model.room("office").is_some());
        assert!(Model::new("tiny house").is_err());
    }

    #[test]
    fn test_adjacency() {
        let mut face = Face::from_vertices(
            "wall_a",
            &[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 0.0, 1.0]],
            FaceType::Wall,
            BoundaryCondition::Outdoors,
        )
        .unwrap();
        face.set_adjacent("wall_b").unwrap();
        assert_eq!(face.boundary_condition, BoundaryCondition::Surface);
        assert_eq!(face.adjacent_identifier.as_deref(), Some("wall_b"));
    }
}
