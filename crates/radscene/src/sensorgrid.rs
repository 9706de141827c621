//! Sensor grids: positions and directions where irradiance is computed.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use radscene_geom::{
    point, reflect_point, reflect_vector, rotate_point, rotate_vector, scale_point, vector, Face3, Point3, Vec3,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};
use tracing::debug;

use crate::dict::{as_dict, check_type};
use crate::error::{RadianceError, Result};
use crate::typing::valid_rad_string;
use crate::value::format_number;

/// One sensor: a position and a direction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sensor {
    /// Position.
    #[serde(default)]
    pub pos: [f64; 3],
    /// Direction.
    #[serde(default = "up")]
    pub dir: [f64; 3],
}

fn up() -> [f64; 3] {
    [0.0, 0.0, 1.0]
}

fn coords(p: Point3) -> [f64; 3] {
    [p.x, p.y, p.z]
}

fn components(v: Vec3) -> [f64; 3] {
    [v.x, v.y, v.z]
}

impl Default for Sensor {
    fn default() -> Self {
        Self { pos: [0.0; 3], dir: up() }
    }
}

impl Sensor {
    /// Create a sensor.
    pub fn new(pos: [f64; 3], dir: [f64; 3]) -> Self {
        Self { pos, dir }
    }

    /// Read one `x y z dx dy dz` line. Missing trailing values take the
    /// defaults of a sensor at the origin facing up.
    pub fn from_raw_values(line: &str) -> Result<Self> {
        let numbers = line
            .split_whitespace()
            .map(|t| {
                t.parse::<f64>()
                    .map_err(|_| RadianceError::parse(line, format!("\"{}\" is not a number", t)))
            })
            .collect::<Result<Vec<_>>>()?;
        if numbers.len() > 6 {
            return Err(RadianceError::parse(line, "a sensor takes at most 6 values"));
        }
        let mut values = [0.0, 0.0, 0.0, 0.0, 0.0, 1.0];
        values[..numbers.len()].copy_from_slice(&numbers);
        Ok(Self::new([values[0], values[1], values[2]], [values[3], values[4], values[5]]))
    }

    /// `x y z dx dy dz`.
    pub fn to_radiance(&self) -> String {
        self.pos
            .iter()
            .chain(&self.dir)
            .map(|v| format_number(*v))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Translate the position.
    pub fn move_by(&mut self, offset: &Vec3) {
        self.pos = coords(point(self.pos) + offset);
    }

    /// Rotate position and direction by `angle` degrees about `axis` through `origin`.
    pub fn rotate(&mut self, axis: &Vec3, angle: f64, origin: &Point3) {
        let angle = angle.to_radians();
        self.pos = coords(rotate_point(&point(self.pos), axis, angle, origin));
        self.dir = components(rotate_vector(&vector(self.dir), axis, angle));
    }

    /// Rotate counterclockwise in the XY plane by `angle` degrees.
    pub fn rotate_xy(&mut self, angle: f64, origin: &Point3) {
        self.rotate(&Vec3::z(), angle, origin);
    }

    /// Reflect position and direction across a plane.
    pub fn reflect(&mut self, normal: &Vec3, origin: &Point3) {
        self.pos = coords(reflect_point(&point(self.pos), normal, origin));
        self.dir = components(reflect_vector(&vector(self.dir), normal));
    }

    /// Scale the position.
    pub fn scale(&mut self, factor: f64, origin: Option<&Point3>) {
        self.pos = coords(scale_point(&point(self.pos), factor, origin));
    }
}

impl fmt::Display for Sensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_radiance())
    }
}

/// A named list of sensors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorGrid {
    identifier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    display_name: Option<String>,
    sensors: Vec<Sensor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    room_identifier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    group_identifier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    light_path: Option<Vec<Vec<String>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    base_geometry: Option<Vec<Face3>>,
}

/// Validate each `/`-separated part of a group identifier.
pub(crate) fn valid_group_identifier(value: &str, kind: &str) -> Result<String> {
    value
        .split('/')
        .map(|part| valid_rad_string(part, kind))
        .collect::<Result<Vec<_>>>()
        .map(|parts| parts.join("/"))
}

impl SensorGrid {
    /// Create a grid.
    pub fn new(identifier: &str, sensors: Vec<Sensor>) -> Result<Self> {
        Ok(Self {
            identifier: valid_rad_string(identifier, "sensor grid identifier")?,
            display_name: None,
            sensors,
            room_identifier: None,
            group_identifier: None,
            light_path: None,
            base_geometry: None,
        })
    }

    /// Sensors at `positions`, all facing `plane_normal`.
    pub fn from_planar_positions(identifier: &str, positions: &[[f64; 3]], plane_normal: [f64; 3]) -> Result<Self> {
        let sensors = positions.iter().map(|p| Sensor::new(*p, plane_normal)).collect();
        Self::new(identifier, sensors)
    }

    /// Sensors from matching lists of positions and directions.
    pub fn from_position_and_direction(
        identifier: &str,
        positions: &[[f64; 3]],
        directions: &[[f64; 3]],
    ) -> Result<Self> {
        if positions.len() != directions.len() {
            return Err(RadianceError::InvalidState(format!(
                "{} positions do not match {} directions",
                positions.len(),
                directions.len()
            )));
        }
        let sensors = positions
            .iter()
            .zip(directions)
            .map(|(p, d)| Sensor::new(*p, *d))
            .collect();
        Self::new(identifier, sensors)
    }

    /// `dir_count` horizontal sensors per position, evenly spaced around a
    /// full circle starting from `start_vector`.
    pub fn from_positions_radial(
        identifier: &str,
        positions: &[[f64; 3]],
        dir_count: usize,
        start_vector: [f64; 3],
    ) -> Result<Self> {
        if dir_count == 0 {
            return Err(RadianceError::InvalidState("direction count must be at least 1".into()));
        }
        let step = std::f64::consts::TAU / dir_count as f64;
        let round = |v: f64, digits: i32| {
            let scale = 10f64.powi(digits);
            (v * scale).round() / scale
        };
        let directions: Vec<[f64; 3]> = (0..dir_count)
            .map(|i| {
                let v = rotate_vector(&vector(start_vector), &Vec3::z(), step * i as f64);
                [round(v.x, 5), round(v.y, 5), round(v.z, 3)]
            })
            .collect();
        let sensors = positions
            .iter()
            .flat_map(|p| directions.iter().map(move |d| Sensor::new(*p, *d)))
            .collect();
        Self::new(identifier, sensors)
    }

    /// Read a points file: one sensor per line, `#` lines skipped.
    ///
    /// `start_line` and `end_line` (inclusive) select a slice of the file.
    /// The identifier defaults to the file stem.
    pub fn from_file(
        path: impl AsRef<Path>,
        start_line: Option<usize>,
        end_line: Option<usize>,
        identifier: Option<&str>,
    ) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let start = start_line.unwrap_or(0);
        let take = match end_line {
            Some(end) => (end + 1).saturating_sub(start),
            None => usize::MAX,
        };
        let sensors = text
            .lines()
            .skip(start)
            .take(take)
            .filter(|line| !line.trim().is_empty() && !line.starts_with('#'))
            .map(Sensor::from_raw_values)
            .collect::<Result<Vec<_>>>()?;
        debug!(path = %path.display(), count = sensors.len(), "read sensor grid");
        Self::new(identifier.unwrap_or(&stem), sensors)
    }

    /// Identifier.
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Display name; the identifier when unset.
    pub fn display_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.identifier)
    }

    /// Set or reset the display name.
    pub fn set_display_name(&mut self, name: Option<String>) {
        self.display_name = name;
    }

    /// Sensors.
    pub fn sensors(&self) -> &[Sensor] {
        &self.sensors
    }

    /// Number of sensors.
    pub fn count(&self) -> usize {
        self.sensors.len()
    }

    /// Positions of the sensors.
    pub fn positions(&self) -> impl Iterator<Item = [f64; 3]> + '_ {
        self.sensors.iter().map(|s| s.pos)
    }

    /// Directions of the sensors.
    pub fn directions(&self) -> impl Iterator<Item = [f64; 3]> + '_ {
        self.sensors.iter().map(|s| s.dir)
    }

    /// Identifier of the room the grid belongs to.
    pub fn room_identifier(&self) -> Option<&str> {
        self.room_identifier.as_deref()
    }

    /// Set or reset the room identifier.
    pub fn set_room_identifier(&mut self, identifier: Option<String>) {
        self.room_identifier = identifier;
    }

    /// Group identifier; `/` separates nested groups.
    pub fn group_identifier(&self) -> Option<&str> {
        self.group_identifier.as_deref()
    }

    /// Set or reset the group identifier.
    pub fn set_group_identifier(&mut self, identifier: Option<&str>) -> Result<()> {
        self.group_identifier = identifier
            .map(|id| valid_group_identifier(id, "sensor grid group identifier"))
            .transpose()?;
        Ok(())
    }

    /// `group/identifier`, or the identifier without a group.
    pub fn full_identifier(&self) -> String {
        match &self.group_identifier {
            Some(group) if !group.is_empty() => format!("{}/{}", group, self.identifier),
            _ => self.identifier.clone(),
        }
    }

    /// Aperture group identifiers light passes through to reach the grid.
    pub fn light_path(&self) -> Option<&[Vec<String>]> {
        self.light_path.as_deref()
    }

    /// Set or reset the light path.
    pub fn set_light_path(&mut self, light_path: Option<Vec<Vec<String>>>) {
        self.light_path = light_path;
    }

    /// Faces the grid was generated from.
    pub fn base_geometry(&self) -> Option<&[Face3]> {
        self.base_geometry.as_deref()
    }

    /// Set or reset the base geometry.
    pub fn set_base_geometry(&mut self, faces: Option<Vec<Face3>>) {
        self.base_geometry = faces;
    }

    /// Summary used by simulation folders.
    pub fn info_dict(&self) -> JsonValue {
        let mut info = json!({
            "count": self.count(),
            "name": self.display_name(),
            "identifier": self.identifier,
            "group": self.group_identifier.clone().unwrap_or_default(),
            "full_id": self.full_identifier(),
        });
        if let Some(path) = &self.light_path {
            info["light_path"] = json!(path);
        }
        if let Some(group) = &self.group_identifier {
            info["group_identifier"] = json!(group);
        }
        info
    }

    /// One `x y z dx dy dz` line per sensor.
    pub fn to_radiance(&self) -> String {
        self.sensors
            .iter()
            .map(Sensor::to_radiance)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Write a `.pts` file, inside the group sub-folder unless `ignore_group`.
    pub fn to_file(
        &self,
        folder: impl AsRef<Path>,
        file_name: Option<&str>,
        mkdir: bool,
        ignore_group: bool,
    ) -> Result<PathBuf> {
        let mut name = file_name.map_or_else(|| self.identifier.clone(), str::to_string);
        if !name.ends_with(".pts") {
            name.push_str(".pts");
        }
        let mut folder = folder.as_ref().to_path_buf();
        let mut mkdir = mkdir;
        if let (false, Some(group)) = (ignore_group, &self.group_identifier) {
            folder = folder.join(group);
            mkdir = true;
        }
        if mkdir {
            fs::create_dir_all(&folder)?;
        }
        let path = folder.join(name);
        fs::write(&path, self.to_radiance() + "\n")?;
        Ok(path)
    }

    /// Translate every sensor and the base geometry.
    pub fn move_by(&mut self, offset: &Vec3) {
        self.sensors.iter_mut().for_each(|s| s.move_by(offset));
        self.map_base_geometry(|f| f.moved(offset));
    }

    /// Rotate by `angle` degrees about `axis` through `origin`.
    pub fn rotate(&mut self, axis: &Vec3, angle: f64, origin: &Point3) {
        self.sensors.iter_mut().for_each(|s| s.rotate(axis, angle, origin));
        self.map_base_geometry(|f| f.rotated(axis, angle.to_radians(), origin));
    }

    /// Rotate counterclockwise in the XY plane by `angle` degrees.
    pub fn rotate_xy(&mut self, angle: f64, origin: &Point3) {
        self.sensors.iter_mut().for_each(|s| s.rotate_xy(angle, origin));
        self.map_base_geometry(|f| f.rotated_xy(angle.to_radians(), origin));
    }

    /// Reflect across a plane.
    pub fn reflect(&mut self, normal: &Vec3, origin: &Point3) {
        self.sensors.iter_mut().for_each(|s| s.reflect(normal, origin));
        self.map_base_geometry(|f| f.reflected(normal, origin));
    }

    /// Scale about `origin`, or the world origin.
    pub fn scale(&mut self, factor: f64, origin: Option<&Point3>) {
        self.sensors.iter_mut().for_each(|s| s.scale(factor, origin));
        self.map_base_geometry(|f| f.scaled(factor, origin));
    }

    fn map_base_geometry(&mut self, f: impl Fn(&Face3) -> Face3) {
        if let Some(faces) = &mut self.base_geometry {
            *faces = faces.iter().map(f).collect();
        }
    }

    /// Dictionary form.
    pub fn to_dict(&self) -> Result<JsonValue> {
        let mut data = serde_json::to_value(self)?;
        if let JsonValue::Object(map) = &mut data {
            map.insert("type".into(), json!("SensorGrid"));
        }
        Ok(data)
    }

    /// Read a dictionary.
    pub fn from_dict(data: &JsonValue) -> Result<Self> {
        check_type(as_dict(data, "SensorGrid")?, "SensorGrid")?;
        let grid: SensorGrid = serde_json::from_value(data.clone())?;
        valid_rad_string(&grid.identifier, "sensor grid identifier")?;
        if let Some(group) = &grid.group_identifier {
            valid_group_identifier(group, "sensor grid group identifier")?;
        }
        Ok(grid)
    }
}

impl fmt::Display for SensorGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_radiance())
    }
}
