//! Radiance views (`rvu`/`rpict` view options).

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use radscene_geom::{point, reflect_point, reflect_vector, rotate_point, rotate_vector, scale_point, vector, Point3, Vec3};
use serde_json::{json, Value as JsonValue};
use tracing::{debug, warn};

use crate::dict::{as_dict, check_type, Dict, DictArgs};
use crate::error::{RadianceError, Result};
use crate::sensorgrid::valid_group_identifier;
use crate::typing::valid_rad_string;
use crate::value::format_number;

/// Projection of a view (`-vt`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ViewType {
    /// `v`: perspective.
    #[default]
    Perspective,
    /// `h`: hemispherical fisheye.
    Hemispherical,
    /// `l`: parallel.
    Parallel,
    /// `c`: cylindrical panorama.
    Cylindrical,
    /// `a`: angular fisheye.
    Angular,
    /// `s`: planisphere (stereographic) projection.
    Planisphere,
}

impl ViewType {
    /// The single-letter code.
    pub fn letter(self) -> char {
        match self {
            ViewType::Perspective => 'v',
            ViewType::Hemispherical => 'h',
            ViewType::Parallel => 'l',
            ViewType::Cylindrical => 'c',
            ViewType::Angular => 'a',
            ViewType::Planisphere => 's',
        }
    }

    /// Whether this is one of the fisheye projections.
    pub fn is_fisheye(self) -> bool {
        matches!(self, ViewType::Hemispherical | ViewType::Angular | ViewType::Planisphere)
    }
}

impl FromStr for ViewType {
    type Err = RadianceError;

    /// Accepts the bare letter (`v`) or the option form (`vtv`).
    fn from_str(s: &str) -> Result<Self> {
        match s.chars().last() {
            Some('v') => Ok(ViewType::Perspective),
            Some('h') => Ok(ViewType::Hemispherical),
            Some('l') => Ok(ViewType::Parallel),
            Some('c') => Ok(ViewType::Cylindrical),
            Some('a') => Ok(ViewType::Angular),
            Some('s') => Ok(ViewType::Planisphere),
            _ => Err(RadianceError::UnknownType(format!("view type \"{}\"", s))),
        }
    }
}

impl fmt::Display for ViewType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// A camera: position, orientation, projection and field of view.
#[derive(Debug, Clone, PartialEq)]
pub struct View {
    identifier: String,
    display_name: Option<String>,
    position: [f64; 3],
    direction: [f64; 3],
    up_vector: [f64; 3],
    view_type: ViewType,
    h_size: f64,
    v_size: f64,
    shift: Option<f64>,
    lift: Option<f64>,
    fore_clip: Option<f64>,
    aft_clip: Option<f64>,
    room_identifier: Option<String>,
    group_identifier: Option<String>,
    light_path: Option<Vec<Vec<String>>>,
}

fn triple(v: [f64; 3]) -> String {
    v.iter().map(|c| format_number(*c)).collect::<Vec<_>>().join(" ")
}

fn coords(p: Point3) -> [f64; 3] {
    [p.x, p.y, p.z]
}

fn components(v: Vec3) -> [f64; 3] {
    [v.x, v.y, v.z]
}

impl View {
    /// A 60x60 degree perspective view at the origin looking up +Z.
    pub fn new(identifier: &str) -> Result<Self> {
        Ok(Self {
            identifier: valid_rad_string(identifier, "view identifier")?,
            display_name: None,
            position: [0.0, 0.0, 0.0],
            direction: [0.0, 0.0, 1.0],
            up_vector: [0.0, 1.0, 0.0],
            view_type: ViewType::Perspective,
            h_size: 60.0,
            v_size: 60.0,
            shift: None,
            lift: None,
            fore_clip: None,
            aft_clip: None,
            room_identifier: None,
            group_identifier: None,
            light_path: None,
        })
    }

    /// A view with the given orientation.
    pub fn with_orientation(identifier: &str, position: [f64; 3], direction: [f64; 3], up_vector: [f64; 3]) -> Result<Self> {
        let mut view = Self::new(identifier)?;
        view.position = position;
        view.direction = direction;
        view.up_vector = up_vector;
        Ok(view)
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

    /// View point (`-vp`).
    pub fn position(&self) -> [f64; 3] {
        self.position
    }

    /// Set the view point.
    pub fn set_position(&mut self, position: [f64; 3]) {
        self.position = position;
    }

    /// View direction (`-vd`).
    pub fn direction(&self) -> [f64; 3] {
        self.direction
    }

    /// Set the view direction.
    pub fn set_direction(&mut self, direction: [f64; 3]) {
        self.direction = direction;
    }

    /// View up vector (`-vu`).
    pub fn up_vector(&self) -> [f64; 3] {
        self.up_vector
    }

    /// Set the up vector.
    pub fn set_up_vector(&mut self, up_vector: [f64; 3]) {
        self.up_vector = up_vector;
    }

    /// Projection type (`-vt`).
    pub fn view_type(&self) -> ViewType {
        self.view_type
    }

    /// Set the projection type.
    ///
    /// Fisheye types force both sizes to 180 degrees. A perspective view
    /// requires both sizes below 180 degrees.
    pub fn set_view_type(&mut self, view_type: ViewType) -> Result<()> {
        if view_type.is_fisheye() {
            if self.h_size != 180.0 || self.v_size != 180.0 {
                debug!(view = %self.identifier, "fisheye view sizes set to 180");
            }
            self.h_size = 180.0;
            self.v_size = 180.0;
        } else if view_type == ViewType::Perspective {
            for (name, size) in [("-vh", self.h_size), ("-vv", self.v_size)] {
                if size >= 180.0 {
                    return Err(RadianceError::OutOfRange {
                        name: format!("perspective view size {}", name),
                        value: size,
                        min: 0.0,
                        max: 180.0,
                    });
                }
            }
        }
        self.view_type = view_type;
        Ok(())
    }

    /// Whether the projection is a fisheye.
    pub fn is_fisheye(&self) -> bool {
        self.view_type.is_fisheye()
    }

    /// Horizontal size in degrees (`-vh`).
    pub fn h_size(&self) -> f64 {
        self.h_size
    }

    /// Set the horizontal size; `None` resets it to 60.
    pub fn set_h_size(&mut self, value: Option<f64>) -> Result<()> {
        self.h_size = non_negative(value.unwrap_or(60.0), "view horizontal size")?;
        Ok(())
    }

    /// Vertical size in degrees (`-vv`).
    pub fn v_size(&self) -> f64 {
        self.v_size
    }

    /// Set the vertical size; `None` resets it to 60.
    pub fn set_v_size(&mut self, value: Option<f64>) -> Result<()> {
        self.v_size = non_negative(value.unwrap_or(60.0), "view vertical size")?;
        Ok(())
    }

    /// Image shift to the right (`-vs`).
    pub fn shift(&self) -> Option<f64> {
        self.shift
    }

    /// Set or reset the shift.
    pub fn set_shift(&mut self, value: Option<f64>) {
        self.shift = value;
    }

    /// Image lift upwards (`-vl`).
    pub fn lift(&self) -> Option<f64> {
        self.lift
    }

    /// Set or reset the lift.
    pub fn set_lift(&mut self, value: Option<f64>) {
        self.lift = value;
    }

    /// Fore clipping distance (`-vo`).
    pub fn fore_clip(&self) -> Option<f64> {
        self.fore_clip
    }

    /// Set or reset the fore clip.
    pub fn set_fore_clip(&mut self, value: Option<f64>) {
        self.fore_clip = value;
    }

    /// Aft clipping distance (`-va`).
    pub fn aft_clip(&self) -> Option<f64> {
        self.aft_clip
    }

    /// Set or reset the aft clip.
    pub fn set_aft_clip(&mut self, value: Option<f64>) {
        self.aft_clip = value;
    }

    /// Identifier of the room the view belongs to.
    pub fn room_identifier(&self) -> Option<&str> {
        self.room_identifier.as_deref()
    }

    /// Set or reset the room identifier.
    pub fn set_room_identifier(&mut self, identifier: Option<&str>) -> Result<()> {
        self.room_identifier = identifier
            .map(|id| valid_rad_string(id, "view room identifier"))
            .transpose()?;
        Ok(())
    }

    /// Group identifier; `/` separates nested groups.
    pub fn group_identifier(&self) -> Option<&str> {
        self.group_identifier.as_deref()
    }

    /// Set or reset the group identifier.
    pub fn set_group_identifier(&mut self, identifier: Option<&str>) -> Result<()> {
        self.group_identifier = identifier
            .map(|id| valid_group_identifier(id, "view group identifier"))
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

    /// Aperture group identifiers light passes through to reach the view.
    pub fn light_path(&self) -> Option<&[Vec<String>]> {
        self.light_path.as_deref()
    }

    /// Set or reset the light path.
    pub fn set_light_path(&mut self, light_path: Option<Vec<Vec<String>>>) {
        self.light_path = light_path;
    }

    /// View options on one line, unset optional options omitted.
    pub fn to_radiance(&self) -> String {
        let mut options = vec![
            format!("-vt{}", self.view_type),
            format!("-vp {}", triple(self.position)),
            format!("-vd {}", triple(self.direction)),
            format!("-vu {}", triple(self.up_vector)),
            format!("-vh {}", format_number(self.h_size)),
            format!("-vv {}", format_number(self.v_size)),
        ];
        let optional = [
            ("-vs", self.shift),
            ("-vl", self.lift),
            ("-vo", self.fore_clip),
            ("-va", self.aft_clip),
        ];
        options.extend(
            optional
                .iter()
                .filter_map(|(name, value)| value.map(|v| format!("{} {}", name, format_number(v)))),
        );
        options.join(" ")
    }

    /// Parse view options such as `rvu -vtv -vp 0 0 0 -vd 0 1 0`.
    ///
    /// A leading command name is skipped. Options that are not view options
    /// are ignored with a warning.
    pub fn from_string(identifier: &str, text: &str) -> Result<Self> {
        let mut view = Self::new(identifier)?;
        let mut view_type = None;
        let mut h_size = None;
        let mut v_size = None;
        for (option, values) in parse_options(text)? {
            let expect = |count: usize| option_values(text, &option, &values, count);
            match option.as_str() {
                "vp" => view.position = as_triple(expect(3)?),
                "vd" => view.direction = as_triple(expect(3)?),
                "vu" => view.up_vector = as_triple(expect(3)?),
                "vh" => h_size = Some(expect(1)?[0]),
                "vv" => v_size = Some(expect(1)?[0]),
                "vs" => view.shift = Some(expect(1)?[0]),
                "vl" => view.lift = Some(expect(1)?[0]),
                "vo" => view.fore_clip = Some(expect(1)?[0]),
                "va" => view.aft_clip = Some(expect(1)?[0]),
                opt if opt.len() == 3 && opt.starts_with("vt") => view_type = Some(opt.parse::<ViewType>()?),
                other => warn!(option = other, "not a view option; ignored"),
            }
        }
        view.set_h_size(h_size)?;
        view.set_v_size(v_size)?;
        if let Some(view_type) = view_type {
            view.set_view_type(view_type)?;
        }
        Ok(view)
    }

    /// Read a view file; the content must start with `rvu`. The identifier
    /// defaults to the file stem.
    pub fn from_file(path: impl AsRef<Path>, identifier: Option<&str>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let text = text.trim_end();
        if !text.starts_with("rvu") {
            return Err(RadianceError::parse(
                path.display().to_string(),
                format!("view file must start with rvu, not \"{}\"", text.chars().take(3).collect::<String>()),
            ));
        }
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::from_string(identifier.unwrap_or(&stem), text)
    }

    /// Write `rvu <options>` to `<folder>/<file_name>`, defaulting to `<identifier>.vf`.
    pub fn to_file(&self, folder: impl AsRef<Path>, file_name: Option<&str>, mkdir: bool) -> Result<PathBuf> {
        let folder = folder.as_ref();
        if mkdir {
            fs::create_dir_all(folder)?;
        }
        let name = file_name.map_or_else(|| format!("{}.vf", self.identifier), str::to_string);
        let path = folder.join(name);
        fs::write(&path, format!("rvu {}", self.to_radiance()))?;
        Ok(path)
    }

    /// Image resolution matching the view aspect, as `vwrays -d` reports it.
    /// Both resolutions default to 512.
    pub fn dimension_x_y(&self, x_res: Option<u32>, y_res: Option<u32>) -> (u32, u32) {
        let x_res = x_res.unwrap_or(512);
        let y_res = y_res.unwrap_or(512);
        if self.is_fisheye() {
            let side = x_res.min(y_res);
            return (side, side);
        }
        let ratio = if self.view_type == ViewType::Perspective {
            (self.h_size.to_radians() / 2.0).tan() / (self.v_size.to_radians() / 2.0).tan()
        } else {
            self.h_size / self.v_size
        };
        let scaled_x = || (ratio * y_res as f64).round() as u32;
        let scaled_y = || (x_res as f64 / ratio).round() as u32;
        if y_res <= x_res {
            let new_x = scaled_x();
            if new_x <= x_res {
                (new_x, y_res)
            } else {
                (x_res, scaled_y())
            }
        } else {
            let new_y = scaled_y();
            if new_y <= y_res {
                (x_res, new_y)
            } else {
                (scaled_x(), y_res)
            }
        }
    }

    /// `-x X -y Y -ld-`, with `-ld+` when a clipping distance is set.
    pub fn dimension(&self, x_res: Option<u32>, y_res: Option<u32>) -> String {
        let (x, y) = self.dimension_x_y(x_res, y_res);
        let clipped = self.fore_clip.is_some() || self.aft_clip.is_some();
        format!("-x {} -y {} -ld{}", x, y, if clipped { '+' } else { '-' })
    }

    /// Split the view into `x_div_count * y_div_count` tiles, row by row,
    /// using shift and lift to place each tile.
    ///
    /// Cylindrical views cannot be split and come back as a single view.
    pub fn grid(&self, x_div_count: usize, y_div_count: usize) -> Result<Vec<View>> {
        if x_div_count == 0 || y_div_count == 0 {
            return Err(RadianceError::InvalidState("view grid division count must be at least 1".into()));
        }
        if x_div_count == 1 && y_div_count == 1 {
            return Ok(vec![self.clone()]);
        }
        let (x_div, y_div) = (x_div_count as f64, y_div_count as f64);
        let half = |size: f64| (size / 2.0).to_radians();
        let (h_size, v_size) = match self.view_type {
            ViewType::Parallel => (self.h_size / x_div, self.v_size / y_div),
            ViewType::Perspective => (
                2.0 * (half(self.h_size).tan() / x_div).atan().to_degrees(),
                2.0 * (half(self.v_size).tan() / y_div).atan().to_degrees(),
            ),
            t if t.is_fisheye() => (
                2.0 * (half(self.h_size).sin() / x_div).asin().to_degrees(),
                2.0 * (half(self.v_size).sin() / y_div).asin().to_degrees(),
            ),
            t => {
                warn!(view = %self.identifier, view_type = %t, "grid views are not supported");
                return Ok(vec![self.clone()]);
            }
        };
        let offset = |index: usize, count: usize| {
            if count == 1 {
                0.0
            } else {
                let span = (count - 1) as f64;
                (index as f64 / span - 0.5) * span
            }
        };
        (0..x_div_count * y_div_count)
            .map(|i| {
                let mut tile = self.clone();
                tile.identifier = valid_rad_string(&format!("{}_{}", self.identifier, i), "view identifier")?;
                tile.display_name = Some(format!("{}_{}", self.display_name(), i));
                tile.h_size = h_size;
                tile.v_size = v_size;
                tile.shift = Some(offset(i % x_div_count, x_div_count));
                tile.lift = Some(offset(i / x_div_count, y_div_count));
                Ok(tile)
            })
            .collect()
    }

    /// Summary used by simulation folders.
    pub fn info_dict(&self) -> JsonValue {
        let mut info = Dict::new();
        if let Some(path) = &self.light_path {
            info.insert("light_path".into(), json!(path));
        }
        if let Some(group) = &self.group_identifier {
            info.insert("group_identifier".into(), json!(group));
        }
        JsonValue::Object(info)
    }

    /// Translate the position.
    pub fn move_by(&mut self, offset: &Vec3) {
        self.position = coords(point(self.position) + offset);
    }

    /// Rotate by `angle` degrees about `axis` (default: the up vector)
    /// through `origin` (default: the position).
    pub fn rotate(&mut self, angle: f64, axis: Option<&Vec3>, origin: Option<&Point3>) {
        let axis = axis.copied().unwrap_or_else(|| vector(self.up_vector));
        let origin = origin.copied().unwrap_or_else(|| point(self.position));
        let angle = angle.to_radians();
        self.position = coords(rotate_point(&point(self.position), &axis, angle, &origin));
        self.direction = components(rotate_vector(&vector(self.direction), &axis, angle));
        self.up_vector = components(rotate_vector(&vector(self.up_vector), &axis, angle));
    }

    /// Rotate counterclockwise in the XY plane by `angle` degrees.
    pub fn rotate_xy(&mut self, angle: f64, origin: Option<&Point3>) {
        self.rotate(angle, Some(&Vec3::z()), origin);
    }

    /// Reflect across the plane with `normal` through `origin`.
    pub fn reflect(&mut self, normal: &Vec3, origin: &Point3) {
        self.position = coords(reflect_point(&point(self.position), normal, origin));
        self.direction = components(reflect_vector(&vector(self.direction), normal));
        self.up_vector = components(reflect_vector(&vector(self.up_vector), normal));
    }

    /// Scale the position about `origin` (default: the world origin); the
    /// direction and up vectors are scaled too.
    pub fn scale(&mut self, factor: f64, origin: Option<&Point3>) {
        self.position = coords(scale_point(&point(self.position), factor, origin));
        self.direction = components(vector(self.direction) * factor);
        self.up_vector = components(vector(self.up_vector) * factor);
    }

    /// Dictionary form. Every option key is written, unset ones as `null`.
    pub fn to_dict(&self) -> JsonValue {
        let mut data = json!({
            "type": "View",
            "identifier": self.identifier,
            "position": self.position,
            "direction": self.direction,
            "up_vector": self.up_vector,
            "h_size": self.h_size,
            "v_size": self.v_size,
            "shift": self.shift,
            "lift": self.lift,
            "view_type": self.view_type.to_string(),
            "fore_clip": self.fore_clip,
            "aft_clip": self.aft_clip,
        });
        let optional = [
            ("display_name", self.display_name.as_ref().map(|v| json!(v))),
            ("room_identifier", self.room_identifier.as_ref().map(|v| json!(v))),
            ("light_path", self.light_path.as_ref().map(|v| json!(v))),
            ("group_identifier", self.group_identifier.as_ref().map(|v| json!(v))),
        ];
        for (key, value) in optional {
            if let Some(value) = value {
                data[key] = value;
            }
        }
        data
    }

    /// Read a dictionary; missing or `null` options take their defaults.
    pub fn from_dict(data: &JsonValue) -> Result<Self> {
        let dict = as_dict(data, "View")?;
        check_type(dict, "View")?;
        let mut view = Self::new(dict.string("identifier", "View")?)?;
        if let Some(p) = dict.opt_triple("position", "View")? {
            view.position = p;
        }
        if let Some(d) = dict.opt_triple("direction", "View")? {
            view.direction = d;
        }
        if let Some(u) = dict.opt_triple("up_vector", "View")? {
            view.up_vector = u;
        }
        view.set_h_size(dict.opt_real("h_size", "View")?)?;
        view.set_v_size(dict.opt_real("v_size", "View")?)?;
        view.shift = dict.opt_real("shift", "View")?;
        view.lift = dict.opt_real("lift", "View")?;
        view.fore_clip = dict.opt_real("fore_clip", "View")?;
        view.aft_clip = dict.opt_real("aft_clip", "View")?;
        if let Some(view_type) = dict.opt_string("view_type") {
            view.set_view_type(view_type.parse()?)?;
        }
        view.display_name = dict.opt_string("display_name").map(str::to_string);
        view.set_room_identifier(dict.opt_string("room_identifier"))?;
        view.set_group_identifier(dict.opt_string("group_identifier"))?;
        if let Some(path) = dict.get("light_path").filter(|v| !v.is_null()) {
            view.light_path = Some(serde_json::from_value(path.clone())?);
        }
        Ok(view)
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_radiance())
    }
}

fn non_negative(value: f64, name: &str) -> Result<f64> {
    if value < 0.0 {
        return Err(RadianceError::OutOfRange {
            name: name.to_string(),
            value,
            min: 0.0,
            max: f64::INFINITY,
        });
    }
    Ok(value)
}

fn option_values<'a>(text: &str, option: &str, values: &'a [f64], count: usize) -> Result<&'a [f64]> {
    if values.len() != count {
        return Err(RadianceError::parse(
            text,
            format!("-{} takes {} value(s), got {}", option, count, values.len()),
        ));
    }
    Ok(values)
}

fn as_triple(values: &[f64]) -> [f64; 3] {
    [values[0], values[1], values[2]]
}

/// Split `-name v1 v2 ...` options. Negative numbers are values, not options.
pub(crate) fn parse_options(text: &str) -> Result<Vec<(String, Vec<f64>)>> {
    let mut options: Vec<(String, Vec<f64>)> = Vec::new();
    for token in text.split_whitespace() {
        match (token.parse::<f64>(), token.strip_prefix('-')) {
            (Ok(number), _) => match options.last_mut() {
                Some((_, values)) => values.push(number),
                None => return Err(RadianceError::parse(text, format!("value {} has no option", token))),
            },
            (Err(_), Some(name)) => options.push((name.to_string(), Vec::new())),
            (Err(_), None) if options.is_empty() => continue,
            (Err(_), None) => {
                return Err(RadianceError::parse(text, format!("\"{}\" is not a number", token)));
            }
        }
    }
    Ok(options)
}
