//! BSDF and aBSDF: materials backed by an XML transmission data file.
//!
//! Handles:
//! - file validation (must exist, `.xml` extension)
//! - angle basis detection from the `IncidentDataStructure` element
//! - optional front/back diffuse reflectance and diffuse transmittance
//! - dictionary form with the XML text embedded as `bsdf_data`

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde_json::json;
use tracing::debug;

use crate::dict::{reals, Dict, DictArgs, FieldContext};
use crate::error::{RadianceError, Result};
use crate::primitive::PrimitiveParams;
use crate::typing::clean_rad_string;
use crate::value::{line_to_f64, Value, Values};

/// Lines searched for the incident data structure and the basis name.
const MAX_HEADER_LINES: usize = 2000;

const DEFAULT_UP: [f64; 3] = [0.01, 0.01, 1.0];

/// Angle basis of a BSDF data file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum AngleBasis {
    KlemsFull,
    KlemsHalf,
    KlemsQuarter,
    TensorTree,
}

impl AngleBasis {
    /// Name as written in data files.
    pub fn as_str(self) -> &'static str {
        match self {
            AngleBasis::KlemsFull => "Klems Full",
            AngleBasis::KlemsHalf => "Klems Half",
            AngleBasis::KlemsQuarter => "Klems Quarter",
            AngleBasis::TensorTree => "TensorTree",
        }
    }
}

impl fmt::Display for AngleBasis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AngleBasis {
    type Err = RadianceError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Klems Full" => Ok(AngleBasis::KlemsFull),
            "Klems Half" => Ok(AngleBasis::KlemsHalf),
            "Klems Quarter" => Ok(AngleBasis::KlemsQuarter),
            "TensorTree" => Ok(AngleBasis::TensorTree),
            other => Err(RadianceError::Bsdf(format!(
                "{} is not a valid angle basis; use Klems Full, Klems Half, Klems Quarter or TensorTree",
                other
            ))),
        }
    }
}

fn element_text<'a>(line: &'a str, tag: &str) -> Option<&'a str> {
    let open = format!("<{}>", tag);
    let close = format!("</{}>", tag);
    let rest = line.trim().strip_prefix(open.as_str())?;
    Some(rest.split(close.as_str()).next().unwrap_or(rest).trim())
}

/// Read the angle basis from the header of a BSDF data file.
pub fn find_angle_basis(path: impl AsRef<Path>) -> Result<AngleBasis> {
    let text = fs::read_to_string(path.as_ref())?;
    let mut lines = text.lines().take(MAX_HEADER_LINES);
    let structure = lines
        .by_ref()
        .find_map(|line| element_text(line, "IncidentDataStructure"))
        .ok_or_else(|| {
            RadianceError::Bsdf(format!(
                "Failed to find IncidentDataStructure in first {} lines of {}",
                MAX_HEADER_LINES,
                path.as_ref().display()
            ))
        })?;
    if structure.starts_with("TensorTree") {
        return Ok(AngleBasis::TensorTree);
    }
    if !structure.eq_ignore_ascii_case("columns") {
        return Err(RadianceError::Bsdf(format!("Unknown IncidentDataStructure: {}", structure)));
    }
    let name = lines
        .find_map(|line| element_text(line, "AngleBasisName"))
        .ok_or_else(|| {
            RadianceError::Bsdf(format!(
                "Failed to find AngleBasisName in first {} lines of {}",
                MAX_HEADER_LINES,
                path.as_ref().display()
            ))
        })?;
    name.replace("LBNL/", "").trim().parse()
}

/// BSDF material.
#[derive(Debug, Clone, PartialEq)]
pub struct Bsdf {
    /// Path to the XML data file.
    pub bsdf_file: PathBuf,
    /// Up orientation of the data.
    pub up_orientation: [f64; 3],
    /// Thickness of the material; unused by aBSDF.
    pub thickness: f64,
    /// Function file for the up vector and thickness; `.` for none.
    pub function_file: String,
    /// Optional transform scaling the thickness and reorienting the up vector.
    pub transform: Option<String>,
    /// Angle basis detected from the data file.
    pub angle_basis: Option<AngleBasis>,
    /// Front diffuse reflectance.
    pub front_diffuse_reflectance: Option<[f64; 3]>,
    /// Back diffuse reflectance; requires a front reflectance.
    pub back_diffuse_reflectance: Option<[f64; 3]>,
    /// Diffuse transmittance; requires a back reflectance.
    pub diffuse_transmittance: Option<[f64; 3]>,
}

/// aBSDF material: a BSDF with peak extraction and no thickness.
#[derive(Debug, Clone, PartialEq)]
pub struct ABsdf(pub Bsdf);

impl Bsdf {
    /// Create from a data file with default orientation and no thickness.
    pub fn new(bsdf_file: impl Into<PathBuf>) -> Result<Self> {
        let bsdf_file = bsdf_file.into();
        check_file(&bsdf_file)?;
        let angle_basis = Some(find_angle_basis(&bsdf_file)?);
        Ok(Self {
            bsdf_file,
            up_orientation: DEFAULT_UP,
            thickness: 0.0,
            function_file: ".".into(),
            transform: None,
            angle_basis,
            front_diffuse_reflectance: None,
            back_diffuse_reflectance: None,
            diffuse_transmittance: None,
        })
    }

    /// Identifier derived from the data file name.
    pub fn default_identifier(&self) -> String {
        let stem = self
            .bsdf_file
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        clean_rad_string(&stem)
    }

    /// The data file path as written in scene text: forward slashes, and a
    /// `./` prefix for relative paths.
    pub fn file_token(&self) -> String {
        let path = self.bsdf_file.to_string_lossy().replace('\\', "/");
        if self.bsdf_file.is_absolute() {
            return path;
        }
        let mut relative = path.as_str();
        while let Some(rest) = relative.strip_prefix("./") {
            relative = rest;
        }
        format!("./{}", relative)
    }

    fn check(&self) -> Result<()> {
        check_file(&self.bsdf_file)?;
        if self.back_diffuse_reflectance.is_some() && self.front_diffuse_reflectance.is_none() {
            return Err(RadianceError::InvalidState(
                "back diffuse reflectance requires a front diffuse reflectance".into(),
            ));
        }
        if self.diffuse_transmittance.is_some() && self.back_diffuse_reflectance.is_none() {
            return Err(RadianceError::InvalidState(
                "diffuse transmittance requires a back diffuse reflectance".into(),
            ));
        }
        Ok(())
    }

    fn extra_values(&self) -> Vec<Value> {
        [
            self.front_diffuse_reflectance,
            self.back_diffuse_reflectance,
            self.diffuse_transmittance,
        ]
        .into_iter()
        .map_while(|rgb| rgb)
        .flatten()
        .map(Value::Number)
        .collect()
    }

    fn values_with(&self, thickness: bool) -> Values {
        let mut line = Vec::new();
        if thickness {
            line.push(Value::Number(self.thickness));
        }
        line.push(Value::Text(self.file_token()));
        line.extend(self.up_orientation.iter().map(|v| Value::Number(*v)));
        line.push(Value::Text(self.function_file.clone()));
        if let Some(transform) = &self.transform {
            line.push(Value::Text(transform.clone()));
        }
        [line, Vec::new(), self.extra_values()]
    }

    fn from_values_with(values: &Values, name: &str, thickness: bool) -> Result<Self> {
        let line = &values[0];
        let offset = usize::from(thickness);
        if line.len() != 5 + offset && line.len() != 6 + offset {
            return Err(RadianceError::parse(
                name,
                format!("BSDF string arguments hold {} values; expected {} or {}", line.len(), 5 + offset, 6 + offset),
            ));
        }
        let thickness = if thickness {
            line_to_f64(&line[..1], name)?[0]
        } else {
            0.0
        };
        let up = line_to_f64(&line[offset + 1..offset + 4], name)?;
        let mut bsdf = Bsdf::new(line[offset].to_string())?;
        bsdf.thickness = thickness;
        bsdf.up_orientation = [up[0], up[1], up[2]];
        bsdf.function_file = line[offset + 4].to_string();
        bsdf.transform = line.get(offset + 5).map(Value::to_string);

        if !values[2].is_empty() {
            let extra = reals(values, 2, &[3, 6, 9], name)?;
            let mut chunks = extra.chunks(3).map(|c| [c[0], c[1], c[2]]);
            bsdf.front_diffuse_reflectance = chunks.next();
            bsdf.back_diffuse_reflectance = chunks.next();
            bsdf.diffuse_transmittance = chunks.next();
        }
        Ok(bsdf)
    }

    fn write_fields_with(&self, dict: &mut Dict, thickness: bool) -> Result<()> {
        let bsdf_data = fs::read_to_string(&self.bsdf_file)?;
        dict.insert("up_orientation".into(), json!(self.up_orientation));
        if thickness {
            dict.insert("thickness".into(), json!(self.thickness));
        }
        dict.insert("function_file".into(), json!(self.function_file));
        dict.insert("transform".into(), json!(self.transform));
        dict.insert("bsdf_data".into(), json!(bsdf_data));
        let optional = [
            ("front_diffuse_reflectance", self.front_diffuse_reflectance),
            ("back_diffuse_reflectance", self.back_diffuse_reflectance),
            ("diffuse_transmittance", self.diffuse_transmittance),
        ];
        for (key, rgb) in optional.into_iter().map_while(|(k, v)| v.map(|v| (k, v))) {
            dict.insert(key.into(), json!(rgb));
        }
        Ok(())
    }

    /// Materialize the embedded XML under the configured BSDF folder.
    fn from_fields_with(dict: &Dict, ctx: &FieldContext<'_>, thickness: bool) -> Result<Self> {
        let data = dict.string("bsdf_data", ctx.name)?;
        fs::create_dir_all(&ctx.config.bsdf_folder)?;
        let path = ctx.config.bsdf_folder.join(format!("{}.xml", ctx.name));
        fs::write(&path, data)?;
        debug!(path = %path.display(), "wrote BSDF data");

        let mut bsdf = Bsdf::new(path)?;
        bsdf.up_orientation = dict.opt_triple("up_orientation", ctx.name)?.unwrap_or(DEFAULT_UP);
        if thickness {
            bsdf.thickness = dict.opt_real("thickness", ctx.name)?.unwrap_or(0.0);
        }
        if let Some(function_file) = dict.opt_string("function_file") {
            bsdf.function_file = function_file.to_string();
        }
        bsdf.transform = dict.opt_string("transform").map(str::to_string);
        bsdf.front_diffuse_reflectance = dict.opt_triple("front_diffuse_reflectance", ctx.name)?;
        if bsdf.front_diffuse_reflectance.is_some() {
            bsdf.back_diffuse_reflectance = dict.opt_triple("back_diffuse_reflectance", ctx.name)?;
            if bsdf.back_diffuse_reflectance.is_some() {
                bsdf.diffuse_transmittance = dict.opt_triple("diffuse_transmittance", ctx.name)?;
            }
        }
        Ok(bsdf)
    }
}

fn check_file(path: &Path) -> Result<()> {
    if !path.is_file() {
        return Err(RadianceError::Bsdf(format!("No such file at: {}", path.display())));
    }
    let is_xml = path
        .extension()
        .map_or(false, |ext| ext.eq_ignore_ascii_case("xml"));
    if !is_xml {
        return Err(RadianceError::Bsdf(format!(
            "BSDF file must be an xml file: {}",
            path.display()
        )));
    }
    Ok(())
}

impl PrimitiveParams for Bsdf {
    fn validate(&self) -> Result<()> {
        self.check()
    }

    fn values(&self) -> Values {
        self.values_with(true)
    }

    fn from_values(values: &Values, name: &str) -> Result<Self> {
        Self::from_values_with(values, name, true)
    }

    fn write_fields(&self, dict: &mut Dict) -> Result<()> {
        self.write_fields_with(dict, true)
    }

    fn from_fields(dict: &Dict, ctx: &FieldContext<'_>) -> Result<Self> {
        Self::from_fields_with(dict, ctx, true)
    }
}

impl ABsdf {
    /// Create from a data file with default orientation.
    pub fn new(bsdf_file: impl Into<PathBuf>) -> Result<Self> {
        Ok(ABsdf(Bsdf::new(bsdf_file)?))
    }
}

impl PrimitiveParams for ABsdf {
    fn validate(&self) -> Result<()> {
        self.0.check()
    }

    fn values(&self) -> Values {
        self.0.values_with(false)
    }

    fn from_values(values: &Values, name: &str) -> Result<Self> {
        Bsdf::from_values_with(values, name, false).map(ABsdf)
    }

    fn write_fields(&self, dict: &mut Dict) -> Result<()> {
        self.0.write_fields_with(dict, false)
    }

    fn from_fields(dict: &Dict, ctx: &FieldContext<'_>) -> Result<Self> {
        Bsdf::from_fields_with(dict, ctx, false).map(ABsdf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::primitive::{Primitive, PrimitiveKind};

    const KLEMS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<WindowElement xmlns="http://windows.lbl.gov">
<Optical>
<Layer>
<WavelengthData>
<WavelengthDataBlock>
    <WavelengthDataDirection>Transmission Front</WavelengthDataDirection>
    <ColumnAngleBasis>LBNL/Klems Full</ColumnAngleBasis>
    <RowAngleBasis>LBNL/Klems Full</RowAngleBasis>
    <ScatteringDataType>BTDF</ScatteringDataType>
</WavelengthDataBlock>
</WavelengthData>
<DataDefinition>
    <IncidentDataStructure>Columns</IncidentDataStructure>
    <AngleBasis>
        <AngleBasisName>LBNL/Klems Full</AngleBasisName>
    </AngleBasis>
</DataDefinition>
</Layer>
</Optical>
</WindowElement>
"#;

    const TENSOR_XML: &str = "<WindowElement>\n<IncidentDataStructure>TensorTree4</IncidentDataStructure>\n</WindowElement>\n";

    fn write_xml(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_angle_basis() {
        let dir = tempfile::tempdir().unwrap();
        let klems = write_xml(dir.path(), "clear.xml", KLEMS_XML);
        let tensor = write_xml(dir.path(), "tt.xml", TENSOR_XML);
        assert_eq!(find_angle_basis(&klems).unwrap(), AngleBasis::KlemsFull);
        assert_eq!(find_angle_basis(&tensor).unwrap(), AngleBasis::TensorTree);
        let bad = write_xml(dir.path(), "bad.xml", "<IncidentDataStructure>Rows</IncidentDataStructure>");
        assert!(matches!(find_angle_basis(&bad), Err(RadianceError::Bsdf(_))));
    }

    #[test]
    fn test_file_checks() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Bsdf::new(dir.path().join("missing.xml")).is_err());
        let txt = write_xml(dir.path(), "clear.txt", KLEMS_XML);
        assert!(matches!(Bsdf::new(txt), Err(RadianceError::Bsdf(_))));
    }

    #[test]
    fn test_values_and_text_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_xml(dir.path(), "clear.xml", KLEMS_XML);
        let mut bsdf = Bsdf::new(&path).unwrap();
        bsdf.front_diffuse_reflectance = Some([0.1, 0.1, 0.1]);
        bsdf.back_diffuse_reflectance = Some([0.2, 0.2, 0.2]);
        assert_eq!(bsdf.default_identifier(), "clear");
        let p = Primitive::new("clear", bsdf).unwrap();
        let values = p.values();
        assert_eq!(values[0].len(), 6);
        assert_eq!(values[0][1], Value::Text(path.to_string_lossy().replace('\\', "/")));
        assert_eq!(values[2].len(), 6);

        let back = Primitive::from_string(&p.to_radiance(false, true, true)).unwrap();
        assert_eq!(back, p);
        assert!(!back.is_opaque());
    }

    #[test]
    fn test_extras_require_front() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_xml(dir.path(), "clear.xml", KLEMS_XML);
        let mut bsdf = Bsdf::new(&path).unwrap();
        bsdf.back_diffuse_reflectance = Some([0.2, 0.2, 0.2]);
        assert!(Primitive::new("clear", bsdf).is_err());
    }

    #[test]
    fn test_relative_file_token() {
        let bsdf = Bsdf {
            bsdf_file: PathBuf::from("./bsdf/clear.xml"),
            up_orientation: DEFAULT_UP,
            thickness: 0.0,
            function_file: ".".into(),
            transform: None,
            angle_basis: None,
            front_diffuse_reflectance: None,
            back_diffuse_reflectance: None,
            diffuse_transmittance: None,
        };
        assert_eq!(bsdf.file_token(), "./bsdf/clear.xml");
        let bare = Bsdf {
            bsdf_file: PathBuf::from("clear.xml"),
            ..bsdf
        };
        assert_eq!(bare.file_token(), "./clear.xml");
    }

    #[test]
    fn test_dict_materializes_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_xml(dir.path(), "clear.xml", KLEMS_XML);
        let p = Primitive::new("clear_glass", Bsdf::new(&path).unwrap()).unwrap();
        let data = p.to_dict().unwrap();
        assert_eq!(data["type"], "BSDF");
        assert_eq!(data["bsdf_data"], KLEMS_XML);
        assert_eq!(data["up_orientation"], json!([0.01, 0.01, 1.0]));

        let out = tempfile::tempdir().unwrap();
        let config = Config {
            bsdf_folder: out.path().join("BSDF"),
            ..Config::default()
        };
        let back = Primitive::from_dict_with(&data, &config).unwrap();
        let PrimitiveKind::Bsdf(params) = back.kind() else {
            panic!("expected BSDF");
        };
        assert_eq!(params.bsdf_file, out.path().join("BSDF").join("clear_glass.xml"));
        assert_eq!(fs::read_to_string(&params.bsdf_file).unwrap(), KLEMS_XML);
        assert_eq!(params.angle_basis, Some(AngleBasis::KlemsFull));
    }

    #[test]
    fn test_absdf_omits_thickness() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_xml(dir.path(), "tt.xml", TENSOR_XML);
        let p = Primitive::new("peak", ABsdf::new(&path).unwrap()).unwrap();
        let text = p.to_radiance(true, true, true);
        assert!(text.starts_with("void aBSDF peak 5 "));
        let back = Primitive::from_string(&text).unwrap();
        assert_eq!(back.primitive_type(), crate::types::PrimitiveType::ABsdf);
        assert!(p.to_dict().unwrap().get("thickness").is_none());
    }
}
