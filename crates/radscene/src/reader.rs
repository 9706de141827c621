//! Scene text reader: resolves bare references into nested records.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use tracing::debug;

use crate::error::{RadianceError, Result};
use crate::lexer::parse_from_string;
use crate::parser::{string_to_dict, PrimitiveRecord, RecordModifier};
use crate::value::Value;

const HEADER_START: &str = "#?RADIANCE";
const HEADER_END: &str = "FORMAT=";

/// Convert scene text into resolved positional records.
///
/// Each modifier reference is replaced by the nearest preceding record with
/// that identifier. Tokens of the first value line that match an identifier
/// defined earlier become dependencies. Records folded into another are
/// removed from the output, which keeps the original order otherwise.
///
/// A bare string argument that happens to match an earlier identifier is
/// also taken as a dependency; the text grammar has no way to tell the two
/// apart.
pub fn string_to_dicts(text: &str) -> Result<Vec<PrimitiveRecord>> {
    let records = parse_from_string(text);
    if records.is_empty() {
        return Err(RadianceError::EmptyInput(text.to_string()));
    }
    let records = records
        .iter()
        .map(|r| string_to_dict(r))
        .collect::<Result<Vec<_>>>()?;
    resolve(records)
}

/// Embed references in already parsed records.
fn resolve(records: Vec<PrimitiveRecord>) -> Result<Vec<PrimitiveRecord>> {
    let mut resolved: Vec<PrimitiveRecord> = Vec::with_capacity(records.len());
    let mut last_seen: HashMap<String, usize> = HashMap::new();
    let mut folded: HashSet<usize> = HashSet::new();

    for mut record in records {
        if let RecordModifier::Identifier(name) = &record.modifier {
            if name != "void" {
                let index = *last_seen.get(name).ok_or_else(|| RadianceError::MissingModifier {
                    modifier: name.clone(),
                    referrer: record.identifier.clone(),
                })?;
                debug!(modifier = %name, referrer = %record.identifier, "embedding modifier");
                record.modifier = RecordModifier::Record(Box::new(resolved[index].clone()));
                folded.insert(index);
            } else {
                record.modifier = RecordModifier::Void;
            }
        }

        let mut dependencies = Vec::new();
        for token in record.values[0].iter().filter_map(Value::as_str) {
            if token.contains('(') || token.contains('"') {
                continue;
            }
            if let Some(&index) = last_seen.get(token) {
                debug!(dependency = token, referrer = %record.identifier, "embedding dependency");
                dependencies.push(resolved[index].clone());
                folded.insert(index);
            }
        }
        record.dependencies.extend(dependencies);

        last_seen.insert(record.identifier.clone(), resolved.len());
        resolved.push(record);
    }

    Ok(resolved
        .into_iter()
        .enumerate()
        .filter(|(index, _)| !folded.contains(index))
        .map(|(_, record)| record)
        .collect())
}

/// Extract the header block of a scene file.
///
/// The text must start with `#?RADIANCE`; the header runs up to and including
/// the first `FORMAT=` line. Returns the index of the first body line and the
/// header lines joined with newlines.
pub fn parse_header(text: &str) -> Result<(usize, String)> {
    let mut lines = text.lines();
    let first = lines.next().unwrap_or_default();
    if !first.starts_with(HEADER_START) {
        return Err(RadianceError::parse_message(format!(
            "File with Radiance header must start with {} not {}",
            HEADER_START, first
        )));
    }
    let mut header = vec![first];
    for line in lines {
        header.push(line);
        if line.starts_with(HEADER_END) {
            break;
        }
    }
    Ok((header.len() + 1, header.join("\n")))
}

/// Read the header block of a scene file on disk.
pub fn parse_header_file(path: impl AsRef<Path>) -> Result<(usize, String)> {
    parse_header(&std::fs::read_to_string(path)?)
}

/// Drop a leading header block, if any.
fn strip_header(text: &str) -> &str {
    if !text.starts_with(HEADER_START) {
        return text;
    }
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        offset += line.len();
        if line.starts_with(HEADER_END) {
            return &text[offset..];
        }
    }
    ""
}

/// Read a scene file into one string per record.
pub fn read_rad(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let text = std::fs::read_to_string(path)?;
    Ok(parse_from_string(strip_header(&text)))
}

/// Read a scene file into resolved positional records.
pub fn read_dicts(path: impl AsRef<Path>) -> Result<Vec<PrimitiveRecord>> {
    let text = std::fs::read_to_string(path)?;
    string_to_dicts(strip_header(&text))
}

/// Count the sensors in a points file, skipping blank and comment lines.
pub fn sensor_count_from_file(path: impl AsRef<Path>) -> Result<usize> {
    let text = std::fs::read_to_string(path)?;
    Ok(text
        .lines()
        .filter(|line| !line.trim().is_empty() && !line.starts_with('#'))
        .count())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const GLASS_MIRROR: &str = r#"
void glass glass_alt_mat
0
0
3 0.96 0.96 0.96
void brightfunc glass_angular_effect
2 A1+(1-A1) (exp(-5.85 Rdot)-0.00287989916)
0
1 0.08
glass_angular_effect mirror glass_mat
1 glass_alt_mat
0
3 1 1 1
"#;

    #[test]
    fn test_string_to_dicts_folds_references() {
        assert_eq!(parse_from_string(GLASS_MIRROR).len(), 3);
        let records = string_to_dicts(GLASS_MIRROR).unwrap();
        assert_eq!(records.len(), 1);
        let mirror = &records[0];
        assert_eq!(mirror.identifier, "glass_mat");
        match &mirror.modifier {
            RecordModifier::Record(m) => assert_eq!(m.identifier, "glass_angular_effect"),
            other => panic!("expected embedded modifier, got {:?}", other),
        }
        assert_eq!(mirror.dependencies.len(), 1);
        assert_eq!(mirror.dependencies[0].identifier, "glass_alt_mat");
    }

    #[test]
    fn test_nearest_preceding_wins() {
        let text = "void plastic mat 0 0 5 0.1 0.1 0.1 0 0\n\
                    void polygon first 0 0 9 0 0 0 1 0 0 1 1 0\n\
                    void plastic mat 0 0 5 0.9 0.9 0.9 0 0\n\
                    mat polygon second 0 0 9 0 0 0 1 0 0 1 1 0\n";
        let records = string_to_dicts(text).unwrap();
        let ids: Vec<&str> = records.iter().map(|r| r.identifier.as_str()).collect();
        assert_eq!(ids, vec!["mat", "first", "second"]);
        assert_eq!(records[0].values[2][0], Value::Text("0.1".into()));
        match &records[2].modifier {
            RecordModifier::Record(m) => assert_eq!(m.values[2][0], Value::Text("0.9".into())),
            other => panic!("expected embedded modifier, got {:?}", other),
        }
    }

    #[test]
    fn test_shared_modifier_embedded_in_each() {
        let text = "void plastic mat 0 0 5 0.5 0.5 0.5 0 0\n\
                    mat polygon a 0 0 9 0 0 0 1 0 0 1 1 0\n\
                    mat polygon b 0 0 9 0 0 1 1 0 1 1 1 1\n";
        let records = string_to_dicts(text).unwrap();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.modifier.identifier() == "mat"));
    }

    #[test]
    fn test_missing_modifier() {
        let err = string_to_dicts("missing plastic wall 0 0 5 0.5 0.5 0.5 0 0").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Failed to find \"missing\" modifier for \"wall\" in input string"
        );
    }

    #[test]
    fn test_no_forward_references() {
        let text = "mat polygon a 0 0 9 0 0 0 1 0 0 1 1 0\nvoid plastic mat 0 0 5 0.5 0.5 0.5 0 0";
        assert!(matches!(
            string_to_dicts(text),
            Err(RadianceError::MissingModifier { .. })
        ));
    }

    #[test]
    fn test_empty_input() {
        assert!(matches!(string_to_dicts("# nothing"), Err(RadianceError::EmptyInput(_))));
    }

    #[test]
    fn test_parse_header() {
        let text = "#?RADIANCE\noconv -f scene.rad\nFORMAT=Radiance_octree\n\nvoid plastic m 0 0 5 0 0 0 0 0";
        let (count, header) = parse_header(text).unwrap();
        assert_eq!(count, 4);
        assert_eq!(header, "#?RADIANCE\noconv -f scene.rad\nFORMAT=Radiance_octree");
        assert!(parse_header("void plastic m 0 0 0").is_err());
        assert_eq!(strip_header(text).trim(), "void plastic m 0 0 5 0 0 0 0 0");
    }

    #[test]
    fn test_file_helpers() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", GLASS_MIRROR).unwrap();
        assert_eq!(read_rad(file.path()).unwrap().len(), 3);
        assert_eq!(read_dicts(file.path()).unwrap().len(), 1);

        let mut pts = tempfile::NamedTempFile::new().unwrap();
        write!(pts, "# sensors\n0 0 0 0 0 1\n\n1 0 0 0 0 1\n").unwrap();
        assert_eq!(sensor_count_from_file(pts.path()).unwrap(), 2);
    }
}
