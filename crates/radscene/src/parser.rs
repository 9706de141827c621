//! Record parser: turns one tokenized record into a positional record.
//!
//! A record is `modifier type identifier` followed by three length-prefixed
//! value groups. The parser does not interpret the type; references stay bare
//! identifiers until the resolver in [`crate::reader`] embeds them.

use crate::error::{RadianceError, Result};
use crate::lexer::split_fields;
use crate::value::{Value, Values};
use serde::{Deserialize, Serialize};

/// The modifier slot of a positional record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordModifier {
    /// No modifier (`void`, or `null` in JSON).
    Void,
    /// A bare identifier that has not been resolved yet.
    Identifier(String),
    /// A resolved, embedded record.
    Record(Box<PrimitiveRecord>),
}

impl RecordModifier {
    /// True for the void sentinel, written either as `null` or `"void"`.
    pub fn is_void(&self) -> bool {
        match self {
            RecordModifier::Void => true,
            RecordModifier::Identifier(id) => id == "void",
            RecordModifier::Record(_) => false,
        }
    }

    /// The referenced identifier (`void` for the sentinel).
    pub fn identifier(&self) -> &str {
        match self {
            RecordModifier::Void => "void",
            RecordModifier::Identifier(id) => id,
            RecordModifier::Record(record) => &record.identifier,
        }
    }
}

/// A primitive in positional form, as produced from scene text.
///
/// Every primitive type shares this shape; the named-field dictionaries of the
/// typed primitives are a different schema handled by [`crate::dict`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrimitiveRecord {
    /// Modifier reference.
    #[serde(default = "void_modifier")]
    pub modifier: RecordModifier,
    /// Type tag as written in the text.
    #[serde(rename = "type")]
    pub primitive_type: String,
    /// Identifier.
    pub identifier: String,
    /// Optional display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// The three value lines.
    pub values: Values,
    /// Records that must be emitted before this one.
    #[serde(default)]
    pub dependencies: Vec<PrimitiveRecord>,
}

fn void_modifier() -> RecordModifier {
    RecordModifier::Void
}

/// Parse one record string into a positional record.
///
/// The declared token counts must account for every token after the header;
/// a mismatch is a parse error.
pub fn string_to_dict(record: &str) -> Result<PrimitiveRecord> {
    let fields = split_fields(record)?;
    if fields.len() < 3 {
        return Err(RadianceError::parse(
            record,
            "expected a \"modifier type identifier\" header",
        ));
    }
    let (header, body) = fields.split_at(3);

    let mut cursor = 0usize;
    let mut lines: Vec<Vec<Value>> = Vec::with_capacity(3);
    for line in 0..3 {
        let count_token = body.get(cursor).ok_or_else(|| {
            RadianceError::parse(record, format!("missing token count for value line {}", line))
        })?;
        let count: usize = count_token.parse().map_err(|_| {
            RadianceError::parse(
                record,
                format!("invalid token count \"{}\" for value line {}", count_token, line),
            )
        })?;
        cursor += 1;
        let tokens = body.get(cursor..cursor + count).ok_or_else(|| {
            RadianceError::parse(
                record,
                format!(
                    "value line {} declares {} tokens but only {} remain",
                    line,
                    count,
                    body.len() - cursor
                ),
            )
        })?;
        lines.push(tokens.iter().map(|t| Value::Text(t.clone())).collect());
        cursor += count;
    }
    if cursor != body.len() {
        return Err(RadianceError::parse(
            record,
            format!("{} tokens left over after the declared values", body.len() - cursor),
        ));
    }

    let modifier = if header[0] == "void" {
        RecordModifier::Void
    } else {
        RecordModifier::Identifier(header[0].clone())
    };
    let mut lines = lines.into_iter();
    let values = [
        lines.next().unwrap_or_default(),
        lines.next().unwrap_or_default(),
        lines.next().unwrap_or_default(),
    ];

    Ok(PrimitiveRecord {
        modifier,
        primitive_type: header[1].clone(),
        identifier: header[2].clone(),
        display_name: None,
        values,
        dependencies: Vec::new(),
    })
}
