//! Value tokens carried on the three value lines of a primitive.

use crate::error::{RadianceError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One token of a value line.
///
/// Typed primitives produce numbers; records parsed from text keep their
/// tokens verbatim as text so they are written back unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// A real number.
    Number(f64),
    /// A verbatim token (identifier, path, expression or unparsed number).
    Text(String),
}

/// The three value lines of a primitive.
pub type Values = [Vec<Value>; 3];

/// Three empty value lines.
pub fn empty_values() -> Values {
    [Vec::new(), Vec::new(), Vec::new()]
}

impl Value {
    /// Interpret the token as a real number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Text(s) => s.trim().parse().ok(),
        }
    }

    /// The token as text, if it is text.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            Value::Number(_) => None,
        }
    }
}

/// Tokens compare by their numeric form when they have one, so parsed and
/// typed values compare equal; other text compares verbatim.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self.as_f64(), other.as_f64()) {
            (Some(a), Some(b)) => a == b,
            (None, None) => self.as_str() == other.as_str(),
            _ => false,
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => f.write_str(&format_number(*n)),
            Value::Text(s) => f.write_str(s),
        }
    }
}

/// Format a real the way scene files written by the reference tooling do:
/// shortest round-trip digits, always with a decimal point, and a two-digit
/// exponent for very small or very large magnitudes (`0.0`, `0.6`, `1e-05`).
pub fn format_number(n: f64) -> String {
    let magnitude = n.abs();
    if n.is_finite() && n != 0.0 && !(1e-4..1e16).contains(&magnitude) {
        let s = format!("{:e}", n);
        if let Some((mantissa, exp)) = s.split_once('e') {
            let (sign, digits) = match exp.strip_prefix('-') {
                Some(d) => ('-', d),
                None => ('+', exp),
            };
            return format!("{}e{}{:0>2}", mantissa, sign, digits);
        }
        return s;
    }
    format!("{:?}", n)
}

/// Read the real numbers of one value line, naming the record on failure.
pub(crate) fn line_to_f64(line: &[Value], context: &str) -> Result<Vec<f64>> {
    line.iter()
        .map(|v| {
            v.as_f64().ok_or_else(|| {
                RadianceError::parse(context, format!("expected a real value, got \"{}\"", v))
            })
        })
        .collect()
}

/// Join a value line into its text form: the token count followed by the tokens.
pub(crate) fn line_to_string(line: &[Value]) -> String {
    if line.is_empty() {
        return "0".to_string();
    }
    let tokens: Vec<String> = line.iter().map(|v| v.to_string()).collect();
    format!("{} {}", line.len(), tokens.join(" ").trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0.0), "0.0");
        assert_eq!(format_number(0.6), "0.6");
        assert_eq!(format_number(1.0), "1.0");
        assert_eq!(format_number(0.0001), "0.0001");
        assert_eq!(format_number(0.00001), "1e-05");
        assert_eq!(format_number(1.5e16), "1.5e+16");
        assert_eq!(format_number(-2.25), "-2.25");
    }

    #[test]
    fn test_line_to_string() {
        assert_eq!(line_to_string(&[]), "0");
        let line = vec![Value::Number(0.5), Value::Text("./a.xml".into())];
        assert_eq!(line_to_string(&line), "2 0.5 ./a.xml");
    }

    #[test]
    fn test_untagged_json() {
        let values: Vec<Value> = serde_json::from_str(r#"[0.5, "void"]"#).unwrap();
        assert_eq!(values, vec![Value::Number(0.5), Value::Text("void".into())]);
        assert_eq!(Value::Text("0.25".into()).as_f64(), Some(0.25));
        assert!(line_to_f64(&[Value::Text("abc".into())], "x").is_err());
    }

    #[test]
    fn test_text_equals_number() {
        assert_eq!(Value::Text("1".into()), Value::Number(1.0));
        assert_ne!(Value::Text("void".into()), Value::Number(0.0));
        assert_ne!(Value::Text("void".into()), Value::Text("./void".into()));
    }

    #[test]
    fn test_equality_is_transitive() {
        let (a, b, c) = (Value::Text("1".into()), Value::Number(1.0), Value::Text("1.0".into()));
        assert_eq!(a, b);
        assert_eq!(b, c);
        assert_eq!(a, c);
        assert_eq!(Value::Text("0.5".into()), Value::Text("0.50".into()));
        assert_ne!(Value::Text("2".into()), Value::Text("2.5".into()));
    }
}
