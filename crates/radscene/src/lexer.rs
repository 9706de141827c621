//! Scene text tokenizer.
//!
//! Splits a scene file into one string per primitive record and splits a
//! record into its fields. Handles:
//! - Records wrapped across any number of physical lines
//! - Comment (`#`) and command (`!`) lines, which are dropped
//! - Inline expressions in parentheses, e.g. `(exp(-5.85 Rdot)-0.00287989916)`
//! - Double-quoted tokens with embedded whitespace

use crate::error::{RadianceError, Result};
use tracing::debug;

/// True when a line starting with `first` opens a new record.
///
/// Value lines start with their token count, so any line starting with
/// something other than a digit, sign or dot is a `modifier type identifier`
/// header.
fn starts_record(first: char) -> bool {
    !(first.is_ascii_digit() || first == '.' || first == '-' || first == '+')
}

fn is_comment(first: char) -> bool {
    first == '#' || first == '!'
}

/// Separate scene text into one whitespace-normalized string per record.
///
/// Comment and command lines are skipped without ending the record they
/// appear in. Value lines that appear before any header are ignored.
pub fn parse_from_string(text: &str) -> Vec<String> {
    let mut records = Vec::new();
    let mut current: Option<Vec<&str>> = None;

    for line in text.lines() {
        let trimmed = line.trim_start();
        let Some(first) = trimmed.chars().next() else {
            continue;
        };
        if is_comment(first) {
            continue;
        }
        if starts_record(first) {
            if let Some(tokens) = current.take() {
                records.push(tokens.join(" "));
            }
            current = Some(Vec::new());
        }
        match current.as_mut() {
            Some(tokens) => tokens.extend(trimmed.split_whitespace()),
            None => debug!(line = trimmed, "ignoring value line outside of a record"),
        }
    }
    if let Some(tokens) = current {
        records.push(tokens.join(" "));
    }
    records
}

/// Split one record into whitespace-separated fields.
///
/// Whitespace inside balanced parentheses or inside double quotes does not
/// split, so inline function expressions and quoted paths stay single fields.
pub fn split_fields(record: &str) -> Result<Vec<String>> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut depth = 0usize;
    let mut in_quote = false;

    for ch in record.chars() {
        match ch {
            '"' => in_quote = !in_quote,
            '(' if !in_quote => depth += 1,
            ')' if !in_quote => {
                depth = depth.checked_sub(1).ok_or_else(|| {
                    RadianceError::parse(record, "unbalanced closing parenthesis")
                })?;
            }
            c if c.is_whitespace() && depth == 0 && !in_quote => {
                if !field.is_empty() {
                    fields.push(std::mem::take(&mut field));
                }
                continue;
            }
            _ => {}
        }
        field.push(ch);
    }

    if in_quote {
        return Err(RadianceError::parse(record, "unterminated double quote"));
    }
    if depth != 0 {
        return Err(RadianceError::parse(record, "unbalanced opening parenthesis"));
    }
    if !field.is_empty() {
        fields.push(field);
    }
    Ok(fields)
}
