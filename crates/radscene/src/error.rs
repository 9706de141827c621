//! Error types for scene-description parsing and serialization.

use thiserror::Error;

/// Errors that can occur while reading, building or writing scene objects.
#[derive(Error, Debug)]
pub enum RadianceError {
    /// I/O error while reading or writing files.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed TOML configuration.
    #[error("config error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid geometry.
    #[error("geometry error: {0}")]
    Geometry(#[from] radscene_geom::GeometryError),

    /// Malformed text record.
    #[error("Parse error{}: {message}", record.as_ref().map(|r| format!(" in \"{}\"", r)).unwrap_or_default())]
    Parse {
        /// The record text that failed to parse, if known.
        record: Option<String>,
        /// Description of the error.
        message: String,
    },

    /// Input text holds no records.
    #[error("{0} includes no radiance objects")]
    EmptyInput(String),

    /// A record references a modifier that is not defined before it.
    #[error("Failed to find \"{modifier}\" modifier for \"{referrer}\" in input string")]
    MissingModifier {
        /// The modifier identifier that was referenced.
        modifier: String,
        /// The identifier of the referencing record.
        referrer: String,
    },

    /// Type tag outside the closed vocabulary.
    #[error("{0} is not a supported Radiance primitive type")]
    UnknownType(String),

    /// Dictionary or record carries an unexpected type.
    #[error("Expected {expected}. Got {actual}.")]
    TypeMismatch {
        /// Expected type name.
        expected: String,
        /// Actual type name.
        actual: String,
    },

    /// Identifier with an illegal character or length.
    #[error("Illegal {kind} \"{value}\": {reason}")]
    InvalidIdentifier {
        /// What the identifier names.
        kind: String,
        /// The offending value.
        value: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Numeric parameter outside its legal range.
    #[error("{name} must be between {min} and {max}. Got {value}.")]
    OutOfRange {
        /// Parameter name.
        name: String,
        /// The offending value.
        value: f64,
        /// Lower bound.
        min: f64,
        /// Upper bound.
        max: f64,
    },

    /// Parameters that violate an energy balance or similar physical law.
    #[error("{0}")]
    Physical(String),

    /// A required dictionary key is missing or null.
    #[error("\"{key}\" is required for {context}")]
    MissingKey {
        /// The missing key.
        key: String,
        /// The dictionary being read.
        context: String,
    },

    /// An abridged identifier reference that is absent from the lookup table.
    #[error("\"{identifier}\" was not found in {context}")]
    MissingReference {
        /// The referenced identifier.
        identifier: String,
        /// Where the lookup happened.
        context: String,
    },

    /// A geometry primitive was used where a modifier is required.
    #[error("\"{identifier}\" of type {primitive_type} cannot be used as a modifier")]
    NotAModifier {
        /// Identifier of the offending primitive.
        identifier: String,
        /// Its type tag.
        primitive_type: String,
    },

    /// A modifier-set lookup with an unrecognized combination.
    #[error("{0}")]
    UnsupportedCombination(String),

    /// An object is in a state that does not support the operation.
    #[error("{0}")]
    InvalidState(String),

    /// Duplicate identifiers found during scene validation.
    #[error("The following duplicated {kind} identifiers were found:\n{}", identifiers.join("\n"))]
    Duplicate {
        /// What the identifiers name.
        kind: String,
        /// The duplicated identifiers.
        identifiers: Vec<String>,
    },

    /// BSDF data file problems.
    #[error("BSDF error: {0}")]
    Bsdf(String),
}

impl RadianceError {
    /// Create a parse error for a record.
    pub fn parse(record: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            record: Some(record.into()),
            message: message.into(),
        }
    }

    /// Create a parse error without a record.
    pub fn parse_message(message: impl Into<String>) -> Self {
        Self::Parse {
            record: None,
            message: message.into(),
        }
    }

    /// Create a type-mismatch error.
    pub fn type_mismatch(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::TypeMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Create a missing-key error.
    pub fn missing_key(key: impl Into<String>, context: impl Into<String>) -> Self {
        Self::MissingKey {
            key: key.into(),
            context: context.into(),
        }
    }

    /// Create a missing-reference error.
    pub fn missing_reference(identifier: impl Into<String>, context: impl Into<String>) -> Self {
        Self::MissingReference {
            identifier: identifier.into(),
            context: context.into(),
        }
    }
}

/// Result type for scene-description operations.
pub type Result<T> = std::result::Result<T, RadianceError>;
