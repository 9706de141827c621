//! Modifier and modifier-set library.
//!
//! The built-in defaults are created once per process and shared. A
//! [`Library`] starts from those defaults and can be extended with user
//! folders:
//!
//! - `.rad` / `.mat` files of modifier records, resolved like scene text,
//! - `.json` files mapping identifiers to modifier dictionaries,
//! - `.json` modifier-set files, each either a single set or an
//!   identifier-keyed collection of sets, full or abridged.
//!
//! User entries never replace a default. Every entry that is not loaded is
//! reported back with the reason.

mod modifiers;
mod modifiersets;

pub use modifiers::{defaults, DefaultModifiers};
pub use modifiersets::{default_modifier_sets, generic_modifier_set_visible, DefaultModifierSets};

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value as JsonValue;
use tracing::{debug, warn};

use crate::config::Config;
use crate::dict::dict_to_modifier_with;
use crate::error::{RadianceError, Result};
use crate::modifierset::ModifierSet;
use crate::primitive::{Modifier, Primitive};
use crate::reader::string_to_dicts;

/// A library entry that was not loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedEntry {
    /// File the entry came from.
    pub path: PathBuf,
    /// Identifier of the entry, when it could be read.
    pub identifier: Option<String>,
    /// Why it was skipped.
    pub reason: String,
}

/// Outcome of loading a user folder.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    /// Identifiers added to the library.
    pub loaded: Vec<String>,
    /// Entries left out.
    pub skipped: Vec<SkippedEntry>,
}

impl LoadReport {
    fn skip(&mut self, path: &Path, identifier: Option<&str>, reason: impl Into<String>) {
        let entry = SkippedEntry {
            path: path.to_path_buf(),
            identifier: identifier.map(str::to_string),
            reason: reason.into(),
        };
        warn!(
            path = %entry.path.display(),
            identifier = entry.identifier.as_deref().unwrap_or("-"),
            "skipping library entry: {}",
            entry.reason
        );
        self.skipped.push(entry);
    }

    /// Append another report.
    pub fn merge(&mut self, other: LoadReport) {
        self.loaded.extend(other.loaded);
        self.skipped.extend(other.skipped);
    }
}

/// Modifiers and modifier sets available by identifier.
#[derive(Debug, Clone)]
pub struct Library {
    modifiers: HashMap<String, Modifier>,
    modifier_sets: HashMap<String, ModifierSet>,
    default_modifiers: HashSet<String>,
    default_sets: HashSet<String>,
    config: Config,
}

impl Default for Library {
    fn default() -> Self {
        Self::new()
    }
}

impl Library {
    /// A library holding only the built-in defaults.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// A library holding only the built-in defaults, decoding file-backed
    /// data into the folders of `config`.
    pub fn with_config(config: Config) -> Self {
        let modifiers: HashMap<String, Modifier> = defaults()
            .all()
            .into_iter()
            .map(|m| (m.identifier().to_string(), m.clone()))
            .collect();
        let modifier_sets: HashMap<String, ModifierSet> = default_modifier_sets()
            .all()
            .into_iter()
            .map(|s| (s.identifier().to_string(), s.clone()))
            .collect();
        Self {
            default_modifiers: modifiers.keys().cloned().collect(),
            default_sets: modifier_sets.keys().cloned().collect(),
            modifiers,
            modifier_sets,
            config,
        }
    }

    /// Defaults plus the user folders named in `config`.
    pub fn load(config: &Config) -> Result<(Self, LoadReport)> {
        config.validate()?;
        let mut library = Self::with_config(config.clone());
        let mut report = LoadReport::default();
        if let Some(folder) = &config.modifier_lib {
            report.merge(library.load_modifiers_from_folder(folder)?);
        }
        if let Some(folder) = &config.modifierset_lib {
            report.merge(library.load_modifier_sets_from_folder(folder)?);
        }
        Ok((library, report))
    }

    /// Add a modifier. Defaults cannot be replaced.
    pub fn add_modifier(&mut self, modifier: Modifier) -> Result<()> {
        let identifier = modifier.identifier().to_string();
        if modifier.is_void() {
            return Err(RadianceError::InvalidState("void cannot be added to the library".into()));
        }
        if self.default_modifiers.contains(&identifier) {
            return Err(RadianceError::InvalidState(format!(
                "Cannot overwrite default modifier \"{}\"",
                identifier
            )));
        }
        self.modifiers.insert(identifier, modifier);
        Ok(())
    }

    /// Add a modifier set. Defaults cannot be replaced.
    pub fn add_modifier_set(&mut self, modifier_set: ModifierSet) -> Result<()> {
        let identifier = modifier_set.identifier().to_string();
        if self.default_sets.contains(&identifier) {
            return Err(RadianceError::InvalidState(format!(
                "Cannot overwrite default modifier set \"{}\"",
                identifier
            )));
        }
        self.modifier_sets.insert(identifier, modifier_set);
        Ok(())
    }

    /// A modifier by identifier.
    pub fn modifier_by_identifier(&self, identifier: &str) -> Result<Modifier> {
        self.modifiers
            .get(identifier)
            .cloned()
            .ok_or_else(|| RadianceError::missing_reference(identifier, "the modifier library"))
    }

    /// A modifier set by identifier.
    pub fn modifier_set_by_identifier(&self, identifier: &str) -> Result<ModifierSet> {
        self.modifier_sets
            .get(identifier)
            .cloned()
            .ok_or_else(|| RadianceError::missing_reference(identifier, "the modifier set library"))
    }

    /// Sorted modifier identifiers.
    pub fn modifier_identifiers(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.modifiers.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Sorted modifier-set identifiers.
    pub fn modifier_set_identifiers(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.modifier_sets.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Identifier table usable for abridged lookups.
    pub fn modifiers(&self) -> &HashMap<String, Modifier> {
        &self.modifiers
    }

    /// Load every `.rad`, `.mat` and `.json` modifier file in a folder.
    ///
    /// Files are visited in name order. Unreadable files are errors; entries
    /// that cannot be decoded or that collide with a default are skipped.
    pub fn load_modifiers_from_folder(&mut self, folder: impl AsRef<Path>) -> Result<LoadReport> {
        let mut report = LoadReport::default();
        for path in files_in(folder.as_ref())? {
            match path.extension().and_then(|e| e.to_str()) {
                Some("rad") | Some("mat") => self.load_rad_file(&path, &mut report)?,
                Some("json") => self.load_modifier_json(&path, &mut report)?,
                _ => {}
            }
        }
        debug!(
            folder = %folder.as_ref().display(),
            loaded = report.loaded.len(),
            skipped = report.skipped.len(),
            "loaded user modifiers"
        );
        Ok(report)
    }

    fn load_rad_file(&mut self, path: &Path, report: &mut LoadReport) -> Result<()> {
        let text = fs::read_to_string(path)?;
        let records = match string_to_dicts(&text) {
            Ok(records) => records,
            Err(err) => {
                report.skip(path, None, err.to_string());
                return Ok(());
            }
        };
        for record in &records {
            let identifier = record.identifier.as_str();
            let modifier = Primitive::from_record_with(record, &self.config).and_then(Modifier::new);
            match modifier {
                Ok(modifier) => self.insert_modifier(path, modifier, report),
                Err(err) => report.skip(path, Some(identifier), err.to_string()),
            }
        }
        Ok(())
    }

    fn load_modifier_json(&mut self, path: &Path, report: &mut LoadReport) -> Result<()> {
        let data: JsonValue = serde_json::from_str(&fs::read_to_string(path)?)?;
        let Some(entries) = data.as_object() else {
            report.skip(path, None, "modifier JSON must map identifiers to modifier dictionaries");
            return Ok(());
        };
        for (identifier, entry) in entries {
            match dict_to_modifier_with(entry, &self.config) {
                Ok(modifier) if modifier.is_void() => report.skip(path, Some(identifier), "void is not a modifier"),
                Ok(modifier) => self.insert_modifier(path, modifier, report),
                Err(err) => report.skip(path, Some(identifier), err.to_string()),
            }
        }
        Ok(())
    }

    fn insert_modifier(&mut self, path: &Path, modifier: Modifier, report: &mut LoadReport) {
        let identifier = modifier.identifier().to_string();
        match self.add_modifier(modifier) {
            Ok(()) => report.loaded.push(identifier),
            Err(err) => report.skip(path, Some(&identifier), err.to_string()),
        }
    }

    /// Load every `.json` modifier-set file in a folder.
    ///
    /// Abridged sets are resolved against the modifiers already in the
    /// library, so user modifiers should be loaded first.
    pub fn load_modifier_sets_from_folder(&mut self, folder: impl AsRef<Path>) -> Result<LoadReport> {
        let mut report = LoadReport::default();
        for path in files_in(folder.as_ref())? {
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let data: JsonValue = serde_json::from_str(&fs::read_to_string(&path)?)?;
            match data.as_object() {
                Some(dict) if dict.contains_key("type") => self.load_set_object(&path, &data, &mut report),
                Some(collection) => {
                    for entry in collection.values() {
                        self.load_set_object(&path, entry, &mut report);
                    }
                }
                None => report.skip(&path, None, "modifier set JSON must be an object"),
            }
        }
        debug!(
            folder = %folder.as_ref().display(),
            loaded = report.loaded.len(),
            skipped = report.skipped.len(),
            "loaded user modifier sets"
        );
        Ok(report)
    }

    fn load_set_object(&mut self, path: &Path, data: &JsonValue, report: &mut LoadReport) {
        let identifier = data
            .get("identifier")
            .and_then(JsonValue::as_str)
            .map(str::to_string);
        let is_abridged = data.get("type").and_then(JsonValue::as_str) == Some("ModifierSetAbridged");
        let set = if is_abridged {
            ModifierSet::from_dict_abridged(data, &self.modifiers)
        } else {
            ModifierSet::from_dict_with(data, &self.config)
        };
        let result = set.and_then(|set| {
            let id = set.identifier().to_string();
            self.add_modifier_set(set).map(|()| id)
        });
        match result {
            Ok(id) => report.loaded.push(id),
            Err(err) => report.skip(path, identifier.as_deref(), err.to_string()),
        }
    }
}

fn files_in(folder: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(folder)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file())
        .collect();
    files.sort();
    Ok(files)
}
