//! Library configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{RadianceError, Result};

/// Environment variable naming a TOML configuration file.
pub const CONFIG_ENV: &str = "RADSCENE_CONFIG";

/// Folders used when loading user libraries and materializing BSDF data.
///
/// ```toml
/// modifier_lib = "/opt/lib/modifiers"
/// modifierset_lib = "/opt/lib/modifiersets"
/// bsdf_folder = "/tmp/radscene/BSDF"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Folder of user `.rad`, `.mat` and `.json` modifier files.
    pub modifier_lib: Option<PathBuf>,
    /// Folder of user modifier-set `.json` files.
    pub modifierset_lib: Option<PathBuf>,
    /// Folder where embedded BSDF data is written when decoding dictionaries.
    pub bsdf_folder: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            modifier_lib: None,
            modifierset_lib: None,
            bsdf_folder: std::env::temp_dir().join("radscene").join("BSDF"),
        }
    }
}

impl Config {
    /// Parse a configuration from TOML text. Missing keys take their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Read a configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_toml_str(&std::fs::read_to_string(path)?)
    }

    /// Read the file named by `RADSCENE_CONFIG`, or the defaults when unset.
    pub fn from_env() -> Result<Self> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Check that every configured library folder that exists is a directory.
    pub fn validate(&self) -> Result<()> {
        let folders = [
            ("modifier_lib", self.modifier_lib.as_deref()),
            ("modifierset_lib", self.modifierset_lib.as_deref()),
            ("bsdf_folder", Some(self.bsdf_folder.as_path())),
        ];
        for (name, folder) in folders {
            if let Some(folder) = folder {
                if folder.exists() && !folder.is_dir() {
                    return Err(RadianceError::InvalidState(format!(
                        "{} must be a directory: {}",
                        name,
                        folder.display()
                    )));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(config.modifier_lib.is_none());
        assert!(config.bsdf_folder.ends_with("BSDF"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_toml_str() {
        let config = Config::from_toml_str(
            r#"
modifier_lib = "/data/modifiers"
bsdf_folder = "/data/bsdf"
"#,
        )
        .unwrap();
        assert_eq!(config.modifier_lib, Some(PathBuf::from("/data/modifiers")));
        assert_eq!(config.modifierset_lib, None);
        assert_eq!(config.bsdf_folder, PathBuf::from("/data/bsdf"));

        assert!(Config::from_toml_str("modifier_lib = 3").is_err());
    }

    #[test]
    fn test_from_file_and_validate() {
        let dir = tempfile::tempdir().unwrap();
        let not_a_dir = dir.path().join("file.txt");
        std::fs::write(&not_a_dir, "x").unwrap();
        let path = dir.path().join("radscene.toml");
        std::fs::write(
            &path,
            format!("modifier_lib = {:?}\n", not_a_dir.to_string_lossy()),
        )
        .unwrap();

        let config = Config::from_file(&path).unwrap();
        assert!(config.validate().is_err());
    }
}
