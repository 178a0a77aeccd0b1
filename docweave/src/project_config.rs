//! Project configuration from docweave.toml

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Name of the project configuration file at the project root
pub const PROJECT_FILE: &str = "docweave.toml";

/// Project-level configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Human-readable project name
    pub name: String,

    /// Project author
    pub author: String,

    /// Project version
    #[serde(default = "default_version")]
    pub version: String,

    /// Optional project description
    pub description: Option<String>,

    /// Creation timestamp, carried as an opaque string
    pub created: Option<String>,
}

fn default_version() -> String {
    "0.1.0".to_string()
}

impl ProjectConfig {
    /// Create a configuration with default version and no description
    pub fn new(name: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            author: author.into(),
            version: default_version(),
            description: None,
            created: None,
        }
    }

    /// Load configuration from a docweave.toml file
    ///
    /// # Parameters
    /// * `path` - Path to the docweave.toml configuration file
    ///
    /// # Returns
    /// * `Ok(ProjectConfig)` - Successfully loaded configuration
    /// * `Err(ProjectConfigError)` - Error reading or parsing the configuration file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ProjectConfigError> {
        let content = fs::read_to_string(&path)?;
        let config: ProjectConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a docweave.toml file
    ///
    /// # Parameters
    /// * `path` - Path where the docweave.toml file will be written
    ///
    /// # Returns
    /// * `Ok(())` - Successfully saved configuration
    /// * `Err(ProjectConfigError)` - Error serializing or writing the configuration file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ProjectConfigError> {
        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }
}

/// Errors that can occur when loading or saving project configuration
#[derive(Error, Debug)]
pub enum ProjectConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}
