//! Experiment configuration loaded from YAML.
//!
//! Scenario and experiment files are parsed elsewhere; this module only
//! covers the knobs of the execution itself: how many runs, how many
//! iterations per run, the verification bounds, and the optimization
//! trial count.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crucible_protocol::VerificationBounds;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Execution knobs of one experiment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperimentConfig {
    /// A user-friendly name for the experiment.
    pub name: String,

    /// A user-friendly description.
    #[serde(default)]
    pub description: String,

    /// How many simulation runs per strategy.
    #[serde(default = "default_runs")]
    pub runs: u32,

    /// How many iterations per simulation run.
    #[serde(default = "default_iterations")]
    pub iterations_per_run: u32,

    /// Bounds on verification searches.
    #[serde(default)]
    pub bounds: VerificationBounds,

    /// How many candidate sequences optimization strategies score.
    #[serde(default = "default_trials")]
    pub optimization_trials: usize,
}

const fn default_runs() -> u32 {
    1
}

const fn default_iterations() -> u32 {
    10
}

const fn default_trials() -> usize {
    200
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            name: String::from("(unnamed experiment)"),
            description: String::new(),
            runs: default_runs(),
            iterations_per_run: default_iterations(),
            bounds: VerificationBounds::default(),
            optimization_trials: default_trials(),
        }
    }
}

impl ExperimentConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_yml::from_str(&contents)?)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yml::from_str(yaml)?)
    }
}
