//! TOML-backed task configuration.
//!
//! A `TaskConfig` names a task and its shape parameters so a table build is
//! reproducible from a file instead of a command line.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult, TaskResult};
use crate::task::{Task, TaskParams};

/// Per-build configuration, persisted as TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskConfig {
    /// Registry name of the task to build.
    pub task: String,
    /// Number of digit positions (arithmetic tasks).
    #[serde(default = "default_sequence_len")]
    pub sequence_len: usize,
    /// Digit domain size (arithmetic tasks).
    #[serde(default = "default_n_digits")]
    pub n_digits: usize,
    /// Latent attribute count (Kandinsky tasks).
    #[serde(default = "default_n_concepts")]
    pub n_concepts: usize,
    /// Attribute domain size (Kandinsky tasks).
    #[serde(default = "default_n_values")]
    pub n_values: usize,
    /// Where to write the built bundle as JSON, if anywhere.
    #[serde(default)]
    pub out: Option<PathBuf>,
}

fn default_sequence_len() -> usize {
    2
}
fn default_n_digits() -> usize {
    10
}
fn default_n_concepts() -> usize {
    6
}
fn default_n_values() -> usize {
    3
}

impl TaskConfig {
    /// A config for one task with default shape parameters.
    pub fn for_task(task: Task) -> Self {
        Self {
            task: task.name().to_string(),
            sequence_len: default_sequence_len(),
            n_digits: default_n_digits(),
            n_concepts: default_n_concepts(),
            n_values: default_n_values(),
            out: None,
        }
    }

    /// Resolve the configured task name against the registry.
    pub fn task(&self) -> TaskResult<Task> {
        Task::parse(&self.task)
    }

    /// The builder parameters this config describes.
    pub fn params(&self) -> TaskParams {
        TaskParams {
            sequence_len: self.sequence_len,
            n_digits: self.n_digits,
            n_concepts: self.n_concepts,
            n_values: self.n_values,
        }
    }

    /// Load from a TOML file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Save to a TOML file.
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
                path: parent.display().to_string(),
                source,
            })?;
        }
        std::fs::write(path, content).map_err(|source| ConfigError::Write {
            path: path.display().to_string(),
            source,
        })
    }
}
