use crate::checker::suggestions::DEFAULT_LIMIT;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULT_LANGUAGE: &str = "en_US";
const LOCAL_CONFIG: &str = ".levspell.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub language: String,

    /// Explicit word list or `.dict` file; overrides `language`.
    pub dictionary: Option<PathBuf>,

    pub max_suggestions: usize,

    /// Print each suggestion's cost matrix alongside the report.
    pub show_matrix: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            language: DEFAULT_LANGUAGE.to_string(),
            dictionary: None,
            max_suggestions: DEFAULT_LIMIT,
            show_matrix: false,
        }
    }
}

/// One config file. Keys it leaves out fall through to the layer below.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
struct ConfigFile {
    language: Option<String>,
    dictionary: Option<PathBuf>,
    max_suggestions: Option<usize>,
    show_matrix: Option<bool>,
}

impl Config {
    /// Load configuration with priority: CLI args > local config > global config > defaults
    pub fn load(
        language: Option<String>,
        dictionary: Option<PathBuf>,
        max_suggestions: Option<usize>,
        show_matrix: bool,
    ) -> Result<Self> {
        let mut config = Self::default();

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                config = config.merge(Self::from_file(&global_path)?);
            }
        }

        let local_path = PathBuf::from(LOCAL_CONFIG);
        if local_path.exists() {
            config = config.merge(Self::from_file(&local_path)?);
        }

        if let Some(language) = language {
            config.language = language;
        }
        if let Some(dictionary) = dictionary {
            config.dictionary = Some(dictionary);
        }
        if let Some(max) = max_suggestions {
            config.max_suggestions = max;
        }
        config.show_matrix |= show_matrix;

        if config.max_suggestions == 0 {
            anyhow::bail!("max_suggestions must be at least 1");
        }

        Ok(config)
    }

    fn from_file(path: &Path) -> Result<ConfigFile> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    fn merge(mut self, file: ConfigFile) -> Self {
        if let Some(language) = file.language {
            self.language = language;
        }
        if let Some(dictionary) = file.dictionary {
            self.dictionary = Some(dictionary);
        }
        if let Some(max) = file.max_suggestions {
            self.max_suggestions = max;
        }
        if let Some(show_matrix) = file.show_matrix {
            self.show_matrix = show_matrix;
        }
        self
    }

    pub fn global_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "levspell").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Directory holding installed `.dict` files.
    pub fn data_dir() -> Option<PathBuf> {
        ProjectDirs::from("", "", "levspell").map(|dirs| dirs.data_dir().to_path_buf())
    }
}
