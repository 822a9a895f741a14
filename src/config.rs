use crate::captions::LabelCatalog;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Settings directory holding config, groups and campaigns
    pub settings_dir: PathBuf,
    /// Directory containing group ledger files
    pub groups_dir: PathBuf,
    /// Directory containing campaign catalogues
    pub campaigns_dir: PathBuf,
    /// Optional caption label catalogue (built-in English labels when unset)
    pub labels_path: Option<PathBuf>,
    /// Group ledger files to process, relative to `groups_dir` unless absolute
    pub group_files: Vec<String>,
    /// Ledger file names to skip even when listed or discovered
    pub excluded_files: Vec<String>,
    /// Attach product videos instead of images when available
    pub include_video: bool,
}

impl Default for Config {
    fn default() -> Self {
        let home_dir = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        let settings_dir = home_dir.join(".promocast");
        Self {
            groups_dir: settings_dir.join("groups"),
            campaigns_dir: settings_dir.join("campaigns"),
            settings_dir,
            labels_path: None,
            group_files: Vec::new(),
            excluded_files: Vec::new(),
            include_video: false,
        }
    }
}

impl Config {
    /// Load configuration, falling back to defaults when the file is absent.
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let config_path = path.unwrap_or_else(default_config_path);
        if !config_path.exists() {
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(&config_path)
            .with_context(|| format!("failed to read {}", config_path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("invalid config at {}", config_path.display()))
    }

    /// Write the configuration back out as TOML.
    pub fn save(&self, path: Option<PathBuf>) -> Result<()> {
        let config_path = path.unwrap_or_else(|| self.settings_dir.join("config.toml"));
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&config_path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Resolve the group ledger files for a run.
    ///
    /// Precedence: `explicit` names from the CLI, then the configured
    /// `group_files` list, then every `*.json` under `groups_dir` in sorted
    /// order. Names in `excluded_files` are dropped from all three sources.
    /// Relative names are joined onto `groups_dir`.
    pub fn resolved_group_files(&self, explicit: &[String]) -> Result<Vec<PathBuf>> {
        let names: Vec<String> = if !explicit.is_empty() {
            explicit.to_vec()
        } else if !self.group_files.is_empty() {
            self.group_files.clone()
        } else {
            self.scan_groups_dir()?
        };

        let files = names
            .into_iter()
            .filter(|name| !self.is_excluded(name))
            .map(|name| {
                let path = PathBuf::from(&name);
                if path.is_absolute() {
                    path
                } else {
                    self.groups_dir.join(path)
                }
            })
            .collect();
        Ok(files)
    }

    /// Load the caption label catalogue, or the built-in one when unconfigured.
    pub fn label_catalog(&self) -> Result<LabelCatalog> {
        match &self.labels_path {
            Some(path) => LabelCatalog::load(path),
            None => Ok(LabelCatalog::default()),
        }
    }

    fn scan_groups_dir(&self) -> Result<Vec<String>> {
        let entries = std::fs::read_dir(&self.groups_dir).with_context(|| {
            format!("failed to read groups dir {}", self.groups_dir.display())
        })?;
        let mut names: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "json"))
            .filter_map(|entry| entry.file_name().into_string().ok())
            .collect();
        names.sort();
        Ok(names)
    }

    fn is_excluded(&self, name: &str) -> bool {
        let file_name = PathBuf::from(name)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| name.to_string());
        self.excluded_files.iter().any(|ex| *ex == file_name)
    }
}

fn default_config_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".promocast")
        .join("config.toml")
}
