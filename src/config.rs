// Configuration
//
// Precedence: CLI flags > LOCKR_* environment > config file > defaults.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;

use crate::error::Error;

pub const DEFAULT_KMS_KEY: &str = "alias/aws/ssm";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("unknown output format '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Prepended to relative paths.
    pub prefix: String,
    /// Environment segment placed after the prefix (prod, staging, ...).
    pub env: String,
    pub output: OutputFormat,
    /// Key used to encrypt written values. Empty means the store's default.
    pub kms_key: String,
    /// Empty means whatever the AWS SDK resolves.
    pub region: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            env: String::new(),
            output: OutputFormat::Text,
            kms_key: DEFAULT_KMS_KEY.to_string(),
            region: String::new(),
        }
    }
}

/// A config file. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    prefix: Option<String>,
    env: Option<String>,
    output: Option<String>,
    kms_key: Option<String>,
    region: Option<String>,
}

/// Values given on the command line. Empty strings count as "not given".
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub prefix: Option<String>,
    pub env: Option<String>,
    pub output: Option<OutputFormat>,
    pub kms_key: Option<String>,
    pub region: Option<String>,
}

impl Config {
    /// Build the merged configuration. `explicit` is the `--config` flag;
    /// when it is absent the default locations are searched and a missing
    /// file is not an error.
    pub fn load(explicit: Option<&Path>, overrides: &Overrides) -> Result<Self, Error> {
        let mut config = Config::default();

        let file = match explicit {
            Some(path) if !path.is_file() => {
                return Err(Error::ConfigNotFound(path.to_path_buf()))
            }
            Some(path) => Some(path.to_path_buf()),
            None => Self::search_paths().into_iter().find(|p| p.is_file()),
        };

        if let Some(path) = file {
            tracing::debug!(path = %path.display(), "loading config file");
            config.apply_file(Self::read_file(&path)?);
        }

        config.apply_env(|key| std::env::var(key).ok());
        config.apply_overrides(overrides);
        Ok(config)
    }

    /// Default config file locations, in lookup order.
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".config").join("lockr").join("config.yaml"));
            paths.push(home.join(".lockr").join("config.yaml"));
        }
        paths.push(PathBuf::from("config.yaml"));
        paths
    }

    fn read_file(path: &Path) -> Result<FileConfig, Error> {
        let contents = std::fs::read_to_string(path)?;
        let is_toml = path.extension().is_some_and(|ext| ext == "toml");

        let parsed: Result<FileConfig, String> = if is_toml {
            toml::from_str(&contents).map_err(|e| e.to_string())
        } else if contents.trim().is_empty() {
            Ok(FileConfig::default())
        } else {
            serde_yaml::from_str(&contents).map_err(|e| e.to_string())
        };

        parsed.map_err(|msg| Error::ConfigParse(format!("{}: {}", path.display(), msg)))
    }

    fn apply_file(&mut self, file: FileConfig) {
        self.set("prefix", file.prefix);
        self.set("env", file.env);
        self.set("output", file.output);
        self.set("kms_key", file.kms_key);
        self.set("region", file.region);
    }

    fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        for key in ["prefix", "env", "output", "kms_key", "region"] {
            let var = format!("LOCKR_{}", key.to_ascii_uppercase());
            self.set(key, lookup(&var));
        }
    }

    fn apply_overrides(&mut self, overrides: &Overrides) {
        let non_empty = |v: &Option<String>| v.clone().filter(|s| !s.is_empty());

        if let Some(prefix) = non_empty(&overrides.prefix) {
            self.prefix = prefix;
        }
        if let Some(env) = non_empty(&overrides.env) {
            self.env = env;
        }
        if let Some(output) = overrides.output {
            self.output = output;
        }
        if let Some(kms_key) = non_empty(&overrides.kms_key) {
            self.kms_key = kms_key;
        }
        if let Some(region) = non_empty(&overrides.region) {
            self.region = region;
        }
    }

    fn set(&mut self, key: &str, value: Option<String>) {
        let Some(value) = value else { return };
        match key {
            "prefix" => self.prefix = value,
            "env" => self.env = value,
            "kms_key" => self.kms_key = value,
            "region" => self.region = value,
            "output" => match value.parse() {
                Ok(format) => self.output = format,
                Err(msg) => tracing::warn!("{msg}, falling back to text"),
            },
            _ => {}
        }
    }

    pub fn region(&self) -> Option<&str> {
        Some(self.region.as_str()).filter(|r| !r.is_empty())
    }
}
