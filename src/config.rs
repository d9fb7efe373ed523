//! Configuration for the curator.
//!
//! Configuration sources (highest priority first):
//! 1. Command-line flags (applied by the CLI on top of the resolved config)
//! 2. Environment variables (CURATOR_CONFIG, CURATOR_ODDS_HIGH, CURATOR_ODDS_LOW)
//! 3. Config file (.curator/config.yaml)
//! 4. User config file (~/.curator/config.yaml)
//! 5. Defaults
//!
//! Config file discovery:
//! - CURATOR_CONFIG names a file directly
//! - Otherwise searches current directory and parents for .curator/config.yaml
//! - Falls back to ~/.curator/config.yaml

pub mod paths;

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::engine::CurationPolicy;

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<Result<ResolvedConfig, String>> = OnceLock::new();

/// Directory name searched for in the working tree and home directory
pub const CONFIG_DIR: &str = ".curator";

/// Config file name inside `CONFIG_DIR`
pub const CONFIG_FILE: &str = "config.yaml";

pub const ENV_CONFIG: &str = "CURATOR_CONFIG";
pub const ENV_ODDS_HIGH: &str = "CURATOR_ODDS_HIGH";
pub const ENV_ODDS_LOW: &str = "CURATOR_ODDS_LOW";

fn default_version() -> String {
    "1".to_string()
}

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub curation: CurationPolicy,
    #[serde(default)]
    pub finder: FinderConfig,
    #[serde(default)]
    pub view: ViewSettings,
}

fn default_finder_command() -> String {
    "gnfinder".to_string()
}
fn default_finder_args() -> Vec<String> {
    vec!["-f".to_string(), "compact".to_string()]
}
fn default_finder_timeout() -> u64 {
    300
}

/// External finder invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinderConfig {
    #[serde(default = "default_finder_command")]
    pub command: String,
    #[serde(default = "default_finder_args")]
    pub args: Vec<String>,
    #[serde(default = "default_finder_timeout")]
    pub timeout_seconds: u64,
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            command: default_finder_command(),
            args: default_finder_args(),
            timeout_seconds: default_finder_timeout(),
        }
    }
}

fn default_height() -> usize {
    40
}
fn default_width() -> usize {
    120
}
fn default_color() -> bool {
    true
}

/// Terminal layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewSettings {
    /// Pane height in rows
    #[serde(default = "default_height")]
    pub height: usize,
    #[serde(default = "default_width")]
    pub width: usize,
    #[serde(default = "default_color")]
    pub color: bool,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            height: default_height(),
            width: default_width(),
            color: default_color(),
        }
    }
}

/// Resolved configuration, ready for use
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedConfig {
    pub policy: CurationPolicy,
    pub finder: FinderConfig,
    pub view: ViewSettings,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            policy: CurationPolicy::default(),
            finder: FinderConfig::default(),
            view: ViewSettings::default(),
            config_file: None,
        }
    }
}

/// Find config file by searching `start` and its parents
fn find_config_file(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();

    loop {
        let config_path = current.join(CONFIG_DIR).join(CONFIG_FILE);
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// The user-level config file, if it exists
fn user_config_file() -> Option<PathBuf> {
    let path = dirs::home_dir()?.join(CONFIG_DIR).join(CONFIG_FILE);
    path.exists().then_some(path)
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Apply threshold overrides from the environment
fn apply_env<F>(policy: &mut CurationPolicy, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(raw) = lookup(ENV_ODDS_HIGH) {
        policy.odds_high = raw
            .trim()
            .parse()
            .with_context(|| format!("{} is not a number: {}", ENV_ODDS_HIGH, raw))?;
    }
    if let Some(raw) = lookup(ENV_ODDS_LOW) {
        policy.odds_low = raw
            .trim()
            .parse()
            .with_context(|| format!("{} is not a number: {}", ENV_ODDS_LOW, raw))?;
    }
    Ok(())
}

/// Load configuration from all sources, searching from `start`
fn load_config_from<F>(start: &Path, lookup: F) -> Result<ResolvedConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let config_file = match lookup(ENV_CONFIG) {
        Some(explicit) => Some(PathBuf::from(explicit)),
        None => find_config_file(start).or_else(user_config_file),
    };

    let mut resolved = if let Some(ref config_path) = config_file {
        let config = load_config_file(config_path)?;
        ResolvedConfig {
            policy: config.curation,
            finder: config.finder,
            view: config.view,
            config_file: config_file.clone(),
        }
    } else {
        ResolvedConfig::default()
    };

    apply_env(&mut resolved.policy, &lookup)?;
    Ok(resolved)
}

fn load_config() -> Result<ResolvedConfig> {
    let cwd = std::env::current_dir().context("Failed to determine current directory")?;
    load_config_from(&cwd, |key| std::env::var(key).ok())
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| format!("{:#}", e)));

    match result {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("{}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn write_config(root: &Path, body: &str) -> PathBuf {
        let dir = root.join(CONFIG_DIR);
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(CONFIG_FILE);
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn test_config_file_parsing() {
        let temp = TempDir::new().unwrap();
        let path = write_config(
            temp.path(),
            r#"
version: "1"
curation:
  odds_high: 250.0
  express: false
  hold_on_doubtful: true
finder:
  command: /opt/bin/gnfinder
view:
  height: 24
"#,
        );

        let config = load_config_file(&path).unwrap();
        assert_eq!(config.version, "1");
        assert_eq!(config.curation.odds_high, 250.0);
        assert_eq!(config.curation.odds_low, 1.0);
        assert!(!config.curation.express);
        assert!(config.curation.hold_on_doubtful);
        assert_eq!(config.curation.lookback, 3);
        assert_eq!(config.finder.command, "/opt/bin/gnfinder");
        assert_eq!(config.finder.args, vec!["-f", "compact"]);
        assert_eq!(config.view.height, 24);
        assert_eq!(config.view.width, 120);
    }

    #[test]
    fn test_empty_sections_use_defaults() {
        let temp = TempDir::new().unwrap();
        let path = write_config(temp.path(), "version: \"1\"\n");

        let config = load_config_file(&path).unwrap();
        assert_eq!(config.curation, CurationPolicy::default());
        assert_eq!(config.finder, FinderConfig::default());
        assert_eq!(config.view, ViewSettings::default());
    }

    #[test]
    fn test_config_found_in_parent_directory() {
        let temp = TempDir::new().unwrap();
        let path = write_config(temp.path(), "curation:\n  odds_low: 5.0\n");
        let nested = temp.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();

        let resolved = load_config_from(&nested, no_env).unwrap();
        assert_eq!(resolved.config_file, Some(path));
        assert_eq!(resolved.policy.odds_low, 5.0);
    }

    #[test]
    fn test_env_overrides_file() {
        let temp = TempDir::new().unwrap();
        write_config(temp.path(), "curation:\n  odds_high: 50.0\n  odds_low: 5.0\n");
        let env: HashMap<&str, &str> = [(ENV_ODDS_HIGH, "75.5")].into_iter().collect();

        let resolved =
            load_config_from(temp.path(), |k| env.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(resolved.policy.odds_high, 75.5);
        assert_eq!(resolved.policy.odds_low, 5.0);
    }

    #[test]
    fn test_explicit_config_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("custom.yaml");
        std::fs::write(&path, "view:\n  color: false\n").unwrap();
        let explicit = path.to_string_lossy().to_string();

        let resolved = load_config_from(temp.path(), |k| {
            (k == ENV_CONFIG).then(|| explicit.clone())
        })
        .unwrap();
        assert_eq!(resolved.config_file, Some(path));
        assert!(!resolved.view.color);
    }

    #[test]
    fn test_bad_env_value_is_an_error() {
        let mut policy = CurationPolicy::default();
        let result = apply_env(&mut policy, |k| {
            (k == ENV_ODDS_LOW).then(|| "lots".to_string())
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let path = write_config(temp.path(), "curation: [1, 2\n");
        assert!(load_config_file(&path).is_err());
    }
}
