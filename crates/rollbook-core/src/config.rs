//! rollbook configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::statistics::ReportConfig;
use crate::storage::FileStorage;
use crate::thumbnail::DEFAULT_PHOTO_BUDGET;

/// Top-level rollbook configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RollbookConfig {
    /// Directory holding the persisted keys.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Course catalog offered by the entry form. Empty accepts any course.
    #[serde(default = "default_courses")]
    pub courses: Vec<String>,
    /// Budget for an encoded photo thumbnail, in bytes. At most
    /// [`DEFAULT_PHOTO_BUDGET`].
    #[serde(default = "default_photo_budget")]
    pub photo_max_bytes: usize,
    /// Capacity of the data directory in bytes. Unlimited when unset.
    #[serde(default)]
    pub storage_quota_bytes: Option<u64>,
    /// Histogram bands for the dashboard.
    #[serde(default)]
    pub reports: ReportConfig,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./rollbook-data")
}

fn default_courses() -> Vec<String> {
    [
        "Computer Science",
        "Mathematics",
        "Physics",
        "Chemistry",
        "Biology",
        "Business",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_photo_budget() -> usize {
    DEFAULT_PHOTO_BUDGET
}

impl Default for RollbookConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            courses: default_courses(),
            photo_max_bytes: default_photo_budget(),
            storage_quota_bytes: None,
            reports: ReportConfig::default(),
        }
    }
}

impl RollbookConfig {
    /// File-backed storage rooted at `data_dir`, with the configured quota.
    pub fn open_storage(&self) -> FileStorage {
        FileStorage::new(&self.data_dir).with_capacity_limit(self.storage_quota_bytes)
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        let Some(end) = result[start..].find('}') else {
            break;
        };
        let var_name = &result[start + 2..start + end];
        let value = std::env::var(var_name).unwrap_or_default();
        result = format!("{}{}{}", &result[..start], value, &result[start + end + 1..]);
    }
    result
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `rollbook.toml` in the current directory
/// 2. `~/.config/rollbook/config.toml`
///
/// `ROLLBOOK_DATA_DIR` overrides `data_dir` from any source.
pub fn load_config() -> Result<RollbookConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<RollbookConfig> {
    let config_path = match path {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => anyhow::bail!("config file not found: {}", p.display()),
        None => {
            let local = PathBuf::from("rollbook.toml");
            if local.exists() {
                Some(local)
            } else {
                dirs_path()
                    .map(|home| home.join("config.toml"))
                    .filter(|global| global.exists())
            }
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            let config = toml::from_str::<RollbookConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?;
            tracing::debug!(path = %path.display(), "loaded config");
            config
        }
        None => RollbookConfig::default(),
    };

    if let Ok(dir) = std::env::var("ROLLBOOK_DATA_DIR") {
        if !dir.is_empty() {
            config.data_dir = PathBuf::from(dir);
        }
    }
    config.data_dir = PathBuf::from(resolve_env_vars(&config.data_dir.to_string_lossy()));

    if config.photo_max_bytes > DEFAULT_PHOTO_BUDGET {
        anyhow::bail!(
            "photo_max_bytes is {}, the largest stored photo allowed is {DEFAULT_PHOTO_BUDGET}",
            config.photo_max_bytes
        );
    }

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("rollbook"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_env_vars_basic() {
        std::env::set_var("_ROLLBOOK_TEST_VAR", "hello");
        assert_eq!(resolve_env_vars("${_ROLLBOOK_TEST_VAR}"), "hello");
        assert_eq!(
            resolve_env_vars("prefix_${_ROLLBOOK_TEST_VAR}_suffix"),
            "prefix_hello_suffix"
        );
        assert_eq!(resolve_env_vars("${unterminated"), "${unterminated");
        std::env::remove_var("_ROLLBOOK_TEST_VAR");
    }

    #[test]
    fn default_config() {
        let config = RollbookConfig::default();
        assert_eq!(config.data_dir, PathBuf::from("./rollbook-data"));
        assert!(config.courses.contains(&"Physics".to_string()));
        assert_eq!(config.photo_max_bytes, DEFAULT_PHOTO_BUDGET);
        assert!(config.storage_quota_bytes.is_none());
    }

    #[test]
    fn parse_partial_config() {
        let toml_str = r#"
data_dir = "/var/lib/rollbook"
courses = ["Law", "Medicine"]
storage_quota_bytes = 5242880

[reports]
gpa_bands = [0.0, 4.0, 10.0]
"#;
        let config: RollbookConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.courses, vec!["Law", "Medicine"]);
        assert_eq!(config.storage_quota_bytes, Some(5_242_880));
        assert_eq!(config.reports.gpa_bands, vec![0.0, 4.0, 10.0]);
        assert_eq!(
            config.reports.attendance_bands,
            ReportConfig::default().attendance_bands
        );
    }

    #[test]
    fn explicit_missing_path_is_an_error() {
        let err = load_config_from(Some(Path::new("/definitely/not/here.toml"))).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }

    #[test]
    fn explicit_path_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rollbook.toml");
        std::fs::write(&path, "photo_max_bytes = 1024\n").unwrap();
        let config = load_config_from(Some(&path)).unwrap();
        assert_eq!(config.photo_max_bytes, 1024);
    }

    #[test]
    fn photo_budget_above_store_cap_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rollbook.toml");
        std::fs::write(&path, "photo_max_bytes = 10000000\n").unwrap();
        let err = load_config_from(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("photo_max_bytes"));
    }
}
