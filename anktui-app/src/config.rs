use anktui_core::{session_limit, CoreError, EF_MIN};
use anktui_json::{paths, BackupPolicy};
use anyhow::{bail, Context, Result};
use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub const THEMES: [&str; 2] = ["default", "mono"];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StudySessionConfig {
    pub show_progress: bool,
    pub cards_per_session: i64,
    /// Parsed and validated; the session builder does not apply a daily cap.
    pub new_cards_per_day: i64,
}

impl Default for StudySessionConfig {
    fn default() -> Self {
        Self {
            show_progress: true,
            cards_per_session: 20,
            new_cards_per_day: 10,
        }
    }
}

/// Contents of `config.json`. Missing keys fall back to the defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Empty means the platform data dir (or `./data` when it exists).
    pub data_directory: String,
    pub auto_create_data_dir: bool,
    pub default_ease_factor: f64,
    pub theme: String,
    pub backup_enabled: bool,
    /// Empty means `<data dir>/backups`.
    pub backup_directory: String,
    pub max_backups: usize,
    pub study_session: StudySessionConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_directory: String::new(),
            auto_create_data_dir: true,
            default_ease_factor: anktui_core::EF_DEFAULT,
            theme: "default".to_string(),
            backup_enabled: false,
            backup_directory: String::new(),
            max_backups: 10,
            study_session: StudySessionConfig::default(),
        }
    }
}

impl Config {
    /// Reads the file at `path`, or returns defaults when it does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("config file not found at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let cfg: Config = serde_json::from_str(&raw)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        info!("loaded configuration from {}", path.display());
        Ok(cfg)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating config dir {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).with_context(|| format!("writing config file {}", path.display()))?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        session_limit(self.study_session.cards_per_session)?;
        if self.study_session.new_cards_per_day < 0 {
            return Err(CoreError::invalid("new_cards_per_day must not be negative"));
        }
        if !(self.default_ease_factor >= EF_MIN) {
            return Err(CoreError::invalid(format!(
                "default_ease_factor must be at least {EF_MIN} (got {})",
                self.default_ease_factor
            )));
        }
        if !THEMES.contains(&self.theme.as_str()) {
            return Err(CoreError::invalid(format!(
                "unknown theme '{}' (expected one of: {})",
                self.theme,
                THEMES.join(", ")
            )));
        }
        Ok(())
    }

    pub fn session_size(&self) -> Result<usize, CoreError> {
        session_limit(self.study_session.cards_per_session)
    }

    pub fn data_dir(&self) -> PathBuf {
        if self.data_directory.trim().is_empty() {
            let local = PathBuf::from("./data");
            if local.is_dir() {
                return local;
            }
            return paths::data_root();
        }
        expand_tilde(&self.data_directory)
    }

    pub fn backup_policy(&self) -> Option<BackupPolicy> {
        if !self.backup_enabled {
            return None;
        }
        let dir = if self.backup_directory.trim().is_empty() {
            paths::default_backups_dir(&self.data_dir())
        } else {
            expand_tilde(&self.backup_directory)
        };
        Some(BackupPolicy {
            dir,
            keep: self.max_backups,
        })
    }

    /// Makes sure the data directory exists, creating it only when allowed.
    pub fn prepare_data_dir(&self) -> Result<PathBuf> {
        let dir = self.data_dir();
        if !dir.is_dir() {
            if !self.auto_create_data_dir {
                bail!(
                    "data directory {} does not exist and auto_create_data_dir is off",
                    dir.display()
                );
            }
            fs::create_dir_all(&dir)
                .with_context(|| format!("creating data directory {}", dir.display()))?;
        }
        Ok(dir)
    }
}

pub fn expand_tilde(raw: &str) -> PathBuf {
    let Some(rest) = raw.strip_prefix('~') else {
        return PathBuf::from(raw);
    };
    match BaseDirs::new() {
        Some(dirs) => dirs.home_dir().join(rest.trim_start_matches(['/', '\\'])),
        None => PathBuf::from(raw),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let cfg = Config::load(&dir.path().join("config.json")).unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.session_size().unwrap(), 20);
        assert!(cfg.validate().is_ok());
        assert!(cfg.backup_policy().is_none());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{ "theme": "mono", "study_session": { "cards_per_session": 5 } }"#,
        )
        .unwrap();

        let cfg = Config::load(&path).unwrap();
        assert_eq!(cfg.theme, "mono");
        assert_eq!(cfg.study_session.cards_per_session, 5);
        assert!(cfg.study_session.show_progress);
        assert_eq!(cfg.default_ease_factor, 2.5);
        assert!(cfg.auto_create_data_dir);
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let mut cfg = Config::default();
        cfg.backup_enabled = true;
        cfg.max_backups = 3;
        cfg.save(&path).unwrap();
        assert_eq!(Config::load(&path).unwrap(), cfg);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ nope").unwrap();
        assert!(Config::load(&path).is_err());
    }

    #[test]
    fn validation_rejects_bad_values() {
        let mut cfg = Config::default();
        cfg.study_session.cards_per_session = -1;
        assert!(matches!(cfg.validate(), Err(CoreError::InvalidArgument(_))));
        assert!(cfg.session_size().is_err());

        let mut cfg = Config::default();
        cfg.default_ease_factor = 1.0;
        assert!(matches!(cfg.validate(), Err(CoreError::InvalidArgument(_))));

        let mut cfg = Config::default();
        cfg.theme = "neon".into();
        assert!(matches!(cfg.validate(), Err(CoreError::InvalidArgument(_))));

        let mut cfg = Config::default();
        cfg.study_session.new_cards_per_day = -3;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn explicit_dirs_and_backups() {
        let dir = tempdir().unwrap();
        let mut cfg = Config::default();
        cfg.data_directory = dir.path().join("decks").to_string_lossy().into_owned();
        cfg.backup_enabled = true;

        let policy = cfg.backup_policy().unwrap();
        assert_eq!(policy.dir, dir.path().join("decks").join("backups"));
        assert_eq!(policy.keep, 10);

        let made = cfg.prepare_data_dir().unwrap();
        assert!(made.is_dir());

        cfg.data_directory = dir.path().join("missing").to_string_lossy().into_owned();
        cfg.auto_create_data_dir = false;
        assert!(cfg.prepare_data_dir().is_err());
    }

    #[test]
    fn tilde_expands_to_home() {
        assert_eq!(expand_tilde("/abs/path"), PathBuf::from("/abs/path"));
        if let Some(dirs) = BaseDirs::new() {
            assert_eq!(expand_tilde("~/cards"), dirs.home_dir().join("cards"));
        }
    }
}
