use directories::ProjectDirs;
use std::path::{Path, PathBuf};

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "anktui", "anktui")
}

pub fn data_root() -> PathBuf {
    if let Some(pd) = project_dirs() {
        pd.data_dir().to_path_buf()
    } else {
        // Fallback: current dir
        std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
    }
}

pub fn config_root() -> PathBuf {
    if let Some(pd) = project_dirs() {
        pd.config_dir().to_path_buf()
    } else {
        PathBuf::from("./config")
    }
}

pub fn default_config_file() -> PathBuf {
    config_root().join("config.json")
}

pub fn default_backups_dir(data_dir: &Path) -> PathBuf {
    data_dir.join("backups")
}

pub fn deck_file(data_dir: &Path, id: uuid::Uuid) -> PathBuf {
    data_dir.join(format!("{id}.json"))
}
