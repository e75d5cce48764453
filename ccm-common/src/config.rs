//! Configuration loading and root folder resolution

use std::path::{Path, PathBuf};

/// Environment variable naming the root folder
pub const ROOT_FOLDER_ENV: &str = "CCM_ROOT_FOLDER";

/// Environment variable naming the remote category service base URL
pub const API_BASE_URL_ENV: &str = "CCM_API_BASE_URL";

/// Default base URL of the remote category service
pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:5780";

/// Database file name inside the root folder
const DATABASE_FILE: &str = "ccm.db";

/// Resolve the root folder, in priority order:
/// 1. Command-line argument (highest priority)
/// 2. `CCM_ROOT_FOLDER` environment variable
/// 3. `root_folder` key in the TOML config file
/// 4. OS-dependent default (fallback)
pub fn resolve_root_folder(cli_arg: Option<&str>) -> PathBuf {
    if let Some(path) = cli_arg {
        return PathBuf::from(path);
    }

    if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
        return PathBuf::from(path);
    }

    if let Some(value) = config_file_value("root_folder") {
        return PathBuf::from(value);
    }

    default_root_folder()
}

/// Resolve the remote category service base URL, same priority order as
/// [`resolve_root_folder`] (CLI > env > config file > compiled default)
pub fn resolve_api_base_url(cli_arg: Option<&str>) -> String {
    if let Some(url) = cli_arg {
        return url.to_string();
    }

    if let Ok(url) = std::env::var(API_BASE_URL_ENV) {
        return url;
    }

    if let Some(value) = config_file_value("api_base_url") {
        return value;
    }

    DEFAULT_API_BASE_URL.to_string()
}

/// Path of the catalog database inside the root folder
pub fn database_path(root_folder: &Path) -> PathBuf {
    root_folder.join(DATABASE_FILE)
}

/// Read a string value from the first config file found
fn config_file_value(key: &str) -> Option<String> {
    let path = config_file_path()?;
    let content = std::fs::read_to_string(path).ok()?;
    let config = toml::from_str::<toml::Value>(&content).ok()?;
    config.get(key).and_then(|v| v.as_str()).map(str::to_string)
}

/// Locate the config file: user config dir first, then the system location
fn config_file_path() -> Option<PathBuf> {
    if let Some(path) = dirs::config_dir().map(|d| d.join("ccm").join("config.toml")) {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system = PathBuf::from("/etc/ccm/config.toml");
        if system.exists() {
            return Some(system);
        }
    }

    None
}

/// OS-dependent default root folder
fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("ccm"))
        .unwrap_or_else(|| PathBuf::from("./ccm_data"))
}
