//! Platform-specific configuration paths.
//!
//! - Linux: `~/.config/varidelay/config.toml`
//! - macOS: `~/Library/Application Support/varidelay/config.toml`
//! - Windows: `%APPDATA%\varidelay\config.toml`

use std::path::PathBuf;

/// Application name used for directory paths.
pub const APP_NAME: &str = "varidelay";

/// File name of the settings file.
pub const CONFIG_FILE: &str = "config.toml";

/// Returns the user-specific configuration directory.
///
/// Falls back to the current directory if the platform config directory
/// cannot be determined.
pub fn user_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Returns the default settings file path.
pub fn default_config_path() -> PathBuf {
    user_config_dir().join(CONFIG_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_path_layout() {
        let path = default_config_path();
        assert!(path.ends_with("varidelay/config.toml"));
        assert_eq!(path.parent(), Some(user_config_dir().as_path()));
    }
}
