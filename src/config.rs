use crate::types::TaskError;
use directories::BaseDirs;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const CONFIG_FILENAME: &str = "config.toml";
const DATABASE_FILENAME: &str = "_todo.sqlite3";

/// Contents of `~/.config/todo/config.toml`.
///
/// ```toml
/// [default]
/// editor = "nvim"
/// database = "/somewhere/tasks.sqlite3"
/// ```
#[derive(Debug, Default, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub default: Settings,
}

#[derive(Debug, Default, Deserialize, PartialEq)]
pub struct Settings {
    pub editor: Option<String>,
    pub database: Option<PathBuf>,
}

impl Config {
    /// Loads the config file from `dir`, or the defaults when there is none.
    pub fn load(dir: &Path) -> Result<Self, TaskError> {
        let path = dir.join(CONFIG_FILENAME);
        if !path.exists() {
            debug!("no config file at {}", path.display());
            return Ok(Config::default());
        }

        let content = fs::read_to_string(&path)?;
        Self::parse(&content)
            .map_err(|e| TaskError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn editor(&self) -> String {
        resolve_editor(self.default.editor.as_deref(), env::var("EDITOR").ok())
    }

    pub fn database_path(&self, dir: &Path) -> PathBuf {
        self.default
            .database
            .clone()
            .unwrap_or_else(|| dir.join(DATABASE_FILENAME))
    }
}

/// Config file wins over `$EDITOR`, which wins over the platform default.
pub fn resolve_editor(configured: Option<&str>, from_env: Option<String>) -> String {
    let non_empty = |e: &str| {
        let e = e.trim();
        (!e.is_empty()).then(|| e.to_string())
    };
    configured
        .and_then(non_empty)
        .or_else(|| from_env.as_deref().and_then(non_empty))
        .unwrap_or_else(|| platform_editor().to_string())
}

fn platform_editor() -> &'static str {
    if cfg!(target_os = "windows") {
        "notepad.exe"
    } else if cfg!(target_os = "macos") {
        "open -W -t"
    } else {
        "vim"
    }
}

/// `~/.config/todo`, created on first use.
pub fn todo_dir() -> Result<PathBuf, TaskError> {
    let base = BaseDirs::new()
        .ok_or_else(|| TaskError::Config("could not determine the home directory".to_string()))?;

    let dir = base.home_dir().join(".config").join("todo");
    if !dir.exists() {
        fs::create_dir_all(&dir)?;
    }
    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_default_section() {
        let config = Config::parse(
            r#"
            [default]
            editor = "nvim"
            database = "/tmp/tasks.sqlite3"
            "#,
        )
        .unwrap();
        assert_eq!(config.default.editor.as_deref(), Some("nvim"));
        assert_eq!(
            config.database_path(Path::new("/ignored")),
            PathBuf::from("/tmp/tasks.sqlite3")
        );
    }

    #[test]
    fn empty_file_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(
            config.database_path(Path::new("/home/me/.config/todo")),
            PathBuf::from("/home/me/.config/todo/_todo.sqlite3")
        );
    }

    #[test]
    fn malformed_file_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILENAME), "[default\neditor = ").unwrap();
        let err = Config::load(dir.path()).unwrap_err();
        assert!(matches!(err, TaskError::Config(_)));
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(Config::load(dir.path()).unwrap(), Config::default());
    }

    #[test]
    fn editor_resolution_order() {
        assert_eq!(resolve_editor(Some("emacs"), Some("nano".into())), "emacs");
        assert_eq!(resolve_editor(None, Some("nano".into())), "nano");
        assert_eq!(resolve_editor(Some("  "), Some("nano".into())), "nano");
        assert_eq!(resolve_editor(None, Some(String::new())), platform_editor());
        assert_eq!(resolve_editor(None, None), platform_editor());
    }
}
