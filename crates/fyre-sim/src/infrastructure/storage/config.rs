//! TOML-backed application configuration.
//!
//! The simulator keeps one small config file at the platform-appropriate
//! location:
//!
//! - Windows:  `%APPDATA%\FyreFyre\config.toml`
//! - Linux:    `$XDG_CONFIG_HOME/fyrefyre/config.toml` (or `~/.config/…`)
//! - macOS:    `~/Library/Application Support/FyreFyre/config.toml`
//!
//! # Defaulting happens at two levels (for beginners)
//!
//! 1. No file at all: [`load_config`] returns `AppConfig::default()`, so the
//!    first run needs no setup step.
//! 2. A file that omits a field: `#[serde(default = "…")]` fills in that one
//!    field, so a config written by an older build keeps working after an
//!    upgrade adds new knobs.
//!
//! A file that is present but malformed is an error, not a silent fall-back
//! to defaults.  A complete file looks like:
//!
//! ```toml
//! [simulator]
//! log_level = "debug"
//!
//! [canvas]
//! width = 1024
//! height = 768
//!
//! [[default_services]]
//! name = "website"
//! port = 80
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by config file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The environment names no base directory to put the config in.
    #[error("no platform config directory")]
    NoPlatformConfigDir,

    /// Reading or writing the file failed.
    #[error("config I/O at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file exists but is not valid config TOML.
    #[error("config parse: {0}")]
    Parse(#[from] toml::de::Error),

    /// The in-memory config could not be rendered as TOML.
    #[error("config serialize: {0}")]
    Serialize(#[from] toml::ser::Error),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Everything the simulator persists between sessions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    pub simulator: SimulatorConfig,
    pub canvas: CanvasConfig,
    /// Service catalogue offered when a new server is created.
    #[serde(default = "default_service_catalogue")]
    pub default_services: Vec<ServiceEntry>,
}

/// General simulator behaviour settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimulatorConfig {
    /// Config schema version, written on save so later builds can migrate
    /// old files.
    #[serde(default = "default_version")]
    pub version: String,
    /// `tracing` filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Canvas dimensions in pixels.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CanvasConfig {
    #[serde(default = "default_canvas_width")]
    pub width: u32,
    #[serde(default = "default_canvas_height")]
    pub height: u32,
}

/// One entry in the default service catalogue.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServiceEntry {
    /// Service name shown in the UI (e.g. `"website"`).
    pub name: String,
    /// TCP port the service listens on.
    pub port: u16,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_version() -> String {
    "1.0".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_canvas_width() -> u32 {
    800
}
fn default_canvas_height() -> u32 {
    600
}

/// The well-known services every fresh server can offer.
fn default_service_catalogue() -> Vec<ServiceEntry> {
    [
        ("website", 80),
        ("email", 25),
        ("ftp", 21),
        ("ssh", 22),
        ("webapp", 8080),
        ("database", 3306),
    ]
    .into_iter()
    .map(|(name, port)| ServiceEntry {
        name: name.to_string(),
        port,
    })
    .collect()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            simulator: SimulatorConfig::default(),
            canvas: CanvasConfig::default(),
            default_services: default_service_catalogue(),
        }
    }
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            log_level: default_log_level(),
        }
    }
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: default_canvas_width(),
            height: default_canvas_height(),
        }
    }
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Platform directory that holds FyreFyre's config.
///
/// # Errors
///
/// [`ConfigError::NoPlatformConfigDir`] when the environment names no base
/// directory (stripped containers, unusual platforms).
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    platform_config_dir().ok_or(ConfigError::NoPlatformConfigDir)
}

/// Full path of the config file.
///
/// # Errors
///
/// Same as [`config_dir`].
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join("config.toml"))
}

/// Reads the config file, or returns defaults if none exists yet.
///
/// # Errors
///
/// [`ConfigError::Io`] for any read failure other than "not found",
/// [`ConfigError::Parse`] when the file exists but is not valid TOML.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    read_config_from(&config_file_path()?)
}

/// Writes `config` to the platform config file, creating the directory on
/// first save.
///
/// # Errors
///
/// [`ConfigError::Serialize`] when the config cannot be rendered,
/// [`ConfigError::Io`] for file-system failures.
pub fn save_config(config: &AppConfig) -> Result<(), ConfigError> {
    write_config_to(&config_file_path()?, config)
}

fn read_config_from(path: &Path) -> Result<AppConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(toml::from_str(&text)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(AppConfig::default()),
        Err(e) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

fn write_config_to(path: &Path, config: &AppConfig) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }
    let rendered = toml::to_string_pretty(config)?;
    std::fs::write(path, rendered).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Per-platform directory for FyreFyre's config, app folder included.
fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        // %APPDATA%\FyreFyre
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("FyreFyre"))
    }

    #[cfg(target_os = "linux")]
    {
        // $XDG_CONFIG_HOME/fyrefyre, falling back to ~/.config/fyrefyre
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("fyrefyre"))
    }

    #[cfg(target_os = "macos")]
    {
        // ~/Library/Application Support/FyreFyre
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("FyreFyre")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
