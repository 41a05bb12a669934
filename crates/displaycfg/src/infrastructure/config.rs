//! TOML-based configuration for the command-line tool.
//!
//! Reads and writes [`AppConfig`] at the platform-appropriate location:
//! - Windows:  `%APPDATA%\displaycfg\config.toml`
//! - Linux:    `$XDG_CONFIG_HOME/displaycfg/config.toml` or `~/.config/displaycfg/config.toml`
//! - macOS:    `~/Library/Application Support/displaycfg/config.toml`
//!
//! `--config <path>` replaces that location for one invocation.
//!
//! ```toml
//! [logging]
//! level = "warn"
//!
//! [layout]
//! columns = 2
//! rows = 1
//! persistence = "session"
//!
//! [[layout.displays]]
//! device_id = 69733382
//! serial_number = 16843009
//! x = 0
//! y = 0
//! width = 1920
//! height = 1080
//! ```
//!
//! Every field has a default, so a missing file, a missing section, or a
//! file written by an older version all load cleanly.  Values on the command
//! line always take precedence over values read from here.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use displaycfg_core::domain::frame::Frame;
use displaycfg_core::domain::intent::Persistence;

/// Directory name under the platform config base.
const APP_DIR: &str = "displaycfg";

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be serialized to TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub layout: LayoutConfig,
}

/// Diagnostic output settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// `tracing` filter used when `RUST_LOG` is unset, e.g. `"warn"` or
    /// `"displaycfg_core=debug"`.
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// Layout defaults and the saved explicit layout.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LayoutConfig {
    /// Grid columns used when `--columns` is absent.
    #[serde(default = "default_grid_dimension")]
    pub columns: u32,
    /// Grid rows used when `--rows` is absent.
    #[serde(default = "default_grid_dimension")]
    pub rows: u32,
    /// Persistence used when `--persistence` is absent.
    #[serde(default)]
    pub persistence: Persistence,
    /// Frames applied by `--from-config` and written by `--save-layout`.
    #[serde(default)]
    pub displays: Vec<DisplayEntry>,
}

/// One saved frame.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct DisplayEntry {
    pub device_id: u32,
    /// Lets the frame follow its display when the id changes across reconnects.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<u32>,
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl DisplayEntry {
    /// Records `frame`, tagging it with the serial number of the display it was applied to.
    pub fn from_frame(frame: &Frame, serial_number: Option<u32>) -> Self {
        Self {
            device_id: frame.device_id.0,
            serial_number: serial_number.or(frame.serial_number),
            x: frame.origin.x,
            y: frame.origin.y,
            width: frame.size.width,
            height: frame.size.height,
        }
    }

    pub fn to_frame(&self) -> Frame {
        let frame = Frame::new(self.device_id, self.x, self.y, self.width, self.height);
        match self.serial_number {
            Some(serial) => frame.with_serial(serial),
            None => frame,
        }
    }
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_log_level() -> String {
    "warn".to_string()
}
fn default_grid_dimension() -> u32 {
    1
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            columns: default_grid_dimension(),
            rows: default_grid_dimension(),
            persistence: Persistence::default(),
            displays: Vec::new(),
        }
    }
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Determines the platform-appropriate directory for the config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] when the platform config base
/// directory cannot be determined from the environment.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    platform_config_dir().ok_or(ConfigError::NoPlatformConfigDir)
}

/// Resolves the full path to the default config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] if the base directory cannot be
/// determined.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join("config.toml"))
}

/// Returns `explicit` when given, otherwise the default config file path.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] if no path was given and the
/// base directory cannot be determined.
pub fn resolve_config_path(explicit: Option<&Path>) -> Result<PathBuf, ConfigError> {
    match explicit {
        Some(path) => Ok(path.to_path_buf()),
        None => config_file_path(),
    }
}

/// Loads [`AppConfig`] from `path`, returning `AppConfig::default()` if the
/// file does not exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => {
            let cfg: AppConfig = toml::from_str(&content)?;
            debug!(path = %path.display(), "loaded configuration");
            Ok(cfg)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(AppConfig::default()),
        Err(e) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Writes `config` to `path`, creating the parent directory if needed.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system failures or
/// [`ConfigError::Serialize`] if serialization fails.
pub fn save_config(path: &Path, config: &AppConfig) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), "saved configuration");
    Ok(())
}

/// Resolves the platform config directory including the `displaycfg` subdirectory.
fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join(APP_DIR))
    }

    #[cfg(target_os = "linux")]
    {
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join(APP_DIR))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join(APP_DIR)
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
