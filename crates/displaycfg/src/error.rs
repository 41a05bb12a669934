//! Top-level error taxonomy and process exit codes.
//!
//! Every failure that reaches the user is one of five classes, and the class
//! alone decides the exit code:
//!
//! | Class         | Raised by                                             | Exit |
//! |---------------|-------------------------------------------------------|------|
//! | `Input`       | malformed flags, unreadable config, no saved layout   | 1    |
//! | `Resolution`  | a layout that cannot be resolved against the catalog  | 1    |
//! | `Transaction` | the platform refusing begin / set / commit            | 1    |
//! | `NotFound`    | `--modes` naming a device that is not connected       | -1   |
//! | `Unexpected`  | platform enumeration failures, unwritable stdout      | 2    |
//!
//! Neither `Input` nor `Resolution` ever reaches the applier, so the displays
//! are untouched on those paths.  `Transaction` failures have already been
//! cancelled by the engine when they arrive here.

use thiserror::Error;

use displaycfg_core::application::catalog::CatalogError;
use displaycfg_core::application::engine::EngineError;
use displaycfg_core::application::transaction::ApplyError;
use displaycfg_core::domain::resolver::ResolveError;

use crate::cli::InputError;
use crate::infrastructure::config::ConfigError;

/// Success, including "nothing to do".
pub const EXIT_SUCCESS: i32 = 0;
/// Malformed input or a failed apply.
pub const EXIT_FAILURE: i32 = 1;
/// Anything unclassified, including a caught panic.
pub const EXIT_UNEXPECTED: i32 = 2;
/// A device queried by id is not connected.
pub const EXIT_NOT_FOUND: i32 = -1;

/// Every error the command-line tool reports.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Resolution(#[from] ResolveError),

    #[error(transparent)]
    Transaction(#[from] ApplyError),

    /// Holds the id exactly as the user typed it.
    #[error("There is no connected device with the device ID: {0}")]
    NotFound(i64),

    #[error("unexpected failure: {0}")]
    Unexpected(String),
}

impl AppError {
    /// Process exit code for this error class.
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::Input(_) | AppError::Resolution(_) | AppError::Transaction(_) => {
                EXIT_FAILURE
            }
            AppError::NotFound(_) => EXIT_NOT_FOUND,
            AppError::Unexpected(_) => EXIT_UNEXPECTED,
        }
    }
}

impl From<CatalogError> for AppError {
    fn from(e: CatalogError) -> Self {
        match e {
            CatalogError::NotFound(id) | CatalogError::DeviceUnavailable(id) => {
                AppError::NotFound(i64::from(id.0))
            }
            other => AppError::Unexpected(other.to_string()),
        }
    }
}

impl From<EngineError> for AppError {
    fn from(e: EngineError) -> Self {
        match e {
            EngineError::Catalog(e) => e.into(),
            EngineError::Resolve(e) => AppError::Resolution(e),
            EngineError::Transaction(e) => AppError::Transaction(e),
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(e: ConfigError) -> Self {
        AppError::Input(InputError::Config(e))
    }
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        AppError::Unexpected(format!("could not write report: {e}"))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
