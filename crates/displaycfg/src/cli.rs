//! Command-line surface: flag definitions, input parsing, and [`run`].
//!
//! ```text
//! displaycfg [OPTIONS]
//!
//!   -Q, --query                       list every connected display
//!   -M, --modes <DEVICE_ID>           list the modes of one display
//!   -O, --rotation <DEGREES>          0, 90, 180 or 270
//!   -S, --resolution <WIDTH> <HEIGHT> grid cell size
//!   -F, --refresh <HZ>                preferred refresh rate
//!   -C, --columns <N>                 grid columns
//!   -R, --rows <N>                    grid rows
//!   -P, --persistence <0|1>           0 = session, 1 = permanent
//!   -D, --display <ID,X,Y,W,H>...     explicit frames, overriding the grid
//!   -L, --from-config                 apply the layout saved in the config file
//!       --save-layout                 save the frames applied by --display
//!       --json                        JSON output for --query and --modes
//!       --config <PATH>               alternate config file
//!   -v, --verbose                     log progress to stderr
//! ```
//!
//! # Dispatch precedence
//!
//! Only one command runs per invocation:
//! `--display` > `--from-config` > `--query` > `--modes` > grid apply (any
//! layout flag) > usage.
//!
//! # Setting precedence
//!
//! A flag given on the command line wins over the config file's `[layout]`
//! section, which wins over the built-in default.

use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{ArgAction, CommandFactory, Parser};
use thiserror::Error;
use tracing::{debug, info, warn};

use displaycfg_core::application::catalog::DeviceCatalog;
use displaycfg_core::application::engine::ApplyOutcome;
use displaycfg_core::application::transaction::TransactionApplier;
use displaycfg_core::domain::frame::{Frame, Size};
use displaycfg_core::domain::intent::{Orientation, Persistence};

use crate::application::commands::{run_command, Command, CommandOutcome, LayoutRequest};
use crate::application::report::ReportFormat;
use crate::error::AppError;
use crate::infrastructure::config::{save_config, AppConfig, ConfigError, DisplayEntry};

/// Number of integers in one `--display` tuple: id, x, y, width, height.
const DISPLAY_TUPLE_LEN: usize = 5;

/// Error type for command-line input that cannot be turned into a command.
#[derive(Debug, Error)]
pub enum InputError {
    /// The `--display` values do not form complete, in-range 5-tuples.
    #[error("Could not parse input display parameters.")]
    MalformedDisplay { reason: String },

    /// `--from-config` was given but the config file has no saved frames.
    #[error("no saved display layout in {0}")]
    NoSavedLayout(PathBuf),

    /// The config file could not be read or written.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

fn malformed(reason: impl Into<String>) -> InputError {
    InputError::MalformedDisplay {
        reason: reason.into(),
    }
}

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Query and arrange the displays attached to this machine.
#[derive(Debug, Parser)]
#[command(
    name = "displaycfg",
    about = "Query and arrange the displays attached to this machine",
    version
)]
pub struct Cli {
    /// Get all connected displays.
    #[arg(short = 'Q', long)]
    pub query: bool,

    /// Query the display modes of the given device id.
    #[arg(short = 'M', long, value_name = "DEVICE_ID", allow_negative_numbers = true)]
    pub modes: Option<i64>,

    /// Desired rotation in degrees (0, 90, 180, 270).
    ///
    /// Any other value means 0.  Without this flag rotation is left alone.
    #[arg(short = 'O', long, value_name = "DEGREES")]
    pub rotation: Option<String>,

    /// Target resolution of each grid cell.
    #[arg(short = 'S', long, num_args = 2, value_names = ["WIDTH", "HEIGHT"])]
    pub resolution: Option<Vec<u32>>,

    /// Preferred refresh rate in Hz.
    #[arg(short = 'F', long, value_name = "HZ")]
    pub refresh: Option<f64>,

    /// Number of columns of displays [default: 1].
    #[arg(short = 'C', long, value_name = "N", allow_negative_numbers = true)]
    pub columns: Option<i64>,

    /// Number of rows of displays [default: 1].
    #[arg(short = 'R', long, value_name = "N", allow_negative_numbers = true)]
    pub rows: Option<i64>,

    /// Configuration persistence (0 = temporary, 1 = permanent) [default: 1].
    #[arg(short = 'P', long, value_name = "0|1", allow_negative_numbers = true)]
    pub persistence: Option<i64>,

    /// Configure each display individually.
    ///
    /// Expects a sequence of 5-tuples: device id, global x, global y, width,
    /// height (in that order), separated by commas or spaces.  The grid
    /// settings are ignored when this is given.
    #[arg(
        short = 'D',
        long,
        value_name = "ID,X,Y,W,H",
        num_args = 1..,
        value_delimiter = ',',
        allow_negative_numbers = true,
        action = ArgAction::Append
    )]
    pub display: Vec<String>,

    /// Apply the display layout saved in the config file.
    #[arg(short = 'L', long)]
    pub from_config: bool,

    /// Save the frames applied by --display to the config file.
    #[arg(long)]
    pub save_layout: bool,

    /// Print --query and --modes reports as JSON.
    #[arg(long)]
    pub json: bool,

    /// Use this config file instead of the platform default.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log progress to stderr.
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

impl Cli {
    /// Returns `true` if any flag that shapes a grid apply was given.
    pub fn has_layout_flags(&self) -> bool {
        self.rotation.is_some()
            || self.resolution.is_some()
            || self.refresh.is_some()
            || self.columns.is_some()
            || self.rows.is_some()
            || self.persistence.is_some()
    }

    fn report_format(&self) -> ReportFormat {
        if self.json {
            ReportFormat::Json
        } else {
            ReportFormat::Text
        }
    }

    /// Builds the one command this invocation runs.
    ///
    /// # Errors
    ///
    /// - [`InputError::MalformedDisplay`] for bad `--display` values.
    /// - [`InputError::NoSavedLayout`] for `--from-config` with nothing saved.
    pub fn to_command(&self, config: &AppConfig, config_path: &Path) -> Result<Command, InputError> {
        if !self.display.is_empty() {
            let frames = parse_display_tuples(&self.display)?;
            return Ok(Command::ApplyLayout(LayoutRequest {
                frames,
                ..self.layout_request(config)
            }));
        }
        if self.from_config {
            if config.layout.displays.is_empty() {
                return Err(InputError::NoSavedLayout(config_path.to_path_buf()));
            }
            return Ok(Command::ApplySaved {
                frames: config.layout.displays.iter().map(DisplayEntry::to_frame).collect(),
                persistence: self.persistence_or(config),
            });
        }
        if self.query {
            return Ok(Command::Query {
                format: self.report_format(),
            });
        }
        if let Some(device) = self.modes {
            return Ok(Command::Modes {
                device,
                format: self.report_format(),
            });
        }
        if self.has_layout_flags() {
            return Ok(Command::ApplyLayout(self.layout_request(config)));
        }
        Ok(Command::Usage)
    }

    fn persistence_or(&self, config: &AppConfig) -> Persistence {
        self.persistence
            .map(persistence_from_flag)
            .unwrap_or(config.layout.persistence)
    }

    fn layout_request(&self, config: &AppConfig) -> LayoutRequest {
        LayoutRequest {
            resolution: self.resolution.as_deref().and_then(|r| match r {
                [width, height] => Some(Size {
                    width: *width,
                    height: *height,
                }),
                _ => None,
            }),
            columns: grid_extent_from_flag("columns", self.columns, config.layout.columns),
            rows: grid_extent_from_flag("rows", self.rows, config.layout.rows),
            orientation: self.rotation.as_deref().map(parse_rotation),
            refresh_rate: self.refresh,
            persistence: self.persistence_or(config),
            frames: Vec::new(),
        }
    }
}

// ── Input parsing ─────────────────────────────────────────────────────────────

/// Parses `--display` values into frames.
///
/// Values may hold several integers separated by commas or whitespace; the
/// flattened sequence is read as `(id, x, y, width, height)` tuples.
///
/// # Errors
///
/// Returns [`InputError::MalformedDisplay`] if a token is not an integer, the
/// count is not a multiple of five, or a value is out of range (negative id
/// or size, coordinates beyond `i32`).
pub fn parse_display_tuples(values: &[String]) -> Result<Vec<Frame>, InputError> {
    let numbers = values
        .iter()
        .flat_map(|v| v.split(|c: char| c == ',' || c.is_whitespace()))
        .filter(|token| !token.is_empty())
        .map(|token| {
            token
                .parse::<i64>()
                .map_err(|_| malformed(format!("'{token}' is not an integer")))
        })
        .collect::<Result<Vec<i64>, _>>()?;

    if numbers.is_empty() || numbers.len() % DISPLAY_TUPLE_LEN != 0 {
        return Err(malformed(format!(
            "{} values do not form complete (id, x, y, width, height) tuples",
            numbers.len()
        )));
    }

    numbers
        .chunks_exact(DISPLAY_TUPLE_LEN)
        .map(|t| {
            let id = u32::try_from(t[0]).map_err(|_| malformed(format!("invalid device id {}", t[0])))?;
            let x = i32::try_from(t[1]).map_err(|_| malformed(format!("x {} out of range", t[1])))?;
            let y = i32::try_from(t[2]).map_err(|_| malformed(format!("y {} out of range", t[2])))?;
            let width = u32::try_from(t[3]).map_err(|_| malformed(format!("invalid width {}", t[3])))?;
            let height = u32::try_from(t[4]).map_err(|_| malformed(format!("invalid height {}", t[4])))?;
            Ok(Frame::new(id, x, y, width, height))
        })
        .collect()
}

/// Maps a `--rotation` value to an orientation; anything unrecognized is `Normal`.
pub fn parse_rotation(value: &str) -> Orientation {
    match value.trim() {
        "0" => Orientation::Normal,
        "90" => Orientation::Rotate90,
        "180" => Orientation::Rotate180,
        "270" => Orientation::Rotate270,
        other => {
            warn!(rotation = other, "unrecognized rotation; using 0");
            Orientation::Normal
        }
    }
}

/// Maps a `--persistence` value to a level.
///
/// | Flag  | Level       |
/// |-------|-------------|
/// | ≤ 0   | `Session`   |
/// | ≥ 1   | `Permanent` |
///
/// Application-only persistence is reachable through the config file only.
pub fn persistence_from_flag(value: i64) -> Persistence {
    if !(0..=1).contains(&value) {
        warn!(persistence = value, "persistence flag out of range; clamping");
    }
    if value <= 0 {
        Persistence::Session
    } else {
        Persistence::Permanent
    }
}

/// Maps a `--columns`/`--rows` value to a grid extent.
///
/// Values ≤ 0 are ignored and `fallback` is kept; values beyond `u32` saturate.
pub fn grid_extent_from_flag(axis: &str, value: Option<i64>, fallback: u32) -> u32 {
    match value {
        None => fallback,
        Some(n) if n <= 0 => {
            warn!(axis, value = n, fallback, "non-positive grid extent ignored");
            fallback
        }
        Some(n) => u32::try_from(n).unwrap_or(u32::MAX),
    }
}

// ── Run ───────────────────────────────────────────────────────────────────────

/// Runs one invocation against the given collaborators.
///
/// `config` is the already-loaded configuration and `config_path` the file it
/// came from; with `--save-layout` the applied frames are written back there.
///
/// # Errors
///
/// Any [`AppError`]; see [`AppError::exit_code`] for the exit status of each.
pub fn run(
    cli: &Cli,
    config: &mut AppConfig,
    config_path: &Path,
    catalog: &dyn DeviceCatalog,
    applier: &mut dyn TransactionApplier,
    out: &mut dyn Write,
) -> Result<(), AppError> {
    let command = cli.to_command(config, config_path).map_err(|e| {
        if let InputError::MalformedDisplay { reason } = &e {
            debug!(%reason, "rejected --display input");
        }
        e
    })?;
    debug!(?command, "dispatching");

    match run_command(&command, catalog, applier, out)? {
        CommandOutcome::UsageRequested => {
            writeln!(out, "{}", Cli::command().render_help())?;
        }
        CommandOutcome::Applied(outcome) if cli.save_layout => {
            save_applied_layout(&command, &outcome, catalog, config, config_path)?;
        }
        CommandOutcome::Applied(_) | CommandOutcome::Reported => {}
    }
    Ok(())
}

fn save_applied_layout(
    command: &Command,
    outcome: &ApplyOutcome,
    catalog: &dyn DeviceCatalog,
    config: &mut AppConfig,
    config_path: &Path,
) -> Result<(), AppError> {
    let frames = match (command, outcome) {
        (Command::ApplyLayout(request), ApplyOutcome::Committed { .. })
            if !request.frames.is_empty() =>
        {
            &request.frames
        }
        _ => {
            warn!("--save-layout only saves frames applied with --display; nothing saved");
            return Ok(());
        }
    };

    config.layout.displays = frames
        .iter()
        .map(|frame| {
            let serial = catalog
                .find_device(frame.device_id)
                .ok()
                .map(|device| device.serial_number);
            DisplayEntry::from_frame(frame, serial)
        })
        .collect();
    save_config(config_path, config)?;
    info!(
        path = %config_path.display(),
        frames = frames.len(),
        "saved display layout"
    );
    Ok(())
}

/// Writes the user-facing message for `err`.
///
/// A missing device is reported on stdout like a query result; everything
/// else goes to `err_out`.
pub fn report_failure(err: &AppError, out: &mut dyn Write, err_out: &mut dyn Write) {
    let written = match err {
        AppError::NotFound(_) => writeln!(out, "{err}\nQuery failed."),
        _ => writeln!(err_out, "{err}"),
    };
    if let Err(e) = written {
        warn!(error = %e, "could not write failure message");
        eprintln!("{err}");
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
