//! Command dispatch: one invocation, one command.
//!
//! ```text
//! Command::Query       → DeviceCatalog::list_devices → report::write_devices
//! Command::Modes       → find_device + list_modes    → report::write_modes
//! Command::ApplyLayout → LayoutEngine setters        → apply_layout_changes
//! Command::ApplySaved  → LayoutEngine                → apply_changes
//! Command::Usage       → nothing; the caller prints help
//! ```
//!
//! Query commands never open a transaction, and apply commands never write to
//! `out`: their results are reported through the log.

use std::io::Write;

use tracing::{info, warn};

use displaycfg_core::application::catalog::DeviceCatalog;
use displaycfg_core::application::engine::{ApplyOutcome, LayoutEngine};
use displaycfg_core::application::transaction::TransactionApplier;
use displaycfg_core::domain::device::DeviceId;
use displaycfg_core::domain::frame::{Frame, Size};
use displaycfg_core::domain::intent::{Orientation, Persistence};

use super::report::{self, ReportFormat};
use crate::error::AppError;

/// Everything needed for one grid or explicit-frame apply.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutRequest {
    /// Grid cell size; `None` keeps each display's current mode size.
    pub resolution: Option<Size>,
    pub columns: u32,
    pub rows: u32,
    /// `None` leaves every display's rotation untouched.
    pub orientation: Option<Orientation>,
    pub refresh_rate: Option<f64>,
    pub persistence: Persistence,
    /// Explicit frames; when non-empty the grid settings are ignored.
    pub frames: Vec<Frame>,
}

impl Default for LayoutRequest {
    fn default() -> Self {
        Self {
            resolution: None,
            columns: 1,
            rows: 1,
            orientation: None,
            refresh_rate: None,
            persistence: Persistence::default(),
            frames: Vec::new(),
        }
    }
}

/// One unit of work for the tool.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// List every connected display.
    Query { format: ReportFormat },
    /// List the modes of one display; the id is kept as typed.
    Modes { device: i64, format: ReportFormat },
    /// Arrange the displays from grid settings or explicit frames.
    ApplyLayout(LayoutRequest),
    /// Apply a saved frame list as-is.
    ApplySaved {
        frames: Vec<Frame>,
        persistence: Persistence,
    },
    /// No actionable flags were given.
    Usage,
}

/// What a successful command did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// A query report was written.
    Reported,
    /// An apply command finished.
    Applied(ApplyOutcome),
    /// The caller should print usage.
    UsageRequested,
}

/// Runs `command` against the given collaborators.
///
/// # Errors
///
/// - [`AppError::NotFound`] if `Modes` names a display that is not connected.
/// - [`AppError::Resolution`] / [`AppError::Transaction`] from the layout engine.
/// - [`AppError::Unexpected`] if enumeration fails or `out` cannot be written.
pub fn run_command(
    command: &Command,
    catalog: &dyn DeviceCatalog,
    applier: &mut dyn TransactionApplier,
    out: &mut dyn Write,
) -> Result<CommandOutcome, AppError> {
    match command {
        Command::Query { format } => {
            let mut devices = catalog.list_devices()?;
            devices.sort_by_key(|d| d.id);
            report::write_devices(&devices, *format, out)?;
            Ok(CommandOutcome::Reported)
        }
        Command::Modes { device, format } => {
            query_modes(*device, *format, catalog, out)?;
            Ok(CommandOutcome::Reported)
        }
        Command::ApplyLayout(request) => {
            let mut engine = LayoutEngine::new(catalog, applier);
            if let Some(size) = request.resolution {
                engine.set_resolution(size.width, size.height);
            }
            engine.set_columns(request.columns);
            engine.set_rows(request.rows);
            engine.set_persistence(request.persistence);
            if let Some(orientation) = request.orientation {
                engine.set_orientation(orientation);
            }
            if let Some(hz) = request.refresh_rate {
                engine.set_refresh_rate(hz);
            }
            for frame in &request.frames {
                engine.set_frame(frame.device_id, frame.clone());
            }
            let outcome = engine.apply_layout_changes()?;
            log_outcome(&outcome);
            Ok(CommandOutcome::Applied(outcome))
        }
        Command::ApplySaved {
            frames,
            persistence,
        } => {
            let mut engine = LayoutEngine::new(catalog, applier);
            engine.set_persistence(*persistence);
            let outcome = engine.apply_changes(frames.iter().cloned())?;
            log_outcome(&outcome);
            Ok(CommandOutcome::Applied(outcome))
        }
        Command::Usage => Ok(CommandOutcome::UsageRequested),
    }
}

fn query_modes(
    device: i64,
    format: ReportFormat,
    catalog: &dyn DeviceCatalog,
    out: &mut dyn Write,
) -> Result<(), AppError> {
    let id = u32::try_from(device)
        .map(DeviceId)
        .map_err(|_| AppError::NotFound(device))?;
    let record = catalog.find_device(id)?;
    let modes = catalog.list_modes(id)?;
    report::write_modes(&record, &modes, format, out)?;
    Ok(())
}

fn log_outcome(outcome: &ApplyOutcome) {
    match outcome {
        ApplyOutcome::NoChange => warn!("no connected displays; nothing was arranged"),
        ApplyOutcome::Committed { placed, unplaced } if !unplaced.is_empty() => warn!(
            placed,
            ?unplaced,
            "more displays than grid cells; the rest keep their position"
        ),
        ApplyOutcome::Committed { placed, .. } => info!(placed, "layout applied"),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use displaycfg_core::application::transaction::ApplyError;
    use displaycfg_core::domain::frame::Point;
    use displaycfg_core::domain::resolver::ResolveError;
    use displaycfg_core::mock::{ApplierCall, FailurePoint, MockCatalog, RecordingApplier};

    use crate::infrastructure::platform::unsupported::{UnsupportedApplier, UnsupportedCatalog};

    fn run(
        command: &Command,
        catalog: &MockCatalog,
        applier: &mut RecordingApplier,
    ) -> (Result<CommandOutcome, AppError>, String) {
        let mut out = Vec::new();
        let result = run_command(command, catalog, applier, &mut out);
        (result, String::from_utf8(out).expect("utf-8"))
    }

    // ── Queries ───────────────────────────────────────────────────────────────

    #[test]
    fn test_query_lists_devices_in_id_order() {
        // Arrange
        let catalog = MockCatalog::with_ids(&[3, 1, 2]);
        let mut applier = RecordingApplier::new();

        // Act
        let (result, out) = run(&Command::Query { format: ReportFormat::Text }, &catalog, &mut applier);

        // Assert
        assert_eq!(result.expect("query"), CommandOutcome::Reported);
        let ids: Vec<&str> = out.lines().map(|l| l.split_whitespace().nth(1).unwrap_or("")).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
        assert!(applier.calls.is_empty(), "queries must not touch the applier");
    }

    #[test]
    fn test_modes_reports_every_mode_of_device() {
        let catalog = MockCatalog::with_ids(&[1, 2]);
        let mut applier = RecordingApplier::new();

        let (result, out) = run(
            &Command::Modes { device: 2, format: ReportFormat::Text },
            &catalog,
            &mut applier,
        );

        assert!(result.is_ok());
        assert!(out.starts_with("There are 3 display modes for display 2"));
        assert_eq!(out.lines().filter(|l| l.starts_with('\t')).count(), 3);
    }

    #[test]
    fn test_modes_for_unknown_device_is_not_found() {
        let catalog = MockCatalog::with_ids(&[1, 2, 3, 4]);
        let mut applier = RecordingApplier::new();

        let (result, out) = run(
            &Command::Modes { device: 99, format: ReportFormat::Text },
            &catalog,
            &mut applier,
        );

        assert!(matches!(result, Err(AppError::NotFound(99))));
        assert!(out.is_empty());
    }

    #[test]
    fn test_modes_for_negative_id_is_not_found() {
        let catalog = MockCatalog::with_ids(&[1]);
        let mut applier = RecordingApplier::new();

        let (result, _) = run(
            &Command::Modes { device: -3, format: ReportFormat::Text },
            &catalog,
            &mut applier,
        );

        assert!(matches!(result, Err(AppError::NotFound(-3))));
    }

    // ── Apply ─────────────────────────────────────────────────────────────────

    #[test]
    fn test_apply_layout_tiles_grid() {
        // Arrange
        let catalog = MockCatalog::with_ids(&[1, 2, 3, 4]);
        let mut applier = RecordingApplier::new();
        let command = Command::ApplyLayout(LayoutRequest {
            resolution: Some(Size { width: 1920, height: 1080 }),
            columns: 2,
            rows: 2,
            ..LayoutRequest::default()
        });

        // Act
        let (result, out) = run(&command, &catalog, &mut applier);

        // Assert
        assert_eq!(
            result.expect("apply"),
            CommandOutcome::Applied(ApplyOutcome::Committed { placed: 4, unplaced: vec![] })
        );
        assert!(out.is_empty());
        assert_eq!(
            applier.frames()[3],
            (DeviceId(4), Point { x: 1920, y: 1080 }, Size { width: 1920, height: 1080 })
        );
    }

    #[test]
    fn test_apply_layout_with_frames_stages_rotation_and_persistence() {
        let catalog = MockCatalog::with_ids(&[1, 2]);
        let mut applier = RecordingApplier::new();
        let command = Command::ApplyLayout(LayoutRequest {
            orientation: Some(Orientation::Rotate90),
            persistence: Persistence::Session,
            frames: vec![Frame::new(2u32, 0, 0, 1280, 720)],
            ..LayoutRequest::default()
        });

        let (result, _) = run(&command, &catalog, &mut applier);

        assert!(result.is_ok());
        assert!(applier.calls.contains(&ApplierCall::SetPersistence(Persistence::Session)));
        assert!(applier
            .calls
            .contains(&ApplierCall::SetOrientation(DeviceId(2), Orientation::Rotate90)));
        assert_eq!(applier.frames().len(), 1);
    }

    #[test]
    fn test_apply_saved_ignores_orientation_and_grid() {
        let catalog = MockCatalog::with_ids(&[1, 2]);
        let mut applier = RecordingApplier::new();
        let command = Command::ApplySaved {
            frames: vec![
                Frame::new(1u32, 0, 0, 1920, 1080),
                Frame::new(2u32, -1920, 0, 1920, 1080),
            ],
            persistence: Persistence::Permanent,
        };

        let (result, _) = run(&command, &catalog, &mut applier);

        assert!(result.is_ok());
        assert!(!applier
            .calls
            .iter()
            .any(|c| matches!(c, ApplierCall::SetOrientation(..))));
        assert_eq!(applier.frames()[1].1, Point { x: -1920, y: 0 });
    }

    #[test]
    fn test_apply_with_unknown_frame_is_resolution_error() {
        let catalog = MockCatalog::with_ids(&[1, 2, 3, 4]);
        let mut applier = RecordingApplier::new();
        let command = Command::ApplyLayout(LayoutRequest {
            frames: vec![Frame::new(5u32, 0, 0, 1920, 1080)],
            ..LayoutRequest::default()
        });

        let (result, _) = run(&command, &catalog, &mut applier);

        assert!(matches!(
            result,
            Err(AppError::Resolution(ResolveError::UnknownDevice(DeviceId(5))))
        ));
        assert!(applier.calls.is_empty());
    }

    #[test]
    fn test_apply_rejected_by_platform_is_transaction_error() {
        let catalog = MockCatalog::with_ids(&[1, 2]);
        let mut applier = RecordingApplier::failing_at(FailurePoint::SetFrame(2));
        let command = Command::ApplyLayout(LayoutRequest {
            columns: 2,
            ..LayoutRequest::default()
        });

        let (result, _) = run(&command, &catalog, &mut applier);

        let err = result.expect_err("second frame is rejected");
        assert!(matches!(err, AppError::Transaction(ApplyError::DeviceRejected { .. })));
        assert_eq!(err.exit_code(), 1);
        assert!(applier.cancelled());
        assert!(!applier.committed());
    }

    #[test]
    fn test_apply_on_unsupported_platform_is_unexpected() {
        let catalog = UnsupportedCatalog::new();
        let mut applier = UnsupportedApplier::new();
        let mut out = Vec::new();

        let result = run_command(
            &Command::ApplyLayout(LayoutRequest::default()),
            &catalog,
            &mut applier,
            &mut out,
        );

        let err = result.expect_err("no backend");
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_usage_touches_nothing() {
        let catalog = MockCatalog { should_fail: true, ..MockCatalog::empty() };
        let mut applier = RecordingApplier::new();

        let (result, out) = run(&Command::Usage, &catalog, &mut applier);

        assert_eq!(result.expect("usage"), CommandOutcome::UsageRequested);
        assert!(out.is_empty());
        assert!(applier.calls.is_empty());
    }
}
