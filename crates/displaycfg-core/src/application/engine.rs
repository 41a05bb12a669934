//! LayoutEngine: accumulates the desired layout and applies it atomically.
//!
//! One apply call walks this state machine:
//!
//! ```text
//! Idle ─▶ Resolving ─┬─▶ ResolveFailed
//!                    └─▶ Resolved ─▶ Applying ─┬─▶ Committed
//!                                              └─▶ Cancelled
//! ```
//!
//! A layout that places no device (no displays connected) stops at
//! `Resolved` and never opens a transaction.  Nothing is retried: after a
//! failure the caller may adjust the intent and call again.
//!
//! # The "display wall" guarantee
//!
//! Every `set_*` call for the resolved layout is issued inside one
//! transaction before a single `commit`.  If any of them fails the transaction
//! is cancelled, so either every display moves to its new frame or none does.
//! Resolution happens before `begin`, so a layout naming an unknown device
//! never reaches the applier at all.

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::application::catalog::{take_snapshot, CatalogError, DeviceCatalog};
use crate::application::transaction::{ApplyError, TransactionApplier, TransactionHandle};
use crate::domain::device::{CatalogSnapshot, DeviceId};
use crate::domain::frame::{Frame, FrameSet};
use crate::domain::intent::{Corner, LayoutIntent, Orientation, Persistence};
use crate::domain::resolver::{self, ResolveError, ResolvedLayout};

/// Error type for apply calls.
#[derive(Debug, Error, PartialEq)]
pub enum EngineError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error(transparent)]
    Transaction(#[from] ApplyError),
}

/// Progress of the most recent apply call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApplyPhase {
    #[default]
    Idle,
    Resolving,
    ResolveFailed,
    Resolved,
    Applying,
    Committed,
    Cancelled,
}

/// Result of a successful apply call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// No device needed placing; the applier was not invoked.
    NoChange,
    /// The transaction was committed.
    Committed {
        /// Number of devices that received a frame.
        placed: usize,
        /// Connected devices left at their current position (grid overflow).
        unplaced: Vec<DeviceId>,
    },
}

/// The layout engine.
///
/// Borrows its collaborators for its whole lifetime; one engine serves one
/// invocation.
pub struct LayoutEngine<'a> {
    catalog: &'a dyn DeviceCatalog,
    applier: &'a mut dyn TransactionApplier,
    intent: LayoutIntent,
    phase: ApplyPhase,
}

impl<'a> LayoutEngine<'a> {
    /// Creates an engine with a default intent (1×1 grid, permanent persistence).
    pub fn new(catalog: &'a dyn DeviceCatalog, applier: &'a mut dyn TransactionApplier) -> Self {
        Self {
            catalog,
            applier,
            intent: LayoutIntent::default(),
            phase: ApplyPhase::Idle,
        }
    }

    // ── Intent setters ────────────────────────────────────────────────────────

    pub fn set_resolution(&mut self, width: u32, height: u32) {
        self.intent.set_resolution(width, height);
    }

    pub fn set_columns(&mut self, columns: u32) {
        self.intent.set_columns(columns);
    }

    pub fn set_rows(&mut self, rows: u32) {
        self.intent.set_rows(rows);
    }

    pub fn set_orientation(&mut self, orientation: Orientation) {
        self.intent.set_orientation(orientation);
    }

    pub fn set_refresh_rate(&mut self, hz: f64) {
        self.intent.set_refresh_rate(hz);
    }

    pub fn set_primary_corner(&mut self, corner: Corner) {
        self.intent.set_primary_corner(corner);
    }

    pub fn set_persistence(&mut self, persistence: Persistence) {
        self.intent.set_persistence(persistence);
    }

    /// Adds an explicit frame override; any override disables grid mode.
    pub fn set_frame(&mut self, device_id: DeviceId, frame: Frame) {
        self.intent.set_frame(device_id, frame);
    }

    pub fn intent(&self) -> &LayoutIntent {
        &self.intent
    }

    /// Phase reached by the most recent apply call.
    pub fn phase(&self) -> ApplyPhase {
        self.phase
    }

    // ── Apply ─────────────────────────────────────────────────────────────────

    /// Resolves the accumulated intent and applies it in one transaction.
    ///
    /// # Errors
    ///
    /// - [`EngineError::Catalog`] if the displays cannot be enumerated.
    /// - [`EngineError::Resolve`] if the intent does not resolve; the applier
    ///   is not invoked.
    /// - [`EngineError::Transaction`] if the platform refuses any step; the
    ///   transaction is cancelled and no display changes.
    pub fn apply_layout_changes(&mut self) -> Result<ApplyOutcome, EngineError> {
        let intent = self.intent.clone();
        self.resolve_and_apply(intent.persistence, |snapshot| {
            resolver::resolve(&intent, snapshot)
        })
    }

    /// Applies caller-supplied frames directly, bypassing the accumulated grid,
    /// resolution, orientation and frame settings.
    ///
    /// Later frames for the same device replace earlier ones.  The persistence
    /// level set on the engine still governs the transaction.
    ///
    /// # Errors
    ///
    /// Same as [`apply_layout_changes`](Self::apply_layout_changes).
    pub fn apply_changes(
        &mut self,
        frames: impl IntoIterator<Item = Frame>,
    ) -> Result<ApplyOutcome, EngineError> {
        let requested: FrameSet = frames.into_iter().collect();
        let persistence = self.intent.persistence;
        self.resolve_and_apply(persistence, |snapshot| {
            Ok(ResolvedLayout {
                frames: resolver::resolve_explicit(&requested, snapshot)?,
                orientation: None,
                refresh_rate: None,
                unplaced: Vec::new(),
            })
        })
    }

    fn resolve_and_apply<F>(
        &mut self,
        persistence: Persistence,
        resolve: F,
    ) -> Result<ApplyOutcome, EngineError>
    where
        F: FnOnce(&CatalogSnapshot) -> Result<ResolvedLayout, ResolveError>,
    {
        self.phase = ApplyPhase::Resolving;
        let resolved = match take_snapshot(self.catalog)
            .map_err(EngineError::from)
            .and_then(|snapshot| resolve(&snapshot).map_err(EngineError::from))
        {
            Ok(resolved) => resolved,
            Err(e) => {
                warn!(error = %e, "layout resolution failed; no display was touched");
                self.phase = ApplyPhase::ResolveFailed;
                return Err(e);
            }
        };
        self.phase = ApplyPhase::Resolved;

        if resolved.frames.is_empty() {
            info!("no connected displays to arrange");
            return Ok(ApplyOutcome::NoChange);
        }

        self.phase = ApplyPhase::Applying;
        let tx = match self.applier.begin() {
            Ok(tx) => tx,
            Err(e) => {
                warn!(error = %e, "could not open display configuration transaction");
                self.phase = ApplyPhase::Cancelled;
                return Err(e.into());
            }
        };
        debug!(tx = tx.id(), frames = resolved.frames.len(), "transaction opened");

        if let Err(e) = self.stage(&tx, &resolved, persistence) {
            warn!(error = %e, "staging failed; cancelling display configuration");
            if let Err(cancel_err) = self.applier.cancel(tx) {
                warn!(error = %cancel_err, "cancel reported a failure");
            }
            self.phase = ApplyPhase::Cancelled;
            return Err(e.into());
        }

        match self.applier.commit(tx) {
            Ok(()) => {
                self.phase = ApplyPhase::Committed;
                info!(
                    placed = resolved.frames.len(),
                    ?persistence,
                    "display configuration committed"
                );
                Ok(ApplyOutcome::Committed {
                    placed: resolved.frames.len(),
                    unplaced: resolved.unplaced,
                })
            }
            Err(e) => {
                warn!(error = %e, "commit failed; display configuration unchanged");
                self.phase = ApplyPhase::Cancelled;
                Err(e.into())
            }
        }
    }

    fn stage(
        &mut self,
        tx: &TransactionHandle,
        resolved: &ResolvedLayout,
        persistence: Persistence,
    ) -> Result<(), ApplyError> {
        self.applier.set_persistence(tx, persistence)?;
        for frame in resolved.frames.sorted() {
            if let Some(hz) = resolved.refresh_rate {
                self.applier.set_refresh_rate(tx, frame.device_id, hz)?;
            }
            debug!(
                device = %frame.device_id,
                x = frame.origin.x,
                y = frame.origin.y,
                width = frame.size.width,
                height = frame.size.height,
                "staging frame"
            );
            self.applier
                .set_frame(tx, frame.device_id, frame.origin, frame.size)?;
            if let Some(orientation) = resolved.orientation {
                self.applier
                    .set_orientation(tx, frame.device_id, orientation)?;
            }
        }
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
