//! Transaction applier interface: an all-or-nothing display configuration change.
//!
//! # Protocol
//!
//! ```text
//! begin() ──▶ set_persistence / set_refresh_rate / set_frame / set_orientation …
//!        ──▶ commit(handle)      every change takes effect together
//!         or cancel(handle)      nothing changes
//! ```
//!
//! [`commit`](TransactionApplier::commit) and
//! [`cancel`](TransactionApplier::cancel) take the handle by value, so a
//! transaction can only be finished once.

use thiserror::Error;

use crate::domain::device::DeviceId;
use crate::domain::frame::{Point, Size};
use crate::domain::intent::{Orientation, Persistence};

/// Error type for transaction operations.
#[derive(Debug, Error, PartialEq)]
pub enum ApplyError {
    /// The platform refused to open a configuration transaction.
    #[error("display configuration transaction unavailable: {0}")]
    TransactionUnavailable(String),

    /// The platform declined a change for one specific device.
    #[error("display {device} rejected the change: {reason}")]
    DeviceRejected { device: DeviceId, reason: String },

    /// The handle does not belong to the applier's open transaction.
    #[error("transaction handle {0} is not open")]
    StaleHandle(u64),

    /// The platform failed to commit the transaction.
    #[error("failed to commit display configuration: {0}")]
    CommitFailed(String),

    /// The platform failed to discard the transaction.
    #[error("failed to cancel display configuration: {0}")]
    CancelFailed(String),
}

/// Opaque token for one open transaction.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct TransactionHandle(u64);

impl TransactionHandle {
    /// Wraps an applier-chosen transaction number.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Transactional access to the display subsystem.
///
/// Every `set_*` call is staged; nothing is visible until
/// [`commit`](Self::commit).  A failed `set_*` leaves the transaction open and
/// the caller must [`cancel`](Self::cancel) it.
#[cfg_attr(test, mockall::automock)]
pub trait TransactionApplier {
    /// Opens a new transaction.
    ///
    /// # Errors
    ///
    /// Returns [`ApplyError::TransactionUnavailable`] if the platform refuses
    /// (e.g. missing permission, or another transaction already open).
    fn begin(&mut self) -> Result<TransactionHandle, ApplyError>;

    /// Stages how long the committed configuration survives.
    fn set_persistence(
        &mut self,
        tx: &TransactionHandle,
        level: Persistence,
    ) -> Result<(), ApplyError>;

    /// Stages a preferred refresh rate, used when choosing the mode for the
    /// device's next [`set_frame`](Self::set_frame).
    ///
    /// # Errors
    ///
    /// Returns [`ApplyError::DeviceRejected`] if the device has no mode at that rate.
    fn set_refresh_rate(
        &mut self,
        tx: &TransactionHandle,
        device: DeviceId,
        hz: f64,
    ) -> Result<(), ApplyError>;

    /// Stages a new origin and size for `device`.
    ///
    /// # Errors
    ///
    /// Returns [`ApplyError::DeviceRejected`] if the device cannot be driven at
    /// the requested size or moved to the requested origin.
    fn set_frame(
        &mut self,
        tx: &TransactionHandle,
        device: DeviceId,
        origin: Point,
        size: Size,
    ) -> Result<(), ApplyError>;

    /// Stages a rotation for `device`.
    ///
    /// # Errors
    ///
    /// Returns [`ApplyError::DeviceRejected`] if the rotation is not supported.
    fn set_orientation(
        &mut self,
        tx: &TransactionHandle,
        device: DeviceId,
        orientation: Orientation,
    ) -> Result<(), ApplyError>;

    /// Applies every staged change at once.
    ///
    /// # Errors
    ///
    /// Returns [`ApplyError::CommitFailed`] if the platform rejects the batch;
    /// the displays are then left unchanged.
    fn commit(&mut self, tx: TransactionHandle) -> Result<(), ApplyError>;

    /// Discards every staged change.
    ///
    /// # Errors
    ///
    /// Returns [`ApplyError::CancelFailed`] if the platform reports a failure.
    fn cancel(&mut self, tx: TransactionHandle) -> Result<(), ApplyError>;
}
