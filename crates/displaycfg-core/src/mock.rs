//! In-memory collaborators for tests.
//!
//! The real catalog and applier talk to the display subsystem, which needs
//! physical displays and would rearrange the test machine's desktop.  The
//! types here replace those calls with fixed data and in-memory recording:
//!
//! - [`MockCatalog`] returns a configurable device list and mode table.
//! - [`RecordingApplier`] records every call in order and can be told to fail
//!   at a specific step, so tests can observe exactly what reached the
//!   "platform" and whether a transaction was committed or cancelled.
//!
//! This module is compiled unconditionally so integration tests in other
//! crates can use it.
//!
//! ```ignore
//! let catalog = MockCatalog::with_ids(&[1, 2, 3, 4]);
//! let mut applier = RecordingApplier::failing_at(FailurePoint::SetFrame(2));
//! let mut engine = LayoutEngine::new(&catalog, &mut applier);
//! engine.set_columns(2);
//! assert!(engine.apply_layout_changes().is_err());
//! assert!(!applier.committed());
//! ```

use std::collections::HashMap;

use crate::application::catalog::{CatalogError, DeviceCatalog};
use crate::application::transaction::{ApplyError, TransactionApplier, TransactionHandle};
use crate::domain::device::{Bounds, DeviceId, DeviceIdentity, DisplayMode, PhysicalSize};
use crate::domain::frame::{Point, Size};
use crate::domain::intent::{Orientation, Persistence};

/// Builds an online, active display whose current mode is `width × height` at 60 Hz.
///
/// The serial number equals `1000 + id`.
pub fn test_device(id: u32, width: u32, height: u32) -> DeviceIdentity {
    DeviceIdentity {
        id: DeviceId(id),
        vendor_number: 0x10ac,
        model_number: 0xa0c4,
        serial_number: 1000 + id,
        unit_number: id,
        is_main: id == 1,
        is_online: true,
        is_active: true,
        is_builtin: false,
        is_asleep: false,
        is_in_mirror_set: false,
        rotation: 0.0,
        screen_size: PhysicalSize { width_mm: 527.0, height_mm: 296.0 },
        bounds: Bounds { x: 0, y: 0, width, height },
        current_mode: Some(test_mode(1, width, height, 60.0)),
    }
}

/// Builds a 1920×1080 display with an explicit serial number.
pub fn test_device_with_serial(id: u32, serial_number: u32) -> DeviceIdentity {
    DeviceIdentity {
        serial_number,
        ..test_device(id, 1920, 1080)
    }
}

/// Builds a desktop-usable mode with equal point and pixel sizes.
pub fn test_mode(mode_id: i32, width: u32, height: u32, refresh_rate: f64) -> DisplayMode {
    DisplayMode {
        mode_id,
        width,
        height,
        pixel_width: width,
        pixel_height: height,
        refresh_rate,
        io_flags: 0x3,
        usable_for_desktop_gui: true,
    }
}

// ── Catalog ───────────────────────────────────────────────────────────────────

/// A catalog backed by fixed in-memory data.
#[derive(Debug, Clone, Default)]
pub struct MockCatalog {
    /// Devices returned by `list_devices`, in this order.
    pub devices: Vec<DeviceIdentity>,
    /// Modes per device; a device listed here but not in `devices` models one
    /// that vanished after enumeration.
    pub modes: HashMap<DeviceId, Vec<DisplayMode>>,
    /// When `true`, `list_devices` fails with [`CatalogError::Platform`].
    pub should_fail: bool,
}

impl MockCatalog {
    /// A catalog with no displays.
    pub fn empty() -> Self {
        Self::default()
    }

    /// 1920×1080 displays with the given ids, each offering 1920×1080 at 60 and
    /// 50 Hz and 1280×720 at 60 Hz.
    pub fn with_ids(ids: &[u32]) -> Self {
        let mut catalog = Self::empty();
        for &id in ids {
            catalog.add_device(
                test_device(id, 1920, 1080),
                vec![
                    test_mode(1, 1920, 1080, 60.0),
                    test_mode(2, 1920, 1080, 50.0),
                    test_mode(3, 1280, 720, 60.0),
                ],
            );
        }
        catalog
    }

    pub fn add_device(&mut self, device: DeviceIdentity, modes: Vec<DisplayMode>) {
        self.modes.insert(device.id, modes);
        self.devices.push(device);
    }
}

impl DeviceCatalog for MockCatalog {
    fn list_devices(&self) -> Result<Vec<DeviceIdentity>, CatalogError> {
        if self.should_fail {
            return Err(CatalogError::Platform("mock failure".into()));
        }
        Ok(self.devices.clone())
    }

    fn list_modes(&self, id: DeviceId) -> Result<Vec<DisplayMode>, CatalogError> {
        if !self.devices.iter().any(|d| d.id == id) {
            return Err(CatalogError::DeviceUnavailable(id));
        }
        Ok(self.modes.get(&id).cloned().unwrap_or_default())
    }
}

// ── Applier ───────────────────────────────────────────────────────────────────

/// One call observed by [`RecordingApplier`].
#[derive(Debug, Clone, PartialEq)]
pub enum ApplierCall {
    Begin,
    SetPersistence(Persistence),
    SetRefreshRate(DeviceId, f64),
    SetFrame(DeviceId, Point, Size),
    SetOrientation(DeviceId, Orientation),
    Commit,
    Cancel,
}

/// Where a [`RecordingApplier`] should report a platform failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePoint {
    Begin,
    /// The n-th `set_frame` call (1-based) is rejected.
    SetFrame(usize),
    /// The n-th `set_orientation` call (1-based) is rejected.
    SetOrientation(usize),
    Commit,
    Cancel,
}

/// An applier that records every call instead of touching the displays.
#[derive(Debug, Default)]
pub struct RecordingApplier {
    /// Every call in the order it was made, including rejected ones.
    pub calls: Vec<ApplierCall>,
    /// When set, the matching call fails.
    pub fail_at: Option<FailurePoint>,
    open: Option<u64>,
    next_id: u64,
    frames_seen: usize,
    orientations_seen: usize,
}

impl RecordingApplier {
    pub fn new() -> Self {
        Self::default()
    }

    /// An applier that fails at `point`.
    pub fn failing_at(point: FailurePoint) -> Self {
        Self {
            fail_at: Some(point),
            ..Self::default()
        }
    }

    /// Returns `true` if a commit was attempted.
    pub fn committed(&self) -> bool {
        self.calls.contains(&ApplierCall::Commit)
    }

    /// Returns `true` if a cancel was issued.
    pub fn cancelled(&self) -> bool {
        self.calls.contains(&ApplierCall::Cancel)
    }

    /// The `set_frame` calls, in order.
    pub fn frames(&self) -> Vec<(DeviceId, Point, Size)> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                ApplierCall::SetFrame(id, origin, size) => Some((*id, *origin, *size)),
                _ => None,
            })
            .collect()
    }

    fn check_open(&self, tx: &TransactionHandle) -> Result<(), ApplyError> {
        match self.open {
            Some(id) if id == tx.id() => Ok(()),
            _ => Err(ApplyError::StaleHandle(tx.id())),
        }
    }

    fn fails_at(&self, point: FailurePoint) -> bool {
        self.fail_at == Some(point)
    }
}

impl TransactionApplier for RecordingApplier {
    fn begin(&mut self) -> Result<TransactionHandle, ApplyError> {
        self.calls.push(ApplierCall::Begin);
        if self.fails_at(FailurePoint::Begin) {
            return Err(ApplyError::TransactionUnavailable("mock failure".into()));
        }
        if self.open.is_some() {
            return Err(ApplyError::TransactionUnavailable(
                "a transaction is already open".into(),
            ));
        }
        self.next_id += 1;
        self.open = Some(self.next_id);
        Ok(TransactionHandle::new(self.next_id))
    }

    fn set_persistence(
        &mut self,
        tx: &TransactionHandle,
        level: Persistence,
    ) -> Result<(), ApplyError> {
        self.check_open(tx)?;
        self.calls.push(ApplierCall::SetPersistence(level));
        Ok(())
    }

    fn set_refresh_rate(
        &mut self,
        tx: &TransactionHandle,
        device: DeviceId,
        hz: f64,
    ) -> Result<(), ApplyError> {
        self.check_open(tx)?;
        self.calls.push(ApplierCall::SetRefreshRate(device, hz));
        Ok(())
    }

    fn set_frame(
        &mut self,
        tx: &TransactionHandle,
        device: DeviceId,
        origin: Point,
        size: Size,
    ) -> Result<(), ApplyError> {
        self.check_open(tx)?;
        self.calls.push(ApplierCall::SetFrame(device, origin, size));
        self.frames_seen += 1;
        if self.fails_at(FailurePoint::SetFrame(self.frames_seen)) {
            return Err(ApplyError::DeviceRejected {
                device,
                reason: "mock failure".into(),
            });
        }
        Ok(())
    }

    fn set_orientation(
        &mut self,
        tx: &TransactionHandle,
        device: DeviceId,
        orientation: Orientation,
    ) -> Result<(), ApplyError> {
        self.check_open(tx)?;
        self.calls.push(ApplierCall::SetOrientation(device, orientation));
        self.orientations_seen += 1;
        if self.fails_at(FailurePoint::SetOrientation(self.orientations_seen)) {
            return Err(ApplyError::DeviceRejected {
                device,
                reason: "mock failure".into(),
            });
        }
        Ok(())
    }

    fn commit(&mut self, tx: TransactionHandle) -> Result<(), ApplyError> {
        self.check_open(&tx)?;
        self.calls.push(ApplierCall::Commit);
        self.open = None;
        if self.fails_at(FailurePoint::Commit) {
            return Err(ApplyError::CommitFailed("mock failure".into()));
        }
        Ok(())
    }

    fn cancel(&mut self, tx: TransactionHandle) -> Result<(), ApplyError> {
        self.check_open(&tx)?;
        self.calls.push(ApplierCall::Cancel);
        self.open = None;
        if self.fails_at(FailurePoint::Cancel) {
            return Err(ApplyError::CancelFailed("mock failure".into()));
        }
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
