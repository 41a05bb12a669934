//! macOS display adapter via Core Graphics (`CGDisplay`).
//!
//! - Catalog: `CGGetActiveDisplayList` plus the per-display `CGDisplay*`
//!   queries; modes come from `CGDisplayCopyAllDisplayModes`.
//! - Applier: one `CGDisplayConfigRef` per transaction, opened with
//!   `CGBeginDisplayConfiguration` and finished with
//!   `CGCompleteDisplayConfiguration` or `CGCancelDisplayConfiguration`.
//!
//! # Implementation notes
//!
//! Core Graphics global coordinates already have their origin at the top-left
//! of the main display, so bounds and origins are passed through unchanged.
//!
//! There is no public Core Graphics call to rotate a display.
//! `set_orientation` therefore accepts the rotation the display already has
//! and rejects every other value, which cancels the whole transaction.

use std::collections::HashMap;

use core_graphics::display::{
    CGConfigureOption, CGDisplay, CGDisplayConfigRef, CGDisplayMode,
};
use tracing::{debug, warn};

use displaycfg_core::application::catalog::{CatalogError, DeviceCatalog};
use displaycfg_core::application::transaction::{
    ApplyError, TransactionApplier, TransactionHandle,
};
use displaycfg_core::domain::device::{
    Bounds, DeviceId, DeviceIdentity, DisplayMode, PhysicalSize,
};
use displaycfg_core::domain::frame::{Point, Size};
use displaycfg_core::domain::intent::{Orientation, Persistence};

use super::{choose_mode, REFRESH_TOLERANCE_HZ};

/// `kDisplayModeValidFlag | kDisplayModeSafeFlag`.
const USABLE_MODE_FLAGS: u32 = 0x0000_0001 | 0x0000_0002;

// ── Catalog ───────────────────────────────────────────────────────────────────

/// macOS implementation of [`DeviceCatalog`].
pub struct CoreGraphicsCatalog;

impl CoreGraphicsCatalog {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CoreGraphicsCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceCatalog for CoreGraphicsCatalog {
    fn list_devices(&self) -> Result<Vec<DeviceIdentity>, CatalogError> {
        let ids = CGDisplay::active_displays().map_err(|e| {
            CatalogError::Platform(format!("CGGetActiveDisplayList failed with error {e}"))
        })?;
        debug!(count = ids.len(), "enumerated active displays");
        Ok(ids
            .into_iter()
            .map(|id| device_identity(&CGDisplay::new(id)))
            .collect())
    }

    fn list_modes(&self, id: DeviceId) -> Result<Vec<DisplayMode>, CatalogError> {
        let modes = CGDisplayMode::all_display_modes(id.0, std::ptr::null())
            .ok_or(CatalogError::DeviceUnavailable(id))?;
        Ok(modes.iter().map(display_mode).collect())
    }
}

fn device_identity(display: &CGDisplay) -> DeviceIdentity {
    let bounds = display.bounds();
    let screen = display.screen_size();
    DeviceIdentity {
        id: DeviceId(display.id),
        vendor_number: display.vendor_number(),
        model_number: display.model_number(),
        serial_number: display.serial_number(),
        unit_number: display.unit_number(),
        is_main: display.is_main(),
        is_online: display.is_online(),
        is_active: display.is_active(),
        is_builtin: display.is_builtin(),
        is_asleep: display.is_asleep(),
        is_in_mirror_set: display.is_in_mirror_set(),
        rotation: display.rotation(),
        screen_size: PhysicalSize {
            width_mm: screen.width,
            height_mm: screen.height,
        },
        bounds: Bounds {
            x: bounds.origin.x as i32,
            y: bounds.origin.y as i32,
            width: bounds.size.width as u32,
            height: bounds.size.height as u32,
        },
        current_mode: display.display_mode().map(|m| display_mode(&m)),
    }
}

fn display_mode(mode: &CGDisplayMode) -> DisplayMode {
    let io_flags = mode.io_flags();
    DisplayMode {
        mode_id: mode.mode_id(),
        width: mode.width() as u32,
        height: mode.height() as u32,
        pixel_width: mode.pixel_width() as u32,
        pixel_height: mode.pixel_height() as u32,
        refresh_rate: mode.refresh_rate(),
        io_flags,
        usable_for_desktop_gui: io_flags & USABLE_MODE_FLAGS == USABLE_MODE_FLAGS,
    }
}

// ── Applier ───────────────────────────────────────────────────────────────────

struct OpenTransaction {
    id: u64,
    config: CGDisplayConfigRef,
    persistence: Persistence,
    refresh_rates: HashMap<DeviceId, f64>,
}

/// macOS implementation of [`TransactionApplier`].
///
/// Holds at most one open configuration; an applier dropped with a
/// transaction still open cancels it.
pub struct CoreGraphicsApplier {
    open: Option<OpenTransaction>,
    next_id: u64,
}

impl CoreGraphicsApplier {
    pub fn new() -> Self {
        Self {
            open: None,
            next_id: 1,
        }
    }

    fn open_mut(&mut self, tx: &TransactionHandle) -> Result<&mut OpenTransaction, ApplyError> {
        self.open
            .as_mut()
            .filter(|open| open.id == tx.id())
            .ok_or(ApplyError::StaleHandle(tx.id()))
    }

    fn take_open(&mut self, tx: &TransactionHandle) -> Result<OpenTransaction, ApplyError> {
        match self.open.take() {
            Some(open) if open.id == tx.id() => Ok(open),
            other => {
                self.open = other;
                Err(ApplyError::StaleHandle(tx.id()))
            }
        }
    }
}

impl Default for CoreGraphicsApplier {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for CoreGraphicsApplier {
    fn drop(&mut self) {
        if let Some(open) = self.open.take() {
            warn!(tx = open.id, "display configuration left open; cancelling");
            let _ = CGDisplay::cancel_configuration(&open.config);
        }
    }
}

fn rejected(device: DeviceId, reason: impl Into<String>) -> ApplyError {
    ApplyError::DeviceRejected {
        device,
        reason: reason.into(),
    }
}

fn connected_display(device: DeviceId) -> Result<CGDisplay, ApplyError> {
    let active = CGDisplay::active_displays()
        .map_err(|e| rejected(device, format!("CGGetActiveDisplayList failed with error {e}")))?;
    if active.contains(&device.0) {
        Ok(CGDisplay::new(device.0))
    } else {
        Err(rejected(device, "display is not connected"))
    }
}

fn configure_option(persistence: Persistence) -> CGConfigureOption {
    match persistence {
        Persistence::Application => CGConfigureOption::ConfigureForAppOnly,
        Persistence::Session => CGConfigureOption::ConfigureForSession,
        Persistence::Permanent => CGConfigureOption::ConfigurePermanently,
    }
}

impl TransactionApplier for CoreGraphicsApplier {
    fn begin(&mut self) -> Result<TransactionHandle, ApplyError> {
        if self.open.is_some() {
            return Err(ApplyError::TransactionUnavailable(
                "a display configuration is already open".to_string(),
            ));
        }
        let config = CGDisplay::begin_configuration().map_err(|e| {
            ApplyError::TransactionUnavailable(format!(
                "CGBeginDisplayConfiguration failed with error {e}"
            ))
        })?;
        let id = self.next_id;
        self.next_id += 1;
        self.open = Some(OpenTransaction {
            id,
            config,
            persistence: Persistence::default(),
            refresh_rates: HashMap::new(),
        });
        Ok(TransactionHandle::new(id))
    }

    fn set_persistence(
        &mut self,
        tx: &TransactionHandle,
        level: Persistence,
    ) -> Result<(), ApplyError> {
        self.open_mut(tx)?.persistence = level;
        Ok(())
    }

    fn set_refresh_rate(
        &mut self,
        tx: &TransactionHandle,
        device: DeviceId,
        hz: f64,
    ) -> Result<(), ApplyError> {
        self.open_mut(tx)?.refresh_rates.insert(device, hz);
        Ok(())
    }

    fn set_frame(
        &mut self,
        tx: &TransactionHandle,
        device: DeviceId,
        origin: Point,
        size: Size,
    ) -> Result<(), ApplyError> {
        let open = self.open_mut(tx)?;
        let display = connected_display(device)?;
        let wanted_rate = open.refresh_rates.get(&device).copied();

        let needs_mode = match display.display_mode() {
            Some(current) => {
                current.width() as u32 != size.width
                    || current.height() as u32 != size.height
                    || wanted_rate
                        .is_some_and(|hz| (current.refresh_rate() - hz).abs() >= REFRESH_TOLERANCE_HZ)
            }
            None => true,
        };

        if needs_mode {
            let cg_modes = CGDisplayMode::all_display_modes(device.0, std::ptr::null())
                .ok_or_else(|| rejected(device, "display modes unavailable"))?;
            let modes: Vec<DisplayMode> = cg_modes.iter().map(display_mode).collect();
            let index = choose_mode(&modes, size, wanted_rate).ok_or_else(|| {
                rejected(
                    device,
                    match wanted_rate {
                        Some(hz) => format!("no usable {}x{} mode at {hz}Hz", size.width, size.height),
                        None => format!("no usable {}x{} mode", size.width, size.height),
                    },
                )
            })?;
            debug!(%device, mode = %modes[index], "staging display mode");
            display
                .configure_display_with_display_mode(&open.config, &cg_modes[index])
                .map_err(|e| rejected(device, format!("mode change refused with error {e}")))?;
        }

        display
            .configure_display_origin(&open.config, origin.x, origin.y)
            .map_err(|e| rejected(device, format!("origin change refused with error {e}")))?;
        Ok(())
    }

    fn set_orientation(
        &mut self,
        tx: &TransactionHandle,
        device: DeviceId,
        orientation: Orientation,
    ) -> Result<(), ApplyError> {
        self.open_mut(tx)?;
        let display = connected_display(device)?;
        let current = (display.rotation().round() as i64).rem_euclid(360) as u32;
        if Orientation::from_degrees(current) == Some(orientation) {
            Ok(())
        } else {
            Err(rejected(
                device,
                format!(
                    "cannot rotate to {}° (currently {current}°); Core Graphics has no rotation call",
                    orientation.degrees()
                ),
            ))
        }
    }

    fn commit(&mut self, tx: TransactionHandle) -> Result<(), ApplyError> {
        let open = self.take_open(&tx)?;
        CGDisplay::complete_configuration(&open.config, configure_option(open.persistence))
            .map_err(|e| {
                ApplyError::CommitFailed(format!(
                    "CGCompleteDisplayConfiguration failed with error {e}"
                ))
            })
    }

    fn cancel(&mut self, tx: TransactionHandle) -> Result<(), ApplyError> {
        let open = self.take_open(&tx)?;
        CGDisplay::cancel_configuration(&open.config).map_err(|e| {
            ApplyError::CancelFailed(format!("CGCancelDisplayConfiguration failed with error {e}"))
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    /// Smoke-test: on a macOS machine with at least one display this must succeed.
    #[test]
    fn test_core_graphics_catalog_lists_active_displays() {
        let catalog = CoreGraphicsCatalog::new();
        let result = catalog.list_devices();
        assert!(result.is_ok(), "list_devices must succeed on macOS: {:?}", result.err());
    }

    #[test]
    fn test_core_graphics_catalog_modes_include_current_size() {
        let catalog = CoreGraphicsCatalog::new();
        let devices = catalog.list_devices().expect("enumerate");
        if let Some(device) = devices.iter().find(|d| d.current_mode.is_some()) {
            let (width, height) = device.current_size();
            let modes = catalog.list_modes(device.id).expect("modes");
            assert!(modes.iter().any(|m| m.has_size(width, height)));
        }
    }

    #[test]
    fn test_core_graphics_applier_rejects_foreign_handle() {
        let mut applier = CoreGraphicsApplier::new();
        let foreign = TransactionHandle::new(42);
        assert_eq!(
            applier.set_persistence(&foreign, Persistence::Session),
            Err(ApplyError::StaleHandle(42))
        );
        assert_eq!(applier.cancel(foreign), Err(ApplyError::StaleHandle(42)));
    }
}
