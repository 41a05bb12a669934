//! Fallback adapter for platforms without a display configuration backend.
//!
//! Every catalog query and every `begin` fails, so any command that needs the
//! display subsystem reports an unexpected failure (exit code 2) instead of
//! pretending there are no displays.

use displaycfg_core::application::catalog::{CatalogError, DeviceCatalog};
use displaycfg_core::application::transaction::{
    ApplyError, TransactionApplier, TransactionHandle,
};
use displaycfg_core::domain::device::{DeviceId, DeviceIdentity, DisplayMode};
use displaycfg_core::domain::frame::{Point, Size};
use displaycfg_core::domain::intent::{Orientation, Persistence};

const NOT_SUPPORTED: &str = "display configuration is not supported on this platform";

/// Catalog that always fails.
#[derive(Debug, Default)]
pub struct UnsupportedCatalog;

impl UnsupportedCatalog {
    pub fn new() -> Self {
        Self
    }
}

impl DeviceCatalog for UnsupportedCatalog {
    fn list_devices(&self) -> Result<Vec<DeviceIdentity>, CatalogError> {
        Err(CatalogError::Platform(NOT_SUPPORTED.to_string()))
    }

    fn list_modes(&self, _id: DeviceId) -> Result<Vec<DisplayMode>, CatalogError> {
        Err(CatalogError::Platform(NOT_SUPPORTED.to_string()))
    }
}

/// Applier that never opens a transaction.
#[derive(Debug, Default)]
pub struct UnsupportedApplier;

impl UnsupportedApplier {
    pub fn new() -> Self {
        Self
    }
}

fn unavailable() -> ApplyError {
    ApplyError::TransactionUnavailable(NOT_SUPPORTED.to_string())
}

impl TransactionApplier for UnsupportedApplier {
    fn begin(&mut self) -> Result<TransactionHandle, ApplyError> {
        Err(unavailable())
    }

    fn set_persistence(&mut self, _tx: &TransactionHandle, _level: Persistence) -> Result<(), ApplyError> {
        Err(unavailable())
    }

    fn set_refresh_rate(
        &mut self,
        _tx: &TransactionHandle,
        _device: DeviceId,
        _hz: f64,
    ) -> Result<(), ApplyError> {
        Err(unavailable())
    }

    fn set_frame(
        &mut self,
        _tx: &TransactionHandle,
        _device: DeviceId,
        _origin: Point,
        _size: Size,
    ) -> Result<(), ApplyError> {
        Err(unavailable())
    }

    fn set_orientation(
        &mut self,
        _tx: &TransactionHandle,
        _device: DeviceId,
        _orientation: Orientation,
    ) -> Result<(), ApplyError> {
        Err(unavailable())
    }

    fn commit(&mut self, _tx: TransactionHandle) -> Result<(), ApplyError> {
        Err(unavailable())
    }

    fn cancel(&mut self, _tx: TransactionHandle) -> Result<(), ApplyError> {
        Err(unavailable())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_catalog_reports_platform_error() {
        let catalog = UnsupportedCatalog::new();
        assert!(matches!(catalog.list_devices(), Err(CatalogError::Platform(_))));
        assert!(matches!(
            catalog.find_device(DeviceId(1)),
            Err(CatalogError::Platform(_))
        ));
    }

    #[test]
    fn test_unsupported_applier_refuses_to_begin() {
        let mut applier = UnsupportedApplier::new();
        assert!(matches!(
            applier.begin(),
            Err(ApplyError::TransactionUnavailable(_))
        ));
    }
}
