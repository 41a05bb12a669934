//! Device catalog interface: enumeration of connected displays and their modes.

use thiserror::Error;
use tracing::debug;

use crate::domain::device::{CatalogSnapshot, DeviceId, DeviceIdentity, DisplayMode};

/// Error type for catalog queries.
#[derive(Debug, Error, PartialEq)]
pub enum CatalogError {
    /// No connected device has the requested id.
    #[error("there is no connected device with the device ID: {0}")]
    NotFound(DeviceId),

    /// The device disappeared between enumeration and the mode query.
    #[error("device {0} is no longer available")]
    DeviceUnavailable(DeviceId),

    /// The platform enumeration call itself failed.
    #[error("platform error while enumerating displays: {0}")]
    Platform(String),
}

/// Read-only view of the displays attached to the host.
///
/// Each call reflects the state at call time; nothing is cached.
pub trait DeviceCatalog {
    /// Returns every connected display.  An empty list is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Platform`] if the OS enumeration fails.
    fn list_devices(&self) -> Result<Vec<DeviceIdentity>, CatalogError>;

    /// Returns the display with the given id.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] if no connected display has that id.
    fn find_device(&self, id: DeviceId) -> Result<DeviceIdentity, CatalogError> {
        self.list_devices()?
            .into_iter()
            .find(|d| d.id == id)
            .ok_or(CatalogError::NotFound(id))
    }

    /// Returns every mode the display supports.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DeviceUnavailable`] if the display vanished
    /// after it was enumerated.
    fn list_modes(&self, id: DeviceId) -> Result<Vec<DisplayMode>, CatalogError>;
}

/// Captures one snapshot of the catalog for the resolver.
///
/// # Errors
///
/// Propagates [`CatalogError::Platform`] from the enumeration.
pub fn take_snapshot(catalog: &dyn DeviceCatalog) -> Result<CatalogSnapshot, CatalogError> {
    let devices = catalog.list_devices()?;
    debug!(count = devices.len(), "captured display catalog snapshot");
    Ok(CatalogSnapshot::from_devices(devices))
}
