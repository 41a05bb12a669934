//! Read-only records describing connected displays.
//!
//! These are produced by a [`DeviceCatalog`](crate::application::catalog::DeviceCatalog)
//! once per invocation and never mutated by the layout engine.  Modes are not
//! linked back to their device: the catalog owns mode lists keyed by
//! [`DeviceId`].

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque numeric identifier of a display, stable for one process run.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct DeviceId(pub u32);

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for DeviceId {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

/// An axis-aligned rectangle in the global display coordinate space.
///
/// `x` and `y` are the top-left corner and may be negative (displays placed
/// to the left of or above the main display).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Bounds {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl fmt::Display for Bounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{} {}x{})", self.x, self.y, self.width, self.height)
    }
}

/// Physical dimensions of a screen in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PhysicalSize {
    pub width_mm: f64,
    pub height_mm: f64,
}

/// A (resolution, refresh rate) configuration a device can be driven at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayMode {
    /// Opaque platform identifier of the mode.
    pub mode_id: i32,
    /// Width in points.
    pub width: u32,
    /// Height in points.
    pub height: u32,
    /// Backing-store width in pixels (differs from `width` on HiDPI modes).
    pub pixel_width: u32,
    /// Backing-store height in pixels.
    pub pixel_height: u32,
    /// Refresh rate in Hz; `0.0` for displays that do not report one (LCD panels).
    pub refresh_rate: f64,
    /// Raw IOKit mode flags as reported by the platform.
    pub io_flags: u32,
    /// Whether the mode is suitable for a desktop GUI.
    pub usable_for_desktop_gui: bool,
}

impl DisplayMode {
    /// Returns `true` if this mode has the given logical size.
    pub fn has_size(&self, width: u32, height: u32) -> bool {
        self.width == width && self.height == height
    }
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}x{} @ {:.2}Hz (pixels {}x{}, id {}){}",
            self.width,
            self.height,
            self.refresh_rate,
            self.pixel_width,
            self.pixel_height,
            self.mode_id,
            if self.usable_for_desktop_gui { " usable" } else { "" }
        )
    }
}

/// Identity, state and current geometry of one connected display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceIdentity {
    pub id: DeviceId,
    pub vendor_number: u32,
    pub model_number: u32,
    pub serial_number: u32,
    pub unit_number: u32,
    pub is_main: bool,
    pub is_online: bool,
    pub is_active: bool,
    pub is_builtin: bool,
    pub is_asleep: bool,
    pub is_in_mirror_set: bool,
    /// Current rotation in degrees (0, 90, 180 or 270).
    pub rotation: f64,
    pub screen_size: PhysicalSize,
    /// Current position and size in the global coordinate space.
    pub bounds: Bounds,
    /// The mode the device is currently driven at, when the platform reports one.
    pub current_mode: Option<DisplayMode>,
}

impl DeviceIdentity {
    /// Human-readable name used in reports.
    pub fn display_name(&self) -> String {
        if self.is_builtin {
            format!("built-in display {}", self.id)
        } else {
            format!(
                "display {} (vendor {:#06x}, model {:#06x})",
                self.id, self.vendor_number, self.model_number
            )
        }
    }

    /// Logical size of the device's current mode.
    ///
    /// Falls back to the current bounds when the platform did not report a mode.
    pub fn current_size(&self) -> (u32, u32) {
        match &self.current_mode {
            Some(mode) => (mode.width, mode.height),
            None => (self.bounds.width, self.bounds.height),
        }
    }

    fn flags(&self) -> Vec<&'static str> {
        let mut flags = Vec::new();
        if self.is_main {
            flags.push("main");
        }
        if self.is_online {
            flags.push("online");
        }
        if self.is_active {
            flags.push("active");
        }
        if self.is_builtin {
            flags.push("builtin");
        }
        if self.is_asleep {
            flags.push("asleep");
        }
        if self.is_in_mirror_set {
            flags.push("mirrored");
        }
        flags
    }
}

/// One report line: identity, boundary and flags.
impl fmt::Display for DeviceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "id {} [{}] vendor {} model {} serial {} unit {} bounds {} size {:.0}x{:.0}mm rotation {}",
            self.id,
            self.flags().join(", "),
            self.vendor_number,
            self.model_number,
            self.serial_number,
            self.unit_number,
            self.bounds,
            self.screen_size.width_mm,
            self.screen_size.height_mm,
            self.rotation
        )
    }
}

/// Devices captured from the catalog at one point in time, ordered by id.
///
/// Taken once per apply call and handed to the resolver by reference, so the
/// resolver never queries the platform itself.
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    devices: BTreeMap<DeviceId, DeviceIdentity>,
}

impl CatalogSnapshot {
    /// Builds a snapshot from an enumeration result.
    ///
    /// If the platform reports the same id twice the later record wins.
    pub fn from_devices(devices: impl IntoIterator<Item = DeviceIdentity>) -> Self {
        Self {
            devices: devices.into_iter().map(|d| (d.id, d)).collect(),
        }
    }

    pub fn get(&self, id: DeviceId) -> Option<&DeviceIdentity> {
        self.devices.get(&id)
    }

    /// Devices in ascending id order.
    pub fn ordered(&self) -> impl Iterator<Item = &DeviceIdentity> {
        self.devices.values()
    }

    /// All devices reporting the given serial number.
    pub fn with_serial(&self, serial_number: u32) -> Vec<&DeviceIdentity> {
        self.devices
            .values()
            .filter(|d| d.serial_number == serial_number)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
