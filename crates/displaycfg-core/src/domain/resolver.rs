//! Layout resolver: turns a [`LayoutIntent`] into a concrete [`FrameSet`].
//!
//! Two strategies are supported:
//!
//! - **Grid mode** (no explicit frames): connected devices, ordered by
//!   ascending id, are tiled row-major into a `columns × rows` grid of uniform
//!   cells.  Devices beyond the grid's capacity are left unplaced and reported
//!   in [`ResolvedLayout::unplaced`].
//! - **Explicit-frame mode**: every caller-supplied frame is matched against
//!   the catalog snapshot, by device id first and serial number second.  One
//!   unresolvable frame rejects the whole layout.
//!
//! Explicit frames are not checked for overlap.  Overlapping or identical
//! frames are how mirrored arrangements are expressed, so placement is left
//! entirely to the caller.

use thiserror::Error;
use tracing::{debug, info, warn};

use super::device::{CatalogSnapshot, DeviceId, DeviceIdentity};
use super::frame::{Frame, FrameSet, Point, Size};
use super::intent::{LayoutIntent, Orientation};

/// Errors that prevent a layout from being resolved.
#[derive(Debug, Error, PartialEq)]
pub enum ResolveError {
    /// An explicit frame names a device that is not connected.
    #[error("there is no connected device with the device ID: {0}")]
    UnknownDevice(DeviceId),

    /// An explicit frame's serial number contradicts the device it names.
    #[error("device {device} has serial number {found}, frame expects {expected}")]
    SerialMismatch {
        device: DeviceId,
        expected: u32,
        found: u32,
    },

    /// Two explicit frames resolved to the same device.
    #[error("more than one frame targets device {0}")]
    DuplicateDevice(DeviceId),

    /// The grid has no cells.
    #[error("invalid grid shape: {columns} columns × {rows} rows")]
    InvalidGridShape { columns: u32, rows: u32 },

    /// A grid cell position does not fit in the global coordinate space.
    #[error("grid cell at column {column}, row {row} lies outside the coordinate space")]
    GridOutOfBounds { column: u32, row: u32 },

    /// A frame destined for application has a zero width or height.
    #[error("frame for device {0} has zero width or height")]
    ZeroSizedFrame(DeviceId),
}

/// The outcome of resolution: frames ready to hand to the applier.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLayout {
    pub frames: FrameSet,
    /// Orientation to apply to every placed device, if one was requested.
    pub orientation: Option<Orientation>,
    /// Preferred refresh rate for every placed device, if one was requested.
    pub refresh_rate: Option<f64>,
    /// Connected devices that did not receive a grid cell, in ascending id order.
    pub unplaced: Vec<DeviceId>,
}

/// Resolves `intent` against `snapshot`, choosing grid or explicit-frame mode.
///
/// An empty snapshot is not an error: grid mode then yields an empty layout.
///
/// # Errors
///
/// See [`resolve_grid`] and [`resolve_explicit`].
pub fn resolve(
    intent: &LayoutIntent,
    snapshot: &CatalogSnapshot,
) -> Result<ResolvedLayout, ResolveError> {
    if intent.is_explicit() {
        let frames = resolve_explicit(&intent.frames, snapshot)?;
        Ok(ResolvedLayout {
            frames,
            orientation: intent.orientation,
            refresh_rate: intent.refresh_rate,
            unplaced: Vec::new(),
        })
    } else {
        let (frames, unplaced) = resolve_grid(intent, snapshot)?;
        Ok(ResolvedLayout {
            frames,
            orientation: intent.orientation,
            refresh_rate: intent.refresh_rate,
            unplaced,
        })
    }
}

/// Tiles the connected devices into the intent's grid.
///
/// Returns the placed frames plus the ids of devices that did not fit.
///
/// # Errors
///
/// - [`ResolveError::InvalidGridShape`] if the clamped grid has no cells.
/// - [`ResolveError::GridOutOfBounds`] if a cell origin overflows `i32`.
/// - [`ResolveError::ZeroSizedFrame`] if a device would receive a zero-sized cell.
pub fn resolve_grid(
    intent: &LayoutIntent,
    snapshot: &CatalogSnapshot,
) -> Result<(FrameSet, Vec<DeviceId>), ResolveError> {
    let columns = intent.columns.max(1);
    let rows = intent.rows.max(1);
    if columns == 0 || rows == 0 {
        return Err(ResolveError::InvalidGridShape { columns, rows });
    }
    let capacity = (columns as usize).saturating_mul(rows as usize);

    let mut frames = FrameSet::new();
    let placed: Vec<&DeviceIdentity> = snapshot.ordered().take(capacity).collect();
    let unplaced: Vec<DeviceId> = snapshot.ordered().skip(capacity).map(|device| device.id).collect();
    let pitch = cell_pitch(intent.resolution, &placed);

    // TODO: place the main display in `intent.primary_corner`; cells are
    // always filled from the upper-left today.
    for (index, device) in placed.into_iter().enumerate() {
        // column < columns and row < rows, so both fit in u32.
        let column = (index % columns as usize) as u32;
        let row = (index / columns as usize) as u32;
        let size = cell_size(intent.resolution, device);
        if !size.is_drawable() {
            return Err(ResolveError::ZeroSizedFrame(device.id));
        }
        let origin = Point {
            x: cell_offset(column, pitch.width).ok_or(ResolveError::GridOutOfBounds { column, row })?,
            y: cell_offset(row, pitch.height).ok_or(ResolveError::GridOutOfBounds { column, row })?,
        };
        debug!(device = %device.id, column, row, x = origin.x, y = origin.y, "grid cell assigned");
        frames.insert(Frame {
            device_id: device.id,
            serial_number: Some(device.serial_number),
            origin,
            size,
        });
    }

    if !unplaced.is_empty() {
        warn!(
            capacity,
            unplaced = ?unplaced,
            "more displays connected than grid cells; extra displays left in place"
        );
    }

    Ok((frames, unplaced))
}

/// Validates caller-supplied frames against the snapshot.
///
/// Frames are matched by device id.  A frame whose id is not connected but
/// whose serial number matches exactly one connected device is rebound to that
/// device.
///
/// # Errors
///
/// - [`ResolveError::UnknownDevice`] if a frame matches no connected device.
/// - [`ResolveError::SerialMismatch`] if the id matches but the serial does not.
/// - [`ResolveError::DuplicateDevice`] if two frames end up on one device.
/// - [`ResolveError::ZeroSizedFrame`] if a frame has a zero dimension.
pub fn resolve_explicit(
    requested: &FrameSet,
    snapshot: &CatalogSnapshot,
) -> Result<FrameSet, ResolveError> {
    let mut frames = FrameSet::new();

    for frame in requested.sorted() {
        let device = match_device(frame, snapshot)?;
        if !frame.size.is_drawable() {
            return Err(ResolveError::ZeroSizedFrame(device.id));
        }
        if frames.contains(device.id) {
            return Err(ResolveError::DuplicateDevice(device.id));
        }
        frames.set_frame(
            device.id,
            Frame {
                serial_number: Some(device.serial_number),
                ..frame.clone()
            },
        );
    }

    Ok(frames)
}

fn match_device<'a>(
    frame: &Frame,
    snapshot: &'a CatalogSnapshot,
) -> Result<&'a DeviceIdentity, ResolveError> {
    if let Some(device) = snapshot.get(frame.device_id) {
        return match frame.serial_number {
            Some(expected) if expected != device.serial_number => Err(ResolveError::SerialMismatch {
                device: device.id,
                expected,
                found: device.serial_number,
            }),
            _ => Ok(device),
        };
    }

    if let Some(serial) = frame.serial_number {
        if let [device] = snapshot.with_serial(serial).as_slice() {
            info!(
                requested = %frame.device_id,
                resolved = %device.id,
                serial,
                "device id not connected; matched frame by serial number"
            );
            return Ok(*device);
        }
    }

    Err(ResolveError::UnknownDevice(frame.device_id))
}

fn cell_size(resolution: Size, device: &DeviceIdentity) -> Size {
    let (current_width, current_height) = device.current_size();
    Size {
        width: if resolution.width == 0 { current_width } else { resolution.width },
        height: if resolution.height == 0 { current_height } else { resolution.height },
    }
}

/// Uniform distance between neighbouring cells.
///
/// A requested axis is used as is. An axis left at 0 takes the largest
/// current size among the placed devices, so displays of different sizes
/// never overlap.
fn cell_pitch(resolution: Size, placed: &[&DeviceIdentity]) -> Size {
    let (largest_width, largest_height) = placed
        .iter()
        .map(|device| device.current_size())
        .fold((0, 0), |(w, h), (dw, dh)| (w.max(dw), h.max(dh)));
    Size {
        width: if resolution.width == 0 { largest_width } else { resolution.width },
        height: if resolution.height == 0 { largest_height } else { resolution.height },
    }
}

fn cell_offset(index: u32, extent: u32) -> Option<i32> {
    i32::try_from(u64::from(index) * u64::from(extent)).ok()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
