//! Platform implementations of the display catalog and transaction applier.
//!
//! The correct implementation is selected at compile time via
//! `#[cfg(target_os = ...)]` and re-exported as [`NativeCatalog`] and
//! [`NativeApplier`]:
//!
//! | Module        | OS     | API used                                              |
//! |---------------|--------|-------------------------------------------------------|
//! | `macos`       | macOS  | `CGGetActiveDisplayList`, `CGBeginDisplayConfiguration` … |
//! | `unsupported` | others | none; every call reports "not supported"              |
//!
//! `unsupported` is compiled on every platform so its behaviour can be tested
//! anywhere.  Mode selection ([`choose_mode`]) is shared, pure logic.

#[cfg(target_os = "macos")]
pub mod macos;
pub mod unsupported;

use displaycfg_core::domain::device::DisplayMode;
use displaycfg_core::domain::frame::Size;

#[cfg(target_os = "macos")]
pub type NativeCatalog = macos::CoreGraphicsCatalog;
#[cfg(target_os = "macos")]
pub type NativeApplier = macos::CoreGraphicsApplier;

#[cfg(not(target_os = "macos"))]
pub type NativeCatalog = unsupported::UnsupportedCatalog;
#[cfg(not(target_os = "macos"))]
pub type NativeApplier = unsupported::UnsupportedApplier;

/// Two refresh rates closer than this are treated as equal (59.94 ≈ 60).
pub const REFRESH_TOLERANCE_HZ: f64 = 0.5;

/// Picks the mode to drive a display at `size`.
///
/// Only desktop-usable modes of exactly that logical size are considered.
/// With a preferred rate the closest mode within [`REFRESH_TOLERANCE_HZ`]
/// wins; without one the highest rate wins.  Returns the index into `modes`.
pub fn choose_mode(modes: &[DisplayMode], size: Size, refresh_rate: Option<f64>) -> Option<usize> {
    let candidates = modes
        .iter()
        .enumerate()
        .filter(|(_, m)| m.usable_for_desktop_gui && m.has_size(size.width, size.height));

    match refresh_rate {
        Some(hz) => candidates
            .filter(|(_, m)| (m.refresh_rate - hz).abs() < REFRESH_TOLERANCE_HZ)
            .min_by(|(_, a), (_, b)| {
                (a.refresh_rate - hz).abs().total_cmp(&(b.refresh_rate - hz).abs())
            })
            .map(|(i, _)| i),
        None => candidates
            .max_by(|(_, a), (_, b)| a.refresh_rate.total_cmp(&b.refresh_rate))
            .map(|(i, _)| i),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
