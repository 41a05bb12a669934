//! Query reports: one line per device, or one line per mode.
//!
//! Text output follows the long-standing format of the tool:
//!
//! ```text
//! There are 3 display modes for display 2 (vendor 0x10ac, model 0xa0c4)
//! 	1920x1080 @ 60.00Hz (pixels 1920x1080, id 1) usable
//! 	…
//! ```
//!
//! JSON output (`--json`) serializes the same records with `serde_json`.

use std::io::{self, Write};

use serde::Serialize;

use displaycfg_core::domain::device::{DeviceIdentity, DisplayMode};

/// How query results are written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

#[derive(Serialize)]
struct ModesReport<'a> {
    display_name: String,
    device: &'a DeviceIdentity,
    modes: &'a [DisplayMode],
}

/// Writes every device, in the order given.
pub fn write_devices(
    devices: &[DeviceIdentity],
    format: ReportFormat,
    out: &mut dyn Write,
) -> io::Result<()> {
    match format {
        ReportFormat::Text => {
            if devices.is_empty() {
                writeln!(out, "No connected displays.")?;
            }
            for device in devices {
                writeln!(out, "{device}")?;
            }
        }
        ReportFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, devices)?;
            writeln!(out)?;
        }
    }
    Ok(())
}

/// Writes the display name of `device` followed by every mode it supports.
pub fn write_modes(
    device: &DeviceIdentity,
    modes: &[DisplayMode],
    format: ReportFormat,
    out: &mut dyn Write,
) -> io::Result<()> {
    match format {
        ReportFormat::Text => {
            writeln!(
                out,
                "There are {} display modes for {}",
                modes.len(),
                device.display_name()
            )?;
            for mode in modes {
                writeln!(out, "\t{mode}")?;
            }
        }
        ReportFormat::Json => {
            let report = ModesReport {
                display_name: device.display_name(),
                device,
                modes,
            };
            serde_json::to_writer_pretty(&mut *out, &report)?;
            writeln!(out)?;
        }
    }
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
