//! Desired layout state accumulated before one apply call.

use serde::{Deserialize, Serialize};

use super::device::DeviceId;
use super::frame::{Frame, FrameSet, Size};

/// Rotation applied to a display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Orientation {
    #[default]
    Normal,
    Rotate90,
    Rotate180,
    Rotate270,
}

impl Orientation {
    /// Clockwise rotation in degrees.
    pub fn degrees(self) -> u32 {
        match self {
            Orientation::Normal => 0,
            Orientation::Rotate90 => 90,
            Orientation::Rotate180 => 180,
            Orientation::Rotate270 => 270,
        }
    }

    /// Maps a rotation in degrees back to an orientation.
    ///
    /// Returns `None` for anything other than 0, 90, 180 or 270.
    pub fn from_degrees(degrees: u32) -> Option<Self> {
        match degrees {
            0 => Some(Orientation::Normal),
            90 => Some(Orientation::Rotate90),
            180 => Some(Orientation::Rotate180),
            270 => Some(Orientation::Rotate270),
            _ => None,
        }
    }
}

/// Which corner of the grid the main display should occupy.
///
/// Recorded on the intent but not yet used by the resolver, which always
/// anchors the grid at the upper-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Corner {
    #[default]
    UpperLeft,
    UpperRight,
    LowerLeft,
    LowerRight,
}

/// How long an applied configuration survives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Persistence {
    /// Reverted when the applying process exits.
    Application,
    /// Kept until the user logs out.
    Session,
    /// Written to the system's display preferences.
    #[default]
    Permanent,
}

/// Desired state for one layout change.
///
/// Populated by setters, with no validation at set time; everything is checked
/// by the resolver when the layout is applied.  When [`frames`](Self::frames)
/// is non-empty the grid shape and resolution are ignored.
#[derive(Debug, Clone)]
pub struct LayoutIntent {
    /// Grid cell size; a zero dimension means "use the device's current mode".
    pub resolution: Size,
    pub columns: u32,
    pub rows: u32,
    /// `None` leaves every device at its current rotation.
    pub orientation: Option<Orientation>,
    /// Preferred refresh rate in Hz for the chosen modes.
    pub refresh_rate: Option<f64>,
    pub primary_corner: Corner,
    pub persistence: Persistence,
    pub frames: FrameSet,
}

impl Default for LayoutIntent {
    fn default() -> Self {
        Self {
            resolution: Size::default(),
            columns: 1,
            rows: 1,
            orientation: None,
            refresh_rate: None,
            primary_corner: Corner::default(),
            persistence: Persistence::default(),
            frames: FrameSet::new(),
        }
    }
}

impl LayoutIntent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_resolution(&mut self, width: u32, height: u32) {
        self.resolution = Size { width, height };
    }

    pub fn set_columns(&mut self, columns: u32) {
        self.columns = columns;
    }

    pub fn set_rows(&mut self, rows: u32) {
        self.rows = rows;
    }

    pub fn set_orientation(&mut self, orientation: Orientation) {
        self.orientation = Some(orientation);
    }

    pub fn set_refresh_rate(&mut self, hz: f64) {
        self.refresh_rate = Some(hz);
    }

    pub fn set_primary_corner(&mut self, corner: Corner) {
        self.primary_corner = corner;
    }

    pub fn set_persistence(&mut self, persistence: Persistence) {
        self.persistence = persistence;
    }

    /// Adds or replaces an explicit frame override for `device_id`.
    pub fn set_frame(&mut self, device_id: DeviceId, frame: Frame) {
        self.frames.set_frame(device_id, frame);
    }

    /// Returns `true` if explicit frames override the grid.
    pub fn is_explicit(&self) -> bool {
        !self.frames.is_empty()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
