//! Frame model: the target geometry of each device in one layout.
//!
//! A [`Frame`] is the position and size assigned to one device in the global
//! coordinate space.  A [`FrameSet`] maps device ids to frames, holding at most
//! one frame per device (last write wins).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::device::DeviceId;

/// Top-left corner of a frame in global coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

/// Width and height of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    /// Returns `true` if both dimensions are non-zero.
    pub fn is_drawable(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

/// The target position and size of one device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    pub device_id: DeviceId,
    /// Optional secondary match key, used when the device id no longer
    /// resolves (ids can change when displays are reconnected).
    pub serial_number: Option<u32>,
    pub origin: Point,
    pub size: Size,
}

impl Frame {
    /// Creates a frame without a serial number.
    pub fn new(device_id: impl Into<DeviceId>, x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            device_id: device_id.into(),
            serial_number: None,
            origin: Point { x, y },
            size: Size { width, height },
        }
    }

    /// Attaches a serial number as secondary match key.
    pub fn with_serial(mut self, serial_number: u32) -> Self {
        self.serial_number = Some(serial_number);
        self
    }

    fn same_geometry(&self, other: &Frame) -> bool {
        self.origin == other.origin && self.size == other.size
    }
}

/// A set of frames keyed by device id.
///
/// Two frame sets are equal when they cover the same device ids with the same
/// (origin, size) pairs; serial numbers do not take part in the comparison.
#[derive(Debug, Clone, Default)]
pub struct FrameSet {
    frames: HashMap<DeviceId, Frame>,
}

impl FrameSet {
    /// Creates an empty frame set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the frame for `device_id`.
    ///
    /// The frame's own `device_id` is overwritten so the key and the value can
    /// never disagree.  Returns the frame previously stored for that device.
    pub fn set_frame(&mut self, device_id: DeviceId, mut frame: Frame) -> Option<Frame> {
        frame.device_id = device_id;
        self.frames.insert(device_id, frame)
    }

    /// Inserts `frame` under its own device id.
    pub fn insert(&mut self, frame: Frame) -> Option<Frame> {
        self.set_frame(frame.device_id, frame)
    }

    /// Returns the frame for `device_id`, or `None` if no frame is stored.
    pub fn get_frame(&self, device_id: DeviceId) -> Option<&Frame> {
        self.frames.get(&device_id)
    }

    pub fn contains(&self, device_id: DeviceId) -> bool {
        self.frames.contains_key(&device_id)
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Iterates frames in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = &Frame> {
        self.frames.values()
    }

    /// Returns the frames ordered by ascending device id.
    ///
    /// This is the order in which the engine hands frames to the applier.
    pub fn sorted(&self) -> Vec<&Frame> {
        let mut frames: Vec<&Frame> = self.frames.values().collect();
        frames.sort_by_key(|f| f.device_id);
        frames
    }
}

impl PartialEq for FrameSet {
    fn eq(&self, other: &Self) -> bool {
        self.frames.len() == other.frames.len()
            && self.frames.iter().all(|(id, frame)| {
                other
                    .frames
                    .get(id)
                    .is_some_and(|theirs| frame.same_geometry(theirs))
            })
    }
}

impl Eq for FrameSet {}

impl FromIterator<Frame> for FrameSet {
    fn from_iter<I: IntoIterator<Item = Frame>>(iter: I) -> Self {
        let mut set = FrameSet::new();
        for frame in iter {
            set.insert(frame);
        }
        set
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
