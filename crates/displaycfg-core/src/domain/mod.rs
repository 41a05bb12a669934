//! Domain layer: pure data types and the layout resolution algorithm.
//!
//! Nothing in this module performs I/O or talks to the display subsystem.
//!
//! - **`device`** – read-only records describing connected displays and the
//!   modes they support.
//! - **`frame`** – the target position and size of one device, and the
//!   per-device [`frame::FrameSet`] describing one whole layout.
//! - **`intent`** – the accumulated desired state (grid shape, resolution,
//!   orientation, persistence, explicit frames) for one apply call.
//! - **`resolver`** – turns an intent plus a catalog snapshot into a validated
//!   [`frame::FrameSet`].

pub mod device;
pub mod frame;
pub mod intent;
pub mod resolver;
