//! # displaycfg-core
//!
//! Layout engine for arranging the physical displays attached to a host.
//!
//! The crate turns a description of the desired display geometry, either a
//! uniform grid (columns × rows) or an explicit per-device frame list, into a
//! concrete placement of rectangles in the global coordinate space, and then
//! applies that placement as one atomic configuration transaction.
//!
//! It has zero dependencies on OS APIs.  The two OS-facing collaborators are
//! expressed as traits in the application layer:
//!
//! - [`application::catalog::DeviceCatalog`] – read-only enumeration of the
//!   connected displays and their modes.
//! - [`application::transaction::TransactionApplier`] – begin / set / commit /
//!   cancel access to the display subsystem.
//!
//! # Data flow
//!
//! ```text
//! caller ─ setters ─▶ LayoutEngine (LayoutIntent)
//!                         │
//!                         ├─ DeviceCatalog::list_devices()  → CatalogSnapshot
//!                         ├─ resolver::resolve_*()          → FrameSet
//!                         └─ TransactionApplier             → commit | cancel
//! ```
//!
//! # Crate layout
//!
//! - [`domain`] – pure data and algorithms: frames, device records, the layout
//!   intent, and the grid / explicit-frame resolver.
//! - [`application`] – collaborator traits and the [`application::engine::LayoutEngine`]
//!   orchestrator.
//! - [`mock`] – in-memory collaborators, always compiled so that tests in any
//!   crate and on any platform can drive the engine without real displays.

/// Domain layer: frames, devices, intent, resolver.
pub mod domain;

/// Application layer: collaborator interfaces and the layout engine.
pub mod application;

/// In-memory catalog and recording applier for tests.
pub mod mock;
