//! Application layer for the command-line tool.
//!
//! Turns one parsed [`commands::Command`] into calls on the layout engine or
//! the catalog, and renders the result.  Everything here works against the
//! `DeviceCatalog` and `TransactionApplier` traits, so it runs unchanged
//! against the Core Graphics adapter or the in-memory test doubles.
//!
//! - **`commands`** – the command set and [`commands::run_command`].
//! - **`report`**   – text and JSON rendering of device and mode queries.

pub mod commands;
pub mod report;
