//! displaycfg library entry point.
//!
//! Re-exports all modules so that integration tests in `tests/` and the
//! binary entry point in `main.rs` share the same module tree.
//!
//! - [`cli`] – argument definitions, input parsing, and the top-level [`cli::run`].
//! - [`error`] – the [`error::AppError`] taxonomy and its exit codes.
//! - [`application`] – command dispatch and report rendering.
//! - [`infrastructure`] – configuration file, logging, and platform adapters.

pub mod application;
pub mod cli;
pub mod error;
pub mod infrastructure;
