//! Infrastructure layer for the command-line tool.
//!
//! Contains the OS-facing adapters: the configuration file, the logging
//! bootstrap, and the platform implementations of the catalog and applier
//! traits from `displaycfg_core`.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `displaycfg_core`, but MUST NOT be imported by the `application` layer.

pub mod config;
pub mod logging;
pub mod platform;
