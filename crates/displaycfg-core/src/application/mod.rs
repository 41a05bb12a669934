//! Application layer: collaborator interfaces and the layout engine.
//!
//! Use cases in this layer depend on traits, never on a concrete platform, so
//! the Core Graphics adapters and the in-memory test doubles are
//! interchangeable.
//!
//! - **`catalog`** – the read-only [`catalog::DeviceCatalog`] interface and the
//!   helper that captures one [`crate::domain::device::CatalogSnapshot`].
//! - **`transaction`** – the [`transaction::TransactionApplier`] interface
//!   modelling an all-or-nothing display configuration change.
//! - **`engine`** – [`engine::LayoutEngine`], which accumulates the desired
//!   state and drives resolver and applier through one apply call.

pub mod catalog;
pub mod engine;
pub mod transaction;
