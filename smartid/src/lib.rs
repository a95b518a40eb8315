//! `smartid` packages [`smartid_core`] with its foreign-language bindings enabled, for use as
//! the static or dynamic library behind Swift and Kotlin packages.
//!
//! Rust users can depend on either crate; everything is re-exported here.

smartid_core::uniffi_reexport_scaffolding!();

pub use smartid_core::*;
