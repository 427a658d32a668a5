//! Safety Node firmware library.
//!
//! Exposes the pure-logic modules for integration testing and external
//! inspection. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod emitter;
pub mod error;
pub mod indicator;
pub mod link;
pub mod pins;
pub mod protocol;
pub mod zone;

// Hardware-facing modules; real implementations are behind cfg attributes
// inside, host builds get simulation stubs.
pub mod adapters;
pub mod drivers;
pub mod sensors;
