//! Application core: pure domain logic, zero I/O.
//!
//! This module wires the zone classifier, edge emitter, transmission guard
//! and indicator engine into one polling service. All interaction with
//! hardware happens through **port traits** defined in [`ports`], keeping
//! this layer fully testable without real peripherals.

pub mod events;
pub mod ports;
pub mod service;
