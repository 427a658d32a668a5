//! Sensor drivers.

pub mod hall;
