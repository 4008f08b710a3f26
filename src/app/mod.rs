//! Application core — pure domain logic, zero I/O.
//!
//! This module contains the business rules of the AirSense system: the
//! acquisition cycle, calibration-save policy, history persistence, and
//! configuration updates. All interaction with hardware happens through
//! **port traits** defined in [`ports`], keeping this layer fully testable
//! without real peripherals.

pub mod events;
pub mod ports;
pub mod service;
