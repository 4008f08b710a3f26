//! API layer — the request/response surface of the system.
//!
//! [`routes`] holds the full wire contract as pure functions; [`server`]
//! registers them on the ESP-IDF HTTP server and does nothing else.

pub mod routes;

#[cfg(target_os = "espidf")]
pub mod server;
