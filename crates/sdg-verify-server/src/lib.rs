//! SDG verification HTTP server library (used by the binary and integration tests).

pub mod gateway;
