//! Domain primitives for sales health evaluation.
//!
//! Everything in here is pure: no storage, no I/O, no clock.

pub mod health;

pub use health::Health;
