//! Test helpers for driving full tether sessions over the in-memory
//! loopback transport.

pub mod helpers;
