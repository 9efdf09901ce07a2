//! Shared library surface for the IMPS server and its tests.

pub mod api;
pub mod config;
pub mod state;
