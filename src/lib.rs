//! Tank controller firmware library.
//!
//! Exposes the pure-logic modules for integration testing and external
//! inspection. All ESP-IDF-specific code sits behind the `espidf` cargo
//! feature within each module, so the host build runs the test suites.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod control;
pub mod error;
pub mod ui;

pub mod adapters;
pub mod pins;
pub mod sensors;
