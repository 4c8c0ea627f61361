//! # Roster Server Library
//!
//! Wiring and startup utilities for the Roster server binary.

pub mod bootstrap;
pub mod startup;
