#![forbid(unsafe_code)]

//! Core domain model and calculation logic for PRP dosing.
//!
//! This crate provides:
//! - Domain types (inputs, zones, concentrations, plans, feedback)
//! - The built-in treatment zones
//! - The dosage calculator and concentration feedback
//! - Request/response adapters for transport collaborators
//! - Configuration and logging

pub mod types;
pub mod error;
pub mod zones;
pub mod feedback;
pub mod calculator;
pub mod request;
pub mod response;
pub mod config;
pub mod logging;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use zones::{find_zone, FULL_SCALP, TEMPORAL_CROWN, ZONES};
pub use calculator::compute;
pub use config::{Config, ProtocolDefaults};
pub use response::{respond, Response};
