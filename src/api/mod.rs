//! Upstream articulation API access.
//!
//! This module provides the HTTP client for the articulation service and
//! the error taxonomy shared by both pipeline stages.

pub mod client;
pub mod error;

pub use client::ArticulationClient;
pub use error::ApiError;
