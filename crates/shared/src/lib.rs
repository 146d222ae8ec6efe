//! Shared utilities for the sensor service.
//!
//! This crate provides common functionality used across the other crates:
//! - Validation helpers with stable error codes

pub mod validation;
