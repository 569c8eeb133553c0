//! Gantry Core
//!
//! Core types for the Gantry CI/CD client toolkit.
//!
//! This crate contains:
//! - Domain types: statuses, workflow runs, pipeline builds, variables
//! - DTOs: request payloads sent to the API
//! - Duration rendering for settled runs
//!
//! Note: HTTP transport lives in gantry-client, the live monitor in gantry-watch.

pub mod domain;
pub mod dto;
pub mod duration;
