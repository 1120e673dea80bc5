//! Floodgate - Sliding-Window Admission Control Service
//!
//! This crate implements an in-memory admission control engine: per-client
//! sliding-window request counting with a global default configuration,
//! per-client overrides, and a background eviction sweeper that bounds
//! memory. A thin HTTP layer exposes the engine's operations.

pub mod admission;
pub mod config;
pub mod error;
pub mod http;
