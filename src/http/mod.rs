//! HTTP transport layer.
//!
//! Thin plumbing over the admission engine: one route per engine operation,
//! JSON bodies, field validation, and error translation. Holds no state of
//! its own.

pub mod routes;
mod server;

pub use server::HttpServer;
