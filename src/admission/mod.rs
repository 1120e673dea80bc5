//! Admission control logic and state management.

mod engine;
mod registry;
mod sweeper;
mod window;

pub use engine::{AdmissionEngine, SweepStats};
pub use registry::ConfigRegistry;
pub use sweeper::EvictionSweeper;
pub use window::{Decision, RequestLog, WindowConfig, DEFAULT_LIMIT, DEFAULT_WINDOW};
