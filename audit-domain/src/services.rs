// Pure in-memory domain services

pub mod classifier;
pub mod rate_monitor;

pub use classifier::*;
pub use rate_monitor::*;
