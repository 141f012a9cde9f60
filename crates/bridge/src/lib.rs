pub mod bridge_worker;
pub mod config;
pub mod domain;
pub mod mqtt;
pub mod telegram;
pub mod telemetry;

pub use bridge_worker::*;
pub use domain::*;
