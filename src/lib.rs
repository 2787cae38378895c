// Shared infrastructure
pub mod config;
pub mod error;
pub mod metrics;
pub mod telemetry;

// Relay domain
pub mod delivery;
pub mod dispatch;
pub mod hosts;
pub mod template;

// Application layer
pub mod api;
pub mod server;
