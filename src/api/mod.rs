//! API layer - HTTP endpoint handlers.

mod health;
mod metrics;
mod models;
mod routes;
mod webhook;

pub use health::{health, stats, HealthResponse};
pub use metrics::prometheus_metrics;
pub use models::{WebhookRequest, WebhookResponse};
pub use routes::api_routes;
pub use webhook::receive_webhook;
