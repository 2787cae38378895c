//! Webhook dispatch: host resolution, template selection, rendering and
//! fan-out to every destination chat.

mod dispatcher;
mod types;

pub use dispatcher::{
    select_template, unknown_host_notice, Dispatcher, DEFAULT_TEMPLATE_KEY, FALLBACK_TEMPLATE,
};
pub use types::{
    DeliveryFailure, DeliveryOutcome, DispatchError, DispatchReport, DispatcherStats,
    DispatcherStatsSnapshot,
};
