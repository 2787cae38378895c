//! Known webhook sources and the destinations they relay to.
//!
//! The registry is built once from [`Settings`](crate::config::Settings) and
//! never mutated afterwards, so it is shared across requests behind an `Arc`
//! without any locking.

mod registry;

pub use registry::{ChatId, Host, HostRegistry};
