//! Dispatch results, errors and statistics

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use thiserror::Error;

use crate::delivery::DeliveryError;
use crate::hosts::ChatId;

/// Result of one delivery attempt to one chat
#[derive(Debug)]
pub struct DeliveryOutcome {
    pub chat_id: ChatId,
    pub result: Result<(), DeliveryError>,
}

impl DeliveryOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    /// Convert a failed outcome into a [`DeliveryFailure`]
    pub fn into_failure(self) -> Option<DeliveryFailure> {
        match self.result {
            Ok(()) => None,
            Err(error) => Some(DeliveryFailure {
                chat_id: self.chat_id,
                error,
            }),
        }
    }
}

/// A chat that could not be reached
#[derive(Debug)]
pub struct DeliveryFailure {
    pub chat_id: ChatId,
    pub error: DeliveryError,
}

/// Successful dispatch summary
#[derive(Debug, Clone, Serialize)]
pub struct DispatchReport {
    pub host: String,
    pub message_type: String,
    /// Text sent to every destination
    pub text: String,
    pub delivered_to: usize,
}

#[derive(Debug, Error)]
pub enum DispatchError {
    /// Host is not configured or not enabled
    #[error("unknown host: {0}")]
    UnknownHost(String),

    /// At least one destination failed; failures are kept in destination order
    #[error(
        "failed to deliver to {} of {} destinations",
        .failures.len(),
        .attempted
    )]
    DeliveryFailed {
        attempted: usize,
        failures: Vec<DeliveryFailure>,
    },
}

impl DispatchError {
    /// The most recent delivery failure, if this is a delivery error
    pub fn last_failure(&self) -> Option<&DeliveryFailure> {
        match self {
            DispatchError::DeliveryFailed { failures, .. } => failures.last(),
            DispatchError::UnknownHost(_) => None,
        }
    }
}

/// Statistics for the dispatcher
#[derive(Debug, Default)]
pub struct DispatcherStats {
    /// Dispatch calls received
    pub total_dispatched: AtomicU64,
    /// Calls rejected because the host was unknown or disabled
    pub unknown_host: AtomicU64,
    /// Calls where every destination received the message
    pub total_sent: AtomicU64,
    /// Calls where at least one destination failed
    pub total_failed: AtomicU64,
    /// Successful per-chat deliveries
    pub deliveries_succeeded: AtomicU64,
    /// Failed per-chat deliveries
    pub deliveries_failed: AtomicU64,
}

impl DispatcherStats {
    pub fn snapshot(&self) -> DispatcherStatsSnapshot {
        DispatcherStatsSnapshot {
            total_dispatched: self.total_dispatched.load(Ordering::Relaxed),
            unknown_host: self.unknown_host.load(Ordering::Relaxed),
            total_sent: self.total_sent.load(Ordering::Relaxed),
            total_failed: self.total_failed.load(Ordering::Relaxed),
            deliveries_succeeded: self.deliveries_succeeded.load(Ordering::Relaxed),
            deliveries_failed: self.deliveries_failed.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of dispatcher statistics
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatcherStatsSnapshot {
    pub total_dispatched: u64,
    pub unknown_host: u64,
    pub total_sent: u64,
    pub total_failed: u64,
    pub deliveries_succeeded: u64,
    pub deliveries_failed: u64,
}
