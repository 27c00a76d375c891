//! # Progress Reporting Port
//!
//! Human-readable progress and error messages emitted while a search runs.
//!
//! Reporting is best effort: implementations must return immediately and must
//! never fail, so a missing or slow listener can't stall the pipeline.

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressLevel {
    Info,
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProgressEvent {
    pub timestamp: DateTime<Utc>,
    pub message: String,
    #[serde(rename = "type")]
    pub level: ProgressLevel,
}

impl ProgressEvent {
    pub fn new(message: &str, level: ProgressLevel) -> Self {
        Self {
            timestamp: Utc::now(),
            message: message.to_string(),
            level,
        }
    }
}

pub trait ProgressReporter: Send + Sync {
    fn report(&self, message: &str, level: ProgressLevel);

    fn info(&self, message: &str) {
        self.report(message, ProgressLevel::Info);
    }

    fn error(&self, message: &str) {
        self.report(message, ProgressLevel::Error);
    }
}

/// Forwards progress to the `tracing` subscriber under `domov::progress`.
pub struct TracingReporter;

impl ProgressReporter for TracingReporter {
    fn report(&self, message: &str, level: ProgressLevel) {
        match level {
            ProgressLevel::Info => info!(target: "domov::progress", "{message}"),
            ProgressLevel::Error => error!(target: "domov::progress", "{message}"),
        }
    }
}

/// Discards everything.
pub struct NullReporter;

impl ProgressReporter for NullReporter {
    fn report(&self, _message: &str, _level: ProgressLevel) {}
}

/// Pushes events onto a broadcast channel for any number of live subscribers.
/// This is the hook for embedders that push progress to remote clients.
///
/// Sending never waits: with no subscribers the event is dropped, and a slow
/// subscriber loses the oldest events once `capacity` is exceeded.
pub struct BroadcastReporter {
    tx: broadcast::Sender<ProgressEvent>,
}

impl BroadcastReporter {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ProgressEvent> {
        self.tx.subscribe()
    }
}

impl ProgressReporter for BroadcastReporter {
    fn report(&self, message: &str, level: ProgressLevel) {
        let _ = self.tx.send(ProgressEvent::new(message, level));
    }
}

/// Keeps every event in memory; handy for inspecting a finished search.
#[derive(Default)]
pub struct MemoryReporter {
    events: Mutex<Vec<ProgressEvent>>,
}

impl MemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.events().into_iter().map(|e| e.message).collect()
    }
}

impl ProgressReporter for MemoryReporter {
    fn report(&self, message: &str, level: ProgressLevel) {
        if let Ok(mut events) = self.events.lock() {
            events.push(ProgressEvent::new(message, level));
        }
    }
}

/// Sends every event to each inner reporter in turn.
pub struct FanoutReporter {
    reporters: Vec<std::sync::Arc<dyn ProgressReporter>>,
}

impl FanoutReporter {
    pub fn new(reporters: Vec<std::sync::Arc<dyn ProgressReporter>>) -> Self {
        Self { reporters }
    }
}

impl ProgressReporter for FanoutReporter {
    fn report(&self, message: &str, level: ProgressLevel) {
        for reporter in &self.reporters {
            reporter.report(message, level);
        }
    }
}
