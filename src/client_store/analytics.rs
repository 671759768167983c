use super::kv::LocalStore;
use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

pub const ANALYTICS_KEY: &str = "ai_analytics";
pub const MAX_EVENTS: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsEvent {
    pub event: String,
    #[serde(default)]
    pub data: Value,
    pub timestamp: DateTime<Utc>,
}

/// Bounded append-only event log under the `ai_analytics` key.
pub struct Analytics {
    store: Arc<dyn LocalStore>,
    cap: usize,
}

impl Analytics {
    pub fn new(store: Arc<dyn LocalStore>) -> Self {
        Self {
            store,
            cap: MAX_EVENTS,
        }
    }

    /// Stored events, oldest first. Content that is not an event array reads as empty.
    pub fn events(&self) -> Result<Vec<AnalyticsEvent>> {
        Ok(self
            .store
            .get(ANALYTICS_KEY)?
            .and_then(|v| serde_json::from_value(v).ok())
            .unwrap_or_default())
    }

    pub fn track(&self, event: &str, data: Value) -> Result<AnalyticsEvent> {
        self.track_at(event, data, Utc::now())
    }

    pub fn track_at(&self, event: &str, data: Value, timestamp: DateTime<Utc>) -> Result<AnalyticsEvent> {
        let entry = AnalyticsEvent {
            event: event.to_string(),
            data,
            timestamp,
        };

        let mut events = self.events()?;
        events.push(entry.clone());
        if events.len() > self.cap {
            let excess = events.len() - self.cap;
            events.drain(..excess);
        }

        self.store.set(ANALYTICS_KEY, &serde_json::to_value(&events)?)?;
        Ok(entry)
    }

    /// Event counts by name.
    pub fn summary(&self) -> Result<BTreeMap<String, usize>> {
        let mut counts = BTreeMap::new();
        for e in self.events()? {
            *counts.entry(e.event).or_insert(0) += 1;
        }
        Ok(counts)
    }

    pub fn clear(&self) -> Result<()> {
        self.store.remove(ANALYTICS_KEY)
    }
}
