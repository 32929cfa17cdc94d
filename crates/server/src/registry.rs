//! Live call registry
//!
//! Tracks the session handle sender of every live call by call id. Holds
//! no dialogue state; sessions own that.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::time::Instant;
use tokio::sync::mpsc;

use voice_intake_agent::SessionEvent;

use crate::metrics;
use crate::ServerError;

#[derive(Debug, Clone)]
struct CallEntry {
    caller: String,
    started_at: Instant,
    /// None while the slot is reserved and the session not yet spawned
    events: Option<mpsc::Sender<SessionEvent>>,
}

/// Summary of a live call for the health endpoint
#[derive(Debug, Clone, serde::Serialize)]
pub struct LiveCall {
    pub call_id: String,
    pub caller: String,
    pub age_secs: u64,
}

#[derive(Debug)]
pub struct CallRegistry {
    calls: RwLock<HashMap<String, CallEntry>>,
    max_calls: usize,
}

impl CallRegistry {
    pub fn new(max_calls: usize) -> Self {
        Self {
            calls: RwLock::new(HashMap::new()),
            max_calls,
        }
    }

    /// Claim a slot for a call before its session exists, refusing it when
    /// the server is at capacity
    pub fn reserve(&self, call_id: &str, caller: &str) -> Result<(), ServerError> {
        let mut calls = self.calls.write();
        if calls.len() >= self.max_calls {
            metrics::record_call_rejected();
            return Err(ServerError::CapacityExceeded(calls.len()));
        }

        calls.insert(
            call_id.to_string(),
            CallEntry {
                caller: caller.to_string(),
                started_at: Instant::now(),
                events: None,
            },
        );
        metrics::record_call_started();
        metrics::record_active_calls(calls.len());
        Ok(())
    }

    /// Bind the session inbox to a reserved slot; false if the slot is gone
    pub fn attach(&self, call_id: &str, events: mpsc::Sender<SessionEvent>) -> bool {
        match self.calls.write().get_mut(call_id) {
            Some(entry) => {
                entry.events = Some(events);
                true
            }
            None => false,
        }
    }

    /// Reserve and attach in one step
    pub fn register(
        &self,
        call_id: &str,
        caller: &str,
        events: mpsc::Sender<SessionEvent>,
    ) -> Result<(), ServerError> {
        self.reserve(call_id, caller)?;
        self.attach(call_id, events);
        Ok(())
    }

    pub fn remove(&self, call_id: &str) -> bool {
        let mut calls = self.calls.write();
        let removed = calls.remove(call_id).is_some();
        metrics::record_active_calls(calls.len());
        removed
    }

    /// Session inbox of a live call
    pub fn sender(&self, call_id: &str) -> Option<mpsc::Sender<SessionEvent>> {
        self.calls.read().get(call_id).and_then(|c| c.events.clone())
    }

    pub fn len(&self) -> usize {
        self.calls.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.read().is_empty()
    }

    pub fn live_calls(&self) -> Vec<LiveCall> {
        self.calls
            .read()
            .iter()
            .map(|(call_id, entry)| LiveCall {
                call_id: call_id.clone(),
                caller: entry.caller.clone(),
                age_secs: entry.started_at.elapsed().as_secs(),
            })
            .collect()
    }

    /// Tell every live session the server is going away
    pub async fn close_all(&self) {
        let senders: Vec<_> = self
            .calls
            .read()
            .values()
            .filter_map(|c| c.events.clone())
            .collect();
        for events in senders {
            let _ = events.send(SessionEvent::SocketClosed).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_and_removal() {
        let registry = CallRegistry::new(1);
        let (tx, _rx) = mpsc::channel(1);

        registry.register("CA1", "+16175550123", tx.clone()).unwrap();
        assert!(matches!(
            registry.register("CA2", "unknown", tx),
            Err(ServerError::CapacityExceeded(1))
        ));
        assert_eq!(registry.len(), 1);
        assert!(registry.sender("CA1").is_some());
        assert_eq!(registry.live_calls()[0].caller, "+16175550123");

        assert!(registry.remove("CA1"));
        assert!(!registry.remove("CA1"));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_reservation_holds_capacity_before_attach() {
        let registry = CallRegistry::new(1);
        registry.reserve("CA1", "unknown").unwrap();

        assert!(registry.sender("CA1").is_none());
        assert!(matches!(
            registry.reserve("CA2", "unknown"),
            Err(ServerError::CapacityExceeded(1))
        ));

        let (tx, _rx) = mpsc::channel(1);
        assert!(registry.attach("CA1", tx.clone()));
        assert!(registry.sender("CA1").is_some());
        assert!(!registry.attach("CA2", tx));
    }

    #[tokio::test]
    async fn test_close_all_notifies_sessions() {
        let registry = CallRegistry::new(4);
        let (tx, mut rx) = mpsc::channel(1);
        registry.register("CA1", "unknown", tx).unwrap();

        registry.close_all().await;
        assert!(matches!(rx.recv().await, Some(SessionEvent::SocketClosed)));
    }
}
