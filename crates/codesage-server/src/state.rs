//! Shared server state
//!
//! One [`AppState`] is built at startup and shared by every connection
//! task. The [`ConnectionMap`] tracks the live outbound channel of each
//! connection per interview, so handlers can broadcast to an interview or
//! reply to a single requester without touching the transport directly.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::Context;
use codesage::{
    AnalysisPipeline, Config, GeminiClient, Interviewer, OutboundEvent, Sandbox, SessionRegistry,
};
use tokio::sync::RwLock;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub registry: SessionRegistry,
    pub pipeline: AnalysisPipeline,
    pub interviewer: Interviewer,
    pub connections: ConnectionMap,
}

impl AppState {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let sandbox = Arc::new(Sandbox::new(&config.execution));
        let generator =
            GeminiClient::new(&config.generator).context("failed to build feedback generator")?;

        Ok(Self {
            registry: SessionRegistry::new(),
            pipeline: AnalysisPipeline::new(sandbox),
            interviewer: Interviewer::new(Arc::new(generator), &config.generator),
            connections: ConnectionMap::default(),
        })
    }
}

/// Outbound channels of the live connections, keyed by interview
#[derive(Debug, Default)]
pub struct ConnectionMap {
    next_id: AtomicU64,
    senders: RwLock<HashMap<String, HashMap<u64, UnboundedSender<OutboundEvent>>>>,
}

impl ConnectionMap {
    /// Register a new connection; returns its id and the outbound receiver
    /// the connection task drains into the transport
    pub async fn register(&self, interview_id: &str) -> (u64, UnboundedReceiver<OutboundEvent>) {
        let connection_id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::unbounded_channel();

        self.senders
            .write()
            .await
            .entry(interview_id.to_owned())
            .or_default()
            .insert(connection_id, tx);

        (connection_id, rx)
    }

    /// Drop a connection; the interview's session state is untouched
    pub async fn unregister(&self, interview_id: &str, connection_id: u64) {
        let mut senders = self.senders.write().await;
        if let Some(connections) = senders.get_mut(interview_id) {
            connections.remove(&connection_id);
            if connections.is_empty() {
                senders.remove(interview_id);
            }
        }
    }

    /// Fan an event out to every connection of the interview
    pub async fn broadcast(&self, interview_id: &str, event: &OutboundEvent) {
        let senders = self.senders.read().await;
        if let Some(connections) = senders.get(interview_id) {
            for sender in connections.values() {
                // A failed send means the connection is already closing
                let _ = sender.send(event.clone());
            }
        }
    }

    /// Send an event to one connection only
    pub async fn send_to(&self, interview_id: &str, connection_id: u64, event: OutboundEvent) {
        let senders = self.senders.read().await;
        if let Some(sender) = senders
            .get(interview_id)
            .and_then(|connections| connections.get(&connection_id))
        {
            let _ = sender.send(event);
        }
    }

    /// Number of live connections for an interview
    pub async fn connection_count(&self, interview_id: &str) -> usize {
        self.senders
            .read()
            .await
            .get(interview_id)
            .map_or(0, HashMap::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn broadcast_reaches_every_connection_of_the_interview() {
        let map = ConnectionMap::default();
        let (_, mut rx_a) = map.register("int-1").await;
        let (_, mut rx_b) = map.register("int-1").await;
        let (_, mut rx_other) = map.register("int-2").await;

        map.broadcast(
            "int-1",
            &OutboundEvent::ChatMessage {
                ai_response: "hello".to_owned(),
            },
        )
        .await;

        assert!(rx_a.try_recv().is_ok());
        assert!(rx_b.try_recv().is_ok());
        assert!(rx_other.try_recv().is_err());
    }

    #[tokio::test]
    async fn send_to_targets_a_single_connection() {
        let map = ConnectionMap::default();
        let (id_a, mut rx_a) = map.register("int-1").await;
        let (_, mut rx_b) = map.register("int-1").await;

        map.send_to(
            "int-1",
            id_a,
            OutboundEvent::FollowUpQuestion {
                question: "why a set?".to_owned(),
            },
        )
        .await;

        assert!(rx_a.try_recv().is_ok());
        assert!(rx_b.try_recv().is_err());
    }

    #[tokio::test]
    async fn unregister_removes_only_that_connection() {
        let map = ConnectionMap::default();
        let (id_a, _rx_a) = map.register("int-1").await;
        let (_, mut rx_b) = map.register("int-1").await;
        assert_eq!(map.connection_count("int-1").await, 2);

        map.unregister("int-1", id_a).await;
        assert_eq!(map.connection_count("int-1").await, 1);

        map.broadcast(
            "int-1",
            &OutboundEvent::ChatMessage {
                ai_response: "still here".to_owned(),
            },
        )
        .await;
        assert!(rx_b.try_recv().is_ok());
    }

    #[tokio::test]
    async fn connection_ids_are_unique() {
        let map = ConnectionMap::default();
        let (id_a, _rx_a) = map.register("int-1").await;
        let (id_b, _rx_b) = map.register("int-1").await;
        assert_ne!(id_a, id_b);
    }
}
