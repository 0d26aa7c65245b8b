//! Change events and the in-process event bus.
//!
//! Every successful mutation publishes exactly one [`ChangeEvent`]
//! after the write commits. Consumers subscribe through filtered
//! streams scoped to a board or an item; events outside the scope are
//! skipped, never surfaced as empty values. Slow subscribers that fall
//! behind the broadcast buffer miss events rather than stall writers.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::{Stream, StreamExt};
use uuid::Uuid;

/// A state change, scoped by the ids a subscriber can filter on.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum ChangeEvent {
    BoardUpdated {
        board_id: Uuid,
        workspace_id: Uuid,
    },
    ItemCreated {
        item_id: Uuid,
        board_id: Uuid,
    },
    ItemUpdated {
        item_id: Uuid,
        board_id: Uuid,
    },
    ItemDeleted {
        item_id: Uuid,
        board_id: Uuid,
    },
    ColumnValueUpdated {
        item_id: Uuid,
        board_id: Uuid,
        column_id: Uuid,
    },
    UpdateCreated {
        update_id: Uuid,
        item_id: Uuid,
        board_id: Uuid,
    },
}

impl ChangeEvent {
    /// Wire name of the event (matches the client contract).
    pub fn event_type(&self) -> &'static str {
        match self {
            ChangeEvent::BoardUpdated { .. } => "BOARD_UPDATED",
            ChangeEvent::ItemCreated { .. } => "ITEM_CREATED",
            ChangeEvent::ItemUpdated { .. } => "ITEM_UPDATED",
            ChangeEvent::ItemDeleted { .. } => "ITEM_DELETED",
            ChangeEvent::ColumnValueUpdated { .. } => "COLUMN_VALUE_UPDATED",
            ChangeEvent::UpdateCreated { .. } => "UPDATE_CREATED",
        }
    }

    /// The board this event belongs to.
    pub fn board_id(&self) -> Uuid {
        match self {
            ChangeEvent::BoardUpdated { board_id, .. }
            | ChangeEvent::ItemCreated { board_id, .. }
            | ChangeEvent::ItemUpdated { board_id, .. }
            | ChangeEvent::ItemDeleted { board_id, .. }
            | ChangeEvent::ColumnValueUpdated { board_id, .. }
            | ChangeEvent::UpdateCreated { board_id, .. } => *board_id,
        }
    }

    /// The item this event belongs to, when item-scoped.
    pub fn item_id(&self) -> Option<Uuid> {
        match self {
            ChangeEvent::BoardUpdated { .. } => None,
            ChangeEvent::ItemCreated { item_id, .. }
            | ChangeEvent::ItemUpdated { item_id, .. }
            | ChangeEvent::ItemDeleted { item_id, .. }
            | ChangeEvent::ColumnValueUpdated { item_id, .. }
            | ChangeEvent::UpdateCreated { item_id, .. } => Some(*item_id),
        }
    }
}

/// A published event plus attribution metadata.
#[derive(Debug, Clone, Serialize)]
pub struct EventEnvelope {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    /// The user whose mutation caused the event.
    pub actor_id: Uuid,
    pub payload: ChangeEvent,
}

/// Broadcast-based bus distributing change events to subscribers.
///
/// Publishing never blocks and never fails the mutation that caused
/// it: with no subscribers the event is dropped, and a subscriber that
/// lags past the buffer misses events instead of applying backpressure.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<EventEnvelope>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publish an event to all current subscribers.
    pub fn publish(&self, actor_id: Uuid, event: ChangeEvent) {
        let envelope = EventEnvelope {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            actor_id,
            payload: event,
        };
        tracing::debug!(
            event_type = envelope.payload.event_type(),
            subscriber_count = self.tx.receiver_count(),
            "publishing change event"
        );
        let _ = self.tx.send(envelope);
    }

    /// Raw subscription to every event on the bus.
    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.tx.subscribe()
    }

    /// Events for one board, in publication order.
    pub fn board_stream(&self, board_id: Uuid) -> impl Stream<Item = EventEnvelope> + Send + use<> {
        self.filtered(move |event| event.board_id() == board_id)
    }

    /// Item-scoped events for one item.
    pub fn item_stream(&self, item_id: Uuid) -> impl Stream<Item = EventEnvelope> + Send + use<> {
        self.filtered(move |event| event.item_id() == Some(item_id))
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    fn filtered<F>(&self, keep: F) -> impl Stream<Item = EventEnvelope> + Send + use<F>
    where
        F: Fn(&ChangeEvent) -> bool + Send + 'static,
    {
        BroadcastStream::new(self.tx.subscribe()).filter_map(move |received| match received {
            Ok(envelope) if keep(&envelope.payload) => Some(envelope),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!(error = %e, "subscriber lagged, events dropped");
                None
            }
        })
    }
}
