//! Live subscriptions.
//!
//! A subscription is authorized once, at subscribe time, at read
//! level on the scoping resource; the returned stream then yields
//! only events inside that scope. Events outside the scope are
//! skipped, so subscribers never see placeholder values.

use quadro_core::access::{AccessLevel, Identity, ResourceRef, authorize};
use quadro_core::error::QuadroResult;
use quadro_core::repository::Store;
use tokio_stream::Stream;
use uuid::Uuid;

use crate::api::Api;
use crate::events::EventEnvelope;

impl<S: Store + Clone> Api<S> {
    /// All change events on one board, in publication order.
    pub async fn subscribe_board(
        &self,
        identity: Option<&Identity>,
        board_id: Uuid,
    ) -> QuadroResult<impl Stream<Item = EventEnvelope> + Send + use<S>> {
        authorize(
            self.store(),
            identity,
            ResourceRef::Board(board_id),
            AccessLevel::Read,
        )
        .await?;
        Ok(self.events().board_stream(board_id))
    }

    /// Item-scoped change events for one item.
    pub async fn subscribe_item(
        &self,
        identity: Option<&Identity>,
        item_id: Uuid,
    ) -> QuadroResult<impl Stream<Item = EventEnvelope> + Send + use<S>> {
        authorize(
            self.store(),
            identity,
            ResourceRef::Item(item_id),
            AccessLevel::Read,
        )
        .await?;
        Ok(self.events().item_stream(item_id))
    }
}
