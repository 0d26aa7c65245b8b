//! Item operations: the full mutation pipeline with audit trail and
//! change events, plus item-scoped reads.

use quadro_core::access::{AccessLevel, Identity, ResourceRef, authorize};
use quadro_core::error::QuadroResult;
use quadro_core::models::activity::{Activity, ActivityKind, CreateActivity};
use quadro_core::models::column_value::ColumnValue;
use quadro_core::models::item::{CreateItem, Item, UpdateItem};
use quadro_core::models::notification::{CreateNotification, NotificationKind};
use quadro_core::models::update::{CreateUpdate, Update};
use quadro_core::repository::{Page, Pagination, Store};
use serde_json::json;
use uuid::Uuid;

use crate::api::Api;
use crate::events::ChangeEvent;
use crate::input::{
    CreateItemRequest, PostUpdateRequest, SetColumnValueRequest, UpdateItemRequest,
};

impl<S: Store + Clone> Api<S> {
    pub async fn create_item(
        &self,
        identity: Option<&Identity>,
        request: CreateItemRequest,
    ) -> QuadroResult<Item> {
        request.validate()?;
        let identity = self.identity_required(identity)?;
        authorize(
            self.store(),
            Some(identity),
            ResourceRef::Board(request.board_id),
            AccessLevel::Write,
        )
        .await?;

        let item = self
            .store()
            .create_item(CreateItem {
                board_id: request.board_id,
                group_id: request.group_id,
                name: request.name,
                position: request.position,
                parent_item_id: request.parent_item_id,
                created_by: identity.id,
                column_values: request.column_values,
            })
            .await?;

        self.record_activity(CreateActivity {
            item_id: item.id,
            actor_id: identity.id,
            kind: ActivityKind::ItemCreated,
            data: json!({ "name": item.name }),
        })
        .await;
        self.events().publish(
            identity.id,
            ChangeEvent::ItemCreated {
                item_id: item.id,
                board_id: item.board_id,
            },
        );
        Ok(item)
    }

    pub async fn item(&self, identity: Option<&Identity>, item_id: Uuid) -> QuadroResult<Item> {
        authorize(
            self.store(),
            identity,
            ResourceRef::Item(item_id),
            AccessLevel::Read,
        )
        .await?;
        self.store().item_by_id(item_id).await
    }

    pub async fn items(
        &self,
        identity: Option<&Identity>,
        board_id: Uuid,
        group_id: Option<Uuid>,
        page: Pagination,
    ) -> QuadroResult<Page<Item>> {
        authorize(
            self.store(),
            identity,
            ResourceRef::Board(board_id),
            AccessLevel::Read,
        )
        .await?;
        self.store().items_page(board_id, group_id, page).await
    }

    pub async fn subitems(
        &self,
        identity: Option<&Identity>,
        item_id: Uuid,
    ) -> QuadroResult<Vec<Item>> {
        authorize(
            self.store(),
            identity,
            ResourceRef::Item(item_id),
            AccessLevel::Read,
        )
        .await?;
        self.store().subitems(item_id).await
    }

    pub async fn update_item(
        &self,
        identity: Option<&Identity>,
        request: UpdateItemRequest,
    ) -> QuadroResult<Item> {
        request.validate()?;
        let identity = self.identity_required(identity)?;
        authorize(
            self.store(),
            Some(identity),
            ResourceRef::Item(request.item_id),
            AccessLevel::Write,
        )
        .await?;

        let item = self
            .store()
            .update_item(
                request.item_id,
                UpdateItem {
                    name: request.name.clone(),
                    group_id: request.group_id,
                    position: request.position,
                },
            )
            .await?;

        self.record_activity(CreateActivity {
            item_id: item.id,
            actor_id: identity.id,
            kind: ActivityKind::ItemUpdated,
            data: json!({
                "name": request.name,
                "group_id": request.group_id,
                "position": request.position,
            }),
        })
        .await;
        self.events().publish(
            identity.id,
            ChangeEvent::ItemUpdated {
                item_id: item.id,
                board_id: item.board_id,
            },
        );
        Ok(item)
    }

    /// Delete an item, its cells, comments, audit trail, and subitems.
    ///
    /// The trail goes with the item, so no activity entry is appended;
    /// the deletion is still announced on the bus.
    pub async fn delete_item(
        &self,
        identity: Option<&Identity>,
        item_id: Uuid,
    ) -> QuadroResult<()> {
        let identity = self.identity_required(identity)?;
        authorize(
            self.store(),
            Some(identity),
            ResourceRef::Item(item_id),
            AccessLevel::Write,
        )
        .await?;

        let item = self.store().item_by_id(item_id).await?;
        self.store().delete_item(item_id).await?;

        self.events().publish(
            identity.id,
            ChangeEvent::ItemDeleted {
                item_id,
                board_id: item.board_id,
            },
        );
        Ok(())
    }

    /// Set one cell; last write wins per (item, column).
    pub async fn set_column_value(
        &self,
        identity: Option<&Identity>,
        request: SetColumnValueRequest,
    ) -> QuadroResult<ColumnValue> {
        let identity = self.identity_required(identity)?;
        authorize(
            self.store(),
            Some(identity),
            ResourceRef::Item(request.item_id),
            AccessLevel::Write,
        )
        .await?;

        let item = self.store().item_by_id(request.item_id).await?;
        let value = self
            .store()
            .upsert_column_value(
                request.item_id,
                request.column_id,
                request.value.clone(),
                identity.id,
            )
            .await?;

        self.record_activity(CreateActivity {
            item_id: request.item_id,
            actor_id: identity.id,
            kind: ActivityKind::ColumnValueUpdated,
            data: json!({
                "column_id": request.column_id,
                "value": request.value,
            }),
        })
        .await;
        self.events().publish(
            identity.id,
            ChangeEvent::ColumnValueUpdated {
                item_id: request.item_id,
                board_id: item.board_id,
                column_id: request.column_id,
            },
        );
        Ok(value)
    }

    pub async fn column_values(
        &self,
        identity: Option<&Identity>,
        item_id: Uuid,
    ) -> QuadroResult<Vec<ColumnValue>> {
        authorize(
            self.store(),
            identity,
            ResourceRef::Item(item_id),
            AccessLevel::Read,
        )
        .await?;
        self.store().column_values_by_item(item_id).await
    }

    /// Post a comment on an item, optionally mentioning other users.
    ///
    /// Allowed at read level: viewers and guests can discuss items
    /// they can see.
    pub async fn post_update(
        &self,
        identity: Option<&Identity>,
        request: PostUpdateRequest,
    ) -> QuadroResult<Update> {
        request.validate()?;
        let identity = self.identity_required(identity)?;
        authorize(
            self.store(),
            Some(identity),
            ResourceRef::Item(request.item_id),
            AccessLevel::Read,
        )
        .await?;

        let item = self.store().item_by_id(request.item_id).await?;
        let update = self
            .store()
            .create_update(CreateUpdate {
                item_id: request.item_id,
                user_id: identity.id,
                body: request.body,
                mention_user_ids: request.mention_user_ids.clone(),
            })
            .await?;

        self.notify_mentions(identity, &item, update.id, &request.mention_user_ids)
            .await;
        self.record_activity(CreateActivity {
            item_id: request.item_id,
            actor_id: identity.id,
            kind: ActivityKind::UpdatePosted,
            data: json!({ "update_id": update.id }),
        })
        .await;
        self.events().publish(
            identity.id,
            ChangeEvent::UpdateCreated {
                update_id: update.id,
                item_id: request.item_id,
                board_id: item.board_id,
            },
        );
        Ok(update)
    }

    /// Fan out MENTION notifications for a posted comment.
    /// Best-effort like the audit trail: a failed notification never
    /// fails the comment it came from.
    async fn notify_mentions(
        &self,
        actor: &Identity,
        item: &Item,
        update_id: Uuid,
        mentioned: &[Uuid],
    ) {
        for user_id in mentioned {
            let result = self
                .store()
                .create_notification(CreateNotification {
                    user_id: *user_id,
                    kind: NotificationKind::Mention,
                    title: format!("{} mentioned you", actor.email),
                    body: format!("You were mentioned in an update on \"{}\"", item.name),
                    data: json!({ "update_id": update_id, "item_id": item.id }),
                })
                .await;
            if let Err(e) = result {
                tracing::warn!(
                    error = %e,
                    mentioned_user = %user_id,
                    "failed to create mention notification"
                );
            }
        }
    }

    pub async fn updates(
        &self,
        identity: Option<&Identity>,
        item_id: Uuid,
    ) -> QuadroResult<Vec<Update>> {
        authorize(
            self.store(),
            identity,
            ResourceRef::Item(item_id),
            AccessLevel::Read,
        )
        .await?;
        self.store().updates_by_item(item_id).await
    }

    pub async fn activities(
        &self,
        identity: Option<&Identity>,
        item_id: Uuid,
    ) -> QuadroResult<Vec<Activity>> {
        authorize(
            self.store(),
            identity,
            ResourceRef::Item(item_id),
            AccessLevel::Read,
        )
        .await?;
        self.store().activities_by_item(item_id).await
    }
}
