//! Team chat: messages, mentions, reactions, and read state.

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::chat::mentions::{extract_mentions, OrderRef, ProfileRef};
use crate::db::DbPool;
use crate::entities::{chat_message, chat_read_state, customer_order, message_reaction, user_profile};
use crate::errors::ServiceError;
use crate::events::feed::{ChangeFeed, FeedEntry, FeedKind};
use crate::events::{Event, EventSender};

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateProfileRequest {
    #[validate(length(min = 1, max = 100))]
    pub display_name: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateOrderRefRequest {
    #[validate(length(min = 1, max = 50))]
    pub order_number: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct SendMessageRequest {
    pub sender_id: Uuid,
    #[validate(length(min = 1, max = 4000))]
    pub body: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ToggleReactionRequest {
    pub user_id: Uuid,
    #[validate(length(min = 1, max = 20))]
    pub emoji: String,
}

/// A message together with its reaction tallies, shaped for the client.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MessageView {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub sender_name: String,
    pub body: String,
    pub mentioned_user_ids: Vec<Uuid>,
    pub mentioned_order_ids: Vec<Uuid>,
    pub reactions: Vec<ReactionCount>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ReactionCount {
    pub emoji: String,
    pub count: u64,
    /// Whether the requesting user is among the reactors.
    pub reacted: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ToggleReactionResult {
    pub message_id: Uuid,
    pub emoji: String,
    pub added: bool,
}

#[derive(Clone)]
pub struct ChatService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
    feed: Arc<ChangeFeed>,
}

impl ChatService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>, feed: Arc<ChangeFeed>) -> Self {
        Self {
            db_pool,
            event_sender,
            feed,
        }
    }

    pub async fn create_profile(
        &self,
        request: CreateProfileRequest,
    ) -> Result<user_profile::Model, ServiceError> {
        request.validate()?;
        let db = self.db_pool.as_ref();
        let model = user_profile::ActiveModel {
            id: Set(Uuid::new_v4()),
            display_name: Set(request.display_name),
            created_at: Set(Utc::now()),
        };
        Ok(model.insert(db).await?)
    }

    pub async fn list_profiles(&self) -> Result<Vec<user_profile::Model>, ServiceError> {
        let db = self.db_pool.as_ref();
        Ok(user_profile::Entity::find()
            .order_by_asc(user_profile::Column::DisplayName)
            .all(db)
            .await?)
    }

    /// Registers an order reference so `#ORDER` mentions can resolve to it.
    pub async fn create_order_ref(
        &self,
        request: CreateOrderRefRequest,
    ) -> Result<customer_order::Model, ServiceError> {
        request.validate()?;
        let db = self.db_pool.as_ref();

        let existing = customer_order::Entity::find()
            .filter(customer_order::Column::OrderNumber.eq(request.order_number.clone()))
            .one(db)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::Conflict(format!(
                "order number {} already exists",
                request.order_number
            )));
        }

        let model = customer_order::ActiveModel {
            id: Set(Uuid::new_v4()),
            order_number: Set(request.order_number),
            created_at: Set(Utc::now()),
        };
        Ok(model.insert(db).await?)
    }

    /// Stores a message with its `@user` and `#order` mentions resolved
    /// against the current profile and order lists.
    #[instrument(skip(self, request), fields(sender_id = %request.sender_id))]
    pub async fn send_message(
        &self,
        request: SendMessageRequest,
    ) -> Result<chat_message::Model, ServiceError> {
        request.validate()?;
        let db = self.db_pool.as_ref();

        user_profile::Entity::find_by_id(request.sender_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("user {} not found", request.sender_id))
            })?;

        let profiles: Vec<ProfileRef> = user_profile::Entity::find()
            .all(db)
            .await?
            .into_iter()
            .map(|p| ProfileRef {
                id: p.id,
                display_name: p.display_name,
            })
            .collect();
        let orders: Vec<OrderRef> = customer_order::Entity::find()
            .all(db)
            .await?
            .into_iter()
            .map(|o| OrderRef {
                id: o.id,
                order_number: o.order_number,
            })
            .collect();

        let mentions = extract_mentions(&request.body, &profiles, &orders);

        let model = chat_message::ActiveModel {
            id: Set(Uuid::new_v4()),
            sender_id: Set(request.sender_id),
            body: Set(request.body),
            mentioned_user_ids: Set(serde_json::json!(mentions.user_ids)),
            mentioned_order_ids: Set(serde_json::json!(mentions.order_ids)),
            created_at: Set(Utc::now()),
        };
        let message = model.insert(db).await?;

        info!(message_id = %message.id, mentions = mentions.user_ids.len(), "message sent");
        self.event_sender
            .send(Event::MessageSent {
                message_id: message.id,
                sender_id: message.sender_id,
                mentioned_user_ids: mentions.user_ids,
            })
            .await?;
        self.publish_change(message.id);

        Ok(message)
    }

    /// Lists messages oldest first, with reaction tallies computed for
    /// `for_user`. With `since`, only messages newer than the cursor are
    /// returned, so clients re-fetch incrementally instead of polling the
    /// whole history.
    pub async fn list_messages(
        &self,
        for_user: Uuid,
        since: Option<DateTime<Utc>>,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<MessageView>, u64), ServiceError> {
        let db = self.db_pool.as_ref();
        let mut query = chat_message::Entity::find();
        if let Some(cursor) = since {
            query = query.filter(chat_message::Column::CreatedAt.gt(cursor));
        }
        let paginator = query
            .order_by_asc(chat_message::Column::CreatedAt)
            .paginate(db, per_page);
        let total = paginator.num_items().await?;
        let messages = paginator.fetch_page(page.saturating_sub(1)).await?;

        let message_ids: Vec<Uuid> = messages.iter().map(|m| m.id).collect();
        let reactions = if message_ids.is_empty() {
            Vec::new()
        } else {
            message_reaction::Entity::find()
                .filter(message_reaction::Column::MessageId.is_in(message_ids))
                .all(db)
                .await?
        };

        let sender_ids: Vec<Uuid> = messages.iter().map(|m| m.sender_id).collect();
        let senders: HashMap<Uuid, String> = if sender_ids.is_empty() {
            HashMap::new()
        } else {
            user_profile::Entity::find()
                .filter(user_profile::Column::Id.is_in(sender_ids))
                .all(db)
                .await?
                .into_iter()
                .map(|p| (p.id, p.display_name))
                .collect()
        };

        let views = messages
            .into_iter()
            .map(|message| {
                let sender_name = senders
                    .get(&message.sender_id)
                    .cloned()
                    .unwrap_or_else(|| "unknown".to_string());
                let tallies = tally_reactions(&reactions, message.id, for_user);
                MessageView {
                    id: message.id,
                    sender_id: message.sender_id,
                    sender_name,
                    mentioned_user_ids: id_list(&message.mentioned_user_ids),
                    mentioned_order_ids: id_list(&message.mentioned_order_ids),
                    body: message.body,
                    reactions: tallies,
                    created_at: message.created_at,
                }
            })
            .collect();

        Ok((views, total))
    }

    /// Adds the reaction if the user has not reacted with this emoji yet,
    /// removes it otherwise.
    #[instrument(skip(self, request), fields(user_id = %request.user_id))]
    pub async fn toggle_reaction(
        &self,
        message_id: Uuid,
        request: ToggleReactionRequest,
    ) -> Result<ToggleReactionResult, ServiceError> {
        request.validate()?;
        let db = self.db_pool.as_ref();

        chat_message::Entity::find_by_id(message_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("message {} not found", message_id)))?;

        let existing = message_reaction::Entity::find()
            .filter(message_reaction::Column::MessageId.eq(message_id))
            .filter(message_reaction::Column::UserId.eq(request.user_id))
            .filter(message_reaction::Column::Emoji.eq(request.emoji.clone()))
            .one(db)
            .await?;

        let added = match existing {
            Some(reaction) => {
                reaction.delete(db).await?;
                false
            }
            None => {
                let model = message_reaction::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    message_id: Set(message_id),
                    user_id: Set(request.user_id),
                    emoji: Set(request.emoji.clone()),
                    created_at: Set(Utc::now()),
                };
                model.insert(db).await?;
                true
            }
        };

        self.event_sender
            .send(Event::ReactionToggled {
                message_id,
                user_id: request.user_id,
                emoji: request.emoji.clone(),
                added,
            })
            .await?;
        self.publish_change(message_id);

        Ok(ToggleReactionResult {
            message_id,
            emoji: request.emoji,
            added,
        })
    }

    /// Moves the user's read cursor forward. Never moves it backwards.
    pub async fn mark_read(
        &self,
        user_id: Uuid,
        read_at: DateTime<Utc>,
    ) -> Result<chat_read_state::Model, ServiceError> {
        let db = self.db_pool.as_ref();
        let now = Utc::now();

        let state = match chat_read_state::Entity::find_by_id(user_id).one(db).await? {
            Some(existing) if existing.last_read_at >= read_at => existing,
            Some(existing) => {
                let mut active: chat_read_state::ActiveModel = existing.into();
                active.last_read_at = Set(read_at);
                active.updated_at = Set(now);
                active.update(db).await?
            }
            None => {
                let model = chat_read_state::ActiveModel {
                    user_id: Set(user_id),
                    last_read_at: Set(read_at),
                    updated_at: Set(now),
                };
                model.insert(db).await?
            }
        };

        self.event_sender
            .send(Event::ReadStateUpdated {
                user_id,
                last_read_at: state.last_read_at,
            })
            .await?;

        Ok(state)
    }

    /// Number of messages from other users newer than the user's read
    /// cursor. A user with no cursor has everything unread.
    pub async fn unread_count(&self, user_id: Uuid) -> Result<u64, ServiceError> {
        let db = self.db_pool.as_ref();
        let mut query = chat_message::Entity::find()
            .filter(chat_message::Column::SenderId.ne(user_id));
        if let Some(state) = chat_read_state::Entity::find_by_id(user_id).one(db).await? {
            query = query.filter(chat_message::Column::CreatedAt.gt(state.last_read_at));
        }
        Ok(query.count(db).await?)
    }

    fn publish_change(&self, record_id: Uuid) {
        self.feed.publish(FeedEntry {
            record_id,
            revision: self.feed.next_revision(),
            kind: FeedKind::ChatMessage,
            occurred_at: Utc::now(),
        });
    }
}

fn tally_reactions(
    reactions: &[message_reaction::Model],
    message_id: Uuid,
    for_user: Uuid,
) -> Vec<ReactionCount> {
    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, (u64, bool)> = HashMap::new();
    for reaction in reactions.iter().filter(|r| r.message_id == message_id) {
        let entry = counts.entry(reaction.emoji.clone()).or_insert_with(|| {
            order.push(reaction.emoji.clone());
            (0, false)
        });
        entry.0 += 1;
        if reaction.user_id == for_user {
            entry.1 = true;
        }
    }
    order
        .into_iter()
        .map(|emoji| {
            let (count, reacted) = counts[&emoji];
            ReactionCount {
                emoji,
                count,
                reacted,
            }
        })
        .collect()
}

/// Mention ids are stored as JSON arrays; unknown shapes decode as empty.
fn id_list(value: &serde_json::Value) -> Vec<Uuid> {
    serde_json::from_value(value.clone()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tally_counts_and_flags_own_reaction() {
        let message = Uuid::new_v4();
        let me = Uuid::new_v4();
        let other = Uuid::new_v4();
        let reaction = |user: Uuid, emoji: &str| message_reaction::Model {
            id: Uuid::new_v4(),
            message_id: message,
            user_id: user,
            emoji: emoji.to_string(),
            created_at: Utc::now(),
        };

        let tallies = tally_reactions(
            &[
                reaction(me, "👍"),
                reaction(other, "👍"),
                reaction(other, "🎉"),
            ],
            message,
            me,
        );

        assert_eq!(tallies.len(), 2);
        assert_eq!(tallies[0].emoji, "👍");
        assert_eq!(tallies[0].count, 2);
        assert!(tallies[0].reacted);
        assert_eq!(tallies[1].count, 1);
        assert!(!tallies[1].reacted);
    }

    #[test]
    fn id_list_tolerates_malformed_json() {
        assert!(id_list(&serde_json::json!("not an array")).is_empty());
        let id = Uuid::new_v4();
        assert_eq!(id_list(&serde_json::json!([id])), vec![id]);
    }
}
