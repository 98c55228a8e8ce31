//! Chat flow: mentions, reactions, and read state.

mod common;

use chrono::{Duration, Utc};
use uuid::Uuid;

use warehouse_api::errors::ServiceError;
use warehouse_api::services::chat::{ChatService, SendMessageRequest, ToggleReactionRequest};

use common::{seed_order, seed_user, test_db, test_events, test_feed};

async fn setup() -> (std::sync::Arc<warehouse_api::db::DbPool>, ChatService) {
    let db = test_db().await;
    let chat = ChatService::new(db.clone(), test_events(), test_feed());
    (db, chat)
}

#[tokio::test]
async fn message_mentions_are_resolved_at_send_time() {
    let (db, chat) = setup().await;
    let ana = seed_user(&db, "Ana").await;
    let john = seed_user(&db, "John Doe").await;
    let order = seed_order(&db, "ORD123").await;

    let message = chat
        .send_message(SendMessageRequest {
            sender_id: ana,
            body: "@John Doe please pick #ORD123 before noon".into(),
        })
        .await
        .expect("send should succeed");

    let mentioned: Vec<Uuid> = serde_json::from_value(message.mentioned_user_ids).unwrap();
    assert_eq!(mentioned, vec![john]);
    let orders: Vec<Uuid> = serde_json::from_value(message.mentioned_order_ids).unwrap();
    assert_eq!(orders, vec![order]);
}

#[tokio::test]
async fn unknown_sender_is_rejected() {
    let (_db, chat) = setup().await;
    let err = chat
        .send_message(SendMessageRequest {
            sender_id: Uuid::new_v4(),
            body: "hello".into(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[tokio::test]
async fn reaction_toggles_on_and_off() {
    let (db, chat) = setup().await;
    let ana = seed_user(&db, "Ana").await;
    let bo = seed_user(&db, "Bo").await;

    let message = chat
        .send_message(SendMessageRequest {
            sender_id: ana,
            body: "shipment done".into(),
        })
        .await
        .unwrap();

    let first = chat
        .toggle_reaction(
            message.id,
            ToggleReactionRequest {
                user_id: bo,
                emoji: "👍".into(),
            },
        )
        .await
        .unwrap();
    assert!(first.added);

    let (views, _) = chat.list_messages(bo, None, 1, 20).await.unwrap();
    assert_eq!(views[0].reactions.len(), 1);
    assert_eq!(views[0].reactions[0].count, 1);
    assert!(views[0].reactions[0].reacted);
    assert_eq!(views[0].sender_name, "Ana");

    let second = chat
        .toggle_reaction(
            message.id,
            ToggleReactionRequest {
                user_id: bo,
                emoji: "👍".into(),
            },
        )
        .await
        .unwrap();
    assert!(!second.added);

    let (views, _) = chat.list_messages(bo, None, 1, 20).await.unwrap();
    assert!(views[0].reactions.is_empty());
}

#[tokio::test]
async fn unread_count_follows_the_read_cursor() {
    let (db, chat) = setup().await;
    let ana = seed_user(&db, "Ana").await;
    let bo = seed_user(&db, "Bo").await;

    for body in ["one", "two", "three"] {
        chat.send_message(SendMessageRequest {
            sender_id: ana,
            body: body.into(),
        })
        .await
        .unwrap();
    }

    // Bo has no cursor yet: everything from Ana is unread, own messages
    // never count.
    assert_eq!(chat.unread_count(bo).await.unwrap(), 3);
    assert_eq!(chat.unread_count(ana).await.unwrap(), 0);

    let cursor = Utc::now();
    chat.mark_read(bo, cursor).await.unwrap();
    assert_eq!(chat.unread_count(bo).await.unwrap(), 0);

    chat.send_message(SendMessageRequest {
        sender_id: ana,
        body: "four".into(),
    })
    .await
    .unwrap();
    assert_eq!(chat.unread_count(bo).await.unwrap(), 1);

    // The since cursor returns only the newer message.
    let (views, total) = chat.list_messages(bo, Some(cursor), 1, 20).await.unwrap();
    assert_eq!(total, 1);
    assert_eq!(views[0].body, "four");
}

#[tokio::test]
async fn read_cursor_never_moves_backwards() {
    let (db, chat) = setup().await;
    let bo = seed_user(&db, "Bo").await;

    let now = Utc::now();
    let first = chat.mark_read(bo, now).await.unwrap();
    assert!((first.last_read_at - now).num_seconds().abs() < 1);

    let earlier = now - Duration::minutes(5);
    let second = chat.mark_read(bo, earlier).await.unwrap();
    assert_eq!(second.last_read_at, first.last_read_at);
}

#[tokio::test]
async fn back_to_back_changes_each_reach_the_feed() {
    let db = test_db().await;
    let feed = test_feed();
    let chat = ChatService::new(db.clone(), test_events(), feed.clone());
    let mut rx = feed.subscribe();

    let ana = seed_user(&db, "Ana").await;
    let bo = seed_user(&db, "Bo").await;
    let message = chat
        .send_message(SendMessageRequest {
            sender_id: ana,
            body: "ship it".into(),
        })
        .await
        .unwrap();
    assert_eq!(rx.recv().await.unwrap().record_id, message.id);

    // Two immediate toggles on the same message are distinct changes and
    // must both be delivered.
    for _ in 0..2 {
        chat.toggle_reaction(
            message.id,
            ToggleReactionRequest {
                user_id: bo,
                emoji: "thumbsup".into(),
            },
        )
        .await
        .unwrap();
    }
    let first = rx.recv().await.unwrap();
    let second = rx.recv().await.unwrap();
    assert_eq!(first.record_id, message.id);
    assert_eq!(second.record_id, message.id);
    assert!(second.revision > first.revision);
}
