mod helpers;

use std::sync::Arc;

use helpers::test_db::setup_test_db;
use storechat::database::Database;
use storechat::models::{RoomStatus, SendMessageRequest, SenderType};
use storechat::services::{ChatService, DbRoster, StaticRoster};

fn service_with_roster(db: Database, technician_ids: Vec<&str>) -> ChatService {
    let roster = Arc::new(StaticRoster::new(
        technician_ids.into_iter().map(String::from).collect(),
    ));
    ChatService::new(db, roster)
}

fn customer_message(content: &str) -> SendMessageRequest {
    SendMessageRequest {
        sender_id: "cust-1".to_string(),
        sender_type: SenderType::Customer,
        sender_name: "Alice".to_string(),
        content: content.to_string(),
        attachment_url: None,
    }
}

fn technician_message(content: &str) -> SendMessageRequest {
    SendMessageRequest {
        sender_id: "tech-x".to_string(),
        sender_type: SenderType::Technician,
        sender_name: "Xena".to_string(),
        content: content.to_string(),
        attachment_url: None,
    }
}

#[tokio::test]
async fn send_fans_out_to_every_technician() {
    let db = setup_test_db().await;
    let service = service_with_roster(db.clone(), vec!["tech-x", "tech-y"]);

    let room = service.get_or_create_room("cust-1", "Alice").await.unwrap();
    service
        .send_message(&room.id, customer_message("Need help"))
        .await
        .unwrap();

    assert_eq!(db.total_unread("tech-x").await.unwrap(), 1);
    assert_eq!(db.total_unread("tech-y").await.unwrap(), 1);

    // X reads; Y's count is untouched.
    service
        .mark_read(&room.id, SenderType::Technician, Some("tech-x"))
        .await
        .unwrap();

    assert_eq!(db.total_unread("tech-x").await.unwrap(), 0);
    assert_eq!(db.total_unread("tech-y").await.unwrap(), 1);
}

#[tokio::test]
async fn counter_conservation_under_repeated_sends() {
    let db = setup_test_db().await;
    let service = service_with_roster(db.clone(), vec!["tech-x"]);

    let room = service.get_or_create_room("cust-1", "Alice").await.unwrap();
    for i in 1..=4 {
        service
            .send_message(&room.id, customer_message(&format!("msg {}", i)))
            .await
            .unwrap();
    }

    assert_eq!(db.total_unread("tech-x").await.unwrap(), 4);
    assert_eq!(
        db.unread_count_for_technician(&room.id, "tech-x").await.unwrap(),
        4
    );

    service
        .mark_read(&room.id, SenderType::Technician, Some("tech-x"))
        .await
        .unwrap();
    assert_eq!(db.total_unread("tech-x").await.unwrap(), 0);
}

#[tokio::test]
async fn technician_sends_do_not_touch_the_ledger() {
    let db = setup_test_db().await;
    let service = service_with_roster(db.clone(), vec!["tech-x", "tech-y"]);

    let room = service.get_or_create_room("cust-1", "Alice").await.unwrap();
    service
        .send_message(&room.id, technician_message("Hello, how can I help?"))
        .await
        .unwrap();

    assert_eq!(db.total_unread("tech-x").await.unwrap(), 0);
    assert_eq!(db.total_unread("tech-y").await.unwrap(), 0);
}

#[tokio::test]
async fn empty_roster_fan_out_is_a_noop() {
    let db = setup_test_db().await;
    let service = ChatService::new(db.clone(), Arc::new(StaticRoster::empty()));

    let room = service.get_or_create_room("cust-1", "Alice").await.unwrap();
    let message = service
        .send_message(&room.id, customer_message("Anyone there?"))
        .await
        .unwrap();

    // The message itself still lands.
    let (messages, total) = service.list_messages(&room.id, 1, 10).await.unwrap();
    assert_eq!(total, 1);
    assert_eq!(messages[0].id, message.id);
}

#[tokio::test]
async fn send_updates_room_summary() {
    let db = setup_test_db().await;
    let service = service_with_roster(db.clone(), vec![]);

    let room = service.get_or_create_room("cust-1", "Alice").await.unwrap();
    let message = service
        .send_message(&room.id, customer_message("Need help with my camera kit"))
        .await
        .unwrap();

    let room = db.get_room_by_id(&room.id).await.unwrap().unwrap();
    assert_eq!(room.last_message, "Need help with my camera kit");
    assert_eq!(room.last_message_at.as_deref(), Some(message.created_at.as_str()));
}

#[tokio::test]
async fn send_rejects_bad_input() {
    let db = setup_test_db().await;
    let service = service_with_roster(db.clone(), vec![]);
    let room = service.get_or_create_room("cust-1", "Alice").await.unwrap();

    let empty = service.send_message(&room.id, customer_message("   ")).await;
    assert!(empty.is_err());

    let mut no_sender = customer_message("hi");
    no_sender.sender_id = String::new();
    assert!(service.send_message(&room.id, no_sender).await.is_err());

    let unknown_room = service.send_message("no-such-room", customer_message("hi")).await;
    assert!(unknown_room.is_err());
}

#[tokio::test]
async fn customer_unread_flag_scenario() {
    let db = setup_test_db().await;
    let service = service_with_roster(db.clone(), vec![]);
    let room = service.get_or_create_room("cust-1", "Alice").await.unwrap();

    for i in 1..=3 {
        service
            .send_message(&room.id, technician_message(&format!("reply {}", i)))
            .await
            .unwrap();
    }
    assert_eq!(db.unread_count_for_customer(&room.id).await.unwrap(), 3);

    let updated = service
        .mark_read(&room.id, SenderType::Customer, None)
        .await
        .unwrap();
    assert_eq!(updated, 3);
    assert_eq!(db.unread_count_for_customer(&room.id).await.unwrap(), 0);
}

#[tokio::test]
async fn technician_mark_read_requires_an_id() {
    let db = setup_test_db().await;
    let service = service_with_roster(db.clone(), vec![]);
    let room = service.get_or_create_room("cust-1", "Alice").await.unwrap();

    let result = service.mark_read(&room.id, SenderType::Technician, None).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn close_and_reopen_round_trip() {
    let db = setup_test_db().await;
    let service = service_with_roster(db.clone(), vec![]);
    let room = service.get_or_create_room("cust-1", "Alice").await.unwrap();

    let closed = service.close_room(&room.id).await.unwrap();
    assert_eq!(closed.status, RoomStatus::Closed);

    let reopened = service.reopen_room(&room.id).await.unwrap();
    assert_eq!(reopened.status, RoomStatus::Active);

    assert!(service.close_room("no-such-room").await.is_err());
}

#[tokio::test]
async fn db_roster_picks_up_roster_changes() {
    let db = setup_test_db().await;
    let service = ChatService::new(db.clone(), Arc::new(DbRoster::new(db.clone())));

    db.create_technician("tech-x", "Xena").await.unwrap();
    db.create_technician("tech-y", "Yuri").await.unwrap();

    let room = service.get_or_create_room("cust-1", "Alice").await.unwrap();
    service
        .send_message(&room.id, customer_message("first"))
        .await
        .unwrap();

    assert_eq!(db.total_unread("tech-x").await.unwrap(), 1);
    assert_eq!(db.total_unread("tech-y").await.unwrap(), 1);

    // A removed technician stops receiving increments.
    db.delete_technician("tech-y").await.unwrap();
    service
        .send_message(&room.id, customer_message("second"))
        .await
        .unwrap();

    assert_eq!(db.total_unread("tech-x").await.unwrap(), 2);
    assert_eq!(db.total_unread("tech-y").await.unwrap(), 1);
}

#[tokio::test]
async fn reconcile_via_service_matches_log() {
    let db = setup_test_db().await;
    let service = service_with_roster(db.clone(), vec!["tech-x"]);
    let room = service.get_or_create_room("cust-1", "Alice").await.unwrap();

    service
        .send_message(&room.id, customer_message("one"))
        .await
        .unwrap();
    service
        .send_message(&room.id, customer_message("two"))
        .await
        .unwrap();

    // Simulate drift.
    sqlx::query("UPDATE chat_notifications SET unread_count = 9")
        .execute(db.pool())
        .await
        .unwrap();

    let repaired = service.reconcile_ledger("tech-x", &room.id).await.unwrap();
    assert_eq!(repaired, 2);
    assert_eq!(db.total_unread("tech-x").await.unwrap(), 2);
}

#[tokio::test]
async fn concurrent_sends_both_count() {
    let db = setup_test_db().await;
    let service = service_with_roster(db.clone(), vec!["tech-x"]);
    let room = service.get_or_create_room("cust-1", "Alice").await.unwrap();

    let (a, b) = tokio::join!(
        service.send_message(&room.id, customer_message("first")),
        service.send_message(&room.id, customer_message("second")),
    );
    a.unwrap();
    b.unwrap();

    assert_eq!(db.total_unread("tech-x").await.unwrap(), 2);
    assert_eq!(
        db.unread_count_for_technician(&room.id, "tech-x").await.unwrap(),
        2
    );
}
