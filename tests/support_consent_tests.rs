mod common;

use chrono::{Duration, Utc};
use common::*;
use sea_orm::{ActiveModelTrait, EntityTrait, PaginatorTrait, Set};
use wellness_backend::config::MediaConfig;
use wellness_backend::entities::{
    MaterialType, consent_entity, support_message_entity, support_session_entity, user_entity,
};
use wellness_backend::error::AppError;
use wellness_backend::models::*;
use wellness_backend::services::*;
use wellness_backend::utils::NumberOrString;

fn message(session_id: i32, sender: &str, text: &str) -> SendMessageRequest {
    SendMessageRequest {
        session_id: Some(session_id.into()),
        sender: Some(sender.to_string()),
        message_text: Some(text.to_string()),
    }
}

#[tokio::test]
async fn test_register_is_idempotent() {
    let db = setup_db().await;
    let service = UserService::new(db.clone());
    let req = || RegisterRequest {
        telegram_id: Some(100.into()),
        username: Some("alice".to_string()),
    };

    let first = service.register(req()).await.unwrap();
    assert!(first.created);
    assert!(!first.consent_given);
    assert_eq!(first.message, "User registered successfully");

    let second = service.register(req()).await.unwrap();
    assert!(!second.created);
    assert_eq!(second.message, "User already registered");
    assert_eq!(user_entity::Entity::find().count(&db).await.unwrap(), 1);

    let err = service
        .register(RegisterRequest { telegram_id: None, username: None })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));
}

#[tokio::test]
async fn test_consent_status_does_not_create_row() {
    let db = setup_db().await;
    create_user(&db, "100", "alice").await;
    let service = ConsentService::new(db.clone());

    let status = service.status("100").await.unwrap();
    assert!(!status.consent_given);
    assert!(status.consent_date.is_none());
    assert_eq!(consent_entity::Entity::find().count(&db).await.unwrap(), 0);

    let err = service.status("404").await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_consent_get_or_create_then_set() {
    let db = setup_db().await;
    create_user(&db, "100", "alice").await;
    let service = ConsentService::new(db.clone());

    let created = service.get_or_create("100").await.unwrap();
    assert!(!created.consent_given);
    let again = service.get_or_create("100").await.unwrap();
    assert_eq!(again.id, created.id);

    let given = service.set("100", true).await.unwrap();
    assert_eq!(given.id, created.id);
    assert!(given.consent_given);
    assert!(given.consent_date.is_some());

    let registered = UserService::new(db.clone())
        .register(RegisterRequest {
            telegram_id: Some("100".into()),
            username: None,
        })
        .await
        .unwrap();
    assert!(registered.consent_given);

    let revoked = service.set("100", false).await.unwrap();
    assert!(!revoked.consent_given);
    assert!(revoked.consent_date.is_none());
    assert_eq!(consent_entity::Entity::find().count(&db).await.unwrap(), 1);
}

#[tokio::test]
async fn test_set_consent_without_prior_row() {
    let db = setup_db().await;
    create_user(&db, "100", "alice").await;
    let resp = ConsentService::new(db.clone()).set("100", true).await.unwrap();
    assert!(resp.consent_given);
    assert_eq!(consent_entity::Entity::find().count(&db).await.unwrap(), 1);
}

#[tokio::test]
async fn test_start_session_is_stable() {
    let db = setup_db().await;
    let service = SupportService::new(db.clone());

    // unknown telegram id is registered on the way
    let first = service.start_session("555").await.unwrap();
    let second = service.start_session("555").await.unwrap();
    assert_eq!(first.session_id, second.session_id);
    assert_eq!(second.message, "Support session started");
    assert_eq!(user_entity::Entity::find().count(&db).await.unwrap(), 1);

    let stored = support_session_entity::Entity::find_by_id(first.session_id)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert!(stored.is_active);
    assert!(stored.ended_at.is_none());
    assert_eq!(support_session_entity::Entity::find().count(&db).await.unwrap(), 1);

    let other = service.start_session("556").await.unwrap();
    assert_ne!(other.session_id, first.session_id);
}

#[tokio::test]
async fn test_messages_are_listed_in_send_order() {
    let db = setup_db().await;
    let service = SupportService::new(db.clone());
    let session = service.start_session("100").await.unwrap().session_id;

    for text in ["first", "second", "third"] {
        service.post_message(message(session, "alice", text)).await.unwrap();
    }

    let listed = service.list_messages(session).await.unwrap().messages;
    let texts: Vec<_> = listed.iter().map(|m| m.message_text.as_str()).collect();
    assert_eq!(texts, ["first", "second", "third"]);
    assert!(listed.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
}

#[tokio::test]
async fn test_messages_with_same_timestamp_keep_insertion_order() {
    let db = setup_db().await;
    let service = SupportService::new(db.clone());
    let session = service.start_session("100").await.unwrap().session_id;

    let at = Utc::now();
    let rows = [
        ("tie-1", at),
        ("tie-2", at),
        ("tie-3", at),
        ("earlier", at - Duration::seconds(5)),
    ];
    for (text, timestamp) in rows {
        support_message_entity::ActiveModel {
            session_id: Set(session),
            sender: Set("alice".to_string()),
            message_text: Set(text.to_string()),
            timestamp: Set(timestamp),
            ..Default::default()
        }
        .insert(&db)
        .await
        .unwrap();
    }

    let listed = service.list_messages(session).await.unwrap().messages;
    let texts: Vec<_> = listed.iter().map(|m| m.message_text.as_str()).collect();
    assert_eq!(texts, ["earlier", "tie-1", "tie-2", "tie-3"]);
    assert!(listed[1..].windows(2).all(|w| w[0].id < w[1].id));
}

#[tokio::test]
async fn test_post_message_validation() {
    let db = setup_db().await;
    let service = SupportService::new(db.clone());
    let session = service.start_session("100").await.unwrap().session_id;

    let err = service.post_message(message(session + 1, "alice", "hi")).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let err = service.post_message(message(session, "", "hi")).await.unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));

    let err = service.post_message(message(session, "alice", "   ")).await.unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));

    let mut missing = message(session, "alice", "hi");
    missing.session_id = None;
    let err = service.post_message(missing).await.unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));

    let long_sender = "s".repeat(300);
    let stored = service.post_message(message(session, &long_sender, "hi")).await.unwrap();
    assert_eq!(stored.sender.chars().count(), MAX_SENDER_LEN);

    let err = service.list_messages(session + 1).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_materials_build_document_urls() {
    let db = setup_db().await;
    create_material(&db, "Guide", MaterialType::Methodichka, "materials/guide.pdf").await;
    create_material(
        &db,
        "Workbook",
        MaterialType::Workbook,
        "https://files.example.com/wb.pdf",
    )
    .await;
    let service = ContentService::new(
        db.clone(),
        &MediaConfig {
            base_url: "https://cdn.example.com/media/".to_string(),
        },
    );

    let guide = service.material_by_type("methodichka").await.unwrap();
    assert_eq!(guide.document_url, "https://cdn.example.com/media/materials/guide.pdf");
    let workbook = service.material_by_type("workbook").await.unwrap();
    assert_eq!(workbook.document_url, "https://files.example.com/wb.pdf");

    assert_eq!(service.materials(None).await.unwrap().len(), 2);
    assert_eq!(service.materials(Some("workbook")).await.unwrap().len(), 1);
    assert!(matches!(
        service.materials(Some("poster")).await.unwrap_err(),
        AppError::ValidationError(_)
    ));
    assert!(matches!(
        service.material_by_type("poster").await.unwrap_err(),
        AppError::NotFound(_)
    ));
}

#[tokio::test]
async fn test_reference_content() {
    let db = setup_db().await;
    create_advice(&db, "Sleep", "Go to bed on time").await;
    let method = create_method(&db, "CBT").await;
    let service = ContentService::new(db.clone(), &MediaConfig::default());

    let advice = service.advice().await.unwrap().advice;
    assert_eq!(advice.len(), 1);
    assert_eq!(advice[0].title, "Sleep");

    assert_eq!(service.methods().await.unwrap().len(), 1);
    assert_eq!(service.method(method.id).await.unwrap().name, "CBT");
    assert!(matches!(
        service.method(method.id + 1).await.unwrap_err(),
        AppError::NotFound(_)
    ));
}

#[tokio::test]
async fn test_client_card_lifecycle() {
    let db = setup_db().await;
    create_user(&db, "100", "alice").await;
    let service = ClientService::new(db.clone());

    assert!(matches!(
        service.latest_card("100").await.unwrap_err(),
        AppError::NotFound(_)
    ));

    let card = |age: NumberOrString| ClientCardRequest {
        name: Some("Alice".to_string()),
        age: Some(age),
        goals: Some("Sleep better".to_string()),
        challenges: Some("Stress".to_string()),
    };

    let err = service.create_card("100", card(151.into())).await.unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));
    let err = service.create_card("100", card("old".into())).await.unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));

    let created = service.create_card("100", card("30".into())).await.unwrap();
    assert_eq!(created.age, 30);
    assert_eq!(service.latest_card("100").await.unwrap().id, created.id);
}

#[tokio::test]
async fn test_chat_session_and_feedback() {
    let db = setup_db().await;
    create_user(&db, "100", "alice").await;
    let service = ClientService::new(db.clone());

    let saved = service
        .save_chat_session(
            "100",
            ChatSessionRequest {
                chat_history: Some(serde_json::json!([{"role": "user", "text": "hi"}])),
            },
        )
        .await
        .unwrap();
    assert_eq!(saved.status, "success");

    let err = service
        .save_chat_session("100", ChatSessionRequest { chat_history: None })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));

    let feedback = service
        .submit_feedback(FeedbackRequest { content: Some("Great".to_string()) })
        .await
        .unwrap();
    assert_eq!(feedback.content, "Great");
    let err = service
        .submit_feedback(FeedbackRequest { content: Some(" ".to_string()) })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));
}

#[tokio::test]
async fn test_add_card_stores_masked_number() {
    let db = setup_db().await;
    create_user(&db, "100", "alice").await;
    let service = UserService::new(db.clone());
    let req = |number: &str, expiry: &str| AddCardRequest {
        card_number: Some(number.to_string()),
        card_expiry: Some(expiry.to_string()),
        cardholder_name: Some("ALICE SMITH".to_string()),
    };

    let card = service.add_card("100", req("4111111111111111", "12/29")).await.unwrap();
    assert!(card.masked_number.ends_with("1111"));
    assert!(!card.masked_number.contains("411111"));

    let err = service.add_card("100", req("4111", "12/29")).await.unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));
    let err = service.add_card("100", req("4111111111111111", "13/29")).await.unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));
}
