mod common;

use chrono::{Duration, Utc};
use common::*;
use sea_orm::{EntityTrait, PaginatorTrait};
use wellness_backend::entities::{
    PaymentStatus, gifted_subscription_entity, payment_entity, subscription_plan_entity,
    user_entity, user_subscription_entity,
};
use wellness_backend::error::AppError;
use wellness_backend::models::*;
use wellness_backend::services::*;

fn payment_request(method: i32, transaction_id: &str) -> MakePaymentRequest {
    MakePaymentRequest {
        payment_method: Some(method.into()),
        transaction_id: Some(transaction_id.to_string()),
        amount: None,
        subscription_plan: None,
    }
}

fn gift_request(
    recipient: &str,
    plan_id: i32,
    transaction_id: serde_json::Value,
) -> GiftSubscriptionRequest {
    GiftSubscriptionRequest {
        recipient_username: Some(recipient.to_string()),
        plan_id: Some(plan_id.into()),
        transaction_id: Some(transaction_id),
        payment_method: None,
    }
}

async fn balance_of(db: &sea_orm::DatabaseConnection, user_id: i32) -> rust_decimal::Decimal {
    user_entity::Entity::find_by_id(user_id)
        .one(db)
        .await
        .unwrap()
        .unwrap()
        .balance
}

#[tokio::test]
async fn test_subscribe_sets_end_from_plan_duration() {
    let db = setup_db().await;
    create_user(&db, "100", "alice").await;
    let plan = create_plan(&db, "Monthly", dec("19.99"), 30).await;
    let service = SubscriptionService::new(db.clone());

    let sub = service
        .subscribe("100", SubscribeRequest { plan_id: Some(plan.id.into()) })
        .await
        .unwrap();

    assert_eq!(sub.end_date - sub.start_date, Duration::days(30));
    assert_eq!(sub.plan.id, plan.id);
    assert!(!sub.is_expiring_soon);

    let status = service.status("100").await.unwrap();
    assert!(status.subscribed);
    assert_eq!(status.subscription.unwrap().id, sub.id);
}

#[tokio::test]
async fn test_status_without_subscription() {
    let db = setup_db().await;
    create_user(&db, "100", "alice").await;
    let status = SubscriptionService::new(db.clone()).status("100").await.unwrap();
    assert!(!status.subscribed);
    assert!(status.subscription.is_none());
}

#[tokio::test]
async fn test_current_subscription_prefers_latest_end() {
    let db = setup_db().await;
    let user = create_user(&db, "100", "alice").await;
    let short = create_plan(&db, "Week", dec("5.00"), 7).await;
    let long = create_plan(&db, "Year", dec("99.00"), 365).await;
    let now = Utc::now();
    create_subscription(&db, user.id, &long, now, None).await.unwrap();
    create_subscription(&db, user.id, &short, now, None).await.unwrap();
    // expired
    create_subscription(
        &db,
        user.id,
        &long,
        now - Duration::days(400),
        Some(now - Duration::days(35)),
    )
    .await
    .unwrap();

    let service = SubscriptionService::new(db.clone());
    let current = service.current_subscription(user.id).await.unwrap().unwrap();
    assert_eq!(current.plan.id, long.id);
    assert_eq!(current.end_date - current.start_date, Duration::days(365));

    let latest = service.latest_subscription(user.id).await.unwrap().unwrap();
    assert_eq!(latest.id, current.id);
}

#[tokio::test]
async fn test_top_up_credits_balance() {
    let db = setup_db().await;
    let user = create_user(&db, "100", "alice").await;
    let method = create_payment_method(&db, "Card").await;
    let service = PaymentService::new(db.clone());

    let mut req = payment_request(method.id, "tx-topup-1");
    req.amount = Some("50.00".into());
    let payment = service.submit("100", req).await.unwrap();

    assert_eq!(payment.status, PaymentStatus::Pending);
    assert_eq!(payment.amount, dec("50.00"));
    assert!(payment.subscription_plan.is_none());
    assert_eq!(balance_of(&db, user.id).await, dec("50.00"));

    let mut again = payment_request(method.id, "tx-topup-2");
    again.amount = Some("12.5".into());
    service.submit("100", again).await.unwrap();
    assert_eq!(balance_of(&db, user.id).await, dec("62.50"));
}

#[tokio::test]
async fn test_plan_payment_charges_plan_price() {
    let db = setup_db().await;
    let user = create_user(&db, "100", "alice").await;
    let method = create_payment_method(&db, "Card").await;
    let plan = create_plan(&db, "Monthly", dec("19.99"), 30).await;

    let mut req = payment_request(method.id, "tx-plan-1");
    req.subscription_plan = Some(plan.id.into());
    req.amount = Some("1.00".into());
    let payment = PaymentService::new(db.clone()).submit("100", req).await.unwrap();

    assert_eq!(payment.amount, dec("19.99"));
    assert_eq!(payment.subscription_plan, Some(plan.id));
    assert_eq!(balance_of(&db, user.id).await, dec("0"));
}

#[tokio::test]
async fn test_duplicate_transaction_id_conflicts() {
    let db = setup_db().await;
    create_user(&db, "100", "alice").await;
    create_user(&db, "200", "bob").await;
    let method = create_payment_method(&db, "Card").await;
    let plan = create_plan(&db, "Monthly", dec("19.99"), 30).await;
    let service = PaymentService::new(db.clone());

    let mut first = payment_request(method.id, "tx-dup");
    first.amount = Some("10".into());
    service.submit("100", first).await.unwrap();

    let mut other_user = payment_request(method.id, "tx-dup");
    other_user.subscription_plan = Some(plan.id.into());
    let err = service.submit("200", other_user).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    // conflict is reported before the rest of the body is looked at
    let err = service
        .submit("100", payment_request(9999, "tx-dup"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
    assert_eq!(payment_entity::Entity::find().count(&db).await.unwrap(), 1);
}

#[tokio::test]
async fn test_payment_validation() {
    let db = setup_db().await;
    create_user(&db, "100", "alice").await;
    let method = create_payment_method(&db, "Card").await;
    let service = PaymentService::new(db.clone());

    let err = service.submit("999", payment_request(method.id, "tx")).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let err = service.submit("100", payment_request(method.id, "  ")).await.unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));

    let long_id = "x".repeat(101);
    let err = service.submit("100", payment_request(method.id, &long_id)).await.unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));

    // top-up without an amount
    let err = service.submit("100", payment_request(method.id, "tx")).await.unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));

    for bad in ["-5", "0", "abc", "1.234"] {
        let mut req = payment_request(method.id, "tx");
        req.amount = Some(bad.into());
        let err = service.submit("100", req).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)), "amount {bad}");
    }

    let mut req = payment_request(method.id + 1, "tx");
    req.amount = Some("5".into());
    let err = service.submit("100", req).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let mut req = payment_request(method.id, "tx");
    req.payment_method = None;
    req.amount = Some("5".into());
    let err = service.submit("100", req).await.unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));

    assert_eq!(payment_entity::Entity::find().count(&db).await.unwrap(), 0);
}

#[tokio::test]
async fn test_failed_top_up_reverses_credit() {
    let db = setup_db().await;
    let user = create_user(&db, "100", "alice").await;
    let method = create_payment_method(&db, "Card").await;
    let service = PaymentService::new(db.clone());

    let mut req = payment_request(method.id, "tx-fail");
    req.amount = Some("30".into());
    service.submit("100", req).await.unwrap();

    let updated = service.update_status("tx-fail", PaymentStatus::Failed).await.unwrap();
    assert_eq!(updated.status, PaymentStatus::Failed);
    assert_eq!(balance_of(&db, user.id).await, dec("0"));

    // final states do not move
    let err = service
        .update_status("tx-fail", PaymentStatus::Completed)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));

    let err = service
        .update_status("missing", PaymentStatus::Completed)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_completed_payment_keeps_credit_and_counts_in_profile() {
    let db = setup_db().await;
    let user = create_user(&db, "100", "alice").await;
    let method = create_payment_method(&db, "Card").await;
    let service = PaymentService::new(db.clone());

    let mut req = payment_request(method.id, "tx-ok");
    req.amount = Some("20".into());
    service.submit("100", req).await.unwrap();

    let users = UserService::new(db.clone());
    assert_eq!(users.profile("100").await.unwrap().total_payments, 0);

    service.update_status("tx-ok", PaymentStatus::Completed).await.unwrap();
    assert_eq!(balance_of(&db, user.id).await, dec("20"));
    assert_eq!(service.status("tx-ok").await.unwrap().status, PaymentStatus::Completed);

    let profile = users.profile("100").await.unwrap();
    assert_eq!(profile.total_payments, 1);
    assert_eq!(profile.balance, dec("20"));
    assert!(profile.current_subscription.is_none());
}

#[tokio::test]
async fn test_reversal_refused_when_balance_spent() {
    let db = setup_db().await;
    let user = create_user(&db, "100", "alice").await;
    let method = create_payment_method(&db, "Card").await;
    let service = PaymentService::new(db.clone());

    let mut req = payment_request(method.id, "tx-spent");
    req.amount = Some("40".into());
    service.submit("100", req).await.unwrap();

    let mut active: user_entity::ActiveModel = user_entity::Entity::find_by_id(user.id)
        .one(&db)
        .await
        .unwrap()
        .unwrap()
        .into();
    active.balance = sea_orm::Set(dec("10"));
    sea_orm::ActiveModelTrait::update(active, &db).await.unwrap();

    let err = service
        .update_status("tx-spent", PaymentStatus::Failed)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
    assert_eq!(service.status("tx-spent").await.unwrap().status, PaymentStatus::Pending);
    assert_eq!(balance_of(&db, user.id).await, dec("10"));
}

#[tokio::test]
async fn test_plan_payment_never_touches_balance() {
    let db = setup_db().await;
    let user = create_user(&db, "100", "alice").await;
    let method = create_payment_method(&db, "Card").await;
    let plan = create_plan(&db, "Monthly", dec("19.99"), 30).await;
    let short = create_plan(&db, "Weekly", dec("5.00"), 7).await;
    let service = PaymentService::new(db.clone());

    let mut req = payment_request(method.id, "tx-top-up");
    req.amount = Some("50".into());
    service.submit("100", req).await.unwrap();

    for (tx, plan_id) in [("tx-plan", plan.id), ("tx-short", short.id)] {
        let mut req = payment_request(method.id, tx);
        req.subscription_plan = Some(plan_id.into());
        service.submit("100", req).await.unwrap();
    }
    let stored = payment_entity::Entity::find()
        .all(&db)
        .await
        .unwrap()
        .into_iter()
        .map(|p| (p.transaction_id, p.is_top_up))
        .collect::<Vec<_>>();
    assert!(stored.contains(&("tx-top-up".to_string(), true)));
    assert!(stored.contains(&("tx-plan".to_string(), false)));

    service.update_status("tx-short", PaymentStatus::Failed).await.unwrap();
    assert_eq!(balance_of(&db, user.id).await, dec("50"));

    // deleting a plan takes its payments with it
    subscription_plan_entity::Entity::delete_by_id(plan.id)
        .exec(&db)
        .await
        .unwrap();
    let err = service
        .update_status("tx-plan", PaymentStatus::Failed)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
    assert_eq!(balance_of(&db, user.id).await, dec("50"));

    let top_up = payment_entity::Entity::find()
        .all(&db)
        .await
        .unwrap()
        .into_iter()
        .find(|p| p.transaction_id == "tx-top-up")
        .unwrap();
    assert!(top_up.is_top_up);
}

#[tokio::test]
async fn test_gift_grants_subscription_to_recipient() {
    let db = setup_db().await;
    create_user(&db, "100", "alice").await;
    let bob = create_user(&db, "200", "bob").await;
    let plan = create_plan(&db, "Monthly", dec("19.99"), 30).await;

    let resp = SubscriptionService::new(db.clone())
        .gift("100", gift_request("@bob", plan.id, "gift-tx-1".into()))
        .await
        .unwrap();

    assert_eq!(resp.subscription.plan.id, plan.id);
    let gift = gifted_subscription_entity::Entity::find_by_id(resp.gift_id)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(gift.recipient_id, bob.id);
    assert_eq!(gift.transaction_id, "gift-tx-1");

    let status = SubscriptionService::new(db.clone()).status("200").await.unwrap();
    assert!(status.subscribed);
}

#[tokio::test]
async fn test_gift_to_unknown_recipient_writes_nothing() {
    let db = setup_db().await;
    create_user(&db, "100", "alice").await;
    let plan = create_plan(&db, "Monthly", dec("19.99"), 30).await;

    let err = SubscriptionService::new(db.clone())
        .gift("100", gift_request("@nobody", plan.id, "gift-tx".into()))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::NotFound(_)));
    assert_eq!(gifted_subscription_entity::Entity::find().count(&db).await.unwrap(), 0);
    assert_eq!(user_subscription_entity::Entity::find().count(&db).await.unwrap(), 0);
}

#[tokio::test]
async fn test_gift_rejects_bad_transaction_ids() {
    let db = setup_db().await;
    create_user(&db, "100", "alice").await;
    create_user(&db, "200", "bob").await;
    let plan = create_plan(&db, "Monthly", dec("19.99"), 30).await;
    let service = SubscriptionService::new(db.clone());

    let too_long = serde_json::Value::String("t".repeat(256));
    let err = service.gift("100", gift_request("bob", plan.id, too_long)).await.unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));

    let err = service
        .gift("100", gift_request("bob", plan.id, serde_json::json!(12345)))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));

    let err = service
        .gift("100", gift_request("bob", plan.id, serde_json::Value::Null))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));

    let err = service
        .gift("100", gift_request("bob", plan.id + 10, "tx".into()))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    assert_eq!(gifted_subscription_entity::Entity::find().count(&db).await.unwrap(), 0);
    assert_eq!(user_subscription_entity::Entity::find().count(&db).await.unwrap(), 0);

    let at_limit = serde_json::Value::String("t".repeat(255));
    service.gift("100", gift_request("bob", plan.id, at_limit)).await.unwrap();
}

#[tokio::test]
async fn test_statistics_counts_subscriptions() {
    let db = setup_db().await;
    create_user(&db, "100", "alice").await;
    let plan = create_plan(&db, "Monthly", dec("19.99"), 30).await;
    let service = SubscriptionService::new(db.clone());
    for _ in 0..2 {
        service
            .subscribe("100", SubscribeRequest { plan_id: Some(plan.id.into()) })
            .await
            .unwrap();
    }

    let stats = UserService::new(db.clone()).statistics("100").await.unwrap();
    assert_eq!(stats.total_subscriptions, 2);
    assert_eq!(stats.total_payments, 0);
    assert!(stats.last_subscription.is_some());
}
