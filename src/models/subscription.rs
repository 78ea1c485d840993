use crate::entities::{subscription_plan_entity, user_subscription_entity};
use crate::utils::NumberOrString;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SubscriptionPlanResponse {
    pub id: i32,
    pub name: String,
    pub description: String,
    #[schema(value_type = String, example = "19.99")]
    pub price: Decimal,
    pub duration_days: i32,
    pub renewable: bool,
}

impl From<subscription_plan_entity::Model> for SubscriptionPlanResponse {
    fn from(p: subscription_plan_entity::Model) -> Self {
        Self {
            id: p.id,
            name: p.name,
            description: p.description,
            price: p.price,
            duration_days: p.duration_days,
            renewable: p.renewable,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserSubscriptionResponse {
    pub id: i32,
    pub plan: SubscriptionPlanResponse,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub is_expiring_soon: bool,
}

impl UserSubscriptionResponse {
    pub fn new(
        sub: user_subscription_entity::Model,
        plan: subscription_plan_entity::Model,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: sub.id,
            plan: plan.into(),
            start_date: sub.start_date,
            end_date: sub.end_date,
            is_expiring_soon: crate::services::is_expiring_soon(sub.end_date, now),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SubscribeRequest {
    #[schema(value_type = String, example = "1")]
    pub plan_id: Option<NumberOrString>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GiftSubscriptionRequest {
    #[schema(example = "@bob")]
    pub recipient_username: Option<String>,
    #[serde(alias = "subscription_plan")]
    #[schema(value_type = String, example = "1")]
    pub plan_id: Option<NumberOrString>,
    /// Must be a JSON string of at most 255 characters.
    #[schema(value_type = String, example = "txn-123")]
    pub transaction_id: Option<serde_json::Value>,
    /// Accepted for client compatibility; gifts do not record a payment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = String)]
    pub payment_method: Option<NumberOrString>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GiftSubscriptionResponse {
    pub message: String,
    pub gift_id: i32,
    pub subscription: UserSubscriptionResponse,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SubscriptionStatusResponse {
    pub subscribed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription: Option<UserSubscriptionResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
