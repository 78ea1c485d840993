use crate::entities::{consent_entity, user_card_entity, user_entity};
use crate::models::UserSubscriptionResponse;
use crate::utils::NumberOrString;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegisterRequest {
    #[schema(value_type = String, example = "123456789")]
    pub telegram_id: Option<NumberOrString>,
    #[schema(example = "alice")]
    pub username: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegisterResponse {
    pub message: String,
    pub created: bool,
    pub consent_given: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: i32,
    pub telegram_id: String,
    pub username: String,
    #[schema(value_type = String, example = "0.00")]
    pub balance: Decimal,
    pub created_at: DateTime<Utc>,
}

impl From<user_entity::Model> for UserResponse {
    fn from(u: user_entity::Model) -> Self {
        Self {
            id: u.id,
            telegram_id: u.telegram_id,
            username: u.username,
            balance: u.balance,
            created_at: u.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProfileResponse {
    pub telegram_id: String,
    pub username: String,
    pub created: DateTime<Utc>,
    pub current_subscription: Option<UserSubscriptionResponse>,
    /// Completed payments only.
    pub total_payments: u64,
    #[schema(value_type = String, example = "150.00")]
    pub balance: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StatisticsResponse {
    pub total_subscriptions: u64,
    pub total_payments: u64,
    pub last_subscription: Option<UserSubscriptionResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AddCardRequest {
    #[schema(example = "4111111111111111")]
    pub card_number: Option<String>,
    #[schema(example = "09/27")]
    pub card_expiry: Option<String>,
    #[schema(example = "ALICE SMITH")]
    pub cardholder_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserCardResponse {
    pub id: i32,
    pub masked_number: String,
    pub card_expiry: String,
    pub cardholder_name: String,
    pub created_at: DateTime<Utc>,
}

impl From<user_card_entity::Model> for UserCardResponse {
    fn from(c: user_card_entity::Model) -> Self {
        Self {
            id: c.id,
            masked_number: c.masked_number,
            card_expiry: c.card_expiry,
            cardholder_name: c.cardholder_name,
            created_at: c.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ConsentResponse {
    pub id: i32,
    pub consent_given: bool,
    pub consent_date: Option<DateTime<Utc>>,
}

impl From<consent_entity::Model> for ConsentResponse {
    fn from(c: consent_entity::Model) -> Self {
        Self {
            id: c.id,
            consent_given: c.consent_given,
            consent_date: c.consent_date,
        }
    }
}

/// Snapshot of a user's consent; `{false, null}` when nothing was recorded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ConsentStatusResponse {
    pub consent_given: bool,
    pub consent_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SetConsentRequest {
    #[serde(default)]
    pub consent_given: bool,
}
