use crate::entities::{PaymentStatus, payment_entity, payment_method_entity};
use crate::utils::NumberOrString;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PaymentMethodResponse {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
}

impl From<payment_method_entity::Model> for PaymentMethodResponse {
    fn from(m: payment_method_entity::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            description: m.description,
        }
    }
}

/// A plan purchase when `subscription_plan` is set, otherwise a balance top-up.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct MakePaymentRequest {
    #[schema(value_type = String, example = "1")]
    pub payment_method: Option<NumberOrString>,
    #[schema(example = "txn-0001")]
    pub transaction_id: Option<String>,
    /// Ignored when a plan is given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = String, example = "50.00")]
    pub amount: Option<NumberOrString>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = String, example = "2")]
    pub subscription_plan: Option<NumberOrString>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PaymentResponse {
    pub id: i32,
    pub user: i32,
    pub subscription_plan: Option<i32>,
    pub payment_method: Option<i32>,
    #[schema(value_type = String, example = "50.00")]
    pub amount: Decimal,
    pub transaction_id: String,
    pub status: PaymentStatus,
    pub payment_date: DateTime<Utc>,
}

impl From<payment_entity::Model> for PaymentResponse {
    fn from(p: payment_entity::Model) -> Self {
        Self {
            id: p.id,
            user: p.user_id,
            subscription_plan: p.subscription_plan_id,
            payment_method: p.payment_method_id,
            amount: p.amount,
            transaction_id: p.transaction_id,
            status: p.status,
            payment_date: p.payment_date,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdatePaymentStatusRequest {
    pub status: PaymentStatus,
}
