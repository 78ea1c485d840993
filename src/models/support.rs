use crate::entities::support_message_entity;
use crate::utils::NumberOrString;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StartSessionResponse {
    pub session_id: i32,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SendMessageRequest {
    #[schema(value_type = String, example = "1")]
    pub session_id: Option<NumberOrString>,
    #[schema(example = "alice")]
    pub sender: Option<String>,
    #[schema(example = "I cannot top up my balance")]
    pub message_text: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SupportMessageResponse {
    pub id: i32,
    pub sender: String,
    pub message_text: String,
    pub timestamp: DateTime<Utc>,
}

impl From<support_message_entity::Model> for SupportMessageResponse {
    fn from(m: support_message_entity::Model) -> Self {
        Self {
            id: m.id,
            sender: m.sender,
            message_text: m.message_text,
            timestamp: m.timestamp,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SupportMessagesResponse {
    pub messages: Vec<SupportMessageResponse>,
}
