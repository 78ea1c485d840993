use crate::entities::{client_card_entity, feedback_entity};
use crate::utils::NumberOrString;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ClientCardRequest {
    #[schema(example = "Alice")]
    pub name: Option<String>,
    #[schema(value_type = String, example = "29")]
    pub age: Option<NumberOrString>,
    pub goals: Option<String>,
    pub challenges: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ClientCardResponse {
    pub id: i32,
    pub name: String,
    pub age: i32,
    pub goals: String,
    pub challenges: String,
    pub created_at: DateTime<Utc>,
}

impl From<client_card_entity::Model> for ClientCardResponse {
    fn from(c: client_card_entity::Model) -> Self {
        Self {
            id: c.id,
            name: c.name,
            age: c.age,
            goals: c.goals,
            challenges: c.challenges,
            created_at: c.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChatSessionRequest {
    #[schema(value_type = Object)]
    pub chat_history: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChatSessionResponse {
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FeedbackRequest {
    pub content: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FeedbackResponse {
    pub id: i32,
    pub content: String,
}

impl From<feedback_entity::Model> for FeedbackResponse {
    fn from(f: feedback_entity::Model) -> Self {
        Self {
            id: f.id,
            content: f.content,
        }
    }
}
