use crate::entities::{
    chat_session_entity as chat_sessions, client_card_entity as client_cards,
    feedback_entity as feedback,
};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::services::find_user;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

const MAX_NAME_LEN: usize = 100;
const MAX_AGE: i32 = 150;

fn required_text(value: Option<&str>, field: &str) -> AppResult<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or_else(|| AppError::ValidationError(format!("{field} is required")))
}

#[derive(Clone)]
pub struct ClientService {
    pool: DatabaseConnection,
}

impl ClientService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// The user's most recent intake card.
    pub async fn latest_card(&self, telegram_id: &str) -> AppResult<ClientCardResponse> {
        let user = find_user(&self.pool, telegram_id).await?;
        client_cards::Entity::find()
            .filter(client_cards::Column::UserId.eq(user.id))
            .order_by_desc(client_cards::Column::CreatedAt)
            .order_by_desc(client_cards::Column::Id)
            .one(&self.pool)
            .await?
            .map(Into::into)
            .ok_or_else(|| AppError::NotFound("Client card not found".to_string()))
    }

    pub async fn create_card(
        &self,
        telegram_id: &str,
        req: ClientCardRequest,
    ) -> AppResult<ClientCardResponse> {
        let user = find_user(&self.pool, telegram_id).await?;

        let name = required_text(req.name.as_deref(), "name")?;
        if name.chars().count() > MAX_NAME_LEN {
            return Err(AppError::ValidationError(
                "name must be at most 100 characters".to_string(),
            ));
        }
        let age = req
            .age
            .as_ref()
            .filter(|v| !v.is_blank())
            .ok_or_else(|| AppError::ValidationError("age is required".to_string()))?
            .to_int("age")?;
        if !(0..=MAX_AGE).contains(&age) {
            return Err(AppError::ValidationError(
                "age must be between 0 and 150".to_string(),
            ));
        }
        let goals = required_text(req.goals.as_deref(), "goals")?;
        let challenges = required_text(req.challenges.as_deref(), "challenges")?;

        let card = client_cards::ActiveModel {
            user_id: Set(user.id),
            name: Set(name),
            age: Set(age),
            goals: Set(goals),
            challenges: Set(challenges),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        log::info!("User {} filled in a client card", user.telegram_id);
        Ok(card.into())
    }

    pub async fn save_chat_session(
        &self,
        telegram_id: &str,
        req: ChatSessionRequest,
    ) -> AppResult<ChatSessionResponse> {
        let user = find_user(&self.pool, telegram_id).await?;
        let chat_history = req
            .chat_history
            .filter(|v| !v.is_null())
            .ok_or_else(|| AppError::ValidationError("chat_history is required".to_string()))?;

        chat_sessions::ActiveModel {
            user_id: Set(user.id),
            chat_history: Set(chat_history),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        Ok(ChatSessionResponse {
            status: "success".to_string(),
        })
    }

    pub async fn submit_feedback(&self, req: FeedbackRequest) -> AppResult<FeedbackResponse> {
        let content = required_text(req.content.as_deref(), "content")?;
        let row = feedback::ActiveModel {
            content: Set(content),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        log::info!("Feedback {} received", row.id);
        Ok(row.into())
    }
}
