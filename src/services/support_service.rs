use crate::entities::{support_message_entity as messages, support_session_entity as sessions};
use crate::error::{AppError, AppResult, is_unique_violation};
use crate::models::*;
use crate::services::UserService;
use crate::utils::truncate_chars;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

pub const MAX_SENDER_LEN: usize = 250;

#[derive(Clone)]
pub struct SupportService {
    pool: DatabaseConnection,
    users: UserService,
}

impl SupportService {
    pub fn new(pool: DatabaseConnection) -> Self {
        let users = UserService::new(pool.clone());
        Self { pool, users }
    }

    async fn active_session(&self, user_id: i32) -> AppResult<Option<sessions::Model>> {
        Ok(sessions::Entity::find()
            .filter(sessions::Column::UserId.eq(user_id))
            .filter(sessions::Column::IsActive.eq(true))
            .order_by_desc(sessions::Column::Id)
            .one(&self.pool)
            .await?)
    }

    /// Opens a session for the user, or hands back the one already open.
    /// Unknown telegram ids are registered on the way.
    pub async fn start_session(&self, telegram_id: &str) -> AppResult<StartSessionResponse> {
        let (user, _) = self.users.get_or_create(telegram_id, None).await?;

        let session = match self.active_session(user.id).await? {
            Some(session) => session,
            None => {
                let inserted = sessions::ActiveModel {
                    user_id: Set(user.id),
                    is_active: Set(true),
                    started_at: Set(Utc::now()),
                    ended_at: Set(None),
                    ..Default::default()
                }
                .insert(&self.pool)
                .await;
                match inserted {
                    Ok(session) => {
                        log::info!(
                            "Opened support session {} for {}",
                            session.id,
                            user.telegram_id
                        );
                        session
                    }
                    Err(e) if is_unique_violation(&e) => {
                        self.active_session(user.id).await?.ok_or_else(|| {
                            AppError::InternalError(
                                "active session vanished after unique violation".to_string(),
                            )
                        })?
                    }
                    Err(e) => return Err(e.into()),
                }
            }
        };

        Ok(StartSessionResponse {
            session_id: session.id,
            message: "Support session started".to_string(),
        })
    }

    pub async fn post_message(&self, req: SendMessageRequest) -> AppResult<SupportMessageResponse> {
        let session_id = req
            .session_id
            .as_ref()
            .filter(|v| !v.is_blank())
            .ok_or_else(|| AppError::ValidationError("session_id is required".to_string()))?
            .to_id("session_id")?;
        let sender = req
            .sender
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AppError::ValidationError("sender is required".to_string()))?;
        let message_text = req
            .message_text
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| AppError::ValidationError("message_text is required".to_string()))?;

        let session = sessions::Entity::find_by_id(session_id)
            .filter(sessions::Column::IsActive.eq(true))
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Session not found or inactive".to_string()))?;

        let message = messages::ActiveModel {
            session_id: Set(session.id),
            sender: Set(truncate_chars(sender, MAX_SENDER_LEN)),
            message_text: Set(message_text.to_string()),
            timestamp: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.pool)
        .await
        .inspect_err(|e| log::error!("Failed to store support message: {e}"))?;

        Ok(message.into())
    }

    /// Transcript in send order; closed sessions are still readable.
    pub async fn list_messages(&self, session_id: i32) -> AppResult<SupportMessagesResponse> {
        let session = sessions::Entity::find_by_id(session_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Session not found".to_string()))?;

        let rows = messages::Entity::find()
            .filter(messages::Column::SessionId.eq(session.id))
            .order_by_asc(messages::Column::Timestamp)
            .order_by_asc(messages::Column::Id)
            .all(&self.pool)
            .await?;

        Ok(SupportMessagesResponse {
            messages: rows.into_iter().map(Into::into).collect(),
        })
    }
}
