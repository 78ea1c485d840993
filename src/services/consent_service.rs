use crate::entities::consent_entity as consents;
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::services::find_user;
use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

#[derive(Clone)]
pub struct ConsentService {
    pool: DatabaseConnection,
}

impl ConsentService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    async fn find(&self, user_id: i32) -> AppResult<Option<consents::Model>> {
        Ok(consents::Entity::find()
            .filter(consents::Column::UserId.eq(user_id))
            .one(&self.pool)
            .await?)
    }

    /// Returns the stored consent, inserting a not-given row first if the
    /// user has none.
    pub async fn get_or_create(&self, telegram_id: &str) -> AppResult<ConsentResponse> {
        let user = find_user(&self.pool, telegram_id).await?;
        if let Some(consent) = self.find(user.id).await? {
            return Ok(consent.into());
        }

        let row = consents::ActiveModel {
            user_id: Set(user.id),
            consent_given: Set(false),
            consent_date: Set(None),
            ..Default::default()
        };
        consents::Entity::insert(row)
            .on_conflict(
                OnConflict::column(consents::Column::UserId)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.pool)
            .await?;

        self.find(user.id)
            .await?
            .map(Into::into)
            .ok_or_else(|| AppError::InternalError("consent row missing after insert".to_string()))
    }

    /// Read-only snapshot; nothing is written when no row exists.
    pub async fn status(&self, telegram_id: &str) -> AppResult<ConsentStatusResponse> {
        let user = find_user(&self.pool, telegram_id).await?;
        Ok(self
            .find(user.id)
            .await?
            .map(|c| ConsentStatusResponse {
                consent_given: c.consent_given,
                consent_date: c.consent_date,
            })
            .unwrap_or_default())
    }

    pub async fn set(&self, telegram_id: &str, given: bool) -> AppResult<ConsentResponse> {
        let user = find_user(&self.pool, telegram_id).await?;
        let row = consents::ActiveModel {
            user_id: Set(user.id),
            consent_given: Set(given),
            consent_date: Set(given.then(Utc::now)),
            ..Default::default()
        };
        consents::Entity::insert(row)
            .on_conflict(
                OnConflict::column(consents::Column::UserId)
                    .update_columns([consents::Column::ConsentGiven, consents::Column::ConsentDate])
                    .to_owned(),
            )
            .exec_without_returning(&self.pool)
            .await?;

        log::info!("User {} set consent to {given}", user.telegram_id);
        self.find(user.id)
            .await?
            .map(Into::into)
            .ok_or_else(|| AppError::InternalError("consent row missing after upsert".to_string()))
    }
}
