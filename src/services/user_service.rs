use crate::entities::{
    PaymentStatus, consent_entity as consents, payment_entity as payments,
    user_card_entity as cards, user_entity as users, user_subscription_entity as subs,
};
use crate::error::{AppError, AppResult, is_unique_violation};
use crate::models::*;
use crate::services::SubscriptionService;
use crate::utils::{is_valid_card_expiry, is_valid_card_number, mask_card_number};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, Set,
};

const MAX_TELEGRAM_ID_LEN: usize = 200;
const MAX_USERNAME_LEN: usize = 200;
const MAX_CARDHOLDER_NAME_LEN: usize = 100;

/// Looks a user up by telegram id, failing with `NotFound`.
pub async fn find_user<C: ConnectionTrait>(conn: &C, telegram_id: &str) -> AppResult<users::Model> {
    users::Entity::find()
        .filter(users::Column::TelegramId.eq(telegram_id))
        .one(conn)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}

#[derive(Clone)]
pub struct UserService {
    pool: DatabaseConnection,
    subscriptions: SubscriptionService,
}

impl UserService {
    pub fn new(pool: DatabaseConnection) -> Self {
        let subscriptions = SubscriptionService::new(pool.clone());
        Self {
            pool,
            subscriptions,
        }
    }

    /// Returns the user with this telegram id, inserting it first when
    /// missing. The flag is true when this call created the row.
    pub async fn get_or_create(
        &self,
        telegram_id: &str,
        username: Option<&str>,
    ) -> AppResult<(users::Model, bool)> {
        let telegram_id = telegram_id.trim();
        if telegram_id.is_empty() {
            return Err(AppError::ValidationError(
                "telegram_id is required".to_string(),
            ));
        }
        if telegram_id.chars().count() > MAX_TELEGRAM_ID_LEN {
            return Err(AppError::ValidationError(
                "telegram_id is too long".to_string(),
            ));
        }
        let username = username.map(str::trim).unwrap_or_default();
        if username.chars().count() > MAX_USERNAME_LEN {
            return Err(AppError::ValidationError("username is too long".to_string()));
        }

        if let Some(user) = self.find_by_telegram_id(telegram_id).await? {
            return Ok((user, false));
        }

        let inserted = users::ActiveModel {
            telegram_id: Set(telegram_id.to_string()),
            username: Set(username.to_string()),
            balance: Set(Decimal::ZERO),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.pool)
        .await;

        match inserted {
            Ok(user) => {
                log::info!("Registered user {telegram_id}");
                Ok((user, true))
            }
            // lost the race against a concurrent registration
            Err(e) if is_unique_violation(&e) => {
                let user = self.find_by_telegram_id(telegram_id).await?.ok_or_else(|| {
                    AppError::InternalError("user vanished after unique violation".to_string())
                })?;
                Ok((user, false))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn find_by_telegram_id(&self, telegram_id: &str) -> AppResult<Option<users::Model>> {
        Ok(users::Entity::find()
            .filter(users::Column::TelegramId.eq(telegram_id))
            .one(&self.pool)
            .await?)
    }

    pub async fn register(&self, req: RegisterRequest) -> AppResult<RegisterResponse> {
        let telegram_id = req
            .telegram_id
            .map(|v| v.to_text())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AppError::ValidationError("telegram_id is required".to_string()))?;

        let (user, created) = self
            .get_or_create(&telegram_id, req.username.as_deref())
            .await?;

        let consent_given = consents::Entity::find()
            .filter(consents::Column::UserId.eq(user.id))
            .one(&self.pool)
            .await?
            .is_some_and(|c| c.consent_given);

        let message = if created {
            "User registered successfully"
        } else {
            "User already registered"
        };

        Ok(RegisterResponse {
            message: message.to_string(),
            created,
            consent_given,
        })
    }

    async fn completed_payments(&self, user_id: i32) -> AppResult<u64> {
        Ok(payments::Entity::find()
            .filter(payments::Column::UserId.eq(user_id))
            .filter(payments::Column::Status.eq(PaymentStatus::Completed))
            .count(&self.pool)
            .await?)
    }

    pub async fn profile(&self, telegram_id: &str) -> AppResult<ProfileResponse> {
        let user = find_user(&self.pool, telegram_id).await?;
        let current_subscription = self.subscriptions.current_subscription(user.id).await?;
        let total_payments = self.completed_payments(user.id).await?;

        Ok(ProfileResponse {
            telegram_id: user.telegram_id,
            username: user.username,
            created: user.created_at,
            current_subscription,
            total_payments,
            balance: user.balance,
        })
    }

    pub async fn statistics(&self, telegram_id: &str) -> AppResult<StatisticsResponse> {
        let user = find_user(&self.pool, telegram_id).await?;
        let total_subscriptions = subs::Entity::find()
            .filter(subs::Column::UserId.eq(user.id))
            .count(&self.pool)
            .await?;
        let total_payments = self.completed_payments(user.id).await?;
        let last_subscription = self.subscriptions.latest_subscription(user.id).await?;

        Ok(StatisticsResponse {
            total_subscriptions,
            total_payments,
            last_subscription,
        })
    }

    pub async fn add_card(
        &self,
        telegram_id: &str,
        req: AddCardRequest,
    ) -> AppResult<UserCardResponse> {
        let user = find_user(&self.pool, telegram_id).await?;

        let card_number = req.card_number.as_deref().map(str::trim).unwrap_or_default();
        if !is_valid_card_number(card_number) {
            return Err(AppError::ValidationError(
                "card_number must be 13 to 19 digits".to_string(),
            ));
        }
        let card_expiry = req.card_expiry.as_deref().map(str::trim).unwrap_or_default();
        if !is_valid_card_expiry(card_expiry) {
            return Err(AppError::ValidationError(
                "card_expiry must be in MM/YY format".to_string(),
            ));
        }
        let cardholder_name = req
            .cardholder_name
            .as_deref()
            .map(str::trim)
            .unwrap_or_default();
        let name_len = cardholder_name.chars().count();
        if name_len == 0 || name_len > MAX_CARDHOLDER_NAME_LEN {
            return Err(AppError::ValidationError(
                "cardholder_name must be between 1 and 100 characters".to_string(),
            ));
        }

        let card = cards::ActiveModel {
            user_id: Set(user.id),
            masked_number: Set(mask_card_number(card_number)),
            card_expiry: Set(card_expiry.to_string()),
            cardholder_name: Set(cardholder_name.to_string()),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        log::info!("User {} added a card", user.telegram_id);
        Ok(card.into())
    }
}
