use crate::entities::{
    gifted_subscription_entity as gifts, subscription_plan_entity as plans,
    user_entity as users, user_subscription_entity as subs,
};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::services::find_user;
use crate::utils::normalize_username;
use chrono::{DateTime, Duration, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};

/// A subscription whose end is at most this far away is "expiring soon".
pub const EXPIRY_WARNING_DAYS: i64 = 7;

const MAX_GIFT_TRANSACTION_ID_LEN: usize = 255;

pub fn compute_end_date(start: DateTime<Utc>, duration_days: i32) -> DateTime<Utc> {
    start + Duration::days(i64::from(duration_days))
}

pub fn is_expiring_soon(end: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    end - now <= Duration::days(EXPIRY_WARNING_DAYS)
}

/// Inserts a subscription row; `end` defaults to `start + plan.duration_days`.
pub async fn create_subscription<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    plan: &plans::Model,
    start: DateTime<Utc>,
    end: Option<DateTime<Utc>>,
) -> AppResult<subs::Model> {
    let end = end.unwrap_or_else(|| compute_end_date(start, plan.duration_days));
    let sub = subs::ActiveModel {
        user_id: Set(user_id),
        plan_id: Set(plan.id),
        start_date: Set(start),
        end_date: Set(end),
        ..Default::default()
    }
    .insert(conn)
    .await?;
    Ok(sub)
}

#[derive(Clone)]
pub struct SubscriptionService {
    pool: DatabaseConnection,
}

impl SubscriptionService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    pub async fn list_plans(&self) -> AppResult<Vec<SubscriptionPlanResponse>> {
        let rows = plans::Entity::find()
            .order_by_asc(plans::Column::Id)
            .all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_plan(&self, plan_id: i32) -> AppResult<plans::Model> {
        plans::Entity::find_by_id(plan_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Subscription plan not found".to_string()))
    }

    /// Starts a subscription now. Payment is tracked separately.
    pub async fn purchase(
        &self,
        user: &users::Model,
        plan: &plans::Model,
    ) -> AppResult<subs::Model> {
        let sub = create_subscription(&self.pool, user.id, plan, Utc::now(), None).await?;
        log::info!(
            "User {} subscribed to plan {} until {}",
            user.telegram_id,
            plan.id,
            sub.end_date
        );
        Ok(sub)
    }

    pub async fn subscribe(
        &self,
        telegram_id: &str,
        req: SubscribeRequest,
    ) -> AppResult<UserSubscriptionResponse> {
        let user = find_user(&self.pool, telegram_id).await?;
        let plan_id = req
            .plan_id
            .filter(|v| !v.is_blank())
            .ok_or_else(|| AppError::ValidationError("plan_id is required".to_string()))?
            .to_id("plan_id")?;
        let plan = self.find_plan(plan_id).await?;

        let sub = self.purchase(&user, &plan).await?;
        Ok(UserSubscriptionResponse::new(sub, plan, Utc::now()))
    }

    /// Grants `plan` to the user named in the request. The audit row and the
    /// grant are written in one transaction.
    pub async fn gift(
        &self,
        telegram_id: &str,
        req: GiftSubscriptionRequest,
    ) -> AppResult<GiftSubscriptionResponse> {
        let sender = find_user(&self.pool, telegram_id).await?;

        let recipient_username = req
            .recipient_username
            .as_deref()
            .map(normalize_username)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                AppError::ValidationError("recipient_username is required".to_string())
            })?;
        let plan_id = req
            .plan_id
            .as_ref()
            .filter(|v| !v.is_blank())
            .ok_or_else(|| AppError::ValidationError("plan_id is required".to_string()))?;
        let transaction_id = match req.transaction_id {
            None | Some(serde_json::Value::Null) => {
                return Err(AppError::ValidationError(
                    "transaction_id is required".to_string(),
                ));
            }
            Some(serde_json::Value::String(ref s)) if s.is_empty() => {
                return Err(AppError::ValidationError(
                    "transaction_id is required".to_string(),
                ));
            }
            Some(v) => v,
        };

        let recipient = users::Entity::find()
            .filter(users::Column::Username.eq(recipient_username))
            .order_by_asc(users::Column::Id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Recipient not found".to_string()))?;
        let plan = self.find_plan(plan_id.to_id("plan_id")?).await?;

        let serde_json::Value::String(transaction_id) = transaction_id else {
            return Err(AppError::ValidationError(
                "transaction_id must be a string".to_string(),
            ));
        };
        if transaction_id.chars().count() > MAX_GIFT_TRANSACTION_ID_LEN {
            return Err(AppError::ValidationError(
                "transaction_id is too long".to_string(),
            ));
        }

        let now = Utc::now();
        let txn = self.pool.begin().await?;
        let gift = gifts::ActiveModel {
            sender_id: Set(sender.id),
            recipient_id: Set(recipient.id),
            plan_id: Set(plan.id),
            transaction_id: Set(transaction_id),
            gifted_on: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .inspect_err(|e| log::error!("Failed to record gift: {e}"))?;
        let sub = create_subscription(&txn, recipient.id, &plan, now, None)
            .await
            .inspect_err(|e| log::error!("Failed to grant gifted subscription: {e}"))?;
        txn.commit().await?;

        log::info!(
            "User {} gifted plan {} to {}",
            sender.telegram_id,
            plan.id,
            recipient.telegram_id
        );

        Ok(GiftSubscriptionResponse {
            message: format!(
                "Subscription '{}' was gifted to {}",
                plan.name, recipient.username
            ),
            gift_id: gift.id,
            subscription: UserSubscriptionResponse::new(sub, plan, now),
        })
    }

    pub async fn status(&self, telegram_id: &str) -> AppResult<SubscriptionStatusResponse> {
        let user = find_user(&self.pool, telegram_id).await?;
        Ok(match self.current_subscription(user.id).await? {
            Some(sub) => SubscriptionStatusResponse {
                subscribed: true,
                subscription: Some(sub),
                message: None,
            },
            None => SubscriptionStatusResponse {
                subscribed: false,
                subscription: None,
                message: Some("User is not subscribed or the subscription has expired".to_string()),
            },
        })
    }

    /// The user's current subscription: latest end date among rows that end
    /// in the future. Every "is subscribed" check goes through here.
    pub async fn current_subscription(
        &self,
        user_id: i32,
    ) -> AppResult<Option<UserSubscriptionResponse>> {
        let now = Utc::now();
        let row = subs::Entity::find()
            .filter(subs::Column::UserId.eq(user_id))
            .filter(subs::Column::EndDate.gt(now))
            .order_by_desc(subs::Column::EndDate)
            .order_by_desc(subs::Column::Id)
            .find_also_related(plans::Entity)
            .one(&self.pool)
            .await?;
        Ok(row.and_then(|(sub, plan)| plan.map(|p| UserSubscriptionResponse::new(sub, p, now))))
    }

    /// Latest subscription by end date, expired or not.
    pub async fn latest_subscription(
        &self,
        user_id: i32,
    ) -> AppResult<Option<UserSubscriptionResponse>> {
        let now = Utc::now();
        let row = subs::Entity::find()
            .filter(subs::Column::UserId.eq(user_id))
            .order_by_desc(subs::Column::EndDate)
            .order_by_desc(subs::Column::Id)
            .find_also_related(plans::Entity)
            .one(&self.pool)
            .await?;
        Ok(row.and_then(|(sub, plan)| plan.map(|p| UserSubscriptionResponse::new(sub, p, now))))
    }
}
