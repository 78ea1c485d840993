use crate::entities::{
    PaymentStatus, payment_entity as payments, payment_method_entity as methods,
    subscription_plan_entity as plans, user_entity as users,
};
use crate::error::{AppError, AppResult, is_unique_violation};
use crate::models::*;
use crate::services::find_user;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, QueryFilter, QueryOrder, Set, TransactionTrait,
};

const MAX_TRANSACTION_ID_LEN: usize = 100;

fn duplicate_transaction() -> AppError {
    AppError::Conflict("Payment with this transaction_id already exists".to_string())
}

async fn find_payment<C: ConnectionTrait>(
    conn: &C,
    transaction_id: &str,
) -> AppResult<payments::Model> {
    payments::Entity::find()
        .filter(payments::Column::TransactionId.eq(transaction_id))
        .one(conn)
        .await?
        .ok_or_else(|| AppError::NotFound("Payment not found".to_string()))
}

#[derive(Clone)]
pub struct PaymentService {
    pool: DatabaseConnection,
}

impl PaymentService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    pub async fn list_methods(&self) -> AppResult<Vec<PaymentMethodResponse>> {
        let rows = methods::Entity::find()
            .order_by_asc(methods::Column::Id)
            .all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Records a pending payment. With a plan the plan's price is charged;
    /// without one it is a top-up and the balance is credited right away.
    pub async fn submit(
        &self,
        telegram_id: &str,
        req: MakePaymentRequest,
    ) -> AppResult<PaymentResponse> {
        let user = find_user(&self.pool, telegram_id).await?;

        let transaction_id = req.transaction_id.as_deref().map(str::trim).unwrap_or_default();
        if transaction_id.is_empty() {
            return Err(AppError::ValidationError(
                "transaction_id is required".to_string(),
            ));
        }
        if transaction_id.chars().count() > MAX_TRANSACTION_ID_LEN {
            return Err(AppError::ValidationError(
                "transaction_id must be at most 100 characters".to_string(),
            ));
        }
        if payments::Entity::find()
            .filter(payments::Column::TransactionId.eq(transaction_id))
            .one(&self.pool)
            .await?
            .is_some()
        {
            return Err(duplicate_transaction());
        }

        let method_id = req
            .payment_method
            .as_ref()
            .filter(|v| !v.is_blank())
            .ok_or_else(|| AppError::ValidationError("payment_method is required".to_string()))?
            .to_id("payment_method")?;
        let method = methods::Entity::find_by_id(method_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Payment method not found".to_string()))?;

        let plan = match req.subscription_plan.as_ref().filter(|v| !v.is_blank()) {
            Some(plan_id) => Some(
                plans::Entity::find_by_id(plan_id.to_id("subscription_plan")?)
                    .one(&self.pool)
                    .await?
                    .ok_or_else(|| AppError::NotFound("Subscription plan not found".to_string()))?,
            ),
            None => None,
        };

        let amount = match &plan {
            Some(p) => p.price,
            None => req
                .amount
                .as_ref()
                .filter(|v| !v.is_blank())
                .ok_or_else(|| {
                    AppError::ValidationError("amount is required for a balance top-up".to_string())
                })?
                .to_amount()?,
        };

        let txn = self.pool.begin().await?;
        let payment = payments::ActiveModel {
            user_id: Set(user.id),
            subscription_plan_id: Set(plan.as_ref().map(|p| p.id)),
            payment_method_id: Set(Some(method.id)),
            amount: Set(amount),
            is_top_up: Set(plan.is_none()),
            transaction_id: Set(transaction_id.to_string()),
            status: Set(PaymentStatus::Pending),
            payment_date: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                duplicate_transaction()
            } else {
                log::error!("Failed to record payment {transaction_id}: {e}");
                e.into()
            }
        })?;

        if payment.is_top_up {
            users::Entity::update_many()
                .col_expr(
                    users::Column::Balance,
                    Expr::col(users::Column::Balance).add(amount),
                )
                .filter(users::Column::Id.eq(user.id))
                .exec(&txn)
                .await
                .inspect_err(|e| {
                    log::error!("Failed to credit balance for {transaction_id}: {e}")
                })?;
        }
        txn.commit().await?;

        if payment.is_top_up {
            log::info!("User {} topped up {amount} ({transaction_id})", user.telegram_id);
        } else {
            log::info!(
                "User {} paid {amount} for plan {:?} ({transaction_id})",
                user.telegram_id,
                payment.subscription_plan_id
            );
        }
        Ok(payment.into())
    }

    pub async fn status(&self, transaction_id: &str) -> AppResult<PaymentResponse> {
        Ok(find_payment(&self.pool, transaction_id).await?.into())
    }

    /// Moves a pending payment to a final state. A failed top-up takes its
    /// credit back, which is refused if the balance would go negative.
    pub async fn update_status(
        &self,
        transaction_id: &str,
        status: PaymentStatus,
    ) -> AppResult<PaymentResponse> {
        let txn = self.pool.begin().await?;
        let payment = find_payment(&txn, transaction_id).await?;

        if !payment.status.can_transition_to(status) {
            return Err(AppError::ValidationError(format!(
                "Cannot change payment status from {} to {}",
                payment.status, status
            )));
        }

        if status == PaymentStatus::Failed && payment.is_top_up {
            let reversed = users::Entity::update_many()
                .col_expr(
                    users::Column::Balance,
                    Expr::col(users::Column::Balance).sub(payment.amount),
                )
                .filter(users::Column::Id.eq(payment.user_id))
                .filter(users::Column::Balance.gte(payment.amount))
                .exec(&txn)
                .await?;
            if reversed.rows_affected == 0 {
                return Err(AppError::Conflict(
                    "Balance is lower than the amount to reverse".to_string(),
                ));
            }
        }

        let mut active = payment.into_active_model();
        active.status = Set(status);
        let updated = active.update(&txn).await?;
        txn.commit().await?;

        log::info!("Payment {transaction_id} marked {status}");
        Ok(updated.into())
    }
}
