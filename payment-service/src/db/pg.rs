use async_trait::async_trait;
use rust_decimal::Decimal;
use shared::error::{ServiceError, ServiceResult};
use shared::models::{Payment, PaymentStatus};
use sqlx::PgPool;

use super::{PaymentStore, Settlement};

const COLUMNS: &str =
    "id, order_id, user_id, amount, payment_method, status, transaction_id, created_at";

#[derive(sqlx::FromRow)]
struct PaymentRow {
    id: String,
    order_id: String,
    user_id: String,
    amount: Decimal,
    payment_method: String,
    status: String,
    transaction_id: String,
    created_at: i64,
}

impl TryFrom<PaymentRow> for Payment {
    type Error = ServiceError;

    fn try_from(row: PaymentRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse::<PaymentStatus>()
            .map_err(|e| ServiceError::Db(e.into()))?;
        Ok(Payment {
            id: row.id,
            order_id: row.order_id,
            user_id: row.user_id,
            amount: row.amount,
            payment_method: row.payment_method,
            status,
            transaction_id: row.transaction_id,
            created_at: row.created_at,
        })
    }
}

/// PostgreSQL-backed store
#[derive(Clone)]
pub struct PgPaymentStore {
    pool: PgPool,
}

impl PgPaymentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_by_transaction(&self, transaction_id: &str) -> ServiceResult<Option<Payment>> {
        let row = sqlx::query_as::<_, PaymentRow>(&format!(
            "SELECT {COLUMNS} FROM payments WHERE transaction_id = $1"
        ))
        .bind(transaction_id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Payment::try_from).transpose()
    }
}

#[async_trait]
impl PaymentStore for PgPaymentStore {
    async fn insert(&self, p: &Payment) -> ServiceResult<()> {
        sqlx::query(
            "INSERT INTO payments (id, order_id, user_id, amount, payment_method, status,
                transaction_id, created_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(&p.id)
        .bind(&p.order_id)
        .bind(&p.user_id)
        .bind(p.amount)
        .bind(&p.payment_method)
        .bind(p.status.as_str())
        .bind(&p.transaction_id)
        .bind(p.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn latest_for_order(&self, order_id: &str) -> ServiceResult<Option<Payment>> {
        let row = sqlx::query_as::<_, PaymentRow>(&format!(
            "SELECT {COLUMNS} FROM payments WHERE order_id = $1 ORDER BY seq DESC LIMIT 1"
        ))
        .bind(order_id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Payment::try_from).transpose()
    }

    async fn settle(
        &self,
        transaction_id: &str,
        status: PaymentStatus,
    ) -> ServiceResult<Settlement> {
        let row = sqlx::query_as::<_, PaymentRow>(&format!(
            "UPDATE payments SET status = $1
                WHERE transaction_id = $2 AND status = 'pending'
                RETURNING {COLUMNS}"
        ))
        .bind(status.as_str())
        .bind(transaction_id)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(row) = row {
            return Ok(Settlement::Updated(row.try_into()?));
        }
        Ok(match self.find_by_transaction(transaction_id).await? {
            Some(payment) => Settlement::Unchanged(payment),
            None => Settlement::Unknown,
        })
    }
}
