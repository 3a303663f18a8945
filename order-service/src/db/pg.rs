use async_trait::async_trait;
use rust_decimal::Decimal;
use shared::error::{ServiceError, ServiceResult};
use shared::geo::Coordinates;
use shared::models::{Order, OrderItem, OrderStatus, PaymentStatus};
use sqlx::PgPool;
use sqlx::types::Json;

use super::OrderStore;

const COLUMNS: &str = "id, user_id, restaurant_id, items, total_amount, payment_method,
    payment_status, order_status, delivery_address, delivery_latitude, delivery_longitude,
    created_at";

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: String,
    user_id: String,
    restaurant_id: String,
    items: Json<Vec<OrderItem>>,
    total_amount: Decimal,
    payment_method: String,
    payment_status: String,
    order_status: String,
    delivery_address: String,
    delivery_latitude: Option<f64>,
    delivery_longitude: Option<f64>,
    created_at: i64,
}

impl TryFrom<OrderRow> for Order {
    type Error = ServiceError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let payment_status = row
            .payment_status
            .parse::<PaymentStatus>()
            .map_err(|e| ServiceError::Db(e.into()))?;
        let order_status = row
            .order_status
            .parse::<OrderStatus>()
            .map_err(|e| ServiceError::Db(e.into()))?;
        let delivery_location = match (row.delivery_latitude, row.delivery_longitude) {
            (Some(lat), Some(lon)) => Some(Coordinates::new(lat, lon)),
            _ => None,
        };
        Ok(Order {
            id: row.id,
            user_id: row.user_id,
            restaurant_id: row.restaurant_id,
            items: row.items.0,
            total_amount: row.total_amount,
            payment_method: row.payment_method,
            payment_status,
            order_status,
            delivery_address: row.delivery_address,
            delivery_location,
            created_at: row.created_at,
        })
    }
}

fn into_models(rows: Vec<OrderRow>) -> ServiceResult<Vec<Order>> {
    rows.into_iter().map(Order::try_from).collect()
}

/// PostgreSQL-backed store
#[derive(Clone)]
pub struct PgOrderStore {
    pool: PgPool,
}

impl PgOrderStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrderStore for PgOrderStore {
    async fn insert(&self, o: &Order) -> ServiceResult<()> {
        sqlx::query(
            "INSERT INTO orders (id, user_id, restaurant_id, items, total_amount, payment_method,
                payment_status, order_status, delivery_address, delivery_latitude,
                delivery_longitude, created_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
        )
        .bind(&o.id)
        .bind(&o.user_id)
        .bind(&o.restaurant_id)
        .bind(Json(&o.items))
        .bind(o.total_amount)
        .bind(&o.payment_method)
        .bind(o.payment_status.as_str())
        .bind(o.order_status.as_str())
        .bind(&o.delivery_address)
        .bind(o.delivery_location.map(|l| l.latitude))
        .bind(o.delivery_location.map(|l| l.longitude))
        .bind(o.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find(&self, id: &str) -> ServiceResult<Option<Order>> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {COLUMNS} FROM orders WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Order::try_from).transpose()
    }

    async fn list_by_user(&self, user_id: &str) -> ServiceResult<Vec<Order>> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {COLUMNS} FROM orders WHERE user_id = $1 ORDER BY seq"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        into_models(rows)
    }

    async fn list_by_restaurant(
        &self,
        restaurant_id: &str,
        status: Option<OrderStatus>,
    ) -> ServiceResult<Vec<Order>> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {COLUMNS} FROM orders
                WHERE restaurant_id = $1 AND ($2::TEXT IS NULL OR order_status = $2)
                ORDER BY seq"
        ))
        .bind(restaurant_id)
        .bind(status.map(|s| s.as_str()))
        .fetch_all(&self.pool)
        .await?;
        into_models(rows)
    }

    async fn set_status(&self, id: &str, status: OrderStatus) -> ServiceResult<Option<Order>> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "UPDATE orders SET order_status = $1 WHERE id = $2 RETURNING {COLUMNS}"
        ))
        .bind(status.as_str())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Order::try_from).transpose()
    }
}
