use async_trait::async_trait;
use shared::error::{AppError, ErrorCode, ServiceError, ServiceResult};
use shared::geo::Coordinates;
use shared::models::{Restaurant, RestaurantStatus, RestaurantUpdate};
use sqlx::PgPool;

use super::RestaurantStore;

const COLUMNS: &str = "id, owner_id, name, email, phone, address, cuisine_type, description,
    opening_hours, closing_hours, is_open, approved, status, rating, latitude, longitude,
    created_at";

#[derive(sqlx::FromRow)]
struct RestaurantRow {
    id: String,
    owner_id: String,
    name: String,
    email: String,
    phone: String,
    address: String,
    cuisine_type: String,
    description: Option<String>,
    opening_hours: Option<String>,
    closing_hours: Option<String>,
    is_open: bool,
    approved: bool,
    status: String,
    rating: f64,
    latitude: Option<f64>,
    longitude: Option<f64>,
    created_at: i64,
}

impl TryFrom<RestaurantRow> for Restaurant {
    type Error = ServiceError;

    fn try_from(row: RestaurantRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse::<RestaurantStatus>()
            .map_err(|e| ServiceError::Db(e.into()))?;
        let location = match (row.latitude, row.longitude) {
            (Some(lat), Some(lon)) => Some(Coordinates::new(lat, lon)),
            _ => None,
        };
        Ok(Restaurant {
            id: row.id,
            owner_id: row.owner_id,
            name: row.name,
            email: row.email,
            phone: row.phone,
            address: row.address,
            cuisine_type: row.cuisine_type,
            description: row.description,
            opening_hours: row.opening_hours,
            closing_hours: row.closing_hours,
            is_open: row.is_open,
            approved: row.approved,
            status,
            rating: row.rating,
            location,
            created_at: row.created_at,
        })
    }
}

fn into_models(rows: Vec<RestaurantRow>) -> ServiceResult<Vec<Restaurant>> {
    rows.into_iter().map(Restaurant::try_from).collect()
}

fn conflict_on_unique(e: sqlx::Error) -> ServiceError {
    if let sqlx::Error::Database(db) = &e
        && db.is_unique_violation()
    {
        return AppError::with_message(
            ErrorCode::RestaurantAlreadyExists,
            "Restaurant with this email or phone already exists",
        )
        .into();
    }
    e.into()
}

/// PostgreSQL-backed store
#[derive(Clone)]
pub struct PgRestaurantStore {
    pool: PgPool,
}

impl PgRestaurantStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RestaurantStore for PgRestaurantStore {
    async fn insert(&self, r: &Restaurant) -> ServiceResult<()> {
        sqlx::query(
            "INSERT INTO restaurants (id, owner_id, name, email, phone, address, cuisine_type,
                description, opening_hours, closing_hours, is_open, approved, status, rating,
                latitude, longitude, created_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)",
        )
        .bind(&r.id)
        .bind(&r.owner_id)
        .bind(&r.name)
        .bind(&r.email)
        .bind(&r.phone)
        .bind(&r.address)
        .bind(&r.cuisine_type)
        .bind(&r.description)
        .bind(&r.opening_hours)
        .bind(&r.closing_hours)
        .bind(r.is_open)
        .bind(r.approved)
        .bind(r.status.as_str())
        .bind(r.rating)
        .bind(r.location.map(|l| l.latitude))
        .bind(r.location.map(|l| l.longitude))
        .bind(r.created_at)
        .execute(&self.pool)
        .await
        .map_err(conflict_on_unique)?;
        Ok(())
    }

    async fn find(&self, id: &str) -> ServiceResult<Option<Restaurant>> {
        let row = sqlx::query_as::<_, RestaurantRow>(&format!(
            "SELECT {COLUMNS} FROM restaurants WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Restaurant::try_from).transpose()
    }

    async fn find_by_contact(
        &self,
        email: &str,
        phone: &str,
    ) -> ServiceResult<Option<Restaurant>> {
        let row = sqlx::query_as::<_, RestaurantRow>(&format!(
            "SELECT {COLUMNS} FROM restaurants WHERE email = $1 OR phone = $2 ORDER BY seq LIMIT 1"
        ))
        .bind(email)
        .bind(phone)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Restaurant::try_from).transpose()
    }

    async fn phone_in_use(&self, phone: &str, except_id: &str) -> ServiceResult<bool> {
        let row: (bool,) = sqlx::query_as(
            "SELECT EXISTS (SELECT 1 FROM restaurants WHERE phone = $1 AND id <> $2)",
        )
        .bind(phone)
        .bind(except_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.0)
    }

    async fn list_by_owner(&self, owner_id: &str) -> ServiceResult<Vec<Restaurant>> {
        let rows = sqlx::query_as::<_, RestaurantRow>(&format!(
            "SELECT {COLUMNS} FROM restaurants WHERE owner_id = $1 ORDER BY seq"
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;
        into_models(rows)
    }

    async fn owner_exists(&self, owner_id: &str) -> ServiceResult<bool> {
        let row: (bool,) =
            sqlx::query_as("SELECT EXISTS (SELECT 1 FROM restaurants WHERE owner_id = $1)")
                .bind(owner_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(row.0)
    }

    async fn list_all(&self) -> ServiceResult<Vec<Restaurant>> {
        let rows = sqlx::query_as::<_, RestaurantRow>(&format!(
            "SELECT {COLUMNS} FROM restaurants ORDER BY seq"
        ))
        .fetch_all(&self.pool)
        .await?;
        into_models(rows)
    }

    async fn list_discoverable(&self) -> ServiceResult<Vec<Restaurant>> {
        let rows = sqlx::query_as::<_, RestaurantRow>(&format!(
            "SELECT {COLUMNS} FROM restaurants
                WHERE approved AND status = 'approved' AND is_open
                  AND latitude IS NOT NULL AND longitude IS NOT NULL
                ORDER BY seq"
        ))
        .fetch_all(&self.pool)
        .await?;
        into_models(rows)
    }

    async fn set_review(
        &self,
        id: &str,
        status: RestaurantStatus,
    ) -> ServiceResult<Option<Restaurant>> {
        let row = sqlx::query_as::<_, RestaurantRow>(&format!(
            "UPDATE restaurants SET status = $1, approved = $2 WHERE id = $3 RETURNING {COLUMNS}"
        ))
        .bind(status.as_str())
        .bind(status == RestaurantStatus::Approved)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Restaurant::try_from).transpose()
    }

    async fn apply_update(
        &self,
        id: &str,
        patch: &RestaurantUpdate,
    ) -> ServiceResult<Option<Restaurant>> {
        let row = sqlx::query_as::<_, RestaurantRow>(&format!(
            "UPDATE restaurants SET
                name          = COALESCE($2, name),
                phone         = COALESCE($3, phone),
                address       = COALESCE($4, address),
                cuisine_type  = COALESCE($5, cuisine_type),
                description   = COALESCE($6, description),
                opening_hours = COALESCE($7, opening_hours),
                closing_hours = COALESCE($8, closing_hours),
                is_open       = COALESCE($9, is_open),
                latitude      = COALESCE($10, latitude),
                longitude     = COALESCE($11, longitude)
                WHERE id = $1
                RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(&patch.name)
        .bind(&patch.phone)
        .bind(&patch.address)
        .bind(&patch.cuisine_type)
        .bind(&patch.description)
        .bind(&patch.opening_hours)
        .bind(&patch.closing_hours)
        .bind(patch.is_open)
        .bind(patch.location.map(|l| l.latitude))
        .bind(patch.location.map(|l| l.longitude))
        .fetch_optional(&self.pool)
        .await
        .map_err(conflict_on_unique)?;
        row.map(Restaurant::try_from).transpose()
    }
}
