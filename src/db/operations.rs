use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

use crate::db::models::{EventRecord, NewUser, User, Vendor, VendorFilter};
use crate::db::schema::is_dumpable_table;
use crate::db::store::{CatalogStore, SchemaInspector, StoreResult, UserStore};
use crate::error::DatabaseError;

const USER_COLUMNS: &str =
    "id, full_name, email, password_hash, mobile_number, location, created_at";

const VENDOR_COLUMNS: &str = "id, name, categories, rating, price, location, \
     portfolio_images, availability, created_at, updated_at";

const EVENT_COLUMNS: &str =
    "id, name, description, image_url, avg_budget, min_guests, max_guests";

/// Postgres-backed implementation of every store trait.
#[derive(Clone)]
pub struct PgStore {
    pool: Arc<PgPool>,
}

impl PgStore {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    pub async fn new_with_options(
        url: &str,
        max_connections: u32,
        acquire_timeout: Duration,
    ) -> Result<Self, DatabaseError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(acquire_timeout)
            .connect(url)
            .await
            .map_err(|e| DatabaseError::ConnectionError(e.to_string()))?;

        Ok(Self { pool: Arc::new(pool) })
    }

    /// Apply the embedded `migrations/` directory.
    pub async fn migrate(&self) -> Result<(), DatabaseError> {
        sqlx::migrate!("./migrations")
            .run(self.pool.as_ref())
            .await
            .map_err(|e| DatabaseError::QueryError(format!("migration failed: {}", e)))
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE email = $1",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(user)
    }

    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(user)
    }

    async fn create_user(&self, new_user: NewUser) -> StoreResult<User> {
        let user = User::new(new_user);
        let mut transaction = self.pool.begin().await?;

        let result = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (id, full_name, email, password_hash, mobile_number, location, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(user.id)
        .bind(&user.full_name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.mobile_number)
        .bind(&user.location)
        .bind(user.created_at)
        .fetch_one(&mut *transaction)
        .await;

        match result {
            Ok(user) => {
                transaction.commit().await?;
                Ok(user)
            }
            Err(e) => {
                transaction.rollback().await?;
                Err(e.into())
            }
        }
    }
}

#[async_trait]
impl CatalogStore for PgStore {
    async fn list_vendors(&self, filter: &VendorFilter) -> StoreResult<Vec<Vendor>> {
        let vendors = sqlx::query_as::<_, Vendor>(&format!(
            r#"
            SELECT {} FROM vendors
            WHERE ($1::text IS NULL OR EXISTS (
                    SELECT 1 FROM unnest(categories) AS c WHERE lower(c) = lower($1)))
              AND ($2::text IS NULL OR location ILIKE '%' || $2 || '%')
              AND ($3::float8 IS NULL OR COALESCE(rating, 0) >= $3)
            ORDER BY rating DESC NULLS LAST, name
            "#,
            VENDOR_COLUMNS
        ))
        .bind(&filter.category)
        .bind(&filter.location)
        .bind(filter.min_rating)
        .fetch_all(self.pool.as_ref())
        .await?;

        debug!("Fetched {} vendors", vendors.len());
        Ok(vendors)
    }

    async fn get_vendor(&self, id: Uuid) -> StoreResult<Option<Vendor>> {
        let vendor = sqlx::query_as::<_, Vendor>(&format!(
            "SELECT {} FROM vendors WHERE id = $1",
            VENDOR_COLUMNS
        ))
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(vendor)
    }

    async fn list_events(&self) -> StoreResult<Vec<EventRecord>> {
        let events = sqlx::query_as::<_, EventRecord>(&format!(
            "SELECT {} FROM events ORDER BY name",
            EVENT_COLUMNS
        ))
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(events)
    }

    async fn published_story_event_types(&self) -> StoreResult<Vec<String>> {
        let types = sqlx::query_scalar::<_, String>(
            "SELECT event_type FROM community_stories \
             WHERE is_published = true AND event_type IS NOT NULL",
        )
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(types)
    }
}

#[async_trait]
impl SchemaInspector for PgStore {
    async fn table_columns(&self, table: &str) -> StoreResult<Vec<String>> {
        let columns = sqlx::query_scalar::<_, String>(
            "SELECT column_name::text FROM information_schema.columns \
             WHERE table_schema = 'public' AND table_name = $1 \
             ORDER BY ordinal_position",
        )
        .bind(table)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(columns)
    }

    async fn sample_rows(&self, table: &str, limit: i64) -> StoreResult<Vec<serde_json::Value>> {
        // The name is spliced into SQL, so only allow-listed tables get through
        if !is_dumpable_table(table) {
            return Err(DatabaseError::QueryError(format!("unknown table: {}", table)));
        }

        let rows = sqlx::query_scalar::<_, serde_json::Value>(&format!(
            "SELECT row_to_json(t) FROM (SELECT * FROM {} LIMIT $1) t",
            table
        ))
        .bind(limit)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows)
    }
}
