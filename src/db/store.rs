//! Storage seams. Handlers and services only see these traits; `PgStore`
//! backs them in production and `FixtureStore` in tests and fixture mode.

use async_trait::async_trait;
use uuid::Uuid;

use crate::db::models::{EventRecord, NewUser, User, Vendor, VendorFilter};
use crate::error::DatabaseError;

pub type StoreResult<T> = std::result::Result<T, DatabaseError>;

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Exact, case-sensitive match on the stored email.
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>>;

    /// Fails with `DatabaseError::Duplicate` when the email is taken.
    async fn create_user(&self, new_user: NewUser) -> StoreResult<User>;
}

#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn list_vendors(&self, filter: &VendorFilter) -> StoreResult<Vec<Vendor>>;

    async fn get_vendor(&self, id: Uuid) -> StoreResult<Option<Vendor>>;

    async fn list_events(&self) -> StoreResult<Vec<EventRecord>>;

    /// Raw `event_type` values of every published community story.
    async fn published_story_event_types(&self) -> StoreResult<Vec<String>>;
}

#[async_trait]
pub trait SchemaInspector: Send + Sync {
    /// Column names of `table`; empty when the table does not exist.
    async fn table_columns(&self, table: &str) -> StoreResult<Vec<String>>;

    /// Up to `limit` rows of `table` as JSON objects.
    async fn sample_rows(&self, table: &str, limit: i64) -> StoreResult<Vec<serde_json::Value>>;
}
