//! In-memory store used by tests and by `database.fixture = true`.
//!
//! Every instance owns its own data; nothing here is process-global.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::db::models::{EventRecord, NewUser, StoryRecord, User, Vendor, VendorFilter};
use crate::db::schema::{is_dumpable_table, SCHEMA_CONTRACT};
use crate::db::store::{CatalogStore, SchemaInspector, StoreResult, UserStore};
use crate::error::DatabaseError;

pub const DEMO_EMAIL: &str = "demo@example.com";
pub const DEMO_PASSWORD: &str = "password123";

#[derive(Default)]
pub struct FixtureStore {
    users: RwLock<Vec<User>>,
    vendors: Vec<Vendor>,
    events: Vec<EventRecord>,
    stories: Vec<StoryRecord>,
    /// Columns to hide from `table_columns`, for simulating drift.
    dropped_columns: HashMap<String, Vec<String>>,
}

impl FixtureStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, user: User) -> Self {
        self.users.get_mut().push(user);
        self
    }

    pub fn with_vendor(mut self, vendor: Vendor) -> Self {
        self.vendors.push(vendor);
        self
    }

    pub fn with_event(mut self, event: EventRecord) -> Self {
        self.events.push(event);
        self
    }

    pub fn with_story(mut self, story: StoryRecord) -> Self {
        self.stories.push(story);
        self
    }

    pub fn without_column(mut self, table: &str, column: &str) -> Self {
        self.dropped_columns
            .entry(table.to_string())
            .or_default()
            .push(column.to_string());
        self
    }

    /// A small seeded catalog with one login, for running the server without Postgres.
    pub fn demo() -> crate::Result<Self> {
        let password_hash = bcrypt::hash(DEMO_PASSWORD, bcrypt::DEFAULT_COST)?;
        let now = Utc::now();

        let store = Self::new()
            .with_user(User::new(NewUser {
                full_name: "Demo User".into(),
                email: DEMO_EMAIL.into(),
                password_hash,
                mobile_number: Some("9876543210".into()),
                location: Some("Mumbai".into()),
            }))
            .with_vendor(Vendor {
                id: Uuid::new_v4(),
                name: "Lens & Light Studio".into(),
                categories: vec!["Photography".into(), "Videography".into()],
                rating: Some(4.7),
                price: Some("₹45,000".into()),
                location: Some("Mumbai".into()),
                portfolio_images: Some(Vec::new()),
                availability: Some("Weekends".into()),
                created_at: now,
                updated_at: now,
            })
            .with_vendor(Vendor {
                id: Uuid::new_v4(),
                name: "Saffron Caterers".into(),
                categories: vec!["Catering".into()],
                rating: Some(4.2),
                price: Some("₹800 per plate".into()),
                location: Some("Pune".into()),
                portfolio_images: None,
                availability: None,
                created_at: now,
                updated_at: now,
            })
            .with_event(EventRecord {
                id: Uuid::new_v4(),
                name: "Wedding".into(),
                description: Some("Ceremonies and receptions".into()),
                image_url: None,
                avg_budget: Some("₹5,00,000".into()),
                min_guests: Some(100),
                max_guests: Some(1000),
            })
            .with_event(EventRecord {
                id: Uuid::new_v4(),
                name: "Birthday Party".into(),
                description: None,
                image_url: None,
                avg_budget: Some("₹50,000".into()),
                min_guests: None,
                max_guests: None,
            })
            .with_story(StoryRecord {
                id: Uuid::new_v4(),
                event_type: Some("Wedding".into()),
                is_published: true,
            });

        Ok(store)
    }
}

#[async_trait]
impl UserStore for FixtureStore {
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn create_user(&self, new_user: NewUser) -> StoreResult<User> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.email == new_user.email) {
            return Err(DatabaseError::Duplicate);
        }

        let user = User::new(new_user);
        users.push(user.clone());
        Ok(user)
    }
}

#[async_trait]
impl CatalogStore for FixtureStore {
    async fn list_vendors(&self, filter: &VendorFilter) -> StoreResult<Vec<Vendor>> {
        Ok(self.vendors.iter().filter(|v| filter.matches(v)).cloned().collect())
    }

    async fn get_vendor(&self, id: Uuid) -> StoreResult<Option<Vendor>> {
        Ok(self.vendors.iter().find(|v| v.id == id).cloned())
    }

    async fn list_events(&self) -> StoreResult<Vec<EventRecord>> {
        Ok(self.events.clone())
    }

    async fn published_story_event_types(&self) -> StoreResult<Vec<String>> {
        Ok(self
            .stories
            .iter()
            .filter(|s| s.is_published)
            .filter_map(|s| s.event_type.clone())
            .collect())
    }
}

#[async_trait]
impl SchemaInspector for FixtureStore {
    async fn table_columns(&self, table: &str) -> StoreResult<Vec<String>> {
        let dropped = self.dropped_columns.get(table);
        let columns: Vec<String> = SCHEMA_CONTRACT
            .iter()
            .find(|(name, _)| *name == table)
            .map(|(_, columns)| {
                columns
                    .iter()
                    .filter(|c| dropped.map_or(true, |d| !d.iter().any(|x| x == *c)))
                    .map(|c| c.to_string())
                    .collect()
            })
            .unwrap_or_default();

        Ok(columns)
    }

    async fn sample_rows(&self, table: &str, limit: i64) -> StoreResult<Vec<serde_json::Value>> {
        if !is_dumpable_table(table) {
            return Err(DatabaseError::QueryError(format!("unknown table: {}", table)));
        }

        let limit = usize::try_from(limit).unwrap_or(0);
        let rows: Result<Vec<serde_json::Value>, serde_json::Error> = match table {
            "vendors" => self.vendors.iter().take(limit).map(serde_json::to_value).collect(),
            "events" => self.events.iter().take(limit).map(serde_json::to_value).collect(),
            _ => self.stories.iter().take(limit).map(serde_json::to_value).collect(),
        };

        rows.map_err(|e| DatabaseError::QueryError(e.to_string()))
    }
}
