use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub mobile_number: Option<String>,
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(new_user: NewUser) -> Self {
        Self {
            id: Uuid::new_v4(),
            full_name: new_user.full_name,
            email: new_user.email,
            password_hash: new_user.password_hash,
            mobile_number: new_user.mobile_number,
            location: new_user.location,
            created_at: Utc::now(),
        }
    }
}

/// A user as the API returns it: everything except the password hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub mobile_number: Option<String>,
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            full_name: user.full_name,
            email: user.email,
            mobile_number: user.mobile_number,
            location: user.location,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub full_name: String,
    pub email: String,
    pub password_hash: String,
    pub mobile_number: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Vendor {
    pub id: Uuid,
    pub name: String,
    pub categories: Vec<String>,
    pub rating: Option<f64>,
    pub price: Option<String>,
    pub location: Option<String>,
    pub portfolio_images: Option<Vec<String>>,
    pub availability: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EventRecord {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub avg_budget: Option<String>,
    pub min_guests: Option<i32>,
    pub max_guests: Option<i32>,
}

/// A community story as far as event-type aggregation cares.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StoryRecord {
    pub id: Uuid,
    pub event_type: Option<String>,
    pub is_published: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VendorFilter {
    pub category: Option<String>,
    pub location: Option<String>,
    pub min_rating: Option<f64>,
}

impl VendorFilter {
    /// In-memory equivalent of the SQL filter in `PgStore::list_vendors`.
    pub fn matches(&self, vendor: &Vendor) -> bool {
        if let Some(category) = &self.category {
            if !vendor.categories.iter().any(|c| c.eq_ignore_ascii_case(category)) {
                return false;
            }
        }
        if let Some(location) = &self.location {
            let wanted = location.to_lowercase();
            match &vendor.location {
                Some(l) if l.to_lowercase().contains(&wanted) => {}
                _ => return false,
            }
        }
        if let Some(min) = self.min_rating {
            if vendor.rating.unwrap_or(0.0) < min {
                return false;
            }
        }
        true
    }
}
