#![allow(dead_code)]

use chrono::Utc;
use marketplace_server::db::{EventRecord, NewUser, StoryRecord, User, Vendor};
use marketplace_server::{AppState, CloudinaryClient, FixtureStore, Settings};
use std::sync::Arc;
use uuid::Uuid;

pub const EMAIL: &str = "meera@example.com";
pub const PASSWORD: &str = "sangeet-night";

pub fn settings() -> Settings {
    Settings::new_for_test().expect("Failed to load test config")
}

pub fn user(email: &str, password: &str) -> User {
    User::new(NewUser {
        full_name: "Meera Iyer".into(),
        email: email.into(),
        password_hash: bcrypt::hash(password, 4).expect("hash"),
        mobile_number: Some("9876543210".into()),
        location: Some("Chennai".into()),
    })
}

pub fn vendor(name: &str, categories: &[&str], rating: Option<f64>, price: Option<&str>) -> Vendor {
    let now = Utc::now();
    Vendor {
        id: Uuid::new_v4(),
        name: name.into(),
        categories: categories.iter().map(|c| c.to_string()).collect(),
        rating,
        price: price.map(str::to_string),
        location: Some("Chennai".into()),
        portfolio_images: None,
        availability: None,
        created_at: now,
        updated_at: now,
    }
}

pub fn event(name: &str, avg_budget: Option<&str>) -> EventRecord {
    EventRecord {
        id: Uuid::new_v4(),
        name: name.into(),
        description: None,
        image_url: None,
        avg_budget: avg_budget.map(str::to_string),
        min_guests: None,
        max_guests: None,
    }
}

pub fn story(event_type: &str, is_published: bool) -> StoryRecord {
    StoryRecord {
        id: Uuid::new_v4(),
        event_type: Some(event_type.into()),
        is_published,
    }
}

/// Fixture store with one known login.
pub fn store() -> FixtureStore {
    FixtureStore::new().with_user(user(EMAIL, PASSWORD))
}

/// State over `store`, with the media host at `media_base`.
pub fn state_with(store: FixtureStore, media_base: &str) -> AppState {
    let mut config = settings();
    config.media.api_base = media_base.to_string();
    let media = Arc::new(CloudinaryClient::new(&config.media).expect("media client"));
    AppState::with_store(config, Arc::new(store), media)
}

pub fn state(store: FixtureStore) -> AppState {
    state_with(store, "http://127.0.0.1:9")
}
