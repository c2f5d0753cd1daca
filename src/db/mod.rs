//! Database module for the marketplace server
//!
//! Store traits, the Postgres implementation, the in-memory fixture
//! store and the schema contract both are checked against.

pub mod fixture;
pub mod models;
pub mod operations;
pub mod schema;
pub mod store;

pub use fixture::FixtureStore;
pub use models::{EventRecord, NewUser, PublicUser, StoryRecord, User, Vendor, VendorFilter};
pub use operations::PgStore;
pub use store::{CatalogStore, SchemaInspector, UserStore};
