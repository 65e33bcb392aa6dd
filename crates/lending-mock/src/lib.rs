//! Mock data layer for the lending admin dashboard.
//!
//! This crate stands in for a lending back office. It generates a believable
//! user dataset, persists it in key-value storage, and serves it through an
//! async query surface that simulates network latency.
//!
//! # Overview
//!
//! The crate supports:
//!
//! - Seeded or random generation of user records with guarantors
//! - A store that generates once and then serves the persisted collection
//! - Listing with partial field filters and pagination
//! - Lookups, status updates, and dashboard aggregate figures
//! - A per-record cache for the details screen
//! - Mock sign-in with email and password validation
//!
//! # Example
//!
//! ```
//! use lending_mock::{
//!     Latency, MemoryStorage, RecordGenerator, UserField, UserFilter, UserStatus, UserStore,
//!     UsersApi, UsersService,
//! };
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let store = UserStore::new(MemoryStorage::new(), RecordGenerator::seeded(42, 50));
//! let api = UsersService::new(store, Latency::NONE);
//!
//! let active = api
//!     .list_users(&UserFilter::new().with(UserField::Status, UserStatus::Active))
//!     .await
//!     .expect("list succeeds");
//!
//! assert!(active.iter().all(|user| user.status == UserStatus::Active));
//! # }
//! ```

mod atomic_io;
mod cache;
mod config;
mod error;
mod filter;
mod generator;
mod pagination;
mod query;
mod record;
mod session;
mod storage;
mod store;

pub use cache::{RecordCache, cache_key};
pub use config::MockApiSettings;
pub use error::{
    ApiError, GenerationError, PaginationError, SessionError, SettingsError, StorageError,
    StoreError,
};
pub use filter::{FilterOptions, FilterValue, UserField, UserFilter};
pub use generator::{DEFAULT_USER_COUNT, ID_PREFIX, RecordGenerator, generate_users};
pub use pagination::{DEFAULT_PER_PAGE, PAGE_SIZE_CHOICES, Page, PageRequest};
pub use query::{Latency, UsersApi, UsersService};
pub use record::{DashboardStats, Guarantor, ParseStatusError, UserRecord, UserStatus};
pub use session::{
    AUTH_KEY, LoginCredentials, LoginValidationError, PASSWORD_MIN_LEN, Session, SessionGuard,
};
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage};
pub use store::{USERS_KEY, UserStore};
