//! The users query surface consumed by dashboard screens.
//!
//! [`UsersApi`] is the port; [`UsersService`] implements it over a
//! [`UserStore`], waiting a fixed delay before each operation to stand in
//! for network latency. Missing records come back as `None` or `false`, so
//! the only errors are storage faults.

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::ApiError;
use crate::filter::UserFilter;
use crate::pagination::{Page, PageRequest};
use crate::record::{DashboardStats, UserRecord, UserStatus};
use crate::storage::KeyValueStorage;
use crate::store::UserStore;

/// Simulated latency for each operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Latency {
    /// Delay before `list_users` resolves.
    pub list: Duration,
    /// Delay before `get_user_by_id` resolves.
    pub get: Duration,
    /// Delay before `get_dashboard_stats` resolves.
    pub stats: Duration,
    /// Delay before `update_status` resolves.
    pub update: Duration,
}

impl Latency {
    /// No delay at all.
    pub const NONE: Self = Self {
        list: Duration::ZERO,
        get: Duration::ZERO,
        stats: Duration::ZERO,
        update: Duration::ZERO,
    };
}

impl Default for Latency {
    fn default() -> Self {
        Self {
            list: Duration::from_millis(500),
            get: Duration::from_millis(300),
            stats: Duration::from_millis(200),
            update: Duration::from_millis(300),
        }
    }
}

/// Domain port for reading and updating users.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UsersApi: Send + Sync {
    /// Returns the users matching `filter`, in storage order.
    ///
    /// An empty filter returns the whole collection.
    async fn list_users(&self, filter: &UserFilter) -> Result<Vec<UserRecord>, ApiError>;

    /// Returns the user with exactly this id, if any.
    async fn get_user_by_id(&self, id: &str) -> Result<Option<UserRecord>, ApiError>;

    /// Returns the dashboard aggregate figures.
    async fn get_dashboard_stats(&self) -> Result<DashboardStats, ApiError>;

    /// Sets a user's status. Returns `false` if the id is unknown.
    async fn update_status(&self, id: &str, status: UserStatus) -> Result<bool, ApiError>;

    /// Returns one page of the users matching `filter`.
    async fn list_users_page(
        &self,
        filter: &UserFilter,
        request: PageRequest,
    ) -> Result<Page<UserRecord>, ApiError> {
        let users = self.list_users(filter).await?;
        Ok(request.paginate(users))
    }
}

/// [`UsersApi`] over a persisted [`UserStore`] with simulated latency.
///
/// Store access is serialized, so an update's read-modify-write of the whole
/// collection cannot interleave with another update.
#[derive(Debug)]
pub struct UsersService<S> {
    store: Mutex<UserStore<S>>,
    latency: Latency,
}

impl<S: KeyValueStorage> UsersService<S> {
    /// Wraps `store`, delaying each operation per `latency`.
    #[must_use]
    pub fn new(store: UserStore<S>, latency: Latency) -> Self {
        Self {
            store: Mutex::new(store),
            latency,
        }
    }

    /// Returns the configured latency profile.
    #[must_use]
    pub const fn latency(&self) -> Latency {
        self.latency
    }

    /// Clears the persisted collection without delay.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Store`] if the storage key cannot be removed.
    pub async fn reset(&self) -> Result<(), ApiError> {
        self.store.lock().await.reset()?;
        Ok(())
    }

    async fn load_after(&self, delay: Duration) -> Result<Vec<UserRecord>, ApiError> {
        tokio::time::sleep(delay).await;
        Ok(self.store.lock().await.load()?)
    }
}

#[async_trait]
impl<S: KeyValueStorage> UsersApi for UsersService<S> {
    async fn list_users(&self, filter: &UserFilter) -> Result<Vec<UserRecord>, ApiError> {
        let users = self.load_after(self.latency.list).await?;
        let matched = filter.apply(users);
        debug!(
            criteria = filter.len(),
            matched = matched.len(),
            "listed users"
        );
        Ok(matched)
    }

    async fn get_user_by_id(&self, id: &str) -> Result<Option<UserRecord>, ApiError> {
        let users = self.load_after(self.latency.get).await?;
        Ok(users.into_iter().find(|user| user.id == id))
    }

    async fn get_dashboard_stats(&self) -> Result<DashboardStats, ApiError> {
        let users = self.load_after(self.latency.stats).await?;
        Ok(DashboardStats::from_users(&users))
    }

    async fn update_status(&self, id: &str, status: UserStatus) -> Result<bool, ApiError> {
        tokio::time::sleep(self.latency.update).await;

        let mut store = self.store.lock().await;
        let mut users = store.load()?;
        let Some(user) = users.iter_mut().find(|user| user.id == id) else {
            debug!(user_id = id, "status update skipped: unknown user");
            return Ok(false);
        };

        let previous = user.status;
        user.status = status;
        store.save(&users)?;
        info!(user_id = id, %previous, %status, "user status updated");
        Ok(true)
    }
}
