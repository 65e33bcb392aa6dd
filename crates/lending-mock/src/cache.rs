//! Per-record cache used by the user details screen.
//!
//! Each record fetched through [`UsersApi`] is copied under `user_{id}` in
//! key-value storage. The copy is never invalidated by the store, so a status
//! change made elsewhere leaves it stale until [`RecordCache::update_status`]
//! or [`RecordCache::evict`] touches it.
//!
//! Ids the backend cannot store under a key are never cached; lookups for
//! them always go to the API.

use tracing::debug;

use crate::error::{ApiError, StorageError, StoreError};
use crate::query::UsersApi;
use crate::record::{UserRecord, UserStatus};
use crate::storage::KeyValueStorage;

/// Storage key for the cached copy of `id`.
#[must_use]
pub fn cache_key(id: &str) -> String {
    format!("user_{id}")
}

/// Read-through cache of single records.
#[derive(Debug, Clone)]
pub struct RecordCache<S> {
    storage: S,
}

impl<S> RecordCache<S> {
    /// Creates a cache over `storage`.
    #[must_use]
    pub const fn new(storage: S) -> Self {
        Self { storage }
    }
}

impl<S: KeyValueStorage> RecordCache<S> {
    /// Returns the cached copy of `id` without consulting the API.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the copy cannot be read or decoded.
    pub fn cached(&self, id: &str) -> Result<Option<UserRecord>, StoreError> {
        let key = cache_key(id);
        let Some(json) = uncacheable_as_none(self.storage.get_item(&key))? else {
            return Ok(None);
        };
        let user = serde_json::from_str(&json).map_err(|err| StoreError::Corrupt {
            key,
            message: err.to_string(),
        })?;
        Ok(Some(user))
    }

    /// Returns the cached copy of `id`, fetching and caching it on a miss.
    ///
    /// Unknown ids are not cached.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the cache or the API fails.
    pub async fn get_or_fetch<A>(&self, api: &A, id: &str) -> Result<Option<UserRecord>, ApiError>
    where
        A: UsersApi + ?Sized,
    {
        if let Some(user) = self.cached(id)? {
            debug!(user_id = id, "record cache hit");
            return Ok(Some(user));
        }

        debug!(user_id = id, "record cache miss");
        let fetched = api.get_user_by_id(id).await?;
        if let Some(user) = &fetched {
            self.put(user)?;
        }
        Ok(fetched)
    }

    /// Updates the status through the API, then refreshes any cached copy.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the API or the cache write fails.
    pub async fn update_status<A>(
        &self,
        api: &A,
        id: &str,
        status: UserStatus,
    ) -> Result<bool, ApiError>
    where
        A: UsersApi + ?Sized,
    {
        let updated = api.update_status(id, status).await?;
        if !updated {
            return Ok(false);
        }
        if let Some(mut user) = self.cached(id)? {
            user.status = status;
            self.put(&user)?;
        }
        Ok(true)
    }

    /// Drops the cached copy of `id`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the key cannot be removed.
    pub fn evict(&self, id: &str) -> Result<(), StoreError> {
        match self.storage.remove_item(&cache_key(id)) {
            Ok(()) | Err(StorageError::InvalidKey { .. }) => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    fn put(&self, user: &UserRecord) -> Result<(), StoreError> {
        let key = cache_key(&user.id);
        let json = serde_json::to_string(user).map_err(|err| StoreError::Serialize {
            key: key.clone(),
            message: err.to_string(),
        })?;
        uncacheable_as_none(self.storage.set_item(&key, &json).map(Some))?;
        Ok(())
    }
}

/// Maps a key the backend rejects onto a cache miss.
fn uncacheable_as_none<T>(
    result: Result<Option<T>, StorageError>,
) -> Result<Option<T>, StorageError> {
    match result {
        Err(StorageError::InvalidKey { key }) => {
            debug!(key = %key, "key not cacheable");
            Ok(None)
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};

    use super::*;
    use crate::generator::RecordGenerator;
    use crate::query::MockUsersApi;
    use crate::storage::MemoryStorage;

    #[fixture]
    fn user() -> UserRecord {
        let mut users = RecordGenerator::seeded(21, 1).generate().expect("generated");
        let mut user = users.pop().expect("one user");
        user.status = UserStatus::Pending;
        user
    }

    #[fixture]
    fn cache() -> RecordCache<MemoryStorage> {
        RecordCache::new(MemoryStorage::new())
    }

    #[test]
    fn keys_are_prefixed_by_user() {
        assert_eq!(cache_key("LSQFfab12cd34"), "user_LSQFfab12cd34");
    }

    #[rstest]
    #[tokio::test]
    async fn miss_fetches_once_then_hits(cache: RecordCache<MemoryStorage>, user: UserRecord) {
        let mut api = MockUsersApi::new();
        let returned = user.clone();
        api.expect_get_user_by_id()
            .times(1)
            .returning(move |_| Ok(Some(returned.clone())));

        let first = cache.get_or_fetch(&api, &user.id).await.expect("first");
        let second = cache.get_or_fetch(&api, &user.id).await.expect("second");

        assert_eq!(first, Some(user.clone()));
        assert_eq!(second, Some(user));
    }

    #[rstest]
    #[tokio::test]
    async fn unknown_ids_are_not_cached(cache: RecordCache<MemoryStorage>) {
        let mut api = MockUsersApi::new();
        api.expect_get_user_by_id().times(2).returning(|_| Ok(None));

        assert_eq!(cache.get_or_fetch(&api, "missing").await.expect("get"), None);
        assert_eq!(cache.get_or_fetch(&api, "missing").await.expect("get"), None);
    }

    #[rstest]
    #[tokio::test]
    async fn update_through_cache_refreshes_copy(
        cache: RecordCache<MemoryStorage>,
        user: UserRecord,
    ) {
        let mut api = MockUsersApi::new();
        let returned = user.clone();
        api.expect_get_user_by_id()
            .times(1)
            .returning(move |_| Ok(Some(returned.clone())));
        api.expect_update_status()
            .times(1)
            .returning(|_, _| Ok(true));
        cache.get_or_fetch(&api, &user.id).await.expect("prime");

        let updated = cache
            .update_status(&api, &user.id, UserStatus::Blacklisted)
            .await
            .expect("update");

        assert!(updated);
        assert_eq!(
            cache.cached(&user.id).expect("cached").map(|u| u.status),
            Some(UserStatus::Blacklisted)
        );
    }

    #[rstest]
    #[tokio::test]
    async fn failed_update_leaves_copy_untouched(
        cache: RecordCache<MemoryStorage>,
        user: UserRecord,
    ) {
        let mut api = MockUsersApi::new();
        let returned = user.clone();
        api.expect_get_user_by_id()
            .times(1)
            .returning(move |_| Ok(Some(returned.clone())));
        api.expect_update_status()
            .times(1)
            .returning(|_, _| Ok(false));
        cache.get_or_fetch(&api, &user.id).await.expect("prime");

        let updated = cache
            .update_status(&api, &user.id, UserStatus::Active)
            .await
            .expect("update");

        assert!(!updated);
        assert_eq!(cache.cached(&user.id).expect("cached"), Some(user));
    }

    #[rstest]
    #[tokio::test]
    async fn evicted_copy_is_refetched(cache: RecordCache<MemoryStorage>, user: UserRecord) {
        let mut api = MockUsersApi::new();
        let returned = user.clone();
        api.expect_get_user_by_id()
            .times(2)
            .returning(move |_| Ok(Some(returned.clone())));

        cache.get_or_fetch(&api, &user.id).await.expect("prime");
        cache.evict(&user.id).expect("evict");
        cache.get_or_fetch(&api, &user.id).await.expect("refetch");
    }

    #[rstest]
    fn corrupt_copy_is_reported(cache: RecordCache<MemoryStorage>) {
        cache
            .storage
            .set_item(&cache_key("abc"), "nope")
            .expect("set");

        let err = cache.cached("abc").expect_err("corrupt");

        assert!(matches!(err, StoreError::Corrupt { ref key, .. } if key == "user_abc"));
    }
}
