//! Persistence-backed cache of the user collection.
//!
//! The whole collection lives as one JSON document under [`USERS_KEY`]. The
//! first load in a fresh storage generates and persists the dataset; later
//! loads deserialize what is stored and never regenerate.

use tracing::{debug, info};

use crate::error::StoreError;
use crate::generator::RecordGenerator;
use crate::record::UserRecord;
use crate::storage::KeyValueStorage;

/// Storage key holding the serialized user collection.
pub const USERS_KEY: &str = "lendsqr_users";

/// The authoritative user collection over a [`KeyValueStorage`].
///
/// `UserStore` does no locking of its own. Callers that share it must
/// serialize access; the query service does so with an async mutex.
#[derive(Debug)]
pub struct UserStore<S> {
    storage: S,
    generator: RecordGenerator,
}

impl<S> UserStore<S> {
    /// Creates a store that generates with `generator` when storage is empty.
    #[must_use]
    pub const fn new(storage: S, generator: RecordGenerator) -> Self {
        Self { storage, generator }
    }

    /// Returns the underlying storage.
    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }
}

impl<S: KeyValueStorage> UserStore<S> {
    /// Returns the persisted collection, generating it on first access.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Corrupt`] if the stored value is not a valid
    /// collection, or a storage or generation error.
    ///
    /// # Example
    ///
    /// ```
    /// use lending_mock::{MemoryStorage, RecordGenerator, UserStore};
    ///
    /// let mut store = UserStore::new(MemoryStorage::new(), RecordGenerator::seeded(1, 10));
    /// let first = store.load().expect("load");
    /// let second = store.load().expect("load");
    ///
    /// assert_eq!(first.len(), 10);
    /// assert_eq!(first, second);
    /// ```
    pub fn load(&mut self) -> Result<Vec<UserRecord>, StoreError> {
        if let Some(json) = self.storage.get_item(USERS_KEY)? {
            let users: Vec<UserRecord> =
                serde_json::from_str(&json).map_err(|err| StoreError::Corrupt {
                    key: USERS_KEY.to_owned(),
                    message: err.to_string(),
                })?;
            debug!(user_count = users.len(), "loaded persisted users");
            return Ok(users);
        }

        let users = self.generator.generate()?;
        self.save(&users)?;
        info!(user_count = users.len(), "generated mock user dataset");
        Ok(users)
    }

    /// Replaces the persisted collection with `users`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if serialization or the storage write fails.
    pub fn save(&self, users: &[UserRecord]) -> Result<(), StoreError> {
        let json = serde_json::to_string(users).map_err(|err| StoreError::Serialize {
            key: USERS_KEY.to_owned(),
            message: err.to_string(),
        })?;
        self.storage.set_item(USERS_KEY, &json)?;
        Ok(())
    }

    /// Drops the persisted collection so the next load regenerates it.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Storage`] if the key cannot be removed.
    pub fn reset(&self) -> Result<(), StoreError> {
        self.storage.remove_item(USERS_KEY)?;
        info!("mock user dataset cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};

    use super::*;
    use crate::record::UserStatus;
    use crate::storage::MemoryStorage;

    #[fixture]
    fn store() -> UserStore<MemoryStorage> {
        UserStore::new(MemoryStorage::new(), RecordGenerator::seeded(77, 25))
    }

    #[rstest]
    fn first_load_generates_and_persists(mut store: UserStore<MemoryStorage>) {
        let users = store.load().expect("load");

        assert_eq!(users.len(), 25);
        let persisted = store
            .storage()
            .get_item(USERS_KEY)
            .expect("get")
            .expect("collection persisted");
        let decoded: Vec<UserRecord> = serde_json::from_str(&persisted).expect("decode");
        assert_eq!(decoded, users);
    }

    #[rstest]
    fn repeated_loads_return_equal_collections(mut store: UserStore<MemoryStorage>) {
        let first = store.load().expect("first load");
        let second = store.load().expect("second load");

        assert_eq!(first, second);
    }

    #[test]
    fn existing_state_is_returned_without_regenerating() {
        let storage = MemoryStorage::new();
        let mut seeded = RecordGenerator::seeded(5, 3).generate().expect("generated");
        if let Some(user) = seeded.first_mut() {
            user.status = UserStatus::Blacklisted;
        }
        storage
            .set_item(USERS_KEY, &serde_json::to_string(&seeded).expect("encode"))
            .expect("set");

        let mut store = UserStore::new(storage, RecordGenerator::seeded(6, 500));
        let users = store.load().expect("load");

        assert_eq!(users, seeded);
    }

    #[test]
    fn empty_persisted_collection_is_respected() {
        let storage = MemoryStorage::new();
        storage.set_item(USERS_KEY, "[]").expect("set");

        let mut store = UserStore::new(storage, RecordGenerator::seeded(6, 500));

        assert!(store.load().expect("load").is_empty());
    }

    #[rstest]
    #[case::not_json("not json")]
    #[case::wrong_shape(r#"{"users": []}"#)]
    #[case::missing_fields(r#"[{"id": "LSQFf00000000"}]"#)]
    fn corrupt_state_is_reported(#[case] payload: &str) {
        let storage = MemoryStorage::new();
        storage.set_item(USERS_KEY, payload).expect("set");
        let mut store = UserStore::new(storage, RecordGenerator::seeded(6, 5));

        let err = store.load().expect_err("corrupt state must fail");

        assert!(matches!(err, StoreError::Corrupt { ref key, .. } if key == USERS_KEY));
        assert_eq!(
            store.storage().get_item(USERS_KEY).expect("get"),
            Some(payload.to_owned()),
            "corrupt state must not be overwritten"
        );
    }

    #[rstest]
    fn save_overwrites_wholesale(mut store: UserStore<MemoryStorage>) {
        let users = store.load().expect("load");
        let subset: Vec<_> = users.into_iter().take(2).collect();

        store.save(&subset).expect("save");

        assert_eq!(store.load().expect("reload"), subset);
    }

    #[rstest]
    fn reset_triggers_regeneration(mut store: UserStore<MemoryStorage>) {
        let first = store.load().expect("load");
        store.reset().expect("reset");
        let second = store.load().expect("reload");

        assert_eq!(second.len(), first.len());
        assert_ne!(first, second, "the generator has advanced");
    }
}
