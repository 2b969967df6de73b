//! Storage trait definition

use std::fmt::Debug;

use async_trait::async_trait;

use crate::domain::DomainError;

use super::entity::{StorageEntity, StorageKey};

/// Predicate used by [`Storage::find`]
pub type Filter<'a, E> = &'a (dyn Fn(&E) -> bool + Send + Sync);

/// In-place edit applied by [`Storage::update_with`]; an error aborts the write
pub type Mutator<'a, E> = Box<dyn FnOnce(&mut E) -> Result<(), DomainError> + Send + 'a>;

/// Generic document store for CRUD operations on any entity type
///
/// Every method may fail with [`DomainError::Storage`] when the backend is
/// unavailable; callers propagate that error unchanged.
#[async_trait]
pub trait Storage<E>: Send + Sync + Debug
where
    E: StorageEntity + 'static,
{
    /// Retrieves an entity by its key
    async fn get(&self, key: &E::Key) -> Result<Option<E>, DomainError>;

    /// Retrieves all entities
    async fn list(&self) -> Result<Vec<E>, DomainError>;

    /// Retrieves every entity matching the filter
    async fn find(&self, filter: Filter<'_, E>) -> Result<Vec<E>, DomainError> {
        Ok(self.list().await?.into_iter().filter(|e| filter(e)).collect())
    }

    /// Creates a new entity, returns error if already exists
    async fn create(&self, entity: E) -> Result<E, DomainError>;

    /// Updates an existing entity, returns error if not found
    async fn update(&self, entity: E) -> Result<E, DomainError>;

    /// Atomically applies `mutate` to the stored entity and persists it.
    ///
    /// No other write to the same key can interleave between the read and the
    /// write. Returns `None` when the key does not exist.
    async fn update_with(
        &self,
        key: &E::Key,
        mutate: Mutator<'_, E>,
    ) -> Result<Option<E>, DomainError>;

    /// Deletes an entity by its key, returning the removed entity
    async fn delete(&self, key: &E::Key) -> Result<Option<E>, DomainError>;

    /// Checks if an entity exists by its key
    async fn exists(&self, key: &E::Key) -> Result<bool, DomainError> {
        Ok(self.get(key).await?.is_some())
    }

    /// Returns the count of entities
    async fn count(&self) -> Result<usize, DomainError> {
        Ok(self.list().await?.len())
    }
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    /// Mock storage with failure injection, read counting and latency
    #[derive(Debug)]
    pub struct MockStorage<E>
    where
        E: StorageEntity,
    {
        entities: Mutex<HashMap<String, E>>,
        failing: AtomicBool,
        reads: AtomicUsize,
        read_delay: Duration,
        write_delay: Duration,
    }

    impl<E> Default for MockStorage<E>
    where
        E: StorageEntity,
    {
        fn default() -> Self {
            Self::new()
        }
    }

    impl<E> MockStorage<E>
    where
        E: StorageEntity,
    {
        pub fn new() -> Self {
            Self {
                entities: Mutex::new(HashMap::new()),
                failing: AtomicBool::new(false),
                reads: AtomicUsize::new(0),
                read_delay: Duration::ZERO,
                write_delay: Duration::ZERO,
            }
        }

        /// Every `get`/`list` sleeps before touching the data
        pub fn with_read_delay(mut self, delay: Duration) -> Self {
            self.read_delay = delay;
            self
        }

        /// Every `update`/`update_with` sleeps before touching the data
        pub fn with_write_delay(mut self, delay: Duration) -> Self {
            self.write_delay = delay;
            self
        }

        pub fn with_entity(self, entity: E) -> Self {
            self.entities
                .lock()
                .unwrap()
                .insert(entity.key().as_str().to_string(), entity);
            self
        }

        /// Makes every subsequent call fail with a storage error
        pub fn set_failing(&self, failing: bool) {
            self.failing.store(failing, Ordering::SeqCst);
        }

        /// Number of `get`/`list` calls that reached the store
        pub fn reads(&self) -> usize {
            self.reads.load(Ordering::SeqCst)
        }

        async fn pause(delay: Duration) {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }

        fn check_error(&self) -> Result<(), DomainError> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(DomainError::storage("store unavailable"));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl<E> Storage<E> for MockStorage<E>
    where
        E: StorageEntity + 'static,
    {
        async fn get(&self, key: &E::Key) -> Result<Option<E>, DomainError> {
            Self::pause(self.read_delay).await;
            self.check_error()?;
            self.reads.fetch_add(1, Ordering::SeqCst);
            Ok(self.entities.lock().unwrap().get(key.as_str()).cloned())
        }

        async fn list(&self) -> Result<Vec<E>, DomainError> {
            Self::pause(self.read_delay).await;
            self.check_error()?;
            self.reads.fetch_add(1, Ordering::SeqCst);
            Ok(self.entities.lock().unwrap().values().cloned().collect())
        }

        async fn create(&self, entity: E) -> Result<E, DomainError> {
            self.check_error()?;
            let key = entity.key().as_str().to_string();
            let mut entities = self.entities.lock().unwrap();

            if entities.contains_key(&key) {
                return Err(DomainError::conflict(format!(
                    "Entity with key '{}' already exists",
                    key
                )));
            }

            entities.insert(key, entity.clone());
            Ok(entity)
        }

        async fn update(&self, entity: E) -> Result<E, DomainError> {
            Self::pause(self.write_delay).await;
            self.check_error()?;
            let key = entity.key().as_str().to_string();
            let mut entities = self.entities.lock().unwrap();

            if !entities.contains_key(&key) {
                return Err(DomainError::not_found(format!(
                    "Entity with key '{}' not found",
                    key
                )));
            }

            entities.insert(key, entity.clone());
            Ok(entity)
        }

        async fn update_with(
            &self,
            key: &E::Key,
            mutate: Mutator<'_, E>,
        ) -> Result<Option<E>, DomainError> {
            Self::pause(self.write_delay).await;
            self.check_error()?;
            let mut entities = self.entities.lock().unwrap();

            let Some(current) = entities.get_mut(key.as_str()) else {
                return Ok(None);
            };

            let mut updated = current.clone();
            mutate(&mut updated)?;
            *current = updated.clone();

            Ok(Some(updated))
        }

        async fn delete(&self, key: &E::Key) -> Result<Option<E>, DomainError> {
            self.check_error()?;
            Ok(self.entities.lock().unwrap().remove(key.as_str()))
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use serde::{Deserialize, Serialize};

        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        struct LabelKey(String);

        impl StorageKey for LabelKey {
            fn as_str(&self) -> &str {
                &self.0
            }
        }

        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        struct Label {
            id: LabelKey,
            color: String,
        }

        impl StorageEntity for Label {
            type Key = LabelKey;

            fn key(&self) -> &Self::Key {
                &self.id
            }
        }

        fn label(id: &str, color: &str) -> Label {
            Label {
                id: LabelKey(id.to_string()),
                color: color.to_string(),
            }
        }

        #[tokio::test]
        async fn test_create_conflict() {
            let storage = MockStorage::new().with_entity(label("1", "red"));

            let result = storage.create(label("1", "blue")).await;
            assert!(matches!(result, Err(DomainError::Conflict { .. })));
        }

        #[tokio::test]
        async fn test_delete_returns_entity() {
            let storage = MockStorage::new().with_entity(label("1", "red"));

            let removed = storage.delete(&LabelKey("1".to_string())).await.unwrap();
            assert_eq!(removed, Some(label("1", "red")));

            let again = storage.delete(&LabelKey("1".to_string())).await.unwrap();
            assert!(again.is_none());
        }

        #[tokio::test]
        async fn test_find_uses_filter() {
            let storage = MockStorage::new()
                .with_entity(label("1", "red"))
                .with_entity(label("2", "blue"));

            let reds = storage.find(&|l: &Label| l.color == "red").await.unwrap();
            assert_eq!(reds, vec![label("1", "red")]);
        }

        #[tokio::test]
        async fn test_update_with_applies_edit() {
            let storage = MockStorage::new().with_entity(label("1", "red"));
            let key = LabelKey("1".to_string());

            let updated = storage
                .update_with(&key, Box::new(|l: &mut Label| {
                    l.color = "green".to_string();
                    Ok(())
                }))
                .await
                .unwrap();
            assert_eq!(updated, Some(label("1", "green")));

            let rejected = storage
                .update_with(&key, Box::new(|_: &mut Label| Err(DomainError::validation("no"))))
                .await;
            assert!(matches!(rejected, Err(DomainError::Validation { .. })));
            assert_eq!(storage.get(&key).await.unwrap(), Some(label("1", "green")));

            let missing = storage
                .update_with(&LabelKey("2".to_string()), Box::new(|_: &mut Label| Ok(())))
                .await
                .unwrap();
            assert!(missing.is_none());
        }

        #[tokio::test]
        async fn test_failing_storage() {
            let storage: MockStorage<Label> = MockStorage::new();
            storage.set_failing(true);

            let result = storage.list().await;
            assert!(matches!(result, Err(DomainError::Storage { .. })));

            storage.set_failing(false);
            assert!(storage.list().await.unwrap().is_empty());
            assert_eq!(storage.reads(), 1);
        }
    }
}
