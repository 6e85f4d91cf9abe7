#![allow(dead_code)]

use async_trait::async_trait;
use crm_access::{
    AccessGate, MemoryStorage, NonEmptyValidator, SessionEvent, SessionStorage, SessionStore,
    StorageError,
};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// Storage whose reads block until `release` is notified.
#[derive(Default)]
pub struct HeldStorage {
    pub inner: MemoryStorage,
    pub release: Notify,
}

#[async_trait]
impl SessionStorage for HeldStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.release.notified().await;
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.inner.set(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.inner.remove(key).await
    }
}

/// Storage that fails every operation.
pub struct BrokenStorage;

#[async_trait]
impl SessionStorage for BrokenStorage {
    async fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::Unavailable("disk offline".to_string()))
    }

    async fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable("disk offline".to_string()))
    }

    async fn remove(&self, _key: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable("disk offline".to_string()))
    }
}

pub fn store_over(storage: Arc<dyn SessionStorage>) -> Arc<SessionStore> {
    Arc::new(SessionStore::new(storage, Arc::new(NonEmptyValidator)))
}

pub fn gate_over(store: &Arc<SessionStore>) -> Arc<AccessGate> {
    Arc::new(AccessGate::new(store.clone()))
}

pub fn record_events(
    store: &SessionStore,
) -> (Arc<Mutex<Vec<SessionEvent>>>, crm_access::Subscription) {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sub = {
        let events = events.clone();
        store.subscribe(move |event| events.lock().unwrap().push(*event))
    };
    (events, sub)
}
