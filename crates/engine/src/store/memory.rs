//! In-memory [`DocumentStore`] used by tests and local runs.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

use super::{CollectionRef, Document, DocumentStore, Fields, StoreError};

/// Stores collections as plain maps keyed by path. Documents get random ids
/// like the hosted provider assigns.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: Mutex<HashMap<String, BTreeMap<String, Fields>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, BTreeMap<String, Fields>>> {
        // A poisoned lock only means another test thread panicked mid-write;
        // the map itself is still usable.
        match self.collections.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Overwrites a single field of a document, bypassing the engine.
    ///
    /// Test hook for simulating drift left behind by a partially failed
    /// mutation from another session.
    pub fn overwrite_field(&self, collection: &CollectionRef, id: &str, field: &str, value: Value) {
        let mut collections = self.lock();
        if let Some(docs) = collections.get_mut(&collection.path())
            && let Some(fields) = docs.get_mut(id)
        {
            fields.insert(field.to_string(), value);
        }
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert(&self, collection: &CollectionRef, fields: Fields) -> Result<String, StoreError> {
        let id = Uuid::new_v4().simple().to_string();
        self.lock()
            .entry(collection.path())
            .or_default()
            .insert(id.clone(), fields);
        Ok(id)
    }

    async fn get(
        &self,
        collection: &CollectionRef,
        id: &str,
    ) -> Result<Option<Document>, StoreError> {
        let collections = self.lock();
        Ok(collections
            .get(&collection.path())
            .and_then(|docs| docs.get(id))
            .map(|fields| Document {
                id: id.to_string(),
                fields: fields.clone(),
            }))
    }

    async fn update(
        &self,
        collection: &CollectionRef,
        id: &str,
        fields: Fields,
    ) -> Result<(), StoreError> {
        let mut collections = self.lock();
        let existing = collections
            .get_mut(&collection.path())
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| StoreError::Missing(format!("{}/{id}", collection.path())))?;
        for (key, value) in fields {
            existing.insert(key, value);
        }
        Ok(())
    }

    async fn delete(&self, collection: &CollectionRef, id: &str) -> Result<(), StoreError> {
        let mut collections = self.lock();
        if let Some(docs) = collections.get_mut(&collection.path()) {
            docs.remove(id);
        }
        Ok(())
    }

    async fn query_eq(
        &self,
        collection: &CollectionRef,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Document>, StoreError> {
        let collections = self.lock();
        Ok(collections
            .get(&collection.path())
            .map(|docs| {
                docs.iter()
                    .filter(|(_, fields)| fields.get(field) == Some(value))
                    .map(|(id, fields)| Document {
                        id: id.clone(),
                        fields: fields.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn list(&self, collection: &CollectionRef) -> Result<Vec<Document>, StoreError> {
        let collections = self.lock();
        Ok(collections
            .get(&collection.path())
            .map(|docs| {
                docs.iter()
                    .map(|(id, fields)| Document {
                        id: id.clone(),
                        fields: fields.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default())
    }
}
