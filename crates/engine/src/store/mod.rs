//! Document-store client contract.
//!
//! Persistence is delegated to a hosted document database; the engine only
//! talks to it through [`DocumentStore`]. The client is constructed at
//! startup and injected, never reached through a global handle.
//!
//! The contract mirrors what the provider actually offers: collections and
//! sub-collections of schemaless documents, CRUD by id, and queries filtered
//! by exact field equality. No range queries, no joins, no cross-collection
//! transactions.
use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

mod memory;

pub use memory::MemoryStore;

/// Field map of a single document.
pub type Fields = Map<String, Value>;

/// Errors a store client can report. The upstream cause is carried as text
/// and never retried by the engine.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("document \"{0}\" does not exist")]
    Missing(String),
    #[error("malformed document \"{id}\": {reason}")]
    Malformed { id: String, reason: String },
}

/// Path of a collection, either top-level (`budgets`) or nested under a
/// document (`budgets/{id}/expenses`).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CollectionRef {
    segments: Vec<String>,
}

impl CollectionRef {
    /// A top-level collection.
    pub fn top(name: &str) -> Self {
        Self {
            segments: vec![name.to_string()],
        }
    }

    /// A sub-collection nested under one of this collection's documents.
    pub fn child(&self, document_id: &str, name: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(document_id.to_string());
        segments.push(name.to_string());
        Self { segments }
    }

    /// Full slash-separated path, e.g. `budgets/abc/expenses`.
    pub fn path(&self) -> String {
        self.segments.join("/")
    }

    /// The collection id itself (last path segment).
    pub fn leaf(&self) -> &str {
        // segments is never empty by construction
        self.segments.last().map(String::as_str).unwrap_or_default()
    }

    /// Path of the document this collection is nested under, if any.
    pub fn parent_document(&self) -> Option<String> {
        if self.segments.len() < 3 {
            return None;
        }
        Some(self.segments[..self.segments.len() - 1].join("/"))
    }
}

/// A stored document: provider-assigned id plus its field map.
#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    pub id: String,
    pub fields: Fields,
}

/// Client for the hosted document database.
///
/// All operations are request/response and suspend the caller until the
/// provider replies. Implementations must not retry on their own.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Persists a new document and returns its assigned id.
    async fn insert(&self, collection: &CollectionRef, fields: Fields) -> Result<String, StoreError>;

    /// Fetches a document by id. `Ok(None)` when it does not exist.
    async fn get(&self, collection: &CollectionRef, id: &str)
    -> Result<Option<Document>, StoreError>;

    /// Merges `fields` into an existing document. Fails with
    /// [`StoreError::Missing`] when the document does not exist.
    async fn update(
        &self,
        collection: &CollectionRef,
        id: &str,
        fields: Fields,
    ) -> Result<(), StoreError>;

    /// Removes a document. Deleting an absent document is not an error; the
    /// provider treats it the same way.
    async fn delete(&self, collection: &CollectionRef, id: &str) -> Result<(), StoreError>;

    /// Returns every document whose `field` equals `value`.
    async fn query_eq(
        &self,
        collection: &CollectionRef,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Document>, StoreError>;

    /// Returns every document in the collection.
    async fn list(&self, collection: &CollectionRef) -> Result<Vec<Document>, StoreError>;
}
