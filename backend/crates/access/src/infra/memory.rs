//! In-Memory Document Store
//!
//! Used when no database is configured and by the test suite.

use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::AccessResult;
use crate::infra::document::DocumentStore;

type Collections = HashMap<String, BTreeMap<String, Value>>;

#[derive(Clone, Default)]
pub struct MemoryDocumentStore {
    collections: Arc<RwLock<Collections>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DocumentStore for MemoryDocumentStore {
    async fn get(&self, collection: &str, id: &str) -> AccessResult<Option<Value>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|documents| documents.get(id))
            .cloned())
    }

    async fn find_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> AccessResult<Vec<Value>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|documents| {
                documents
                    .values()
                    .filter(|document| document.get(field) == Some(value))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn list(&self, collection: &str) -> AccessResult<Vec<Value>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|documents| documents.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn put(&self, collection: &str, id: &str, document: Value) -> AccessResult<()> {
        let mut collections = self.collections.write().await;
        collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), document);
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> AccessResult<bool> {
        let mut collections = self.collections.write().await;
        Ok(collections
            .get_mut(collection)
            .is_some_and(|documents| documents.remove(id).is_some()))
    }
}
