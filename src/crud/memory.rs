use async_trait::async_trait;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, RwLock};
use uuid::Uuid;

use crate::crud::repository::{Document, Repository, RepositoryProvider};
use crate::crud::request::QueryParams;
use crate::error::StorageError;

/// In-memory document store: the reference storage collaborator used by the
/// demo server and the test suite. One `MemoryRepository` per collection.
#[derive(Default)]
pub struct MemoryStore {
    collections: Mutex<HashMap<String, Arc<MemoryRepository>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open_repository(&self, collection: &str) -> Arc<MemoryRepository> {
        let mut collections = match self.collections.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        collections
            .entry(collection.to_string())
            .or_insert_with(|| Arc::new(MemoryRepository::default()))
            .clone()
    }
}

impl RepositoryProvider for MemoryStore {
    fn open(&self, collection: &str) -> Arc<dyn Repository> {
        self.open_repository(collection)
    }
}

#[derive(Default)]
pub struct MemoryRepository {
    documents: RwLock<BTreeMap<String, Document>>,
}

impl MemoryRepository {
    fn read(&self) -> std::sync::RwLockReadGuard<'_, BTreeMap<String, Document>> {
        match self.documents.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, BTreeMap<String, Document>> {
        match self.documents.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn insert_new(&self, id: String, mut attributes: Document) -> Result<Document, StorageError> {
        let now = chrono::Utc::now().to_rfc3339();
        attributes.insert("id".to_string(), Value::String(id.clone()));
        attributes.insert("created_at".to_string(), Value::String(now.clone()));
        attributes.insert("updated_at".to_string(), Value::String(now));

        let mut documents = self.write();
        if documents.contains_key(&id) {
            return Err(StorageError::AlreadyExists(id));
        }
        documents.insert(id, attributes.clone());
        Ok(attributes)
    }
}

/// Loose equality between a stored value and a query-string parameter.
/// Strings compare directly; numbers and booleans compare via their
/// canonical text form.
fn matches(value: &Value, want: &str) -> bool {
    match value {
        Value::String(s) => s == want,
        Value::Number(n) => n.to_string() == want,
        Value::Bool(b) => b.to_string() == want,
        _ => false,
    }
}

fn matches_query(document: &Document, query: &QueryParams) -> bool {
    query
        .iter()
        .all(|(field, want)| document.get(field).map(|v| matches(v, want)).unwrap_or(false))
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn create(&self, attributes: Document) -> Result<Document, StorageError> {
        self.insert_new(Uuid::new_v4().to_string(), attributes)
    }

    async fn create_with_id(
        &self,
        id: &str,
        attributes: Document,
    ) -> Result<Document, StorageError> {
        self.insert_new(id.to_string(), attributes)
    }

    async fn create_many(&self, items: Vec<Document>) -> Result<Vec<Document>, StorageError> {
        let mut created = Vec::with_capacity(items.len());
        for item in items {
            created.push(self.insert_new(Uuid::new_v4().to_string(), item)?);
        }
        Ok(created)
    }

    async fn find(&self, query: &QueryParams) -> Result<Vec<Document>, StorageError> {
        Ok(self
            .read()
            .values()
            .filter(|doc| matches_query(doc, query))
            .cloned()
            .collect())
    }

    async fn find_one(&self, query: &QueryParams) -> Result<Option<Document>, StorageError> {
        Ok(self
            .read()
            .values()
            .find(|doc| matches_query(doc, query))
            .cloned())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Document>, StorageError> {
        Ok(self.read().get(id).cloned())
    }

    async fn update(
        &self,
        id: &str,
        attributes: Document,
    ) -> Result<Option<Document>, StorageError> {
        let mut documents = self.write();
        let Some(existing) = documents.get_mut(id) else {
            return Ok(None);
        };
        for (field, value) in attributes {
            if field == "id" || field == "created_at" {
                continue;
            }
            existing.insert(field, value);
        }
        existing.insert(
            "updated_at".to_string(),
            Value::String(chrono::Utc::now().to_rfc3339()),
        );
        Ok(Some(existing.clone()))
    }

    async fn update_or_create(
        &self,
        query: &QueryParams,
        attributes: Document,
    ) -> Result<Option<Document>, StorageError> {
        let existing_id = self
            .read()
            .values()
            .find(|doc| matches_query(doc, query))
            .and_then(|doc| doc.get("id"))
            .and_then(|id| id.as_str().map(str::to_owned));

        match existing_id {
            Some(id) => self.update(&id, attributes).await,
            None => {
                // Fold the query terms into the new document so it satisfies
                // the query it was created from.
                let mut merged = attributes;
                for (field, value) in query {
                    merged
                        .entry(field.clone())
                        .or_insert_with(|| Value::String(value.clone()));
                }
                self.create(merged).await.map(Some)
            }
        }
    }

    async fn delete(&self, id: &str) -> Result<Option<Document>, StorageError> {
        Ok(self.write().remove(id))
    }
}
