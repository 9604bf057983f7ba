use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use crate::crud::request::QueryParams;
use crate::error::StorageError;

/// A schemaless document, as stored by the collaborator.
pub type Document = serde_json::Map<String, Value>;

/// Storage-facing collaborator behind the Controller.
///
/// Absence is always `Ok(None)`, never an error: the Action layer turns it
/// into an empty 404. Errors are reserved for genuine storage failures.
#[async_trait]
pub trait Repository: Send + Sync {
    async fn create(&self, attributes: Document) -> Result<Document, StorageError>;

    async fn create_with_id(
        &self,
        id: &str,
        attributes: Document,
    ) -> Result<Document, StorageError>;

    async fn create_many(&self, items: Vec<Document>) -> Result<Vec<Document>, StorageError>;

    async fn find(&self, query: &QueryParams) -> Result<Vec<Document>, StorageError>;

    async fn find_one(&self, query: &QueryParams) -> Result<Option<Document>, StorageError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Document>, StorageError>;

    async fn update(&self, id: &str, attributes: Document)
        -> Result<Option<Document>, StorageError>;

    async fn update_or_create(
        &self,
        query: &QueryParams,
        attributes: Document,
    ) -> Result<Option<Document>, StorageError>;

    async fn delete(&self, id: &str) -> Result<Option<Document>, StorageError>;
}

/// Opens a `Repository` for a named collection. Route discovery calls this
/// once per discovered URL segment.
pub trait RepositoryProvider: Send + Sync {
    fn open(&self, collection: &str) -> Arc<dyn Repository>;
}
