use std::sync::Arc;

use crate::crud::repository::{Document, Repository};
use crate::crud::request::QueryParams;
use crate::error::StorageError;

/// Business-facing layer between Actions and the storage collaborator.
///
/// Every operation is a pure pass-through today; the type exists as the
/// explicit seam where business rules go when a resource outgrows plain
/// CRUD.
pub struct Controller {
    repository: Arc<dyn Repository>,
}

impl Controller {
    pub fn new(repository: Arc<dyn Repository>) -> Self {
        Self { repository }
    }

    pub async fn create(&self, attributes: Document) -> Result<Document, StorageError> {
        self.repository.create(attributes).await
    }

    pub async fn create_with_id(
        &self,
        id: &str,
        attributes: Document,
    ) -> Result<Document, StorageError> {
        self.repository.create_with_id(id, attributes).await
    }

    pub async fn create_many(&self, items: Vec<Document>) -> Result<Vec<Document>, StorageError> {
        self.repository.create_many(items).await
    }

    pub async fn find(&self, query: &QueryParams) -> Result<Vec<Document>, StorageError> {
        self.repository.find(query).await
    }

    pub async fn find_one(&self, query: &QueryParams) -> Result<Option<Document>, StorageError> {
        self.repository.find_one(query).await
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Document>, StorageError> {
        self.repository.find_by_id(id).await
    }

    pub async fn update(
        &self,
        id: &str,
        attributes: Document,
    ) -> Result<Option<Document>, StorageError> {
        self.repository.update(id, attributes).await
    }

    pub async fn update_or_create(
        &self,
        query: &QueryParams,
        attributes: Document,
    ) -> Result<Option<Document>, StorageError> {
        self.repository.update_or_create(query, attributes).await
    }

    pub async fn delete(&self, id: &str) -> Result<Option<Document>, StorageError> {
        self.repository.delete(id).await
    }
}
