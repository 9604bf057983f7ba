// Generic CRUD delegation chain: Actions (HTTP) -> Controller (business)
// -> Repository (storage collaborator).
pub mod actions;
pub mod controller;
pub mod memory;
pub mod repository;
pub mod request;
pub mod validation;

pub use actions::{Actions, ResourceState};
pub use controller::Controller;
pub use memory::{MemoryRepository, MemoryStore};
pub use repository::{Document, Repository, RepositoryProvider};
pub use request::{CrudRequest, QueryParams};
pub use validation::{Validation, Validator};
