use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Author, Post, User};
use crate::error::RepoError;

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Load every entity.
    async fn find_all(&self) -> Result<Vec<T>, RepoError>;

    /// Insert a new entity.
    async fn insert(&self, entity: T) -> Result<T, RepoError>;

    /// Overwrite an existing entity.
    async fn update(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// User repository with domain-specific methods.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    /// Find a user by their email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;
}

/// Author repository.
#[async_trait]
pub trait AuthorRepository: BaseRepository<Author, Uuid> {
    /// Find the author profile linked to a user.
    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<Author>, RepoError>;

    /// Find an author by profile email.
    async fn find_by_email(&self, email: &str) -> Result<Option<Author>, RepoError>;

    /// Create a user and its author profile as one atomic unit.
    ///
    /// Either both rows exist afterwards or neither does.
    async fn register(&self, user: User, author: Author) -> Result<Author, RepoError>;
}

/// Post repository.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {}
