//! In-memory repositories - used when no database is configured, and in tests.
//!
//! All three repositories share one set of tables behind a single async
//! `RwLock`, which lets them enforce the same uniqueness, foreign-key and
//! cascade rules as the PostgreSQL schema.
//! Note: Data is lost on process restart.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use blog_core::domain::{Author, Post, User};
use blog_core::error::RepoError;
use blog_core::ports::{AuthorRepository, BaseRepository, PostRepository, UserRepository};

use super::mask_email;

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    authors: HashMap<Uuid, Author>,
    posts: HashMap<Uuid, Post>,
}

impl Tables {
    fn check_user(&self, user: &User) -> Result<(), RepoError> {
        if self
            .users
            .values()
            .any(|u| u.id != user.id && u.email == user.email)
        {
            return Err(RepoError::Constraint("users.email must be unique".to_string()));
        }
        Ok(())
    }

    fn check_author(&self, author: &Author) -> Result<(), RepoError> {
        if !self.users.contains_key(&author.user_id) {
            return Err(RepoError::Constraint(
                "authors.user_id references a missing user".to_string(),
            ));
        }
        for other in self.authors.values().filter(|a| a.id != author.id) {
            if other.email == author.email {
                return Err(RepoError::Constraint("authors.email must be unique".to_string()));
            }
            if other.user_id == author.user_id {
                return Err(RepoError::Constraint("authors.user_id must be unique".to_string()));
            }
        }
        Ok(())
    }

    fn check_post(&self, post: &Post) -> Result<(), RepoError> {
        if !self.authors.contains_key(&post.author_id) {
            return Err(RepoError::Constraint(
                "posts.author_id references a missing author".to_string(),
            ));
        }
        Ok(())
    }

    fn remove_author(&mut self, id: Uuid) -> bool {
        if self.authors.remove(&id).is_none() {
            return false;
        }
        self.posts.retain(|_, post| post.author_id != id);
        true
    }

    fn remove_user(&mut self, id: Uuid) -> bool {
        if self.users.remove(&id).is_none() {
            return false;
        }
        let owned: Vec<Uuid> = self
            .authors
            .values()
            .filter(|a| a.user_id == id)
            .map(|a| a.id)
            .collect();
        for author_id in owned {
            self.remove_author(author_id);
        }
        true
    }
}

/// Shared in-memory tables backing the repositories below.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn users(&self) -> InMemoryUserRepository {
        InMemoryUserRepository {
            tables: self.tables.clone(),
        }
    }

    pub fn authors(&self) -> InMemoryAuthorRepository {
        InMemoryAuthorRepository {
            tables: self.tables.clone(),
        }
    }

    pub fn posts(&self) -> InMemoryPostRepository {
        InMemoryPostRepository {
            tables: self.tables.clone(),
        }
    }
}

/// In-memory user repository.
pub struct InMemoryUserRepository {
    tables: Arc<RwLock<Tables>>,
}

/// In-memory author repository.
pub struct InMemoryAuthorRepository {
    tables: Arc<RwLock<Tables>>,
}

/// In-memory post repository.
pub struct InMemoryPostRepository {
    tables: Arc<RwLock<Tables>>,
}

#[async_trait]
impl BaseRepository<User, Uuid> for InMemoryUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<User>, RepoError> {
        let tables = self.tables.read().await;
        let mut users: Vec<User> = tables.users.values().cloned().collect();
        users.sort_by_key(|u| u.created_at);
        Ok(users)
    }

    async fn insert(&self, user: User) -> Result<User, RepoError> {
        let mut tables = self.tables.write().await;
        if tables.users.contains_key(&user.id) {
            return Err(RepoError::Constraint("users.id must be unique".to_string()));
        }
        tables.check_user(&user)?;
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update(&self, user: User) -> Result<User, RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&user.id) {
            return Err(RepoError::NotFound);
        }
        tables.check_user(&user)?;
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        if self.tables.write().await.remove_user(id) {
            Ok(())
        } else {
            Err(RepoError::NotFound)
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(user_email = %mask_email(email), "Finding user by email");

        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }
}

#[async_trait]
impl BaseRepository<Author, Uuid> for InMemoryAuthorRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Author>, RepoError> {
        Ok(self.tables.read().await.authors.get(&id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Author>, RepoError> {
        let tables = self.tables.read().await;
        let mut authors: Vec<Author> = tables.authors.values().cloned().collect();
        authors.sort_by_key(|a| a.created_at);
        Ok(authors)
    }

    async fn insert(&self, author: Author) -> Result<Author, RepoError> {
        let mut tables = self.tables.write().await;
        if tables.authors.contains_key(&author.id) {
            return Err(RepoError::Constraint("authors.id must be unique".to_string()));
        }
        tables.check_author(&author)?;
        tables.authors.insert(author.id, author.clone());
        Ok(author)
    }

    async fn update(&self, author: Author) -> Result<Author, RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.authors.contains_key(&author.id) {
            return Err(RepoError::NotFound);
        }
        tables.check_author(&author)?;
        tables.authors.insert(author.id, author.clone());
        Ok(author)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        if self.tables.write().await.remove_author(id) {
            Ok(())
        } else {
            Err(RepoError::NotFound)
        }
    }
}

#[async_trait]
impl AuthorRepository for InMemoryAuthorRepository {
    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<Author>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.authors.values().find(|a| a.user_id == user_id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Author>, RepoError> {
        tracing::debug!(author_email = %mask_email(email), "Finding author by email");

        let tables = self.tables.read().await;
        Ok(tables.authors.values().find(|a| a.email == email).cloned())
    }

    async fn register(&self, user: User, author: Author) -> Result<Author, RepoError> {
        // The write lock spans both inserts, so no reader sees a user without its author.
        let mut tables = self.tables.write().await;
        if tables.users.contains_key(&user.id) {
            return Err(RepoError::Constraint("users.id must be unique".to_string()));
        }
        tables.check_user(&user)?;

        let user_id = user.id;
        tables.users.insert(user_id, user);

        if let Err(e) = tables.check_author(&author) {
            tables.users.remove(&user_id);
            return Err(e);
        }
        tables.authors.insert(author.id, author.clone());

        tracing::info!(author_id = %author.id, "Registered author");
        Ok(author)
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for InMemoryPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        Ok(self.tables.read().await.posts.get(&id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Post>, RepoError> {
        let tables = self.tables.read().await;
        let mut posts: Vec<Post> = tables.posts.values().cloned().collect();
        posts.sort_by_key(|p| p.created_at);
        Ok(posts)
    }

    async fn insert(&self, post: Post) -> Result<Post, RepoError> {
        let mut tables = self.tables.write().await;
        if tables.posts.contains_key(&post.id) {
            return Err(RepoError::Constraint("posts.id must be unique".to_string()));
        }
        tables.check_post(&post)?;
        tables.posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn update(&self, post: Post) -> Result<Post, RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.posts.contains_key(&post.id) {
            return Err(RepoError::NotFound);
        }
        tables.check_post(&post)?;
        tables.posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        match self.tables.write().await.posts.remove(&id) {
            Some(_) => Ok(()),
            None => Err(RepoError::NotFound),
        }
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {}
