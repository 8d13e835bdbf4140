//! PostgreSQL repository implementations.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DbErr, EntityTrait, QueryFilter, TransactionError,
    TransactionTrait,
};
use uuid::Uuid;

use blog_core::domain::{Author, User};
use blog_core::error::RepoError;
use blog_core::ports::{AuthorRepository, PostRepository, UserRepository};

use super::entity::author::{self, Entity as AuthorEntity};
use super::entity::post::Entity as PostEntity;
use super::entity::user::{self, Entity as UserEntity};
use super::mask_email;
use super::postgres_base::{PostgresBaseRepository, map_db_err};

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// PostgreSQL author repository.
pub type PostgresAuthorRepository = PostgresBaseRepository<AuthorEntity>;

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(user_email = %mask_email(email), "Finding user by email");

        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }
}

#[async_trait]
impl AuthorRepository for PostgresAuthorRepository {
    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<Author>, RepoError> {
        let result = AuthorEntity::find()
            .filter(author::Column::UserId.eq(user_id))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Author>, RepoError> {
        tracing::debug!(author_email = %mask_email(email), "Finding author by email");

        let result = AuthorEntity::find()
            .filter(author::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn register(&self, user: User, author: Author) -> Result<Author, RepoError> {
        let user_model: user::ActiveModel = user.into();
        let author_model: author::ActiveModel = author.into();

        let created = self
            .db
            .transaction::<_, author::Model, DbErr>(|txn| {
                Box::pin(async move {
                    user_model.insert(txn).await?;
                    author_model.insert(txn).await
                })
            })
            .await
            .map_err(|e| match e {
                TransactionError::Connection(e) => map_db_err(e),
                TransactionError::Transaction(e) => map_db_err(e),
            })?;

        tracing::info!(author_id = %created.id, "Registered author");
        Ok(created.into())
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {}
