use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
use uuid::Uuid;

use blog_core::domain::{Author, Coordinates, Post, User};
use blog_core::error::RepoError;
use blog_core::ports::{AuthorRepository, BaseRepository};

use crate::database::entity::{author, post};
use crate::database::postgres_repo::{PostgresAuthorRepository, PostgresPostRepository};

fn post_model(id: Uuid, author_id: Uuid, lat: Option<f64>, lng: Option<f64>) -> post::Model {
    post::Model {
        id,
        author_id,
        title: "Test Post".to_owned(),
        content: "Content".to_owned(),
        created_at: chrono::Utc::now().into(),
        location_lang: lat,
        location_long: lng,
    }
}

#[tokio::test]
async fn test_find_post_by_id() {
    let post_id = Uuid::new_v4();
    let author_id = Uuid::new_v4();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![post_model(
            post_id,
            author_id,
            Some(12.97),
            Some(77.59),
        )]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    let result: Option<Post> = repo.find_by_id(post_id).await.unwrap();

    let post = result.expect("post should be found");
    assert_eq!(post.title, "Test Post");
    assert_eq!(post.id, post_id);
    assert_eq!(post.author_id, author_id);
    assert_eq!(
        post.location,
        Some(Coordinates {
            latitude: 12.97,
            longitude: 77.59,
        })
    );
}

#[tokio::test]
async fn test_half_set_coordinates_read_as_no_location() {
    let post_id = Uuid::new_v4();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![post_model(post_id, Uuid::new_v4(), Some(1.0), None)]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let post: Post = repo.find_by_id(post_id).await.unwrap().unwrap();

    assert!(post.location.is_none());
}

#[tokio::test]
async fn test_delete_missing_post_is_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results(vec![MockExecResult {
            last_insert_id: 0,
            rows_affected: 0,
        }])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let result = BaseRepository::<Post, Uuid>::delete(&repo, Uuid::new_v4()).await;

    assert!(matches!(result, Err(RepoError::NotFound)));
}

#[tokio::test]
async fn test_find_author_by_user_id() {
    let user = User::new("ada@x.com".to_owned(), "hash".to_owned());
    let expected = Author::new(user.id, "Ada".to_owned(), "ada@x.com".to_owned(), String::new());

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![author::Model {
            id: expected.id,
            user_id: user.id,
            name: expected.name.clone(),
            email: expected.email.clone(),
            bio: String::new(),
            created_at: expected.created_at.into(),
        }]])
        .into_connection();

    let repo = PostgresAuthorRepository::new(db);
    let found = repo.find_by_user_id(user.id).await.unwrap().unwrap();

    assert_eq!(found.id, expected.id);
    assert_eq!(found.name, "Ada");
}

#[tokio::test]
async fn test_find_all_posts_orders_by_creation() {
    let author_id = Uuid::new_v4();
    let first = post_model(Uuid::new_v4(), author_id, None, None);
    let second = post_model(Uuid::new_v4(), author_id, None, None);

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![first.clone(), second.clone()]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let posts = BaseRepository::<Post, Uuid>::find_all(&repo).await.unwrap();
    assert_eq!(posts.len(), 2);
    assert_eq!(posts[0].id, first.id);

    let log = repo.db.into_transaction_log();
    let sql = &log[0].statements()[0].sql;
    assert!(sql.contains(r#"ORDER BY "posts"."created_at" ASC"#), "{sql}");
}
