//! Request-level tests against the in-memory repositories.

use std::sync::{Arc, Mutex};

use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use async_trait::async_trait;
use serde_json::{Value, json};
use uuid::Uuid;

use blog_core::domain::Coordinates;
use blog_core::ports::{
    AuthError, BaseRepository, GeocodeError, Geocoder, PasswordService, TokenService,
    UserRepository,
};
use blog_infra::{InMemoryStore, InMemoryTokenBlacklist, JwtConfig, JwtTokenService};

use super::configure_routes;
use crate::state::AppState;

/// Stores passwords as tagged plaintext so tests skip Argon2's cost.
struct PlainPasswords;

impl PasswordService for PlainPasswords {
    fn hash(&self, password: &str) -> Result<String, AuthError> {
        Ok(format!("plain:{password}"))
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        Ok(hash == format!("plain:{password}"))
    }
}

#[derive(Clone, Copy)]
enum Reply {
    Found(Coordinates),
    NoPredictions,
    Malformed,
    NoCoordinates,
    Unreachable,
    Status(u16),
}

/// Queries the stub geocoder received, in order.
type Queries = Arc<Mutex<Vec<String>>>;

struct StubGeocoder {
    reply: Reply,
    queries: Queries,
}

#[async_trait]
impl Geocoder for StubGeocoder {
    async fn geocode(&self, query: &str) -> Result<Option<Coordinates>, GeocodeError> {
        self.queries.lock().unwrap().push(query.to_string());
        match self.reply {
            Reply::Found(coordinates) => Ok(Some(coordinates)),
            Reply::NoPredictions => Err(GeocodeError::NoCandidates),
            Reply::Malformed => Err(GeocodeError::Decode("expected value at line 1".to_string())),
            Reply::NoCoordinates => Ok(None),
            Reply::Unreachable => Err(GeocodeError::Request("connection refused".to_string())),
            Reply::Status(code) => Err(GeocodeError::Status(code)),
        }
    }
}

fn state(store: &InMemoryStore, geocoder: Option<Arc<dyn Geocoder>>) -> AppState {
    AppState {
        users: Arc::new(store.users()),
        authors: Arc::new(store.authors()),
        posts: Arc::new(store.posts()),
        blacklist: Arc::new(InMemoryTokenBlacklist::new()),
        geocoder,
    }
}

fn stub_geocoder(reply: Reply) -> (Option<Arc<dyn Geocoder>>, Queries) {
    let queries = Queries::default();
    let geocoder = StubGeocoder {
        reply,
        queries: queries.clone(),
    };
    (Some(Arc::new(geocoder)), queries)
}

fn token_service() -> Arc<dyn TokenService> {
    Arc::new(JwtTokenService::new(JwtConfig {
        secret: "test-secret-key-for-handler-tests".to_string(),
        ..JwtConfig::default()
    }))
}

macro_rules! app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state))
                .app_data(web::Data::new(token_service()))
                .app_data(web::Data::new(
                    Arc::new(PlainPasswords) as Arc<dyn PasswordService>
                ))
                .configure(configure_routes),
        )
        .await
    };
}

async fn send<S, R, B>(app: &S, req: R) -> (StatusCode, Value)
where
    S: Service<R, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let resp = test::call_service(app, req).await;
    let status = resp.status();
    let body = test::read_body(resp).await;
    let value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, value)
}

async fn register<S, B>(app: &S, name: &str, email: &str) -> Uuid
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/api/authors")
        .set_json(json!({"name": name, "email": email, "password": "secret123"}))
        .to_request();
    let (status, body) = send(app, req).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["author_id"].as_str().unwrap().parse().unwrap()
}

async fn login<S, B>(app: &S, email: &str) -> (String, String)
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/api/login")
        .set_json(json!({"email": email, "password": "secret123"}))
        .to_request();
    let (status, body) = send(app, req).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    (
        body["refresh"].as_str().unwrap().to_string(),
        body["access"].as_str().unwrap().to_string(),
    )
}

fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {token}"))
}

fn create_post(access: &str, body: Value) -> actix_http::Request {
    test::TestRequest::post()
        .uri("/api/posts")
        .insert_header(bearer(access))
        .set_json(body)
        .to_request()
}

async fn make_staff(store: &InMemoryStore, email: &str) {
    let users = store.users();
    let mut user = users.find_by_email(email).await.unwrap().unwrap();
    user.is_staff = true;
    users.update(user).await.unwrap();
}

#[actix_rt::test]
async fn test_register_login_and_post() {
    let store = InMemoryStore::new();
    let app = app!(state(&store, None));

    let ada = register(&app, "Ada", "ada@x.com").await;
    let (_, access) = login(&app, "ada@x.com").await;

    let req = create_post(&access, json!({"title": "Hi", "content": "World"}));
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["author"], ada.to_string());
    assert_eq!(body["title"], "Hi");
    assert!(body["location_lang"].is_null());
    assert!(body["location_long"].is_null());

    let req = test::TestRequest::get().uri("/api/posts").to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[actix_rt::test]
async fn test_duplicate_email_rejected_without_new_records() {
    let store = InMemoryStore::new();
    let app = app!(state(&store, None));
    register(&app, "Ada", "ada@x.com").await;

    let req = test::TestRequest::post()
        .uri("/api/authors")
        .set_json(json!({"name": "Imposter", "email": "ada@x.com", "password": "other"}))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "An author with this email already exists");

    assert_eq!(store.users().find_all().await.unwrap().len(), 1);
    assert_eq!(store.authors().find_all().await.unwrap().len(), 1);
}

#[actix_rt::test]
async fn test_register_requires_name_email_and_password() {
    let store = InMemoryStore::new();
    let app = app!(state(&store, None));

    for body in [
        json!({"name": "Ada", "email": "ada@x.com"}),
        json!({"email": "ada@x.com", "password": "secret123"}),
        json!({"name": "Ada", "email": "", "password": "secret123"}),
    ] {
        let req = test::TestRequest::post()
            .uri("/api/authors")
            .set_json(body)
            .to_request();
        let (status, body) = send(&app, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Please provide name, email, and password");
    }

    assert!(store.users().find_all().await.unwrap().is_empty());
    assert!(store.authors().find_all().await.unwrap().is_empty());
}

#[actix_rt::test]
async fn test_login_rejects_wrong_password_and_unknown_email() {
    let store = InMemoryStore::new();
    let app = app!(state(&store, None));
    register(&app, "Ada", "ada@x.com").await;

    for body in [
        json!({"email": "ada@x.com", "password": "wrong"}),
        json!({"email": "nobody@x.com", "password": "secret123"}),
        json!({}),
    ] {
        let req = test::TestRequest::post().uri("/api/login").set_json(body).to_request();
        let (status, body) = send(&app, req).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Invalid email or password");
    }
}

#[actix_rt::test]
async fn test_author_update_requires_owner_or_staff() {
    let store = InMemoryStore::new();
    let app = app!(state(&store, None));
    let ada = register(&app, "Ada", "ada@x.com").await;
    register(&app, "Brian", "brian@x.com").await;
    register(&app, "Cleo", "cleo@x.com").await;
    make_staff(&store, "cleo@x.com").await;

    let (_, brian) = login(&app, "brian@x.com").await;
    let req = test::TestRequest::patch()
        .uri(&format!("/api/authors/{ada}"))
        .insert_header(bearer(&brian))
        .set_json(json!({"bio": "hijacked"}))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "You cannot edit this author profile.");

    let req = test::TestRequest::delete()
        .uri(&format!("/api/authors/{ada}"))
        .insert_header(bearer(&brian))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "You cannot delete this author profile.");

    let (_, owner) = login(&app, "ada@x.com").await;
    let req = test::TestRequest::patch()
        .uri(&format!("/api/authors/{ada}"))
        .insert_header(bearer(&owner))
        .set_json(json!({"bio": "Mathematician"}))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["bio"], "Mathematician");
    assert_eq!(body["name"], "Ada");

    let (_, staff) = login(&app, "cleo@x.com").await;
    let req = test::TestRequest::put()
        .uri(&format!("/api/authors/{ada}"))
        .insert_header(bearer(&staff))
        .set_json(json!({"name": "Ada Lovelace", "email": "ada@x.com"}))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["name"], "Ada Lovelace");
    assert_eq!(body["bio"], "Mathematician");
}

#[actix_rt::test]
async fn test_put_author_requires_email() {
    let store = InMemoryStore::new();
    let app = app!(state(&store, None));
    let ada = register(&app, "Ada", "ada@x.com").await;
    let (_, access) = login(&app, "ada@x.com").await;

    let req = test::TestRequest::put()
        .uri(&format!("/api/authors/{ada}"))
        .insert_header(bearer(&access))
        .set_json(json!({"name": "Ada"}))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "email: This field is required.");
}

#[actix_rt::test]
async fn test_author_email_change_must_stay_unique() {
    let store = InMemoryStore::new();
    let app = app!(state(&store, None));
    let ada = register(&app, "Ada", "ada@x.com").await;
    register(&app, "Brian", "brian@x.com").await;
    let (_, access) = login(&app, "ada@x.com").await;

    let req = test::TestRequest::patch()
        .uri(&format!("/api/authors/{ada}"))
        .insert_header(bearer(&access))
        .set_json(json!({"email": "brian@x.com"}))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "An author with this email already exists");
}

#[actix_rt::test]
async fn test_unknown_author_is_not_found_before_permission_check() {
    let store = InMemoryStore::new();
    let app = app!(state(&store, None));
    register(&app, "Ada", "ada@x.com").await;
    let (_, access) = login(&app, "ada@x.com").await;

    let req = test::TestRequest::delete()
        .uri(&format!("/api/authors/{}", Uuid::new_v4()))
        .insert_header(bearer(&access))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let req = test::TestRequest::get().uri("/api/authors/not-a-uuid").to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn test_staff_cannot_change_another_authors_post() {
    let store = InMemoryStore::new();
    let app = app!(state(&store, None));
    register(&app, "Ada", "ada@x.com").await;
    register(&app, "Brian", "brian@x.com").await;
    make_staff(&store, "brian@x.com").await;

    let (_, ada) = login(&app, "ada@x.com").await;
    let (_, brian) = login(&app, "brian@x.com").await;

    let (_, post) = send(&app, create_post(&ada, json!({"title": "Hi", "content": "World"}))).await;
    let id = post["id"].as_str().unwrap();

    let req = test::TestRequest::patch()
        .uri(&format!("/api/posts/{id}"))
        .insert_header(bearer(&brian))
        .set_json(json!({"title": "Mine now"}))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "You cannot edit this post. This is Ada's post.");

    let req = test::TestRequest::delete()
        .uri(&format!("/api/posts/{id}"))
        .insert_header(bearer(&brian))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "You cannot delete this post. This is Ada's post.");

    let req = test::TestRequest::put()
        .uri(&format!("/api/posts/{id}"))
        .insert_header(bearer(&ada))
        .set_json(json!({"title": "Hello", "content": "Everyone", "location": "Paris"}))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["title"], "Hello");
    assert!(body["location_lang"].is_null());

    let req = test::TestRequest::delete()
        .uri(&format!("/api/posts/{id}"))
        .insert_header(bearer(&ada))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[actix_rt::test]
async fn test_empty_location_skips_geocoder() {
    let store = InMemoryStore::new();
    let coordinates = Coordinates {
        latitude: 12.97,
        longitude: 77.59,
    };
    let (geocoder, calls) = stub_geocoder(Reply::Found(coordinates));
    let app = app!(state(&store, geocoder));
    register(&app, "Ada", "ada@x.com").await;
    let (_, access) = login(&app, "ada@x.com").await;

    for body in [
        json!({"title": "Hi", "content": "World"}),
        json!({"title": "Hi", "content": "World", "location": ""}),
    ] {
        let (status, body) = send(&app, create_post(&access, body)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert!(body["location_lang"].is_null());
        assert!(body["location_long"].is_null());
    }

    assert_eq!(calls.lock().unwrap().len(), 0);
}

#[actix_rt::test]
async fn test_geocoder_failures_still_create_post() {
    for reply in [
        Reply::NoPredictions,
        Reply::Malformed,
        Reply::NoCoordinates,
        Reply::Unreachable,
        Reply::Status(502),
    ] {
        let store = InMemoryStore::new();
        let (geocoder, calls) = stub_geocoder(reply);
        let app = app!(state(&store, geocoder));
        register(&app, "Ada", "ada@x.com").await;
        let (_, access) = login(&app, "ada@x.com").await;

        let body = json!({"title": "Hi", "content": "World", "location": "Atlantis"});
        let (status, body) = send(&app, create_post(&access, body)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert!(body["location_lang"].is_null());
        assert!(body["location_long"].is_null());
        assert_eq!(calls.lock().unwrap().len(), 1);
    }
}

#[actix_rt::test]
async fn test_geocoded_coordinates_are_persisted() {
    let store = InMemoryStore::new();
    let coordinates = Coordinates {
        latitude: 12.9716,
        longitude: 77.5946,
    };
    let (geocoder, calls) = stub_geocoder(Reply::Found(coordinates));
    let app = app!(state(&store, geocoder));
    register(&app, "Ada", "ada@x.com").await;
    let (_, access) = login(&app, "ada@x.com").await;

    let body = json!({"title": "Hi", "content": "World", "location": "Bengaluru"});
    let (status, body) = send(&app, create_post(&access, body)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(calls.lock().unwrap().len(), 1);

    let id: Uuid = body["id"].as_str().unwrap().parse().unwrap();
    let stored = store.posts().find_by_id(id).await.unwrap().unwrap();
    assert_eq!(stored.location, Some(coordinates));
    assert_eq!(body["location_lang"], 12.9716);
    assert_eq!(body["location_long"], 77.5946);
}

#[actix_rt::test]
async fn test_logout_twice_fails() {
    let store = InMemoryStore::new();
    let app = app!(state(&store, None));
    register(&app, "Ada", "ada@x.com").await;
    let (refresh, _) = login(&app, "ada@x.com").await;

    let logout = || {
        test::TestRequest::post()
            .uri("/api/logout")
            .set_json(json!({"refresh": refresh}))
            .to_request()
    };

    let (status, body) = send(&app, logout()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Logged out successfully.");

    let (status, body) = send(&app, logout()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Token is blacklisted");
}

#[actix_rt::test]
async fn test_logout_rejects_garbage_and_access_tokens() {
    let store = InMemoryStore::new();
    let app = app!(state(&store, None));
    register(&app, "Ada", "ada@x.com").await;
    let (_, access) = login(&app, "ada@x.com").await;

    for body in [json!({"refresh": "garbage"}), json!({"refresh": access}), json!({})] {
        let req = test::TestRequest::post().uri("/api/logout").set_json(body).to_request();
        let (status, body) = send(&app, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Token is invalid or expired");
    }
}

#[actix_rt::test]
async fn test_refresh_issues_access_until_logout() {
    let store = InMemoryStore::new();
    let app = app!(state(&store, None));
    register(&app, "Ada", "ada@x.com").await;
    let (refresh, _) = login(&app, "ada@x.com").await;

    let req = test::TestRequest::post()
        .uri("/api/token/refresh")
        .set_json(json!({"refresh": refresh}))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    let access = body["access"].as_str().unwrap().to_string();

    let req = create_post(&access, json!({"title": "Hi", "content": "World"}));
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::CREATED);

    let req = test::TestRequest::post()
        .uri("/api/logout")
        .set_json(json!({"refresh": refresh}))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);

    let req = test::TestRequest::post()
        .uri("/api/token/refresh")
        .set_json(json!({"refresh": refresh}))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Token is blacklisted");
}

#[actix_rt::test]
async fn test_refresh_token_is_not_a_bearer_credential() {
    let store = InMemoryStore::new();
    let app = app!(state(&store, None));
    register(&app, "Ada", "ada@x.com").await;
    let (refresh, _) = login(&app, "ada@x.com").await;

    let req = create_post(&refresh, json!({"title": "Hi", "content": "World"}));
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Given token not valid for any token type");
}

#[actix_rt::test]
async fn test_unauthenticated_writes_rejected() {
    let store = InMemoryStore::new();
    let app = app!(state(&store, None));
    let ada = register(&app, "Ada", "ada@x.com").await;

    let req = test::TestRequest::post()
        .uri("/api/posts")
        .set_json(json!({"title": "Hi", "content": "World"}))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Authentication credentials were not provided.");

    let req = test::TestRequest::delete()
        .uri(&format!("/api/authors/{ada}"))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_rt::test]
async fn test_post_requires_title_and_content() {
    let store = InMemoryStore::new();
    let app = app!(state(&store, None));
    register(&app, "Ada", "ada@x.com").await;
    let (_, access) = login(&app, "ada@x.com").await;

    let (status, body) = send(&app, create_post(&access, json!({"content": "World"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "title: This field is required.");

    let req = create_post(&access, json!({"title": " ", "content": "World"}));
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "title: This field may not be blank.");
}

#[actix_rt::test]
async fn test_deleting_author_removes_posts_and_blocks_new_ones() {
    let store = InMemoryStore::new();
    let app = app!(state(&store, None));
    let ada = register(&app, "Ada", "ada@x.com").await;
    let (_, access) = login(&app, "ada@x.com").await;

    let req = create_post(&access, json!({"title": "Hi", "content": "World"}));
    let (_, post) = send(&app, req).await;
    let id = post["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::delete()
        .uri(&format!("/api/authors/{ada}"))
        .insert_header(bearer(&access))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let req = test::TestRequest::get().uri(&format!("/api/posts/{id}")).to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let req = create_post(&access, json!({"title": "Hi", "content": "Again"}));
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "No author profile is linked to this account.");
}

#[actix_rt::test]
async fn test_malformed_json_is_bad_request() {
    let store = InMemoryStore::new();
    let app = app!(state(&store, None));

    let req = test::TestRequest::post()
        .uri("/api/authors")
        .insert_header(("Content-Type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[actix_rt::test]
async fn test_location_reaches_geocoder_verbatim() {
    let store = InMemoryStore::new();
    let (geocoder, queries) = stub_geocoder(Reply::NoCoordinates);
    let app = app!(state(&store, geocoder));
    register(&app, "Ada", "ada@x.com").await;
    let (_, access) = login(&app, "ada@x.com").await;

    let body = json!({"title": "Hi", "content": "World", "location": "  MG Road, Bengaluru "});
    let (status, _) = send(&app, create_post(&access, body)).await;
    assert_eq!(status, StatusCode::CREATED);

    assert_eq!(*queries.lock().unwrap(), vec!["  MG Road, Bengaluru ".to_string()]);
}
