use axum::{
    Extension, Json, Router,
    extract::State,
    middleware as axum_middleware,
    routing::{get, post},
};
use axum_extra::extract::WithRejection;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::server::config::ServerConfig;
use crate::services::auth_service;
use crate::web::{
    middleware::auth,
    models::{AuthenticatedUser, LoginRequest, LoginResponse, RegisterRequest, UserResponse},
    routes::*,
};

pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;

pub use error::AppError;

#[derive(Clone)]
pub struct AppState {
    pub db_pool: DatabaseConnection,
    pub config: Arc<ServerConfig>,
}

async fn register_handler(
    State(app_state): State<Arc<AppState>>,
    WithRejection(Json(payload), _): WithRejection<Json<RegisterRequest>, AppError>,
) -> Result<Json<UserResponse>, AppError> {
    let user = auth_service::register_user(&app_state.db_pool, payload, app_state.config.bcrypt_cost).await?;
    Ok(Json(user.into()))
}

async fn login_handler(
    State(app_state): State<Arc<AppState>>,
    jar: CookieJar,
    WithRejection(Json(payload), _): WithRejection<Json<LoginRequest>, AppError>,
) -> Result<(CookieJar, Json<LoginResponse>), AppError> {
    let login_response = auth_service::login_user(
        &app_state.db_pool,
        payload,
        &app_state.config.jwt_secret,
        app_state.config.token_ttl(),
    )
    .await?;

    let auth_cookie = Cookie::build((auth::TOKEN_COOKIE, login_response.access_token.clone()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(app_state.config.cookie_secure)
        .build();

    Ok((jar.add(auth_cookie), Json(login_response)))
}

async fn me_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<UserResponse>, AppError> {
    let user = auth_service::get_user(&app_state.db_pool, authenticated_user.id).await?;
    Ok(Json(user.into()))
}

async fn health_check_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "healthy" }))
}

pub fn create_axum_router(db_pool: DatabaseConnection, config: Arc<ServerConfig>) -> Router {
    let app_state = Arc::new(AppState {
        db_pool,
        config: config.clone(),
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let auth_layer = axum_middleware::from_fn_with_state(app_state.clone(), auth::auth);

    let api = Router::new()
        .route("/register", post(register_handler))
        .route("/login", post(login_handler))
        .route("/me", get(me_handler).route_layer(auth_layer.clone()))
        .nest("/todos", todo_routes::create_todos_router().route_layer(auth_layer.clone()))
        .nest("/tags", tag_routes::create_tags_router().route_layer(auth_layer.clone()))
        .nest(
            "/recurring",
            recurring_routes::create_recurring_router().route_layer(auth_layer),
        );

    // axum refuses to nest at the root, so an empty prefix merges instead.
    let prefix = config.api_prefix.trim_matches('/');
    let router = if prefix.is_empty() {
        Router::new().merge(api)
    } else {
        Router::new().nest(&format!("/{prefix}"), api)
    };

    router
        .route("/health", get(health_check_handler))
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::setup_db;
    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode, header};
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    fn test_config(api_prefix: &str) -> Arc<ServerConfig> {
        Arc::new(ServerConfig {
            database_url: "sqlite::memory:".to_string(),
            jwt_secret: "router-test-secret".to_string(),
            access_token_expire_minutes: 30,
            listen_addr: "127.0.0.1:0".to_string(),
            api_prefix: api_prefix.to_string(),
            log_dir: "logs".to_string(),
            max_connections: 1,
            bcrypt_cost: 4,
            cookie_secure: false,
        })
    }

    async fn test_app() -> Router {
        create_axum_router(setup_db().await, test_config("/api/v1"))
    }

    async fn send(app: &Router, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn register_and_login(app: &Router, email: &str) -> String {
        let credentials = json!({ "email": email, "password": "test" });
        let (status, _) = send(app, Method::POST, "/api/v1/register", None, Some(credentials.clone())).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(app, Method::POST, "/api/v1/login", None, Some(credentials)).await;
        assert_eq!(status, StatusCode::OK);
        body["access_token"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_health_is_public_and_unprefixed() {
        let app = test_app().await;
        let (status, body) = send(&app, Method::GET, "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "status": "healthy" }));
    }

    #[tokio::test]
    async fn test_register_login_and_me() {
        let app = test_app().await;
        let credentials = json!({ "email": "test@test.fr", "password": "test" });

        let (status, user) = send(&app, Method::POST, "/api/v1/register", None, Some(credentials.clone())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(user["email"], "test@test.fr");
        assert_eq!(user["is_active"], true);
        assert!(user.get("hashed_password").is_none());

        let (status, body) = send(&app, Method::POST, "/api/v1/register", None, Some(credentials.clone())).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(body["error"].as_str().unwrap().contains("test@test.fr"));

        let (status, login) = send(&app, Method::POST, "/api/v1/login", None, Some(credentials)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(login["token_type"], "bearer");
        let token = login["access_token"].as_str().unwrap();

        let (status, me) = send(&app, Method::GET, "/api/v1/me", Some(token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(me["id"], user["id"]);

        let (status, _) = send(
            &app,
            Method::POST,
            "/api/v1/login",
            None,
            Some(json!({ "email": "test@test.fr", "password": "wrong" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    async fn login_set_cookie(app: &Router, credentials: &Value) -> String {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/v1/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(credentials.to_string()))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        response.headers()[header::SET_COOKIE].to_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_login_cookie_authenticates() {
        let app = test_app().await;
        let credentials = json!({ "email": "cookie@test.fr", "password": "test" });
        send(&app, Method::POST, "/api/v1/register", None, Some(credentials.clone())).await;

        let set_cookie = login_set_cookie(&app, &credentials).await;
        assert!(set_cookie.starts_with("token="));
        assert!(set_cookie.contains("HttpOnly"));
        assert!(!set_cookie.contains("Secure"));

        let cookie_pair = set_cookie.split(';').next().unwrap().to_string();
        let request = Request::builder()
            .uri("/api/v1/me")
            .header(header::COOKIE, cookie_pair)
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_login_cookie_secure_flag_follows_config() {
        let mut config = (*test_config("/api/v1")).clone();
        config.cookie_secure = true;
        let app = create_axum_router(setup_db().await, Arc::new(config));
        let credentials = json!({ "email": "tls@test.fr", "password": "test" });
        send(&app, Method::POST, "/api/v1/register", None, Some(credentials.clone())).await;

        let set_cookie = login_set_cookie(&app, &credentials).await;
        assert!(set_cookie.contains("Secure"));
    }

    #[tokio::test]
    async fn test_protected_routes_require_a_valid_token() {
        let app = test_app().await;

        for uri in ["/api/v1/me", "/api/v1/todos", "/api/v1/tags", "/api/v1/recurring"] {
            let (status, body) = send(&app, Method::GET, uri, None, None).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
            assert!(body["error"].is_string());

            let (status, _) = send(&app, Method::GET, uri, Some("garbage"), None).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
        }
    }

    #[tokio::test]
    async fn test_todo_lifecycle_over_http() {
        let app = test_app().await;
        let alice = register_and_login(&app, "alice@test.fr").await;
        let bob = register_and_login(&app, "bob@test.fr").await;

        let (status, tag) = send(
            &app,
            Method::POST,
            "/api/v1/tags",
            Some(&alice),
            Some(json!({ "name": "Shopping", "color": "#45B7D1" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, todo) = send(
            &app,
            Method::POST,
            "/api/v1/todos",
            Some(&alice),
            Some(json!({
                "title": "Faire les courses, Shopping",
                "priority": 3,
                "due_date": "2024-06-01T10:00:00Z",
                "tag_ids": [tag["id"], 999]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(todo["priority"], 3);
        assert_eq!(todo["completed"], false);
        assert_eq!(todo["tags"], json!([tag]));
        let todo_uri = format!("/api/v1/todos/{}", todo["id"]);

        let (status, found) = send(&app, Method::GET, "/api/v1/todos/search?query=SHOP", Some(&alice), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(found.as_array().unwrap().len(), 1);

        let (status, filtered) = send(
            &app,
            Method::GET,
            "/api/v1/todos/filter?priority=3&due_after=2024-06-01T10:00:00Z",
            Some(&alice),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(filtered.as_array().unwrap().len(), 1);

        let (status, _) = send(&app, Method::GET, &todo_uri, Some(&bob), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = send(&app, Method::DELETE, &todo_uri, Some(&bob), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, updated) = send(
            &app,
            Method::PUT,
            &todo_uri,
            Some(&alice),
            Some(json!({ "completed": true, "due_date": null })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["completed"], true);
        assert_eq!(updated["due_date"], Value::Null);
        assert_eq!(updated["title"], "Faire les courses, Shopping");
        assert_eq!(updated["tags"], todo["tags"]);

        let (status, body) = send(&app, Method::DELETE, &todo_uri, Some(&alice), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(body, Value::Null);
        let (status, _) = send(&app, Method::GET, &todo_uri, Some(&alice), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_malformed_payloads_are_rejected() {
        let app = test_app().await;
        let token = register_and_login(&app, "strict@test.fr").await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/v1/todos",
            Some(&token),
            Some(json!({ "title": "Trop important", "priority": 4 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string(), "{body}");

        let (status, body) = send(&app, Method::GET, "/api/v1/todos/search", Some(&token), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string(), "{body}");

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/v1/recurring",
            Some(&token),
            Some(json!({ "title": "Chaque année", "frequency": "yearly" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string(), "{body}");

        let (status, body) = send(&app, Method::GET, "/api/v1/todos/abc", Some(&token), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string(), "{body}");

        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/v1/tags")
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_recurring_generate_and_soft_delete() {
        let app = test_app().await;
        let token = register_and_login(&app, "recurring@test.fr").await;

        let (status, template) = send(
            &app,
            Method::POST,
            "/api/v1/recurring",
            Some(&token),
            Some(json!({ "title": "Exercice physique", "frequency": "daily" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(template["active"], true);
        let template_uri = format!("/api/v1/recurring/{}", template["id"]);

        let (status, generated) =
            send(&app, Method::POST, &format!("{template_uri}/generate"), Some(&token), None).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(generated["recurring_todo_id"], template["id"]);
        assert_eq!(generated["priority"], 1);

        let (status, _) = send(&app, Method::DELETE, &template_uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (_, listed) = send(&app, Method::GET, "/api/v1/recurring", Some(&token), None).await;
        assert_eq!(listed, json!([]));
        let (status, fetched) = send(&app, Method::GET, &template_uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["active"], false);

        let (_, todos) = send(&app, Method::GET, "/api/v1/todos", Some(&token), None).await;
        assert_eq!(todos.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_root_prefix_mounts_api_at_root() {
        let app = create_axum_router(setup_db().await, test_config("/"));
        let (status, _) = send(
            &app,
            Method::POST,
            "/register",
            None,
            Some(json!({ "email": "root@test.fr", "password": "test" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }
}
