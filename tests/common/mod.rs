#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, header};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use batchwise::modules::auth::router::init_auth_router;
use batchwise::modules::batches::router::init_batches_router;
use batchwise::modules::roles::model::{CreateRoleDto, Role};
use batchwise::modules::roles::router::init_roles_router;
use batchwise::modules::roles::service::create_role;
use batchwise::modules::users::model::{CreateUserDto, UserResponse};
use batchwise::modules::users::router::init_users_router;
use batchwise::modules::users::service::create_user;
use batchwise::state::AppState;
use batchwise::store::Store;
use batchwise::store::memory::MemStore;
use batchwise::utils::email::Mailer;
use batchwise_auth::create_access_token;
use batchwise_config::{CorsConfig, JwtConfig, RateLimitConfig};
use batchwise_core::{AppError, RoleName};

/// Mailer that records every token it is asked to send. Never fails.
#[derive(Default)]
pub struct RecordingMailer {
    pub sent_tokens: Mutex<Vec<String>>,
}

impl RecordingMailer {
    pub fn last_token(&self) -> String {
        self.sent_tokens.lock().unwrap().last().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send_password_reset_email(
        &self,
        _to_email: &str,
        _to_name: &str,
        reset_token: &str,
    ) -> Result<(), AppError> {
        self.sent_tokens.lock().unwrap().push(reset_token.to_string());
        Ok(())
    }

    async fn send_verification_email(
        &self,
        _to_email: &str,
        _to_name: &str,
        verification_token: &str,
    ) -> Result<(), AppError> {
        self.sent_tokens
            .lock()
            .unwrap()
            .push(verification_token.to_string());
        Ok(())
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemStore>,
    pub mailer: Arc<RecordingMailer>,
    pub jwt_config: JwtConfig,
}

/// In-memory test app. Rate limiting and CORS layers are left off so
/// `oneshot` requests (which carry no peer address) pass through.
pub fn setup_test_app() -> TestApp {
    let store = Arc::new(MemStore::new());
    let mailer = Arc::new(RecordingMailer::default());
    let jwt_config = JwtConfig {
        secret: "integration-test-secret".to_string(),
        access_token_expiry: 3600,
    };

    let state = AppState {
        store: store.clone(),
        mailer: mailer.clone(),
        jwt_config: jwt_config.clone(),
        cors_config: CorsConfig {
            allowed_origins: vec![],
        },
        rate_limit_config: RateLimitConfig::default(),
    };

    let router = Router::new()
        .nest("/api/auth", init_auth_router())
        .nest("/api/roles", init_roles_router())
        .nest("/api/users", init_users_router())
        .nest("/api/batches", init_batches_router())
        .with_state(state);

    TestApp {
        router,
        store,
        mailer,
        jwt_config,
    }
}

impl TestApp {
    pub async fn seed_role(&self, name: &str) -> Role {
        create_role(
            self.store.as_ref(),
            CreateRoleDto {
                name: name.to_string(),
                description: None,
                permissions: None,
                can_login: None,
            },
        )
        .await
        .unwrap()
    }

    pub async fn seed_user(&self, email: &str, password: &str, role_id: Uuid) -> UserResponse {
        create_user(
            self.store.as_ref(),
            CreateUserDto {
                full_name: "Test User".to_string(),
                email: email.to_string(),
                password: password.to_string(),
                role_id,
                phone: None,
                address: None,
            },
        )
        .await
        .unwrap()
    }

    /// Seeds the role (if needed) plus a user, returning a bearer token.
    pub async fn seed_user_with_token(&self, email: &str, role_name: &str) -> (UserResponse, String) {
        let role = match RoleName::parse(role_name) {
            Some(name) => match self.store.find_role_by_name(name).await.unwrap() {
                Some(role) => role,
                None => self.seed_role(role_name).await,
            },
            None => panic!("unknown role {role_name}"),
        };
        let user = self.seed_user(email, "password123", role.id).await;
        let token = self.token_for(&user);
        (user, token)
    }

    pub fn token_for(&self, user: &UserResponse) -> String {
        create_access_token(user.id, &user.email, user.role_name, &self.jwt_config).unwrap()
    }

    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (axum::http::StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_string(&json).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }
}
