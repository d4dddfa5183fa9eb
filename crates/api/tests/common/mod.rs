#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use chrono::Utc;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use alms_api::auth::jwt::JwtConfig;
use alms_api::auth::password::hash_password;
use alms_api::config::{PaymentConfig, ServerConfig, StorageConfig};
use alms_api::router::build_app_router;
use alms_api::state::AppState;
use alms_core::roles::Role;
use alms_db::models::cause::{Cause, CreateCause};
use alms_db::models::user::{CreateUser, User};
use alms_db::repositories::{CauseRepo, UserRepo};
use alms_events::{EmailError, EventBus, Mailer, OutgoingEmail};
use alms_gateway::{
    Checkout, GatewayError, InitializeRequest, PaymentGateway, TransactionStatus,
    VerifiedTransaction,
};
use alms_storage::{ObjectSigner, SignedUrlCache, StorageError};

/// Webhook signing key used by [`test_config`].
pub const TEST_SECRET_KEY: &str = "sk_test_alms";

/// Password given to every user made by [`create_user`].
pub const TEST_PASSWORD: &str = "correct-horse-battery";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        site_url: "http://localhost:5173".to_string(),
        jwt: JwtConfig {
            secret: "test-jwt-secret-that-is-long-enough".to_string(),
            access_ttl: chrono::Duration::minutes(15),
            refresh_ttl: chrono::Duration::days(7),
        },
        payment: PaymentConfig {
            secret_key: TEST_SECRET_KEY.to_string(),
            base_url: "http://gateway.invalid".to_string(),
            callback_url: "http://localhost:5173/donate/verify".to_string(),
            default_currency: "NGN".to_string(),
            timeout_secs: 5,
        },
        storage: StorageConfig {
            url: "http://storage.invalid/storage/v1".to_string(),
            service_key: "service-key".to_string(),
            signed_url_ttl_secs: 3600,
            refresh_margin_secs: 300,
            timeout_secs: 5,
        },
    }
}

// ---------------------------------------------------------------------------
// Fakes
// ---------------------------------------------------------------------------

/// What the fake gateway answers for a reference.
#[derive(Debug, Clone)]
pub enum FakeVerify {
    Paid {
        amount_minor: i64,
        email: String,
        metadata: serde_json::Value,
    },
    Status(TransactionStatus),
    Unavailable,
}

/// In-memory [`PaymentGateway`].
#[derive(Default)]
pub struct FakeGateway {
    pub initialized: Mutex<Vec<InitializeRequest>>,
    outcomes: Mutex<HashMap<String, FakeVerify>>,
    verify_calls: AtomicUsize,
}

impl FakeGateway {
    /// Make `reference` verify as a successful payment.
    pub fn paid(&self, reference: &str, amount_minor: i64, metadata: serde_json::Value) {
        self.set(
            reference,
            FakeVerify::Paid {
                amount_minor,
                email: "payer@example.com".to_string(),
                metadata,
            },
        );
    }

    pub fn set(&self, reference: &str, outcome: FakeVerify) {
        self.outcomes
            .lock()
            .unwrap()
            .insert(reference.to_string(), outcome);
    }

    pub fn verify_calls(&self) -> usize {
        self.verify_calls.load(Ordering::SeqCst)
    }

    pub fn last_initialized(&self) -> Option<InitializeRequest> {
        self.initialized.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    async fn initialize(&self, request: &InitializeRequest) -> Result<Checkout, GatewayError> {
        self.initialized.lock().unwrap().push(request.clone());
        Ok(Checkout {
            authorization_url: format!("https://checkout.test/{}", request.reference),
            access_code: "access_code_test".to_string(),
            reference: request.reference.clone(),
        })
    }

    async fn verify(&self, reference: &str) -> Result<VerifiedTransaction, GatewayError> {
        self.verify_calls.fetch_add(1, Ordering::SeqCst);
        // Widen the window for concurrent verifications to overlap.
        tokio::time::sleep(Duration::from_millis(20)).await;

        let outcome = self.outcomes.lock().unwrap().get(reference).cloned();
        let transaction = |status, amount_minor, email, metadata| VerifiedTransaction {
            id: 1_000_001,
            status,
            reference: reference.to_string(),
            amount_minor,
            currency: "NGN".to_string(),
            paid_at: Some(Utc::now()),
            customer_email: Some(email),
            metadata,
            gateway_response: None,
        };

        match outcome {
            Some(FakeVerify::Paid {
                amount_minor,
                email,
                metadata,
            }) => Ok(transaction(
                TransactionStatus::Success,
                amount_minor,
                email,
                metadata,
            )),
            Some(FakeVerify::Status(status)) => Ok(transaction(
                status,
                10_000,
                "payer@example.com".to_string(),
                serde_json::Value::Null,
            )),
            Some(FakeVerify::Unavailable) => Err(GatewayError::Api {
                status: 503,
                body: "upstream unavailable".to_string(),
            }),
            None => Err(GatewayError::Rejected("Transaction reference not found".to_string())),
        }
    }
}

/// [`ObjectSigner`] that counts calls and returns predictable URLs.
#[derive(Default)]
pub struct FakeSigner {
    calls: AtomicUsize,
}

impl FakeSigner {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ObjectSigner for FakeSigner {
    async fn sign(
        &self,
        bucket: &str,
        path: &str,
        _expires_in: Duration,
    ) -> Result<String, StorageError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(format!("https://files.test/object/sign/{bucket}/{path}?token=t{n}"))
    }
}

/// [`Mailer`] that keeps every message.
#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<OutgoingEmail>>,
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), EmailError> {
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// App construction
// ---------------------------------------------------------------------------

/// The router plus handles on its fakes.
pub struct TestApp {
    pub router: Router,
    pub pool: PgPool,
    pub config: ServerConfig,
    pub gateway: Arc<FakeGateway>,
    pub signer: Arc<FakeSigner>,
    pub mailer: Arc<RecordingMailer>,
    pub event_bus: Arc<EventBus>,
}

impl TestApp {
    /// A fresh clone of the router for one request.
    pub fn app(&self) -> Router {
        self.router.clone()
    }

    /// Sign an access token for `user` without going through login.
    pub async fn token_for(&self, user: &User) -> String {
        let role = Role::from_id(user.role_id).unwrap();
        self.config.jwt.issue_access_token(user.id, role).unwrap()
    }
}

/// Build the full application with fakes for every outbound integration.
///
/// Uses the same [`build_app_router`] as `main.rs`, so tests exercise the
/// production middleware stack.
pub fn build_test_harness(pool: PgPool) -> TestApp {
    let config = test_config();
    let gateway = Arc::new(FakeGateway::default());
    let signer = Arc::new(FakeSigner::default());
    let mailer = Arc::new(RecordingMailer::default());
    let event_bus = Arc::new(EventBus::default());

    let signed_urls = Arc::new(SignedUrlCache::new(
        signer.clone(),
        Duration::from_secs(config.storage.signed_url_ttl_secs),
        Duration::from_secs(config.storage.refresh_margin_secs),
    ));

    let state = AppState {
        pool: pool.clone(),
        config: Arc::new(config.clone()),
        gateway: gateway.clone(),
        signed_urls,
        mailer: mailer.clone(),
        event_bus: Arc::clone(&event_bus),
    };

    let router = build_app_router(state, &config);

    TestApp {
        router,
        pool,
        config,
        gateway,
        signer,
        mailer,
        event_bus,
    }
}

/// Shorthand when a test only needs the router.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_harness(pool).router
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Insert a user with [`TEST_PASSWORD`]. Role ids: 1 admin, 2 moderator, 3 donor.
pub async fn create_user(pool: &PgPool, email: &str, role_id: i64) -> User {
    let input = CreateUser {
        email: email.to_string(),
        password_hash: hash_password(TEST_PASSWORD).expect("hashing should succeed"),
        full_name: "Test User".to_string(),
        phone: None,
        role_id,
    };
    UserRepo::create(pool, &input)
        .await
        .expect("user creation should succeed")
}

/// Insert an active medical cause with the given goal in minor units.
pub async fn create_cause(pool: &PgPool, title: &str, goal_minor: i64) -> Cause {
    let input = CreateCause {
        title: title.to_string(),
        slug: alms_core::cause::slugify(title).unwrap(),
        summary: format!("Help fund {title}"),
        story: None,
        category: "medical".to_string(),
        image_path: None,
        beneficiary_name: None,
        goal_minor,
        currency: "NGN".to_string(),
        is_urgent: false,
        aid_request_id: None,
    };
    CauseRepo::create(pool, &input)
        .await
        .expect("cause creation should succeed")
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn send(app: Router, request: Request<Body>) -> Response {
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response {
    let request = Request::builder()
        .uri(uri)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    json_request(app, Method::POST, uri, body, None).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response {
    json_request(app, Method::POST, uri, body, Some(token)).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response {
    json_request(app, Method::PUT, uri, body, Some(token)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response {
    let request = Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

async fn json_request(
    app: Router,
    method: Method,
    uri: &str,
    body: serde_json::Value,
    token: Option<&str>,
) -> Response {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = builder
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap();
    send(app, request).await
}

/// Collect a response body as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
