//! Router tests against in-memory services.

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use chrono::{NaiveDate, Utc};
use parking_lot::Mutex;
use serde_json::{Value, json};
use std::sync::Arc;
use studio_core::{
    AccountId, AccountProfile, AccountUsage, FixedClock, PaymentRecord, PaymentStatus, Plan,
    SubscriptionRequest, VoiceHistoryEntry,
};
use studio_error::{
    BillingError, BillingErrorKind, StudioResult, SynthesisError, SynthesisErrorKind,
};
use studio_interface::{AccountDirectory, SpeechSynthesizer, SubscriptionLedger, UsageStore};
use studio_quota::{MemoryUsageStore, PolicyTable, QuotaService, SubscriptionConfig};
use studio_server::{ADMIN_KEY_HEADER, AdminKey, ApiState, TokenIssuer, create_router};
use tower::ServiceExt;

const SECRET: &[u8] = b"test-secret";
const ADMIN: &str = "admin-key";
const ADA: &str = "ada@example.com";

struct FakeDirectory {
    profiles: Mutex<Vec<AccountProfile>>,
    store: Arc<MemoryUsageStore>,
}

impl FakeDirectory {
    fn profile(&self, account: AccountId) -> Option<AccountProfile> {
        self.profiles.lock().iter().find(|p| *p.id() == account).cloned()
    }

    fn replace(&self, profile: AccountProfile) {
        let mut profiles = self.profiles.lock();
        profiles.retain(|p| p.id() != profile.id());
        profiles.push(profile);
    }
}

#[async_trait]
impl AccountDirectory for FakeDirectory {
    async fn find_by_email(&self, email: &str) -> StudioResult<Option<AccountProfile>> {
        Ok(self.profiles.lock().iter().find(|p| p.email() == email).cloned())
    }

    async fn voice_history(
        &self,
        account: AccountId,
        limit: i64,
    ) -> StudioResult<Vec<VoiceHistoryEntry>> {
        Ok(self
            .store
            .history(account)
            .into_iter()
            .rev()
            .take(limit as usize)
            .enumerate()
            .map(|(i, text)| VoiceHistoryEntry {
                id: i as i32 + 1,
                text,
                audio_url: None,
                created_at: Utc::now(),
            })
            .collect())
    }
}

struct FakeLedger {
    directory: Arc<FakeDirectory>,
    store: Arc<MemoryUsageStore>,
    payments: Mutex<Vec<PaymentRecord>>,
}

impl FakeLedger {
    fn set_requested(&self, account: AccountId, requested: bool, plan: Option<Plan>) {
        if let Some(p) = self.directory.profile(account) {
            self.directory.replace(AccountProfile::new(
                *p.id(),
                p.name().clone(),
                p.email().clone(),
                plan.unwrap_or(*p.plan()),
                requested,
                *p.created_at(),
            ));
        }
    }

    fn review(&self, payment_id: i32, approve: bool) -> StudioResult<SubscriptionRequest> {
        let mut payments = self.payments.lock();
        let payment = payments
            .iter_mut()
            .find(|p| p.id == payment_id)
            .ok_or_else(|| BillingError::new(BillingErrorKind::RequestNotFound(payment_id)))?;
        let profile = self
            .directory
            .profile(payment.account)
            .ok_or_else(|| BillingError::new(BillingErrorKind::RequestNotFound(payment_id)))?;

        let mut request = SubscriptionRequest {
            payment: payment.clone(),
            account_email: profile.email().clone(),
            account_name: profile.name().clone(),
        };
        if approve {
            request.approve()?;
            self.store.set_plan(payment.account, Plan::Paid)?;
            self.set_requested(payment.account, false, Some(Plan::Paid));
        } else {
            request.deny()?;
            self.set_requested(payment.account, false, None);
        }
        *payment = request.payment.clone();
        Ok(request)
    }
}

#[async_trait]
impl SubscriptionLedger for FakeLedger {
    async fn submit_request(
        &self,
        account: AccountId,
        transaction_id: &str,
        amount: f64,
        price: f64,
    ) -> StudioResult<PaymentRecord> {
        let profile = self
            .directory
            .profile(account)
            .ok_or_else(|| BillingError::new(BillingErrorKind::RequestNotFound(0)))?;
        SubscriptionRequest::validate_submission(&profile, transaction_id, amount, price)?;

        let mut payments = self.payments.lock();
        let record = PaymentRecord {
            id: payments.len() as i32 + 1,
            account,
            amount,
            status: PaymentStatus::Pending,
            transaction_id: Some(transaction_id.to_string()),
            created_at: Utc::now(),
        };
        payments.push(record.clone());
        drop(payments);
        self.set_requested(account, true, None);
        Ok(record)
    }

    async fn list_pending(&self) -> StudioResult<Vec<SubscriptionRequest>> {
        let payments = self.payments.lock().clone();
        Ok(payments
            .into_iter()
            .filter(|p| p.status == PaymentStatus::Pending)
            .filter_map(|payment| {
                let profile = self.directory.profile(payment.account)?;
                Some(SubscriptionRequest {
                    payment,
                    account_email: profile.email().clone(),
                    account_name: profile.name().clone(),
                })
            })
            .collect())
    }

    async fn approve(&self, payment_id: i32) -> StudioResult<SubscriptionRequest> {
        self.review(payment_id, true)
    }

    async fn deny(&self, payment_id: i32) -> StudioResult<SubscriptionRequest> {
        self.review(payment_id, false)
    }

    async fn payment_history(&self, account: AccountId) -> StudioResult<Vec<PaymentRecord>> {
        Ok(self
            .payments
            .lock()
            .iter()
            .filter(|p| p.account == account)
            .cloned()
            .collect())
    }
}

enum StubSynth {
    Audio,
    Failing,
}

#[async_trait]
impl SpeechSynthesizer for StubSynth {
    async fn synthesize(&self, _text: &str) -> StudioResult<Vec<u8>> {
        match self {
            StubSynth::Audio => Ok(b"ID3audio".to_vec()),
            StubSynth::Failing => Err(SynthesisError::new(SynthesisErrorKind::Upstream {
                status: 500,
                body: "boom".to_string(),
            })
            .into()),
        }
    }

    fn provider_name(&self) -> &'static str {
        "stub"
    }
}

struct TestApp {
    router: Router,
    store: Arc<MemoryUsageStore>,
    token: String,
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 10).unwrap()
}

fn app_with(usage: AccountUsage, synth: StubSynth) -> TestApp {
    let store = Arc::new(MemoryUsageStore::new());
    store.insert(AccountId(1), usage);

    let directory = Arc::new(FakeDirectory {
        profiles: Mutex::new(vec![AccountProfile::new(
            AccountId(1),
            "Ada",
            ADA,
            usage.plan,
            false,
            Utc::now(),
        )]),
        store: store.clone(),
    });
    let ledger = Arc::new(FakeLedger {
        directory: directory.clone(),
        store: store.clone(),
        payments: Mutex::new(Vec::new()),
    });

    let usage_store: Arc<dyn UsageStore> = store.clone();
    let quota = Arc::new(QuotaService::new(
        usage_store,
        PolicyTable::default(),
        Arc::new(FixedClock::new(today())),
    ));
    let tokens = TokenIssuer::new(SECRET, 30).unwrap();
    let token = tokens.issue(ADA).unwrap();

    let state = ApiState::new(
        quota,
        directory,
        ledger,
        Arc::new(synth),
        tokens,
        Some(AdminKey::new(ADMIN)),
        SubscriptionConfig::default(),
    );

    TestApp {
        router: create_router(state, &["http://localhost:3000".to_string()]),
        store,
        token,
    }
}

fn app() -> TestApp {
    app_with(AccountUsage::new_free(), StubSynth::Audio)
}

fn words(n: usize) -> String {
    vec!["word"; n].join(" ")
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

fn post_json(uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn admin(method: &str, uri: &str, key: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(key) = key {
        builder = builder.header(ADMIN_KEY_HEADER, key);
    }
    builder.body(Body::empty()).unwrap()
}

fn generate(app: &TestApp, text: &str) -> Request<Body> {
    post_json("/tts/generate-voice", Some(&app.token), json!({ "text": text }))
}

#[tokio::test]
async fn test_health() {
    let app = app();
    let (status, body) = send(&app.router, get("/health", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_me_returns_caller_profile() {
    let usage = AccountUsage {
        lifetime_tokens_used: 40,
        daily_generation_count: 2,
        last_reset_date: NaiveDate::from_ymd_opt(2025, 6, 9),
        ..AccountUsage::new_free()
    };
    let app = app_with(usage, StubSynth::Audio);

    let (status, body) = send(&app.router, get("/auth/me", Some(&app.token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], 1);
    assert_eq!(body["name"], "Ada");
    assert_eq!(body["email"], ADA);
    assert_eq!(body["plan"], "Free");
    assert_eq!(body["daily_voice_count"], 0);
    assert_eq!(body["tokens_used"], 40);
    assert_eq!(body["requested"], false);
    assert!(body["created_at"].is_string());

    let (status, body) = send(&app.router, get("/auth/me", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error_type"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_missing_or_bad_token_is_unauthorized() {
    let app = app();
    let (status, body) = send(&app.router, get("/tts/plan", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error_type"], "UNAUTHORIZED");

    let (status, _) = send(&app.router, get("/tts/plan", Some("garbage"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let stranger = TokenIssuer::new(SECRET, 30).unwrap().issue("nobody@example.com").unwrap();
    let (status, _) = send(&app.router, get("/tts/plan", Some(&stranger))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_generate_charges_words() {
    let app = app();
    let (status, body) = send(&app.router, generate(&app, &words(40))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["words"], 40);
    assert_eq!(body["tokens_used"], 40);
    assert_eq!(body["tokens_remaining"], 260);
    assert_eq!(body["daily_count"], 1);
    assert_eq!(body["limit_reached"], false);
    assert_eq!(body["audio_data"], "SUQzYXVkaW8=");

    let stored = app.store.get(AccountId(1)).unwrap();
    assert_eq!(stored.lifetime_tokens_used, 40);
    assert_eq!(stored.last_reset_date, Some(today()));
}

#[tokio::test]
async fn test_word_limit_is_bad_request() {
    let app = app();
    let (status, body) = send(&app.router, generate(&app, &words(151))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error_type"], "WORD_LIMIT_EXCEEDED");
    assert_eq!(body["tokens_used"], 0);
    assert_eq!(app.store.get(AccountId(1)).unwrap().lifetime_tokens_used, 0);
}

#[tokio::test]
async fn test_token_limit_is_too_many_requests() {
    let usage = AccountUsage {
        lifetime_tokens_used: 280,
        ..AccountUsage::new_free()
    };
    let app = app_with(usage, StubSynth::Audio);
    let (status, body) = send(&app.router, generate(&app, &words(30))).await;

    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error_type"], "TOKEN_LIMIT_EXCEEDED");
    assert_eq!(body["tokens_remaining"], 20);
}

#[tokio::test]
async fn test_daily_limit_is_too_many_requests() {
    let usage = AccountUsage {
        daily_generation_count: 2,
        last_reset_date: Some(today()),
        ..AccountUsage::new_free()
    };
    let app = app_with(usage, StubSynth::Audio);
    let (status, body) = send(&app.router, generate(&app, "hello")).await;

    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error_type"], "DAILY_LIMIT_EXCEEDED");
    assert_eq!(body["daily_count"], 2);
}

#[tokio::test]
async fn test_upstream_failure_charges_nothing() {
    let app = app_with(AccountUsage::new_free(), StubSynth::Failing);
    let (status, body) = send(&app.router, generate(&app, &words(10))).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error_type"], "SYNTHESIS_FAILED");

    let stored = app.store.get(AccountId(1)).unwrap();
    assert_eq!(stored.lifetime_tokens_used, 0);
    assert_eq!(stored.daily_generation_count, 0);
    assert!(app.store.history(AccountId(1)).is_empty());
}

#[tokio::test]
async fn test_blank_text_is_rejected() {
    let app = app();
    let (status, body) = send(&app.router, generate(&app, "   ")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_type"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_plan_info_reflects_usage() {
    let app = app();
    send(&app.router, generate(&app, &words(25))).await;

    let (status, body) = send(&app.router, get("/tts/plan", Some(&app.token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["plan"], "Free");
    assert_eq!(body["max_words_per_request"], 150);
    assert_eq!(body["max_lifetime_tokens"], 300);
    assert_eq!(body["max_daily_generations"], 2);
    assert_eq!(body["tokens_used"], 25);
    assert_eq!(body["tokens_remaining"], 275);
    assert_eq!(body["daily_count"], 1);
    assert_eq!(body["requested"], false);
}

#[tokio::test]
async fn test_history_lists_generations() {
    let app = app();
    send(&app.router, generate(&app, "first text")).await;
    send(&app.router, generate(&app, "second text")).await;

    let (status, body) = send(&app.router, get("/tts/history?limit=1", Some(&app.token))).await;
    assert_eq!(status, StatusCode::OK);
    let entries = body.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["text"], "second text");
}

#[tokio::test]
async fn test_admin_key_required() {
    let app = app();
    let (status, _) = send(&app.router, admin("GET", "/admin/subscription-requests", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(
        &app.router,
        admin("GET", "/admin/subscription-requests", Some("wrong")),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error_type"], "FORBIDDEN");
}

#[tokio::test]
async fn test_subscription_flow_upgrades_plan() {
    let app = app();
    let price = SubscriptionConfig::default().price;

    let (status, body) = send(
        &app.router,
        post_json(
            "/payments/subscription-request",
            Some(&app.token),
            json!({ "transaction_id": "TX-1", "amount": price }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["payment"]["status"], "pending");
    let payment_id = body["payment"]["id"].as_i64().unwrap();

    let (status, body) = send(
        &app.router,
        post_json(
            "/payments/subscription-request",
            Some(&app.token),
            json!({ "transaction_id": "TX-2", "amount": price }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_type"], "ALREADY_REQUESTED");

    let (status, body) = send(
        &app.router,
        admin("GET", "/admin/subscription-requests", Some(ADMIN)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["account_email"], ADA);

    let uri = format!("/admin/subscription-requests/{payment_id}/approve");
    let (status, body) = send(&app.router, admin("POST", &uri, Some(ADMIN))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["request"]["payment"]["status"], "completed");
    assert_eq!(app.store.get(AccountId(1)).unwrap().plan, Plan::Paid);

    let (status, body) = send(&app.router, admin("POST", &uri, Some(ADMIN))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error_type"], "ALREADY_DECIDED");

    let (_, body) = send(&app.router, get("/tts/plan", Some(&app.token))).await;
    assert_eq!(body["plan"], "Paid");
    assert_eq!(body["max_lifetime_tokens"], 800);
    assert_eq!(body["requested"], false);
}

#[tokio::test]
async fn test_wrong_amount_rejected() {
    let app = app();
    let (status, body) = send(
        &app.router,
        post_json(
            "/payments/subscription-request",
            Some(&app.token),
            json!({ "transaction_id": "TX-1", "amount": 1.0 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_type"], "INVALID_AMOUNT");
}

#[tokio::test]
async fn test_deny_accepts_optional_reason() {
    let app = app();
    let price = SubscriptionConfig::default().price;
    send(
        &app.router,
        post_json(
            "/payments/subscription-request",
            Some(&app.token),
            json!({ "transaction_id": "TX-9", "amount": price }),
        ),
    )
    .await;

    let request = Request::builder()
        .method("POST")
        .uri("/admin/subscription-requests/1/deny")
        .header(ADMIN_KEY_HEADER, ADMIN)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({ "reason": "no such transfer" }).to_string()))
        .unwrap();
    let (status, body) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["request"]["payment"]["status"], "failed");
    assert_eq!(app.store.get(AccountId(1)).unwrap().plan, Plan::Free);

    let (status, _) = send(
        &app.router,
        admin("POST", "/admin/subscription-requests/42/deny", Some(ADMIN)),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
