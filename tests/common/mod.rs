#![allow(dead_code)]

use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::{Client, Response, StatusCode};
use serde_json::{json, Value};
use uuid::Uuid;

use luxehaven::app::app;
use luxehaven::auth::bootstrap::ensure_admin;
use luxehaven::config::AppConfig;
use luxehaven::database::MemoryStore;
use luxehaven::state::AppState;

pub const ADMIN_EMAIL: &str = "admin@luxehaven.test";
pub const ADMIN_PASSWORD: &str = "admin-password";

static SERVER: OnceLock<TestServer> = OnceLock::new();

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub federated_secret: String,
}

impl TestServer {
    /// Serve the app on its own thread and runtime so it outlives each test's runtime
    fn spawn() -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let mut config = AppConfig::development();
        config.server.port = port;
        config.server.public_base_url = base_url.clone();
        config.server.enable_request_logging = false;
        config.uploads.directory = std::env::temp_dir()
            .join(format!("luxehaven-test-uploads-{}", Uuid::new_v4().simple()))
            .to_string_lossy()
            .into_owned();
        config.uploads.max_bytes = 64 * 1024;
        let federated_secret = config.security.federated_secret.clone();

        let listener = std::net::TcpListener::bind(("127.0.0.1", port)).context("failed to bind test port")?;
        listener.set_nonblocking(true)?;

        std::thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
                .expect("failed to build server runtime");
            runtime.block_on(async move {
                let state = AppState::with_store(&config, Arc::new(MemoryStore::new())).expect("failed to build state");
                ensure_admin(state.store.as_ref(), ADMIN_EMAIL, ADMIN_PASSWORD, "Admin", config.security.bcrypt_cost)
                    .await
                    .expect("failed to seed admin");
                let listener = tokio::net::TcpListener::from_std(listener).expect("failed to adopt listener");
                axum::serve(listener, app(state, &config)).await.expect("server");
            });
        });

        Ok(Self { port, base_url, federated_secret })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            if let Ok(resp) = client.get(format!("{}/health", self.base_url)).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

pub async fn ensure_server() -> Result<&'static TestServer> {
    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to start test server"));
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

/// Client that never follows redirects, so guard responses stay visible
pub fn client() -> Client {
    Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("failed to build client")
}

pub fn unique_email(prefix: &str) -> String {
    format!("{}-{}@example.com", prefix, Uuid::new_v4().simple())
}

pub async fn body(resp: Response) -> Result<Value> {
    resp.json::<Value>().await.context("response was not JSON")
}

/// A registered, signed-in user
pub struct Session {
    pub id: String,
    pub email: String,
    pub token: String,
}

pub async fn register(server: &TestServer, name: &str, email: &str, password: &str) -> Result<Response> {
    Ok(client()
        .post(server.url("/api/register"))
        .json(&json!({ "name": name, "email": email, "password": password }))
        .send()
        .await?)
}

pub async fn sign_in(server: &TestServer, email: &str, password: &str) -> Result<Value> {
    let resp = client()
        .post(server.url("/api/auth/signin"))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await?;
    anyhow::ensure!(resp.status() == StatusCode::OK, "sign-in failed: {}", resp.status());
    body(resp).await
}

pub async fn new_user(server: &TestServer, prefix: &str) -> Result<Session> {
    let email = unique_email(prefix);
    let resp = register(server, prefix, &email, "correct-horse").await?;
    anyhow::ensure!(resp.status() == StatusCode::CREATED, "register failed: {}", resp.status());

    let grant = sign_in(server, &email, "correct-horse").await?;
    Ok(Session {
        id: grant["data"]["user"]["id"].as_str().context("missing user id")?.to_string(),
        email,
        token: grant["data"]["token"].as_str().context("missing token")?.to_string(),
    })
}

pub async fn admin(server: &TestServer) -> Result<Session> {
    let grant = sign_in(server, ADMIN_EMAIL, ADMIN_PASSWORD).await?;
    Ok(Session {
        id: grant["data"]["user"]["id"].as_str().context("missing user id")?.to_string(),
        email: ADMIN_EMAIL.to_string(),
        token: grant["data"]["token"].as_str().context("missing token")?.to_string(),
    })
}

pub fn listing(kind: &str, price: u64) -> Value {
    json!({
        "title": "Ocean view apartment",
        "description": "Three bedrooms facing the beach",
        "price": price,
        "location": "Mombasa",
        "bedrooms": 3,
        "bathrooms": 2,
        "area": 140.5,
        "image_urls": ["https://cdn.example.com/a.jpg", "https://cdn.example.com/b.jpg"],
        "type": kind
    })
}

pub async fn create_property(server: &TestServer, owner: &Session, kind: &str, price: u64) -> Result<Value> {
    let resp = client()
        .post(server.url("/api/properties"))
        .bearer_auth(&owner.token)
        .json(&listing(kind, price))
        .send()
        .await?;
    anyhow::ensure!(resp.status() == StatusCode::CREATED, "create property failed: {}", resp.status());
    Ok(body(resp).await?["data"].clone())
}

pub async fn pay(server: &TestServer, payer: &Session, property_id: &str, action: &str, amount: u64) -> Result<Response> {
    Ok(client()
        .post(server.url("/api/payments"))
        .bearer_auth(&payer.token)
        .json(&json!({ "property_id": property_id, "action": action, "amount": amount }))
        .send()
        .await?)
}

/// Identity assertion signed the way the federated provider signs them
pub fn federated_assertion(server: &TestServer, uid: &str, email: &str, name: &str) -> String {
    let exp = chrono::Utc::now().timestamp() + 600;
    jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &json!({ "sub": uid, "email": email, "name": name, "exp": exp }),
        &jsonwebtoken::EncodingKey::from_secret(server.federated_secret.as_bytes()),
    )
    .expect("failed to sign assertion")
}
