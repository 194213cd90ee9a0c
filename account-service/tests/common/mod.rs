use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;

use account_service::domain::user::models::EmailAddress;
use account_service::domain::user::models::User;
use account_service::domain::user::models::UserId;
use account_service::domain::user::models::Username;
use account_service::domain::user::ports::UserRepository;
use account_service::domain::user::service::UserService;
use account_service::inbound::http::cookie::CookieConfig;
use account_service::inbound::http::router::create_router;
use account_service::user::errors::UserError;
use async_trait::async_trait;
use auth::Authenticator;
use auth::SessionClaims;
use auth::TokenCodec;
use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;

pub const TEST_SECRET: &[u8] = b"test-secret-key-for-token-signing-at-least-32-bytes";
pub const TEST_PASSWORD: &str = "Str0ngPass!";

/// User store backed by a map, enforcing the same uniqueness rules as the
/// `users` table.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Mutex<HashMap<UserId, User>>,
}

impl InMemoryUserRepository {
    pub fn set_active(&self, id: &UserId, is_active: bool) {
        if let Some(user) = self.users.lock().unwrap().get_mut(id) {
            user.is_active = is_active;
        }
    }

    pub fn remove(&self, id: &UserId) {
        self.users.lock().unwrap().remove(id);
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> Result<User, UserError> {
        let mut users = self.users.lock().unwrap();
        if users.values().any(|u| u.username == user.username) {
            return Err(UserError::UsernameAlreadyExists(
                user.username.as_str().to_string(),
            ));
        }
        if users.values().any(|u| u.email == user.email) {
            return Err(UserError::EmailAlreadyExists(user.email.as_str().to_string()));
        }
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError> {
        Ok(self.users.lock().unwrap().get(id).cloned())
    }

    async fn find_by_username(&self, username: &Username) -> Result<Option<User>, UserError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .values()
            .find(|u| &u.username == username)
            .cloned())
    }

    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<User>, UserError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .values()
            .find(|u| &u.email == email)
            .cloned())
    }
}

/// Test application that spawns a real server
pub struct TestApp {
    pub address: String,
    pub repository: Arc<InMemoryUserRepository>,
    pub api_client: reqwest::Client,
    pub token_lifetime: Duration,
}

impl TestApp {
    /// Spawn the application in a background task and return TestApp
    pub async fn spawn() -> Self {
        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let token_lifetime = Duration::hours(24);
        let repository = Arc::new(InMemoryUserRepository::default());
        let authenticator = Arc::new(Authenticator::new(TEST_SECRET, token_lifetime));
        let user_service = Arc::new(UserService::new(Arc::clone(&repository), authenticator));

        let router = create_router(
            user_service,
            CookieConfig {
                secure: false,
                max_age: token_lifetime,
            },
        );

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            repository,
            api_client: Self::client(),
            token_lifetime,
        }
    }

    /// Fresh client with its own cookie store.
    pub fn client() -> reqwest::Client {
        reqwest::Client::builder()
            .cookie_store(true)
            .build()
            .expect("Failed to create reqwest client")
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(format!("{}{}", self.address, path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(format!("{}{}", self.address, path))
    }

    /// GET without the shared cookie store
    pub fn get_without_cookies(&self, path: &str) -> reqwest::RequestBuilder {
        Self::client().get(format!("{}{}", self.address, path))
    }

    /// Helper to make GET request with Bearer token, bypassing stored cookies
    pub fn get_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.get_without_cookies(path).bearer_auth(token)
    }

    /// Sign up a user and return the response body.
    pub async fn sign_up(&self, email: &str) -> serde_json::Value {
        let response = self
            .post("/api/auth/signup")
            .json(&serde_json::json!({
                "first_name": "Ada",
                "last_name": "Lovelace",
                "email": email,
                "password": TEST_PASSWORD,
            }))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), reqwest::StatusCode::CREATED);
        response.json().await.expect("Failed to parse response")
    }

    /// Sign a token with the server's secret and an explicit issue time.
    pub fn token_issued_at(&self, user_id: &str, email: &str, issued_at: DateTime<Utc>) -> String {
        self.token_signed_with(TEST_SECRET, user_id, email, issued_at)
    }

    /// Sign a token with an arbitrary secret.
    pub fn token_signed_with(
        &self,
        secret: &[u8],
        user_id: &str,
        email: &str,
        issued_at: DateTime<Utc>,
    ) -> String {
        let claims =
            SessionClaims::issued_at(user_id, email, "ada", issued_at, self.token_lifetime);
        TokenCodec::new(secret)
            .encode(&claims)
            .expect("Failed to encode token")
    }
}
