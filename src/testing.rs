//! Scripted stand-in for the remote service, used by unit tests.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::api::{LoginResponse, RawMessage, RecentSearch, Role, ScoutApi};
use crate::error::ApiError;
use crate::model::{Candidate, User};

pub const GOOD_EMAIL: &str = "ada@example.com";
pub const GOOD_PASSWORD: &str = "correct-horse";
pub const GOOD_TOKEN: &str = "token-123";

#[derive(Default)]
pub struct FakeApi {
    pub search: Mutex<Option<Result<Vec<Candidate>, ApiError>>>,
    pub history: Mutex<Option<Result<Vec<RawMessage>, ApiError>>>,
    pub recent: Mutex<Option<Result<Vec<RecentSearch>, ApiError>>>,
    pub saved: Mutex<Option<Result<Vec<Candidate>, ApiError>>>,
    pub queries: Mutex<Vec<(String, String)>>,
}

impl FakeApi {
    pub fn with_search(result: Result<Vec<Candidate>, ApiError>) -> Self {
        let api = FakeApi::default();
        *api.search.lock().unwrap() = Some(result);
        api
    }

    pub fn with_history(result: Result<Vec<RawMessage>, ApiError>) -> Self {
        let api = FakeApi::default();
        *api.history.lock().unwrap() = Some(result);
        api
    }
}

pub fn user() -> User {
    User {
        id: "7".to_string(),
        fullname: "Ada Lovelace".to_string(),
        email: GOOD_EMAIL.to_string(),
    }
}

pub fn candidates(n: usize) -> Vec<Candidate> {
    (0..n)
        .map(|i| Candidate::new(format!("Candidate {}", i + 1), format!("https://example.com/{}", i + 1), "linkedin"))
        .collect()
}

pub fn raw(id: &str, role: Role, content: &str) -> RawMessage {
    RawMessage {
        id: id.to_string(),
        role,
        content: content.to_string(),
        created_at: "2024-05-01T10:00:00.000Z".to_string(),
    }
}

fn unscripted() -> ApiError {
    ApiError::Network("no scripted response".to_string())
}

#[async_trait]
impl ScoutApi for FakeApi {
    async fn register(&self, _fullname: &str, email: &str, _password: &str) -> Result<String, ApiError> {
        if email == GOOD_EMAIL {
            Err(ApiError::Status {
                status: 409,
                message: "User already exists".to_string(),
            })
        } else {
            Ok("User registered successfully".to_string())
        }
    }

    async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
        if email == GOOD_EMAIL && password == GOOD_PASSWORD {
            Ok(LoginResponse {
                token: GOOD_TOKEN.to_string(),
                user: user(),
            })
        } else {
            Err(ApiError::Unauthorized("Invalid credentials".to_string()))
        }
    }

    async fn search_candidates(&self, token: &str, query: &str) -> Result<Vec<Candidate>, ApiError> {
        self.queries.lock().unwrap().push((token.to_string(), query.to_string()));
        self.search.lock().unwrap().clone().unwrap_or_else(|| Err(unscripted()))
    }

    async fn message_history(&self, _token: &str, _thread_id: &str) -> Result<Vec<RawMessage>, ApiError> {
        self.history.lock().unwrap().clone().unwrap_or_else(|| Err(unscripted()))
    }

    async fn recent_searches(&self, _token: &str) -> Result<Vec<RecentSearch>, ApiError> {
        self.recent.lock().unwrap().clone().unwrap_or_else(|| Err(unscripted()))
    }

    async fn saved_candidates(&self, _token: &str, _user_id: &str) -> Result<Vec<Candidate>, ApiError> {
        self.saved.lock().unwrap().clone().unwrap_or_else(|| Err(unscripted()))
    }
}
