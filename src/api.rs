use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ApiError;
use crate::model::{id_from_string_or_number, Candidate, CandidateKind, Contact, User};

#[derive(Debug, Serialize)]
struct RegisterRequest<'a> {
    fullname: &'a str,
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessageBody {
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    result: Option<SearchResult>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    #[serde(default)]
    candidates: Option<Vec<CandidateRecord>>,
}

#[derive(Debug, Deserialize)]
struct HistoryResponse {
    #[serde(default)]
    messages: Vec<RawMessage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecentSearchesResponse {
    #[serde(default)]
    recent_searches: Vec<RecentSearch>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    #[serde(other)]
    Other,
}

/// A persisted turn as the history endpoint returns it.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RawMessage {
    #[serde(deserialize_with = "id_from_string_or_number")]
    pub id: String,
    pub role: Role,
    #[serde(default, deserialize_with = "content_as_text")]
    pub content: String,
    #[serde(default)]
    pub created_at: String,
}

/// Structured content is kept as its JSON text so it can still be shown raw.
fn content_as_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecentSearch {
    #[serde(deserialize_with = "id_from_string_or_number")]
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl RecentSearch {
    pub fn display_title(&self) -> &str {
        match self.title.as_deref() {
            Some(t) if !t.trim().is_empty() => t,
            _ => "Untitled search",
        }
    }
}

/// Candidate as any endpoint sends it. Both the short list shape and the
/// detailed shape land here.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CandidateRecord {
    pub id: Option<Value>,
    pub name: Option<String>,
    pub profile_url: Option<String>,
    pub platform: Option<String>,
    pub summary: Option<String>,
    pub title: Option<String>,
    pub location: Option<String>,
    pub avatar: Option<String>,
    pub experience: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub rating: Option<f64>,
    pub skills: Option<Vec<String>>,
    pub contact: Option<ContactRecord>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ContactRecord {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub whatsapp: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

impl CandidateRecord {
    /// `None` when the record has no usable name.
    pub fn into_candidate(self) -> Option<Candidate> {
        let name = non_blank(self.name)?;
        let id = match self.id {
            Some(Value::String(s)) => Some(s),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        };
        let kind = match self.kind.as_deref().map(str::to_ascii_lowercase).as_deref() {
            Some("work") => Some(CandidateKind::Work),
            Some("music") => Some(CandidateKind::Music),
            _ => None,
        };
        let rating = self
            .rating
            .filter(|r| r.is_finite())
            .map(|r| r.round().clamp(0.0, 5.0) as u8);
        let contact = self
            .contact
            .map(|c| Contact {
                email: non_blank(c.email),
                phone: non_blank(c.phone),
                whatsapp: non_blank(c.whatsapp),
            })
            .unwrap_or_default();

        Some(Candidate {
            id,
            name,
            profile_url: self.profile_url.unwrap_or_default().trim().to_string(),
            platform: non_blank(self.platform).unwrap_or_else(|| "web".to_string()),
            summary: non_blank(self.summary),
            title: non_blank(self.title),
            location: non_blank(self.location),
            avatar: non_blank(self.avatar),
            experience: non_blank(self.experience),
            kind,
            rating,
            skills: self
                .skills
                .unwrap_or_default()
                .into_iter()
                .filter(|s| !s.trim().is_empty())
                .collect(),
            contact,
        })
    }
}

pub fn into_candidates(records: Vec<CandidateRecord>) -> Vec<Candidate> {
    records.into_iter().filter_map(CandidateRecord::into_candidate).collect()
}

/// Everything the client asks of the remote service.
#[async_trait]
pub trait ScoutApi: Send + Sync {
    /// Returns the server's confirmation message.
    async fn register(&self, fullname: &str, email: &str, password: &str) -> Result<String, ApiError>;

    async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError>;

    /// Empty when the server found nothing.
    async fn search_candidates(&self, token: &str, query: &str) -> Result<Vec<Candidate>, ApiError>;

    async fn message_history(&self, token: &str, thread_id: &str) -> Result<Vec<RawMessage>, ApiError>;

    async fn recent_searches(&self, token: &str) -> Result<Vec<RecentSearch>, ApiError>;

    async fn saved_candidates(&self, token: &str, user_id: &str) -> Result<Vec<Candidate>, ApiError>;
}

pub struct ScoutClient {
    base_url: String,
    client: reqwest::Client,
}

impl ScoutClient {
    pub fn with_config(base_url: String) -> Self {
        ScoutClient {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Turns a non-2xx response into an error carrying the server's `message`.
    async fn check(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<MessageBody>(&body)
            .ok()
            .and_then(|b| b.message)
            .unwrap_or_default();
        tracing::warn!("API error ({}): {}", status, if message.is_empty() { &body } else { &message });

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            Err(ApiError::Unauthorized(message))
        } else {
            Err(ApiError::Status {
                status: status.as_u16(),
                message,
            })
        }
    }
}

#[async_trait]
impl ScoutApi for ScoutClient {
    async fn register(&self, fullname: &str, email: &str, password: &str) -> Result<String, ApiError> {
        tracing::info!("registering account for {}", email);
        let response = self
            .client
            .post(self.url("/api/auth/register"))
            .json(&RegisterRequest { fullname, email, password })
            .send()
            .await?;
        let body: MessageBody = Self::check(response).await?.json().await?;
        Ok(body.message.unwrap_or_else(|| "Account created successfully.".to_string()))
    }

    async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
        tracing::info!("logging in {}", email);
        let response = self
            .client
            .post(self.url("/api/auth/login"))
            .json(&LoginRequest { email, password })
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn search_candidates(&self, token: &str, query: &str) -> Result<Vec<Candidate>, ApiError> {
        tracing::info!("searching candidates: {}", query);
        let response = self
            .client
            .post(self.url("/api/candidates"))
            .bearer_auth(token)
            .json(&SearchRequest { query })
            .send()
            .await?;
        let body: SearchResponse = Self::check(response).await?.json().await?;

        if body.success == Some(false) {
            return Err(ApiError::Rejected(body.message.unwrap_or_default()));
        }
        let records = body.result.and_then(|r| r.candidates).unwrap_or_default();
        Ok(into_candidates(records))
    }

    async fn message_history(&self, token: &str, thread_id: &str) -> Result<Vec<RawMessage>, ApiError> {
        tracing::info!("fetching history for thread {}", thread_id);
        let response = self
            .client
            .get(self.url("/api/candidates/msg-history"))
            .query(&[("threadId", thread_id)])
            .bearer_auth(token)
            .send()
            .await?;
        let body: HistoryResponse = Self::check(response).await?.json().await?;
        Ok(body.messages)
    }

    async fn recent_searches(&self, token: &str) -> Result<Vec<RecentSearch>, ApiError> {
        let response = self
            .client
            .get(self.url("/api/candidates/recent-searches"))
            .bearer_auth(token)
            .send()
            .await?;
        let body: RecentSearchesResponse = Self::check(response).await?.json().await?;
        Ok(body.recent_searches)
    }

    async fn saved_candidates(&self, token: &str, user_id: &str) -> Result<Vec<Candidate>, ApiError> {
        let response = self
            .client
            .get(self.url("/api/candidates/get-all"))
            .query(&[("userId", user_id)])
            .bearer_auth(token)
            .send()
            .await?;
        let records: Vec<CandidateRecord> = Self::check(response).await?.json().await?;
        Ok(into_candidates(records))
    }
}
