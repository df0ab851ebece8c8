use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// The signed-in account. Serialized as-is into durable storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(deserialize_with = "id_from_string_or_number")]
    pub id: String,
    pub fullname: String,
    pub email: String,
}

/// Accepts `"42"` as well as `42`; the auth API has returned both.
pub fn id_from_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Number(n) => n.to_string(),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CandidateKind {
    Work,
    Music,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Contact {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub whatsapp: Option<String>,
}

impl Contact {
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.phone.is_none() && self.whatsapp.is_none()
    }
}

/// One search result. Only name, profile link and platform are always known;
/// everything else depends on which endpoint produced it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Candidate {
    pub id: Option<String>,
    pub name: String,
    pub profile_url: String,
    pub platform: String,
    pub summary: Option<String>,
    pub title: Option<String>,
    pub location: Option<String>,
    pub avatar: Option<String>,
    pub experience: Option<String>,
    pub kind: Option<CandidateKind>,
    /// 0 to 5 stars.
    pub rating: Option<u8>,
    pub skills: Vec<String>,
    pub contact: Contact,
}

impl Candidate {
    pub fn new(name: impl Into<String>, profile_url: impl Into<String>, platform: impl Into<String>) -> Self {
        Candidate {
            name: name.into(),
            profile_url: profile_url.into(),
            platform: platform.into(),
            ..Default::default()
        }
    }

    pub fn initial(&self) -> String {
        self.name
            .chars()
            .next()
            .map(|c| c.to_uppercase().collect())
            .unwrap_or_else(|| "?".to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    User,
    Agent,
    Candidate,
}

/// One entry of the conversation timeline.
///
/// Built only through the constructors so a `Candidate` message always
/// carries at least one candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    id: String,
    kind: MessageKind,
    content: String,
    timestamp: DateTime<Utc>,
    candidates: Vec<Candidate>,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self::build(new_message_id(), MessageKind::User, content.into(), timestamp, Vec::new())
    }

    pub fn agent(content: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self::build(new_message_id(), MessageKind::Agent, content.into(), timestamp, Vec::new())
    }

    /// `None` when `candidates` is empty.
    pub fn candidates(candidates: Vec<Candidate>, timestamp: DateTime<Utc>) -> Option<Self> {
        if candidates.is_empty() {
            return None;
        }
        let content = candidate_summary(candidates.len());
        Some(Self::build(new_message_id(), MessageKind::Candidate, content, timestamp, candidates))
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    fn build(
        id: String,
        kind: MessageKind,
        content: String,
        timestamp: DateTime<Utc>,
        candidates: Vec<Candidate>,
    ) -> Self {
        ChatMessage {
            id,
            kind,
            content,
            timestamp: normalize_timestamp(timestamp),
            candidates,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> MessageKind {
        self.kind
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn candidate_list(&self) -> &[Candidate] {
        &self.candidates
    }
}

pub fn new_message_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

pub fn candidate_summary(count: usize) -> String {
    if count == 1 {
        "Found 1 candidate matching your search.".to_string()
    } else {
        format!("Found {} candidates matching your search.", count)
    }
}

/// Local clocks and the server disagree on precision; keep milliseconds.
pub fn normalize_timestamp(ts: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp_millis(ts.timestamp_millis()).unwrap_or(ts)
}

/// Parses a server `createdAt`, falling back to `fallback` when it is not RFC 3339.
pub fn parse_timestamp(raw: &str, fallback: DateTime<Utc>) -> DateTime<Utc> {
    match DateTime::parse_from_rfc3339(raw.trim()) {
        Ok(ts) => ts.with_timezone(&Utc),
        Err(e) => {
            tracing::debug!("unparseable timestamp {:?}: {}", raw, e);
            fallback
        }
    }
}
