use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::activity::{self, Kind};
use crate::api::{into_candidates, CandidateRecord, RawMessage, Role, ScoutApi};
use crate::chat::{reduce, ChatAction, ConversationState};
use crate::error::ApiError;
use crate::model::{parse_timestamp, Candidate, ChatMessage};

pub const HISTORY_ERROR: &str = "Failed to load message history.";

// A field value runs until the next known label or the end of the line.
const FIELD_END: &str = r"\s*(?:(?:job\s*title|platform|location)\s*:|$)";

static JOB_TITLE: Lazy<Regex> = Lazy::new(|| field_regex(r"job\s*title"));
static PLATFORM: Lazy<Regex> = Lazy::new(|| field_regex("platform"));
static LOCATION: Lazy<Regex> = Lazy::new(|| field_regex("location"));

fn field_regex(label: &str) -> Regex {
    Regex::new(&format!(r"(?im)\b{}\s*:\s*(.+?){}", label, FIELD_END)).expect("field pattern is valid")
}

fn labeled_field(re: &Regex, text: &str) -> Option<String> {
    let value = re.captures(text)?.get(1)?.as_str();
    let value = value.trim().trim_end_matches(&[',', ';', '.'][..]).trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Recovers a readable request from a stored search prompt.
///
/// Stored prompts carry `Job Title:`, `Platform:` and `Location:` lines.
/// When all three are present the sentence is rebuilt, otherwise the prompt
/// is shown as stored.
pub fn summarize_user_prompt(content: &str) -> String {
    match (
        labeled_field(&JOB_TITLE, content),
        labeled_field(&PLATFORM, content),
        labeled_field(&LOCATION, content),
    ) {
        (Some(title), Some(platform), Some(location)) => {
            format!("Find {} candidates on {} in {}", title, platform, location)
        }
        _ => content.to_string(),
    }
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string (```json) along with the opening fence.
    let body = rest.split_once('\n').map(|(_, body)| body).unwrap_or("");
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

/// Reads an assistant turn as a candidate list.
///
/// The turn counts as structured only when it is a JSON array whose first
/// element has both `name` and `profileUrl`.
pub fn parse_candidate_turn(content: &str) -> Option<Vec<Candidate>> {
    let value: Value = serde_json::from_str(strip_code_fence(content)).ok()?;
    let first = value.as_array()?.first()?.as_object()?;
    if !(first.contains_key("name") && first.contains_key("profileUrl")) {
        return None;
    }

    let records: Vec<CandidateRecord> = match serde_json::from_value(value) {
        Ok(records) => records,
        Err(e) => {
            tracing::debug!("assistant turn looked like candidates but did not decode: {}", e);
            return None;
        }
    };
    let candidates = into_candidates(records);
    if candidates.is_empty() {
        None
    } else {
        Some(candidates)
    }
}

/// Rebuilds timeline entries from persisted turns, one entry per turn.
pub fn reconstruct(raw: Vec<RawMessage>, now: DateTime<Utc>) -> Vec<ChatMessage> {
    raw.into_iter()
        .map(|message| {
            let at = parse_timestamp(&message.created_at, now);
            let rebuilt = match message.role {
                Role::User => ChatMessage::user(summarize_user_prompt(&message.content), at),
                Role::Assistant => match parse_candidate_turn(&message.content) {
                    Some(candidates) => {
                        ChatMessage::candidates(candidates, at).unwrap_or_else(|| ChatMessage::agent(message.content.clone(), at))
                    }
                    None => ChatMessage::agent(message.content.clone(), at),
                },
                Role::Other => ChatMessage::agent(message.content.clone(), at),
            };
            rebuilt.with_id(message.id)
        })
        .collect()
}

/// Resets the conversation and marks it loading. Returns the generation the
/// fetch belongs to.
pub fn begin(state: &mut ConversationState) -> u64 {
    reduce(state, ChatAction::Reset);
    reduce(state, ChatAction::SetLoading(true));
    state.generation()
}

pub async fn fetch(api: &dyn ScoutApi, token: &str, thread_id: &str) -> Result<Vec<ChatMessage>, ApiError> {
    let raw = api.message_history(token, thread_id).await?;
    activity::log_with(Kind::History, format!("Loaded {} messages for thread {}", raw.len(), thread_id));
    Ok(reconstruct(raw, Utc::now()))
}

/// Applies a finished fetch. Nothing is applied on failure, leaving the
/// greeting-only state from `begin`. Returns false for a stale result.
pub fn complete(
    state: &mut ConversationState,
    generation: u64,
    result: Result<Vec<ChatMessage>, ApiError>,
) -> bool {
    if generation != state.generation() {
        tracing::debug!("dropping stale history result (generation {} != {})", generation, state.generation());
        return false;
    }

    match result {
        Ok(messages) => {
            reduce(state, ChatAction::AppendBatch(messages));
        }
        Err(e) => {
            tracing::warn!("history fetch failed: {}", e);
            activity::log_with(Kind::History, format!("History load failed: {}", e));
            reduce(state, ChatAction::SetError(Some(HISTORY_ERROR.to_string())));
        }
    }
    reduce(state, ChatAction::SetLoading(false));
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MessageKind;
    use crate::testing::{raw, FakeApi};

    #[test]
    fn test_summarize_structured_prompt() {
        let prompt = "Search for candidates.\nJob Title: Senior React Developer\nPlatform: LinkedIn\nLocation: San Francisco, CA\n";
        assert_eq!(
            summarize_user_prompt(prompt),
            "Find Senior React Developer candidates on LinkedIn in San Francisco, CA"
        );
    }

    #[test]
    fn test_summarize_single_line_prompt() {
        let prompt = "job title: Jazz Guitarist platform: YouTube location: New Orleans.";
        assert_eq!(
            summarize_user_prompt(prompt),
            "Find Jazz Guitarist candidates on YouTube in New Orleans"
        );
    }

    #[test]
    fn test_summarize_falls_back_to_raw() {
        let prompt = "Job Title: Designer\nPlatform: Dribbble";
        assert_eq!(summarize_user_prompt(prompt), prompt);
        assert_eq!(summarize_user_prompt("senior react developer"), "senior react developer");
    }

    #[test]
    fn test_parse_candidate_turn() {
        let parsed = parse_candidate_turn(r#"[{"name":"A","profileUrl":"http://x"}]"#).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].name, "A");
        assert_eq!(parsed[0].profile_url, "http://x");
    }

    #[test]
    fn test_parse_candidate_turn_in_code_fence() {
        let content = "```json\n[{\"name\":\"B\",\"profileUrl\":\"http://y\",\"platform\":\"GitHub\"}]\n```";
        let parsed = parse_candidate_turn(content).unwrap();
        assert_eq!(parsed[0].platform, "GitHub");
    }

    #[test]
    fn test_parse_candidate_turn_rejects_other_shapes() {
        assert!(parse_candidate_turn("Here are some thoughts about your search.").is_none());
        assert!(parse_candidate_turn(r#"[{"name":"A"}]"#).is_none());
        assert!(parse_candidate_turn(r#"{"name":"A","profileUrl":"http://x"}"#).is_none());
        assert!(parse_candidate_turn("[]").is_none());
        assert!(parse_candidate_turn(r#"[{"name":"A","profileUrl":"http://x","skills":"not a list"}]"#).is_none());
    }

    #[test]
    fn test_reconstruct_roles() {
        let messages = reconstruct(
            vec![
                raw("1", Role::User, "Job Title: Designer\nPlatform: Behance\nLocation: Berlin"),
                raw("2", Role::Assistant, r#"[{"name":"A","profileUrl":"http://x"}]"#),
                raw("3", Role::Assistant, "I could not find anyone, sorry."),
            ],
            Utc::now(),
        );

        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].kind(), MessageKind::User);
        assert_eq!(messages[0].content(), "Find Designer candidates on Behance in Berlin");
        assert_eq!(messages[1].kind(), MessageKind::Candidate);
        assert_eq!(messages[1].id(), "2");
        assert_eq!(messages[1].candidate_list()[0].name, "A");
        assert!(!messages[1].content().is_empty());
        assert_eq!(messages[2].kind(), MessageKind::Agent);
        assert_eq!(messages[2].content(), "I could not find anyone, sorry.");
    }

    #[tokio::test]
    async fn test_hydration_success() {
        let api = FakeApi::with_history(Ok(vec![
            raw("u1", Role::User, "senior react developer"),
            raw("a1", Role::Assistant, r#"[{"name":"A","profileUrl":"http://x"}]"#),
        ]));
        let mut state = ConversationState::default();

        let generation = begin(&mut state);
        assert!(state.is_loading());
        assert!(state.is_fresh());

        let result = fetch(&api, "token", "thread-1").await;
        assert!(complete(&mut state, generation, result));

        assert!(!state.is_loading());
        assert_eq!(state.error(), None);
        assert_eq!(state.messages().len(), 3);
        assert_eq!(state.messages()[2].kind(), MessageKind::Candidate);
    }

    #[tokio::test]
    async fn test_hydration_failure_leaves_greeting_only() {
        let api = FakeApi::with_history(Err(ApiError::Network("connection reset".into())));
        let mut state = ConversationState::default();
        reduce(&mut state, ChatAction::Append(ChatMessage::user("old turn", Utc::now())));

        let generation = begin(&mut state);
        let result = fetch(&api, "token", "thread-1").await;
        complete(&mut state, generation, result);

        assert!(state.is_fresh());
        assert!(!state.is_loading());
        assert_eq!(state.error(), Some(HISTORY_ERROR));
    }

    #[tokio::test]
    async fn test_stale_hydration_is_dropped() {
        let api = FakeApi::with_history(Ok(vec![raw("a1", Role::Assistant, "late reply")]));
        let mut state = ConversationState::default();

        let generation = begin(&mut state);
        reduce(&mut state, ChatAction::Detach);

        let result = fetch(&api, "token", "thread-1").await;
        assert!(!complete(&mut state, generation, result));
        assert!(state.is_fresh());
    }
}
