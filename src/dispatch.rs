use chrono::Utc;

use crate::activity::{self, Kind};
use crate::api::ScoutApi;
use crate::chat::{reduce, ChatAction, ConversationState};
use crate::error::ApiError;
use crate::model::{Candidate, ChatMessage};

pub const REFINE_QUERY: &str = "I couldn't find any candidates for that search. Please tell me the job title, the platform, and the location you're hiring for (for example: \"Senior React Developer on LinkedIn in Berlin\") and I'll search again.";
pub const SEARCH_FAILED: &str = "Sorry, something went wrong while searching for candidates. Please try again in a moment.";

/// A query accepted by [`begin`], to be sent with [`send`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingQuery {
    pub query: String,
    pub generation: u64,
}

pub fn found_narrative(count: usize) -> String {
    if count == 1 {
        "I found 1 candidate that matches your search. Here is the top match:".to_string()
    } else {
        format!("I found {} candidates that match your search. Here are the top matches:", count)
    }
}

/// Appends the user's turn and marks the conversation loading.
///
/// `None` when the input is blank or another request is already in flight;
/// nothing is changed in that case.
pub fn begin(state: &mut ConversationState, input: &str) -> Option<PendingQuery> {
    let query = input.trim();
    if query.is_empty() || state.is_loading() {
        return None;
    }

    reduce(state, ChatAction::Append(ChatMessage::user(query, Utc::now())));
    reduce(state, ChatAction::SetLoading(true));
    activity::log_with(Kind::Search, format!("Searching: {}", query));

    Some(PendingQuery {
        query: query.to_string(),
        generation: state.generation(),
    })
}

pub async fn send(api: &dyn ScoutApi, token: &str, query: &str) -> Result<Vec<Candidate>, ApiError> {
    api.search_candidates(token, query).await
}

/// Appends the reply for a finished search. Returns false for a stale result.
pub fn complete(
    state: &mut ConversationState,
    generation: u64,
    result: Result<Vec<Candidate>, ApiError>,
) -> bool {
    if generation != state.generation() {
        tracing::debug!("dropping stale search result (generation {} != {})", generation, state.generation());
        return false;
    }

    let now = Utc::now();
    match result {
        Ok(candidates) => {
            let count = candidates.len();
            match ChatMessage::candidates(candidates, now) {
                Some(batch) => {
                    activity::log_with(Kind::Search, format!("Found {} candidates", count));
                    reduce(
                        state,
                        ChatAction::AppendBatch(vec![ChatMessage::agent(found_narrative(count), now), batch]),
                    );
                }
                None => {
                    activity::log_with(Kind::Search, "No candidates found");
                    reduce(state, ChatAction::Append(ChatMessage::agent(REFINE_QUERY, now)));
                }
            }
        }
        Err(e) => {
            tracing::warn!("candidate search failed: {}", e);
            activity::log_with(Kind::Search, format!("Search failed: {}", e));
            reduce(state, ChatAction::Append(ChatMessage::agent(SEARCH_FAILED, now)));
        }
    }
    reduce(state, ChatAction::SetLoading(false));
    true
}
