use chrono::{Duration, Utc};

use crate::model::ChatMessage;

pub const GREETING_ID: &str = "greeting";
pub const GREETING: &str = "Hello! I'm your AI-powered talent scout assistant. I can help you find the perfect candidates for any role. What position are you looking to fill today?";

#[derive(Debug, Clone)]
pub enum ChatAction {
    Append(ChatMessage),
    /// Applied as one update so a narrative never shows without its candidates.
    AppendBatch(Vec<ChatMessage>),
    SetLoading(bool),
    SetError(Option<String>),
    /// Back to the greeting. Whatever was in flight is abandoned.
    Reset,
    /// The chat view went away; anything still in flight is now stale.
    Detach,
}

/// The conversation timeline plus its two flags.
///
/// `generation` changes whenever the conversation is reset or the view
/// detaches. Async work captures it up front and is dropped on mismatch.
#[derive(Debug, Clone)]
pub struct ConversationState {
    messages: Vec<ChatMessage>,
    is_loading: bool,
    error: Option<String>,
    generation: u64,
}

impl Default for ConversationState {
    fn default() -> Self {
        ConversationState {
            messages: vec![greeting(Utc::now() - Duration::seconds(60))],
            is_loading: false,
            error: None,
            generation: 0,
        }
    }
}

fn greeting(at: chrono::DateTime<Utc>) -> ChatMessage {
    ChatMessage::agent(GREETING, at).with_id(GREETING_ID)
}

impl ConversationState {
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// True when only the greeting is present.
    pub fn is_fresh(&self) -> bool {
        self.messages.len() == 1 && self.messages[0].id() == GREETING_ID
    }
}

pub fn reduce(state: &mut ConversationState, action: ChatAction) {
    match action {
        ChatAction::Append(message) => {
            state.messages.push(message);
        }
        ChatAction::AppendBatch(messages) => {
            state.messages.extend(messages);
        }
        ChatAction::SetLoading(loading) => {
            state.is_loading = loading;
        }
        ChatAction::SetError(error) => {
            state.error = error;
        }
        ChatAction::Reset => {
            state.messages = vec![greeting(Utc::now())];
            state.is_loading = false;
            state.error = None;
            state.generation += 1;
        }
        ChatAction::Detach => {
            state.is_loading = false;
            state.generation += 1;
        }
    }
}
