use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Local, Utc};
use unicode_width::UnicodeWidthChar;

use crate::chat::ConversationState;
use crate::model::{Candidate, CandidateKind, MessageKind};

pub const PLATFORMS: [&str; 3] = ["LinkedIn", "YouTube", "TikTok"];
pub const SUMMARY_WIDTH: usize = 160;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KindFilter {
    #[default]
    All,
    Work,
    Music,
}

impl KindFilter {
    pub const ALL: [KindFilter; 3] = [KindFilter::All, KindFilter::Work, KindFilter::Music];
}

impl fmt::Display for KindFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            KindFilter::All => "All Candidates",
            KindFilter::Work => "Work Professionals",
            KindFilter::Music => "Musicians & Creators",
        })
    }
}

/// View-only narrowing of candidate cards. The stored timeline is untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateFilter {
    platforms: BTreeSet<String>,
    kind: KindFilter,
}

impl CandidateFilter {
    pub fn toggle_platform(&mut self, platform: &str) {
        let key = platform.to_lowercase();
        if !self.platforms.remove(&key) {
            self.platforms.insert(key);
        }
    }

    pub fn is_platform_selected(&self, platform: &str) -> bool {
        self.platforms.contains(&platform.to_lowercase())
    }

    pub fn set_kind(&mut self, kind: KindFilter) {
        self.kind = kind;
    }

    pub fn kind(&self) -> KindFilter {
        self.kind
    }

    pub fn matches(&self, candidate: &Candidate) -> bool {
        let platform_ok =
            self.platforms.is_empty() || self.platforms.contains(&candidate.platform.to_lowercase());
        let kind_ok = match self.kind {
            KindFilter::All => true,
            KindFilter::Work => candidate.kind == Some(CandidateKind::Work),
            KindFilter::Music => candidate.kind == Some(CandidateKind::Music),
        };
        platform_ok && kind_ok
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Turn<'a> {
    Text {
        id: &'a str,
        side: Side,
        content: &'a str,
        time: String,
    },
    /// Narrative followed by the card grid. Each card keeps its index in the
    /// original list so selections survive filtering.
    Candidates {
        id: &'a str,
        summary: &'a str,
        time: String,
        cards: Vec<(usize, &'a Candidate)>,
        hidden: usize,
    },
    /// Shown while a request is in flight; never stored.
    Typing,
}

pub fn clock(ts: DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%H:%M").to_string()
}

/// Maps the timeline to what is drawn, in timeline order.
pub fn turns<'a>(state: &'a ConversationState, filter: &CandidateFilter) -> Vec<Turn<'a>> {
    let mut out: Vec<Turn<'a>> = state
        .messages()
        .iter()
        .map(|message| match message.kind() {
            MessageKind::User | MessageKind::Agent => Turn::Text {
                id: message.id(),
                side: if message.kind() == MessageKind::User { Side::Right } else { Side::Left },
                content: message.content(),
                time: clock(message.timestamp()),
            },
            MessageKind::Candidate => {
                let all = message.candidate_list();
                let cards: Vec<(usize, &Candidate)> =
                    all.iter().enumerate().filter(|(_, c)| filter.matches(c)).collect();
                Turn::Candidates {
                    id: message.id(),
                    summary: message.content(),
                    time: clock(message.timestamp()),
                    hidden: all.len() - cards.len(),
                    cards,
                }
            }
        })
        .collect();

    if state.is_loading() {
        out.push(Turn::Typing);
    }
    out
}

/// Cuts `text` to at most `max_width` terminal columns, ending with an ellipsis.
pub fn truncate_display(text: &str, max_width: usize) -> String {
    let mut width = 0;
    let mut out = String::new();
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if width + w > max_width {
            while out.ends_with(' ') {
                out.pop();
            }
            out.push('…');
            return out;
        }
        width += w;
        out.push(ch);
    }
    out
}

pub fn stars(rating: u8) -> String {
    let filled = rating.min(5) as usize;
    format!("{}{}", "★".repeat(filled), "☆".repeat(5 - filled))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::{reduce, ChatAction};
    use crate::model::ChatMessage;

    fn candidate(name: &str, platform: &str, kind: Option<CandidateKind>) -> Candidate {
        Candidate {
            kind,
            ..Candidate::new(name, format!("https://example.com/{}", name), platform)
        }
    }

    fn state_with_batch() -> ConversationState {
        let mut state = ConversationState::default();
        let now = Utc::now();
        reduce(&mut state, ChatAction::Append(ChatMessage::user("find musicians", now)));
        reduce(
            &mut state,
            ChatAction::AppendBatch(vec![
                ChatMessage::agent("I found 3 candidates", now),
                ChatMessage::candidates(
                    vec![
                        candidate("Ana", "YouTube", Some(CandidateKind::Music)),
                        candidate("Ben", "LinkedIn", Some(CandidateKind::Work)),
                        candidate("Cy", "tiktok", None),
                    ],
                    now,
                )
                .unwrap(),
            ]),
        );
        state
    }

    #[test]
    fn test_turn_shapes_follow_timeline() {
        let state = state_with_batch();
        let turns = turns(&state, &CandidateFilter::default());

        assert_eq!(turns.len(), 4);
        assert!(matches!(turns[0], Turn::Text { side: Side::Left, .. }));
        assert!(matches!(turns[1], Turn::Text { side: Side::Right, content: "find musicians", .. }));
        assert!(matches!(turns[2], Turn::Text { side: Side::Left, .. }));
        match &turns[3] {
            Turn::Candidates { cards, hidden, summary, .. } => {
                assert_eq!(cards.len(), 3);
                assert_eq!(*hidden, 0);
                assert_eq!(*summary, "Found 3 candidates matching your search.");
            }
            other => panic!("unexpected turn {:?}", other),
        }
    }

    #[test]
    fn test_typing_only_while_loading() {
        let mut state = state_with_batch();
        assert!(!turns(&state, &CandidateFilter::default()).contains(&Turn::Typing));

        reduce(&mut state, ChatAction::SetLoading(true));
        let shown = turns(&state, &CandidateFilter::default());
        assert_eq!(shown.last(), Some(&Turn::Typing));
        assert_eq!(state.messages().len(), 4);

        reduce(&mut state, ChatAction::SetLoading(false));
        assert!(!turns(&state, &CandidateFilter::default()).contains(&Turn::Typing));
    }

    #[test]
    fn test_filters_hide_cards_but_keep_indices() {
        let state = state_with_batch();
        let mut filter = CandidateFilter::default();
        filter.toggle_platform("LinkedIn");
        filter.toggle_platform("TikTok");

        let shown = turns(&state, &filter);
        match &shown[3] {
            Turn::Candidates { cards, hidden, .. } => {
                let names: Vec<(usize, &str)> = cards.iter().map(|(i, c)| (*i, c.name.as_str())).collect();
                assert_eq!(names, vec![(1, "Ben"), (2, "Cy")]);
                assert_eq!(*hidden, 1);
            }
            other => panic!("unexpected turn {:?}", other),
        }

        filter.set_kind(KindFilter::Work);
        match &turns(&state, &filter)[3] {
            Turn::Candidates { cards, hidden, .. } => {
                assert_eq!(cards.len(), 1);
                assert_eq!(*hidden, 2);
            }
            other => panic!("unexpected turn {:?}", other),
        }
    }

    #[test]
    fn test_toggle_platform_twice_clears() {
        let mut filter = CandidateFilter::default();
        filter.toggle_platform("YouTube");
        assert!(filter.is_platform_selected("youtube"));
        filter.toggle_platform("youtube");
        assert_eq!(filter, CandidateFilter::default());
    }

    #[test]
    fn test_truncate_display() {
        assert_eq!(truncate_display("short", 10), "short");
        assert_eq!(truncate_display("hello world again", 11), "hello world…");
        assert_eq!(truncate_display("日本語テキスト", 6), "日本語…");
    }

    #[test]
    fn test_stars() {
        assert_eq!(stars(3), "★★★☆☆");
        assert_eq!(stars(9), "★★★★★");
    }
}
