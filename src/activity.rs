use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use std::collections::VecDeque;
use std::sync::Mutex;

const MAX_LOG_LINES: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Info,
    Auth,
    Search,
    History,
    Dashboard,
}

impl Kind {
    pub fn label(&self) -> &'static str {
        match self {
            Kind::Info => "info",
            Kind::Auth => "auth",
            Kind::Search => "search",
            Kind::History => "history",
            Kind::Dashboard => "dashboard",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Entry {
    pub text: String,
    pub kind: Kind,
    pub at: DateTime<Utc>,
}

static ACTIVITY_LOG: Lazy<Mutex<VecDeque<Entry>>> =
    Lazy::new(|| Mutex::new(VecDeque::with_capacity(MAX_LOG_LINES)));

pub fn log<T: Into<String>>(line: T) {
    log_with(Kind::Info, line);
}

pub fn log_with<T: Into<String>>(kind: Kind, line: T) {
    if let Ok(mut buf) = ACTIVITY_LOG.lock() {
        let text = line.into();
        tracing::debug!(kind = kind.label(), "{}", text);
        if buf.len() >= MAX_LOG_LINES {
            buf.pop_front();
        }
        buf.push_back(Entry {
            text,
            kind,
            at: Utc::now(),
        });
    }
}

pub fn recent(n: usize) -> Vec<Entry> {
    if let Ok(buf) = ACTIVITY_LOG.lock() {
        let len = buf.len();
        let take = n.min(len);
        buf.iter().skip(len - take).cloned().collect()
    } else {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recent_returns_latest_in_order() {
        // Shared global buffer: other tests may log concurrently, so only check our own tail.
        log_with(Kind::Search, "activity-test-first");
        log_with(Kind::History, "activity-test-second");

        let entries = recent(MAX_LOG_LINES);
        let ours: Vec<_> = entries
            .iter()
            .filter(|e| e.text.starts_with("activity-test-"))
            .collect();
        assert_eq!(ours.len(), 2);
        assert_eq!(ours[0].text, "activity-test-first");
        assert_eq!(ours[1].kind, Kind::History);
    }

    #[test]
    fn test_buffer_is_bounded() {
        for i in 0..(MAX_LOG_LINES + 10) {
            log(format!("bounded-{}", i));
        }
        assert!(recent(usize::MAX).len() <= MAX_LOG_LINES);
    }
}
