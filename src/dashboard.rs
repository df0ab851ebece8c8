use crate::activity::{self, Kind};
use crate::api::{RecentSearch, ScoutApi};
use crate::error::ApiError;
use crate::model::Candidate;

pub const DASHBOARD_ERROR: &str = "Could not load your dashboard.";

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardData {
    pub recent: Vec<RecentSearch>,
    pub saved: Vec<Candidate>,
}

/// `generation` moves on every new load and on `clear`, so a load that
/// finishes after the user moved on or signed out is dropped.
#[derive(Debug, Default)]
pub struct DashboardState {
    data: Option<DashboardData>,
    loading: bool,
    error: Option<String>,
    generation: u64,
}

impl DashboardState {
    pub fn data(&self) -> Option<&DashboardData> {
        self.data.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Marks a load as started. Returns the generation it belongs to.
    pub fn begin(&mut self) -> u64 {
        self.loading = true;
        self.error = None;
        self.generation += 1;
        self.generation
    }

    /// Applies both lists or neither. Returns false for a stale result.
    pub fn complete(&mut self, generation: u64, result: Result<DashboardData, ApiError>) -> bool {
        if generation != self.generation {
            tracing::debug!("dropping stale dashboard result (generation {} != {})", generation, self.generation);
            return false;
        }
        self.loading = false;
        match result {
            Ok(data) => {
                activity::log_with(
                    Kind::Dashboard,
                    format!("{} recent searches, {} saved candidates", data.recent.len(), data.saved.len()),
                );
                self.data = Some(data);
                self.error = None;
            }
            Err(e) => {
                tracing::warn!("dashboard load failed: {}", e);
                self.error = Some(DASHBOARD_ERROR.to_string());
            }
        }
        true
    }

    pub fn clear(&mut self) {
        *self = DashboardState {
            generation: self.generation + 1,
            ..DashboardState::default()
        };
    }
}

/// Fetches recent searches and saved candidates concurrently.
pub async fn load(api: &dyn ScoutApi, token: &str, user_id: &str) -> Result<DashboardData, ApiError> {
    let (recent, saved) = tokio::join!(api.recent_searches(token), api.saved_candidates(token, user_id));
    Ok(DashboardData {
        recent: recent?,
        saved: saved?,
    })
}
