use crate::activity::{self, Kind};
use crate::api::{LoginResponse, ScoutApi};
use crate::error::ApiError;
use crate::forms::{LoginForm, RegisterForm};
use crate::model::User;
use crate::storage::{Storage, TOKEN_KEY, USER_KEY};

pub const LOGIN_FAILED: &str = "Login failed";
pub const REGISTRATION_FAILED: &str = "Registration failed";

/// Who is signed in. User and token are always set and cleared together,
/// in memory and in durable storage.
pub struct SessionStore {
    credentials: Option<(User, String)>,
    loading: bool,
    error: Option<String>,
    storage: Storage,
}

impl SessionStore {
    pub fn new(storage: Storage) -> Self {
        SessionStore {
            credentials: None,
            loading: false,
            error: None,
            storage,
        }
    }

    pub fn user(&self) -> Option<&User> {
        self.credentials.as_ref().map(|(user, _)| user)
    }

    pub fn token(&self) -> Option<&str> {
        self.credentials.as_ref().map(|(_, token)| token.as_str())
    }

    pub fn is_authenticated(&self) -> bool {
        self.credentials.is_some()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Seeds the in-memory session from durable storage. Run once at startup,
    /// before the first route is shown.
    pub fn restore_session(&mut self) -> bool {
        let token = match self.storage.get(TOKEN_KEY) {
            Ok(Some(token)) if !token.is_empty() => token,
            Ok(_) => return false,
            Err(e) => {
                tracing::warn!("could not read stored token: {}", e);
                return false;
            }
        };
        let user = match self.storage.get(USER_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<User>(&raw) {
                Ok(user) => user,
                Err(e) => {
                    tracing::warn!("stored user is unreadable, ignoring session: {}", e);
                    return false;
                }
            },
            Ok(None) => return false,
            Err(e) => {
                tracing::warn!("could not read stored user: {}", e);
                return false;
            }
        };

        activity::log_with(Kind::Auth, format!("Restored session for {}", user.email));
        self.credentials = Some((user, token));
        true
    }

    /// Marks an auth request as in flight. Returns false if one already is.
    pub fn start_request(&mut self) -> bool {
        if self.loading {
            return false;
        }
        self.loading = true;
        self.error = None;
        true
    }

    pub async fn register(api: &dyn ScoutApi, form: &RegisterForm) -> Result<String, ApiError> {
        api.register(form.fullname.trim(), form.email.trim(), &form.password).await
    }

    /// Registration never signs the user in; only the error flag changes.
    pub fn finish_register(&mut self, result: Result<String, ApiError>) -> Result<String, String> {
        self.loading = false;
        match result {
            Ok(message) => {
                activity::log_with(Kind::Auth, "Account created");
                self.error = None;
                Ok(message)
            }
            Err(e) => {
                tracing::warn!("registration failed: {}", e);
                let reason = e.user_message(REGISTRATION_FAILED);
                self.error = Some(reason.clone());
                Err(reason)
            }
        }
    }

    pub async fn login(api: &dyn ScoutApi, form: &LoginForm) -> Result<LoginResponse, ApiError> {
        api.login(form.email.trim(), &form.password).await
    }

    /// On success the pair is held in memory and written to storage. On
    /// failure the current session and storage are left as they were.
    pub fn finish_login(&mut self, result: Result<LoginResponse, ApiError>) -> Result<&User, String> {
        self.loading = false;
        match result {
            Ok(LoginResponse { token, user }) => {
                match serde_json::to_string(&user) {
                    Ok(user_json) => {
                        if let Err(e) = self.storage.set_all(&[(TOKEN_KEY, token.as_str()), (USER_KEY, user_json.as_str())]) {
                            tracing::warn!("could not persist session: {}", e);
                        }
                    }
                    Err(e) => tracing::warn!("could not serialize user: {}", e),
                }
                activity::log_with(Kind::Auth, format!("Signed in as {}", user.email));
                self.error = None;
                let (user, _) = self.credentials.insert((user, token));
                Ok(user)
            }
            Err(e) => {
                tracing::warn!("login failed: {}", e);
                let reason = e.user_message(LOGIN_FAILED);
                self.error = Some(reason.clone());
                Err(reason)
            }
        }
    }

    /// Always succeeds and makes no request.
    pub fn logout(&mut self) {
        self.credentials = None;
        self.error = None;
        if let Err(e) = self.storage.remove_all(&[TOKEN_KEY, USER_KEY]) {
            tracing::warn!("could not clear stored session: {}", e);
        }
        activity::log_with(Kind::Auth, "Signed out");
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    #[cfg(test)]
    pub fn into_storage(self) -> Storage {
        self.storage
    }
}
