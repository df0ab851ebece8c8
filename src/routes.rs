use url::Url;

// Only used to give relative app paths something to parse against.
const APP_ORIGIN: &str = "app://talent-scout";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Landing,
    Login,
    Register,
    Dashboard,
    Chat { thread_id: Option<String> },
    NotFound(String),
}

impl Route {
    /// Parses an in-app path such as `/chat?threadId=abc`.
    pub fn parse(path: &str) -> Route {
        let Ok(base) = Url::parse(APP_ORIGIN) else {
            return Route::NotFound(path.to_string());
        };
        let url = match base.join(path.trim()) {
            Ok(url) => url,
            Err(e) => {
                tracing::debug!("unparseable route {:?}: {}", path, e);
                return Route::NotFound(path.to_string());
            }
        };

        match url.path().trim_end_matches('/') {
            "" => Route::Landing,
            "/login" => Route::Login,
            "/register" => Route::Register,
            "/dashboard" => Route::Dashboard,
            "/chat" => {
                let thread_id = url
                    .query_pairs()
                    .find(|(key, _)| key == "threadId")
                    .map(|(_, value)| value.trim().to_string())
                    .filter(|value| !value.is_empty());
                Route::Chat { thread_id }
            }
            other => Route::NotFound(other.to_string()),
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Landing => "/".to_string(),
            Route::Login => "/login".to_string(),
            Route::Register => "/register".to_string(),
            Route::Dashboard => "/dashboard".to_string(),
            Route::Chat { thread_id: None } => "/chat".to_string(),
            Route::Chat { thread_id: Some(id) } => {
                let mut url = Url::parse(APP_ORIGIN)
                    .and_then(|base| base.join("/chat"))
                    .ok();
                match url.as_mut() {
                    Some(url) => {
                        url.query_pairs_mut().append_pair("threadId", id);
                        format!("{}?{}", url.path(), url.query().unwrap_or_default())
                    }
                    None => format!("/chat?threadId={}", id),
                }
            }
            Route::NotFound(path) => path.clone(),
        }
    }

    pub fn requires_session(&self) -> bool {
        matches!(self, Route::Dashboard | Route::Chat { .. })
    }

    fn is_auth_form(&self) -> bool {
        matches!(self, Route::Login | Route::Register)
    }
}

/// Where the user actually lands when asking for `route`.
pub fn gate(route: Route, authenticated: bool) -> Route {
    if route.requires_session() && !authenticated {
        tracing::debug!("{} needs a session, redirecting to login", route.path());
        Route::Login
    } else if route.is_auth_form() && authenticated {
        Route::Dashboard
    } else {
        route
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_routes() {
        assert_eq!(Route::parse("/"), Route::Landing);
        assert_eq!(Route::parse(""), Route::Landing);
        assert_eq!(Route::parse("/login"), Route::Login);
        assert_eq!(Route::parse("/register/"), Route::Register);
        assert_eq!(Route::parse("/dashboard"), Route::Dashboard);
        assert_eq!(Route::parse("/chat"), Route::Chat { thread_id: None });
    }

    #[test]
    fn test_parse_thread_id() {
        assert_eq!(
            Route::parse("/chat?threadId=abc-123"),
            Route::Chat { thread_id: Some("abc-123".to_string()) }
        );
        assert_eq!(
            Route::parse("/chat?threadId=a%20b&other=1"),
            Route::Chat { thread_id: Some("a b".to_string()) }
        );
        assert_eq!(Route::parse("/chat?threadId="), Route::Chat { thread_id: None });
    }

    #[test]
    fn test_unknown_is_not_found() {
        assert_eq!(Route::parse("/search"), Route::NotFound("/search".to_string()));
    }

    #[test]
    fn test_path_roundtrip() {
        let route = Route::Chat { thread_id: Some("t 1".to_string()) };
        assert_eq!(Route::parse(&route.path()), route);
        assert_eq!(Route::Dashboard.path(), "/dashboard");
    }

    #[test]
    fn test_gate() {
        assert_eq!(gate(Route::Dashboard, false), Route::Login);
        assert_eq!(gate(Route::Chat { thread_id: Some("t".into()) }, false), Route::Login);
        assert_eq!(gate(Route::Dashboard, true), Route::Dashboard);
        assert_eq!(gate(Route::Login, true), Route::Dashboard);
        assert_eq!(gate(Route::Register, false), Route::Register);
        assert_eq!(gate(Route::Landing, false), Route::Landing);
        assert_eq!(gate(Route::NotFound("/x".into()), false), Route::NotFound("/x".into()));
    }
}
