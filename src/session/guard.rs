use std::fmt;

use crate::error::{ClientError, ClientResult};
use crate::session::SessionStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Signup,
    Login,
    Home,
    User(String),
    Settings(String),
    CreatePost,
    Search,
    Comments(String),
}

impl Route {
    pub fn requires_auth(&self) -> bool {
        matches!(
            self,
            Route::User(_) | Route::Settings(_) | Route::CreatePost | Route::Comments(_)
        )
    }

    pub fn path(&self) -> String {
        match self {
            Route::Signup => "/signup".to_string(),
            Route::Login => "/login".to_string(),
            Route::Home => "/home".to_string(),
            Route::User(username) => format!("/user/{}", username),
            Route::Settings(username) => format!("/settings/{}", username),
            Route::CreatePost => "/create-post".to_string(),
            Route::Search => "/search".to_string(),
            Route::Comments(post_id) => format!("/comments/{}", post_id),
        }
    }

    /// Parse a client path. `/` is not a route of its own; see [`resolve`].
    pub fn parse(path: &str) -> Option<Route> {
        let trimmed = path.trim_matches('/');
        let mut parts = trimmed.splitn(2, '/');
        let head = parts.next()?;
        let tail = parts.next().filter(|t| !t.is_empty() && !t.contains('/'));

        match (head, tail) {
            ("signup", None) => Some(Route::Signup),
            ("login", None) => Some(Route::Login),
            ("home", None) => Some(Route::Home),
            ("create-post", None) => Some(Route::CreatePost),
            ("search", None) => Some(Route::Search),
            ("user", Some(name)) => Some(Route::User(name.to_string())),
            ("settings", Some(name)) => Some(Route::Settings(name.to_string())),
            ("comments", Some(id)) => Some(Route::Comments(id.to_string())),
            _ => None,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Credentials handed to a screen that passed the gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authenticated {
    pub token: String,
    pub username: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Gate {
    Open(Authenticated),
    Redirect(Route),
}

impl Gate {
    /// Open when a token is persisted, otherwise redirect to login.
    pub fn check(session: &SessionStore) -> ClientResult<Gate> {
        match session.token()? {
            Some(token) => Ok(Gate::Open(Authenticated {
                token,
                username: session.username()?,
            })),
            None => Ok(Gate::Redirect(Route::Login)),
        }
    }
}

/// Require a session for an action that is not a whole screen.
pub fn require(session: &SessionStore) -> ClientResult<Authenticated> {
    match Gate::check(session)? {
        Gate::Open(auth) => Ok(auth),
        Gate::Redirect(_) => Err(ClientError::NotAuthenticated),
    }
}

/// Outcome of navigating to a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    Render(Route),
    Redirect(Route),
    NotFound,
}

/// Route table: `/` goes home, protected routes need a session.
pub fn resolve(session: &SessionStore, path: &str) -> ClientResult<Resolved> {
    if path.trim_matches('/').is_empty() {
        return Ok(Resolved::Redirect(Route::Home));
    }

    let Some(route) = Route::parse(path) else {
        return Ok(Resolved::NotFound);
    };

    if !route.requires_auth() {
        return Ok(Resolved::Render(route));
    }

    Ok(match Gate::check(session)? {
        Gate::Open(_) => Resolved::Render(route),
        Gate::Redirect(to) => Resolved::Redirect(to),
    })
}
