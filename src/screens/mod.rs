pub mod comments;
pub mod search;
pub mod settings;
pub mod user_panel;

use crate::error::ClientResult;
use crate::session::{Authenticated, Gate, Route, SessionStore};

pub use comments::CommentsScreen;
pub use search::SearchScreen;
pub use settings::SettingsScreen;
pub use user_panel::UserPanel;

/// Protected screens come back as `Redirect` without touching the network
/// when there is no token.
#[derive(Debug)]
pub enum Mounted<S> {
    Ready(S),
    Redirect(Route),
}

impl<S> Mounted<S> {
    pub fn ready(self) -> Option<S> {
        match self {
            Mounted::Ready(screen) => Some(screen),
            Mounted::Redirect(_) => None,
        }
    }

    pub fn redirect(&self) -> Option<&Route> {
        match self {
            Mounted::Redirect(route) => Some(route),
            Mounted::Ready(_) => None,
        }
    }
}

/// Gate check shared by every protected screen.
pub(crate) fn enter(session: &SessionStore) -> ClientResult<Result<Authenticated, Route>> {
    Ok(match Gate::check(session)? {
        Gate::Open(auth) => Ok(auth),
        Gate::Redirect(route) => {
            tracing::debug!(%route, "No session, redirecting");
            Err(route)
        }
    })
}

/// Username a per-user screen should show: the explicit one, else the session's own.
pub(crate) fn target_username(explicit: Option<&str>, auth: &Authenticated) -> Option<String> {
    explicit
        .map(str::to_string)
        .or_else(|| auth.username.clone())
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty() && name != "default")
}
