use web_sys::Element;

use crate::error::PageError;
use crate::http;

pub const LOGGED_IN: &str = "logged-in";
pub const LOGGED_OUT: &str = "logged-out";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    LoggedIn,
    LoggedOut,
}

impl SessionState {
    /// Only a 2xx status means a live session. Transport errors and
    /// timeouts count as logged out.
    pub fn from_status(status: Option<u16>) -> Self {
        match status {
            Some(code) if (200..300).contains(&code) => SessionState::LoggedIn,
            _ => SessionState::LoggedOut,
        }
    }

    pub fn apply(self, root: &Element) -> Result<(), PageError> {
        let classes = root.class_list();
        match self {
            SessionState::LoggedIn => {
                classes.add_1(LOGGED_IN)?;
                classes.remove_1(LOGGED_OUT)?;
            }
            SessionState::LoggedOut => {
                classes.add_1(LOGGED_OUT)?;
                classes.remove_1(LOGGED_IN)?;
            }
        }
        Ok(())
    }
}

/// Asks the session endpoint whether the visitor is logged in. Never fails;
/// problems are logged and reported as `LoggedOut`.
pub async fn probe(url: &str, timeout_ms: u64) -> SessionState {
    let outcome = http::get(url, timeout_ms).await.map(|r| r.status());
    if let Err(err) = &outcome {
        log::debug!("session probe failed: {err}");
    }
    SessionState::from_status(outcome.ok())
}
