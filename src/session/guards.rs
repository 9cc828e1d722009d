//! Navigation guards. They only read session state: a guard waits until the
//! controller has settled, then allows the navigation or redirects.
//! UX-only gating; real access control lives on the API.

use super::state::SessionState;
use tokio::sync::watch;
use url::form_urlencoded;

pub const SIGN_IN_ROUTE: &str = "/signin";
pub const LANDING_ROUTE: &str = "/";
/// Query parameter carrying the originally requested path to the sign-in page.
pub const RETURN_URL_PARAM: &str = "returnUrl";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Navigation {
    Allow,
    Redirect(Redirect),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Redirect {
    pub path: String,
    pub return_url: Option<String>,
}

impl Redirect {
    #[must_use]
    pub fn to_sign_in(return_url: &str) -> Self {
        Self {
            path: SIGN_IN_ROUTE.to_string(),
            return_url: Some(return_url.to_string()),
        }
    }

    #[must_use]
    pub fn to_landing() -> Self {
        Self {
            path: LANDING_ROUTE.to_string(),
            return_url: None,
        }
    }

    /// Target as a URL path with the return URL encoded in the query.
    #[must_use]
    pub fn location(&self) -> String {
        match &self.return_url {
            Some(return_url) => {
                let query = form_urlencoded::Serializer::new(String::new())
                    .append_pair(RETURN_URL_PARAM, return_url)
                    .finish();
                format!("{}?{query}", self.path)
            }
            None => self.path.clone(),
        }
    }
}

/// Protected-route decision, or `None` while the session has not settled.
#[must_use]
pub fn protected_decision(state: &SessionState, requested: &str) -> Option<Navigation> {
    if !state.is_settled() {
        return None;
    }
    if state.is_authenticated {
        Some(Navigation::Allow)
    } else {
        Some(Navigation::Redirect(Redirect::to_sign_in(requested)))
    }
}

/// Guest-only decision, or `None` before the first status check resolved.
#[must_use]
pub fn guest_decision(state: &SessionState) -> Option<Navigation> {
    if !state.is_initialized {
        return None;
    }
    if state.is_authenticated {
        Some(Navigation::Redirect(Redirect::to_landing()))
    } else {
        Some(Navigation::Allow)
    }
}

/// Waits until the session is initialized with nothing in flight, then allows
/// authenticated sessions and sends everyone else to the sign-in page with
/// `requested` as the return target. Fails closed if the controller goes away.
pub async fn require_auth(mut session: watch::Receiver<SessionState>, requested: &str) -> Navigation {
    let settled = session
        .wait_for(SessionState::is_settled)
        .await
        .map(|state| state.clone());

    settled
        .ok()
        .and_then(|state| protected_decision(&state, requested))
        .unwrap_or_else(|| Navigation::Redirect(Redirect::to_sign_in(requested)))
}

/// Waits until the session is initialized, then keeps authenticated sessions
/// away from guest-only pages.
pub async fn require_guest(mut session: watch::Receiver<SessionState>) -> Navigation {
    let initialized = session
        .wait_for(|state| state.is_initialized)
        .await
        .map(|state| state.clone());

    initialized
        .ok()
        .and_then(|state| guest_decision(&state))
        .unwrap_or(Navigation::Allow)
}
