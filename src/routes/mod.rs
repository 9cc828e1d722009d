//! Storefront route table and navigation resolution.
//!
//! Catalog, product details and add-product pages require a session; the sign-in
//! page is guest-only; anything else goes to the sign-in page.

use crate::session::{
    guards::{require_auth, require_guest, Navigation, Redirect, LANDING_ROUTE, SIGN_IN_ROUTE},
    SessionState,
};
use tokio::sync::watch;
use tracing::debug;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Page {
    Catalog,
    ProductDetails { id: i64 },
    AddProduct,
    SignIn,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Access {
    Protected,
    GuestOnly,
}

impl Page {
    #[must_use]
    pub fn access(self) -> Access {
        match self {
            Self::Catalog | Self::ProductDetails { .. } | Self::AddProduct => Access::Protected,
            Self::SignIn => Access::GuestOnly,
        }
    }
}

/// Outcome of a navigation once guards have run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    Render(Page),
    Redirect(String),
}

/// Matches a path (query string and fragment ignored) against the route table.
#[must_use]
pub fn match_route(path: &str) -> Option<Page> {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let trimmed = path.trim_end_matches('/');

    match trimmed {
        "" => Some(Page::Catalog),
        "/add-product" => Some(Page::AddProduct),
        "/signin" => Some(Page::SignIn),
        _ => trimmed
            .strip_prefix("/product/")
            .and_then(|id| id.parse::<i64>().ok())
            .map(|id| Page::ProductDetails { id }),
    }
}

/// Post sign-in destination from a `returnUrl` value. Only local absolute paths
/// are honored; anything else lands on the catalog. Control characters are
/// refused since browsers strip them (`/\t/host` reads as `//host`).
#[must_use]
pub fn return_destination(return_url: Option<&str>) -> String {
    match return_url.map(str::trim) {
        Some(url)
            if url.starts_with('/')
                && !url.starts_with("//")
                && !url.contains('\\')
                && !url.chars().any(char::is_control) =>
        {
            url.to_string()
        }
        _ => LANDING_ROUTE.to_string(),
    }
}

/// Resolves navigations against the route table using a session subscription.
#[derive(Clone)]
pub struct Router {
    session: watch::Receiver<SessionState>,
}

impl Router {
    pub fn new(session: watch::Receiver<SessionState>) -> Self {
        Self { session }
    }

    /// Runs the route's guard and returns what to show. Unknown paths redirect to
    /// the sign-in page.
    pub async fn navigate(&self, path: &str) -> Resolution {
        let Some(page) = match_route(path) else {
            debug!(path, "No route matched, redirecting to sign-in");
            return Resolution::Redirect(SIGN_IN_ROUTE.to_string());
        };

        let navigation = match page.access() {
            Access::Protected => require_auth(self.session.clone(), path).await,
            Access::GuestOnly => require_guest(self.session.clone()).await,
        };

        match navigation {
            Navigation::Allow => Resolution::Render(page),
            Navigation::Redirect(redirect) => {
                debug!(path, target = %redirect.location(), "Navigation redirected");
                Resolution::Redirect(redirect.location())
            }
        }
    }

    /// Destination after a successful sign-in started from `signin_location`
    /// (for example `/signin?returnUrl=%2Fadd-product`).
    #[must_use]
    pub fn after_sign_in(signin_location: &str) -> String {
        let query = signin_location.split_once('?').map(|(_, query)| query);
        let return_url = query.and_then(|query| {
            url::form_urlencoded::parse(query.as_bytes())
                .find(|(key, _)| key == crate::session::guards::RETURN_URL_PARAM)
                .map(|(_, value)| value.into_owned())
        });
        return_destination(return_url.as_deref())
    }

    /// Location of the sign-in page for a blocked protected path.
    #[must_use]
    pub fn sign_in_location(requested: &str) -> String {
        Redirect::to_sign_in(requested).location()
    }
}
