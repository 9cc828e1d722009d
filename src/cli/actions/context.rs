//! Per-invocation wiring: one API client with the saved cookies, a session
//! controller over the on-disk mirror, and the route guards on top of it.

use crate::{
    api::ApiClient,
    cli::globals::GlobalArgs,
    routes::{Resolution, Router},
    session::SessionController,
    storage::{FileStorage, SessionStorage},
};
use anyhow::{bail, Result};
use std::sync::Arc;
use tracing::debug;

const KEY_COOKIE: &str = "cookie";

pub struct Context {
    pub api: ApiClient,
    pub controller: Arc<SessionController>,
    credentials: FileStorage,
}

impl Context {
    /// # Errors
    /// Returns an error if the API configuration is invalid.
    pub fn open(globals: &GlobalArgs) -> Result<Self> {
        let api = ApiClient::new(&globals.api_config()?)?;
        let credentials = FileStorage::new(globals.credentials_file());

        if let Some(header) = credentials.get_item(KEY_COOKIE) {
            debug!(path = %credentials.path().display(), "Restoring saved API cookies");
            api.restore_cookies(&header);
        }

        let session = FileStorage::new(globals.session_file());
        debug!(path = %session.path().display(), "Using session mirror");
        let storage: Arc<dyn SessionStorage> = Arc::new(session);
        let controller = Arc::new(SessionController::new(Arc::new(api.clone()), storage));

        Ok(Self {
            api,
            controller,
            credentials,
        })
    }

    #[must_use]
    pub fn router(&self) -> Router {
        Router::new(self.controller.subscribe())
    }

    /// Runs startup (at most one status check) and resolves `path` through the guards.
    pub async fn navigate(&self, path: &str) -> Resolution {
        self.controller.initialize().await;
        self.router().navigate(path).await
    }

    /// Like [`Self::navigate`], but fails unless the page renders.
    ///
    /// # Errors
    /// Returns an error naming the redirect target when the guard blocks `path`.
    pub async fn require_page(&self, path: &str) -> Result<()> {
        match self.navigate(path).await {
            Resolution::Render(_) => Ok(()),
            Resolution::Redirect(location) => {
                bail!("{path} is not available in this session (redirected to {location}); run `storefront signin` first")
            }
        }
    }

    /// Saves the jar's cookies for the next run, or removes them when the jar is empty.
    ///
    /// # Errors
    /// Returns an error if the credentials file cannot be written.
    pub fn save_cookies(&self) -> Result<()> {
        match self.api.cookie_header() {
            Some(header) => self.credentials.set_item(KEY_COOKIE, &header)?,
            None => self.credentials.remove_item(KEY_COOKIE)?,
        }
        Ok(())
    }

    /// # Errors
    /// Returns an error if the credentials file cannot be written.
    pub fn forget_cookies(&self) -> Result<()> {
        self.credentials.remove_item(KEY_COOKIE)?;
        Ok(())
    }
}
