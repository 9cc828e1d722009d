//! Session controller. It owns the [`SessionState`] behind a watch channel, so
//! every transition is applied in one step and observers (guards, navigation)
//! only ever see complete states. No lock is held across a network call.

use super::{
    client::AuthApi,
    mirror::{MirrorSnapshot, PersistedMirror},
    state::SessionState,
    types::{Credentials, UserRecord},
    SessionError, LOGIN_FAILED,
};
use crate::storage::{SessionStorage, StorageEvent};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use tokio::{
    sync::{broadcast, broadcast::error::RecvError, watch, Mutex},
    task::JoinHandle,
};
use tracing::{debug, info, warn};

pub struct SessionController {
    api: Arc<dyn AuthApi>,
    mirror: Option<PersistedMirror>,
    state: watch::Sender<SessionState>,
    started: AtomicBool,
    sign_in_gate: Mutex<()>,
}

impl SessionController {
    /// Controller for an interactive context, persisting its mirror in `storage`.
    pub fn new(api: Arc<dyn AuthApi>, storage: Arc<dyn SessionStorage>) -> Self {
        Self::build(api, Some(PersistedMirror::new(storage)))
    }

    /// Controller for a non-interactive context: no storage area, and
    /// `initialize` never reaches the network.
    pub fn headless(api: Arc<dyn AuthApi>) -> Self {
        Self::build(api, None)
    }

    fn build(api: Arc<dyn AuthApi>, mirror: Option<PersistedMirror>) -> Self {
        let (state, _) = watch::channel(SessionState::default());
        Self {
            api,
            mirror,
            state,
            started: AtomicBool::new(false),
            sign_in_gate: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn is_interactive(&self) -> bool {
        self.mirror.is_some()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionState {
        self.state.borrow().clone()
    }

    #[must_use]
    pub fn is_authenticated_now(&self) -> bool {
        self.state.borrow().is_authenticated
    }

    /// Last identity found in the mirror, for painting before the server answers.
    /// Does not change the session state. A corrupt mirror is cleared.
    #[must_use]
    pub fn restored_user(&self) -> Option<UserRecord> {
        match self.mirror.as_ref()?.read() {
            MirrorSnapshot::Present(user) => Some(user),
            MirrorSnapshot::Absent => None,
            MirrorSnapshot::Corrupt => {
                warn!("Discarding corrupt session mirror");
                self.forget();
                None
            }
        }
    }

    /// Startup entry point. Only the first call does anything.
    pub async fn initialize(&self) {
        if self.started.swap(true, Ordering::SeqCst) {
            debug!("Session controller already initialized");
            return;
        }

        if self.is_interactive() {
            self.check_status().await;
        } else {
            debug!("No storage area, skipping session status check");
            self.update(SessionState::mark_initialized);
        }
    }

    /// Asks the server who we are. Every failure resolves to unauthenticated.
    pub async fn check_status(&self) {
        self.update(SessionState::begin_check);

        match self.api.fetch_profile().await {
            Ok(user) => {
                debug!("Session status check succeeded");
                self.update(|state| state.authenticate(user.clone()));
                self.persist(&user);
            }
            Err(err) => {
                if err.is_transport() {
                    warn!("Server unreachable during session status check: {err}");
                } else {
                    debug!("Session status check failed: {err}");
                }
                self.update(SessionState::reject);
                self.forget();
            }
        }
    }

    /// Signs in and fetches the full profile.
    ///
    /// # Errors
    /// Returns [`SessionError::SignIn`] when the sign-in call fails (the same
    /// message is recorded in the state), or [`SessionError::SignInInProgress`]
    /// when another sign-in has not finished yet.
    pub async fn sign_in(&self, credentials: &Credentials) -> Result<UserRecord, SessionError> {
        let Ok(_gate) = self.sign_in_gate.try_lock() else {
            return Err(SessionError::SignInInProgress);
        };

        self.update(SessionState::begin_sign_in);

        let request = credentials.sign_in_request();
        if let Err(err) = self.api.sign_in(&request).await {
            let message = err
                .server_message()
                .map_or_else(|| LOGIN_FAILED.to_string(), ToString::to_string);
            warn!(status = ?err.status(), "Sign-in failed: {err}");
            self.update(|state| state.fail_sign_in(message.clone()));
            self.forget();
            return Err(SessionError::SignIn {
                message,
                source: err,
            });
        }

        let user = match self.api.fetch_profile().await {
            Ok(profile) => profile,
            Err(err) => {
                warn!("Profile fetch after sign-in failed, using the submitted email: {err}");
                UserRecord::from_email(credentials.email())
            }
        };

        info!("Signed in");
        self.update(|state| state.authenticate(user.clone()));
        self.persist(&user);

        Ok(user)
    }

    /// Signs out on the server and, whatever the outcome, locally. The state
    /// stays `loading` until the server answers.
    pub async fn sign_out(&self) {
        self.update(SessionState::begin_sign_out);

        if let Err(err) = self.api.sign_out().await {
            warn!("Server sign-out failed, clearing the local session anyway: {err}");
        }

        self.update(SessionState::sign_out);
        self.forget();
        info!("Signed out");
    }

    /// Re-evaluates the session after the storage area changed elsewhere.
    ///
    /// A mirror that disappeared (or broke) ends a local session without a
    /// network call; a mirror that appeared is confirmed with the server before
    /// the session counts as authenticated.
    pub async fn apply_storage_event(&self, event: &StorageEvent) {
        if !PersistedMirror::is_affected_by(event) {
            return;
        }
        let Some(mirror) = &self.mirror else {
            return;
        };

        let current = self.snapshot();
        match mirror.read() {
            MirrorSnapshot::Present(user) => {
                let changed = current.user.as_ref() != Some(&user);
                if !current.loading && (!current.is_authenticated || changed) {
                    debug!("Session mirror changed elsewhere, checking status");
                    self.check_status().await;
                }
            }
            MirrorSnapshot::Absent | MirrorSnapshot::Corrupt => {
                if current.is_authenticated {
                    debug!("Session mirror cleared elsewhere, signing out locally");
                    self.update(SessionState::sign_out);
                }
            }
        }
    }

    /// Drives [`Self::apply_storage_event`] from a storage subscription until the
    /// storage area goes away.
    pub fn spawn_storage_sync(
        self: Arc<Self>,
        mut events: broadcast::Receiver<StorageEvent>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => self.apply_storage_event(&event).await,
                    Err(RecvError::Lagged(skipped)) => {
                        debug!(skipped, "Storage events lagged, re-reading the mirror");
                        let everything = StorageEvent {
                            key: None,
                            old_value: None,
                            new_value: None,
                        };
                        self.apply_storage_event(&everything).await;
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }

    fn update(&self, transition: impl FnOnce(&mut SessionState)) {
        self.state.send_modify(transition);
    }

    fn persist(&self, user: &UserRecord) {
        if let Some(mirror) = &self.mirror {
            if let Err(err) = mirror.write(user) {
                warn!("Failed to persist session mirror: {err}");
            }
        }
    }

    fn forget(&self) {
        if let Some(mirror) = &self.mirror {
            if let Err(err) = mirror.clear() {
                warn!("Failed to clear session mirror: {err}");
            }
        }
    }
}
