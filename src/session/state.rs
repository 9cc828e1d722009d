//! Session state snapshot and its transitions. Every transition is a single
//! method so the controller can apply it atomically; none of them may leave
//! `is_authenticated` set without a user.

use super::types::UserRecord;

/// Logical phase derived from a [`SessionState`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionPhase {
    Unknown,
    Checking,
    Authenticated,
    Unauthenticated,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionState {
    pub is_authenticated: bool,
    pub user: Option<UserRecord>,
    pub loading: bool,
    pub error: Option<String>,
    pub is_initialized: bool,
}

impl SessionState {
    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        if self.loading {
            SessionPhase::Checking
        } else if self.is_authenticated {
            SessionPhase::Authenticated
        } else if self.is_initialized {
            SessionPhase::Unauthenticated
        } else {
            SessionPhase::Unknown
        }
    }

    /// Initialized and no call in flight; access decisions may be taken.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.is_initialized && !self.loading
    }

    pub(crate) fn begin_check(&mut self) {
        self.loading = true;
    }

    pub(crate) fn begin_sign_in(&mut self) {
        self.loading = true;
        self.error = None;
    }

    pub(crate) fn authenticate(&mut self, user: UserRecord) {
        self.is_authenticated = true;
        self.user = Some(user);
        self.loading = false;
        self.is_initialized = true;
    }

    pub(crate) fn reject(&mut self) {
        self.is_authenticated = false;
        self.user = None;
        self.loading = false;
        self.is_initialized = true;
    }

    pub(crate) fn fail_sign_in(&mut self, message: String) {
        self.is_authenticated = false;
        self.user = None;
        self.error = Some(message);
        self.loading = false;
    }

    pub(crate) fn begin_sign_out(&mut self) {
        self.loading = true;
    }

    pub(crate) fn sign_out(&mut self) {
        self.is_authenticated = false;
        self.user = None;
        self.error = None;
        self.loading = false;
    }

    pub(crate) fn mark_initialized(&mut self) {
        self.is_initialized = true;
    }
}
