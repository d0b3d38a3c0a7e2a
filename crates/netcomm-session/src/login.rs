//! The login rendezvous.
//!
//! ```text
//!            start_login()
//!   Idle ─────────────────→ Pending ──report_login_success()──→ Succeeded
//!    ↑                         │
//!    │ (wait timed out)        └──report_disconnect(reason)───→ Failed(reason)
//!    └─────────────────────────┘
//! ```
//!
//! The state lives in a `watch` channel, so any number of tasks can wait
//! on it and a resolution that happens before anyone waits is not lost.
//! Only `Pending` can be resolved, and only once.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::watch;

use crate::{DisconnectReason, SessionError};

/// Something that can close the connection the login runs on.
///
/// Called from the executor task, so it must not block or wait for the
/// workers.
pub trait Teardown: Send + Sync {
    fn teardown(&self);
}

/// Notified when the server drops an established session.
pub type DisconnectHandler = Arc<dyn Fn(DisconnectReason) + Send + Sync>;

/// Where the login handshake stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginState {
    /// No login in progress.
    Idle,
    /// Login command sent, no answer yet.
    Pending,
    Succeeded,
    /// The server answered with a disconnect.
    Failed(DisconnectReason),
}

impl LoginState {
    pub fn is_pending(self) -> bool {
        self == Self::Pending
    }
}

/// One-shot login rendezvous between the caller and the executor.
pub struct LoginMonitor {
    state: watch::Sender<LoginState>,
    teardown: Mutex<Option<Arc<dyn Teardown>>>,
    on_disconnect: Mutex<Option<DisconnectHandler>>,
}

impl LoginMonitor {
    pub fn new() -> Self {
        Self {
            state: watch::channel(LoginState::Idle).0,
            teardown: Mutex::new(None),
            on_disconnect: Mutex::new(None),
        }
    }

    /// Installs the handler told about disconnects outside a login.
    pub fn set_disconnect_handler(&self, handler: DisconnectHandler) {
        *lock(&self.on_disconnect) = Some(handler);
    }

    /// Marks a login as in progress. `teardown` closes the connection if
    /// the server answers with a disconnect.
    pub fn start_login(&self, teardown: Arc<dyn Teardown>) {
        *lock(&self.teardown) = Some(teardown);
        self.state.send_replace(LoginState::Pending);
        tracing::debug!("login started");
    }

    /// Current state.
    pub fn state(&self) -> LoginState {
        *self.state.borrow()
    }

    /// Subscribes to state changes.
    pub fn subscribe(&self) -> watch::Receiver<LoginState> {
        self.state.subscribe()
    }

    /// Waits until the pending login resolves or `timeout` elapses, then
    /// returns [`is_login_successful`](Self::is_login_successful).
    ///
    /// Returns at once when no login is pending. A timed-out login is
    /// abandoned: the state goes back to [`LoginState::Idle`] and a late
    /// answer is ignored.
    pub async fn wait_until_login_done(&self, timeout: Duration) -> bool {
        let mut rx = self.state.subscribe();
        let resolved = tokio::time::timeout(
            timeout,
            rx.wait_for(|state| !state.is_pending()),
        )
        .await
        .is_ok();

        if !resolved {
            let abandoned = self.state.send_if_modified(|state| {
                if state.is_pending() {
                    *state = LoginState::Idle;
                    true
                } else {
                    false
                }
            });
            if abandoned {
                tracing::warn!(?timeout, "login timed out");
            }
        }
        self.is_login_successful()
    }

    /// Like [`wait_until_login_done`](Self::wait_until_login_done), but
    /// says why a login failed.
    ///
    /// # Errors
    /// [`SessionError::NotPending`] if no login was started,
    /// [`SessionError::Rejected`] if the server refused it,
    /// [`SessionError::TimedOut`] if nothing arrived in time.
    pub async fn wait_for_login(
        &self,
        timeout: Duration,
    ) -> Result<(), SessionError> {
        if self.state() == LoginState::Idle {
            return Err(SessionError::NotPending);
        }
        if self.wait_until_login_done(timeout).await {
            return Ok(());
        }
        match self.state() {
            LoginState::Failed(reason) => Err(SessionError::Rejected(reason)),
            _ => Err(SessionError::TimedOut(timeout)),
        }
    }

    /// Resolves a pending login as successful.
    pub fn report_login_success(&self) {
        let resolved = self.state.send_if_modified(|state| {
            if state.is_pending() {
                *state = LoginState::Succeeded;
                true
            } else {
                false
            }
        });
        if resolved {
            tracing::info!("login successful");
        } else {
            tracing::debug!(state = ?self.state(), "login success without pending login, ignored");
        }
    }

    /// `true` once the server accepted the login.
    pub fn is_login_successful(&self) -> bool {
        self.state() == LoginState::Succeeded
    }

    /// Handles the server's disconnect reply.
    ///
    /// During a login this fails the login and closes the connection.
    /// Otherwise the session was established: the connection is closed and
    /// the disconnect handler is told why.
    pub fn report_disconnect(&self, reason: DisconnectReason) {
        // Close the connection before waking the login waiter, so it
        // never sees a refused login on a live connection. Cloned out of
        // the lock so the teardown may call back in.
        let teardown = lock(&self.teardown).clone();
        if let Some(teardown) = teardown {
            teardown.teardown();
        }

        let failed_login = self.state.send_if_modified(|state| {
            if state.is_pending() {
                *state = LoginState::Failed(reason);
                true
            } else {
                false
            }
        });
        if failed_login {
            tracing::warn!(%reason, code = reason.code(), "login refused by server");
            return;
        }

        tracing::warn!(%reason, code = reason.code(), "disconnected by server");
        let handler = lock(&self.on_disconnect).clone();
        match handler {
            Some(handler) => handler(reason),
            None => tracing::debug!("no disconnect handler installed"),
        }
    }
}

impl Default for LoginMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for LoginMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginMonitor")
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}
