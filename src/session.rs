use crate::{store::SessionStore, Id};
use chrono::{DateTime, Utc};
use serde_derive::{Deserialize, Serialize};
use std::{
    fmt,
    sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
};
use tokio::sync::watch;

/// The authenticated principal, cached for display purposes.
///
/// Never authoritative: a [`SessionUser`] without a live credential must not
/// be trusted for access decisions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: Id,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default, rename = "createdAt")]
    pub created_at: Option<DateTime<Utc>>,
}

/// The role descriptor attached to a user record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Role {
    #[serde(default)]
    pub id: Option<Id>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

/// Where the session currently stands.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthState {
    /// Startup: a stored credential may still be under validation.
    Initializing,
    Unauthenticated,
    Authenticated(SessionUser),
}

impl AuthState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthState::Authenticated(_))
    }
}

/// Process-wide session state with a single mutation surface.
///
/// The credential and the cached user live here, mirrored from the durable
/// [`SessionStore`]. Other components hold a read capability plus
/// [`Session::subscribe`]; mutation happens only through the auth gate's
/// transitions and the API client's authorization-failure path.
pub struct Session {
    store: SessionStore,
    inner: RwLock<Inner>,
    tx: watch::Sender<AuthState>,
}

#[derive(Debug)]
struct Inner {
    credential: Option<String>,
    user: Option<SessionUser>,
}

impl Session {
    /// Create the session context, mirroring whatever the store already
    /// holds. The published state starts at [`AuthState::Initializing`]
    /// until the auth gate settles it.
    pub fn new(store: SessionStore) -> Session {
        let inner = Inner {
            credential: store.credential(),
            user: store.user(),
        };
        let (tx, _) = watch::channel(AuthState::Initializing);

        Session {
            store,
            inner: RwLock::new(inner),
            tx,
        }
    }

    /// The bearer token currently held, if any.
    pub fn credential(&self) -> Option<String> {
        self.read().credential.clone()
    }

    /// The cached user record, if any.
    pub fn user(&self) -> Option<SessionUser> {
        self.read().user.clone()
    }

    /// The most recently published state.
    pub fn state(&self) -> AuthState {
        self.tx.borrow().clone()
    }

    /// Observe state transitions; the receiver immediately sees the current
    /// value and is notified on every subsequent change.
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.tx.subscribe()
    }

    /// Install or drop the credential, keeping the durable store in sync.
    pub(crate) fn set_credential(&self, token: Option<String>) {
        self.store.set_credential(token.as_deref());
        self.write().credential = token;
    }

    /// Cache the user and publish [`AuthState::Authenticated`].
    pub(crate) fn authenticate(&self, user: SessionUser) {
        self.store.set_user(Some(&user));
        self.write().user = Some(user.clone());
        self.tx.send_replace(AuthState::Authenticated(user));
    }

    /// Tear the session down: credential and cached user are dropped from
    /// memory and from the store, and [`AuthState::Unauthenticated`] is
    /// published. Idempotent, and safe to call from any state.
    pub(crate) fn invalidate(&self) {
        let had_values = {
            let mut inner = self.write();
            let had_values = inner.credential.is_some() || inner.user.is_some();
            inner.credential = None;
            inner.user = None;
            had_values
        };
        self.store.clear();

        let already_settled =
            matches!(&*self.tx.borrow(), AuthState::Unauthenticated);
        if had_values || !already_settled {
            self.tx.send_replace(AuthState::Unauthenticated);
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("state", &self.state())
            .finish()
    }
}
