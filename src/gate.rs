use crate::{
    client::ApiClient,
    endpoints,
    session::{AuthState, Session, SessionUser},
    ApiError,
};
use tokio::sync::watch;

/// Predicate deciding whether an authenticated user may use the admin
/// application.
pub type AuthPolicy = dyn Fn(&SessionUser) -> bool + Send + Sync;

/// The process-wide authentication state machine.
///
/// Wraps the [`ApiClient`] and drives the session through
/// `{Initializing, Unauthenticated, Authenticated}`; every transition goes
/// through the session context, so subscribers always observe a consistent
/// state.
pub struct AuthGate {
    client: ApiClient,
    policy: Box<AuthPolicy>,
}

impl AuthGate {
    /// A gate permitting any authenticated user, the behavior the product
    /// currently ships with. Tighten with [`AuthGate::with_policy`] and
    /// [`policies::admin_only`].
    pub fn new(client: ApiClient) -> AuthGate {
        AuthGate::with_policy(client, Box::new(policies::allow_all))
    }

    pub fn with_policy(client: ApiClient, policy: Box<AuthPolicy>) -> AuthGate {
        AuthGate { client, policy }
    }

    pub fn client(&self) -> &ApiClient { &self.client }

    /// The most recently published state.
    pub fn state(&self) -> AuthState {
        self.client.session().state()
    }

    /// Observe state transitions.
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.client.session().subscribe()
    }

    /// Validate any stored credential and settle the initial state.
    ///
    /// A failure of any kind, network included, is treated the same as
    /// having no stored session at all.
    pub async fn initialize(&self) {
        let session = self.client.session();

        if session.credential().is_none() {
            session.invalidate();
            return;
        }

        match endpoints::current_user(&self.client).await {
            Ok(user) if (self.policy)(&user) => {
                log::info!("Restored the session for {}", user.username);
                session.authenticate(user);
            }
            Ok(user) => {
                log::warn!("{} does not have admin privileges", user.username);
                session.invalidate();
            }
            Err(err) => {
                log::warn!("The stored credential failed validation: {}", err);
                session.invalidate();
            }
        }
    }

    /// Authenticate and, on success, install the session.
    ///
    /// A user the policy rejects is logged straight back out; no
    /// half-authenticated state is left behind. On any failure path the
    /// state ends at [`AuthState::Unauthenticated`].
    pub async fn login(
        &self,
        identifier: &str,
        password: &str,
    ) -> Result<SessionUser, AuthError> {
        let session = self.client.session();

        if let Err(err) = validate_credentials(identifier, password) {
            session.invalidate();
            return Err(AuthError::Api(err));
        }

        let response = match endpoints::login(&self.client, identifier, password).await {
            Ok(response) => response,
            Err(err) => {
                session.invalidate();
                return Err(AuthError::Api(err));
            }
        };

        self.client.set_credential(Some(response.jwt));

        // Prefer the role-expanded record; fall back to the login response's
        // user when the follow-up fetch fails for anything short of a dead
        // credential.
        let user = match endpoints::current_user(&self.client).await {
            Ok(user) => user,
            Err(err @ ApiError::SessionExpired) => return Err(AuthError::Api(err)),
            Err(err) => {
                log::warn!(
                    "Could not fetch the role-expanded user, using the login response: {}",
                    err
                );
                response.user
            }
        };

        if !(self.policy)(&user) {
            log::warn!("{} does not have admin privileges", user.username);
            session.invalidate();
            return Err(AuthError::InsufficientPrivileges);
        }

        log::info!("Logged in as {}", user.username);
        session.authenticate(user.clone());

        Ok(user)
    }

    /// Tear the session down. Safe to call from any state, including before
    /// [`AuthGate::initialize`] has settled.
    pub fn logout(&self) {
        self.client.session().invalidate();
    }

    /// Re-fetch the current user for an authenticated session; any failure
    /// degrades to [`AuthGate::logout`].
    pub async fn refresh(&self) -> Result<SessionUser, AuthError> {
        match endpoints::current_user(&self.client).await {
            Ok(user) if (self.policy)(&user) => {
                self.client.session().authenticate(user.clone());
                Ok(user)
            }
            Ok(user) => {
                log::warn!("{} no longer has admin privileges", user.username);
                self.logout();
                Err(AuthError::InsufficientPrivileges)
            }
            Err(err) => {
                self.logout();
                Err(AuthError::Api(err))
            }
        }
    }
}

/// The login form's checks; nothing goes out for input this malformed.
fn validate_credentials(identifier: &str, password: &str) -> Result<(), ApiError> {
    if identifier.trim().is_empty() {
        return Err(ApiError::Validation(String::from("Введите логин или email")));
    }
    if password.is_empty() {
        return Err(ApiError::Validation(String::from("Введите пароль")));
    }
    if password.chars().count() < 3 {
        return Err(ApiError::Validation(String::from(
            "Пароль должен содержать минимум 3 символа",
        )));
    }

    Ok(())
}

/// Failures of the authentication gate.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The backend rejected the operation.
    #[error(transparent)]
    Api(#[from] ApiError),
    /// The account authenticated, but the policy denied admin access.
    #[error("У вас нет прав администратора")]
    InsufficientPrivileges,
}

/// Stock authorization policies.
pub mod policies {
    use crate::session::SessionUser;

    /// Permit any authenticated user.
    ///
    /// TODO: switch the default to a role check once the backend's roles
    /// are configured.
    pub fn allow_all(_: &SessionUser) -> bool {
        true
    }

    /// Permit only accounts whose role reads as administrative.
    pub fn admin_only(user: &SessionUser) -> bool {
        const ADMIN_ROLES: &[&str] =
            &["admin", "administrator", "super-admin", "authenticated"];

        let role = match &user.role {
            Some(role) => role,
            None => return false,
        };

        let kind = role
            .kind
            .as_deref()
            .or_else(|| role.name.as_deref())
            .unwrap_or("")
            .to_lowercase();
        let name = role
            .name
            .as_deref()
            .or_else(|| role.kind.as_deref())
            .unwrap_or("")
            .to_lowercase();

        ADMIN_ROLES.contains(&kind.as_str()) || ADMIN_ROLES.contains(&name.as_str())
    }
}
