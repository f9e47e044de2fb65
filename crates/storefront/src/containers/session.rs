//! Session and identity container.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use the_wind_core::account::MIN_PASSWORD_LENGTH;
use the_wind_core::{AuthResponse, CartIdentity, Email, GuestId, User};
use tracing::{debug, info, instrument, warn};

use super::{RequestStatus, StateCell, Tracked};
use crate::api::{ApiClient, ApiError};
use crate::error::{Operation, OperationError, clear_sentry_user, set_sentry_user};
use crate::storage::{SharedStore, keys};

/// Snapshot of the session slice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    /// Signed-in user, if any
    pub user: Option<User>,
    /// Anonymous cart owner; kept across sign-in so the guest cart can be
    /// merged
    pub guest_id: GuestId,
    pub status: RequestStatus,
}

impl Tracked for SessionState {
    fn status_mut(&mut self) -> &mut RequestStatus {
        &mut self.status
    }
}

/// Where to send the shopper after signing in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    Home,
    Checkout,
}

/// Resolve a `redirect` parameter: anything mentioning checkout goes back
/// to checkout, everything else goes home.
#[must_use]
pub fn post_login_destination(redirect: Option<&str>) -> Destination {
    match redirect {
        Some(target) if target.contains("checkout") => Destination::Checkout,
        _ => Destination::Home,
    }
}

/// Holds the signed-in user and the guest identifier.
#[derive(Clone)]
pub struct SessionContainer {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    api: ApiClient,
    store: SharedStore,
    state: StateCell<SessionState>,
}

impl SessionContainer {
    /// Restore the session from the store, issuing a guest id on first use.
    #[must_use]
    pub fn new(api: ApiClient, store: SharedStore) -> Self {
        let user = load_user(&store);
        let guest_id = load_guest_id(&store).unwrap_or_else(|| issue_guest_id(&store));

        Self {
            inner: Arc::new(SessionInner {
                api,
                store,
                state: StateCell::new(SessionState {
                    user,
                    guest_id,
                    status: RequestStatus::default(),
                }),
            }),
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionState {
        self.inner.state.snapshot()
    }

    #[must_use]
    pub fn user(&self) -> Option<User> {
        self.inner.state.read(|state| state.user.clone())
    }

    #[must_use]
    pub fn guest_id(&self) -> GuestId {
        self.inner.state.read(|state| state.guest_id.clone())
    }

    #[must_use]
    pub fn is_signed_in(&self) -> bool {
        self.inner.state.read(|state| state.user.is_some())
    }

    /// Whether admin surfaces should be shown. The backend still enforces
    /// access on every admin call.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.inner
            .state
            .read(|state| state.user.as_ref().is_some_and(User::is_admin))
    }

    /// Owner parameters for cart calls: the user when signed in, and the
    /// guest id always.
    #[must_use]
    pub fn cart_identity(&self) -> CartIdentity {
        self.inner.state.read(|state| CartIdentity {
            user_id: state.user.as_ref().map(|user| user.id.clone()),
            guest_id: Some(state.guest_id.clone()),
        })
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns `Failed to log in` on a malformed email or any backend
    /// failure; the session is left signed out.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &SecretString) -> Result<User, OperationError> {
        let email = Email::parse(email).map_err(|e| {
            self.inner
                .state
                .reject(Operation::Login, ApiError::InvalidInput(e.to_string()))
        })?;

        let call = self.inner.api.login(&email, password);
        self.authenticate(Operation::Login, call).await
    }

    /// Create an account and sign in with it.
    ///
    /// The name must be non-blank, the email well formed and the password
    /// at least six characters; otherwise no request is sent.
    ///
    /// # Errors
    ///
    /// Returns `Failed to register` on invalid input or any backend
    /// failure.
    #[instrument(skip(self, password))]
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &SecretString,
    ) -> Result<User, OperationError> {
        let email = validate_registration(name, email, password)
            .map_err(|e| self.inner.state.reject(Operation::Register, e))?;

        let call = self.inner.api.register(name.trim(), &email, password);
        self.authenticate(Operation::Register, call).await
    }

    /// Forget the signed-in user and start a fresh guest identity.
    ///
    /// Local only. Callers also clear the cart.
    pub fn logout(&self) {
        for key in [keys::USER_INFO, keys::USER_TOKEN] {
            if let Err(e) = self.inner.store.remove(key) {
                warn!(key, error = %e, "Failed to erase session record");
            }
        }
        let guest_id = issue_guest_id(&self.inner.store);

        self.inner.state.update(|state| {
            state.user = None;
            state.guest_id = guest_id;
            state.status = RequestStatus::default();
        });
        clear_sentry_user();
        info!("Signed out");
    }

    async fn authenticate(
        &self,
        operation: Operation,
        call: impl Future<Output = Result<AuthResponse, ApiError>>,
    ) -> Result<User, OperationError> {
        let store = &self.inner.store;
        let tokens = self.inner.api.tokens();
        let user = self
            .inner
            .state
            .track(operation, call, |state, auth| {
                match serde_json::to_string(&auth.user) {
                    Ok(raw) => {
                        if let Err(e) = store.set(keys::USER_INFO, &raw) {
                            warn!(error = %e, "Failed to persist user");
                        }
                    }
                    Err(e) => warn!(error = %e, "Failed to serialize user"),
                }
                if let Err(e) = tokens.save(&SecretString::from(auth.token)) {
                    warn!(error = %e, "Failed to persist token");
                }
                state.user = Some(auth.user.clone());
                auth.user
            })
            .await?;

        set_sentry_user(&user.id, Some(user.email.as_str()));
        info!(user_id = %user.id, role = %user.role, "Signed in");
        Ok(user)
    }
}

fn validate_registration(
    name: &str,
    email: &str,
    password: &SecretString,
) -> Result<Email, ApiError> {
    if name.trim().is_empty() {
        return Err(ApiError::InvalidInput("name is required".to_string()));
    }
    let email = Email::parse(email).map_err(|e| ApiError::InvalidInput(e.to_string()))?;
    if password.expose_secret().chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ApiError::InvalidInput(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(email)
}

fn load_user(store: &SharedStore) -> Option<User> {
    let raw = store
        .get(keys::USER_INFO)
        .map_err(|e| warn!(error = %e, "Failed to read stored user"))
        .ok()
        .flatten()?;
    serde_json::from_str(&raw)
        .map_err(|e| debug!(error = %e, "Stored user is not valid, starting signed out"))
        .ok()
}

fn load_guest_id(store: &SharedStore) -> Option<GuestId> {
    store
        .get(keys::GUEST_ID)
        .map_err(|e| warn!(error = %e, "Failed to read guest id"))
        .ok()
        .flatten()
        .filter(|raw| !raw.trim().is_empty())
        .map(GuestId::from)
}

fn issue_guest_id(store: &SharedStore) -> GuestId {
    let guest_id = GuestId::generate();
    if let Err(e) = store.set(keys::GUEST_ID, guest_id.as_str()) {
        warn!(error = %e, "Failed to persist guest id");
    }
    debug!(guest_id = %guest_id, "Issued guest id");
    guest_id
}
