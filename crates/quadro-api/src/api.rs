//! The operation surface.
//!
//! [`Api`] composes the store, the credential service, and the event
//! bus. Every mutation runs the same pipeline: validate the input,
//! authorize against the owning workspace, perform the write, append
//! an audit entry where the operation is item-scoped, and publish a
//! change event. Audit and publication failures are logged and never
//! fail a committed mutation.

use quadro_auth::{AuthConfig, AuthService, AuthSession, RegisterInput};
use quadro_core::access::Identity;
use quadro_core::error::{QuadroError, QuadroResult};
use quadro_core::models::activity::CreateActivity;
use quadro_core::models::user::User;
use quadro_core::repository::Store;
use uuid::Uuid;

use crate::events::EventBus;
use crate::input::{LoginRequest, RegisterRequest};

pub struct Api<S: Store + Clone> {
    store: S,
    auth: AuthService<S, S>,
    events: EventBus,
}

impl<S: Store + Clone> Api<S> {
    pub fn new(store: S, auth_config: AuthConfig, events: EventBus) -> Self {
        let auth = AuthService::new(store.clone(), store.clone(), auth_config);
        Self {
            store,
            auth,
            events,
        }
    }

    pub(crate) fn store(&self) -> &S {
        &self.store
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Resolve a bearer access token into a caller identity.
    ///
    /// A token that fails verification, for any reason including
    /// expiry, leaves the caller anonymous: `UNAUTHENTICATED`, exactly
    /// as if no token had been presented. `INVALID_TOKEN` and
    /// `SESSION_EXPIRED` belong to the refresh flow only.
    pub fn authenticate(&self, access_token: &str) -> QuadroResult<Identity> {
        self.auth.verify_access(access_token).map_err(|e| {
            tracing::debug!(error = %e, "access token rejected");
            QuadroError::Unauthenticated
        })
    }

    pub async fn register(&self, request: RegisterRequest) -> QuadroResult<AuthSession> {
        request.validate()?;
        self.auth
            .register(RegisterInput {
                email: request.email,
                name: request.name,
                password: request.password,
            })
            .await
    }

    pub async fn login(&self, request: LoginRequest) -> QuadroResult<AuthSession> {
        self.auth.login(&request.email, &request.password).await
    }

    /// Invalidate every session of the caller (all devices).
    pub async fn logout(&self, identity: Option<&Identity>) -> QuadroResult<()> {
        let identity = quadro_core::access::require_identity(identity)?;
        self.auth.logout(identity).await
    }

    pub async fn refresh(&self, refresh_token: &str) -> QuadroResult<AuthSession> {
        self.auth.refresh(refresh_token).await
    }

    pub async fn me(&self, identity: Option<&Identity>) -> QuadroResult<User> {
        let identity = quadro_core::access::require_identity(identity)?;
        self.auth.me(identity).await
    }

    /// Append an audit entry for a committed mutation. Failure is
    /// logged, not propagated: the mutation already happened.
    pub(crate) async fn record_activity(&self, input: CreateActivity) {
        let kind = input.kind.as_str();
        if let Err(e) = self.store.append_activity(input).await {
            tracing::warn!(error = %e, kind, "failed to append activity entry");
        }
    }

    pub(crate) fn identity_required<'a>(
        &self,
        identity: Option<&'a Identity>,
    ) -> QuadroResult<&'a Identity> {
        quadro_core::access::require_identity(identity)
    }

    /// Workspace ids the caller belongs to, used to scope searches.
    pub(crate) async fn accessible_workspaces(&self, user_id: Uuid) -> QuadroResult<Vec<Uuid>> {
        let memberships = self.store.memberships_for_user(user_id).await?;
        Ok(memberships.into_iter().map(|m| m.workspace_id).collect())
    }
}
