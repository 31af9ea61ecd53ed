//! Auth context for managing user authentication state
//!
//! This module provides a reactive authentication context that:
//! - Mirrors the persisted session as signals the views can bind to
//! - Handles login, logout, registration flows
//! - Verifies a restored session against the server on startup

use leptos::prelude::*;
use serde::Serialize;

use crate::core::{ApiError, AuthResponse, AuthService, Credentials, Role, User};

/// Authentication state
#[derive(Debug, Clone, PartialEq, Default)]
pub enum AuthState {
    /// Initial state, checking the stored session
    #[default]
    Loading,
    /// User is not authenticated
    Anonymous,
    /// User is authenticated
    Authenticated(User),
}

/// Auth context providing authentication state and actions
#[derive(Clone)]
pub struct AuthContext {
    /// Current authentication state
    pub state: RwSignal<AuthState>,
    /// Loading state for auth operations
    pub loading: RwSignal<bool>,
    /// Error message from last operation
    pub error: RwSignal<Option<String>>,
    service: AuthService,
}

impl AuthContext {
    pub fn new(service: AuthService) -> Self {
        Self {
            state: RwSignal::new(AuthState::Loading),
            loading: RwSignal::new(false),
            error: RwSignal::new(None),
            service,
        }
    }

    pub fn service(&self) -> &AuthService {
        &self.service
    }

    /// Check if user is authenticated
    pub fn is_authenticated(&self) -> bool {
        matches!(self.state.get(), AuthState::Authenticated(_))
    }

    /// Get current user (if authenticated)
    pub fn user(&self) -> Option<User> {
        match self.state.get() {
            AuthState::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    /// Role of the signed-in user; anonymous visitors are guests
    pub fn role(&self) -> Role {
        self.user().map_or(Role::Guest, |u| u.role)
    }

    /// Clear error message
    pub fn clear_error(&self) {
        self.error.set(None);
    }

    /// Restore the persisted session.
    ///
    /// The cached user is only trusted after `/auth/me` accepts the stored
    /// token. A 401 there has already ended the session; a network failure
    /// keeps the cached user so the panel still opens offline.
    pub async fn restore(&self) {
        if !self.service.is_authenticated() {
            self.state.set(AuthState::Anonymous);
            return;
        }

        self.state.set(AuthState::Loading);

        let state = match self.service.current_user().await {
            Ok(profile) => match self.resolve_user(Some(profile)) {
                Some(user) => AuthState::Authenticated(user),
                None => {
                    tracing::warn!("Profile response did not describe a user");
                    AuthState::Anonymous
                }
            },
            Err(e) if e.is_unauthorized() => AuthState::Anonymous,
            Err(e) => {
                tracing::warn!("Could not verify stored session: {}", e);
                self.service
                    .stored_user()
                    .map_or(AuthState::Anonymous, AuthState::Authenticated)
            }
        };

        self.state.set(state);
    }

    /// Login with email and password
    pub async fn login(&self, credentials: &Credentials) -> Result<AuthResponse, ApiError> {
        self.begin();
        let result = self.service.login(credentials).await;
        self.finish(result).await
    }

    /// Register a new user
    pub async fn register(&self, user_data: &impl Serialize) -> Result<AuthResponse, ApiError> {
        self.begin();
        let result = self.service.register(user_data).await;
        self.finish(result).await
    }

    /// Logout the current user
    pub fn logout(&self) {
        // Clear local state regardless of storage result
        if let Err(e) = self.service.logout() {
            tracing::error!("Failed to clear stored session: {}", e);
        }
        self.state.set(AuthState::Anonymous);
    }

    fn begin(&self) {
        self.loading.set(true);
        self.error.set(None);
    }

    async fn finish(
        &self,
        result: Result<AuthResponse, ApiError>,
    ) -> Result<AuthResponse, ApiError> {
        match &result {
            Ok(response) if self.service.is_authenticated() => {
                let user = match response.user.clone() {
                    Some(user) => Some(user),
                    None => self.resolve_user(self.service.current_user().await.ok()),
                };
                if let Some(user) = user {
                    self.state.set(AuthState::Authenticated(user));
                }
            }
            Ok(_) => {}
            Err(e) => self.error.set(Some(e.message())),
        }

        self.loading.set(false);
        result
    }

    /// Prefer the live profile, fall back to the cached user
    fn resolve_user(&self, profile: Option<serde_json::Value>) -> Option<User> {
        profile
            .and_then(|p| serde_json::from_value::<User>(p).ok())
            .or_else(|| self.service.stored_user())
    }
}

/// Provide auth context to the component tree
pub fn provide_auth_context(service: AuthService) -> AuthContext {
    let ctx = AuthContext::new(service);
    provide_context(ctx.clone());
    ctx
}

/// Get auth context from the component tree
pub fn use_auth_context() -> AuthContext {
    expect_context::<AuthContext>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::RefreshPolicy;
    use crate::core::session::Session;
    use crate::core::test_support::{MockApi, RefreshBehavior, context_for, test_context};
    use serde_json::json;

    async fn setup() -> (MockApi, AuthContext, Owner) {
        let mock = MockApi::spawn().await;
        let (ctx, _nav) = test_context(&mock, RefreshPolicy::Coalesced);
        let owner = Owner::new();
        let auth = owner.with(|| provide_auth_context(AuthService::new(&ctx)));
        (mock, auth, owner)
    }

    #[tokio::test]
    async fn test_starts_loading() {
        let (_mock, auth, _owner) = setup().await;
        assert_eq!(auth.state.get_untracked(), AuthState::Loading);
        assert!(!auth.loading.get_untracked());
    }

    #[tokio::test]
    async fn test_context_is_provided() {
        let (_mock, auth, owner) = setup().await;
        let found = owner.with(use_auth_context);

        found.state.set(AuthState::Anonymous);

        assert_eq!(auth.state.get_untracked(), AuthState::Anonymous);
    }

    #[tokio::test]
    async fn test_restore_without_session() {
        let (mock, auth, _owner) = setup().await;

        auth.restore().await;

        assert_eq!(auth.state.get_untracked(), AuthState::Anonymous);
        assert!(mock.requests().is_empty());
    }

    #[tokio::test]
    async fn test_restore_verifies_with_server() {
        let (mock, auth, _owner) = setup().await;
        auth.service()
            .context()
            .tokens()
            .set(&Session::new("T1", "R1", None))
            .unwrap();

        auth.restore().await;

        match auth.state.get_untracked() {
            AuthState::Authenticated(user) => {
                assert_eq!(user.user_id, 1);
                assert_eq!(user.extra.get("name"), Some(&json!("Ada")));
            }
            other => panic!("unexpected state {other:?}"),
        }
        assert_eq!(mock.requests_to("/api/auth/me").len(), 1);
    }

    #[tokio::test]
    async fn test_restore_with_rejected_session() {
        let (mock, auth, _owner) = setup().await;
        mock.accept_only("T2");
        mock.on_refresh(RefreshBehavior::Reject);
        auth.service()
            .context()
            .tokens()
            .set(&Session::new("T1", "R1", None))
            .unwrap();

        auth.restore().await;

        assert_eq!(auth.state.get_untracked(), AuthState::Anonymous);
        assert!(!auth.service().is_authenticated());
    }

    #[tokio::test]
    async fn test_restore_offline_keeps_cached_user() {
        let (ctx, _nav) = context_for("http://127.0.0.1:9/api", RefreshPolicy::Coalesced);
        let user: User =
            serde_json::from_value(json!({"user_id": 4, "role": "teacher"})).unwrap();
        ctx.tokens()
            .set(&Session::new("T1", "R1", Some(user.clone())))
            .unwrap();
        let owner = Owner::new();
        let auth = owner.with(|| provide_auth_context(AuthService::new(&ctx)));

        auth.restore().await;

        assert_eq!(auth.state.get_untracked(), AuthState::Authenticated(user));
    }

    #[tokio::test]
    async fn test_login_updates_state() {
        let (_mock, auth, _owner) = setup().await;

        auth.login(&Credentials::new("a@b.com", "x")).await.unwrap();

        match auth.state.get_untracked() {
            AuthState::Authenticated(user) => assert_eq!(user.role, Role::Officer),
            other => panic!("unexpected state {other:?}"),
        }
        assert!(auth.is_authenticated());
        assert_eq!(auth.role(), Role::Officer);
        assert!(!auth.loading.get_untracked());
        assert!(auth.error.get_untracked().is_none());
    }

    #[tokio::test]
    async fn test_login_without_user_fetches_profile() {
        let (mock, auth, _owner) = setup().await;
        mock.set_auth_response(json!({"access_token": "T1", "refresh_token": "R1"}));

        auth.login(&Credentials::new("a@b.com", "x")).await.unwrap();

        assert!(matches!(
            auth.state.get_untracked(),
            AuthState::Authenticated(_)
        ));
        assert_eq!(mock.requests_to("/api/auth/me").len(), 1);
    }

    #[tokio::test]
    async fn test_login_failure_sets_error() {
        let (_mock, auth, _owner) = setup().await;
        auth.state.set(AuthState::Anonymous);

        let result = auth.login(&Credentials::new("a@b.com", "wrong")).await;

        assert!(result.is_err());
        assert_eq!(
            auth.error.get_untracked().as_deref(),
            Some("Invalid email or password")
        );
        assert_eq!(auth.state.get_untracked(), AuthState::Anonymous);
        assert!(!auth.loading.get_untracked());

        auth.clear_error();
        assert!(auth.error.get_untracked().is_none());
    }

    #[tokio::test]
    async fn test_register_as_guest() {
        let (mock, auth, _owner) = setup().await;
        mock.set_auth_response(json!({
            "access_token": "G1",
            "refresh_token": "GR1",
            "user": {"user_id": 9, "role": "guest"}
        }));

        auth.register(&json!({"email": "g@school.edu", "password": "pw"}))
            .await
            .unwrap();

        match auth.state.get_untracked() {
            AuthState::Authenticated(user) => assert_eq!(user.role, Role::Guest),
            other => panic!("unexpected state {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_logout() {
        let (_mock, auth, _owner) = setup().await;
        auth.login(&Credentials::new("a@b.com", "x")).await.unwrap();

        auth.logout();

        assert_eq!(auth.state.get_untracked(), AuthState::Anonymous);
        assert!(auth.service().context().tokens().get().is_empty());
    }
}
