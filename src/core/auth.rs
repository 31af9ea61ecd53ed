//! Authentication service
//!
//! Owns the session lifecycle: sign-in and registration persist the returned
//! session, logout clears it, and the refresh exchange is exposed as a
//! side-effect-free primitive that the interceptor builds on.
//!
//! Session states: Anonymous -> (login/register) -> Authenticated ->
//! (logout or failed refresh) -> Anonymous. Each 401 while authenticated
//! either rotates the access token or ends the session.

use serde::Serialize;

use crate::core::error::Result;
use crate::core::http::{ApiClient, ApiContext, RequestDescriptor};
use crate::core::session::{
    AuthResponse, Credentials, RefreshRequest, RefreshResponse, Session, User,
};

/// Exchange a refresh token for a new access token.
///
/// Sent as a single attempt: a 401 here means the refresh token itself was
/// rejected and must not trigger another refresh.
pub(crate) async fn exchange_refresh_token(
    client: &ApiClient,
    refresh_token: &str,
) -> Result<RefreshResponse> {
    let request = RequestDescriptor::post("auth/refresh")
        .json(&RefreshRequest { refresh_token })?
        .without_recovery();

    let token = client.context().tokens().access_token();
    let value = client.dispatch(&request, token.as_deref()).await?;
    Ok(serde_json::from_value(value)?)
}

#[derive(Clone, Debug)]
pub struct AuthService {
    api: ApiClient,
}

impl AuthService {
    pub fn new(ctx: &ApiContext) -> Self {
        Self {
            api: ApiClient::new(ctx),
        }
    }

    pub fn context(&self) -> &ApiContext {
        self.api.context()
    }

    /// Sign in; on success the session is persisted before returning.
    /// Failures, including bad credentials, propagate untouched.
    pub async fn login(&self, credentials: &Credentials) -> Result<AuthResponse> {
        self.authenticate("auth/login", credentials).await
    }

    /// Create an account and sign in with it
    pub async fn register(&self, user_data: &impl Serialize) -> Result<AuthResponse> {
        self.authenticate("auth/register", user_data).await
    }

    async fn authenticate(&self, path: &str, body: &impl Serialize) -> Result<AuthResponse> {
        let request = RequestDescriptor::post(path)
            .json(body)?
            .without_recovery();
        let response: AuthResponse = self.api.send(request).await?;

        if let Some(session) = Session::from_response(&response)? {
            self.context().tokens().set(&session)?;
            match &session.user {
                Some(user) => tracing::info!(user_id = user.user_id, role = %user.role, "Signed in"),
                None => tracing::info!("Signed in"),
            }
        }

        Ok(response)
    }

    /// Does not touch the token store; the caller decides what to persist
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<RefreshResponse> {
        exchange_refresh_token(&self.api, refresh_token).await
    }

    /// Live profile from `/auth/me`, never the cached copy
    pub async fn current_user(&self) -> Result<serde_json::Value> {
        self.api.send(RequestDescriptor::get("auth/me")).await
    }

    /// Ask the server whether the current access token is still valid
    pub async fn validate_token(&self) -> Result<serde_json::Value> {
        self.api.send(RequestDescriptor::post("auth/validate")).await
    }

    /// Local only; the server keeps no session to revoke
    pub fn logout(&self) -> Result<()> {
        self.context().tokens().clear()?;
        tracing::info!("Signed out");
        Ok(())
    }

    pub fn is_authenticated(&self) -> bool {
        self.context().tokens().is_authenticated()
    }

    pub fn stored_user(&self) -> Option<User> {
        self.context().tokens().user()
    }

    pub fn access_token(&self) -> Option<String> {
        self.context().tokens().access_token()
    }
}
