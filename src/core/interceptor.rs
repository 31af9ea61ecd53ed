//! Auth interceptor pair
//!
//! Request phase: attach the stored access token as a bearer credential.
//! Response phase: on a 401 for a request that has not been retried, exchange
//! the refresh token, store the new access token and reissue the request once.
//! If the session cannot be recovered the token store is cleared, the user is
//! sent to the login page, and the original 401 is still returned to the caller.

use reqwest::RequestBuilder;

use crate::core::auth::exchange_refresh_token;
use crate::core::config::RefreshPolicy;
use crate::core::error::{ApiError, Result};
use crate::core::http::{ApiClient, ApiContext, RequestDescriptor};

/// Request phase
pub(crate) fn authorize(builder: RequestBuilder, token: Option<&str>) -> RequestBuilder {
    match token {
        Some(token) => builder.bearer_auth(token),
        None => builder,
    }
}

/// Response phase for a 401
///
/// `sent_with` is the access token the rejected attempt carried. The retried
/// request's own outcome, success or failure, is returned as-is.
pub(crate) async fn recover(
    client: &ApiClient,
    request: &RequestDescriptor,
    sent_with: Option<String>,
    error: ApiError,
) -> Result<serde_json::Value> {
    let ctx = client.context();
    let retry = request.retried();

    let token = match ctx.config().refresh_policy {
        RefreshPolicy::Coalesced => {
            let _gate = ctx.refresh_gate().lock().await;
            settle(client, sent_with.as_deref(), true).await
        }
        RefreshPolicy::PerRequest => settle(client, sent_with.as_deref(), false).await,
    };

    match token {
        Some(token) => {
            tracing::debug!(attempt = retry.attempt(), "Retrying with refreshed token");
            client.dispatch(&retry, Some(&token)).await
        }
        None => Err(error),
    }
}

/// Refresh, or end the session when that is impossible. `None` means no retry.
async fn settle(client: &ApiClient, sent_with: Option<&str>, reuse: bool) -> Option<String> {
    match refresh_or_reuse(client, sent_with, reuse).await {
        Ok(token) => Some(token),
        Err(reason) => {
            tracing::warn!("Session could not be refreshed: {}", reason);
            end_session(client.context(), sent_with);
            None
        }
    }
}

/// Produce a usable access token for the retry.
///
/// With `reuse` set, a token that differs from the rejected one means another
/// request already refreshed while this one waited at the gate.
async fn refresh_or_reuse(
    client: &ApiClient,
    sent_with: Option<&str>,
    reuse: bool,
) -> Result<String> {
    let tokens = client.context().tokens();

    let refreshed_meanwhile = tokens
        .access_token()
        .filter(|t| reuse && Some(t.as_str()) != sent_with);
    if let Some(current) = refreshed_meanwhile {
        tracing::debug!("Reusing access token refreshed by a concurrent request");
        return Ok(current);
    }

    let refresh_token = tokens
        .refresh_token()
        .ok_or_else(|| ApiError::InvalidSession("no refresh token stored".into()))?;

    let response = exchange_refresh_token(client, &refresh_token).await?;

    if !tokens.rotate_access_token(&response.access_token, response.refresh_token.as_deref())? {
        return Err(ApiError::InvalidSession(
            "session ended while the token was being refreshed".into(),
        ));
    }

    tracing::info!("Access token refreshed");
    Ok(response.access_token)
}

/// Clear the store and send the user to the login page.
///
/// A request that carried a token but finds the store already empty lost a
/// race with another request that ended the session and redirected.
fn end_session(ctx: &ApiContext, sent_with: Option<&str>) {
    if sent_with.is_some() && ctx.tokens().get().is_empty() {
        tracing::debug!("Session already ended by a concurrent request");
        return;
    }
    if let Err(e) = ctx.tokens().clear() {
        tracing::error!("Failed to clear session: {}", e);
    }
    ctx.navigator().navigate(&ctx.config().login_path);
}
