//! Session Middleware
//!
//! Resolves the session cookie once per request and exposes the outcome to
//! handlers through [`CurrentUser`].
//!
//! - valid session: `CurrentUser` is inserted into the request extensions
//! - unknown, expired or deactivated: the request proceeds anonymously and
//!   the response tells the browser to drop the cookie
//! - store failure: logged, the request proceeds anonymously, the cookie is
//!   left alone since the session may well be valid

use std::convert::Infallible;

use axum::extract::{FromRequestParts, OptionalFromRequestParts, Request, State};
use axum::http::{HeaderMap, header, request::Parts};
use axum::middleware::Next;
use axum::response::Response;

use platform::cookie::extract_cookie;

use crate::application::CheckSessionUseCase;
use crate::application::config::SESSION_COOKIE_NAME;
use crate::domain::entity::{auth_session::AuthSession, user::User};
use crate::domain::repository::{SessionRepository, UserRepository};
use crate::error::AuthError;
use crate::presentation::handlers::AuthAppState;

/// Authenticated caller, set by [`resolve_session`].
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user: User,
    pub session: AuthSession,
}

/// Middleware resolving the session cookie for every request.
///
/// Install with `axum::middleware::from_fn_with_state(state, resolve_session::<R>)`.
pub async fn resolve_session<R>(
    State(state): State<AuthAppState<R>>,
    mut req: Request,
    next: Next,
) -> Response
where
    R: UserRepository + SessionRepository + Clone + Send + Sync + 'static,
{
    let mut stale_cookie = false;

    if let Some(token) = extract_cookie(req.headers(), SESSION_COOKIE_NAME) {
        let use_case = CheckSessionUseCase::new(state.repo.clone());
        match use_case.resolve(&token).await {
            Ok((user, session)) => {
                tracing::debug!(user_id = %user.user_id, "Session resolved");
                req.extensions_mut().insert(CurrentUser { user, session });
            }
            Err(AuthError::SessionNotFound) => stale_cookie = true,
            Err(e) => {
                e.log();
                tracing::warn!("Session lookup failed, continuing unauthenticated");
            }
        }
    }

    let mut response = next.run(req).await;

    // A handler that already set the cookie (login, logout) wins
    if stale_cookie && !sets_cookie(response.headers(), SESSION_COOKIE_NAME) {
        match state.config.clear_cookie().to_header_value() {
            Ok(value) => {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
            Err(e) => tracing::error!(error = %e, "Failed to encode cookie removal"),
        }
    }

    response
}

fn sets_cookie(headers: &HeaderMap, name: &str) -> bool {
    headers
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .any(|v| {
            v.split_once('=')
                .is_some_and(|(cookie_name, _)| cookie_name.trim() == name)
        })
}

/// Rejects with 401 when no session was resolved.
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or(AuthError::SessionNotFound)
    }
}

/// `Option<CurrentUser>` for routes open to anonymous callers.
impl<S> OptionalFromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(parts.extensions.get::<CurrentUser>().cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_sets_cookie_matches_exact_name() {
        let mut headers = HeaderMap::new();
        headers.append(
            header::SET_COOKIE,
            HeaderValue::from_static("auth_session_old=x; Path=/"),
        );
        assert!(!sets_cookie(&headers, "auth_session"));

        headers.append(
            header::SET_COOKIE,
            HeaderValue::from_static("auth_session=abc; HttpOnly"),
        );
        assert!(sets_cookie(&headers, "auth_session"));
    }
}
