//! Auth Router

use axum::{
    Router,
    middleware,
    routing::{get, post},
};
use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::domain::repository::{SessionRepository, UserRepository};
use crate::presentation::handlers::{self, AuthAppState};
use crate::presentation::middleware::resolve_session;

/// Auth routes, to be nested under `/api/auth`.
///
/// Session resolution is not part of this router; wrap the whole application
/// with [`session_layer`] so every route sees the same [`CurrentUser`].
///
/// [`CurrentUser`]: crate::presentation::middleware::CurrentUser
pub fn auth_router<R>(repo: Arc<R>, config: Arc<AuthConfig>) -> Router
where
    R: UserRepository + SessionRepository + Clone + Send + Sync + 'static,
{
    let state = AuthAppState { repo, config };

    Router::new()
        .route("/signup", post(handlers::sign_up::<R>))
        .route("/login", post(handlers::login::<R>))
        .route("/logout", post(handlers::logout::<R>))
        .route("/me", get(handlers::me))
        .with_state(state)
}

/// Apply per-request session resolution to `router`.
pub fn session_layer<R>(router: Router, repo: Arc<R>, config: Arc<AuthConfig>) -> Router
where
    R: UserRepository + SessionRepository + Clone + Send + Sync + 'static,
{
    let state = AuthAppState { repo, config };
    router.layer(middleware::from_fn_with_state(state, resolve_session::<R>))
}
