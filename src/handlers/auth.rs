use crate::auth::session::{clear_session_cookie, session_cookie, token_from_headers};
use crate::auth::{AuthErrorKind, SignInOutcome};
use crate::error::{GuideError, Result};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::{header::SET_COOKIE, HeaderMap},
    response::{IntoResponse, Json, Redirect, Response},
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::info;

fn require_provider(state: &AppState, provider: &str) -> Result<()> {
    if state.auth.provider().id() == provider {
        Ok(())
    } else {
        Err(GuideError::NotFound(format!("Provider '{provider}'")))
    }
}

fn error_redirect(state: &AppState, kind: AuthErrorKind) -> Redirect {
    Redirect::to(&format!(
        "{}/api/auth/error?error={}",
        state.auth.callback_base_url(),
        kind.as_str()
    ))
}

/// `GET /api/auth/providers`
pub async fn providers(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let provider = state.auth.provider();
    let base = state.auth.callback_base_url();
    let id = provider.id();

    let mut body = serde_json::Map::new();
    body.insert(
        id.to_string(),
        json!({
            "id": id,
            "name": provider.name(),
            "type": "oauth",
            "signinUrl": format!("{base}/api/auth/signin/{id}"),
            "callbackUrl": format!("{base}/api/auth/callback/{id}"),
        }),
    );
    Json(body)
}

/// `GET /api/auth/signin/:provider`
pub async fn signin(
    State(state): State<Arc<AppState>>,
    Path(provider): Path<String>,
) -> Result<Redirect> {
    require_provider(&state, &provider)?;
    let url = state.auth.begin_sign_in()?;
    Ok(Redirect::to(&url))
}

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    /// Set by the provider when the user declined consent.
    pub error: Option<String>,
}

/// `GET /api/auth/callback/:provider`
pub async fn callback(
    State(state): State<Arc<AppState>>,
    Path(provider): Path<String>,
    Query(params): Query<CallbackParams>,
) -> Result<Response> {
    require_provider(&state, &provider)?;

    if let Some(error) = &params.error {
        info!("Provider returned error '{error}' to callback");
        return Ok(error_redirect(&state, AuthErrorKind::AccessDenied).into_response());
    }

    let outcome = state
        .auth
        .complete_sign_in(params.code.as_deref(), params.state.as_deref())
        .await?;

    Ok(match outcome {
        SignInOutcome::Allowed { token, session } => {
            info!("Signed in {:?}", session.user.email);
            (
                [(SET_COOKIE, session_cookie(&token))],
                Redirect::to(state.auth.callback_base_url()),
            )
                .into_response()
        }
        SignInOutcome::Denied(kind) => error_redirect(&state, kind).into_response(),
    })
}

/// `GET /api/auth/session`; `{}` when signed out.
pub async fn session(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>> {
    let session = match token_from_headers(&headers) {
        Some(token) => state.auth.sessions().get(&token)?,
        None => None,
    };

    Ok(Json(match session {
        Some(s) => serde_json::to_value(s)?,
        None => json!({}),
    }))
}

/// `POST /api/auth/signout`
pub async fn signout(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Result<Response> {
    if let Some(token) = token_from_headers(&headers) {
        state.auth.sessions().remove(&token)?;
    }

    Ok((
        [(SET_COOKIE, clear_session_cookie())],
        Json(json!({ "url": state.auth.callback_base_url() })),
    )
        .into_response())
}

#[derive(Debug, Deserialize)]
pub struct ErrorParams {
    pub error: Option<String>,
}

/// `GET /api/auth/error?error=<code>`
pub async fn auth_error(Query(params): Query<ErrorParams>) -> impl IntoResponse {
    let code = params.error.unwrap_or_default();
    let description = AuthErrorKind::parse(&code)
        .map(|k| k.description())
        .unwrap_or("Unable to sign in.");
    Json(json!({ "error": code, "description": description }))
}
