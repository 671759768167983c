//! Sign-in through a third-party identity provider.
//!
//! The provider does the authentication. This module only keeps the one-time
//! `state` values, runs the sync callback against the backend user endpoint and
//! holds the resulting sessions in memory. There is no token refresh or revocation.

pub mod provider;
pub mod session;
pub mod sync;

pub use provider::{IdentityProvider, OAuthProvider, UserProfile};
pub use session::{Session, SessionStore};
pub use sync::UserSync;

use crate::config::AuthConfig;
use crate::error::Result;
use crate::metrics::ServerMetrics;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// Error codes reported on `/api/auth/error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthErrorKind {
    /// Missing, unknown or expired `state`, or the provider rejected the code.
    OAuthCallback,
    /// The sign-in callback refused the user.
    AccessDenied,
    Configuration,
}

impl AuthErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthErrorKind::OAuthCallback => "OAuthCallback",
            AuthErrorKind::AccessDenied => "AccessDenied",
            AuthErrorKind::Configuration => "Configuration",
        }
    }

    pub fn parse(code: &str) -> Option<Self> {
        match code {
            "OAuthCallback" => Some(AuthErrorKind::OAuthCallback),
            "AccessDenied" => Some(AuthErrorKind::AccessDenied),
            "Configuration" => Some(AuthErrorKind::Configuration),
            _ => None,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            AuthErrorKind::OAuthCallback => "The sign-in response from the provider could not be verified.",
            AuthErrorKind::AccessDenied => "You do not have permission to sign in.",
            AuthErrorKind::Configuration => "There is a problem with the server configuration.",
        }
    }
}

#[derive(Debug)]
pub enum SignInOutcome {
    Allowed { token: String, session: Session },
    Denied(AuthErrorKind),
}

pub struct AuthService {
    provider: Arc<dyn IdentityProvider>,
    sync: UserSync,
    sessions: SessionStore,
    callback_base_url: String,
}

impl AuthService {
    pub fn from_config(config: &AuthConfig) -> Result<Self> {
        let provider = Arc::new(OAuthProvider::new(config.clone())?);
        Self::new(provider, config)
    }

    pub fn new(provider: Arc<dyn IdentityProvider>, config: &AuthConfig) -> Result<Self> {
        let sync = UserSync::new(
            config.sync_url(),
            Duration::from_secs(config.request_timeout_secs),
        )?;
        Ok(Self {
            provider,
            sync,
            sessions: SessionStore::new(),
            callback_base_url: config.callback_base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn provider(&self) -> &dyn IdentityProvider {
        self.provider.as_ref()
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn callback_base_url(&self) -> &str {
        &self.callback_base_url
    }

    /// Redirect target that starts the provider flow.
    pub fn begin_sign_in(&self) -> Result<String> {
        let state = self.sessions.begin_sign_in()?;
        self.provider.authorize_url(&state)
    }

    /// Finish the provider flow: verify state, exchange the code, run the sync callback.
    pub async fn complete_sign_in(&self, code: Option<&str>, state: Option<&str>) -> Result<SignInOutcome> {
        let (Some(code), Some(state)) = (code, state) else {
            return Ok(SignInOutcome::Denied(AuthErrorKind::OAuthCallback));
        };
        if !self.sessions.consume_state(state)? {
            warn!("Sign-in callback with unknown or expired state");
            return Ok(SignInOutcome::Denied(AuthErrorKind::OAuthCallback));
        }

        let profile = match self.provider.exchange_code(code).await {
            Ok(p) => p,
            Err(e) => {
                warn!("Code exchange with {} failed: {e}", self.provider.id());
                return Ok(SignInOutcome::Denied(AuthErrorKind::OAuthCallback));
            }
        };

        let allowed = self.sync.sign_in(&profile).await;
        ServerMetrics::record_signin(allowed);
        if !allowed {
            return Ok(SignInOutcome::Denied(AuthErrorKind::AccessDenied));
        }

        let (token, session) = self.sessions.create(&profile)?;
        Ok(SignInOutcome::Allowed { token, session })
    }
}
