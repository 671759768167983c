use crate::config::AuthConfig;
use crate::error::{GuideError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Profile of a user as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub provider: String,
    pub provider_account_id: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub image: Option<String>,
}

/// Third-party OAuth identity provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    fn id(&self) -> &str;
    fn name(&self) -> &str;

    /// Where to send the browser to start sign-in.
    fn authorize_url(&self, state: &str) -> Result<String>;

    /// Trade an authorization code for the signed-in user's profile.
    async fn exchange_code(&self, code: &str) -> Result<UserProfile>;
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Deserialize)]
struct UserInfo {
    sub: String,
    email: Option<String>,
    name: Option<String>,
    picture: Option<String>,
}

/// Authorization-code flow against an OpenID Connect style provider.
pub struct OAuthProvider {
    config: AuthConfig,
    client: reqwest::Client,
}

impl OAuthProvider {
    pub fn new(config: AuthConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self { config, client })
    }
}

#[async_trait]
impl IdentityProvider for OAuthProvider {
    fn id(&self) -> &str {
        &self.config.provider_id
    }

    fn name(&self) -> &str {
        &self.config.provider_name
    }

    fn authorize_url(&self, state: &str) -> Result<String> {
        let redirect_uri = self.config.callback_url();
        let url = Url::parse_with_params(
            &self.config.authorize_url,
            &[
                ("client_id", self.config.client_id.as_str()),
                ("redirect_uri", redirect_uri.as_str()),
                ("response_type", "code"),
                ("scope", self.config.scopes.as_str()),
                ("state", state),
            ],
        )
        .map_err(|e| GuideError::Config(format!("Invalid authorize_url: {e}")))?;
        Ok(url.into())
    }

    async fn exchange_code(&self, code: &str) -> Result<UserProfile> {
        let redirect_uri = self.config.callback_url();
        debug!("Exchanging authorization code at {}", self.config.token_url);

        let token: TokenResponse = self
            .client
            .post(&self.config.token_url)
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", redirect_uri.as_str()),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let info: UserInfo = self
            .client
            .get(&self.config.userinfo_url)
            .bearer_auth(&token.access_token)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(UserProfile {
            provider: self.config.provider_id.clone(),
            provider_account_id: info.sub,
            email: info.email,
            name: info.name,
            image: info.picture,
        })
    }
}
