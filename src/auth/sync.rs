use super::provider::UserProfile;
use crate::error::Result;
use std::time::Duration;
use tracing::{info, warn};

/// Sign-in callback: forwards the authenticated profile to the backend user-record endpoint.
pub struct UserSync {
    client: reqwest::Client,
    url: String,
}

impl UserSync {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Whether sign-in may proceed. Any non-2xx status or transport error denies it.
    pub async fn sign_in(&self, profile: &UserProfile) -> bool {
        match self.client.post(&self.url).json(profile).send().await {
            Ok(resp) if resp.status().is_success() => {
                info!(
                    provider = %profile.provider,
                    account = %profile.provider_account_id,
                    "User synced"
                );
                true
            }
            Ok(resp) => {
                warn!(status = %resp.status(), url = %self.url, "User sync rejected, denying sign-in");
                false
            }
            Err(e) => {
                warn!(url = %self.url, "User sync failed, denying sign-in: {e}");
                false
            }
        }
    }
}
