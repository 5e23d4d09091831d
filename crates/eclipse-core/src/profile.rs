use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

pub const MOJANG_PROFILE_API: &str = "https://api.mojang.com/users/profiles/minecraft";

/// Username to player-identifier lookup. Every failure resolves to `None`.
#[async_trait]
pub trait ProfileLookup: Send + Sync {
    async fn lookup_uuid(&self, username: &str) -> Option<String>;
}

#[derive(Debug, Deserialize)]
struct ProfileResponse {
    id: String,
}

pub struct MojangProfiles {
    client: Client,
    base_url: String,
}

impl MojangProfiles {
    pub fn new() -> Self {
        Self::with_base_url(MOJANG_PROFILE_API)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn profile_url(&self, username: &str) -> String {
        format!("{}/{}", self.base_url, username)
    }
}

impl Default for MojangProfiles {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProfileLookup for MojangProfiles {
    async fn lookup_uuid(&self, username: &str) -> Option<String> {
        let username = username.trim();
        if username.is_empty() {
            return None;
        }

        let response = match self.client.get(self.profile_url(username)).send().await {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!(%username, "profile lookup failed: {err}");
                return None;
            }
        };

        if response.status() != StatusCode::OK {
            tracing::debug!(%username, status = %response.status(), "profile not found");
            return None;
        }

        match response.json::<ProfileResponse>().await {
            Ok(profile) => Some(profile.id),
            Err(err) => {
                tracing::warn!(%username, "profile response was not understood: {err}");
                None
            }
        }
    }
}
