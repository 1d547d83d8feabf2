//! Discord REST client.

use perch_core::{PlatformError, PlatformResult};
use reqwest::StatusCode;
use tracing::debug;

use crate::config::DiscordConfig;
use crate::model::DiscordUser;

#[derive(Debug, Clone)]
pub struct DiscordClient {
    http: reqwest::Client,
    api_base: String,
    token: String,
}

impl DiscordClient {
    pub fn new(config: &DiscordConfig) -> PlatformResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .user_agent(concat!("perch/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| PlatformError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/{}", self.api_base, path)
    }

    /// Fetches a user by snowflake.
    pub async fn fetch_user(&self, id: &str) -> PlatformResult<DiscordUser> {
        let url = self.api_url(&format!("users/{id}"));
        debug!(url = %url, "fetching discord user");

        let resp = self
            .http
            .get(&url)
            .header("Authorization", format!("Bot {}", self.token))
            .send()
            .await
            .map_err(|e| PlatformError::Unavailable(format!("request to {url} failed: {e}")))?;

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Err(PlatformError::NotFound(id.to_string()));
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(PlatformError::Http {
                status: status.as_u16(),
                message: body,
            });
        }

        resp.json::<DiscordUser>()
            .await
            .map_err(|e| PlatformError::Decode(e.to_string()))
    }
}
