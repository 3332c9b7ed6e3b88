//! Input moderation: a local blocklist first, then the remote
//! moderation endpoint. Remote failures never block the request.

use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::warn;

lazy_static! {
    static ref LOCAL_BLOCKLIST: Vec<Regex> = [
        r"(?i)kill myself",
        r"(?i)suicide",
        r"(?i)terrorist",
        r"(?i)weapon",
        r"(?i)hate\s+speech",
    ]
    .iter()
    .filter_map(|pattern| match Regex::new(pattern) {
        Ok(re) => Some(re),
        Err(e) => {
            warn!("Invalid blocklist pattern {}: {}", pattern, e);
            None
        }
    })
    .collect();
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModerationVerdict {
    pub allowed: bool,
    pub reason: Option<&'static str>,
    pub category: Option<String>,
}

impl ModerationVerdict {
    pub fn allow() -> Self {
        Self {
            allowed: true,
            reason: None,
            category: None,
        }
    }

    fn blocked(reason: &'static str, category: Option<String>) -> Self {
        Self {
            allowed: false,
            reason: Some(reason),
            category,
        }
    }
}

#[async_trait]
pub trait ModerationService: Send + Sync {
    /// Never errors: a moderation outage must not take chat down, so
    /// implementations fail open.
    async fn review(&self, text: &str) -> ModerationVerdict;
}

#[derive(Debug, Serialize)]
struct ModerationRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct ModerationResponse {
    #[serde(default)]
    results: Vec<ModerationResult>,
}

#[derive(Debug, Deserialize)]
struct ModerationResult {
    #[serde(default)]
    flagged: bool,
    #[serde(default)]
    categories: HashMap<String, bool>,
}

pub struct OpenAiModeration {
    base_url: String,
    api_key: String,
    http_client: reqwest::Client,
}

impl OpenAiModeration {
    pub fn new(base_url: String, api_key: String) -> Self {
        Self {
            base_url,
            api_key,
            http_client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(10))
                .build()
                .unwrap_or_default(),
        }
    }

    fn moderations_url(&self) -> String {
        format!("{}/v1/moderations", self.base_url)
    }

    async fn review_remote(&self, text: &str) -> anyhow::Result<ModerationVerdict> {
        let request = ModerationRequest {
            model: "omni-moderation-latest",
            input: text,
        };
        let response = self
            .http_client
            .post(self.moderations_url())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("Moderation request failed: {}", e))?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("Moderation returned {}: {}", status, body));
        }
        let parsed: ModerationResponse = response
            .json()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to parse moderation response: {}", e))?;
        let Some(result) = parsed.results.first() else {
            return Ok(ModerationVerdict::allow());
        };
        if result.flagged {
            let category = result
                .categories
                .iter()
                .find(|(_, flagged)| **flagged)
                .map(|(name, _)| name.clone());
            return Ok(ModerationVerdict::blocked("remote_flagged", category));
        }
        Ok(ModerationVerdict::allow())
    }
}

#[async_trait]
impl ModerationService for OpenAiModeration {
    async fn review(&self, text: &str) -> ModerationVerdict {
        if text.trim().is_empty() {
            return ModerationVerdict::allow();
        }
        if LOCAL_BLOCKLIST.iter().any(|re| re.is_match(text)) {
            return ModerationVerdict::blocked("blocked_keywords", None);
        }
        match self.review_remote(text).await {
            Ok(verdict) => verdict,
            Err(e) => {
                warn!("Moderation check failed, allowing input: {}", e);
                ModerationVerdict::allow()
            }
        }
    }
}
