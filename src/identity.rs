use anyhow::Context;
use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;

/// Verified profile returned by the identity exchange for a one-time session id.
#[derive(Debug, Clone, Deserialize)]
pub struct IdentityProfile {
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub picture: Option<String>,
    pub session_token: String,
}

#[async_trait]
pub trait IdentityExchange: Send + Sync {
    async fn exchange(&self, session_id: &str) -> anyhow::Result<IdentityProfile>;
}

#[derive(Clone)]
pub struct HttpIdentityExchange {
    client: reqwest::Client,
    url: String,
}

impl HttpIdentityExchange {
    pub fn new(url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.to_string(),
        }
    }
}

#[async_trait]
impl IdentityExchange for HttpIdentityExchange {
    async fn exchange(&self, session_id: &str) -> anyhow::Result<IdentityProfile> {
        let profile = self
            .client
            .get(&self.url)
            .header("X-Session-ID", session_id)
            .send()
            .await
            .context("identity exchange request")?
            .error_for_status()?
            .json::<IdentityProfile>()
            .await
            .context("decode identity payload")?;
        validate_profile(&profile)?;
        Ok(profile)
    }
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub(crate) fn validate_profile(profile: &IdentityProfile) -> anyhow::Result<()> {
    anyhow::ensure!(is_valid_email(&profile.email), "invalid email in identity payload");
    anyhow::ensure!(!profile.session_token.is_empty(), "empty session_token in identity payload");
    Ok(())
}
