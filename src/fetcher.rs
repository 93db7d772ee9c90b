use anyhow::Context as _;
use reqwest::header::{COOKIE, HeaderMap, HeaderValue};
use url::Url;

use crate::error::SwitcherError;

/// A stored appearance preference change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreferenceUpdate {
    Mode(String),
    Theme(String),
}

impl PreferenceUpdate {
    pub fn field(&self) -> (&'static str, &str) {
        match self {
            PreferenceUpdate::Mode(v) => ("color_mode", v),
            PreferenceUpdate::Theme(v) => ("user_theme", v),
        }
    }
}

/// Credentialed HTTP client for the settings page and the update endpoint.
#[derive(Clone)]
pub struct Fetcher {
    client: reqwest::Client,
}

impl Fetcher {
    pub fn new(user_agent: &str, cookie: Option<&str>) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        if let Some(cookie) = cookie {
            let mut value = HeaderValue::from_str(cookie.trim()).context("invalid cookie value")?;
            value.set_sensitive(true);
            headers.insert(COOKIE, value);
        }
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .context("build reqwest client")?;
        Ok(Self { client })
    }

    pub async fn get_text(&self, url: Url) -> Result<String, SwitcherError> {
        let resp = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|source| SwitcherError::Fetch {
                url: url.to_string(),
                source,
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(SwitcherError::FetchStatus {
                url: url.to_string(),
                status,
            });
        }

        resp.text().await.map_err(|source| SwitcherError::Fetch {
            url: url.to_string(),
            source,
        })
    }

    /// Posts one preference change the way the settings form does: multipart,
    /// with `_method=put`. A rejected status is logged, not returned.
    pub async fn submit(
        &self,
        url: Url,
        token: &str,
        update: &PreferenceUpdate,
    ) -> anyhow::Result<()> {
        let (field, value) = update.field();
        let form = reqwest::multipart::Form::new()
            .text("authenticity_token", token.to_string())
            .text(field, value.to_string())
            .text("_method", "put");

        let resp = self
            .client
            .post(url.clone())
            .multipart(form)
            .send()
            .await
            .with_context(|| format!("POST {}", url))?;

        let status = resp.status();
        if status.is_success() {
            tracing::debug!(%url, field, value, "preference updated");
        } else {
            tracing::warn!(%url, %status, field, value, "preference update rejected");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_fields() {
        assert_eq!(
            PreferenceUpdate::Mode("dark".into()).field(),
            ("color_mode", "dark")
        );
        assert_eq!(
            PreferenceUpdate::Theme("dark_dimmed".into()).field(),
            ("user_theme", "dark_dimmed")
        );
    }

    #[test]
    fn rejects_cookie_with_newline() {
        assert!(Fetcher::new("ua", Some("a=b\nc")).is_err());
    }
}
