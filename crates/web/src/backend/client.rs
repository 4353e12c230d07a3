//! Hosted backend HTTP client.

use std::sync::Arc;

use reqwest::{RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::instrument;
use url::Url;

use pageturn_core::{SectionQuery, UserId};

use super::BackendError;
use super::types::{Profile, SignIn};
use crate::config::BackendConfig;

/// Client for the hosted backend's REST and auth endpoints.
///
/// Cheap to clone; all clones share one connection pool.
#[derive(Clone)]
pub struct BackendClient {
    inner: Arc<BackendClientInner>,
}

struct BackendClientInner {
    client: reqwest::Client,
    base: Url,
    anon_key: SecretString,
}

impl BackendClient {
    /// Create a new backend client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        // Url::join replaces the last segment unless the base ends in '/'
        let mut base = config.url.clone();
        if !base.path().ends_with('/') {
            base.set_path(&format!("{}/", base.path()));
        }

        Ok(Self {
            inner: Arc::new(BackendClientInner {
                client,
                base,
                anon_key: config.anon_key.clone(),
            }),
        })
    }

    /// Read every flagged row of a collection, newest first.
    ///
    /// `GET /rest/v1/<collection>?select=*&<flag>=eq.true&order=<ts>.desc`
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, non-success status, or a body
    /// that does not deserialize into `T`.
    #[instrument(skip(self))]
    pub async fn select_active<T: DeserializeOwned>(
        &self,
        query: SectionQuery,
    ) -> Result<Vec<T>, BackendError> {
        let url = self.select_url(query)?;
        let request = self.with_anon_key(self.inner.client.get(url));
        let rows: Vec<T> = self.send_json(request).await?;
        tracing::debug!(rows = rows.len(), "Collection read");
        Ok(rows)
    }

    /// Sign in with email and password.
    ///
    /// `POST /auth/v1/token?grant_type=password`
    ///
    /// # Errors
    ///
    /// Returns `BackendError::InvalidCredentials` when the auth service
    /// rejects the credentials, or another variant on backend failure.
    #[instrument(skip(self, password))]
    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<SignIn, BackendError> {
        let mut url = self.endpoint("auth/v1/token")?;
        url.query_pairs_mut().append_pair("grant_type", "password");

        let body = serde_json::json!({
            "email": email,
            "password": password.expose_secret(),
        });
        let request = self.with_anon_key(self.inner.client.post(url)).json(&body);

        match self.send_json(request).await {
            Err(BackendError::Status { status, .. })
                if status == StatusCode::BAD_REQUEST.as_u16()
                    || status == StatusCode::UNAUTHORIZED.as_u16() =>
            {
                Err(BackendError::InvalidCredentials)
            }
            other => other,
        }
    }

    /// Fetch the profile row of a signed-in user.
    ///
    /// `GET /rest/v1/profiles?select=display_name,role,is_admin&id=eq.<id>`
    ///
    /// # Errors
    ///
    /// Returns an error on backend failure. A missing row is not an error.
    #[instrument(skip(self, access_token))]
    pub async fn fetch_profile(
        &self,
        user_id: UserId,
        access_token: &str,
    ) -> Result<Profile, BackendError> {
        let mut url = self.endpoint("rest/v1/profiles")?;
        url.query_pairs_mut()
            .append_pair("select", "display_name,role,is_admin")
            .append_pair("id", &format!("eq.{user_id}"));

        let request = self
            .inner
            .client
            .get(url)
            .header("apikey", self.inner.anon_key.expose_secret())
            .bearer_auth(access_token);

        let rows: Vec<Profile> = self.send_json(request).await?;
        Ok(rows.into_iter().next().unwrap_or_default())
    }

    /// Revoke an access token.
    ///
    /// `POST /auth/v1/logout`
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or non-success status.
    #[instrument(skip_all)]
    pub async fn sign_out(&self, access_token: &str) -> Result<(), BackendError> {
        let url = self.endpoint("auth/v1/logout")?;
        let request = self
            .inner
            .client
            .post(url)
            .header("apikey", self.inner.anon_key.expose_secret())
            .bearer_auth(access_token);
        self.send_empty(request).await
    }

    /// Check that the backend's auth service is reachable.
    ///
    /// # Errors
    ///
    /// Returns an error if the health endpoint does not answer with success.
    pub async fn health(&self) -> Result<(), BackendError> {
        let url = self.endpoint("auth/v1/health")?;
        let request = self.with_anon_key(self.inner.client.get(url));
        self.send_empty(request).await
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn endpoint(&self, path: &str) -> Result<Url, BackendError> {
        Ok(self.inner.base.join(path)?)
    }

    fn select_url(&self, query: SectionQuery) -> Result<Url, BackendError> {
        let mut url = self.endpoint(&format!("rest/v1/{}", query.collection))?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("select", "*");
            if let Some(flag) = query.flag {
                pairs.append_pair(flag, "eq.true");
            }
            pairs.append_pair("order", &format!("{}.desc", query.order_by));
        }
        Ok(url)
    }

    fn with_anon_key(&self, request: RequestBuilder) -> RequestBuilder {
        let key = self.inner.anon_key.expose_secret();
        request.header("apikey", key).bearer_auth(key)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, BackendError> {
        let body = self.send(request).await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %truncate(&body, 500),
                "Failed to parse backend response"
            );
            BackendError::Parse(e)
        })
    }

    async fn send_empty(&self, request: RequestBuilder) -> Result<(), BackendError> {
        self.send(request).await.map(|_| ())
    }

    async fn send(&self, request: RequestBuilder) -> Result<String, BackendError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::warn!(
                status = %status,
                body = %truncate(&body, 500),
                "Backend returned non-success status"
            );
            return Err(BackendError::Status {
                status: status.as_u16(),
                body: truncate(&body, 200),
            });
        }

        Ok(body)
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn client(url: &str) -> BackendClient {
        BackendClient::new(&BackendConfig {
            url: Url::parse(url).unwrap(),
            anon_key: SecretString::from("anon"),
            timeout: Duration::from_secs(1),
        })
        .unwrap()
    }

    #[test]
    fn test_select_url_follows_read_contract() {
        let url = client("https://backend.test")
            .select_url(SectionQuery::ANNOUNCEMENTS)
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://backend.test/rest/v1/announcements?select=*&is_active=eq.true&order=created_at.desc"
        );
    }

    #[test]
    fn test_select_url_without_flag() {
        let query = SectionQuery {
            collection: "genres",
            flag: None,
            order_by: "created_at",
        };
        let url = client("https://backend.test").select_url(query).unwrap();
        assert_eq!(url.query(), Some("select=*&order=created_at.desc"));
    }

    #[test]
    fn test_base_path_is_preserved() {
        let url = client("https://proxy.test/backend")
            .endpoint("auth/v1/health")
            .unwrap();
        assert_eq!(url.as_str(), "https://proxy.test/backend/auth/v1/health");
    }

    #[test]
    fn test_truncate_counts_chars() {
        assert_eq!(truncate("héllo", 2), "hé");
        assert_eq!(truncate("hi", 10), "hi");
    }
}
