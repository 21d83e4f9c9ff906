//! Graph API client shared by the Instagram and Facebook adapters.

use std::time::Duration;

use reqwest::{Client as HttpClient, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::dto::{FacebookPost, GraphList, GraphProfile, InstagramMedia};
use crate::error::{Error, Result};

pub const GRAPH_HOST: &str = "https://graph.facebook.com";

/// Recent posts fetched per run.
const POST_LIMIT: &str = "50";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const INSTAGRAM_MEDIA_FIELDS: &str =
    "id,caption,media_type,media_url,permalink,timestamp,like_count,comments_count";
const FACEBOOK_POST_FIELDS: &str =
    "id,message,created_time,permalink_url,type,reactions.summary(true),comments.summary(true),shares";

pub struct GraphClient {
    http: HttpClient,
    base_url: String,
    access_token: String,
}

impl GraphClient {
    /// Client for `https://graph.facebook.com/{version}`.
    #[must_use]
    pub fn new(version: &str, access_token: String) -> Self {
        Self::with_base_url(format!("{GRAPH_HOST}/{version}"), access_token)
    }

    #[must_use]
    pub fn with_base_url(base_url: impl Into<String>, access_token: String) -> Self {
        let http = HttpClient::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|err| {
                warn!(error = %err, "Failed to build HTTP client, using defaults");
                HttpClient::new()
            });

        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            access_token,
        }
    }

    fn get(&self, path: &str, fields: &str) -> RequestBuilder {
        self.http
            .get(format!("{}/{}", self.base_url, path))
            .query(&[("fields", fields), ("access_token", self.access_token.as_str())])
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Api {
                service: "graph",
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json::<T>().await?)
    }

    async fn list<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<Vec<T>> {
        let list: GraphList<T> = self.send(request.query(&[("limit", POST_LIMIT)])).await?;
        if let Some(error) = list.error {
            return Err(Error::Api {
                service: "graph",
                status: 200,
                body: error.to_string(),
            });
        }
        Ok(list.data)
    }

    /// `GET /{id}?fields=id,name`.
    pub async fn profile(&self, id: &str) -> Result<GraphProfile> {
        self.send(self.get(id, "id,name")).await
    }

    /// Profile lookup bounded by `timeout`.
    pub async fn ping(&self, id: &str, timeout: Duration) -> Result<()> {
        let _: GraphProfile = self.send(self.get(id, "id,name").timeout(timeout)).await?;
        Ok(())
    }

    pub async fn instagram_media(&self, account_id: &str) -> Result<Vec<InstagramMedia>> {
        let media: Vec<InstagramMedia> = self
            .list(self.get(&format!("{account_id}/media"), INSTAGRAM_MEDIA_FIELDS))
            .await?;
        debug!(count = media.len(), "Fetched Instagram media");
        Ok(media)
    }

    pub async fn facebook_posts(&self, page_id: &str) -> Result<Vec<FacebookPost>> {
        let posts: Vec<FacebookPost> = self
            .list(self.get(&format!("{page_id}/posts"), FACEBOOK_POST_FIELDS))
            .await?;
        debug!(count = posts.len(), "Fetched Facebook posts");
        Ok(posts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_includes_version() {
        let client = GraphClient::new("v19.0", "token".into());
        assert_eq!(client.base_url, "https://graph.facebook.com/v19.0");
    }

    #[test]
    fn requests_carry_fields_and_token() {
        let client = GraphClient::new("v19.0", "secret".into());
        let request = client.get("123/media", "id,caption").build().unwrap();
        let url = request.url().as_str();
        assert!(url.starts_with("https://graph.facebook.com/v19.0/123/media?"));
        assert!(url.contains("fields=id%2Ccaption"));
        assert!(url.contains("access_token=secret"));
    }

    #[tokio::test]
    async fn unreachable_graph_api_is_an_error() {
        let client = GraphClient::with_base_url("http://127.0.0.1:9", "token".into());
        assert!(client.ping("123", Duration::from_millis(500)).await.is_err());
    }
}
