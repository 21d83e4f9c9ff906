//! Instagram and Facebook sync adapters.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{Local, NaiveDate, Utc};
use tracing::{error, info, warn};

use super::client::GraphClient;
use super::mapping::{self, SocialPost};
use crate::domain::entity::{Platform, SocialAccount};
use crate::error::Result;
use crate::infrastructure::config::settings::SocialSettings;
use crate::port::outbound::sync::{SyncAdapter, SyncResource};
use crate::port::outbound::warehouse::{in_transaction, Warehouse, WarehouseProvider};

/// Ensure the account row, then upsert every post and its metric for `today`.
///
/// Returns the number of posts written.
pub fn apply_posts<W: Warehouse>(
    warehouse: &mut W,
    account: &SocialAccount,
    posts: &[SocialPost],
    today: NaiveDate,
) -> Result<usize> {
    let account_id = warehouse.upsert(account)?;
    for post in posts {
        let post_id = warehouse.upsert(&post.to_post(account_id))?;
        warehouse.upsert(&post.metric(post_id, today))?;
    }
    Ok(posts.len())
}

/// Handle under which a platform account is stored.
#[must_use]
pub fn account_handle(platform: Platform, object_id: &str) -> String {
    match platform {
        Platform::Instagram => format!("ig_{object_id}"),
        Platform::Facebook => format!("page_{object_id}"),
        Platform::Tiktok => format!("tt_{object_id}"),
    }
}

/// Pulls recent posts of one Graph API object (Instagram business account or
/// Facebook page).
pub struct SocialSync<P> {
    platform: Platform,
    client: GraphClient,
    object_id: String,
    provider: P,
}

impl<P> SocialSync<P>
where
    P: WarehouseProvider + Clone + 'static,
{
    pub fn new(platform: Platform, client: GraphClient, object_id: String, provider: P) -> Self {
        Self {
            platform,
            client,
            object_id,
            provider,
        }
    }

    /// Instagram adapter, when its token and account id are configured.
    pub fn instagram(settings: &SocialSettings, provider: P) -> Option<Self> {
        let (token, account_id) = settings.instagram()?;
        Some(Self::new(
            Platform::Instagram,
            GraphClient::new(&settings.graph_api_version, token.to_string()),
            account_id.to_string(),
            provider,
        ))
    }

    /// Facebook adapter, when its token and page id are configured.
    pub fn facebook(settings: &SocialSettings, provider: P) -> Option<Self> {
        let (token, page_id) = settings.facebook()?;
        Some(Self::new(
            Platform::Facebook,
            GraphClient::new(&settings.graph_api_version, token.to_string()),
            page_id.to_string(),
            provider,
        ))
    }

    async fn account(&self) -> SocialAccount {
        let account_name = match self.client.profile(&self.object_id).await {
            Ok(profile) => profile.name,
            Err(err) => {
                warn!(platform = %self.platform, error = %err, "Could not read account name");
                None
            }
        };
        SocialAccount {
            platform: self.platform,
            account_handle: account_handle(self.platform, &self.object_id),
            account_name,
        }
    }

    async fn fetch_posts(&self) -> Result<Vec<SocialPost>> {
        let now = Utc::now().naive_utc();
        Ok(match self.platform {
            Platform::Instagram => self
                .client
                .instagram_media(&self.object_id)
                .await?
                .iter()
                .map(|media| mapping::instagram_post(media, now))
                .collect(),
            Platform::Facebook => self
                .client
                .facebook_posts(&self.object_id)
                .await?
                .iter()
                .map(|post| mapping::facebook_post(post, now))
                .collect(),
            Platform::Tiktok => {
                warn!("TikTok posts are not available through the Graph API");
                Vec::new()
            }
        })
    }

    pub async fn sync_posts(&self) -> Result<usize> {
        let account = self.account().await;
        let posts = self.fetch_posts().await?;
        let today = Local::now().date_naive();
        in_transaction(&self.provider, move |w| apply_posts(w, &account, &posts, today)).await
    }
}

#[async_trait]
impl<P> SyncAdapter for SocialSync<P>
where
    P: WarehouseProvider + Clone + 'static,
{
    fn name(&self) -> &'static str {
        self.platform.as_str()
    }

    async fn sync(&self, resource: SyncResource) -> bool {
        if !matches!(resource, SyncResource::Full | SyncResource::Posts) {
            warn!(platform = %self.platform, ?resource, "Resource not provided by social adapters");
            return false;
        }
        info!(platform = %self.platform, "Starting social sync");
        match self.sync_posts().await {
            Ok(count) => {
                info!(platform = %self.platform, posts = count, "Social sync finished");
                true
            }
            Err(err) => {
                error!(platform = %self.platform, error = %err, "Social sync failed");
                false
            }
        }
    }

    async fn ping(&self, timeout: Duration) -> bool {
        match self.client.ping(&self.object_id, timeout).await {
            Ok(()) => true,
            Err(err) => {
                warn!(platform = %self.platform, error = %err, "Graph API ping failed");
                false
            }
        }
    }
}
