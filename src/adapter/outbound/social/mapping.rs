//! Graph API posts to warehouse entities.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;

use super::dto::{FacebookPost, InstagramMedia};
use crate::domain::entity::{Post, PostMetric, RowId};
use crate::domain::social::{extract_hashtags, extract_mentions};

/// A post and its current counters, independent of platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocialPost {
    pub platform_post_id: String,
    pub post_type: Option<String>,
    pub caption: Option<String>,
    pub post_url: Option<String>,
    pub posted_date: NaiveDateTime,
    pub likes: i32,
    pub comments: i32,
    pub shares: i32,
}

impl SocialPost {
    #[must_use]
    pub fn to_post(&self, account_id: RowId) -> Post {
        let caption = self.caption.as_deref().unwrap_or_default();
        Post {
            account_id,
            platform_post_id: self.platform_post_id.clone(),
            post_type: self.post_type.clone(),
            caption: self.caption.clone(),
            post_url: self.post_url.clone(),
            posted_date: self.posted_date,
            hashtags: extract_hashtags(caption),
            mentions: extract_mentions(caption),
        }
    }

    /// Counters as of `date`; reach is not fetched, so the rate stays zero.
    #[must_use]
    pub fn metric(&self, post_id: RowId, date: NaiveDate) -> PostMetric {
        PostMetric {
            post_id,
            metric_date: date,
            likes: self.likes,
            comments: self.comments,
            shares: self.shares,
            engagement_rate: Decimal::ZERO,
        }
    }
}

/// Graph timestamps come as RFC 3339 (Instagram) or with a `+0000` offset
/// (Facebook). Missing or unreadable values fall back to `now`.
#[must_use]
pub fn graph_time(raw: Option<&str>, now: NaiveDateTime) -> NaiveDateTime {
    raw.and_then(|raw| {
        DateTime::parse_from_rfc3339(raw)
            .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%z"))
            .ok()
    })
    .map_or(now, |ts| ts.with_timezone(&Utc).naive_utc())
}

#[must_use]
pub fn instagram_post(media: &InstagramMedia, now: NaiveDateTime) -> SocialPost {
    SocialPost {
        platform_post_id: media.id.clone(),
        post_type: media.media_type.as_deref().map(str::to_lowercase),
        caption: media.caption.clone(),
        post_url: media.permalink.clone(),
        posted_date: graph_time(media.timestamp.as_deref(), now),
        likes: media.like_count,
        comments: media.comments_count,
        shares: 0,
    }
}

/// Reactions count as likes.
#[must_use]
pub fn facebook_post(post: &FacebookPost, now: NaiveDateTime) -> SocialPost {
    SocialPost {
        platform_post_id: post.id.clone(),
        post_type: Some(post.post_type.as_deref().unwrap_or("status").to_lowercase()),
        caption: post.message.clone(),
        post_url: post.permalink_url.clone(),
        posted_date: graph_time(post.created_time.as_deref(), now),
        likes: post.reactions.unwrap_or_default().summary.total_count,
        comments: post.comments.unwrap_or_default().summary.total_count,
        shares: post.shares.unwrap_or_default().count,
    }
}
