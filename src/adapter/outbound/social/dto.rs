//! Graph API wire types for Instagram media and Facebook page posts.

use serde::Deserialize;

/// `data` envelope of Graph API list endpoints.
#[derive(Debug, Deserialize)]
pub struct GraphList<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    pub error: Option<GraphError>,
}

/// Error object the Graph API may return with a success status.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphError {
    pub message: Option<String>,
    #[serde(rename = "type")]
    pub error_type: Option<String>,
    pub code: Option<i64>,
}

impl std::fmt::Display for GraphError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({}, code {})",
            self.message.as_deref().unwrap_or("unknown error"),
            self.error_type.as_deref().unwrap_or("GraphError"),
            self.code.unwrap_or_default()
        )
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphProfile {
    pub id: String,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InstagramMedia {
    pub id: String,
    pub caption: Option<String>,
    pub media_type: Option<String>,
    pub permalink: Option<String>,
    pub timestamp: Option<String>,
    #[serde(default)]
    pub like_count: i32,
    #[serde(default)]
    pub comments_count: i32,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct TotalCount {
    #[serde(default)]
    pub total_count: i32,
}

/// Edge requested with `.summary(true)`.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct SummaryEdge {
    #[serde(default)]
    pub summary: TotalCount,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ShareCount {
    #[serde(default)]
    pub count: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FacebookPost {
    pub id: String,
    pub message: Option<String>,
    pub created_time: Option<String>,
    pub permalink_url: Option<String>,
    #[serde(rename = "type")]
    pub post_type: Option<String>,
    pub reactions: Option<SummaryEdge>,
    pub comments: Option<SummaryEdge>,
    pub shares: Option<ShareCount>,
}
