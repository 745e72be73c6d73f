use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::features::rescue::models::{DetectedResource, Resource, ResourceKind, ResourceType};
use crate::modules::persistence::ResourceMatch;

#[derive(Debug, Deserialize, IntoParams)]
pub struct RescueParams {
    /// Messages to scan, newest first (default 500)
    #[param(minimum = 1, maximum = 5000)]
    pub limit: Option<usize>,
}

/// Persisted resource
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ResourceDto {
    pub id: Uuid,
    pub resource_type: ResourceType,
    pub url: Option<String>,
    pub content: Option<String>,
    pub file_name: Option<String>,
    pub file_size: Option<i64>,
    pub context: Option<String>,
    pub author_id: String,
    pub author_name: String,
    pub original_message_id: String,
    pub archived_channel_id: Uuid,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Resource> for ResourceDto {
    fn from(r: Resource) -> Self {
        Self {
            id: r.id,
            resource_type: r.resource_type,
            url: r.url,
            content: r.content,
            file_name: r.file_name,
            file_size: r.file_size,
            context: r.context,
            author_id: r.author_id,
            author_name: r.author_name,
            original_message_id: r.original_message_id,
            archived_channel_id: r.channel_id,
            tags: r.tags,
            created_at: r.created_at,
        }
    }
}

/// Resource found by a scan, not yet persisted
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DetectedResourceDto {
    pub resource_type: ResourceType,
    pub url: Option<String>,
    pub content: Option<String>,
    pub file_name: Option<String>,
    pub file_size: Option<i64>,
    pub language: Option<String>,
    pub tags: Vec<String>,
    pub author_id: String,
    pub author_name: String,
    pub message_id: String,
    pub context: String,
}

impl From<DetectedResource> for DetectedResourceDto {
    fn from(d: DetectedResource) -> Self {
        let resource_type = d.kind.resource_type();
        let tags = d.kind.tags();
        let (url, content, file_name, file_size, language) = match d.kind {
            ResourceKind::File(a) | ResourceKind::Image(a) | ResourceKind::Document(a) => {
                (Some(a.url), None, Some(a.file_name), Some(a.file_size), None)
            }
            ResourceKind::Link { url, .. } => (Some(url), None, None, None, None),
            ResourceKind::Code { content, language } => {
                (None, Some(content), None, None, Some(language))
            }
            ResourceKind::Pin { content } => (None, Some(content), None, None, None),
        };

        Self {
            resource_type,
            url,
            content,
            file_name,
            file_size,
            language,
            tags,
            author_id: d.provenance.author_id,
            author_name: d.provenance.author_name,
            message_id: d.provenance.message_id,
            context: d.provenance.context,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ResourceSearchParams {
    /// Guild whose archives are searched
    pub guild_id: String,
    /// Keyword matched against urls, file names, content, context and tags
    #[param(min_length = 2, max_length = 100)]
    pub q: String,
    pub resource_type: Option<ResourceType>,
    pub author_id: Option<String>,
    /// Maximum results (default 10)
    #[param(minimum = 1, maximum = 20)]
    pub limit: Option<i64>,
}

/// Search hit with the archive it came from
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ResourceMatchDto {
    #[serde(flatten)]
    pub resource: ResourceDto,
    pub channel_name: String,
    pub archived_at: DateTime<Utc>,
}

impl From<ResourceMatch> for ResourceMatchDto {
    fn from(m: ResourceMatch) -> Self {
        Self {
            resource: m.resource.into(),
            channel_name: m.channel_name,
            archived_at: m.archived_at,
        }
    }
}
