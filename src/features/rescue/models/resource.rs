use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use utoipa::ToSchema;
use uuid::Uuid;

/// Resource kind enum matching database enum
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Type, ToSchema,
)]
#[sqlx(type_name = "resource_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResourceType {
    File,
    Link,
    Code,
    Pin,
    Image,
    Document,
}

impl ResourceType {
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceType::File => "FILE",
            ResourceType::Link => "LINK",
            ResourceType::Code => "CODE",
            ResourceType::Pin => "PIN",
            ResourceType::Image => "IMAGE",
            ResourceType::Document => "DOCUMENT",
        }
    }

    /// Lowercase form used as a resource tag
    pub fn tag(self) -> String {
        self.as_str().to_lowercase()
    }
}

impl std::fmt::Display for ResourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Database model for a rescued resource
#[derive(Debug, Clone, FromRow)]
pub struct Resource {
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
    /// Owning `archived_channels.id`
    pub channel_id: Uuid,
    pub tags: Vec<String>,
    pub dedup_key: String,
    pub created_at: DateTime<Utc>,
}

/// Data for inserting a rescued resource
#[derive(Debug, Clone)]
pub struct NewResource {
    pub resource_type: ResourceType,
    pub url: Option<String>,
    pub content: Option<String>,
    pub file_name: Option<String>,
    pub file_size: Option<i64>,
    pub context: Option<String>,
    pub author_id: String,
    pub author_name: String,
    pub original_message_id: String,
    pub channel_id: Uuid,
    pub tags: Vec<String>,
    pub dedup_key: String,
}
