use sha2::{Digest, Sha256};
use uuid::Uuid;

use super::resource::{NewResource, ResourceType};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentInfo {
    pub url: String,
    pub file_name: String,
    pub file_size: i64,
    /// Lowercase, without the leading dot (`tar.gz` kept whole)
    pub extension: String,
}

/// What a classifier found, one variant per persisted resource type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceKind {
    File(AttachmentInfo),
    Image(AttachmentInfo),
    Document(AttachmentInfo),
    Link { url: String, domain: String },
    Code { content: String, language: String },
    Pin { content: String },
}

impl ResourceKind {
    pub fn resource_type(&self) -> ResourceType {
        match self {
            ResourceKind::File(_) => ResourceType::File,
            ResourceKind::Image(_) => ResourceType::Image,
            ResourceKind::Document(_) => ResourceType::Document,
            ResourceKind::Link { .. } => ResourceType::Link,
            ResourceKind::Code { .. } => ResourceType::Code,
            ResourceKind::Pin { .. } => ResourceType::Pin,
        }
    }

    /// The url for linked/attached resources, otherwise the text content
    pub fn subject(&self) -> &str {
        match self {
            ResourceKind::File(a) | ResourceKind::Image(a) | ResourceKind::Document(a) => &a.url,
            ResourceKind::Link { url, .. } => url,
            ResourceKind::Code { content, .. } | ResourceKind::Pin { content } => content,
        }
    }

    /// Type tag plus the one type-specific qualifier
    pub fn tags(&self) -> Vec<String> {
        let mut tags = vec![self.resource_type().tag()];
        let qualifier = match self {
            ResourceKind::File(a) | ResourceKind::Image(a) | ResourceKind::Document(a) => {
                Some(a.extension.as_str())
            }
            ResourceKind::Link { domain, .. } => Some(domain.as_str()),
            ResourceKind::Code { language, .. } => Some(language.as_str()),
            ResourceKind::Pin { .. } => None,
        };
        if let Some(q) = qualifier.filter(|q| !q.is_empty()) {
            if !tags.iter().any(|t| t == q) {
                tags.push(q.to_string());
            }
        }
        tags
    }
}

/// Where a resource came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provenance {
    pub author_id: String,
    pub author_name: String,
    pub message_id: String,
    /// Up to three preceding messages, oldest first
    pub context: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedResource {
    pub kind: ResourceKind,
    pub provenance: Provenance,
}

impl DetectedResource {
    /// Key used to collapse duplicates within one rescue pass
    pub fn dedup_key(&self) -> (ResourceType, &str) {
        (self.kind.resource_type(), self.kind.subject())
    }

    /// Stable cross-run key: sha256 of type, subject and owning archive
    pub fn durable_key(&self, archived_channel_id: Uuid) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.kind.resource_type().as_str().as_bytes());
        hasher.update(b"|");
        hasher.update(self.kind.subject().as_bytes());
        hasher.update(b"|");
        hasher.update(archived_channel_id.as_bytes());
        hex::encode(hasher.finalize())
    }

    pub fn to_new_resource(&self, archived_channel_id: Uuid) -> NewResource {
        let (url, content, file_name, file_size) = match &self.kind {
            ResourceKind::File(a) | ResourceKind::Image(a) | ResourceKind::Document(a) => (
                Some(a.url.clone()),
                None,
                Some(a.file_name.clone()),
                Some(a.file_size),
            ),
            ResourceKind::Link { url, .. } => (Some(url.clone()), None, None, None),
            ResourceKind::Code { content, .. } | ResourceKind::Pin { content } => {
                (None, Some(content.clone()), None, None)
            }
        };

        NewResource {
            resource_type: self.kind.resource_type(),
            url,
            content,
            file_name,
            file_size,
            context: Some(self.provenance.context.clone()).filter(|c| !c.is_empty()),
            author_id: self.provenance.author_id.clone(),
            author_name: self.provenance.author_name.clone(),
            original_message_id: self.provenance.message_id.clone(),
            channel_id: archived_channel_id,
            tags: self.kind.tags(),
            dedup_key: self.durable_key(archived_channel_id),
        }
    }
}
