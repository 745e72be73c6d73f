use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::rescue::classifiers;
use crate::features::rescue::models::{DetectedResource, Provenance, Resource, ResourceType};
use crate::modules::discord::{ChatPlatform, PlatformMessage, MAX_MESSAGES_PER_PAGE};
use crate::modules::persistence::{ArchiveStore, InsertOutcome, ResourceMatch, ResourceSearch};
use crate::shared::constants::{
    MAX_SEARCH_LIMIT, MAX_SEARCH_QUERY_CHARS, MIN_SEARCH_QUERY_CHARS,
};

/// Preceding messages captured as provenance context
const CONTEXT_MESSAGES: usize = 3;
const MAX_CONTEXT_CHARS: usize = 500;

/// Outcome of persisting one rescue batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SaveSummary {
    pub saved: usize,
    pub duplicates: usize,
}

/// Resource Rescue Engine: history scan, classification and persistence
pub struct RescueService {
    platform: Arc<dyn ChatPlatform>,
    store: Arc<dyn ArchiveStore>,
    default_message_limit: usize,
}

impl RescueService {
    pub fn new(
        platform: Arc<dyn ChatPlatform>,
        store: Arc<dyn ArchiveStore>,
        default_message_limit: usize,
    ) -> Self {
        Self {
            platform,
            store,
            default_message_limit,
        }
    }

    /// Scan up to `message_limit` messages (newest first) and classify them.
    ///
    /// Results are deduplicated by `(type, url-or-content)` within this call.
    /// A message whose extraction fails is logged and skipped.
    pub async fn rescue_resources(
        &self,
        channel_id: &str,
        message_limit: Option<usize>,
    ) -> Result<Vec<DetectedResource>> {
        let limit = message_limit.unwrap_or(self.default_message_limit);
        let history = self.fetch_history(channel_id, limit).await?;

        tracing::info!(
            "Scanning {} messages for resources in channel {}",
            history.len(),
            channel_id
        );

        let mut seen: HashSet<(ResourceType, String)> = HashSet::new();
        let mut resources = Vec::new();

        for (index, message) in history.iter().enumerate() {
            let kinds = match classifiers::classify_message(message) {
                Ok(kinds) => kinds,
                Err(e) => {
                    tracing::warn!(
                        "Skipping message {} in channel {}: {}",
                        message.id,
                        channel_id,
                        e
                    );
                    continue;
                }
            };

            if kinds.is_empty() {
                continue;
            }

            // History is newest first, so older neighbours follow the message
            let context = build_context(&history[index + 1..]);

            for kind in kinds {
                let resource = DetectedResource {
                    kind,
                    provenance: provenance(message, context.clone()),
                };
                let (resource_type, subject) = resource.dedup_key();
                if seen.insert((resource_type, subject.to_string())) {
                    resources.push(resource);
                }
            }
        }

        tracing::info!(
            "Rescued {} resources from channel {}",
            resources.len(),
            channel_id
        );

        Ok(resources)
    }

    /// Classify a single live message once it passes the gate.
    pub fn capture_message(&self, message: &PlatformMessage) -> Result<Vec<DetectedResource>> {
        if !classifiers::has_valuable_content(&message.content, !message.attachments.is_empty()) {
            return Ok(Vec::new());
        }

        let resources: Vec<DetectedResource> = classifiers::classify_message(message)?
            .into_iter()
            .map(|kind| DetectedResource {
                kind,
                provenance: provenance(message, String::new()),
            })
            .collect();

        if !resources.is_empty() {
            tracing::info!(
                "Captured {} resources from live message {} by {}",
                resources.len(),
                message.id,
                message.author.display_name()
            );
        }

        Ok(resources)
    }

    /// Persist resources one insert at a time against an archive.
    ///
    /// Inserts are independent: on failure the earlier ones stay committed and
    /// the error reports how far the batch got. Rows whose dedup key already
    /// exists are skipped and counted as duplicates.
    pub async fn save_resources(
        &self,
        resources: &[DetectedResource],
        archived_channel_id: Uuid,
    ) -> Result<SaveSummary> {
        let mut summary = SaveSummary::default();

        for resource in resources {
            let row = resource.to_new_resource(archived_channel_id);
            match self.store.insert_resource(&row).await {
                Ok(InsertOutcome::Inserted) => summary.saved += 1,
                Ok(InsertOutcome::Duplicate) => summary.duplicates += 1,
                Err(e) => {
                    tracing::error!(
                        "Resource persistence failed for archive {} after {} of {}: {}",
                        archived_channel_id,
                        summary.saved,
                        resources.len(),
                        e
                    );
                    return Err(AppError::Persistence(format!(
                        "Saved {} of {} resources before failure: {}",
                        summary.saved,
                        resources.len(),
                        e
                    )));
                }
            }
        }

        tracing::info!(
            "Saved {} resources for archive {} ({} duplicates skipped)",
            summary.saved,
            archived_channel_id,
            summary.duplicates
        );

        Ok(summary)
    }

    pub async fn list_resources(&self, archived_channel_id: Uuid) -> Result<Vec<Resource>> {
        self.store.list_resources(archived_channel_id).await
    }

    /// Keyword search across every archive of a guild.
    pub async fn search_resources(&self, search: ResourceSearch) -> Result<Vec<ResourceMatch>> {
        let query = search.query.trim();
        let chars = query.chars().count();
        if !(MIN_SEARCH_QUERY_CHARS..=MAX_SEARCH_QUERY_CHARS).contains(&chars) {
            return Err(AppError::Validation(format!(
                "query must be between {} and {} characters",
                MIN_SEARCH_QUERY_CHARS, MAX_SEARCH_QUERY_CHARS
            )));
        }
        if !(1..=MAX_SEARCH_LIMIT).contains(&search.limit) {
            return Err(AppError::Validation(format!(
                "limit must be between 1 and {}",
                MAX_SEARCH_LIMIT
            )));
        }

        let search = ResourceSearch {
            query: query.to_string(),
            ..search
        };
        let matches = self.store.search_resources(&search).await?;
        tracing::debug!(
            "Search '{}' in guild {} matched {} resources",
            search.query,
            search.guild_id,
            matches.len()
        );
        Ok(matches)
    }

    async fn fetch_history(&self, channel_id: &str, limit: usize) -> Result<Vec<PlatformMessage>> {
        let mut messages: Vec<PlatformMessage> = Vec::new();
        let mut before: Option<String> = None;

        while messages.len() < limit {
            let batch = (limit - messages.len()).min(MAX_MESSAGES_PER_PAGE as usize);
            let page = self
                .platform
                .fetch_messages(channel_id, before.as_deref(), batch as u8)
                .await?;

            if page.is_empty() {
                break;
            }

            let exhausted = page.len() < batch;
            before = page.last().map(|m| m.id.clone());
            messages.extend(page);

            if exhausted {
                break;
            }
        }

        messages.truncate(limit);
        Ok(messages)
    }
}

fn provenance(message: &PlatformMessage, context: String) -> Provenance {
    Provenance {
        author_id: message.author.id.clone(),
        author_name: message.author.display_name().to_string(),
        message_id: message.id.clone(),
        context,
    }
}

/// `older` is newest first; output is chronological "author: content" lines.
fn build_context(older: &[PlatformMessage]) -> String {
    let lines: Vec<String> = older
        .iter()
        .take(CONTEXT_MESSAGES)
        .rev()
        .map(|m| format!("{}: {}", m.author.display_name(), m.content))
        .collect();

    lines.join("\n").chars().take(MAX_CONTEXT_CHARS).collect()
}
