use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::core::config::ArchiveConfig;
use crate::core::error::{AppError, Result};
use crate::features::activity::models::WarningType;
use crate::features::archives::models::{ArchivedChannel, CreateArchivedChannel, ForgetCounts};
use crate::features::notifications::notices;
use crate::features::rescue::models::DetectedResource;
use crate::features::rescue::services::RescueService;
use crate::modules::discord::{
    ChatPlatform, CreateChannelRequest, PlatformChannel, CHANNEL_TYPE_CATEGORY, CHANNEL_TYPE_TEXT,
};
use crate::modules::persistence::{ArchiveFilter, ArchiveStore};

/// Options for a single archive run
#[derive(Debug, Clone, Copy)]
pub struct ArchiveOptions {
    /// Only used for the audit reason on deletion
    pub inactivity_days: i32,
    pub rescue_resources: bool,
    pub grace_period_days: Option<i32>,
}

/// Phase one result: the snapshot and resources are persisted
#[derive(Debug, Clone)]
pub struct ArchiveReceipt {
    pub archived_channel_id: Uuid,
    pub channel_id: String,
    pub channel_name: String,
    pub resource_count: usize,
    pub duplicates: usize,
    pub inactivity_days: i32,
}

/// Phase two result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionOutcome {
    pub deleted: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ArchiveOutcome {
    pub receipt: ArchiveReceipt,
    pub deletion: DeletionOutcome,
}

#[derive(Debug, Clone)]
pub struct RestoreOutcome {
    pub archived_channel_id: Uuid,
    pub channel_id: String,
    pub resource_count: i64,
}

#[derive(Debug, Clone)]
pub struct ForgetReport {
    pub archived_channel_id: Uuid,
    pub name: String,
    pub counts: ForgetCounts,
}

/// Archive Orchestrator: rescue, snapshot, persist, notify, delete and restore
pub struct ArchiveService {
    platform: Arc<dyn ChatPlatform>,
    store: Arc<dyn ArchiveStore>,
    rescue: Arc<RescueService>,
    deletion_delay: Duration,
    postpone_days: i64,
    knowledge_base_channel_id: Option<String>,
}

impl ArchiveService {
    pub fn new(
        platform: Arc<dyn ChatPlatform>,
        store: Arc<dyn ArchiveStore>,
        rescue: Arc<RescueService>,
        config: &ArchiveConfig,
        knowledge_base_channel_id: Option<String>,
    ) -> Self {
        Self {
            platform,
            store,
            rescue,
            deletion_delay: config.deletion_delay,
            postpone_days: config.default_postpone_days,
            knowledge_base_channel_id,
        }
    }

    // ========================================================================
    // Archive
    // ========================================================================

    /// Phase one of archiving. The source channel is left in place.
    ///
    /// Rescue runs before anything is written, so a rescue failure leaves no
    /// trace. If resource persistence fails after the archive row exists, the
    /// row and any resources written for it are discarded again.
    pub async fn archive_channel(
        &self,
        channel_id: &str,
        options: ArchiveOptions,
    ) -> Result<ArchiveReceipt> {
        let channel = self
            .platform
            .fetch_channel(channel_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Channel {} not found", channel_id)))?;

        if self.store.find_open_archive(channel_id).await?.is_some() {
            return Err(AppError::AlreadyArchived(format!(
                "Channel {} is already archived",
                channel.display_name()
            )));
        }

        tracing::info!("Starting archive process for channel: {}", channel.display_name());

        let resources = if options.rescue_resources {
            self.rescue.rescue_resources(channel_id, None).await?
        } else {
            Vec::new()
        };

        let snapshot = self.snapshot(&channel).await?;
        let archive = self.store.create_archive(&snapshot, Utc::now()).await?;

        let summary = match self.rescue.save_resources(&resources, archive.id).await {
            Ok(summary) => summary,
            Err(e) => {
                tracing::error!(
                    "Discarding archive {} of channel {}: {}",
                    archive.id,
                    channel_id,
                    e
                );
                if let Err(discard_err) = self.store.discard_archive(archive.id).await {
                    tracing::error!(
                        "Failed to discard archive {} after persistence failure: {}",
                        archive.id,
                        discard_err
                    );
                }
                return Err(e);
            }
        };

        if !resources.is_empty() {
            self.mirror_to_knowledge_base(&channel, &resources).await;
        }

        let tombstone = notices::tombstone_notice(resources.len(), options.grace_period_days);
        if let Err(e) = self.platform.send_message(channel_id, &tombstone).await {
            tracing::warn!(
                "Failed to post archive notice in channel {}: {}",
                channel_id,
                e
            );
        }

        Ok(ArchiveReceipt {
            archived_channel_id: archive.id,
            channel_id: channel_id.to_string(),
            channel_name: channel.display_name().to_string(),
            resource_count: summary.saved + summary.duplicates,
            duplicates: summary.duplicates,
            inactivity_days: options.inactivity_days,
        })
    }

    /// Phase two: wait for the notice to render, then delete the source.
    pub async fn delete_archived_source(&self, receipt: &ArchiveReceipt) -> DeletionOutcome {
        tokio::time::sleep(self.deletion_delay).await;

        let reason = format!(
            "Archived by Archivemind - Inactive for {} days",
            receipt.inactivity_days
        );

        match self.platform.delete_channel(&receipt.channel_id, &reason).await {
            Ok(()) => {
                tracing::info!(
                    "Archived channel {} in favour of archive {} ({} resources)",
                    receipt.channel_name,
                    receipt.archived_channel_id,
                    receipt.resource_count
                );
                DeletionOutcome {
                    deleted: true,
                    error: None,
                }
            }
            Err(e) => {
                tracing::error!("Failed to delete channel {}: {}", receipt.channel_name, e);
                DeletionOutcome {
                    deleted: false,
                    error: Some(e.to_string()),
                }
            }
        }
    }

    pub async fn archive_and_delete(
        &self,
        channel_id: &str,
        options: ArchiveOptions,
    ) -> Result<ArchiveOutcome> {
        let receipt = self.archive_channel(channel_id, options).await?;
        let deletion = self.delete_archived_source(&receipt).await;
        Ok(ArchiveOutcome { receipt, deletion })
    }

    async fn snapshot(&self, channel: &PlatformChannel) -> Result<CreateArchivedChannel> {
        let guild_id = channel.guild_id.clone().ok_or_else(|| {
            AppError::BadRequest(format!("Channel {} does not belong to a guild", channel.id))
        })?;

        let category = match channel.parent_id.as_deref() {
            Some(parent_id) => match self.platform.fetch_channel(parent_id).await {
                Ok(parent) => parent.and_then(|p| p.name),
                Err(e) => {
                    tracing::warn!("Could not resolve category {}: {}", parent_id, e);
                    None
                }
            },
            None => None,
        };

        Ok(CreateArchivedChannel {
            original_id: channel.id.clone(),
            name: channel.display_name().to_string(),
            category,
            guild_id,
            topic: channel.topic.clone(),
            nsfw: channel.nsfw,
            rate_limit: channel.rate_limit_per_user.unwrap_or(0),
            position: channel.position.unwrap_or(0),
            permission_snapshot: channel.permission_overwrites.clone(),
        })
    }

    async fn mirror_to_knowledge_base(
        &self,
        channel: &PlatformChannel,
        resources: &[DetectedResource],
    ) {
        let Some(kb_channel_id) = self.knowledge_base_channel_id.as_deref() else {
            return;
        };

        let payloads = notices::knowledge_base_mirror(
            &channel.id,
            channel.display_name(),
            resources,
            Utc::now(),
        );

        for payload in payloads {
            if let Err(e) = self.platform.send_message(kb_channel_id, &payload).await {
                tracing::error!("Failed to post to knowledge base: {}", e);
                return;
            }
        }
    }

    // ========================================================================
    // Restore
    // ========================================================================

    /// Recreate the single open archive named `channel_name` in the guild.
    ///
    /// The archive row is claimed before any channel is created, so of two
    /// concurrent restores only one reaches the platform.
    pub async fn restore_channel(&self, channel_name: &str, guild_id: &str) -> Result<RestoreOutcome> {
        let archive = self.resolve_single(guild_id, channel_name, false).await?;

        if !self.store.claim_restore(archive.id, Utc::now()).await? {
            return Err(AppError::NotFound(format!(
                "Archived channel '{}' is already being restored",
                archive.name
            )));
        }

        tracing::info!("Restoring channel: {}", archive.name);

        let restored = match self.recreate(guild_id, &archive).await {
            Ok(channel) => channel,
            Err(e) => {
                if let Err(release) = self.store.release_restore(archive.id).await {
                    tracing::error!(
                        "Failed to release restore claim on {}: {}",
                        archive.id,
                        release
                    );
                }
                return Err(e);
            }
        };

        let resource_count = self.store.count_resources(archive.id).await?;
        let notice = notices::restoration_notice(resource_count);
        if let Err(e) = self.platform.send_message(&restored.id, &notice).await {
            tracing::warn!("Failed to post restoration notice in {}: {}", restored.id, e);
        }

        tracing::info!("Restored channel {} as {}", archive.name, restored.id);

        Ok(RestoreOutcome {
            archived_channel_id: archive.id,
            channel_id: restored.id,
            resource_count,
        })
    }

    async fn recreate(&self, guild_id: &str, archive: &ArchivedChannel) -> Result<PlatformChannel> {
        let parent_id = match archive.category.as_deref() {
            Some(category) => self.find_category(guild_id, category).await?,
            None => None,
        };

        let request = CreateChannelRequest {
            name: archive.name.clone(),
            kind: CHANNEL_TYPE_TEXT,
            parent_id,
            topic: archive.topic.clone().filter(|t| !t.is_empty()),
            nsfw: archive.nsfw,
            rate_limit_per_user: archive.rate_limit,
            position: archive.position,
            permission_overwrites: archive.permission_snapshot.0.clone(),
        };

        Ok(self.platform.create_channel(guild_id, &request).await?)
    }

    async fn find_category(&self, guild_id: &str, name: &str) -> Result<Option<String>> {
        let channels = self.platform.fetch_guild_channels(guild_id).await?;
        Ok(channels
            .into_iter()
            .find(|c| c.kind == CHANNEL_TYPE_CATEGORY && c.name.as_deref() == Some(name))
            .map(|c| c.id))
    }

    /// Exactly one archive by name, or NotFound / AmbiguousMatch.
    async fn resolve_single(
        &self,
        guild_id: &str,
        channel_name: &str,
        include_restored: bool,
    ) -> Result<ArchivedChannel> {
        let mut candidates = self
            .store
            .find_archives_by_name(guild_id, channel_name, include_restored)
            .await?;

        match candidates.len() {
            0 => Err(AppError::NotFound(format!(
                "No archived channel found with name: {}",
                channel_name
            ))),
            1 => Ok(candidates.remove(0)),
            n => Err(AppError::AmbiguousMatch {
                message: format!("{} archived channels match name: {}", n, channel_name),
                candidates: candidates
                    .iter()
                    .map(|a| {
                        format!(
                            "{} (archived {}, id {})",
                            a.name,
                            a.archived_at.format("%Y-%m-%d %H:%M"),
                            a.id
                        )
                    })
                    .collect(),
            }),
        }
    }

    // ========================================================================
    // Warnings
    // ========================================================================

    /// Post a warning notice into the channel and record it.
    pub async fn send_archive_warning(
        &self,
        channel_id: &str,
        warning_type: WarningType,
        days_remaining: i64,
    ) -> Result<()> {
        let notice =
            notices::warning_notice(channel_id, warning_type, days_remaining, self.postpone_days);
        self.platform.send_message(channel_id, &notice).await?;
        self.store
            .record_warning(channel_id, warning_type, Utc::now())
            .await?;

        tracing::info!(
            "Sent {} warning to channel {} ({} days remaining)",
            warning_type,
            channel_id,
            days_remaining
        );

        Ok(())
    }

    // ========================================================================
    // Forgotten deletion
    // ========================================================================

    /// Permanently remove an archive, its resources and its warnings.
    pub async fn perform_forgotten_deletion(
        &self,
        archived_channel_id: Uuid,
        reason: &str,
        requested_by: &str,
    ) -> Result<ForgetCounts> {
        let counts = self
            .store
            .forget_archived_channel(archived_channel_id)
            .await?;

        tracing::warn!(
            archived_channel_id = %archived_channel_id,
            requested_by,
            reason,
            resources = counts.resources,
            warnings = counts.warnings,
            "Forgotten deletion completed"
        );

        Ok(counts)
    }

    pub async fn forget_by_name(
        &self,
        guild_id: &str,
        channel_name: &str,
        reason: &str,
        requested_by: &str,
    ) -> Result<ForgetReport> {
        let archive = self.resolve_single(guild_id, channel_name, true).await?;
        let counts = self
            .perform_forgotten_deletion(archive.id, reason, requested_by)
            .await?;

        Ok(ForgetReport {
            archived_channel_id: archive.id,
            name: archive.name,
            counts,
        })
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub async fn list_archives(&self, filter: &ArchiveFilter) -> Result<(Vec<ArchivedChannel>, i64)> {
        self.store.list_archives(filter).await
    }

    /// Archive row with its resource count
    pub async fn get_archive(&self, id: Uuid) -> Result<(ArchivedChannel, i64)> {
        let archive = self
            .store
            .get_archive(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Archived channel {} not found", id)))?;
        let count = self.store.count_resources(id).await?;
        Ok((archive, count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::rescue::models::ResourceType;
    use crate::modules::discord::PermissionOverwrite;
    use crate::shared::test_helpers::{text_message, FakePlatform, ForgetStep, MemoryStore};

    struct Harness {
        platform: Arc<FakePlatform>,
        store: Arc<MemoryStore>,
        service: ArchiveService,
    }

    fn harness_with_kb(kb: Option<&str>) -> Harness {
        let platform = Arc::new(FakePlatform::new());
        let store = Arc::new(MemoryStore::new());
        let rescue = Arc::new(RescueService::new(platform.clone(), store.clone(), 500));
        let config = ArchiveConfig {
            deletion_delay: Duration::ZERO,
            ..ArchiveConfig::default()
        };
        let service = ArchiveService::new(
            platform.clone(),
            store.clone(),
            rescue,
            &config,
            kb.map(str::to_string),
        );
        Harness {
            platform,
            store,
            service,
        }
    }

    fn harness() -> Harness {
        harness_with_kb(None)
    }

    fn options() -> ArchiveOptions {
        ArchiveOptions {
            inactivity_days: 30,
            rescue_resources: true,
            grace_period_days: None,
        }
    }

    fn seed_channel_with_resources(platform: &FakePlatform) {
        platform.add_category("cat1", "g1", "Projects");
        let mut channel = platform.add_text_channel("c1", "g1", "old-project");
        channel.parent_id = Some("cat1".to_string());
        channel.topic = Some("legacy work".to_string());
        channel.rate_limit_per_user = Some(10);
        channel.position = Some(4);
        channel.permission_overwrites = vec![PermissionOverwrite {
            id: "g1".to_string(),
            kind: 0,
            allow: "0".to_string(),
            deny: "1024".to_string(),
        }];
        platform.put_channel(channel);
        platform.push_messages(
            "c1",
            vec![
                text_message("1", "ada", "docs at https://docs.rs/tokio"),
                text_message("2", "bob", "see https://github.com/tokio-rs/axum"),
            ],
        );
    }

    #[tokio::test]
    async fn test_archive_and_delete_persists_then_deletes() {
        let h = harness();
        seed_channel_with_resources(&h.platform);

        let outcome = h.service.archive_and_delete("c1", options()).await.unwrap();

        assert_eq!(outcome.receipt.resource_count, 2);
        assert!(outcome.deletion.deleted);
        assert_eq!(outcome.deletion.error, None);

        let archives = h.store.archive_rows();
        assert_eq!(archives.len(), 1);
        assert_eq!(archives[0].category.as_deref(), Some("Projects"));
        assert_eq!(archives[0].rate_limit, 10);
        assert_eq!(archives[0].permission_snapshot.0.len(), 1);
        assert_eq!(h.store.resource_rows().len(), 2);

        let deleted = h.platform.deleted.lock().unwrap().clone();
        assert_eq!(deleted.len(), 1);
        assert_eq!(deleted[0].0, "c1");
        assert_eq!(deleted[0].1, "Archived by Archivemind - Inactive for 30 days");

        let tombstones = h.platform.sent_to("c1");
        assert_eq!(tombstones.len(), 1);
        assert_eq!(tombstones[0].embeds[0].title, "📦 Channel Archived");
    }

    #[tokio::test]
    async fn test_archive_missing_channel_is_not_found() {
        let h = harness();
        let err = h.service.archive_channel("nope", options()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert!(h.store.archive_rows().is_empty());
    }

    #[tokio::test]
    async fn test_archive_twice_creates_no_duplicate_row() {
        let h = harness();
        h.platform.add_text_channel("c1", "g1", "general");

        h.service.archive_channel("c1", options()).await.unwrap();
        let err = h.service.archive_channel("c1", options()).await.unwrap_err();

        assert!(matches!(err, AppError::AlreadyArchived(_)));
        assert_eq!(h.store.archive_rows().len(), 1);
    }

    #[tokio::test]
    async fn test_rescue_failure_aborts_before_persisting() {
        let h = harness();
        h.platform.add_text_channel("c1", "g1", "general");
        h.platform.fail_history(true);

        let err = h.service.archive_and_delete("c1", options()).await.unwrap_err();

        assert!(matches!(err, AppError::PermissionDenied(_)));
        assert!(h.store.archive_rows().is_empty());
        assert!(h.platform.has_channel("c1"));
    }

    #[tokio::test]
    async fn test_persistence_failure_discards_archive_and_keeps_channel() {
        let h = harness();
        seed_channel_with_resources(&h.platform);
        h.store.fail_resource_inserts_after(1);

        let err = h.service.archive_and_delete("c1", options()).await.unwrap_err();

        assert!(matches!(err, AppError::Persistence(_)));
        assert!(h.store.archive_rows().is_empty());
        assert!(h.store.resource_rows().is_empty());
        assert!(h.platform.has_channel("c1"));
        assert!(h.platform.sent_to("c1").is_empty());
    }

    #[tokio::test]
    async fn test_deletion_failure_is_reported_not_fatal() {
        let h = harness();
        h.platform.add_text_channel("c1", "g1", "general");
        h.platform.fail_deletes(true);

        let outcome = h.service.archive_and_delete("c1", options()).await.unwrap();

        assert!(!outcome.deletion.deleted);
        assert!(outcome.deletion.error.is_some());
        assert_eq!(h.store.archive_rows().len(), 1);
    }

    #[tokio::test]
    async fn test_mirror_failure_does_not_fail_archive() {
        let h = harness_with_kb(Some("kb"));
        seed_channel_with_resources(&h.platform);
        h.platform.fail_sends_to("kb");

        let receipt = h.service.archive_channel("c1", options()).await.unwrap();
        assert_eq!(receipt.resource_count, 2);
    }

    #[tokio::test]
    async fn test_mirror_posts_one_embed_per_type() {
        let h = harness_with_kb(Some("kb"));
        seed_channel_with_resources(&h.platform);

        h.service.archive_channel("c1", options()).await.unwrap();

        // both rescued resources are links
        let mirrored = h.platform.sent_to("kb");
        assert_eq!(mirrored.len(), 1);
        assert!(mirrored[0].embeds[0].description.contains(&ResourceType::Link.to_string()));
    }

    #[tokio::test]
    async fn test_restore_recreates_snapshot_once() {
        let h = harness();
        seed_channel_with_resources(&h.platform);
        h.service.archive_and_delete("c1", options()).await.unwrap();

        let restored = h.service.restore_channel("old-project", "g1").await.unwrap();
        assert_eq!(restored.resource_count, 2);

        let requests = h.platform.created_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].name, "old-project");
        assert_eq!(requests[0].parent_id.as_deref(), Some("cat1"));
        assert_eq!(requests[0].topic.as_deref(), Some("legacy work"));
        assert_eq!(requests[0].position, 4);
        assert_eq!(requests[0].permission_overwrites[0].deny, "1024");

        let archive = &h.store.archive_rows()[0];
        assert!(archive.restored);
        assert!(archive.restored_at.is_some());

        let notice = h.platform.sent_to(&restored.channel_id);
        assert_eq!(notice[0].embeds[0].title, "🔄 Channel Restored");

        let err = h.service.restore_channel("old-project", "g1").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(h.platform.created_requests().len(), 1);
    }

    #[tokio::test]
    async fn test_restore_without_matching_category_has_no_parent() {
        let h = harness();
        seed_channel_with_resources(&h.platform);
        h.service.archive_and_delete("c1", options()).await.unwrap();
        h.platform.remove_channel("cat1");

        h.service.restore_channel("old-project", "g1").await.unwrap();
        assert_eq!(h.platform.created_requests()[0].parent_id, None);
    }

    #[tokio::test]
    async fn test_restore_ambiguous_match_is_surfaced() {
        let h = harness();
        h.store.seed_archive("a", "g1", "general");
        h.store.seed_archive("b", "g1", "General");

        let err = h.service.restore_channel("general", "g1").await.unwrap_err();

        match err {
            AppError::AmbiguousMatch { candidates, .. } => assert_eq!(candidates.len(), 2),
            other => panic!("expected ambiguous match, got {:?}", other),
        }
        assert!(h.platform.created_requests().is_empty());
        assert!(h.store.archive_rows().iter().all(|a| !a.restored));
    }

    #[tokio::test]
    async fn test_restore_losing_the_claim_creates_nothing() {
        let h = harness();
        h.store.seed_archive("a", "g1", "general");
        h.store.lose_next_claim();

        let err = h.service.restore_channel("general", "g1").await.unwrap_err();

        assert!(matches!(err, AppError::NotFound(ref m) if m.contains("already being restored")));
        assert!(h.platform.created_requests().is_empty());
        assert!(h.platform.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_create_releases_the_claim() {
        let h = harness();
        h.store.seed_archive("a", "g1", "general");
        h.platform.fail_creates(true);

        let err = h.service.restore_channel("general", "g1").await.unwrap_err();
        assert!(matches!(err, AppError::PermissionDenied(_)));
        let archive = &h.store.archive_rows()[0];
        assert!(!archive.restored);
        assert!(archive.restored_at.is_none());

        h.platform.fail_creates(false);
        h.service.restore_channel("general", "g1").await.unwrap();
        assert_eq!(h.platform.created_requests().len(), 1);
        assert!(h.store.archive_rows()[0].restored);
    }

    #[tokio::test]
    async fn test_send_archive_warning_posts_and_records() {
        let h = harness();
        h.platform.add_text_channel("c1", "g1", "general");

        h.service
            .send_archive_warning("c1", WarningType::OneDay, 1)
            .await
            .unwrap();

        let sent = h.platform.sent_to("c1");
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].components[0].components[1].custom_id, "archive_now_c1");
        let warnings = h.store.warning_rows();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].warning_type, WarningType::OneDay);
    }

    #[tokio::test]
    async fn test_warning_not_recorded_when_send_fails() {
        let h = harness();
        h.platform.fail_sends_to("c1");

        let result = h
            .service
            .send_archive_warning("c1", WarningType::Final, 1)
            .await;

        assert!(result.is_err());
        assert!(h.store.warning_rows().is_empty());
    }

    #[tokio::test]
    async fn test_forgotten_deletion_removes_everything() {
        let h = harness();
        seed_channel_with_resources(&h.platform);
        h.store
            .seed_warning("c1", WarningType::SevenDays, Utc::now());
        let receipt = h.service.archive_channel("c1", options()).await.unwrap();

        let counts = h
            .service
            .perform_forgotten_deletion(receipt.archived_channel_id, "GDPR request", "admin")
            .await
            .unwrap();

        assert_eq!(
            counts,
            ForgetCounts {
                resources: 2,
                warnings: 1,
                archives: 1
            }
        );
        assert!(h.store.archive_rows().is_empty());
        assert!(h.store.resource_rows().is_empty());
        assert!(h.store.warning_rows().is_empty());
    }

    #[tokio::test]
    async fn test_forgotten_deletion_mid_failure_deletes_nothing() {
        let h = harness();
        seed_channel_with_resources(&h.platform);
        h.store
            .seed_warning("c1", WarningType::ThreeDays, Utc::now());
        let receipt = h.service.archive_channel("c1", options()).await.unwrap();
        h.store.fail_forget_at(ForgetStep::Archive);

        let result = h
            .service
            .perform_forgotten_deletion(receipt.archived_channel_id, "cleanup", "admin")
            .await;

        assert!(result.is_err());
        assert_eq!(h.store.archive_rows().len(), 1);
        assert_eq!(h.store.resource_rows().len(), 2);
        assert_eq!(h.store.warning_rows().len(), 1);
    }

    #[tokio::test]
    async fn test_forget_by_name_requires_unique_match() {
        let h = harness();
        h.store.seed_archive("a", "g1", "general");
        let b = h.store.seed_archive("b", "g1", "general");

        let err = h
            .service
            .forget_by_name("g1", "general", "cleanup", "admin")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::AmbiguousMatch { .. }));

        h.service
            .perform_forgotten_deletion(b.id, "cleanup", "admin")
            .await
            .unwrap();
        let report = h
            .service
            .forget_by_name("g1", "general", "cleanup", "admin")
            .await
            .unwrap();
        assert_eq!(report.counts.archives, 1);
        assert!(h.store.archive_rows().is_empty());

        let err = h
            .service
            .forget_by_name("g1", "general", "cleanup", "admin")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_get_archive_includes_resource_count() {
        let h = harness();
        seed_channel_with_resources(&h.platform);
        let receipt = h.service.archive_channel("c1", options()).await.unwrap();

        let (archive, count) = h.service.get_archive(receipt.archived_channel_id).await.unwrap();
        assert_eq!(archive.original_id, "c1");
        assert_eq!(count, 2);

        let err = h.service.get_archive(Uuid::now_v7()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
