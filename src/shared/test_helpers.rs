//! In-memory doubles for the platform and persistence seams.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sqlx::types::Json;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::activity::models::{ArchiveWarning, WarningType, WatchChannel, WatchedChannel};
use crate::features::archives::models::{ArchivedChannel, CreateArchivedChannel, ForgetCounts};
use crate::features::rescue::models::{NewResource, Resource, ResourceType};
use crate::modules::discord::{
    ChatPlatform, CreateChannelRequest, MessageAuthor, MessagePayload, PlatformChannel,
    PlatformError, PlatformMessage, CHANNEL_TYPE_CATEGORY, CHANNEL_TYPE_TEXT,
};
use crate::modules::persistence::{
    ArchiveFilter, ArchiveStore, ChannelResourceCount, GuildCounts, InsertOutcome, ResourceMatch,
    ResourceSearch, ResourceTypeCount,
};

pub fn text_message(id: &str, author: &str, content: &str) -> PlatformMessage {
    PlatformMessage {
        id: id.to_string(),
        author: MessageAuthor {
            id: format!("user-{}", author),
            username: author.to_string(),
            global_name: None,
        },
        content: content.to_string(),
        timestamp: Utc::now(),
        pinned: false,
        attachments: vec![],
    }
}

// ============================================================================
// Platform
// ============================================================================

/// Scripted chat platform recording every mutating call
#[derive(Default)]
pub struct FakePlatform {
    channels: Mutex<HashMap<String, PlatformChannel>>,
    /// Oldest first per channel
    history: Mutex<HashMap<String, Vec<PlatformMessage>>>,
    page_sizes: Mutex<HashMap<String, Vec<u8>>>,
    pub sent: Mutex<Vec<(String, MessagePayload)>>,
    pub created: Mutex<Vec<(String, CreateChannelRequest)>>,
    pub deleted: Mutex<Vec<(String, String)>>,
    failing_sends: Mutex<HashSet<String>>,
    fail_creates: AtomicBool,
    fail_deletes: AtomicBool,
    fail_history: AtomicBool,
    next_id: AtomicU64,
}

impl FakePlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_text_channel(&self, id: &str, guild_id: &str, name: &str) -> PlatformChannel {
        let channel = PlatformChannel {
            id: id.to_string(),
            kind: CHANNEL_TYPE_TEXT,
            guild_id: Some(guild_id.to_string()),
            name: Some(name.to_string()),
            parent_id: None,
            topic: None,
            nsfw: false,
            rate_limit_per_user: Some(0),
            position: Some(0),
            permission_overwrites: vec![],
        };
        self.put_channel(channel.clone());
        channel
    }

    pub fn add_category(&self, id: &str, guild_id: &str, name: &str) {
        let mut category = self.add_text_channel(id, guild_id, name);
        category.kind = CHANNEL_TYPE_CATEGORY;
        self.put_channel(category);
    }

    pub fn put_channel(&self, channel: PlatformChannel) {
        self.channels
            .lock()
            .unwrap()
            .insert(channel.id.clone(), channel);
    }

    pub fn remove_channel(&self, id: &str) {
        self.channels.lock().unwrap().remove(id);
    }

    pub fn has_channel(&self, id: &str) -> bool {
        self.channels.lock().unwrap().contains_key(id)
    }

    /// Append messages, oldest first
    pub fn push_messages(&self, channel_id: &str, messages: Vec<PlatformMessage>) {
        self.history
            .lock()
            .unwrap()
            .entry(channel_id.to_string())
            .or_default()
            .extend(messages);
    }

    pub fn history_page_sizes(&self, channel_id: &str) -> Vec<u8> {
        self.page_sizes
            .lock()
            .unwrap()
            .get(channel_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn sent_to(&self, channel_id: &str) -> Vec<MessagePayload> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|(id, _)| id == channel_id)
            .map(|(_, payload)| payload.clone())
            .collect()
    }

    pub fn deleted_ids(&self) -> Vec<String> {
        self.deleted
            .lock()
            .unwrap()
            .iter()
            .map(|(id, _)| id.clone())
            .collect()
    }

    pub fn created_requests(&self) -> Vec<CreateChannelRequest> {
        self.created
            .lock()
            .unwrap()
            .iter()
            .map(|(_, request)| request.clone())
            .collect()
    }

    pub fn fail_sends_to(&self, channel_id: &str) {
        self.failing_sends
            .lock()
            .unwrap()
            .insert(channel_id.to_string());
    }

    pub fn fail_creates(&self, fail: bool) {
        self.fail_creates.store(fail, Ordering::SeqCst);
    }

    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    pub fn fail_history(&self, fail: bool) {
        self.fail_history.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl ChatPlatform for FakePlatform {
    async fn fetch_channel(
        &self,
        channel_id: &str,
    ) -> std::result::Result<Option<PlatformChannel>, PlatformError> {
        Ok(self.channels.lock().unwrap().get(channel_id).cloned())
    }

    async fn fetch_guild_channels(
        &self,
        guild_id: &str,
    ) -> std::result::Result<Vec<PlatformChannel>, PlatformError> {
        Ok(self
            .channels
            .lock()
            .unwrap()
            .values()
            .filter(|c| c.guild_id.as_deref() == Some(guild_id))
            .cloned()
            .collect())
    }

    async fn fetch_messages(
        &self,
        channel_id: &str,
        before: Option<&str>,
        limit: u8,
    ) -> std::result::Result<Vec<PlatformMessage>, PlatformError> {
        if self.fail_history.load(Ordering::SeqCst) {
            return Err(PlatformError::Forbidden("Missing Access".to_string()));
        }

        self.page_sizes
            .lock()
            .unwrap()
            .entry(channel_id.to_string())
            .or_default()
            .push(limit);

        let history = self.history.lock().unwrap();
        let newest_first: Vec<&PlatformMessage> = history
            .get(channel_id)
            .map(|m| m.iter().rev().collect())
            .unwrap_or_default();

        let start = match before {
            Some(id) => newest_first
                .iter()
                .position(|m| m.id == id)
                .map(|i| i + 1)
                .unwrap_or(newest_first.len()),
            None => 0,
        };

        Ok(newest_first
            .into_iter()
            .skip(start)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn create_channel(
        &self,
        guild_id: &str,
        request: &CreateChannelRequest,
    ) -> std::result::Result<PlatformChannel, PlatformError> {
        if self.fail_creates.load(Ordering::SeqCst) {
            return Err(PlatformError::Forbidden("Missing Permissions".to_string()));
        }

        let id = format!("created-{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        let channel = PlatformChannel {
            id,
            kind: request.kind,
            guild_id: Some(guild_id.to_string()),
            name: Some(request.name.clone()),
            parent_id: request.parent_id.clone(),
            topic: request.topic.clone(),
            nsfw: request.nsfw,
            rate_limit_per_user: Some(request.rate_limit_per_user),
            position: Some(request.position),
            permission_overwrites: request.permission_overwrites.clone(),
        };

        self.created
            .lock()
            .unwrap()
            .push((guild_id.to_string(), request.clone()));
        self.put_channel(channel.clone());
        Ok(channel)
    }

    async fn delete_channel(
        &self,
        channel_id: &str,
        reason: &str,
    ) -> std::result::Result<(), PlatformError> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(PlatformError::Forbidden("Missing Permissions".to_string()));
        }

        if self.channels.lock().unwrap().remove(channel_id).is_none() {
            return Err(PlatformError::NotFound(format!("Unknown Channel {}", channel_id)));
        }

        self.deleted
            .lock()
            .unwrap()
            .push((channel_id.to_string(), reason.to_string()));
        Ok(())
    }

    async fn send_message(
        &self,
        channel_id: &str,
        payload: &MessagePayload,
    ) -> std::result::Result<(), PlatformError> {
        if self.failing_sends.lock().unwrap().contains(channel_id) {
            return Err(PlatformError::Forbidden("Missing Access".to_string()));
        }

        self.sent
            .lock()
            .unwrap()
            .push((channel_id.to_string(), payload.clone()));
        Ok(())
    }
}

// ============================================================================
// Store
// ============================================================================

#[derive(Debug, Clone, Default)]
struct Tables {
    watches: Vec<WatchedChannel>,
    warnings: Vec<ArchiveWarning>,
    archives: Vec<ArchivedChannel>,
    resources: Vec<Resource>,
}

/// Forgotten-deletion steps, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForgetStep {
    Resources,
    Warnings,
    Archive,
}

/// In-memory `ArchiveStore` with fault injection
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    fail_forget_at: Mutex<Option<ForgetStep>>,
    resource_insert_budget: Mutex<Option<usize>>,
    lose_next_claim: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The next restore claim behaves as if a concurrent restore won it.
    pub fn lose_next_claim(&self) {
        self.lose_next_claim.store(true, Ordering::SeqCst);
    }

    /// Let `n` more resource inserts succeed, then fail every one after.
    pub fn fail_resource_inserts_after(&self, n: usize) {
        *self.resource_insert_budget.lock().unwrap() = Some(n);
    }

    /// Abort the forget transaction when it reaches `step`.
    pub fn fail_forget_at(&self, step: ForgetStep) {
        *self.fail_forget_at.lock().unwrap() = Some(step);
    }

    pub fn seed_archive(&self, original_id: &str, guild_id: &str, name: &str) -> ArchivedChannel {
        let archive = ArchivedChannel {
            id: Uuid::now_v7(),
            original_id: original_id.to_string(),
            name: name.to_string(),
            category: None,
            guild_id: guild_id.to_string(),
            topic: None,
            nsfw: false,
            rate_limit: 0,
            position: 0,
            permission_snapshot: Json(vec![]),
            archived_at: Utc::now(),
            restored: false,
            restored_at: None,
        };
        self.tables.lock().unwrap().archives.push(archive.clone());
        archive
    }

    pub fn seed_warning(&self, channel_id: &str, warning_type: WarningType, sent_at: DateTime<Utc>) {
        self.tables.lock().unwrap().warnings.push(ArchiveWarning {
            id: Uuid::now_v7(),
            channel_id: channel_id.to_string(),
            warning_type,
            sent_at,
        });
    }

    /// Move `last_activity` back by `days`, regardless of `is_active`.
    pub fn backdate_activity(&self, channel_id: &str, days: f64) {
        let mut tables = self.tables.lock().unwrap();
        if let Some(watch) = tables.watches.iter_mut().find(|w| w.channel_id == channel_id) {
            watch.last_activity = Utc::now() - Duration::milliseconds((days * 86_400_000.0) as i64);
        }
    }

    pub fn watch_row(&self, channel_id: &str) -> Option<WatchedChannel> {
        self.tables
            .lock()
            .unwrap()
            .watches
            .iter()
            .find(|w| w.channel_id == channel_id)
            .cloned()
    }

    pub fn watch_rows(&self) -> Vec<WatchedChannel> {
        self.tables.lock().unwrap().watches.clone()
    }

    pub fn warning_rows(&self) -> Vec<ArchiveWarning> {
        self.tables.lock().unwrap().warnings.clone()
    }

    pub fn archive_rows(&self) -> Vec<ArchivedChannel> {
        self.tables.lock().unwrap().archives.clone()
    }

    pub fn resource_rows(&self) -> Vec<Resource> {
        self.tables.lock().unwrap().resources.clone()
    }
}

#[async_trait]
impl ArchiveStore for MemoryStore {
    async fn upsert_watch(&self, watch: &WatchChannel, now: DateTime<Utc>) -> Result<WatchedChannel> {
        let mut tables = self.tables.lock().unwrap();
        if let Some(row) = tables
            .watches
            .iter_mut()
            .find(|w| w.channel_id == watch.channel_id)
        {
            row.inactivity_days = watch.inactivity_days;
            row.rescue_enabled = watch.rescue_enabled;
            row.is_active = true;
            row.updated_at = now;
            return Ok(row.clone());
        }

        let row = WatchedChannel {
            id: Uuid::now_v7(),
            channel_id: watch.channel_id.clone(),
            guild_id: watch.guild_id.clone(),
            inactivity_days: watch.inactivity_days,
            rescue_enabled: watch.rescue_enabled,
            last_activity: now,
            watched_since: now,
            is_active: true,
            updated_at: now,
        };
        tables.watches.push(row.clone());
        Ok(row)
    }

    async fn get_watch(&self, channel_id: &str) -> Result<Option<WatchedChannel>> {
        Ok(self.watch_row(channel_id))
    }

    async fn set_watch_active(&self, channel_id: &str, active: bool) -> Result<bool> {
        let mut tables = self.tables.lock().unwrap();
        Ok(match tables.watches.iter_mut().find(|w| w.channel_id == channel_id) {
            Some(row) => {
                row.is_active = active;
                true
            }
            None => false,
        })
    }

    async fn set_last_activity(&self, channel_id: &str, at: DateTime<Utc>) -> Result<bool> {
        let mut tables = self.tables.lock().unwrap();
        Ok(
            match tables
                .watches
                .iter_mut()
                .find(|w| w.channel_id == channel_id && w.is_active)
            {
                Some(row) => {
                    row.last_activity = at;
                    true
                }
                None => false,
            },
        )
    }

    async fn list_active_watches(&self, guild_id: Option<&str>) -> Result<Vec<WatchedChannel>> {
        let mut rows: Vec<_> = self
            .tables
            .lock()
            .unwrap()
            .watches
            .iter()
            .filter(|w| w.is_active && guild_id.is_none_or(|g| w.guild_id == g))
            .cloned()
            .collect();
        rows.sort_by_key(|w| w.last_activity);
        Ok(rows)
    }

    async fn delete_watches_for_guild(&self, guild_id: &str) -> Result<u64> {
        let mut tables = self.tables.lock().unwrap();
        let before = tables.watches.len();
        tables.watches.retain(|w| w.guild_id != guild_id);
        Ok((before - tables.watches.len()) as u64)
    }

    async fn warning_sent_since(
        &self,
        channel_id: &str,
        warning_type: WarningType,
        since: DateTime<Utc>,
    ) -> Result<bool> {
        Ok(self.tables.lock().unwrap().warnings.iter().any(|w| {
            w.channel_id == channel_id && w.warning_type == warning_type && w.sent_at >= since
        }))
    }

    async fn record_warning(
        &self,
        channel_id: &str,
        warning_type: WarningType,
        at: DateTime<Utc>,
    ) -> Result<ArchiveWarning> {
        let warning = ArchiveWarning {
            id: Uuid::now_v7(),
            channel_id: channel_id.to_string(),
            warning_type,
            sent_at: at,
        };
        self.tables.lock().unwrap().warnings.push(warning.clone());
        Ok(warning)
    }

    async fn find_open_archive(&self, original_id: &str) -> Result<Option<ArchivedChannel>> {
        Ok(self
            .tables
            .lock()
            .unwrap()
            .archives
            .iter()
            .find(|a| a.original_id == original_id && !a.restored)
            .cloned())
    }

    async fn create_archive(
        &self,
        archive: &CreateArchivedChannel,
        at: DateTime<Utc>,
    ) -> Result<ArchivedChannel> {
        let mut tables = self.tables.lock().unwrap();
        if tables
            .archives
            .iter()
            .any(|a| a.original_id == archive.original_id && !a.restored)
        {
            return Err(AppError::AlreadyArchived(format!(
                "Channel {} already has an open archive",
                archive.original_id
            )));
        }

        let row = ArchivedChannel {
            id: Uuid::now_v7(),
            original_id: archive.original_id.clone(),
            name: archive.name.clone(),
            category: archive.category.clone(),
            guild_id: archive.guild_id.clone(),
            topic: archive.topic.clone(),
            nsfw: archive.nsfw,
            rate_limit: archive.rate_limit,
            position: archive.position,
            permission_snapshot: Json(archive.permission_snapshot.clone()),
            archived_at: at,
            restored: false,
            restored_at: None,
        };
        tables.archives.push(row.clone());
        Ok(row)
    }

    async fn get_archive(&self, id: Uuid) -> Result<Option<ArchivedChannel>> {
        Ok(self
            .tables
            .lock()
            .unwrap()
            .archives
            .iter()
            .find(|a| a.id == id)
            .cloned())
    }

    async fn find_archives_by_name(
        &self,
        guild_id: &str,
        name: &str,
        include_restored: bool,
    ) -> Result<Vec<ArchivedChannel>> {
        let mut rows: Vec<_> = self
            .tables
            .lock()
            .unwrap()
            .archives
            .iter()
            .filter(|a| {
                a.guild_id == guild_id
                    && a.name.eq_ignore_ascii_case(name)
                    && (include_restored || !a.restored)
            })
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.archived_at.cmp(&a.archived_at));
        Ok(rows)
    }

    async fn list_archives(&self, filter: &ArchiveFilter) -> Result<(Vec<ArchivedChannel>, i64)> {
        let mut rows: Vec<_> = self
            .tables
            .lock()
            .unwrap()
            .archives
            .iter()
            .filter(|a| {
                filter.guild_id.as_deref().is_none_or(|g| a.guild_id == g)
                    && (filter.include_restored || !a.restored)
            })
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.archived_at.cmp(&a.archived_at));
        let total = rows.len() as i64;
        let page = rows
            .into_iter()
            .skip(filter.offset.max(0) as usize)
            .take(filter.limit.max(0) as usize)
            .collect();
        Ok((page, total))
    }

    async fn claim_restore(&self, id: Uuid, at: DateTime<Utc>) -> Result<bool> {
        let lose = self.lose_next_claim.swap(false, Ordering::SeqCst);
        let mut tables = self.tables.lock().unwrap();
        Ok(
            match tables.archives.iter_mut().find(|a| a.id == id && !a.restored) {
                Some(row) => {
                    row.restored = true;
                    row.restored_at = Some(at);
                    !lose
                }
                None => false,
            },
        )
    }

    async fn release_restore(&self, id: Uuid) -> Result<()> {
        let mut tables = self.tables.lock().unwrap();
        if let Some(row) = tables.archives.iter_mut().find(|a| a.id == id) {
            row.restored = false;
            row.restored_at = None;
        }
        Ok(())
    }

    async fn discard_archive(&self, id: Uuid) -> Result<()> {
        let mut tables = self.tables.lock().unwrap();
        tables.resources.retain(|r| r.channel_id != id);
        tables.archives.retain(|a| a.id != id);
        Ok(())
    }

    async fn forget_archived_channel(&self, id: Uuid) -> Result<ForgetCounts> {
        let fail_at = *self.fail_forget_at.lock().unwrap();
        let mut tables = self.tables.lock().unwrap();

        // Work on a copy and swap it in only when every step succeeded
        let mut working = tables.clone();
        let original_id = working
            .archives
            .iter()
            .find(|a| a.id == id)
            .map(|a| a.original_id.clone())
            .ok_or_else(|| AppError::NotFound(format!("Archived channel {} not found", id)))?;

        let simulated = |step: ForgetStep| -> Result<()> {
            if fail_at == Some(step) {
                Err(AppError::Persistence(format!(
                    "Simulated failure at {:?}",
                    step
                )))
            } else {
                Ok(())
            }
        };

        let mut counts = ForgetCounts::default();

        simulated(ForgetStep::Resources)?;
        let before = working.resources.len();
        working.resources.retain(|r| r.channel_id != id);
        counts.resources = (before - working.resources.len()) as u64;

        simulated(ForgetStep::Warnings)?;
        let before = working.warnings.len();
        working.warnings.retain(|w| w.channel_id != original_id);
        counts.warnings = (before - working.warnings.len()) as u64;

        simulated(ForgetStep::Archive)?;
        let before = working.archives.len();
        working.archives.retain(|a| a.id != id);
        counts.archives = (before - working.archives.len()) as u64;

        *tables = working;
        Ok(counts)
    }

    async fn insert_resource(&self, resource: &NewResource) -> Result<InsertOutcome> {
        {
            let mut budget = self.resource_insert_budget.lock().unwrap();
            if let Some(remaining) = budget.as_mut() {
                if *remaining == 0 {
                    return Err(AppError::Persistence(
                        "Simulated resource insert failure".to_string(),
                    ));
                }
                *remaining -= 1;
            }
        }

        let mut tables = self.tables.lock().unwrap();
        if tables
            .resources
            .iter()
            .any(|r| r.dedup_key == resource.dedup_key)
        {
            return Ok(InsertOutcome::Duplicate);
        }

        tables.resources.push(Resource {
            id: Uuid::now_v7(),
            resource_type: resource.resource_type,
            url: resource.url.clone(),
            content: resource.content.clone(),
            file_name: resource.file_name.clone(),
            file_size: resource.file_size,
            context: resource.context.clone(),
            author_id: resource.author_id.clone(),
            author_name: resource.author_name.clone(),
            original_message_id: resource.original_message_id.clone(),
            channel_id: resource.channel_id,
            tags: resource.tags.clone(),
            dedup_key: resource.dedup_key.clone(),
            created_at: Utc::now(),
        });
        Ok(InsertOutcome::Inserted)
    }

    async fn list_resources(&self, archived_channel_id: Uuid) -> Result<Vec<Resource>> {
        Ok(self
            .tables
            .lock()
            .unwrap()
            .resources
            .iter()
            .filter(|r| r.channel_id == archived_channel_id)
            .cloned()
            .collect())
    }

    async fn count_resources(&self, archived_channel_id: Uuid) -> Result<i64> {
        Ok(self.list_resources(archived_channel_id).await?.len() as i64)
    }

    async fn search_resources(&self, search: &ResourceSearch) -> Result<Vec<ResourceMatch>> {
        let tables = self.tables.lock().unwrap();
        let needle = search.query.to_lowercase();
        let contains = |field: &Option<String>| {
            field
                .as_deref()
                .is_some_and(|v| v.to_lowercase().contains(&needle))
        };

        let mut matches: Vec<ResourceMatch> = tables
            .resources
            .iter()
            .filter(|r| search.resource_type.is_none_or(|t| r.resource_type == t))
            .filter(|r| search.author_id.as_deref().is_none_or(|a| r.author_id == a))
            .filter(|r| {
                contains(&r.url)
                    || contains(&r.file_name)
                    || contains(&r.content)
                    || contains(&r.context)
                    || r.tags.contains(&needle)
            })
            .filter_map(|r| {
                tables
                    .archives
                    .iter()
                    .find(|a| a.id == r.channel_id && a.guild_id == search.guild_id)
                    .map(|a| ResourceMatch {
                        resource: r.clone(),
                        channel_name: a.name.clone(),
                        archived_at: a.archived_at,
                    })
            })
            .collect();

        matches.sort_by(|a, b| b.resource.created_at.cmp(&a.resource.created_at));
        matches.truncate(search.limit.max(0) as usize);
        Ok(matches)
    }

    async fn resource_counts_by_type(
        &self,
        guild_id: Option<&str>,
    ) -> Result<Vec<ResourceTypeCount>> {
        let tables = self.tables.lock().unwrap();
        let guild_archives: HashSet<Uuid> = tables
            .archives
            .iter()
            .filter(|a| guild_id.is_none_or(|g| a.guild_id == g))
            .map(|a| a.id)
            .collect();

        let mut counts: HashMap<ResourceType, i64> = HashMap::new();
        for r in tables
            .resources
            .iter()
            .filter(|r| guild_archives.contains(&r.channel_id))
        {
            *counts.entry(r.resource_type).or_default() += 1;
        }

        let mut rows: Vec<_> = counts
            .into_iter()
            .map(|(resource_type, count)| ResourceTypeCount {
                resource_type,
                count,
            })
            .collect();
        rows.sort_by(|a, b| b.count.cmp(&a.count).then(a.resource_type.cmp(&b.resource_type)));
        Ok(rows)
    }

    async fn guild_counts(
        &self,
        guild_id: &str,
        recent_since: DateTime<Utc>,
    ) -> Result<GuildCounts> {
        let tables = self.tables.lock().unwrap();
        let guild_archives: HashSet<Uuid> = tables
            .archives
            .iter()
            .filter(|a| a.guild_id == guild_id)
            .map(|a| a.id)
            .collect();
        let guild_resources: Vec<&Resource> = tables
            .resources
            .iter()
            .filter(|r| guild_archives.contains(&r.channel_id))
            .collect();

        Ok(GuildCounts {
            watched_channels: tables
                .watches
                .iter()
                .filter(|w| w.guild_id == guild_id && w.is_active)
                .count() as i64,
            archived_channels: tables
                .archives
                .iter()
                .filter(|a| a.guild_id == guild_id && !a.restored)
                .count() as i64,
            restored_channels: tables
                .archives
                .iter()
                .filter(|a| a.guild_id == guild_id && a.restored)
                .count() as i64,
            resources: guild_resources.len() as i64,
            recent_resources: guild_resources
                .iter()
                .filter(|r| r.created_at >= recent_since)
                .count() as i64,
        })
    }

    async fn top_channels_by_resources(
        &self,
        guild_id: &str,
        limit: i64,
    ) -> Result<Vec<ChannelResourceCount>> {
        let tables = self.tables.lock().unwrap();
        let mut rows: Vec<ChannelResourceCount> = tables
            .archives
            .iter()
            .filter(|a| a.guild_id == guild_id)
            .map(|a| ChannelResourceCount {
                archived_channel_id: a.id,
                name: a.name.clone(),
                resource_count: tables
                    .resources
                    .iter()
                    .filter(|r| r.channel_id == a.id)
                    .count() as i64,
            })
            .filter(|c| c.resource_count > 0)
            .collect();
        rows.sort_by(|a, b| {
            b.resource_count
                .cmp(&a.resource_count)
                .then_with(|| a.name.cmp(&b.name))
        });
        rows.truncate(limit.max(0) as usize);
        Ok(rows)
    }
}
