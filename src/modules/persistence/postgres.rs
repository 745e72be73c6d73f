use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::activity::models::{ArchiveWarning, WarningType, WatchChannel, WatchedChannel};
use crate::features::archives::models::{ArchivedChannel, CreateArchivedChannel, ForgetCounts};
use crate::features::rescue::models::{NewResource, Resource};

use super::store::{
    ArchiveFilter, ArchiveStore, ChannelResourceCount, GuildCounts, InsertOutcome, ResourceMatch,
    ResourceSearch, ResourceTypeCount,
};

const WATCHED_COLUMNS: &str = "id, channel_id, guild_id, inactivity_days, rescue_enabled, \
     last_activity, watched_since, is_active, updated_at";

const ARCHIVED_COLUMNS: &str = "id, original_id, name, category, guild_id, topic, nsfw, \
     rate_limit, position, permission_snapshot, archived_at, restored, restored_at";

const RESOURCE_COLUMNS: &str = "id, resource_type, url, content, file_name, file_size, context, \
     author_id, author_name, original_message_id, channel_id, tags, dedup_key, created_at";

/// Escapes LIKE wildcards so the query matches literally
fn like_pattern(query: &str) -> String {
    let escaped = query
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

/// Postgres-backed store
pub struct PgArchiveStore {
    pool: PgPool,
}

impl PgArchiveStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ArchiveStore for PgArchiveStore {
    async fn upsert_watch(&self, watch: &WatchChannel, now: DateTime<Utc>) -> Result<WatchedChannel> {
        let sql = format!(
            r#"
            INSERT INTO watched_channels (
                id, channel_id, guild_id, inactivity_days, rescue_enabled,
                last_activity, watched_since, is_active, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $6, TRUE, $6)
            ON CONFLICT (channel_id) DO UPDATE SET
                inactivity_days = EXCLUDED.inactivity_days,
                rescue_enabled = EXCLUDED.rescue_enabled,
                is_active = TRUE,
                updated_at = EXCLUDED.updated_at
            RETURNING {}
            "#,
            WATCHED_COLUMNS
        );

        sqlx::query_as::<_, WatchedChannel>(&sql)
            .bind(Uuid::now_v7())
            .bind(&watch.channel_id)
            .bind(&watch.guild_id)
            .bind(watch.inactivity_days)
            .bind(watch.rescue_enabled)
            .bind(now)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to upsert watched channel: {:?}", e);
                AppError::Database(e)
            })
    }

    async fn get_watch(&self, channel_id: &str) -> Result<Option<WatchedChannel>> {
        let sql = format!(
            "SELECT {} FROM watched_channels WHERE channel_id = $1",
            WATCHED_COLUMNS
        );

        sqlx::query_as::<_, WatchedChannel>(&sql)
            .bind(channel_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch watched channel: {:?}", e);
                AppError::Database(e)
            })
    }

    async fn set_watch_active(&self, channel_id: &str, active: bool) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE watched_channels
            SET is_active = $2, updated_at = NOW()
            WHERE channel_id = $1
            "#,
        )
        .bind(channel_id)
        .bind(active)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update watch state: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(result.rows_affected() > 0)
    }

    async fn set_last_activity(&self, channel_id: &str, at: DateTime<Utc>) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE watched_channels
            SET last_activity = $2, updated_at = NOW()
            WHERE channel_id = $1 AND is_active
            "#,
        )
        .bind(channel_id)
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update last activity: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_active_watches(&self, guild_id: Option<&str>) -> Result<Vec<WatchedChannel>> {
        let sql = format!(
            r#"
            SELECT {}
            FROM watched_channels
            WHERE is_active AND ($1::TEXT IS NULL OR guild_id = $1)
            ORDER BY last_activity ASC
            "#,
            WATCHED_COLUMNS
        );

        sqlx::query_as::<_, WatchedChannel>(&sql)
            .bind(guild_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list watched channels: {:?}", e);
                AppError::Database(e)
            })
    }

    async fn delete_watches_for_guild(&self, guild_id: &str) -> Result<u64> {
        let result = sqlx::query("DELETE FROM watched_channels WHERE guild_id = $1")
            .bind(guild_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete watches for guild: {:?}", e);
                AppError::Database(e)
            })?;

        Ok(result.rows_affected())
    }

    async fn warning_sent_since(
        &self,
        channel_id: &str,
        warning_type: WarningType,
        since: DateTime<Utc>,
    ) -> Result<bool> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM archive_warnings
                WHERE channel_id = $1 AND warning_type = $2 AND sent_at >= $3
            )
            "#,
        )
        .bind(channel_id)
        .bind(warning_type)
        .bind(since)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to check recent warnings: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn record_warning(
        &self,
        channel_id: &str,
        warning_type: WarningType,
        at: DateTime<Utc>,
    ) -> Result<ArchiveWarning> {
        sqlx::query_as::<_, ArchiveWarning>(
            r#"
            INSERT INTO archive_warnings (id, channel_id, warning_type, sent_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, channel_id, warning_type, sent_at
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(channel_id)
        .bind(warning_type)
        .bind(at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to record archive warning: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn find_open_archive(&self, original_id: &str) -> Result<Option<ArchivedChannel>> {
        let sql = format!(
            "SELECT {} FROM archived_channels WHERE original_id = $1 AND NOT restored",
            ARCHIVED_COLUMNS
        );

        sqlx::query_as::<_, ArchivedChannel>(&sql)
            .bind(original_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to look up open archive: {:?}", e);
                AppError::Database(e)
            })
    }

    async fn create_archive(
        &self,
        archive: &CreateArchivedChannel,
        at: DateTime<Utc>,
    ) -> Result<ArchivedChannel> {
        let sql = format!(
            r#"
            INSERT INTO archived_channels (
                id, original_id, name, category, guild_id, topic, nsfw,
                rate_limit, position, permission_snapshot, archived_at, restored
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, FALSE)
            RETURNING {}
            "#,
            ARCHIVED_COLUMNS
        );

        sqlx::query_as::<_, ArchivedChannel>(&sql)
            .bind(Uuid::now_v7())
            .bind(&archive.original_id)
            .bind(&archive.name)
            .bind(&archive.category)
            .bind(&archive.guild_id)
            .bind(&archive.topic)
            .bind(archive.nsfw)
            .bind(archive.rate_limit)
            .bind(archive.position)
            .bind(Json(&archive.permission_snapshot))
            .bind(at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                    AppError::AlreadyArchived(format!(
                        "Channel {} already has an open archive",
                        archive.original_id
                    ))
                }
                e => {
                    tracing::error!("Failed to create archived channel: {:?}", e);
                    AppError::Database(e)
                }
            })
    }

    async fn get_archive(&self, id: Uuid) -> Result<Option<ArchivedChannel>> {
        let sql = format!(
            "SELECT {} FROM archived_channels WHERE id = $1",
            ARCHIVED_COLUMNS
        );

        sqlx::query_as::<_, ArchivedChannel>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch archived channel: {:?}", e);
                AppError::Database(e)
            })
    }

    async fn find_archives_by_name(
        &self,
        guild_id: &str,
        name: &str,
        include_restored: bool,
    ) -> Result<Vec<ArchivedChannel>> {
        let sql = format!(
            r#"
            SELECT {}
            FROM archived_channels
            WHERE guild_id = $1 AND LOWER(name) = LOWER($2) AND ($3 OR NOT restored)
            ORDER BY archived_at DESC
            "#,
            ARCHIVED_COLUMNS
        );

        sqlx::query_as::<_, ArchivedChannel>(&sql)
            .bind(guild_id)
            .bind(name)
            .bind(include_restored)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to find archives by name: {:?}", e);
                AppError::Database(e)
            })
    }

    async fn list_archives(&self, filter: &ArchiveFilter) -> Result<(Vec<ArchivedChannel>, i64)> {
        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM archived_channels
            WHERE ($1::TEXT IS NULL OR guild_id = $1) AND ($2 OR NOT restored)
            "#,
        )
        .bind(&filter.guild_id)
        .bind(filter.include_restored)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to count archived channels: {:?}", e);
            AppError::Database(e)
        })?;

        let sql = format!(
            r#"
            SELECT {}
            FROM archived_channels
            WHERE ($1::TEXT IS NULL OR guild_id = $1) AND ($2 OR NOT restored)
            ORDER BY archived_at DESC
            OFFSET $3 LIMIT $4
            "#,
            ARCHIVED_COLUMNS
        );

        let archives = sqlx::query_as::<_, ArchivedChannel>(&sql)
            .bind(&filter.guild_id)
            .bind(filter.include_restored)
            .bind(filter.offset)
            .bind(filter.limit)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list archived channels: {:?}", e);
                AppError::Database(e)
            })?;

        Ok((archives, total))
    }

    async fn claim_restore(&self, id: Uuid, at: DateTime<Utc>) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE archived_channels
            SET restored = TRUE, restored_at = $2
            WHERE id = $1 AND NOT restored
            "#,
        )
        .bind(id)
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to claim archive for restore: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(result.rows_affected() > 0)
    }

    async fn release_restore(&self, id: Uuid) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE archived_channels
            SET restored = FALSE, restored_at = NULL
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to release restore claim: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(())
    }

    async fn discard_archive(&self, id: Uuid) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            tracing::error!("Failed to begin transaction: {:?}", e);
            AppError::Database(e)
        })?;

        sqlx::query("DELETE FROM resources WHERE channel_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to discard archive resources: {:?}", e);
                AppError::Database(e)
            })?;

        sqlx::query("DELETE FROM archived_channels WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to discard archived channel: {:?}", e);
                AppError::Database(e)
            })?;

        tx.commit().await.map_err(|e| {
            tracing::error!("Failed to commit archive discard: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn forget_archived_channel(&self, id: Uuid) -> Result<ForgetCounts> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            tracing::error!("Failed to begin transaction: {:?}", e);
            AppError::Database(e)
        })?;

        let original_id = sqlx::query_scalar::<_, String>(
            "SELECT original_id FROM archived_channels WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to lock archived channel: {:?}", e);
            AppError::Database(e)
        })?
        .ok_or_else(|| AppError::NotFound(format!("Archived channel {} not found", id)))?;

        let resources = sqlx::query("DELETE FROM resources WHERE channel_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete resources: {:?}", e);
                AppError::Database(e)
            })?
            .rows_affected();

        let warnings = sqlx::query("DELETE FROM archive_warnings WHERE channel_id = $1")
            .bind(&original_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete archive warnings: {:?}", e);
                AppError::Database(e)
            })?
            .rows_affected();

        let archives = sqlx::query("DELETE FROM archived_channels WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete archived channel: {:?}", e);
                AppError::Database(e)
            })?
            .rows_affected();

        tx.commit().await.map_err(|e| {
            tracing::error!("Failed to commit forgotten deletion: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(ForgetCounts {
            resources,
            warnings,
            archives,
        })
    }

    async fn insert_resource(&self, resource: &NewResource) -> Result<InsertOutcome> {
        let result = sqlx::query(
            r#"
            INSERT INTO resources (
                id, resource_type, url, content, file_name, file_size, context,
                author_id, author_name, original_message_id, channel_id, tags, dedup_key
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            ON CONFLICT (dedup_key) DO NOTHING
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(resource.resource_type)
        .bind(&resource.url)
        .bind(&resource.content)
        .bind(&resource.file_name)
        .bind(resource.file_size)
        .bind(&resource.context)
        .bind(&resource.author_id)
        .bind(&resource.author_name)
        .bind(&resource.original_message_id)
        .bind(resource.channel_id)
        .bind(&resource.tags)
        .bind(&resource.dedup_key)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to insert resource: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(if result.rows_affected() == 0 {
            InsertOutcome::Duplicate
        } else {
            InsertOutcome::Inserted
        })
    }

    async fn list_resources(&self, archived_channel_id: Uuid) -> Result<Vec<Resource>> {
        let sql = format!(
            "SELECT {} FROM resources WHERE channel_id = $1 ORDER BY created_at ASC",
            RESOURCE_COLUMNS
        );

        sqlx::query_as::<_, Resource>(&sql)
            .bind(archived_channel_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list resources: {:?}", e);
                AppError::Database(e)
            })
    }

    async fn count_resources(&self, archived_channel_id: Uuid) -> Result<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM resources WHERE channel_id = $1")
            .bind(archived_channel_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count resources: {:?}", e);
                AppError::Database(e)
            })
    }

    async fn search_resources(&self, search: &ResourceSearch) -> Result<Vec<ResourceMatch>> {
        sqlx::query_as::<_, ResourceMatch>(
            r#"
            SELECT r.id, r.resource_type, r.url, r.content, r.file_name, r.file_size,
                   r.context, r.author_id, r.author_name, r.original_message_id,
                   r.channel_id, r.tags, r.dedup_key, r.created_at,
                   a.name AS channel_name, a.archived_at
            FROM resources r
            JOIN archived_channels a ON a.id = r.channel_id
            WHERE a.guild_id = $1
              AND (r.url ILIKE $2 ESCAPE '\'
                   OR r.file_name ILIKE $2 ESCAPE '\'
                   OR r.content ILIKE $2 ESCAPE '\'
                   OR r.context ILIKE $2 ESCAPE '\'
                   OR $3 = ANY(r.tags))
              AND ($4::resource_type IS NULL OR r.resource_type = $4)
              AND ($5::text IS NULL OR r.author_id = $5)
            ORDER BY r.created_at DESC
            LIMIT $6
            "#,
        )
        .bind(&search.guild_id)
        .bind(like_pattern(&search.query))
        .bind(search.query.to_lowercase())
        .bind(search.resource_type)
        .bind(search.author_id.as_deref())
        .bind(search.limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to search resources: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn resource_counts_by_type(
        &self,
        guild_id: Option<&str>,
    ) -> Result<Vec<ResourceTypeCount>> {
        sqlx::query_as::<_, ResourceTypeCount>(
            r#"
            SELECT r.resource_type, COUNT(*) AS count
            FROM resources r
            JOIN archived_channels a ON a.id = r.channel_id
            WHERE $1::TEXT IS NULL OR a.guild_id = $1
            GROUP BY r.resource_type
            ORDER BY count DESC
            "#,
        )
        .bind(guild_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to count resources by type: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn guild_counts(
        &self,
        guild_id: &str,
        recent_since: DateTime<Utc>,
    ) -> Result<GuildCounts> {
        sqlx::query_as::<_, GuildCounts>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM watched_channels
                    WHERE guild_id = $1 AND is_active) AS watched_channels,
                (SELECT COUNT(*) FROM archived_channels
                    WHERE guild_id = $1 AND NOT restored) AS archived_channels,
                (SELECT COUNT(*) FROM archived_channels
                    WHERE guild_id = $1 AND restored) AS restored_channels,
                (SELECT COUNT(*) FROM resources r
                    JOIN archived_channels a ON a.id = r.channel_id
                    WHERE a.guild_id = $1) AS resources,
                (SELECT COUNT(*) FROM resources r
                    JOIN archived_channels a ON a.id = r.channel_id
                    WHERE a.guild_id = $1 AND r.created_at >= $2) AS recent_resources
            "#,
        )
        .bind(guild_id)
        .bind(recent_since)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load guild counts: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn top_channels_by_resources(
        &self,
        guild_id: &str,
        limit: i64,
    ) -> Result<Vec<ChannelResourceCount>> {
        sqlx::query_as::<_, ChannelResourceCount>(
            r#"
            SELECT a.id AS archived_channel_id, a.name, COUNT(r.id) AS resource_count
            FROM archived_channels a
            JOIN resources r ON r.channel_id = a.id
            WHERE a.guild_id = $1
            GROUP BY a.id, a.name
            ORDER BY resource_count DESC, a.name ASC
            LIMIT $2
            "#,
        )
        .bind(guild_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load top channels: {:?}", e);
            AppError::Database(e)
        })
    }
}
