/// Default page size for pagination
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Maximum page size allowed
pub const MAX_PAGE_SIZE: i64 = 100;

// =============================================================================
// LIFECYCLE CONSTANTS
// =============================================================================

/// Inclusive bounds for a watch's inactivity threshold, in days
pub const MIN_INACTIVITY_DAYS: i32 = 1;
pub const MAX_INACTIVITY_DAYS: i32 = 365;

/// Window in which a sent warning suppresses a repeat of the same type
pub const WARNING_COOLDOWN_HOURS: i64 = 24;

/// Channels this close to their threshold count as near archive
pub const NEAR_ARCHIVE_DAYS: f64 = 3.0;

/// Window for "recent" resource counts in guild stats
pub const RECENT_WINDOW_DAYS: i64 = 30;

/// Number of channels listed in the top-by-resources ranking
pub const TOP_CHANNELS_LIMIT: i64 = 5;

/// Upper bound for a single rescue scan requested over HTTP
pub const MAX_RESCUE_MESSAGES: usize = 5000;

/// Resource search result bounds
pub const DEFAULT_SEARCH_LIMIT: i64 = 10;
pub const MAX_SEARCH_LIMIT: i64 = 20;

/// Resource search query length bounds, in characters
pub const MIN_SEARCH_QUERY_CHARS: usize = 2;
pub const MAX_SEARCH_QUERY_CHARS: usize = 100;
