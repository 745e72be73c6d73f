pub mod archive_handler;

use std::sync::Arc;

use crate::features::activity::services::ActivityService;
use crate::features::archives::services::ArchiveService;
use crate::features::rescue::services::RescueService;

/// State shared by the archive handlers
#[derive(Clone)]
pub struct ArchivesState {
    pub archive: Arc<ArchiveService>,
    pub activity: Arc<ActivityService>,
    pub rescue: Arc<RescueService>,
}
