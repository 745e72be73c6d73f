pub mod event_handler;
pub mod watch_handler;

use std::sync::Arc;

use crate::features::activity::services::{ActivityService, EventService};
use crate::features::activity::workers::InactivitySweeper;

/// State shared by the activity handlers
#[derive(Clone)]
pub struct ActivityState {
    pub activity: Arc<ActivityService>,
    pub events: Arc<EventService>,
    pub sweeper: Arc<InactivitySweeper>,
}
