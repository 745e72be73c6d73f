const POSTPONE_PREFIX: &str = "postpone_archive_";
const ARCHIVE_NOW_PREFIX: &str = "archive_now_";

/// Decoded warning-notice button
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComponentAction {
    Postpone(String),
    ArchiveNow(String),
}

impl ComponentAction {
    pub fn parse(custom_id: &str) -> Option<Self> {
        if let Some(channel_id) = custom_id.strip_prefix(POSTPONE_PREFIX) {
            return Some(ComponentAction::Postpone(channel_id.to_string()))
                .filter(|_| !channel_id.is_empty());
        }
        custom_id
            .strip_prefix(ARCHIVE_NOW_PREFIX)
            .filter(|id| !id.is_empty())
            .map(|id| ComponentAction::ArchiveNow(id.to_string()))
    }

    pub fn custom_id(&self) -> String {
        match self {
            ComponentAction::Postpone(id) => format!("{}{}", POSTPONE_PREFIX, id),
            ComponentAction::ArchiveNow(id) => format!("{}{}", ARCHIVE_NOW_PREFIX, id),
        }
    }
}
