pub mod activity;
pub mod archives;
pub mod notifications;
pub mod rescue;
pub mod stats;
