pub mod activity_service;
pub mod event_service;
pub mod inactivity;

pub use activity_service::*;
pub use event_service::*;
pub use inactivity::*;
