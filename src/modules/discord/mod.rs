pub mod client;
pub mod convert;
pub mod error;
pub mod models;
pub mod platform;

pub use client::DiscordClient;
pub use error::PlatformError;
pub use models::*;
pub use platform::{ChatPlatform, MAX_MESSAGES_PER_PAGE};
