pub mod archive_warning;
pub mod watched_channel;

pub use archive_warning::*;
pub use watched_channel::*;
