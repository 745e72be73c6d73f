pub mod archived_channel;

pub use archived_channel::*;
