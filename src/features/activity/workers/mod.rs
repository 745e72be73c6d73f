pub mod gateway_listener;
pub mod inactivity_sweeper;

pub use gateway_listener::*;
pub use inactivity_sweeper::*;
