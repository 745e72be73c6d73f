pub mod actions;
pub mod notices;

pub use actions::ComponentAction;
