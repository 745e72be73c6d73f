pub mod discord;
pub mod persistence;
