pub mod postgres;
pub mod store;

pub use postgres::PgArchiveStore;
pub use store::*;
