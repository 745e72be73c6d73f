pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod workers;

pub use handlers::ActivityState;
pub use routes::routes;
pub use services::ActivityService;
pub use workers::InactivitySweeper;
