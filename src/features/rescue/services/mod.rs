pub mod rescue_service;

pub use rescue_service::*;
