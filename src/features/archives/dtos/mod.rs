pub mod archive_dto;

pub use archive_dto::*;
