pub mod rescue_handler;
