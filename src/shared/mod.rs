pub mod constants;
pub mod retry;
pub mod types;

#[cfg(test)]
pub mod test_helpers;
