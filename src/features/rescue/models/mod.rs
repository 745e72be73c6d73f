pub mod detected;
pub mod resource;

pub use detected::*;
pub use resource::*;
