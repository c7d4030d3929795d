pub mod error;
pub mod shutdown;

pub use error::AgentError;
pub use shutdown::{ShutdownManager, ShutdownReason};
