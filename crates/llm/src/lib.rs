pub mod prompt;
pub mod provider;
pub mod providers;
pub mod reviser;

pub use provider::{LlmError, LlmProvider, Message, Role};
pub use providers::create_provider;
pub use reviser::ContractReviser;
