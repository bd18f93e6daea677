// Declare submodules
mod constants;
mod loader;
mod types;


// Re-export public types
pub use loader::ConfigError;
pub use types::*;
