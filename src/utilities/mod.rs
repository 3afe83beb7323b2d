//! Utility modules shared across crewgate.

pub mod errors;
pub mod printer;
pub mod prompts;

pub use errors::{ConfigError, DispatchError, FilterError, GateError, RegistryError, ToolError};
pub use printer::{Printer, PrinterColor};
pub use prompts::PromptBook;
