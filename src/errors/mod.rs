pub mod console_error;
pub mod core_error;

pub use console_error::ConsoleError;
pub use core_error::CoreError;
