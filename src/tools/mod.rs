//! Tool abstraction for the intake operations.

pub mod builtin;
pub mod registry;
pub mod tool;

pub use builtin::SharedController;
pub use registry::ToolRegistry;
pub use tool::*;
