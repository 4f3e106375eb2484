//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Shared utilities (load_config, open_db)
//! - `import` - Settlement CSV import
//! - `preview` - Table preview
//! - `ask` - Local question answering
//! - `serve` - Web server command

pub mod ask;
pub mod core;
pub mod import;
pub mod preview;
pub mod serve;

// Re-export command functions for main.rs
pub use ask::*;
pub use core::*;
pub use import::*;
pub use preview::*;
pub use serve::*;
