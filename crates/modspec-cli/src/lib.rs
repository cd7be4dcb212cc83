//! modspec library - expose modules for testing
//!
//! The binary is a thin dispatcher over these modules.

pub mod commands;
pub mod common;
pub mod errors;
pub mod manifest_lookup;

pub use common::GlobalOpts;
pub use modspec_config as config_manager;
pub use modspec_logger as logger;
