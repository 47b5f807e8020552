//! CLI command implementations.

pub mod saves;
pub mod status;
pub mod watch;
