//! CLI command implementations.

pub mod exchange;
pub mod goal;
pub mod init;
