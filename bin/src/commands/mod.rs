//! CLI command implementations.

pub(crate) mod check;
pub(crate) mod config;
pub(crate) mod download;
pub(crate) mod history;
