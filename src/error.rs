//! Error Types
//!
//! Store operations never fail; only construction of the janitor can.

use std::io;
use thiserror::Error;

/// Errors raised while building a store or starting its janitor
#[derive(Debug, Error)]
pub enum Error {
    /// The sweep interval must be non-zero
    #[error("janitor sweep interval must be greater than zero")]
    InvalidInterval,

    /// The OS refused to start the janitor thread
    #[error("failed to spawn janitor thread: {0}")]
    JanitorSpawn(#[from] io::Error),

    /// The store already has a janitor thread or task
    #[error("store already has a running janitor")]
    JanitorRunning,

    /// A task janitor was requested outside a Tokio runtime
    #[error("task janitor requires a running Tokio runtime")]
    NoRuntime,
}

pub type Result<T> = std::result::Result<T, Error>;
