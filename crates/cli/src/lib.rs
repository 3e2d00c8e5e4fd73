// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! rollcall - a live attendance client.
//!
//! This crate connects to a school's attendance channel, keeps a local
//! reconciled view of it, and provides the `rollcall` CLI.
//!
//! # Main Components
//!
//! - [`ConnectionManager`] - WebSocket first, server-sent events as fallback,
//!   bounded reconnects
//! - [`SharedStore`] - thread-safe handle to an [`rc_core::AttendanceStore`]
//! - [`Config`] - endpoints and timing, loaded from TOML
//! - [`transport`] - the two transport adapters
//! - [`Error`] - Error types for all operations
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use rollcall::{Config, ConnectionManager, ConnectionTarget, Endpoints, SharedStore};
//! use rollcall::transport::NetworkConnector;
//!
//! let config = Config::load(None)?;
//! let store = SharedStore::default();
//! let manager = ConnectionManager::new(
//!     Endpoints::from_config(&config.server)?,
//!     config.connection_options(),
//!     Arc::new(NetworkConnector::new(config.stream.channels.clone())),
//!     Arc::new(store.clone()),
//! );
//! manager.connect(ConnectionTarget::new(Some("42".into()), Some(token))?)?;
//! ```

mod cli;
mod commands;
mod display;

pub mod config;
pub mod connection;
pub mod env;
pub mod error;
pub mod store;
pub mod target;
pub mod transport;

pub use cli::{Cli, Command, OutputFormat};
pub use config::Config;
pub use connection::{ConnectionManager, ConnectionOptions, Phase, SharedConnectionState};
pub use error::{Error, Result};
pub use store::{EventSink, SharedStore};
pub use target::{ConnectionTarget, Endpoints};

/// Execute a CLI command. This is the main entry point for library users
/// and provides a testable way to run commands without process execution.
pub async fn run(command: Command) -> Result<()> {
    match command {
        Command::Watch {
            schedule,
            token,
            config,
            no_fallback,
            output,
        } => {
            commands::watch::run(commands::watch::WatchArgs {
                schedule,
                token,
                config,
                no_fallback,
                output,
            })
            .await
        }
        Command::Replay {
            file,
            schedule,
            output,
        } => commands::replay::run(&file, schedule.as_deref(), output),
        Command::Config { config } => commands::config::show(config.as_deref()),
    }
}
