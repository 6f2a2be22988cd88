/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Capability-gated application shell.
//!
//! Independent contributors add commands to a shared menu model; each
//! command carries the capabilities an actor must hold to run it. Domain
//! objects are opened by resolving a handler through an override chain, a
//! standard chain and a fallback. Every session gets its own instances of
//! the registered views, arranged by named layouts.
//!
//! ```no_run
//! use std::sync::Arc;
//! use gateshell::shell::identity::InMemoryIdentitySource;
//!
//! let identity = Arc::new(InMemoryIdentitySource::new());
//! let shell = gateshell::mods::native::people::install(
//!     gateshell::Shell::builder(identity.clone()),
//! )
//! .default_layout("Foo")
//! .build()?;
//! let session = shell.open_session()?;
//! assert_eq!(session.active_layout(), Some("Foo"));
//! # Ok::<(), gateshell::ShellError>(())
//! ```

pub mod error;
pub mod mods;
pub mod prefs;
pub mod registries;
pub mod shell;

pub use error::{ConfigError, Result, ShellError};
pub use prefs::ShellConfig;
pub use shell::identity::{Actor, ActorId, IdentityEvent, IdentitySource, InMemoryIdentitySource};
pub use shell::session::{Session, SessionId};
pub use shell::{Shell, ShellBuilder};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Installs a `tracing-subscriber` formatter that also receives `log`
/// records. `filter` takes `EnvFilter` syntax; `RUST_LOG` is used when it
/// is `None`, and `info` when neither is set. Calling it twice is harmless.
#[cfg(feature = "tracing")]
pub fn init_tracing(filter: Option<&str>) {
    use tracing_subscriber::EnvFilter;

    let env_filter = match filter {
        Some(directives) => EnvFilter::try_new(directives).ok(),
        None => EnvFilter::try_from_default_env().ok(),
    }
    .unwrap_or_else(|| EnvFilter::new("info"));

    if tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .try_init()
        .is_err()
    {
        log::debug!("tracing subscriber already installed");
    }
}

#[cfg(not(feature = "tracing"))]
pub fn init_tracing(_filter: Option<&str>) {}
