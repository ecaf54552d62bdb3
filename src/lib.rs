//! Live `.env` configuration for long-running services. Declare your keys,
//! point at a directory, and go.
//!
//! Envfig loads a flat `KEY=VALUE` configuration from compiled defaults, a
//! `.env` file and the process environment. It hands you a store that can be
//! read and changed at runtime, and it writes changes back to `.env` and
//! `.env.sample` without disturbing anything else in those files.
//!
//! ```ignore
//! let mut store = Envfig::builder().load()?;
//! store.set("VC_TIMEOUT", 900)?;
//! store.save()?;
//! ```
//!
//! # Schema as source of truth
//!
//! A [`Schema`] lists every key with its default value and doc lines. The
//! default's type decides how raw text is coerced, what `set` accepts, and
//! how the value is written back. Docs become comments in `.env.sample` and
//! the output of `config get`. The schema also carries the few special rules
//! a real deployment collects over time:
//!
//! - **aliases**: a legacy variable that fills a primary key left empty
//! - **deprecated names**: presence anywhere is a fatal load error
//! - **caps**: integer keys clamped to a maximum after loading
//! - **resolved paths**: relative file names looked up in search directories
//! - **derived keys**: read-only values computed from other keys
//! - **untracked keys**: computed at load time and never written back
//!
//! [`Schema::musicbot()`] is the full schema for the music bot this crate was
//! built for, and is the builder's default.
//!
//! # Layer precedence
//!
//! ```text
//! Compiled defaults     Schema::key(name, default, doc)
//!        ↑ overridden by
//! .env file             KEY=VALUE lines, last duplicate wins
//!        ↑ overridden by
//! Environment vars      exact variable names
//! ```
//!
//! # Coercion
//!
//! Raw text is read with the type of the key's default: `true`/`yes`/`on`/`1`
//! for booleans, base-10 for integers, bracketed literals or comma lists for
//! lists. Text that looks like a quoted literal is unquoted for string keys.
//! A value that cannot be coerced fails the load with
//! [`EnvfigError::InvalidValue`].
//!
//! # Change tracking and persistence
//!
//! `set` records a key in the store's change set when the new value differs
//! from the default, or when the key was already recorded. `save` rewrites
//! only those keys:
//!
//! - An existing `KEY=...` line is replaced in place. Comments, blank lines,
//!   unknown keys and ordering are kept byte-for-byte.
//! - A missing key is appended. In `.env.sample` the appended key gets its
//!   doc lines as a comment block.
//! - A line whose value already parses equal to the new value is left alone.
//!
//! The change set is cleared only when both files were written. A failed save
//! keeps it so the next save retries. Use [`SharedStore`] to share one store
//! between threads; `set` and `save` serialize on its write lock.
//!
//! # Clap adapter
//!
//! The `cli` module (behind the `clap` feature, on by default) provides
//! [`ConfigArgs`], giving your app `config list|gen|get|set`. Its
//! [`into_action()`](ConfigArgs::into_action) produces a [`ConfigAction`],
//! which [`EnvfigBuilder::handle()`] executes. Without clap:
//!
//! ```toml
//! envfig = { version = "...", default-features = false }
//! ```
//!
//! # Logging
//!
//! Envfig emits [`tracing`](https://docs.rs/tracing) events and never
//! installs a subscriber. Unknown `.env` entries are warnings, file writes
//! are info, failed writes are errors. Credential-looking values (keys
//! containing `TOKEN`, `KEY`, `SECRET` or `PASSWORD`) are masked in every log
//! line and listing.
//!
//! # Error handling
//!
//! All fallible operations return [`EnvfigError`]. Deprecated keys and
//! invalid values are fatal at load time (see [`EnvfigError::is_fatal`]).
//! Unknown `.env` entries are not errors; they are collected on the store
//! and surfaced by [`ConfigStore::warn_unknown_vars`].

pub mod error;
pub mod types;

mod builder;
mod changes;
#[cfg(feature = "clap")]
mod cli;
mod coerce;
mod env;
mod file;
mod literal;
mod ops;
mod parse;
mod resolve;
mod schema;
mod shared;
mod store;
mod sync;
mod unknown;
mod value;

#[cfg(test)]
mod fixtures;

pub use builder::{Envfig, EnvfigBuilder};
pub use changes::ChangeSet;
#[cfg(feature = "clap")]
pub use cli::{ConfigArgs, ConfigSubcommand};
pub use coerce::{coerce, parse_like};
pub use error::EnvfigError;
pub use literal::{Literal, LiteralError, parse_literal};
pub use ops::{ConfigResult, generate_sample};
pub use parse::{EnvFile, parse};
pub use schema::{Derive, KeyDef, Schema};
pub use shared::SharedStore;
pub use store::ConfigStore;
pub use sync::{FileKind, FileOutcome, SyncReport, Update};
pub use types::{ConfigAction, SearchPath};
pub use unknown::UnknownVar;
pub use value::{Kind, Value};
