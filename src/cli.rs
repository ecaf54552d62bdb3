//! Clap adapter for envfig.
//!
//! Compiled only when the `clap` Cargo feature is enabled (on by default).
//! [`ConfigArgs`] and [`ConfigSubcommand`] embed into a clap
//! `#[derive(Parser)]` struct and give the host a
//! `config list|gen|get|set` subcommand group.
//!
//! [`ConfigArgs::into_action()`] is the only bridge to the core. Everything
//! downstream goes through [`EnvfigBuilder::handle()`](crate::EnvfigBuilder::handle).

use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::types::ConfigAction;

/// Clap-derived args for the `config` subcommand group.
///
/// ```ignore
/// #[derive(Subcommand)]
/// enum Commands {
///     Config(ConfigArgs),
/// }
/// ```
#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: Option<ConfigSubcommand>,
}

#[derive(Debug, Subcommand)]
pub enum ConfigSubcommand {
    /// Show all effective configuration values.
    List,
    /// Generate a commented `.env.sample`.
    Gen {
        /// Write to a file instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show the value and documentation for a key.
    Get {
        /// Variable name (e.g. "BOT_PREFIX").
        key: String,
    },
    /// Set a value and write it to `.env` and `.env.sample`.
    Set {
        /// Variable name (e.g. "VC_TIMEOUT").
        key: String,
        /// Value to set, parsed like the key's default.
        value: String,
    },
}

impl ConfigArgs {
    /// Bare `config` and `config list` both map to `ConfigAction::List`.
    pub fn into_action(self) -> ConfigAction {
        match self.action {
            None | Some(ConfigSubcommand::List) => ConfigAction::List,
            Some(ConfigSubcommand::Gen { output }) => ConfigAction::Gen { output },
            Some(ConfigSubcommand::Get { key }) => ConfigAction::Get { key },
            Some(ConfigSubcommand::Set { key, value }) => ConfigAction::Set { key, value },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Debug, Parser)]
    struct TestCli {
        #[command(flatten)]
        config: ConfigArgs,
    }

    fn parse(args: &[&str]) -> ConfigArgs {
        TestCli::try_parse_from(args).unwrap().config
    }

    #[test]
    fn parse_gen_no_output() {
        let action = parse(&["test", "gen"]).into_action();
        assert_eq!(action, ConfigAction::Gen { output: None });
    }

    #[test]
    fn parse_gen_with_output() {
        let action = parse(&["test", "gen", "-o", ".env.sample"]).into_action();
        assert_eq!(
            action,
            ConfigAction::Gen {
                output: Some(PathBuf::from(".env.sample"))
            }
        );
    }

    #[test]
    fn parse_gen_with_long_output() {
        let action = parse(&["test", "gen", "--output", "/srv/bot/.env.sample"]).into_action();
        assert_eq!(
            action,
            ConfigAction::Gen {
                output: Some(PathBuf::from("/srv/bot/.env.sample"))
            }
        );
    }

    #[test]
    fn parse_get() {
        let action = parse(&["test", "get", "BOT_PREFIX"]).into_action();
        assert_eq!(
            action,
            ConfigAction::Get {
                key: "BOT_PREFIX".into()
            }
        );
    }

    #[test]
    fn parse_set() {
        let action = parse(&["test", "set", "VC_TIMEOUT", "900"]).into_action();
        assert_eq!(
            action,
            ConfigAction::Set {
                key: "VC_TIMEOUT".into(),
                value: "900".into(),
            }
        );
    }

    #[test]
    fn parse_set_list_value() {
        let action = parse(&["test", "set", "GUILD_WHITELIST", "[1, 2]"]).into_action();
        assert_eq!(
            action,
            ConfigAction::Set {
                key: "GUILD_WHITELIST".into(),
                value: "[1, 2]".into(),
            }
        );
    }

    #[test]
    fn parse_bare_config_is_list() {
        assert_eq!(parse(&["test"]).into_action(), ConfigAction::List);
    }

    #[test]
    fn parse_explicit_list() {
        assert_eq!(parse(&["test", "list"]).into_action(), ConfigAction::List);
    }

    #[test]
    fn set_requires_value() {
        assert!(TestCli::try_parse_from(["test", "set", "VC_TIMEOUT"]).is_err());
    }

    #[test]
    fn invalid_subcommand_errors() {
        assert!(TestCli::try_parse_from(["test", "save"]).is_err());
    }
}
