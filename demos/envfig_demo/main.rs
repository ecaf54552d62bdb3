//! # envfig demo application
//!
//! A stand-in for a long-running bot that reads its settings through envfig.
//! It exists to exercise the crate by hand.
//!
//! ```sh
//! cargo run --example envfig_demo -- show
//! cargo run --example envfig_demo -- config list
//! ```
//!
//! | Feature              | How to exercise it                                              |
//! |----------------------|-----------------------------------------------------------------|
//! | Compiled defaults    | `cargo run --example envfig_demo -- show`                       |
//! | `.env` layer         | Write `VC_TIMEOUT=900` to `./.env`, then run `show`             |
//! | Env var override     | `VC_TIMEOUT=120 cargo run --example envfig_demo -- show`        |
//! | Unknown var warning  | Add `VC_TIMEOUTT=1` to `./.env`, then run `show`                |
//! | Deprecated key       | `VC_TIMOUT_DEFAULT=true cargo run --example envfig_demo -- show`|
//! | Preload cap          | Write `MAX_SONG_PRELOAD=999` to `./.env`, then run `show`       |
//! | `config set`         | `cargo run --example envfig_demo -- config set VC_TIMEOUT 900`  |
//! | `config get`         | `cargo run --example envfig_demo -- config get BOT_PREFIX`      |
//! | `config gen`         | `cargo run --example envfig_demo -- config gen -o .env.sample`  |
//! | Runtime set + save   | `cargo run --example envfig_demo -- extend`                     |

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use envfig::{
    ConfigArgs, ConfigStore, Envfig, EnvfigBuilder, EnvfigError, SearchPath, SyncReport,
};

/// envfig demo: a pretend music bot.
#[derive(Parser, Debug)]
#[command(name = "envfig-demo")]
struct Cli {
    /// Directory holding `.env` and `.env.sample` (default: cwd).
    #[arg(long, global = true)]
    root: Option<std::path::PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the settings the bot would start with.
    Show,
    /// Raise VC_TIMEOUT by a minute and save, the way a bot command would.
    Extend,
    /// Manage the env files (list, gen, get, set).
    Config(ConfigArgs),
}

fn make_builder(cli: &Cli) -> EnvfigBuilder {
    let builder = Envfig::builder().app_name("envfig-demo").search_paths(vec![
        SearchPath::Platform,
        SearchPath::Home(".envfig-demo"),
        SearchPath::Cwd,
    ]);
    match &cli.root {
        Some(root) => builder.root(root),
        None => builder,
    }
}

fn load(builder: EnvfigBuilder) -> ConfigStore {
    let store = builder.load().unwrap_or_else(|e| {
        eprintln!("Failed to load config:\n{e}");
        std::process::exit(1);
    });
    store.warn_unknown_vars();
    store
}

fn show(store: &ConfigStore) {
    let entries = store.entries();
    let width = entries.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
    for (key, value) in entries {
        println!("{key:<width$}  {value}");
    }
}

fn extend_timeout(store: &mut ConfigStore) -> Result<SyncReport, EnvfigError> {
    let timeout = store.get_int("VC_TIMEOUT")? + 60;
    store.set("VC_TIMEOUT", timeout)?;
    store.save()
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let builder = make_builder(&cli);

    match cli.command {
        Commands::Show => show(&load(builder)),
        Commands::Extend => {
            let mut store = load(builder);
            let report = extend_timeout(&mut store).unwrap_or_else(|e| {
                eprintln!("Save failed:\n{e}");
                std::process::exit(1);
            });
            println!("{report}");
        }
        Commands::Config(args) => {
            let action = args.into_action();
            builder.handle_and_print(&action).unwrap_or_else(|e| {
                eprintln!("Config error:\n{e}");
                std::process::exit(1);
            });
        }
    }
}
