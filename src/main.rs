//! Binary entrypoint for the Realmkit CLI.
//!
//! Commands:
//! - `init [--force]` - write a starter `config.toml`
//! - `hooks` - run hook discovery against `[hooks] present` and report the outcome
//! - `replay <events.jsonl>` - feed a JSON-lines event script through a core backed
//!   by an in-memory surface and print each event's disposition
//!
//! See the library crate docs for module-level details: `realmkit::`.
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::{info, warn};
use serde_json::json;
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use realmkit::config::Config;
use realmkit::core::Core;
use realmkit::event::{EntityId, Event};
use realmkit::hook::{HookFactories, HookRegistry};
use realmkit::logutil::escape_log;
use realmkit::menu::{Menu, MenuItem, RecordingSurface, Visual};
use realmkit::metrics::Metrics;

#[derive(Parser)]
#[command(name = "realmkit")]
#[command(about = "Interactive per-player state for multiplayer game servers")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path (can be used before or after subcommand)
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: String,

    /// Verbose logging (-v, -vv for more; may appear before or after subcommand)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Show which hooks would register with the configured dependencies
    Hooks,
    /// Replay a JSON-lines event script
    Replay {
        /// File with one serialized event per line
        events: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Init { force } => {
            init_logging(&None, cli.verbose);
            if Path::new(&cli.config).exists() && !force {
                bail!("{} already exists (use --force to overwrite)", cli.config);
            }
            Config::create_default(&cli.config).await?;
            info!("Configuration file created at {}", cli.config);
        }
        Commands::Hooks => {
            let config = load_with_logging(&cli.config, cli.verbose).await?;
            let present: HashSet<String> = config.hooks.present.iter().cloned().collect();
            let registry = HookRegistry::initialize(
                &Core::plugin_context(&config),
                &present,
                &HookFactories::builtin(),
                Arc::new(Metrics::new()),
            );
            for kind in registry.registered_kinds() {
                println!("{:<13} registered ({})", kind.to_string(), kind.dependency());
            }
            for skipped in registry.skipped() {
                println!("{:<13} skipped: {}", skipped.kind.to_string(), skipped.reason);
            }
        }
        Commands::Replay { events } => {
            let config = load_with_logging(&cli.config, cli.verbose).await?;
            replay(config, &events).await?;
        }
    }

    Ok(())
}

/// Load the config (or fall back to defaults) and start logging from it.
/// The fallback warning is emitted once the logger exists.
async fn load_with_logging(path: &str, verbosity: u8) -> Result<Config> {
    let loaded = read_config(path).await?;
    let config = loaded.clone().unwrap_or_default();
    init_logging(&Some(config.clone()), verbosity);
    if loaded.is_none() {
        warn!("{} not found; using default configuration", path);
    }
    Ok(config)
}

/// `None` when the file does not exist; parse errors are reported.
async fn read_config(path: &str) -> Result<Option<Config>> {
    if Path::new(path).exists() {
        Ok(Some(Config::load(path).await?))
    } else {
        Ok(None)
    }
}

async fn replay(config: Config, path: &str) -> Result<()> {
    let script = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read event script {}", path))?;

    let surface = Arc::new(RecordingSurface::new());
    let present: HashSet<String> = config.hooks.present.iter().cloned().collect();
    let core = Core::new(config, surface.clone(), &present, &HookFactories::builtin());
    core.enable();

    for (idx, line) in script.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let event: Event = serde_json::from_str(line)
            .with_context(|| format!("{}:{}: not a valid event", path, idx + 1))?;
        surface.observe(&event);
        let disposition = core.handle(&event);
        println!(
            "{}",
            json!({ "line": idx + 1, "event": event.kind(), "disposition": disposition })
        );
        if let Event::Join { entity } = event {
            match confirmation_menu(entity).and_then(|menu| Ok(core.menus().open(entity, menu)?)) {
                Ok(container) => println!(
                    "{}",
                    json!({ "line": idx + 1, "opened_menu": container.to_string() })
                ),
                Err(e) => warn!("could not open confirmation menu for {}: {}", entity, e),
            }
        }
    }

    core.disable();
    println!("{}", serde_json::to_string_pretty(&core.metrics())?);
    Ok(())
}

/// Three-row confirm/cancel menu. Confirm asks for a chat reply.
fn confirmation_menu(entity: EntityId) -> Result<Menu> {
    let menu = Menu::builder("Confirm action")
        .rows(3)
        .item(
            11,
            MenuItem::button(Visual::new("lime_wool").named("Confirm"), |click| {
                let who = click.entity();
                click.prompt(move |reply| {
                    info!("{} confirmed with '{}'", who, escape_log(&reply));
                });
                click.set_visual(
                    Visual::new("clock")
                        .named("Waiting for reply")
                        .lore_line("Type your answer in chat"),
                );
            }),
        )
        .item(
            13,
            MenuItem::icon(Visual::new("paper").named("Are you sure?")),
        )
        .item(
            15,
            MenuItem::button(Visual::new("red_wool").named("Cancel"), |click| {
                click.close_menu();
            }),
        )
        .on_close(move |reason| info!("confirmation menu for {} closed ({:?})", entity, reason))
        .build()?;
    Ok(menu)
}

fn init_logging(config: &Option<Config>, verbosity: u8) {
    use std::io::Write;
    let mut builder = env_logger::Builder::new();
    // CLI verbosity wins over the configured level
    let base_level = match verbosity {
        0 => config
            .as_ref()
            .and_then(|c| c.logging.level.parse().ok())
            .unwrap_or(log::LevelFilter::Info),
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    builder.filter_level(base_level);
    let file = config.as_ref().and_then(|c| c.logging.file.clone());
    let sink = file.and_then(|path| {
        std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .ok()
    });
    if let Some(f) = sink {
        let write_mutex = std::sync::Arc::new(std::sync::Mutex::new(f));
        // Foreground runs echo to the console as well
        let is_tty = atty::is(atty::Stream::Stdout);
        builder.format(move |fmt, record| {
            let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
            let line = format!("{} [{}] {}", ts, record.level(), record.args());
            if let Ok(mut guard) = write_mutex.lock() {
                let _ = writeln!(guard, "{}", line);
            }
            if is_tty {
                writeln!(fmt, "{}", line)
            } else {
                Ok(())
            }
        });
    } else {
        builder.format(|fmt, record| {
            let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
            writeln!(fmt, "{} [{}] {}", ts, record.level(), record.args())
        });
    }
    let _ = builder.try_init();
}
