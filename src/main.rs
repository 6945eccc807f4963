use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};
use env_logger::Env;
use eyre::{Context, Result};
use std::path::{Path, PathBuf};
use std::process;
use symtog::host::{FileSystemAdapter, Host, StatusLine, StdoutNotifier};
use symtog::plugin::{self, PluginHandle};
use symtog::settings::{SettingKey, SettingsStore};
use symtog::ui;
use tokio::runtime::Handle;
use tokio::sync::mpsc::unbounded_channel;

fn cli() -> Command {
    Command::new("symtog")
        .about("Toggle a symlink inside a vault directory")
        .arg(
            Arg::new("vault")
                .long("vault")
                .help("directory the symlink path is relative to")
                .value_name("DIR")
                .value_parser(value_parser!(PathBuf))
                .default_value(".")
                .global(true),
        )
        .arg(
            Arg::new("data")
                .long("data")
                .help("settings file (default: <DIR>/.symtog/data.json)")
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf))
                .global(true),
        )
        .arg(
            Arg::new("ui-mode")
                .short('u')
                .long("ui-mode")
                .help("run in ui mode")
                .action(ArgAction::SetTrue),
        )
        .subcommand(Command::new("toggle").about("create the symlink if absent, remove it otherwise"))
        .subcommand(Command::new("status").about("print whether the symlink is present"))
        .subcommand(
            Command::new("config")
                .about("edit and persist the symlink settings")
                .arg(
                    Arg::new("target")
                        .long("target")
                        .help("the path (directory) to be symlinked")
                        .value_name("TARGET"),
                )
                .arg(
                    Arg::new("path")
                        .long("path")
                        .help("the location to create the symlink, relative to the vault")
                        .value_name("PATH"),
                ),
        )
}

/// What a parsed command line asks for
#[derive(Debug, PartialEq, Eq)]
enum Mode<'a> {
    Ui,
    Toggle,
    Status,
    Config(&'a ArgMatches),
}

/// `-u` always runs the UI, as does a bare invocation.
fn mode(matches: &ArgMatches) -> Mode<'_> {
    if matches.get_flag("ui-mode") {
        return Mode::Ui;
    }

    match matches.subcommand() {
        Some(("toggle", _)) => Mode::Toggle,
        Some(("status", _)) => Mode::Status,
        Some(("config", sub)) => Mode::Config(sub),
        _ => Mode::Ui,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install().wrap_err("Failed to setup color_eyre")?;
    env_logger::Builder::from_env(Env::default().default_filter_or("warn"))
        .try_init()
        .wrap_err("Failed to setup env_logger")?;

    let matches = cli().get_matches();

    let vault = matches
        .get_one::<PathBuf>("vault")
        .map_or_else(|| Path::new("."), PathBuf::as_path);
    let vault = std::path::absolute(vault)
        .wrap_err_with(|| format!("Failed to resolve vault directory {}", vault.display()))?;
    let store = matches
        .get_one::<PathBuf>("data")
        .map_or_else(|| SettingsStore::in_vault(&vault), SettingsStore::new);

    match mode(&matches) {
        Mode::Toggle => {
            let (plugin, _status) = start_cli(&vault, store).await?;
            let outcome = plugin.toggle().await;
            plugin::stop(plugin);

            if outcome.is_none() {
                process::exit(1);
            }
            Ok(())
        }
        Mode::Status => {
            let (plugin, status) = start_cli(&vault, store).await?;
            let known = plugin.present().is_some();
            if known {
                println!("{}", status.text());
            }
            plugin::stop(plugin);

            if !known {
                process::exit(1);
            }
            Ok(())
        }
        Mode::Config(sub) => configure(&vault, store, sub).await,
        Mode::Ui => run_ui(&vault, store).await,
    }
}

async fn start_cli(vault: &Path, store: SettingsStore) -> Result<(PluginHandle, StatusLine)> {
    let status = StatusLine::default();
    let host = Host {
        adapter: Box::new(FileSystemAdapter::new(vault)),
        notifier: Box::new(StdoutNotifier),
        status: Box::new(status.clone()),
    };

    let plugin = plugin::start(host, store)
        .await
        .wrap_err("Failed to start symlink toggle")?;
    Ok((plugin, status))
}

async fn configure(vault: &Path, store: SettingsStore, matches: &ArgMatches) -> Result<()> {
    let (mut plugin, _status) = start_cli(vault, store).await?;

    for (id, key) in [
        ("target", SettingKey::SymlinkTarget),
        ("path", SettingKey::SymlinkPath),
    ] {
        if let Some(value) = matches.get_one::<String>(id) {
            plugin.on_change(key, value.clone()).await?;
        }
    }

    let settings = serde_json::to_string_pretty(plugin.settings())
        .wrap_err("Failed to serialize settings")?;
    println!("{settings}");

    plugin::stop(plugin);
    Ok(())
}

async fn run_ui(vault: &Path, store: SettingsStore) -> Result<()> {
    let (sender, receiver) = unbounded_channel();
    let status = StatusLine::default();
    let host = Host {
        adapter: Box::new(FileSystemAdapter::new(vault)),
        notifier: Box::new(sender),
        status: Box::new(status.clone()),
    };

    let plugin = plugin::start(host, store)
        .await
        .wrap_err("Failed to start symlink toggle")?;

    let runtime = Handle::current();
    tokio::task::spawn_blocking(move || ui::run_ui(plugin, runtime, receiver, status))
        .await
        .wrap_err("UI thread panicked")?
        .wrap_err("Error in UI mode")
}
