pub mod process;
pub mod report;

use std::{env, path::PathBuf};

use anyhow::Result;
use chrono::Local;
use clap::{Parser, Subcommand, ValueEnum};
use process::{kill_previous_servers, restart_server};
use tracing::level_filters::LevelFilter;

use crate::{
    daemon::{
        start_daemon,
        store::{SNAPSHOT_FILE, usage_store::UsageStore},
    },
    utils::{
        dir::create_application_default_path,
        logging::{CLI_PREFIX, enable_logging},
    },
};

#[derive(Parser, Debug)]
#[command(name = "Timesink", version, long_about = None)]
#[command(about = "Tracks time spent in selected applications and enforces daily limits", long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
    #[arg(long, help = "Enable logging")]
    log: bool,
}

#[derive(Subcommand, Debug)]
#[command(version, about, long_about = None)]
enum Commands {
    #[command(about = "Starts a daemon for the application")]
    Init {
        #[arg(
            long,
            help = "Application directory. By default tries to save into $XDG_STATE_HOME or $HOME/.local/state"
        )]
        dir: Option<PathBuf>,
    },
    #[command(
        about = "Run a daemon directly in current console. Used for creating a daemon internally and for debugging"
    )]
    Serve {
        #[arg(
            long,
            help = "Application directory. By default tries to save into $XDG_STATE_HOME or $HOME/.local/state"
        )]
        dir: Option<PathBuf>,
    },
    #[command(about = "Stop currently running daemon.")]
    Stop {},
    #[command(about = "Display today's usage against configured limits")]
    Today {},
    #[command(about = "Display usage for the 7 most recent days")]
    Week {
        #[arg(help = "Only display one app instead of every tracked app")]
        app: Option<String>,
    },
    #[command(about = "List tracked apps and their daily limits")]
    Apps {},
    #[command(about = "Set a daily limit for an app. 0 keeps the app tracked without a limit")]
    Limit {
        app: String,
        #[arg(help = "Daily limit in minutes")]
        minutes: u32,
    },
    #[command(about = "Start tracking an app without a limit")]
    Track { app: String },
    #[command(about = "Stop tracking an app and delete its usage history")]
    Remove { app: String },
    #[command(about = "Turn limit notifications on or off")]
    Notifications { state: NotificationsState },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum NotificationsState {
    On,
    Off,
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();

    if args.log {
        enable_logging(
            CLI_PREFIX,
            &create_application_default_path()?,
            Some(LevelFilter::TRACE),
            true,
        )?;
    }

    match args.commands {
        Commands::Init { dir } => {
            restart_server(dir.as_deref())?;
            Ok(())
        }
        Commands::Stop {} => {
            let process_name = env::current_exe().unwrap();
            kill_previous_servers(&process_name);
            Ok(())
        }
        Commands::Serve { dir } => {
            let dir = dir.map_or_else(create_application_default_path, Ok)?;
            start_daemon(dir).await?;
            Ok(())
        }
        Commands::Today {} => {
            let store = open_store().await?;
            report::print_today(&store, Local::now().date_naive());
            Ok(())
        }
        Commands::Week { app } => {
            let store = open_store().await?;
            report::print_week(&store, app.as_deref(), Local::now().date_naive());
            Ok(())
        }
        Commands::Apps {} => {
            let store = open_store().await?;
            report::print_apps(&store);
            Ok(())
        }
        Commands::Limit { app, minutes } => {
            let mut store = open_store().await?;
            store.set_limit(&app, minutes as u64);
            store.persist().await?;
            println!("Daily limit for {app} set to {minutes} minutes");
            Ok(())
        }
        Commands::Track { app } => {
            let mut store = open_store().await?;
            store.add_tracked(&app);
            store.persist().await?;
            println!("Tracking {app}. The daemon picks it up on its next start.");
            Ok(())
        }
        Commands::Remove { app } => {
            let mut store = open_store().await?;
            store.remove_app(&app);
            store.persist().await?;
            println!("Removed {app} and its usage history");
            Ok(())
        }
        Commands::Notifications { state } => {
            let mut store = open_store().await?;
            store.set_notifications_enabled(matches!(state, NotificationsState::On));
            store.persist().await?;
            println!(
                "Notifications {}",
                match state {
                    NotificationsState::On => "enabled",
                    NotificationsState::Off => "disabled",
                }
            );
            Ok(())
        }
    }
}

async fn open_store() -> Result<UsageStore> {
    UsageStore::open(create_application_default_path()?.join(SNAPSHOT_FILE)).await
}
