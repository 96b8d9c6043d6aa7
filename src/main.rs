use std::{path::Path, path::PathBuf, process::ExitCode, sync::Arc};

use clap::Parser;
use hydrate_reminder::{
    clock::{Clock, SystemClock},
    config::Config,
    error::{Error, StorageError},
    notifier::DesktopNotifier,
    repository::Repository,
    scheduler::{LocalScheduler, MemoryScheduler, NotificationScheduler},
    screen::Screen,
    storage::JsonFileStore,
    tasks::ticker::run_screen,
    theme::EnvThemeProvider,
};
use tokio::io::BufReader;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hydrate-reminder", version, about = "Count your glasses, get reminded to drink")]
struct Cli {
    /// Config file to use instead of the platform default
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory for stored data and logs
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Track reminders without delivering notifications
    #[arg(long)]
    no_notify: bool,
}

/// Logs go to a daily rolling file since stdout belongs to the prompt.
fn init_tracing(level: &str, log_dir: &Path) -> WorkerGuard {
    let file_appender = tracing_appender::rolling::daily(log_dir, "hydrate-reminder.log");
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_env("HYDRATE_LOG").unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();

    guard
}

async fn run(cli: Cli) -> Result<(), Error> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(data_dir) = cli.data_dir {
        config.storage.data_dir = Some(data_dir);
    }
    if cli.no_notify {
        config.notifications.enabled = false;
    }

    let data_dir = config.data_dir().ok_or(StorageError::NoDataDir)?;
    let _guard = init_tracing(&config.log.level, &data_dir.join("logs"));
    info!(?config, "Starting hydrate-reminder");

    let store = Arc::new(JsonFileStore::open(&data_dir)?);
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let scheduler: Arc<dyn NotificationScheduler> = if config.notifications.enabled {
        Arc::new(LocalScheduler::new(
            clock.clone(),
            Arc::new(DesktopNotifier::default()),
        ))
    } else {
        warn!("Notifications disabled, reminders will only be tracked");
        Arc::new(MemoryScheduler::new())
    };

    let (mut screen, alerts) = Screen::load(
        Repository::new(store),
        scheduler,
        Arc::new(EnvThemeProvider::new()),
        clock,
    );

    println!("💧 hydrate-reminder, type 'help' for commands");
    for alert in alerts {
        println!("{alert}");
    }
    println!("{}", screen.dashboard().render_status());

    run_screen(
        &mut screen,
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
        config.tick_intervals(),
    )
    .await?;

    info!("Bye!");
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("hydrate-reminder: {e}");
            ExitCode::FAILURE
        }
    }
}
