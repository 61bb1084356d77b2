use std::path::PathBuf;

use clap::Parser;
use mwp_panel::{Panel, cli};
use mwp_panel::config::{BuildProfile, Config};
use mwp_panel::events::{Level, UiEvent};
use tokio::sync::broadcast::Receiver;
use tokio::sync::broadcast::error::TryRecvError;
use tracing::{debug, info, warn};

fn init_tracing() {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    #[cfg(distribute)]
    {
        fmt().json().with_env_filter(filter).with_writer(std::io::stderr).init();
    }

    #[cfg(not(distribute))]
    {
        fmt().pretty().with_env_filter(filter).with_writer(std::io::stderr).init();
    }
}

#[derive(Debug, Parser)]
#[command(name = env!("CARGO_PKG_NAME"))]
#[command(version = env!("GIT_VERSION"))]
#[command(about = "Command-line admin panel for WireGuard servers, interfaces, pools and peers")]
struct Args {
    /// API base URL (overrides MWP_API_BASE_URL)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Session file holding the access token (overrides MWP_SESSION_FILE)
    #[arg(long, global = true)]
    session_file: Option<PathBuf>,

    /// development or production (overrides MWP_PROFILE)
    #[arg(long, global = true)]
    profile: Option<BuildProfile>,

    #[command(subcommand)]
    command: cli::Command,
}

fn print_events(events: &mut Receiver<UiEvent>) {
    loop {
        match events.try_recv() {
            Ok(UiEvent::Notify(n)) => match n.level {
                Level::Success => eprintln!("✓ {}", n.message),
                Level::Error => eprintln!("✗ {}", n.message),
            },
            Ok(UiEvent::Navigate { route, .. }) => eprintln!("→ {}", route.path()),
            Ok(UiEvent::Invalidated(resource)) => {
                debug!(resource = resource.as_str(), "invalidated")
            }
            Err(TryRecvError::Lagged(skipped)) => warn!(skipped, "dropped UI events"),
            Err(TryRecvError::Empty | TryRecvError::Closed) => break,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let args = Args::parse();

    let mut config = Config::from_env_with(|var| match var {
        "MWP_API_BASE_URL" => args.base_url.clone(),
        "MWP_PROFILE" => args.profile.map(|p| p.to_string()),
        _ => None,
    })?;
    if let Some(path) = args.session_file {
        config.session_path = path;
    }
    info!(
        base_url = %config.base_url,
        session = %config.session_path.display(),
        profile = %config.profile,
        "starting mwp-panel"
    );

    let panel = Panel::from_config(&config).await?;
    let mut events = panel.events().subscribe();

    let result = cli::run(&panel, args.command).await;
    print_events(&mut events);

    result
}
